use crate::db_types::{CallLog, CallStatusUpdate, Objection};
use crate::error::AppError;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Write surface for call and objection records.
///
/// Callers choose their own failure policy: the call router logs and drops errors from
/// `insert_call_log`, while the objection bridge treats an `insert_objection` error as a failed
/// round trip.
#[async_trait]
pub trait Store: Send + Sync {
    /// Create a call log, replacing any existing record with the same id.
    async fn insert_call_log(&self, record: &CallLog) -> Result<(), AppError>;

    async fn insert_objection(&self, record: &Objection) -> Result<(), AppError>;

    /// Apply a status report to an existing call log. Returns `false` when no log with that id
    /// exists.
    async fn update_call_status(&self, update: &CallStatusUpdate) -> Result<bool, AppError>;
}

pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    /// Connect to Postgres and bring the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| {
                error!(error=%e, "failed to connect to database");
                AppError::Db(e)
            })?;
        sqlx::migrate!().run(&pool).await?;
        info!("database migrations applied");
        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_call_log(&self, record: &CallLog) -> Result<(), AppError> {
        sqlx::query(
            "
            insert into call_logs (
              id,
              phone_number,
              status,
              duration_seconds,
              created_at
            ) values (
              $1,
              $2,
              $3,
              $4,
              $5
            )
            on conflict (id) do update set
              phone_number = excluded.phone_number,
              status = excluded.status,
              duration_seconds = excluded.duration_seconds,
              created_at = excluded.created_at
            ",
        )
        .bind(&record.id)
        .bind(&record.phone_number)
        .bind(&record.status)
        .bind(record.duration_seconds)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        debug!(call_sid=%record.id, "upserted call log");
        Ok(())
    }

    async fn insert_objection(&self, record: &Objection) -> Result<(), AppError> {
        sqlx::query(
            "
            insert into objections (
              id,
              message,
              response,
              created_at
            ) values (
              $1,
              $2,
              $3,
              $4
            )
            ",
        )
        .bind(record.id)
        .bind(&record.message)
        .bind(&record.response)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_call_status(&self, update: &CallStatusUpdate) -> Result<bool, AppError> {
        let result = sqlx::query(
            "
            update call_logs
            set status = $2,
                duration_seconds = coalesce($3, duration_seconds)
            where id = $1
            ",
        )
        .bind(&update.id)
        .bind(&update.status)
        .bind(update.duration_seconds)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// In-process store. Nothing survives a restart; handy wherever a database is overkill, such as
/// exercising the handlers.
#[derive(Default)]
pub struct MemoryStore {
    call_logs: RwLock<HashMap<String, CallLog>>,
    objections: RwLock<Vec<Objection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn call_log(&self, id: &str) -> Option<CallLog> {
        self.call_logs.read().await.get(id).cloned()
    }

    pub async fn call_log_count(&self) -> usize {
        self.call_logs.read().await.len()
    }

    pub async fn objections(&self) -> Vec<Objection> {
        self.objections.read().await.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_call_log(&self, record: &CallLog) -> Result<(), AppError> {
        let mut call_logs = self.call_logs.write().await;
        call_logs.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn insert_objection(&self, record: &Objection) -> Result<(), AppError> {
        self.objections.write().await.push(record.clone());
        Ok(())
    }

    async fn update_call_status(&self, update: &CallStatusUpdate) -> Result<bool, AppError> {
        let mut call_logs = self.call_logs.write().await;
        match call_logs.get_mut(&update.id) {
            Some(log) => {
                log.status = update.status.clone();
                if update.duration_seconds.is_some() {
                    log.duration_seconds = update.duration_seconds;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
