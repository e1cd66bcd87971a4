use time::OffsetDateTime;
use uuid::Uuid;

pub const STATUS_INITIATED: &str = "initiated";

/// One row per routed call, keyed by the Twilio call sid.
#[derive(Clone, Debug, PartialEq)]
pub struct CallLog {
    pub id: String,
    pub phone_number: String,
    pub status: String,
    pub duration_seconds: Option<i32>,
    pub created_at: OffsetDateTime,
}

impl CallLog {
    pub fn initiated(call_sid: &str, phone_number: &str) -> Self {
        Self {
            id: call_sid.to_string(),
            phone_number: phone_number.to_string(),
            status: STATUS_INITIATED.to_string(),
            duration_seconds: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// A later lifecycle report for an already logged call.
#[derive(Clone, Debug, PartialEq)]
pub struct CallStatusUpdate {
    pub id: String,
    pub status: String,
    pub duration_seconds: Option<i32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Objection {
    pub id: Uuid,
    pub message: String,
    pub response: String,
    pub created_at: OffsetDateTime,
}

impl Objection {
    pub fn new(message: &str, response: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.to_string(),
            response: response.to_string(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
