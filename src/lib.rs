pub mod completion;
pub mod config;
pub mod db_types;
pub mod error;
pub mod handlers;
pub mod openai_types;
pub mod store;
pub mod tasks;
pub mod token;
pub mod twilio_types;
pub mod types;

use crate::types::AppState;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

pub mod consts {
    pub const SYSTEM_PROMPT: &str = "You are an expert sales assistant. When a salesperson relays a customer's objection, reply with a concise, persuasive response they can use immediately.";
    pub const FAILED_SUGGESTION: &str = "Failed to generate suggestion.";
    pub const SUGGESTION_MAX_TOKENS: u32 = 150;
    pub const CLIENT_ADDRESS_PREFIX: &str = "client:";
    pub const TOKEN_TTL_SECS: i64 = 3_600;
}

pub fn app(app_state: Arc<AppState>, frontend_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);
    let cors = match frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            warn!(error=%e, origin=%frontend_origin, "unusable frontend origin; CORS disabled");
            cors
        }
    };

    Router::new()
        .route("/", get(handlers::health_handler))
        .route("/token", get(handlers::token_handler))
        .route("/voice", post(handlers::voice_handler))
        .route("/voice/status", post(handlers::voice_status_handler))
        .route("/socket", get(handlers::ws_handler))
        .with_state(app_state)
        .layer(cors)
}
