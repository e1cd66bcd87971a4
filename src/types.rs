use crate::completion::Completer;
use crate::store::Store;
use crate::token::TokenIssuer;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Process-wide dependencies shared by every handler. Built once at startup and only read
/// afterwards.
pub struct AppState {
    pub token_issuer: TokenIssuer,
    /// Provisioned Twilio number presented as caller id on outbound dials
    pub caller_id: String,
    pub store: Arc<dyn Store>,
    pub completer: Arc<dyn Completer>,
}

/// Events a browser client sends over the objection socket.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase", tag = "event", content = "data")]
pub enum ClientEvent {
    Objection(String),
}

/// Events the relay sends back to the client that raised them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase", tag = "event", content = "data")]
pub enum ServerEvent {
    Suggestion(String),
}
