use crate::consts::CLIENT_ADDRESS_PREFIX;
use crate::db_types::{CallLog, CallStatusUpdate};
use crate::error::AppError;
use crate::tasks::{run_objection_session, spawn_call_log};
use crate::token::TokenResponse;
use crate::twilio_types::{
    wrap_twiml, DialAction, NumberNoun, Response, ResponseAction, TwilioStatusPayload,
    TwilioVoicePayload,
};
use crate::types::AppState;

use axum::{
    extract::{ws::WebSocketUpgrade, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

pub async fn health_handler() -> &'static str {
    "Hello, World!"
}

pub async fn token_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = app_state.token_issuer.issue()?;
    debug!(identity=%app_state.token_issuer.identity(), "issued client token");
    Ok(Json(TokenResponse { token }))
}

/// Returns the dialable target, or why `to` is missing or a client address rather than a phone
/// number.
pub fn check_dial_target(to: Option<&str>) -> Result<&str, &'static str> {
    match to {
        None => Err("missing To"),
        Some(to) if to.trim().is_empty() => Err("missing To"),
        Some(to) if to.starts_with(CLIENT_ADDRESS_PREFIX) => Err("To is a client address"),
        Some(to) => Ok(to),
    }
}

fn twiml_response(response: Response) -> (StatusCode, HeaderMap, String) {
    let twiml = wrap_twiml(xmlserde::xml_serialize(response));
    trace!("twiml: '{}'", twiml);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/xml"),
    );
    (StatusCode::OK, headers, twiml)
}

/// Voice webhook: dial `To` from the provisioned number and log the call.
///
/// Always answers with a dial document. A bad `To` is only logged, and the call log is written
/// on a detached task whose failures never reach Twilio.
pub async fn voice_handler(
    State(app_state): State<Arc<AppState>>,
    body: String,
) -> impl IntoResponse {
    trace!(body=%body, "voice request body");
    let payload = serde_urlencoded::from_str::<TwilioVoicePayload>(&body).unwrap_or_else(|e| {
        error!(error=%e, "failed to deserialize Twilio voice payload");
        TwilioVoicePayload::default()
    });
    if let Err(reason) = check_dial_target(payload.to.as_deref()) {
        warn!(to=?payload.to, reason, "dialing unvalidated target");
    }
    let to = payload.to.unwrap_or_default();

    match payload.call_sid.as_deref() {
        Some(call_sid) => {
            info!(call_sid=%call_sid, to=%to, "routing call");
            spawn_call_log(app_state.clone(), CallLog::initiated(call_sid, &to));
        }
        None => warn!(to=%to, "voice webhook without CallSid; not logging call"),
    }

    let dial_action = DialAction {
        caller_id: Some(app_state.caller_id.clone()),
        number: Some(NumberNoun { number: to }),
    };
    twiml_response(Response {
        actions: vec![ResponseAction::Dial(dial_action)],
    })
}

/// Status callback: record how the call ended. Failures are logged and otherwise ignored.
pub async fn voice_status_handler(
    State(app_state): State<Arc<AppState>>,
    body: String,
) -> impl IntoResponse {
    trace!(body=%body, "status request body");
    match serde_urlencoded::from_str::<TwilioStatusPayload>(&body) {
        Ok(payload) => {
            let update = CallStatusUpdate {
                id: payload.call_sid,
                status: payload.call_status.as_str().to_string(),
                duration_seconds: payload.call_duration,
            };
            match app_state.store.update_call_status(&update).await {
                Ok(true) => debug!(call_sid=%update.id, status=%update.status, "updated call log"),
                Ok(false) => warn!(call_sid=%update.id, "status callback for unknown call"),
                Err(e) => error!(error=%e, call_sid=%update.id, "failed to update call log"),
            }
        }
        Err(e) => error!(error=%e, "failed to deserialize Twilio status payload"),
    }

    twiml_response(Response::default())
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_objection_session(socket, app_state))
}
