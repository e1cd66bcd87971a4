use crate::consts::FAILED_SUGGESTION;
use crate::db_types::{CallLog, Objection};
use crate::error::{handle_error, AppError};
use crate::types::{AppState, ClientEvent, ServerEvent};

use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Fire-and-forget write of a call log. Call routing never waits on, or fails because of, this
/// write.
pub fn spawn_call_log(app_state: Arc<AppState>, record: CallLog) {
    tokio::spawn(async move {
        if let Err(e) = app_state.store.insert_call_log(&record).await {
            error!(error=%e, call_sid=%record.id, "failed to save call log");
        }
    });
}

/// One objection round trip: completion, then an awaited write. A failed write fails the round
/// trip just like a failed completion does.
pub async fn answer_objection(app_state: &AppState, message: &str) -> Result<String, AppError> {
    let suggestion = app_state.completer.suggest(message).await?;
    app_state
        .store
        .insert_objection(&Objection::new(message, &suggestion))
        .await
        .map_err(|e| {
            error!(error=%e, "failed to save objection");
            e
        })?;
    Ok(suggestion)
}

/// Answer a single objection and queue the resulting suggestion for the connection that asked.
async fn respond_to_objection(
    message: String,
    app_state: Arc<AppState>,
    outbound_sink: mpsc::Sender<ServerEvent>,
) {
    let suggestion = match answer_objection(&app_state, &message).await {
        Ok(suggestion) => suggestion,
        Err(e) => {
            handle_error(&e);
            FAILED_SUGGESTION.to_string()
        }
    };
    if outbound_sink
        .send(ServerEvent::Suggestion(suggestion))
        .await
        .is_err()
    {
        debug!("client went away before its suggestion was ready");
    }
}

/// Task that reads client events until the socket closes. Every objection is handled on its own
/// task, so replies on one connection can overtake each other.
pub async fn relay_client_events(
    mut client_stream: SplitStream<WebSocket>,
    outbound_sink: mpsc::Sender<ServerEvent>,
    app_state: Arc<AppState>,
) -> Result<(), AppError> {
    loop {
        match client_stream.next().await {
            Some(msg) => match msg {
                Ok(Message::Text(json)) => match serde_json::from_str::<ClientEvent>(&json) {
                    Ok(ClientEvent::Objection(message)) => {
                        debug!(objection=%message, "got objection");
                        tokio::spawn(respond_to_objection(
                            message,
                            app_state.clone(),
                            outbound_sink.clone(),
                        ));
                    }
                    Err(e) => {
                        warn!(error=%e, "ignoring unrecognized client event");
                    }
                },
                Ok(Message::Close(_)) => break Ok(()),
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => (),
                Ok(m) => {
                    warn!(message=?m, "unsupported message type from client");
                    continue;
                }
                Err(e) => {
                    error!(error=%e, "failed to receive message from client");
                    break Err(AppError::Socket("Failed to receive message from client"));
                }
            },
            None => break Ok(()),
        }
    }
}

/// Task that is the funnel of all events going to one client.
pub async fn send_client_events(
    mut outbound_stream: mpsc::Receiver<ServerEvent>,
    mut client_sink: SplitSink<WebSocket, Message>,
) -> Result<(), AppError> {
    while let Some(event) = outbound_stream.recv().await {
        let json = serde_json::to_string(&event).map_err(|e| {
            error!(error=%e, "failed to serialize server event");
            AppError::Serialization(e)
        })?;
        client_sink.send(Message::Text(json)).await.map_err(|e| {
            error!(error=%e, "failed to send message to client");
            AppError::Socket("Failed to send message to client")
        })?;
    }

    Ok(())
}

/// Drive one client connection from upgrade to disconnect.
pub async fn run_objection_session(socket: WebSocket, app_state: Arc<AppState>) {
    info!("client connected");
    let (client_sink, client_stream) = socket.split();
    let (outbound_sink, outbound_stream) = mpsc::channel::<ServerEvent>(16);
    let writer = tokio::spawn(send_client_events(outbound_stream, client_sink));

    if let Err(e) = relay_client_events(client_stream, outbound_sink, app_state).await {
        handle_error(&e);
    }
    info!("client disconnected");

    // In-flight objections keep their sender clones, so the writer drains whatever they still
    // produce before it stops.
    match writer.await {
        Ok(Ok(())) => (),
        Ok(Err(e)) => debug!(error=%e, "client writer stopped early"),
        Err(e) => error!(error=%e, "client writer task panicked"),
    }
}
