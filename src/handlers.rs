// handlers.rs

use crate::{
    error::AppError,
    models::{AppState, HealthResponse, UpdateLightRequest, UpdateLightResponse, LightReport, WsMessage},
    utils,
};
use axum::{
    Json,
    extract::{
        State, WebSocketUpgrade,
        rejection::JsonRejection,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info};

#[utoipa::path(
    get,
    path = "/light",
    responses((status = 200, description = "Current light state", body = LightReport))
)]
pub async fn get_light(State(state): State<Arc<AppState>>) -> Json<LightReport> {
    Json(state.light.get_status().await)
}

#[utoipa::path(
    post,
    path = "/light",
    request_body = UpdateLightRequest,
    responses(
        (status = 200, description = "Light updated", body = UpdateLightResponse),
        (status = 400, description = "Malformed or out-of-range request", body = crate::models::ErrorBody)
    )
)]
pub async fn update_light(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UpdateLightRequest>, JsonRejection>,
) -> Result<Json<UpdateLightResponse>, AppError> {
    let Json(request) = payload?;
    let update = request.into_update()?;

    let report = state.light.apply(update).await;
    Ok(Json(UpdateLightResponse::from(report)))
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        timestamp: chrono::Utc::now(),
    })
}

pub async fn handle_light_ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    info!("Live feed connection attempt");
    ws.on_upgrade(|socket| handle_light_feed(socket, state))
}

fn encode(message: &WsMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(text) => Some(Message::Text(text.into())),
        Err(e) => {
            error!("Failed to encode feed message: {}", e);
            None
        }
    }
}

async fn handle_light_feed(socket: WebSocket, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();
    run_light_feed(sender, receiver, state).await;
}

/// Sends a snapshot, then every update, until either side goes away.
pub(crate) async fn run_light_feed<S, R>(mut sender: S, mut receiver: R, state: Arc<AppState>)
where
    S: Sink<Message> + Unpin + Send + 'static,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin + Send + 'static,
{
    let (client_id, mut rx, report) = state.light.watch().await;
    info!(%client_id, "Live feed client connected");

    let first = encode(&WsMessage::Snapshot(report));
    let sent = match first {
        Some(frame) => sender.send(frame).await.is_ok(),
        None => false,
    };
    if !sent {
        utils::cleanup_client_connection(client_id, &state).await;
        return;
    }

    let send_task = tokio::spawn(async move {
        loop {
            let msg = match rx.recv().await {
                Ok(msg) => msg,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(%client_id, skipped, "Live feed client lagging");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let Some(frame) = encode(&msg) else { continue };
            if sender.send(frame).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => break,
                other => debug!(%client_id, "Ignoring feed input: {:?}", other),
            }
        }
    });

    tokio::pin!(send_task, recv_task);
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    };

    utils::cleanup_client_connection(client_id, &state).await;
}
