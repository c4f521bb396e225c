use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use serde::Deserialize;
use tokio::sync::broadcast::{Receiver, error::RecvError};
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    domain::UserRole,
    error::{AppError, AppResult},
    middleware::{
        auth::{authenticate, ensure_role},
        extract::AppQuery,
    },
    realtime::Dispatch,
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SocketAuth {
    /// Access token of a delivery account
    pub token: Option<String>,
}

#[utoipa::path(
    get,
    path = "/ws/delivery",
    params(SocketAuth),
    responses(
        (status = 101, description = "Upgraded; the server pushes OrderEvent JSON frames", body = crate::realtime::OrderEvent),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not a delivery account")
    ),
    tag = "Realtime"
)]
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    AppQuery(auth): AppQuery<SocketAuth>,
) -> AppResult<Response> {
    let token = auth
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing token".into()))?;
    let user = authenticate(&state.config.jwt_secret, &token)?;
    ensure_role(&user, UserRole::Delivery)?;

    // Subscribe before the upgrade so nothing published in between is missed.
    let rx = state.events.subscribe();
    Ok(ws.on_upgrade(move |socket| serve_driver(socket, user.user_id, rx)))
}

async fn serve_driver(mut socket: WebSocket, driver_id: Uuid, mut rx: Receiver<Dispatch>) {
    tracing::info!(%driver_id, "driver connected");
    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Ok(dispatch) => {
                    if !dispatch.reaches(driver_id) {
                        continue;
                    }
                    let text = match serde_json::to_string(&dispatch.event) {
                        Ok(text) => text,
                        Err(err) => {
                            tracing::error!(error = %err, "failed to encode order event");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(%driver_id, skipped, "driver socket lagged, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::debug!(%driver_id, error = %err, "driver socket error");
                    break;
                }
            },
        }
    }
    tracing::info!(%driver_id, "driver disconnected");
}
