use crate::room::RoomRegistry;
use crate::signaling::{AdmissionError, AdmissionPolicy, ConnectParams, admit_socket};
use crate::transport::TransportConfig;
use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use huddle_core::RoomId;
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::warn;

pub struct AppState {
    pub registry: RoomRegistry,
    pub policy: Arc<dyn AdmissionPolicy>,
    pub config: TransportConfig,
}

impl AppState {
    pub fn new(
        registry: RoomRegistry,
        policy: Arc<dyn AdmissionPolicy>,
        config: TransportConfig,
    ) -> Self {
        Self {
            registry,
            policy,
            config,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/rooms/{room_id}", get(room_status))
        .with_state(state)
}

/// Serves the signaling routes until the listener fails.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let identity = match state.policy.authenticate(&params).await {
        Ok(identity) => identity,
        Err(e) => {
            warn!("Rejected WebSocket upgrade: {}", e);
            return e.into_response();
        }
    };

    let room_id = match state
        .policy
        .resolve_room(&identity, params.room_id.as_deref())
        .await
    {
        Ok(room_id) => room_id,
        Err(e) => {
            warn!(user = %identity.user_id, "Rejected WebSocket upgrade: {}", e);
            return e.into_response();
        }
    };

    let registry = state.registry.clone();
    let config = state.config.clone();

    ws.max_message_size(config.max_message_size)
        .on_upgrade(move |socket| admit_socket(registry, room_id, identity, socket, config))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatus {
    pub room_id: RoomId,
    pub participants: usize,
}

pub async fn room_status(
    Path(room_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let room_id = RoomId::from(room_id);

    match state.registry.participant_count(&room_id) {
        Some(participants) => (
            StatusCode::OK,
            Json(RoomStatus {
                room_id,
                participants,
            }),
        )
            .into_response(),
        None => AdmissionError::RoomNotFound(room_id.to_string()).into_response(),
    }
}
