use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use huddle_core::{Identity, RoomId};
use serde::Deserialize;
use thiserror::Error;

const MAX_USERNAME_LEN: usize = 64;

/// Параметры запроса на подключение (query string апгрейда WebSocket).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectParams {
    pub room_id: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("room not found: {0}")]
    RoomNotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        let status = match self {
            AdmissionError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AdmissionError::RoomNotFound(_) => StatusCode::NOT_FOUND,
            AdmissionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Трейт, который реализует внешний HTTP-слой (аутентификация, хранилище комнат),
/// чтобы сигнальное ядро могло принять соединение.
#[async_trait]
pub trait AdmissionPolicy: Send + Sync {
    /// Определить пользователя по параметрам подключения.
    async fn authenticate(&self, params: &ConnectParams) -> Result<Identity, AdmissionError>;

    /// Найти комнату для пользователя. Политика комнаты по умолчанию живёт здесь.
    async fn resolve_room(
        &self,
        identity: &Identity,
        requested: Option<&str>,
    ) -> Result<RoomId, AdmissionError>;
}

/// Trusts the `username` query parameter and lets anyone into any room,
/// falling back to a fixed default room.
#[derive(Debug, Clone)]
pub struct OpenAdmission {
    default_room: RoomId,
}

impl OpenAdmission {
    pub fn new(default_room: impl Into<RoomId>) -> Self {
        Self {
            default_room: default_room.into(),
        }
    }
}

#[async_trait]
impl AdmissionPolicy for OpenAdmission {
    async fn authenticate(&self, params: &ConnectParams) -> Result<Identity, AdmissionError> {
        let username = params
            .username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AdmissionError::Unauthorized("username required".into()))?;

        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(AdmissionError::Unauthorized("username too long".into()));
        }

        Ok(Identity::new(username, username))
    }

    async fn resolve_room(
        &self,
        _identity: &Identity,
        requested: Option<&str>,
    ) -> Result<RoomId, AdmissionError> {
        Ok(requested
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(RoomId::from)
            .unwrap_or_else(|| self.default_room.clone()))
    }
}
