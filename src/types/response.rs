use axum::{http::StatusCode, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Identifier of the entity a command touched
#[derive(Debug, Serialize, ToSchema)]
pub struct IdResponse {
    pub id: Uuid,
}

impl From<Uuid> for IdResponse {
    fn from(id: Uuid) -> Self {
        Self { id }
    }
}

/// Number of records a bulk command changed
#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub count: u64,
}

/// No content response helper (DRY - common pattern for DELETE endpoints)
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> axum::response::Response {
        StatusCode::NO_CONTENT.into_response()
    }
}
