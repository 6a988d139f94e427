//! Notification inbox handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{AuthenticatedCaller, NewNotification, Notification, NotificationKind};
use crate::errors::AppResult;
use crate::types::{CountResponse, IdResponse, NoContent, PageParams};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    /// Recipient; only admins may address another user
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub message: String,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

impl From<CreateNotificationRequest> for NewNotification {
    fn from(req: CreateNotificationRequest) -> Self {
        Self {
            user_id: req.user_id,
            kind: req.kind,
            title: req.title,
            message: req.message,
            metadata: req.metadata,
        }
    }
}

/// Routes mounted at `/notifications`
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications).post(create_notification))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_as_read))
        .route("/:id/read", post(mark_as_read))
        .route("/:id", delete(delete_notification))
}

/// The caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(PageParams),
    responses(
        (status = 200, description = "Notifications page", body = Vec<Notification>),
        (status = 404, description = "No account for this subject")
    )
)]
pub async fn list_notifications(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications = state.services.notifications().list(&caller, page).await?;
    Ok(Json(notifications))
}

#[utoipa::path(
    get,
    path = "/notifications/unread-count",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread notifications", body = CountResponse)
    )
)]
pub async fn unread_count(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
) -> AppResult<Json<CountResponse>> {
    let count = state.services.notifications().unread_count(&caller).await?;
    Ok(Json(CountResponse { count }))
}

#[utoipa::path(
    post,
    path = "/notifications",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification created", body = IdResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Only admins may notify other users"),
        (status = 404, description = "Recipient not found")
    )
)]
pub async fn create_notification(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateNotificationRequest>,
) -> AppResult<(StatusCode, Json<IdResponse>)> {
    let id = state
        .services
        .notifications()
        .create(&caller, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(id.into())))
}

#[utoipa::path(
    post,
    path = "/notifications/{id}/read",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked as read", body = IdResponse),
        (status = 403, description = "Notification belongs to another user"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn mark_as_read(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<IdResponse>> {
    let id = state.services.notifications().mark_as_read(&caller, id).await?;
    Ok(Json(id.into()))
}

#[utoipa::path(
    post,
    path = "/notifications/read-all",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Number of notifications marked", body = CountResponse)
    )
)]
pub async fn mark_all_as_read(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
) -> AppResult<Json<CountResponse>> {
    let count = state.services.notifications().mark_all_as_read(&caller).await?;
    Ok(Json(CountResponse { count }))
}

#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Notification deleted"),
        (status = 403, description = "Notification belongs to another user"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn delete_notification(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.services.notifications().delete(&caller, id).await?;
    Ok(NoContent)
}
