//! Admin handlers: pool governance, user roles, settings and the audit log.
//!
//! Every route here resolves the caller to an admin inside the service layer;
//! the handlers only translate HTTP payloads.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{
    AdminActionView, AuthenticatedCaller, NewPool, PoolStatus, PoolWithActors, SystemSetting,
    TargetType, UserResponse, UserRole,
};
use crate::errors::{AppError, AppResult};
use crate::services::DashboardStats;
use crate::types::{IdResponse, PageParams};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ApprovalRequest {
    pub approved: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StatusUpdateRequest {
    pub status: PoolStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentConfirmationRequest {
    #[validate(length(min = 1, message = "Actual invested amount is required"))]
    #[schema(example = "250000.00")]
    pub actual_invested: String,
    #[validate(length(min = 1, message = "Proof hash is required"))]
    pub proof_hash: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EmergencyRequest {
    #[validate(length(min = 1, message = "Action is required"))]
    #[schema(example = "halt_withdrawals")]
    pub action: String,
    #[validate(length(min = 1, message = "Reason is required"))]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ToggleActiveRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RoleUpdateRequest {
    pub role: UserRole,
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SettingUpdateRequest {
    #[schema(value_type = Object)]
    pub value: Value,
    pub description: Option<String>,
}

/// Exact-match user lookup; exactly one of the fields is used, email first
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserLookupQuery {
    pub email: Option<String>,
    pub wallet: Option<String>,
}

/// Audit log query. With `targetType` and `targetId` the full history of
/// that entity is returned and paging is ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AuditQuery {
    /// Number of records to skip
    pub offset: Option<u64>,
    /// Page size, capped at the server maximum
    pub limit: Option<u64>,
    pub target_type: Option<TargetType>,
    pub target_id: Option<String>,
}

/// Routes mounted at `/admin`
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/pools", get(list_all_pools).post(create_pool))
        .route("/pools/pending", get(pending_approvals))
        .route("/pools/:id/approval", post(approve_pool))
        .route("/pools/:id/status", post(update_pool_status))
        .route("/pools/:id/investment", post(confirm_investment))
        .route("/pools/:id/emergency", post(emergency_action))
        .route("/pools/:id/toggle-active", post(toggle_pool_active))
        .route("/stats", get(dashboard_stats))
        .route("/actions", get(admin_actions))
        .route("/users", get(list_users))
        .route("/users/lookup", get(lookup_user))
        .route("/users/:id/role", put(update_role))
        .route("/admins", get(list_admins))
        .route("/settings", get(list_settings))
        .route("/settings/:key", put(update_setting))
}

/// Create a pre-approved, active pool
#[utoipa::path(
    post,
    path = "/admin/pools",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = NewPool,
    responses(
        (status = 201, description = "Pool created", body = IdResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "Contract address already registered")
    )
)]
pub async fn create_pool(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    ValidatedJson(spec): ValidatedJson<NewPool>,
) -> AppResult<(StatusCode, Json<IdResponse>)> {
    let id = state.services.pools().create_pool(&caller, spec).await?;
    Ok((StatusCode::CREATED, Json(id.into())))
}

/// Approve or reject a submitted pool
#[utoipa::path(
    post,
    path = "/admin/pools/{id}/approval",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Pool ID")),
    request_body = ApprovalRequest,
    responses(
        (status = 200, description = "Decision recorded", body = IdResponse),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Pool not found")
    )
)]
pub async fn approve_pool(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ApprovalRequest>,
) -> AppResult<Json<IdResponse>> {
    let id = state
        .services
        .pools()
        .approve_pool(&caller, id, payload.approved, payload.reason)
        .await?;
    Ok(Json(id.into()))
}

#[utoipa::path(
    post,
    path = "/admin/pools/{id}/status",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Pool ID")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status changed", body = IdResponse),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Pool not found"),
        (status = 409, description = "Transition not allowed")
    )
)]
pub async fn update_pool_status(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<StatusUpdateRequest>,
) -> AppResult<Json<IdResponse>> {
    let id = state
        .services
        .pools()
        .update_pool_status(&caller, id, payload.status, payload.reason)
        .await?;
    Ok(Json(id.into()))
}

/// Record the off-chain investment and move the pool to INVESTED
#[utoipa::path(
    post,
    path = "/admin/pools/{id}/investment",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Pool ID")),
    request_body = InvestmentConfirmationRequest,
    responses(
        (status = 200, description = "Investment confirmed", body = IdResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Pool not found")
    )
)]
pub async fn confirm_investment(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<InvestmentConfirmationRequest>,
) -> AppResult<Json<IdResponse>> {
    let id = state
        .services
        .pools()
        .confirm_investment(&caller, id, payload.actual_invested, payload.proof_hash)
        .await?;
    Ok(Json(id.into()))
}

#[utoipa::path(
    post,
    path = "/admin/pools/{id}/emergency",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Pool ID")),
    request_body = EmergencyRequest,
    responses(
        (status = 200, description = "Pool moved to EMERGENCY", body = IdResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Pool not found")
    )
)]
pub async fn emergency_action(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<EmergencyRequest>,
) -> AppResult<Json<IdResponse>> {
    let id = state
        .services
        .pools()
        .emergency_action(&caller, id, payload.action, payload.reason)
        .await?;
    Ok(Json(id.into()))
}

/// Flip the pool's activity gate
#[utoipa::path(
    post,
    path = "/admin/pools/{id}/toggle-active",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Pool ID")),
    request_body = ToggleActiveRequest,
    responses(
        (status = 200, description = "Activity flag flipped", body = IdResponse),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Pool not found")
    )
)]
pub async fn toggle_pool_active(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ToggleActiveRequest>,
) -> AppResult<Json<IdResponse>> {
    let id = state
        .services
        .pools()
        .toggle_pool_active(&caller, id, payload.reason)
        .await?;
    Ok(Json(id.into()))
}

#[utoipa::path(
    get,
    path = "/admin/pools",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every pool with creator and approver", body = Vec<PoolWithActors>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_all_pools(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PoolWithActors>>> {
    let pools = state.services.admin().get_all_pools_for_admin(&caller).await?;
    Ok(Json(pools))
}

#[utoipa::path(
    get,
    path = "/admin/pools/pending",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pools awaiting a decision", body = Vec<PoolWithActors>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn pending_approvals(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PoolWithActors>>> {
    let pools = state.services.admin().get_pending_approvals(&caller).await?;
    Ok(Json(pools))
}

#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard aggregates", body = DashboardStats),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn dashboard_stats(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
) -> AppResult<Json<DashboardStats>> {
    let stats = state.services.admin().get_dashboard_stats(&caller).await?;
    Ok(Json(stats))
}

/// Audit log, newest first
#[utoipa::path(
    get,
    path = "/admin/actions",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(AuditQuery),
    responses(
        (status = 200, description = "Audit records with acting admin", body = Vec<AdminActionView>),
        (status = 400, description = "Only one of targetType and targetId given"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn admin_actions(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<Vec<AdminActionView>>> {
    let admin = state.services.admin();
    let actions = match (query.target_type, query.target_id) {
        (Some(target_type), Some(target_id)) => {
            admin.get_target_history(&caller, target_type, target_id).await?
        }
        (None, None) => {
            let page = PageParams {
                offset: query.offset,
                limit: query.limit,
            };
            admin.get_admin_actions(&caller, page).await?
        }
        _ => {
            return Err(AppError::BadRequest(
                "targetType and targetId must be given together".to_string(),
            ))
        }
    };
    Ok(Json(actions))
}

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All accounts", body = Vec<UserResponse>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_users(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.services.admin().list_users(&caller).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Find one account by email or wallet address
#[utoipa::path(
    get,
    path = "/admin/users/lookup",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(UserLookupQuery),
    responses(
        (status = 200, description = "Matching account", body = UserResponse),
        (status = 400, description = "Neither email nor wallet given"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn lookup_user(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    Query(query): Query<UserLookupQuery>,
) -> AppResult<Json<UserResponse>> {
    let admin = state.services.admin();
    let user = match (query.email, query.wallet) {
        (Some(email), _) => admin.get_user_by_email(&caller, &email).await?,
        (None, Some(wallet)) => admin.get_user_by_wallet(&caller, &wallet).await?,
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either email or wallet is required".to_string(),
            ))
        }
    };
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/admin/admins",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Accounts holding ADMIN or SUPER_ADMIN", body = Vec<UserResponse>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_admins(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let admins = state.services.admin().list_admins(&caller).await?;
    Ok(Json(admins.into_iter().map(UserResponse::from).collect()))
}

/// Change a user's role and permissions
#[utoipa::path(
    put,
    path = "/admin/users/{id}/role",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = RoleUpdateRequest,
    responses(
        (status = 200, description = "Role updated", body = IdResponse),
        (status = 403, description = "Admin access required; SUPER_ADMIN grants need a super admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_role(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<RoleUpdateRequest>,
) -> AppResult<Json<IdResponse>> {
    let id = state
        .services
        .admin()
        .update_role(&caller, id, payload.role, payload.permissions)
        .await?;
    Ok(Json(id.into()))
}

#[utoipa::path(
    get,
    path = "/admin/settings",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Platform settings", body = Vec<SystemSetting>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_settings(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SystemSetting>>> {
    let settings = state.services.admin().get_system_settings(&caller).await?;
    Ok(Json(settings))
}

/// Create or replace a platform setting (super admin)
#[utoipa::path(
    put,
    path = "/admin/settings/{key}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("key" = String, Path, description = "Setting key")),
    request_body = SettingUpdateRequest,
    responses(
        (status = 200, description = "Setting stored", body = IdResponse),
        (status = 403, description = "Super admin access required")
    )
)]
pub async fn update_setting(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    Path(key): Path<String>,
    ValidatedJson(payload): ValidatedJson<SettingUpdateRequest>,
) -> AppResult<Json<IdResponse>> {
    let id = state
        .services
        .admin()
        .update_system_setting(&caller, key, payload.value, payload.description)
        .await?;
    Ok(Json(id.into()))
}
