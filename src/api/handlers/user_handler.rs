//! Account handlers: sign-in sync and self-service profile operations.

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{AdminAccess, AuthenticatedCaller, SignInProfile, UserResponse};
use crate::errors::AppResult;
use crate::types::{IdResponse, NoContent};

/// Sign-in payload forwarded by the identity provider callback
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncUserRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "investor@example.com")]
    pub email: String,
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    pub image: Option<String>,
    #[schema(example = "0x71c7656ec7ab88b098defb751b7401b5f6d8976f")]
    pub wallet_address: Option<String>,
}

impl From<SyncUserRequest> for SignInProfile {
    fn from(req: SyncUserRequest) -> Self {
        Self {
            email: req.email,
            name: req.name,
            image: req.image,
            wallet_address: req.wallet_address,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(url(message = "Image must be a URL"))]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWalletRequest {
    #[validate(length(equal = 42, message = "Wallet address must be 42 characters"))]
    #[schema(example = "0x71c7656ec7ab88b098defb751b7401b5f6d8976f")]
    pub wallet_address: String,
}

/// Routes mounted at `/auth`
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/sync", post(sync_user))
}

/// Routes mounted at `/me`
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_current_user).delete(delete_account))
        .route("/profile", put(update_profile))
        .route("/wallet", put(update_wallet).delete(remove_wallet))
        .route("/access", get(check_admin_access))
}

/// Create or re-link the caller's account on sign-in
#[utoipa::path(
    post,
    path = "/auth/sync",
    tag = "Account",
    security(("bearer_auth" = [])),
    request_body = SyncUserRequest,
    responses(
        (status = 200, description = "Account for the signed-in subject", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid identity token")
    )
)]
pub async fn sync_user(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SyncUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .services
        .users()
        .sync_user(&caller, payload.into())
        .await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Account",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Missing or invalid identity token"),
        (status = 404, description = "No account for this subject")
    )
)]
pub async fn get_current_user(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users().current_user(&caller).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/me/profile",
    tag = "Account",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = IdResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "No account for this subject")
    )
)]
pub async fn update_profile(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<IdResponse>> {
    let id = state
        .services
        .users()
        .update_profile(&caller, payload.name, payload.image)
        .await?;
    Ok(Json(id.into()))
}

/// Link a wallet address to the caller's account
#[utoipa::path(
    put,
    path = "/me/wallet",
    tag = "Account",
    security(("bearer_auth" = [])),
    request_body = UpdateWalletRequest,
    responses(
        (status = 200, description = "Wallet linked", body = IdResponse),
        (status = 400, description = "Malformed wallet address"),
        (status = 409, description = "Wallet linked to another account")
    )
)]
pub async fn update_wallet(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateWalletRequest>,
) -> AppResult<Json<IdResponse>> {
    let id = state
        .services
        .users()
        .update_wallet(&caller, payload.wallet_address)
        .await?;
    Ok(Json(id.into()))
}

#[utoipa::path(
    delete,
    path = "/me/wallet",
    tag = "Account",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Wallet unlinked", body = IdResponse),
        (status = 404, description = "No account for this subject")
    )
)]
pub async fn remove_wallet(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
) -> AppResult<Json<IdResponse>> {
    let id = state.services.users().remove_wallet(&caller).await?;
    Ok(Json(id.into()))
}

/// Permanently delete the caller's account
#[utoipa::path(
    delete,
    path = "/me",
    tag = "Account",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 404, description = "No account for this subject")
    )
)]
pub async fn delete_account(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
) -> AppResult<NoContent> {
    state.services.users().delete_account(&caller).await?;
    Ok(NoContent)
}

#[utoipa::path(
    get,
    path = "/me/access",
    tag = "Account",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Admin capabilities of the caller", body = AdminAccess)
    )
)]
pub async fn check_admin_access(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
) -> AppResult<Json<AdminAccess>> {
    let access = state.services.users().check_admin_access(&caller).await?;
    Ok(Json(access))
}
