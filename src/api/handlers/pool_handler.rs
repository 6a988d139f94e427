//! Public pool handlers: catalogue reads and user submissions.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{AuthenticatedCaller, NewPool, Pool};
use crate::errors::{AppError, AppResult};
use crate::types::IdResponse;

impl Validate for NewPool {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self.ensure_valid() {
            Ok(()) => Ok(()),
            Err(err) => {
                let mut error = ValidationError::new("pool");
                error.message = Some(pool_error_message(err).into());

                let mut errors = ValidationErrors::new();
                errors.add("pool", error);
                Err(errors)
            }
        }
    }
}

fn pool_error_message(err: AppError) -> String {
    match err {
        AppError::Validation(message) => message,
        other => other.to_string(),
    }
}

/// Routes mounted at `/pools`
pub fn pool_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pools))
        .route("/submissions", post(submit_pool))
        .route("/:id", get(get_pool))
}

/// Approved and active pools
#[utoipa::path(
    get,
    path = "/pools",
    tag = "Pools",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pools open to investors", body = Vec<Pool>)
    )
)]
pub async fn list_pools(State(state): State<AppState>) -> AppResult<Json<Vec<Pool>>> {
    let pools = state.services.pools().list_pools().await?;
    Ok(Json(pools))
}

#[utoipa::path(
    get,
    path = "/pools/{id}",
    tag = "Pools",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Pool ID")
    ),
    responses(
        (status = 200, description = "Pool", body = Pool),
        (status = 404, description = "Pool not found")
    )
)]
pub async fn get_pool(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Pool>> {
    let pool = state.services.pools().get_pool(id).await?;
    Ok(Json(pool))
}

/// Submit a pool for admin review
#[utoipa::path(
    post,
    path = "/pools/submissions",
    tag = "Pools",
    security(("bearer_auth" = [])),
    request_body = NewPool,
    responses(
        (status = 201, description = "Pool submitted, pending approval", body = IdResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Contract address already registered")
    )
)]
pub async fn submit_pool(
    Extension(caller): Extension<AuthenticatedCaller>,
    State(state): State<AppState>,
    ValidatedJson(spec): ValidatedJson<NewPool>,
) -> AppResult<(StatusCode, Json<IdResponse>)> {
    let id = state.services.pools().submit_pool(&caller, spec).await?;
    Ok((StatusCode::CREATED, Json(id.into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::fixtures::discounted_spec;

    #[test]
    fn pool_validation_reports_the_domain_message() {
        let mut spec = discounted_spec("0xabc");
        spec.discount_rate = None;

        let errors = spec.validate().unwrap_err();
        let message = errors.field_errors()["pool"][0]
            .message
            .as_ref()
            .map(|m| m.to_string());
        assert_eq!(
            message.as_deref(),
            Some("Discounted instruments require a discount rate")
        );
    }
}
