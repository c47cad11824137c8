use axum::{
    Json, Router, extract::State, http::StatusCode, middleware, response::IntoResponse,
    routing::get,
};

use crate::{
    model::{ResourceTyped, entity::Role},
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult, error::ErrorResponse, middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(roles_list_handler))
        .layer(middleware::from_fn(middlewares::extract_context_fn))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/roles",
    description = "Role reference data (admin only)",
    responses(
        (status = 200, description = "Roles collected", body = Vec<Role>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "reference",
    security(("bearer" = []))
)]
pub(crate) async fn roles_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin])?;

    let roles = Role::list(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Role::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(roles)))
}
