use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};

use crate::{
    model::{
        ResourceTyped,
        entity::{Instructor, InstructorCreate},
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/",
            get(instructors_list_handler).post(instructors_create_handler),
        )
        .layer(middleware::from_fn(middlewares::extract_context_fn))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/instructores",
    description = "All instructors",
    responses(
        (status = 200, description = "Instructors collected", body = Vec<Instructor>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "instructors",
    security(("bearer" = []))
)]
pub(crate) async fn instructors_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let rows = Instructor::list(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Instructor::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    post,
    path = "/api/instructores",
    description = "Creates an instructor (admin only)",
    request_body = InstructorCreate,
    responses(
        (status = 200, description = "Instructor created", body = Instructor),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "instructors",
    security(("bearer" = []))
)]
pub(crate) async fn instructors_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<InstructorCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin])?;

    let created = Instructor::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Instructor::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(created)))
}
