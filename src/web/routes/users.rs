use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;

use crate::{
    model::{
        CrudRepository, ResourceTyped, check_access,
        entity::{UserEntity, UserEntityCreate},
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        error::{ConflictError, ErrorResponse},
        middlewares,
    },
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UserUpdateBody {
    pub nombre: String,
    pub email: String,
    pub pais_id: Option<i64>,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(users_list_handler))
        .route(
            "/{id}",
            get(users_get_handler)
                .put(users_update_handler)
                .delete(users_delete_handler),
        )
        .route("/toggle-estado/{id}", put(users_toggle_handler))
        .layer(middleware::from_fn(middlewares::extract_context_fn))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/usuarios",
    description = "All user accounts (admin only)",
    responses(
        (status = 200, description = "Users collected", body = Vec<UserEntity>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub(crate) async fn users_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin])?;

    let users = UserEntity::list(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(users)))
}

pub(crate) async fn users_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = UserEntity::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    Ok((StatusCode::OK, Json(found)))
}

#[utoipa::path(
    put,
    path = "/api/usuarios/{id}",
    description = "Updates an account; self or admin",
    params(("id" = i64, Path, description = "User to update")),
    request_body = UserUpdateBody,
    responses(
        (status = 200, description = "User updated", body = UserEntity),
        (status = 400, description = "Email already in use", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Not your account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub(crate) async fn users_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = UserEntity::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    check_access(state.pool(), user, &found, user.user_id())
        .await
        .map_err(|e| WebError::from_access_check(UserEntity::get_resource_type(), e))?;

    let conflict = UserEntity::find_by_email(state.pool(), user, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if conflict.is_some_and(|c| c.id() != id) {
        return Err(WebError::conflict(ConflictError::DuplicateUser));
    }

    let data = UserEntityCreate {
        nombre: payload.nombre,
        email: payload.email,
        password_hash: String::new(), // not in use
        rol_id: found.rol_id(),
        pais_id: payload.pais_id,
    };

    let updated = found
        .update(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/usuarios/{id}",
    description = "Deletes an account (admin only)",
    params(("id" = i64, Path, description = "User to delete")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub(crate) async fn users_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin])?;

    let found = UserEntity::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    put,
    path = "/api/usuarios/toggle-estado/{id}",
    description = "Flips the account between ACTIVO and INACTIVO",
    params(("id" = i64, Path, description = "User to toggle")),
    responses(
        (status = 200, description = "Status flipped"),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub(crate) async fn users_toggle_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin])?;

    let flipped = UserEntity::toggle_estado(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if !flipped {
        return Err(WebError::resource_not_found(UserEntity::get_resource_type()));
    }

    Ok(StatusCode::OK)
}
