use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
};

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{Module, ModuleCreate, ModuleWithLessonsRow},
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        dto::modules::ModuleWithLessons,
        error::{ConflictError, ErrorResponse},
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(modules_list_handler).post(modules_create_handler))
        .route("/con-lecciones", get(modules_with_lessons_handler))
        .route(
            "/{id}",
            put(modules_update_handler).delete(modules_delete_handler),
        )
        .route("/{id}/toggle-estado", put(modules_toggle_handler))
        .layer(middleware::from_fn(middlewares::extract_context_fn))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/modulos",
    description = "All modules, newest start date first",
    responses(
        (status = 200, description = "Modules collected", body = Vec<Module>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "modules",
    security(("bearer" = []))
)]
pub(crate) async fn modules_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let modules = Module::list(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(modules)))
}

#[utoipa::path(
    get,
    path = "/api/modulos/con-lecciones",
    description = "Modules with their lessons aggregated in, for the course overview screen",
    responses(
        (status = 200, description = "Modules collected", body = Vec<ModuleWithLessons>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "modules",
    security(("bearer" = []))
)]
pub(crate) async fn modules_with_lessons_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let rows = ModuleWithLessonsRow::fetch_all(state.pool(), user)
        .await
        .and_then(ModuleWithLessons::from_rows)
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    post,
    path = "/api/modulos",
    description = "Creates a module",
    request_body = ModuleCreate,
    responses(
        (status = 200, description = "Module created", body = Module),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Referenced instructor does not exist", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "modules",
    security(("bearer" = []))
)]
pub(crate) async fn modules_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<ModuleCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin, UserRole::Instructor])?;

    let created = Module::create(state.pool(), user, payload)
        .await
        .map_err(|e| {
            if e.is_fk_violation() {
                WebError::resource_not_found(crate::model::ResourceType::Instructor)
            } else {
                WebError::resource_fetch_error(Module::get_resource_type(), e)
            }
        })?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/modulos/{id}",
    description = "Updates a module",
    params(("id" = i64, Path, description = "Module to update")),
    request_body = ModuleCreate,
    responses(
        (status = 200, description = "Module updated", body = Module),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "modules",
    security(("bearer" = []))
)]
pub(crate) async fn modules_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ModuleCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin, UserRole::Instructor])?;

    let found = Module::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Module::get_resource_type()))?;

    let updated = found
        .update(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    put,
    path = "/api/modulos/{id}/toggle-estado",
    description = "Flips the module between ACTIVO and INACTIVO",
    params(("id" = i64, Path, description = "Module to toggle")),
    responses(
        (status = 200, description = "Status flipped"),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "modules",
    security(("bearer" = []))
)]
pub(crate) async fn modules_toggle_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin, UserRole::Instructor])?;

    let flipped = Module::toggle_estado(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    if !flipped {
        return Err(WebError::resource_not_found(Module::get_resource_type()));
    }

    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/api/modulos/{id}",
    description = "Deletes a module; refused while it still has lessons",
    params(("id" = i64, Path, description = "Module to delete")),
    responses(
        (status = 200, description = "Module deleted"),
        (status = 400, description = "Module has lessons", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "modules",
    security(("bearer" = []))
)]
pub(crate) async fn modules_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin, UserRole::Instructor])?;

    let found = Module::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Module::get_resource_type()))?;

    let lessons = Module::lessons_count(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    if lessons > 0 {
        return Err(WebError::conflict(ConflictError::ModuleHasLessons));
    }

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}
