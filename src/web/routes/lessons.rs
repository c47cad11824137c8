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
        entity::{Lesson, LessonCreate, LessonListRow, Module},
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        error::{ConflictError, ErrorResponse},
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(lessons_list_handler).post(lessons_create_handler))
        .route(
            "/{id}",
            get(lessons_get_handler)
                .put(lessons_update_handler)
                .delete(lessons_delete_handler),
        )
        .route("/{id}/toggle-estado", put(lessons_toggle_handler))
        .layer(middleware::from_fn(middlewares::extract_context_fn))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/lecciones",
    description = "All lessons with module and instructor names joined in",
    responses(
        (status = 200, description = "Lessons collected", body = Vec<LessonListRow>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lessons",
    security(("bearer" = []))
)]
pub(crate) async fn lessons_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let rows = LessonListRow::fetch_all(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    get,
    path = "/api/lecciones/{id}",
    description = "One lesson with its content",
    params(("id" = i64, Path, description = "Lesson to get")),
    responses(
        (status = 200, description = "Lesson found", body = LessonListRow),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lessons",
    security(("bearer" = []))
)]
pub(crate) async fn lessons_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let lesson = LessonListRow::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    Ok((StatusCode::OK, Json(lesson)))
}

#[utoipa::path(
    post,
    path = "/api/lecciones",
    description = "Creates a lesson under an existing module",
    request_body = LessonCreate,
    responses(
        (status = 200, description = "Lesson created", body = Lesson),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lessons",
    security(("bearer" = []))
)]
pub(crate) async fn lessons_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<LessonCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin, UserRole::Instructor])?;

    let module = Module::find_by_id(state.pool(), user, payload.modulo_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    if module.is_none() {
        return Err(WebError::resource_not_found(Module::get_resource_type()));
    }

    let created = Lesson::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/lecciones/{id}",
    description = "Updates a lesson",
    params(("id" = i64, Path, description = "Lesson to update")),
    request_body = LessonCreate,
    responses(
        (status = 200, description = "Lesson updated", body = Lesson),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lessons",
    security(("bearer" = []))
)]
pub(crate) async fn lessons_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<LessonCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin, UserRole::Instructor])?;

    let found = Lesson::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    let updated = found
        .update(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    put,
    path = "/api/lecciones/{id}/toggle-estado",
    description = "Flips the lesson between ACTIVO and INACTIVO",
    params(("id" = i64, Path, description = "Lesson to toggle")),
    responses(
        (status = 200, description = "Status flipped"),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lessons",
    security(("bearer" = []))
)]
pub(crate) async fn lessons_toggle_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin, UserRole::Instructor])?;

    let flipped = Lesson::toggle_estado(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    if !flipped {
        return Err(WebError::resource_not_found(Lesson::get_resource_type()));
    }

    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/api/lecciones/{id}",
    description = "Deletes a lesson; refused while progress or question rows depend on it",
    params(("id" = i64, Path, description = "Lesson to delete")),
    responses(
        (status = 200, description = "Lesson deleted"),
        (status = 400, description = "Lesson has dependents", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lessons",
    security(("bearer" = []))
)]
pub(crate) async fn lessons_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin, UserRole::Instructor])?;

    let found = Lesson::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    let dependents = Lesson::dependents_count(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    if dependents > 0 {
        return Err(WebError::conflict(ConflictError::LessonHasDependents));
    }

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}
