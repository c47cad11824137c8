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
        entity::{Lesson, Question, QuestionCreate, QuestionListRow},
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(questions_list_handler).post(questions_create_handler))
        .route("/leccion/{leccion_id}", get(questions_by_lesson_handler))
        .route("/{id}", put(questions_update_handler))
        .route("/{id}/toggle-estado", put(questions_toggle_handler))
        .layer(middleware::from_fn(middlewares::extract_context_fn))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/preguntas",
    description = "All questions ordered by module, lesson and position",
    responses(
        (status = 200, description = "Questions collected", body = Vec<QuestionListRow>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "questions",
    security(("bearer" = []))
)]
pub(crate) async fn questions_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let rows = QuestionListRow::fetch_all(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    get,
    path = "/api/preguntas/leccion/{leccion_id}",
    description = "Questions of one lesson in order",
    params(("leccion_id" = i64, Path, description = "Lesson to list questions for")),
    responses(
        (status = 200, description = "Questions collected", body = Vec<QuestionListRow>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "questions",
    security(("bearer" = []))
)]
pub(crate) async fn questions_by_lesson_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(leccion_id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let lesson = Lesson::find_by_id(state.pool(), user, leccion_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    if lesson.is_none() {
        return Err(WebError::resource_not_found(Lesson::get_resource_type()));
    }

    let rows = QuestionListRow::fetch_by_lesson(state.pool(), user, leccion_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    post,
    path = "/api/preguntas",
    description = "Creates a question under an existing lesson",
    request_body = QuestionCreate,
    responses(
        (status = 200, description = "Question created", body = Question),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "questions",
    security(("bearer" = []))
)]
pub(crate) async fn questions_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin, UserRole::Instructor])?;

    let created = Question::create(state.pool(), user, payload)
        .await
        .map_err(|e| {
            if e.is_fk_violation() {
                WebError::resource_not_found(Lesson::get_resource_type())
            } else {
                WebError::resource_fetch_error(Question::get_resource_type(), e)
            }
        })?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/preguntas/{id}",
    description = "Updates a question",
    params(("id" = i64, Path, description = "Question to update")),
    request_body = QuestionCreate,
    responses(
        (status = 200, description = "Question updated", body = Question),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "questions",
    security(("bearer" = []))
)]
pub(crate) async fn questions_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<QuestionCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin, UserRole::Instructor])?;

    let found = Question::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Question::get_resource_type()))?;

    let updated = found
        .update(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    put,
    path = "/api/preguntas/{id}/toggle-estado",
    description = "Flips the question between ACTIVO and INACTIVO",
    params(("id" = i64, Path, description = "Question to toggle")),
    responses(
        (status = 200, description = "Status flipped"),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "questions",
    security(("bearer" = []))
)]
pub(crate) async fn questions_toggle_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin, UserRole::Instructor])?;

    let flipped = Question::toggle_estado(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    if !flipped {
        return Err(WebError::resource_not_found(Question::get_resource_type()));
    }

    Ok(StatusCode::OK)
}
