use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use crate::{
    model::{
        CrudRepository, ResourceTyped, check_access,
        entity::{
            AnswerUpdate, Lesson, LessonProgress, LessonProgressCreate, ProgressDetailRow,
            ProgressOverviewRow, Student,
        },
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        error::{ConflictError, ErrorResponse},
        middlewares,
    },
};

/// Answer submission body. `estado` is still accepted so existing clients
/// keep working, but completion is derived from the counters server-side;
/// the declared value is never trusted.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ProgressUpdateBody {
    pub total_preguntas_respondidas: i32,
    pub ultima_pregunta_respondida: Option<i64>,
    #[allow(unused)]
    pub estado: Option<String>,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(progress_list_handler).post(progress_create_handler))
        .route(
            "/{id}",
            get(progress_student_handler).put(progress_update_handler),
        )
        .layer(middleware::from_fn(middlewares::extract_context_fn))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/progreso-alumnos",
    description = "Progress of every student, one row per started lesson",
    responses(
        (status = 200, description = "Progress collected", body = Vec<ProgressOverviewRow>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "progress",
    security(("bearer" = []))
)]
pub(crate) async fn progress_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin, UserRole::Instructor])?;

    let rows = ProgressOverviewRow::fetch_all(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    get,
    path = "/api/progreso-alumnos/{alumno_id}",
    description = "One student's progress, with the per-module aggregate left-joined in",
    params(("alumno_id" = i64, Path, description = "Student to inspect")),
    responses(
        (status = 200, description = "Progress collected", body = Vec<ProgressDetailRow>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Not your progress", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "progress",
    security(("bearer" = []))
)]
pub(crate) async fn progress_student_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(alumno_id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let student = Student::find_by_id(state.pool(), user, alumno_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Student::get_resource_type()))?;

    if !matches!(user.user_role(), UserRole::Admin | UserRole::Instructor) {
        check_access(state.pool(), user, &student, user.user_id())
            .await
            .map_err(|e| WebError::from_access_check(Student::get_resource_type(), e))?;
    }

    let rows = ProgressDetailRow::fetch_by_student(state.pool(), user, alumno_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    post,
    path = "/api/progreso-alumnos",
    description = "startLesson: opens a progress record for a (student, lesson) pair",
    request_body = LessonProgressCreate,
    responses(
        (status = 200, description = "Progress record created", body = LessonProgress),
        (status = 400, description = "Progress already exists for this pair", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 404, description = "Student or lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "progress",
    security(("bearer" = []))
)]
pub(crate) async fn progress_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<LessonProgressCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    if payload.total_preguntas < 0 {
        return Err(WebError::validation("total_preguntas must not be negative"));
    }

    let student = Student::find_by_id(state.pool(), user, payload.alumno_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Student::get_resource_type()))?;

    let lesson = Lesson::find_by_id(state.pool(), user, payload.leccion_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    if lesson.is_none() {
        return Err(WebError::resource_not_found(Lesson::get_resource_type()));
    }

    if !matches!(user.user_role(), UserRole::Admin | UserRole::Instructor) {
        check_access(state.pool(), user, &student, user.user_id())
            .await
            .map_err(|e| WebError::from_access_check(Student::get_resource_type(), e))?;
    }

    let existing =
        LessonProgress::find_by_pair(state.pool(), user, payload.alumno_id, payload.leccion_id)
            .await
            .map_err(|e| {
                WebError::resource_fetch_error(LessonProgress::get_resource_type(), e)
            })?;

    if existing.is_some() {
        return Err(WebError::conflict(ConflictError::ProgressExists));
    }

    let created = LessonProgress::create(state.pool(), user, payload)
        .await
        .map_err(|e| {
            // two concurrent starts can both pass the existence check; the
            // unique key decides, and the loser reads as the same conflict
            if e.is_unique_violation() {
                WebError::conflict(ConflictError::ProgressExists)
            } else {
                WebError::resource_fetch_error(LessonProgress::get_resource_type(), e)
            }
        })?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/progreso-alumnos/{id}",
    description = "recordAnswer: updates the counters; completion is recomputed server-side \
                   and the module aggregate rolls up in the same transaction",
    params(("id" = i64, Path, description = "Progress record to update")),
    request_body = ProgressUpdateBody,
    responses(
        (status = 200, description = "Progress updated", body = LessonProgress),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Not your progress", body = ErrorResponse),
        (status = 404, description = "Progress record not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "progress",
    security(("bearer" = []))
)]
pub(crate) async fn progress_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProgressUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    if payload.total_preguntas_respondidas < 0 {
        return Err(WebError::validation(
            "total_preguntas_respondidas must not be negative",
        ));
    }

    let found = LessonProgress::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(LessonProgress::get_resource_type()))?;

    if !matches!(user.user_role(), UserRole::Admin | UserRole::Instructor) {
        check_access(state.pool(), user, &found, user.user_id())
            .await
            .map_err(|e| WebError::from_access_check(LessonProgress::get_resource_type(), e))?;
    }

    let data = AnswerUpdate {
        total_preguntas_respondidas: payload.total_preguntas_respondidas,
        ultima_pregunta_respondida: payload.ultima_pregunta_respondida,
    };

    let updated = LessonProgress::record_answer(state.pool(), user, id, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(LessonProgress::get_resource_type()))?;

    Ok((StatusCode::OK, Json(updated)))
}
