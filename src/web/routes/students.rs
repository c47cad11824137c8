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
        CrudRepository, ResourceTyped, check_access,
        entity::{
            Student, StudentCreate, StudentListRow, StudentProfileRow, StudentStats,
            StudentsByCountryRow,
        },
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        error::{ConflictError, ErrorResponse},
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(students_list_handler).post(students_create_handler))
        .route("/total", get(students_stats_handler))
        .route("/por-pais", get(students_by_country_handler))
        .route("/perfil/{usuario_id}", get(students_profile_handler))
        .route(
            "/{id}",
            put(students_update_handler).delete(students_delete_handler),
        )
        .route("/{id}/toggle-estado", put(students_toggle_handler))
        .layer(middleware::from_fn(middlewares::extract_context_fn))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/alumnos",
    description = "All students with their country joined in",
    responses(
        (status = 200, description = "Students collected", body = Vec<StudentListRow>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "students",
    security(("bearer" = []))
)]
pub(crate) async fn students_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let rows = StudentListRow::fetch_all(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    post,
    path = "/api/alumnos",
    description = "Creates a standalone student record (no linked user account)",
    request_body = StudentCreate,
    responses(
        (status = 200, description = "Student created", body = Student),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "students",
    security(("bearer" = []))
)]
pub(crate) async fn students_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<StudentCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin, UserRole::Instructor])?;

    let created = Student::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/alumnos/{id}",
    description = "Profile edit; nombre/email/pais mirror onto the linked user row",
    params(("id" = i64, Path, description = "Student to update")),
    request_body = StudentCreate,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Not your profile", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "students",
    security(("bearer" = []))
)]
pub(crate) async fn students_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StudentCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = Student::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Student::get_resource_type()))?;

    if !matches!(user.user_role(), UserRole::Admin | UserRole::Instructor) {
        check_access(state.pool(), user, &found, user.user_id())
            .await
            .map_err(|e| WebError::from_access_check(Student::get_resource_type(), e))?;
    }

    let updated = found
        .update(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    put,
    path = "/api/alumnos/{id}/toggle-estado",
    description = "Flips the student between ACTIVO and INACTIVO",
    params(("id" = i64, Path, description = "Student to toggle")),
    responses(
        (status = 200, description = "Status flipped"),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "students",
    security(("bearer" = []))
)]
pub(crate) async fn students_toggle_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin, UserRole::Instructor])?;

    let flipped = Student::toggle_estado(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?;

    if !flipped {
        return Err(WebError::resource_not_found(Student::get_resource_type()));
    }

    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/api/alumnos/{id}",
    description = "Deletes a student; refused while progress records exist",
    params(("id" = i64, Path, description = "Student to delete")),
    responses(
        (status = 200, description = "Student deleted"),
        (status = 400, description = "Student has progress records", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "students",
    security(("bearer" = []))
)]
pub(crate) async fn students_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin])?;

    let found = Student::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Student::get_resource_type()))?;

    let progress = Student::progress_count(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?;

    if progress > 0 {
        return Err(WebError::conflict(ConflictError::StudentHasProgress));
    }

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/alumnos/total",
    description = "Dashboard counters: total / active / inactive students and distinct countries",
    responses(
        (status = 200, description = "Stats computed", body = StudentStats),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "students",
    security(("bearer" = []))
)]
pub(crate) async fn students_stats_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let stats = StudentStats::fetch(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(stats)))
}

#[utoipa::path(
    get,
    path = "/api/alumnos/por-pais",
    description = "Student distribution grouped by country, largest first",
    responses(
        (status = 200, description = "Distribution computed", body = Vec<StudentsByCountryRow>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "students",
    security(("bearer" = []))
)]
pub(crate) async fn students_by_country_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let rows = StudentsByCountryRow::fetch_all(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    get,
    path = "/api/alumnos/perfil/{usuario_id}",
    description = "Student profile looked up by the owning user id",
    params(("usuario_id" = i64, Path, description = "User behind the profile")),
    responses(
        (status = 200, description = "Profile found", body = StudentProfileRow),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Not your profile", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "students",
    security(("bearer" = []))
)]
pub(crate) async fn students_profile_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(usuario_id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    if !matches!(user.user_role(), UserRole::Admin | UserRole::Instructor)
        && user.user_id() != usuario_id
    {
        return Err(WebError::resource_forbidden(Student::get_resource_type()));
    }

    let profile = StudentProfileRow::find_by_usuario_id(state.pool(), user, usuario_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Student::get_resource_type()))?;

    Ok((StatusCode::OK, Json(profile)))
}
