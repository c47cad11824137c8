use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{Continent, ContinentCreate},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult,
        error::{ConflictError, ErrorResponse},
        middlewares,
    },
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ContinentBatchBody {
    pub continentes: Vec<ContinentCreate>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ContinentBatchItemError {
    pub nombre_continente: String,
    pub error: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ContinentBatchResult {
    pub exitosos: Vec<Continent>,
    pub fallidos: Vec<ContinentBatchItemError>,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/", post(continents_create_handler))
        .route("/batch", post(continents_batch_handler))
        .route(
            "/{id}",
            put(continents_update_handler).delete(continents_delete_handler),
        )
        .layer(middleware::from_fn(middlewares::extract_context_fn));

    Router::new()
        .route("/", get(continents_list_handler))
        .route("/{id}", get(continents_get_handler))
        .merge(protected)
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/continentes",
    description = "Continent reference data, public",
    responses(
        (status = 200, description = "Continents collected", body = Vec<Continent>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "reference"
)]
pub(crate) async fn continents_list_handler(State(state): State<AppState>) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let continents = Continent::list(state.pool(), &admin)
        .await
        .map_err(|e| WebError::resource_fetch_error(Continent::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(continents)))
}

pub(crate) async fn continents_get_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let found = Continent::find_by_id(state.pool(), &admin, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Continent::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Continent::get_resource_type()))?;

    Ok((StatusCode::OK, Json(found)))
}

#[utoipa::path(
    post,
    path = "/api/continentes",
    description = "Creates a continent (admin only)",
    request_body = ContinentCreate,
    responses(
        (status = 200, description = "Continent created", body = Continent),
        (status = 400, description = "Continent already exists", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "reference",
    security(("bearer" = []))
)]
pub(crate) async fn continents_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<ContinentCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin])?;

    if payload.nombre_continente.trim().is_empty() {
        return Err(WebError::validation("nombre_continente is required"));
    }

    let created = Continent::create(state.pool(), user, payload)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                WebError::conflict(ConflictError::DuplicateEntry {
                    detail: String::from("continent already exists"),
                })
            } else {
                WebError::resource_fetch_error(Continent::get_resource_type(), e)
            }
        })?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/continentes/{id}",
    description = "Updates a continent (admin only)",
    params(("id" = i64, Path, description = "Continent to update")),
    request_body = ContinentCreate,
    responses(
        (status = 200, description = "Continent updated", body = Continent),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Continent not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "reference",
    security(("bearer" = []))
)]
pub(crate) async fn continents_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ContinentCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin])?;

    let found = Continent::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Continent::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Continent::get_resource_type()))?;

    let updated = found
        .update(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Continent::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/continentes/{id}",
    description = "Deletes a continent (admin only)",
    params(("id" = i64, Path, description = "Continent to delete")),
    responses(
        (status = 200, description = "Continent deleted"),
        (status = 400, description = "Continent still referenced by countries", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Continent not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "reference",
    security(("bearer" = []))
)]
pub(crate) async fn continents_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_role(&[UserRole::Admin])?;

    let found = Continent::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Continent::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Continent::get_resource_type()))?;

    found.delete(state.pool(), user).await.map_err(|e| {
        if e.is_fk_violation() {
            WebError::conflict(ConflictError::DuplicateEntry {
                detail: String::from("continent still has countries"),
            })
        } else {
            WebError::resource_fetch_error(Continent::get_resource_type(), e)
        }
    })?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/continentes/batch",
    description = "Bulk continent insert (admin only); duplicates are reported per item and \
                   the batch rolls back only when nothing could be inserted",
    request_body = ContinentBatchBody,
    responses(
        (status = 200, description = "At least one continent inserted", body = ContinentBatchResult),
        (status = 400, description = "Nothing could be inserted", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "reference",
    security(("bearer" = []))
)]
pub(crate) async fn continents_batch_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<ContinentBatchBody>,
) -> WebResult<impl IntoResponse> {
    ctx.require_role(&[UserRole::Admin])?;

    if payload.continentes.is_empty() {
        return Err(WebError::validation("continentes must be a non-empty array"));
    }

    let fetch_err = |e| WebError::resource_fetch_error(Continent::get_resource_type(), e);

    let mut tx = state.pool().begin().await.map_err(fetch_err)?;

    let mut exitosos = Vec::new();
    let mut fallidos = Vec::new();

    for continente in payload.continentes {
        if continente.nombre_continente.trim().is_empty() {
            fallidos.push(ContinentBatchItemError {
                nombre_continente: continente.nombre_continente,
                error: String::from("nombre_continente is required"),
            });
            continue;
        }

        // checked inside the transaction rather than relying on the unique
        // key: a failed INSERT would abort the whole Postgres transaction
        let duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM continentes WHERE nombre_continente = $1)",
        )
        .bind(&continente.nombre_continente)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| fetch_err(e.into()))?;

        if duplicate {
            fallidos.push(ContinentBatchItemError {
                nombre_continente: continente.nombre_continente,
                error: String::from("continent already exists"),
            });
            continue;
        }

        let created: Continent = sqlx::query_as(
            "INSERT INTO continentes (nombre_continente) VALUES ($1) RETURNING *",
        )
        .bind(&continente.nombre_continente)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| fetch_err(e.into()))?;

        exitosos.push(created);
    }

    if exitosos.is_empty() {
        // dropping the transaction rolls it back
        return Err(WebError::validation("no continent could be inserted"));
    }

    tx.commit().await.map_err(|e| fetch_err(e.into()))?;

    Ok((
        StatusCode::OK,
        Json(ContinentBatchResult { exitosos, fallidos }),
    ))
}
