use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{Country, CountryCreate},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult,
        error::ErrorResponse,
        middlewares,
    },
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CountryBatchBody {
    pub paises: Vec<CountryCreate>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CountryBatchItemError {
    pub nombre_pais: String,
    pub error: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CountryBatchResult {
    pub exitosos: Vec<Country>,
    pub fallidos: Vec<CountryBatchItemError>,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/batch", post(countries_batch_handler))
        .layer(middleware::from_fn(middlewares::extract_context_fn));

    Router::new()
        .route("/", get(countries_list_handler))
        .merge(protected)
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/paises",
    description = "Country reference data, public",
    responses(
        (status = 200, description = "Countries collected", body = Vec<Country>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "reference"
)]
pub(crate) async fn countries_list_handler(State(state): State<AppState>) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let countries = Country::list(state.pool(), &admin)
        .await
        .map_err(|e| WebError::resource_fetch_error(Country::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(countries)))
}

#[utoipa::path(
    post,
    path = "/api/paises/batch",
    description = "Bulk country insert (admin only). Items failing the continent check or \
                   duplicating an existing country are reported per item; the whole batch \
                   rolls back only when nothing could be inserted",
    request_body = CountryBatchBody,
    responses(
        (status = 200, description = "At least one country inserted", body = CountryBatchResult),
        (status = 400, description = "Nothing could be inserted", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "reference",
    security(("bearer" = []))
)]
pub(crate) async fn countries_batch_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CountryBatchBody>,
) -> WebResult<impl IntoResponse> {
    ctx.require_role(&[UserRole::Admin])?;

    if payload.paises.is_empty() {
        return Err(WebError::validation("paises must be a non-empty array"));
    }

    let fetch_err =
        |e| WebError::resource_fetch_error(Country::get_resource_type(), e);

    let mut tx = state.pool().begin().await.map_err(fetch_err)?;

    let mut exitosos = Vec::new();
    let mut fallidos = Vec::new();

    for pais in payload.paises {
        let continent_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM continentes WHERE continente_id = $1)",
        )
        .bind(pais.continente_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| fetch_err(e.into()))?;

        if !continent_exists {
            fallidos.push(CountryBatchItemError {
                nombre_pais: pais.nombre_pais,
                error: String::from("continent does not exist"),
            });
            continue;
        }

        // checked inside the transaction rather than relying on the unique
        // key: a failed INSERT would abort the whole Postgres transaction
        let duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM paises WHERE nombre_pais = $1 AND continente_id = $2)",
        )
        .bind(&pais.nombre_pais)
        .bind(pais.continente_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| fetch_err(e.into()))?;

        if duplicate {
            fallidos.push(CountryBatchItemError {
                nombre_pais: pais.nombre_pais,
                error: String::from("country already exists in this continent"),
            });
            continue;
        }

        let created: Country = sqlx::query_as(
            "INSERT INTO paises (nombre_pais, continente_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(&pais.nombre_pais)
        .bind(pais.continente_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| fetch_err(e.into()))?;

        exitosos.push(created);
    }

    if exitosos.is_empty() {
        // dropping the transaction rolls it back
        return Err(WebError::validation("no country could be inserted"));
    }

    tx.commit().await.map_err(|e| fetch_err(e.into()))?;

    Ok((
        StatusCode::OK,
        Json(CountryBatchResult { exitosos, fallidos }),
    ))
}
