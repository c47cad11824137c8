use crate::{
    Config,
    web::{AppState, doc::ApiDoc},
};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod continents;
pub mod countries;
pub mod instructors;
pub mod lessons;
pub mod modules;
pub mod progress;
pub mod questions;
pub mod roles;
pub mod students;
pub mod users;

pub fn build_app<S: Send + Sync + Clone + 'static>(
    state: AppState,
    config: &'static Config,
) -> Router<S> {
    let mut router = Router::new()
        .nest("/api/auth", auth::routes(state.clone()))
        .nest("/api/usuarios", users::routes(state.clone()))
        .nest("/api/alumnos", students::routes(state.clone()))
        .nest("/api/instructores", instructors::routes(state.clone()))
        .nest("/api/modulos", modules::routes(state.clone()))
        .nest("/api/lecciones", lessons::routes(state.clone()))
        .nest("/api/preguntas", questions::routes(state.clone()))
        .nest("/api/progreso-alumnos", progress::routes(state.clone()))
        .nest("/api/roles", roles::routes(state.clone()))
        .nest("/api/paises", countries::routes(state.clone()))
        .nest("/api/continentes", continents::routes(state.clone()))
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    if config.app().docs() {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/docs").url("/api-doc/openapi.json", openapi));
    }

    router
}
