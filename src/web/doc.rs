use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub struct BearerAuthModifier;

impl Modify for BearerAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::auth::register_handler,
        crate::web::routes::auth::login_handler,
        crate::web::routes::auth::forgot_password_handler,
        crate::web::routes::auth::reset_password_handler,
        crate::web::routes::users::users_list_handler,
        crate::web::routes::users::users_update_handler,
        crate::web::routes::users::users_delete_handler,
        crate::web::routes::users::users_toggle_handler,
        crate::web::routes::students::students_list_handler,
        crate::web::routes::students::students_create_handler,
        crate::web::routes::students::students_update_handler,
        crate::web::routes::students::students_toggle_handler,
        crate::web::routes::students::students_delete_handler,
        crate::web::routes::students::students_stats_handler,
        crate::web::routes::students::students_by_country_handler,
        crate::web::routes::students::students_profile_handler,
        crate::web::routes::instructors::instructors_list_handler,
        crate::web::routes::instructors::instructors_create_handler,
        crate::web::routes::modules::modules_list_handler,
        crate::web::routes::modules::modules_with_lessons_handler,
        crate::web::routes::modules::modules_create_handler,
        crate::web::routes::modules::modules_update_handler,
        crate::web::routes::modules::modules_toggle_handler,
        crate::web::routes::modules::modules_delete_handler,
        crate::web::routes::lessons::lessons_list_handler,
        crate::web::routes::lessons::lessons_get_handler,
        crate::web::routes::lessons::lessons_create_handler,
        crate::web::routes::lessons::lessons_update_handler,
        crate::web::routes::lessons::lessons_toggle_handler,
        crate::web::routes::lessons::lessons_delete_handler,
        crate::web::routes::questions::questions_list_handler,
        crate::web::routes::questions::questions_by_lesson_handler,
        crate::web::routes::questions::questions_create_handler,
        crate::web::routes::questions::questions_update_handler,
        crate::web::routes::questions::questions_toggle_handler,
        crate::web::routes::progress::progress_list_handler,
        crate::web::routes::progress::progress_student_handler,
        crate::web::routes::progress::progress_create_handler,
        crate::web::routes::progress::progress_update_handler,
        crate::web::routes::roles::roles_list_handler,
        crate::web::routes::countries::countries_list_handler,
        crate::web::routes::countries::countries_batch_handler,
        crate::web::routes::continents::continents_list_handler,
        crate::web::routes::continents::continents_create_handler,
        crate::web::routes::continents::continents_update_handler,
        crate::web::routes::continents::continents_delete_handler,
        crate::web::routes::continents::continents_batch_handler,
    ),
    modifiers(&BearerAuthModifier),
)]
pub struct ApiDoc;
