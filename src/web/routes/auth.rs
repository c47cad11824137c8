use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::Duration;

use crate::{
    Config, auth,
    auth::{UserClaims, hash_password, verify_password},
    model::{
        ResourceTyped,
        entity::{RecordStatus, RegisterStudent, UserEntity},
    },
    web::{
        AppState, AuthenticatedUser, WebError, WebResult,
        dto::auth::{
            AuthUser, ForgotPasswordRequest, LoginRequest, LoginResponse, MsgResponse,
            RegisterRequest, RegisterResponse, ResetPasswordRequest,
        },
        error::{ConflictError, ErrorResponse},
    },
};

const SESSION_TOKEN_HOURS: i64 = 24;
const RESET_TOKEN_HOURS: i64 = 1;

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/login", post(login_handler))
        .route("/register", post(register_handler))
        .route("/forgot-password", post(forgot_password_handler))
        .route("/reset-password", post(reset_password_handler))
        .with_state(state)
}

fn validate_registration(payload: &RegisterRequest) -> WebResult<()> {
    if payload.nombre.trim().is_empty() {
        return Err(WebError::validation("nombre is required"));
    }
    if !payload.email.contains('@') {
        return Err(WebError::validation("email is invalid"));
    }
    if payload.password.chars().count() < 6 {
        return Err(WebError::validation("password must be at least 6 characters"));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    description = "Self-registration: creates the user and its linked student record as one unit",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created, session token issued", body = RegisterResponse),
        (status = 400, description = "Validation failed or email already registered", body = ErrorResponse),
        (status = 404, description = "Referenced country does not exist", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub(crate) async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> WebResult<impl IntoResponse> {
    validate_registration(&payload)?;

    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_email(state.pool(), &admin, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if found.is_some() {
        return Err(WebError::conflict(ConflictError::DuplicateUser));
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let data = RegisterStudent {
        nombre: payload.nombre.clone(),
        email: payload.email.clone(),
        password_hash: hash,
        telefono: payload.telefono,
        pais_id: payload.pais_id,
    };

    let (usuario_id, _alumno_id) = UserEntity::register_student(state.pool(), &admin, data)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                WebError::conflict(ConflictError::DuplicateUser)
            } else if e.is_fk_violation() {
                WebError::resource_not_found(crate::model::ResourceType::Country)
            } else {
                WebError::resource_fetch_error(UserEntity::get_resource_type(), e)
            }
        })?;

    let timestamp = (chrono::Utc::now() + Duration::hours(SESSION_TOKEN_HOURS)).timestamp();
    let jwt_key = Config::get_or_init(false).await.app().jwt();

    let claims = UserClaims::new(usuario_id, payload.nombre, payload.email, "estudiante", timestamp);
    let token =
        auth::generate_token(claims, jwt_key).map_err(|e| WebError::server_crypt_error(e.into()))?;

    Ok((StatusCode::OK, Json(RegisterResponse { token })))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    description = "Authorizes user in the system",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "User signed in", body = LoginResponse),
        (status = 401, description = "Credentials invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth",
)]
pub(crate) async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_with_role_by_email(state.pool(), &admin, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let Some(found) = found else {
        return Err(WebError::auth_invalid_credentials());
    };

    let is_verified =
        verify_password(found.hash(), &payload.password).map_err(WebError::server_crypt_error)?;

    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    let timestamp = (chrono::Utc::now() + Duration::hours(SESSION_TOKEN_HOURS)).timestamp();
    let jwt_key = Config::get_or_init(false).await.app().jwt();
    let claims = UserClaims::new(
        found.id(),
        found.nombre(),
        found.email(),
        found.nombre_rol(),
        timestamp,
    );

    let token =
        auth::generate_token(claims, jwt_key).map_err(|e| WebError::server_crypt_error(e.into()))?;

    let user = AuthUser {
        id: found.id(),
        nombre: found.nombre().to_string(),
        email: found.email().to_string(),
        rol: found.nombre_rol().to_lowercase(),
    };

    Ok((StatusCode::OK, Json(LoginResponse { token, user })))
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    description = "Issues a single-use reset token and mails the reset link",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link dispatched", body = MsgResponse),
        (status = 404, description = "No account for that email", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth",
)]
pub(crate) async fn forgot_password_handler(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_email(state.pool(), &admin, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    // only active accounts can start a reset
    let Some(found) = found.filter(|u| u.estado() == RecordStatus::Activo) else {
        return Err(WebError::resource_not_found(UserEntity::get_resource_type()));
    };

    let reset_token = auth::generate_reset_token();
    let expires = chrono::Utc::now() + Duration::hours(RESET_TOKEN_HOURS);

    UserEntity::set_reset_token(state.pool(), &admin, found.id(), &reset_token, expires)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let link = state.mailer().reset_link(&reset_token);
    state
        .mailer()
        .send(
            found.email(),
            "Password recovery",
            &format!("Follow this link to reset your password: {link}"),
            &format!(r#"<p>Follow this link to reset your password:</p><a href="{link}">{link}</a>"#),
        )
        .await;

    Ok((
        StatusCode::OK,
        Json(MsgResponse {
            msg: format!("A recovery link has been sent to {}", found.email()),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    description = "Consumes a reset token and replaces the password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = MsgResponse),
        (status = 400, description = "Token invalid or expired", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth",
)]
pub(crate) async fn reset_password_handler(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> WebResult<impl IntoResponse> {
    if payload.new_password.chars().count() < 6 {
        return Err(WebError::validation("password must be at least 6 characters"));
    }

    let admin = AuthenticatedUser::admin();
    let usuario_id =
        UserEntity::find_by_valid_reset_token(state.pool(), &admin, &payload.token)
            .await
            .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let Some(usuario_id) = usuario_id else {
        return Err(WebError::conflict(ConflictError::ResetTokenInvalid));
    };

    let hash = hash_password(&payload.new_password).map_err(WebError::server_crypt_error)?;
    UserEntity::replace_password(state.pool(), &admin, usuario_id, &hash)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(MsgResponse {
            msg: String::from("Password updated successfully"),
        }),
    ))
}
