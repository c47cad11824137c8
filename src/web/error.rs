use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    auth::CryptError,
    error::log_error,
    model::{DatabaseError, ResourceType},
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("ValidationFailed: {detail}")]
    ValidationFailed { detail: String },
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationTokenInvalid. Error: {error}")]
    AuthenticationTokenInvalid {
        error: jsonwebtoken::errors::Error,
    },

    #[error("AuthenticationTokenMalformed")]
    AuthenticationTokenMalformed,

    #[error("AuthenticationInvalidCredentials")]
    AuthenticationInvalidCredentials,

    #[error("AuthenticationNotPermitted")]
    AuthenticationNotPermitted,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type:?}")]
    ResourceNotFound { resource_type: ResourceType },

    #[error("ResourceForbidden: {resource_type:?}")]
    ResourceForbidden { resource_type: ResourceType },

    #[error("ResourceFetchError: {resource_type:?}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },
}

/// Duplicate keys and delete guards. The original API answered these with
/// 400, and clients depend on that, so they do not map to 409.
#[derive(Debug, Error)]
pub enum ConflictError {
    #[error("ConflictProgressExists")]
    ProgressExists,

    #[error("ConflictDuplicateUser")]
    DuplicateUser,

    #[error("ConflictDuplicateEntry: {detail}")]
    DuplicateEntry { detail: String },

    #[error("ConflictModuleHasLessons")]
    ModuleHasLessons,

    #[error("ConflictLessonHasDependents")]
    LessonHasDependents,

    #[error("ConflictStudentHasProgress")]
    StudentHasProgress,

    #[error("ConflictResetTokenInvalid")]
    ResetTokenInvalid,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerCryptError: {0}")]
    ServerCryptError(#[from] crate::auth::CryptError),
}

impl ValidationError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ValidationFailed { detail } => format!("Validation error, {detail}."),
        }
    }
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::AuthenticationTokenInvalid { .. } => StatusCode::UNAUTHORIZED,
            Self::AuthenticationTokenMalformed => StatusCode::UNAUTHORIZED,
            Self::AuthenticationInvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AuthenticationNotPermitted => StatusCode::FORBIDDEN,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AuthenticationRequired => String::from("Authentication required."),
            Self::AuthenticationTokenInvalid { .. } | Self::AuthenticationTokenMalformed => {
                String::from("Authentication error, token invalid.")
            }
            // one message for unknown email and wrong password alike
            Self::AuthenticationInvalidCredentials => {
                String::from("Authentication error, email or password is invalid.")
            }
            Self::AuthenticationNotPermitted => {
                String::from("Authentication error, role not permitted for this operation.")
            }
        }
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceForbidden { .. } => StatusCode::FORBIDDEN,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { .. } => String::from("Resource error, resource not found."),
            Self::ResourceForbidden { .. } => String::from("Resource error, resource forbidden."),
            Self::ResourceFetchError { .. } => {
                String::from("Resource error, unable to fetch resource.")
            }
        }
    }
}

impl ConflictError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ProgressExists => {
                String::from("Conflict error, progress already exists for this lesson.")
            }
            Self::DuplicateUser => String::from("Conflict error, user already exists."),
            Self::DuplicateEntry { detail } => format!("Conflict error, {detail}."),
            Self::ModuleHasLessons => {
                String::from("Conflict error, module has lessons and cannot be deleted.")
            }
            Self::LessonHasDependents => String::from(
                "Conflict error, lesson has progress or questions and cannot be deleted.",
            ),
            Self::StudentHasProgress => {
                String::from("Conflict error, student has progress records and cannot be deleted.")
            }
            Self::ResetTokenInvalid => String::from("Conflict error, token invalid or expired."),
        }
    }
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    pub fn client_display(&self) -> String {
        String::from("Internal server error.")
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ValidationError - {0}")]
    ValidationError(#[from] ValidationError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("ConflictError - {0}")]
    ConflictError(#[from] ConflictError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
}

impl WebError {
    pub fn validation<S: Into<String>>(detail: S) -> Self {
        Self::ValidationError(ValidationError::ValidationFailed {
            detail: detail.into(),
        })
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn auth_token_invalid(error: jsonwebtoken::errors::Error) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationTokenInvalid { error })
    }

    pub fn auth_token_malformed() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationTokenMalformed)
    }

    pub fn auth_invalid_credentials() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInvalidCredentials)
    }

    pub fn not_permitted() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationNotPermitted)
    }

    pub fn resource_not_found(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
        })
    }

    pub fn resource_forbidden(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceForbidden {
            resource_type: r#type,
        })
    }

    pub fn resource_fetch_error(r#type: ResourceType, error: DatabaseError) -> Self {
        Self::ResourceError(ResourceError::ResourceFetchError {
            resource_type: r#type,
            error,
        })
    }

    pub fn conflict(conflict: ConflictError) -> Self {
        Self::ConflictError(conflict)
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        Self::ServerError(ServerError::ServerCryptError(e))
    }

    /// Ownership check translation: `Forbidden` from the model keeps its
    /// meaning, anything else is a fetch failure.
    pub fn from_access_check(r#type: ResourceType, error: DatabaseError) -> Self {
        if let DatabaseError::Forbidden = error {
            Self::resource_forbidden(r#type)
        } else {
            Self::resource_fetch_error(r#type, error)
        }
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ValidationError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
            Self::ResourceError(e) => e.status_code(),
            Self::ConflictError(e) => e.status_code(),
            Self::ServerError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ValidationError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
            Self::ResourceError(e) => e.client_display(),
            Self::ConflictError(e) => e.client_display(),
            Self::ServerError(e) => e.client_display(),
        }
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message for the client
    pub msg: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        log_error(&self);

        let status_code = self.status_code();
        let display = self.client_display();

        let body = ErrorResponse {
            msg: display,
            status_code: status_code.as_str().to_string(),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        };

        (status_code, Json(body)).into_response()
    }
}
