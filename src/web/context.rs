//! Request context, e.g. user id, its role, etc.
//!

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::web::{WebResult, error::WebError};

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    usuario_id: i64,
    nombre: String,
    email: String,
    user_role: UserRole,
}

impl AuthenticatedUser {
    pub fn new(usuario_id: i64, nombre: String, email: String, user_role: UserRole) -> Self {
        Self {
            usuario_id,
            nombre,
            email,
            user_role,
        }
    }

    /// Internal actor for startup, CLI and test seeding paths that bypass
    /// the HTTP surface.
    pub fn admin() -> Self {
        Self {
            usuario_id: 0,
            nombre: String::from("system"),
            email: String::new(),
            user_role: UserRole::Admin,
        }
    }

    pub fn user_id(&self) -> i64 {
        self.usuario_id
    }

    pub fn nombre(&self) -> &str {
        &self.nombre
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn user_role(&self) -> UserRole {
        self.user_role
    }
}

/// Closed role set; anything unrecognized degrades to the least-privileged
/// role rather than failing open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Instructor,
    Estudiante,
}

impl From<&str> for UserRole {
    fn from(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "admin" => Self::Admin,
            "instructor" => Self::Instructor,
            _ => Self::Estudiante,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Instructor => write!(f, "instructor"),
            Self::Estudiante => write!(f, "estudiante"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    maybe_user: Option<AuthenticatedUser>,
}

impl RequestContext {
    pub fn new(maybe_user: Option<AuthenticatedUser>) -> Self {
        Self { maybe_user }
    }

    pub fn admin() -> Self {
        Self::new(Some(AuthenticatedUser::admin()))
    }

    pub fn maybe_user(&self) -> Option<&AuthenticatedUser> {
        self.maybe_user.as_ref()
    }

    pub fn user(&self) -> WebResult<&AuthenticatedUser> {
        self.maybe_user.as_ref().ok_or(WebError::auth_required())
    }

    /// Endpoint-level role gate: authenticated AND role in the allowed set.
    pub fn require_role(&self, allowed: &[UserRole]) -> WebResult<&AuthenticatedUser> {
        let user = self.user()?;
        if allowed.contains(&user.user_role()) {
            Ok(user)
        } else {
            Err(WebError::not_permitted())
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts.extensions.get::<RequestContext>();
        if let Some(ctx) = ctx {
            Ok(ctx.clone())
        } else {
            Ok(RequestContext::new(None))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!(UserRole::from("ADMIN"), UserRole::Admin);
        assert_eq!(UserRole::from("Instructor"), UserRole::Instructor);
        assert_eq!(UserRole::from("estudiante"), UserRole::Estudiante);
        assert_eq!(UserRole::from("whatever"), UserRole::Estudiante);
    }
}
