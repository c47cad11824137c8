use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{
    Config, auth,
    web::{RequestContext, UserRole, context::AuthenticatedUser, error::WebError},
};

/// Stateless bearer-token checkpoint: decodes the credential and attaches
/// the resolved identity to the request. No session store, no database
/// round-trip; the claims already carry id, name, email and role.
///
/// A missing header produces an anonymous context so that public endpoints
/// keep working; protected handlers reject it through `ctx.user()`.
pub async fn extract_context_fn(mut req: Request, next: Next) -> Result<Response, WebError> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let token = match bearer {
        Some(token) => token.to_owned(),
        None => {
            req.extensions_mut().insert(RequestContext::new(None));
            return Ok(next.run(req).await);
        }
    };

    let claims = auth::process_token(&token, Config::get_or_init(false).await.app().jwt())
        .map_err(WebError::auth_token_invalid)?
        .claims;

    let usuario_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| WebError::auth_token_malformed())?;

    let user = AuthenticatedUser::new(
        usuario_id,
        claims.nombre,
        claims.email,
        UserRole::from(claims.rol.as_str()),
    );
    req.extensions_mut()
        .insert(RequestContext::new(Some(user)));

    Ok(next.run(req).await)
}
