use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

/// Identity carried by a session credential. `rol` is stored lowercase at
/// issuance time so downstream role comparisons never care about case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub nombre: String,
    pub email: String,
    pub rol: String,
    pub exp: i64,
}

impl UserClaims {
    pub fn new(
        usuario_id: i64,
        nombre: impl Into<String>,
        email: impl Into<String>,
        rol: impl AsRef<str>,
        exp: i64,
    ) -> Self {
        Self {
            sub: usuario_id.to_string(),
            nombre: nombre.into(),
            email: email.into(),
            rol: rol.as_ref().to_lowercase(),
            exp,
        }
    }
}

pub fn generate_token<K: AsRef<[u8]>>(
    claims: UserClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    let header = Header::default();
    let key = EncodingKey::from_secret(key.as_ref());

    let token = jsonwebtoken::encode(&header, &claims, &key)?;
    Ok(token)
}

pub fn process_token<K: AsRef<[u8]>>(
    token: &str,
    key: K,
) -> jsonwebtoken::errors::Result<TokenData<UserClaims>> {
    let validation = Validation::default();
    let key = DecodingKey::from_secret(key.as_ref());

    let claims = jsonwebtoken::decode::<UserClaims>(token, &key, &validation)?;
    Ok(claims)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn token_roundtrip() {
        let exp = (chrono::Utc::now() + chrono::Duration::days(1)).timestamp();
        let claims = UserClaims::new(7, "Ana", "ana@x.com", "ESTUDIANTE", exp);
        let token = generate_token(claims, "test-secret").unwrap();

        let decoded = process_token(&token, "test-secret").unwrap();
        assert_eq!(decoded.claims.sub, "7");
        assert_eq!(decoded.claims.rol, "estudiante");
    }

    #[test]
    fn expired_token_is_rejected() {
        let exp = (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp();
        let claims = UserClaims::new(7, "Ana", "ana@x.com", "estudiante", exp);
        let token = generate_token(claims, "test-secret").unwrap();

        assert!(process_token(&token, "test-secret").is_err());
    }

    #[test]
    fn wrong_key_is_rejected() {
        let exp = (chrono::Utc::now() + chrono::Duration::days(1)).timestamp();
        let claims = UserClaims::new(7, "Ana", "ana@x.com", "estudiante", exp);
        let token = generate_token(claims, "test-secret").unwrap();

        assert!(process_token(&token, "other-secret").is_err());
    }
}
