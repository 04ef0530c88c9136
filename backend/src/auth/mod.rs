use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

use crate::config::{config_loader, config_model::SessionAuth};

pub const TOKEN_ISSUER: &str = "voxgen-backend";

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// The signed-in email; identity is the email, nothing else.
    pub sub: String,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
}

/// Resolved request identity, handed explicitly to every use case.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub email: String,
    pub role: String,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

#[derive(Debug)]
pub struct AuthError(anyhow::Error);

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError(err)
    }
}

impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::UNAUTHORIZED,
            format!("Unauthorized: {}", self.0),
        )
            .into_response()
    }
}

pub fn issue_session_token(
    email: &str,
    role: &str,
    session: &SessionAuth,
) -> anyhow::Result<String> {
    let ttl = i64::try_from(session.ttl_seconds)?;
    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::seconds(ttl))
        .ok_or_else(|| anyhow::anyhow!("Failed to compute token expiration"))?;

    let claims = SessionClaims {
        sub: email.to_string(),
        role: role.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
        iss: TOKEN_ISSUER.to_string(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(session.jwt_secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn validate_session_token(token: &str) -> Result<SessionClaims, AuthError> {
    let session = config_loader::get_session_auth()
        .map_err(|e| anyhow::anyhow!("Failed to load session config: {}", e))?;

    let decoding_key = DecodingKey::from_secret(session.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);

    let token_data = decode::<SessionClaims>(token, &decoding_key, &validation)
        .map_err(|e| anyhow::anyhow!("Session token validation failed: {}", e))?;

    Ok(token_data.claims)
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            ))?;

        let auth_str = auth_header.to_str().map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header".to_string(),
            )
        })?;

        if !auth_str.starts_with("Bearer ") {
            return Err((
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format".to_string(),
            ));
        }

        let token = &auth_str[7..];

        let claims = validate_session_token(token)
            .map_err(|e| (StatusCode::UNAUTHORIZED, e.0.to_string()))?;

        Ok(SessionUser {
            email: claims.sub,
            role: claims.role,
        })
    }
}
