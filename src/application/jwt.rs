use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // email
    pub user_id: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    pub token_type: TokenType,
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of checking a token. Validation never fails loudly; callers
/// decide what an expired or malformed token means for them.
#[derive(Debug)]
pub enum TokenValidation {
    Valid(Claims),
    Expired,
    Invalid,
}

impl TokenValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, TokenValidation::Valid(_))
    }

    pub fn into_claims(self) -> Option<Claims> {
        match self {
            TokenValidation::Valid(claims) => Some(claims),
            TokenValidation::Expired | TokenValidation::Invalid => None,
        }
    }
}

pub fn issue_access_token(
    user_id: Uuid,
    email: &str,
    roles: Vec<String>,
    secret: &SecretString,
    ttl: Duration,
) -> AppResult<IssuedToken> {
    issue(user_id, email, roles, TokenType::Access, secret, ttl)
}

pub fn issue_refresh_token(
    user_id: Uuid,
    email: &str,
    secret: &SecretString,
    ttl: Duration,
) -> AppResult<IssuedToken> {
    issue(user_id, email, Vec::new(), TokenType::Refresh, secret, ttl)
}

fn issue(
    user_id: Uuid,
    email: &str,
    roles: Vec<String>,
    token_type: TokenType,
    secret: &SecretString,
    ttl: Duration,
) -> AppResult<IssuedToken> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::seconds(ttl.whole_seconds());
    let claims = Claims {
        sub: email.to_string(),
        user_id,
        email: email.to_string(),
        roles,
        token_type,
        // Unique per token so two tokens minted in the same second differ.
        jti: Uuid::new_v4(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };
    let header = Header::new(Algorithm::HS256);
    let token = encode(
        &header,
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(IssuedToken { token, expires_at })
}

pub fn verify(token: &str, secret: &SecretString) -> AppResult<Claims> {
    validate(token, secret)
        .into_claims()
        .ok_or(AppError::InvalidToken)
}

pub fn validate(token: &str, secret: &SecretString) -> TokenValidation {
    let validation = Validation::new(Algorithm::HS256);
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    ) {
        Ok(data) => TokenValidation::Valid(data.claims),
        Err(err) if matches!(err.kind(), ErrorKind::ExpiredSignature) => TokenValidation::Expired,
        Err(err) => {
            tracing::debug!(error = %err, "Rejected token");
            TokenValidation::Invalid
        }
    }
}
