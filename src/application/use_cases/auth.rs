use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;
use sha2::{Digest, Sha256};
use time::Duration;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        jwt::{self, Claims, TokenType, TokenValidation},
        validators::{is_valid_email, is_valid_password},
    },
    domain::entities::account_status::{AccountStatus, DEFAULT_ROLE},
};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub account_status: AccountStatus,
    pub roles: Vec<String>,
    pub email_verified: bool,
    pub marketing_consent: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub roles: Vec<String>,
    pub marketing_consent: bool,
}

#[derive(Debug, Clone)]
pub struct SessionProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_token: String,
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub is_active: bool,
    pub last_accessed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: Uuid,
    pub session_token: String,
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Where a login came from. Stored on the session.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub marketing_consent: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}

// ============================================================================
// Repositories
// ============================================================================

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    async fn create(&self, input: &NewUser) -> AppResult<UserProfile>;
    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserProfile>>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>>;
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;
}

#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn create(&self, input: &NewSession) -> AppResult<SessionProfile>;
    async fn get_by_refresh_hash(&self, refresh_token_hash: &str)
    -> AppResult<Option<SessionProfile>>;
    /// Swaps the stored refresh hash, but only if it still equals
    /// `current_hash`. Returns `false` if another refresh won the race.
    async fn rotate(
        &self,
        session_id: Uuid,
        current_hash: &str,
        new_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool>;
    async fn delete(&self, session_id: Uuid) -> AppResult<()>;
    async fn delete_by_refresh_hash(&self, refresh_token_hash: &str) -> AppResult<u64>;
    async fn delete_for_device(&self, user_id: Uuid, device_info: &str) -> AppResult<u64>;
    async fn delete_all_for_user(&self, user_id: Uuid) -> AppResult<u64>;
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct AuthUseCases {
    users: Arc<dyn UserRepo>,
    sessions: Arc<dyn SessionRepo>,
    jwt_secret: SecretString,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl AuthUseCases {
    pub fn new(
        users: Arc<dyn UserRepo>,
        sessions: Arc<dyn SessionRepo>,
        jwt_secret: SecretString,
        access_token_ttl: Duration,
        refresh_token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            jwt_secret,
            access_token_ttl,
            refresh_token_ttl,
        }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput, client: ClientInfo) -> AppResult<AuthResponse> {
        let email = normalize_email(&input.email);
        if !is_valid_email(&email) {
            return Err(AppError::InvalidInput("Invalid email address".into()));
        }
        if !is_valid_password(&input.password) {
            return Err(AppError::InvalidInput(
                "Password must be at least 8 characters".into(),
            ));
        }
        if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
            return Err(AppError::InvalidInput("First and last name are required".into()));
        }
        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        let password_hash = hash_password(input.password).await?;
        let user = self
            .users
            .create(&NewUser {
                email,
                password_hash,
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                phone_number: input.phone_number,
                roles: vec![DEFAULT_ROLE.to_string()],
                marketing_consent: input.marketing_consent,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        self.start_session(user, client).await
    }

    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        client: ClientInfo,
    ) -> AppResult<AuthResponse> {
        let email = normalize_email(email);
        let Some(user) = self.users.get_by_email(&email).await? else {
            return Err(AppError::InvalidCredentials);
        };
        if !verify_password(password.to_string(), user.password_hash.clone()).await {
            return Err(AppError::InvalidCredentials);
        }
        if !user.account_status.can_login() {
            tracing::info!(user_id = %user.id, status = %user.account_status, "Login refused");
            return Err(AppError::InvalidCredentials);
        }

        // One session per device.
        if let Some(device) = client.device_info.as_deref() {
            self.sessions.delete_for_device(user.id, device).await?;
        }

        let now = Utc::now();
        self.users.record_login(user.id, now).await?;
        let user = UserProfile {
            last_login_at: Some(now),
            ..user
        };
        self.start_session(user, client).await
    }

    /// Exchanges a refresh token for a new token pair. The presented refresh
    /// token stops working once this returns.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = jwt::validate(refresh_token, &self.jwt_secret)
            .into_claims()
            .ok_or(AppError::InvalidToken)?;
        if claims.token_type != TokenType::Refresh {
            return Err(AppError::InvalidToken);
        }

        let current_hash = hash_token(refresh_token);
        let session = self
            .sessions
            .get_by_refresh_hash(&current_hash)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if session.expires_at <= Utc::now() {
            self.sessions.delete(session.id).await?;
            return Err(AppError::InvalidToken);
        }
        if session.user_id != claims.user_id {
            return Err(AppError::InvalidToken);
        }

        let user = self
            .users
            .get_by_id(session.user_id)
            .await?
            .filter(|u| u.account_status.can_login())
            .ok_or(AppError::InvalidToken)?;

        let access = jwt::issue_access_token(
            user.id,
            &user.email,
            user.roles.clone(),
            &self.jwt_secret,
            self.access_token_ttl,
        )?;
        let refresh = jwt::issue_refresh_token(
            user.id,
            &user.email,
            &self.jwt_secret,
            self.refresh_token_ttl,
        )?;

        let rotated = self
            .sessions
            .rotate(
                session.id,
                &current_hash,
                &hash_token(&refresh.token),
                refresh.expires_at,
            )
            .await?;
        if !rotated {
            return Err(AppError::InvalidToken);
        }

        tracing::debug!(user_id = %user.id, session_id = %session.id, "Refresh token rotated");
        Ok(AuthResponse {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: "Bearer",
            expires_at: access.expires_at,
            user,
        })
    }

    /// Ends the session holding `refresh_token`. Unknown tokens are ignored.
    #[instrument(skip_all)]
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        let removed = self
            .sessions
            .delete_by_refresh_hash(&hash_token(refresh_token))
            .await?;
        tracing::debug!(removed, "Logout");
        Ok(())
    }

    /// Deletes every session of the user. Access tokens already issued stay
    /// valid until they expire.
    #[instrument(skip(self))]
    pub async fn revoke_all(&self, user_id: Uuid) -> AppResult<u64> {
        let removed = self.sessions.delete_all_for_user(user_id).await?;
        tracing::info!(user_id = %user_id, removed, "Revoked all sessions");
        Ok(removed)
    }

    #[instrument(skip(self))]
    pub async fn cleanup_expired_sessions(&self) -> AppResult<u64> {
        self.sessions.delete_expired(Utc::now()).await
    }

    pub fn validate_token(&self, token: &str) -> TokenValidation {
        jwt::validate(token, &self.jwt_secret)
    }

    /// Claims of a valid access token; refresh tokens are rejected.
    pub fn authenticate(&self, access_token: &str) -> AppResult<Claims> {
        let claims = jwt::verify(access_token, &self.jwt_secret)?;
        if claims.token_type != TokenType::Access {
            return Err(AppError::InvalidToken);
        }
        Ok(claims)
    }

    async fn start_session(&self, user: UserProfile, client: ClientInfo) -> AppResult<AuthResponse> {
        let access = jwt::issue_access_token(
            user.id,
            &user.email,
            user.roles.clone(),
            &self.jwt_secret,
            self.access_token_ttl,
        )?;
        let refresh = jwt::issue_refresh_token(
            user.id,
            &user.email,
            &self.jwt_secret,
            self.refresh_token_ttl,
        )?;

        let session = self
            .sessions
            .create(&NewSession {
                user_id: user.id,
                session_token: generate_token(),
                refresh_token_hash: hash_token(&refresh.token),
                expires_at: refresh.expires_at,
                device_info: client.device_info,
                ip_address: client.ip_address,
                user_agent: client.user_agent,
            })
            .await?;
        tracing::debug!(user_id = %user.id, session_id = %session.id, "Session started");

        Ok(AuthResponse {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: "Bearer",
            expires_at: access.expires_at,
            user,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

async fn hash_password(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?
}

async fn verify_password(password: String, password_hash: String) -> bool {
    tokio::task::spawn_blocking(move || {
        PasswordHash::new(&password_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    })
    .await
    .unwrap_or(false)
}
