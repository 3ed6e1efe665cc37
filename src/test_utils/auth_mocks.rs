//! In-memory mocks for users and sessions.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::auth::{
        NewSession, NewUser, SessionProfile, SessionRepo, UserProfile, UserRepo,
    },
    domain::entities::account_status::AccountStatus,
};

// ============================================================================
// InMemoryUserRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepo {
    pub users: Mutex<HashMap<Uuid, UserProfile>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, user_id: Uuid, status: AccountStatus) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&user_id) {
            user.account_status = status;
        }
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn create(&self, input: &NewUser) -> AppResult<UserProfile> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == input.email) {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        let now = Utc::now();
        let user = UserProfile {
            id: Uuid::new_v4(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            phone_number: input.phone_number.clone(),
            account_status: AccountStatus::Active,
            roles: input.roles.clone(),
            email_verified: false,
            marketing_consent: input.marketing_consent,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.last_login_at = Some(at);
            user.updated_at = at;
        }
        Ok(())
    }
}

// ============================================================================
// InMemorySessionRepo
// ============================================================================

#[derive(Default)]
pub struct InMemorySessionRepo {
    pub sessions: Mutex<HashMap<Uuid, SessionProfile>>,
}

impl InMemorySessionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Moves every session's expiry into the past.
    pub fn expire_all(&self) {
        let past = Utc::now() - Duration::seconds(1);
        for session in self.sessions.lock().unwrap().values_mut() {
            session.expires_at = past;
        }
    }

    fn remove_where(&self, predicate: impl Fn(&SessionProfile) -> bool) -> u64 {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| !predicate(s));
        (before - sessions.len()) as u64
    }
}

#[async_trait]
impl SessionRepo for InMemorySessionRepo {
    async fn create(&self, input: &NewSession) -> AppResult<SessionProfile> {
        let now = Utc::now();
        let session = SessionProfile {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            session_token: input.session_token.clone(),
            refresh_token_hash: input.refresh_token_hash.clone(),
            expires_at: input.expires_at,
            device_info: input.device_info.clone(),
            ip_address: input.ip_address.clone(),
            user_agent: input.user_agent.clone(),
            is_active: true,
            last_accessed_at: now,
            created_at: now,
        };
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id, session.clone());
        Ok(session)
    }

    async fn get_by_refresh_hash(
        &self,
        refresh_token_hash: &str,
    ) -> AppResult<Option<SessionProfile>> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .values()
            .find(|s| s.is_active && s.refresh_token_hash == refresh_token_hash)
            .cloned())
    }

    async fn rotate(
        &self,
        session_id: Uuid,
        current_hash: &str,
        new_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(&session_id) {
            Some(session) if session.refresh_token_hash == current_hash => {
                session.refresh_token_hash = new_hash.to_string();
                session.expires_at = expires_at;
                session.last_accessed_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, session_id: Uuid) -> AppResult<()> {
        self.sessions.lock().unwrap().remove(&session_id);
        Ok(())
    }

    async fn delete_by_refresh_hash(&self, refresh_token_hash: &str) -> AppResult<u64> {
        Ok(self.remove_where(|s| s.refresh_token_hash == refresh_token_hash))
    }

    async fn delete_for_device(&self, user_id: Uuid, device_info: &str) -> AppResult<u64> {
        Ok(self.remove_where(|s| {
            s.user_id == user_id && s.device_info.as_deref() == Some(device_info)
        }))
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        Ok(self.remove_where(|s| s.user_id == user_id))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        Ok(self.remove_where(|s| s.expires_at <= now))
    }
}
