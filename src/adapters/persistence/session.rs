use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::auth::{NewSession, SessionProfile, SessionRepo},
};

fn row_to_profile(row: sqlx::postgres::PgRow) -> SessionProfile {
    SessionProfile {
        id: row.get("id"),
        user_id: row.get("user_id"),
        session_token: row.get("session_token"),
        refresh_token_hash: row.get("refresh_token_hash"),
        expires_at: row.get("expires_at"),
        device_info: row.get("device_info"),
        ip_address: row.get("ip_address"),
        user_agent: row.get("user_agent"),
        is_active: row.get("is_active"),
        last_accessed_at: row.get("last_accessed_at"),
        created_at: row.get("created_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, user_id, session_token, refresh_token_hash, expires_at,
    device_info, ip_address, user_agent, is_active, last_accessed_at, created_at
"#;

#[async_trait]
impl SessionRepo for PostgresPersistence {
    async fn create(&self, input: &NewSession) -> AppResult<SessionProfile> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO user_sessions (
                id, user_id, session_token, refresh_token_hash, expires_at,
                device_info, ip_address, user_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(input.user_id)
        .bind(&input.session_token)
        .bind(&input.refresh_token_hash)
        .bind(input.expires_at)
        .bind(&input.device_info)
        .bind(&input.ip_address)
        .bind(&input.user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_profile(row))
    }

    async fn get_by_refresh_hash(
        &self,
        refresh_token_hash: &str,
    ) -> AppResult<Option<SessionProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM user_sessions WHERE refresh_token_hash = $1 AND is_active = true",
            SELECT_COLS
        ))
        .bind(refresh_token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    async fn rotate(
        &self,
        session_id: Uuid,
        current_hash: &str,
        new_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"UPDATE user_sessions
               SET refresh_token_hash = $3, expires_at = $4, last_accessed_at = NOW()
               WHERE id = $1 AND refresh_token_hash = $2"#,
        )
        .bind(session_id)
        .bind(current_hash)
        .bind(new_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, session_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM user_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn delete_by_refresh_hash(&self, refresh_token_hash: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE refresh_token_hash = $1")
            .bind(refresh_token_hash)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }

    async fn delete_for_device(&self, user_id: Uuid, device_info: &str) -> AppResult<u64> {
        let result =
            sqlx::query("DELETE FROM user_sessions WHERE user_id = $1 AND device_info = $2")
                .bind(user_id)
                .bind(device_info)
                .execute(&self.pool)
                .await
                .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }
}
