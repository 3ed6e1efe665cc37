use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::{PostgresPersistence, unique_violation},
    app_error::{AppError, AppResult},
    application::use_cases::auth::{NewUser, UserProfile, UserRepo},
};

fn row_to_profile(row: sqlx::postgres::PgRow) -> UserProfile {
    UserProfile {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        phone_number: row.get("phone_number"),
        account_status: row.get("account_status"),
        roles: row.get("roles"),
        email_verified: row.get("email_verified"),
        marketing_consent: row.get("marketing_consent"),
        last_login_at: row.get("last_login_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, email, password_hash, first_name, last_name, phone_number,
    account_status, roles, email_verified, marketing_consent,
    last_login_at, created_at, updated_at
"#;

#[async_trait]
impl UserRepo for PostgresPersistence {
    async fn create(&self, input: &NewUser) -> AppResult<UserProfile> {
        let result = sqlx::query(&format!(
            r#"
            INSERT INTO users (
                id, email, password_hash, first_name, last_name,
                phone_number, roles, marketing_consent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.phone_number)
        .bind(&input.roles)
        .bind(input.marketing_consent)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row_to_profile(row)),
            Err(err) if unique_violation(&err).is_some() => {
                Err(AppError::Conflict("Email already registered".into()))
            }
            Err(err) => Err(AppError::from(err)),
        }
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = $1", SELECT_COLS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", SELECT_COLS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_at = $2, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}
