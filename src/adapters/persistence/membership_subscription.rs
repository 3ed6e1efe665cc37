use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::{PostgresPersistence, unique_violation},
    app_error::{AppError, AppResult},
    application::use_cases::membership::{
        Cancellation, MembershipSubscriptionProfile, MembershipSubscriptionRepo,
        NewMembershipSubscription,
    },
    domain::entities::membership_subscription::SubscriptionStatus,
};

const ONE_CURRENT_PER_USER: &str = "membership_subscriptions_one_current_per_user";

fn row_to_profile(row: sqlx::postgres::PgRow) -> MembershipSubscriptionProfile {
    MembershipSubscriptionProfile {
        id: row.get("id"),
        user_id: row.get("user_id"),
        plan_id: row.get("plan_id"),
        plan_code: row.get("plan_code"),
        status: row.get("status"),
        trial_start_date: row.get("trial_start_date"),
        trial_end_date: row.get("trial_end_date"),
        subscription_start_date: row.get("subscription_start_date"),
        subscription_end_date: row.get("subscription_end_date"),
        next_billing_date: row.get("next_billing_date"),
        last_billing_date: row.get("last_billing_date"),
        amount_cents: row.get("amount_cents"),
        payment_method_id: row.get("payment_method_id"),
        payment_method_type: row.get("payment_method_type"),
        auto_renew: row.get("auto_renew"),
        cancellation_date: row.get("cancellation_date"),
        cancellation_reason: row.get("cancellation_reason"),
        version: row.get("version"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, user_id, plan_id, plan_code, status,
    trial_start_date, trial_end_date, subscription_start_date, subscription_end_date,
    next_billing_date, last_billing_date, amount_cents,
    payment_method_id, payment_method_type, auto_renew,
    cancellation_date, cancellation_reason, version, created_at, updated_at
"#;

#[async_trait]
impl MembershipSubscriptionRepo for PostgresPersistence {
    async fn create(
        &self,
        input: &NewMembershipSubscription,
    ) -> AppResult<MembershipSubscriptionProfile> {
        let result = sqlx::query(&format!(
            r#"
            INSERT INTO membership_subscriptions (
                id, user_id, plan_id, plan_code, status,
                trial_start_date, trial_end_date, subscription_start_date,
                next_billing_date, last_billing_date, amount_cents,
                payment_method_id, payment_method_type, auto_renew
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(input.user_id)
        .bind(input.plan_id)
        .bind(&input.plan_code)
        .bind(input.status)
        .bind(input.trial_start_date)
        .bind(input.trial_end_date)
        .bind(input.subscription_start_date)
        .bind(input.next_billing_date)
        .bind(input.last_billing_date)
        .bind(input.amount_cents)
        .bind(&input.payment_method_id)
        .bind(input.payment_method_type)
        .bind(input.auto_renew)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row_to_profile(row)),
            // Lost the race against a concurrent create for the same user.
            Err(err) if unique_violation(&err) == Some(ONE_CURRENT_PER_USER) => {
                Err(AppError::DuplicateSubscription)
            }
            Err(err) => Err(AppError::from(err)),
        }
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<MembershipSubscriptionProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM membership_subscriptions WHERE id = $1",
            SELECT_COLS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    async fn get_current_for_user(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<MembershipSubscriptionProfile>> {
        let row = sqlx::query(&format!(
            r#"SELECT {} FROM membership_subscriptions
               WHERE user_id = $1 AND status = ANY($2)
               ORDER BY created_at DESC
               LIMIT 1"#,
            SELECT_COLS
        ))
        .bind(user_id)
        .bind(&SubscriptionStatus::MEMBER_STATUSES[..])
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        statuses: &[SubscriptionStatus],
    ) -> AppResult<Vec<MembershipSubscriptionProfile>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {} FROM membership_subscriptions
               WHERE user_id = $1 AND status = ANY($2)
               ORDER BY created_at DESC"#,
            SELECT_COLS
        ))
        .bind(user_id)
        .bind(statuses)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_profile).collect())
    }

    async fn list_due_for_billing(
        &self,
        at: DateTime<Utc>,
    ) -> AppResult<Vec<MembershipSubscriptionProfile>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {} FROM membership_subscriptions
               WHERE status = 'ACTIVE' AND auto_renew = true AND next_billing_date <= $1
               ORDER BY next_billing_date"#,
            SELECT_COLS
        ))
        .bind(at)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_profile).collect())
    }

    async fn list_expired_trials(
        &self,
        at: DateTime<Utc>,
    ) -> AppResult<Vec<MembershipSubscriptionProfile>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {} FROM membership_subscriptions
               WHERE status = 'TRIALING' AND trial_end_date <= $1
               ORDER BY trial_end_date"#,
            SELECT_COLS
        ))
        .bind(at)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_profile).collect())
    }

    async fn count_by_statuses(&self, statuses: &[SubscriptionStatus]) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM membership_subscriptions WHERE status = ANY($1)")
                .bind(statuses)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::from)?;
        Ok(count)
    }

    async fn cancel(
        &self,
        id: Uuid,
        expected_version: i32,
        cancellation: &Cancellation,
    ) -> AppResult<Option<MembershipSubscriptionProfile>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE membership_subscriptions
            SET status = 'CANCELLED',
                cancellation_date = $3,
                cancellation_reason = $4,
                subscription_end_date = $3,
                auto_renew = false,
                version = version + 1,
                updated_at = $3
            WHERE id = $1 AND version = $2
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(expected_version)
        .bind(cancellation.cancelled_at)
        .bind(&cancellation.reason)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }
}
