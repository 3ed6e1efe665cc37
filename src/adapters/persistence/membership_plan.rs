use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::{PostgresPersistence, parse_json_with_fallback},
    app_error::{AppError, AppResult},
    application::use_cases::membership_plans::{
        MembershipPlanProfile, MembershipPlanRepo, NewMembershipPlan,
    },
};

fn row_to_profile(row: sqlx::postgres::PgRow) -> MembershipPlanProfile {
    let id: Uuid = row.get("id");
    let features_json: serde_json::Value = row.get("features");

    MembershipPlanProfile {
        id,
        plan_code: row.get("plan_code"),
        name: row.get("name"),
        description: row.get("description"),
        price_cents: row.get("price_cents"),
        billing_cycle: row.get("billing_cycle"),
        trial_days: row.get("trial_days"),
        plan_type: row.get("plan_type"),
        active: row.get("active"),
        display_order: row.get("display_order"),
        features: parse_json_with_fallback(
            &features_json,
            "features",
            "membership_plan",
            &id.to_string(),
        ),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, plan_code, name, description, price_cents, billing_cycle, trial_days,
    plan_type, active, display_order, features, created_at, updated_at
"#;

#[async_trait]
impl MembershipPlanRepo for PostgresPersistence {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<MembershipPlanProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM membership_plans WHERE id = $1",
            SELECT_COLS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    async fn get_by_code(&self, plan_code: &str) -> AppResult<Option<MembershipPlanProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM membership_plans WHERE plan_code = $1",
            SELECT_COLS
        ))
        .bind(plan_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    async fn list_active(&self) -> AppResult<Vec<MembershipPlanProfile>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM membership_plans WHERE active = true ORDER BY display_order, created_at",
            SELECT_COLS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_profile).collect())
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM membership_plans")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(count)
    }

    async fn create(&self, input: &NewMembershipPlan) -> AppResult<MembershipPlanProfile> {
        let features_json = serde_json::to_value(&input.features).unwrap_or(serde_json::json!([]));

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO membership_plans (
                id, plan_code, name, description, price_cents, billing_cycle,
                trial_days, plan_type, display_order, features
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.plan_code)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(input.billing_cycle)
        .bind(input.trial_days)
        .bind(input.plan_type)
        .bind(input.display_order)
        .bind(features_json)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_profile(row))
    }
}
