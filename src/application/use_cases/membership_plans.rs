use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::membership_plan::{BillingCycle, PlanType, format_price},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPlanProfile {
    pub id: Uuid,
    pub plan_code: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub billing_cycle: BillingCycle,
    pub trial_days: i32,
    pub plan_type: PlanType,
    pub active: bool,
    pub display_order: i32,
    pub features: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MembershipPlanProfile {
    pub fn formatted_price(&self) -> String {
        format_price(self.price_cents)
    }

    pub fn has_trial(&self) -> bool {
        self.trial_days > 0
    }

    pub fn trial_description(&self) -> Option<String> {
        self.has_trial()
            .then(|| format!("{}-day free trial", self.trial_days))
    }
}

#[derive(Debug, Clone)]
pub struct NewMembershipPlan {
    pub plan_code: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub billing_cycle: BillingCycle,
    pub trial_days: i32,
    pub plan_type: PlanType,
    pub display_order: i32,
    pub features: Vec<String>,
}

#[async_trait]
pub trait MembershipPlanRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<MembershipPlanProfile>>;
    async fn get_by_code(&self, plan_code: &str) -> AppResult<Option<MembershipPlanProfile>>;
    /// Active plans ordered by display order.
    async fn list_active(&self) -> AppResult<Vec<MembershipPlanProfile>>;
    async fn count(&self) -> AppResult<i64>;
    async fn create(&self, input: &NewMembershipPlan) -> AppResult<MembershipPlanProfile>;
}

#[derive(Clone)]
pub struct MembershipCatalogUseCases {
    plans: Arc<dyn MembershipPlanRepo>,
}

impl MembershipCatalogUseCases {
    pub fn new(plans: Arc<dyn MembershipPlanRepo>) -> Self {
        Self { plans }
    }

    /// Plans a shopper can buy: active, not the trial plan, by display order.
    #[instrument(skip(self))]
    pub async fn list_active_paid_plans(&self) -> AppResult<Vec<MembershipPlanProfile>> {
        let plans = self.plans.list_active().await?;
        Ok(plans.into_iter().filter(|p| p.plan_type.is_paid()).collect())
    }

    #[instrument(skip(self))]
    pub async fn list_trial_plans(&self) -> AppResult<Vec<MembershipPlanProfile>> {
        let plans = self.plans.list_active().await?;
        Ok(plans
            .into_iter()
            .filter(|p| p.plan_type == PlanType::Trial)
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn find_by_code(&self, plan_code: &str) -> AppResult<MembershipPlanProfile> {
        self.plans
            .get_by_code(plan_code)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Inserts the standard Shopster+ plans when no plans exist yet.
    /// Returns how many plans were created.
    #[instrument(skip(self))]
    pub async fn seed_default_plans(&self) -> AppResult<usize> {
        if self.plans.count().await? > 0 {
            return Ok(0);
        }

        let defaults = default_plans();
        for plan in &defaults {
            self.plans.create(plan).await?;
        }
        tracing::info!(count = defaults.len(), "Seeded membership plans");
        Ok(defaults.len())
    }
}

const BASE_FEATURES: [&str; 4] = [
    "Free shipping on all orders",
    "Early access to sales",
    "Exclusive member-only deals",
    "Priority customer support",
];

fn features(extra: &[&str]) -> Vec<String> {
    BASE_FEATURES
        .iter()
        .chain(extra)
        .map(|f| f.to_string())
        .collect()
}

pub fn default_plans() -> Vec<NewMembershipPlan> {
    vec![
        NewMembershipPlan {
            plan_code: "SHOPSTER_PLUS_TRIAL".to_string(),
            name: "Shopster+ Free Trial".to_string(),
            description: Some("Try Shopster+ for free for 7 days".to_string()),
            price_cents: 0,
            billing_cycle: BillingCycle::Weekly,
            trial_days: 7,
            plan_type: PlanType::Trial,
            display_order: 0,
            features: features(&[]),
        },
        NewMembershipPlan {
            plan_code: "SHOPSTER_PLUS_MONTHLY".to_string(),
            name: "Shopster+ Monthly".to_string(),
            description: Some("Monthly Shopster+ membership with 1-week free trial".to_string()),
            price_cents: 999,
            billing_cycle: BillingCycle::Monthly,
            trial_days: 7,
            plan_type: PlanType::Standard,
            display_order: 1,
            features: features(&["Monthly surprise box", "Cancel anytime"]),
        },
        NewMembershipPlan {
            plan_code: "SHOPSTER_PLUS_ANNUAL".to_string(),
            name: "Shopster+ Annual".to_string(),
            description: Some(
                "Annual Shopster+ membership with 1-week free trial - Best Value!".to_string(),
            ),
            price_cents: 9_900,
            billing_cycle: BillingCycle::Annually,
            trial_days: 7,
            plan_type: PlanType::Premium,
            display_order: 2,
            features: features(&[
                "Monthly surprise box",
                "Best value - save over monthly",
                "Annual member-exclusive events",
                "Extended return policy",
            ]),
        },
    ]
}
