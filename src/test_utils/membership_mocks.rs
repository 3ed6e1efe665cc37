//! In-memory mocks for membership plans, subscriptions and payments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::payment_gateway::{PaymentGateway, PaymentRequest, PaymentResult},
        use_cases::{
            membership::{
                Cancellation, MembershipSubscriptionProfile, MembershipSubscriptionRepo,
                NewMembershipSubscription,
            },
            membership_plans::{MembershipPlanProfile, MembershipPlanRepo, NewMembershipPlan},
        },
    },
    domain::entities::membership_subscription::{PaymentMethodType, SubscriptionStatus},
};

// ============================================================================
// InMemoryMembershipPlanRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryMembershipPlanRepo {
    pub plans: Mutex<Vec<MembershipPlanProfile>>,
}

impl InMemoryMembershipPlanRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(plans: Vec<MembershipPlanProfile>) -> Self {
        Self {
            plans: Mutex::new(plans),
        }
    }
}

#[async_trait]
impl MembershipPlanRepo for InMemoryMembershipPlanRepo {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<MembershipPlanProfile>> {
        Ok(self
            .plans
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn get_by_code(&self, plan_code: &str) -> AppResult<Option<MembershipPlanProfile>> {
        Ok(self
            .plans
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.plan_code == plan_code)
            .cloned())
    }

    async fn list_active(&self) -> AppResult<Vec<MembershipPlanProfile>> {
        let mut active: Vec<_> = self
            .plans
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.active)
            .cloned()
            .collect();
        active.sort_by_key(|p| p.display_order);
        Ok(active)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.plans.lock().unwrap().len() as i64)
    }

    async fn create(&self, input: &NewMembershipPlan) -> AppResult<MembershipPlanProfile> {
        let mut plans = self.plans.lock().unwrap();
        if plans.iter().any(|p| p.plan_code == input.plan_code) {
            return Err(AppError::Conflict(format!(
                "Plan {} already exists",
                input.plan_code
            )));
        }

        let now = Utc::now();
        let plan = MembershipPlanProfile {
            id: Uuid::new_v4(),
            plan_code: input.plan_code.clone(),
            name: input.name.clone(),
            description: input.description.clone(),
            price_cents: input.price_cents,
            billing_cycle: input.billing_cycle,
            trial_days: input.trial_days,
            plan_type: input.plan_type,
            active: true,
            display_order: input.display_order,
            features: input.features.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        plans.push(plan.clone());
        Ok(plan)
    }
}

// ============================================================================
// InMemoryMembershipSubscriptionRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryMembershipSubscriptionRepo {
    pub subscriptions: Mutex<HashMap<Uuid, MembershipSubscriptionProfile>>,
}

impl InMemoryMembershipSubscriptionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscriptions(subscriptions: Vec<MembershipSubscriptionProfile>) -> Self {
        Self {
            subscriptions: Mutex::new(subscriptions.into_iter().map(|s| (s.id, s)).collect()),
        }
    }

    /// Stores a fixture as-is, bypassing the duplicate check.
    pub fn insert(&self, subscription: MembershipSubscriptionProfile) {
        self.subscriptions
            .lock()
            .unwrap()
            .insert(subscription.id, subscription);
    }

    fn select(
        &self,
        filter: impl Fn(&MembershipSubscriptionProfile) -> bool,
    ) -> Vec<MembershipSubscriptionProfile> {
        self.subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| filter(s))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MembershipSubscriptionRepo for InMemoryMembershipSubscriptionRepo {
    async fn create(
        &self,
        input: &NewMembershipSubscription,
    ) -> AppResult<MembershipSubscriptionProfile> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if subscriptions
            .values()
            .any(|s| s.user_id == input.user_id && s.status.is_member())
        {
            return Err(AppError::DuplicateSubscription);
        }

        let now = Utc::now();
        let subscription = MembershipSubscriptionProfile {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            plan_id: input.plan_id,
            plan_code: input.plan_code.clone(),
            status: input.status,
            trial_start_date: input.trial_start_date,
            trial_end_date: input.trial_end_date,
            subscription_start_date: input.subscription_start_date,
            subscription_end_date: None,
            next_billing_date: input.next_billing_date,
            last_billing_date: input.last_billing_date,
            amount_cents: input.amount_cents,
            payment_method_id: input.payment_method_id.clone(),
            payment_method_type: input.payment_method_type,
            auto_renew: input.auto_renew,
            cancellation_date: None,
            cancellation_reason: None,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        subscriptions.insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<MembershipSubscriptionProfile>> {
        Ok(self.subscriptions.lock().unwrap().get(&id).cloned())
    }

    async fn get_current_for_user(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<MembershipSubscriptionProfile>> {
        Ok(self
            .select(|s| s.user_id == user_id && s.status.is_member())
            .into_iter()
            .max_by_key(|s| s.created_at))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        statuses: &[SubscriptionStatus],
    ) -> AppResult<Vec<MembershipSubscriptionProfile>> {
        let mut found = self.select(|s| s.user_id == user_id && statuses.contains(&s.status));
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn list_due_for_billing(
        &self,
        at: DateTime<Utc>,
    ) -> AppResult<Vec<MembershipSubscriptionProfile>> {
        Ok(self.select(|s| {
            s.status == SubscriptionStatus::Active
                && s.auto_renew
                && s.next_billing_date.is_some_and(|d| d <= at)
        }))
    }

    async fn list_expired_trials(
        &self,
        at: DateTime<Utc>,
    ) -> AppResult<Vec<MembershipSubscriptionProfile>> {
        Ok(self.select(|s| {
            s.status == SubscriptionStatus::Trialing && s.trial_end_date.is_some_and(|d| d <= at)
        }))
    }

    async fn count_by_statuses(&self, statuses: &[SubscriptionStatus]) -> AppResult<i64> {
        Ok(self.select(|s| statuses.contains(&s.status)).len() as i64)
    }

    async fn cancel(
        &self,
        id: Uuid,
        expected_version: i32,
        cancellation: &Cancellation,
    ) -> AppResult<Option<MembershipSubscriptionProfile>> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let Some(subscription) = subscriptions.get_mut(&id) else {
            return Ok(None);
        };
        if subscription.version != expected_version {
            return Ok(None);
        }

        subscription.status = SubscriptionStatus::Cancelled;
        subscription.cancellation_date = Some(cancellation.cancelled_at);
        subscription.cancellation_reason = cancellation.reason.clone();
        subscription.subscription_end_date = Some(cancellation.cancelled_at);
        subscription.auto_renew = false;
        subscription.version += 1;
        subscription.updated_at = cancellation.cancelled_at;
        Ok(Some(subscription.clone()))
    }
}

// ============================================================================
// MockPaymentGateway
// ============================================================================

/// Records every charge and recurring cancel it receives.
#[derive(Default)]
pub struct MockPaymentGateway {
    decline_reason: Option<String>,
    fail_cancellations: bool,
    charges: Mutex<Vec<PaymentRequest>>,
    cancelled: Mutex<Vec<Uuid>>,
}

impl MockPaymentGateway {
    pub fn approving() -> Self {
        Self::default()
    }

    pub fn declining(reason: &str) -> Self {
        Self {
            decline_reason: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_cancellations(mut self) -> Self {
        self.fail_cancellations = true;
        self
    }

    pub fn charges(&self) -> Vec<PaymentRequest> {
        self.charges.lock().unwrap().clone()
    }

    pub fn cancelled_recurring(&self) -> Vec<Uuid> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn process_payment(&self, request: &PaymentRequest) -> AppResult<PaymentResult> {
        let mut charges = self.charges.lock().unwrap();
        charges.push(request.clone());

        Ok(match &self.decline_reason {
            Some(reason) => PaymentResult::declined(reason.clone()),
            None => PaymentResult::approved(format!("txn_mock_{}", charges.len()), HashMap::new()),
        })
    }

    async fn cancel_recurring_payment(&self, subscription_id: Uuid) -> AppResult<()> {
        if self.fail_cancellations {
            return Err(AppError::Internal("processor unavailable".into()));
        }
        self.cancelled.lock().unwrap().push(subscription_id);
        Ok(())
    }

    async fn validate_payment_method(
        &self,
        payment_method_id: &str,
        _payment_method_type: PaymentMethodType,
    ) -> bool {
        !payment_method_id.trim().is_empty()
    }
}
