use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::payment_gateway::{PaymentGateway, PaymentRequest},
        use_cases::membership_plans::{MembershipPlanProfile, MembershipPlanRepo},
    },
    domain::entities::membership_subscription::{PaymentMethodType, SubscriptionStatus},
};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipSubscriptionProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub plan_code: String,
    pub status: SubscriptionStatus,
    pub trial_start_date: Option<DateTime<Utc>>,
    pub trial_end_date: Option<DateTime<Utc>>,
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub last_billing_date: Option<DateTime<Utc>>,
    pub amount_cents: i64,
    pub payment_method_id: String,
    pub payment_method_type: PaymentMethodType,
    pub auto_renew: bool,
    pub cancellation_date: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    #[serde(skip)]
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row to insert for a freshly started subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMembershipSubscription {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub plan_code: String,
    pub status: SubscriptionStatus,
    pub trial_start_date: Option<DateTime<Utc>>,
    pub trial_end_date: Option<DateTime<Utc>>,
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub last_billing_date: Option<DateTime<Utc>>,
    pub amount_cents: i64,
    pub payment_method_id: String,
    pub payment_method_type: PaymentMethodType,
    pub auto_renew: bool,
}

#[derive(Debug, Clone)]
pub struct CreateSubscriptionInput {
    pub user_id: Uuid,
    pub plan_code: String,
    pub payment_method_id: String,
    pub payment_method_type: PaymentMethodType,
    pub auto_renew: bool,
}

#[derive(Debug, Clone)]
pub struct Cancellation {
    pub cancelled_at: DateTime<Utc>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipStatus {
    pub user_id: Uuid,
    pub is_active_member: bool,
    pub subscription: Option<MembershipSubscriptionProfile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipStats {
    /// ACTIVE plus TRIALING.
    pub active_members: i64,
    pub trialing_members: i64,
}

// ============================================================================
// Repository
// ============================================================================

#[async_trait]
pub trait MembershipSubscriptionRepo: Send + Sync {
    /// Fails with `DuplicateSubscription` if the user already holds an
    /// ACTIVE or TRIALING subscription.
    async fn create(
        &self,
        input: &NewMembershipSubscription,
    ) -> AppResult<MembershipSubscriptionProfile>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<MembershipSubscriptionProfile>>;
    /// The user's ACTIVE or TRIALING subscription, if any.
    async fn get_current_for_user(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<MembershipSubscriptionProfile>>;
    /// Newest first.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        statuses: &[SubscriptionStatus],
    ) -> AppResult<Vec<MembershipSubscriptionProfile>>;
    /// ACTIVE, auto-renewing, `next_billing_date <= at`.
    async fn list_due_for_billing(
        &self,
        at: DateTime<Utc>,
    ) -> AppResult<Vec<MembershipSubscriptionProfile>>;
    /// TRIALING with `trial_end_date <= at`.
    async fn list_expired_trials(
        &self,
        at: DateTime<Utc>,
    ) -> AppResult<Vec<MembershipSubscriptionProfile>>;
    async fn count_by_statuses(&self, statuses: &[SubscriptionStatus]) -> AppResult<i64>;
    /// Marks the subscription CANCELLED if its version still matches.
    /// Returns `None` when another writer got there first.
    async fn cancel(
        &self,
        id: Uuid,
        expected_version: i32,
        cancellation: &Cancellation,
    ) -> AppResult<Option<MembershipSubscriptionProfile>>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct MembershipUseCases {
    plans: Arc<dyn MembershipPlanRepo>,
    subscriptions: Arc<dyn MembershipSubscriptionRepo>,
    payments: Arc<dyn PaymentGateway>,
}

impl MembershipUseCases {
    pub fn new(
        plans: Arc<dyn MembershipPlanRepo>,
        subscriptions: Arc<dyn MembershipSubscriptionRepo>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            plans,
            subscriptions,
            payments,
        }
    }

    /// Starts a membership. Plans with a trial start TRIALING without a
    /// charge; all others are charged up front and start ACTIVE.
    #[instrument(skip(self, input), fields(user_id = %input.user_id, plan_code = %input.plan_code))]
    pub async fn create_subscription(
        &self,
        input: CreateSubscriptionInput,
    ) -> AppResult<MembershipSubscriptionProfile> {
        let plan = self
            .plans
            .get_by_code(&input.plan_code)
            .await?
            .ok_or(AppError::NotFound)?;

        if !plan.active {
            return Err(AppError::InvalidInput(format!(
                "Plan {} is not available",
                plan.plan_code
            )));
        }

        if self
            .subscriptions
            .get_current_for_user(input.user_id)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateSubscription);
        }

        if !self
            .payments
            .validate_payment_method(&input.payment_method_id, input.payment_method_type)
            .await
        {
            return Err(AppError::PaymentMethodInvalid);
        }

        let now = Utc::now();
        let new_subscription = if plan.has_trial() {
            trial_subscription(&plan, &input, now)
        } else {
            let result = self
                .payments
                .process_payment(&PaymentRequest {
                    user_id: input.user_id,
                    amount_cents: plan.price_cents,
                    payment_method_id: input.payment_method_id.clone(),
                    payment_method_type: input.payment_method_type,
                    description: format!("Shopster+ {} subscription", plan.name),
                })
                .await?;

            if !result.success {
                let reason = result
                    .error_message
                    .unwrap_or_else(|| "payment declined".to_string());
                tracing::warn!(reason = %reason, "Membership payment declined");
                return Err(AppError::PaymentDeclined(reason));
            }

            tracing::info!(
                transaction_id = ?result.transaction_id,
                amount_cents = plan.price_cents,
                "Membership payment captured"
            );
            paid_subscription(&plan, &input, now)?
        };

        let created = self.subscriptions.create(&new_subscription).await?;
        tracing::info!(
            subscription_id = %created.id,
            status = %created.status,
            "Membership subscription created"
        );
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn cancel_subscription(
        &self,
        subscription_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<MembershipSubscriptionProfile> {
        let subscription = self
            .subscriptions
            .get_by_id(subscription_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !subscription
            .status
            .can_transition_to(SubscriptionStatus::Cancelled)
        {
            return Err(AppError::Conflict(format!(
                "Subscription is {} and cannot be cancelled",
                subscription.status
            )));
        }

        let cancellation = Cancellation {
            cancelled_at: Utc::now(),
            reason,
        };
        let cancelled = self
            .subscriptions
            .cancel(subscription.id, subscription.version, &cancellation)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("Subscription was modified concurrently".to_string())
            })?;

        // Stopping the recurring charge must not hold up or fail the cancel.
        let payments = self.payments.clone();
        tokio::spawn(async move {
            if let Err(err) = payments.cancel_recurring_payment(subscription_id).await {
                tracing::warn!(
                    error = ?err,
                    subscription_id = %subscription_id,
                    "Failed to cancel recurring payment"
                );
            }
        });

        tracing::info!(subscription_id = %subscription_id, "Membership subscription cancelled");
        Ok(cancelled)
    }

    #[instrument(skip(self))]
    pub async fn active_subscription(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<MembershipSubscriptionProfile>> {
        self.subscriptions.get_current_for_user(user_id).await
    }

    #[instrument(skip(self))]
    pub async fn is_active_member(&self, user_id: Uuid) -> AppResult<bool> {
        Ok(self.active_subscription(user_id).await?.is_some())
    }

    #[instrument(skip(self))]
    pub async fn membership_status(&self, user_id: Uuid) -> AppResult<MembershipStatus> {
        let subscription = self.active_subscription(user_id).await?;
        Ok(MembershipStatus {
            user_id,
            is_active_member: subscription.is_some(),
            subscription,
        })
    }

    #[instrument(skip(self))]
    pub async fn subscription_history(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<MembershipSubscriptionProfile>> {
        self.subscriptions
            .list_for_user(user_id, &SubscriptionStatus::HISTORY_STATUSES)
            .await
    }

    #[instrument(skip(self))]
    pub async fn subscriptions_due_for_billing(
        &self,
        at: DateTime<Utc>,
    ) -> AppResult<Vec<MembershipSubscriptionProfile>> {
        self.subscriptions.list_due_for_billing(at).await
    }

    #[instrument(skip(self))]
    pub async fn expired_trials(
        &self,
        at: DateTime<Utc>,
    ) -> AppResult<Vec<MembershipSubscriptionProfile>> {
        self.subscriptions.list_expired_trials(at).await
    }

    #[instrument(skip(self))]
    pub async fn membership_stats(&self) -> AppResult<MembershipStats> {
        let active_members = self
            .subscriptions
            .count_by_statuses(&SubscriptionStatus::MEMBER_STATUSES)
            .await?;
        let trialing_members = self
            .subscriptions
            .count_by_statuses(&[SubscriptionStatus::Trialing])
            .await?;
        Ok(MembershipStats {
            active_members,
            trialing_members,
        })
    }
}

fn trial_subscription(
    plan: &MembershipPlanProfile,
    input: &CreateSubscriptionInput,
    now: DateTime<Utc>,
) -> NewMembershipSubscription {
    let trial_end = now + Duration::days(i64::from(plan.trial_days));
    NewMembershipSubscription {
        user_id: input.user_id,
        plan_id: plan.id,
        plan_code: plan.plan_code.clone(),
        status: SubscriptionStatus::Trialing,
        trial_start_date: Some(now),
        trial_end_date: Some(trial_end),
        subscription_start_date: None,
        next_billing_date: Some(trial_end),
        last_billing_date: None,
        amount_cents: plan.price_cents,
        payment_method_id: input.payment_method_id.clone(),
        payment_method_type: input.payment_method_type,
        auto_renew: input.auto_renew,
    }
}

fn paid_subscription(
    plan: &MembershipPlanProfile,
    input: &CreateSubscriptionInput,
    now: DateTime<Utc>,
) -> AppResult<NewMembershipSubscription> {
    let next_billing = plan.billing_cycle.advance(now).ok_or_else(|| {
        AppError::Internal(format!("next billing date out of range for {now}"))
    })?;
    Ok(NewMembershipSubscription {
        user_id: input.user_id,
        plan_id: plan.id,
        plan_code: plan.plan_code.clone(),
        status: SubscriptionStatus::Active,
        trial_start_date: None,
        trial_end_date: None,
        subscription_start_date: Some(now),
        next_billing_date: Some(next_billing),
        last_billing_date: Some(now),
        amount_cents: plan.price_cents,
        payment_method_id: input.payment_method_id.clone(),
        payment_method_type: input.payment_method_type,
        auto_renew: input.auto_renew,
    })
}
