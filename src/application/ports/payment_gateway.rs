use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{app_error::AppResult, domain::entities::membership_subscription::PaymentMethodType};

// ============================================================================
// Port Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub payment_method_id: String,
    pub payment_method_type: PaymentMethodType,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentResult {
    pub fn approved(transaction_id: String, metadata: HashMap<String, String>) -> Self {
        Self {
            success: true,
            transaction_id: Some(transaction_id),
            error_message: None,
            metadata,
        }
    }

    pub fn declined(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            transaction_id: None,
            error_message: Some(reason.into()),
            metadata: HashMap::new(),
        }
    }
}

// ============================================================================
// Port Trait
// ============================================================================

/// Charges and recurring-billing control for membership subscriptions.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge once. A declined charge is `Ok` with `success == false`;
    /// `Err` is reserved for the gateway itself being unusable.
    async fn process_payment(&self, request: &PaymentRequest) -> AppResult<PaymentResult>;

    async fn cancel_recurring_payment(&self, subscription_id: Uuid) -> AppResult<()>;

    async fn validate_payment_method(
        &self,
        payment_method_id: &str,
        payment_method_type: PaymentMethodType,
    ) -> bool;
}
