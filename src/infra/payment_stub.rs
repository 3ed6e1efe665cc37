use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    application::ports::payment_gateway::{PaymentGateway, PaymentRequest, PaymentResult},
    domain::entities::membership_subscription::PaymentMethodType,
};

pub const PROCESSOR_NAME: &str = "stub-payment-processor";

/// Local payment processor for development.
///
/// Approves every charge after a fixed delay, so the membership flow can be
/// exercised end to end without a real provider.
#[derive(Clone)]
pub struct PaymentStub {
    delay: Duration,
}

impl PaymentStub {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    fn transaction_id() -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("txn_{}", &id[..8])
    }

    fn masked_method(method: PaymentMethodType) -> String {
        match method {
            PaymentMethodType::CreditCard | PaymentMethodType::DebitCard => {
                format!("****{}", rand::thread_rng().gen_range(1000..10000))
            }
            PaymentMethodType::Paypal => "****@example.com".to_string(),
            PaymentMethodType::ApplePay => "****-apple-pay".to_string(),
            PaymentMethodType::GooglePay => "****-google-pay".to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for PaymentStub {
    async fn process_payment(&self, request: &PaymentRequest) -> AppResult<PaymentResult> {
        tokio::time::sleep(self.delay).await;

        let transaction_id = Self::transaction_id();
        let metadata = HashMap::from([
            ("processor".to_string(), PROCESSOR_NAME.to_string()),
            ("timestamp".to_string(), Utc::now().timestamp_millis().to_string()),
            (
                "last4".to_string(),
                Self::masked_method(request.payment_method_type),
            ),
        ]);

        tracing::info!(
            user_id = %request.user_id,
            amount_cents = request.amount_cents,
            transaction_id = %transaction_id,
            "Stub payment approved"
        );

        Ok(PaymentResult::approved(transaction_id, metadata))
    }

    async fn cancel_recurring_payment(&self, subscription_id: Uuid) -> AppResult<()> {
        tracing::info!(subscription_id = %subscription_id, "Stub recurring payment cancelled");
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
