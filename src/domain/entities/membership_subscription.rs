use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Lifecycle state of a membership subscription.
///
/// ```text
/// PENDING ──> TRIALING ──> ACTIVE ──> SUSPENDED
///    │            │           │  ^        │
///    └──> ACTIVE  │           │  └────────┤
///                 ▼           ▼           ▼
///          CANCELLED / EXPIRED (terminal)
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
    AsRefStr,
    Display,
    EnumString,
)]
#[sqlx(type_name = "subscription_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SubscriptionStatus {
    Pending,
    Trialing,
    Active,
    Cancelled,
    Expired,
    Suspended,
}

impl SubscriptionStatus {
    /// Statuses that grant membership benefits. A user holds at most one.
    pub const MEMBER_STATUSES: [SubscriptionStatus; 2] =
        [SubscriptionStatus::Active, SubscriptionStatus::Trialing];

    /// Statuses included in a user's subscription history.
    pub const HISTORY_STATUSES: [SubscriptionStatus; 3] = [
        SubscriptionStatus::Active,
        SubscriptionStatus::Trialing,
        SubscriptionStatus::Cancelled,
    ];

    pub fn is_member(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubscriptionStatus::Cancelled | SubscriptionStatus::Expired)
    }

    pub fn valid_transitions(&self) -> &'static [SubscriptionStatus] {
        match self {
            SubscriptionStatus::Pending => {
                &[SubscriptionStatus::Trialing, SubscriptionStatus::Active]
            }
            SubscriptionStatus::Trialing => &[
                SubscriptionStatus::Active,
                SubscriptionStatus::Cancelled,
                SubscriptionStatus::Expired,
            ],
            SubscriptionStatus::Active => &[
                SubscriptionStatus::Cancelled,
                SubscriptionStatus::Expired,
                SubscriptionStatus::Suspended,
            ],
            SubscriptionStatus::Suspended => {
                &[SubscriptionStatus::Active, SubscriptionStatus::Cancelled]
            }
            SubscriptionStatus::Cancelled | SubscriptionStatus::Expired => &[],
        }
    }

    pub fn can_transition_to(&self, next: SubscriptionStatus) -> bool {
        self.valid_transitions().contains(&next)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
    AsRefStr,
    Display,
    EnumString,
)]
#[sqlx(type_name = "payment_method_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum PaymentMethodType {
    CreditCard,
    DebitCard,
    Paypal,
    ApplePay,
    GooglePay,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SubscriptionStatus; 6] = [
        SubscriptionStatus::Pending,
        SubscriptionStatus::Trialing,
        SubscriptionStatus::Active,
        SubscriptionStatus::Cancelled,
        SubscriptionStatus::Expired,
        SubscriptionStatus::Suspended,
    ];

    #[test]
    fn member_statuses() {
        assert!(SubscriptionStatus::Active.is_member());
        assert!(SubscriptionStatus::Trialing.is_member());
        assert!(!SubscriptionStatus::Pending.is_member());
        assert!(!SubscriptionStatus::Suspended.is_member());
        assert!(!SubscriptionStatus::Cancelled.is_member());
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for status in ALL.iter().filter(|s| s.is_terminal()) {
            for next in ALL {
                assert!(!status.can_transition_to(next), "{status} -> {next}");
            }
        }
    }

    #[test]
    fn trial_can_convert_or_end() {
        let trial = SubscriptionStatus::Trialing;
        assert!(trial.can_transition_to(SubscriptionStatus::Active));
        assert!(trial.can_transition_to(SubscriptionStatus::Cancelled));
        assert!(trial.can_transition_to(SubscriptionStatus::Expired));
        assert!(!trial.can_transition_to(SubscriptionStatus::Suspended));
        assert!(!trial.can_transition_to(SubscriptionStatus::Pending));
    }

    #[test]
    fn suspended_can_resume() {
        assert!(SubscriptionStatus::Suspended.can_transition_to(SubscriptionStatus::Active));
        assert!(SubscriptionStatus::Active.can_transition_to(SubscriptionStatus::Suspended));
        assert!(!SubscriptionStatus::Suspended.can_transition_to(SubscriptionStatus::Expired));
    }

    #[test]
    fn no_self_transitions() {
        for status in ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&SubscriptionStatus::Trialing).unwrap(),
            "\"TRIALING\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethodType::ApplePay).unwrap(),
            "\"APPLE_PAY\""
        );
        assert_eq!(
            "credit_card".parse::<PaymentMethodType>().unwrap(),
            PaymentMethodType::CreditCard
        );
    }
}
