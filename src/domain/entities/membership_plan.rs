use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// How often a paid membership renews.
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
#[sqlx(type_name = "billing_cycle", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum BillingCycle {
    Weekly,
    Monthly,
    Annually,
}

impl BillingCycle {
    pub fn display_name(&self) -> &'static str {
        match self {
            BillingCycle::Weekly => "Weekly",
            BillingCycle::Monthly => "Monthly",
            BillingCycle::Annually => "Annually",
        }
    }

    /// The next billing instant one full cycle after `from`.
    ///
    /// Monthly and annual cycles use calendar arithmetic, clamping to the
    /// last day of shorter months (Jan 31 + 1 month = Feb 28/29).
    /// Returns `None` only when the result is out of chrono's range.
    pub fn advance(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            BillingCycle::Weekly => from.checked_add_signed(Duration::weeks(1)),
            BillingCycle::Monthly => from.checked_add_months(Months::new(1)),
            BillingCycle::Annually => from.checked_add_months(Months::new(12)),
        }
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
#[sqlx(type_name = "plan_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum PlanType {
    Trial,
    Standard,
    Premium,
}

impl PlanType {
    pub fn is_paid(&self) -> bool {
        !matches!(self, PlanType::Trial)
    }
}

/// Formats a cent amount as a dollar string, e.g. `999` -> `$9.99`.
pub fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}
