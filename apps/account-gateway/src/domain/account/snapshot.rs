//! Account snapshot value object.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;

/// Lifecycle status of a brokerage account.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccountStatus {
    /// Application is being filled out.
    Onboarding,
    /// Application submitted for review.
    Submitted,
    /// Account details updated and pending review.
    AccountUpdated,
    /// Awaiting final approval.
    ApprovalPending,
    /// Account is open and usable.
    Active,
    /// Application rejected.
    Rejected,
    /// Account closed or dormant.
    Inactive,
    /// Account disabled by the provider.
    Disabled,
    /// Any status this crate does not know about, kept verbatim.
    Other(String),
}

impl AccountStatus {
    /// Parse the provider's status string (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "ONBOARDING" => Self::Onboarding,
            "SUBMITTED" => Self::Submitted,
            "ACCOUNT_UPDATED" => Self::AccountUpdated,
            "APPROVAL_PENDING" => Self::ApprovalPending,
            "ACTIVE" => Self::Active,
            "REJECTED" | "SUBMISSION_FAILED" => Self::Rejected,
            "INACTIVE" | "ACCOUNT_CLOSED" => Self::Inactive,
            "DISABLED" => Self::Disabled,
            _ => Self::Other(value.to_string()),
        }
    }

    /// Status as an uppercase wire-style string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Onboarding => "ONBOARDING",
            Self::Submitted => "SUBMITTED",
            Self::AccountUpdated => "ACCOUNT_UPDATED",
            Self::ApprovalPending => "APPROVAL_PENDING",
            Self::Active => "ACTIVE",
            Self::Rejected => "REJECTED",
            Self::Inactive => "INACTIVE",
            Self::Disabled => "DISABLED",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AccountStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A self-consistent, point-in-time read of an account.
///
/// All fields come from a single provider response. Two snapshots taken by
/// separate calls are not guaranteed to agree with each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSnapshot {
    /// Provider account ID.
    pub account_id: String,
    /// Human-facing account number.
    pub account_number: String,
    /// Account status.
    pub status: AccountStatus,
    /// Account currency (ISO code).
    pub currency: String,
    /// Settled cash balance.
    pub cash: Decimal,
    /// Buying power available for new positions.
    pub buying_power: Decimal,
    /// Total equity (cash + long market value - short market value).
    pub equity: Decimal,
    /// Equity as of the previous trading day's close.
    pub last_equity: Decimal,
    /// Portfolio value, when the provider reports it.
    pub portfolio_value: Option<Decimal>,
    /// Market value of long positions.
    pub long_market_value: Decimal,
    /// Market value of short positions (reported as a non-positive number).
    pub short_market_value: Decimal,
    /// Day trading buying power, when the provider reports it.
    pub daytrading_buying_power: Option<Decimal>,
    /// Day trades in the rolling 5-day window.
    pub daytrade_count: u32,
    /// Whether the account is flagged as a pattern day trader.
    pub pattern_day_trader: bool,
    /// Whether new trades are blocked.
    pub trading_blocked: bool,
    /// Whether the whole account is blocked.
    pub account_blocked: bool,
    /// When the provider response was received.
    pub as_of: DateTime<Utc>,
}

impl AccountSnapshot {
    /// Change in equity since the previous close.
    #[must_use]
    pub fn day_change(&self) -> Decimal {
        self.equity - self.last_equity
    }

    /// Whether the account can currently place trades.
    #[must_use]
    pub fn is_tradable(&self) -> bool {
        self.status == AccountStatus::Active && !self.trading_blocked && !self.account_blocked
    }
}
