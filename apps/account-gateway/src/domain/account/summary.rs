//! Combined account and holdings view.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{AccountSnapshot, Position};

/// An account snapshot together with the positions fetched right after it.
///
/// Built from two provider responses, so the account totals and the
/// positions may differ slightly if the market moved between the reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    /// The account snapshot.
    pub account: AccountSnapshot,
    /// Held positions, empty when the account holds nothing.
    pub positions: Vec<Position>,
}

impl AccountSummary {
    /// Sum of the positions' market values.
    #[must_use]
    pub fn positions_market_value(&self) -> Decimal {
        self.positions.iter().map(|p| p.market_value).sum()
    }

    /// Sum of the positions' unrealized P&L.
    #[must_use]
    pub fn total_unrealized_pnl(&self) -> Decimal {
        self.positions.iter().map(|p| p.unrealized_pnl).sum()
    }
}
