//! Position value object.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::shared::Symbol;

/// Direction of a held position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    /// Long position.
    Long,
    /// Short position.
    Short,
}

impl PositionSide {
    /// Parse the provider's side string. Anything other than "short" is long.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("short") {
            Self::Short
        } else {
            Self::Long
        }
    }
}

/// One held instrument at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Asset class reported by the provider (e.g. "us_equity", "crypto").
    pub asset_class: String,
    /// Long or short.
    pub side: PositionSide,
    /// Quantity held (negative for short positions).
    pub quantity: Decimal,
    /// Average entry price.
    pub avg_entry_price: Decimal,
    /// Last traded price, when available.
    pub current_price: Option<Decimal>,
    /// Current market value.
    pub market_value: Decimal,
    /// Total cost basis.
    pub cost_basis: Decimal,
    /// Unrealized profit/loss.
    pub unrealized_pnl: Decimal,
    /// Unrealized profit/loss as a fraction of cost basis, when available.
    pub unrealized_pnl_pct: Option<Decimal>,
}

impl Position {
    /// Whether this is a short position.
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.side == PositionSide::Short
    }
}
