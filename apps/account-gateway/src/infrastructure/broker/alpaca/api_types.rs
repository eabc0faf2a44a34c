//! Alpaca API response types.
//!
//! These types map directly to Alpaca's REST API format. Numeric fields
//! arrive as strings and are parsed exactly into `Decimal`.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::error::AlpacaError;
use crate::domain::account::{AccountSnapshot, AccountStatus, Position, PositionSide};
use crate::domain::shared::Symbol;

// ============================================================================
// Account Types
// ============================================================================

/// Account response from `GET /v2/account`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaAccountResponse {
    /// Account ID.
    pub id: String,
    /// Account number.
    #[serde(default)]
    pub account_number: String,
    /// Account status.
    pub status: String,
    /// Account currency.
    #[serde(default)]
    pub currency: Option<String>,
    /// Cash balance.
    pub cash: String,
    /// Buying power.
    pub buying_power: String,
    /// Account equity.
    pub equity: String,
    /// Equity at previous close.
    pub last_equity: String,
    /// Portfolio value.
    #[serde(default)]
    pub portfolio_value: Option<String>,
    /// Long market value.
    pub long_market_value: String,
    /// Short market value.
    pub short_market_value: String,
    /// Day trading buying power.
    #[serde(default)]
    pub daytrading_buying_power: Option<String>,
    /// Day trade count.
    #[serde(default)]
    pub daytrade_count: Option<u32>,
    /// Pattern day trader flag.
    #[serde(default)]
    pub pattern_day_trader: Option<bool>,
    /// Trading blocked flag.
    #[serde(default)]
    pub trading_blocked: Option<bool>,
    /// Account blocked flag.
    #[serde(default)]
    pub account_blocked: Option<bool>,
}

impl AlpacaAccountResponse {
    /// Convert to a domain snapshot stamped with the receive time.
    pub fn into_snapshot(self, as_of: DateTime<Utc>) -> Result<AccountSnapshot, AlpacaError> {
        if self.id.trim().is_empty() {
            return Err(AlpacaError::InvalidField {
                field: "id",
                value: self.id,
            });
        }

        Ok(AccountSnapshot {
            cash: parse_decimal("cash", &self.cash)?,
            buying_power: parse_decimal("buying_power", &self.buying_power)?,
            equity: parse_decimal("equity", &self.equity)?,
            last_equity: parse_decimal("last_equity", &self.last_equity)?,
            portfolio_value: parse_optional_decimal(
                "portfolio_value",
                self.portfolio_value.as_deref(),
            )?,
            long_market_value: parse_decimal("long_market_value", &self.long_market_value)?,
            short_market_value: parse_decimal("short_market_value", &self.short_market_value)?,
            daytrading_buying_power: parse_optional_decimal(
                "daytrading_buying_power",
                self.daytrading_buying_power.as_deref(),
            )?,
            status: AccountStatus::parse(&self.status),
            currency: self.currency.unwrap_or_else(|| "USD".to_string()),
            daytrade_count: self.daytrade_count.unwrap_or(0),
            pattern_day_trader: self.pattern_day_trader.unwrap_or(false),
            trading_blocked: self.trading_blocked.unwrap_or(false),
            account_blocked: self.account_blocked.unwrap_or(false),
            account_id: self.id,
            account_number: self.account_number,
            as_of,
        })
    }
}

// ============================================================================
// Position Types
// ============================================================================

/// Position response from `GET /v2/positions`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaPositionResponse {
    /// Symbol.
    pub symbol: String,
    /// Asset class.
    #[serde(default)]
    pub asset_class: Option<String>,
    /// Quantity.
    pub qty: String,
    /// Side (long/short).
    pub side: String,
    /// Average entry price.
    pub avg_entry_price: String,
    /// Market value.
    pub market_value: String,
    /// Cost basis.
    pub cost_basis: String,
    /// Current price.
    #[serde(default)]
    pub current_price: Option<String>,
    /// Unrealized P&L.
    pub unrealized_pl: String,
    /// Unrealized P&L percent (fraction).
    #[serde(default)]
    pub unrealized_plpc: Option<String>,
}

impl AlpacaPositionResponse {
    /// Convert to a domain position.
    pub fn into_position(self) -> Result<Position, AlpacaError> {
        let symbol = Symbol::new(self.symbol);
        if symbol.is_empty() {
            return Err(AlpacaError::InvalidField {
                field: "symbol",
                value: String::new(),
            });
        }

        Ok(Position {
            quantity: parse_decimal("qty", &self.qty)?,
            avg_entry_price: parse_decimal("avg_entry_price", &self.avg_entry_price)?,
            current_price: parse_optional_decimal("current_price", self.current_price.as_deref())?,
            market_value: parse_decimal("market_value", &self.market_value)?,
            cost_basis: parse_decimal("cost_basis", &self.cost_basis)?,
            unrealized_pnl: parse_decimal("unrealized_pl", &self.unrealized_pl)?,
            unrealized_pnl_pct: parse_optional_decimal(
                "unrealized_plpc",
                self.unrealized_plpc.as_deref(),
            )?,
            side: PositionSide::parse(&self.side),
            asset_class: self.asset_class.unwrap_or_default(),
            symbol,
        })
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error response from Alpaca API.
///
/// `code` is numeric on most endpoints but is accepted as any JSON scalar.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaErrorResponse {
    /// Error code.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    /// Error message.
    #[serde(default)]
    pub message: Option<String>,
}

impl AlpacaErrorResponse {
    /// Error code rendered as a string.
    #[must_use]
    pub fn code_string(&self) -> Option<String> {
        match self.code.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a required decimal field.
fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, AlpacaError> {
    let trimmed = value.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| AlpacaError::InvalidField {
            field,
            value: value.to_string(),
        })
}

/// Parse an optional decimal field; absent or empty means `None`.
fn parse_optional_decimal(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<Decimal>, AlpacaError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_decimal(field, v).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const ACCOUNT_JSON: &str = r#"{
        "id": "904837e3-3b76-47ec-b432-046db621571b",
        "account_number": "PA2J4TCAPC2A",
        "status": "ACTIVE",
        "currency": "USD",
        "cash": "100000.123456789",
        "buying_power": "400000.5",
        "equity": "100250.10",
        "last_equity": "100000",
        "portfolio_value": "100250.10",
        "long_market_value": "250.10",
        "short_market_value": "0",
        "daytrading_buying_power": "400000",
        "daytrade_count": 2,
        "pattern_day_trader": false,
        "trading_blocked": false,
        "account_blocked": false,
        "crypto_status": "ACTIVE"
    }"#;

    const POSITION_JSON: &str = r#"{
        "asset_id": "b0b6dd9d-8b9b-48a9-ba46-b9d54906e415",
        "symbol": "AAPL",
        "exchange": "NASDAQ",
        "asset_class": "us_equity",
        "qty": "10",
        "side": "long",
        "avg_entry_price": "150.25",
        "market_value": "1600.00",
        "cost_basis": "1502.50",
        "unrealized_pl": "97.50",
        "unrealized_plpc": "0.0648918469217970",
        "current_price": "160.00"
    }"#;

    #[test]
    fn account_response_converts_exactly() {
        let response: AlpacaAccountResponse = serde_json::from_str(ACCOUNT_JSON).unwrap();
        let snapshot = response.into_snapshot(Utc::now()).unwrap();

        assert_eq!(snapshot.cash, dec!(100000.123456789));
        assert_eq!(snapshot.buying_power, dec!(400000.5));
        assert_eq!(snapshot.day_change(), dec!(250.10));
        assert_eq!(snapshot.status, AccountStatus::Active);
        assert_eq!(snapshot.daytrade_count, 2);
        assert_eq!(snapshot.portfolio_value, Some(dec!(100250.10)));
    }

    #[test]
    fn account_optional_fields_default() {
        let json = r#"{
            "id": "acc", "status": "ACTIVE", "cash": "1", "buying_power": "2",
            "equity": "3", "last_equity": "3", "long_market_value": "0",
            "short_market_value": "0"
        }"#;
        let response: AlpacaAccountResponse = serde_json::from_str(json).unwrap();
        let snapshot = response.into_snapshot(Utc::now()).unwrap();
        assert_eq!(snapshot.currency, "USD");
        assert_eq!(snapshot.portfolio_value, None);
        assert!(!snapshot.pattern_day_trader);
    }

    #[test]
    fn unparseable_cash_is_rejected_not_zeroed() {
        let json = ACCOUNT_JSON.replace("\"100000.123456789\"", "\"n/a\"");
        let response: AlpacaAccountResponse = serde_json::from_str(&json).unwrap();
        let err = response.into_snapshot(Utc::now()).unwrap_err();
        assert_eq!(
            err,
            AlpacaError::InvalidField {
                field: "cash",
                value: "n/a".to_string()
            }
        );
    }

    #[test]
    fn null_cash_fails_to_decode() {
        let json = ACCOUNT_JSON.replace("\"100000.123456789\"", "null");
        assert!(serde_json::from_str::<AlpacaAccountResponse>(&json).is_err());
    }

    #[test]
    fn position_response_converts() {
        let response: AlpacaPositionResponse = serde_json::from_str(POSITION_JSON).unwrap();
        let position = response.into_position().unwrap();

        assert_eq!(position.symbol.as_str(), "AAPL");
        assert_eq!(position.quantity, dec!(10));
        assert_eq!(position.market_value, dec!(1600.00));
        assert_eq!(position.unrealized_pnl, dec!(97.50));
        assert_eq!(position.current_price, Some(dec!(160.00)));
        assert!(!position.is_short());
    }

    #[test]
    fn short_position_keeps_signed_quantity() {
        let json = POSITION_JSON
            .replace("\"qty\": \"10\"", "\"qty\": \"-5\"")
            .replace("\"side\": \"long\"", "\"side\": \"short\"");
        let position: Position = serde_json::from_str::<AlpacaPositionResponse>(&json)
            .unwrap()
            .into_position()
            .unwrap();
        assert!(position.is_short());
        assert_eq!(position.quantity, dec!(-5));
    }

    #[test]
    fn fractional_crypto_quantity_is_exact() {
        assert_eq!(
            parse_decimal("qty", "0.000123456789012345").unwrap(),
            dec!(0.000123456789012345)
        );
    }

    #[test]
    fn scientific_notation_is_accepted() {
        assert_eq!(parse_decimal("qty", "1.5e-3").unwrap(), dec!(0.0015));
    }

    #[test]
    fn optional_decimal_empty_is_none() {
        assert_eq!(parse_optional_decimal("current_price", Some("")).unwrap(), None);
        assert_eq!(parse_optional_decimal("current_price", None).unwrap(), None);
    }

    #[test]
    fn error_response_numeric_code() {
        let err: AlpacaErrorResponse =
            serde_json::from_str(r#"{"code": 40110000, "message": "request is not authorized"}"#)
                .unwrap();
        assert_eq!(err.code_string(), Some("40110000".to_string()));
        assert_eq!(err.message.as_deref(), Some("request is not authorized"));
    }

    #[test]
    fn error_response_without_code() {
        let err: AlpacaErrorResponse = serde_json::from_str(r#"{"message": "forbidden."}"#).unwrap();
        assert_eq!(err.code_string(), None);
    }
}
