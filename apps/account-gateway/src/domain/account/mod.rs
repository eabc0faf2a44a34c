//! Account Context
//!
//! Point-in-time views of a remote brokerage account. Every value here is
//! built from exactly one provider response and is owned by the caller once
//! returned; the gateway keeps no reference to it.

mod position;
mod snapshot;
mod summary;

pub use position::{Position, PositionSide};
pub use snapshot::{AccountSnapshot, AccountStatus};
pub use summary::AccountSummary;
