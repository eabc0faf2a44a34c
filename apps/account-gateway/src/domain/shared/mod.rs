//! Shared value objects.

mod symbol;

pub use symbol::Symbol;
