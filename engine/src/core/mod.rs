//! Shared primitives: money, taxes, hashing

pub mod hash;
pub mod money;
pub mod tax;

pub use money::{Cents, Rate};
pub use tax::{TaxAmounts, TaxConstants};
