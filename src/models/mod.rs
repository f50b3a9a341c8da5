//! Core data models for the ledger
//!
//! This module contains the value types the engine is built from: packed
//! calendar dates, cent-denominated amounts, and validated transactions.

pub mod date;
pub mod money;
pub mod transaction;

pub use date::{parse_date_spec, parse_month_spec, parse_year_spec, Date};
pub use money::Money;
pub use transaction::Transaction;
