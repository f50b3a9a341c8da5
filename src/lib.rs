//! ledger-core - In-memory transaction ledger engine
//!
//! This library implements the storage and query engine for a single-user
//! transaction ledger. Records live in one date-sorted in-memory store that
//! is loaded from a flat tab-separated file, queried through a date-bounded
//! active slice, and rewritten wholesale on save.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `error`: Custom error types
//! - `models`: Core value types (packed dates, cent amounts, transactions)
//! - `assoc`: Insertion-ordered associative store used for aggregation
//! - `store`: The date-sorted transaction store and its active slice
//! - `storage`: Flat-file persistence with atomic rewrite
//! - `tree`: Year/month/day hierarchy rendered over the active slice
//!
//! # Example
//!
//! ```rust,ignore
//! use ledger_core::{load_ledger, save_ledger, Date};
//!
//! let mut store = load_ledger("ledger.txt")?;
//! store.set_slice(Date::from_ymd(2026, 1, 1), Date::from_ymd(2026, 12, 31));
//! println!("{}", store.slice_total());
//! save_ledger("ledger.txt", &store)?;
//! ```

pub mod assoc;
pub mod error;
pub mod models;
pub mod storage;
pub mod store;
pub mod tree;

pub use assoc::{AssocStore, SortField, StoreKey};
pub use error::{LedgerError, LedgerResult};
pub use models::{parse_date_spec, parse_month_spec, parse_year_spec, Date, Money, Transaction};
pub use storage::{load_ledger, save_ledger};
pub use store::{Flow, TransactionStore, MAX_RECORDS};
pub use tree::TransactionTree;
