//! Transaction model
//!
//! A single ledger entry: a valid date, a bounded nonzero amount in cents,
//! a lowercase category, and an optional description. Transactions are
//! built only through the validating [`Transaction::new`] factory, so any
//! `Transaction` value in the program satisfies all field constraints.
//!
//! The serialized form is one TAB-delimited line:
//!
//! ```text
//! yyyy-mm-dd<TAB><signed-cents><TAB><category><TAB><description>
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::date::Date;
use super::money::Money;
use crate::error::{LedgerError, LedgerResult};

/// A financial transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTransaction")]
pub struct Transaction {
    date: Date,
    amount: Money,
    category: String,
    description: String,
}

/// Unvalidated mirror of [`Transaction`] used to funnel serde
/// deserialization through the validating factory
#[derive(Deserialize)]
struct RawTransaction {
    date: Date,
    amount: Money,
    category: String,
    description: String,
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = LedgerError;

    fn try_from(raw: RawTransaction) -> LedgerResult<Self> {
        Self::new(raw.date, raw.amount, &raw.category, &raw.description)
    }
}

impl Transaction {
    /// Maximum category length in bytes
    pub const MAX_CATEGORY_LEN: usize = 23;

    /// Maximum description length in bytes
    pub const MAX_DESCRIPTION_LEN: usize = 91;

    /// Longest possible serialized line in bytes
    pub const MAX_LINE_LEN: usize = 10 + 1 + 20 + 1 + Self::MAX_CATEGORY_LEN + 1 + Self::MAX_DESCRIPTION_LEN;

    /// Create a validated transaction
    ///
    /// The category is lowercased before the length check. Returns
    /// [`LedgerError::InvalidArgument`] if any field is out of contract:
    /// invalid date; zero or out-of-range amount; empty, overlong, or
    /// TAB/newline-carrying category; overlong or TAB/newline-carrying
    /// description.
    pub fn new(
        date: Date,
        amount: Money,
        category: &str,
        description: &str,
    ) -> LedgerResult<Self> {
        if !date.is_valid() {
            return Err(LedgerError::invalid("date", format!("{date} is not a real date")));
        }
        if !amount.in_transaction_range() {
            return Err(LedgerError::invalid(
                "amount",
                format!("{} cents is zero or out of range", amount.cents()),
            ));
        }

        let category = category.to_lowercase();
        if category.is_empty() {
            return Err(LedgerError::invalid("category", "must not be empty"));
        }
        if category.len() > Self::MAX_CATEGORY_LEN {
            return Err(LedgerError::invalid(
                "category",
                format!("exceeds {} bytes", Self::MAX_CATEGORY_LEN),
            ));
        }
        if category.contains(['\t', '\n']) {
            return Err(LedgerError::invalid("category", "must not contain TAB or newline"));
        }

        if description.len() > Self::MAX_DESCRIPTION_LEN {
            return Err(LedgerError::invalid(
                "description",
                format!("exceeds {} bytes", Self::MAX_DESCRIPTION_LEN),
            ));
        }
        if description.contains(['\t', '\n']) {
            return Err(LedgerError::invalid(
                "description",
                "must not contain TAB or newline",
            ));
        }

        Ok(Self {
            date,
            amount,
            category,
            description: description.to_string(),
        })
    }

    /// The transaction date
    pub fn date(&self) -> Date {
        self.date
    }

    /// The signed amount in cents
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// The lowercase category
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The description; may be empty
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Serialize to one TAB-delimited line (no trailing newline)
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.date,
            self.amount.cents(),
            self.category,
            self.description
        )
    }

    /// Deserialize a TAB-delimited line; the exact inverse of
    /// [`to_line`](Self::to_line)
    ///
    /// Requires exactly four TAB-delimited fields. Any TABs past the third
    /// fold into the description, which then fails description validation.
    pub fn from_line(line: &str) -> LedgerResult<Self> {
        let mut fields = line.splitn(4, '\t');
        let (date, amount, category, description) = match (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) {
            (Some(d), Some(a), Some(c), Some(x)) => (d, a, c, x),
            _ => {
                return Err(LedgerError::invalid(
                    "record line",
                    "expected four TAB-delimited fields",
                ))
            }
        };

        let date = Date::parse_iso(date)
            .ok_or_else(|| LedgerError::invalid("date", format!("'{date}' is not yyyy-mm-dd")))?;
        let cents = amount
            .parse::<i64>()
            .map_err(|_| LedgerError::invalid("amount", format!("'{amount}' is not an integer")))?;

        Self::new(date, Money::from_cents(cents), category, description)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.date, self.amount, self.category)
    }
}
