//! Hierarchical year → month → day view of the active slice
//!
//! A [`TransactionTree`] is an ephemeral index over the store's active
//! slice: day nodes borrow contiguous runs of same-date transactions
//! straight out of the store (never copied), so a tree is built, printed
//! once, and dropped. The borrow ties the tree's lifetime to the store,
//! which keeps the store immutable for as long as the tree exists.

use std::io::{self, Write};

use crate::assoc::{AssocStore, SortField};
use crate::error::LedgerResult;
use crate::models::{Date, Money, Transaction};
use crate::store::TransactionStore;

const TEE: &str = "├── ";
const ELBOW: &str = "└── ";
const PIPE: &str = "│   ";
const BLANK: &str = "    ";
const DASH: &str = "─";

/// Minimum number of dash fill characters in a value field
const MIN_DASHES: usize = 2;

/// Transaction indices within a day start at this number
const FIRST_INDEX: usize = 1;

/// Contiguous child range at the next level down
#[derive(Debug, Clone, Copy)]
struct NodeRange {
    first: usize,
    len: usize,
}

/// A year or month node; children are tree nodes
#[derive(Debug)]
struct BranchNode {
    id: i32,
    children: NodeRange,
}

/// A day node; children are a borrowed run of same-date transactions
#[derive(Debug)]
struct DayNode<'a> {
    day: i32,
    run: &'a [Transaction],
}

/// Year → month → day hierarchy over a store's active slice
///
/// Children of every node are contiguous and ascending: years ascend in
/// `years`, each year's months occupy a contiguous ascending range of
/// `months`, and likewise for days, because day nodes are emitted from
/// the date-sorted key set.
#[derive(Debug)]
pub struct TransactionTree<'a> {
    days: Vec<DayNode<'a>>,
    months: Vec<BranchNode>,
    years: Vec<BranchNode>,
}

impl<'a> TransactionTree<'a> {
    /// Build a tree over the store's active slice
    ///
    /// One scan collects the distinct dates, year-months, and years
    /// (same-date records are contiguous thanks to the sort invariant);
    /// day nodes are then emitted in date order, opening month and year
    /// nodes whenever the key changes; a second scan attaches each day
    /// node its borrowed run of transactions.
    pub fn build(store: &'a TransactionStore) -> LedgerResult<Self> {
        let slice = store.active_slice();

        let mut date_keys: AssocStore<i64> = AssocStore::new()?;
        let mut month_keys: AssocStore<i64> = AssocStore::new()?;
        let mut year_keys: AssocStore<i64> = AssocStore::new()?;
        let mut i = 0;
        while i < slice.len() {
            let raw = slice[i].date().raw() as i64;
            while i < slice.len() && slice[i].date().raw() as i64 == raw {
                i += 1;
            }
            date_keys.insert(raw, 0)?;
            month_keys.insert(raw / 100, 0)?;
            year_keys.insert(raw / 10000, 0)?;
        }

        let mut days: Vec<DayNode> = Vec::new();
        days.try_reserve_exact(date_keys.count())?;
        let mut months: Vec<BranchNode> = Vec::new();
        months.try_reserve_exact(month_keys.count())?;
        let mut years: Vec<BranchNode> = Vec::new();
        years.try_reserve_exact(year_keys.count())?;

        date_keys.sort(SortField::Key, true);

        let mut prev: Option<(i32, i32)> = None;
        for (&raw, _) in date_keys.iter() {
            let date = Date::from_raw(raw as i32);
            let (y, m) = (date.year(), date.month());
            match prev {
                Some(p) if p == (y, m) => {
                    let last = months.len() - 1;
                    months[last].children.len += 1;
                }
                _ => {
                    months.push(BranchNode {
                        id: m,
                        children: NodeRange {
                            first: days.len(),
                            len: 1,
                        },
                    });
                    match prev {
                        Some((py, _)) if py == y => {
                            let last = years.len() - 1;
                            years[last].children.len += 1;
                        }
                        _ => years.push(BranchNode {
                            id: y,
                            children: NodeRange {
                                first: months.len() - 1,
                                len: 1,
                            },
                        }),
                    }
                }
            }
            days.push(DayNode {
                day: date.day(),
                run: &[],
            });
            prev = Some((y, m));
        }

        // attach each day its contiguous run of same-date transactions
        let mut k = 0;
        let mut i = 0;
        while i < slice.len() {
            let date = slice[i].date();
            let mut j = i + 1;
            while j < slice.len() && slice[j].date() == date {
                j += 1;
            }
            days[k].run = &slice[i..j];
            k += 1;
            i = j;
        }

        Ok(Self {
            days,
            months,
            years,
        })
    }

    /// Number of year nodes
    pub fn year_count(&self) -> usize {
        self.years.len()
    }

    /// Number of month nodes
    pub fn month_count(&self) -> usize {
        self.months.len()
    }

    /// Number of day nodes
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Number of transactions reachable through the tree
    pub fn transaction_count(&self) -> usize {
        self.days.iter().map(|d| d.run.len()).sum()
    }

    /// Uniform width of the index + dashes + amount field, in characters
    ///
    /// Computed once over every transaction in the tree so all value
    /// fields right-align.
    fn value_field_width(&self) -> usize {
        let max_index = self
            .days
            .iter()
            .map(|d| d.run.len() - 1 + FIRST_INDEX)
            .max()
            .unwrap_or(FIRST_INDEX);
        let max_amount = self
            .days
            .iter()
            .flat_map(|d| d.run.iter())
            .map(|t| amount_field(t.amount()).len())
            .max()
            .unwrap_or(0);
        max_index.to_string().len() + max_amount + MIN_DASHES + 2
    }

    fn write_value_field<W: Write>(
        out: &mut W,
        index: usize,
        amount: Money,
        width: usize,
    ) -> io::Result<()> {
        let index = index.to_string();
        let field = amount_field(amount);
        let dashes = width.saturating_sub(index.len() + 2 + field.len());
        write!(out, "{index} {} {field}", DASH.repeat(dashes))
    }

    /// Print the tree depth-first; returns the number of lines written
    pub fn print<W: Write>(&self, out: &mut W) -> io::Result<usize> {
        let width = self.value_field_width();
        let mut lines = 0;

        for year in &self.years {
            writeln!(out, "{:04}", year.id)?;
            lines += 1;

            let months = &self.months[year.children.first..year.children.first + year.children.len];
            for (mi, month) in months.iter().enumerate() {
                let month_last = mi + 1 == months.len();
                writeln!(out, "{}{}", branch(month_last), Date::month_abbr(month.id))?;
                lines += 1;
                let year_prefix = if month_last { BLANK } else { PIPE };

                let days =
                    &self.days[month.children.first..month.children.first + month.children.len];
                for (di, day) in days.iter().enumerate() {
                    let day_last = di + 1 == days.len();
                    writeln!(
                        out,
                        "{}{}{}{}",
                        year_prefix,
                        branch(day_last),
                        day.day,
                        ordinal_suffix(day.day)
                    )?;
                    lines += 1;
                    let month_prefix = if day_last { BLANK } else { PIPE };

                    for (ri, txn) in day.run.iter().enumerate() {
                        let txn_last = ri + 1 == day.run.len();
                        write!(out, "{year_prefix}{month_prefix}{}", branch(txn_last))?;
                        Self::write_value_field(out, ri + FIRST_INDEX, txn.amount(), width)?;
                        if txn.description().is_empty() {
                            writeln!(out, " {}", txn.category())?;
                        } else {
                            writeln!(out, " {}: {}", txn.category(), txn.description())?;
                        }
                        lines += 1;
                    }
                }
            }
        }
        Ok(lines)
    }
}

/// Branch glyph for an interior or final child
fn branch(last: bool) -> &'static str {
    if last {
        ELBOW
    } else {
        TEE
    }
}

/// Amount column text: negatives parenthesized, positives given a
/// compensating trailing space so columns align
fn amount_field(amount: Money) -> String {
    if amount.is_negative() {
        format!("({})", amount.abs())
    } else {
        format!("{amount} ")
    }
}

/// English ordinal suffix for a day of month
fn ordinal_suffix(day: i32) -> &'static str {
    if day / 10 % 10 == 1 {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}
