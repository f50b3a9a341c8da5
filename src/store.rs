//! Sorted transaction store with an active slice
//!
//! The store owns every transaction in the ledger as a single array kept
//! sorted non-decreasing by date at all times; same-date transactions stay
//! in insertion order (stable append). On top of the array sits the
//! **active slice**, a contiguous index range `[start, stop)` that all
//! read and aggregate operations work against. Inserting and deleting
//! shift the slice bounds so they keep naming the same semantic range.
//!
//! The ledger serves one caller per process: construct one store, use it,
//! drop it.

use std::io::{BufRead, Write};

use crate::assoc::{AssocStore, SortField};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Date, Money, Transaction};

/// Structural maximum number of records a store will bulk-load
pub const MAX_RECORDS: usize = 1_000_000;

/// Direction selector for [`TransactionStore::category_totals`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Non-negative amounts
    Inflow,
    /// Non-positive amounts
    Outflow,
}

/// The ledger-wide sorted array of transactions plus its active slice
#[derive(Debug, Default)]
pub struct TransactionStore {
    records: Vec<Transaction>,
    start: usize,
    stop: usize,
}

impl TransactionStore {
    /// Create an empty store with an empty active slice
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-load a store from newline-separated serialized lines
    ///
    /// All-or-nothing: the first line that is overlong, fails to
    /// deserialize, or breaks the date ordering aborts the load with
    /// [`LedgerError::CorruptData`] carrying its 1-based line number.
    /// More than [`MAX_RECORDS`] lines yield the distinct
    /// [`LedgerError::TooManyRecords`]. The active slice starts as the
    /// full range.
    pub fn from_reader<R: BufRead>(reader: R) -> LedgerResult<Self> {
        let mut records: Vec<Transaction> = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = i + 1;
            if records.len() == MAX_RECORDS {
                return Err(LedgerError::TooManyRecords { max: MAX_RECORDS });
            }
            if line.len() > Transaction::MAX_LINE_LEN {
                return Err(LedgerError::CorruptData { line: line_number });
            }
            let txn = Transaction::from_line(&line)
                .map_err(|_| LedgerError::CorruptData { line: line_number })?;
            if records.last().is_some_and(|prev| txn.date() < prev.date()) {
                return Err(LedgerError::CorruptData { line: line_number });
            }
            records.try_reserve(1)?;
            records.push(txn);
        }
        let stop = records.len();
        Ok(Self {
            records,
            start: 0,
            stop,
        })
    }

    /// Serialize every record (not just the active slice), one line each
    pub fn write_to<W: Write>(&self, writer: &mut W) -> LedgerResult<()> {
        for record in &self.records {
            writeln!(writer, "{}", record.to_line())?;
        }
        Ok(())
    }

    /// Access a record by index; `None` if out of bounds
    pub fn get(&self, index: usize) -> Option<&Transaction> {
        self.records.get(index)
    }

    /// Total number of records
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// First index of the active slice
    pub fn slice_start(&self) -> usize {
        self.start
    }

    /// Past-the-end index of the active slice
    pub fn slice_stop(&self) -> usize {
        self.stop
    }

    /// Number of records in the active slice
    pub fn slice_len(&self) -> usize {
        self.stop - self.start
    }

    /// The active slice as a borrowed run of records
    pub fn active_slice(&self) -> &[Transaction] {
        &self.records[self.start..self.stop]
    }

    /// Rightmost position at which a record dated `date` could be
    /// inserted with the array staying sorted
    fn upper_bound(&self, date: Date) -> usize {
        self.records.partition_point(|r| r.date() <= date)
    }

    /// Insert a transaction at its rightmost stable position
    ///
    /// A new transaction dated equal to existing ones lands after them.
    /// Slice bounds shift to keep covering the same records. Returns the
    /// insertion index.
    pub fn insert(&mut self, txn: Transaction) -> LedgerResult<usize> {
        self.records.try_reserve(1)?;
        let index = self.upper_bound(txn.date());
        self.records.insert(index, txn);
        // An empty slice at the insertion point must shift both bounds,
        // or start would overtake stop.
        if index < self.stop || index <= self.start {
            self.stop += 1;
        }
        if index <= self.start {
            self.start += 1;
        }
        Ok(index)
    }

    /// Delete a record by index; returns false if out of bounds
    pub fn delete(&mut self, index: usize) -> bool {
        if index >= self.records.len() {
            return false;
        }
        self.records.remove(index);
        if index < self.start {
            self.start -= 1;
        }
        if index < self.stop {
            self.stop -= 1;
        }
        true
    }

    /// Reset the active slice to the full array; returns the record count
    pub fn reset_slice(&mut self) -> usize {
        self.start = 0;
        self.stop = self.records.len();
        self.records.len()
    }

    /// Narrow the active slice to records dated within `[d0, d1]`
    ///
    /// Returns the resulting slice length. An inverted range (`d1 < d0`)
    /// produces an empty slice.
    pub fn set_slice(&mut self, d0: Date, d1: Date) -> usize {
        self.start = self.records.partition_point(|r| r.date() < d0);
        self.stop = self.upper_bound(d1).max(self.start);
        self.slice_len()
    }

    /// Keep only slice records whose category matches one of the patterns
    ///
    /// Patterns are `delimiter`-separated, matched case-insensitively as
    /// substrings; an empty pattern list matches everything. Records in
    /// the active slice matching no pattern are deleted from the store.
    /// Returns the resulting slice length.
    pub fn filter_category(&mut self, patterns: &str, delimiter: char) -> usize {
        self.filter_by(patterns, delimiter, |t| t.category().to_string())
    }

    /// Keep only slice records whose description matches one of the
    /// patterns; see [`filter_category`](Self::filter_category)
    pub fn filter_description(&mut self, patterns: &str, delimiter: char) -> usize {
        self.filter_by(patterns, delimiter, |t| t.description().to_lowercase())
    }

    fn filter_by<F>(&mut self, patterns: &str, delimiter: char, field: F) -> usize
    where
        F: Fn(&Transaction) -> String,
    {
        let needles: Vec<String> = patterns.split(delimiter).map(str::to_lowercase).collect();

        // Scan high to low so deletions never shift unvisited indices.
        let mut i = self.stop;
        while i > self.start {
            i -= 1;
            let haystack = field(&self.records[i]);
            if !needles.iter().any(|n| haystack.contains(n.as_str())) {
                self.delete(i);
            }
        }
        self.slice_len()
    }

    /// Net amount over the active slice
    pub fn slice_total(&self) -> Money {
        self.active_slice().iter().map(|t| t.amount()).sum()
    }

    /// Per-category totals over the active slice for one flow direction
    ///
    /// Inflow totals come back sorted largest first, outflow totals most
    /// negative first, so callers can render them directly.
    pub fn category_totals(&self, flow: Flow) -> LedgerResult<AssocStore<String>> {
        let mut totals = AssocStore::new()?;
        for txn in self.active_slice() {
            let keep = match flow {
                Flow::Inflow => !txn.amount().is_negative(),
                Flow::Outflow => !txn.amount().is_positive(),
            };
            if keep {
                totals.accumulate(txn.category().to_string(), txn.amount().cents())?;
            }
        }
        totals.sort(SortField::Value, flow == Flow::Outflow);
        Ok(totals)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    pub(crate) const REF_LEDGER: &str = "\
1999-01-01\t10\tabc\t
1999-01-01\t-20\tabc\t
1999-01-01\t1\txyz\t
1999-01-31\t-100\tdef\tbleh blah
1999-02-02\t700\txyz\t \n\
1999-12-31\t-600\txyz\t
2001-01-02\t51\tdef\tlate
2010-01-02\t-100000000000000\tabcdefghijklmnopqrstuvw\t
2010-12-02\t53\tcat2\t
2010-12-03\t54\tcat3\t
";

    pub(crate) fn ref_store() -> TransactionStore {
        TransactionStore::from_reader(Cursor::new(REF_LEDGER)).unwrap()
    }

    #[test]
    fn test_load_getters() {
        let store = ref_store();
        assert_eq!(store.count(), 10);
        assert_eq!(store.slice_start(), 0);
        assert_eq!(store.slice_stop(), 10);
        assert_eq!(store.slice_len(), 10);
        assert_eq!(store.get(0).unwrap().category(), "abc");
        assert!(store.get(10).is_none());
    }

    #[test]
    fn test_load_empty() {
        let store = TransactionStore::from_reader(Cursor::new("")).unwrap();
        assert_eq!(store.count(), 0);
        assert_eq!(store.slice_len(), 0);
    }

    #[test]
    fn test_write_round_trip() {
        let store = ref_store();
        let mut out = Vec::new();
        store.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), REF_LEDGER);
    }

    #[test]
    fn test_load_reports_corrupt_line() {
        let data = "1999-01-01\t10\tabc\t\n1999-01-02\tten\tabc\t\n";
        match TransactionStore::from_reader(Cursor::new(data)) {
            Err(LedgerError::CorruptData { line }) => assert_eq!(line, 2),
            other => panic!("expected CorruptData, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_out_of_order_lines() {
        let data = "1999-02-01\t10\tabc\t\n1999-01-01\t10\tabc\t\n";
        match TransactionStore::from_reader(Cursor::new(data)) {
            Err(LedgerError::CorruptData { line }) => assert_eq!(line, 2),
            other => panic!("expected CorruptData, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_overlong_line() {
        let data = format!("1999-01-01\t10\tabc\t{}\n", "d".repeat(200));
        match TransactionStore::from_reader(Cursor::new(data)) {
            Err(LedgerError::CorruptData { line }) => assert_eq!(line, 1),
            other => panic!("expected CorruptData, got {other:?}"),
        }
    }

    fn assert_slice(store: &mut TransactionStore, d0: i32, d1: i32, start: usize, stop: usize) {
        store.set_slice(Date::from_raw(d0), Date::from_raw(d1));
        assert_eq!(store.slice_start(), start, "d0={d0} d1={d1}");
        assert_eq!(store.slice_stop(), stop, "d0={d0} d1={d1}");
    }

    #[test]
    fn test_set_slice() {
        let mut store = ref_store();
        assert_slice(&mut store, 19990101, 19990101, 0, 3);
        assert_slice(&mut store, 10101, 19990101, 0, 3);
        assert_slice(&mut store, 10101, 99991231, 0, 10);
        assert_slice(&mut store, 19990131, 19991230, 3, 5);
        // inverted range gives an empty slice
        assert_eq!(
            store.set_slice(Date::from_raw(19990202), Date::from_raw(19990101)),
            0
        );
    }

    #[test]
    fn test_insert_delete_adjust_slice() {
        let mut store = ref_store();
        store.set_slice(Date::from_raw(20100102), Date::from_raw(20100102));
        assert_eq!((store.slice_start(), store.slice_stop()), (7, 8));

        let txn = Transaction::new(
            Date::from_raw(20051024),
            Money::from_cents(10001),
            "gas",
            "diesel",
        )
        .unwrap();
        let index = store.insert(txn).unwrap();
        assert_eq!(index, 7);
        assert_eq!(store.get(7).unwrap().category(), "gas");
        assert_eq!((store.slice_start(), store.slice_stop()), (8, 9));
        assert_eq!(store.count(), 11);

        assert!(store.delete(7));
        assert_eq!((store.slice_start(), store.slice_stop()), (7, 8));
        assert_eq!(store.count(), 10);
        assert!(!store.delete(10));
        assert!(store.delete(9));
        assert_eq!(store.count(), 9);
    }

    #[test]
    fn test_insert_at_empty_slice_boundary() {
        let mut store = ref_store();
        // inverted range leaves an empty slice at index 4
        store.set_slice(Date::from_raw(19990202), Date::from_raw(19990101));
        assert_eq!((store.slice_start(), store.slice_stop()), (4, 4));

        let txn = Transaction::new(
            Date::from_raw(19990201),
            Money::from_cents(42),
            "gap",
            "",
        )
        .unwrap();
        assert_eq!(store.insert(txn).unwrap(), 4);
        // both bounds shift past the insert; the slice stays empty
        assert_eq!((store.slice_start(), store.slice_stop()), (5, 5));
        assert_eq!(store.slice_len(), 0);
        assert!(store.active_slice().is_empty());
        assert_eq!(store.count(), 11);
    }

    #[test]
    fn test_insert_stable_tie_append() {
        let mut store = ref_store();
        let txn = Transaction::new(
            Date::from_raw(19990101),
            Money::from_cents(999),
            "tie",
            "",
        )
        .unwrap();
        let index = store.insert(txn).unwrap();
        // after the three existing 1999-01-01 records
        assert_eq!(index, 3);
        for i in 0..store.count() - 1 {
            assert!(store.get(i).unwrap().date() <= store.get(i + 1).unwrap().date());
        }
    }

    fn assert_filter_category(patterns: &str, expected: usize) {
        let mut store = ref_store();
        assert_eq!(store.filter_category(patterns, ','), expected, "{patterns}");
    }

    #[test]
    fn test_filter_category() {
        assert_filter_category("ab", 3);
        assert_filter_category("ab,xy", 6);
        assert_filter_category("c,ef", 7);
        assert_filter_category("c,ef,YZ", 10);
        assert_filter_category("", 10);
        assert_filter_category(",,", 10);
    }

    #[test]
    fn test_filter_description() {
        let mut store = ref_store();
        assert_eq!(store.filter_description(" ,ATE,leh", ','), 3);
    }

    #[test]
    fn test_filter_respects_slice() {
        let mut store = ref_store();
        store.set_slice(Date::from_raw(19990101), Date::from_raw(19990101));
        assert_eq!(store.filter_category("abc", ','), 2);
        // the non-matching slice record is gone, records outside stay
        assert_eq!(store.count(), 9);
        assert_eq!(store.filter_category("xyz", ','), 0);
        assert_eq!(store.count(), 7);
    }

    #[test]
    fn test_slice_then_filter() {
        let data = "1999-01-01\t10\tabc\t\n1999-01-01\t-20\tabc\t\n1999-02-02\t700\txyz\t \n";
        let mut store = TransactionStore::from_reader(Cursor::new(data)).unwrap();
        let d = Date::from_raw(19990101);
        assert_eq!(store.set_slice(d, d), 2);
        assert_eq!((store.slice_start(), store.slice_stop()), (0, 2));
        assert_eq!(store.filter_category("abc", ','), 2);
        store.reset_slice();
        assert_eq!(store.filter_category("xyz", ','), 1);
    }

    #[test]
    fn test_slice_total_and_category_totals() {
        let mut store = ref_store();
        store.set_slice(Date::from_raw(19990101), Date::from_raw(19991231));
        assert_eq!(store.slice_total().cents(), 10 - 20 + 1 - 100 + 700 - 600);

        let inflows = store.category_totals(Flow::Inflow).unwrap();
        let pairs: Vec<(String, i64)> = inflows.iter().map(|(k, v)| (k.clone(), v)).collect();
        assert_eq!(
            pairs,
            vec![("xyz".to_string(), 701), ("abc".to_string(), 10)]
        );

        let outflows = store.category_totals(Flow::Outflow).unwrap();
        let pairs: Vec<(String, i64)> = outflows.iter().map(|(k, v)| (k.clone(), v)).collect();
        assert_eq!(
            pairs,
            vec![("xyz".to_string(), -600), ("def".to_string(), -100), ("abc".to_string(), -20)]
        );
    }

    #[test]
    fn test_sorted_after_mutations() {
        let mut store = TransactionStore::new();
        for raw in [20200105, 20200101, 20200103, 20200101, 20200102] {
            let txn = Transaction::new(
                Date::from_raw(raw),
                Money::from_cents(raw as i64),
                "c",
                "",
            )
            .unwrap();
            store.insert(txn).unwrap();
        }
        store.delete(2);
        for i in 0..store.count() - 1 {
            assert!(store.get(i).unwrap().date() <= store.get(i + 1).unwrap().date());
        }
    }
}
