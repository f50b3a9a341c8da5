//! Insertion-ordered associative store
//!
//! An open-addressed hash map from integer or short string keys to `i64`
//! values, as used by the aggregation paths and the transaction tree
//! builder. Iteration follows insertion order regardless of hash layout
//! until [`AssocStore::sort`] reorders it by key or value.
//!
//! Layout: a bucket array of slot markers (empty / tombstone / entry
//! index) probed linearly, plus a dense entry array that preserves
//! insertion order. Deleting leaves a tombstone in the bucket array and a
//! dead entry in the dense array; both are reclaimed on the next resize or
//! sort. The bucket array doubles once `(live + tombstones + 1)` exceeds
//! half its capacity.

use crate::error::{LedgerError, LedgerResult};

const INITIAL_SLOTS: usize = 8;

/// Maximum string key length in bytes
pub const MAX_STR_KEY_LEN: usize = 31;

/// Key type usable in an [`AssocStore`]
pub trait StoreKey: Clone + Ord {
    /// 64-bit hash of the key
    fn hash64(&self) -> u64;

    /// Reject keys that are structurally unusable
    fn validate(&self) -> LedgerResult<()> {
        Ok(())
    }
}

impl StoreKey for i64 {
    /// Identity hash
    fn hash64(&self) -> u64 {
        *self as u64
    }
}

impl StoreKey for String {
    /// FNV-1a over at most the first [`MAX_STR_KEY_LEN`] bytes
    fn hash64(&self) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for &b in self.as_bytes().iter().take(MAX_STR_KEY_LEN) {
            hash ^= b as u64;
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        hash
    }

    fn validate(&self) -> LedgerResult<()> {
        if self.len() > MAX_STR_KEY_LEN {
            return Err(LedgerError::invalid(
                "key",
                format!("'{self}' exceeds {MAX_STR_KEY_LEN} bytes"),
            ));
        }
        Ok(())
    }
}

/// Which component [`AssocStore::sort`] orders by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Key,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Empty,
    /// Deleted-but-unreclaimed; probing must walk through it
    Tombstone,
    /// Index into the dense entry array
    Occupied(usize),
}

#[derive(Debug, Clone)]
struct Entry<K> {
    key: K,
    hash: u64,
    value: i64,
    live: bool,
}

/// Insertion-ordered map from [`StoreKey`] to `i64`
#[derive(Debug, Clone)]
pub struct AssocStore<K: StoreKey> {
    slots: Vec<Slot>,
    entries: Vec<Entry<K>>,
    live: usize,
    tombstones: usize,
}

impl<K: StoreKey> AssocStore<K> {
    /// Create an empty store
    pub fn new() -> LedgerResult<Self> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(INITIAL_SLOTS)?;
        slots.resize(INITIAL_SLOTS, Slot::Empty);
        Ok(Self {
            slots,
            entries: Vec::new(),
            live: 0,
            tombstones: 0,
        })
    }

    /// Number of live (non-deleted) keys
    pub fn count(&self) -> usize {
        self.live
    }

    /// Check if the store holds no live keys
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Walk the probe sequence for `key`
    ///
    /// Returns the slot where the walk ended: a slot occupied by `key`,
    /// or (when the key is absent) the first empty slot, or the first
    /// tombstone if `stop_at_tombstone` asks for a reusable slot. The
    /// stored hash is compared before the potentially expensive key
    /// comparison.
    fn probe(&self, hash: u64, key: &K, stop_at_tombstone: bool) -> usize {
        let cap = self.slots.len();
        let mut slot = (hash as usize) % cap;
        loop {
            match self.slots[slot] {
                Slot::Empty => return slot,
                Slot::Tombstone if stop_at_tombstone => return slot,
                Slot::Tombstone => {}
                Slot::Occupied(i) => {
                    let entry = &self.entries[i];
                    if entry.hash == hash && entry.key == *key {
                        return slot;
                    }
                }
            }
            slot = (slot + 1) % cap;
        }
    }

    /// Re-point every live entry's bucket slot; the bucket array must
    /// contain no occupied slots on entry
    fn rehash(&mut self) {
        let cap = self.slots.len();
        for (i, entry) in self.entries.iter().enumerate() {
            if !entry.live {
                continue;
            }
            let mut slot = (entry.hash as usize) % cap;
            while self.slots[slot] != Slot::Empty {
                slot = (slot + 1) % cap;
            }
            self.slots[slot] = Slot::Occupied(i);
        }
    }

    /// Replace the bucket array with a fresh one of `new_cap` slots,
    /// dropping tombstones
    fn resize_slots(&mut self, new_cap: usize) -> LedgerResult<()> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(new_cap)?;
        slots.resize(new_cap, Slot::Empty);
        self.slots = slots;
        self.tombstones = 0;
        self.rehash();
        Ok(())
    }

    /// Insert a key-value pair, returning the stored value
    ///
    /// If the key already exists its value is left unmodified and the
    /// existing value is returned. All growth happens before the store is
    /// mutated, so an [`LedgerError::OutOfMemory`] leaves it untouched.
    pub fn insert(&mut self, key: K, value: i64) -> LedgerResult<i64> {
        key.validate()?;
        let hash = key.hash64();
        let slot = self.probe(hash, &key, false);
        if let Slot::Occupied(i) = self.slots[slot] {
            return Ok(self.entries[i].value);
        }

        if 2 * (self.live + self.tombstones + 1) > self.slots.len() {
            self.resize_slots(self.slots.len() * 2)?;
        }
        self.entries.try_reserve(1)?;

        let slot = self.probe(hash, &key, true);
        if self.slots[slot] == Slot::Tombstone {
            self.tombstones -= 1;
        }
        self.slots[slot] = Slot::Occupied(self.entries.len());
        self.entries.push(Entry {
            key,
            hash,
            value,
            live: true,
        });
        self.live += 1;
        Ok(value)
    }

    /// Insert `key` with value 0 if absent, then add `delta` to its value
    ///
    /// Returns the value after the addition.
    pub fn accumulate(&mut self, key: K, delta: i64) -> LedgerResult<i64> {
        let hash = key.hash64();
        let slot = self.probe(hash, &key, false);
        if let Slot::Occupied(i) = self.slots[slot] {
            self.entries[i].value = self.entries[i].value.wrapping_add(delta);
            return Ok(self.entries[i].value);
        }
        self.insert(key, delta)
    }

    /// Delete a key; returns false if it does not exist
    pub fn delete(&mut self, key: &K) -> bool {
        let slot = self.probe(key.hash64(), key, false);
        match self.slots[slot] {
            Slot::Occupied(i) => {
                self.entries[i].live = false;
                self.slots[slot] = Slot::Tombstone;
                self.live -= 1;
                self.tombstones += 1;
                true
            }
            _ => false,
        }
    }

    /// Look up a key's value
    ///
    /// Use this to test for key existence.
    pub fn get(&self, key: &K) -> Option<i64> {
        match self.slots[self.probe(key.hash64(), key, false)] {
            Slot::Occupied(i) => Some(self.entries[i].value),
            _ => None,
        }
    }

    /// Iterate key-value pairs in insertion order, skipping deleted keys
    ///
    /// After [`sort`](Self::sort), iteration follows the sorted order
    /// instead.
    pub fn iter(&self) -> impl Iterator<Item = (&K, i64)> {
        self.entries
            .iter()
            .filter(|e| e.live)
            .map(|e| (&e.key, e.value))
    }

    /// Sum of all values; 0 when empty (overflow wraps)
    pub fn sum(&self) -> i64 {
        self.iter().fold(0i64, |acc, (_, v)| acc.wrapping_add(v))
    }

    /// Maximum value; `i64::MIN` when empty
    pub fn max(&self) -> i64 {
        self.iter().fold(i64::MIN, |acc, (_, v)| acc.max(v))
    }

    /// Minimum value; `i64::MAX` when empty
    pub fn min(&self) -> i64 {
        self.iter().fold(i64::MAX, |acc, (_, v)| acc.min(v))
    }

    /// Reorder iteration by key or value, permanently dropping deleted
    /// entries
    pub fn sort(&mut self, field: SortField, ascending: bool) {
        self.entries.retain(|e| e.live);
        match field {
            SortField::Key => self.entries.sort_by(|a, b| a.key.cmp(&b.key)),
            SortField::Value => self.entries.sort_by_key(|e| e.value),
        }
        if !ascending {
            self.entries.reverse();
        }
        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }
        self.tombstones = 0;
        self.rehash();
    }
}
