use std::cell::Cell;

use crate::prime::prime_lte;
use crate::utils::MyHash;

struct Entry<K, V> {
    key: K,
    value: V,
}

/// The computed table: a lossy, single-slot-per-bucket cache of operation
/// results.
///
/// Each key hashes to exactly one slot; an insert overwrites whatever was
/// there. No chain, no eviction policy. A stale or overwritten entry only
/// costs a recomputation, never canonicity, so the engine consults it
/// freely. Keys must be canonical for their operation (for ITE, the
/// post-standardization triple).
pub struct OpCache<K, V> {
    slots: Vec<Option<Entry<K, V>>>,
    size: usize,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl<K, V> OpCache<K, V> {
    /// Create a cache with `prime_lte(size)` slots.
    pub fn new(size: usize) -> Self {
        let mut cache = Self {
            slots: Vec::new(),
            size: 0,
            hits: Cell::new(0),
            misses: Cell::new(0),
        };
        cache.load(size);
        cache
    }

    /// Allocate the slot array. Any previous contents are released.
    pub fn load(&mut self, size: usize) {
        let size = prime_lte(size);
        self.slots = std::iter::repeat_with(|| None).take(size).collect();
        self.size = size;
    }

    /// Release the slot array. The cache refuses inserts until the next
    /// [`load`][OpCache::load].
    pub fn clear(&mut self) {
        self.slots = Vec::new();
        self.size = 0;
    }

    /// Number of slots (prime), or `0` when cleared.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    pub fn misses(&self) -> usize {
        self.misses.get()
    }
}

impl<K, V> OpCache<K, V>
where
    K: MyHash + Eq,
{
    fn slot_index(&self, key: &K) -> usize {
        (key.hash() % self.size as u64) as usize
    }

    /// Consult the slot for `key`; a hit requires the stored key to be
    /// bit-equal.
    pub fn lookup(&self, key: &K) -> Option<&V> {
        if self.size == 0 {
            return None;
        }
        match &self.slots[self.slot_index(key)] {
            Some(entry) if &entry.key == key => {
                self.hits.set(self.hits.get() + 1);
                Some(&entry.value)
            }
            _ => {
                self.misses.set(self.misses.get() + 1);
                None
            }
        }
    }

    /// Overwrite the slot for `key` unconditionally.
    pub fn insert(&mut self, key: K, value: V) {
        assert!(self.size > 0, "Computed table is not loaded");
        let index = self.slot_index(&key);
        self.slots[index] = Some(Entry { key, value });
    }
}
