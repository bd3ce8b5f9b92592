//! Open-addressing hash map used as node storage.
//!
//! Quadratic probing over a prime-sized slot table. The table grows to the
//! next prime above twice the live count once an insert would push the load
//! past 50%. Keys come from a pluggable hash function over the stored value;
//! hash value 0 is reserved as "absent" and is rejected on insert.

use thiserror::Error;

/// Computes the key of a stored value.
pub type HashFn<V> = fn(&V) -> u32;

/// Slot table sizes. Each is prime, roughly doubling.
const PRIMES: &[usize] = &[
    7, 13, 31, 61, 127, 251, 509, 1021, 2039, 4093, 8191, 16381, 32749, 65521, 131_071, 262_139,
    524_287, 1_048_573,
];

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("key {key} is already present")]
    Duplicate { key: u32 },
    #[error("hash value 0 is reserved")]
    ReservedKey,
}

/// First table size strictly greater than `2 * n`.
pub fn choose_size(n: usize) -> usize {
    let wanted = n.saturating_mul(2);
    PRIMES
        .iter()
        .copied()
        .find(|&p| p > wanted)
        .unwrap_or(wanted.saturating_add(1))
}

/// The djb2 string hash (`h * 33 + c`, seeded with 5381).
pub fn djb2(s: &str) -> u32 {
    s.bytes().fold(5381u32, |hash, byte| {
        hash.wrapping_shl(5)
            .wrapping_add(hash)
            .wrapping_add(u32::from(byte))
    })
}

enum Probe {
    Found(usize),
    Vacant(usize),
    Exhausted,
}

#[derive(Clone)]
pub struct NodeMap<V> {
    slots: Vec<Option<(u32, V)>>,
    live: usize,
    hash: HashFn<V>,
}

impl<V> NodeMap<V> {
    /// Create a map sized for roughly `size_hint` entries.
    pub fn create(hash: HashFn<V>, size_hint: usize) -> Self {
        NodeMap {
            slots: empty_slots(choose_size(size_hint)),
            live: 0,
            hash,
        }
    }

    /// Insert `value` under its hash. Returns the key.
    pub fn add(&mut self, value: V) -> Result<u32, MapError> {
        let key = (self.hash)(&value);
        if key == 0 {
            return Err(MapError::ReservedKey);
        }
        if (self.live + 1) * 2 > self.slots.len() {
            self.grow();
        }
        loop {
            match self.probe(key) {
                Probe::Found(_) => return Err(MapError::Duplicate { key }),
                Probe::Vacant(idx) => {
                    self.slots[idx] = Some((key, value));
                    self.live += 1;
                    return Ok(key);
                }
                Probe::Exhausted => self.grow(),
            }
        }
    }

    pub fn retrieve(&self, key: u32) -> Option<&V> {
        if key == 0 {
            return None;
        }
        match self.probe(key) {
            Probe::Found(idx) => self.slots[idx].as_ref().map(|(_, v)| v),
            Probe::Vacant(_) | Probe::Exhausted => None,
        }
    }

    pub fn contains(&self, key: u32) -> bool {
        self.retrieve(key).is_some()
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Current slot table size.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterate over live `(key, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &V)> {
        self.slots.iter().flatten().map(|(k, v)| (*k, v))
    }

    /// Consume the map, handing each live value to `destructor` exactly once.
    /// Returns the number of values destroyed.
    pub fn destroy(self, mut destructor: impl FnMut(V)) -> usize {
        let mut count = 0;
        for (_, value) in self.slots.into_iter().flatten() {
            destructor(value);
            count += 1;
        }
        count
    }

    fn probe(&self, key: u32) -> Probe {
        let size = self.slots.len() as u64;
        if size == 0 {
            return Probe::Exhausted;
        }
        let start = u64::from(key) % size;
        for step in 0..size {
            #[expect(clippy::cast_possible_truncation, reason = "result is < slot count")]
            let idx = ((start + step * step) % size) as usize;
            match &self.slots[idx] {
                None => return Probe::Vacant(idx),
                Some((k, _)) if *k == key => return Probe::Found(idx),
                Some(_) => {}
            }
        }
        Probe::Exhausted
    }

    fn grow(&mut self) {
        let new_size = choose_size(self.live + 1).max(self.slots.len() + 1);
        let old = std::mem::replace(&mut self.slots, empty_slots(new_size));
        tracing::trace!(from = old.len(), to = new_size, "node map resize");
        for (key, value) in old.into_iter().flatten() {
            if let Probe::Vacant(idx) = self.probe(key) {
                self.slots[idx] = Some((key, value));
            }
        }
    }
}

fn empty_slots<V>(size: usize) -> Vec<Option<(u32, V)>> {
    std::iter::repeat_with(|| None).take(size).collect()
}

// Tests

#[cfg(test)]
mod tests;
