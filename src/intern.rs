//! Structural interning: deduplicating read-only arrays and objects by the
//! content they hold, so that two calls producing "the same" composite
//! value get back the identical handle.
//!
//! Every composite a caller wants to intern must already be built entirely
//! out of read-only values (atoms, numbers, and other interned
//! composites) — interning is content-addressed, and a mutable child could
//! change out from under the content hash. Each of [`Context`]'s two
//! indices ([`crate::object::ObjectArena`]'s and
//! [`crate::value::array::ArrayArena`]'s) is an open-addressed table of
//! `(hash, arena slot)` entries probed by content hash; a slot can be
//! tombstoned (the arena entry it named was freed) instead of removed
//! outright, since removing it would break the probe chain for entries
//! inserted after it.

use alloc::vec;
use alloc::vec::Vec;

use crate::memory::hash::{fast_reduce32, hash_bytes};
use crate::value::atom::Atom;
use crate::value::Value;

const EMPTY_SLOT: u32 = u32::MAX;
const TOMBSTONE: u32 = u32::MAX - 1;

struct HashIdx {
    hash: u32,
    idx: u32,
}

/// One content-addressed index (used once for arrays, once for objects).
pub struct InternIndex {
    entries: Vec<HashIdx>,
    slots: Vec<u32>,
    capacity: u32,
}

impl InternIndex {
    #[must_use]
    pub fn new() -> Self {
        InternIndex {
            entries: Vec::new(),
            slots: Vec::new(),
            capacity: 0,
        }
    }

    fn grow(&mut self) {
        let new_capacity = if self.capacity == 0 { 16 } else { self.capacity * 2 };
        log::trace!("intern index growing to capacity {new_capacity}");
        let mut slots = vec![EMPTY_SLOT; (new_capacity * 2) as usize];
        let mut live = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if entry.idx == TOMBSTONE {
                continue;
            }
            live.push(entry);
        }
        for (i, entry) in live.iter().enumerate() {
            let mut slot = fast_reduce32(entry.hash, new_capacity * 2);
            while slots[slot as usize] != EMPTY_SLOT {
                slot += 1;
                if slot == new_capacity * 2 {
                    slot = 0;
                }
            }
            slots[slot as usize] = i as u32;
        }
        self.entries = live;
        self.slots = slots;
        self.capacity = new_capacity;
    }

    /// Finds a live entry with the given `hash` for which `matches` (given
    /// the arena slot it names) returns `true`.
    pub fn find(&self, hash: u32, matches: impl Fn(u32) -> bool) -> Option<u32> {
        if self.capacity == 0 {
            return None;
        }
        let cap2 = self.capacity * 2;
        let mut slot = fast_reduce32(hash, cap2);
        loop {
            let i = self.slots[slot as usize];
            if i == EMPTY_SLOT {
                return None;
            }
            let entry = &self.entries[i as usize];
            if entry.idx != TOMBSTONE && entry.hash == hash && matches(entry.idx) {
                return Some(entry.idx);
            }
            slot += 1;
            if slot == cap2 {
                slot = 0;
            }
        }
    }

    /// Registers `arena_idx` under `hash`. Ensures capacity first; callers
    /// must have already confirmed there is no existing duplicate via
    /// [`Self::find`].
    pub fn insert(&mut self, hash: u32, arena_idx: u32) {
        if self.entries.len() as u32 >= self.capacity {
            self.grow();
        }
        let cap2 = self.capacity * 2;
        let mut slot = fast_reduce32(hash, cap2);
        let mut first_tombstone: Option<u32> = None;
        loop {
            let i = self.slots[slot as usize];
            if i == EMPTY_SLOT {
                break;
            }
            if self.entries[i as usize].idx == TOMBSTONE && first_tombstone.is_none() {
                first_tombstone = Some(slot);
            }
            slot += 1;
            if slot == cap2 {
                slot = 0;
            }
        }
        let target_slot = first_tombstone.unwrap_or(slot);
        let entry_idx = self.entries.len() as u32;
        self.entries.push(HashIdx { hash, idx: arena_idx });
        self.slots[target_slot as usize] = entry_idx;
    }

    /// Tombstones the entry naming `arena_idx` (found by re-probing its
    /// `hash`). Called from the GC sweep when a read-only composite is
    /// freed.
    pub fn remove(&mut self, hash: u32, arena_idx: u32) {
        if self.capacity == 0 {
            return;
        }
        let cap2 = self.capacity * 2;
        let mut slot = fast_reduce32(hash, cap2);
        loop {
            let i = self.slots[slot as usize];
            debug_assert_ne!(i, EMPTY_SLOT, "interned entry vanished before its deregistration");
            if i == EMPTY_SLOT {
                return;
            }
            if self.entries[i as usize].idx == arena_idx {
                self.entries[i as usize].idx = TOMBSTONE;
                return;
            }
            slot += 1;
            if slot == cap2 {
                slot = 0;
            }
        }
    }
}

impl Default for InternIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Encodes one value's discriminant and payload for content hashing.
/// Containers contribute only their handle — interning assumes a
/// composite's children are themselves already interned or otherwise
/// read-only, so handle identity already captures structural identity.
pub fn encode_value(v: Value, out: &mut Vec<u8>) {
    let (tag, bits): (u8, u64) = match v {
        Value::Error { code, .. } => (0, code as u64),
        Value::Number(n) => (1, n.to_bits()),
        Value::Integer(i) => (2, i as u64),
        Value::Uinteger(u) => (3, u),
        Value::String(a) => (4, (u64::from(a.index()) << 32) | u64::from(a.hash())),
        Value::Array(i) | Value::ArrayView(i) => (5, u64::from(i.get())),
        Value::Object(i) | Value::ObjectKeys(i) | Value::ObjectValues(i) | Value::ObjectItems(i) => {
            (6, u64::from(i.get()))
        }
        Value::Null => (7, 0),
        Value::Bool(b) => (8, u64::from(b)),
    };
    out.push(tag);
    out.extend_from_slice(&bits.to_le_bytes());
}

#[must_use]
pub fn hash_items(items: &[Value]) -> u32 {
    let mut buf = Vec::with_capacity(items.len() * 9);
    for &item in items {
        encode_value(item, &mut buf);
    }
    hash_bytes(&buf)
}

#[must_use]
pub fn hash_pairs(pairs: &[(Atom, Value)]) -> u32 {
    let mut buf = Vec::with_capacity(pairs.len() * 18);
    for (atom, value) in pairs {
        buf.extend_from_slice(&atom.index().to_le_bytes());
        buf.extend_from_slice(&atom.hash().to_le_bytes());
        encode_value(*value, &mut buf);
    }
    hash_bytes(&buf)
}
