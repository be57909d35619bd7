//! The object arena: insertion-ordered key/value maps addressed by handle.
//!
//! Each live object owns a dense `pairs` vec (insertion order, the order a
//! printer walks) plus a `slots` vec twice its capacity that maps a key's
//! atom hash to a pair index by linear probing — the same shape as
//! [`crate::value::atom::AtomTable`], just keyed by [`Atom`] instead of raw
//! bytes. Deleting a key needs three steps, in this exact order, to keep
//! both structures consistent: shift the pair out of `pairs`, decrement
//! every `slots` entry that pointed past the removed pair, then backward-
//! shift-repair the probe chain starting at the freed slot (open addressing
//! without tombstones: an untouched chain after a deletion can strand a
//! later entry behind a hole).

use alloc::vec;
use alloc::vec::Vec;
use core::num::NonZeroU32;

use crate::error::ErrorCode;
use crate::memory::hash::fast_reduce32;
use crate::value::atom::Atom;
use crate::value::Value;

const EMPTY_SLOT: u32 = u32::MAX;

/// The largest number of entries an object may hold, matching
/// [`crate::value::array::ARRAY_MAX`].
pub const OBJECT_MAX: u32 = 0x1FFF_FFFF;

/// A handle into the object arena. Never zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ObjectIndex(NonZeroU32);

impl ObjectIndex {
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Rebuilds a handle from a raw arena slot, e.g. one returned by
    /// [`crate::intern::InternIndex::find`].
    #[inline]
    pub(crate) fn from_raw(i: u32) -> Self {
        ObjectIndex(NonZeroU32::new(i).expect("raw object slot is never 0"))
    }
}

/// The live contents of one object.
pub struct ObjectRecord {
    pairs: Vec<(Atom, Value)>,
    slots: Vec<u32>,
    capacity: u32,
    pub(crate) marked: bool,
    pub(crate) read_only: bool,
}

impl ObjectRecord {
    #[must_use]
    pub fn new() -> Self {
        ObjectRecord {
            pairs: Vec::new(),
            slots: Vec::new(),
            capacity: 0,
            marked: false,
            read_only: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Freezes or unfreezes the object. Used when interning a composite
    /// value, which requires every value it holds to already be read-only.
    #[inline]
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    #[inline]
    #[must_use]
    pub fn pairs(&self) -> &[(Atom, Value)] {
        &self.pairs
    }

    fn grow(&mut self) {
        let new_capacity = if self.capacity == 0 { 4 } else { self.capacity * 2 };
        log::trace!("object arena growing to capacity {new_capacity}");
        let mut slots = vec![EMPTY_SLOT; (new_capacity * 2) as usize];
        for (i, (atom, _)) in self.pairs.iter().enumerate() {
            let mut slot = fast_reduce32(atom.hash(), new_capacity * 2);
            while slots[slot as usize] != EMPTY_SLOT {
                slot += 1;
                if slot == new_capacity * 2 {
                    slot = 0;
                }
            }
            slots[slot as usize] = i as u32;
        }
        self.slots = slots;
        self.capacity = new_capacity;
    }

    fn rebuild_slots(&mut self) {
        let cap2 = self.capacity * 2;
        for slot in &mut self.slots {
            *slot = EMPTY_SLOT;
        }
        for (i, (atom, _)) in self.pairs.iter().enumerate() {
            let mut slot = fast_reduce32(atom.hash(), cap2);
            while self.slots[slot as usize] != EMPTY_SLOT {
                slot += 1;
                if slot == cap2 {
                    slot = 0;
                }
            }
            self.slots[slot as usize] = i as u32;
        }
    }

    /// Returns the probe slot and pair index for `key`, if present.
    fn find(&self, key: Atom) -> Option<(u32, u32)> {
        if self.capacity == 0 {
            return None;
        }
        let cap2 = self.capacity * 2;
        let mut slot = fast_reduce32(key.hash(), cap2);
        loop {
            let pair_idx = self.slots[slot as usize];
            if pair_idx == EMPTY_SLOT {
                return None;
            }
            if self.pairs[pair_idx as usize].0 == key {
                return Some((slot, pair_idx));
            }
            slot += 1;
            if slot == cap2 {
                slot = 0;
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: Atom) -> Option<Value> {
        self.find(key).map(|(_, pair_idx)| self.pairs[pair_idx as usize].1)
    }

    #[must_use]
    pub fn contains(&self, key: Atom) -> bool {
        self.find(key).is_some()
    }

    /// Inserts or overwrites `key`.
    pub fn set(&mut self, key: Atom, value: Value) -> Result<(), ErrorCode> {
        if self.read_only {
            return Err(ErrorCode::TypeError);
        }
        if self.pairs.len() as u32 >= self.capacity {
            if self.pairs.len() as u32 >= OBJECT_MAX {
                return Err(ErrorCode::AllocFailure);
            }
            self.grow();
        }
        if let Some((_, pair_idx)) = self.find(key) {
            self.pairs[pair_idx as usize].1 = value;
            return Ok(());
        }
        let cap2 = self.capacity * 2;
        let mut slot = fast_reduce32(key.hash(), cap2);
        while self.slots[slot as usize] != EMPTY_SLOT {
            slot += 1;
            if slot == cap2 {
                slot = 0;
            }
        }
        let pair_idx = self.pairs.len() as u32;
        self.pairs.push((key, value));
        self.slots[slot as usize] = pair_idx;
        Ok(())
    }

    /// Removes `key`, preserving the insertion order of every other entry.
    pub fn delete(&mut self, key: Atom) -> Result<Value, ErrorCode> {
        if self.read_only {
            return Err(ErrorCode::TypeError);
        }
        let (found_slot, pair_idx) = self.find(key).ok_or(ErrorCode::MissingKey)?;
        let removed = self.pairs.remove(pair_idx as usize).1;

        // Step 1 already happened via `Vec::remove` above. Step 2: every
        // slot pointing past the removed pair must shift down by one.
        let cap2 = self.capacity * 2;
        for slot in &mut self.slots {
            if *slot != EMPTY_SLOT && *slot > pair_idx {
                *slot -= 1;
            }
        }

        // Step 3: backward-shift repair starting at the freed slot. Walk
        // the probe chain; any entry that can be moved closer to its ideal
        // slot (because the hole is now in its way) gets moved back.
        let mut hole = found_slot;
        self.slots[hole as usize] = EMPTY_SLOT;
        let mut probe = hole;
        loop {
            probe += 1;
            if probe == cap2 {
                probe = 0;
            }
            let candidate = self.slots[probe as usize];
            if candidate == EMPTY_SLOT {
                break;
            }
            let ideal = fast_reduce32(self.pairs[candidate as usize].0.hash(), cap2);
            // Is `hole` between `ideal` and `probe` in probe order?
            let displaced = if ideal <= probe {
                hole >= ideal && hole < probe
            } else {
                hole >= ideal || hole < probe
            };
            if displaced {
                self.slots[hole as usize] = candidate;
                self.slots[probe as usize] = EMPTY_SLOT;
                hole = probe;
            }
        }

        Ok(removed)
    }

    /// Inserts `key`/`value` at a specific position in iteration order.
    /// Errors if `key` already exists.
    pub fn insert_at_index(&mut self, key: Atom, value: Value, index: usize) -> Result<(), ErrorCode> {
        if self.read_only {
            return Err(ErrorCode::TypeError);
        }
        if self.find(key).is_some() {
            return Err(ErrorCode::InvalidValue);
        }
        if index > self.pairs.len() {
            return Err(ErrorCode::IndexError);
        }
        if self.pairs.len() as u32 >= self.capacity {
            if self.pairs.len() as u32 >= OBJECT_MAX {
                return Err(ErrorCode::AllocFailure);
            }
            self.grow();
        }
        self.pairs.insert(index, (key, value));
        self.rebuild_slots();
        Ok(())
    }

    /// Renames the key of an existing entry, keeping its position and
    /// value. Errors if `old_key` is absent or `new_key` already exists.
    pub fn replace_key(&mut self, old_key: Atom, new_key: Atom) -> Result<(), ErrorCode> {
        if self.read_only {
            return Err(ErrorCode::TypeError);
        }
        if old_key == new_key {
            return if self.find(old_key).is_some() {
                Ok(())
            } else {
                Err(ErrorCode::MissingKey)
            };
        }
        if self.find(new_key).is_some() {
            return Err(ErrorCode::InvalidValue);
        }
        let (_, pair_idx) = self.find(old_key).ok_or(ErrorCode::MissingKey)?;
        self.pairs[pair_idx as usize].0 = new_key;
        self.rebuild_slots();
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), ErrorCode> {
        if self.read_only {
            return Err(ErrorCode::TypeError);
        }
        self.pairs.clear();
        for slot in &mut self.slots {
            *slot = EMPTY_SLOT;
        }
        Ok(())
    }
}

impl Default for ObjectRecord {
    fn default() -> Self {
        Self::new()
    }
}

enum ObjectSlot {
    Free { next: u32 },
    Live(ObjectRecord),
}

/// The pool of all objects in a context.
pub struct ObjectArena {
    slots: Vec<ObjectSlot>,
    free_head: u32,
}

impl ObjectArena {
    #[must_use]
    pub fn new() -> Self {
        ObjectArena {
            slots: vec![ObjectSlot::Free { next: 0 }],
            free_head: 0,
        }
    }

    pub fn alloc(&mut self, record: ObjectRecord) -> ObjectIndex {
        if self.free_head != 0 {
            let idx = self.free_head;
            let ObjectSlot::Free { next } = self.slots[idx as usize] else {
                unreachable!("free list corrupted");
            };
            self.free_head = next;
            self.slots[idx as usize] = ObjectSlot::Live(record);
            ObjectIndex(NonZeroU32::new(idx).expect("free list never yields slot 0"))
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(ObjectSlot::Live(record));
            ObjectIndex(NonZeroU32::new(idx).expect("arena index overflowed"))
        }
    }

    pub fn free(&mut self, index: ObjectIndex) {
        self.free_raw(index.get());
    }

    #[must_use]
    pub fn get(&self, index: ObjectIndex) -> &ObjectRecord {
        match &self.slots[index.get() as usize] {
            ObjectSlot::Live(record) => record,
            ObjectSlot::Free { .. } => unreachable!("stale ObjectIndex"),
        }
    }

    pub fn get_mut(&mut self, index: ObjectIndex) -> &mut ObjectRecord {
        match &mut self.slots[index.get() as usize] {
            ObjectSlot::Live(record) => record,
            ObjectSlot::Free { .. } => unreachable!("stale ObjectIndex"),
        }
    }

    pub(crate) fn slot_count(&self) -> u32 {
        self.slots.len() as u32
    }

    pub(crate) fn free_raw(&mut self, i: u32) {
        self.slots[i as usize] = ObjectSlot::Free {
            next: self.free_head,
        };
        self.free_head = i;
    }

    pub(crate) fn is_live(&self, i: u32) -> bool {
        matches!(self.slots[i as usize], ObjectSlot::Live(_))
    }

    fn live_mut(&mut self, i: u32) -> &mut ObjectRecord {
        match &mut self.slots[i as usize] {
            ObjectSlot::Live(record) => record,
            ObjectSlot::Free { .. } => unreachable!("raw index not live"),
        }
    }

    /// Marks the record at raw slot `i`, returning whether it was already
    /// marked (so the GC mark pass doesn't recurse into it twice).
    pub(crate) fn mark_if_unmarked(&mut self, i: u32) -> bool {
        let record = self.live_mut(i);
        let was_marked = record.marked;
        record.marked = true;
        was_marked
    }

    /// Clears and returns the mark bit at raw slot `i`.
    pub(crate) fn take_marked(&mut self, i: u32) -> bool {
        let record = self.live_mut(i);
        let marked = record.marked;
        record.marked = false;
        marked
    }

    pub(crate) fn record_pairs(&self, i: u32) -> &[(Atom, Value)] {
        match &self.slots[i as usize] {
            ObjectSlot::Live(record) => record.pairs(),
            ObjectSlot::Free { .. } => unreachable!("raw index not live"),
        }
    }

    pub(crate) fn record_read_only(&self, i: u32) -> bool {
        match &self.slots[i as usize] {
            ObjectSlot::Live(record) => record.read_only,
            ObjectSlot::Free { .. } => unreachable!("raw index not live"),
        }
    }
}

impl Default for ObjectArena {
    fn default() -> Self {
        Self::new()
    }
}
