//! The atom table: interned strings used for object keys.
//!
//! An [`Atom`] is a 64-bit handle — a table index in the low 32 bits and a
//! cached content hash in the high 32 bits — so two atoms compare equal iff
//! their bits are equal, without ever touching the table. The table itself
//! is a flat, open-addressed hash set: a dense `entries` vec holds the
//! actual bytes in insertion order, and a separate `slots` vec (twice the
//! entry capacity, load factor capped at 0.5) maps content hash to entry
//! index by linear probing.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::ptr::NonNull;

use crate::memory::hash::{fast_reduce32, hash_str};

const EMPTY_SLOT: u32 = u32::MAX;
const INITIAL_CAPACITY: u32 = 8;

/// A handle to an interned string.
///
/// Bit-identical atoms name the same string; the hash half is redundant
/// data carried along so that comparing and rehashing atoms never needs to
/// dereference the table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Atom {
    index: u32,
    hash: u32,
}

impl Atom {
    #[inline]
    pub(crate) const fn new(index: u32, hash: u32) -> Self {
        Atom { index, hash }
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    #[inline]
    #[must_use]
    pub const fn hash(self) -> u32 {
        self.hash
    }
}

enum AtomBytes {
    Owned(Box<[u8]>),
    /// References memory outside the table (`ParseFlags::NO_COPY_STRINGS`).
    /// The caller is responsible for keeping the referent alive for as long
    /// as the table can still hand out this atom — see [`AtomTable::intern`].
    Borrowed { ptr: NonNull<u8>, len: u32 },
}

struct AtomEntry {
    hash: u32,
    bytes: AtomBytes,
}

impl AtomEntry {
    fn as_slice(&self) -> &[u8] {
        match &self.bytes {
            AtomBytes::Owned(b) => b,
            AtomBytes::Borrowed { ptr, len } => {
                // SAFETY: constructed only in `intern` with `copy = false`,
                // whose safety contract requires the referenced bytes to
                // outlive every atom this table hands out.
                unsafe { core::slice::from_raw_parts(ptr.as_ptr(), *len as usize) }
            }
        }
    }
}

/// The open-addressed string-interning table.
pub struct AtomTable {
    entries: Vec<AtomEntry>,
    slots: Vec<u32>,
    capacity: u32,
}

impl AtomTable {
    #[must_use]
    pub fn new() -> Self {
        AtomTable {
            entries: Vec::new(),
            slots: Vec::new(),
            capacity: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the bytes behind `atom`.
    ///
    /// Panics if `atom` was not produced by this table (a stale or foreign
    /// handle is a programmer error, not a recoverable condition).
    #[must_use]
    pub fn resolve(&self, atom: Atom) -> &[u8] {
        self.entries[atom.index as usize].as_slice()
    }

    /// Looks up `bytes` without inserting. Returns `None` if not interned.
    #[must_use]
    pub fn lookup(&self, bytes: &[u8]) -> Option<Atom> {
        if self.capacity == 0 {
            return None;
        }
        let hash = hash_str(bytes);
        let mut slot = fast_reduce32(hash, self.capacity * 2);
        loop {
            let entry_idx = self.slots[slot as usize];
            if entry_idx == EMPTY_SLOT {
                return None;
            }
            let entry = &self.entries[entry_idx as usize];
            if entry.hash == hash && entry.as_slice() == bytes {
                return Some(Atom {
                    index: entry_idx,
                    hash,
                });
            }
            slot += 1;
            if slot == self.capacity * 2 {
                slot = 0;
            }
        }
    }

    /// Interns `bytes`, returning the existing atom if already present.
    ///
    /// When `copy` is `false` the table stores a raw pointer into `bytes`
    /// instead of duplicating it.
    ///
    /// # Safety
    ///
    /// When `copy` is `false`, `bytes` must remain valid for as long as this
    /// table (and any atom it hands back for this entry) is in use. Callers
    /// that cannot uphold this must pass `copy = true`.
    pub unsafe fn intern(&mut self, bytes: &[u8], copy: bool) -> Atom {
        if let Some(atom) = self.lookup(bytes) {
            return atom;
        }
        if self.entries.len() as u32 >= self.capacity / 2 {
            self.grow();
        }
        let hash = hash_str(bytes);
        let entry_bytes = if copy {
            AtomBytes::Owned(bytes.to_vec().into_boxed_slice())
        } else {
            // SAFETY: forwarded to the caller's contract above.
            AtomBytes::Borrowed {
                ptr: NonNull::new(bytes.as_ptr().cast_mut()).unwrap_or(NonNull::dangling()),
                len: bytes.len() as u32,
            }
        };
        let entry_idx = self.entries.len() as u32;
        self.entries.push(AtomEntry {
            hash,
            bytes: entry_bytes,
        });
        let mut slot = fast_reduce32(hash, self.capacity * 2);
        while self.slots[slot as usize] != EMPTY_SLOT {
            slot += 1;
            if slot == self.capacity * 2 {
                slot = 0;
            }
        }
        self.slots[slot as usize] = entry_idx;
        Atom {
            index: entry_idx,
            hash,
        }
    }

    fn grow(&mut self) {
        let new_capacity = if self.capacity == 0 {
            INITIAL_CAPACITY
        } else {
            self.capacity * 2
        };
        log::trace!("atom table growing to capacity {new_capacity}");
        let mut slots = vec![EMPTY_SLOT; (new_capacity * 2) as usize];
        for (i, entry) in self.entries.iter().enumerate() {
            let mut slot = fast_reduce32(entry.hash, new_capacity * 2);
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
}

impl Default for AtomTable {
    fn default() -> Self {
        Self::new()
    }
}
