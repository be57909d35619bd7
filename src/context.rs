//! [`Context`]: the single entry point that owns every arena and table a
//! program needs. There is no global state — two contexts never share a
//! handle, and a [`Value`] produced by one is meaningless (or, worse,
//! silently wrong) if handed to another.

use alloc::boxed::Box;

use crate::error::{DrJsonError, ErrorCode};
use crate::intern::{hash_items, hash_pairs, InternIndex};
use crate::memory::allocator::{Allocator, SystemAllocator};
use crate::object::{ObjectArena, ObjectIndex, ObjectRecord};
use crate::value::array::{ArrayArena, ArrayIndex, ArrayRecord};
use crate::value::atom::AtomTable;
use crate::value::{Atom, Kind, Value};

/// Resolves a possibly-negative logical index against `len`, the same rule
/// [`crate::value::array::ArrayRecord::resolve_index`] applies to arrays.
fn normalize_index(index: i64, len: i64) -> Option<usize> {
    let i = if index < 0 { len + index } else { index };
    if i < 0 || i >= len {
        None
    } else {
        Some(i as usize)
    }
}

/// Owns the atom table, the object and array arenas, the two structural
/// interning indices, and the allocator every allocation in this context is
/// attributed to.
///
/// `Context` is the only way to produce, inspect, or mutate a [`Value`].
/// Every handle-carrying `Value` ([`Kind::Array`], [`Kind::Object`], and the
/// view kinds) is only meaningful against the `Context` that produced it.
pub struct Context {
    allocator: Box<dyn Allocator>,
    atoms: AtomTable,
    objects: ObjectArena,
    arrays: ArrayArena,
    interned_objects: InternIndex,
    interned_arrays: InternIndex,
}

impl Context {
    /// Creates a context backed by [`SystemAllocator`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_allocator(SystemAllocator)
    }

    /// Creates a context backed by a caller-supplied allocator.
    #[must_use]
    pub fn with_allocator(allocator: impl Allocator + 'static) -> Self {
        Context {
            allocator: Box::new(allocator),
            atoms: AtomTable::new(),
            objects: ObjectArena::new(),
            arrays: ArrayArena::new(),
            interned_objects: InternIndex::new(),
            interned_arrays: InternIndex::new(),
        }
    }

    pub(crate) fn atoms(&self) -> &AtomTable {
        &self.atoms
    }

    pub(crate) fn atoms_mut(&mut self) -> &mut AtomTable {
        &mut self.atoms
    }

    pub(crate) fn objects(&self) -> &ObjectArena {
        &self.objects
    }

    pub(crate) fn objects_mut(&mut self) -> &mut ObjectArena {
        &mut self.objects
    }

    pub(crate) fn arrays(&self) -> &ArrayArena {
        &self.arrays
    }

    pub(crate) fn arrays_mut(&mut self) -> &mut ArrayArena {
        &mut self.arrays
    }

    // --- atoms -------------------------------------------------------------

    /// Interns `bytes`, copying them into the atom table.
    pub fn atomize(&mut self, bytes: &[u8]) -> Atom {
        // SAFETY: `copy = true`, the table duplicates `bytes`; the
        // borrowed-pointer contract only applies to `copy = false`.
        unsafe { self.atoms.intern(bytes, true) }
    }

    /// Interns `bytes` without copying them.
    ///
    /// # Safety
    /// `bytes` must outlive every atom this context can still hand back for
    /// it — every live `Value::String` naming it, and every key in a live
    /// object.
    pub unsafe fn atomize_no_copy(&mut self, bytes: &[u8]) -> Atom {
        // SAFETY: forwarded to the caller.
        unsafe { self.atoms.intern(bytes, false) }
    }

    pub(crate) fn make_string_raw(&mut self, bytes: &[u8], copy: bool) -> Value {
        let atom = if copy {
            self.atomize(bytes)
        } else {
            // SAFETY: forwarded to the caller of whichever entry point
            // plumbed `copy = false` through to us (the parser, under
            // `ParseFlags::NO_COPY_STRINGS`).
            unsafe { self.atomize_no_copy(bytes) }
        };
        Value::String(atom)
    }

    /// Looks up `atom`'s bytes. Panics if `atom` is foreign to this context.
    #[must_use]
    pub fn resolve(&self, atom: Atom) -> &[u8] {
        self.atoms.resolve(atom)
    }

    // --- constructors --------------------------------------------------------

    /// Allocates a fresh, empty object.
    pub fn make_object(&mut self) -> Value {
        Value::Object(self.objects.alloc(ObjectRecord::new()))
    }

    /// Allocates a fresh, empty array.
    pub fn make_array(&mut self) -> Value {
        Value::Array(self.arrays.alloc(ArrayRecord::new()))
    }

    /// Interns `bytes` and wraps the resulting atom as a string value.
    pub fn make_string(&mut self, bytes: &[u8]) -> Value {
        Value::String(self.atomize(bytes))
    }

    fn is_frozen(&self, v: Value) -> bool {
        match v {
            Value::Array(idx) => self.arrays.get(idx).is_read_only(),
            Value::Object(idx) => self.objects.get(idx).is_read_only(),
            Value::ArrayView(_) | Value::ObjectKeys(_) | Value::ObjectValues(_) | Value::ObjectItems(_) => false,
            _ => true,
        }
    }

    /// Structurally interns `v`, returning the canonical handle for its
    /// content. Every value `v` transitively contains must already be
    /// read-only (a scalar, or a previously-interned composite) — a mutable
    /// child could change out from under the content hash.
    ///
    /// When `consume` is `true` and no existing match is found, `v` itself
    /// is frozen and registered. When `false`, its content is duplicated
    /// into a fresh read-only slot and `v` is left untouched (and still
    /// mutable, if the caller kept another handle to it).
    pub fn intern_value(&mut self, v: Value, consume: bool) -> Result<Value, DrJsonError> {
        match v {
            Value::ArrayView(_) | Value::ObjectKeys(_) | Value::ObjectValues(_) | Value::ObjectItems(_) => {
                Err(DrJsonError::new(ErrorCode::TypeError, "cannot intern a view value"))
            }
            Value::Array(idx) => self.intern_array(idx, consume),
            Value::Object(idx) => self.intern_object(idx, consume),
            other => Ok(other),
        }
    }

    fn intern_array(&mut self, idx: ArrayIndex, consume: bool) -> Result<Value, DrJsonError> {
        let items = self.arrays.get(idx).items().to_vec();
        if !items.iter().all(|&v| self.is_frozen(v)) {
            return Err(DrJsonError::new(ErrorCode::TypeError, "array contains a non-frozen value"));
        }
        let hash = hash_items(&items);
        let arrays = &self.arrays;
        if let Some(found) = self.interned_arrays.find(hash, |slot| arrays.record_items(slot) == items.as_slice()) {
            if consume {
                self.arrays.free(idx);
            }
            return Ok(Value::Array(ArrayIndex::from_raw(found)));
        }
        let target = if consume {
            idx
        } else {
            let mut copy = ArrayRecord::new();
            for item in &items {
                // Never fails: a fresh record is never read-only and the
                // copy is bounded by the same `ARRAY_MAX` the source obeyed.
                let _ = copy.push(*item);
            }
            self.arrays.alloc(copy)
        };
        self.arrays.get_mut(target).set_read_only(true);
        self.interned_arrays.insert(hash, target.get());
        Ok(Value::Array(target))
    }

    fn intern_object(&mut self, idx: ObjectIndex, consume: bool) -> Result<Value, DrJsonError> {
        let pairs = self.objects.get(idx).pairs().to_vec();
        if !pairs.iter().all(|&(_, v)| self.is_frozen(v)) {
            return Err(DrJsonError::new(ErrorCode::TypeError, "object contains a non-frozen value"));
        }
        let hash = hash_pairs(&pairs);
        let objects = &self.objects;
        if let Some(found) = self.interned_objects.find(hash, |slot| objects.record_pairs(slot) == pairs.as_slice()) {
            if consume {
                self.objects.free(idx);
            }
            return Ok(Value::Object(ObjectIndex::from_raw(found)));
        }
        let target = if consume {
            idx
        } else {
            let mut copy = ObjectRecord::new();
            for &(key, value) in &pairs {
                let _ = copy.set(key, value);
            }
            self.objects.alloc(copy)
        };
        self.objects.get_mut(target).set_read_only(true);
        self.interned_objects.insert(hash, target.get());
        Ok(Value::Object(target))
    }

    // --- objects -------------------------------------------------------------

    /// Looks up `key` in object `o`. Returns an ERROR value, never panics,
    /// if `o` is not an object or `key` is absent.
    #[must_use]
    pub fn object_get(&self, o: Value, key: Atom) -> Value {
        match o {
            Value::Object(idx) => self
                .objects
                .get(idx)
                .get(key)
                .unwrap_or_else(|| Value::make_error(ErrorCode::MissingKey, "key not found in object")),
            _ => Value::make_error(ErrorCode::TypeError, "value is not an object"),
        }
    }

    /// As [`Self::object_get`], but looks `key` up by bytes instead of a
    /// pre-interned atom. Never inserts: a key this context has never seen
    /// cannot be present in any of its objects.
    #[must_use]
    pub fn object_get_by_bytes(&self, o: Value, key: &[u8]) -> Value {
        match self.atoms.lookup(key) {
            Some(atom) => self.object_get(o, atom),
            None => Value::make_error(ErrorCode::MissingKey, "key not found in object"),
        }
    }

    #[must_use]
    pub fn object_contains(&self, o: Value, key: Atom) -> bool {
        matches!(o, Value::Object(idx) if self.objects.get(idx).contains(key))
    }

    /// Inserts or overwrites `key` in object `o`.
    pub fn object_set(&mut self, o: Value, key: Atom, value: Value) -> Result<(), DrJsonError> {
        match o {
            Value::Object(idx) => self
                .objects
                .get_mut(idx)
                .set(key, value)
                .map_err(|c| DrJsonError::new(c, "failed to set object item")),
            _ => Err(DrJsonError::new(ErrorCode::TypeError, "value is not an object")),
        }
    }

    /// As [`Self::object_set`], atomizing `key` (copying it) first.
    pub fn object_set_by_bytes(&mut self, o: Value, key: &[u8], value: Value) -> Result<(), DrJsonError> {
        let atom = self.atomize(key);
        self.object_set(o, atom, value)
    }

    /// Removes `key` from object `o`, preserving the insertion order of
    /// every remaining entry, and returns the value it held.
    pub fn object_delete(&mut self, o: Value, key: Atom) -> Result<Value, DrJsonError> {
        match o {
            Value::Object(idx) => self
                .objects
                .get_mut(idx)
                .delete(key)
                .map_err(|c| DrJsonError::new(c, "failed to delete object item")),
            _ => Err(DrJsonError::new(ErrorCode::TypeError, "value is not an object")),
        }
    }

    pub fn object_delete_by_bytes(&mut self, o: Value, key: &[u8]) -> Result<Value, DrJsonError> {
        match self.atoms.lookup(key) {
            Some(atom) => self.object_delete(o, atom),
            None => Err(DrJsonError::new(ErrorCode::MissingKey, "key not found in object")),
        }
    }

    /// Inserts `key`/`value` at a specific position in `o`'s iteration
    /// order. Errors if `key` is already present.
    pub fn object_insert_at(&mut self, o: Value, key: Atom, value: Value, index: usize) -> Result<(), DrJsonError> {
        match o {
            Value::Object(idx) => self
                .objects
                .get_mut(idx)
                .insert_at_index(key, value, index)
                .map_err(|c| DrJsonError::new(c, "failed to insert object item")),
            _ => Err(DrJsonError::new(ErrorCode::TypeError, "value is not an object")),
        }
    }

    /// Renames `old` to `new` in place, keeping position and value.
    pub fn object_replace_key(&mut self, o: Value, old: Atom, new: Atom) -> Result<(), DrJsonError> {
        match o {
            Value::Object(idx) => self
                .objects
                .get_mut(idx)
                .replace_key(old, new)
                .map_err(|c| DrJsonError::new(c, "failed to replace object key")),
            _ => Err(DrJsonError::new(ErrorCode::TypeError, "value is not an object")),
        }
    }

    // --- arrays ---------------------------------------------------------------

    pub fn array_push(&mut self, a: Value, value: Value) -> Result<(), DrJsonError> {
        match a {
            Value::Array(idx) => self
                .arrays
                .get_mut(idx)
                .push(value)
                .map_err(|c| DrJsonError::new(c, "failed to push array item")),
            _ => Err(DrJsonError::new(ErrorCode::TypeError, "value is not an array")),
        }
    }

    pub fn array_pop(&mut self, a: Value) -> Result<Value, DrJsonError> {
        match a {
            Value::Array(idx) => self
                .arrays
                .get_mut(idx)
                .pop()
                .map_err(|c| DrJsonError::new(c, "failed to pop array item")),
            _ => Err(DrJsonError::new(ErrorCode::TypeError, "value is not an array")),
        }
    }

    pub fn array_insert(&mut self, a: Value, index: usize, value: Value) -> Result<(), DrJsonError> {
        match a {
            Value::Array(idx) => self
                .arrays
                .get_mut(idx)
                .insert(index, value)
                .map_err(|c| DrJsonError::new(c, "failed to insert array item")),
            _ => Err(DrJsonError::new(ErrorCode::TypeError, "value is not an array")),
        }
    }

    /// Removes and returns the element at `index` (`-1` is the last
    /// element), preserving the order of everything after it.
    pub fn array_delete(&mut self, a: Value, index: i64) -> Result<Value, DrJsonError> {
        match a {
            Value::Array(idx) => self
                .arrays
                .get_mut(idx)
                .delete(index)
                .map_err(|c| DrJsonError::new(c, "failed to delete array item")),
            _ => Err(DrJsonError::new(ErrorCode::TypeError, "value is not an array")),
        }
    }

    pub fn array_set(&mut self, a: Value, index: i64, value: Value) -> Result<(), DrJsonError> {
        match a {
            Value::Array(idx) => self
                .arrays
                .get_mut(idx)
                .set(index, value)
                .map_err(|c| DrJsonError::new(c, "failed to set array item")),
            _ => Err(DrJsonError::new(ErrorCode::TypeError, "value is not an array")),
        }
    }

    // --- shared object/array ops ----------------------------------------------

    /// Empties an object or array in place.
    pub fn clear(&mut self, v: Value) -> Result<(), DrJsonError> {
        match v {
            Value::Object(idx) => self
                .objects
                .get_mut(idx)
                .clear()
                .map_err(|c| DrJsonError::new(c, "failed to clear object")),
            Value::Array(idx) => self
                .arrays
                .get_mut(idx)
                .clear()
                .map_err(|c| DrJsonError::new(c, "failed to clear array")),
            _ => Err(DrJsonError::new(ErrorCode::TypeError, "clear applies only to an object or array")),
        }
    }

    /// Indexes into any sequence-like value (`Array`, `ArrayView`,
    /// `ObjectKeys`, `ObjectValues`, `ObjectItems`), with negative indices
    /// counting from the end. `ObjectItems` interleaves key then value, so
    /// its length is twice the pair count.
    #[must_use]
    pub fn get_by_index(&self, v: Value, index: i64) -> Value {
        match v {
            Value::Array(idx) | Value::ArrayView(idx) => self
                .arrays
                .get(idx)
                .get(index)
                .unwrap_or_else(|| Value::make_error(ErrorCode::IndexError, "array index out of bounds")),
            Value::ObjectKeys(idx) => {
                let pairs = self.objects.get(idx).pairs();
                match normalize_index(index, pairs.len() as i64) {
                    Some(i) => Value::String(pairs[i].0),
                    None => Value::make_error(ErrorCode::IndexError, "object index out of bounds"),
                }
            }
            Value::ObjectValues(idx) => {
                let pairs = self.objects.get(idx).pairs();
                match normalize_index(index, pairs.len() as i64) {
                    Some(i) => pairs[i].1,
                    None => Value::make_error(ErrorCode::IndexError, "object index out of bounds"),
                }
            }
            Value::ObjectItems(idx) => {
                let pairs = self.objects.get(idx).pairs();
                match normalize_index(index, pairs.len() as i64 * 2) {
                    Some(i) => {
                        let (key, value) = pairs[i / 2];
                        if i % 2 == 0 {
                            Value::String(key)
                        } else {
                            value
                        }
                    }
                    None => Value::make_error(ErrorCode::IndexError, "object index out of bounds"),
                }
            }
            _ => Value::make_error(ErrorCode::TypeError, "value does not support indexing"),
        }
    }

    /// A value's element count: byte length for strings, item count for
    /// arrays and array-like views, pair count for objects (`ObjectItems`
    /// doubles it), `-1` for anything else.
    #[must_use]
    pub fn len(&self, v: Value) -> i64 {
        match v {
            Value::String(a) => self.atoms.resolve(a).len() as i64,
            Value::Array(idx) | Value::ArrayView(idx) => self.arrays.get(idx).len() as i64,
            Value::Object(idx) | Value::ObjectKeys(idx) | Value::ObjectValues(idx) => self.objects.get(idx).len() as i64,
            Value::ObjectItems(idx) => self.objects.get(idx).len() as i64 * 2,
            _ => -1,
        }
    }

    /// Produces a view over `o`'s keys, values, or key/value pairs, or an
    /// array view over an array. `kind` must be one of the four view kinds.
    #[must_use]
    pub fn view(&self, o: Value, kind: Kind) -> Value {
        match (o, kind) {
            (Value::Object(idx), Kind::ObjectKeys) => Value::ObjectKeys(idx),
            (Value::Object(idx), Kind::ObjectValues) => Value::ObjectValues(idx),
            (Value::Object(idx), Kind::ObjectItems) => Value::ObjectItems(idx),
            (Value::Array(idx), Kind::ArrayView) => Value::ArrayView(idx),
            _ => Value::make_error(ErrorCode::TypeError, "value does not support this view"),
        }
    }

    // --- garbage collection ----------------------------------------------------

    /// Runs one mark-and-sweep collection, keeping everything transitively
    /// reachable from `roots` and freeing the rest.
    pub fn gc(&mut self, roots: &[Value]) {
        crate::memory::gc::gc(&mut self.objects, &mut self.arrays, &mut self.interned_objects, &mut self.interned_arrays, roots);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.allocator.free_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_object_then_set_then_get() {
        let mut ctx = Context::new();
        let o = ctx.make_object();
        let key = ctx.atomize(b"foo");
        ctx.object_set(o, key, Value::integer(123)).unwrap();
        assert_eq!(ctx.object_get(o, key), Value::integer(123));
    }

    #[test]
    fn missing_key_is_an_error_value() {
        let mut ctx = Context::new();
        let o = ctx.make_object();
        let key = ctx.atomize(b"missing");
        assert!(ctx.object_get(o, key).is_error());
    }

    #[test]
    fn array_push_pop_and_len() {
        let mut ctx = Context::new();
        let a = ctx.make_array();
        ctx.array_push(a, Value::integer(1)).unwrap();
        ctx.array_push(a, Value::integer(2)).unwrap();
        assert_eq!(ctx.len(a), 2);
        assert_eq!(ctx.array_pop(a).unwrap(), Value::integer(2));
        assert_eq!(ctx.len(a), 1);
    }

    #[test]
    fn negative_index_wraps_through_get_by_index() {
        let mut ctx = Context::new();
        let a = ctx.make_array();
        ctx.array_push(a, Value::integer(10)).unwrap();
        ctx.array_push(a, Value::integer(20)).unwrap();
        assert_eq!(ctx.get_by_index(a, -1), Value::integer(20));
    }

    #[test]
    fn object_keys_values_items_views() {
        let mut ctx = Context::new();
        let o = ctx.make_object();
        let k1 = ctx.atomize(b"a");
        let k2 = ctx.atomize(b"b");
        ctx.object_set(o, k1, Value::integer(1)).unwrap();
        ctx.object_set(o, k2, Value::integer(2)).unwrap();

        let keys = ctx.view(o, Kind::ObjectKeys);
        assert_eq!(ctx.len(keys), 2);
        assert_eq!(ctx.get_by_index(keys, 0), Value::String(k1));

        let values = ctx.view(o, Kind::ObjectValues);
        assert_eq!(ctx.get_by_index(values, 1), Value::integer(2));

        let items = ctx.view(o, Kind::ObjectItems);
        assert_eq!(ctx.len(items), 4);
        assert_eq!(ctx.get_by_index(items, 0), Value::String(k1));
        assert_eq!(ctx.get_by_index(items, 1), Value::integer(1));
    }

    #[test]
    fn intern_value_deduplicates_equal_arrays() {
        let mut ctx = Context::new();
        let a = ctx.make_array();
        ctx.array_push(a, Value::integer(1)).unwrap();
        let b = ctx.make_array();
        ctx.array_push(b, Value::integer(1)).unwrap();

        let ia = ctx.intern_value(a, true).unwrap();
        let ib = ctx.intern_value(b, true).unwrap();
        assert_eq!(ia.as_array_index(), ib.as_array_index());
    }

    #[test]
    fn intern_value_rejects_mutable_children() {
        let mut ctx = Context::new();
        let outer = ctx.make_array();
        let inner = ctx.make_array();
        ctx.array_push(outer, inner).unwrap();
        assert!(ctx.intern_value(outer, true).is_err());
    }

    #[test]
    fn intern_value_without_consume_leaves_original_handle_distinct() {
        let mut ctx = Context::new();
        let a = ctx.make_array();
        ctx.array_push(a, Value::integer(5)).unwrap();
        let interned = ctx.intern_value(a, false).unwrap();
        assert_ne!(a.as_array_index(), interned.as_array_index());
        assert_eq!(ctx.len(interned), 1);
    }

    #[test]
    fn clear_empties_an_object() {
        let mut ctx = Context::new();
        let o = ctx.make_object();
        let key = ctx.atomize(b"k");
        ctx.object_set(o, key, Value::null()).unwrap();
        ctx.clear(o).unwrap();
        assert_eq!(ctx.len(o), 0);
    }

    #[test]
    fn gc_frees_unrooted_array() {
        let mut ctx = Context::new();
        let a = ctx.make_array();
        ctx.gc(&[]);
        let _ = a;
        let b = ctx.make_array();
        assert_eq!(ctx.len(b), 0);
    }
}
