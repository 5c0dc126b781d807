//! Hashtable Module - the open-addressing engine shared by set and dict
//!
//! One probe sequence, one resize policy, used both for the `frozenset`/
//! `set` keyset and for the `frozendict`/`dict` keyset + parallel value
//! array. Equality and hashing are supplied by the caller as closures
//! (ultimately backed by [`crate::hash`]) rather than imported directly, so
//! this module stays a pure data-structure engine with no knowledge of the
//! rest of the type system — shared engines here take the state they act
//! on as a parameter instead of reaching for globals.

use crate::exception::{singleton, ExcKind};
use crate::object::Obj;

/// Smallest table capacity; always a power of two.
pub const MIN_CAPACITY: usize = 8;

/// A sentinel distinguishable from any real key: a tombstone left behind by
/// a delete. Represented structurally (not as a special `Obj`) since Rust's
/// enum already gives us a third state for free.
enum Slot {
    Empty,
    Dummy,
    Active { hash: i64, key: Obj },
}

/// Result of probing for a key.
pub enum Probe {
    /// Key is present at this slot index.
    Found(usize),
    /// Key is absent; insert at this slot index (the first empty slot seen,
    /// or an earlier dummy slot if one was passed over first).
    Insert(usize),
}

type EqFn<'a> = dyn Fn(&Obj, &Obj) -> Result<bool, Obj> + 'a;

/// The shared keyset: an open-addressed table of `{hash, key}` entries.
pub struct KeySet {
    slots: Vec<Slot>,
    /// active + dummy
    fill: usize,
    active: usize,
    /// Persisted search cursor for `pop_arbitrary`, carried as a plain
    /// field rather than overlaid on the slot array.
    pop_cursor: usize,
}

fn next_pow2_at_least(n: usize) -> usize {
    let mut cap = MIN_CAPACITY;
    while cap < n {
        cap *= 2;
    }
    cap
}

/// `new_capacity = smallest power-of-two >= ceil(3*required/2) + 1`.
fn capacity_for_required(required: usize) -> usize {
    let scaled = (required * 3).div_ceil(2) + 1;
    next_pow2_at_least(scaled)
}

impl KeySet {
    pub fn new() -> Self {
        KeySet::with_room_for(0)
    }

    pub fn with_room_for(required: usize) -> Self {
        let cap = capacity_for_required(required).max(MIN_CAPACITY);
        KeySet {
            slots: (0..cap).map(|_| Slot::Empty).collect(),
            fill: 0,
            active: 0,
            pop_cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    fn space_remaining(&self) -> usize {
        (2 * self.capacity() / 3).saturating_sub(self.fill)
    }

    pub fn needs_resize_before_insert(&self) -> bool {
        self.space_remaining() == 0
    }

    /// Probe for `key` with hash `h`. `eq` is only ever called on an
    /// existing active slot whose stored hash matches.
    pub fn probe(&self, h: i64, key: &Obj, eq: &EqFn) -> Result<Probe, Obj> {
        let cap = self.capacity();
        let mask = cap - 1;
        let mut i = (h as u64 as usize) & mask;
        let mut perturb = h as u64 as usize;
        let mut freeslot: Option<usize> = None;

        loop {
            match &self.slots[i] {
                Slot::Empty => {
                    return Ok(Probe::Insert(freeslot.unwrap_or(i)));
                }
                Slot::Dummy => {
                    if freeslot.is_none() {
                        freeslot = Some(i);
                    }
                }
                Slot::Active { hash, key: slot_key } => {
                    if Obj::ptr_eq(slot_key, key) {
                        return Ok(Probe::Found(i));
                    }
                    if *hash == h {
                        if eq(slot_key, key)? {
                            return Ok(Probe::Found(i));
                        }
                    }
                }
            }
            i = (5usize.wrapping_mul(i).wrapping_add(perturb).wrapping_add(1)) & mask;
            perturb >>= 5;
        }
    }

    /// Insert at a slot index obtained from `Probe::Insert`. Caller must
    /// have already established the key is absent.
    pub fn insert_at(&mut self, idx: usize, h: i64, key: Obj) {
        if matches!(self.slots[idx], Slot::Empty) {
            self.fill += 1;
        }
        self.slots[idx] = Slot::Active { hash: h, key };
        self.active += 1;
    }

    /// Probe that never matches (used by resize, where keys are known
    /// unique and the fresh table has no dummies). Returns the slot index
    /// the key landed in, so a caller carrying a parallel array (`Dict`'s
    /// value table) can relocate the matching entry alongside it.
    fn clean_insert(&mut self, h: i64, key: Obj) -> usize {
        let cap = self.capacity();
        let mask = cap - 1;
        let mut i = (h as u64 as usize) & mask;
        let mut perturb = h as u64 as usize;
        loop {
            if matches!(self.slots[i], Slot::Empty) {
                self.slots[i] = Slot::Active { hash: h, key };
                self.fill += 1;
                self.active += 1;
                return i;
            }
            i = (5usize.wrapping_mul(i).wrapping_add(perturb).wrapping_add(1)) & mask;
            perturb >>= 5;
        }
    }

    pub fn delete_at(&mut self, idx: usize) {
        self.slots[idx] = Slot::Dummy;
        self.active -= 1;
    }

    pub fn get(&self, idx: usize) -> Option<(i64, &Obj)> {
        match &self.slots[idx] {
            Slot::Active { hash, key } => Some((*hash, key)),
            _ => None,
        }
    }

    /// Resize so at least `required` entries fit, rehashing every active
    /// key via `clean_insert`. `required` already includes headroom
    /// (mutable tables pass a generous multiple to amortize).
    pub fn resize_to_fit(&mut self, required: usize) {
        let old_cap = self.capacity();
        let new_cap = capacity_for_required(required).max(old_cap);
        let old = std::mem::replace(
            self,
            KeySet {
                slots: (0..new_cap).map(|_| Slot::Empty).collect(),
                fill: 0,
                active: 0,
                pop_cursor: 0,
            },
        );
        for slot in old.slots {
            if let Slot::Active { hash, key } = slot {
                self.clean_insert(hash, key);
            }
        }
        crate::logging::global().log(crate::logging::RuntimeEvent::HashtableResize {
            old_capacity: old_cap,
            new_capacity: new_cap,
            active: self.active,
        });
    }

    /// Arbitrary-key pop: advances a persisted cursor so repeated calls are
    /// amortized O(1) instead of re-scanning from zero each time.
    pub fn pop_arbitrary(&mut self) -> Option<(i64, Obj)> {
        let cap = self.capacity();
        for _ in 0..cap {
            if self.pop_cursor >= cap {
                self.pop_cursor = 0;
            }
            let idx = self.pop_cursor;
            self.pop_cursor += 1;
            if let Slot::Active { hash, .. } = &self.slots[idx] {
                let hash = *hash;
                if let Slot::Active { key, .. } = std::mem::replace(&mut self.slots[idx], Slot::Dummy)
                {
                    self.active -= 1;
                    return Some((hash, key));
                }
            }
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &Obj)> {
        self.slots.iter().filter_map(|s| match s {
            Slot::Active { hash, key } => Some((*hash, key)),
            _ => None,
        })
    }

    pub fn iter_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.capacity()).filter(move |&i| matches!(self.slots[i], Slot::Active { .. }))
    }
}

impl Default for KeySet {
    fn default() -> Self {
        KeySet::new()
    }
}

/// Growth policy for insert-triggered resize: mutable tables use a
/// generous multiple to amortize; `required` is the count the table must
/// hold *after* the pending insert.
pub fn mutable_growth_required(new_len: usize) -> usize {
    let factor = if new_len > 50_000 { 2 } else { 4 };
    factor * new_len
}

/// Ensure `keys` has room for one more entry, resizing first if needed.
/// Returns the resolved probe for `(h, key)` against the (possibly resized)
/// table.
pub fn probe_with_room<'a>(
    keys: &mut KeySet,
    h: i64,
    key: &Obj,
    eq: &EqFn,
) -> Result<Probe, Obj> {
    if keys.needs_resize_before_insert() {
        keys.resize_to_fit(mutable_growth_required(keys.active_count() + 1));
    }
    keys.probe(h, key, eq)
}

/// A dict's value table: a value slot of `None` means "key absent from
/// this mapping even if the keyset has the key". The value array is kept
/// as its own field, same length as
/// the keyset's capacity, specifically so a future keyset-sharing
/// extension can attach a second value array to the same `KeySet` without
/// a layout change (see DESIGN.md).
pub struct Dict {
    keys: KeySet,
    values: Vec<Option<Obj>>,
    value_count: usize,
}

impl Dict {
    pub fn new() -> Self {
        Dict {
            keys: KeySet::new(),
            values: vec![None; MIN_CAPACITY],
            value_count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.value_count
    }

    pub fn is_empty(&self) -> bool {
        self.value_count == 0
    }

    pub fn capacity(&self) -> usize {
        self.keys.capacity()
    }

    /// Resize keyset and value array together, in lockstep: every active
    /// key is rehashed into the fresh keyset via `clean_insert`, and its
    /// value follows it to the same new slot index. Matches spec's "Dict
    /// resize allocates a fresh keyset and value array together and
    /// relocates using clean-insert" — resizing the keyset alone and
    /// padding the value array (the prior bug here) leaves every value at
    /// its *old* slot index, which is meaningless once keys have moved.
    fn resize_to_fit(&mut self, required: usize) {
        let old_cap = self.keys.capacity();
        let new_cap = capacity_for_required(required).max(old_cap);
        let old_keys = std::mem::replace(&mut self.keys, KeySet::new());
        let old_values = std::mem::replace(&mut self.values, Vec::new());
        let mut new_keys = KeySet {
            slots: (0..new_cap).map(|_| Slot::Empty).collect(),
            fill: 0,
            active: 0,
            pop_cursor: 0,
        };
        let mut new_values = vec![None; new_cap];
        for idx in old_keys.iter_indices() {
            let (h, key) = old_keys.get(idx).map(|(h, k)| (h, k.clone())).unwrap();
            let new_idx = new_keys.clean_insert(h, key);
            new_values[new_idx] = old_values[idx].clone();
        }
        crate::logging::global().log(crate::logging::RuntimeEvent::HashtableResize {
            old_capacity: old_cap,
            new_capacity: new_cap,
            active: new_keys.active,
        });
        self.keys = new_keys;
        self.values = new_values;
    }

    pub fn get(&self, h: i64, key: &Obj, eq: &EqFn) -> Result<Option<Obj>, Obj> {
        match self.keys.probe(h, key, eq)? {
            Probe::Found(idx) => Ok(self.values[idx].clone()),
            Probe::Insert(_) => Ok(None),
        }
    }

    pub fn contains_key(&self, h: i64, key: &Obj, eq: &EqFn) -> Result<bool, Obj> {
        Ok(self.get(h, key, eq)?.is_some())
    }

    pub fn set(&mut self, h: i64, key: Obj, value: Obj, eq: &EqFn) -> Result<(), Obj> {
        if self.keys.needs_resize_before_insert() {
            self.resize_to_fit(mutable_growth_required(self.keys.active_count() + 1));
        }
        let probe = self.keys.probe(h, &key, eq)?;
        match probe {
            Probe::Found(idx) => {
                if self.values[idx].is_none() {
                    self.value_count += 1;
                }
                self.values[idx] = Some(value);
            }
            Probe::Insert(idx) => {
                self.keys.insert_at(idx, h, key);
                self.values[idx] = Some(value);
                self.value_count += 1;
            }
        }
        Ok(())
    }

    /// `setdefault`-style helper: returns the existing value, or inserts
    /// and returns `default`.
    pub fn get_or_insert(&mut self, h: i64, key: Obj, default: Obj, eq: &EqFn) -> Result<Obj, Obj> {
        if self.keys.needs_resize_before_insert() {
            self.resize_to_fit(mutable_growth_required(self.keys.active_count() + 1));
        }
        let probe = self.keys.probe(h, &key, eq)?;
        match probe {
            Probe::Found(idx) => {
                if let Some(v) = &self.values[idx] {
                    return Ok(v.clone());
                }
                self.values[idx] = Some(default.clone());
                self.value_count += 1;
                Ok(default)
            }
            Probe::Insert(idx) => {
                self.keys.insert_at(idx, h, key);
                self.values[idx] = Some(default.clone());
                self.value_count += 1;
                Ok(default)
            }
        }
    }

    /// Remove the key's value if present; the keyset slot itself is left
    /// alone unless the caller also wants to drop the key (it does for a
    /// plain dict, whose keyset is not shared — see `delete_key`).
    pub fn delete_key(&mut self, h: i64, key: &Obj, eq: &EqFn) -> Result<Option<Obj>, Obj> {
        match self.keys.probe(h, key, eq)? {
            Probe::Found(idx) => {
                let had = self.values[idx].take();
                if had.is_some() {
                    self.value_count -= 1;
                    self.keys.delete_at(idx);
                }
                Ok(had)
            }
            Probe::Insert(_) => Ok(None),
        }
    }

    pub fn pop_arbitrary(&mut self) -> Option<(Obj, Obj)> {
        loop {
            let cap = self.keys.capacity();
            let mut found = None;
            for idx in 0..cap {
                if self.values[idx].is_some() {
                    found = Some(idx);
                    break;
                }
            }
            let idx = found?;
            let value = self.values[idx].take().unwrap();
            self.value_count -= 1;
            // Also retire the keyset slot: this dict owns its keyset.
            if let Some((_, key)) = self.keys.get(idx).map(|(h, k)| (h, k.clone())) {
                self.keys.delete_at(idx);
                return Some((key, value));
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Obj, Obj)> + '_ {
        self.keys
            .iter_indices()
            .filter_map(move |idx| self.values[idx].as_ref().map(|v| (idx, v.clone())))
            .map(move |(idx, v)| {
                let (_, k) = self.keys.get(idx).unwrap();
                (k.clone(), v)
            })
    }

    pub fn keys(&self) -> &KeySet {
        &self.keys
    }

    /// Direct indexed lookup of the value paired with keyset slot `idx`.
    /// `idx` must be a slot the caller already knows is active (e.g. from
    /// `KeySet::get`/`iter_indices`) — that's always the case for a dict,
    /// since `set`/`delete_key` keep the keyset slot and value slot in
    /// lockstep.
    pub fn value_at(&self, idx: usize) -> Option<&Obj> {
        self.values.get(idx).and_then(|v| v.as_ref())
    }
}

impl Default for Dict {
    fn default() -> Self {
        Dict::new()
    }
}

/// Promote an internal probe-time error into a `KeyError`-free lookup
/// result, or propagate a comparison exception unchanged.
pub fn key_error() -> Obj {
    singleton(ExcKind::KeyError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Obj;

    fn int_eq() -> impl Fn(&Obj, &Obj) -> Result<bool, Obj> {
        |a, b| {
            let av = a.with_payload(|p| p.as_int().unwrap());
            let bv = b.with_payload(|p| p.as_int().unwrap());
            Ok(av == bv)
        }
    }

    #[test]
    fn test_insert_and_find_many_with_colliding_hashes() {
        let eq = int_eq();
        let mut ks = KeySet::new();
        // All hash to the same bucket (hash == capacity-multiple) to force
        // a long probe chain; every key must still end up active.
        for i in 0..50i64 {
            let key = Obj::new_int(i);
            let h = 0i64; // worst case: every key collides
            match ks.probe(h, &key, &eq).unwrap() {
                Probe::Found(_) => panic!("unexpected duplicate"),
                Probe::Insert(idx) => ks.insert_at(idx, h, key),
            }
            if ks.needs_resize_before_insert() {
                ks.resize_to_fit(mutable_growth_required(ks.active_count() + 1));
            }
        }
        assert_eq!(ks.active_count(), 50);
        for i in 0..50i64 {
            let key = Obj::new_int(i);
            match ks.probe(0, &key, &eq).unwrap() {
                Probe::Found(_) => {}
                Probe::Insert(_) => panic!("key {i} missing after insert"),
            }
        }
    }

    #[test]
    fn test_delete_then_reinsert_same_key() {
        let eq = int_eq();
        let mut ks = KeySet::new();
        let key = Obj::new_int(7);
        let h = 7;
        match ks.probe(h, &key, &eq).unwrap() {
            Probe::Insert(idx) => ks.insert_at(idx, h, key.clone()),
            _ => unreachable!(),
        }
        let idx = match ks.probe(h, &key, &eq).unwrap() {
            Probe::Found(idx) => idx,
            _ => panic!("should be found"),
        };
        ks.delete_at(idx);
        assert_eq!(ks.active_count(), 0);
        match ks.probe(h, &key, &eq).unwrap() {
            Probe::Insert(idx2) => ks.insert_at(idx2, h, key),
            Probe::Found(_) => panic!("should have been deleted"),
        }
        assert_eq!(ks.active_count(), 1);
    }
}
