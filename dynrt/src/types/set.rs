//! Set Module - `frozenset`/`set`
//!
//! Thin wrapper over [`crate::hashtable::KeySet`]; every operation here
//! just supplies the hash/eq closures the generic engine needs and
//! otherwise delegates straight through.

use crate::exception::{singleton, ExcKind};
use crate::hash::{self, obj_eq_fn};
use crate::hashtable::{self, KeySet, Probe};
use crate::object::{Obj, Payload, Tag};

pub fn new_frozenset(items: Vec<Obj>) -> Result<Obj, Obj> {
    build(Tag::FrozenSet, items)
}

pub fn new_set(items: Vec<Obj>) -> Result<Obj, Obj> {
    build(Tag::Set, items)
}

/// `frozenset_n(items)`: alias for [`new_frozenset`] — see
/// `sequence::tuple_n`'s module doc for why this runtime collapses the
/// C-variadic-vs-Vec distinction between `_n` and the plain constructor.
pub fn frozenset_n(items: Vec<Obj>) -> Result<Obj, Obj> {
    new_frozenset(items)
}

/// `set_n(items)`: alias for [`new_set`].
pub fn set_n(items: Vec<Obj>) -> Result<Obj, Obj> {
    new_set(items)
}

/// `frozenset_from(iterable)`: drains any iterable into a new
/// `frozenset`.
pub fn frozenset_from(iterable: &Obj) -> Result<Obj, Obj> {
    new_frozenset(crate::types::sequence::drain(iterable)?)
}

/// `set_from(iterable)`.
pub fn set_from(iterable: &Obj) -> Result<Obj, Obj> {
    new_set(crate::types::sequence::drain(iterable)?)
}

fn build(tag: Tag, items: Vec<Obj>) -> Result<Obj, Obj> {
    let mut ks = KeySet::with_room_for(items.len());
    let eq = obj_eq_fn();
    for item in items {
        let h = hash::current_hash(&item)?;
        match hashtable::probe_with_room(&mut ks, h, &item, &eq)? {
            Probe::Found(_) => {}
            Probe::Insert(idx) => ks.insert_at(idx, h, item),
        }
    }
    Ok(Obj::new(tag, Payload::SetData(ks)))
}

fn require_mutable(x: &Obj) -> Result<(), Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    if !x.is_mutable() {
        return Err(singleton(ExcKind::TypeError));
    }
    Ok(())
}

pub fn len(x: &Obj) -> Result<usize, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    x.with_payload(|p| p.as_set().map(|s| s.active_count()))
        .ok_or_else(|| singleton(ExcKind::TypeError))
}

pub fn truthy(x: &Obj) -> Result<bool, Obj> {
    Ok(len(x)? != 0)
}

pub fn contains(x: &Obj, value: &Obj) -> Result<bool, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    let h = hash::current_hash(value)?;
    let eq = obj_eq_fn();
    x.with_payload(|p| {
        let ks = p.as_set().ok_or_else(|| singleton(ExcKind::TypeError))?;
        Ok(matches!(ks.probe(h, value, &eq)?, Probe::Found(_)))
    })
}

pub fn add(x: &Obj, value: Obj) -> Result<(), Obj> {
    require_mutable(x)?;
    let h = hash::current_hash(&value)?;
    let eq = obj_eq_fn();
    x.with_payload_mut(|p| {
        let ks = p.as_set_mut().unwrap();
        match hashtable::probe_with_room(ks, h, &value, &eq)? {
            Probe::Found(_) => {}
            Probe::Insert(idx) => ks.insert_at(idx, h, value),
        }
        Ok(())
    })
}

pub fn discard(x: &Obj, value: &Obj) -> Result<bool, Obj> {
    require_mutable(x)?;
    let h = hash::current_hash(value)?;
    let eq = obj_eq_fn();
    x.with_payload_mut(|p| {
        let ks = p.as_set_mut().unwrap();
        match ks.probe(h, value, &eq)? {
            Probe::Found(idx) => {
                ks.delete_at(idx);
                Ok(true)
            }
            Probe::Insert(_) => Ok(false),
        }
    })
}

pub fn remove(x: &Obj, value: &Obj) -> Result<(), Obj> {
    if discard(x, value)? {
        Ok(())
    } else {
        Err(singleton(ExcKind::KeyError))
    }
}

pub fn pop(x: &Obj) -> Result<Obj, Obj> {
    require_mutable(x)?;
    x.with_payload_mut(|p| {
        p.as_set_mut()
            .unwrap()
            .pop_arbitrary()
            .map(|(_, k)| k)
            .ok_or_else(|| singleton(ExcKind::KeyError))
    })
}

fn snapshot(x: &Obj) -> Result<Vec<(i64, Obj)>, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    x.with_payload(|p| {
        p.as_set()
            .map(|s| s.iter().map(|(h, k)| (h, k.clone())).collect())
            .ok_or_else(|| singleton(ExcKind::TypeError))
    })
}

pub fn union(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    let mut ks = KeySet::with_room_for(len(a)? + len(b)?);
    let eq = obj_eq_fn();
    for (h, k) in snapshot(a)?.into_iter().chain(snapshot(b)?) {
        match hashtable::probe_with_room(&mut ks, h, &k, &eq)? {
            Probe::Found(_) => {}
            Probe::Insert(idx) => ks.insert_at(idx, h, k),
        }
    }
    Ok(Obj::new(a.tag().immutable_pair(), Payload::SetData(ks)))
}

pub fn intersection(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    let mut ks = KeySet::with_room_for(len(a)?.min(len(b)?));
    let eq = obj_eq_fn();
    for (h, k) in snapshot(a)? {
        if contains(b, &k)? {
            match hashtable::probe_with_room(&mut ks, h, &k, &eq)? {
                Probe::Found(_) => {}
                Probe::Insert(idx) => ks.insert_at(idx, h, k),
            }
        }
    }
    Ok(Obj::new(a.tag().immutable_pair(), Payload::SetData(ks)))
}

pub fn difference(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    let mut ks = KeySet::with_room_for(len(a)?);
    let eq = obj_eq_fn();
    for (h, k) in snapshot(a)? {
        if !contains(b, &k)? {
            match hashtable::probe_with_room(&mut ks, h, &k, &eq)? {
                Probe::Found(_) => {}
                Probe::Insert(idx) => ks.insert_at(idx, h, k),
            }
        }
    }
    Ok(Obj::new(a.tag().immutable_pair(), Payload::SetData(ks)))
}

pub fn symmetric_difference(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    let left = difference(a, b)?;
    let right = difference(b, a)?;
    union(&left, &right)
}

pub fn is_subset(a: &Obj, b: &Obj) -> Result<bool, Obj> {
    for (_, k) in snapshot(a)? {
        if !contains(b, &k)? {
            return Ok(false);
        }
    }
    Ok(true)
}

pub fn is_superset(a: &Obj, b: &Obj) -> Result<bool, Obj> {
    is_subset(b, a)
}

pub fn is_disjoint(a: &Obj, b: &Obj) -> Result<bool, Obj> {
    for (_, k) in snapshot(a)? {
        if contains(b, &k)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// `union_n(sets)`: variadic union, folding left to right. Empty input is
/// a `SystemError` — there is no ambient "the empty set" tag to default
/// to without a caller-supplied mutability hint.
pub fn union_n(items: &[Obj]) -> Result<Obj, Obj> {
    let mut it = items.iter();
    let first = it.next().ok_or_else(|| singleton(ExcKind::SystemError))?;
    let mut acc = new_frozenset(snapshot(first)?.into_iter().map(|(_, k)| k).collect())?;
    for s in it {
        acc = union(&acc, s)?;
    }
    Ok(acc)
}

/// `intersection_n(sets)`: variadic intersection, folding left to right.
pub fn intersection_n(items: &[Obj]) -> Result<Obj, Obj> {
    let mut it = items.iter();
    let first = it.next().ok_or_else(|| singleton(ExcKind::SystemError))?;
    let mut acc = new_frozenset(snapshot(first)?.into_iter().map(|(_, k)| k).collect())?;
    for s in it {
        acc = intersection(&acc, s)?;
    }
    Ok(acc)
}

/// `difference_n(sets)`: `sets[0] - sets[1] - sets[2] - ...`.
pub fn difference_n(items: &[Obj]) -> Result<Obj, Obj> {
    let mut it = items.iter();
    let first = it.next().ok_or_else(|| singleton(ExcKind::SystemError))?;
    let mut acc = new_frozenset(snapshot(first)?.into_iter().map(|(_, k)| k).collect())?;
    for s in it {
        acc = difference(&acc, s)?;
    }
    Ok(acc)
}

/// `update(x, other)`: in-place union. A clean-insert fast path (when `x`
/// starts empty and tombstone-free) would only save allocator traffic,
/// not change observable behavior, so this always probes rather than
/// special-casing that case.
pub fn update(x: &Obj, other: &Obj) -> Result<(), Obj> {
    require_mutable(x)?;
    for (h, k) in snapshot(other)? {
        x.with_payload_mut(|p| {
            let ks = p.as_set_mut().unwrap();
            let eq = obj_eq_fn();
            match hashtable::probe_with_room(ks, h, &k, &eq)? {
                Probe::Found(_) => {}
                Probe::Insert(idx) => ks.insert_at(idx, h, k),
            }
            Ok(())
        })?;
    }
    x.clear_cached_hash();
    Ok(())
}

/// `intersection_update(x, other)`: delete from `x` every key not also in
/// `other`.
pub fn intersection_update(x: &Obj, other: &Obj) -> Result<(), Obj> {
    require_mutable(x)?;
    let eq = obj_eq_fn();
    for (h, k) in snapshot(x)? {
        if !contains(other, &k)? {
            x.with_payload_mut(|p| {
                let ks = p.as_set_mut().unwrap();
                if let Probe::Found(idx) = ks.probe(h, &k, &eq)? {
                    ks.delete_at(idx);
                }
                Ok::<(), Obj>(())
            })?;
        }
    }
    x.clear_cached_hash();
    Ok(())
}

/// `difference_update(x, other)`: delete from `x` every key also in
/// `other`.
pub fn difference_update(x: &Obj, other: &Obj) -> Result<(), Obj> {
    require_mutable(x)?;
    for (_, k) in snapshot(other)? {
        discard(x, &k)?;
    }
    x.clear_cached_hash();
    Ok(())
}

/// `symmetric_difference_update(x, other)`: for each key in `other`,
/// remove it from `x` if present, else add it.
pub fn symmetric_difference_update(x: &Obj, other: &Obj) -> Result<(), Obj> {
    require_mutable(x)?;
    for (_, k) in snapshot(other)? {
        if !discard(x, &k)? {
            add(x, k)?;
        }
    }
    x.clear_cached_hash();
    Ok(())
}

/// `push_unique(x, value)`: add `value` to `x`, but raise `ValueError`
/// (rather than silently no-op like [`add`]) if it is already present.
/// This is the set suite's stricter sibling of the generic container
/// suite's `push`.
pub fn push_unique(x: &Obj, value: Obj) -> Result<(), Obj> {
    if contains(x, &value)? {
        return Err(singleton(ExcKind::ValueError));
    }
    add(x, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_dedups() {
        let s = new_frozenset(vec![Obj::new_int(1), Obj::new_int(1), Obj::new_int(2)]).unwrap();
        assert_eq!(len(&s).unwrap(), 2);
    }

    #[test]
    fn test_union_intersection_difference() {
        let a = new_frozenset(vec![Obj::new_int(1), Obj::new_int(2)]).unwrap();
        let b = new_frozenset(vec![Obj::new_int(2), Obj::new_int(3)]).unwrap();

        let u = union(&a, &b).unwrap();
        assert_eq!(len(&u).unwrap(), 3);

        let i = intersection(&a, &b).unwrap();
        assert_eq!(len(&i).unwrap(), 1);
        assert!(contains(&i, &Obj::new_int(2)).unwrap());

        let d = difference(&a, &b).unwrap();
        assert_eq!(len(&d).unwrap(), 1);
        assert!(contains(&d, &Obj::new_int(1)).unwrap());
    }

    #[test]
    fn test_add_discard_on_mutable_set() {
        let s = new_set(vec![]).unwrap();
        add(&s, Obj::new_int(5)).unwrap();
        assert!(contains(&s, &Obj::new_int(5)).unwrap());
        assert!(discard(&s, &Obj::new_int(5)).unwrap());
        assert!(!discard(&s, &Obj::new_int(5)).unwrap());
    }

    #[test]
    fn test_add_on_frozenset_errors() {
        let s = new_frozenset(vec![]).unwrap();
        assert!(add(&s, Obj::new_int(1)).is_err());
    }

    #[test]
    fn test_subset_superset() {
        let small = new_frozenset(vec![Obj::new_int(1)]).unwrap();
        let big = new_frozenset(vec![Obj::new_int(1), Obj::new_int(2)]).unwrap();
        assert!(is_subset(&small, &big).unwrap());
        assert!(is_superset(&big, &small).unwrap());
        assert!(!is_subset(&big, &small).unwrap());
    }

    #[test]
    fn test_union_n_and_intersection_n_fold_across_three_sets() {
        let a = new_frozenset(vec![Obj::new_int(1), Obj::new_int(2)]).unwrap();
        let b = new_frozenset(vec![Obj::new_int(2), Obj::new_int(3)]).unwrap();
        let c = new_frozenset(vec![Obj::new_int(2), Obj::new_int(4)]).unwrap();
        let u = union_n(&[a.clone(), b.clone(), c.clone()]).unwrap();
        assert_eq!(len(&u).unwrap(), 4);
        let i = intersection_n(&[a, b, c]).unwrap();
        assert_eq!(len(&i).unwrap(), 1);
        assert!(contains(&i, &Obj::new_int(2)).unwrap());
    }

    #[test]
    fn test_in_place_updates_mutate_the_target() {
        let s = new_set(vec![Obj::new_int(1), Obj::new_int(2)]).unwrap();
        let other = new_frozenset(vec![Obj::new_int(2), Obj::new_int(3)]).unwrap();

        update(&s, &other).unwrap();
        assert_eq!(len(&s).unwrap(), 3);

        let s2 = new_set(vec![Obj::new_int(1), Obj::new_int(2)]).unwrap();
        intersection_update(&s2, &other).unwrap();
        assert_eq!(len(&s2).unwrap(), 1);
        assert!(contains(&s2, &Obj::new_int(2)).unwrap());

        let s3 = new_set(vec![Obj::new_int(1), Obj::new_int(2)]).unwrap();
        difference_update(&s3, &other).unwrap();
        assert_eq!(len(&s3).unwrap(), 1);
        assert!(contains(&s3, &Obj::new_int(1)).unwrap());

        let s4 = new_set(vec![Obj::new_int(1), Obj::new_int(2)]).unwrap();
        symmetric_difference_update(&s4, &other).unwrap();
        assert_eq!(len(&s4).unwrap(), 2);
        assert!(contains(&s4, &Obj::new_int(1)).unwrap());
        assert!(contains(&s4, &Obj::new_int(3)).unwrap());
    }

    #[test]
    fn test_push_unique_rejects_a_duplicate() {
        let s = new_set(vec![Obj::new_int(1)]).unwrap();
        assert!(push_unique(&s, Obj::new_int(2)).is_ok());
        assert!(push_unique(&s, Obj::new_int(1)).is_err());
    }

    #[test]
    fn test_set_from_drains_a_list_into_a_set() {
        let list = crate::types::sequence::new_list(vec![
            Obj::new_int(1),
            Obj::new_int(1),
            Obj::new_int(2),
        ]);
        let s = set_from(&list).unwrap();
        assert_eq!(len(&s).unwrap(), 2);
    }
}
