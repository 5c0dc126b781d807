//! Dict Module - `frozendict`/`dict`
//!
//! Thin wrapper over [`crate::hashtable::Dict`], the keyset-plus-values
//! engine shared with [`crate::types::set`].

use crate::exception::{singleton, ExcKind};
use crate::hash::{self, obj_eq_fn};
use crate::hashtable::Dict;
use crate::iterator::{DictIterMode, GenState};
use crate::object::{Obj, Payload, Tag};

pub fn new_frozendict(pairs: Vec<(Obj, Obj)>) -> Result<Obj, Obj> {
    build(Tag::FrozenDict, pairs)
}

pub fn new_dict(pairs: Vec<(Obj, Obj)>) -> Result<Obj, Obj> {
    build(Tag::Dict, pairs)
}

/// `frozendict_k(pairs)`: alias for [`new_frozendict`] — see
/// `sequence::tuple_n`'s module doc for the `_n`/`_k` naming note.
pub fn frozendict_k(pairs: Vec<(Obj, Obj)>) -> Result<Obj, Obj> {
    new_frozendict(pairs)
}

/// `dict_k(pairs)`: alias for [`new_dict`].
pub fn dict_k(pairs: Vec<(Obj, Obj)>) -> Result<Obj, Obj> {
    new_dict(pairs)
}

/// `dict_from(iterable)`: drains an iterable of `(key, value)` tuples
/// into a new `dict`.
pub fn dict_from(iterable: &Obj) -> Result<Obj, Obj> {
    let mut pairs = Vec::new();
    for item in crate::types::sequence::drain(iterable)? {
        let kv = item
            .with_payload(|p| p.as_sequence().map(|s| s.to_vec()))
            .ok_or_else(|| singleton(ExcKind::TypeError))?;
        if kv.len() != 2 {
            return Err(singleton(ExcKind::ValueError));
        }
        pairs.push((kv[0].clone(), kv[1].clone()));
    }
    new_dict(pairs)
}

fn build(tag: Tag, pairs: Vec<(Obj, Obj)>) -> Result<Obj, Obj> {
    let mut d = Dict::new();
    let eq = obj_eq_fn();
    for (k, v) in pairs {
        let h = hash::current_hash(&k)?;
        d.set(h, k, v, &eq)?;
    }
    Ok(Obj::new(tag, Payload::DictData(d)))
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
    x.with_payload(|p| p.as_dict().map(|d| d.len()))
        .ok_or_else(|| singleton(ExcKind::TypeError))
}

pub fn truthy(x: &Obj) -> Result<bool, Obj> {
    Ok(len(x)? != 0)
}

pub fn get(x: &Obj, key: &Obj) -> Result<Option<Obj>, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    let h = hash::current_hash(key)?;
    let eq = obj_eq_fn();
    x.with_payload(|p| {
        p.as_dict()
            .ok_or_else(|| singleton(ExcKind::TypeError))?
            .get(h, key, &eq)
    })
}

pub fn contains_key(x: &Obj, key: &Obj) -> Result<bool, Obj> {
    Ok(get(x, key)?.is_some())
}

pub fn get_item(x: &Obj, key: &Obj) -> Result<Obj, Obj> {
    get(x, key)?.ok_or_else(|| singleton(ExcKind::KeyError))
}

pub fn set_item(x: &Obj, key: Obj, value: Obj) -> Result<(), Obj> {
    require_mutable(x)?;
    let h = hash::current_hash(&key)?;
    let eq = obj_eq_fn();
    x.with_payload_mut(|p| p.as_dict_mut().unwrap().set(h, key, value, &eq))?;
    x.clear_cached_hash();
    Ok(())
}

pub fn setdefault(x: &Obj, key: Obj, default: Obj) -> Result<Obj, Obj> {
    require_mutable(x)?;
    let h = hash::current_hash(&key)?;
    let eq = obj_eq_fn();
    let result = x.with_payload_mut(|p| p.as_dict_mut().unwrap().get_or_insert(h, key, default, &eq))?;
    x.clear_cached_hash();
    Ok(result)
}

pub fn delete_key(x: &Obj, key: &Obj) -> Result<Obj, Obj> {
    require_mutable(x)?;
    let h = hash::current_hash(key)?;
    let eq = obj_eq_fn();
    let removed = x.with_payload_mut(|p| p.as_dict_mut().unwrap().delete_key(h, key, &eq))?;
    x.clear_cached_hash();
    removed.ok_or_else(|| singleton(ExcKind::KeyError))
}

pub fn pop_item(x: &Obj) -> Result<(Obj, Obj), Obj> {
    require_mutable(x)?;
    let result = x.with_payload_mut(|p| p.as_dict_mut().unwrap().pop_arbitrary());
    x.clear_cached_hash();
    result.ok_or_else(|| singleton(ExcKind::KeyError))
}

/// `popvalue(x, key, default)`: remove and return `key`'s value, or
/// `default` if absent — distinct from [`pop_item`] (`popitem` in the
/// mapping suite), which removes an arbitrary entry rather than one named
/// by key.
pub fn popvalue(x: &Obj, key: &Obj, default: &Obj) -> Result<Obj, Obj> {
    require_mutable(x)?;
    let h = hash::current_hash(key)?;
    let eq = obj_eq_fn();
    let removed = x.with_payload_mut(|p| p.as_dict_mut().unwrap().delete_key(h, key, &eq))?;
    x.clear_cached_hash();
    Ok(removed.unwrap_or_else(|| default.clone()))
}

pub fn update(x: &Obj, other: &Obj) -> Result<(), Obj> {
    require_mutable(x)?;
    let pairs: Vec<(Obj, Obj)> = other
        .with_payload(|p| p.as_dict().map(|d| d.iter().collect()))
        .ok_or_else(|| singleton(ExcKind::TypeError))?;
    let eq = obj_eq_fn();
    for (k, v) in pairs {
        let h = hash::current_hash(&k)?;
        x.with_payload_mut(|p| p.as_dict_mut().unwrap().set(h, k, v, &eq))?;
    }
    x.clear_cached_hash();
    Ok(())
}

pub fn keys_iter(x: Obj) -> Obj {
    Obj::new(
        Tag::Iterator,
        Payload::IterData(GenState::from_dict(x, DictIterMode::Keys)),
    )
}

pub fn values_iter(x: Obj) -> Obj {
    Obj::new(
        Tag::Iterator,
        Payload::IterData(GenState::from_dict(x, DictIterMode::Values)),
    )
}

pub fn items_iter(x: Obj) -> Obj {
    Obj::new(
        Tag::Iterator,
        Payload::IterData(GenState::from_dict(x, DictIterMode::Items)),
    )
}
