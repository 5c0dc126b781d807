//! Dispatch Module - the per-tag operation table, as a closed match
//!
//! Every generic, cross-type entry point a host calls lives here: `bool`,
//! the six comparisons, `len`, `contains`, the shared container suite
//! (`push`/`clear`/`pop`), the mapping/sequence item accessors, the
//! iteration family, and the C-value conversions. Each function matches on
//! `x.tag()` and routes to the owning type module — the same "closed
//! match over an owning module" shape `object::Tag` already documents, just
//! one level up. There is deliberately no vtable or trait-object table: a
//! `match` the compiler can check for exhaustiveness *is* the dispatch
//! table, and unsupported combinations fall into a default arm that
//! returns `MethodError`/`TypeError` — every slot is populated, unsupported
//! ones just point at a generic stub.
//!
//! # Mini-iterators
//!
//! A C-style object model typically keeps two parallel iterator
//! representations — a boxed generator and a scratchword-based
//! "mini-iterator" fast path — to avoid allocating a generator for a plain
//! sequence walk. [`crate::iterator::GenState`] already gets that for free
//! from Rust's enum representation (a `Sequence` variant is exactly as
//! cheap as a scratchword would have been, no heap allocation, no vtable),
//! so `mini_iter*` below is a thin, intentionally trivial alias for the
//! same `iter`/`next`/`iter_lenhint` entry points rather than a second
//! implementation.

use crate::exception::{singleton, ExcKind};
use crate::hash;
use crate::iterator::{DictIterMode, GenState};
use crate::lifecycle;
use crate::object::{Obj, Payload, Tag};
use crate::types::{boolean, bytes, dict, integer, sequence, set, strtype};

/// "Use the natural end based on step sign" sentinel for slice arguments.
pub const SLICE_DEFAULT: i64 = i64::MIN;
/// "Equal to the sequence's length" sentinel for slice arguments.
pub const SLICE_USELEN: i64 = i64::MAX;

pub use crate::exception::{is_exception, is_exception_of, is_exception_of_any};

thread_local! {
    static TYPE_SINGLETONS: [Obj; 20] = {
        const TAGS: [Tag; 20] = [
            Tag::Nil, Tag::Bool, Tag::Int, Tag::IntStore, Tag::Float, Tag::FloatStore,
            Tag::Bytes, Tag::ByteArray, Tag::Str, Tag::ChrArray, Tag::Tuple, Tag::List,
            Tag::FrozenSet, Tag::Set, Tag::FrozenDict, Tag::Dict, Tag::Iterator,
            Tag::Exception, Tag::Type, Tag::Invalidated,
        ];
        std::array::from_fn(|i| Obj::new_immortal(Tag::Type, Payload::TypeRef(TAGS[i])))
    };
}

fn type_index(tag: Tag) -> usize {
    match tag {
        Tag::Nil => 0,
        Tag::Bool => 1,
        Tag::Int => 2,
        Tag::IntStore => 3,
        Tag::Float => 4,
        Tag::FloatStore => 5,
        Tag::Bytes => 6,
        Tag::ByteArray => 7,
        Tag::Str => 8,
        Tag::ChrArray => 9,
        Tag::Tuple => 10,
        Tag::List => 11,
        Tag::FrozenSet => 12,
        Tag::Set => 13,
        Tag::FrozenDict => 14,
        Tag::Dict => 15,
        Tag::Iterator => 16,
        Tag::Exception => 17,
        Tag::Type => 18,
        Tag::Invalidated | Tag::InvalidatedMutable => 19,
    }
}

/// `type(x)`: an immortal handle naming `x`'s exact tag (mutable and
/// immutable members of a pair are different types, matching `tag & 1`
/// being part of a type's identity).
pub fn type_of(x: &Obj) -> Obj {
    TYPE_SINGLETONS.with(|t| t[type_index(x.tag())].clone())
}

/// `bool(x)`: per-type truthiness, spelled out per family rather than
/// left to one generic default — empty containers, zero numbers, and nil
/// are falsy; everything else is truthy.
pub fn bool_of(x: &Obj) -> Result<bool, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    match x.tag() {
        Tag::Nil => Ok(false),
        Tag::Bool => Ok(x.with_payload(|p| p.as_bool().unwrap())),
        Tag::Int | Tag::IntStore => integer::truthy(x),
        Tag::Float | Tag::FloatStore => crate::types::floating::truthy(x),
        Tag::Bytes | Tag::ByteArray => bytes::truthy(x),
        Tag::Str | Tag::ChrArray => strtype::truthy(x),
        Tag::Tuple | Tag::List => sequence::truthy(x),
        Tag::FrozenSet | Tag::Set => set::truthy(x),
        Tag::FrozenDict | Tag::Dict => dict::truthy(x),
        Tag::Iterator => Ok(!x.with_payload(|p| matches!(p, Payload::IterData(g) if g.is_exhausted()))),
        Tag::Exception | Tag::Type => Ok(true),
        Tag::Invalidated | Tag::InvalidatedMutable => unreachable!("handled above"),
    }
}

/// `not(x)`.
pub fn not_(x: &Obj) -> Result<Obj, Obj> {
    Ok(boolean::from_bool(!bool_of(x)?))
}

/// `or_n(items)`: short-circuits on the first truthy value (Python `or`
/// chaining); an empty slice yields `nil`. An exception passed in as one
/// of the items is returned immediately, without evaluating truthiness of
/// later items — propagation takes priority over short-circuit logic.
pub fn or_n(items: &[Obj]) -> Result<Obj, Obj> {
    for item in items {
        if is_exception(item) {
            return Ok(item.clone());
        }
        if bool_of(item)? {
            return Ok(item.clone());
        }
    }
    Ok(items.last().cloned().unwrap_or_else(crate::types::nil))
}

/// `and_n(items)`: short-circuits on the first falsy value.
pub fn and_n(items: &[Obj]) -> Result<Obj, Obj> {
    for item in items {
        if is_exception(item) {
            return Ok(item.clone());
        }
        if !bool_of(item)? {
            return Ok(item.clone());
        }
    }
    Ok(items.last().cloned().unwrap_or_else(crate::types::nil))
}

/// `any(iterable)`: true as soon as one element is truthy.
pub fn any(iterable: &Obj) -> Result<bool, Obj> {
    let it = iter(iterable)?;
    loop {
        match next(&it) {
            Ok(v) => {
                if bool_of(&v)? {
                    return Ok(true);
                }
            }
            Err(e) if is_exception_of(&e, ExcKind::StopIteration) => return Ok(false),
            Err(e) => return Err(e),
        }
    }
}

/// `all(iterable)`: false as soon as one element is falsy.
pub fn all(iterable: &Obj) -> Result<bool, Obj> {
    let it = iter(iterable)?;
    loop {
        match next(&it) {
            Ok(v) => {
                if !bool_of(&v)? {
                    return Ok(false);
                }
            }
            Err(e) if is_exception_of(&e, ExcKind::StopIteration) => return Ok(true),
            Err(e) => return Err(e),
        }
    }
}

pub fn eq(a: &Obj, b: &Obj) -> Result<bool, Obj> {
    hash::eq(a, b)
}

pub fn ne(a: &Obj, b: &Obj) -> Result<bool, Obj> {
    Ok(!hash::eq(a, b)?)
}

pub fn lt(a: &Obj, b: &Obj) -> Result<bool, Obj> {
    Ok(hash::compare(a, b)? == std::cmp::Ordering::Less)
}

pub fn le(a: &Obj, b: &Obj) -> Result<bool, Obj> {
    Ok(hash::compare(a, b)? != std::cmp::Ordering::Greater)
}

pub fn gt(a: &Obj, b: &Obj) -> Result<bool, Obj> {
    Ok(hash::compare(a, b)? == std::cmp::Ordering::Greater)
}

pub fn ge(a: &Obj, b: &Obj) -> Result<bool, Obj> {
    Ok(hash::compare(a, b)? != std::cmp::Ordering::Less)
}

/// `len(x)`.
pub fn len(x: &Obj) -> Result<usize, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    match x.tag() {
        Tag::Bytes | Tag::ByteArray => bytes::len(x),
        Tag::Str | Tag::ChrArray => strtype::len(x),
        Tag::Tuple | Tag::List => sequence::len(x),
        Tag::FrozenSet | Tag::Set => set::len(x),
        Tag::FrozenDict | Tag::Dict => dict::len(x),
        _ => Err(singleton(ExcKind::MethodError)),
    }
}

/// `contains(x, value)` / `value in x`.
pub fn contains(x: &Obj, value: &Obj) -> Result<bool, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    match x.tag() {
        Tag::Bytes | Tag::ByteArray => bytes::contains(x, value),
        Tag::Str | Tag::ChrArray => strtype::contains(x, value),
        Tag::Tuple | Tag::List => sequence::contains(x, value),
        Tag::FrozenSet | Tag::Set => set::contains(x, value),
        Tag::FrozenDict | Tag::Dict => dict::contains_key(x, value),
        _ => Err(singleton(ExcKind::MethodError)),
    }
}

/// `push(x, value)`: the one-argument-family "add an element" operation
/// shared by every mutable container (`append` for sequences, `add` for
/// sets, single-byte/char append for the buffer types). Mappings need a
/// key and a value, so they have no generic `push` and return
/// `MethodError` instead — every slot is populated, but unsupported
/// operations just point at a generic stub.
pub fn push(x: &Obj, value: Obj) -> Result<(), Obj> {
    match x.tag() {
        Tag::List => sequence::append(x, value),
        Tag::Set => set::add(x, value),
        Tag::ByteArray => {
            let b = value
                .with_payload(|p| p.as_int())
                .ok_or_else(|| singleton(ExcKind::TypeError))?;
            if !(0..=255).contains(&b) {
                return Err(singleton(ExcKind::ValueError));
            }
            bytes::push(x, b as u8)
        }
        Tag::ChrArray => {
            let s = value
                .with_payload(|p| p.as_text().map(|s| s.to_string()))
                .ok_or_else(|| singleton(ExcKind::TypeError))?;
            strtype::push_str(x, &s)
        }
        _ => Err(singleton(ExcKind::MethodError)),
    }
}

/// `clear(x)`: empty a mutable container in place.
pub fn clear(x: &Obj) -> Result<(), Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    if !x.is_mutable() {
        return Err(singleton(ExcKind::TypeError));
    }
    x.with_payload_mut(|p| {
        match p {
            Payload::Sequence(v) => v.clear(),
            Payload::SetData(_) => *p = Payload::SetData(crate::hashtable::KeySet::new()),
            Payload::DictData(_) => *p = Payload::DictData(crate::hashtable::Dict::new()),
            Payload::Bytes(v) => v.clear(),
            Payload::Text(s) => s.clear(),
            _ => return Err(singleton(ExcKind::MethodError)),
        }
        Ok(())
    })?;
    x.clear_cached_hash();
    Ok(())
}

/// `pop(x)`: remove and return one element. For sequences this is the
/// last element; for sets, an arbitrary one; for mappings, an arbitrary
/// `(key, value)` pair as a tuple (the generic container suite has no key
/// to target, unlike `popvalue`/`popitem` in the mapping suite).
pub fn pop(x: &Obj) -> Result<Obj, Obj> {
    match x.tag() {
        Tag::List => sequence::pop(x, -1),
        Tag::Set => set::pop(x),
        Tag::Dict => {
            let (k, v) = dict::pop_item(x)?;
            Ok(Obj::new(Tag::Tuple, Payload::Sequence(vec![k, v])))
        }
        Tag::ByteArray => {
            let last = bytes::get_byte(x, -1)?;
            x.with_payload_mut(|p| p.as_bytes_mut().unwrap().pop());
            x.clear_cached_hash();
            Ok(Obj::new_int(last as i64))
        }
        Tag::ChrArray => {
            let c = strtype::char_at(x, -1)?;
            x.with_payload_mut(|p| {
                p.as_text_mut().unwrap().pop();
            });
            x.clear_cached_hash();
            Ok(c)
        }
        _ => Err(singleton(ExcKind::MethodError)),
    }
}

fn as_index(x: &Obj) -> Result<i64, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    x.with_payload(|p| p.as_int())
        .ok_or_else(|| singleton(ExcKind::TypeError))
}

/// `getitem(x, key)`: sequence index or mapping key, whichever `x`'s tag
/// supports.
pub fn getitem(x: &Obj, key: &Obj) -> Result<Obj, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    match x.tag() {
        Tag::Tuple | Tag::List => sequence::get_item(x, as_index(key)?),
        Tag::Bytes | Tag::ByteArray => {
            Ok(Obj::new_int(bytes::get_byte(x, as_index(key)?)? as i64))
        }
        Tag::Str | Tag::ChrArray => strtype::char_at(x, as_index(key)?),
        Tag::FrozenDict | Tag::Dict => dict::get_item(x, key),
        _ => Err(singleton(ExcKind::MethodError)),
    }
}

/// `setitem(x, key, value)`.
pub fn setitem(x: &Obj, key: &Obj, value: Obj) -> Result<(), Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    match x.tag() {
        Tag::List => sequence::set_item(x, as_index(key)?, value),
        Tag::FrozenDict | Tag::Dict => dict::set_item(x, key.clone(), value),
        _ => Err(singleton(ExcKind::MethodError)),
    }
}

/// `delitem(x, key)`.
pub fn delitem(x: &Obj, key: &Obj) -> Result<(), Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    match x.tag() {
        Tag::List => sequence::pop(x, as_index(key)?).map(|_| ()),
        Tag::FrozenDict | Tag::Dict => dict::delete_key(x, key).map(|_| ()),
        _ => Err(singleton(ExcKind::MethodError)),
    }
}

/// `getdefault(x, key, default)`: `getitem`, but a missing-key/out-of-range
/// lookup returns `default` instead of raising.
pub fn getdefault(x: &Obj, key: &Obj, default: &Obj) -> Result<Obj, Obj> {
    match getitem(x, key) {
        Ok(v) => Ok(v),
        Err(e) if is_exception_of(&e, ExcKind::KeyError) || is_exception_of(&e, ExcKind::IndexError) => {
            Ok(default.clone())
        }
        Err(e) => Err(e),
    }
}

/// `iter(x)`: build an iterator object over `x`. An iterator handed to
/// `iter` again returns itself, matching Python's `iter(iter(x)) is
/// iter(x)`.
pub fn iter(x: &Obj) -> Result<Obj, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    let state = match x.tag() {
        Tag::Iterator => return Ok(x.clone()),
        Tag::Tuple | Tag::List => GenState::from_sequence_snapshot(x.clone()),
        Tag::Bytes | Tag::ByteArray => GenState::from_bytes_snapshot(x),
        Tag::Str | Tag::ChrArray => GenState::from_text_snapshot(x),
        Tag::FrozenSet | Tag::Set => GenState::from_set(x.clone()),
        // Iterating a mapping walks its keys, matching the source
        // convention this runtime's mapping contract is drawn from.
        Tag::FrozenDict | Tag::Dict => GenState::from_dict(x.clone(), DictIterMode::Keys),
        _ => return Err(singleton(ExcKind::MethodError)),
    };
    Ok(Obj::new(Tag::Iterator, Payload::IterData(state)))
}

/// `iter_reversed(x)`: like `iter`, but walks back to front. Only defined
/// for the sequence family — sets and mappings have no inherent order to
/// reverse.
pub fn iter_reversed(x: &Obj) -> Result<Obj, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    let state = match x.tag() {
        Tag::Tuple | Tag::List => {
            let mut items = x.with_payload(|p| p.as_sequence().unwrap().to_vec());
            items.reverse();
            GenState::from_sequence_snapshot(Obj::new(x.tag(), Payload::Sequence(items)))
        }
        Tag::Bytes | Tag::ByteArray => {
            let mut data = x.with_payload(|p| p.as_bytes().unwrap().to_vec());
            data.reverse();
            GenState::from_bytes_snapshot(&Obj::new(Tag::Bytes, Payload::Bytes(data)))
        }
        Tag::Str | Tag::ChrArray => {
            let reversed: String = x.with_payload(|p| p.as_text().unwrap().chars().rev().collect());
            GenState::from_text_snapshot(&Obj::new(Tag::Str, Payload::Text(reversed)))
        }
        _ => return Err(singleton(ExcKind::MethodError)),
    };
    Ok(Obj::new(Tag::Iterator, Payload::IterData(state)))
}

/// `next(it)`.
pub fn next(it: &Obj) -> Result<Obj, Obj> {
    if it.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    if it.tag() != Tag::Iterator {
        return Err(singleton(ExcKind::MethodError));
    }
    it.with_payload_mut(|p| p.as_iter_mut().unwrap().next())
}

/// `send(it, value)`: resumes the generator with `value`. This runtime's
/// adapter generators are plain `FnMut() -> Result<Option<Obj>, Obj>`
/// closures with no input slot, so `send` collapses to `next` — there is
/// nowhere to deliver `value` to. A host that needs true two-way
/// generators builds its own `Adapter` closure that captures a `Cell` to
/// receive it before calling `next` itself, rather than going through
/// this entry point.
pub fn send(it: &Obj, _value: &Obj) -> Result<Obj, Obj> {
    next(it)
}

/// `throw(it, exc)`: forces the generator to close and hands back `exc`.
pub fn throw(it: &Obj, exc: Obj) -> Result<Obj, Obj> {
    close(it)?;
    Err(exc)
}

/// `close(it)`: idempotent.
pub fn close(it: &Obj) -> Result<(), Obj> {
    lifecycle::freeze(it)
}

fn remaining_indexed(active_indices: impl Iterator<Item = usize>, cursor: usize) -> usize {
    active_indices.filter(|&i| i >= cursor).count()
}

/// `iter_lenhint(it)`: best-effort remaining-count estimate. Exact for
/// every snapshot-backed representation; `0` for an `Adapter`, which has
/// no way to know its remaining length without pulling from it.
pub fn iter_lenhint(it: &Obj) -> Result<usize, Obj> {
    if it.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    if it.tag() != Tag::Iterator {
        return Err(singleton(ExcKind::MethodError));
    }
    it.with_payload(|p| {
        Ok(match p {
            Payload::IterData(GenState::Sequence { index, len, .. }) => len.saturating_sub(*index),
            Payload::IterData(GenState::BytesSnapshot { data, index }) => data.len().saturating_sub(*index),
            Payload::IterData(GenState::TextSnapshot { chars, index }) => chars.len().saturating_sub(*index),
            Payload::IterData(GenState::SetKeys { owner, cursor }) => owner.with_payload(|op| {
                op.as_set()
                    .map(|ks| remaining_indexed(ks.iter_indices(), *cursor))
                    .unwrap_or(0)
            }),
            Payload::IterData(GenState::DictEntries { owner, cursor, .. }) => owner.with_payload(|op| {
                op.as_dict()
                    .map(|d| remaining_indexed(d.keys().iter_indices(), *cursor))
                    .unwrap_or(0)
            }),
            Payload::IterData(GenState::Adapter(_)) => 0,
            Payload::IterData(GenState::Exhausted) => 0,
            _ => 0,
        })
    })
}

/// `mini_iter(x)`: alias for [`iter`] — see module docs.
pub fn mini_iter(x: &Obj) -> Result<Obj, Obj> {
    iter(x)
}

/// `mini_iter_next(it)`: alias for [`next`].
pub fn mini_iter_next(it: &Obj) -> Result<Obj, Obj> {
    next(it)
}

/// `mini_iter_lenhint(it)`: alias for [`iter_lenhint`].
pub fn mini_iter_lenhint(it: &Obj) -> Result<usize, Obj> {
    iter_lenhint(it)
}

/// `mini_iter_reversed(x)`: alias for [`iter_reversed`].
pub fn mini_iter_reversed(x: &Obj) -> Result<Obj, Obj> {
    iter_reversed(x)
}

/// What kind of storage an iterator is walking, as reported by
/// [`iter_state_view`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IterStateKind {
    Sequence,
    Bytes,
    Text,
    SetKeys,
    DictEntries,
    Adapter,
    Exhausted,
}

/// A snapshot of a generator's internal cursor: what it walks, how far in
/// it is, and its best-effort remaining count. This runtime has no raw
/// buffer to hand back a pointer into — `GenState` owns its storage behind
/// an enum, not a C-style `{buffer, size}` pair — so `iter_state_view`
/// returns an owned read-only projection of the same information instead
/// of a borrowed pointer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct IterStateView {
    pub kind: IterStateKind,
    pub position: usize,
    pub lenhint: usize,
}

/// `iter_state_view(it)`.
pub fn iter_state_view(it: &Obj) -> Result<IterStateView, Obj> {
    if it.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    if it.tag() != Tag::Iterator {
        return Err(singleton(ExcKind::MethodError));
    }
    let lenhint = iter_lenhint(it)?;
    it.with_payload(|p| {
        let (kind, position) = match p {
            Payload::IterData(GenState::Sequence { index, .. }) => (IterStateKind::Sequence, *index),
            Payload::IterData(GenState::BytesSnapshot { index, .. }) => (IterStateKind::Bytes, *index),
            Payload::IterData(GenState::TextSnapshot { index, .. }) => (IterStateKind::Text, *index),
            Payload::IterData(GenState::SetKeys { cursor, .. }) => (IterStateKind::SetKeys, *cursor),
            Payload::IterData(GenState::DictEntries { cursor, .. }) => (IterStateKind::DictEntries, *cursor),
            Payload::IterData(GenState::Adapter(_)) => (IterStateKind::Adapter, 0),
            Payload::IterData(GenState::Exhausted) => (IterStateKind::Exhausted, 0),
            _ => (IterStateKind::Exhausted, 0),
        };
        Ok(IterStateView { kind, position, lenhint })
    })
}

// ---------------------------------------------------------------------
// Sequence suite: getindex/getslice/setindex/setslice/delindex/delslice/
// append/extend/irepeat/insert/popindex/remove/reverse/sort/find/index/
// count. `tuple`/`list` only — `getitem`/`setitem`/`delitem` above remain
// the cross-family container entry points; these are the sequence-
// specific names alongside them.
// ---------------------------------------------------------------------

fn require_sequence(x: &Obj) -> Result<(), Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    match x.tag() {
        Tag::Tuple | Tag::List => Ok(()),
        _ => Err(singleton(ExcKind::MethodError)),
    }
}

/// `getindex(x, i)`: sequence-only synonym for [`getitem`].
pub fn getindex(x: &Obj, index: i64) -> Result<Obj, Obj> {
    require_sequence(x)?;
    sequence::get_item(x, index)
}

/// `getslice(x, start, stop, step)`.
pub fn getslice(x: &Obj, start: i64, stop: i64, step: i64) -> Result<Obj, Obj> {
    require_sequence(x)?;
    sequence::get_slice(x, start, stop, step)
}

/// `setindex(x, i, value)`: sequence-only synonym for [`setitem`].
pub fn setindex(x: &Obj, index: i64, value: Obj) -> Result<(), Obj> {
    require_sequence(x)?;
    sequence::set_item(x, index, value)
}

/// `setslice(x, start, stop, step, values)`.
pub fn setslice(x: &Obj, start: i64, stop: i64, step: i64, values: Vec<Obj>) -> Result<(), Obj> {
    require_sequence(x)?;
    sequence::set_slice(x, start, stop, step, values)
}

/// `delindex(x, i)`: sequence-only synonym for [`delitem`].
pub fn delindex(x: &Obj, index: i64) -> Result<(), Obj> {
    require_sequence(x)?;
    sequence::pop(x, index).map(|_| ())
}

/// `delslice(x, start, stop, step)`.
pub fn delslice(x: &Obj, start: i64, stop: i64, step: i64) -> Result<(), Obj> {
    require_sequence(x)?;
    sequence::del_slice(x, start, stop, step)
}

/// `append(x, value)`: sequence-only synonym for [`push`].
pub fn append(x: &Obj, value: Obj) -> Result<(), Obj> {
    require_sequence(x)?;
    sequence::append(x, value)
}

/// `extend(x, values)`.
pub fn extend(x: &Obj, values: Vec<Obj>) -> Result<(), Obj> {
    require_sequence(x)?;
    sequence::extend(x, values)
}

/// `irepeat(x, n)`: in-place `x *= n`.
pub fn irepeat(x: &Obj, n: i64) -> Result<(), Obj> {
    require_sequence(x)?;
    sequence::irepeat(x, n)
}

/// `insert(x, i, value)`.
pub fn insert(x: &Obj, index: i64, value: Obj) -> Result<(), Obj> {
    require_sequence(x)?;
    sequence::insert(x, index, value)
}

/// `popindex(x, i)`: remove and return the element at `i` (as opposed to
/// the generic container suite's `pop`, which always targets the last
/// element).
pub fn popindex(x: &Obj, index: i64) -> Result<Obj, Obj> {
    require_sequence(x)?;
    sequence::pop(x, index)
}

/// `remove(x, value)`: remove the first element equal to `value`,
/// raising `ValueError` if absent (sequences) or `KeyError` (sets).
pub fn remove(x: &Obj, value: &Obj) -> Result<(), Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    match x.tag() {
        Tag::List => sequence::remove(x, value),
        Tag::Set => set::remove(x, value),
        _ => Err(singleton(ExcKind::MethodError)),
    }
}

/// `reverse(x)`: in-place.
pub fn reverse(x: &Obj) -> Result<(), Obj> {
    require_sequence(x)?;
    sequence::reverse(x)
}

/// `sort(x)`: in-place.
pub fn sort(x: &Obj) -> Result<(), Obj> {
    require_sequence(x)?;
    sequence::sort(x)
}

/// `find(x, value)`: first matching index, or `-1` if absent.
pub fn find(x: &Obj, value: &Obj) -> Result<i64, Obj> {
    require_sequence(x)?;
    sequence::find(x, value)
}

/// `index(x, value)`: like [`find`], but raises `ValueError` if absent.
pub fn index(x: &Obj, value: &Obj) -> Result<usize, Obj> {
    require_sequence(x)?;
    sequence::index_of(x, value)
}

/// `count(x, value)`: number of elements equal to `value`.
pub fn count(x: &Obj, value: &Obj) -> Result<usize, Obj> {
    require_sequence(x)?;
    sequence::count(x, value)
}

// ---------------------------------------------------------------------
// Set suite: isdisjoint/issubset/issuperset/union_n/intersection_n/
// difference_n/symmetric_difference, their in-place updates,
// push_unique/discard/add.
// ---------------------------------------------------------------------

fn require_set(x: &Obj) -> Result<(), Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    match x.tag() {
        Tag::FrozenSet | Tag::Set => Ok(()),
        _ => Err(singleton(ExcKind::MethodError)),
    }
}

/// `isdisjoint(a, b)`.
pub fn isdisjoint(a: &Obj, b: &Obj) -> Result<bool, Obj> {
    require_set(a)?;
    set::is_disjoint(a, b)
}

/// `issubset(a, b)`.
pub fn issubset(a: &Obj, b: &Obj) -> Result<bool, Obj> {
    require_set(a)?;
    set::is_subset(a, b)
}

/// `issuperset(a, b)`.
pub fn issuperset(a: &Obj, b: &Obj) -> Result<bool, Obj> {
    require_set(a)?;
    set::is_superset(a, b)
}

/// `union_n(sets)`.
pub fn union_n(items: &[Obj]) -> Result<Obj, Obj> {
    for s in items {
        require_set(s)?;
    }
    set::union_n(items)
}

/// `intersection_n(sets)`.
pub fn intersection_n(items: &[Obj]) -> Result<Obj, Obj> {
    for s in items {
        require_set(s)?;
    }
    set::intersection_n(items)
}

/// `difference_n(sets)`.
pub fn difference_n(items: &[Obj]) -> Result<Obj, Obj> {
    for s in items {
        require_set(s)?;
    }
    set::difference_n(items)
}

/// `symmetric_difference(a, b)`.
pub fn symmetric_difference(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    require_set(a)?;
    set::symmetric_difference(a, b)
}

/// `update(x, other)`: in-place union (set family). Mappings have their
/// own `update` further below in the mapping suite; the two never
/// collide because they dispatch on disjoint tag sets.
pub fn set_update(x: &Obj, other: &Obj) -> Result<(), Obj> {
    require_set(x)?;
    set::update(x, other)
}

/// `intersection_update(x, other)`.
pub fn intersection_update(x: &Obj, other: &Obj) -> Result<(), Obj> {
    require_set(x)?;
    set::intersection_update(x, other)
}

/// `difference_update(x, other)`.
pub fn difference_update(x: &Obj, other: &Obj) -> Result<(), Obj> {
    require_set(x)?;
    set::difference_update(x, other)
}

/// `symmetric_difference_update(x, other)`.
pub fn symmetric_difference_update(x: &Obj, other: &Obj) -> Result<(), Obj> {
    require_set(x)?;
    set::symmetric_difference_update(x, other)
}

/// `push_unique(x, value)`: set-suite `add`, raising `ValueError` rather
/// than silently no-op-ing on a duplicate.
pub fn push_unique(x: &Obj, value: Obj) -> Result<(), Obj> {
    require_set(x)?;
    set::push_unique(x, value)
}

/// `discard(x, value)`: returns whether `value` was present.
pub fn discard(x: &Obj, value: &Obj) -> Result<bool, Obj> {
    require_set(x)?;
    set::discard(x, value)
}

/// `add(x, value)`: set-suite synonym for [`push`].
pub fn add(x: &Obj, value: Obj) -> Result<(), Obj> {
    require_set(x)?;
    set::add(x, value)
}

// ---------------------------------------------------------------------
// Mapping suite: iter_items/iter_keys/iter_values, popvalue/popitem/
// setdefault/update, plus the mini_iter_* aliases — see the module doc's
// note on why mini_iter* collapses onto the full iterator entry points
// here.
// ---------------------------------------------------------------------

fn require_mapping(x: &Obj) -> Result<(), Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    match x.tag() {
        Tag::FrozenDict | Tag::Dict => Ok(()),
        _ => Err(singleton(ExcKind::MethodError)),
    }
}

/// `iter_items(x)`: an iterator over `(key, value)` tuples.
pub fn iter_items(x: &Obj) -> Result<Obj, Obj> {
    require_mapping(x)?;
    Ok(dict::items_iter(x.clone()))
}

/// `iter_keys(x)`: equivalent to [`iter`] over a mapping, given its own
/// name in the mapping suite for symmetry with `iter_values`/`iter_items`.
pub fn iter_keys(x: &Obj) -> Result<Obj, Obj> {
    require_mapping(x)?;
    Ok(dict::keys_iter(x.clone()))
}

/// `iter_values(x)`.
pub fn iter_values(x: &Obj) -> Result<Obj, Obj> {
    require_mapping(x)?;
    Ok(dict::values_iter(x.clone()))
}

/// `mini_iter_items`/`mini_iter_keys`/`mini_iter_values`: aliases, per
/// this module's mini-iterator design note.
pub fn mini_iter_items(x: &Obj) -> Result<Obj, Obj> {
    iter_items(x)
}
pub fn mini_iter_keys(x: &Obj) -> Result<Obj, Obj> {
    iter_keys(x)
}
pub fn mini_iter_values(x: &Obj) -> Result<Obj, Obj> {
    iter_values(x)
}

/// `popvalue(x, key, default)`.
pub fn popvalue(x: &Obj, key: &Obj, default: &Obj) -> Result<Obj, Obj> {
    require_mapping(x)?;
    dict::popvalue(x, key, default)
}

/// `popitem(x)`: remove and return an arbitrary `(key, value)` pair.
pub fn popitem(x: &Obj) -> Result<(Obj, Obj), Obj> {
    require_mapping(x)?;
    dict::pop_item(x)
}

/// `setdefault(x, key, default)`.
pub fn setdefault(x: &Obj, key: Obj, default: Obj) -> Result<Obj, Obj> {
    require_mapping(x)?;
    dict::setdefault(x, key, default)
}

/// `update(x, other)`: mapping-suite in-place merge.
pub fn update(x: &Obj, other: &Obj) -> Result<(), Obj> {
    require_mapping(x)?;
    dict::update(x, other)
}

/// `as_int_c(x)`: only the integer family converts; widening from `float`
/// is not attempted — `as_int_c`/`as_float_c` stay separate, non-overlapping
/// conversions.
pub fn as_int_c(x: &Obj) -> Result<i64, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    match x.tag() {
        Tag::Int | Tag::IntStore => Ok(x.with_payload(|p| p.as_int().unwrap())),
        _ => Err(singleton(ExcKind::TypeError)),
    }
}

/// `as_ssize_c(x)`: `as_int_c` narrowed to `isize`, overflowing to
/// `OverflowError` rather than wrapping.
pub fn as_ssize_c(x: &Obj) -> Result<isize, Obj> {
    let v = as_int_c(x)?;
    isize::try_from(v).map_err(|_| singleton(ExcKind::OverflowError))
}

/// `as_hash_c(x)`: the memoized hash, as a C-style conversion entry point.
pub fn as_hash_c(x: &Obj) -> Result<i64, Obj> {
    hash::hash(x)
}

/// `as_float_c(x)`: floats convert directly; integers widen.
pub fn as_float_c(x: &Obj) -> Result<f64, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    match x.tag() {
        Tag::Float | Tag::FloatStore => Ok(x.with_payload(|p| p.as_float().unwrap())),
        Tag::Int | Tag::IntStore => Ok(x.with_payload(|p| p.as_int().unwrap()) as f64),
        _ => Err(singleton(ExcKind::TypeError)),
    }
}

macro_rules! as_intn_c {
    ($name:ident, $t:ty) => {
        /// Fixed-width conversion: `OverflowError` if `x`'s value does not
        /// fit in
        #[doc = stringify!($t)]
        /// .
        pub fn $name(x: &Obj) -> Result<$t, Obj> {
            let v = as_int_c(x)?;
            <$t>::try_from(v).map_err(|_| singleton(ExcKind::OverflowError))
        }
    };
}

as_intn_c!(as_int8_c, i8);
as_intn_c!(as_int16_c, i16);
as_intn_c!(as_int32_c, i32);
as_intn_c!(as_int64_c, i64);
as_intn_c!(as_uint8_c, u8);
as_intn_c!(as_uint16_c, u16);
as_intn_c!(as_uint32_c, u32);
as_intn_c!(as_uint64_c, u64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{sequence, set};

    #[test]
    fn test_type_of_distinguishes_mutability() {
        let t = sequence::new_tuple(vec![]);
        let l = sequence::new_list(vec![]);
        assert!(!Obj::ptr_eq(&type_of(&t), &type_of(&l)));
        assert!(Obj::ptr_eq(&type_of(&t), &type_of(&sequence::new_tuple(vec![]))));
    }

    #[test]
    fn test_bool_of_empty_containers_is_false() {
        assert!(!bool_of(&sequence::new_list(vec![])).unwrap());
        assert!(bool_of(&sequence::new_list(vec![Obj::new_int(0)])).unwrap());
        assert!(!bool_of(&crate::types::nil()).unwrap());
    }

    #[test]
    fn test_or_n_and_and_n_short_circuit() {
        let zero = Obj::new_int(0);
        let five = Obj::new_int(5);
        let nine = Obj::new_int(9);
        assert!(Obj::ptr_eq(&or_n(&[zero.clone(), five.clone()]).unwrap(), &five));
        assert!(Obj::ptr_eq(&and_n(&[five.clone(), nine.clone()]).unwrap(), &nine));
        assert!(Obj::ptr_eq(&and_n(&[zero.clone(), five]).unwrap(), &zero));
    }

    #[test]
    fn test_any_all_over_a_list() {
        let l = sequence::new_list(vec![Obj::new_int(0), Obj::new_int(1)]);
        assert!(any(&l).unwrap());
        assert!(!all(&l).unwrap());
    }

    #[test]
    fn test_build_list_by_appending_then_index() {
        let l = sequence::new_list(vec![]);
        for i in 0..5 {
            push(&l, Obj::new_int(i)).unwrap();
        }
        assert_eq!(len(&l).unwrap(), 5);
        assert_eq!(
            getitem(&l, &Obj::new_int(2)).unwrap().with_payload(|p| p.as_int()),
            Some(2)
        );
    }

    #[test]
    fn test_getindex_out_of_range_and_in_range() {
        let b = bytes::new_bytes(b"ABCDE".to_vec());
        assert!(getitem(&b, &Obj::new_int(20)).is_err());
        assert_eq!(getitem(&b, &Obj::new_int(0)).unwrap().with_payload(|p| p.as_int()), Some(65));
    }

    #[test]
    fn test_getdefault_falls_back_on_missing_key() {
        let d = dict::new_dict(vec![]).unwrap();
        let missing = Obj::new_int(1);
        let fallback = Obj::new_int(-1);
        let got = getdefault(&d, &missing, &fallback).unwrap();
        assert_eq!(got.with_payload(|p| p.as_int()), Some(-1));
    }

    #[test]
    fn test_generator_lenhint_tracks_consumption() {
        let l = sequence::new_list((0..5).map(Obj::new_int).collect());
        let it = iter(&l).unwrap();
        assert_eq!(iter_lenhint(&it).unwrap(), 5);
        for _ in 0..3 {
            next(&it).unwrap();
        }
        assert_eq!(iter_lenhint(&it).unwrap(), 2);
        next(&it).unwrap();
        next(&it).unwrap();
        assert_eq!(iter_lenhint(&it).unwrap(), 0);
        assert!(is_exception_of(&next(&it).unwrap_err(), ExcKind::StopIteration));
    }

    #[test]
    fn test_freezing_a_list_makes_append_fail() {
        let l = sequence::new_list(vec![Obj::new_int(1)]);
        lifecycle::freeze(&l).unwrap();
        assert!(push(&l, Obj::new_int(2)).is_err());
    }

    #[test]
    fn test_chr_from_codepoint_boundary() {
        assert!(strtype::chr_from_codepoint(-1).is_err());
        let a = strtype::chr_from_codepoint(65).unwrap();
        assert_eq!(len(&a).unwrap(), 1);
    }

    #[test]
    fn test_set_ops_over_bag_of_characters() {
        let abracadabra: Vec<Obj> = "abracadabra".chars().map(|c| strtype::new_str(c.to_string())).collect();
        let alacazam: Vec<Obj> = "alacazam".chars().map(|c| strtype::new_str(c.to_string())).collect();
        let s1 = set::new_frozenset(abracadabra).unwrap();
        let s2 = set::new_frozenset(alacazam).unwrap();
        assert_eq!(len(&s1).unwrap(), 5);
        assert!(contains(&s1, &strtype::new_str("a".to_string())).unwrap());
        assert!(!contains(&s1, &strtype::new_str("z".to_string())).unwrap());

        let d = set::difference(&s1, &s2).unwrap();
        assert_eq!(len(&d).unwrap(), 3);
        assert!(contains(&d, &strtype::new_str("b".to_string())).unwrap());
        assert!(!contains(&d, &strtype::new_str("a".to_string())).unwrap());

        let u = set::union(&s1, &s2).unwrap();
        assert_eq!(len(&u).unwrap(), 8);
        assert!(contains(&u, &strtype::new_str("z".to_string())).unwrap());
        assert!(!contains(&u, &strtype::new_str("q".to_string())).unwrap());

        let i = set::intersection(&s1, &s2).unwrap();
        assert_eq!(len(&i).unwrap(), 2);
        assert!(contains(&i, &strtype::new_str("a".to_string())).unwrap());
        assert!(!contains(&i, &strtype::new_str("b".to_string())).unwrap());
    }

    #[test]
    fn test_as_intn_c_overflow() {
        let x = Obj::new_int(1000);
        assert!(as_int8_c(&x).is_err());
        assert_eq!(as_int16_c(&x).unwrap(), 1000);
    }

    #[test]
    fn test_sequence_suite_slice_and_search() {
        let l = sequence::new_list((0..5).map(Obj::new_int).collect());
        assert_eq!(find(&l, &Obj::new_int(3)).unwrap(), 3);
        assert_eq!(find(&l, &Obj::new_int(99)).unwrap(), -1);
        assert!(index(&l, &Obj::new_int(99)).is_err());
        assert_eq!(count(&l, &Obj::new_int(3)).unwrap(), 1);

        let sliced = getslice(&l, 1, 4, 1).unwrap();
        assert_eq!(len(&sliced).unwrap(), 3);

        setslice(&l, SLICE_DEFAULT, SLICE_USELEN, 1, vec![Obj::new_int(9)]).unwrap();
        assert_eq!(len(&l).unwrap(), 1);

        let l2 = sequence::new_list((0..5).map(Obj::new_int).collect());
        delslice(&l2, 0, SLICE_USELEN, 2).unwrap();
        assert_eq!(len(&l2).unwrap(), 2);

        irepeat(&l2, 2).unwrap();
        assert_eq!(len(&l2).unwrap(), 4);
    }

    #[test]
    fn test_set_suite_n_ary_and_in_place_updates() {
        let a = set::new_set(vec![Obj::new_int(1), Obj::new_int(2)]).unwrap();
        let b = set::new_frozenset(vec![Obj::new_int(2), Obj::new_int(3)]).unwrap();

        assert!(!isdisjoint(&a, &b).unwrap());
        assert!(!issubset(&a, &b).unwrap());

        let u = union_n(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(len(&u).unwrap(), 3);

        set_update(&a, &b).unwrap();
        assert_eq!(len(&a).unwrap(), 3);

        let c = set::new_set(vec![Obj::new_int(1)]).unwrap();
        assert!(push_unique(&c, Obj::new_int(2)).is_ok());
        assert!(push_unique(&c, Obj::new_int(1)).is_err());
    }

    #[test]
    fn test_iter_state_view_tracks_position_and_kind() {
        let l = sequence::new_list((0..3).map(Obj::new_int).collect());
        let it = iter(&l).unwrap();
        let view = iter_state_view(&it).unwrap();
        assert_eq!(view.kind, IterStateKind::Sequence);
        assert_eq!(view.position, 0);
        assert_eq!(view.lenhint, 3);

        next(&it).unwrap();
        let view = iter_state_view(&it).unwrap();
        assert_eq!(view.position, 1);
        assert_eq!(view.lenhint, 2);
    }

    #[test]
    fn test_mapping_suite_popvalue_and_items() {
        let d = dict::new_dict(vec![(Obj::new_int(1), Obj::new_int(10))]).unwrap();
        setdefault(&d, Obj::new_int(2), Obj::new_int(20)).unwrap();
        assert_eq!(len(&d).unwrap(), 2);

        let fallback = Obj::new_int(-1);
        let missing = popvalue(&d, &Obj::new_int(99), &fallback).unwrap();
        assert_eq!(missing.with_payload(|p| p.as_int()), Some(-1));

        let items = iter_items(&d).unwrap();
        let first = next(&items).unwrap();
        assert_eq!(len(&first).unwrap(), 2);
    }
}
