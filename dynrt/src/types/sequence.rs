//! Sequence Module - `tuple`/`list`
//!
//! Backed by `Vec<Obj>`. Construction captures ownership of each element
//! handle the way a Rust `Vec::push` naturally does — no explicit incref
//! call is needed anywhere in this file; moving an `Obj` into the vector
//! *is* the ownership transfer.

use crate::exception::{singleton, ExcKind};
use crate::object::{Obj, Payload, Tag};

pub fn new_tuple(items: Vec<Obj>) -> Obj {
    Obj::new(Tag::Tuple, Payload::Sequence(items))
}

pub fn new_list(items: Vec<Obj>) -> Obj {
    Obj::new(Tag::List, Payload::Sequence(items))
}

/// `tuple_n(items)`: the variadic-constructor name for [`new_tuple`] — a
/// plain alias, since this runtime already takes its elements as an owned
/// `Vec` rather than C variadic arguments.
pub fn tuple_n(items: Vec<Obj>) -> Obj {
    new_tuple(items)
}

/// `list_n(items)`: alias for [`new_list`], see [`tuple_n`].
pub fn list_n(items: Vec<Obj>) -> Obj {
    new_list(items)
}

/// Drains any iterable handle into an owned `Vec`, for use by the
/// `_from` family of constructors across type modules.
pub(crate) fn drain(iterable: &Obj) -> Result<Vec<Obj>, Obj> {
    let it = crate::dispatch::iter(iterable)?;
    let mut out = Vec::new();
    loop {
        match crate::dispatch::next(&it) {
            Ok(v) => out.push(v),
            Err(e) if crate::exception::is_exception_of(&e, ExcKind::StopIteration) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// `tuple_from(iterable)`: drains any iterable into a new `tuple`.
/// Iterating a collection and rebuilding it via the matching `from`
/// constructor yields an equal collection.
pub fn tuple_from(iterable: &Obj) -> Result<Obj, Obj> {
    Ok(new_tuple(drain(iterable)?))
}

/// `list_from(iterable)`.
pub fn list_from(iterable: &Obj) -> Result<Obj, Obj> {
    Ok(new_list(drain(iterable)?))
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
    x.with_payload(|p| p.as_sequence().map(|s| s.len()))
        .ok_or_else(|| singleton(ExcKind::TypeError))
}

pub fn truthy(x: &Obj) -> Result<bool, Obj> {
    Ok(len(x)? != 0)
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let idx = if index < 0 { index + len } else { index };
    if idx < 0 || idx >= len {
        None
    } else {
        Some(idx as usize)
    }
}

pub fn get_item(x: &Obj, index: i64) -> Result<Obj, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    x.with_payload(|p| {
        let items = p.as_sequence().ok_or_else(|| singleton(ExcKind::TypeError))?;
        let idx = normalize_index(index, items.len()).ok_or_else(|| singleton(ExcKind::IndexError))?;
        Ok(items[idx].clone())
    })
}

pub fn set_item(x: &Obj, index: i64, value: Obj) -> Result<(), Obj> {
    require_mutable(x)?;
    x.with_payload_mut(|p| {
        let items = p.as_sequence_mut().unwrap();
        let idx = normalize_index(index, items.len()).ok_or_else(|| singleton(ExcKind::IndexError))?;
        items[idx] = value;
        Ok(())
    })?;
    x.clear_cached_hash();
    Ok(())
}

pub fn append(x: &Obj, value: Obj) -> Result<(), Obj> {
    require_mutable(x)?;
    x.with_payload_mut(|p| p.as_sequence_mut().unwrap().push(value));
    x.clear_cached_hash();
    Ok(())
}

pub fn extend(x: &Obj, values: Vec<Obj>) -> Result<(), Obj> {
    require_mutable(x)?;
    x.with_payload_mut(|p| p.as_sequence_mut().unwrap().extend(values));
    x.clear_cached_hash();
    Ok(())
}

pub fn insert(x: &Obj, index: i64, value: Obj) -> Result<(), Obj> {
    require_mutable(x)?;
    x.with_payload_mut(|p| {
        let items = p.as_sequence_mut().unwrap();
        let len = items.len() as i64;
        let idx = (if index < 0 { index + len } else { index }).clamp(0, len) as usize;
        items.insert(idx, value);
    });
    x.clear_cached_hash();
    Ok(())
}

pub fn pop(x: &Obj, index: i64) -> Result<Obj, Obj> {
    require_mutable(x)?;
    let result = x.with_payload_mut(|p| {
        let items = p.as_sequence_mut().unwrap();
        let idx = normalize_index(index, items.len()).ok_or_else(|| singleton(ExcKind::IndexError))?;
        Ok(items.remove(idx))
    })?;
    x.clear_cached_hash();
    Ok(result)
}

pub fn remove(x: &Obj, value: &Obj) -> Result<(), Obj> {
    require_mutable(x)?;
    let pos = {
        let items: Vec<Obj> = x.with_payload(|p| p.as_sequence().unwrap().to_vec());
        let mut found = None;
        for (i, item) in items.iter().enumerate() {
            if crate::hash::eq(item, value)? {
                found = Some(i);
                break;
            }
        }
        found
    };
    match pos {
        Some(idx) => {
            x.with_payload_mut(|p| {
                p.as_sequence_mut().unwrap().remove(idx);
            });
            x.clear_cached_hash();
            Ok(())
        }
        None => Err(singleton(ExcKind::ValueError)),
    }
}

pub fn reverse(x: &Obj) -> Result<(), Obj> {
    require_mutable(x)?;
    x.with_payload_mut(|p| p.as_sequence_mut().unwrap().reverse());
    x.clear_cached_hash();
    Ok(())
}

/// In-place sort via `crate::hash::compare`. Raises whatever `compare`
/// raises the first time two elements are not mutually ordered (e.g. a
/// `TypeError` on a heterogeneous list mixing numbers and strings).
pub fn sort(x: &Obj) -> Result<(), Obj> {
    require_mutable(x)?;
    let mut items: Vec<Obj> = x.with_payload(|p| p.as_sequence().unwrap().to_vec());
    let mut err = None;
    items.sort_by(|a, b| {
        if err.is_some() {
            return std::cmp::Ordering::Equal;
        }
        match crate::hash::compare(a, b) {
            Ok(o) => o,
            Err(e) => {
                err = Some(e);
                std::cmp::Ordering::Equal
            }
        }
    });
    if let Some(e) = err {
        return Err(e);
    }
    x.with_payload_mut(|p| *p.as_sequence_mut().unwrap() = items);
    x.clear_cached_hash();
    Ok(())
}

pub fn concat(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    if a.is_invalidated() || b.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    let mut out: Vec<Obj> = a
        .with_payload(|p| p.as_sequence().map(|s| s.to_vec()))
        .ok_or_else(|| singleton(ExcKind::TypeError))?;
    let rhs: Vec<Obj> = b
        .with_payload(|p| p.as_sequence().map(|s| s.to_vec()))
        .ok_or_else(|| singleton(ExcKind::TypeError))?;
    out.extend(rhs);
    Ok(Obj::new(a.tag(), Payload::Sequence(out)))
}

pub fn contains(x: &Obj, value: &Obj) -> Result<bool, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    let items: Vec<Obj> = x
        .with_payload(|p| p.as_sequence().map(|s| s.to_vec()))
        .ok_or_else(|| singleton(ExcKind::TypeError))?;
    for item in &items {
        if crate::hash::eq(item, value)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// `find(x, value)`: first matching index, or `-1` if absent. Never
/// raises on a missing value — that is what distinguishes it from
/// [`index_of`].
pub fn find(x: &Obj, value: &Obj) -> Result<i64, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    let items: Vec<Obj> = x
        .with_payload(|p| p.as_sequence().map(|s| s.to_vec()))
        .ok_or_else(|| singleton(ExcKind::TypeError))?;
    for (i, item) in items.iter().enumerate() {
        if crate::hash::eq(item, value)? {
            return Ok(i as i64);
        }
    }
    Ok(-1)
}

/// `index(x, value)`: like [`find`], but a missing value raises
/// `ValueError` instead of returning a sentinel.
pub fn index_of(x: &Obj, value: &Obj) -> Result<usize, Obj> {
    match find(x, value)? {
        -1 => Err(singleton(ExcKind::ValueError)),
        i => Ok(i as usize),
    }
}

/// `count(x, value)`: number of elements equal to `value`.
pub fn count(x: &Obj, value: &Obj) -> Result<usize, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    let items: Vec<Obj> = x
        .with_payload(|p| p.as_sequence().map(|s| s.to_vec()))
        .ok_or_else(|| singleton(ExcKind::TypeError))?;
    let mut n = 0;
    for item in &items {
        if crate::hash::eq(item, value)? {
            n += 1;
        }
    }
    Ok(n)
}

/// Resolves one `(start, stop)` bound pair against `len` for a
/// contiguous (`step`'s sign only) slice, honoring the `SLICE_DEFAULT`/
/// `SLICE_USELEN` sentinels. Shared by [`slice_indices`] and the
/// contiguous fast path in [`set_slice`].
fn slice_bounds(start: i64, stop: i64, step: i64, len: i64) -> (i64, i64) {
    use crate::dispatch::{SLICE_DEFAULT, SLICE_USELEN};
    let clamp = |raw: i64, lo_default: i64, hi_default: i64| -> i64 {
        match raw {
            SLICE_DEFAULT => {
                if step < 0 {
                    lo_default
                } else {
                    hi_default
                }
            }
            SLICE_USELEN => len,
            v if v < 0 => (v + len).clamp(-1, len),
            v => v.clamp(-1, len),
        }
    };
    if step > 0 {
        (clamp(start, -1, 0).max(0), clamp(stop, -1, len))
    } else {
        // Default start for a reversed slice is the last index (`len - 1`),
        // not `-1` — `-1` is only correct as the *stop* sentinel (one past
        // the first element, in reverse-traversal order).
        (clamp(start, len - 1, len), clamp(stop, -1, 0))
    }
}

/// Normalize a `(start, stop, step)` slice triple against `len`, honoring
/// the `SLICE_DEFAULT`/`SLICE_USELEN` sentinels and raising `ValueError`
/// on a zero step. Returns the list of concrete indices the slice
/// selects, in traversal order (reversed already if `step` is negative).
pub fn slice_indices(start: i64, stop: i64, step: i64, len: usize) -> Result<Vec<usize>, Obj> {
    if step == 0 {
        return Err(singleton(ExcKind::ValueError));
    }
    let (lo, hi) = slice_bounds(start, stop, step, len as i64);
    let mut out = Vec::new();
    if step > 0 {
        let mut i = lo;
        while i < hi {
            out.push(i as usize);
            i += step;
        }
    } else {
        let mut i = lo;
        while i > hi {
            out.push(i as usize);
            i += step;
        }
    }
    Ok(out)
}

/// `getslice(x, start, stop, step)`.
pub fn get_slice(x: &Obj, start: i64, stop: i64, step: i64) -> Result<Obj, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    let items: Vec<Obj> = x
        .with_payload(|p| p.as_sequence().map(|s| s.to_vec()))
        .ok_or_else(|| singleton(ExcKind::TypeError))?;
    let idxs = slice_indices(start, stop, step, items.len())?;
    let out = idxs.into_iter().map(|i| items[i].clone()).collect();
    Ok(Obj::new(x.tag(), Payload::Sequence(out)))
}

/// `setslice(x, start, stop, step, values)`: assigns element-for-element
/// for a stepped slice (lengths must match); replaces the whole span for
/// a contiguous (`step == 1`) slice, which may grow or shrink `x`.
pub fn set_slice(x: &Obj, start: i64, stop: i64, step: i64, values: Vec<Obj>) -> Result<(), Obj> {
    require_mutable(x)?;
    if step == 0 {
        return Err(singleton(ExcKind::ValueError));
    }
    let len = x.with_payload(|p| p.as_sequence().unwrap().len());
    if step == 1 {
        let (lo, hi) = slice_bounds(start, stop, step, len as i64);
        let (lo, hi) = (lo as usize, hi.max(lo) as usize);
        x.with_payload_mut(|p| {
            p.as_sequence_mut().unwrap().splice(lo..hi, values);
        });
    } else {
        let idxs = slice_indices(start, stop, step, len)?;
        if idxs.len() != values.len() {
            return Err(singleton(ExcKind::ValueError));
        }
        x.with_payload_mut(|p| {
            let items = p.as_sequence_mut().unwrap();
            for (i, v) in idxs.into_iter().zip(values) {
                items[i] = v;
            }
        });
    }
    x.clear_cached_hash();
    Ok(())
}

/// `delslice(x, start, stop, step)`.
pub fn del_slice(x: &Obj, start: i64, stop: i64, step: i64) -> Result<(), Obj> {
    require_mutable(x)?;
    let len = x.with_payload(|p| p.as_sequence().unwrap().len());
    let mut idxs = slice_indices(start, stop, step, len)?;
    idxs.sort_unstable();
    idxs.dedup();
    x.with_payload_mut(|p| {
        let items = p.as_sequence_mut().unwrap();
        for i in idxs.into_iter().rev() {
            items.remove(i);
        }
    });
    x.clear_cached_hash();
    Ok(())
}

/// `irepeat(x, n)`: in-place `x *= n` (`n <= 0` empties `x`).
pub fn irepeat(x: &Obj, n: i64) -> Result<(), Obj> {
    require_mutable(x)?;
    x.with_payload_mut(|p| {
        let items = p.as_sequence_mut().unwrap();
        if n <= 0 {
            items.clear();
        } else {
            let original = items.clone();
            for _ in 1..n {
                items.extend(original.clone());
            }
        }
    });
    x.clear_cached_hash();
    Ok(())
}
