//! Lifecycle Module - refcounting, freeze, copy, and invalidate
//!
//! `incref`/`decref` are trivial (`Clone`/`Drop` already do the work; they
//! exist here only so a host embedding this crate through an FFI-style
//! boundary has a named entry point to call, mirroring the explicit
//! refcount pair an embedder expects). Everything else in this module
//! mutates or reconstructs an [`Obj`] in place according to the same family rules the
//! type modules already enforce (mutability required for in-place
//! mutation, `InvalidatedError` once a handle has been torn down).
//!
//! # Cycles
//!
//! Only `tuple`/`list` can ever hold a reference back to an ancestor of
//! themselves: a `set`/`dict` key is hashed at insertion time, and hashing
//! a container that (transitively) contains itself recurses until the
//! depth guard in [`crate::hash`] raises `RecursionLimitError` — so a
//! self-referential set or dict can never actually be built. `deep_copy`
//! and `deep_invalidate` therefore only need cycle protection (a memo
//! keyed by [`Obj::identity`]) when walking sequence payloads, but both
//! use the same memo/visited-set machinery uniformly rather than special-
//! casing sequences, since a shared (non-cyclic) sub-list still needs the
//! memo to preserve aliasing in the copy.

use std::collections::{HashMap, HashSet};

use crate::exception::{singleton, ExcKind};
use crate::iterator::GenState;
use crate::object::{Obj, Payload, Tag};
use crate::types::{dict, set};

/// `incref(x)`: one more owner of this handle.
pub fn incref(x: &Obj) -> Obj {
    x.clone()
}

/// `decref(x)`: this owner is done with the handle.
pub fn decref(x: Obj) {
    drop(x);
}

/// `incref_n(xs)`: variadic form of [`incref`].
pub fn incref_n(xs: &[Obj]) -> Vec<Obj> {
    xs.iter().map(incref).collect()
}

/// `decref_n(xs)`: variadic form of [`decref`].
pub fn decref_n(xs: Vec<Obj>) {
    for x in xs {
        decref(x);
    }
}

/// Freeze a handle in place: a mutable container becomes its immutable
/// pair (tag flip only, no copy); an iterator is closed instead, since it
/// has no immutable pair of its own — a frozen iterator behaves as closed.
/// Already-immutable objects are a no-op.
pub fn freeze(x: &Obj) -> Result<(), Obj> {
    freeze_impl(x)?;
    crate::logging::global().log(crate::logging::RuntimeEvent::Freeze {
        tag: x.tag().name().to_string(),
        deep: false,
    });
    Ok(())
}

/// Tag-flip only, no logging — shared by [`freeze`] and [`deep_freeze`],
/// which log once for the whole traversal rather than once per node.
fn freeze_impl(x: &Obj) -> Result<(), Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    if x.tag() == Tag::Iterator {
        x.with_payload_mut(|p| {
            if let Some(g) = p.as_iter_mut() {
                *g = GenState::Exhausted;
            }
        });
        return Ok(());
    }
    if !x.is_mutable() {
        return Ok(());
    }
    x.set_tag(x.tag().immutable_pair());
    Ok(())
}

fn sequence_snapshot(x: &Obj) -> Vec<Obj> {
    x.with_payload(|p| p.as_sequence().map(|s| s.to_vec()).unwrap_or_default())
}

fn set_snapshot(x: &Obj) -> Vec<Obj> {
    x.with_payload(|p| {
        p.as_set()
            .map(|s| s.iter().map(|(_, k)| k.clone()).collect())
            .unwrap_or_default()
    })
}

fn dict_snapshot(x: &Obj) -> Vec<(Obj, Obj)> {
    x.with_payload(|p| p.as_dict().map(|d| d.iter().collect()).unwrap_or_default())
}

/// Freeze `x`, then recursively freeze every element it (transitively)
/// holds. A `visited` set (by identity) keeps shared or cyclic structure
/// from being walked more than once.
pub fn deep_freeze(x: &Obj) -> Result<(), Obj> {
    let mut visited = HashSet::new();
    deep_freeze_inner(x, &mut visited)?;
    crate::logging::global().log(crate::logging::RuntimeEvent::Freeze {
        tag: x.tag().name().to_string(),
        deep: true,
    });
    Ok(())
}

fn deep_freeze_inner(x: &Obj, visited: &mut HashSet<usize>) -> Result<(), Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    if !visited.insert(x.identity()) {
        return Ok(());
    }
    freeze_impl(x)?;
    match x.tag() {
        Tag::Tuple | Tag::List => {
            for item in sequence_snapshot(x) {
                deep_freeze_inner(&item, visited)?;
            }
        }
        Tag::FrozenSet | Tag::Set => {
            for item in set_snapshot(x) {
                deep_freeze_inner(&item, visited)?;
            }
        }
        Tag::FrozenDict | Tag::Dict => {
            for (k, v) in dict_snapshot(x) {
                deep_freeze_inner(&k, visited)?;
                deep_freeze_inner(&v, visited)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Shallow-clone `x`'s payload, retagged as `target_tag`. The two tags
/// must belong to the same pair (or be identical); callers resolve which
/// target they want before calling this.
fn copy_as(x: &Obj, target_tag: Tag) -> Result<Obj, Obj> {
    let payload = match x.tag() {
        Tag::Nil => Payload::Nil,
        Tag::Bool => Payload::Bool(x.with_payload(|p| p.as_bool().unwrap())),
        Tag::Int | Tag::IntStore => Payload::Int(x.with_payload(|p| p.as_int().unwrap())),
        Tag::Float | Tag::FloatStore => Payload::Float(x.with_payload(|p| p.as_float().unwrap())),
        Tag::Bytes | Tag::ByteArray => {
            Payload::Bytes(x.with_payload(|p| p.as_bytes().unwrap().to_vec()))
        }
        Tag::Str | Tag::ChrArray => {
            Payload::Text(x.with_payload(|p| p.as_text().unwrap().to_string()))
        }
        Tag::Tuple | Tag::List => Payload::Sequence(sequence_snapshot(x)),
        Tag::FrozenSet | Tag::Set => {
            let items = set_snapshot(x);
            return if target_tag.is_mutable() {
                set::new_set(items)
            } else {
                set::new_frozenset(items)
            };
        }
        Tag::FrozenDict | Tag::Dict => {
            let pairs = dict_snapshot(x);
            return if target_tag.is_mutable() {
                dict::new_dict(pairs)
            } else {
                dict::new_frozendict(pairs)
            };
        }
        Tag::Exception => Payload::Exception(x.exc_id().unwrap()),
        Tag::Type => x.with_payload(|p| match p {
            Payload::TypeRef(t) => Payload::TypeRef(*t),
            _ => unreachable!("Tag::Type object without a TypeRef payload"),
        }),
        Tag::Invalidated | Tag::InvalidatedMutable => Payload::Invalidated,
        Tag::Iterator => unreachable!("iterators are handled by the caller before reaching copy_as"),
    };
    Ok(Obj::new(target_tag, payload))
}

/// An iterator has no mutable/immutable pair and its `Adapter` variant
/// cannot be cloned (it owns a boxed closure), so none of `copy`,
/// `unfrozen_copy`, or `frozen_copy` can produce a live duplicate of one.
/// Rather than raising, they hand back a closed sentinel — the nearest
/// honest value, and one every caller already has to handle from
/// `invalidate` elsewhere.
fn copy_iterator_sentinel() -> Obj {
    Obj::new(Tag::Invalidated, Payload::Invalidated)
}

/// `copy(x)`: shallow duplicate, same mutability as `x`.
pub fn copy(x: &Obj) -> Result<Obj, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    if x.tag() == Tag::Iterator {
        return Ok(copy_iterator_sentinel());
    }
    copy_as(x, x.tag())
}

/// `unfrozen_copy(x)`: shallow duplicate, forced mutable. Types with no
/// mutable pair (`nil`, `bool`, `exception`, `type`) have nothing to
/// unfreeze into and raise `TypeError`.
pub fn unfrozen_copy(x: &Obj) -> Result<Obj, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    if x.tag() == Tag::Iterator {
        return Ok(copy_iterator_sentinel());
    }
    let target = x
        .tag()
        .mutable_pair()
        .or_else(|| x.tag().immutable_pair().mutable_pair())
        .ok_or_else(|| singleton(ExcKind::TypeError))?;
    copy_as(x, target)
}

/// `frozen_copy(x)`: shallow duplicate, forced immutable.
pub fn frozen_copy(x: &Obj) -> Result<Obj, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    if x.tag() == Tag::Iterator {
        return Ok(copy_iterator_sentinel());
    }
    copy_as(x, x.tag().immutable_pair())
}

/// `deep_copy(x)`: recursively duplicate `x` and everything it holds.
/// Shared sub-objects (including true cycles reachable through
/// list/tuple nesting) are copied once and the same new handle is reused
/// for every reference to them, matching the source structure's sharing.
pub fn deep_copy(x: &Obj) -> Result<Obj, Obj> {
    let mut memo = HashMap::new();
    deep_copy_inner(x, &mut memo)
}

fn deep_copy_inner(x: &Obj, memo: &mut HashMap<usize, Obj>) -> Result<Obj, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    if let Some(existing) = memo.get(&x.identity()) {
        return Ok(existing.clone());
    }
    match x.tag() {
        Tag::Tuple | Tag::List => {
            // Pre-create the destination and register it before recursing,
            // so a cycle through this very container resolves to the same
            // (still-being-filled) handle instead of looping forever.
            let dest = Obj::new(x.tag(), Payload::Sequence(Vec::new()));
            memo.insert(x.identity(), dest.clone());
            let mut copied = Vec::new();
            for item in sequence_snapshot(x) {
                copied.push(deep_copy_inner(&item, memo)?);
            }
            dest.with_payload_mut(|p| *p.as_sequence_mut().unwrap() = copied);
            Ok(dest)
        }
        Tag::FrozenSet | Tag::Set => {
            let mut copied = Vec::new();
            for item in set_snapshot(x) {
                copied.push(deep_copy_inner(&item, memo)?);
            }
            let result = if x.is_mutable() {
                set::new_set(copied)?
            } else {
                set::new_frozenset(copied)?
            };
            memo.insert(x.identity(), result.clone());
            Ok(result)
        }
        Tag::FrozenDict | Tag::Dict => {
            let mut copied = Vec::new();
            for (k, v) in dict_snapshot(x) {
                copied.push((deep_copy_inner(&k, memo)?, deep_copy_inner(&v, memo)?));
            }
            let result = if x.is_mutable() {
                dict::new_dict(copied)?
            } else {
                dict::new_frozendict(copied)?
            };
            memo.insert(x.identity(), result.clone());
            Ok(result)
        }
        Tag::Iterator => Ok(copy_iterator_sentinel()),
        _ => {
            let result = copy_as(x, x.tag())?;
            memo.insert(x.identity(), result.clone());
            Ok(result)
        }
    }
}

/// Tear `x` down: its payload is dropped (decreffing whatever it owned)
/// and replaced with the `Invalidated` sentinel; the tag flips to
/// `Invalidated`/`InvalidatedMutable` depending on `x`'s prior mutability,
/// so an FFI caller testing `tag & 1` still sees the mutability it
/// expected even on a torn-down handle. Idempotent: invalidating an
/// already-invalidated handle is a no-op.
pub fn invalidate(x: &Obj) -> Result<(), Obj> {
    let tag = x.tag().name().to_string();
    let did_invalidate = invalidate_impl(x)?;
    if did_invalidate {
        crate::logging::global().log(crate::logging::RuntimeEvent::Invalidate { tag, deep: false });
    }
    Ok(())
}

/// Tears `x` down, returning whether it actually transitioned (`false` if
/// it was already invalidated) — shared by [`invalidate`] and
/// [`deep_invalidate`], which log once for the whole traversal rather than
/// once per already-invalidated no-op.
fn invalidate_impl(x: &Obj) -> Result<bool, Obj> {
    if x.is_invalidated() {
        return Ok(false);
    }
    let mutable = x.is_mutable();
    x.with_payload_mut(|p| *p = Payload::Invalidated);
    x.clear_cached_hash();
    x.set_tag(if mutable {
        Tag::InvalidatedMutable
    } else {
        Tag::Invalidated
    });
    Ok(true)
}

/// Invalidate `x` and everything it (transitively) holds. Children are
/// invalidated before their parent's own payload is torn down (invalidate
/// reads the snapshot first), and a `visited` set makes this safe on
/// cyclic list/tuple structure.
pub fn deep_invalidate(x: &Obj) -> Result<(), Obj> {
    let mut visited = HashSet::new();
    let tag = x.tag().name().to_string();
    deep_invalidate_inner(x, &mut visited)?;
    crate::logging::global().log(crate::logging::RuntimeEvent::Invalidate { tag, deep: true });
    Ok(())
}

fn deep_invalidate_inner(x: &Obj, visited: &mut HashSet<usize>) -> Result<(), Obj> {
    if x.is_invalidated() {
        return Ok(());
    }
    if !visited.insert(x.identity()) {
        return Ok(());
    }
    match x.tag() {
        Tag::Tuple | Tag::List => {
            for item in sequence_snapshot(x) {
                deep_invalidate_inner(&item, visited)?;
            }
        }
        Tag::FrozenSet | Tag::Set => {
            for item in set_snapshot(x) {
                deep_invalidate_inner(&item, visited)?;
            }
        }
        Tag::FrozenDict | Tag::Dict => {
            for (k, v) in dict_snapshot(x) {
                deep_invalidate_inner(&k, visited)?;
                deep_invalidate_inner(&v, visited)?;
            }
        }
        _ => {}
    }
    invalidate_impl(x)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sequence::{new_list, new_tuple};

    #[test]
    fn test_incref_n_and_decref_n_touch_every_handle() {
        let items = vec![Obj::new_int(1), Obj::new_int(2), Obj::new_int(3)];
        let refs = incref_n(&items);
        assert_eq!(refs.len(), 3);
        decref_n(refs);
        decref_n(items);
    }

    #[test]
    fn test_freeze_flips_tag_in_place() {
        let l = new_list(vec![Obj::new_int(1)]);
        let identity = l.identity();
        freeze(&l).unwrap();
        assert_eq!(l.tag(), Tag::Tuple);
        assert_eq!(l.identity(), identity, "freeze must not reallocate");
    }

    #[test]
    fn test_freeze_closes_an_iterator() {
        let seq = new_tuple(vec![Obj::new_int(1)]);
        let it = Obj::new(Tag::Iterator, Payload::IterData(GenState::from_sequence_snapshot(seq)));
        freeze(&it).unwrap();
        it.with_payload_mut(|p| assert!(p.as_iter_mut().unwrap().is_exhausted()));
    }

    #[test]
    fn test_copy_preserves_mutability_unfrozen_copy_does_not() {
        let t = new_tuple(vec![Obj::new_int(1)]);
        let c = copy(&t).unwrap();
        assert_eq!(c.tag(), Tag::Tuple);
        let u = unfrozen_copy(&t).unwrap();
        assert_eq!(u.tag(), Tag::List);
    }

    #[test]
    fn test_unfrozen_copy_of_nil_errors() {
        assert!(unfrozen_copy(&crate::types::nil()).is_err());
    }

    #[test]
    fn test_deep_copy_breaks_aliasing_of_nested_list() {
        let inner = new_list(vec![Obj::new_int(1)]);
        let outer = new_list(vec![inner.clone()]);
        let copied = deep_copy(&outer).unwrap();
        let copied_inner = copied.with_payload(|p| p.as_sequence().unwrap()[0].clone());
        assert!(!Obj::ptr_eq(&inner, &copied_inner));
        crate::types::sequence::append(&copied_inner, Obj::new_int(2)).unwrap();
        assert_eq!(crate::types::sequence::len(&inner).unwrap(), 1);
    }

    #[test]
    fn test_deep_copy_handles_a_self_referential_list() {
        let l = new_list(vec![]);
        crate::types::sequence::append(&l, l.clone()).unwrap();
        let copied = deep_copy(&l).unwrap();
        assert!(!Obj::ptr_eq(&l, &copied));
        let first = copied.with_payload(|p| p.as_sequence().unwrap()[0].clone());
        assert!(Obj::ptr_eq(&first, &copied));
    }

    #[test]
    fn test_invalidate_then_any_op_raises() {
        let i = Obj::new_int(5);
        invalidate(&i).unwrap();
        assert!(i.is_invalidated());
        assert_eq!(i.tag(), Tag::Invalidated);
        assert!(crate::hash::current_hash(&i).is_err());
        // Idempotent.
        assert!(invalidate(&i).is_ok());
    }

    #[test]
    fn test_deep_invalidate_tears_down_children() {
        let inner = new_list(vec![Obj::new_int(1)]);
        let outer = new_list(vec![inner.clone()]);
        deep_invalidate(&outer).unwrap();
        assert!(outer.is_invalidated());
        assert!(inner.is_invalidated());
    }

    #[test]
    fn test_freeze_and_invalidate_emit_runtime_events() {
        crate::logging::install(crate::logging::RuntimeLogger::new(
            crate::logging::RuntimeLoggerConfig {
                console: false,
                ..Default::default()
            },
        ));

        let l = new_list(vec![Obj::new_int(1)]);
        freeze(&l).unwrap();
        let i = Obj::new_int(5);
        invalidate(&i).unwrap();
        // Second call hits the already-invalidated branch and must not log again.
        invalidate(&i).unwrap();

        let events = crate::logging::global().recorded_events();
        let freezes = events
            .iter()
            .filter(|e| matches!(e, crate::logging::RuntimeEvent::Freeze { deep: false, .. }))
            .count();
        let invalidates = events
            .iter()
            .filter(|e| matches!(e, crate::logging::RuntimeEvent::Invalidate { deep: false, .. }))
            .count();
        assert_eq!(freezes, 1);
        assert_eq!(invalidates, 1, "re-invalidating an already-invalidated handle must not log again");
    }
}
