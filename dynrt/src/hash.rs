//! Hash Module - the two-phase hash and equality protocol
//!
//! Two entry points:
//!
//! - [`current_hash`] always recomputes from the live payload. Works on
//!   mutable objects too (a `list`'s `current_hash` reflects whatever it
//!   holds *right now*), but is never memoized — a caller who calls it
//!   twice on an unchanged mutable pays twice.
//! - [`hash`] is the one callers actually put objects into a hashtable
//!   with: refuses mutable tags outright (`TypeError`), and memoizes the
//!   result on the object's cached-hash cell after computing it once via
//!   `current_hash`.
//!
//! Recursive containers (tuple/frozenset/frozendict) walk their elements
//! through the same recursion-depth guard used by deep-copy, so a
//! self-referential or absurdly nested structure fails with
//! `RecursionLimitError` rather than overflowing the Rust stack.

use std::cell::Cell;

use crate::exception::{singleton, ExcKind};
use crate::object::{Obj, Payload, Tag};

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

struct DepthGuard;

impl DepthGuard {
    fn enter() -> Result<DepthGuard, Obj> {
        let limit = crate::runtime::recursion_limit();
        let depth = DEPTH.with(|d| {
            let v = d.get() + 1;
            d.set(v);
            v
        });
        if depth > limit {
            DEPTH.with(|d| d.set(d.get() - 1));
            crate::logging::global()
                .log(crate::logging::RuntimeEvent::RecursionLimitExceeded { limit });
            return Err(singleton(ExcKind::RecursionLimitError));
        }
        Ok(DepthGuard)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get() - 1));
    }
}

/// Never let a hash collapse to -1: that value is reserved elsewhere in
/// the ecosystem this runtime's conventions are drawn from to mean "hash
/// computation failed", so an object that happens to hash there is bumped
/// to -2 instead. Keeps `current_hash` total (no input legitimately
/// produces -1).
fn normalize(h: i64) -> i64 {
    if h == -1 {
        -2
    } else {
        h
    }
}

fn hash_bytes(bytes: &[u8]) -> i64 {
    // FNV-1a, 64-bit. Empty input hashes to 0, fixed so
    // `hash(b"") == 0 == hash("")`, by special-casing it instead of
    // returning the bare FNV offset basis.
    if bytes.is_empty() {
        return 0;
    }
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut h = OFFSET;
    for &b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(PRIME);
    }
    h as i64
}

fn hash_float(x: f64) -> i64 {
    if x.is_nan() {
        return 0;
    }
    // An integral float must hash equal to the int it equals, since the
    // two are comparable via `eq` across tags.
    if x.is_finite() && x.fract() == 0.0 && x >= i64::MIN as f64 && x <= i64::MAX as f64 {
        return normalize(x as i64);
    }
    normalize(x.to_bits() as i64)
}

fn hash_sequence(items: &[Obj]) -> Result<i64, Obj> {
    let _guard = DepthGuard::enter()?;
    // Order-sensitive polynomial hash: two tuples differing only in
    // element order must (in general) hash differently.
    let mut h: i64 = 0x345678;
    let n = items.len() as i64;
    for item in items {
        let ih = current_hash(item)?;
        h = h.wrapping_mul(1_000_003).wrapping_add(ih);
    }
    h = h.wrapping_add(n);
    Ok(normalize(h))
}

fn hash_unordered(items: impl Iterator<Item = i64>) -> i64 {
    // Order-independent fold so a frozenset/frozendict's hash depends only
    // on membership, never on insertion or probe order.
    let mut acc: i64 = 0x9e3779b97f4a7c15u64 as i64;
    for h in items {
        acc ^= h.wrapping_mul(0xff51afd7ed558ccd_u64 as i64).rotate_left(13);
    }
    normalize(acc)
}

/// Compute a hash from the object's current contents, with no memoization
/// and no mutability restriction.
pub fn current_hash(x: &Obj) -> Result<i64, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    match x.tag() {
        Tag::Nil => Ok(0),
        Tag::Bool => Ok(x.with_payload(|p| if p.as_bool().unwrap() { 1 } else { 0 })),
        Tag::Int | Tag::IntStore => Ok(normalize(x.with_payload(|p| p.as_int().unwrap()))),
        Tag::Float | Tag::FloatStore => Ok(hash_float(x.with_payload(|p| p.as_float().unwrap()))),
        Tag::Bytes | Tag::ByteArray => {
            Ok(normalize(x.with_payload(|p| hash_bytes(p.as_bytes().unwrap()))))
        }
        Tag::Str | Tag::ChrArray => {
            Ok(normalize(x.with_payload(|p| hash_bytes(p.as_text().unwrap().as_bytes()))))
        }
        Tag::Tuple | Tag::List => {
            let snapshot: Vec<Obj> = x.with_payload(|p| p.as_sequence().unwrap().to_vec());
            hash_sequence(&snapshot)
        }
        Tag::FrozenSet | Tag::Set => {
            let _guard = DepthGuard::enter()?;
            let hashes: Vec<i64> = x.with_payload(|p| {
                p.as_set().unwrap().iter().map(|(h, _)| h).collect()
            });
            Ok(hash_unordered(hashes.into_iter()))
        }
        Tag::FrozenDict | Tag::Dict => {
            let _guard = DepthGuard::enter()?;
            let pairs: Vec<(Obj, Obj)> = x.with_payload(|p| p.as_dict().unwrap().iter().collect());
            let mut combined = Vec::with_capacity(pairs.len());
            for (k, v) in &pairs {
                let kh = current_hash(k)?;
                let vh = current_hash(v)?;
                combined.push(kh ^ vh.wrapping_mul(0x1000193));
            }
            Ok(hash_unordered(combined.into_iter()))
        }
        Tag::Exception => Ok(normalize(x.exc_id().unwrap() as i64)),
        Tag::Type => Ok(x.with_payload(|p| match p {
            Payload::TypeRef(t) => normalize(*t as i64),
            _ => 0,
        })),
        Tag::Iterator => Err(singleton(ExcKind::TypeError)),
        Tag::Invalidated | Tag::InvalidatedMutable => unreachable!("handled above"),
    }
}

/// `hash(x)`: memoized, and refuses mutable tags.
pub fn hash(x: &Obj) -> Result<i64, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    if x.is_mutable() {
        return Err(singleton(ExcKind::TypeError));
    }
    if let Some(h) = x.cached_hash() {
        return Ok(h);
    }
    let h = current_hash(x)?;
    x.set_cached_hash(h);
    Ok(h)
}

/// Structural equality: same tag-pair family required (a `list` and a
/// `tuple` of the same elements compare equal; a `bytes` and a `str`
/// never do), then elementwise/recursive comparison.
pub fn eq(a: &Obj, b: &Obj) -> Result<bool, Obj> {
    if a.is_invalidated() || b.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    if Obj::ptr_eq(a, b) {
        return Ok(true);
    }
    let (ta, tb) = (a.tag().immutable_pair(), b.tag().immutable_pair());
    if ta != tb {
        return Ok(false);
    }
    match ta {
        Tag::Nil => Ok(true),
        Tag::Bool => Ok(a.with_payload(|p| p.as_bool()) == b.with_payload(|p| p.as_bool())),
        Tag::Int => Ok(a.with_payload(|p| p.as_int()) == b.with_payload(|p| p.as_int())),
        Tag::Float => {
            let (fa, fb) = (
                a.with_payload(|p| p.as_float().unwrap()),
                b.with_payload(|p| p.as_float().unwrap()),
            );
            Ok(fa == fb)
        }
        Tag::Bytes => Ok(a.with_payload(|p| p.as_bytes().unwrap().to_vec())
            == b.with_payload(|p| p.as_bytes().unwrap().to_vec())),
        Tag::Str => Ok(a.with_payload(|p| p.as_text().unwrap().to_string())
            == b.with_payload(|p| p.as_text().unwrap().to_string())),
        Tag::Tuple => {
            let _guard = DepthGuard::enter()?;
            let (sa, sb) = (
                a.with_payload(|p| p.as_sequence().unwrap().to_vec()),
                b.with_payload(|p| p.as_sequence().unwrap().to_vec()),
            );
            if sa.len() != sb.len() {
                return Ok(false);
            }
            for (x, y) in sa.iter().zip(sb.iter()) {
                if !eq(x, y)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Tag::FrozenSet => {
            let _guard = DepthGuard::enter()?;
            let (na, nb) = (
                a.with_payload(|p| p.as_set().unwrap().active_count()),
                b.with_payload(|p| p.as_set().unwrap().active_count()),
            );
            if na != nb {
                return Ok(false);
            }
            let items: Vec<(i64, Obj)> =
                a.with_payload(|p| p.as_set().unwrap().iter().map(|(h, k)| (h, k.clone())).collect());
            for (h, k) in items {
                if !set_contains(b, h, &k)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Tag::FrozenDict => {
            let _guard = DepthGuard::enter()?;
            let (na, nb) = (
                a.with_payload(|p| p.as_dict().unwrap().len()),
                b.with_payload(|p| p.as_dict().unwrap().len()),
            );
            if na != nb {
                return Ok(false);
            }
            let pairs: Vec<(Obj, Obj)> = a.with_payload(|p| p.as_dict().unwrap().iter().collect());
            for (k, v) in pairs {
                let kh = current_hash(&k)?;
                let other_v = b.with_payload(|p| {
                    let d = p.as_dict().unwrap();
                    d.get(kh, &k, &obj_eq_fn())
                })?;
                match other_v {
                    Some(ov) => {
                        if !eq(&v, &ov)? {
                            return Ok(false);
                        }
                    }
                    None => return Ok(false),
                }
            }
            Ok(true)
        }
        Tag::Exception => Ok(a.exc_id() == b.exc_id()),
        Tag::Type => {
            let ta = a.with_payload(|p| match p {
                Payload::TypeRef(t) => *t,
                _ => unreachable!("Tag::Type object without a TypeRef payload"),
            });
            let tb = b.with_payload(|p| match p {
                Payload::TypeRef(t) => *t,
                _ => unreachable!("Tag::Type object without a TypeRef payload"),
            });
            Ok(ta == tb)
        }
        Tag::Iterator => Ok(false),
        Tag::Invalidated | Tag::InvalidatedMutable => unreachable!("handled above"),
        Tag::IntStore
        | Tag::FloatStore
        | Tag::ByteArray
        | Tag::ChrArray
        | Tag::List
        | Tag::Set
        | Tag::Dict => unreachable!("immutable_pair() never yields a mutable tag"),
    }
}

fn set_contains(set_obj: &Obj, h: i64, key: &Obj) -> Result<bool, Obj> {
    let eqf = obj_eq_fn();
    set_obj.with_payload(|p| {
        let ks = p.as_set().unwrap();
        match ks.probe(h, key, &eqf)? {
            crate::hashtable::Probe::Found(_) => Ok(true),
            crate::hashtable::Probe::Insert(_) => Ok(false),
        }
    })
}

/// An `eq`-backed closure suitable for passing to the hashtable engine,
/// which is deliberately ignorant of the type system above it.
pub fn obj_eq_fn() -> impl Fn(&Obj, &Obj) -> Result<bool, Obj> {
    |a: &Obj, b: &Obj| eq(a, b)
}

/// Total ordering for the handful of tag families that support `<`/`<=`
/// (numbers, bytes, str, and lexicographic tuple/list comparison). Sets
/// and mappings are only ever partially ordered (subset/superset), which
/// is handled separately in their own modules rather than forced through
/// this function.
pub fn compare(a: &Obj, b: &Obj) -> Result<std::cmp::Ordering, Obj> {
    use std::cmp::Ordering;

    if a.is_invalidated() || b.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }

    let (ta, tb) = (a.tag().immutable_pair(), b.tag().immutable_pair());

    // int/float are mutually comparable; everything else must share a
    // tag-pair family.
    let numeric = |t: Tag| matches!(t, Tag::Int | Tag::Float);
    if numeric(ta) && numeric(tb) {
        let fa = a.with_payload(|p| p.as_int().map(|i| i as f64).or_else(|| p.as_float()).unwrap());
        let fb = b.with_payload(|p| p.as_int().map(|i| i as f64).or_else(|| p.as_float()).unwrap());
        return fa.partial_cmp(&fb).ok_or_else(|| singleton(ExcKind::ValueError));
    }

    if ta != tb {
        return Err(singleton(ExcKind::TypeError));
    }

    match ta {
        Tag::Bytes => Ok(a
            .with_payload(|p| p.as_bytes().unwrap().to_vec())
            .cmp(&b.with_payload(|p| p.as_bytes().unwrap().to_vec()))),
        Tag::Str => Ok(a
            .with_payload(|p| p.as_text().unwrap().to_string())
            .cmp(&b.with_payload(|p| p.as_text().unwrap().to_string()))),
        Tag::Tuple => {
            let _guard = DepthGuard::enter()?;
            let (sa, sb) = (
                a.with_payload(|p| p.as_sequence().unwrap().to_vec()),
                b.with_payload(|p| p.as_sequence().unwrap().to_vec()),
            );
            for (x, y) in sa.iter().zip(sb.iter()) {
                match compare(x, y)? {
                    Ordering::Equal => continue,
                    other => return Ok(other),
                }
            }
            Ok(sa.len().cmp(&sb.len()))
        }
        _ => Err(singleton(ExcKind::TypeError)),
    }
}
