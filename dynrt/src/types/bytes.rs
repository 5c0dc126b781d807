//! Bytes Module - `bytes`/`bytearray`
//!
//! Backed by a plain `Vec<u8>`. The pluggable [`crate::allocator`] backend
//! configured at [`crate::runtime::initialize`] governs the process-wide
//! raw-buffer primitive; `Vec<u8>`'s own growth (doubling, amortized O(1)
//! push) is the idiomatic Rust expression of the same "over-allocate and
//! report actual usable size" policy, so bytearray leans on it directly
//! instead of re-implementing a manual grow-in-place dance over raw
//! pointers.

use crate::exception::{singleton, ExcKind};
use crate::object::{Obj, Payload, Tag};

pub fn new_bytes(data: Vec<u8>) -> Obj {
    Obj::new(Tag::Bytes, Payload::Bytes(data))
}

pub fn new_bytearray(data: Vec<u8>) -> Obj {
    Obj::new(Tag::ByteArray, Payload::Bytes(data))
}

/// `bytes_from_bytes(data)`: the buffer-constructor name for
/// [`new_bytes`] — a raw byte buffer needs no decoding step, so this is a
/// plain alias rather than a second code path.
pub fn bytes_from_bytes(data: &[u8]) -> Obj {
    new_bytes(data.to_vec())
}

/// `bytearray_from_bytes(data)`: alias for [`new_bytearray`], see
/// [`bytes_from_bytes`].
pub fn bytearray_from_bytes(data: &[u8]) -> Obj {
    new_bytearray(data.to_vec())
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
    x.with_payload(|p| p.as_bytes().map(|b| b.len()))
        .ok_or_else(|| singleton(ExcKind::TypeError))
}

pub fn truthy(x: &Obj) -> Result<bool, Obj> {
    Ok(len(x)? != 0)
}

pub fn get_byte(x: &Obj, index: i64) -> Result<u8, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    x.with_payload(|p| {
        let bytes = p.as_bytes().ok_or_else(|| singleton(ExcKind::TypeError))?;
        let idx = normalize_index(index, bytes.len()).ok_or_else(|| singleton(ExcKind::IndexError))?;
        Ok(bytes[idx])
    })
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

/// `bytearray.push(b)`: append a single byte.
pub fn push(x: &Obj, byte: u8) -> Result<(), Obj> {
    require_mutable(x)?;
    let old_cap = x.with_payload_mut(|p| p.as_bytes_mut().unwrap().capacity());
    x.with_payload_mut(|p| p.as_bytes_mut().unwrap().push(byte));
    x.clear_cached_hash();
    let new_cap = x.with_payload_mut(|p| p.as_bytes_mut().unwrap().capacity());
    if new_cap > old_cap {
        log::debug!("bytearray buffer grew {old_cap} -> {new_cap}");
        crate::logging::global().log(crate::logging::RuntimeEvent::BufferGrowth {
            tag: "bytearray".to_string(),
            old_capacity: old_cap,
            new_capacity: new_cap,
        });
    }
    Ok(())
}

pub fn extend(x: &Obj, other: &[u8]) -> Result<(), Obj> {
    require_mutable(x)?;
    x.with_payload_mut(|p| p.as_bytes_mut().unwrap().extend_from_slice(other));
    x.clear_cached_hash();
    Ok(())
}

/// `value in x`: true when `value` is a length-1 bytes/bytearray whose
/// single byte occurs anywhere in `x` — membership tests a single byte,
/// not a substring.
pub fn contains(x: &Obj, value: &Obj) -> Result<bool, Obj> {
    if x.is_invalidated() || value.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    let haystack = x.with_payload(|p| p.as_bytes().map(|b| b.to_vec()));
    let Some(haystack) = haystack else { return Err(singleton(ExcKind::TypeError)) };
    let needle = value.with_payload(|p| p.as_bytes().map(|b| b.to_vec()));
    let Some(needle) = needle else { return Err(singleton(ExcKind::TypeError)) };
    if needle.len() != 1 {
        return Err(singleton(ExcKind::TypeError));
    }
    Ok(haystack.contains(&needle[0]))
}

pub fn concat(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    if a.is_invalidated() || b.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    let mut out = a
        .with_payload(|p| p.as_bytes().map(|v| v.to_vec()))
        .ok_or_else(|| singleton(ExcKind::TypeError))?;
    let rhs = b
        .with_payload(|p| p.as_bytes().map(|v| v.to_vec()))
        .ok_or_else(|| singleton(ExcKind::TypeError))?;
    out.extend(rhs);
    Ok(Obj::new(a.tag(), Payload::Bytes(out)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_extends_and_invalidates_cached_hash() {
        let b = new_bytearray(vec![1, 2, 3]);
        crate::hash::hash(&crate::object::Obj::new(Tag::Bytes, Payload::Bytes(vec![1])))
            .unwrap();
        push(&b, 4).unwrap();
        assert_eq!(len(&b).unwrap(), 4);
        assert_eq!(get_byte(&b, -1).unwrap(), 4);
    }

    #[test]
    fn test_push_on_immutable_bytes_errors() {
        let b = new_bytes(vec![1]);
        assert!(push(&b, 2).is_err());
    }

    #[test]
    fn test_negative_index_and_out_of_range() {
        let b = new_bytes(vec![10, 20, 30]);
        assert_eq!(get_byte(&b, -1).unwrap(), 30);
        assert!(get_byte(&b, 5).is_err());
    }

    #[test]
    fn test_contains_checks_single_byte_membership() {
        let b = new_bytes(vec![10, 20, 30]);
        assert!(contains(&b, &new_bytes(vec![20])).unwrap());
        assert!(!contains(&b, &new_bytes(vec![99])).unwrap());
        assert!(contains(&b, &new_bytes(vec![1, 2])).is_err());
    }
}
