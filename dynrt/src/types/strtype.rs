//! Str Module - `str`/`chrarray`
//!
//! Backed by a Rust `String` (always well-formed UTF-8). Single-character
//! Latin-1 strings are interned as immortal singletons the same way small
//! integers are interned in many managed runtimes: a table of the 256
//! one-character "latin-1" immortals, cheap to keep around since `str` is
//! immutable.

use crate::exception::{singleton, ExcKind};
use crate::object::{Obj, Payload, Tag};

const INTERNED_COUNT: usize = 256;

thread_local! {
    static INTERNED_CHARS: [Obj; INTERNED_COUNT] = std::array::from_fn(|i| {
        let ch = char::from_u32(i as u32).unwrap_or('\u{FFFD}');
        Obj::new_immortal(Tag::Str, Payload::Text(ch.to_string()))
    });
}

pub fn new_str(s: String) -> Obj {
    if s.chars().count() == 1 {
        if let Some(c) = s.chars().next() {
            if (c as u32) < INTERNED_COUNT as u32 {
                return INTERNED_CHARS.with(|chars| chars[c as usize].clone());
            }
        }
    }
    Obj::new(Tag::Str, Payload::Text(s))
}

pub fn new_chrarray(s: String) -> Obj {
    Obj::new(Tag::ChrArray, Payload::Text(s))
}

/// `chr_from_codepoint(codepoint)`: the one-character `str` naming that
/// Unicode scalar value. Negative values, values above `0x10FFFF`, and
/// surrogate-range values (`0xD800..=0xDFFF`, which are not scalar values)
/// all raise `ValueError` rather than producing a replacement character.
pub fn chr_from_codepoint(codepoint: i64) -> Result<Obj, Obj> {
    let cp = u32::try_from(codepoint).map_err(|_| singleton(ExcKind::ValueError))?;
    let ch = char::from_u32(cp).ok_or_else(|| singleton(ExcKind::ValueError))?;
    Ok(new_str(ch.to_string()))
}

/// The encodings `str_from_bytes(encoding)` / `chrarray_from_bytes(encoding)`
/// parameterize over. This runtime implements only the two encodings it
/// needs to host its own tests and `chr_from_codepoint`'s Latin-1 interning
/// table, rather than a full codec registry.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Encoding {
    Utf8,
    Latin1,
}

fn decode(data: &[u8], encoding: Encoding) -> Result<String, Obj> {
    match encoding {
        Encoding::Utf8 => {
            std::str::from_utf8(data).map(|s| s.to_string()).map_err(|_| singleton(ExcKind::UnicodeError))
        }
        Encoding::Latin1 => Ok(data.iter().map(|&b| b as char).collect()),
    }
}

/// `str_from_bytes(data, encoding)`.
pub fn str_from_bytes(data: &[u8], encoding: Encoding) -> Result<Obj, Obj> {
    Ok(new_str(decode(data, encoding)?))
}

/// `chrarray_from_bytes(data, encoding)`.
pub fn chrarray_from_bytes(data: &[u8], encoding: Encoding) -> Result<Obj, Obj> {
    Ok(new_chrarray(decode(data, encoding)?))
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
    x.with_payload(|p| p.as_text().map(|s| s.chars().count()))
        .ok_or_else(|| singleton(ExcKind::TypeError))
}

pub fn truthy(x: &Obj) -> Result<bool, Obj> {
    Ok(len(x)? != 0)
}

pub fn concat(a: &Obj, b: &Obj) -> Result<Obj, Obj> {
    if a.is_invalidated() || b.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    let mut out = a
        .with_payload(|p| p.as_text().map(|s| s.to_string()))
        .ok_or_else(|| singleton(ExcKind::TypeError))?;
    let rhs = b
        .with_payload(|p| p.as_text().map(|s| s.to_string()))
        .ok_or_else(|| singleton(ExcKind::TypeError))?;
    out.push_str(&rhs);
    Ok(Obj::new(a.tag(), Payload::Text(out)))
}

/// `value in x`: true when `value` is a single-character string occurring
/// anywhere in `x`, or the empty string (vacuously contained in anything).
pub fn contains(x: &Obj, value: &Obj) -> Result<bool, Obj> {
    if x.is_invalidated() || value.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    let haystack = x
        .with_payload(|p| p.as_text().map(|s| s.to_string()))
        .ok_or_else(|| singleton(ExcKind::TypeError))?;
    let needle = value
        .with_payload(|p| p.as_text().map(|s| s.to_string()))
        .ok_or_else(|| singleton(ExcKind::TypeError))?;
    if needle.is_empty() {
        return Ok(true);
    }
    if needle.chars().count() != 1 {
        return Err(singleton(ExcKind::TypeError));
    }
    Ok(haystack.contains(&needle))
}

/// One-character-as-`str` indexing, the element type `str`/`chrarray`
/// iteration and `getitem` both need.
pub fn char_at(x: &Obj, index: i64) -> Result<Obj, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    x.with_payload(|p| {
        let s = p.as_text().ok_or_else(|| singleton(ExcKind::TypeError))?;
        let chars: Vec<char> = s.chars().collect();
        let len = chars.len() as i64;
        let idx = if index < 0 { index + len } else { index };
        if idx < 0 || idx >= len {
            return Err(singleton(ExcKind::IndexError));
        }
        Ok(new_str(chars[idx as usize].to_string()))
    })
}

pub fn push_str(x: &Obj, s: &str) -> Result<(), Obj> {
    require_mutable(x)?;
    x.with_payload_mut(|p| p.as_text_mut().unwrap().push_str(s));
    x.clear_cached_hash();
    Ok(())
}

pub fn upper(x: &Obj) -> Result<Obj, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    let s = x
        .with_payload(|p| p.as_text().map(|s| s.to_uppercase()))
        .ok_or_else(|| singleton(ExcKind::TypeError))?;
    Ok(Obj::new(x.tag(), Payload::Text(s)))
}

pub fn lower(x: &Obj) -> Result<Obj, Obj> {
    if x.is_invalidated() {
        return Err(singleton(ExcKind::InvalidatedError));
    }
    let s = x
        .with_payload(|p| p.as_text().map(|s| s.to_lowercase()))
        .ok_or_else(|| singleton(ExcKind::TypeError))?;
    Ok(Obj::new(x.tag(), Payload::Text(s)))
}
