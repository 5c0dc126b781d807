//! Iterator Module - the generator object and its mini-iterator fast path
//!
//! Two representations share one `next` entry point:
//!
//! - A **mini-iterator**: plain index/cursor state over a sequence or
//!   hashtable already owned by another object. No allocation beyond the
//!   handle itself, and no closure indirection — just an index bump.
//! - A **full generator**: a boxed `FnMut` state machine, used for
//!   anything derived (`map`, `filter`, `chain`, `enumerate`-style
//!   wrapping) where the next value depends on pulling from an upstream
//!   iterator and possibly failing partway through.
//!
//! Exhaustion is reported as `StopIteration` (the same exception-as-handle
//! convention used everywhere else), not as a Rust `None` — so a caller
//! holding only the returned `Obj` can tell "exhausted" from "produced a
//! value" without a side channel.

use crate::exception::{singleton, ExcKind};
use crate::object::{Obj, Payload, Tag};

/// State backing an `Obj` tagged [`Tag::Iterator`].
pub enum GenState {
    /// Fast path over a tuple/list/bytes/str snapshot already referenced by
    /// `owner`. `index` is the next position to yield; `len` is fixed at
    /// iterator-construction time — growth or shrinkage of `owner`
    /// afterward does not retarget `len`.
    Sequence { owner: Obj, index: usize, len: usize },

    /// Fast path over a `bytes`/`bytearray` snapshot, yielding one-byte
    /// `bytes` objects the way iterating a `list`/`tuple` yields its
    /// elements directly (not Python 3's int-yielding `bytes.__iter__`).
    BytesSnapshot { data: Vec<u8>, index: usize },

    /// Fast path over a `str`/`chrarray` snapshot, yielding one-character
    /// `str` objects.
    TextSnapshot { chars: Vec<char>, index: usize },

    /// Fast path over a set/frozenset's keyset, walked by slot index so no
    /// separate key buffer is needed.
    SetKeys { owner: Obj, cursor: usize },

    /// Fast path over a dict/frozendict, yielding keys, values, or pairs.
    DictEntries {
        owner: Obj,
        cursor: usize,
        mode: DictIterMode,
    },

    /// A derived iterator: reads upstream via a boxed closure. Used for
    /// `map`/`filter`/`chain`/`reversed` composition and any caller-built
    /// iterator that does not correspond 1:1 to one underlying container.
    Adapter(Box<dyn FnMut() -> Result<Option<Obj>, Obj>>),

    /// Already exhausted; every subsequent call raises `StopIteration`.
    Exhausted,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum DictIterMode {
    Keys,
    Values,
    Items,
}

impl GenState {
    pub fn from_sequence_snapshot(owner: Obj) -> GenState {
        let len = owner.with_payload(|p| p.as_sequence().map(|s| s.len()).unwrap_or(0));
        GenState::Sequence { owner, index: 0, len }
    }

    pub fn from_bytes_snapshot(owner: &Obj) -> GenState {
        let data = owner.with_payload(|p| p.as_bytes().map(|b| b.to_vec()).unwrap_or_default());
        GenState::BytesSnapshot { data, index: 0 }
    }

    pub fn from_text_snapshot(owner: &Obj) -> GenState {
        let chars = owner.with_payload(|p| {
            p.as_text().map(|s| s.chars().collect()).unwrap_or_default()
        });
        GenState::TextSnapshot { chars, index: 0 }
    }

    pub fn from_set(owner: Obj) -> GenState {
        GenState::SetKeys { owner, cursor: 0 }
    }

    pub fn from_dict(owner: Obj, mode: DictIterMode) -> GenState {
        GenState::DictEntries { owner, cursor: 0, mode }
    }

    pub fn from_adapter(f: impl FnMut() -> Result<Option<Obj>, Obj> + 'static) -> GenState {
        GenState::Adapter(Box::new(f))
    }

    /// Pull the next value, or `Err(StopIteration)` once exhausted.
    pub fn next(&mut self) -> Result<Obj, Obj> {
        match self.advance()? {
            Some(v) => Ok(v),
            None => {
                *self = GenState::Exhausted;
                Err(singleton(ExcKind::StopIteration))
            }
        }
    }

    /// Like `next`, but reports exhaustion as `Ok(None)` instead of an
    /// exception — used internally by combinators that want to detect
    /// end-of-stream without paying for a handle construction, and by
    /// `dispatch::mini_iter_next` which already documents an "Ok(None) =
    /// stop" contract to its own callers.
    fn advance(&mut self) -> Result<Option<Obj>, Obj> {
        match self {
            GenState::Sequence { owner, index, len } => {
                if *index >= *len {
                    return Ok(None);
                }
                let item = owner.with_payload(|p| p.as_sequence().and_then(|s| s.get(*index).cloned()));
                *index += 1;
                Ok(item)
            }
            GenState::BytesSnapshot { data, index } => {
                if *index >= data.len() {
                    return Ok(None);
                }
                let b = data[*index];
                *index += 1;
                Ok(Some(Obj::new(Tag::Bytes, Payload::Bytes(vec![b]))))
            }
            GenState::TextSnapshot { chars, index } => {
                if *index >= chars.len() {
                    return Ok(None);
                }
                let c = chars[*index];
                *index += 1;
                Ok(Some(crate::types::strtype::new_str(c.to_string())))
            }
            GenState::SetKeys { owner, cursor } => owner.with_payload(|p| {
                let Some(ks) = p.as_set() else { return Ok(None) };
                let cap = ks.capacity();
                while *cursor < cap {
                    let idx = *cursor;
                    *cursor += 1;
                    if let Some((_, k)) = ks.get(idx) {
                        return Ok(Some(k.clone()));
                    }
                }
                Ok(None)
            }),
            GenState::DictEntries { owner, cursor, mode } => owner.with_payload(|p| {
                let Some(d) = p.as_dict() else { return Ok(None) };
                let ks = d.keys();
                let cap = ks.capacity();
                while *cursor < cap {
                    let idx = *cursor;
                    *cursor += 1;
                    if let Some((_, k)) = ks.get(idx) {
                        // An active keyset slot always has a paired value:
                        // `Dict::set`/`delete_key` keep the two in lockstep.
                        let v = d.value_at(idx).expect("active key without value").clone();
                        return Ok(Some(match mode {
                            DictIterMode::Keys => k.clone(),
                            DictIterMode::Values => v,
                            DictIterMode::Items => {
                                Obj::new(Tag::Tuple, Payload::Sequence(vec![k.clone(), v]))
                            }
                        }));
                    }
                }
                Ok(None)
            }),
            GenState::Adapter(f) => f(),
            GenState::Exhausted => Ok(None),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, GenState::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_iterator_snapshots_length_at_creation() {
        let seq = Obj::new(
            Tag::List,
            Payload::Sequence(vec![Obj::new_int(1), Obj::new_int(2)]),
        );
        let mut gen = GenState::from_sequence_snapshot(seq.clone());
        seq.with_payload_mut(|p| p.as_sequence_mut().unwrap().push(Obj::new_int(3)));
        assert!(gen.next().is_ok());
        assert!(gen.next().is_ok());
        // len was snapshotted at 2, so the appended third element is not
        // visible to this iterator.
        assert!(gen.next().is_err());
    }

    #[test]
    fn test_exhausted_iterator_keeps_raising_stop_iteration() {
        let seq = Obj::new(Tag::Tuple, Payload::Sequence(vec![]));
        let mut gen = GenState::from_sequence_snapshot(seq);
        assert!(gen.next().is_err());
        assert!(gen.next().is_err());
    }

    #[test]
    fn test_adapter_iterator_can_fail_partway() {
        let mut n = 0;
        let mut gen = GenState::from_adapter(move || {
            n += 1;
            if n > 2 {
                Ok(None)
            } else {
                Ok(Some(Obj::new_int(n)))
            }
        });
        assert_eq!(gen.next().unwrap().with_payload(|p| p.as_int()), Some(1));
        assert_eq!(gen.next().unwrap().with_payload(|p| p.as_int()), Some(2));
        assert!(gen.next().is_err());
    }
}
