//! Nil Module - the single unit value
//!
//! `nil` is immortal and has no mutable counterpart; every call to
//! [`nil`] returns a clone of the same underlying handle.

use crate::object::{Obj, Payload, Tag};

thread_local! {
    static NIL: Obj = Obj::new_immortal(Tag::Nil, Payload::Nil);
}

/// The one `nil` value.
pub fn nil() -> Obj {
    NIL.with(|n| n.clone())
}
