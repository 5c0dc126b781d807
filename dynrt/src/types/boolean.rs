//! Boolean Module - `True`/`False`
//!
//! Both are immortal singletons; no mutable counterpart. `from_bool`
//! always returns one of the two preexisting handles rather than
//! allocating.

use crate::object::{Obj, Payload, Tag};

thread_local! {
    static TRUE: Obj = Obj::new_immortal(Tag::Bool, Payload::Bool(true));
    static FALSE: Obj = Obj::new_immortal(Tag::Bool, Payload::Bool(false));
}

pub fn new_true() -> Obj {
    TRUE.with(|t| t.clone())
}

pub fn new_false() -> Obj {
    FALSE.with(|f| f.clone())
}

pub fn from_bool(b: bool) -> Obj {
    if b {
        new_true()
    } else {
        new_false()
    }
}

/// `bool_from_c(b)`: alias for [`from_bool`].
pub fn bool_from_c(b: bool) -> Obj {
    from_bool(b)
}

pub fn value(x: &Obj) -> Option<bool> {
    if x.tag() != Tag::Bool {
        return None;
    }
    x.with_payload(|p| p.as_bool())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons_are_stable() {
        assert!(Obj::ptr_eq(&new_true(), &from_bool(true)));
        assert!(Obj::ptr_eq(&new_false(), &from_bool(false)));
        assert!(!Obj::ptr_eq(&new_true(), &new_false()));
    }
}
