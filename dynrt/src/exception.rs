//! Exception Module - the immortal exception tree
//!
//! Exceptions are immortal objects forming a tree by `super` pointer.
//! Raising is by returning the exception handle; there is no payload, no
//! message, no stack trace — a closed, minimal taxonomy of singleton
//! handles rather than a boxed error type per call site.

use crate::object::{Obj, Payload, Tag};

/// A node in the exception tree: a name plus an optional parent.
pub struct ExcDef {
    pub name: &'static str,
    pub super_: Option<ExcId>,
}

/// Index into the static exception table. Stable for the process lifetime.
pub type ExcId = usize;

macro_rules! exc_table {
    ( $( $id:ident = $name:literal $(extends $parent:ident)? ),* $(,)? ) => {
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, PartialEq, Eq, Debug)]
        pub enum ExcKind { $( $id ),* }

        pub const EXC_COUNT: usize = exc_table!(@count $($id),*);

        impl ExcKind {
            pub fn id(self) -> ExcId {
                self as ExcId
            }

            pub fn def(self) -> &'static ExcDef {
                &EXC_DEFS[self.id()]
            }
        }

        lazy_static::lazy_static! {
            static ref EXC_DEFS: [ExcDef; EXC_COUNT] = [
                $( ExcDef { name: $name, super_: exc_table!(@parent $($parent)?) } ),*
            ];
        }
    };
    (@count) => { 0 };
    (@count $head:ident $(, $tail:ident)*) => { 1 + exc_table!(@count $($tail),*) };
    (@parent) => { None };
    (@parent $parent:ident) => { Some(ExcKind::$parent.id()) };
}

exc_table! {
    BaseException = "BaseException",
    Exception = "Exception" extends BaseException,

    TypeError = "TypeError" extends Exception,
    MethodError = "MethodError" extends TypeError,
    InvalidatedError = "InvalidatedError" extends TypeError,

    ValueError = "ValueError" extends Exception,
    UnicodeError = "UnicodeError" extends ValueError,

    LookupError = "LookupError" extends Exception,
    KeyError = "KeyError" extends LookupError,
    IndexError = "IndexError" extends LookupError,

    ArithmeticError = "ArithmeticError" extends Exception,
    OverflowError = "OverflowError" extends ArithmeticError,
    ZeroDivisionError = "ZeroDivisionError" extends ArithmeticError,
    FloatingPointError = "FloatingPointError" extends ArithmeticError,

    AttributeError = "AttributeError" extends Exception,

    MemoryError = "MemoryError" extends Exception,

    SystemError = "SystemError" extends Exception,
    SystemLimitationError = "SystemLimitationError" extends SystemError,

    RuntimeError = "RuntimeError" extends Exception,
    RecursionLimitError = "RecursionLimitError" extends RuntimeError,
    NotImplementedError = "NotImplementedError" extends RuntimeError,

    StopIteration = "StopIteration" extends Exception,
    GeneratorExit = "GeneratorExit" extends BaseException,
    KeyboardInterrupt = "KeyboardInterrupt" extends BaseException,
    SystemExit = "SystemExit" extends BaseException,

    // Internal only: must never be handed back to a caller. Enforced by
    // never constructing an `Obj` for it (see `singleton`'s panic below) —
    // `hash`/`dispatch` consume `ComparisonNotImplemented` as a plain
    // `ExcKind` value, not as a handle.
    ComparisonNotImplemented = "ComparisonNotImplemented" extends BaseException,
}

thread_local! {
    static SINGLETONS: [Obj; EXC_COUNT] = {
        std::array::from_fn(|i| Obj::new_immortal(Tag::Exception, Payload::Exception(i)))
    };
}

/// Fetch the immortal handle for an exception kind.
///
/// # Panics
/// Panics if asked for [`ExcKind::ComparisonNotImplemented`], which must
/// never escape to a caller.
pub fn singleton(kind: ExcKind) -> Obj {
    assert!(
        kind != ExcKind::ComparisonNotImplemented,
        "ComparisonNotImplemented must never escape the comparison dispatcher"
    );
    SINGLETONS.with(|s| s[kind.id()].clone())
}

/// `is_exception(x)`: a type-tag check.
pub fn is_exception(x: &Obj) -> bool {
    x.tag() == Tag::Exception
}

/// `is_exception_of(x, e)`: walk `x`'s `super` chain looking for `e`.
pub fn is_exception_of(x: &Obj, e: ExcKind) -> bool {
    let Some(mut cur) = x.exc_id() else {
        return false;
    };
    loop {
        if cur == e.id() {
            return true;
        }
        match EXC_DEFS[cur].super_ {
            Some(parent) => cur = parent,
            None => return false,
        }
    }
}

/// `is_exception_of_any(x, [e1, e2, ...])`.
pub fn is_exception_of_any(x: &Obj, kinds: &[ExcKind]) -> bool {
    kinds.iter().any(|k| is_exception_of(x, *k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidated_error_is_a_type_error() {
        let e = singleton(ExcKind::InvalidatedError);
        assert!(is_exception(&e));
        assert!(is_exception_of(&e, ExcKind::TypeError));
        assert!(is_exception_of(&e, ExcKind::Exception));
        assert!(!is_exception_of(&e, ExcKind::ValueError));
    }

    #[test]
    fn test_singletons_are_immortal() {
        let e1 = singleton(ExcKind::KeyError);
        let e2 = singleton(ExcKind::KeyError);
        drop(e1);
        drop(e2);
        // Still retrievable: the base table keeps its own permanent clone.
        let e3 = singleton(ExcKind::KeyError);
        assert!(is_exception_of(&e3, ExcKind::LookupError));
    }

    #[test]
    #[should_panic]
    fn test_comparison_not_implemented_is_unreachable_to_callers() {
        let _ = singleton(ExcKind::ComparisonNotImplemented);
    }
}
