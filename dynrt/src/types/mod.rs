//! Types Module - constructors and per-family operation suites
//!
//! One file per type family. Each file owns construction plus the
//! operations that make sense only for that family (`push`/`pop` for
//! sequences, `union`/`intersection` for sets, ...); operations that cut
//! across every tag (`len`, `bool`, `==`, iteration) live in
//! [`crate::dispatch`] instead, one match per operation, favoring the
//! closed-enum dispatch style over a vtable.

pub mod boolean;
pub mod bytes;
pub mod dict;
pub mod floating;
pub mod integer;
pub mod nil;
pub mod sequence;
pub mod set;
pub mod strtype;

pub use boolean::{from_bool, new_false, new_true};
pub use bytes::{new_bytearray, new_bytes};
pub use dict::{new_dict, new_frozendict};
pub use floating::{new_float, new_floatstore};
pub use integer::{new_int, new_intstore};
pub use nil::nil;
pub use sequence::{new_list, new_tuple};
pub use set::{new_frozenset, new_set};
pub use strtype::{chr_from_codepoint, new_chrarray, new_str};
