//! # dynrt - an embeddable dynamic-object runtime
//!
//! `dynrt` is a small, embeddable object model in the spirit of CPython's
//! object layer: every value is a
//! reference-counted handle over one of a closed set of built-in types —
//! `nil`, `bool`, `int`, `float`, `bytes`, `str`, `tuple`, `list`, `set`,
//! `mapping`, `iterator`, `exception` — each available in an immutable and
//! (for every family except the handful with no mutable counterpart) a
//! paired mutable flavor sharing one payload representation.
//!
//! ## Quick Start
//!
//! ```
//! use dynrt::{dispatch, lifecycle, types};
//!
//! let list = types::new_list(vec![types::new_int(1), types::new_int(2)]);
//! dispatch::push(&list, types::new_int(3)).unwrap();
//! assert_eq!(dispatch::len(&list).unwrap(), 3);
//!
//! let frozen = lifecycle::frozen_copy(&list).unwrap();
//! assert!(dispatch::push(&frozen, types::new_int(4)).is_err());
//! ```
//!
//! ## Architecture
//!
//! Every object is an [`object::Obj`]: a cheap, `Clone`-able handle around a
//! reference-counted cell holding a [`object::Tag`] (which exact type, and
//! whether it is the mutable or immutable member of its pair) plus an
//! [`object::Payload`] (the actual data). There is no vtable and no trait
//! object anywhere in the object model — every cross-cutting operation
//! ([`dispatch`]) and every lifecycle transition ([`lifecycle`]) is a closed
//! `match` over `Tag`, the way an exhaustively-matched Rust enum expresses a
//! closed type set instead of reaching for `dyn Trait`.
//!
//! Errors are values, not panics: almost every fallible operation in this
//! crate returns `Result<T, Obj>`, where the `Err` case is itself an
//! immortal exception handle (see [`exception`]) rather than a distinct
//! Rust error type. The one place a distinct Rust error type survives is
//! startup configuration ([`error::RuntimeInitError`]), which can fail
//! before the exception singleton table even exists.
//!
//! ## Modules
//!
//! - [`object`]: the universal handle (`Obj`), its `Tag`, and `Payload`
//! - [`exception`]: the immortal exception tree and its predicates
//! - [`hash`]: the two-phase hash/equality/comparison protocol
//! - [`hashtable`]: the open-addressed engine shared by set and dict
//! - [`iterator`]: the generator/mini-iterator state machine
//! - [`lifecycle`]: `incref`/`decref`/`freeze`/`copy`/`invalidate` and their
//!   deep, recursive counterparts
//! - [`dispatch`]: the generic, polymorphic operation table (`len`, `bool`,
//!   comparisons, the container/sequence/mapping suites, iteration, the
//!   C-value conversions)
//! - [`types`]: one module per built-in type family, holding construction
//!   plus the operations that only make sense for that family
//! - [`config`], [`error`], [`runtime`]: startup configuration, its error
//!   type, and the process-wide (thread-wide) settings it produces
//! - [`allocator`]: the pluggable raw memory backend for variable-length
//!   buffers
//! - [`logging`]: structured runtime events, separate from the ad hoc
//!   `log::debug!`/`log::trace!` calls scattered through hot paths
//! - [`util`]: small shared helpers (alignment arithmetic)
//!
//! ## Safety
//!
//! This crate is deliberately `!Send + !Sync`: [`object::Obj`] wraps an
//! `Rc`, not an `Arc`, and [`runtime`]'s configuration lives behind a
//! `thread_local!`, not a `static` guarded by a lock. An embedder that needs
//! to share a runtime across threads is expected to confine one `dynrt`
//! object graph to one thread and communicate across threads by copying
//! values out (e.g. via `dispatch::as_int_c`) rather than sharing handles.
//!
//! ## Getting Help
//!
//! - [API Documentation](https://docs.rs/dynrt)
//! - [GitHub Issues](https://github.com/dynrt-lang/dynrt/issues)

pub mod object;
pub mod exception;
pub mod hash;
pub mod hashtable;
pub mod iterator;
pub mod lifecycle;
pub mod dispatch;
pub mod types;

pub mod allocator;
pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod util;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeInitError};
pub use exception::{is_exception, is_exception_of, is_exception_of_any, singleton, ExcKind};
pub use object::{Obj, Payload, Tag};

/// Runtime version string from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configure the runtime with defaults and return immediately usable.
///
/// Calling this is optional — every accessor in [`runtime`] falls back to
/// [`RuntimeConfig::default`] on its own — but doing it once up front
/// catches a misconfiguration (e.g. an `ideal_alloc_size` too small to back
/// even the minimum hashtable) at a predictable point instead of on first
/// use.
///
/// # Examples
///
/// ```
/// dynrt::init().unwrap();
/// ```
pub fn init() -> Result<()> {
    runtime::initialize(RuntimeConfig::default())
}

/// Configure the runtime with a caller-supplied configuration.
///
/// # Examples
///
/// ```
/// use dynrt::RuntimeConfig;
///
/// let config = RuntimeConfig {
///     recursion_limit: 200,
///     ..Default::default()
/// };
/// dynrt::init_with_config(config).unwrap();
/// ```
pub fn init_with_config(config: RuntimeConfig) -> Result<()> {
    runtime::initialize(config)
}
