//! Runtime Module - process-wide (well, thread-wide) configuration
//!
//! The runtime has exactly one piece of global state: the [`RuntimeConfig`]
//! handed to [`initialize`]. It is stored behind a `thread_local!`, not a
//! `static` guarded by a `Mutex`/`OnceLock` — this crate is deliberately
//! `!Send + !Sync` (see `crate::object::Obj`'s lack of those impls), so
//! there is no concurrent access to synchronize against, and a plain
//! `RefCell` says that honestly instead of paying for atomics nobody needs.
//!
//! Calling `initialize` is optional: every accessor below falls back to
//! the same defaults [`crate::config::RuntimeConfig::default`] would give,
//! so a caller who never touches configuration still gets a working
//! runtime with sane defaults.

pub mod init;

pub use init::initialize;

use std::cell::RefCell;
use std::rc::Rc;

use crate::allocator::RawAllocator;
use crate::config::RuntimeConfig;

thread_local! {
    static STATE: RefCell<Option<RuntimeConfig>> = const { RefCell::new(None) };
}

pub(crate) fn set_config(config: RuntimeConfig) {
    STATE.with(|s| *s.borrow_mut() = Some(config));
}

pub(crate) fn current_config_matches(config: &RuntimeConfig) -> bool {
    STATE.with(|s| match s.borrow().as_ref() {
        None => true,
        Some(existing) => {
            existing.ideal_alloc_size == config.ideal_alloc_size
                && existing.recursion_limit == config.recursion_limit
        }
    })
}

pub(crate) fn is_initialized() -> bool {
    STATE.with(|s| s.borrow().is_some())
}

/// Max traversal depth for hash/compare/deep-copy/deep-freeze. Falls back
/// to [`crate::config::DEFAULT_RECURSION_LIMIT`] if `initialize` was never
/// called.
pub fn recursion_limit() -> usize {
    STATE.with(|s| {
        s.borrow()
            .as_ref()
            .map(|c| c.recursion_limit)
            .unwrap_or(crate::config::DEFAULT_RECURSION_LIMIT)
    })
}

/// Preferred inline-buffer size and hashtable sizing floor. Falls back to
/// [`crate::config::DEFAULT_IDEAL_ALLOC_SIZE`] if `initialize` was never
/// called.
pub fn ideal_alloc_size() -> usize {
    STATE.with(|s| {
        s.borrow()
            .as_ref()
            .map(|c| c.ideal_alloc_size)
            .unwrap_or(crate::config::DEFAULT_IDEAL_ALLOC_SIZE)
    })
}

/// The configured raw allocator, or a fresh
/// [`crate::allocator::SystemAllocator`] if `initialize` was never called.
pub fn allocator() -> Rc<dyn RawAllocator> {
    STATE.with(|s| {
        s.borrow()
            .as_ref()
            .map(|c| Rc::clone(&c.allocator))
            .unwrap_or_else(|| Rc::new(crate::allocator::SystemAllocator))
    })
}
