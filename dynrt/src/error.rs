//! Pre-object-model error type.
//!
//! Everything the runtime can fail at *after* `initialize` has handed out the
//! first handle is represented as an exception object (see
//! [`crate::exception`]) and returned as a handle, per the runtime's
//! error-handling contract. This module covers the narrow slice of failures
//! that can happen *before* any object exists: bad configuration, double
//! initialization with conflicting settings, and the like. These cannot be
//! exception handles because raising one requires the exception singleton
//! table to already be built.

use thiserror::Error;

/// Errors raised by [`crate::runtime::initialize`] and [`crate::config`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeInitError {
    #[error(
        "ideal_alloc_size must be at least {min} bytes to hold the minimum hashtable, got {got}"
    )]
    IdealAllocTooSmall { min: usize, got: usize },

    #[error("recursion_limit must be at least {min}, got {got}")]
    RecursionLimitTooSmall { min: usize, got: usize },

    #[error("initialize() was already called with a different configuration")]
    AlreadyInitialized,

    #[error("attempted to change the allocator after initialize() completed")]
    AllocatorChangeAfterInit,
}

/// Result type alias for runtime initialization.
pub type Result<T> = std::result::Result<T, RuntimeInitError>;
