//! Configuration Module - `initialize()` parameters
//!
//! Manages the small set of options the runtime accepts at startup: the
//! pluggable allocator, the inline-buffer sizing hint, and the recursion
//! depth guard used by hash/compare/deep-copy traversal.

use crate::allocator::RawAllocator;
use crate::error::{Result, RuntimeInitError};
use std::rc::Rc;

/// Smallest capacity a hashtable is ever created at (§hashtable engine).
/// `ideal_alloc_size` must be large enough to back one of these.
pub const MIN_HASHTABLE_CAPACITY: usize = 8;

/// Lower bound on `recursion_limit`: a traversal needs at least this much
/// depth to do anything useful (e.g. a 1-level nested tuple).
pub const MIN_RECURSION_LIMIT: usize = 2;

/// Default recursion depth for hash/compare/deep-copy/deep-freeze traversal.
pub const DEFAULT_RECURSION_LIMIT: usize = 1_000;

/// Default inline-buffer sizing hint, in bytes.
///
/// A pointer-width-dependent default (128 or 256 bytes) would save a few
/// bytes on 32-bit targets at the cost of a per-platform constant; this
/// fixes 128 bytes on every platform and lets callers override it.
pub const DEFAULT_IDEAL_ALLOC_SIZE: usize = 128;

/// Startup configuration accepted by [`crate::runtime::initialize`].
///
/// A plain data struct with a sensible [`Default`] and a
/// [`RuntimeConfig::validate`] that never panics on bad input.
///
/// # Examples
///
/// ```
/// use dynrt::config::RuntimeConfig;
///
/// let config = RuntimeConfig::default();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct RuntimeConfig {
    /// Backend used for every variable-container byte buffer (bytes,
    /// bytearray, str, chrarray). Defaults to the system allocator.
    pub allocator: Rc<dyn RawAllocator>,

    /// Preferred object footprint used to size inline buffers; also the
    /// floor new hashtables round up from. Must be at least
    /// [`MIN_HASHTABLE_CAPACITY`] entries' worth of storage.
    pub ideal_alloc_size: usize,

    /// Max depth for hash, comparison, and deep-copy/deep-freeze traversal.
    /// Exceeding it yields `RecursionLimitError`.
    pub recursion_limit: usize,
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("allocator", &"<dyn RawAllocator>")
            .field("ideal_alloc_size", &self.ideal_alloc_size)
            .field("recursion_limit", &self.recursion_limit)
            .finish()
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            allocator: Rc::new(crate::allocator::SystemAllocator),
            ideal_alloc_size: DEFAULT_IDEAL_ALLOC_SIZE,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl RuntimeConfig {
    /// Validate the configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use dynrt::config::RuntimeConfig;
    ///
    /// let config = RuntimeConfig {
    ///     recursion_limit: 0,
    ///     ..Default::default()
    /// };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let min_bytes = MIN_HASHTABLE_CAPACITY * std::mem::size_of::<u64>() * 2;
        if self.ideal_alloc_size < min_bytes {
            return Err(RuntimeInitError::IdealAllocTooSmall {
                min: min_bytes,
                got: self.ideal_alloc_size,
            });
        }

        if self.recursion_limit < MIN_RECURSION_LIMIT {
            return Err(RuntimeInitError::RecursionLimitTooSmall {
                min: MIN_RECURSION_LIMIT,
                got: self.recursion_limit,
            });
        }

        Ok(())
    }
}
