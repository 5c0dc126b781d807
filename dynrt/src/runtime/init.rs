//! Entry point: `initialize(config)`
//!
//! Idempotent by design: a second call with an equivalent configuration
//! is a harmless no-op, but
//! a second call that tries to change the allocator or the sizing knobs is
//! rejected outright rather than silently ignored.

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeInitError};

/// Configure the runtime. Optional: every module falls back to
/// [`RuntimeConfig::default`] on its own, so this only needs calling when a
/// caller wants non-default sizing, recursion depth, or allocator.
///
/// # Examples
///
/// ```
/// use dynrt::config::RuntimeConfig;
/// use dynrt::runtime;
///
/// runtime::initialize(RuntimeConfig::default()).unwrap();
/// // Calling again with an equivalent config is fine.
/// runtime::initialize(RuntimeConfig::default()).unwrap();
/// ```
pub fn initialize(config: RuntimeConfig) -> Result<()> {
    config.validate()?;

    if super::is_initialized() {
        if super::current_config_matches(&config) {
            return Ok(());
        }
        return Err(RuntimeInitError::AlreadyInitialized);
    }

    super::set_config(config);
    Ok(())
}
