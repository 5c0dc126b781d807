//! Logging Module - structured runtime events
//!
//! Two logging paths coexist: ad hoc `log::debug!`/
//! `log::trace!` calls scattered through the hot paths (hashtable probing,
//! container growth) for whoever already has an env_logger/tracing
//! subscriber wired up, plus this dedicated [`RuntimeLogger`] for the
//! handful of structured events worth recording as data rather than text —
//! allocation growth, freeze/invalidate transitions, hashtable resizes,
//! and recursion-limit trips.
//!
//! Log Levels:
//! - ERROR: operations that raised an exception
//! - WARN: unusual but non-fatal conditions (e.g. growth past a large
//!   size threshold)
//! - INFO: lifecycle transitions (freeze, invalidate)
//! - DEBUG: container growth and hashtable resize
//! - TRACE: per-probe detail

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

/// A structured runtime event worth recording as data rather than text.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "event")]
pub enum RuntimeEvent {
    /// A variable-container buffer grew past its current allocation.
    BufferGrowth {
        tag: String,
        old_capacity: usize,
        new_capacity: usize,
    },

    /// `freeze`/`deep_freeze` transitioned an object to its immutable tag.
    Freeze { tag: String, deep: bool },

    /// `invalidate`/`deep_invalidate` transitioned an object to the
    /// invalidated tag.
    Invalidate { tag: String, deep: bool },

    /// A set/dict keyset resized.
    HashtableResize {
        old_capacity: usize,
        new_capacity: usize,
        active: usize,
    },

    /// A hash/compare/deep-copy traversal exceeded `recursion_limit`.
    RecursionLimitExceeded { limit: usize },
}

#[derive(Debug, Clone)]
pub struct RuntimeLoggerConfig {
    pub level: LogLevel,
    pub console: bool,
    pub json: bool,
    pub timestamps: bool,
}

impl Default for RuntimeLoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            console: true,
            json: false,
            timestamps: true,
        }
    }
}

/// Centralized sink for [`RuntimeEvent`]s. A default-configured instance is
/// always available via [`global`] (mirroring `crate::runtime`'s
/// "every accessor falls back to a sane default" convention); a caller who
/// wants different filtering or a JSON sink calls [`install`] once.
pub struct RuntimeLogger {
    config: RuntimeLoggerConfig,
    events: Mutex<Vec<(Instant, RuntimeEvent)>>,
    enabled: AtomicBool,
}

impl RuntimeLogger {
    pub fn new(config: RuntimeLoggerConfig) -> Self {
        Self {
            config,
            events: Mutex::new(Vec::new()),
            enabled: AtomicBool::new(true),
        }
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn log(&self, event: RuntimeEvent) {
        if !self.is_enabled() {
            return;
        }
        if self.event_level(&event) > self.config.level {
            return;
        }

        if let Ok(mut events) = self.events.lock() {
            events.push((Instant::now(), event.clone()));
        }

        if self.config.console {
            self.output_console(&event);
        }
    }

    pub fn recorded_events(&self) -> Vec<RuntimeEvent> {
        self.events
            .lock()
            .map(|e| e.iter().map(|(_, ev)| ev.clone()).collect())
            .unwrap_or_default()
    }

    fn event_level(&self, event: &RuntimeEvent) -> LogLevel {
        match event {
            RuntimeEvent::RecursionLimitExceeded { .. } => LogLevel::Warn,
            RuntimeEvent::Freeze { .. } | RuntimeEvent::Invalidate { .. } => LogLevel::Info,
            RuntimeEvent::BufferGrowth { .. } | RuntimeEvent::HashtableResize { .. } => {
                LogLevel::Debug
            }
        }
    }

    fn output_console(&self, event: &RuntimeEvent) {
        if self.config.timestamps {
            let now = chrono::Local::now();
            print!("[{}] ", now.format("%Y-%m-%d %H:%M:%S%.3f"));
        }

        if self.config.json {
            match serde_json::to_string(event) {
                Ok(s) => println!("{s}"),
                Err(e) => eprintln!("[dynrt] failed to serialize event: {e}"),
            }
            return;
        }

        match event {
            RuntimeEvent::BufferGrowth {
                tag,
                old_capacity,
                new_capacity,
            } => println!("[dynrt] {tag} buffer grew {old_capacity} -> {new_capacity} bytes"),
            RuntimeEvent::Freeze { tag, deep } => {
                println!("[dynrt] {tag} frozen (deep={deep})")
            }
            RuntimeEvent::Invalidate { tag, deep } => {
                println!("[dynrt] {tag} invalidated (deep={deep})")
            }
            RuntimeEvent::HashtableResize {
                old_capacity,
                new_capacity,
                active,
            } => println!(
                "[dynrt] hashtable resized {old_capacity} -> {new_capacity} ({active} active entries)"
            ),
            RuntimeEvent::RecursionLimitExceeded { limit } => {
                println!("[dynrt] recursion limit ({limit}) exceeded during traversal")
            }
        }
    }
}

impl Default for RuntimeLogger {
    fn default() -> Self {
        RuntimeLogger::new(RuntimeLoggerConfig::default())
    }
}

thread_local! {
    static GLOBAL: std::cell::RefCell<std::rc::Rc<RuntimeLogger>> =
        std::cell::RefCell::new(std::rc::Rc::new(RuntimeLogger::default()));
}

/// Replace the thread's global logger (e.g. to raise the level or switch
/// to the JSON sink). Takes effect for every `log()` call made through
/// [`global`] from then on, on this thread.
pub fn install(logger: RuntimeLogger) {
    GLOBAL.with(|g| *g.borrow_mut() = std::rc::Rc::new(logger));
}

/// The thread's current logger, default-configured until [`install`] is
/// called. This is what every call site in `lifecycle`, `hashtable`, and
/// `hash` logs through — no caller needs to thread a logger handle through
/// the object model's operations.
pub fn global() -> std::rc::Rc<RuntimeLogger> {
    GLOBAL.with(|g| std::rc::Rc::clone(&g.borrow()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_logger_drops_events() {
        let logger = RuntimeLogger::new(RuntimeLoggerConfig {
            console: false,
            ..Default::default()
        });
        logger.disable();
        logger.log(RuntimeEvent::Freeze {
            tag: "list".into(),
            deep: false,
        });
        assert!(logger.recorded_events().is_empty());
    }

    #[test]
    fn test_level_filtering_drops_low_priority_events() {
        let logger = RuntimeLogger::new(RuntimeLoggerConfig {
            level: LogLevel::Warn,
            console: false,
            ..Default::default()
        });
        logger.log(RuntimeEvent::HashtableResize {
            old_capacity: 8,
            new_capacity: 16,
            active: 6,
        });
        assert!(logger.recorded_events().is_empty());

        logger.log(RuntimeEvent::RecursionLimitExceeded { limit: 1000 });
        assert_eq!(logger.recorded_events().len(), 1);
    }

    #[test]
    fn test_install_replaces_the_thread_global() {
        install(RuntimeLogger::new(RuntimeLoggerConfig {
            console: false,
            ..Default::default()
        }));
        global().log(RuntimeEvent::HashtableResize {
            old_capacity: 8,
            new_capacity: 16,
            active: 6,
        });
        assert_eq!(global().recorded_events().len(), 1);
    }
}
