//! Logging switch for the whole crate.
//!
//! The console host owns the terminal while a session runs, it may mute the crate
//! logging without touching the global `log` filter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

static ENABLED: AtomicBool = AtomicBool::new(true);
static LOGGER_ONCE: Once = Once::new();

/// Log target for the controller internals.
pub const DEBUGGER_TARGET: &str = "debugger";
/// Log target for raw traffic between the controller and the debugger process.
pub const PROTOCOL_TARGET: &str = "protocol";

#[inline(always)]
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::SeqCst)
}

pub fn disable() {
    ENABLED.store(false, Ordering::SeqCst)
}

/// Install `env_logger` as a logging backend. Subsequent calls do nothing.
pub fn init() {
    LOGGER_ONCE.call_once(|| {
        env_logger::Builder::from_default_env()
            .format_timestamp_millis()
            .init();
    });
}

#[macro_export]
macro_rules! cs_info {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::log::is_enabled() {
            log::info!(target: $target, $($arg)+)
        }
    };
    ($($arg:tt)+) => {
        if $crate::log::is_enabled() {
            log::info!(target: $crate::log::DEBUGGER_TARGET, $($arg)+)
        }
    };
}

#[macro_export]
macro_rules! cs_warn {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::log::is_enabled() {
            log::warn!(target: $target, $($arg)+)
        }
    };
    ($($arg:tt)+) => {
        if $crate::log::is_enabled() {
            log::warn!(target: $crate::log::DEBUGGER_TARGET, $($arg)+)
        }
    };
}

#[macro_export]
macro_rules! cs_error {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::log::is_enabled() {
            log::error!(target: $target, $($arg)+)
        }
    };
    ($($arg:tt)+) => {
        if $crate::log::is_enabled() {
            log::error!(target: $crate::log::DEBUGGER_TARGET, $($arg)+)
        }
    };
}

#[macro_export]
macro_rules! cs_debug {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::log::is_enabled() {
            log::debug!(target: $target, $($arg)+)
        }
    };
    ($($arg:tt)+) => {
        if $crate::log::is_enabled() {
            log::debug!(target: $crate::log::DEBUGGER_TARGET, $($arg)+)
        }
    };
}
