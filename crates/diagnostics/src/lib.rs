// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Structured logging shared by the keyfs crates.
//!
//! Output is controlled by the `KEYFS_LOG` environment variable:
//! - `off` (default) - nothing is emitted
//! - `error`, `warn`, `info`, `debug` - minimum level written to stderr
//!
//! The macros forward to `emit`, so properties use emit's
//! `"template {key}", key: value` form.

use std::sync::Once;

// Re-export emit so the macros resolve from downstream crates
pub use emit;

/// Environment variable consulted by [`init`].
pub const LOG_ENV: &str = "KEYFS_LOG";

static INIT: Once = Once::new();

/// Minimum level accepted by the emitter, or `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Off,
    Error,
    Warn,
    Info,
    Debug,
}

impl Verbosity {
    /// Parse a `KEYFS_LOG` value. Unknown values yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "off" => Some(Verbosity::Off),
            "error" => Some(Verbosity::Error),
            "warn" => Some(Verbosity::Warn),
            "info" => Some(Verbosity::Info),
            "debug" => Some(Verbosity::Debug),
            _ => None,
        }
    }

    fn level(self) -> Option<emit::Level> {
        match self {
            Verbosity::Off => None,
            Verbosity::Error => Some(emit::Level::Error),
            Verbosity::Warn => Some(emit::Level::Warn),
            Verbosity::Info => Some(emit::Level::Info),
            Verbosity::Debug => Some(emit::Level::Debug),
        }
    }
}

/// Initialize diagnostics from `KEYFS_LOG`.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_diagnostics() {
    let raw = std::env::var(LOG_ENV).unwrap_or_default();
    let verbosity = match Verbosity::parse(&raw) {
        Some(verbosity) => verbosity,
        None => {
            // Bootstrap warning, the emitter is not configured yet
            eprintln!("Warning: Unknown {LOG_ENV} value '{raw}', using 'info'");
            Verbosity::Info
        }
    };
    init_with(verbosity);
}

/// Initialize diagnostics with an explicit verbosity (e.g. from a CLI flag).
pub fn init_with(verbosity: Verbosity) {
    INIT.call_once(|| {
        let Some(level) = verbosity.level() else {
            return;
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        // The emitter lives for the rest of the process
        std::mem::forget(rt);
    });
}

/// Log completed operations users may want to see in normal usage.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed steps useful while debugging.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable problems: repairs, rollbacks, fallbacks.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures that abort an operation.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

pub use init_diagnostics as init;
