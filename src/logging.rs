//! Log statements for the store, the in-memory fallback and the server.
//!
//! The level macros below all route through `log_at!`, which is the only
//! place that knows about `tracing`. Builds without the `logging` feature
//! compile every statement away, arguments included.
//!
//! Levels as dotkv uses them:
//!
//! | Level   | Used for                                             |
//! |---------|------------------------------------------------------|
//! | `trace` | per-key reads, skipped import records                |
//! | `debug` | writes, keyspace opens, event fan-out                |
//! | `info`  | connect and disconnect, clears, imports, exports     |
//! | `warn`  | an open connection being replaced                    |
//! | `error` | failures that are also broadcast as `Event::Error`   |
//!
//! Call them as statements: `debug!(table = %name, key = key, "setting value");`

#[cfg(feature = "logging")]
macro_rules! log_at {
    ($level:ident, $($arg:tt)*) => { tracing::$level!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_at {
    ($level:ident, $($arg:tt)*) => {};
}

macro_rules! trace {
    ($($arg:tt)*) => { $crate::logging::log_at!(trace, $($arg)*) };
}

macro_rules! debug {
    ($($arg:tt)*) => { $crate::logging::log_at!(debug, $($arg)*) };
}

macro_rules! info {
    ($($arg:tt)*) => { $crate::logging::log_at!(info, $($arg)*) };
}

macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::logging::log_at!(warn, $($arg)*) };
}

macro_rules! error {
    ($($arg:tt)*) => { $crate::logging::log_at!(error, $($arg)*) };
}

pub(crate) use log_at;
#[allow(unused_imports)]
pub(crate) use {debug, error, info, log_warn as warn, trace};
