//! Thin wrapper around `env_logger` initialization.
//!
//! The crate itself only ever calls into the `log` facade (`trace!`,
//! `debug!`, `warn!`); it is up to the host (or, in tests, this helper) to
//! install a concrete logger. Mirrors the `init_logger(test_mode: bool)`
//! helper pattern used by the crossword-generator sibling project this crate
//! was cross-checked against.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize a logger suitable for test output. Safe to call repeatedly
/// (including concurrently from multiple test threads); only the first call
/// takes effect.
pub fn init_logger(test_mode: bool) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("warn"),
        );
        if test_mode {
            builder.is_test(true);
        }
        let _ = builder.try_init();
    });
}
