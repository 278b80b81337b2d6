//! Adapts the firmware/ambient notion of a 1-5 verbosity level onto `tracing`.
//!
//! Level 1 is the quietest (errors only), level 5 the loudest (trace). This
//! mirrors the verbosity knob the gateway's config file exposes; callers pick
//! a level once at startup and every log call in the pipeline maps onto one
//! of the five `tracing` levels below it.

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::error::GatewayError;

/// Route a [`GatewayError`] through `tracing` at its prescribed level (§7):
/// parse errors at debug, converter rejections at info, catalog
/// inconsistencies at error. This is the crate's one `_log(msg, level)`
/// hook — every component that drops a candidate funnels through here
/// rather than formatting its own log line.
pub fn log_gateway_error(err: &GatewayError) {
    match err.log_level() {
        1 => tracing::error!("{err}"),
        2 => tracing::warn!("{err}"),
        3 => tracing::info!("{err}"),
        4 => tracing::debug!("{err}"),
        _ => tracing::trace!("{err}"),
    }
}

/// Translate a 1-5 verbosity level into the `tracing::Level` it unlocks.
///
/// Anything outside `1..=5` clamps to the nearest valid level rather than
/// panicking — a config typo shouldn't crash the gateway.
pub fn level_to_tracing(level: u8) -> Level {
    match level.clamp(1, 5) {
        1 => Level::ERROR,
        2 => Level::WARN,
        3 => Level::INFO,
        4 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install a global `tracing` subscriber at the given verbosity level.
///
/// Safe to call once per process; a second call is a no-op error that we
/// swallow, since tests may initialize logging more than once across a
/// binary.
pub fn init(level: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_to_tracing(level).into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
