//! Console logging. `tracing` events reach the `log` facade through
//! tracing's `log` feature and `wasm_logger` prints them to devtools.

use log::Level;

/// The most verbose level named in an `EnvFilter`-style directive list such
/// as `"warn,chatveil_core=debug"`. Targets are ignored. Nothing parseable
/// means `Info`.
pub fn level_from_filter(filter: &str) -> Level {
    filter
        .split(',')
        .filter_map(|directive| directive.rsplit('=').next())
        .filter_map(|level| level.trim().parse::<Level>().ok())
        .max()
        .unwrap_or(Level::Info)
}

/// Installs the console logger. Only the first call has any effect.
#[cfg(target_arch = "wasm32")]
pub fn init_logging(filter: &str) {
    static INIT: std::sync::Once = std::sync::Once::new();
    let level = level_from_filter(filter);
    INIT.call_once(|| wasm_logger::init(wasm_logger::Config::new(level)));
}
