use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are no-ops.
///
/// Filter resolution order: the explicit `filter` argument (env_logger
/// syntax, e.g. `"hexmap_render=debug"`), then `RUST_LOG`, then a
/// warn-level default. Intended to be called early in `main`; library code
/// only ever emits through the `log` macros.
pub fn init_logging(filter: Option<&str>) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Warn);
        }

        builder.init();
        log::debug!("logging initialized");
    });
}
