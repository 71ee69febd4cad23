//! Log output for test runs.
//!
//! The crate itself only talks to the `log` facade. Drivers that want to see
//! those records call [`init`] once (calling it again is harmless), then
//! steer verbosity with `RUST_LOG`, e.g. `RUST_LOG=mock_container=debug`.

const DEFAULT_FILTER: &str = "warn";

/// Installs `env_logger` with the default `warn` filter.
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Installs `env_logger`, using `filter` when `RUST_LOG` is not set.
/// Returns false when a logger was already installed.
pub fn init_with_filter(filter: &str) -> bool {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .is_test(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        init();
        // the global logger is already taken at this point
        assert!(!init_with_filter("debug"));
    }
}
