use env_logger::Env;

/// Logger for the `consistent_hash` binary. `RUST_LOG` overrides the
/// default `warn` filter.
pub fn init_logger() {
    init_logger_with("warn");
}

pub fn init_logger_with(default_filter: &str) {
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

pub fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
