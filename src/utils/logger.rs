use log::LevelFilter;

/// Maps the configured level name; anything unrecognized turns logging off.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Off,
    }
}

pub fn setup_logger(config: &super::config::Config) {
    env_logger::Builder::new()
        .filter_level(parse_level(&config.log_level))
        .parse_default_env()
        .init();
}
