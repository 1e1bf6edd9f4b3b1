/// Maps a configured level name onto a filter. Unknown names turn logging off.
pub fn level_filter(log_level: &str) -> log::LevelFilter {
    match log_level {
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Off,
    }
}

pub fn setup_logger(config: &super::config::Config) {
    env_logger::Builder::from_default_env()
        .filter_level(level_filter(&config.log_level))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_levels() {
        assert_eq!(level_filter("debug"), log::LevelFilter::Debug);
        assert_eq!(level_filter("error"), log::LevelFilter::Error);
        assert_eq!(level_filter("verbose"), log::LevelFilter::Off);
    }
}
