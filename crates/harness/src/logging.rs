use crate::config::RuntimeConfig;
use std::io;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Chatty transport crates, capped at warn regardless of `LOG_LEVEL`.
const QUIET_TARGETS: [&str; 3] = ["hyper=warn", "reqwest=warn", "rustls=warn"];

fn parse_level(raw: &str) -> Level {
    match raw.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn build_filter(level: Level) -> EnvFilter {
    QUIET_TARGETS
        .iter()
        .filter_map(|target| target.parse().ok())
        .fold(
            EnvFilter::from_default_env().add_directive(level.into()),
            EnvFilter::add_directive,
        )
}

/// Install the global subscriber: human-readable or flattened JSON, both on stdout.
pub fn init_tracing(cfg: &RuntimeConfig, service: &'static str) {
    let level = parse_level(&cfg.log_level);
    let filter = build_filter(level);
    let json = cfg.log_format.eq_ignore_ascii_case("json");

    if json {
        let layer = fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(false)
            .with_target(true)
            .json()
            .flatten_event(true);
        Registry::default().with(filter).with(layer).init();
    } else {
        let layer = fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(cfg.log_color)
            .with_target(false)
            .compact();
        Registry::default().with(filter).with(layer).init();
    }

    info!(service, rpc = %cfg.near_rpc_url, account_id = %cfg.account_id, "logging initialised");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_levels_fall_back_to_info() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level(" warning "), Level::WARN);
        assert_eq!(parse_level("loud"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }
}
