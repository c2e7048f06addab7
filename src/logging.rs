/*!
 * Logging setup for the meshlink library and CLI
 *
 * Command output goes to stdout, so interactive logs are written to stderr.
 * With `log_file` set, events are written to that file as JSON lines instead.
 * `RUST_LOG` overrides the configured level.
 */

use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{Level, Subscriber};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::ClientConfig;
use crate::error::{MeshlinkError, Result};

/// Crates whose events pass the configured filter
const LOG_TARGETS: [&str; 2] = ["meshlink", "meshlink_connect"];

/// Where events end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    JsonFile(PathBuf),
}

impl LogSink {
    pub fn from_config(config: &ClientConfig) -> Self {
        match &config.log_file {
            Some(path) => LogSink::JsonFile(path.clone()),
            None => LogSink::Stderr,
        }
    }
}

/// `verbose` wins over the configured level
pub fn effective_level(config: &ClientConfig) -> Level {
    if config.verbose {
        Level::DEBUG
    } else {
        config.log_level.to_tracing_level()
    }
}

/// Filter directives enabling `level` for every meshlink crate
pub fn filter_directives(level: Level) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn env_filter(config: &ClientConfig) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directives(effective_level(config))))
        .map_err(|e| MeshlinkError::Config(format!("invalid log filter: {}", e)))
}

/// Install the process-wide subscriber described by `config`
pub fn init_logging(config: &ClientConfig) -> Result<()> {
    let filter = env_filter(config)?;
    match LogSink::from_config(config) {
        LogSink::Stderr => stderr_subscriber(filter).init(),
        LogSink::JsonFile(path) => json_file_subscriber(&path, filter)?.init(),
    }
    Ok(())
}

fn stderr_subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .compact();
    tracing_subscriber::registry().with(filter).with(layer)
}

fn json_file_subscriber(path: &Path, filter: EnvFilter) -> Result<impl Subscriber + Send + Sync> {
    let file = File::create(path).map_err(|e| {
        MeshlinkError::Config(format!("cannot create log file {}: {}", path.display(), e))
    })?;
    let layer = fmt::layer()
        .with_writer(file)
        .with_target(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(false)
        .json();
    Ok(tracing_subscriber::registry().with(filter).with(layer))
}

/// Debug-level logging through the test harness writer; safe to call repeatedly
pub fn init_test_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(filter_directives(Level::DEBUG)));
        let layer = fmt::layer().with_test_writer().with_target(false).compact();
        // another test may have installed a subscriber already
        let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
    });
}
