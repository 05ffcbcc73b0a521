//! Logging setup for Botforge.
//!
//! One `tracing-subscriber` registry with an [`EnvFilter`] and a single `fmt`
//! layer, both driven by [`LoggingConfig`]:
//!
//! ```toml
//! [logging]
//! level = "info"
//! format = "pretty"
//! filters = { botforge_framework = "debug" }
//! span_events = { close = true }
//! ```
//!
//! `RUST_LOG` replaces the configured base level when set. Every command
//! handler runs inside a `command` span (DEBUG level, from
//! `botforge_framework`), so `span_events.close` together with
//! `botforge_framework = "debug"` logs how long each command took.
//!
//! A log file that cannot be created is not fatal: logging falls back to
//! stdout and says why once the subscriber is up.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use tracing::{debug, warn};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogFormat, LogOutput, LoggingConfig, SpanEventConfig};

/// Installs the global subscriber described by `config`.
///
/// Keeps the existing subscriber if one is already installed.
pub fn init_from_config(config: &LoggingConfig) {
    if let Err(e) = LoggingBuilder::from_config(config).try_init() {
        debug!(error = %e, "Global subscriber already installed, keeping it");
    }
}

/// Builds the global subscriber.
#[derive(Debug)]
pub struct LoggingBuilder {
    config: LoggingConfig,
    directives: Vec<String>,
}

impl LoggingBuilder {
    /// Create a builder with the default logging settings.
    pub fn new() -> Self {
        Self::from_config(&LoggingConfig::default())
    }

    /// Create a builder from a [`LoggingConfig`].
    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut directives: Vec<String> = config
            .filters
            .iter()
            .map(|(module, level)| format!("{module}={}", level.as_str()))
            .collect();
        directives.sort();

        Self {
            config: config.clone(),
            directives,
        }
    }

    /// Add a filter directive, e.g. `"botforge_runtime=debug"`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    fn build_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.config.level.as_str()));

        for directive in &self.directives {
            if let Ok(d) = directive.parse() {
                filter = filter.add_directive(d);
            }
        }
        filter
    }

    /// Picks the writer. The second value says why file output was dropped.
    fn writer(&self) -> (BoxMakeWriter, Option<String>) {
        match self.config.output {
            LogOutput::Stdout => (BoxMakeWriter::new(io::stdout), None),
            LogOutput::Stderr => (BoxMakeWriter::new(io::stderr), None),
            LogOutput::File => {
                let Some(path) = self.config.file_path.as_deref() else {
                    return (
                        BoxMakeWriter::new(io::stdout),
                        Some("no file path configured".to_string()),
                    );
                };
                if let Err(e) = check_log_file(path) {
                    return (
                        BoxMakeWriter::new(io::stdout),
                        Some(format!("{}: {e}", path.display())),
                    );
                }

                let dir = path
                    .parent()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                let file_name = path.file_name().unwrap_or(path.as_os_str());
                (
                    BoxMakeWriter::new(tracing_appender::rolling::never(dir, file_name)),
                    None,
                )
            }
        }
    }

    fn fmt_layer(
        &self,
        writer: BoxMakeWriter,
        ansi: bool,
    ) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_span_events(fmt_span(&self.config.span_events))
            .with_thread_ids(self.config.thread_ids)
            .with_file(self.config.file_location)
            .with_line_number(self.config.file_location);

        match self.config.format {
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Full => layer.boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => layer.json().boxed(),
            #[cfg(not(feature = "json-log"))]
            LogFormat::Json => layer.compact().boxed(),
        }
    }

    /// Installs the subscriber, failing if one is already installed.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let (writer, fallback) = self.writer();
        let ansi = self.config.output != LogOutput::File || fallback.is_some();

        tracing_subscriber::registry()
            .with(self.fmt_layer(writer, ansi))
            .with(self.build_filter())
            .try_init()?;

        if let Some(reason) = fallback {
            warn!(reason = %reason, "Log file unavailable, logging to stdout");
        }
        Ok(())
    }
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn fmt_span(config: &SpanEventConfig) -> FmtSpan {
    let mut span = FmtSpan::NONE;
    if config.new {
        span |= FmtSpan::NEW;
    }
    if config.enter {
        span |= FmtSpan::ENTER;
    }
    if config.exit {
        span |= FmtSpan::EXIT;
    }
    if config.close {
        span |= FmtSpan::CLOSE;
    }
    span
}

/// Creates the log file's directory and opens the file for appending.
fn check_log_file(path: &Path) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(())
}
