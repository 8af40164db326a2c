//! Logger setup.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use twyg::{LogLevel, Opts, OptsBuilder, Output};

use crate::config::{self, LoggingConfig};

/// Where log lines go while the search screen owns the terminal.
///
/// A configured file is kept; stdout and stderr are swapped for
/// [`config::log_file_path`], since anything written there would land in
/// the middle of the drawn screen.
pub fn screen_output(logging: &LoggingConfig) -> Output {
    match logging.output() {
        file @ Output::File(_) => file,
        Output::Stdout | Output::Stderr => Output::File(config::log_file_path()),
    }
}

/// Build logger options from the `[logging]` section.
///
/// Colour codes are only emitted to a terminal, never to a file.
///
/// # Errors
///
/// Returns an error if twyg rejects the options.
pub fn options(logging: &LoggingConfig, level: LogLevel, output: Output) -> Result<Opts> {
    OptsBuilder::new()
        .coloured(logging.coloured && !output.is_file())
        .output(output)
        .level(level)
        .report_caller(logging.report_caller)
        .build()
        .map_err(|e| anyhow!("Invalid logging options: {e}"))
}

/// Install the global logger from the `[logging]` section.
///
/// `level_override` wins over the configured level and `output_override`
/// over the configured destination. An unknown level name falls back to
/// `info` and is reported once the logger is up.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or a logger is
/// already installed.
pub fn init(
    logging: &LoggingConfig,
    level_override: Option<&str>,
    output_override: Option<Output>,
) -> Result<()> {
    let name = level_override.unwrap_or(&logging.level);
    let parsed = name.trim().parse::<LogLevel>();
    let level = parsed.as_ref().map_or(LogLevel::Info, |level| *level);

    let output = output_override.unwrap_or_else(|| logging.output());
    if let Some(dir) = output.file_path().and_then(Path::parent) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }

    twyg::setup(options(logging, level, output)?)
        .map_err(|e| anyhow!("Could not set up logger: {e}"))?;

    if let Err(e) = parsed {
        log::warn!("{}; using info", e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_output_never_uses_the_terminal() {
        let mut logging = LoggingConfig::default();
        assert_eq!(screen_output(&logging), Output::File(config::log_file_path()));

        logging.output = "stderr".to_string();
        assert_eq!(screen_output(&logging), Output::File(config::log_file_path()));

        logging.output = "/var/tmp/songdex.log".to_string();
        assert_eq!(screen_output(&logging), Output::file("/var/tmp/songdex.log"));
    }

    #[test]
    fn test_options_for_file_output() {
        let logging = LoggingConfig::default();
        let opts = options(&logging, LogLevel::Debug, Output::file("/tmp/songdex.log")).unwrap();
        assert!(!opts.coloured());
        assert_eq!(opts.level(), LogLevel::Debug);
        assert_eq!(opts.output(), &Output::file("/tmp/songdex.log"));
    }

    #[test]
    fn test_options_for_terminal_output() {
        let logging = LoggingConfig::default();
        let opts = options(&logging, LogLevel::Warn, logging.output()).unwrap();
        assert!(opts.coloured());
        assert_eq!(opts.output(), &Output::Stdout);
    }

    #[test]
    fn test_level_names() {
        assert_eq!(" WARN ".trim().parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
