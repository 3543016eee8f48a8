//! Command-line flags and logging setup for the `procvisor` binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Keeps a dedicated game server running: crash restarts, scheduled restarts
/// and an operator console.
#[derive(Parser, Debug)]
#[command(name = "procvisor", version, about)]
pub struct Args {
    /// Settings file (created on first write)
    #[arg(long, default_value = "procvisor.json")]
    pub store: PathBuf,

    /// Server executable (UTF-8); stored as the new default when given
    #[arg(long)]
    pub server: Option<String>,

    /// Extra server parameters; stored as the new default when given
    #[arg(long, allow_hyphen_values = true)]
    pub params: Option<String>,

    /// Start the server immediately instead of waiting for `start`
    #[arg(long)]
    pub autostart: bool,

    /// Discard the server's own stdout/stderr
    #[arg(long)]
    pub quiet_server: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Minimum log level (overridden by RUST_LOG)
    #[arg(long, default_value_t = Level::INFO)]
    pub log_level: Level,
}

/// Logging format options.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// Single-line output
    #[default]
    Compact,
    /// JSON lines for log aggregation
    Json,
}

/// Installs the global tracing subscriber. Logs go to stderr so they do not
/// interleave with the console prompt on stdout.
pub fn init_logging(format: LogFormat, level: Level) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let registry = tracing_subscriber::registry().with(filter);

    let res = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
    res.map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["procvisor"]);
        assert_eq!(args.store, PathBuf::from("procvisor.json"));
        assert!(args.server.is_none());
        assert!(!args.autostart);
        assert_eq!(args.log_level, Level::INFO);
    }

    #[test]
    fn test_params_may_start_with_a_dash() {
        let args = Args::parse_from([
            "procvisor",
            "--server",
            "/srv/game/server",
            "--params",
            "-maxplayers 16",
            "--log-format",
            "json",
        ]);
        assert_eq!(args.server.as_deref(), Some("/srv/game/server"));
        assert_eq!(args.params.as_deref(), Some("-maxplayers 16"));
        assert!(matches!(args.log_format, LogFormat::Json));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_server_path_is_rejected() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let res = Args::try_parse_from([
            OsString::from("procvisor"),
            OsString::from("--server"),
            OsString::from_vec(b"/srv/game/\xffserver".to_vec()),
        ]);
        assert!(res.is_err());
    }
}
