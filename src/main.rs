//! sheet-receiver - Entry point for the mail-delivery hook
//!
//! Reads one raw email from stdin, runs it through the receiver and exits
//! with 0 if a sheet was filed and 1 otherwise.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use sheet_receiver::domain::SheetKind;
use sheet_receiver::{ReceiverConfig, ReceiverController};

#[derive(Parser, Debug)]
#[command(name = "sheet-receiver", version, about = "Receive time and status sheets by email")]
struct Cli {
    /// Settings file (JSON). Defaults to the user config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Kind of sheet this instance receives.
    #[arg(long, value_enum)]
    kind: Option<SheetKind>,

    /// Print outgoing mail instead of sending it and skip the SCM command.
    #[arg(long)]
    dry_run: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn load_config(cli: &Cli) -> Result<ReceiverConfig> {
    let path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => ReceiverConfig::default_path().filter(|path| path.exists()),
    };

    let mut config = match path {
        Some(path) => ReceiverConfig::load(&path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => ReceiverConfig::for_kind(cli.kind.unwrap_or(SheetKind::Status)),
    };

    if let Some(kind) = cli.kind {
        config.kind = kind;
    }
    if cli.dry_run {
        config.dry_run = true;
    }
    Ok(config)
}

/// Directory and file name of the log file.
fn log_file_parts(config: &ReceiverConfig) -> Result<(PathBuf, OsString)> {
    let path = config.log_file();
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .context("log file path has no file name")?
        .to_owned();
    Ok((dir, file_name))
}

/// Logs to stderr and to the log file.
///
/// The log file is the operator's record under a delivery hook, where stderr
/// is usually discarded. Stdout is left alone; dry runs print outgoing mail
/// there.
fn init_logging(cli: &Cli, config: &ReceiverConfig) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log filter")?;

    let (dir, file_name) = log_file_parts(config)?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let log_guard = init_logging(&cli, &config)?;

    tracing::info!(kind = %config.kind, dry_run = config.dry_run, "Starting sheet-receiver");

    let mut raw = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut raw)
        .await
        .context("failed to read message from stdin")?;

    let mut controller = ReceiverController::from_config(&config)?;
    let code = controller.process(raw).await.exit_code();

    // The guard flushes the log file when dropped; process::exit skips that.
    drop(log_guard);
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn log_file_defaults_to_kind_name_in_base_dir() {
        let mut config = ReceiverConfig::for_kind(SheetKind::Time);
        config.base_dir = PathBuf::from("/srv/sheets");

        let (dir, file_name) = log_file_parts(&config).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/sheets"));
        assert_eq!(file_name, OsString::from("timesheets.log"));
    }

    #[test]
    fn configured_log_file_is_resolved() {
        let mut config = ReceiverConfig::for_kind(SheetKind::Status);
        config.base_dir = PathBuf::from("/srv/sheets");
        config.log_file = Some(PathBuf::from("logs/receiver.log"));

        let (dir, file_name) = log_file_parts(&config).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/sheets/logs"));
        assert_eq!(file_name, OsString::from("receiver.log"));
    }

    #[test]
    fn cli_overrides_kind_and_dry_run() {
        let cli = Cli::parse_from([
            "sheet-receiver",
            "--config",
            "/nonexistent/receiver.json",
            "--kind",
            "time",
        ]);
        assert!(load_config(&cli).is_err());

        let cli = Cli::parse_from(["sheet-receiver", "--kind", "time", "--dry-run"]);
        assert_eq!(cli.kind, Some(SheetKind::Time));
        assert!(cli.dry_run);
    }
}
