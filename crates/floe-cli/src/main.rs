use clap::{Parser, Subcommand};
use floe_core::FloeConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

mod commands;

const DEFAULT_CONFIG: &str = "floe.yaml";
const LOG_FILE_NAME: &str = "floe.log";

#[derive(Parser, Debug)]
#[command(name = "floe", version, about = "Floe read-only warehouse gateway")]
struct Cli {
    /// Path to floe.yaml
    #[arg(long, global = true, env = "FLOE_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', global = true, action = clap::ArgAction::Count)]
    verbosity: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify SQL as read-only or write. Exits with status 1 on a write.
    Classify {
        /// SQL text. Read from --file or stdin when omitted.
        sql: Option<String>,

        /// Read SQL from a file
        #[arg(long, conflicts_with = "sql")]
        file: Option<PathBuf>,

        /// Tokenizer dialect (snowflake, postgres, mysql, ansi, generic)
        #[arg(long)]
        dialect: Option<String>,

        /// Print the full classification as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Tool catalog
    Tools {
        #[command(subcommand)]
        cmd: ToolsCommand,
    },

    /// Validate the configuration and print a summary
    Check,
}

#[derive(Subcommand, Debug)]
enum ToolsCommand {
    /// List the tools visible under the configuration
    List {
        /// Print input schemas
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Classify {
            sql,
            file,
            dialect,
            json,
        } => {
            let config = load_optional_config(cli.config.as_deref())?;
            let _guard = init_logging(cli.verbosity, &config)?;

            let dialect = dialect.unwrap_or_else(|| config.warehouse.dialect.clone());
            let is_write = commands::classify::run(sql, file, &dialect, json)?;
            Ok(if is_write {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }

        Command::Tools {
            cmd: ToolsCommand::List { verbose },
        } => {
            let config = load_optional_config(cli.config.as_deref())?;
            let _guard = init_logging(cli.verbosity, &config)?;

            commands::tools::list(&config, verbose)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Check => {
            let path = cli
                .config
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
            let _guard = init_logging(cli.verbosity, &FloeConfig::default())?;

            let ok = commands::check::run(&path)?;
            Ok(if ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

/// Load the given config, or `floe.yaml` when present, or defaults.
fn load_optional_config(path: Option<&Path>) -> anyhow::Result<FloeConfig> {
    use anyhow::Context;

    match path {
        Some(path) => FloeConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path)),
        None if Path::new(DEFAULT_CONFIG).exists() => FloeConfig::load(DEFAULT_CONFIG)
            .with_context(|| format!("Failed to load configuration from {DEFAULT_CONFIG}")),
        None => Ok(FloeConfig::default()),
    }
}

/// Install the tracing subscriber.
///
/// `-v` flags win over `RUST_LOG`, which wins over `logging.level`. With
/// `logging.dir` set, output goes to `floe.log` in that directory; the
/// returned guard flushes it and must live until exit.
fn init_logging(verbose: u8, config: &FloeConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    match &config.logging.dir {
        Some(dir) => {
            let (writer, guard) = file_writer(dir)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

/// Non-blocking appender writing to `dir/floe.log`.
fn file_writer(dir: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_writer_creates_log_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        let (mut writer, guard) = file_writer(&log_dir).unwrap();
        writer.write_all(b"session established\n").unwrap();
        drop(guard);

        let content = fs::read_to_string(log_dir.join(LOG_FILE_NAME)).unwrap();
        assert!(content.contains("session established"));
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from(["floe", "-vv", "classify", "SELECT 1", "--json"]).unwrap();
        assert_eq!(cli.verbosity, 2);
        assert!(matches!(cli.cmd, Command::Classify { json: true, .. }));

        let cli = Cli::try_parse_from(["floe", "tools", "list", "--verbose"]).unwrap();
        assert!(matches!(
            cli.cmd,
            Command::Tools {
                cmd: ToolsCommand::List { verbose: true }
            }
        ));
    }
}
