use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use ccgreen::constants::{DEFAULT_DAILY_WINDOW_DAYS, DEFAULT_PORT};
use ccgreen::formatting::status_line;
use ccgreen::server::{ServeOptions, serve};
use ccgreen::utils::{DataPaths, default_config_path};
use ccgreen::{Aggregator, CcgError, ClaudeDataSource, ConfigStore, Result};

#[derive(Parser)]
#[command(name = "ccgreen")]
#[command(version)]
#[command(about = "Estimate the energy, CO2 and water footprint of Claude usage")]
struct Cli {
    /// Claude data directory
    #[arg(long, env = "CLAUDE_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Coefficient override file
    #[arg(long, env = "CCGREEN_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the dashboard API with live updates
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Print a one-line all-time summary
    Status,

    /// Print a report as JSON
    Report {
        #[arg(value_enum)]
        kind: ReportKind,

        /// Trailing window for the daily report
        #[arg(long, default_value_t = DEFAULT_DAILY_WINDOW_DAYS)]
        days: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportKind {
    Summary,
    Daily,
    Hourly,
    Models,
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    ccgreen::init_tracing(cli.verbose);

    // Configure rayon thread pool for log parsing
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_cpus::get())
        .thread_name(|i| format!("ccgreen-worker-{}", i))
        .build_global()
        .map_err(CcgError::ThreadPoolInit)?;

    let paths = DataPaths::new(cli.data_dir.unwrap_or_else(DataPaths::default_data_dir));
    let config_path = cli.config.unwrap_or_else(default_config_path);

    match cli.command {
        Command::Serve { host, port } => {
            serve(ServeOptions {
                host,
                port,
                paths,
                config_path,
            })
            .await
        }
        Command::Status => {
            let config = ConfigStore::load(config_path).current_config();
            let summary = tokio::task::spawn_blocking(move || {
                Aggregator::new(ClaudeDataSource::new(paths)).all_time_summary(&config)
            })
            .await?;
            println!("{}", status_line(&summary));
            Ok(())
        }
        Command::Report { kind, days } => {
            let config = ConfigStore::load(config_path).current_config();
            let report = tokio::task::spawn_blocking(move || {
                let aggregator = Aggregator::new(ClaudeDataSource::new(paths));
                match kind {
                    ReportKind::Summary => serde_json::to_value(aggregator.all_time_summary(&config)),
                    ReportKind::Daily => {
                        serde_json::to_value(aggregator.daily_breakdown(days, &config))
                    }
                    ReportKind::Hourly => serde_json::to_value(aggregator.hourly_breakdown(&config)),
                    ReportKind::Models => serde_json::to_value(aggregator.per_model(&config)),
                    ReportKind::Config => serde_json::to_value(config),
                }
            })
            .await?
            .map_err(|source| CcgError::JsonSerialize {
                context: "report".to_string(),
                source,
            })?;

            let rendered = serde_json::to_string_pretty(&report).map_err(|source| {
                CcgError::JsonSerialize {
                    context: "report".to_string(),
                    source,
                }
            })?;
            println!("{rendered}");
            Ok(())
        }
    }
}
