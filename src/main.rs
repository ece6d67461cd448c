use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ipld::commands::{self, AnalyzeArgs, ReportFormat};
use ipld_core::config::Config;

#[derive(Parser)]
#[command(name = "ipld", about = "IPL duration extraction from SYSLOG extracts")]
struct Cli {
    /// Write debug logs to /tmp/ipld-debug.log (tail -f to inspect).
    #[arg(long, global = true)]
    debug: bool,

    /// Config file layered over the built-in defaults, instead of
    /// ~/.config/ipld/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process one host's log files and write its events and resume CSVs.
    Analyze {
        #[arg(long)]
        host: String,
        /// Substring selecting the host's log files.
        #[arg(long, default_value = "")]
        qualifier: String,
        /// Directory holding the host's log files.
        #[arg(long)]
        logs: Option<PathBuf>,
        /// Output directory; defaults to the configured results directory.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Explicit log files instead of discovery; `-` reads stdin.
        files: Vec<PathBuf>,
    },
    /// Process every enabled host of a fleet manifest.
    Fleet {
        manifest: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
        /// Hosts processed at once; defaults to the configured worker count.
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Classify every resume CSV under a results directory.
    Ingest {
        /// Defaults to the configured results directory.
        #[arg(long)]
        results: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Csv)]
        format: ReportFormat,
    },
    /// Time between two `YYYY-MM-DD HH:MM:SS` timestamps.
    Elapsed {
        start: String,
        end: String,
        /// Print `HH:MM:SS` instead of the spelled-out form.
        #[arg(long)]
        csv: bool,
    },
    /// Print the lifecycle and error marker table.
    Markers,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug)?;

    let config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::load()?,
    };
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Command::Analyze {
            host,
            qualifier,
            logs,
            out,
            files,
        } => {
            let out_dir = out.unwrap_or_else(|| config.fleet.results_dir.join(&host));
            let args = AnalyzeArgs {
                host,
                qualifier,
                logs,
                out: out_dir,
                files,
            };
            commands::analyze(&config, args, &mut stdout)?;
        }
        Command::Fleet {
            manifest,
            out,
            workers,
        } => {
            let runtime = tokio::runtime::Runtime::new()?;
            let failed = runtime.block_on(commands::fleet(
                &config,
                &manifest,
                out,
                workers,
                &mut stdout,
            ))?;
            if failed > 0 {
                anyhow::bail!("{failed} host(s) failed");
            }
        }
        Command::Ingest { results, format } => {
            let results = results.unwrap_or_else(|| config.fleet.results_dir.clone());
            commands::ingest(&results, format, &mut stdout)?;
        }
        Command::Elapsed { start, end, csv } => {
            commands::elapsed(&start, &end, csv, &mut stdout)?;
        }
        Command::Markers => commands::markers(&mut stdout)?,
    }

    Ok(())
}

fn init_logging(debug: bool) -> anyhow::Result<()> {
    let filter = |default: &str| {
        tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
    };

    if debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/ipld-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(filter("debug"))
            .init();
        tracing::info!("ipld debug log started, tail -f /tmp/ipld-debug.log");
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter("warn"))
            .init();
    }
    Ok(())
}
