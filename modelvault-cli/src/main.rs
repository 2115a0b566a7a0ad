//! Modelvault CLI - download, verify and archive model files.

mod commands;
mod error;
mod manifest;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use modelvault::PipelineConfig;

#[derive(Debug, Parser)]
#[command(name = "modelvault", version, about = "Download, verify and archive model files")]
struct Cli {
    /// Bearer token for authenticated downloads (falls back to MODELVAULT_TOKEN)
    #[arg(long, global = true, env = "MODELVAULT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Worker threads for parallel downloads
    #[arg(long, global = true, default_value_t = 5)]
    threads: usize,

    /// Download attempts per file before giving up
    #[arg(long, global = true, default_value_t = 5)]
    retries: u32,

    /// Seconds to wait between download attempts
    #[arg(long, global = true, default_value_t = 10)]
    retry_delay: u64,

    /// Keep verified files uncompressed instead of archiving them as .7z
    #[arg(long, global = true)]
    no_compress: bool,

    /// Directory for daily-rolled log files (console only when absent)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download, verify and archive everything in a manifest
    Fetch {
        /// Path to the JSON manifest
        manifest: PathBuf,
    },
    /// Show what a fetch would do without touching the network
    Plan {
        /// Path to the JSON manifest
        manifest: PathBuf,
    },
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::new()
            .with_max_threads(self.threads)
            .with_max_retries(self.retries)
            .with_retry_delay(Duration::from_secs(self.retry_delay))
            .with_compression(!self.no_compress);
        if let Some(token) = &self.token {
            config = config.with_token(token);
        }
        config
    }
}

fn main() {
    let cli = Cli::parse();
    let _guard = modelvault::logging::init(cli.log_dir.as_deref(), cli.verbose);

    let config = cli.pipeline_config();
    let result = match &cli.command {
        Command::Fetch { manifest } => commands::fetch::run(manifest, config),
        Command::Plan { manifest } => commands::plan::run(manifest, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
