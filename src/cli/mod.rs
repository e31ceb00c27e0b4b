use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod check;
mod config;
mod demo;

/// h5blob - Streaming HDF5 Serializer
#[derive(Parser)]
#[command(name = "h5blob")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serialize synthetic detector batches and write one HDF5 file per batch
    Demo {
        /// TOML configuration file
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,

        /// Number of batches to generate
        #[arg(short, long, default_value = "10")]
        batches: usize,

        /// Records per batch
        #[arg(short, long, default_value = "4")]
        depth: usize,

        /// Output directory (overrides the config file)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// File name prefix (overrides the config file)
        #[arg(long)]
        prefix: Option<String>,

        /// File name suffix (overrides the config file)
        #[arg(long)]
        suffix: Option<String>,
    },

    /// Validate a configuration file and show the resolved serializer settings
    CheckConfig {
        /// TOML configuration file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Demo {
            config,
            batches,
            depth,
            output_dir,
            prefix,
            suffix,
        } => demo::run(
            config,
            batches,
            depth,
            demo::OutputArgs {
                directory: output_dir,
                prefix,
                suffix,
            },
        ),
        Commands::CheckConfig { file } => check::run(file),
    }
}
