//! # h5blob
//!
//! A command-line harness around the h5blob serializer.
//!
//! ## Usage
//!
//! ```bash
//! # Show what a configuration file resolves to
//! h5blob check-config h5blob.toml
//!
//! # Serialize synthetic detector batches into out/run_000000.h5, ...
//! h5blob -v demo --config h5blob.toml --batches 20 --output-dir out --prefix run_
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
