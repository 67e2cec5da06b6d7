//! CLI for esmvend.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use esmvend_core::config;
use std::path::PathBuf;

use commands::{run_completions, run_vendor, run_verify};

/// Top-level CLI for esmvend.
#[derive(Debug, Parser)]
#[command(name = "esmvend")]
#[command(about = "esmvend: vendor CDN ES modules into a local directory with an import map", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch an entry module and everything it imports, then write importmap.json.
    Vendor(VendorArgs),

    /// Check that every import map address in DIR names an existing file and print its SHA-256.
    Verify {
        /// Output directory of a previous `vendor` run.
        dir: PathBuf,
        /// Prefix the import map addresses were written with.
        #[arg(long, default_value = "./")]
        base: String,
    },

    /// Print a shell completion script to stdout.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct VendorArgs {
    /// Entry module URL (or local file). Repeat for several entries.
    #[arg(short, long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Directory receiving the module files and importmap.json.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Job file (JSON, YAML or TOML) supplying any of url, output, importName.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Extra import map key aliasing the first entry URL.
    #[arg(long, value_name = "NAME")]
    pub import_name: Option<String>,

    /// Load up to N modules concurrently (default from config.toml).
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Vendor(args) => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_vendor(&cfg, args).await?;
            }
            CliCommand::Verify { dir, base } => run_verify(&dir, &base)?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
