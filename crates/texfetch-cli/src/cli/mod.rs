//! CLI for the texfetch asset cache.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use texfetch_core::{config, AssetCategory};

use commands::{run_fetch, run_list, run_providers, SessionArgs};

/// Top-level CLI for texfetch.
#[derive(Debug, Parser)]
#[command(name = "texfetch")]
#[command(about = "texfetch: fetch textures, HDRIs and IES profiles into a local cache", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List registered providers.
    Providers,

    /// List the variants available for a source.
    List {
        /// Provider page URL, or a local path.
        url: String,

        /// Kind of asset to look for.
        #[arg(long, default_value = "material", value_name = "CATEGORY")]
        category: AssetCategory,

        /// Use the cached asset with this name instead of querying the URL.
        #[arg(long, value_name = "NAME")]
        asset: Option<String>,

        /// For local directories: list the assets inside instead of the directory itself.
        #[arg(long)]
        deep: bool,
    },

    /// Download one variant and print the resulting maps.
    Fetch {
        /// Provider page URL, or a local path.
        url: String,

        /// Index into the variant list (see `texfetch list`).
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        variant: isize,

        /// Kind of asset to look for.
        #[arg(long, default_value = "material", value_name = "CATEGORY")]
        category: AssetCategory,

        /// Use the cached asset with this name instead of querying the URL.
        #[arg(long, value_name = "NAME")]
        asset: Option<String>,

        /// For local directories: treat the path as a container of assets.
        #[arg(long)]
        deep: bool,

        /// Download again even if the files are cached.
        #[arg(long)]
        reinstall: bool,

        /// Also fetch the asset thumbnail.
        #[arg(long)]
        thumbnail: bool,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Providers => run_providers()?,
            CliCommand::List {
                url,
                category,
                asset,
                deep,
            } => {
                let args = SessionArgs {
                    url,
                    category,
                    asset,
                    deep,
                };
                run_list(&cfg, &args)?;
            }
            CliCommand::Fetch {
                url,
                variant,
                category,
                asset,
                deep,
                reinstall,
                thumbnail,
            } => {
                let args = SessionArgs {
                    url,
                    category,
                    asset,
                    deep,
                };
                run_fetch(&cfg, &args, variant, reinstall, thumbnail)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
