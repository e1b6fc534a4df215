mod check;
mod render;
mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::render::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "seatwatch")]
#[command(about = "Storefront variant stock-status page generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch every feed, reconcile variant status and write the status page
    Run {
        /// Catalog file (defaults to SEATWATCH_CATALOG_PATH)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output file (defaults to SEATWATCH_OUTPUT_PATH)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output document format
        #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,

        /// Restrict the run to one product group (by slug)
        #[arg(long)]
        group: Option<String>,

        /// Print the document to stdout instead of writing the output file
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate the catalog and print a summary of what would be watched
    Check {
        /// Catalog file (defaults to SEATWATCH_CATALOG_PATH)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = seatwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Run {
            catalog,
            output,
            format,
            group,
            dry_run,
        } => {
            let options = run::RunOptions {
                catalog_path: catalog.unwrap_or_else(|| config.catalog_path.clone()),
                output_path: output.unwrap_or_else(|| config.output_path.clone()),
                format,
                group_filter: group,
                dry_run,
            };
            run::run_status(&config, &options).await
        }
        Commands::Check { catalog } => {
            let path = catalog.unwrap_or_else(|| config.catalog_path.clone());
            check::run_check(&path)
        }
    }
}
