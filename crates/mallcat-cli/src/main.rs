mod maintenance;
mod malls;
mod output;
mod register;
mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mallcat")]
#[command(about = "Scrape regional mall listings and register products into the shared catalog")]
struct Cli {
    /// Malls YAML file (overrides MALLCAT_MALLS_PATH)
    #[arg(long, global = true)]
    malls: Option<PathBuf>,

    /// Catalog JSON file (overrides MALLCAT_CATALOG_PATH)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Directory for scrape output and summaries (overrides MALLCAT_OUTPUT_DIR)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List configured malls
    Malls,
    /// Scrape listing pages and write raw products plus a scrape summary
    Scrape {
        /// Mall id to scrape; repeat for several. Defaults to every mall.
        #[arg(long)]
        mall: Vec<String>,
        /// Also save each mall's homepage HTML for selector debugging
        #[arg(long)]
        save_html: bool,
    },
    /// Build records from a raw products file and merge them into the catalog
    Register {
        #[arg(long)]
        mall: String,
        /// Raw products file (defaults to `<output-dir>/<mall>-products.json`)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Update price, image and stock of records that already exist
        #[arg(long)]
        refresh: bool,
        /// Compute counts without writing the catalog or summary
        #[arg(long)]
        dry_run: bool,
    },
    /// Scrape then register each mall
    Run {
        #[arg(long)]
        mall: Vec<String>,
        #[arg(long)]
        refresh: bool,
    },
    /// Remove every catalog record of a mall (the catalog is backed up first)
    Remove {
        #[arg(long)]
        mall: String,
    },
    /// Check a mall's catalog records and write a verification report
    Verify {
        #[arg(long)]
        mall: String,
    },
    /// Save a mall's homepage HTML
    Snapshot {
        #[arg(long)]
        mall: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = mallcat_core::load_app_config()?;
    if let Some(path) = cli.malls {
        config.malls_path = path;
    }
    if let Some(path) = cli.catalog {
        config.catalog_path = path;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let malls_file = mallcat_core::load_malls(&config.malls_path)?;

    match cli.command {
        Commands::Malls => {
            malls::list_malls(&malls_file);
            Ok(())
        }
        Commands::Scrape { mall, save_html } => {
            let selected = malls::select_malls(&malls_file, &mall)?;
            scrape::run_scrape(&config, &selected, save_html).await
        }
        Commands::Register {
            mall,
            input,
            refresh,
            dry_run,
        } => {
            let mall = malls::find_mall(&malls_file, &mall)?;
            register::run_register(&config, mall, input.as_deref(), refresh, dry_run)
        }
        Commands::Run { mall, refresh } => {
            let selected = malls::select_malls(&malls_file, &mall)?;
            register::run_pipeline(&config, &selected, refresh).await
        }
        Commands::Remove { mall } => {
            let mall = malls::find_mall(&malls_file, &mall)?;
            maintenance::run_remove(&config, mall)
        }
        Commands::Verify { mall } => {
            let mall = malls::find_mall(&malls_file, &mall)?;
            maintenance::run_verify(&config, mall)
        }
        Commands::Snapshot { mall } => {
            let mall = malls::find_mall(&malls_file, &mall)?;
            scrape::run_snapshot(&config, mall).await
        }
    }
}
