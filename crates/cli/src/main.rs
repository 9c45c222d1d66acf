//! Showroom CLI - Catalog inspection tools.
//!
//! # Usage
//!
//! ```bash
//! # List the merged catalog
//! showroom-cli catalog list
//!
//! # Filter the static catalog and print JSON
//! showroom-cli catalog list --sources static --category coupe --max-price 90000 --json
//!
//! # List the categories in use
//! showroom-cli catalog categories
//! ```
//!
//! # Commands
//!
//! - `catalog list` - Load the catalog and print the (filtered) products
//! - `catalog categories` - Print the distinct categories
//!
//! The catalog is loaded exactly the way the storefront loads it, using the
//! same `SHOWROOM_CATALOG_*` environment variables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use showroom_storefront::config::CatalogSources;

mod commands;

use commands::catalog::ListOptions;

#[derive(Parser)]
#[command(name = "showroom-cli")]
#[command(author, version, about = "Showroom CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogCommand,
    },
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// Load the catalog and list products
    List {
        /// Catalogs to load (`merged`, `remote`, `static`); defaults to
        /// `SHOWROOM_CATALOG_SOURCES`
        #[arg(long)]
        sources: Option<CatalogSources>,

        /// Case-insensitive search over title and description
        #[arg(short, long)]
        search: Option<String>,

        /// Inclusive lower price bound
        #[arg(long)]
        min_price: Option<String>,

        /// Inclusive upper price bound
        #[arg(long)]
        max_price: Option<String>,

        /// Exact category
        #[arg(short, long)]
        category: Option<String>,

        /// Exact model year
        #[arg(short, long)]
        year: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the distinct categories in the catalog
    Categories {
        /// Catalogs to load (`merged`, `remote`, `static`)
        #[arg(long)]
        sources: Option<CatalogSources>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Logs go to stderr so piped JSON output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "showroom_storefront=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogCommand::List {
                sources,
                search,
                min_price,
                max_price,
                category,
                year,
                json,
            } => {
                let options = ListOptions {
                    sources,
                    search,
                    min_price,
                    max_price,
                    category,
                    year,
                    json,
                };
                commands::catalog::list(options).await?;
            }
            CatalogCommand::Categories { sources } => {
                commands::catalog::categories(sources).await?;
            }
        },
    }
    Ok(())
}
