//! Menufeed command line.
//!
//! ```bash
//! # Fetch categories plus one collection and write them to ./data
//! menufeed snapshot --out data --endpoint deals
//!
//! # Normalize a saved delivery response without touching the network
//! menufeed normalize --input deals.json --endpoint deals --include 1
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use menufeed::{
    build_category_index, decode_collection, fetch_and_normalize, fetch_categories,
    normalize_collection, CdaClient, Endpoint, LocaleScope, MenufeedConfig,
};

#[derive(Parser)]
#[command(name = "menufeed")]
#[command(version)]
#[command(about = "Fetch and normalize menu content from the delivery API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pipeline configuration file (YAML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch categories and one collection, write categories.json and data.json
    Snapshot {
        /// Output directory
        #[arg(long, short, default_value = "data")]
        out: PathBuf,

        /// Collection written to data.json
        #[arg(long, short, default_value = "products")]
        endpoint: Endpoint,

        /// Delivery API locale
        #[arg(long)]
        locale: Option<String>,

        /// Language filter value
        #[arg(long)]
        language: Option<String>,

        #[arg(long, env = "API_SPACE_ID", hide_env_values = true)]
        space_id: Option<String>,

        #[arg(long, env = "API_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,
    },

    /// Normalize a saved delivery response and print the result
    Normalize {
        /// Saved response body (JSON)
        #[arg(long, short)]
        input: PathBuf,

        #[arg(long, short, default_value = "products")]
        endpoint: Endpoint,

        /// Include depth the response was fetched with
        #[arg(long)]
        include: Option<u8>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("menufeed=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = format!("{err:#}"), "menufeed.failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => MenufeedConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => MenufeedConfig::default(),
    };

    match cli.command {
        Commands::Snapshot {
            out,
            endpoint,
            locale,
            language,
            space_id,
            access_token,
        } => {
            let mut delivery = config.delivery.clone();
            if let Some(space_id) = space_id {
                delivery.space_id = space_id;
            }
            if let Some(access_token) = access_token {
                delivery.access_token = access_token;
            }
            let client = CdaClient::new(&delivery).context("building delivery client")?;
            let scope = LocaleScope { locale, language };
            snapshot(&config, &client, endpoint, &scope, &out).await
        }
        Commands::Normalize {
            input,
            endpoint,
            include,
        } => {
            let raw = fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let body: Value = serde_json::from_str(&raw).context("input is not JSON")?;
            let include = include
                .or_else(|| config.include_for(endpoint))
                .unwrap_or(delivery::DEFAULT_INCLUDE);
            let collection = decode_collection(&body, include)?;
            let normalizer = config.normalizer();
            let output = if endpoint.is_tree() {
                build_category_index(&collection, &normalizer)?.into_value()
            } else {
                normalize_collection(&collection, &normalizer).into_value()
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
    }
}

async fn snapshot(
    config: &MenufeedConfig,
    client: &CdaClient,
    endpoint: Endpoint,
    scope: &LocaleScope,
    out: &Path,
) -> Result<()> {
    let normalizer = config.normalizer();
    let language_field = &config.locale.language_field;
    fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;

    let categories_query = Endpoint::Categories.query(
        config.include_for(Endpoint::Categories),
        scope,
        language_field,
    );
    let categories = fetch_categories(client, &categories_query, &normalizer).await?;
    write_json(&out.join("categories.json"), &categories.into_value())?;

    let query = endpoint.query(config.include_for(endpoint), scope, language_field);
    let data = if endpoint.is_tree() {
        fetch_categories(client, &query, &normalizer).await?.into_value()
    } else {
        fetch_and_normalize(client, &query, &normalizer).await?.into_value()
    };
    write_json(&out.join("data.json"), &data)?;

    info!(out = %out.display(), endpoint = %endpoint, "menufeed.snapshot_written");
    Ok(())
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))
}
