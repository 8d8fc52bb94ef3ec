//! Command-line interface

pub mod commands;
pub mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::api::{ApiVersion, PipedriveClient};
use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "pipedrive-cli", version, about = "Command-line client for the Pipedrive CRM API")]
pub struct Cli {
    /// Send every request to one API version (v1 or v2)
    #[arg(long, global = true)]
    pub api_version: Option<ApiVersion>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List entities and the API versions of their operations
    Entities,
    /// Show the fields of an entity
    Fields {
        /// Entity name, e.g. deals or leadLabels
        entity: String,
    },
    /// Fetch one record
    Get { entity: String, id: String },
    /// List records, following pagination
    List {
        entity: String,
        /// Query parameter, repeatable (e.g. -p status=open)
        #[arg(short, long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
        /// Print at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Create a record from attribute=value pairs
    Create {
        entity: String,
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Update a record from attribute=value pairs
    Update {
        entity: String,
        id: String,
        #[arg(required = true)]
        values: Vec<String>,
        /// Send every writable field, not only the changed ones
        #[arg(long)]
        force: bool,
    },
    /// Delete one record, or several in one request
    Delete {
        entity: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Search across item types
    Search {
        term: String,
        /// Restrict to an item type, repeatable (deal, person, ...)
        #[arg(long = "type")]
        item_types: Vec<String>,
        /// Only exact matches; allows one-character terms
        #[arg(long)]
        exact: bool,
    },
    /// Deal totals per currency
    Summary {
        /// open, won or lost
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        pipeline_id: Option<i64>,
    },
}

/// Parse a `key=value` pair
pub fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Schema listings need no credentials
    match &cli.command {
        Commands::Entities => {
            output::print_entities();
            return Ok(());
        }
        Commands::Fields { entity } => {
            output::print_fields(commands::schema(entity)?);
            return Ok(());
        }
        _ => {}
    }

    let mut client = PipedriveClient::from_config(&config).context(
        "No usable API token. Set PIPEDRIVE_API_TOKEN or api_token in ~/.config/pipedrive/config.toml",
    )?;
    if let Some(version) = cli.api_version {
        client = client.pinned(version);
    }
    log::debug!("Using {:?}", client);

    commands::execute(&client, cli.command).await
}
