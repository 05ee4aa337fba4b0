//! soda — query SODA open-data portals from the shell
//!
//! # Usage
//!
//! ```bash
//! # Rows matching a filter
//! soda abcd-1234 --domain data.example.com --eq borough=BRONX --limit 10
//!
//! # Show the request URL only
//! soda abcd-1234 --select name --where "total > 5" --dry-run
//!
//! # Dataset metadata
//! soda abcd-1234 meta
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use serde_json::{Map, Value as Json};
use soda_query::prelude::*;
use tracing_subscriber::EnvFilter;

type Row = Map<String, Json>;

#[derive(Parser)]
#[command(name = "soda")]
#[command(version)]
#[command(about = "Typed SoQL queries against SODA open-data APIs", long_about = None)]
#[command(after_help = "EXAMPLES:
    soda abcd-1234 --domain data.example.com --limit 5
    soda abcd-1234 --select 'name, count(*)' --group name --order 'count DESC'
    soda abcd-1234 --eq borough=BRONX --eq year=2020 --dry-run
    soda abcd-1234 url --search 'noise'")]
struct Cli {
    /// Dataset identifier, e.g. abcd-1234
    dataset: Option<String>,

    /// Portal domain
    #[arg(short, long, env = "SODA_DOMAIN", global = true)]
    domain: Option<String>,

    /// $select entries
    #[arg(short, long, global = true)]
    select: Vec<String>,

    /// $where conditions, AND-ed together
    #[arg(short = 'w', long = "where", global = true)]
    filter: Vec<String>,

    /// Equality filter as field=value
    #[arg(long, value_parser = parse_pair, global = true)]
    eq: Vec<(String, String)>,

    /// $group fields
    #[arg(short, long, global = true)]
    group: Vec<String>,

    /// $having conditions, needs --group
    #[arg(long, global = true)]
    having: Vec<String>,

    /// $order entries; ASC unless stated
    #[arg(short, long, global = true)]
    order: Vec<String>,

    #[arg(short, long, global = true)]
    limit: Option<u64>,

    #[arg(long, global = true)]
    offset: Option<u64>,

    /// Full text search
    #[arg(short = 'q', long, global = true)]
    search: Option<String>,

    /// Raw SoQL statement; overrides the clause flags
    #[arg(long, global = true)]
    soql: Option<String>,

    /// Include :id, :created_at and :updated_at
    #[arg(long, global = true)]
    system_fields: bool,

    /// Fetch GeoJSON instead of rows
    #[arg(long)]
    geojson: bool,

    /// Don't execute, just show the request
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the request URL
    Url,
    /// Print the dataset documentation URL
    DevUrl,
    /// Fetch dataset metadata
    Meta,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected field=value, got '{}'", s))
}

/// Numbers and booleans are passed through, everything else is text.
fn parse_literal(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        n.into()
    } else if let Ok(f) = raw.parse::<f64>() {
        f.into()
    } else if raw == "true" {
        true.into()
    } else if raw == "false" {
        false.into()
    } else {
        raw.into()
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.dataset.is_none() {
        println!("{}", "soda — typed SoQL for open-data portals".cyan().bold());
        println!();
        println!("Usage: soda <DATASET> [OPTIONS]");
        println!();
        println!("Try: soda --help");
        return;
    }

    if let Err(e) = run(&cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("soda_query=debug,soda=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli) -> Result<()> {
    let config = SodaConfig::load(cli.config.as_deref()).context("loading config")?;
    let query = build_query(cli, &config)?;

    match &cli.command {
        Some(Commands::Url) => println!("{}", query.url(None)?),
        Some(Commands::DevUrl) => println!("{}", query.dev_url()?),
        Some(Commands::Meta) => {
            let client = SodaClient::from_config(&config)?;
            let response = client.metadata(&query).await?;
            println!("{}", serde_json::to_string_pretty(&response.data)?);
        }
        None if cli.dry_run => show_request(&query)?,
        None => {
            let client = SodaClient::from_config(&config)?;
            if cli.geojson {
                let response = client.execute_geojson(&query, None).await?;
                println!("{}", serde_json::to_string_pretty(&response.data)?);
            } else {
                let response = client.execute::<Row>(&query, None).await?;
                if cli.verbose {
                    if let Some(modified) = &response.headers.last_modified {
                        println!("{} {}", "Last-Modified:".dimmed(), modified);
                    }
                }
                format_output(&response.data, &cli.format);
            }
        }
    }

    Ok(())
}

fn build_query(cli: &Cli, config: &SodaConfig) -> Result<SodaQuery> {
    let domain = cli
        .domain
        .clone()
        .or_else(|| config.domain.clone())
        .context("no domain; use --domain, SODA_DOMAIN or a config file")?;
    let dataset = cli.dataset.as_deref().context("no dataset given")?;

    let mut query = SodaQuery::new(domain).with_options(config.strict);
    query.with_dataset(dataset)?;

    query.select(cli.select.iter().map(String::as_str))?;
    query.filter(cli.filter.iter().map(String::as_str))?;
    if !cli.eq.is_empty() {
        query.filter([Clause::pairs(
            cli.eq.iter().map(|(k, v)| (k.clone(), parse_literal(v))),
        )])?;
    }
    query.group_by(cli.group.iter().cloned());
    query.having(cli.having.iter().map(String::as_str))?;
    query.order_by(cli.order.iter().map(String::as_str));

    if let Some(limit) = cli.limit {
        query.limit(limit);
    }
    if let Some(offset) = cli.offset {
        query.offset(offset);
    }
    if let Some(q) = &cli.search {
        query.search(q);
    }
    if let Some(soql) = &cli.soql {
        query.soql(soql);
    }
    if cli.system_fields {
        query.with_system_fields();
    }

    Ok(query)
}

fn show_request(query: &SodaQuery) -> Result<()> {
    let params = query.build_query()?;

    println!("{}", "Request URL:".green().bold());
    println!("{}", query.url(None)?.white());

    if !params.is_empty() {
        println!();
        println!("{}", "Parameters:".cyan());
        for (key, value) in &params {
            println!("  {} = {}", key.white(), value.yellow());
        }
    }
    Ok(())
}

fn format_output(rows: &[Row], format: &OutputFormat) {
    if rows.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows).unwrap_or_default());
        }
        OutputFormat::Table => {
            // Rows may omit null fields, so take the union of keys
            let mut columns: Vec<&String> = Vec::new();
            for row in rows {
                for key in row.keys() {
                    if !columns.contains(&key) {
                        columns.push(key);
                    }
                }
            }

            let widths: Vec<usize> = columns
                .iter()
                .map(|c| {
                    rows.iter()
                        .map(|row| row.get(*c).map(val_to_string).unwrap_or_default().len())
                        .fold(c.len(), usize::max)
                })
                .collect();

            let header: Vec<String> = columns
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:width$}", c, width = *w))
                .collect();
            println!("{}", header.join(" │ ").white().bold());

            let sep: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
            println!("{}", sep.join("─┼─").dimmed());

            for row in rows {
                let cells: Vec<String> = columns
                    .iter()
                    .zip(&widths)
                    .map(|(c, w)| {
                        let val = row.get(*c).map(val_to_string).unwrap_or_default();
                        format!("{:width$}", val, width = *w)
                    })
                    .collect();
                println!("{}", cells.join(" │ "));
            }

            println!();
            println!("{} row(s) returned", rows.len().to_string().cyan());
        }
    }
}

fn val_to_string(val: &Json) -> String {
    match val {
        Json::Null => "NULL".to_string(),
        Json::Bool(b) => b.to_string(),
        Json::Number(n) => n.to_string(),
        Json::String(s) => s.clone(),
        _ => val.to_string(),
    }
}
