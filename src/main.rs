use anyhow::bail;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::Settings;
use core_types::{LogicalQuery, RequestParameters, ShapedResult};
use database::{Executor, PgExecutor};

/// The main entry point for the epiquery application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings = configuration::load_settings()?;
    let _guard = configuration::init_tracing(&settings.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => {
            if let Some(host) = args.host {
                settings.server.host = host;
            }
            if let Some(port) = args.port {
                settings.server.port = port;
            }
            web_server::run_server(&settings).await
        }
        Commands::Countries => {
            handle_query(LogicalQuery::Countries, Vec::new(), &settings).await
        }
        Commands::Query(args) => {
            let query: LogicalQuery = args.route.parse()?;
            handle_query(query, args.params, &settings).await
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Read-only access to epidemiological time series per country.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API.
    Serve(ServeArgs),
    /// List every known country.
    Countries,
    /// Run one query and print the result as a table.
    Query(QueryArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Overrides `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
struct QueryArgs {
    /// Route name, e.g. "compare-cases-by-country".
    route: String,

    /// A query parameter as key=value. Repeat a key to pass a list,
    /// e.g. `-p countries=Chile -p countries=Peru`.
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

// ==============================================================================
// Query Command Logic
// ==============================================================================

/// Runs one logical query through the same pipeline the HTTP routes use.
async fn handle_query(
    query: LogicalQuery,
    params: Vec<(String, String)>,
    settings: &Settings,
) -> anyhow::Result<()> {
    tracing::debug!(query = %query, "Running query from the command line.");
    let params = RequestParameters::from_pairs(params);
    let fragment = pipeline::prepare(query, &params)?;

    let pool = database::connect(&settings.database).await?;
    let executor = PgExecutor::new(pool);
    let outcome = executor.execute(&fragment).await?;
    if outcome.is_empty() {
        bail!("Query returned no rows for {}", query.route());
    }

    let shaped = pipeline::shape_for(query, outcome.into_rows());
    println!("{}", render(&shaped));
    Ok(())
}

/// Lays the shaped result out as a table; grouped results get a leading
/// entity column.
fn render(shaped: &ShapedResult) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    match shaped {
        ShapedResult::Flat(rows) => {
            for row in rows {
                table.add_row(row.iter().map(ToString::to_string));
            }
        }
        ShapedResult::Grouped(series) => {
            for group in series {
                for row in &group.rows {
                    let mut cells = vec![group.entity.clone()];
                    cells.extend(row.iter().map(ToString::to_string));
                    table.add_row(cells);
                }
            }
        }
    }
    table
}
