//! Voices CLI - collect survey submissions and export them as CSV
//!
//! # Main Commands
//!
//! ```bash
//! voices serve                       # Start HTTP server (port 5001)
//! voices export -o voices.csv        # Full CSV export
//! voices export --select rows.json   # Export selected {id, shapeId} rows
//! ```
//!
//! # Maintenance Commands
//!
//! ```bash
//! voices init-db                     # Create the database
//! voices list                        # Dump submissions as JSON
//! voices import answers.json         # Insert payloads from a file
//! ```

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use voices::{full_export, selective_export, RecordStore, ServerConfig, ShapeRef};

#[derive(Parser)]
#[command(name = "voices")]
#[command(about = "Collect survey submissions and export them as CSV", long_about = None)]
struct Cli {
    /// Database file (default: $DB_PATH or voices.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create the database if it does not exist
    InitDb,

    /// Print all submissions as a JSON array
    List {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export submissions as CSV
    Export {
        /// JSON file with an array of {"id", "shapeId"} objects
        #[arg(short, long)]
        select: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Insert payloads from a JSON file (one object or an array of objects)
    Import {
        /// Input JSON file
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = ServerConfig::from_env();
    if let Some(db) = cli.db {
        config = config.with_db_path(db);
    }

    let result = match cli.command {
        Commands::Serve { host, port } => cmd_serve(config, host, port).await,
        Commands::InitDb => cmd_init_db(&config).await,
        Commands::List { output } => cmd_list(&config, output.as_deref()).await,
        Commands::Export { select, output } => {
            cmd_export(&config, select.as_deref(), output.as_deref()).await
        }
        Commands::Import { input } => cmd_import(&config, &input).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(
    mut config: ServerConfig,
    host: Option<IpAddr>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    voices::server::start_server(config).await
}

async fn cmd_init_db(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = RecordStore::open(&config.db_path).await?;
    let count = store.count().await?;
    eprintln!(
        "Database ready: {} ({} submission(s))",
        config.db_path.display(),
        count
    );
    Ok(())
}

async fn cmd_list(
    config: &ServerConfig,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = RecordStore::open(&config.db_path).await?;
    let records = store.list_all().await?;

    for record in &records {
        eprintln!("   #{} submitted {}", record.id, record.created_at.to_rfc3339());
    }
    eprintln!("{} submission(s)", records.len());

    let listing: Vec<Value> = records.iter().map(|r| r.listing_json()).collect();
    let json = serde_json::to_string_pretty(&listing)?;
    write_output(json.as_bytes(), output)?;

    Ok(())
}

async fn cmd_export(
    config: &ServerConfig,
    select: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = RecordStore::open(&config.db_path).await?;

    let csv = match select {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            let selection: Vec<ShapeRef> = serde_json::from_str(&content)?;
            eprintln!("Exporting {} selected row(s)", selection.len());
            selective_export(&store, &selection).await?
        }
        None => {
            eprintln!("Exporting all submissions");
            full_export(&store).await?
        }
    };

    write_output(&csv, output)?;
    Ok(())
}

async fn cmd_import(config: &ServerConfig, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let content = fs::read_to_string(input)?;
    let payloads = match serde_json::from_str::<Value>(&content)? {
        Value::Array(items) => items,
        single => vec![single],
    };

    if let Some(pos) = payloads.iter().position(|p| !p.is_object()) {
        return Err(format!("Entry {} of {} is not a JSON object", pos, input.display()).into());
    }

    let store = RecordStore::open(&config.db_path).await?;
    for payload in &payloads {
        let id = store.insert(payload).await?;
        eprintln!("   Stored submission #{}", id);
    }
    eprintln!("Imported {} submission(s) from {}", payloads.len(), input.display());

    Ok(())
}

fn write_output(content: &[u8], path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
