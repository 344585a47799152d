use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use dotkv::transfer;
use dotkv::{ConnectionOptions, Database, ImportOptions, MathOp, SortOptions};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Db(#[from] dotkv::Error),
}

#[derive(Parser)]
#[command(name = "dotkv")]
#[command(about = "Dot-path key-value store on top of an embedded document database")]
#[command(version)]
struct Cli {
    /// Connection URL (`fjall://<path>` or a bare path)
    #[arg(long, global = true, default_value = ".dotkv", env = "DOTKV_URL")]
    url: String,

    /// Table to operate on
    #[arg(long, global = true, default_value = dotkv::DEFAULT_TABLE, env = "DOTKV_TABLE")]
    table: String,

    /// Buffer writes and flush on exit instead of syncing every write
    #[arg(long, global = true)]
    no_sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set a value; VALUE is parsed as JSON, falling back to a plain string
    Set {
        /// Dot-path key, e.g. `user.settings.theme`
        key: String,
        value: String,
    },

    /// Print the value at a key
    Get { key: String },

    /// Delete a record or a nested value
    Delete { key: String },

    /// Print every record
    All {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Remove every record in the table
    DeleteAll,

    /// Apply an arithmetic operator to the number at a key
    Math {
        key: String,

        /// add, subtract, multiply, divide, mod (or + - * / %)
        op: String,

        #[arg(allow_negative_numbers = true)]
        value: f64,
    },

    /// Add to the number at a key
    Add {
        key: String,
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },

    /// Subtract from the number at a key
    Subtract {
        key: String,
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },

    /// Append to the array at a key; a JSON array appends each element
    Push { key: String, value: String },

    /// Remove matching elements from the array at a key
    Pull { key: String, value: String },

    /// Print the kind of value stored at a key
    Type { key: String },

    /// List record IDs
    Keys,

    /// Print every record's data
    Values,

    /// Print the number of records
    Entries,

    /// List records whose ID starts with PREFIX
    StartsWith {
        prefix: String,

        /// Sort path, e.g. `data.score`
        #[arg(long)]
        sort: Option<String>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print random records
    Random {
        #[arg(long, default_value_t = 1)]
        limit: usize,
    },

    /// Write every record to `<DIR>/<NAME>.json`
    Export {
        #[arg(long, default_value = transfer::DEFAULT_EXPORT_NAME)]
        name: String,

        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Print every record with its data stringified
    ExportQuickdb {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load records from an export file
    Import {
        file: PathBuf,

        /// Replace records that already exist
        #[arg(long)]
        overwrite: bool,

        /// Reject the whole file if any record is invalid
        #[arg(long)]
        validate: bool,
    },

    /// Measure read and write latency
    Ping,
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("DOTKV_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging();

    let options = ConnectionOptions {
        durable: !cli.no_sync,
    };
    let db = Database::open(&cli.url, &cli.table, options)?;
    let result = run(&db, cli.command);
    db.disconnect()?;
    result
}

fn run(db: &Database, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Set { key, value } => {
            let data = db.set(&key, parse_value(&value))?;
            print_json(&data)
        }
        Commands::Get { key } => match db.get(&key)? {
            Some(value) => print_json(&value),
            None => {
                eprintln!("Key '{}' not found in table '{}'", key, db.name());
                std::process::exit(1);
            }
        },
        Commands::Delete { key } => {
            if db.delete(&key)? {
                println!("Deleted '{}' from table '{}'", key, db.name());
            } else {
                println!("Nothing stored at '{}'", key);
            }
            Ok(())
        }
        Commands::All { limit } => print_json(&db.all(limit)?),
        Commands::DeleteAll => {
            let count = db.delete_all()?;
            println!("Deleted {} record(s) from table '{}'", count, db.name());
            Ok(())
        }
        Commands::Math { key, op, value } => {
            let op: MathOp = op.parse()?;
            print_json(&db.math(&key, op, value)?)
        }
        Commands::Add { key, value } => print_json(&db.add(&key, value)?),
        Commands::Subtract { key, value } => print_json(&db.subtract(&key, value)?),
        Commands::Push { key, value } => print_json(&db.push(&key, parse_value(&value))?),
        Commands::Pull { key, value } => match db.pull(&key, parse_value(&value))? {
            Some(array) => print_json(&array),
            None => {
                eprintln!("Nothing stored at '{}'", key);
                std::process::exit(1);
            }
        },
        Commands::Type { key } => {
            println!("{}", db.value_type(&key)?);
            Ok(())
        }
        Commands::Keys => {
            let keys = db.key_array()?;
            if keys.is_empty() {
                println!("No keys found");
            }
            for key in keys {
                println!("{}", key);
            }
            Ok(())
        }
        Commands::Values => print_json(&db.value_array()?),
        Commands::Entries => {
            println!("{}", db.entries()?);
            Ok(())
        }
        Commands::StartsWith {
            prefix,
            sort,
            limit,
        } => {
            let ops = SortOptions { sort, limit };
            print_json(&db.starts_with(&prefix, &ops)?)
        }
        Commands::Random { limit } => print_json(&db.random(limit)?),
        Commands::Export { name, dir } => {
            let path = db.export(Some(name.as_str()), dir.as_deref())?;
            println!("Exported table '{}' to {}", db.name(), path.display());
            Ok(())
        }
        Commands::ExportQuickdb { output } => {
            let records = db.export_to_quickdb()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, serde_json::to_string_pretty(&records)?)?;
                    println!("Exported {} record(s) to {}", records.len(), path.display());
                    Ok(())
                }
                None => print_json(&records),
            }
        }
        Commands::Import {
            file,
            overwrite,
            validate,
        } => {
            let records = transfer::read_export(&file)?;
            let count = records.len();
            let options = ImportOptions {
                overwrite_existing: overwrite,
                validate,
            };
            if db.import(records, options)? {
                println!("Imported {} record(s) into table '{}'", count, db.name());
            } else {
                println!("Nothing to import");
            }
            Ok(())
        }
        Commands::Ping => {
            let latency = db.ping()?;
            println!(
                "read: {:.3}ms, write: {:.3}ms, average: {:.3}ms",
                latency.read, latency.write, latency.average
            );
            Ok(())
        }
    }
}
