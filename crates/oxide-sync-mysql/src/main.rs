//! oxide-sync CLI
//!
//! Command-line tool for loading CSV files into MySQL tables.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use oxide_sync_core::{DEFAULT_BATCH_SIZE, TableSync};
use oxide_sync_mysql::{ConnectionConfig, MySqlExecutor, export_table, load_csv};

/// Sync tabular data into MySQL tables, creating and evolving them as needed.
#[derive(Parser)]
#[command(name = "oxide-sync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON connection configuration; flags and environment override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host.
    #[arg(long, env = "DATABASE_SERVER")]
    host: Option<String>,

    /// Server port.
    #[arg(long, env = "DATABASE_PORT")]
    port: Option<u16>,

    /// User name.
    #[arg(short, long, env = "DATABASE_USER")]
    user: Option<String>,

    /// Password.
    #[arg(long, env = "DATABASE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Database name.
    #[arg(short, long, env = "DATABASE_NAME")]
    database: Option<String>,

    /// Probe the connection before every statement.
    #[arg(long)]
    keep_alive: bool,

    /// Require TLS.
    #[arg(long)]
    tls: bool,

    /// Enable server-side autocommit.
    #[arg(long)]
    auto_commit: bool,

    /// Maximum rows per INSERT.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Plain batched INSERTs.
    Insert,
    /// INSERT ... ON DUPLICATE KEY UPDATE on the key column.
    Upsert,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CSV file into a table, creating the table if needed.
    Import {
        /// Destination table.
        #[arg(short, long)]
        table: String,

        /// CSV file with a header row.
        #[arg(long)]
        csv: PathBuf,

        /// Primary key column.
        #[arg(short, long)]
        key: Option<String>,

        /// How rows are written.
        #[arg(short, long, value_enum, default_value_t = Mode::Insert)]
        mode: Mode,

        /// Add missing columns and retype mismatched ones before loading.
        #[arg(long)]
        sync_columns: bool,
    },

    /// Show the live columns of a table.
    Describe {
        /// Table to describe.
        #[arg(short, long)]
        table: String,
    },

    /// Show the CREATE or ALTER an import would issue, without running it.
    Plan {
        /// Destination table.
        #[arg(short, long)]
        table: String,

        /// CSV file with a header row.
        #[arg(long)]
        csv: PathBuf,

        /// Primary key column.
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Write a table to stdout as CSV.
    Export {
        /// Table to export.
        #[arg(short, long)]
        table: String,
    },
}

impl Cli {
    fn connection_config(&self) -> anyhow::Result<ConnectionConfig> {
        let mut config = match self.config {
            Some(ref path) => ConnectionConfig::from_json_file(path)?,
            None => ConnectionConfig::default(),
        };
        if let Some(ref host) = self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(ref user) = self.user {
            config.user.clone_from(user);
        }
        if let Some(ref password) = self.password {
            config.password.clone_from(password);
        }
        if let Some(ref database) = self.database {
            config.database.clone_from(database);
        }
        config.keep_alive |= self.keep_alive;
        config.use_tls |= self.tls;
        config.auto_commit |= self.auto_commit;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.connection_config()?;
    let executor = MySqlExecutor::connect(config)?;
    let mut sync = TableSync::new(executor).with_batch_size(cli.batch_size);

    match cli.command {
        Commands::Import {
            table,
            csv,
            key,
            mode,
            sync_columns,
        } => {
            let frame = load_csv(&csv)?;
            let affected = match (mode, key.as_deref()) {
                (Mode::Upsert, None) => anyhow::bail!("--mode upsert needs --key"),
                (Mode::Upsert, Some(key)) => sync.create_or_update(&table, &frame, key)?,
                (Mode::Insert, key) => {
                    sync.create_table(&table, &frame, key)?;
                    sync.insert_dataset(&table, &frame, sync_columns)?
                }
            };
            sync.commit()?;
            info!(table = %table, rows = affected, "Import complete");
        }

        Commands::Describe { table } => {
            let schema = sync.describe(&table)?;
            println!("{:<24} {:<16} {:<5} {:<4} {:<12} EXTRA", "FIELD", "TYPE", "NULL", "KEY", "DEFAULT");
            for column in &schema.columns {
                println!(
                    "{:<24} {:<16} {:<5} {:<4} {:<12} {}",
                    column.name,
                    column.column_type,
                    if column.nullable { "YES" } else { "NO" },
                    if column.primary_key { "PRI" } else { "" },
                    column.default.as_deref().unwrap_or("NULL"),
                    column.extra
                );
            }
        }

        Commands::Plan { table, csv, key } => {
            let frame = load_csv(&csv)?;
            match sync.plan(&table, &frame, key.as_deref())? {
                Some(sql) => println!("{sql};"),
                None => info!(table = %table, "Table already matches the file"),
            }
        }

        Commands::Export { table } => {
            export_table(&mut sync, &table, std::io::stdout().lock())?;
        }
    }

    sync.close()?;
    Ok(())
}
