use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use onlinestore::{
    config::{self, StoreConfig},
    db::DbPool,
    observability,
    retention::{AuditEventSweeper, SweepOutcome, start_retention_worker},
    search::{ElasticsearchUserRepo, UserSearchRepo},
};
use tokio_util::sync::CancellationToken;

/// Config file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG_FILE: &str = "onlinestore.toml";

/// CLI arguments for the online store backend
#[derive(Parser, Debug)]
#[command(version, about = "Online store admin backend", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (defaults to ./onlinestore.toml if it exists,
    /// otherwise built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Run the retention worker until interrupted (default)
    Run,
    /// Run one audit event retention sweep and exit
    Sweep {
        /// Count what would be deleted without deleting it
        #[arg(long)]
        dry_run: bool,
        /// Override the configured retention period in days
        #[arg(long, allow_negative_numbers = true)]
        days: Option<i64>,
    },
    /// Run database migrations and exit
    Migrate,
    /// Search the user index with a query string (e.g. `login:admin`)
    SearchUsers {
        /// Elasticsearch query string
        query: String,
    },
    /// Export the JSON schema for the configuration file
    Schema {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config_path = args.config.as_deref();

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run_worker(config_path).await,
        Command::Sweep { dry_run, days } => run_sweep(config_path, dry_run, days).await,
        Command::Migrate => run_migrate(config_path).await,
        Command::SearchUsers { query } => run_search_users(config_path, &query).await,
        Command::Schema { output } => {
            #[cfg(feature = "json-schema")]
            run_schema_export(output);
            #[cfg(not(feature = "json-schema"))]
            {
                let _ = output;
                eprintln!("Error: JSON schema export requires the 'json-schema' feature");
                std::process::exit(1);
            }
        }
    }
}

/// Load the config and initialize logging. Exits on failure.
fn load_config(explicit_config_path: Option<&str>) -> StoreConfig {
    let path = match explicit_config_path {
        Some(path) => Some(PathBuf::from(path)),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        }
    };

    let config = match &path {
        Some(path) => StoreConfig::from_file(path).unwrap_or_else(|e| {
            eprintln!("Failed to load config from {}: {}", path.display(), e);
            std::process::exit(1);
        }),
        None => StoreConfig::default(),
    };

    if let Err(e) = observability::init_tracing(&config.observability) {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }

    match &path {
        Some(path) => tracing::debug!(config_file = %path.display(), "Configuration loaded"),
        None => tracing::debug!("No config file found, using defaults"),
    }

    config
}

/// Connect to the configured database, running migrations when enabled.
async fn connect_db(config: &config::DatabaseConfig) -> Arc<DbPool> {
    if config.is_none() {
        eprintln!("Error: Database is not configured. Add a [database] section.");
        std::process::exit(1);
    }

    let pool = match DbPool::from_config(config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            eprintln!("Error: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if config.run_migrations()
        && let Err(e) = pool.run_migrations().await
    {
        tracing::error!(error = %e, "Database migrations failed");
        eprintln!("Error: Database migrations failed: {}", e);
        std::process::exit(1);
    }

    Arc::new(pool)
}

async fn run_worker(explicit_config_path: Option<&str>) {
    let config = load_config(explicit_config_path);

    if let Err(e) = observability::metrics::init_metrics(&config.observability.metrics) {
        tracing::error!(error = %e, "Failed to initialize metrics");
        std::process::exit(1);
    }

    let db = connect_db(&config.database).await;
    let shutdown = CancellationToken::new();

    let worker = tokio::spawn(start_retention_worker(
        db.clone(),
        config.retention.clone(),
        shutdown.clone(),
    ));

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, waiting for retention worker to stop...");
    shutdown.cancel();

    if let Err(e) = worker.await {
        tracing::error!(error = %e, "Retention worker task failed");
    }

    db.close().await;
    tracing::info!("Shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn run_sweep(explicit_config_path: Option<&str>, dry_run: bool, days: Option<i64>) {
    let config = load_config(explicit_config_path);
    let db = connect_db(&config.database).await;

    let retention_days = days.unwrap_or(config.retention.audit_events_days);
    let sweeper = AuditEventSweeper::new(db.audit_events(), retention_days)
        .with_dry_run(dry_run || config.retention.dry_run);

    let result = sweeper.remove_old_audit_events().await;
    db.close().await;

    match result {
        Ok(SweepOutcome::Completed(report)) => {
            let verb = if report.dry_run {
                "Would delete"
            } else {
                "Deleted"
            };
            println!(
                "{} {} audit events dated before {}",
                verb, report.deleted, report.cutoff
            );
        }
        Ok(SweepOutcome::Skipped) => {
            println!("A sweep was already in progress, nothing done");
        }
        Err(e) => {
            tracing::error!(error = %e, kind = e.kind(), "Retention sweep failed");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_migrate(explicit_config_path: Option<&str>) {
    let config = load_config(explicit_config_path);

    if config.database.is_none() {
        eprintln!("Error: Database is not configured. Nothing to migrate.");
        std::process::exit(1);
    }

    tracing::info!("Running database migrations");

    match DbPool::from_config(&config.database).await {
        Ok(pool) => {
            let result = pool.run_migrations().await;
            pool.close().await;
            if let Err(e) = result {
                tracing::error!(error = %e, "Database migrations failed");
                eprintln!("Error: Database migrations failed: {}", e);
                std::process::exit(1);
            }
            tracing::info!("Database migrations completed successfully");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            eprintln!("Error: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_search_users(explicit_config_path: Option<&str>, query: &str) {
    let config = load_config(explicit_config_path);

    let Some(search_config) = &config.search else {
        eprintln!("Error: User search is not configured. Add a [search] section.");
        std::process::exit(1);
    };

    let repo = match ElasticsearchUserRepo::new(search_config) {
        Ok(repo) => repo,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let users = match repo.search(query).await {
        Ok(users) => users,
        Err(e) => {
            tracing::error!(error = %e, "User search failed");
            eprintln!("Error: User search failed: {}", e);
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&users) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: Failed to serialize search results: {}", e);
            std::process::exit(1);
        }
    }
}

/// Export the config JSON schema to file or stdout
#[cfg(feature = "json-schema")]
fn run_schema_export(output: Option<String>) {
    let content = match StoreConfig::json_schema_string() {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error: Failed to serialize config schema: {}", e);
            std::process::exit(1);
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, &content) {
                eprintln!("Error: Failed to write to {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Config JSON schema written to {}", path);
        }
        None => {
            println!("{}", content);
        }
    }
}
