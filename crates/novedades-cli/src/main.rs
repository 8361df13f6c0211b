mod logging;
mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use novedades_core::RunConfig;
use novedades_store::{DbConfig, DuckStore, PgStore, ProcedureSource};
use tracing::{error, info, warn};

/// Report procedures in the database whose resolution number is missing from
/// the novedades XML export, plus a query that fetches them.
#[derive(Parser)]
#[command(name = "novedades", version, about)]
struct Cli {
    /// PostgreSQL host
    #[arg(long, env = "DB_HOST")]
    db_host: Option<String>,

    /// PostgreSQL database name
    #[arg(long, env = "DB_NAME")]
    db_name: Option<String>,

    /// PostgreSQL user
    #[arg(long, env = "DB_USER")]
    db_user: Option<String>,

    /// PostgreSQL password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    db_password: Option<String>,

    /// PostgreSQL port
    #[arg(long, env = "DB_PORT")]
    db_port: Option<String>,

    /// Read the procedure table from a DuckDB snapshot instead of PostgreSQL
    #[arg(long, value_name = "PATH")]
    duckdb: Option<PathBuf>,

    /// Procedure table, optionally schema-qualified
    #[arg(long, default_value = "data.tramite")]
    table: String,

    /// Municipality code
    #[arg(long)]
    town: String,

    /// First status start date, inclusive
    #[arg(long, value_name = "YYYY-MM-DD")]
    from: String,

    /// Last status start date, inclusive
    #[arg(long, value_name = "YYYY-MM-DD")]
    to: String,

    /// Novedades XML export
    #[arg(long, value_name = "PATH")]
    xml: PathBuf,

    /// Log file, overwritten on every run
    #[arg(long, value_name = "PATH", default_value = "log.txt")]
    log_file: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Must run before parsing so `.env` values feed the `env` fallbacks.
    let env_file = dotenvy::dotenv();
    let cli = Cli::parse();
    if let Err(e) = logging::init(&cli.log_file) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }
    info!("novedades v{} run started", env!("CARGO_PKG_VERSION"));
    log_env_file(&env_file);

    match execute(cli).await {
        Ok(()) => {
            info!("run finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            error!("run aborted");
            ExitCode::FAILURE
        }
    }
}

fn log_env_file(result: &dotenvy::Result<PathBuf>) {
    match result {
        Ok(path) => info!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "cannot load environment file"),
    }
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let run = RunConfig::new(&cli.table, &cli.town, &cli.from, &cli.to, cli.xml)?;

    match cli.duckdb {
        Some(path) => {
            let store = DuckStore::open_persistent(&path).with_context(|| {
                format!("connection failed, terminating: cannot open {}", path.display())
            })?;
            reconcile(store, &run).await
        }
        None => {
            let db = DbConfig::from_parts(
                cli.db_host,
                cli.db_name,
                cli.db_user,
                cli.db_password,
                cli.db_port,
            )?;
            let store = PgStore::connect(&db)
                .await
                .with_context(|| format!("connection failed, terminating: {db}"))?;
            reconcile(store, &run).await
        }
    }
}

/// Run the pipeline, then release the connection whatever the outcome.
async fn reconcile<S: ProcedureSource>(mut source: S, run: &RunConfig) -> anyhow::Result<()> {
    let outcome = pipeline::run(&mut source, run).await;
    match source.close().await {
        Ok(()) => info!("database connection closed"),
        Err(e) => warn!(error = %e, "closing database connection failed"),
    }
    outcome.with_context(|| format!("querying table {}", run.filter.table))?;
    Ok(())
}
