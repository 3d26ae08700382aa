// dugout entry point.
//
// 1. Initialize tracing (stderr; stdout carries the JSON result)
// 2. Parse arguments
// 3. Load config
// 4. Open the player store
// 5. Run the command and print its JSON output

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use dugout_app::cli::Cli;
use dugout_app::commands;
use dugout_core::config;
use dugout_core::db::Database;
use dugout_core::store::PlayerStore;

/// Exit status for not-found results, distinct from general failures.
const EXIT_NOT_FOUND: u8 = 2;
/// Exit status when the store or a data provider could not be reached.
const EXIT_UNAVAILABLE: u8 = 3;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing()?;
    let cli = Cli::parse();

    let config = config::load_config().context("failed to load configuration")?;
    let db_path = config.db_path();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db_path_str = db_path.to_string_lossy();
    let db = Database::open(&db_path_str).context("failed to open database")?;
    info!("Database opened at {}", db_path.display());
    let store: Arc<dyn PlayerStore> = Arc::new(db);

    match commands::run(cli.command, &config, store).await {
        Ok(output) => {
            let text = serde_json::to_string_pretty(&output).context("failed to render output")?;
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {e}");
            Ok(if e.is_not_found() {
                ExitCode::from(EXIT_NOT_FOUND)
            } else if e.is_unavailable() {
                ExitCode::from(EXIT_UNAVAILABLE)
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

/// Log to stderr so stdout stays machine-readable.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dugout=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
