//! mood-web: the journaling page and its JSON API.
//!
//! Serves an embedded single page, answers the page's API calls, and keeps
//! every entry and comment in one JSON document on disk.

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;
pub mod static_files;
pub mod utils;

use clap::Parser;

use crate::controller::Controller;
use crate::journal::Journal;
use crate::storage::{Storage, StorageError};

use config::{Cli, Config};
use state::SharedState;

/// Open the journal described by `config`, migrating a legacy document
/// first when one is named.
pub fn open_state(config: &Config) -> Result<SharedState, StorageError> {
    let storage = Storage::open(&config.data_file, config.variant)?;

    if let Some(legacy) = &config.migrate_legacy {
        let report = storage.migrate_legacy(legacy)?;
        match &report.legacy_moved_to {
            Some(moved) => crate::tlog!(
                "  migrated {} entries from {} (original kept at {})",
                report.entries_migrated,
                legacy.display(),
                moved.display()
            ),
            None => crate::tlog!("  nothing to migrate at {}", legacy.display()),
        }
    }

    let journal = Journal::open(storage)?;
    crate::tlog!(
        "  journal: {} entries, {} comments",
        journal.entries().len(),
        journal.comments().len()
    );
    if let Some(warning) = journal.warning() {
        crate::tlog!("  WARNING: {}", warning);
        crate::tlog!("  The journal is read-only until the document is repaired.");
    }

    Ok(state::shared(Controller::new(journal)))
}

/// Entry point: parse CLI, open the journal, start server.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::from_cli_and_env(cli)?;

    crate::logging::init();

    crate::tlog!("mood-web starting");
    crate::tlog!("  data file: {}", config.data_file.display());
    crate::tlog!("  variant: {}", config.variant);

    let state = open_state(&config)?;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    crate::tlog!("mood-web listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
