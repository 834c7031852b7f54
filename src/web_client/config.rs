//! Configuration types and constants for the mood-web server.

use std::path::PathBuf;

use clap::Parser;

use crate::photo::MAX_IMAGE_SIZE;
use crate::storage::Variant;

pub(crate) const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";
pub(crate) const DEFAULT_DATA_FILE: &str = "mood_data.json";

/// Body limit for `POST /api/images`: the image plus multipart framing.
pub(crate) const MAX_UPLOAD_BODY: usize = MAX_IMAGE_SIZE + 4096;

/// Body limit for `POST /api/entries`. An inline PNG re-encoded from a
/// compressed upload can be several times the upload size, and base64 adds
/// a third on top.
pub(crate) const MAX_ENTRY_BODY: usize = 64 * 1024 * 1024; // 64 MiB

/// Mood journal web page.
///
/// Serves the journaling page and its JSON API, storing everything in one
/// JSON document.
///
/// Configuration can be set via CLI arguments or environment variables.
/// CLI arguments take precedence over environment variables.
#[derive(Parser, Debug, Default)]
#[command(name = "mood-web", version, about)]
pub struct Cli {
    /// HTTP server bind address [env: MOOD_WEB_BIND] [default: 127.0.0.1:8501]
    #[arg(long, short = 'b')]
    pub bind: Option<String>,

    /// Journal document path [env: MOOD_DATA_FILE] [default: mood_data.json]
    #[arg(long, short = 'd')]
    pub data_file: Option<PathBuf>,

    /// Journal variant, "extended" or "basic" [env: MOOD_VARIANT] [default: extended]
    #[arg(long)]
    pub variant: Option<String>,

    /// Convert a basic (bare array) document into the journal before serving
    /// [env: MOOD_MIGRATE_LEGACY]
    #[arg(long)]
    pub migrate_legacy: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: String,
    pub data_file: PathBuf,
    pub variant: Variant,
    pub migrate_legacy: Option<PathBuf>,
}

impl Config {
    pub fn from_cli_and_env(cli: Cli) -> Result<Self, String> {
        Self::from_cli_and_lookup(cli, |key| std::env::var(key).ok())
    }

    /// Resolve settings with `lookup` standing in for the environment.
    pub fn from_cli_and_lookup(
        cli: Cli,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let bind_addr = cli
            .bind
            .or_else(|| lookup("MOOD_WEB_BIND"))
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let data_file = cli
            .data_file
            .or_else(|| lookup("MOOD_DATA_FILE").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

        let variant = match cli.variant.or_else(|| lookup("MOOD_VARIANT")) {
            Some(raw) => raw.parse::<Variant>()?,
            None => Variant::default(),
        };

        let migrate_legacy = cli
            .migrate_legacy
            .or_else(|| lookup("MOOD_MIGRATE_LEGACY").map(PathBuf::from));

        if migrate_legacy.is_some() && variant != Variant::Extended {
            return Err("--migrate-legacy requires the extended variant".to_string());
        }

        Ok(Self {
            bind_addr,
            data_file,
            variant,
            migrate_legacy,
        })
    }
}
