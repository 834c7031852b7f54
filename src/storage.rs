//! JSON document storage for the mood journal.
//!
//! The whole journal lives in one pretty-printed UTF-8 JSON file that is
//! read wholesale on load and rewritten wholesale on every save. Two
//! document shapes exist, one per [`Variant`]:
//!
//! - extended: `{ "mood_data": [...], "comments": [...] }`, entries carry an
//!   `id` and an embedded copy of their comments
//! - basic: a bare `[...]` array of entries without ids or comments
//!
//! The shapes are not interchangeable. Loading one with a store configured
//! for the other is a [`StorageError::SchemaMismatch`]; converting a basic
//! document is an explicit step ([`Storage::migrate_legacy`]).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::catalog::MoodKind;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    SchemaMismatch {
        expected: Variant,
        found: &'static str,
    },
    MigrationTargetNotEmpty(PathBuf),
    MigrationUnsupported(Variant),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "io error: {e}"),
            StorageError::Parse(e) => write!(f, "malformed journal document: {e}"),
            StorageError::SchemaMismatch { expected, found } => write!(
                f,
                "schema mismatch: expected {} document ({}), found {found}",
                expected,
                expected.document_shape()
            ),
            StorageError::MigrationTargetNotEmpty(path) => write!(
                f,
                "refusing to migrate: {} already contains journal data",
                path.display()
            ),
            StorageError::MigrationUnsupported(variant) => {
                write!(f, "cannot migrate into a {variant} journal")
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Parse(e)
    }
}

impl StorageError {
    /// True for errors caused by the document's content rather than by I/O.
    pub fn is_unreadable_document(&self) -> bool {
        matches!(
            self,
            StorageError::Parse(_) | StorageError::SchemaMismatch { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// Which document shape and feature set the journal runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Extended,
    Basic,
}

impl Variant {
    pub fn supports_comments(self) -> bool {
        matches!(self, Variant::Extended)
    }

    fn document_shape(self) -> &'static str {
        match self {
            Variant::Extended => "object with mood_data and comments",
            Variant::Basic => "bare array of entries",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Extended => f.write_str("extended"),
            Variant::Basic => f.write_str("basic"),
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "extended" => Ok(Variant::Extended),
            "basic" => Ok(Variant::Basic),
            other => Err(format!(
                "unknown variant {other:?} (expected \"extended\" or \"basic\")"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

pub const MIN_INTENSITY: u8 = 1;
pub const MAX_INTENSITY: u8 = 10;

/// Self-reported mood strength, always within `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Intensity(u8);

impl Intensity {
    pub fn new(value: i64) -> Option<Self> {
        if (i64::from(MIN_INTENSITY)..=i64::from(MAX_INTENSITY)).contains(&value) {
            Some(Intensity(value as u8))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Intensity {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Intensity::new(value).ok_or_else(|| {
            format!("intensity {value} outside {MIN_INTENSITY}..={MAX_INTENSITY}")
        })
    }
}

impl From<Intensity> for u8 {
    fn from(value: Intensity) -> Self {
        value.0
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One saved mood record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: u64,
    pub timestamp: NaiveDateTime,
    pub mood: MoodKind,
    pub intensity: Intensity,
    #[serde(default)]
    pub thoughts: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// A comment left under an entry. `mood_entry_id` is not checked against
/// existing entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub mood_entry_id: u64,
    pub commenter_name: String,
    pub comment_text: String,
    pub timestamp: NaiveDateTime,
}

/// Everything the journal holds. `comments` is the only copy of each
/// comment; per-entry lists are derived from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalState {
    pub entries: Vec<MoodEntry>,
    pub comments: Vec<Comment>,
}

impl JournalState {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.comments.is_empty()
    }

    /// Next entry id: one past the largest id ever persisted.
    pub fn next_entry_id(&self) -> u64 {
        self.entries.iter().map(|e| e.id).max().unwrap_or(0) + 1
    }

    pub fn next_comment_id(&self) -> u64 {
        self.comments.iter().map(|c| c.id).max().unwrap_or(0) + 1
    }

    pub fn entry(&self, id: u64) -> Option<&MoodEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Comments attached to `entry_id`, in insertion order.
    pub fn comments_for(&self, entry_id: u64) -> impl Iterator<Item = &Comment> + '_ {
        self.comments
            .iter()
            .filter(move |c| c.mood_entry_id == entry_id)
    }

    /// Whether the entry at `index` is the first one carrying its id.
    /// Comments attach to that entry only, so a hand-edited document with
    /// repeated ids shows each comment once.
    pub fn owns_comments(&self, index: usize) -> bool {
        match self.entries.get(index) {
            Some(entry) => self.entries.iter().position(|e| e.id == entry.id) == Some(index),
            None => false,
        }
    }

    /// Comments whose `mood_entry_id` matches no entry.
    pub fn orphaned_comments(&self) -> impl Iterator<Item = &Comment> + '_ {
        self.comments
            .iter()
            .filter(move |c| self.entry(c.mood_entry_id).is_none())
    }
}

// ---------------------------------------------------------------------------
// On-disk shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct WrappedDocument {
    #[serde(default)]
    mood_data: Vec<MoodEntry>,
    #[serde(default)]
    comments: Vec<Comment>,
}

/// Entry as written in a basic document (no id, no comments).
#[derive(Deserialize)]
struct BasicEntry {
    timestamp: NaiveDateTime,
    mood: MoodKind,
    intensity: Intensity,
    #[serde(default)]
    thoughts: String,
    #[serde(default)]
    image: Option<String>,
}

#[derive(Serialize)]
struct WrappedDocumentRef<'a> {
    mood_data: Vec<EntryWithComments<'a>>,
    comments: &'a [Comment],
}

#[derive(Serialize)]
struct EntryWithComments<'a> {
    #[serde(flatten)]
    entry: &'a MoodEntry,
    comments: Vec<&'a Comment>,
}

#[derive(Serialize)]
struct BasicEntryRef<'a> {
    timestamp: &'a NaiveDateTime,
    mood: MoodKind,
    intensity: Intensity,
    thoughts: &'a str,
    image: Option<&'a str>,
}

fn shape_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Object(_) => "object",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Null => "null",
    }
}

fn entries_from_basic(entries: Vec<BasicEntry>) -> Vec<MoodEntry> {
    entries
        .into_iter()
        .zip(1u64..)
        .map(|(e, id)| MoodEntry {
            id,
            timestamp: e.timestamp,
            mood: e.mood,
            intensity: e.intensity,
            thoughts: e.thoughts,
            image: e.image,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Summary of a legacy document conversion.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MigrationReport {
    pub entries_migrated: usize,
    /// Where the original basic document was moved to.
    pub legacy_moved_to: Option<PathBuf>,
}

/// Handle to the journal document on disk.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
    variant: Variant,
}

impl Storage {
    /// Bind a store to `path`. The document itself is created lazily on the
    /// first save; the parent directory is created now.
    pub fn open(path: &Path, variant: Variant) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
            variant,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Read the whole journal. A missing document is an empty journal.
    pub fn load(&self) -> Result<JournalState, StorageError> {
        if !self.path.exists() {
            return Ok(JournalState::default());
        }
        let data = std::fs::read_to_string(&self.path)?;
        parse_document(&data, self.variant)
    }

    /// Rewrite the whole document from `state`.
    pub fn save(&self, state: &JournalState) -> Result<(), StorageError> {
        let json = render_document(state, self.variant)?;
        let tmp = sibling_with_suffix(&self.path, "tmp");
        std::fs::write(&tmp, json)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    /// Convert a basic (bare array) document at `legacy_path` into this
    /// extended store. Entries receive ids `1..=n` in file order and the
    /// legacy file is renamed to `<name>.migrated`. Migrating in place
    /// (`legacy_path` is this store's own path) keeps a `.migrated` copy
    /// of the original.
    pub fn migrate_legacy(&self, legacy_path: &Path) -> Result<MigrationReport, StorageError> {
        if self.variant != Variant::Extended {
            return Err(StorageError::MigrationUnsupported(self.variant));
        }
        if !legacy_path.exists() {
            return Ok(MigrationReport::default());
        }

        let data = std::fs::read_to_string(legacy_path)?;
        let value: serde_json::Value = serde_json::from_str(&data)?;
        if !value.is_array() {
            return Err(StorageError::SchemaMismatch {
                expected: Variant::Basic,
                found: shape_name(&value),
            });
        }
        let legacy: Vec<BasicEntry> = serde_json::from_value(value)?;
        let state = JournalState {
            entries: entries_from_basic(legacy),
            comments: Vec::new(),
        };

        let in_place = legacy_path == self.path.as_path();
        if !in_place && !self.load()?.is_empty() {
            return Err(StorageError::MigrationTargetNotEmpty(self.path.clone()));
        }

        let moved_to = sibling_with_suffix(legacy_path, "migrated");
        if in_place {
            std::fs::copy(legacy_path, &moved_to)?;
            self.save(&state)?;
        } else {
            self.save(&state)?;
            std::fs::rename(legacy_path, &moved_to)?;
        }

        Ok(MigrationReport {
            entries_migrated: state.entries.len(),
            legacy_moved_to: Some(moved_to),
        })
    }
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

fn parse_document(data: &str, variant: Variant) -> Result<JournalState, StorageError> {
    let value: serde_json::Value = serde_json::from_str(data)?;
    let found = shape_name(&value);
    match variant {
        Variant::Extended if value.is_object() => {
            let doc: WrappedDocument = serde_json::from_value(value)?;
            Ok(JournalState {
                entries: doc.mood_data,
                comments: doc.comments,
            })
        }
        Variant::Basic if value.is_array() => {
            let entries: Vec<BasicEntry> = serde_json::from_value(value)?;
            Ok(JournalState {
                entries: entries_from_basic(entries),
                comments: Vec::new(),
            })
        }
        expected => Err(StorageError::SchemaMismatch { expected, found }),
    }
}

fn render_document(state: &JournalState, variant: Variant) -> Result<String, serde_json::Error> {
    match variant {
        Variant::Extended => {
            let doc = WrappedDocumentRef {
                mood_data: state
                    .entries
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| EntryWithComments {
                        entry,
                        comments: if state.owns_comments(index) {
                            state.comments_for(entry.id).collect()
                        } else {
                            Vec::new()
                        },
                    })
                    .collect(),
                comments: &state.comments,
            };
            serde_json::to_string_pretty(&doc)
        }
        Variant::Basic => {
            let entries: Vec<BasicEntryRef<'_>> = state
                .entries
                .iter()
                .map(|e| BasicEntryRef {
                    timestamp: &e.timestamp,
                    mood: e.mood,
                    intensity: e.intensity,
                    thoughts: &e.thoughts,
                    image: e.image.as_deref(),
                })
                .collect();
            serde_json::to_string_pretty(&entries)
        }
    }
}
