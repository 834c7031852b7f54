//! Entry service: the only code that mutates the journal.
//!
//! A [`Journal`] owns the in-memory [`JournalState`] and the [`Storage`] it
//! was opened with. Every successful mutation is flushed before returning;
//! if the flush fails the in-memory change is undone so memory and disk
//! agree.

use std::fmt;

use chrono::{NaiveDateTime, SubsecRound};

use crate::catalog::MoodKind;
use crate::logging;
use crate::storage::{
    Comment, Intensity, JournalState, MoodEntry, Storage, StorageError, Variant, MAX_INTENSITY,
    MIN_INTENSITY,
};
use crate::tlog;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Rejected user input. The journal is unchanged when one of these is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    UnknownMood(String),
    IntensityOutOfRange(i64),
    NoMoodSelected,
    MissingCommentField,
    CommentsUnsupported,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnknownMood(key) => write!(f, "unknown mood: {key:?}"),
            ValidationError::IntensityOutOfRange(value) => write!(
                f,
                "intensity {value} must be between {MIN_INTENSITY} and {MAX_INTENSITY}"
            ),
            ValidationError::NoMoodSelected => write!(f, "select a mood first"),
            ValidationError::MissingCommentField => {
                write!(f, "both a name and comment text are required")
            }
            ValidationError::CommentsUnsupported => {
                write!(f, "comments are not available in the basic journal")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug)]
pub enum JournalError {
    Validation(ValidationError),
    Storage(StorageError),
    /// The document could not be read at the last refresh; writes are
    /// refused so it is not overwritten.
    Degraded(String),
}

impl fmt::Display for JournalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalError::Validation(e) => write!(f, "{e}"),
            JournalError::Storage(e) => write!(f, "storage error: {e}"),
            JournalError::Degraded(warning) => write!(f, "journal is read-only: {warning}"),
        }
    }
}

impl std::error::Error for JournalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JournalError::Validation(e) => Some(e),
            JournalError::Storage(e) => Some(e),
            JournalError::Degraded(_) => None,
        }
    }
}

impl From<ValidationError> for JournalError {
    fn from(e: ValidationError) -> Self {
        JournalError::Validation(e)
    }
}

impl From<StorageError> for JournalError {
    fn from(e: StorageError) -> Self {
        JournalError::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

/// Creation instant for new records, local wall-clock time at microsecond
/// precision.
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local().trunc_subsecs(6)
}

pub fn parse_mood(key: &str) -> Result<MoodKind, ValidationError> {
    MoodKind::from_key(key).ok_or_else(|| ValidationError::UnknownMood(key.to_string()))
}

pub fn parse_intensity(value: i64) -> Result<Intensity, ValidationError> {
    Intensity::new(value).ok_or(ValidationError::IntensityOutOfRange(value))
}

pub struct Journal {
    storage: Storage,
    state: JournalState,
    warning: Option<String>,
}

impl Journal {
    /// Open the journal and load its current contents.
    ///
    /// I/O failures are returned; an unreadable document yields a degraded
    /// journal instead (see [`Journal::refresh`]).
    pub fn open(storage: Storage) -> Result<Self, StorageError> {
        let mut journal = Self {
            storage,
            state: JournalState::default(),
            warning: None,
        };
        journal.refresh()?;
        Ok(journal)
    }

    /// Re-read the document from disk.
    ///
    /// A malformed document or one of the wrong variant leaves the journal
    /// empty with a warning set, and writes are refused until a later
    /// refresh succeeds.
    pub fn refresh(&mut self) -> Result<(), StorageError> {
        match self.storage.load() {
            Ok(state) => {
                if self.warning.take().is_some() {
                    tlog!("journal: {} is readable again", self.storage.path().display());
                }
                self.state = state;
                Ok(())
            }
            Err(e) if e.is_unreadable_document() => {
                let warning = format!(
                    "could not read {}: {e}; showing an empty journal and refusing writes until the file is fixed",
                    self.storage.path().display()
                );
                if self.warning.as_deref() != Some(warning.as_str()) {
                    tlog!("journal: WARNING: {}", warning);
                }
                self.state = JournalState::default();
                self.warning = Some(warning);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn state(&self) -> &JournalState {
        &self.state
    }

    pub fn entries(&self) -> &[MoodEntry] {
        &self.state.entries
    }

    pub fn comments(&self) -> &[Comment] {
        &self.state.comments
    }

    pub fn entry(&self, id: u64) -> Option<&MoodEntry> {
        self.state.entry(id)
    }

    pub fn comments_for(&self, entry_id: u64) -> Vec<&Comment> {
        self.state.comments_for(entry_id).collect()
    }

    pub fn orphaned_comments(&self) -> Vec<&Comment> {
        self.state.orphaned_comments().collect()
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn variant(&self) -> Variant {
        self.storage.variant()
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    fn ensure_writable(&self) -> Result<(), JournalError> {
        match &self.warning {
            Some(warning) => Err(JournalError::Degraded(warning.clone())),
            None => Ok(()),
        }
    }

    /// Validate and save a new entry.
    pub fn create_entry(
        &mut self,
        mood: &str,
        intensity: i64,
        thoughts: &str,
        image: Option<String>,
    ) -> Result<MoodEntry, JournalError> {
        let mood = parse_mood(mood)?;
        let intensity = parse_intensity(intensity)?;
        self.ensure_writable()?;

        let entry = MoodEntry {
            id: self.state.next_entry_id(),
            timestamp: now(),
            mood,
            intensity,
            thoughts: thoughts.to_string(),
            image: image.filter(|i| !i.is_empty()),
        };
        self.state.entries.push(entry.clone());

        if let Err(e) = self.storage.save(&self.state) {
            self.state.entries.pop();
            tlog!("journal: failed to save entry: {}", e);
            return Err(e.into());
        }

        tlog!(
            "journal: saved {} {} ({}/10){}",
            logging::entry_id(entry.id),
            logging::mood(entry.mood),
            entry.intensity,
            if entry.image.is_some() { " with image" } else { "" }
        );
        Ok(entry)
    }

    /// Validate and save a comment under `entry_id`.
    ///
    /// A comment for an id that matches no entry is still stored; it just
    /// never shows up under an entry.
    pub fn create_comment(
        &mut self,
        entry_id: u64,
        commenter_name: &str,
        comment_text: &str,
    ) -> Result<Comment, JournalError> {
        if !self.variant().supports_comments() {
            return Err(ValidationError::CommentsUnsupported.into());
        }
        if commenter_name.trim().is_empty() || comment_text.trim().is_empty() {
            return Err(ValidationError::MissingCommentField.into());
        }
        self.ensure_writable()?;

        let comment = Comment {
            id: self.state.next_comment_id(),
            mood_entry_id: entry_id,
            commenter_name: commenter_name.to_string(),
            comment_text: comment_text.to_string(),
            timestamp: now(),
        };
        self.state.comments.push(comment.clone());

        if let Err(e) = self.storage.save(&self.state) {
            self.state.comments.pop();
            tlog!("journal: failed to save comment: {}", e);
            return Err(e.into());
        }

        if self.state.entry(entry_id).is_none() {
            tlog!(
                "journal: comment c-{} references missing {}; stored but not shown",
                comment.id,
                logging::entry_id(entry_id)
            );
        } else {
            tlog!(
                "journal: comment c-{} on {}",
                comment.id,
                logging::entry_id(entry_id)
            );
        }
        Ok(comment)
    }
}
