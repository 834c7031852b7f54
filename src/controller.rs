//! Page-level state and actions.
//!
//! The [`Controller`] holds what the page needs between requests (the mood
//! the user picked but has not saved yet) and turns the journal into a
//! [`PageView`] with the history and comment feeds cut to their display
//! windows. Truncation here is display-only; nothing is dropped from disk.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::catalog::{catalog, MoodInfo, MoodKind};
use crate::charts::{build_charts, Charts};
use crate::journal::{parse_mood, Journal, JournalError, ValidationError};
use crate::photo::is_data_uri;
use crate::storage::{Comment, MoodEntry, StorageError, Variant, MAX_INTENSITY, MIN_INTENSITY};

pub const EXTENDED_HISTORY_WINDOW: usize = 10;
pub const BASIC_HISTORY_WINDOW: usize = 5;
pub const RECENT_COMMENTS_WINDOW: usize = 5;
pub const DEFAULT_INTENSITY: u8 = 5;

const DISPLAY_TIME_FORMAT: &str = "%m月%d日 %H:%M";
const HEADER_TIME_FORMAT: &str = "%Y年%m月%d日 %H:%M";

pub fn history_window(variant: Variant) -> usize {
    match variant {
        Variant::Extended => EXTENDED_HISTORY_WINDOW,
        Variant::Basic => BASIC_HISTORY_WINDOW,
    }
}

pub fn display_time(ts: &NaiveDateTime) -> String {
    ts.format(DISPLAY_TIME_FORMAT).to_string()
}

/// The last `window` items, newest first.
fn most_recent_first<T>(items: &[T], window: usize) -> impl Iterator<Item = &T> {
    items[items.len().saturating_sub(window)..].iter().rev()
}

#[derive(Debug, Clone, Serialize)]
pub struct SliderView {
    pub min: u8,
    pub max: u8,
    pub default: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: u64,
    pub mood_entry_id: u64,
    pub commenter_name: String,
    pub comment_text: String,
    pub timestamp: NaiveDateTime,
    pub display_time: String,
}

impl From<&Comment> for CommentView {
    fn from(c: &Comment) -> Self {
        Self {
            id: c.id,
            mood_entry_id: c.mood_entry_id,
            commenter_name: c.commenter_name.clone(),
            comment_text: c.comment_text.clone(),
            timestamp: c.timestamp,
            display_time: display_time(&c.timestamp),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    pub id: u64,
    pub mood: MoodInfo,
    pub intensity: u8,
    pub thoughts: String,
    pub image: Option<String>,
    /// True when `image` is an inline data URI rather than a file name.
    pub image_inline: bool,
    pub timestamp: NaiveDateTime,
    pub display_time: String,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub variant: Variant,
    pub now: String,
    pub moods: Vec<MoodInfo>,
    pub selected_mood: Option<MoodInfo>,
    pub intensity: SliderView,
    pub comments_enabled: bool,
    pub history: Vec<EntryView>,
    pub total_entries: usize,
    pub recent_comments: Vec<CommentView>,
    pub total_comments: usize,
    pub charts: Charts,
    pub warning: Option<String>,
}

pub struct Controller {
    journal: Journal,
    selected_mood: Option<MoodKind>,
}

impl Controller {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            selected_mood: None,
        }
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn selected_mood(&self) -> Option<MoodKind> {
        self.selected_mood
    }

    /// Remember the picked mood for the next submit. Nothing is saved.
    pub fn select_mood(&mut self, key: &str) -> Result<MoodKind, ValidationError> {
        let mood = parse_mood(key)?;
        self.selected_mood = Some(mood);
        Ok(mood)
    }

    /// Save an entry with the selected mood, then clear the selection.
    pub fn submit_entry(
        &mut self,
        intensity: i64,
        thoughts: &str,
        image: Option<String>,
    ) -> Result<MoodEntry, JournalError> {
        let mood = self.selected_mood.ok_or(ValidationError::NoMoodSelected)?;
        let entry = self
            .journal
            .create_entry(mood.key(), intensity, thoughts, image)?;
        self.selected_mood = None;
        Ok(entry)
    }

    pub fn submit_comment(
        &mut self,
        entry_id: u64,
        commenter_name: &str,
        comment_text: &str,
    ) -> Result<Comment, JournalError> {
        self.journal
            .create_comment(entry_id, commenter_name, comment_text)
    }

    pub fn refresh(&mut self) -> Result<(), StorageError> {
        self.journal.refresh()
    }

    pub fn entry_view(&self, entry: &MoodEntry) -> EntryView {
        EntryView {
            id: entry.id,
            mood: entry.mood.info(),
            intensity: entry.intensity.get(),
            thoughts: entry.thoughts.clone(),
            image_inline: entry.image.as_deref().map(is_data_uri).unwrap_or(false),
            image: entry.image.clone(),
            timestamp: entry.timestamp,
            display_time: display_time(&entry.timestamp),
            comments: self
                .journal
                .comments_for(entry.id)
                .into_iter()
                .map(CommentView::from)
                .collect(),
        }
    }

    /// The last `window` entries, newest first. An entry repeating an
    /// earlier id gets no comments; they belong to the first one.
    fn history(&self, window: usize) -> Vec<EntryView> {
        let state = self.journal.state();
        let start = state.entries.len().saturating_sub(window);
        (start..state.entries.len())
            .rev()
            .map(|index| {
                let mut view = self.entry_view(&state.entries[index]);
                if !state.owns_comments(index) {
                    view.comments.clear();
                }
                view
            })
            .collect()
    }

    pub fn render(&self) -> PageView {
        self.render_at(crate::journal::now())
    }

    pub fn render_at(&self, now: NaiveDateTime) -> PageView {
        let variant = self.journal.variant();
        let entries = self.journal.entries();
        let comments = self.journal.comments();

        let recent_comments = if variant.supports_comments() {
            most_recent_first(comments, RECENT_COMMENTS_WINDOW)
                .map(CommentView::from)
                .collect()
        } else {
            Vec::new()
        };

        PageView {
            variant,
            now: now.format(HEADER_TIME_FORMAT).to_string(),
            moods: catalog(),
            selected_mood: self.selected_mood.map(MoodKind::info),
            intensity: SliderView {
                min: MIN_INTENSITY,
                max: MAX_INTENSITY,
                default: DEFAULT_INTENSITY,
            },
            comments_enabled: variant.supports_comments(),
            history: self.history(history_window(variant)),
            total_entries: entries.len(),
            recent_comments,
            total_comments: comments.len(),
            charts: build_charts(entries),
            warning: self.journal.warning().map(str::to_string),
        }
    }
}
