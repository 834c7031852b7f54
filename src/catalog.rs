//! The closed set of mood kinds a journal entry can carry.
//!
//! Every persisted entry stores one of these keys. Lookups with any other
//! key fail instead of falling back to a default, so a hand-edited or
//! foreign document is rejected at the edge rather than rendered wrongly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    UnknownMood(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::UnknownMood(key) => write!(f, "unknown mood: {key:?}"),
        }
    }
}

impl std::error::Error for CatalogError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodKind {
    Happy,
    Calm,
    Excited,
    Sad,
    Tired,
    Anxious,
    Angry,
    Loved,
    Other,
}

impl MoodKind {
    /// All moods in picker order.
    pub const ALL: [MoodKind; 9] = [
        MoodKind::Happy,
        MoodKind::Calm,
        MoodKind::Excited,
        MoodKind::Sad,
        MoodKind::Tired,
        MoodKind::Anxious,
        MoodKind::Angry,
        MoodKind::Loved,
        MoodKind::Other,
    ];

    pub fn key(self) -> &'static str {
        match self {
            MoodKind::Happy => "happy",
            MoodKind::Calm => "calm",
            MoodKind::Excited => "excited",
            MoodKind::Sad => "sad",
            MoodKind::Tired => "tired",
            MoodKind::Anxious => "anxious",
            MoodKind::Angry => "angry",
            MoodKind::Loved => "loved",
            MoodKind::Other => "other",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            MoodKind::Happy => "😊",
            MoodKind::Calm => "😌",
            MoodKind::Excited => "🤩",
            MoodKind::Sad => "😢",
            MoodKind::Tired => "😴",
            MoodKind::Anxious => "😰",
            MoodKind::Angry => "😠",
            MoodKind::Loved => "🥰",
            MoodKind::Other => "🤔",
        }
    }

    /// Localized display name shown on buttons, history cards and charts.
    pub fn name(self) -> &'static str {
        match self {
            MoodKind::Happy => "开心",
            MoodKind::Calm => "平静",
            MoodKind::Excited => "兴奋",
            MoodKind::Sad => "难过",
            MoodKind::Tired => "疲惫",
            MoodKind::Anxious => "焦虑",
            MoodKind::Angry => "愤怒",
            MoodKind::Loved => "被爱",
            MoodKind::Other => "其他",
        }
    }

    /// Chart colour for this mood (qualitative pastel palette).
    pub fn color(self) -> Option<&'static str> {
        let color = match self {
            MoodKind::Happy => "#8DD3C7",
            MoodKind::Calm => "#FFFFB3",
            MoodKind::Excited => "#BEBADA",
            MoodKind::Sad => "#FB8072",
            MoodKind::Tired => "#80B1D3",
            MoodKind::Anxious => "#FDB462",
            MoodKind::Angry => "#B3DE69",
            MoodKind::Loved => "#FCCDE5",
            MoodKind::Other => "#D9D9D9",
        };
        Some(color)
    }

    pub fn from_key(key: &str) -> Option<MoodKind> {
        MoodKind::ALL.into_iter().find(|m| m.key() == key)
    }

    pub fn info(self) -> MoodInfo {
        MoodInfo {
            key: self,
            emoji: self.emoji(),
            name: self.name(),
            color: self.color(),
        }
    }
}

impl FromStr for MoodKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoodKind::from_key(s).ok_or_else(|| CatalogError::UnknownMood(s.to_string()))
    }
}

impl fmt::Display for MoodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Rendering data for one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodInfo {
    pub key: MoodKind,
    pub emoji: &'static str,
    pub name: &'static str,
    pub color: Option<&'static str>,
}

/// The full catalog in picker order.
pub fn catalog() -> Vec<MoodInfo> {
    MoodKind::ALL.into_iter().map(MoodKind::info).collect()
}

/// Look up a mood by its persisted key, failing on anything outside the set.
pub fn lookup(key: &str) -> Result<MoodInfo, CatalogError> {
    key.parse::<MoodKind>().map(MoodKind::info)
}
