//! Aggregations over journal entries and the chart figures built from them.
//!
//! A [`ChartFigure`] is plain data (title, axis labels, points). The page
//! script turns it into a drawing; nothing here knows about rendering.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::catalog::MoodKind;
use crate::storage::MoodEntry;

pub const DISTRIBUTION_TITLE: &str = "情绪分布";
pub const TIMELINE_TITLE: &str = "情绪强度变化";
pub const TIMELINE_X_LABEL: &str = "时间";
pub const TIMELINE_Y_LABEL: &str = "强度";

/// Number of entries recorded for one mood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodCount {
    pub mood: MoodKind,
    pub label: &'static str,
    pub emoji: &'static str,
    pub color: Option<&'static str>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub timestamp: NaiveDateTime,
    pub intensity: u8,
}

/// Count entries per mood, most frequent first. Ties keep catalog order.
pub fn mood_distribution(entries: &[MoodEntry]) -> Vec<MoodCount> {
    let mut counts: BTreeMap<MoodKind, usize> = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.mood).or_default() += 1;
    }

    let mut distribution: Vec<MoodCount> = counts
        .into_iter()
        .map(|(mood, count)| MoodCount {
            mood,
            label: mood.name(),
            emoji: mood.emoji(),
            color: mood.color(),
            count,
        })
        .collect();
    // Stable sort keeps the BTreeMap (catalog) order among equal counts.
    distribution.sort_by(|a, b| b.count.cmp(&a.count));
    distribution
}

/// The distribution keyed by display name.
pub fn as_label_counts(distribution: &[MoodCount]) -> BTreeMap<&'static str, usize> {
    distribution.iter().map(|m| (m.label, m.count)).collect()
}

/// One point per entry, in stored order.
pub fn intensity_timeline(entries: &[MoodEntry]) -> Vec<TimelinePoint> {
    entries
        .iter()
        .map(|e| TimelinePoint {
            timestamp: e.timestamp,
            intensity: e.intensity.get(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Pie,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigurePoint {
    pub label: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFigure {
    pub kind: ChartKind,
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_label: Option<&'static str>,
    pub points: Vec<FigurePoint>,
}

/// Pie chart of the distribution; `None` when there is nothing to draw.
pub fn distribution_figure(distribution: &[MoodCount]) -> Option<ChartFigure> {
    if distribution.is_empty() {
        return None;
    }
    Some(ChartFigure {
        kind: ChartKind::Pie,
        title: DISTRIBUTION_TITLE,
        x_label: None,
        y_label: None,
        points: distribution
            .iter()
            .map(|m| FigurePoint {
                label: m.label.to_string(),
                value: m.count as f64,
                color: m.color,
            })
            .collect(),
    })
}

/// Line chart of intensity over time; `None` when there is nothing to draw.
pub fn timeline_figure(timeline: &[TimelinePoint]) -> Option<ChartFigure> {
    if timeline.is_empty() {
        return None;
    }
    Some(ChartFigure {
        kind: ChartKind::Line,
        title: TIMELINE_TITLE,
        x_label: Some(TIMELINE_X_LABEL),
        y_label: Some(TIMELINE_Y_LABEL),
        points: timeline
            .iter()
            .map(|p| FigurePoint {
                label: p.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
                value: f64::from(p.intensity),
                color: None,
            })
            .collect(),
    })
}

/// Both figures for the current entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub distribution: Option<ChartFigure>,
    pub timeline: Option<ChartFigure>,
}

pub fn build_charts(entries: &[MoodEntry]) -> Charts {
    Charts {
        distribution: distribution_figure(&mood_distribution(entries)),
        timeline: timeline_figure(&intensity_timeline(entries)),
    }
}
