//! Task data structure and related write-side types.
//!
//! This module defines the core `Task` struct representing a single planner
//! entry, the `Category` classification, and the draft/patch types the store
//! accepts for creation and partial update.

use chrono::{DateTime, Local, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Commitment category for a task.
///
/// Serialized names match the planner's backup format, so exported JSON can
/// be read back by older copies of the data file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
pub enum Category {
    #[serde(rename = "NON NEGOTIABLE")]
    NonNegotiable,
    #[serde(rename = "HAVE TO")]
    HaveTo,
    #[serde(rename = "WANT TO")]
    WantTo,
}

/// Format a category for display.
pub fn format_category(c: Option<Category>) -> &'static str {
    match c {
        Some(Category::NonNegotiable) => "NON NEGOTIABLE",
        Some(Category::HaveTo) => "HAVE TO",
        Some(Category::WantTo) => "WANT TO",
        None => "-",
    }
}

/// A single planner entry: either scheduled (has a start time, appears in
/// the weekly grid) or unscheduled (lives in the sidebar).
///
/// `week_date` and `title_color` are derived fields, owned by the store's
/// normalization step. `week_date` is the Monday of the week containing
/// `start_time` and is `None` exactly when `start_time` is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub details: String,
    pub start_time: Option<DateTime<Local>>,
    pub duration: u32,
    pub category: Option<Category>,
    pub title_color: String,
    pub is_done: bool,
    pub week_date: Option<NaiveDate>,
}

/// Input for creating a task. Unset fields take the planner defaults
/// (duration 60, auto-derived color).
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub notes: String,
    pub details: String,
    pub start_time: Option<DateTime<Local>>,
    pub duration: Option<u32>,
    pub category: Option<Category>,
    pub title_color: Option<String>,
    pub is_done: bool,
}

/// Partial update for an existing task. `None` leaves a field untouched;
/// the nested options distinguish "set to nothing" from "leave alone".
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub details: Option<String>,
    pub start_time: Option<Option<DateTime<Local>>>,
    pub duration: Option<u32>,
    pub category: Option<Option<Category>>,
    pub title_color: Option<String>,
    pub is_done: Option<bool>,
}

impl TaskPatch {
    /// Patch that only reschedules (or unschedules) a task.
    pub fn reschedule(start_time: Option<DateTime<Local>>) -> Self {
        TaskPatch {
            start_time: Some(start_time),
            ..TaskPatch::default()
        }
    }

    /// Patch that only sets the completion flag.
    pub fn set_done(is_done: bool) -> Self {
        TaskPatch {
            is_done: Some(is_done),
            ..TaskPatch::default()
        }
    }
}
