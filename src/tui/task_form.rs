//! Task editor form for the terminal user interface.
//!
//! One form serves both creation and editing: text inputs for title, notes,
//! details and start time, cycling selectors for duration, category and
//! color, and a done toggle. The form validates on save and keeps the
//! editor open with an error message instead of losing input.

use chrono::{DateTime, Local};

use crate::calendar::{format_time, parse_start_input};
use crate::colors::color_options;
use crate::task::{format_category, Category, Task, TaskDraft, TaskPatch};
use crate::tui::input::InputField;

pub const TITLE_FIELD: usize = 0;
pub const NOTES_FIELD: usize = 1;
pub const DETAILS_FIELD: usize = 2;
pub const START_FIELD: usize = 3;
pub const DURATION_FIELD: usize = 4;
pub const CATEGORY_FIELD: usize = 5;
pub const COLOR_FIELD: usize = 6;
pub const DONE_FIELD: usize = 7;
pub const FIELD_COUNT: usize = 8;

/// Durations offered by the editor. The engine tolerates other positive
/// values (loaded from disk or set via the CLI); cycling snaps to these.
pub const DURATION_CHOICES: &[u32] = &[30, 60, 90, 120, 150, 180, 240];

pub const CATEGORY_CHOICES: [Option<Category>; 4] = [
    None,
    Some(Category::NonNegotiable),
    Some(Category::HaveTo),
    Some(Category::WantTo),
];

/// Editor state for one task.
pub struct TaskForm {
    pub title: InputField,
    pub notes: InputField,
    pub details: InputField,
    /// Start time as text, "YYYY-MM-DD HH:MM"; empty leaves the task
    /// unscheduled.
    pub start: InputField,
    pub duration: u32,
    pub category_index: usize,
    /// 0 is "Auto" (color derived from state); 1.. index the palette.
    pub color_index: usize,
    pub is_done: bool,
    pub current_field: usize,
    pub error: Option<String>,
}

impl TaskForm {
    /// Blank form for a new unscheduled task.
    pub fn new() -> Self {
        TaskForm {
            title: InputField::new(),
            notes: InputField::new(),
            details: InputField::new(),
            start: InputField::new(),
            duration: 60,
            category_index: 0,
            color_index: 0,
            is_done: false,
            current_field: TITLE_FIELD,
            error: None,
        }
    }

    /// Blank form pre-filled with a start time (click-to-create on a grid
    /// cell).
    pub fn for_start(start: DateTime<Local>) -> Self {
        let mut form = TaskForm::new();
        form.start = InputField::with_value(&format!(
            "{} {}",
            start.naive_local().date().format("%Y-%m-%d"),
            format_time(&start)
        ));
        form
    }

    /// Form pre-filled from an existing task.
    pub fn from_task(task: &Task) -> Self {
        let start_text = task
            .start_time
            .map(|s| {
                format!(
                    "{} {}",
                    s.naive_local().date().format("%Y-%m-%d"),
                    format_time(&s)
                )
            })
            .unwrap_or_default();
        let category_index = CATEGORY_CHOICES
            .iter()
            .position(|c| *c == task.category)
            .unwrap_or(0);
        let color_index = color_options()
            .iter()
            .position(|(_, hex)| *hex == task.title_color)
            .map(|i| i + 1)
            .unwrap_or(0);

        TaskForm {
            title: InputField::with_value(&task.title),
            notes: InputField::with_value(&task.notes),
            details: InputField::with_value(&task.details),
            start: InputField::with_value(&start_text),
            duration: task.duration,
            category_index,
            color_index,
            is_done: task.is_done,
            current_field: TITLE_FIELD,
            error: None,
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    /// The text input owned by the current field, if it is a text field.
    pub fn active_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_FIELD => Some(&mut self.title),
            NOTES_FIELD => Some(&mut self.notes),
            DETAILS_FIELD => Some(&mut self.details),
            START_FIELD => Some(&mut self.start),
            _ => None,
        }
    }

    /// Cycle the current selector field left or right.
    pub fn cycle(&mut self, forward: bool) {
        match self.current_field {
            DURATION_FIELD => {
                // Snaps to the nearest fixed choice; stays put at the ends.
                self.duration = if forward {
                    DURATION_CHOICES
                        .iter()
                        .copied()
                        .find(|&d| d > self.duration)
                        .unwrap_or(self.duration)
                } else {
                    DURATION_CHOICES
                        .iter()
                        .rev()
                        .copied()
                        .find(|&d| d < self.duration)
                        .unwrap_or(self.duration)
                };
            }
            CATEGORY_FIELD => {
                let n = CATEGORY_CHOICES.len();
                self.category_index = if forward {
                    (self.category_index + 1) % n
                } else {
                    (self.category_index + n - 1) % n
                };
            }
            COLOR_FIELD => {
                let n = color_options().len() + 1;
                self.color_index = if forward {
                    (self.color_index + 1) % n
                } else {
                    (self.color_index + n - 1) % n
                };
            }
            DONE_FIELD => self.is_done = !self.is_done,
            _ => {}
        }
    }

    pub fn category(&self) -> Option<Category> {
        CATEGORY_CHOICES[self.category_index % CATEGORY_CHOICES.len()]
    }

    pub fn category_label(&self) -> &'static str {
        match self.category() {
            None => "None",
            some => format_category(some),
        }
    }

    /// Selected palette color, or `None` for "Auto".
    pub fn color(&self) -> Option<&'static str> {
        if self.color_index == 0 {
            None
        } else {
            color_options()
                .get(self.color_index - 1)
                .map(|(_, hex)| *hex)
        }
    }

    pub fn color_label(&self) -> &'static str {
        if self.color_index == 0 {
            "Auto"
        } else {
            color_options()
                .get(self.color_index - 1)
                .map(|(label, _)| *label)
                .unwrap_or("Auto")
        }
    }

    fn parsed_start(&self) -> Result<Option<DateTime<Local>>, String> {
        let text = self.start.value.trim();
        if text.is_empty() {
            return Ok(None);
        }
        parse_start_input(text)
            .map(Some)
            .ok_or_else(|| "Start must be \"YYYY-MM-DD HH:MM\" (or empty)".to_string())
    }

    fn validated_title(&self) -> Result<String, String> {
        let title = self.title.value.trim();
        if title.is_empty() {
            Err("Title must not be empty".to_string())
        } else {
            Ok(title.to_string())
        }
    }

    /// Build a creation draft from the form.
    pub fn to_draft(&self) -> Result<TaskDraft, String> {
        Ok(TaskDraft {
            title: self.validated_title()?,
            notes: self.notes.value.clone(),
            details: self.details.value.clone(),
            start_time: self.parsed_start()?,
            duration: Some(self.duration),
            category: self.category(),
            title_color: self.color().map(str::to_string),
            is_done: self.is_done,
        })
    }

    /// Build a full-field patch from the form. "Auto" color is expressed as
    /// an empty string so the store re-derives it.
    pub fn to_patch(&self) -> Result<TaskPatch, String> {
        Ok(TaskPatch {
            title: Some(self.validated_title()?),
            notes: Some(self.notes.value.clone()),
            details: Some(self.details.value.clone()),
            start_time: Some(self.parsed_start()?),
            duration: Some(self.duration),
            category: Some(self.category()),
            title_color: Some(self.color().unwrap_or_default().to_string()),
            is_done: Some(self.is_done),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_blocks_save() {
        let form = TaskForm::new();
        assert!(form.to_draft().is_err());
        assert!(form.to_patch().is_err());
    }

    #[test]
    fn bad_start_text_blocks_save() {
        let mut form = TaskForm::new();
        form.title = InputField::with_value("x");
        form.start = InputField::with_value("next tuesday");
        assert!(form.to_draft().is_err());
    }

    #[test]
    fn blank_start_means_unscheduled() {
        let mut form = TaskForm::new();
        form.title = InputField::with_value("x");
        let draft = form.to_draft().unwrap();
        assert!(draft.start_time.is_none());
        assert_eq!(draft.duration, Some(60));
        assert!(draft.title_color.is_none());
    }

    #[test]
    fn duration_cycles_through_fixed_choices() {
        let mut form = TaskForm::new();
        form.current_field = DURATION_FIELD;
        form.cycle(true);
        assert_eq!(form.duration, 90);
        form.cycle(false);
        form.cycle(false);
        assert_eq!(form.duration, 30);
        form.cycle(false);
        assert_eq!(form.duration, 30);
    }

    #[test]
    fn odd_loaded_duration_snaps_when_cycled() {
        let mut form = TaskForm::new();
        form.duration = 45;
        form.current_field = DURATION_FIELD;
        form.cycle(true);
        assert_eq!(form.duration, 60);
    }
}
