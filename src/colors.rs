//! Color policy for task cards.
//!
//! A task's display color is a pure function of its completion flag,
//! category and current color: done beats category beats a manual pick.
//! Manual picks therefore only stick while the task stays un-done and
//! uncategorised; any later state change re-derives the color.

use crate::task::{Category, Task};

/// Auto-applied when `is_done` is set.
pub const SUCCESS: &str = "#10B981";
pub const FAILURE: &str = "#EF4444";
/// Auto-applied for the NON NEGOTIABLE category.
pub const NON_NEGOTIABLE: &str = "#F97316";
/// Auto-applied for the HAVE TO category.
pub const HAVE_TO: &str = "#EAB308";
/// Auto-applied for the WANT TO category; also the fallback default.
pub const WANT_TO: &str = "#3B82F6";
pub const PURPLE: &str = "#A855F7";
pub const TEAL: &str = "#14B8A6";
pub const PINK: &str = "#EC4899";
pub const INDIGO: &str = "#6366F1";
pub const CYAN: &str = "#06B6D4";
pub const EMERALD: &str = "#10B981";
pub const AMBER: &str = "#F59E0B";

/// Derive the display color for a task's current state.
///
/// Priority order: done, then category, then whatever color the task
/// already carries, then the default. Pure and total.
pub fn auto_color(task: &Task) -> String {
    if task.is_done {
        return SUCCESS.to_string();
    }
    match task.category {
        Some(Category::NonNegotiable) => NON_NEGOTIABLE.to_string(),
        Some(Category::HaveTo) => HAVE_TO.to_string(),
        Some(Category::WantTo) => WANT_TO.to_string(),
        None => {
            if task.title_color.is_empty() {
                WANT_TO.to_string()
            } else {
                task.title_color.clone()
            }
        }
    }
}

/// The fixed color palette offered by the editor, in display order.
pub fn color_options() -> &'static [(&'static str, &'static str)] {
    &[
        ("Green (Done)", SUCCESS),
        ("Orange (Non-Negotiable)", NON_NEGOTIABLE),
        ("Yellow (Have To)", HAVE_TO),
        ("Blue (Want To)", WANT_TO),
        ("Purple", PURPLE),
        ("Teal", TEAL),
        ("Pink", PINK),
        ("Indigo", INDIGO),
        ("Cyan", CYAN),
        ("Emerald", EMERALD),
        ("Amber", AMBER),
        ("Red", FAILURE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(is_done: bool, category: Option<Category>, color: &str) -> Task {
        Task {
            id: 1,
            title: "t".to_string(),
            notes: String::new(),
            details: String::new(),
            start_time: None,
            duration: 60,
            category,
            title_color: color.to_string(),
            is_done,
            week_date: None,
        }
    }

    #[test]
    fn done_wins_over_everything() {
        let t = task(true, Some(Category::NonNegotiable), PURPLE);
        assert_eq!(auto_color(&t), SUCCESS);
    }

    #[test]
    fn category_wins_over_manual_color() {
        assert_eq!(
            auto_color(&task(false, Some(Category::NonNegotiable), PURPLE)),
            NON_NEGOTIABLE
        );
        assert_eq!(auto_color(&task(false, Some(Category::HaveTo), PURPLE)), HAVE_TO);
        assert_eq!(auto_color(&task(false, Some(Category::WantTo), PURPLE)), WANT_TO);
    }

    #[test]
    fn manual_color_survives_without_state() {
        let t = task(false, None, TEAL);
        assert_eq!(auto_color(&t), TEAL);
    }

    #[test]
    fn empty_color_defaults_to_want_to() {
        let t = task(false, None, "");
        assert_eq!(auto_color(&t), WANT_TO);
    }

    #[test]
    fn palette_has_twelve_fixed_entries() {
        let options = color_options();
        assert_eq!(options.len(), 12);
        assert_eq!(options[0], ("Green (Done)", SUCCESS));
        assert_eq!(options[11], ("Red", FAILURE));
    }
}
