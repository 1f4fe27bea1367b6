//! The authoritative in-memory task collection.
//!
//! `TaskStore` is the only mutator of tasks. Every write funnels through a
//! single normalization step that recomputes the derived fields (week
//! bucket, display color), so no call site can leave a task inconsistent.
//! Every successful mutation persists the full collection through the
//! injected storage collaborator before returning; a failed write is logged
//! and latched rather than failing the mutation, leaving the in-memory
//! state authoritative for the rest of the session.

use chrono::NaiveDate;

use crate::calendar::week_monday;
use crate::colors::auto_color;
use crate::error::PlannerError;
use crate::storage::Storage;
use crate::task::{Task, TaskDraft, TaskPatch};

/// Default task length in minutes when a draft leaves it unset.
pub const DEFAULT_DURATION: u32 = 60;

pub struct TaskStore {
    tasks: Vec<Task>,
    storage: Box<dyn Storage>,
    last_save_error: Option<String>,
}

impl TaskStore {
    /// Open a store backed by `storage`, loading whatever it holds.
    /// Missing or corrupt data starts the store empty.
    pub fn open(storage: Box<dyn Storage>) -> Self {
        let tasks = storage.load_all();
        TaskStore {
            tasks,
            storage,
            last_save_error: None,
        }
    }

    /// Create a task from a draft and return its id.
    ///
    /// Refuses drafts whose trimmed title is empty or whose duration is
    /// zero; nothing is mutated or persisted in that case.
    pub fn create(&mut self, draft: TaskDraft) -> Result<u64, PlannerError> {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(PlannerError::EmptyTitle);
        }
        let duration = draft.duration.unwrap_or(DEFAULT_DURATION);
        if duration == 0 {
            return Err(PlannerError::InvalidDuration);
        }

        let mut task = Task {
            id: self.next_id(),
            title,
            notes: draft.notes,
            details: draft.details,
            start_time: draft.start_time,
            duration,
            category: draft.category,
            title_color: draft.title_color.unwrap_or_default(),
            is_done: draft.is_done,
            week_date: None,
        };
        normalize(&mut task);

        let id = task.id;
        self.tasks.push(task);
        self.persist();
        Ok(id)
    }

    /// Merge a patch into an existing task.
    ///
    /// Returns `Ok(false)` without mutating or persisting when the id is
    /// unknown; callers may report that but it is not an error. Validation
    /// failures refuse the whole patch before any field is touched.
    pub fn update(&mut self, id: u64, patch: TaskPatch) -> Result<bool, PlannerError> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(PlannerError::EmptyTitle);
            }
        }
        if patch.duration == Some(0) {
            return Err(PlannerError::InvalidDuration);
        }

        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };

        if let Some(title) = patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(notes) = patch.notes {
            task.notes = notes;
        }
        if let Some(details) = patch.details {
            task.details = details;
        }
        if let Some(start_time) = patch.start_time {
            task.start_time = start_time;
        }
        if let Some(duration) = patch.duration {
            task.duration = duration;
        }
        if let Some(category) = patch.category {
            task.category = category;
        }
        if let Some(color) = patch.title_color {
            task.title_color = color;
        }
        if let Some(is_done) = patch.is_done {
            task.is_done = is_done;
        }
        normalize(task);

        self.persist();
        Ok(true)
    }

    /// Remove a task permanently. Returns whether anything was removed;
    /// unknown ids are a no-op and do not trigger a persistence write.
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Look up a task by id.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// The full collection in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Scheduled tasks belonging to the week containing `date`, in
    /// insertion order.
    pub fn week_tasks(&self, date: NaiveDate) -> Vec<&Task> {
        let key = week_monday(date);
        self.tasks
            .iter()
            .filter(|t| t.week_date == Some(key))
            .collect()
    }

    /// Tasks with no start time, in insertion order (the sidebar list).
    pub fn unscheduled(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.start_time.is_none()).collect()
    }

    /// Take the most recent persistence failure, if any, so a front-end
    /// can warn that the session is running without durability.
    pub fn take_save_error(&mut self) -> Option<String> {
        self.last_save_error.take()
    }

    fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    fn persist(&mut self) {
        if let Err(e) = self.storage.save_all(&self.tasks) {
            eprintln!("Failed to save tasks: {e}");
            self.last_save_error = Some(e.to_string());
        }
    }
}

/// Recompute the derived fields from the authoritative ones. Invoked on
/// every write path, after the caller's fields are in place.
fn normalize(task: &mut Task) {
    task.title_color = auto_color(task);
    task.week_date = task
        .start_time
        .map(|t| week_monday(t.naive_local().date()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors;
    use crate::task::Category;
    use chrono::{Local, TimeZone};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// In-memory storage sharing its saved state with the test body.
    struct MemoryStorage {
        saved: Rc<RefCell<Vec<Task>>>,
    }

    impl Storage for MemoryStorage {
        fn load_all(&self) -> Vec<Task> {
            self.saved.borrow().clone()
        }

        fn save_all(&self, tasks: &[Task]) -> Result<(), PlannerError> {
            *self.saved.borrow_mut() = tasks.to_vec();
            Ok(())
        }
    }

    /// Storage whose writes always fail, to exercise the degraded path.
    struct FailingStorage;

    impl Storage for FailingStorage {
        fn load_all(&self) -> Vec<Task> {
            Vec::new()
        }

        fn save_all(&self, _tasks: &[Task]) -> Result<(), PlannerError> {
            Err(PlannerError::Storage(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }
    }

    fn open_with_memory() -> (TaskStore, Rc<RefCell<Vec<Task>>>) {
        let saved = Rc::new(RefCell::new(Vec::new()));
        let store = TaskStore::open(Box::new(MemoryStorage { saved: saved.clone() }));
        (store, saved)
    }

    fn tuesday_nine() -> chrono::DateTime<Local> {
        Local.with_ymd_and_hms(2026, 1, 6, 9, 0, 0).unwrap()
    }

    #[test]
    fn unscheduled_create_has_no_week_bucket() {
        let (mut store, _) = open_with_memory();
        let id = store
            .create(TaskDraft {
                title: "Sort photos".to_string(),
                ..TaskDraft::default()
            })
            .unwrap();

        let task = store.get(id).unwrap();
        assert_eq!(task.week_date, None);
        assert_eq!(task.duration, DEFAULT_DURATION);
        assert_eq!(store.unscheduled().len(), 1);
        assert!(store.week_tasks(tuesday_nine().date_naive()).is_empty());
    }

    #[test]
    fn scheduled_create_derives_week_and_slot() {
        let (mut store, saved) = open_with_memory();
        let id = store
            .create(TaskDraft {
                title: "Standup".to_string(),
                start_time: Some(tuesday_nine()),
                ..TaskDraft::default()
            })
            .unwrap();

        let task = store.get(id).unwrap();
        assert_eq!(task.week_date, chrono::NaiveDate::from_ymd_opt(2026, 1, 5));
        let local = task.start_time.unwrap().naive_local();
        assert_eq!(
            crate::calendar::slot_index(chrono::Timelike::hour(&local), chrono::Timelike::minute(&local)),
            Some(6)
        );
        assert_eq!(store.week_tasks(tuesday_nine().date_naive()).len(), 1);
        // Every mutation is durably saved before returning.
        assert_eq!(saved.borrow().len(), 1);
    }

    #[test]
    fn empty_title_refuses_create_without_persisting() {
        let (mut store, saved) = open_with_memory();
        let err = store.create(TaskDraft {
            title: "   ".to_string(),
            ..TaskDraft::default()
        });
        assert!(matches!(err, Err(PlannerError::EmptyTitle)));
        assert!(store.tasks().is_empty());
        assert!(saved.borrow().is_empty());
    }

    #[test]
    fn zero_duration_is_refused() {
        let (mut store, _) = open_with_memory();
        let err = store.create(TaskDraft {
            title: "x".to_string(),
            duration: Some(0),
            ..TaskDraft::default()
        });
        assert!(matches!(err, Err(PlannerError::InvalidDuration)));
    }

    #[test]
    fn completing_a_have_to_task_turns_green() {
        let (mut store, _) = open_with_memory();
        let id = store
            .create(TaskDraft {
                title: "Taxes".to_string(),
                category: Some(Category::HaveTo),
                ..TaskDraft::default()
            })
            .unwrap();
        assert_eq!(store.get(id).unwrap().title_color, colors::HAVE_TO);

        store.update(id, TaskPatch::set_done(true)).unwrap();
        let task = store.get(id).unwrap();
        assert_eq!(task.title_color, colors::SUCCESS);
        assert_eq!(task.category, Some(Category::HaveTo));
    }

    #[test]
    fn manual_color_sticks_only_without_state() {
        let (mut store, _) = open_with_memory();
        let id = store
            .create(TaskDraft {
                title: "Reading".to_string(),
                title_color: Some(colors::PURPLE.to_string()),
                ..TaskDraft::default()
            })
            .unwrap();
        assert_eq!(store.get(id).unwrap().title_color, colors::PURPLE);

        // A category change overrides the manual pick.
        store
            .update(
                id,
                TaskPatch {
                    category: Some(Some(Category::WantTo)),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(store.get(id).unwrap().title_color, colors::WANT_TO);
    }

    #[test]
    fn reopened_task_keeps_its_last_derived_color() {
        let (mut store, _) = open_with_memory();
        let id = store
            .create(TaskDraft {
                title: "Run".to_string(),
                is_done: true,
                ..TaskDraft::default()
            })
            .unwrap();
        assert_eq!(store.get(id).unwrap().title_color, colors::SUCCESS);

        // Un-done with no category: the carried color wins over the default.
        store.update(id, TaskPatch::set_done(false)).unwrap();
        assert_eq!(store.get(id).unwrap().title_color, colors::SUCCESS);
    }

    #[test]
    fn reschedule_recomputes_week_and_clearing_unschedules() {
        let (mut store, _) = open_with_memory();
        let id = store
            .create(TaskDraft {
                title: "Gym".to_string(),
                start_time: Some(tuesday_nine()),
                ..TaskDraft::default()
            })
            .unwrap();

        let next_week = Local.with_ymd_and_hms(2026, 1, 14, 18, 0, 0).unwrap();
        store.update(id, TaskPatch::reschedule(Some(next_week))).unwrap();
        assert_eq!(
            store.get(id).unwrap().week_date,
            chrono::NaiveDate::from_ymd_opt(2026, 1, 12)
        );

        store.update(id, TaskPatch::reschedule(None)).unwrap();
        let task = store.get(id).unwrap();
        assert_eq!(task.start_time, None);
        assert_eq!(task.week_date, None);
        assert_eq!(store.unscheduled().len(), 1);
    }

    #[test]
    fn delete_then_update_is_a_silent_no_op() {
        let (mut store, saved) = open_with_memory();
        let id = store
            .create(TaskDraft {
                title: "Ephemeral".to_string(),
                ..TaskDraft::default()
            })
            .unwrap();
        assert!(store.delete(id));
        assert!(!store.delete(id));

        let saves_before = saved.borrow().len();
        let updated = store.update(id, TaskPatch::set_done(true)).unwrap();
        assert!(!updated);
        assert!(store.tasks().is_empty());
        assert_eq!(saved.borrow().len(), saves_before);
    }

    #[test]
    fn ids_are_unique_and_insertion_order_is_kept() {
        let (mut store, _) = open_with_memory();
        let a = store
            .create(TaskDraft { title: "a".to_string(), ..TaskDraft::default() })
            .unwrap();
        let b = store
            .create(TaskDraft { title: "b".to_string(), ..TaskDraft::default() })
            .unwrap();
        assert_ne!(a, b);
        let order: Vec<u64> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn failed_save_is_latched_but_mutation_survives() {
        let mut store = TaskStore::open(Box::new(FailingStorage));
        let id = store
            .create(TaskDraft {
                title: "Still here".to_string(),
                ..TaskDraft::default()
            })
            .unwrap();

        // In-memory state stays authoritative; the failure is reported
        // out-of-band instead of unwinding the mutation.
        assert!(store.get(id).is_some());
        let warning = store.take_save_error().unwrap();
        assert!(warning.contains("disk full"));
        assert!(store.take_save_error().is_none());
    }
}
