//! Side-by-side layout for tasks sharing a grid cell.
//!
//! Tasks are partitioned by the exact (day, slot) cell their start time
//! lands in. A task spanning several slots is laid out only in its starting
//! cell and extends downward by its slot span; it does not count as an
//! occupant of the slots it merely overlaps, so two tasks whose time ranges
//! overlap but start in different slots are never treated as colliding.
//! That is a documented product behavior, not an oversight.

use std::collections::BTreeMap;

use chrono::Timelike;

use crate::calendar::{day_of_week_index, slot_index};
use crate::task::Task;

/// Horizontal share of a cell assigned to one task, as fractions of the
/// cell width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellLayout {
    pub width: f64,
    pub left: f64,
}

/// Partition a week's scheduled tasks into grid cells keyed by
/// `(day_index, slot_index)`.
///
/// Input order (store insertion order) is preserved within each cell.
/// Unscheduled tasks and tasks starting outside the 06:00-24:00 window have
/// no cell and are skipped.
pub fn group_by_cell<'a>(tasks: &[&'a Task]) -> BTreeMap<(usize, usize), Vec<&'a Task>> {
    let mut cells: BTreeMap<(usize, usize), Vec<&'a Task>> = BTreeMap::new();
    for task in tasks {
        let Some(start) = task.start_time else { continue };
        let local = start.naive_local();
        let Some(slot) = slot_index(local.hour(), local.minute()) else {
            continue;
        };
        let day = day_of_week_index(local.date());
        cells.entry((day, slot)).or_default().push(task);
    }
    cells
}

/// Compute non-overlapping horizontal positions for the tasks of one cell.
///
/// Returns one entry per input task, index-aligned: each gets width `1/n`
/// and left offset `index/n`, so the shares tile `[0, 1)` in input order.
pub fn resolve_layout(cell_tasks: &[&Task]) -> Vec<CellLayout> {
    let n = cell_tasks.len();
    if n == 0 {
        return Vec::new();
    }
    let width = 1.0 / n as f64;
    (0..n)
        .map(|i| CellLayout {
            width,
            left: i as f64 * width,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn scheduled(id: u64, day: u32, hour: u32, minute: u32) -> Task {
        let start = Local
            .with_ymd_and_hms(2026, 1, 5 + day, hour, minute, 0)
            .unwrap();
        Task {
            id,
            title: format!("task {id}"),
            notes: String::new(),
            details: String::new(),
            start_time: Some(start),
            duration: 60,
            category: None,
            title_color: String::new(),
            is_done: false,
            week_date: None,
        }
    }

    #[test]
    fn single_task_fills_cell() {
        let t = scheduled(1, 0, 9, 0);
        let layouts = resolve_layout(&[&t]);
        assert_eq!(layouts, vec![CellLayout { width: 1.0, left: 0.0 }]);
    }

    #[test]
    fn two_tasks_split_in_creation_order() {
        let a = scheduled(1, 1, 9, 0);
        let b = scheduled(2, 1, 9, 0);
        let layouts = resolve_layout(&[&a, &b]);
        assert_eq!(
            layouts,
            vec![
                CellLayout { width: 0.5, left: 0.0 },
                CellLayout { width: 0.5, left: 0.5 },
            ]
        );
    }

    #[test]
    fn widths_tile_the_cell_for_any_count() {
        for n in 1..=5 {
            let tasks: Vec<Task> = (0..n).map(|i| scheduled(i as u64, 2, 10, 30)).collect();
            let refs: Vec<&Task> = tasks.iter().collect();
            let layouts = resolve_layout(&refs);
            let total: f64 = layouts.iter().map(|l| l.width).sum();
            assert!((total - 1.0).abs() < 1e-9);
            // Shares must be contiguous and disjoint, covering [0, 1).
            let mut edge = 0.0;
            for l in &layouts {
                assert!((l.left - edge).abs() < 1e-9);
                edge = l.left + l.width;
            }
            assert!((edge - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn grouping_is_by_exact_start_cell() {
        let a = scheduled(1, 0, 9, 0); // Monday 09:00
        let b = scheduled(2, 0, 9, 15); // same slot, off-boundary start
        let c = scheduled(3, 0, 9, 30); // next slot, overlaps a's hour
        let d = scheduled(4, 3, 9, 0); // Thursday 09:00
        let cells = group_by_cell(&[&a, &b, &c, &d]);

        let nine = cells.get(&(0, 6)).unwrap();
        assert_eq!(nine.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
        // c overlaps a in time but starts in the next slot: no collision.
        assert_eq!(cells.get(&(0, 7)).unwrap().len(), 1);
        assert_eq!(cells.get(&(3, 6)).unwrap().len(), 1);
    }

    #[test]
    fn out_of_window_and_unscheduled_have_no_cell() {
        let early = scheduled(1, 0, 5, 0);
        let mut unscheduled = scheduled(2, 0, 9, 0);
        unscheduled.start_time = None;
        let cells = group_by_cell(&[&early, &unscheduled]);
        assert!(cells.is_empty());
    }
}
