//! Main application logic for the terminal user interface.
//!
//! The `App` struct owns the store and all screen state: the weekly grid
//! with its cell cursor, the unscheduled sidebar, the modal task editor,
//! and the confirm/help overlays. Rendering and input handling live here;
//! all task mutations go through the store.

use std::io;
use std::path::Path;
use std::time::Duration;

use chrono::{Local, NaiveDate, TimeZone, Timelike};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table},
    Frame, Terminal,
};

use crate::calendar::{
    day_of_week_index, format_day_date, format_week_range, is_today, slot_span, time_slots,
    week_bounds, week_monday, DAY_COUNT, FIRST_HOUR, SLOT_COUNT, SLOT_MINUTES,
};
use crate::layout::{group_by_cell, resolve_layout};
use crate::storage::export_backup;
use crate::store::TaskStore;
use crate::task::{format_category, Task, TaskPatch};
use crate::tui::{
    enums::{AppState, PaneFocus},
    task_form::{
        TaskForm, CATEGORY_FIELD, COLOR_FIELD, DETAILS_FIELD, DONE_FIELD, DURATION_FIELD,
        NOTES_FIELD, START_FIELD, TITLE_FIELD,
    },
    utils::{centered_rect, hex_color},
};

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Terminal UI state for the weekly planner.
pub struct App {
    store: TaskStore,
    state: AppState,
    focus: PaneFocus,
    monday: NaiveDate,
    cursor_day: usize,
    cursor_slot: usize,
    scroll_slot: usize,
    sidebar_index: usize,
    form: TaskForm,
    editing: Option<u64>,
    status_message: String,
    confirm_delete: Option<u64>,
}

impl App {
    /// Create the app showing the current week, cursor on the current slot.
    pub fn new(store: TaskStore) -> Self {
        let now = Local::now();
        let today = now.date_naive();
        let cursor_slot =
            crate::calendar::slot_index(now.hour(), now.minute()).unwrap_or(0);
        App {
            store,
            state: AppState::Grid,
            focus: PaneFocus::Grid,
            monday: week_monday(today),
            cursor_day: day_of_week_index(today),
            cursor_slot,
            scroll_slot: cursor_slot.saturating_sub(4),
            sidebar_index: 0,
            form: TaskForm::new(),
            editing: None,
            status_message: String::new(),
            confirm_delete: None,
        }
    }

    /// Main event loop: render, then process one input batch, until quit.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }

    // --- input ---

    fn handle_input(&mut self) -> io::Result<bool> {
        if !event::poll(Duration::from_millis(250))? {
            self.poll_save_warning();
            return Ok(false);
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(false);
            }
            match self.state {
                AppState::Grid => return Ok(self.handle_grid_key(key)),
                AppState::Editor => self.handle_editor_key(key),
                AppState::Confirm => self.handle_confirm_key(key),
                AppState::Help => self.state = AppState::Grid,
            }
        }
        Ok(false)
    }

    fn handle_grid_key(&mut self, key: KeyEvent) -> bool {
        self.status_message.clear();
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('?') => self.state = AppState::Help,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    PaneFocus::Grid => PaneFocus::Sidebar,
                    PaneFocus::Sidebar => PaneFocus::Grid,
                };
            }
            KeyCode::Left | KeyCode::Char('h') => match self.focus {
                PaneFocus::Grid => self.cursor_day = self.cursor_day.saturating_sub(1),
                PaneFocus::Sidebar => self.focus = PaneFocus::Grid,
            },
            KeyCode::Right | KeyCode::Char('l') => match self.focus {
                PaneFocus::Grid => self.cursor_day = (self.cursor_day + 1).min(DAY_COUNT - 1),
                PaneFocus::Sidebar => self.focus = PaneFocus::Grid,
            },
            KeyCode::Up | KeyCode::Char('k') => match self.focus {
                PaneFocus::Grid => self.cursor_slot = self.cursor_slot.saturating_sub(1),
                PaneFocus::Sidebar => self.sidebar_index = self.sidebar_index.saturating_sub(1),
            },
            KeyCode::Down | KeyCode::Char('j') => match self.focus {
                PaneFocus::Grid => self.cursor_slot = (self.cursor_slot + 1).min(SLOT_COUNT - 1),
                PaneFocus::Sidebar => {
                    let max = self.store.unscheduled().len().saturating_sub(1);
                    self.sidebar_index = (self.sidebar_index + 1).min(max);
                }
            },
            KeyCode::Char('[') => self.monday = self.monday - chrono::Duration::days(7),
            KeyCode::Char(']') => self.monday = self.monday + chrono::Duration::days(7),
            KeyCode::Char('t') => {
                let today = Local::now().date_naive();
                self.monday = week_monday(today);
                self.cursor_day = day_of_week_index(today);
            }
            KeyCode::Char('n') => self.open_add_form(),
            KeyCode::Char('u') => {
                self.form = TaskForm::new();
                self.editing = None;
                self.state = AppState::Editor;
            }
            KeyCode::Enter => match self.selected_task_id() {
                Some(id) => self.open_edit_form(id),
                None => {
                    if self.focus == PaneFocus::Grid {
                        self.open_add_form();
                    }
                }
            },
            KeyCode::Char('d') => self.toggle_done(),
            KeyCode::Char('s') => self.schedule_selected(),
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(id) = self.selected_task_id() {
                    self.confirm_delete = Some(id);
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
        false
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state = AppState::Grid;
                self.editing = None;
            }
            KeyCode::Enter => self.save_form(),
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            KeyCode::Left => match self.form.active_input() {
                Some(input) => input.move_cursor_left(),
                None => self.form.cycle(false),
            },
            KeyCode::Right => match self.form.active_input() {
                Some(input) => input.move_cursor_right(),
                None => self.form.cycle(true),
            },
            KeyCode::Backspace => {
                if let Some(input) = self.form.active_input() {
                    input.handle_backspace();
                }
            }
            KeyCode::Delete => {
                if let Some(input) = self.form.active_input() {
                    input.handle_delete();
                }
            }
            KeyCode::Char(c) => match self.form.active_input() {
                Some(input) => input.handle_char(c),
                None => {
                    if c == ' ' {
                        self.form.cycle(true);
                    }
                }
            },
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(id) = self.confirm_delete.take() {
                    if self.store.delete(id) {
                        self.status_message = format!("Deleted task {id}");
                    }
                    self.poll_save_warning();
                }
                self.state = AppState::Grid;
            }
            _ => {
                self.confirm_delete = None;
                self.state = AppState::Grid;
            }
        }
    }

    // --- actions ---

    fn open_add_form(&mut self) {
        self.editing = None;
        self.form = match self.cell_start_time() {
            Some(start) if self.focus == PaneFocus::Grid => TaskForm::for_start(start),
            _ => TaskForm::new(),
        };
        self.state = AppState::Editor;
    }

    fn open_edit_form(&mut self, id: u64) {
        if let Some(task) = self.store.get(id) {
            self.form = TaskForm::from_task(task);
            self.editing = Some(id);
            self.state = AppState::Editor;
        }
    }

    fn save_form(&mut self) {
        match self.editing {
            None => match self.form.to_draft() {
                Ok(draft) => match self.store.create(draft) {
                    Ok(id) => {
                        self.status_message = format!("Added task {id}");
                        self.close_editor();
                    }
                    Err(e) => self.form.error = Some(e.to_string()),
                },
                Err(msg) => self.form.error = Some(msg),
            },
            Some(id) => match self.form.to_patch() {
                Ok(patch) => match self.store.update(id, patch) {
                    Ok(true) => {
                        self.status_message = format!("Updated task {id}");
                        self.close_editor();
                    }
                    Ok(false) => {
                        self.status_message = format!("Task {id} no longer exists");
                        self.close_editor();
                    }
                    Err(e) => self.form.error = Some(e.to_string()),
                },
                Err(msg) => self.form.error = Some(msg),
            },
        }
        self.poll_save_warning();
    }

    fn close_editor(&mut self) {
        self.state = AppState::Grid;
        self.editing = None;
    }

    fn toggle_done(&mut self) {
        let Some(id) = self.selected_task_id() else { return };
        let Some(task) = self.store.get(id) else { return };
        let done = !task.is_done;
        if let Ok(true) = self.store.update(id, TaskPatch::set_done(done)) {
            self.status_message = format!(
                "Task {id} {}",
                if done { "completed" } else { "reopened" }
            );
        }
        self.poll_save_warning();
    }

    /// Move the highlighted sidebar task into the cursor cell, the keyboard
    /// version of dragging a card onto the grid.
    fn schedule_selected(&mut self) {
        if self.focus != PaneFocus::Sidebar {
            return;
        }
        let Some(id) = self.selected_task_id() else { return };
        let Some(start) = self.cell_start_time() else { return };
        if let Ok(true) = self.store.update(id, TaskPatch::reschedule(Some(start))) {
            self.status_message = format!("Scheduled task {id}");
            self.focus = PaneFocus::Grid;
        }
        self.poll_save_warning();
    }

    fn export(&mut self) {
        match export_backup(self.store.tasks(), Path::new(".")) {
            Ok(path) => self.status_message = format!("Exported to {}", path.display()),
            Err(e) => self.status_message = format!("Export failed: {e}"),
        }
    }

    fn poll_save_warning(&mut self) {
        if let Some(e) = self.store.take_save_error() {
            self.status_message = format!("Warning: change kept in memory only, save failed: {e}");
        }
    }

    // --- selection helpers ---

    /// Wall-clock start time of the cursor cell.
    fn cell_start_time(&self) -> Option<chrono::DateTime<Local>> {
        let date = self.monday + chrono::Duration::days(self.cursor_day as i64);
        let hour = FIRST_HOUR + (self.cursor_slot as u32) / 2;
        let minute = (self.cursor_slot as u32 % 2) * SLOT_MINUTES;
        date.and_hms_opt(hour, minute, 0)
            .and_then(|naive| Local.from_local_datetime(&naive).earliest())
    }

    /// Task under the cursor: the first occupant of the grid cell, or the
    /// highlighted sidebar entry.
    fn selected_task_id(&self) -> Option<u64> {
        match self.focus {
            PaneFocus::Sidebar => self
                .store
                .unscheduled()
                .get(self.sidebar_index)
                .map(|t| t.id),
            PaneFocus::Grid => {
                let week = self.store.week_tasks(self.monday);
                let cells = group_by_cell(&week);
                cells
                    .get(&(self.cursor_day, self.cursor_slot))
                    .and_then(|tasks| tasks.first())
                    .map(|t| t.id)
            }
        }
    }

    // --- rendering ---

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

        self.render_header(f, chunks[0]);

        let body = Layout::horizontal([Constraint::Length(26), Constraint::Min(30)])
            .split(chunks[1]);
        self.render_sidebar(f, body[0]);
        self.render_grid(f, body[1]);

        self.render_status_bar(f, chunks[2]);

        match self.state {
            AppState::Editor => self.render_editor(f),
            AppState::Confirm => self.render_confirm(f),
            AppState::Help => self.render_help(f),
            AppState::Grid => {}
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let (start, end) = week_bounds(self.monday);
        let title = format!(
            " Weekly Planner | {} ",
            format_week_range(start.date(), end.date())
        );
        let header = Paragraph::new(Line::from(vec![
            Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                "[ prev week   ] next week   t today",
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        f.render_widget(header, area);
    }

    fn render_sidebar(&mut self, f: &mut Frame, area: Rect) {
        let unscheduled = self.store.unscheduled();
        if self.sidebar_index >= unscheduled.len() {
            self.sidebar_index = unscheduled.len().saturating_sub(1);
        }

        let items: Vec<ListItem> = unscheduled
            .iter()
            .map(|t| {
                let mut title_style = Style::default();
                if t.is_done {
                    title_style = title_style.add_modifier(Modifier::CROSSED_OUT);
                }
                let mut spans = vec![
                    Span::styled("■ ", Style::default().fg(hex_color(&t.title_color))),
                    Span::styled(t.title.clone(), title_style),
                ];
                if t.category.is_some() {
                    spans.push(Span::styled(
                        format!(" [{}]", format_category(t.category)),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let border_style = if self.focus == PaneFocus::Sidebar {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(" Unscheduled "),
            )
            .highlight_style(Style::default().bg(Color::DarkGray));

        let mut state = ListState::default();
        if self.focus == PaneFocus::Sidebar && !unscheduled.is_empty() {
            state.select(Some(self.sidebar_index));
        }
        f.render_stateful_widget(list, area, &mut state);
    }

    fn render_grid(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(" Week ");
        let inner = block.inner(area);
        f.render_widget(block, area);

        // Header row plus as many slot rows as fit; keep the cursor visible.
        let visible = inner.height.saturating_sub(1) as usize;
        if visible == 0 {
            return;
        }
        if self.cursor_slot < self.scroll_slot {
            self.scroll_slot = self.cursor_slot;
        } else if self.cursor_slot >= self.scroll_slot + visible {
            self.scroll_slot = self.cursor_slot + 1 - visible;
        }
        self.scroll_slot = self.scroll_slot.min(SLOT_COUNT.saturating_sub(visible));

        let day_width = (inner.width.saturating_sub(6) / 7).max(3) as usize;
        let week = self.store.week_tasks(self.monday);
        let cells = group_by_cell(&week);

        // Cells a multi-slot task extends into, keyed like `cells`.
        let mut covered: std::collections::HashMap<(usize, usize), Vec<&Task>> =
            std::collections::HashMap::new();
        for ((day, slot), tasks) in &cells {
            for task in tasks {
                let span = slot_span(task.duration).ceil() as usize;
                for s in (slot + 1)..(slot + span).min(SLOT_COUNT) {
                    covered.entry((*day, s)).or_default().push(task);
                }
            }
        }

        let header_cells: Vec<Cell> = std::iter::once(Cell::from(""))
            .chain((0..DAY_COUNT).map(|d| {
                let date = self.monday + chrono::Duration::days(d as i64);
                let label = format!("{} {}", DAY_NAMES[d], format_day_date(date));
                let mut style = Style::default().add_modifier(Modifier::BOLD);
                if is_today(date) {
                    style = style.fg(Color::Yellow);
                }
                Cell::from(label).style(style)
            }))
            .collect();

        let labels = time_slots();
        let rows: Vec<Row> = (self.scroll_slot..(self.scroll_slot + visible).min(SLOT_COUNT))
            .map(|slot| {
                let mut row_cells: Vec<Cell> = Vec::with_capacity(8);
                row_cells.push(
                    Cell::from(labels[slot].clone())
                        .style(Style::default().fg(Color::DarkGray)),
                );
                for day in 0..DAY_COUNT {
                    row_cells.push(self.grid_cell(
                        &cells,
                        &covered,
                        day,
                        slot,
                        day_width,
                    ));
                }
                Row::new(row_cells)
            })
            .collect();

        let widths = std::iter::once(Constraint::Length(6))
            .chain(std::iter::repeat(Constraint::Fill(1)).take(DAY_COUNT));
        let table = Table::new(rows, widths)
            .header(Row::new(header_cells))
            .column_spacing(1);
        f.render_widget(table, inner);
    }

    /// Render one grid cell: side-by-side shares for tasks starting here,
    /// continuation marks for tasks running through, cursor highlight.
    fn grid_cell<'a>(
        &self,
        cells: &std::collections::BTreeMap<(usize, usize), Vec<&'a Task>>,
        covered: &std::collections::HashMap<(usize, usize), Vec<&'a Task>>,
        day: usize,
        slot: usize,
        day_width: usize,
    ) -> Cell<'a> {
        let is_cursor = self.focus == PaneFocus::Grid
            && self.cursor_day == day
            && self.cursor_slot == slot;

        let mut spans: Vec<Span> = Vec::new();
        if let Some(tasks) = cells.get(&(day, slot)) {
            let layouts = resolve_layout(tasks);
            for (task, layout) in tasks.iter().zip(layouts) {
                let share = ((layout.width * day_width as f64) as usize).max(2);
                let text: String = task
                    .title
                    .chars()
                    .take(share.saturating_sub(1))
                    .collect();
                let mut style = Style::default()
                    .bg(hex_color(&task.title_color))
                    .fg(Color::Black);
                if task.is_done {
                    style = style.add_modifier(Modifier::CROSSED_OUT);
                }
                spans.push(Span::styled(format!("{text:<width$}", width = share.saturating_sub(1)), style));
                spans.push(Span::raw(" "));
            }
        } else if let Some(through) = covered.get(&(day, slot)) {
            for task in through {
                spans.push(Span::styled(
                    "▏",
                    Style::default().fg(hex_color(&task.title_color)),
                ));
            }
        }

        let mut cell = Cell::from(Line::from(spans));
        if is_cursor {
            cell = cell.style(Style::default().bg(Color::DarkGray));
        }
        cell
    }

    fn render_editor(&self, f: &mut Frame) {
        let area = centered_rect(60, 70, f.area());
        f.render_widget(Clear, area);

        let title = if self.editing.is_some() { " Edit Task " } else { " New Task " };
        let mut lines: Vec<Line> = Vec::new();

        let text_field = |lines: &mut Vec<Line>, order: usize, label: &str, value: &str, current: usize| {
            let marker = if order == current { "▸ " } else { "  " };
            let label_style = if order == current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let shown = if order == current {
                format!("{value}_")
            } else {
                value.to_string()
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{marker}{label:<10}"), label_style),
                Span::raw(shown),
            ]));
        };
        let selector_field = |lines: &mut Vec<Line>, order: usize, label: &str, value: String, current: usize| {
            let marker = if order == current { "▸ " } else { "  " };
            let label_style = if order == current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let shown = if order == current {
                format!("◂ {value} ▸")
            } else {
                value
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{marker}{label:<10}"), label_style),
                Span::raw(shown),
            ]));
        };

        let current = self.form.current_field;
        text_field(&mut lines, TITLE_FIELD, "Title", &self.form.title.value, current);
        text_field(&mut lines, NOTES_FIELD, "Notes", &self.form.notes.value, current);
        text_field(&mut lines, DETAILS_FIELD, "Details", &self.form.details.value, current);
        text_field(&mut lines, START_FIELD, "Start", &self.form.start.value, current);
        selector_field(&mut lines, DURATION_FIELD, "Duration", format!("{} min", self.form.duration), current);
        selector_field(&mut lines, CATEGORY_FIELD, "Category", self.form.category_label().to_string(), current);
        selector_field(&mut lines, COLOR_FIELD, "Color", self.form.color_label().to_string(), current);
        let done_label = if self.form.is_done { "yes" } else { "no" };
        selector_field(&mut lines, DONE_FIELD, "Done", done_label.to_string(), current);

        lines.push(Line::from(""));
        if let Some(error) = &self.form.error {
            lines.push(Line::from(Span::styled(
                format!("  {error}"),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from(Span::styled(
            "  Enter save · Esc cancel · Tab field · ◂▸ change",
            Style::default().fg(Color::DarkGray),
        )));

        let editor = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(editor, area);
    }

    fn render_confirm(&self, f: &mut Frame) {
        let area = centered_rect(44, 20, f.area());
        f.render_widget(Clear, area);

        let title = self
            .confirm_delete
            .and_then(|id| self.store.get(id))
            .map(|t| t.title.clone())
            .unwrap_or_default();
        let dialog = Paragraph::new(vec![
            Line::from(format!("Delete \"{title}\"?")),
            Line::from(""),
            Line::from(Span::styled(
                "y delete · any other key cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(Block::default().borders(Borders::ALL).title(" Confirm "));
        f.render_widget(dialog, area);
    }

    fn render_help(&self, f: &mut Frame) {
        let area = centered_rect(56, 70, f.area());
        f.render_widget(Clear, area);

        let keys = [
            ("↑↓←→ / hjkl", "move the cell cursor"),
            ("Tab", "switch between grid and sidebar"),
            ("[ / ]", "previous / next week"),
            ("t", "jump to the current week"),
            ("Enter", "edit task under cursor, or create in empty cell"),
            ("n", "new task at the cursor time"),
            ("u", "new unscheduled task"),
            ("d", "toggle done"),
            ("s", "schedule the highlighted sidebar task at the cursor"),
            ("x / Del", "delete (with confirmation)"),
            ("e", "export JSON backup to the current directory"),
            ("?", "this help"),
            ("q", "quit"),
        ];
        let lines: Vec<Line> = keys
            .iter()
            .map(|(key, what)| {
                Line::from(vec![
                    Span::styled(format!("  {key:<14}"), Style::default().fg(Color::Yellow)),
                    Span::raw(*what),
                ])
            })
            .collect();
        let help = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Keys "));
        f.render_widget(help, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if self.status_message.is_empty() {
            "n new · Enter edit · d done · x delete · e export · ? help · q quit".to_string()
        } else {
            self.status_message.clone()
        };
        let style = if self.status_message.starts_with("Warning") {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        f.render_widget(Paragraph::new(Span::styled(text, style)), area);
    }
}
