//! Enumerations for TUI state management.

/// Screen the application is currently showing.
#[derive(Clone, Copy, PartialEq)]
pub enum AppState {
    Grid,
    Editor,
    Confirm,
    Help,
}

/// Which pane owns the cursor on the grid screen.
#[derive(Clone, Copy, PartialEq)]
pub enum PaneFocus {
    Grid,
    Sidebar,
}
