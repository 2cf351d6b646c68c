//! Viewer state for the merged supermatrix.
//!
//! This module contains the interactive state only: viewport, cursor,
//! and input mode. It performs no terminal I/O, so every transition is
//! testable headless; rendering lives in [`crate::ui`] and the event
//! loop in [`crate::controller`].

use std::ops::Range;

use crate::model::Supermatrix;
use crate::partition::Partition;

/// The viewport defines what portion of the supermatrix is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Index of the first visible row
    pub first_row: usize,
    /// Index of the first visible column
    pub first_col: usize,
    /// Number of visible rows
    pub visible_rows: usize,
    /// Number of visible columns
    pub visible_cols: usize,
}

impl Viewport {
    /// Creates a new viewport anchored at the origin.
    pub fn new(visible_rows: usize, visible_cols: usize) -> Self {
        Self {
            first_row: 0,
            first_col: 0,
            visible_rows,
            visible_cols,
        }
    }

    /// Updates the viewport dimensions.
    pub fn resize(&mut self, visible_rows: usize, visible_cols: usize) {
        self.visible_rows = visible_rows;
        self.visible_cols = visible_cols;
    }

    /// Returns the range of visible rows.
    pub fn row_range(&self) -> Range<usize> {
        self.first_row..self.first_row + self.visible_rows
    }

    /// Returns the range of visible columns.
    pub fn col_range(&self) -> Range<usize> {
        self.first_col..self.first_col + self.visible_cols
    }
}

/// The current cursor position in the supermatrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Current row (taxon index)
    pub row: usize,
    /// Current column (0-indexed position)
    pub col: usize,
}

impl Cursor {
    /// Creates a new cursor at origin.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Input mode for handling keyboard state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Command input mode (after pressing ':')
    Command(String),
}

/// The complete viewer state.
#[derive(Debug)]
pub struct ViewState {
    /// The merged supermatrix being inspected
    pub matrix: Supermatrix,
    /// Current viewport
    pub viewport: Viewport,
    /// Current cursor position
    pub cursor: Cursor,
    /// Current input mode
    pub mode: Mode,
    /// Whether the help overlay is shown
    pub show_help: bool,
    /// Whether the viewer should quit
    pub should_quit: bool,
    /// Status message to display
    pub status_message: Option<String>,
}

impl ViewState {
    /// Creates viewer state for a supermatrix.
    pub fn new(matrix: Supermatrix) -> Self {
        Self {
            matrix,
            viewport: Viewport::new(0, 0),
            cursor: Cursor::new(),
            mode: Mode::Normal,
            show_help: false,
            should_quit: false,
            status_message: Some("Press ? for help".to_string()),
        }
    }

    /// Updates the viewport size based on terminal dimensions.
    pub fn update_viewport_size(&mut self, rows: usize, cols: usize) {
        self.viewport.resize(rows, cols);
        self.ensure_cursor_visible();
    }

    /// Moves the cursor up by one row.
    pub fn move_up(&mut self) {
        if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.ensure_cursor_visible();
        }
    }

    /// Moves the cursor down by one row.
    pub fn move_down(&mut self) {
        if self.cursor.row + 1 < self.matrix.taxon_count() {
            self.cursor.row += 1;
            self.ensure_cursor_visible();
        }
    }

    /// Moves the cursor left by one column.
    pub fn move_left(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
            self.ensure_cursor_visible();
        }
    }

    /// Moves the cursor right by one column.
    pub fn move_right(&mut self) {
        if self.cursor.col + 1 < self.matrix.alignment_length() {
            self.cursor.col += 1;
            self.ensure_cursor_visible();
        }
    }

    /// Moves half a screen up.
    pub fn half_page_up(&mut self) {
        let step = (self.viewport.visible_rows / 2).max(1);
        self.cursor.row = self.cursor.row.saturating_sub(step);
        self.ensure_cursor_visible();
    }

    /// Moves half a screen down.
    pub fn half_page_down(&mut self) {
        let step = (self.viewport.visible_rows / 2).max(1);
        let max_row = self.matrix.taxon_count().saturating_sub(1);
        self.cursor.row = (self.cursor.row + step).min(max_row);
        self.ensure_cursor_visible();
    }

    /// Moves a full screen up.
    pub fn page_up(&mut self) {
        let step = self.viewport.visible_rows.max(1);
        self.cursor.row = self.cursor.row.saturating_sub(step);
        self.ensure_cursor_visible();
    }

    /// Moves a full screen down.
    pub fn page_down(&mut self) {
        let step = self.viewport.visible_rows.max(1);
        let max_row = self.matrix.taxon_count().saturating_sub(1);
        self.cursor.row = (self.cursor.row + step).min(max_row);
        self.ensure_cursor_visible();
    }

    /// Jumps to the first column.
    pub fn goto_first_column(&mut self) {
        self.cursor.col = 0;
        self.ensure_cursor_visible();
    }

    /// Jumps to the last column.
    pub fn goto_last_column(&mut self) {
        self.cursor.col = self.matrix.alignment_length().saturating_sub(1);
        self.ensure_cursor_visible();
    }

    /// Jumps to the first row.
    pub fn goto_first_row(&mut self) {
        self.cursor.row = 0;
        self.ensure_cursor_visible();
    }

    /// Jumps to the last row.
    pub fn goto_last_row(&mut self) {
        self.cursor.row = self.matrix.taxon_count().saturating_sub(1);
        self.ensure_cursor_visible();
    }

    /// Jumps to a 1-indexed column, reporting invalid targets in the
    /// status line.
    pub fn goto_column(&mut self, column: usize) {
        if column > 0 && column <= self.matrix.alignment_length() {
            self.cursor.col = column - 1;
            self.ensure_cursor_visible();
        } else {
            self.status_message = Some(format!("Invalid column: {}", column));
        }
    }

    /// Jumps to the start of the next gene.
    ///
    /// Zero-width partitions cover no columns and are skipped.
    pub fn next_partition(&mut self) {
        let column = self.cursor.col + 1;
        let target = self
            .matrix
            .partitions
            .iter()
            .find(|p| !p.is_empty() && p.start > column);
        if let Some(partition) = target {
            self.cursor.col = partition.start - 1;
            self.ensure_cursor_visible();
        }
    }

    /// Jumps to the start of the current gene, or of the previous gene
    /// when already at a gene start.
    pub fn prev_partition(&mut self) {
        let column = self.cursor.col + 1;
        let target = self
            .matrix
            .partitions
            .iter()
            .rev()
            .find(|p| !p.is_empty() && p.start < column);
        if let Some(partition) = target {
            self.cursor.col = partition.start - 1;
            self.ensure_cursor_visible();
        }
    }

    /// The partition under the cursor, with its index.
    pub fn current_partition(&self) -> Option<(usize, &Partition)> {
        self.matrix.partition_at(self.cursor.col + 1)
    }

    /// Ensures the cursor is visible in the viewport, with centering behavior.
    fn ensure_cursor_visible(&mut self) {
        // Vertical scrolling - keep cursor in view
        if self.cursor.row < self.viewport.first_row {
            self.viewport.first_row = self.cursor.row;
        } else if self.cursor.row >= self.viewport.first_row + self.viewport.visible_rows {
            self.viewport.first_row =
                self.cursor.row.saturating_sub(self.viewport.visible_rows.saturating_sub(1));
        }

        // Horizontal scrolling - center when leaving the viewport
        if self.cursor.col < self.viewport.first_col
            || self.cursor.col >= self.viewport.first_col + self.viewport.visible_cols
        {
            self.center_column();
        }

        self.clamp_viewport();
    }

    /// Centers the current column in the viewport.
    fn center_column(&mut self) {
        if self.viewport.visible_cols > 0 {
            let half = self.viewport.visible_cols / 2;
            self.viewport.first_col = self.cursor.col.saturating_sub(half);
        }
    }

    /// Clamps the viewport and cursor to valid supermatrix bounds.
    fn clamp_viewport(&mut self) {
        let row_count = self.matrix.taxon_count();
        let col_count = self.matrix.alignment_length();

        if self.viewport.first_row + self.viewport.visible_rows > row_count {
            self.viewport.first_row = row_count.saturating_sub(self.viewport.visible_rows);
        }
        if self.viewport.first_col + self.viewport.visible_cols > col_count {
            self.viewport.first_col = col_count.saturating_sub(self.viewport.visible_cols);
        }

        self.cursor.row = self.cursor.row.min(row_count.saturating_sub(1));
        self.cursor.col = self.cursor.col.min(col_count.saturating_sub(1));
    }

    /// Enters command mode.
    pub fn enter_command_mode(&mut self) {
        self.mode = Mode::Command(String::new());
    }

    /// Handles a character input in command mode.
    pub fn command_input(&mut self, c: char) {
        if let Mode::Command(ref mut cmd) = self.mode {
            cmd.push(c);
        }
    }

    /// Handles backspace in command mode.
    pub fn command_backspace(&mut self) {
        if let Mode::Command(ref mut cmd) = self.mode {
            cmd.pop();
            if cmd.is_empty() {
                self.mode = Mode::Normal;
            }
        }
    }

    /// Executes the current command and returns to normal mode.
    pub fn execute_command(&mut self) {
        if let Mode::Command(cmd) = std::mem::replace(&mut self.mode, Mode::Normal) {
            match cmd.as_str() {
                "q" | "quit" => self.should_quit = true,
                "h" | "help" => self.show_help = true,
                _ => {
                    if let Ok(column) = cmd.parse::<usize>() {
                        self.goto_column(column);
                    } else {
                        self.status_message = Some(format!("Unknown command: {}", cmd));
                    }
                }
            }
        }
    }

    /// Cancels command mode and returns to normal mode.
    pub fn cancel_command(&mut self) {
        self.mode = Mode::Normal;
    }

    /// Shows the help overlay.
    pub fn open_help(&mut self) {
        self.show_help = true;
    }

    /// Dismisses the help overlay.
    pub fn dismiss_help(&mut self) {
        self.show_help = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::merge;
    use crate::model::GeneAlignment;

    fn sample_state() -> ViewState {
        let collections = vec![
            GeneAlignment::from_pairs([("T1", "AAA"), ("T2", "CCC")]),
            GeneAlignment::from_pairs([("T1", "GGG"), ("T3", "TTT")]),
            GeneAlignment::from_pairs([("T2", "TTT"), ("T3", "AAA")]),
        ];
        let matrix = merge(&collections, '?').unwrap();
        let mut state = ViewState::new(matrix);
        state.update_viewport_size(2, 4);
        state
    }

    #[test]
    fn test_cursor_movement_bounds() {
        let mut state = sample_state();

        assert_eq!(state.cursor.row, 0);
        state.move_up();
        assert_eq!(state.cursor.row, 0);

        state.move_down();
        state.move_down();
        assert_eq!(state.cursor.row, 2);
        state.move_down();
        assert_eq!(state.cursor.row, 2);

        state.move_left();
        assert_eq!(state.cursor.col, 0);
        for _ in 0..20 {
            state.move_right();
        }
        assert_eq!(state.cursor.col, 8);
    }

    #[test]
    fn test_viewport_follows_cursor() {
        let mut state = sample_state();

        for _ in 0..5 {
            state.move_right();
        }
        // Cursor at column 5 with 4 visible columns: viewport recentered
        assert!(state.viewport.first_col > 0);
        let range = state.viewport.col_range();
        assert!(range.contains(&state.cursor.col));
    }

    #[test]
    fn test_goto_column_and_bounds() {
        let mut state = sample_state();

        state.goto_column(7);
        assert_eq!(state.cursor.col, 6);

        state.goto_column(99);
        assert_eq!(state.cursor.col, 6);
        assert_eq!(state.status_message.as_deref(), Some("Invalid column: 99"));
    }

    #[test]
    fn test_goto_first_last() {
        let mut state = sample_state();

        state.goto_last_column();
        assert_eq!(state.cursor.col, 8);
        state.goto_first_column();
        assert_eq!(state.cursor.col, 0);

        state.goto_last_row();
        assert_eq!(state.cursor.row, 2);
        state.goto_first_row();
        assert_eq!(state.cursor.row, 0);
    }

    #[test]
    fn test_partition_jumps() {
        let mut state = sample_state();

        state.next_partition();
        assert_eq!(state.cursor.col, 3);
        state.next_partition();
        assert_eq!(state.cursor.col, 6);
        state.next_partition();
        assert_eq!(state.cursor.col, 6);

        state.move_right();
        state.prev_partition();
        assert_eq!(state.cursor.col, 6);
        state.prev_partition();
        assert_eq!(state.cursor.col, 3);
    }

    #[test]
    fn test_partition_jump_skips_zero_width() {
        let collections = vec![
            GeneAlignment::from_pairs([("T1", "AAA")]),
            GeneAlignment::new(),
            GeneAlignment::from_pairs([("T1", "GG")]),
        ];
        let matrix = merge(&collections, '?').unwrap();
        let mut state = ViewState::new(matrix);
        state.update_viewport_size(2, 4);

        state.next_partition();
        // gene2 is empty; lands on gene3 at column 4
        assert_eq!(state.cursor.col, 3);
        assert_eq!(state.current_partition().unwrap().1.label, "gene3");
    }

    #[test]
    fn test_current_partition() {
        let mut state = sample_state();
        assert_eq!(state.current_partition().unwrap().1.label, "gene1");
        state.goto_column(5);
        assert_eq!(state.current_partition().unwrap().1.label, "gene2");
    }

    #[test]
    fn test_command_mode_cycle() {
        let mut state = sample_state();

        state.enter_command_mode();
        state.command_input('4');
        assert_eq!(state.mode, Mode::Command("4".to_string()));
        state.execute_command();
        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(state.cursor.col, 3);

        state.enter_command_mode();
        state.command_input('q');
        state.execute_command();
        assert!(state.should_quit);
    }

    #[test]
    fn test_command_backspace_exits_when_empty() {
        let mut state = sample_state();
        state.enter_command_mode();
        state.command_input('x');
        state.command_backspace();
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn test_unknown_command_reports() {
        let mut state = sample_state();
        state.enter_command_mode();
        state.command_input('z');
        state.execute_command();
        assert_eq!(state.status_message.as_deref(), Some("Unknown command: z"));
    }

    #[test]
    fn test_help_command() {
        let mut state = sample_state();
        state.enter_command_mode();
        state.command_input('h');
        state.execute_command();
        assert!(state.show_help);
        state.dismiss_help();
        assert!(!state.show_help);
    }

    #[test]
    fn test_half_page_and_page() {
        let collections = vec![GeneAlignment::from_pairs(
            (0..10).map(|i| (format!("T{i:02}"), "ACGT".to_string())),
        )];
        let matrix = merge(&collections, '?').unwrap();
        let mut state = ViewState::new(matrix);
        state.update_viewport_size(4, 4);

        state.half_page_down();
        assert_eq!(state.cursor.row, 2);
        state.page_down();
        assert_eq!(state.cursor.row, 6);
        state.page_down();
        assert_eq!(state.cursor.row, 9);
        state.half_page_up();
        assert_eq!(state.cursor.row, 7);
    }

    #[test]
    fn test_empty_matrix_is_safe() {
        let matrix = merge(&[], '?').unwrap();
        let mut state = ViewState::new(matrix);
        state.update_viewport_size(5, 10);

        state.move_down();
        state.move_right();
        state.next_partition();
        state.goto_last_column();
        assert_eq!(state.cursor, Cursor::new());
        assert!(state.current_partition().is_none());
    }
}
