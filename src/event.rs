//! Keyboard event handling.
//!
//! This module manages keyboard input with Vim-style navigation:
//! - `h`/`j`/`k`/`l` or arrows: move the cursor
//! - `0` or `Home`: go to first column
//! - `$` or `End`: go to last column
//! - `g` / `G`: go to first / last taxon
//! - `[` / `]`: jump to the previous / next gene partition
//! - `Ctrl+U` / `Ctrl+D`: half page up / down
//! - `PageUp` / `PageDown`: full page up / down
//! - `?`: show help
//! - `q` or `Ctrl+C`: quit
//! - `:`: enter command mode
//!   - `:q` or `:quit`: quit the viewer
//!   - `:h` or `:help`: show help
//!   - `:<number>`: go to column

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use crate::view::{Mode, ViewState};

/// Actions that can be triggered by keyboard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action (key not recognized)
    None,
    /// Quit the viewer
    Quit,
    /// Move cursor up
    MoveUp,
    /// Move cursor down
    MoveDown,
    /// Move cursor left
    MoveLeft,
    /// Move cursor right
    MoveRight,
    /// Move half page up (Ctrl+U)
    HalfPageUp,
    /// Move half page down (Ctrl+D)
    HalfPageDown,
    /// Move full page up (PageUp)
    PageUp,
    /// Move full page down (PageDown)
    PageDown,
    /// Go to first column (0 or Home)
    GotoFirstColumn,
    /// Go to last column ($ or End)
    GotoLastColumn,
    /// Go to first taxon row (g)
    GotoFirstRow,
    /// Go to last taxon row (G)
    GotoLastRow,
    /// Jump to the next gene partition (])
    NextPartition,
    /// Jump to the previous gene partition ([)
    PrevPartition,
    /// Show the help overlay (?)
    ShowHelp,
    /// Dismiss the help overlay
    DismissHelp,
    /// Enter command mode
    EnterCommandMode,
    /// Add character to command buffer
    CommandChar(char),
    /// Execute current command
    ExecuteCommand,
    /// Cancel command mode
    CancelCommand,
    /// Backspace in command mode
    CommandBackspace,
    /// Resize event (terminal resized)
    Resize(u16, u16),
}

/// Polls for keyboard events with a timeout.
///
/// Returns `None` if no event occurred within the timeout.
pub fn poll_event(timeout: Duration) -> Option<Event> {
    if event::poll(timeout).ok()? {
        event::read().ok()
    } else {
        None
    }
}

/// Converts a crossterm event to an Action based on current viewer mode.
pub fn handle_event(event: Event, mode: &Mode, show_help: bool) -> Action {
    match event {
        Event::Key(key_event) => handle_key_event(key_event, mode, show_help),
        Event::Resize(width, height) => Action::Resize(width, height),
        _ => Action::None,
    }
}

/// Handles a key event based on the current input mode.
fn handle_key_event(key: KeyEvent, mode: &Mode, show_help: bool) -> Action {
    // If help is shown, any key dismisses it
    if show_help {
        return Action::DismissHelp;
    }

    match mode {
        Mode::Normal => handle_normal_mode(key),
        Mode::Command(_) => handle_command_mode(key),
    }
}

/// Handles key events in normal mode (Vim-style navigation).
fn handle_normal_mode(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('u') => Action::HalfPageUp,
            KeyCode::Char('d') => Action::HalfPageDown,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Char('l') | KeyCode::Right => Action::MoveRight,
        KeyCode::Char('h') | KeyCode::Left => Action::MoveLeft,

        KeyCode::Char('0') | KeyCode::Home => Action::GotoFirstColumn,
        KeyCode::Char('$') | KeyCode::End => Action::GotoLastColumn,

        KeyCode::Char('g') => Action::GotoFirstRow,
        KeyCode::Char('G') => Action::GotoLastRow,

        KeyCode::Char(']') => Action::NextPartition,
        KeyCode::Char('[') => Action::PrevPartition,

        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,

        KeyCode::Char('?') => Action::ShowHelp,
        KeyCode::Char(':') => Action::EnterCommandMode,

        // Quick quit with 'q' in normal mode (alongside :q)
        KeyCode::Char('q') => Action::Quit,

        _ => Action::None,
    }
}

/// Handles key events in command mode.
fn handle_command_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::ExecuteCommand,
        KeyCode::Esc => Action::CancelCommand,
        KeyCode::Backspace => Action::CommandBackspace,
        KeyCode::Char(c) => Action::CommandChar(c),
        _ => Action::None,
    }
}

/// Applies an action to the viewer state.
///
/// Returns `true` if the viewer should continue, `false` if it should quit.
pub fn apply_action(state: &mut ViewState, action: Action) -> bool {
    // Status messages only survive until the next real input
    if !matches!(action, Action::None | Action::Resize(_, _)) {
        state.status_message = None;
    }

    match action {
        Action::None => {}
        Action::Quit => {
            state.should_quit = true;
        }
        Action::MoveUp => {
            state.move_up();
        }
        Action::MoveDown => {
            state.move_down();
        }
        Action::MoveLeft => {
            state.move_left();
        }
        Action::MoveRight => {
            state.move_right();
        }
        Action::HalfPageUp => {
            state.half_page_up();
        }
        Action::HalfPageDown => {
            state.half_page_down();
        }
        Action::PageUp => {
            state.page_up();
        }
        Action::PageDown => {
            state.page_down();
        }
        Action::GotoFirstColumn => {
            state.goto_first_column();
        }
        Action::GotoLastColumn => {
            state.goto_last_column();
        }
        Action::GotoFirstRow => {
            state.goto_first_row();
        }
        Action::GotoLastRow => {
            state.goto_last_row();
        }
        Action::NextPartition => {
            state.next_partition();
        }
        Action::PrevPartition => {
            state.prev_partition();
        }
        Action::ShowHelp => {
            state.open_help();
        }
        Action::DismissHelp => {
            state.dismiss_help();
        }
        Action::EnterCommandMode => {
            state.enter_command_mode();
        }
        Action::CommandChar(c) => {
            state.command_input(c);
        }
        Action::ExecuteCommand => {
            state.execute_command();
        }
        Action::CancelCommand => {
            state.cancel_command();
        }
        Action::CommandBackspace => {
            state.command_backspace();
        }
        Action::Resize(_, _) => {
            // Resize is handled in the main loop with actual terminal dimensions
        }
    }

    !state.should_quit
}
