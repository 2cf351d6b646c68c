//! TUI rendering module.
//!
//! This module handles all visual rendering using ratatui:
//! - Layout with sticky taxon names on the left
//! - Partition ruler marking the gene boundaries
//! - Colored nucleotide display with dimmed filler cells
//! - Status bar with position, partition and mode info
//! - Help overlay

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::view::{Mode, ViewState};

/// Width reserved for taxon names (including border and padding).
const NAME_PANEL_WIDTH: u16 = 20;
/// Minimum width for the sequence panel.
const MIN_SEQ_PANEL_WIDTH: u16 = 10;
/// Height of the status bar.
const STATUS_BAR_HEIGHT: u16 = 1;
/// Height of the partition ruler above the matrix rows.
const RULER_HEIGHT: u16 = 1;

const HELP_ABOUT: &str = "Navigate the merged alignment. The top ruler marks the gene \
partitions; dimmed cells are filler for taxa absent from a gene.";

const HELP_KEYS: &[(&str, &str)] = &[
    ("h j k l", "move cursor (arrows work too)"),
    ("0 / $", "first / last column"),
    ("g / G", "first / last taxon"),
    ("[ / ]", "previous / next gene"),
    ("Ctrl+U / D", "half page up / down"),
    ("PgUp / PgDn", "full page up / down"),
    (":<number>", "go to column"),
    ("q or :q", "quit"),
    ("?", "this help"),
];

/// Color scheme for nucleotides.
///
/// This trait allows for different color schemes to be implemented
/// (e.g., for amino acids in the future).
pub trait ColorScheme {
    fn get_color(&self, c: char) -> Color;
}

/// DNA nucleotide color scheme.
pub struct DnaColorScheme;

impl ColorScheme for DnaColorScheme {
    fn get_color(&self, c: char) -> Color {
        match c.to_ascii_uppercase() {
            'A' => Color::Red,
            'C' => Color::Green,
            'G' => Color::Yellow,
            'T' => Color::Blue,
            _ => Color::DarkGray,
        }
    }
}

/// Renders the complete UI.
pub fn render(frame: &mut Frame, state: &ViewState) {
    let area = frame.area();

    // Main layout: content area + status bar
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);

    let content_area = main_layout[0];
    let status_area = main_layout[1];

    // Split content area: names panel (left) + sequence panel (right)
    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(NAME_PANEL_WIDTH),
            Constraint::Min(MIN_SEQ_PANEL_WIDTH),
        ])
        .split(content_area);

    let names_area = content_layout[0];
    let sequences_area = content_layout[1];

    // Visible matrix rows, after borders and the ruler row
    let visible_rows = (sequences_area.height.saturating_sub(2 + RULER_HEIGHT)) as usize;
    let visible_cols = (sequences_area.width.saturating_sub(2)) as usize;

    render_names_panel(frame, state, names_area, visible_rows);
    render_sequences_panel(frame, state, sequences_area, visible_rows, visible_cols);
    render_status_bar(frame, state, status_area);

    if state.show_help {
        render_help(frame, area);
    }
}

/// Renders the taxon names panel (sticky, always visible).
fn render_names_panel(frame: &mut Frame, state: &ViewState, area: Rect, visible_rows: usize) {
    // Blank first line keeps names level with the matrix rows,
    // which sit below the partition ruler.
    let mut lines: Vec<Line> = vec![Line::from("")];

    let start_row = state.viewport.first_row;
    let end_row = (start_row + visible_rows).min(state.matrix.taxon_count());

    for row_idx in start_row..end_row {
        if let Some(seq) = state.matrix.get(row_idx) {
            let is_current = row_idx == state.cursor.row;

            // Truncate name if too long
            let max_name_len = (NAME_PANEL_WIDTH.saturating_sub(3)) as usize;
            let name = if seq.id.len() > max_name_len {
                format!("{}…", &seq.id[..max_name_len - 1])
            } else {
                seq.id.clone()
            };

            let style = if is_current {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            lines.push(Line::from(Span::styled(name, style)));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Taxa");

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

/// Builds the ruler line marking which gene each visible column belongs to.
///
/// Partition labels are printed from the start of their gene and padded
/// with spaces; adjacent genes alternate background colors. Columns not
/// covered by any partition stay blank.
fn partition_ruler_line(state: &ViewState, start_col: usize, end_col: usize) -> Line<'static> {
    let mut spans: Vec<Span> = Vec::new();

    for col_idx in start_col..end_col {
        let column = col_idx + 1;
        match state.matrix.partition_at(column) {
            Some((index, partition)) => {
                let offset = column - partition.start;
                let c = partition.label.chars().nth(offset).unwrap_or(' ');
                let bg = if index % 2 == 0 {
                    Color::Blue
                } else {
                    Color::DarkGray
                };
                spans.push(Span::styled(
                    c.to_string(),
                    Style::default().fg(Color::White).bg(bg),
                ));
            }
            None => spans.push(Span::raw(" ")),
        }
    }

    Line::from(spans)
}

/// Renders the sequence panel: partition ruler, then colored matrix rows.
fn render_sequences_panel(
    frame: &mut Frame,
    state: &ViewState,
    area: Rect,
    visible_rows: usize,
    visible_cols: usize,
) {
    let color_scheme = DnaColorScheme;

    let start_row = state.viewport.first_row;
    let end_row = (start_row + visible_rows).min(state.matrix.taxon_count());
    let start_col = state.viewport.first_col;
    let end_col = (start_col + visible_cols).min(state.matrix.alignment_length());

    let mut lines: Vec<Line> = vec![partition_ruler_line(state, start_col, end_col)];

    for row_idx in start_row..end_row {
        if let Some(seq) = state.matrix.get(row_idx) {
            let is_current_row = row_idx == state.cursor.row;
            let mut spans: Vec<Span> = Vec::new();

            for col_idx in start_col..end_col {
                let c = seq.char_at(col_idx).unwrap_or(' ');
                let is_cursor = is_current_row && col_idx == state.cursor.col;

                let bg_color = color_scheme.get_color(c);

                let style = if is_cursor {
                    // Invert colors for cursor position
                    Style::default()
                        .fg(bg_color)
                        .bg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else if c == state.matrix.missing {
                    // Filler for a taxon absent from this gene
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(Color::Black).bg(bg_color)
                };

                spans.push(Span::styled(c.to_string(), style));
            }

            lines.push(Line::from(spans));
        }
    }

    // Show cursor position and visible range in title
    let title = format!(
        "Supermatrix [Site: {} | View: {}-{}/{}]",
        state.cursor.col + 1,
        start_col + 1,
        end_col,
        state.matrix.alignment_length()
    );

    let block = Block::default().borders(Borders::ALL).title(title);

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

/// Renders the status bar at the bottom.
fn render_status_bar(frame: &mut Frame, state: &ViewState, area: Rect) {
    let (mode_str, command_str) = match &state.mode {
        Mode::Normal => ("NORMAL", String::new()),
        Mode::Command(cmd) => ("COMMAND", format!(":{}", cmd)),
    };

    let column = state.cursor.col + 1;
    let position_info = match state.current_partition() {
        Some((_, partition)) => format!(
            "{} pos{} | Taxon {}/{} | Col {}/{} ",
            partition.label,
            partition.codon_position(column).unwrap_or(0),
            state.cursor.row + 1,
            state.matrix.taxon_count(),
            column,
            state.matrix.alignment_length()
        ),
        None => format!(
            "Taxon {}/{} | Col {}/{} ",
            state.cursor.row + 1,
            state.matrix.taxon_count(),
            column,
            state.matrix.alignment_length()
        ),
    };

    // Show status message if present
    let message = state.status_message.as_deref().unwrap_or("");

    let left_content = if command_str.is_empty() {
        format!(" {} | {} ", mode_str, message)
    } else {
        format!(" {} | {} ", mode_str, command_str)
    };

    let left_len = left_content.len();
    let status_line = Line::from(vec![
        Span::styled(
            left_content,
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::styled(
            " ".repeat((area.width as usize).saturating_sub(left_len + position_info.len())),
            Style::default().bg(Color::Cyan),
        ),
        Span::styled(
            position_info,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    let paragraph = Paragraph::new(status_line);
    frame.render_widget(paragraph, area);
}

/// Renders the help overlay centered over the whole frame.
fn render_help(frame: &mut Frame, area: Rect) {
    let width = area.width.min(48);
    let height = area.height.min(17);
    let popup = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );

    let inner_width = (popup.width.saturating_sub(4) as usize).max(10);
    let mut lines: Vec<Line> = Vec::new();
    for wrapped in textwrap::wrap(HELP_ABOUT, inner_width) {
        lines.push(Line::from(wrapped.into_owned()));
    }
    lines.push(Line::from(""));
    for (keys, description) in HELP_KEYS {
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<12}", keys), Style::default().fg(Color::Yellow)),
            Span::raw(*description),
        ]));
    }

    let block = Block::default().borders(Borders::ALL).title(" Help ");

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

/// Calculates the visible matrix dimensions for a terminal size.
pub fn calculate_visible_dimensions(terminal_width: u16, terminal_height: u16) -> (usize, usize) {
    // Account for borders, the ruler row and the status bar
    let visible_cols = (terminal_width.saturating_sub(NAME_PANEL_WIDTH + 2)) as usize;
    let visible_rows =
        (terminal_height.saturating_sub(STATUS_BAR_HEIGHT + RULER_HEIGHT + 2)) as usize;
    (visible_rows, visible_cols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::merge;
    use crate::model::GeneAlignment;

    fn sample_state() -> ViewState {
        let collections = vec![
            GeneAlignment::from_pairs([("T1", "AAA"), ("T2", "CCC")]),
            GeneAlignment::from_pairs([("T1", "GGG"), ("T2", "TTT")]),
            GeneAlignment::from_pairs([("T1", "TTT"), ("T2", "AAA")]),
        ];
        let mut state = ViewState::new(merge(&collections, '?').unwrap());
        state.update_viewport_size(5, 20);
        state
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_dna_colors() {
        let scheme = DnaColorScheme;
        assert_eq!(scheme.get_color('A'), Color::Red);
        assert_eq!(scheme.get_color('a'), Color::Red); // Case insensitive
        assert_eq!(scheme.get_color('C'), Color::Green);
        assert_eq!(scheme.get_color('G'), Color::Yellow);
        assert_eq!(scheme.get_color('T'), Color::Blue);
        assert_eq!(scheme.get_color('-'), Color::DarkGray);
        assert_eq!(scheme.get_color('N'), Color::DarkGray);
    }

    #[test]
    fn test_visible_dimensions() {
        let (rows, cols) = calculate_visible_dimensions(100, 50);
        // 100 - 20 (name panel) - 2 (borders) = 78 cols
        // 50 - 1 (status) - 1 (ruler) - 2 (borders) = 46 rows
        assert_eq!(cols, 78);
        assert_eq!(rows, 46);
    }

    #[test]
    fn test_ruler_prints_labels_from_gene_starts() {
        let state = sample_state();
        let ruler = partition_ruler_line(&state, 0, 9);
        // Each gene is 3 columns wide, so labels truncate to "gen"
        assert_eq!(line_text(&ruler), "gengengen");
    }

    #[test]
    fn test_ruler_pads_past_label_end() {
        let collections = vec![GeneAlignment::from_pairs([("T1", "ACGTACGT")])];
        let mut state = ViewState::new(merge(&collections, '?').unwrap());
        state.update_viewport_size(5, 20);

        let ruler = partition_ruler_line(&state, 0, 8);
        assert_eq!(line_text(&ruler), "gene1   ");
    }

    #[test]
    fn test_ruler_alternates_backgrounds() {
        let state = sample_state();
        let ruler = partition_ruler_line(&state, 0, 9);
        assert_eq!(ruler.spans[0].style.bg, Some(Color::Blue));
        assert_eq!(ruler.spans[3].style.bg, Some(Color::DarkGray));
        assert_eq!(ruler.spans[6].style.bg, Some(Color::Blue));
    }

    #[test]
    fn test_ruler_respects_viewport_window() {
        let state = sample_state();
        // Window starting inside gene2 shows the label tail
        let ruler = partition_ruler_line(&state, 4, 9);
        assert_eq!(line_text(&ruler), "engen");
    }
}
