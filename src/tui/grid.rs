use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use super::mode::TuiState;
use crate::pipeline::Cell;
use crate::shared::DisplayState;

const LABEL_WIDTH: usize = 8;

pub fn draw_grid(frame: &mut Frame, area: Rect, ds: &DisplayState, ts: &TuiState) {
    let block = Block::bordered().title(" matrix ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // one line is taken by the gate strip
    let visible = (inner.height as usize).saturating_sub(1).max(1);
    let (low, high) = visible_rows(ds.rows, visible, ts.cursor_y);

    let mut lines = Vec::with_capacity(high - low + 1);
    lines.push(gate_line(ds));
    for y in (low..high).rev() {
        lines.push(row_line(ds, ts, y));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

// rows low..high, scrolled just far enough to keep the cursor row on screen
fn visible_rows(rows: usize, visible: usize, cursor_y: usize) -> (usize, usize) {
    let low = if cursor_y >= visible { cursor_y + 1 - visible } else { 0 };
    (low, rows.min(low + visible))
}

fn gate_line(ds: &DisplayState) -> Line<'static> {
    let mut spans = vec![Span::raw(" ".repeat(LABEL_WIDTH))];
    for x in 0..ds.columns {
        let open = ds.gates.get(x).copied().unwrap_or(false);
        let mut style = Style::default().fg(if open { Color::Yellow } else { Color::DarkGray });
        if x == ds.playhead && ds.playing {
            style = style.add_modifier(Modifier::REVERSED);
        }
        spans.push(Span::styled(if open { "▾ " } else { "· " }, style));
    }
    Line::from(spans)
}

fn row_line(ds: &DisplayState, ts: &TuiState, y: usize) -> Line<'static> {
    let label = match ds.row_labels.get(y) {
        Some(label) => format!("{:>3} {:<3} ", label.note, label.name),
        None => " ".repeat(LABEL_WIDTH),
    };
    let mut spans = vec![Span::styled(label, Style::default().fg(Color::Gray))];
    for x in 0..ds.columns {
        let (glyph, mut style) = cell_glyph(ds.cell(x, y));
        if x == ds.playhead && ds.playing {
            style = style.bg(Color::Rgb(40, 40, 60));
        }
        if x == ts.cursor_x && y == ts.cursor_y {
            style = style.add_modifier(Modifier::REVERSED);
        }
        spans.push(Span::styled(glyph, style));
    }
    Line::from(spans)
}

fn cell_glyph(cell: Cell) -> (&'static str, Style) {
    match cell {
        Cell::Empty => ("· ", Style::default().fg(Color::DarkGray)),
        Cell::Generated => ("● ", Style::default().fg(Color::LightMagenta)),
        Cell::ForcedOn => ("■ ", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
        Cell::ForcedOff => ("x ", Style::default().fg(Color::Red)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_follows_the_cursor() {
        assert_eq!(visible_rows(24, 10, 0), (0, 10));
        assert_eq!(visible_rows(24, 10, 9), (0, 10));
        assert_eq!(visible_rows(24, 10, 15), (6, 16));
        assert_eq!(visible_rows(4, 10, 3), (0, 4));
    }
}
