use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use super::grid::draw_grid;
use super::mode::TuiState;
use crate::control::Param;
use crate::generators::ScaleFamily;
use crate::shared::{DisplayState, Status};

const HELP: &str = "space play/stop  p play  . stop  arrows move  a/d paint on/off  tab param  [ ] nudge  { } x10  1-6 scale  r reset  R random  w save  l load  q quit";

pub fn render(frame: &mut Frame, area: Rect, ds: &DisplayState, ts: &TuiState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status line
            Constraint::Min(6),    // grid + params
            Constraint::Length(1), // key help
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(22)])
        .split(sections[1]);

    draw_status(frame, sections[0], ds);
    draw_grid(frame, body[0], ds, ts);
    draw_params(frame, body[1], ds, ts);
    frame.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
        sections[2],
    );
}

fn draw_status(frame: &mut Frame, area: Rect, ds: &DisplayState) {
    let transport = if ds.playing {
        Span::styled("▶ playing", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("■ stopped", Style::default().fg(Color::DarkGray))
    };
    let mut spans = vec![
        transport,
        Span::raw(format!("  {} bpm", ds.param(Param::Bpm))),
        Span::raw(format!("  beat {}/{}", ds.playhead + 1, ds.columns)),
        Span::raw(format!("  scale {}", ds.scale.label())),
    ];
    if let Some(status) = ds.status {
        let text = match status {
            Status::Saved => "  saved",
            Status::Loaded => "  loaded",
        };
        spans.push(Span::styled(text, Style::default().fg(Color::Cyan)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_params(frame: &mut Frame, area: Rect, ds: &DisplayState, ts: &TuiState) {
    let selected = ts.selected_param();
    let mut lines: Vec<Line> = Param::ALL
        .into_iter()
        .map(|param| {
            let value = ds.param(param);
            let text = if param.is_integral() {
                format!(" {:<6}{:>8}", param.label(), value)
            } else {
                format!(" {:<6}{:>8.3}", param.label(), value)
            };
            let style = if param == selected {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default()
            };
            Line::styled(text, style)
        })
        .collect();

    lines.push(Line::raw(""));
    for (i, family) in ScaleFamily::ALL.into_iter().enumerate() {
        let marker = if family == ds.scale { '*' } else { ' ' };
        lines.push(Line::raw(format!(" {}{marker}{}", i + 1, family.label())));
    }

    frame.render_widget(Paragraph::new(lines).block(Block::bordered().title(" params ")), area);
}
