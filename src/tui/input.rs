use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use super::mode::TuiState;
use crate::control::{Control, PaintKind, Transport};
use crate::generators::ScaleFamily;
use crate::shared::InputEvent;

// poll for a key, move the local cursor/selection, and resolve the key into
// input events for the owner thread
pub fn poll_input(timeout: Duration, ts: &mut TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code, ts));
    }
    Ok(vec![])
}

fn control(control: Control) -> Vec<InputEvent> {
    vec![InputEvent::Control(control)]
}

pub fn handle_key(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => vec![InputEvent::Quit],

        // transport
        KeyCode::Char(' ') => control(Control::Transport(Transport::Toggle)),
        KeyCode::Char('p') => control(Control::Transport(Transport::Play)),
        KeyCode::Char('.') => control(Control::Transport(Transport::Stop)),

        // edit cursor
        KeyCode::Left => { ts.cursor_x = ts.cursor_x.saturating_sub(1); vec![] }
        KeyCode::Right => { ts.cursor_x = (ts.cursor_x + 1).min(ts.columns - 1); vec![] }
        KeyCode::Down => { ts.cursor_y = ts.cursor_y.saturating_sub(1); vec![] }
        KeyCode::Up => { ts.cursor_y = (ts.cursor_y + 1).min(ts.rows - 1); vec![] }

        // paint, same key twice clears
        KeyCode::Char('a') | KeyCode::Enter => paint(ts, PaintKind::On),
        KeyCode::Char('d') | KeyCode::Backspace => paint(ts, PaintKind::Off),

        // parameter panel
        KeyCode::Tab => { ts.select_next(); vec![] }
        KeyCode::BackTab => { ts.select_prev(); vec![] }
        KeyCode::Char('[') => nudge(ts, -1.0),
        KeyCode::Char(']') => nudge(ts, 1.0),
        KeyCode::Char('{') => nudge(ts, -10.0),
        KeyCode::Char('}') => nudge(ts, 10.0),

        KeyCode::Char(c @ '1'..='6') => {
            let index = c as usize - '1' as usize;
            control(Control::Scale(ScaleFamily::ALL[index]))
        }

        KeyCode::Char('r') => control(Control::Reset),
        KeyCode::Char('R') => control(Control::Randomize),
        KeyCode::Char('w') => control(Control::Save),
        KeyCode::Char('l') => control(Control::Load),

        _ => vec![],
    }
}

fn paint(ts: &TuiState, kind: PaintKind) -> Vec<InputEvent> {
    control(Control::Paint {
        x: ts.cursor_x,
        y: ts.cursor_y,
        kind,
    })
}

// step the selected parameter; the owner clamps
fn nudge(ts: &TuiState, steps: f64) -> Vec<InputEvent> {
    let param = ts.selected_param();
    let value = ts.value(param) + param.step() * steps;
    control(Control::Set(param, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Param;

    fn state() -> TuiState {
        TuiState {
            columns: 4,
            rows: 3,
            values: Param::ALL.into_iter().map(|p| (p, 1.0)).collect(),
            ..TuiState::default()
        }
    }

    #[test]
    fn cursor_stays_inside_the_grid() {
        let mut ts = state();
        handle_key(KeyCode::Left, &mut ts);
        handle_key(KeyCode::Down, &mut ts);
        assert_eq!((ts.cursor_x, ts.cursor_y), (0, 0));
        for _ in 0..10 {
            handle_key(KeyCode::Right, &mut ts);
            handle_key(KeyCode::Up, &mut ts);
        }
        assert_eq!((ts.cursor_x, ts.cursor_y), (3, 2));
    }

    #[test]
    fn paint_keys_target_the_cursor() {
        let mut ts = state();
        handle_key(KeyCode::Right, &mut ts);
        handle_key(KeyCode::Up, &mut ts);
        assert_eq!(
            handle_key(KeyCode::Char('d'), &mut ts),
            vec![InputEvent::Control(Control::Paint { x: 1, y: 1, kind: PaintKind::Off })]
        );
    }

    #[test]
    fn nudges_use_the_param_step() {
        let mut ts = state();
        assert_eq!(ts.selected_param(), Param::Frequency);
        let events = handle_key(KeyCode::Char(']'), &mut ts);
        let [InputEvent::Control(Control::Set(Param::Frequency, value))] = events.as_slice() else {
            panic!("expected a frequency nudge");
        };
        assert!((value - 1.001).abs() < 1e-9);

        handle_key(KeyCode::BackTab, &mut ts);
        assert_eq!(ts.selected_param(), Param::Groove);
        assert_eq!(
            handle_key(KeyCode::Char('{'), &mut ts),
            vec![InputEvent::Control(Control::Set(Param::Groove, -9.0))]
        );
    }

    #[test]
    fn number_keys_pick_scales() {
        let mut ts = state();
        assert_eq!(
            handle_key(KeyCode::Char('6'), &mut ts),
            vec![InputEvent::Control(Control::Scale(ScaleFamily::Pentatonic))]
        );
        assert!(handle_key(KeyCode::Char('7'), &mut ts).is_empty());
    }

    #[test]
    fn quit_and_transport() {
        let mut ts = state();
        assert_eq!(handle_key(KeyCode::Esc, &mut ts), vec![InputEvent::Quit]);
        assert_eq!(
            handle_key(KeyCode::Char(' '), &mut ts),
            vec![InputEvent::Control(Control::Transport(Transport::Toggle))]
        );
        assert_eq!(
            handle_key(KeyCode::Char('p'), &mut ts),
            vec![InputEvent::Control(Control::Transport(Transport::Play))]
        );
        assert_eq!(
            handle_key(KeyCode::Char('.'), &mut ts),
            vec![InputEvent::Control(Control::Transport(Transport::Stop))]
        );
    }
}
