// Closed command vocabulary for everything that mutates sequencer state.
// Labeled messages from the outside are resolved here once; the core only
// ever matches on these enums.

use crate::generators::ScaleFamily;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Play,
    Stop,
    Toggle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Param {
    Frequency,
    Lacunarity,
    Gain,
    Octaves,
    XSteps,
    YSteps,
    Offset,
    Bpm,
    Low,
    Release,
    Pulses,
    Steps,
    Rotation,
    Groove,
}

impl Param {
    pub const ALL: [Param; 14] = [
        Param::Frequency,
        Param::Lacunarity,
        Param::Gain,
        Param::Octaves,
        Param::XSteps,
        Param::YSteps,
        Param::Offset,
        Param::Bpm,
        Param::Low,
        Param::Release,
        Param::Pulses,
        Param::Steps,
        Param::Rotation,
        Param::Groove,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Param::Frequency => "freq",
            Param::Lacunarity => "space",
            Param::Gain => "gain",
            Param::Octaves => "octs",
            Param::XSteps => "x",
            Param::YSteps => "y",
            Param::Offset => "pos",
            Param::Bpm => "bpm",
            Param::Low => "low",
            Param::Release => "rel",
            Param::Pulses => "n",
            Param::Steps => "k",
            Param::Rotation => "r",
            Param::Groove => "g",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        if label == "sus" {
            return Some(Param::Release);
        }
        Self::ALL.into_iter().find(|param| param.label() == label)
    }

    /// Inclusive bounds every write is clamped to
    pub fn range(self) -> (f64, f64) {
        match self {
            Param::Frequency | Param::Lacunarity | Param::Gain => (0.01, 3.0),
            Param::Octaves => (1.0, 10.0),
            Param::XSteps => (1.0, 64.0),
            Param::YSteps => (1.0, 48.0),
            Param::Offset => (0.0, 1000.0),
            Param::Bpm => (1.0, 960.0),
            Param::Low => (0.0, 127.0),
            Param::Release => (0.0, 8.0),
            Param::Pulses | Param::Steps => (1.0, 32.0),
            Param::Rotation => (-32.0, 32.0),
            Param::Groove => (0.0, 100.0),
        }
    }

    /// Smallest meaningful increment, used by the front end's nudges
    pub fn step(self) -> f64 {
        match self {
            Param::Frequency => 0.001,
            Param::Lacunarity => 0.01,
            Param::Gain => 0.1,
            _ => 1.0,
        }
    }

    pub fn clamp(self, value: f64) -> f64 {
        let (min, max) = self.range();
        if value.is_nan() {
            return min;
        }
        value.clamp(min, max)
    }

    pub fn is_integral(self) -> bool {
        !matches!(self, Param::Frequency | Param::Lacunarity | Param::Gain)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintKind {
    /// Left click: force the cell on
    On,
    /// Right click: force the cell off
    Off,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Control {
    Transport(Transport),
    Reset,
    Randomize,
    Scale(ScaleFamily),
    Set(Param, f64),
    Paint { x: usize, y: usize, kind: PaintKind },
    Save,
    Load,
}

impl Control {
    /// Resolve a `{label, value}` message. Unknown labels give `None`.
    pub fn from_label(label: &str, value: f64) -> Option<Self> {
        let control = match label {
            "play" => Control::Transport(Transport::Play),
            "stop" => Control::Transport(Transport::Stop),
            "toggle" => Control::Transport(Transport::Toggle),
            "reset" => Control::Reset,
            "randomize" => Control::Randomize,
            "save" => Control::Save,
            "load" => Control::Load,
            _ => {
                if let Some(family) = ScaleFamily::from_label(label) {
                    Control::Scale(family)
                } else {
                    Control::Set(Param::from_label(label)?, value)
                }
            }
        };
        Some(control)
    }

    /// Parse `label=value`, or a bare `label` meaning value 1
    pub fn parse_assignment(text: &str) -> Option<Self> {
        let (label, value) = match text.split_once('=') {
            Some((label, value)) => (label.trim(), value.trim().parse().ok()?),
            None => (text.trim(), 1.0),
        };
        Self::from_label(label, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_transport_and_persistence_labels() {
        assert_eq!(
            Control::from_label("toggle", 1.0),
            Some(Control::Transport(Transport::Toggle))
        );
        assert_eq!(Control::from_label("save", 1.0), Some(Control::Save));
        assert_eq!(Control::from_label("reset", 0.0), Some(Control::Reset));
    }

    #[test]
    fn resolves_scale_labels() {
        assert_eq!(
            Control::from_label("harmonic", 1.0),
            Some(Control::Scale(ScaleFamily::HarmonicMinor))
        );
        assert_eq!(
            Control::from_label("12 tone", 1.0),
            Some(Control::Scale(ScaleFamily::Chromatic))
        );
    }

    #[test]
    fn resolves_parameter_labels_with_value() {
        assert_eq!(
            Control::from_label("freq", 0.25),
            Some(Control::Set(Param::Frequency, 0.25))
        );
        assert_eq!(
            Control::from_label("sus", 3.0),
            Some(Control::Set(Param::Release, 3.0))
        );
        for param in Param::ALL {
            assert_eq!(
                Control::from_label(param.label(), 2.0),
                Some(Control::Set(param, 2.0))
            );
        }
    }

    #[test]
    fn unknown_labels_are_ignored() {
        assert_eq!(Control::from_label("tempo", 120.0), None);
        assert_eq!(Control::from_label("", 0.0), None);
    }

    #[test]
    fn parses_command_line_assignments() {
        assert_eq!(
            Control::parse_assignment("bpm=120"),
            Some(Control::Set(Param::Bpm, 120.0))
        );
        assert_eq!(
            Control::parse_assignment(" low = 48 "),
            Some(Control::Set(Param::Low, 48.0))
        );
        assert_eq!(
            Control::parse_assignment("play"),
            Some(Control::Transport(Transport::Play))
        );
        assert_eq!(
            Control::parse_assignment("pentatonic"),
            Some(Control::Scale(ScaleFamily::Pentatonic))
        );
        assert_eq!(Control::parse_assignment("bpm=fast"), None);
        assert_eq!(Control::parse_assignment("tempo=90"), None);
    }

    #[test]
    fn clamp_respects_ranges() {
        assert_eq!(Param::XSteps.clamp(0.0), 1.0);
        assert_eq!(Param::Bpm.clamp(0.0), 1.0);
        assert_eq!(Param::Steps.clamp(-4.0), 1.0);
        assert_eq!(Param::Release.clamp(-1.0), 0.0);
        assert_eq!(Param::Rotation.clamp(-100.0), -32.0);
        assert_eq!(Param::Gain.clamp(f64::NAN), 0.01);
    }
}
