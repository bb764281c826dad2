// The one authoritative record of sequencer settings. Only the middle layer
// owns it; everything else reads snapshots or sends `Control`s.

use serde::{Deserialize, Serialize};

use crate::control::{PaintKind, Param};
use crate::generators::{NoiseShape, ScaleFamily};
use crate::shared::{MAX_X_STEPS, MAX_Y_STEPS};

const RANDOM_X_STEPS: [u32; 5] = [4, 8, 16, 24, 32];
const RANDOM_Y_STEPS: [u32; 4] = [8, 12, 24, 32];

/// A painted cell. Stored on disk with the same codes the performance
/// matrix uses (0 none, 2 forced on, 3 forced off).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Override {
    #[default]
    None,
    On,
    Off,
}

impl From<Override> for u8 {
    fn from(value: Override) -> Self {
        match value {
            Override::None => 0,
            Override::On => 2,
            Override::Off => 3,
        }
    }
}

impl TryFrom<u8> for Override {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Override::None),
            2 => Ok(Override::On),
            3 => Ok(Override::Off),
            other => Err(format!("unknown override code {other}")),
        }
    }
}

/// User paint layer, always `MAX_X_STEPS` columns of `MAX_Y_STEPS` rows so
/// resizing the grid never drops painted cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserMatrix {
    columns: Vec<Vec<Override>>,
}

impl Default for UserMatrix {
    fn default() -> Self {
        Self {
            columns: vec![vec![Override::None; MAX_Y_STEPS]; MAX_X_STEPS],
        }
    }
}

impl UserMatrix {
    pub fn get(&self, x: usize, y: usize) -> Override {
        self.columns
            .get(x)
            .and_then(|column| column.get(y))
            .copied()
            .unwrap_or_default()
    }

    // same kind twice clears the cell, the other kind replaces it
    pub fn toggle(&mut self, x: usize, y: usize, kind: PaintKind) {
        let Some(cell) = self.columns.get_mut(x).and_then(|column| column.get_mut(y)) else {
            return;
        };
        let wanted = match kind {
            PaintKind::On => Override::On,
            PaintKind::Off => Override::Off,
        };
        *cell = if *cell == wanted { Override::None } else { wanted };
    }

    #[cfg(test)]
    pub fn painted(&self) -> usize {
        self.columns
            .iter()
            .flatten()
            .filter(|&&cell| cell != Override::None)
            .count()
    }

    // loaded files may carry any shape; pad or cut to the fixed size
    fn normalize(&mut self) {
        self.columns.resize_with(MAX_X_STEPS, Vec::new);
        for column in &mut self.columns {
            column.resize(MAX_Y_STEPS, Override::None);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")] // keeps older session files loadable
pub struct SessionData {
    pub user_matrix: UserMatrix,

    // noise shape
    pub frequency: f64,
    pub lacunarity: f64,
    pub gain: f64,
    #[serde(deserialize_with = "lenient::to_u8")]
    pub octaves: u8,

    // grid
    #[serde(deserialize_with = "lenient::to_u32")]
    pub x_steps: u32,
    #[serde(deserialize_with = "lenient::to_u32")]
    pub y_steps: u32,
    #[serde(deserialize_with = "lenient::to_u32")]
    pub offset: u32,

    #[serde(deserialize_with = "lenient::to_u32")]
    pub bpm: u32,
    #[serde(deserialize_with = "lenient::to_u8")]
    pub low: u8,
    #[serde(deserialize_with = "lenient::to_u8")]
    pub release: u8,

    // euclidean generator
    #[serde(rename = "N", deserialize_with = "lenient::to_u8")]
    pub n: u8,
    #[serde(rename = "K", deserialize_with = "lenient::to_u8")]
    pub k: u8,
    #[serde(rename = "R", deserialize_with = "lenient::to_i32")]
    pub rotation: i32,
    #[serde(rename = "G")]
    pub groove: f64,

    #[serde(default)]
    pub scale: ScaleFamily,
}

// Integer fields accept any JSON number. Casts saturate, and `sanitize`
// brings the result into the parameter's range.
mod lenient {
    use serde::{Deserialize, Deserializer};

    pub fn to_u8<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
        Ok(f64::deserialize(d)?.round() as u8)
    }

    pub fn to_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        Ok(f64::deserialize(d)?.round() as u32)
    }

    pub fn to_i32<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
        Ok(f64::deserialize(d)?.round() as i32)
    }
}

impl Default for SessionData {
    fn default() -> Self {
        Self {
            user_matrix: UserMatrix::default(),
            frequency: 0.3,
            lacunarity: 0.9,
            gain: 2.0,
            octaves: 5,
            x_steps: 16,
            y_steps: 24,
            offset: 0,
            bpm: 180,
            low: 36,
            release: 1,
            n: 16,
            k: 16,
            rotation: 0,
            groove: 0.0,
            scale: ScaleFamily::default(),
        }
    }
}

impl SessionData {
    /// Defaults with a randomized noise shape, grid size and offset
    pub fn randomized(rng: &mut fastrand::Rng) -> Self {
        let mut state = Self {
            gain: 1.5 + rng.f64() * 1.5,
            octaves: rng.u8(3..=6),
            offset: rng.u32(1..=999),
            ..Self::default()
        };
        if let Some(&x) = rng.choice(RANDOM_X_STEPS.iter()) {
            state.x_steps = x;
        }
        if let Some(&y) = rng.choice(RANDOM_Y_STEPS.iter()) {
            state.y_steps = y;
        }
        state
    }

    pub fn noise_shape(&self) -> NoiseShape {
        NoiseShape {
            frequency: self.frequency,
            lacunarity: self.lacunarity,
            gain: self.gain,
            octaves: self.octaves,
        }
    }

    /// Write one parameter, clamped to its range
    pub fn apply(&mut self, param: Param, value: f64) {
        let value = param.clamp(value);
        let whole = value.round();
        match param {
            Param::Frequency => self.frequency = value,
            Param::Lacunarity => self.lacunarity = value,
            Param::Gain => self.gain = value,
            Param::Octaves => self.octaves = whole as u8,
            Param::XSteps => self.x_steps = whole as u32,
            Param::YSteps => self.y_steps = whole as u32,
            Param::Offset => self.offset = whole as u32,
            Param::Bpm => self.bpm = whole as u32,
            Param::Low => self.low = whole as u8,
            Param::Release => self.release = whole as u8,
            Param::Pulses => self.n = whole as u8,
            Param::Steps => self.k = whole as u8,
            Param::Rotation => self.rotation = whole as i32,
            Param::Groove => self.groove = whole,
        }
    }

    pub fn get(&self, param: Param) -> f64 {
        match param {
            Param::Frequency => self.frequency,
            Param::Lacunarity => self.lacunarity,
            Param::Gain => self.gain,
            Param::Octaves => self.octaves as f64,
            Param::XSteps => self.x_steps as f64,
            Param::YSteps => self.y_steps as f64,
            Param::Offset => self.offset as f64,
            Param::Bpm => self.bpm as f64,
            Param::Low => self.low as f64,
            Param::Release => self.release as f64,
            Param::Pulses => self.n as f64,
            Param::Steps => self.k as f64,
            Param::Rotation => self.rotation as f64,
            Param::Groove => self.groove,
        }
    }

    /// Re-clamp every field; used after decoding a file
    pub fn sanitize(&mut self) {
        for param in Param::ALL {
            self.apply(param, self.get(param));
        }
        self.user_matrix.normalize();
    }

    pub fn paint(&mut self, x: usize, y: usize, kind: PaintKind) {
        if x >= self.x_steps as usize || y >= self.y_steps as usize {
            return;
        }
        self.user_matrix.toggle(x, y, kind);
    }
}
