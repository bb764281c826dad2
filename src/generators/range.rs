// Small numeric helpers shared by the generators and the composer.

/// Maps `value` from `[from_min, from_max]` onto `[to_min, to_max]`.
/// The input is clamped to its source range first, so the result never
/// leaves the target range.
pub fn remap(value: f64, from_min: f64, from_max: f64, to_min: f64, to_max: f64) -> f64 {
    if from_max == from_min {
        return to_min;
    }
    let value = value.clamp(from_min.min(from_max), from_min.max(from_max));
    ((value - from_min) * (to_max - to_min)) / (from_max - from_min) + to_min
}

// anything past the MIDI range sticks to the nearest end
pub fn clamp_note(value: i32) -> u8 {
    value.clamp(0, 127) as u8
}
