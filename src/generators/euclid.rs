use super::range::remap;

/// Euclidean rhythm gate sequence.
/// Distributes `n` pulses as evenly as possible across `k` steps, optionally
/// nudged by a groove pass and rotated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EuclidPattern {
    /// One gate per step, `true` = open
    steps: Vec<bool>,
}

impl EuclidPattern {
    /// Build a pattern from pulses `n`, steps `k`, a rotation and a groove
    /// amount in `0..=100`. When `n > k` the two are swapped.
    pub fn new(n: u8, k: u8, rotation: i32, groove: f64) -> Self {
        let (n, k) = if n > k { (k, n) } else { (n, k) };
        let k = k.max(1);

        let mut pattern = Self {
            steps: distribute(n, k),
        };
        if groove != 0.0 {
            pattern.apply_groove(n, k, groove);
        }
        if rotation != 0 {
            pattern.rotate(rotation);
        }
        pattern
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[cfg(test)]
    pub fn steps(&self) -> &[bool] {
        &self.steps
    }

    #[cfg(test)]
    /// Number of open gates
    pub fn pulses(&self) -> usize {
        self.steps.iter().filter(|&&open| open).count()
    }

    /// Whether the gate at `index` is open, wrapping around the pattern
    pub fn is_open(&self, index: usize) -> bool {
        self.steps[index % self.steps.len()]
    }

    /// Cyclic shift. Positive values rotate left, negative values take the
    /// tail around to the front.
    pub fn rotate(&mut self, rotation: i32) {
        let len = self.steps.len() as i32;
        let offset = rotation.rem_euclid(len) as usize;
        self.steps.rotate_left(offset);
    }

    // Moves every pulse except the downbeat and the midpoint onto the nearest
    // free pulse of a denser reference pattern, searching +1, -1, +2, -2, ...
    // The pulse count never changes.
    fn apply_groove(&mut self, n: u8, k: u8, groove: f64) {
        let len = self.steps.len() as isize;
        let reference_pulses =
            (remap(groove, 0.0, 100.0, 0.0, k as f64) as u16 + n as u16).min(k as u16) as u8;
        let reference = distribute(reference_pulses, k);
        let midpoint = (k / 2) as usize;

        let mut grooved = self.steps.clone();
        for i in 1..self.steps.len() {
            if !self.steps[i] || i == midpoint {
                continue;
            }

            grooved[i] = false;
            let mut index = i as isize;
            let mut distance = 1isize;
            let mut direction = 1isize;
            loop {
                // `%` keeps the sign, so walking backwards past zero ends the search
                index = (index + distance * direction) % len;
                if index < 0 {
                    grooved[i] = true;
                    break;
                }
                let slot = index as usize;
                if reference[slot] && !grooved[slot] {
                    grooved[slot] = true;
                    break;
                }
                distance += 1;
                direction = -direction;
            }
        }
        self.steps = grooved;
    }
}

// Bresenham-style spreading: a step opens whenever floor(n * i / k) moves.
fn distribute(n: u8, k: u8) -> Vec<bool> {
    if n == 0 {
        return vec![false; k as usize];
    }
    let (n, k) = (n as u32, k as u32);
    let mut previous = None;
    (0..k)
        .map(|i| {
            let x = n * i / k;
            let open = previous != Some(x);
            previous = Some(x);
            open
        })
        .collect()
}
