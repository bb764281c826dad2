// Coherent noise used to draw the melodic contour.

/// Shape parameters for an octave-summed noise sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseShape {
    pub frequency: f64,
    pub lacunarity: f64,
    pub gain: f64,
    pub octaves: u8,
}

/// A 2D noise field returning values nominally in `[-1, 1]`.
pub trait NoiseField: Send {
    fn sample(&self, x: f64, y: f64, shape: &NoiseShape) -> f64;
}

const DEFAULT_SEED: u64 = 0x6e6f_6973_6567_7264;

// skew/unskew factors for the 2D simplex lattice
const F2: f64 = 0.366_025_403_784_438_6; // (sqrt(3) - 1) / 2
const G2: f64 = 0.211_324_865_405_187_1; // (3 - sqrt(3)) / 6

const GRADIENTS: [(f64, f64); 8] = [
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
];

/// Seeded 2D simplex noise with fractal Brownian motion summing.
#[derive(Clone, Debug)]
pub struct Simplex {
    perm: [u8; 512],
}

impl Default for Simplex {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl Simplex {
    pub fn new(seed: u64) -> Self {
        let mut table: Vec<u8> = (0..=255).collect();
        fastrand::Rng::with_seed(seed).shuffle(&mut table);

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        Self { perm }
    }

    /// Single-octave simplex noise in `[-1, 1]`
    pub fn noise(&self, x: f64, y: f64) -> f64 {
        let s = (x + y) * F2;
        let i = (x + s).floor();
        let j = (y + s).floor();
        let t = (i + j) * G2;
        let x0 = x - (i - t);
        let y0 = y - (j - t);

        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };
        let x1 = x0 - i1 as f64 + G2;
        let y1 = y0 - j1 as f64 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;
        let g0 = self.gradient(ii, jj);
        let g1 = self.gradient(ii + i1, jj + j1);
        let g2 = self.gradient(ii + 1, jj + 1);

        70.0 * (corner(g0, x0, y0) + corner(g1, x1, y1) + corner(g2, x2, y2))
    }

    fn gradient(&self, i: usize, j: usize) -> (f64, f64) {
        let hash = self.perm[i + self.perm[j] as usize] as usize;
        GRADIENTS[hash % GRADIENTS.len()]
    }

    /// Octave sum normalized by the total amplitude so the result stays in
    /// `[-1, 1]` whatever the gain.
    pub fn fbm(&self, x: f64, y: f64, shape: &NoiseShape) -> f64 {
        let mut frequency = shape.frequency;
        let mut amplitude = 1.0;
        let mut total = 0.0;
        let mut amplitude_sum = 0.0;
        for _ in 0..shape.octaves {
            total += amplitude * self.noise(x * frequency, y * frequency);
            amplitude_sum += amplitude;
            frequency *= shape.lacunarity;
            amplitude *= shape.gain;
        }
        if amplitude_sum == 0.0 {
            return 0.0;
        }
        total / amplitude_sum
    }
}

impl NoiseField for Simplex {
    fn sample(&self, x: f64, y: f64, shape: &NoiseShape) -> f64 {
        self.fbm(x, y, shape)
    }
}

fn corner(gradient: (f64, f64), x: f64, y: f64) -> f64 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        return 0.0;
    }
    let t2 = t * t;
    t2 * t2 * (gradient.0 * x + gradient.1 * y)
}
