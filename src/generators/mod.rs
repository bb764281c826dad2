pub mod euclid;
pub mod noise;
pub mod range;
pub mod scale;

pub use euclid::EuclidPattern;
pub use noise::{NoiseField, NoiseShape, Simplex};
pub use scale::{ScaleFamily, ScaleTable};
