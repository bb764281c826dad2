pub mod scheduler;
pub mod voice;

pub use scheduler::{GatePolicy, Scheduler, Score};
