pub mod matrix;
pub mod persistence;
pub mod session;

pub use matrix::{Cell, Matrix};
pub use session::SessionData;
