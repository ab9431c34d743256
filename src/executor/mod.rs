//! The executor.

pub use enumerate::enumerate;
pub use frontier::{Extension, Frontier};

mod enumerate;
mod frontier;
