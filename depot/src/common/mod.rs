//! Shared building blocks: field values, reserved names and small utilities.

mod constants;
mod util;
mod value;

pub use constants::*;
pub use util::*;
pub use value::*;
