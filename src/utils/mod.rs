//! Utils Module - Helper Functions & Shared Utilities

pub mod constants;
pub mod display;
pub mod export;

pub use constants::*;
pub use display::*;
pub use export::*;
