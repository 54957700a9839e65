//! Output file writing.

pub mod export;

pub use export::*;
