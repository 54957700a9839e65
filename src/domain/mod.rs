//! Domain types shared by the selector and the pipelines.

pub mod types;

pub use types::*;
