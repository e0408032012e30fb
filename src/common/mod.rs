//! Shared utilities used across the builder

pub mod color;
pub mod debug;
pub mod types;

pub use color::HexColor;
