//! Shared value types
//!
//! Geometry used by glyph metrics and atlas placement.

pub mod geometry;

pub use geometry::{Dimensions, Position, Rect};
