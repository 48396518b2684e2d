//! Coordinate virtualization.
//!
//! Application code addresses a fixed logical screen (conventionally 320x200).
//! `CoordinateSpace` scales that to the physical target on the way out to the
//! driver and back again for incoming pointer positions.
//!
//! All spaces:
//! - integer pixels
//! - origin top-left
//! - +X right, +Y down

mod color;
mod rect;
mod space;

pub use color::Rgb;
pub use rect::Rect;
pub use space::{CoordinateSpace, RefPoint};
