//! Vellum engine crate.
//!
//! A small 2D presentation core: application code draws images and filled
//! rectangles on a fixed logical screen and subscribes to input events, while
//! the engine selects a presentation driver, caches decoded resources, scales
//! coordinates to the physical target and normalizes platform input.

pub mod base;
pub mod config;
pub mod coords;
pub mod driver;
pub mod engine;
pub mod error;
pub mod input;
pub mod logging;
pub mod resource;

pub use config::EngineConfig;
pub use engine::{Backends, Engine, Lifecycle};
pub use error::{EngineError, Result};
