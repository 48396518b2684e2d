//! Presentation drivers.
//!
//! A driver implements the rendering and resource primitives for one backend.
//! Drivers are compiled into a static table (`registry`) and exactly one is
//! selected and owned by the engine at a time. All common logic (caching,
//! coordinate translation, lifecycle) lives in the engine; drivers only see
//! physical coordinates and opaque payloads they produced themselves.

use std::any::Any;

use anyhow::Result;

use crate::config::EngineConfig;
use crate::coords::{Rect, Rgb};

mod registry;
pub mod software;

#[cfg(test)]
pub(crate) mod testing;

pub use registry::{DriverDescriptor, DriverRegistry, BUILTIN_DRIVERS};

/// Opaque driver-owned resource data.
///
/// Produced by [`Driver::load_resource`] and handed back to
/// [`Driver::free_resource`] exactly once. The engine never looks inside.
pub type Payload = Box<dyn Any>;

/// Image blit request in physical pixels.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ImageBlit {
    /// Top-left of the source region within the image.
    pub src_x: i32,
    pub src_y: i32,
    /// Top-left of the destination on the target.
    pub dst_x: i32,
    pub dst_y: i32,
    /// Extent shared by source and destination.
    pub w: i32,
    pub h: i32,
}

/// Backend contract consumed by the engine.
pub trait Driver {
    /// Brings the backend up for the configured physical resolution.
    fn init(&mut self, config: &EngineConfig) -> Result<()>;

    /// Presents the completed frame.
    fn update(&mut self);

    /// Releases backend state. Called once per successful `init`.
    fn cleanup(&mut self);

    /// Opens and decodes the resource named `key`.
    fn load_resource(&mut self, key: &str) -> Result<Payload>;

    /// Releases a payload previously returned by `load_resource`.
    fn free_resource(&mut self, payload: Payload);

    /// Blits a region of a loaded resource.
    fn draw_image(&mut self, resource: &dyn Any, blit: ImageBlit) -> Result<()>;

    /// Fills a rectangle with a solid colour.
    fn fill_rect(&mut self, rect: Rect, color: Rgb);

    /// Access to the concrete driver, e.g. to read back a software framebuffer.
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
