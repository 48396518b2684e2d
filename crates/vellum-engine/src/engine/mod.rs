//! Engine facade and lifecycle.
//!
//! [`Engine`] owns the configuration, the selected driver, the platform and
//! input bases, the resource cache, the subscription list and the coordinate
//! space. Application code talks to it in logical coordinates and resource
//! keys; everything backend-specific goes through the traits chosen at
//! construction.

mod backends;
mod instance;

pub use backends::Backends;
pub use instance::{Engine, Lifecycle};
