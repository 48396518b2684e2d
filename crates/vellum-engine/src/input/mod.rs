//! Input subsystem.
//!
//! Input bases collect native events as [`RawInput`], the [`Normalizer`] turns
//! them into engine [`Event`]s in logical coordinates, and [`EventDispatch`]
//! fans each event out to the subscriptions whose mask matches it.
//!
//! Public types are platform-agnostic; winit types only appear in
//! `platform::winit`.

mod dispatch;
mod normalize;
mod source;
mod types;

pub mod platform {
    pub mod winit;
}

pub use dispatch::{Callback, DispatchCtx, EventDispatch, SubscriptionId};
pub use normalize::Normalizer;
pub use source::{InputBase, InputFeed, ScriptedInput};
pub use types::{Edge, Event, EventMask, MotionEvent, MouseButton, RawInput, SpecialKey};
