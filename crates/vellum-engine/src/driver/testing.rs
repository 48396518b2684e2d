//! Recording driver for unit tests.

use std::any::Any;

use anyhow::{bail, Context, Result};

use crate::config::EngineConfig;
use crate::coords::{Rect, Rgb};

use super::{Driver, ImageBlit, Payload};

/// Payload handed out by [`MockDriver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MockPayload {
    pub id: u32,
    pub key: String,
}

/// Driver that records every call. Keys starting with `missing` fail to load.
#[derive(Debug, Default)]
pub(crate) struct MockDriver {
    pub tag: &'static str,
    pub fail_init: bool,
    pub initialized: bool,
    pub cleanups: u32,
    pub presents: u32,
    pub loads: Vec<String>,
    pub freed: Vec<u32>,
    pub draws: Vec<(u32, ImageBlit)>,
    pub fills: Vec<(Rect, Rgb)>,
    next_id: u32,
}

impl MockDriver {
    pub fn named(tag: &'static str) -> Self {
        Self { tag, ..Self::default() }
    }

    pub fn failing() -> Self {
        Self { tag: "failing", fail_init: true, ..Self::default() }
    }

    /// Hands out a payload without going through `load_resource`.
    pub fn make_payload(&mut self, key: &str) -> Payload {
        self.next_id += 1;
        Box::new(MockPayload { id: self.next_id, key: key.to_string() })
    }

    pub fn register() -> Box<dyn Driver> {
        Box::new(Self::named("mock"))
    }

    pub fn register_failing() -> Box<dyn Driver> {
        Box::new(Self::failing())
    }
}

/// Reads the id out of a mock payload.
pub(crate) fn payload_id(payload: &dyn Any) -> Option<u32> {
    payload.downcast_ref::<MockPayload>().map(|p| p.id)
}

impl Driver for MockDriver {
    fn init(&mut self, _config: &EngineConfig) -> Result<()> {
        if self.fail_init {
            bail!("mock driver refused to start");
        }
        self.initialized = true;
        Ok(())
    }

    fn update(&mut self) {
        self.presents += 1;
    }

    fn cleanup(&mut self) {
        self.initialized = false;
        self.cleanups += 1;
    }

    fn load_resource(&mut self, key: &str) -> Result<Payload> {
        self.loads.push(key.to_string());
        if key.starts_with("missing") {
            bail!("no such file: {key}");
        }
        Ok(self.make_payload(key))
    }

    fn free_resource(&mut self, payload: Payload) {
        if let Some(id) = payload_id(&*payload) {
            self.freed.push(id);
        }
    }

    fn draw_image(&mut self, resource: &dyn Any, blit: ImageBlit) -> Result<()> {
        let id = payload_id(resource).context("not a mock payload")?;
        self.draws.push((id, blit));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.fills.push((rect, color));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
