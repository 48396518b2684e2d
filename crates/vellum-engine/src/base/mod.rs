//! Platform bring-up.
//!
//! A base initialises whatever the platform needs before a driver or input
//! base can run (subsystem init, display connection). It is started first and
//! torn down last.

use anyhow::Result;

use crate::config::EngineConfig;

/// Identifies the compiled platform base.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BaseId {
    /// No platform layer; drivers render off-screen.
    Headless,
    /// Host-owned winit event loop.
    Winit,
}

/// Platform base contract.
pub trait Base {
    fn init(&mut self, config: &EngineConfig) -> Result<()>;

    fn cleanup(&mut self);

    fn id(&self) -> BaseId;
}

/// Base with nothing to bring up.
#[derive(Debug, Default)]
pub struct HeadlessBase {
    started: bool,
}

impl HeadlessBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl Base for HeadlessBase {
    fn init(&mut self, _config: &EngineConfig) -> Result<()> {
        log::debug!("base: headless");
        self.started = true;
        Ok(())
    }

    fn cleanup(&mut self) {
        self.started = false;
    }

    fn id(&self) -> BaseId {
        BaseId::Headless
    }
}

/// Base for hosts that drive a winit event loop themselves.
///
/// The event loop and window are owned by the host; this base only records
/// that the platform layer is up so the lifecycle stays uniform.
#[derive(Debug, Default)]
pub struct WinitBase {
    started: bool,
}

impl WinitBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl Base for WinitBase {
    fn init(&mut self, config: &EngineConfig) -> Result<()> {
        anyhow::ensure!(
            config.physical_width > 0 && config.physical_height > 0,
            "window has zero size"
        );
        log::debug!("base: winit (host event loop)");
        self.started = true;
        Ok(())
    }

    fn cleanup(&mut self) {
        self.started = false;
    }

    fn id(&self) -> BaseId {
        BaseId::Winit
    }
}
