use std::path::PathBuf;

use crate::logging::LoggingConfig;

/// Width of the logical reference screen.
pub const LOGICAL_WIDTH: u32 = 320;

/// Height of the logical reference screen.
pub const LOGICAL_HEIGHT: u32 = 200;

/// Engine configuration.
///
/// Built by the host before `Engine::start`. Once the engine has left the
/// uninitialised state the configuration is read-only.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Logical reference resolution addressed by application code.
    pub logical_width: u32,
    pub logical_height: u32,

    /// Physical target resolution (window or framebuffer size).
    pub physical_width: u32,
    pub physical_height: u32,

    /// Colour depth in bits per pixel requested from the driver.
    pub depth: u32,

    /// When set, logical coordinates are scaled up to fill the physical target.
    /// When clear, coordinates are passed to the driver unchanged.
    pub auto_scale: bool,

    /// Directory resource keys are resolved against.
    pub asset_root: PathBuf,

    /// Driver to prefer during selection. Falls back to the first compiled-in driver.
    pub preferred_driver: Option<String>,

    /// Debug sink configuration.
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            logical_width: LOGICAL_WIDTH,
            logical_height: LOGICAL_HEIGHT,
            physical_width: 640,
            physical_height: 400,
            depth: 32,
            auto_scale: true,
            asset_root: PathBuf::from("."),
            preferred_driver: Some("software".to_string()),
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_physical_size(mut self, width: u32, height: u32) -> Self {
        self.physical_width = width;
        self.physical_height = height;
        self
    }

    pub fn with_logical_size(mut self, width: u32, height: u32) -> Self {
        self.logical_width = width;
        self.logical_height = height;
        self
    }

    pub fn with_auto_scale(mut self, auto_scale: bool) -> Self {
        self.auto_scale = auto_scale;
        self
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn with_preferred_driver(mut self, name: impl Into<String>) -> Self {
        self.preferred_driver = Some(name.into());
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }
}
