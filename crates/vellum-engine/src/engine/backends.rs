use crate::base::{Base, HeadlessBase};
use crate::driver::DriverRegistry;
use crate::input::{InputBase, ScriptedInput};

/// Backend set an [`Engine`](super::Engine) is built from.
///
/// The default is fully headless: the built-in driver table, no platform
/// layer and scripted input.
pub struct Backends {
    pub registry: DriverRegistry,
    pub base: Box<dyn Base>,
    pub input: Box<dyn InputBase>,
}

impl Default for Backends {
    fn default() -> Self {
        Self {
            registry: DriverRegistry::builtin(),
            base: Box::new(HeadlessBase::new()),
            input: Box::new(ScriptedInput::new()),
        }
    }
}

impl Backends {
    pub fn with_registry(mut self, registry: DriverRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_base(mut self, base: impl Base + 'static) -> Self {
        self.base = Box::new(base);
        self
    }

    pub fn with_input(mut self, input: impl InputBase + 'static) -> Self {
        self.input = Box::new(input);
        self
    }
}
