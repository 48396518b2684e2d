use crate::error::{EngineError, Result};

use super::{software, Driver};

/// A compiled-in driver: name plus the function that constructs it.
///
/// Entries with an empty name are placeholders and never selected.
#[derive(Debug, Copy, Clone)]
pub struct DriverDescriptor {
    pub name: &'static str,
    pub register: fn() -> Box<dyn Driver>,
}

impl DriverDescriptor {
    #[inline]
    pub const fn new(name: &'static str, register: fn() -> Box<dyn Driver>) -> Self {
        Self { name, register }
    }

    #[inline]
    pub fn is_usable(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Drivers compiled into this build, in preference order.
pub static BUILTIN_DRIVERS: &[DriverDescriptor] =
    &[DriverDescriptor::new(software::NAME, software::register)];

/// Selects one driver from a static descriptor table.
#[derive(Debug, Copy, Clone)]
pub struct DriverRegistry {
    table: &'static [DriverDescriptor],
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DriverRegistry {
    pub const fn new(table: &'static [DriverDescriptor]) -> Self {
        Self { table }
    }

    pub const fn builtin() -> Self {
        Self::new(BUILTIN_DRIVERS)
    }

    /// Usable driver names in table order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.table.iter().filter(|d| d.is_usable()).map(|d| d.name)
    }

    /// Picks the descriptor named `preferred`, else the first usable one, and
    /// constructs its driver.
    pub fn select(&self, preferred: Option<&str>) -> Result<(&'static str, Box<dyn Driver>)> {
        log::debug!(
            "driver: {} descriptor(s) compiled in",
            self.table.len()
        );

        let mut usable = self.table.iter().filter(|d| d.is_usable());
        let first = usable.clone().next().ok_or(EngineError::NoDriversAvailable)?;

        let chosen = match preferred {
            Some(name) => usable.find(|d| d.name == name).unwrap_or_else(|| {
                log::warn!(
                    "driver: preferred driver {name:?} not compiled in, using {:?}",
                    first.name
                );
                first
            }),
            None => first,
        };

        log::debug!("driver: selected {:?}", chosen.name);
        Ok((chosen.name, (chosen.register)()))
    }
}
