use thiserror::Error;

/// Engine startup stage that failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InitStage {
    Base,
    Driver,
    Input,
}

impl std::fmt::Display for InitStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InitStage::Base => "base",
            InitStage::Driver => "driver",
            InitStage::Input => "input",
        };
        f.write_str(name)
    }
}

/// Failure taxonomy shared by every engine subsystem.
///
/// Backends report failures as `anyhow::Error`; the engine wraps them here so
/// callers can match on the kind of failure rather than on message text.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A base, driver or input base failed to start. Fatal to startup.
    #[error("{stage} initialisation failed: {source:#}")]
    InitFailure {
        stage: InitStage,
        #[source]
        source: anyhow::Error,
    },

    /// A cache node or subscription could not be allocated.
    #[error("could not allocate {what}")]
    AllocationFailure { what: &'static str },

    /// The driver could not open or decode a resource.
    #[error("could not load resource {key:?}: {source:#}")]
    LoadFailed {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// The driver rejected a blit of a loaded resource.
    #[error("could not draw resource {key:?}: {source:#}")]
    DrawFailed {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Lookup, delete or unload miss.
    #[error("{what} not found")]
    NotFound { what: String },

    /// The driver table holds no usable descriptor.
    #[error("no drivers available")]
    NoDriversAvailable,

    /// Resource keys are bounded in length.
    #[error("resource key {key:?} exceeds {max} bytes")]
    KeyTooLong { key: String, max: usize },

    /// Operation attempted in the wrong lifecycle state.
    #[error("{operation} requires an initialised engine")]
    NotInitialized { operation: &'static str },

    /// Configuration is read-only once drivers are up.
    #[error("configuration is locked while the engine is started")]
    ConfigLocked,
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

impl EngineError {
    /// Returns true for failures the caller is expected to recover from.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::LoadFailed { .. }
                | EngineError::DrawFailed { .. }
                | EngineError::NotFound { .. }
                | EngineError::KeyTooLong { .. }
        )
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        EngineError::NotFound { what: what.into() }
    }
}
