//! Debug sink.
//!
//! Every subsystem reports through the `log` facade. Diagnostics are advisory
//! and never change control flow. `init_logging` puts `env_logger` behind the
//! facade for hosts that do not install their own logger.

mod init;

pub use init::{init_logging, LoggingConfig};
