//! deconfig CLI library.
//!
//! Configuration discovery, structured logging, exit codes and the command
//! implementations behind the `deconfig` binary.

pub mod backend;
pub mod commands;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod logging;

pub use backend::Backend;
pub use commands::{OutputFormat, ShowRequest};
pub use config::{load_config, ConfigError, ConfigOptions, ConfigSource, DeconfigConfig};
pub use error::CliError;
pub use exit_codes::ExitCode;
