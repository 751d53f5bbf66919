//! Utilities module for logging and error handling

pub mod error;
pub mod logging;

pub use error::{Result, ResultExt, SamplerError};
pub use logging::init_env_logging;
