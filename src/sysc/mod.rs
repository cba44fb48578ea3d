pub mod error;
pub mod events;
pub mod logging;
pub mod storage;

pub use error::{ConfigError, ReportableError};
pub type ConfigResult<T> = ::std::result::Result<T, ConfigError>;
