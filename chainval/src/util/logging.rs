//! Logging support

use log::{debug, error, info, warn};

/// Enum that describes level associated with a log message
#[derive(Debug, Eq, PartialEq)]
pub enum PeLogLevels {
    /// Common error logging level
    PeError,
    /// Common info logging level
    PeInfo,
    /// Common warn logging level
    PeWarn,
    /// Common debug logging level
    PeDebug,
}

/// `log_message` forwards a message to the `log` facade at the given level. No logger is installed
/// by this crate; applications choose one.
pub fn log_message(level: &PeLogLevels, message: &str) {
    match level {
        PeLogLevels::PeError => error!("{}", message),
        PeLogLevels::PeWarn => warn!("{}", message),
        PeLogLevels::PeInfo => info!("{}", message),
        PeLogLevels::PeDebug => debug!("{}", message),
    }
}
