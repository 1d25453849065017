//! Discovery error types.
//!
//! Discovery itself never fails its caller. These errors describe why a
//! module was left out of a scan and only ever reach the log.

use thiserror::Error;

/// Reason a module could not take part in a discovery scan.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A reference names a module the registry does not know.
    #[error("Module '{name}' is not registered")]
    UnknownModule { name: String },

    /// A deferred module's loader failed.
    #[error("Failed to load module '{name}': {reason}")]
    LoadFailed { name: String, reason: String },
}

impl DiscoveryError {
    /// Create a load failure for a deferred module.
    pub fn load_failed(name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::LoadFailed {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Name of the module the error refers to.
    pub fn module_name(&self) -> &str {
        match self {
            Self::UnknownModule { name } | Self::LoadFailed { name, .. } => name,
        }
    }
}

/// Result type alias for module loading.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
