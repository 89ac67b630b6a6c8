//! Error Handling Guidelines
//!
//! All error messages should follow this format:
//!
//! 1. **What failed**: Describe the operation that failed
//! 2. **Why it failed**: Provide the root cause if known
//! 3. **What to do**: Suggest caller action when possible
//!
//! Two tiers exist. [`OpenError`] is reported by the provider and surfaced
//! through completion callbacks. [`LinkError`] is returned synchronously for
//! calls made against a controller in the wrong state.

use thiserror::Error;

/// Reason a provider could not open a channel.
///
/// Passed explicitly to the open completion instead of being read from an
/// ambient "last error" slot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpenError {
    /// No device exists at the requested path
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Device exists but is held by someone else or permission was refused
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Any other transport-level failure
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Error returned by controller operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// Operation requires an open connection
    #[error("Cannot {operation} while not connected - call connect() and wait for it to succeed first")]
    NotConnected { operation: &'static str },

    /// Forced close attempted while an open request is still outstanding
    #[error("Connection still in the process of being established - use disconnect() to close once the open completes")]
    ConnectInFlight,

    /// Provider rejected the open request
    #[error("Failed to open channel: {0}")]
    OpenFailed(OpenError),

    /// Request was a no-op for the controller's current state, so no completion will arrive
    #[error("{operation} ignored: controller was not in a state that accepts it")]
    Ignored { operation: &'static str },

    /// Framing string could not be parsed
    #[error("Invalid framing '{0}': expected <data bits><N|E|O><stop bits>, e.g. 8N1")]
    InvalidFraming(String),
}

impl From<OpenError> for LinkError {
    fn from(e: OpenError) -> Self {
        LinkError::OpenFailed(e)
    }
}
