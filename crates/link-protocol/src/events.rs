use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token identifying one open channel, assigned by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionHandle(pub u32);

impl ConnectionHandle {
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Inbound data notification broadcast by the provider to every listener
///
/// The provider does not filter by recipient. Each listener must compare
/// `handle` against its own connection before using `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveEvent {
    pub handle: ConnectionHandle,
    pub data: Vec<u8>,
}

impl ReceiveEvent {
    pub fn new(handle: ConnectionHandle, data: impl Into<Vec<u8>>) -> Self {
        Self {
            handle,
            data: data.into(),
        }
    }
}

/// Send-level failure reported by the provider (not a hard I/O fault)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendError {
    /// Connection was closed before or during the send
    Disconnected,
    /// A previous send is still in progress
    Pending,
    /// Send did not complete in the provider's time window
    Timeout,
    /// Host-level error
    SystemError,
}

/// Result of a provider send, the provider's diagnostic payload
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SendInfo {
    pub bytes_sent: usize,
    pub error: Option<SendError>,
}

impl SendInfo {
    pub fn sent(bytes_sent: usize) -> Self {
        Self {
            bytes_sent,
            error: None,
        }
    }

    pub fn failed(error: SendError) -> Self {
        Self {
            bytes_sent: 0,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Delivered to the error callback when a send fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendFailure {
    pub info: SendInfo,
    /// The buffer that was being sent
    pub buffer: Vec<u8>,
}
