/// # Link State
///
/// Lifecycle phase of a single connection controller.
///
/// The phase is never stored. It is derived from the controller's
/// `connecting` flag and its optional connection handle, which remain the
/// single source of truth.
///
/// ## State Transition Diagram
///
/// ```text
///            connect()                open ok
///   ┌──────────────┐ ─────────► ┌────────────┐ ─────────► ┌───────────┐
///   │ Disconnected │            │ Connecting │            │ Connected │
///   └──────────────┘ ◄───────── └────────────┘            └─────┬─────┘
///          ▲          open failed                               │
///          └────────────────────────────────────────────────────┘
///                      disconnect() / latched disconnect
/// ```
///
/// A disconnect requested while `Connecting` does not change the phase. It
/// is latched and replayed once the open resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LinkState {
    /// No handle held, no open request outstanding
    Disconnected,

    /// Open request issued, waiting for the provider
    Connecting,

    /// Handle held, data is routed to the data callback
    Connected,
}

impl LinkState {
    /// Would a connect request be accepted?
    pub fn accepts_connect(&self) -> bool {
        matches!(self, Self::Disconnected)
    }

    /// User-facing status text
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::Disconnected => "Ready to connect",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
        }
    }

    /// Validate if transition to new_state is allowed from current state
    pub fn can_transition_to(&self, new_state: LinkState) -> bool {
        use LinkState::*;

        match (self, new_state) {
            (Disconnected, Connecting) => true, // connect()
            (Disconnected, Disconnected) => true, // Idempotent disconnect

            (Connecting, Connected) => true,    // Open succeeded
            (Connecting, Disconnected) => true, // Open failed

            (Connected, Disconnected) => true, // Disconnect sequence

            _ => false,
        }
    }
}
