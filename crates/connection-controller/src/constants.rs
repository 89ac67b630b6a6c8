//! Configuration constants for the connection controller
//!
//! Each value carries the reason it was picked. Check the documentation
//! comment before changing one, and update it with whatever prompted the change.

/// Line settings used when no configuration is supplied
pub mod link {
    /// Bit rate used by [`ConnectionController::new`](crate::ConnectionController::new)
    ///
    /// **Value**: 115200 bps (8N1)
    ///
    /// **Rationale**: The highest of the classic standard rates. Stock firmware
    /// on USB-UART bridges and development boards (FTDI, CP210x, CH340, STM32
    /// VCP) defaults to it. Slower devices need an explicit configuration
    /// anyway, because an unsupported rate fails at open instead of silently
    /// garbling data.
    ///
    /// **Used in**: controller.rs (`ConnectionController::new`)
    pub const DEFAULT_BAUD_RATE: u32 = link_protocol::DEFAULT_BAUD_RATE;
}

/// Behaviour of the in-memory provider
pub mod mock {
    /// Handle assigned to the first connection a `MockSerial` opens
    ///
    /// **Value**: 0
    ///
    /// **Rationale**: Handles are indices into the mock's connection table, so
    /// a handle maps back to its connection without a lookup map. Starting at
    /// zero exercises a zero handle through the controller, where only `None`
    /// means "no connection".
    ///
    /// **Used in**: mock.rs (open, connection lookup)
    pub const FIRST_HANDLE: u32 = 0;
}
