//! # Connection Controller
//!
//! Connection state machine for a serial device reached through a
//! callback-based host API.
//!
//! ## Components
//!
//! - **ChannelProvider**: trait describing the host serial API (open, close,
//!   flush, send, broadcast receive)
//! - **ConnectionController**: owns one logical connection; guards
//!   overlapping connect/disconnect and filters inbound data by handle
//! - **MockSerial**: in-memory provider for tests
//!
//! ## Example
//!
//! ```
//! use connection_controller::{ConnectionController, MockSerial};
//! use std::rc::Rc;
//!
//! let serial = Rc::new(MockSerial::new(["/dev/ttyUSB1"]));
//! let controller = ConnectionController::new("/dev/ttyUSB1", serial.clone());
//!
//! controller.set_data_callback(|bytes| println!("rx {bytes:02x?}"));
//! controller.connect();
//! assert!(controller.is_connected());
//!
//! controller.disconnect();
//! assert!(!controller.is_connected());
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod constants;
pub mod controller;
pub mod mock;
pub mod provider;

pub use controller::ConnectionController;
pub use mock::MockSerial;
pub use provider::{ChannelProvider, OpenCallback, ReceiveListener, ResultCallback, SendCallback};

pub use link_protocol::{
    ConnectionHandle, LinkError, LinkState, OpenError, ReceiveEvent, SendError, SendFailure,
    SendInfo, SerialConfig,
};
