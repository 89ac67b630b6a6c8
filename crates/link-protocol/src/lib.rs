//! # Link Protocol
//!
//! Shared vocabulary for the serial-link connection controller.
//!
//! This crate defines every value that crosses the boundary between a
//! connection controller and the channel provider backing it. It has no
//! runtime dependencies beyond `serde` and `thiserror`, so fake providers and
//! embedders can use it without pulling in the controller itself.
//!
//! ## Contents
//!
//! - **ConnectionHandle**: opaque token the provider assigns to an open channel
//! - **SerialConfig**: channel configuration passed to `open`
//! - **ReceiveEvent / SendInfo**: payloads of provider notifications
//! - **OpenError / LinkError**: the two error tiers
//! - **LinkState**: derived lifecycle phase of a controller

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod config;
pub mod errors;
pub mod events;
pub mod state;

pub use config::{FlowControl, ParityMode, SerialConfig, DEFAULT_BAUD_RATE};
pub use errors::{LinkError, OpenError};
pub use events::{ConnectionHandle, ReceiveEvent, SendError, SendFailure, SendInfo};
pub use state::LinkState;
