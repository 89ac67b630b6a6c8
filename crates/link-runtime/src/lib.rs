//! # Link Runtime
//!
//! Runtime plumbing shared by the serial-link crates.
//!
//! This crate defines:
//! - **Logging macros**: `link_debug!` and friends, backed by `tracing`
//! - **Subscriber setup**: [`logging::init`] for binaries and tests
//! - **Completion**: a one-shot bridge that turns a completion callback into a future
//!
//! ## Example
//!
//! ```ignore
//! use link_runtime::{completion, link_info};
//!
//! let (completer, done) = completion::<bool>();
//! controller.flush(move |ok| completer.complete(ok))?;
//! link_info!("flush finished: {:?}", done.await);
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod completion;
pub mod logging;

pub use completion::{completion, Abandoned, Completer, Completion};

// Used by the logging macros so callers don't need their own tracing dependency
#[doc(hidden)]
pub use tracing;
