use link_protocol::{ConnectionHandle, OpenError, ReceiveEvent, SendInfo, SerialConfig};
use std::rc::Rc;

/// Completion for [`ChannelProvider::open`]
pub type OpenCallback = Box<dyn FnOnce(Result<ConnectionHandle, OpenError>)>;

/// Completion for close and flush, carrying the provider's result verbatim
pub type ResultCallback = Box<dyn FnOnce(bool)>;

/// Completion for [`ChannelProvider::send`]
pub type SendCallback = Box<dyn FnOnce(SendInfo)>;

/// Listener registered with [`ChannelProvider::add_receive_listener`]
pub type ReceiveListener = Rc<dyn Fn(&ReceiveEvent)>;

/// Host serial API the controller is backed by
///
/// Every operation is asynchronous and reports through its completion. An
/// implementation may invoke the completion before returning (the mock does)
/// or at any later point on the same thread.
///
/// Inbound data is not routed per connection: every listener sees every
/// [`ReceiveEvent`] for every handle the provider has open. Listeners are
/// responsible for discarding events that are not theirs.
pub trait ChannelProvider {
    /// Open the channel at `path`
    fn open(&self, path: &str, config: &SerialConfig, done: OpenCallback);

    /// Close an open channel
    fn close(&self, handle: ConnectionHandle, done: ResultCallback);

    /// Discard buffered data on an open channel
    fn flush(&self, handle: ConnectionHandle, done: ResultCallback);

    /// Write bytes to an open channel
    ///
    /// Send-level failures are reported in [`SendInfo::error`], not by
    /// dropping the completion.
    fn send(&self, handle: ConnectionHandle, data: Vec<u8>, done: SendCallback);

    /// Register a listener for inbound data on any channel
    fn add_receive_listener(&self, listener: ReceiveListener);
}
