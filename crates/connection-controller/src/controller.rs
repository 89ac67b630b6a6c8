use link_protocol::{
    ConnectionHandle, LinkError, LinkState, OpenError, ReceiveEvent, SendFailure, SendInfo,
    SerialConfig,
};
use link_runtime::{completion, link_debug, link_error, link_info, link_trace, link_warn};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::constants::link::DEFAULT_BAUD_RATE;
use crate::provider::{ChannelProvider, ResultCallback};

type DataCallback = Rc<dyn Fn(&[u8])>;
type ErrorCallback = Rc<dyn Fn(&SendFailure)>;
type ConnectCallback = Box<dyn FnOnce(Result<(), OpenError>)>;

/// ConnectionController owns the lifecycle of one logical connection
///
/// Responsibilities:
/// - Guard overlapping connect and disconnect requests
/// - Filter the provider's broadcast receive events down to this connection
/// - Reject flush/send against a closed connection synchronously
///
/// ## State Machine
///
/// See `link-protocol/src/state.rs` for the transition diagram. The phase is
/// derived from two fields: `connecting` and the optional handle.
///
/// Key coordination patterns:
/// - **Latched disconnect**: disconnect() during Connecting is remembered and
///   replayed as soon as the open succeeds
/// - **Clear-then-close**: the handle is cleared before close is issued, so a
///   second disconnect or a late receive event sees the link as closed
/// - **Handle filtering**: a receive event is delivered only if its handle
///   matches the one this controller currently holds
///
/// All state lives behind `Rc` and `Cell`/`RefCell`; the controller is
/// single-threaded and never holds a borrow across a provider call or a user
/// callback, so providers may complete synchronously.
pub struct ConnectionController<P: ChannelProvider + ?Sized + 'static> {
    shared: Rc<Shared<P>>,
}

struct Shared<P: ChannelProvider + ?Sized + 'static> {
    path: String,
    config: SerialConfig,
    provider: Rc<P>,

    handle: Cell<Option<ConnectionHandle>>,
    connecting: Cell<bool>,
    listener_attached: Cell<bool>,

    // Disconnect requested; consumed by the disconnect sequence or a failed open
    pending_disconnect: Cell<bool>,
    // Callbacks of disconnect() calls made while the open was outstanding
    deferred_disconnects: RefCell<Vec<ResultCallback>>,

    on_data: RefCell<DataCallback>,
    on_error: RefCell<ErrorCallback>,
}

impl<P: ChannelProvider + ?Sized + 'static> ConnectionController<P> {
    /// Bind a controller to `path` using the default 115200 8N1 configuration
    pub fn new(path: impl Into<String>, provider: Rc<P>) -> Self {
        Self::with_config(path, SerialConfig::new_8n1(DEFAULT_BAUD_RATE), provider)
    }

    pub fn with_config(path: impl Into<String>, config: SerialConfig, provider: Rc<P>) -> Self {
        Self {
            shared: Rc::new(Shared {
                path: path.into(),
                config,
                provider,
                handle: Cell::new(None),
                connecting: Cell::new(false),
                listener_attached: Cell::new(false),
                pending_disconnect: Cell::new(false),
                deferred_disconnects: RefCell::new(Vec::new()),
                on_data: RefCell::new(Rc::new(|_: &[u8]| {})),
                on_error: RefCell::new(Rc::new(|_: &SendFailure| {})),
            }),
        }
    }

    pub fn path(&self) -> &str {
        &self.shared.path
    }

    pub fn config(&self) -> &SerialConfig {
        &self.shared.config
    }

    /// Handle assigned by the provider, if connected
    pub fn handle(&self) -> Option<ConnectionHandle> {
        self.shared.handle.get()
    }

    pub fn is_connected(&self) -> bool {
        self.shared.handle.get().is_some()
    }

    pub fn state(&self) -> LinkState {
        self.shared.state()
    }

    /// Start opening the channel
    ///
    /// Ignored while already connecting or connected.
    pub fn connect(&self) {
        self.shared.connect(None);
    }

    /// Start opening the channel and report the outcome to `done`
    ///
    /// `done` receives true once the channel is open, false if the provider
    /// refused it. If the request is ignored because the controller is already
    /// connecting or connected, `done` is dropped without being called.
    pub fn connect_with(&self, done: impl FnOnce(bool) + 'static) {
        self.shared
            .connect(Some(Box::new(move |result: Result<(), OpenError>| {
                done(result.is_ok())
            })));
    }

    /// Request a disconnect. Safe to call at any time, any number of times.
    pub fn disconnect(&self) {
        self.shared.disconnect(None);
    }

    /// Request a disconnect and report the provider's close result to `done`
    ///
    /// While an open is outstanding the request is latched and `done` fires
    /// after the deferred close. If there is nothing to close (idle, or the
    /// outstanding open failed) `done` is dropped without being called.
    pub fn disconnect_with(&self, done: impl FnOnce(bool) + 'static) {
        self.shared.disconnect(Some(Box::new(done)));
    }

    /// Close immediately, bypassing the disconnect latch
    ///
    /// Fails with [`LinkError::ConnectInFlight`] if an open is outstanding;
    /// callers should normally use [`disconnect`](Self::disconnect), which
    /// handles that case. Does nothing when already disconnected.
    pub fn disconnect_now(&self) -> Result<(), LinkError> {
        self.shared.disconnect_now(None)
    }

    /// Discard buffered data; `done` receives the provider's result
    pub fn flush(&self, done: impl FnOnce(bool) + 'static) -> Result<(), LinkError> {
        self.shared.flush(Box::new(done))
    }

    /// Write `buffer` to the channel
    ///
    /// Send-level failures are routed to the error callback along with the
    /// buffer; only calling this while not connected returns an error.
    pub fn send(&self, buffer: impl Into<Vec<u8>>) -> Result<(), LinkError> {
        self.shared.send(buffer.into())
    }

    /// Replace the data callback. Latest wins.
    pub fn set_data_callback(&self, callback: impl Fn(&[u8]) + 'static) {
        *self.shared.on_data.borrow_mut() = Rc::new(callback);
    }

    /// Replace the error callback. Latest wins.
    pub fn set_error_callback(&self, callback: impl Fn(&SendFailure) + 'static) {
        *self.shared.on_error.borrow_mut() = Rc::new(callback);
    }

    /// Connect and wait for the open to resolve
    pub async fn connect_async(&self) -> Result<(), LinkError> {
        if !self.state().accepts_connect() {
            return Err(LinkError::Ignored {
                operation: "connect",
            });
        }

        let (completer, done) = completion();
        self.shared
            .connect(Some(Box::new(move |result: Result<(), OpenError>| {
                completer.complete(result)
            })));

        match done.await {
            Some(result) => result.map_err(LinkError::OpenFailed),
            None => Err(LinkError::Ignored {
                operation: "connect",
            }),
        }
    }

    /// Disconnect and wait for the provider's close result
    pub async fn disconnect_async(&self) -> Result<bool, LinkError> {
        let (completer, done) = completion();
        self.shared.disconnect(Some(Box::new(move |ok: bool| completer.complete(ok))));

        done.await.ok_or(LinkError::Ignored {
            operation: "disconnect",
        })
    }

    /// Flush and wait for the provider's result
    pub async fn flush_async(&self) -> Result<bool, LinkError> {
        let (completer, done) = completion();
        self.shared
            .flush(Box::new(move |ok: bool| completer.complete(ok)))?;

        done.await.ok_or(LinkError::Ignored { operation: "flush" })
    }
}

impl<P: ChannelProvider + ?Sized + 'static> fmt::Debug for ConnectionController<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionController")
            .field("path", &self.shared.path)
            .field("state", &self.shared.state())
            .field("handle", &self.shared.handle.get())
            .field("pending_disconnect", &self.shared.pending_disconnect.get())
            .finish()
    }
}

impl<P: ChannelProvider + ?Sized + 'static> Shared<P> {
    fn state(&self) -> LinkState {
        if self.connecting.get() {
            LinkState::Connecting
        } else if self.handle.get().is_some() {
            LinkState::Connected
        } else {
            LinkState::Disconnected
        }
    }

    fn log_transition(&self, from: LinkState, to: LinkState) {
        if from.can_transition_to(to) {
            link_debug!(path = %self.path, "Link: {:?} → {:?}", from, to);
        } else {
            link_warn!(path = %self.path, "Unexpected link transition {:?} → {:?}", from, to);
        }
    }

    fn connect(self: &Rc<Self>, done: Option<ConnectCallback>) {
        let state = self.state();
        if !state.accepts_connect() {
            link_debug!(path = %self.path, ?state, "connect ignored");
            return;
        }

        // A disconnect issued while idle must not cancel this new connection
        self.pending_disconnect.set(false);
        self.connecting.set(true);
        self.log_transition(state, LinkState::Connecting);

        let this = Rc::clone(self);
        self.provider.open(
            &self.path,
            &self.config,
            Box::new(move |result: Result<ConnectionHandle, OpenError>| {
                this.finish_connect(result, done)
            }),
        );
    }

    fn finish_connect(
        self: &Rc<Self>,
        result: Result<ConnectionHandle, OpenError>,
        done: Option<ConnectCallback>,
    ) {
        self.connecting.set(false);

        match result {
            Err(e) => {
                link_warn!(path = %self.path, error = %e, "Failed to open channel");
                self.log_transition(LinkState::Connecting, LinkState::Disconnected);

                // Nothing was opened, so there is nothing for a latched disconnect to close
                self.pending_disconnect.set(false);
                let abandoned = self.deferred_disconnects.take();
                if !abandoned.is_empty() {
                    link_debug!(
                        path = %self.path,
                        "Dropping {} latched disconnect request(s)",
                        abandoned.len()
                    );
                }
                drop(abandoned);

                if let Some(done) = done {
                    done(Err(e));
                }
            }
            Ok(handle) => {
                self.handle.set(Some(handle));
                self.log_transition(LinkState::Connecting, LinkState::Connected);
                link_info!(
                    path = %self.path,
                    %handle,
                    baud = self.config.baud_rate,
                    "Channel open"
                );

                self.attach_listener();

                if let Some(done) = done {
                    done(Ok(()));
                }

                // A callback that reconnected leaves the latch for the new open to replay
                if self.pending_disconnect.get() && !self.connecting.get() {
                    link_debug!(path = %self.path, "Replaying disconnect latched during connect");
                    if let Err(e) = self.disconnect_now(None) {
                        link_error!(path = %self.path, error = %e, "Latched disconnect failed");
                    }
                }
            }
        }
    }

    fn attach_listener(self: &Rc<Self>) {
        if self.listener_attached.replace(true) {
            return;
        }

        // Weak, so the provider's listener list does not keep the controller alive
        let weak = Rc::downgrade(self);
        self.provider
            .add_receive_listener(Rc::new(move |event: &ReceiveEvent| {
                if let Some(shared) = weak.upgrade() {
                    shared.dispatch(event);
                }
            }));
        link_debug!(path = %self.path, "Receive listener attached");
    }

    fn dispatch(&self, event: &ReceiveEvent) {
        match self.handle.get() {
            Some(handle) if handle == event.handle => {
                let on_data = Rc::clone(&*self.on_data.borrow());
                on_data(&event.data);
            }
            current => {
                link_trace!(
                    path = %self.path,
                    event_handle = %event.handle,
                    ?current,
                    "Ignoring receive event for another connection"
                );
            }
        }
    }

    fn disconnect(self: &Rc<Self>, done: Option<ResultCallback>) {
        self.pending_disconnect.set(true);

        if self.connecting.get() {
            link_debug!(path = %self.path, "Disconnect latched until open resolves");
            if let Some(done) = done {
                self.deferred_disconnects.borrow_mut().push(done);
            }
            return;
        }

        if self.handle.get().is_some() {
            if let Err(e) = self.disconnect_now(done) {
                link_error!(path = %self.path, error = %e, "Disconnect failed");
            }
        }
    }

    fn disconnect_now(self: &Rc<Self>, done: Option<ResultCallback>) -> Result<(), LinkError> {
        if self.connecting.get() {
            link_error!(path = %self.path, "disconnect_now called while connecting");
            return Err(LinkError::ConnectInFlight);
        }

        // Clear first: from here on the link reads as closed
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        self.pending_disconnect.set(false);
        self.log_transition(LinkState::Connected, LinkState::Disconnected);

        let mut waiting = self.deferred_disconnects.take();
        waiting.extend(done);

        let path = self.path.clone();
        self.provider.close(
            handle,
            Box::new(move |ok: bool| {
                link_info!(path = %path, %handle, ok, "Channel closed");
                for done in waiting {
                    done(ok);
                }
            }),
        );
        Ok(())
    }

    fn flush(&self, done: ResultCallback) -> Result<(), LinkError> {
        let Some(handle) = self.handle.get() else {
            link_error!(path = %self.path, "flush called while not connected");
            return Err(LinkError::NotConnected { operation: "flush" });
        };

        self.provider.flush(handle, done);
        Ok(())
    }

    fn send(self: &Rc<Self>, buffer: Vec<u8>) -> Result<(), LinkError> {
        let Some(handle) = self.handle.get() else {
            link_error!(path = %self.path, "send called while not connected");
            return Err(LinkError::NotConnected { operation: "send" });
        };

        let this = Rc::clone(self);
        self.provider.send(
            handle,
            buffer.clone(),
            Box::new(move |info: SendInfo| {
                if info.is_error() {
                    link_warn!(
                        path = %this.path,
                        %handle,
                        error = ?info.error,
                        len = buffer.len(),
                        "Send failed"
                    );
                    let on_error = Rc::clone(&*this.on_error.borrow());
                    on_error(&SendFailure { info, buffer });
                }
            }),
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::mock::MockSerial;
    use link_protocol::SendError;

    const USB: &str = "/dev/ttyUSB1";
    const COM: &str = "COM1";

    fn mock() -> Rc<MockSerial> {
        link_runtime::logging::init_for_tests();
        Rc::new(MockSerial::new([USB, COM]))
    }

    fn deferred() -> Rc<MockSerial> {
        link_runtime::logging::init_for_tests();
        Rc::new(MockSerial::deferred([USB, COM]))
    }

    #[test]
    fn test_new_controller_is_disconnected() {
        let serial = mock();
        let controller = ConnectionController::new(USB, serial.clone());
        assert!(!controller.is_connected());
        assert_eq!(controller.state(), LinkState::Disconnected);
        assert_eq!(controller.handle(), None);
        assert_eq!(controller.path(), USB);
        assert_eq!(controller.config().baud_rate, 115200);
        assert_eq!(serial.listener_count(), 0);
    }

    #[test]
    fn test_connect_opens_with_configured_baud() {
        let serial = mock();
        let config = SerialConfig::from_framing("7E1", 9600).unwrap();
        let controller = ConnectionController::with_config(COM, config.clone(), serial.clone());

        controller.connect();

        let handle = controller.handle().unwrap();
        assert_eq!(serial.connection_config(handle), Some(config));
        assert_eq!(controller.state(), LinkState::Connected);
    }

    #[test]
    fn test_connect_while_connecting_is_ignored() {
        let serial = deferred();
        let controller = ConnectionController::new(USB, serial.clone());
        let calls = Rc::new(Cell::new(0));

        controller.connect();
        let c = calls.clone();
        controller.connect_with(move |_| c.set(c.get() + 1));
        assert_eq!(controller.state(), LinkState::Connecting);
        assert_eq!(serial.open_calls(), 1);

        serial.run_pending();
        assert!(controller.is_connected());
        // The ignored request's callback was never invoked
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_failed_open_reports_false_and_allows_retry() {
        let serial = mock();
        let controller = ConnectionController::new("/dev/ttyACM7", serial.clone());
        let outcome = Rc::new(Cell::new(None));

        let o = outcome.clone();
        controller.connect_with(move |ok| o.set(Some(ok)));

        assert_eq!(outcome.get(), Some(false));
        assert!(!controller.is_connected());
        assert_eq!(controller.state(), LinkState::Disconnected);
        assert_eq!(serial.listener_count(), 0);

        serial.add_device("/dev/ttyACM7");
        let o = outcome.clone();
        controller.connect_with(move |ok| o.set(Some(ok)));
        assert_eq!(outcome.get(), Some(true));
        assert_eq!(serial.open_calls(), 2);
    }

    #[test]
    fn test_failed_open_drops_latched_disconnect() {
        let serial = Rc::new(MockSerial::deferred([COM]));
        let controller = ConnectionController::new(USB, serial.clone());
        let closed = Rc::new(Cell::new(false));

        controller.connect();
        let c = closed.clone();
        controller.disconnect_with(move |_| c.set(true));
        serial.run_pending();

        assert!(!controller.is_connected());
        assert_eq!(serial.close_calls(), 0);
        assert!(!closed.get());
    }

    #[test]
    fn test_disconnect_now_while_connecting_fails_without_side_effects() {
        let serial = deferred();
        let controller = ConnectionController::new(USB, serial.clone());

        controller.connect();
        assert_eq!(controller.disconnect_now(), Err(LinkError::ConnectInFlight));
        assert_eq!(controller.state(), LinkState::Connecting);

        serial.run_pending();
        // No latch was set by the failed forced close
        assert!(controller.is_connected());
        assert_eq!(serial.close_calls(), 0);
    }

    #[test]
    fn test_disconnect_now_when_idle_is_ok() {
        let serial = mock();
        let controller = ConnectionController::new(USB, serial.clone());
        assert_eq!(controller.disconnect_now(), Ok(()));
        assert_eq!(serial.close_calls(), 0);
    }

    #[test]
    fn test_handle_cleared_before_close_completes() {
        let serial = deferred();
        let controller = ConnectionController::new(USB, serial.clone());
        controller.connect();
        serial.run_pending();
        let handle = controller.handle().unwrap();

        controller.disconnect();
        // Close is still outstanding, but the link already reads as closed
        assert!(!controller.is_connected());
        assert!(serial.is_open(handle));

        controller.disconnect();
        assert_eq!(serial.pending_count(), 1);

        serial.run_pending();
        assert!(!serial.is_open(handle));
        assert_eq!(serial.close_calls(), 1);
    }

    #[test]
    fn test_disconnect_callback_gets_close_result() {
        let serial = mock();
        let controller = ConnectionController::new(USB, serial.clone());
        let result = Rc::new(Cell::new(None));

        controller.connect();
        let r = result.clone();
        controller.disconnect_with(move |ok| r.set(Some(ok)));
        assert_eq!(result.get(), Some(true));
    }

    #[test]
    fn test_all_latched_disconnect_callbacks_fire() {
        let serial = deferred();
        let controller = ConnectionController::new(USB, serial.clone());
        let fired = Rc::new(Cell::new(0));

        controller.connect();
        for _ in 0..3 {
            let f = fired.clone();
            controller.disconnect_with(move |ok| {
                assert!(ok);
                f.set(f.get() + 1);
            });
        }
        serial.run_pending();

        assert_eq!(fired.get(), 3);
        assert_eq!(serial.close_calls(), 1);
    }

    #[test]
    fn test_disconnect_from_connect_callback_closes_once() {
        let serial = deferred();
        let controller = Rc::new(ConnectionController::new(USB, serial.clone()));

        let c = Rc::clone(&controller);
        controller.connect_with(move |ok| {
            assert!(ok);
            c.disconnect();
        });
        // Latched as well, so the replay after the callback must find nothing left to close
        controller.disconnect();
        serial.run_pending();

        assert!(!controller.is_connected());
        assert_eq!(serial.close_calls(), 1);
    }

    #[test]
    fn test_reconnect_from_connect_callback_keeps_latch_for_new_open() {
        let serial = deferred();
        let controller = Rc::new(ConnectionController::new(USB, serial.clone()));

        let c = Rc::clone(&controller);
        controller.connect_with(move |ok| {
            assert!(ok);
            c.disconnect();
            c.connect();
            c.disconnect();
            // The second disconnect waits for the new open
            assert_eq!(c.state(), LinkState::Connecting);
        });
        assert!(serial.complete_next());

        // First connection is closing, second open is outstanding
        assert_eq!(controller.state(), LinkState::Connecting);
        assert_eq!(serial.close_calls(), 1);
        assert_eq!(serial.open_calls(), 2);

        serial.run_pending();

        assert_eq!(controller.state(), LinkState::Disconnected);
        assert_eq!(serial.close_calls(), 2);
        assert!(!serial.is_open(ConnectionHandle(0)));
        assert!(!serial.is_open(ConnectionHandle(1)));
    }

    #[test]
    fn test_stale_idle_disconnect_does_not_cancel_connect() {
        let serial = mock();
        let controller = ConnectionController::new(USB, serial.clone());

        controller.disconnect();
        controller.connect();

        assert!(controller.is_connected());
        assert_eq!(serial.close_calls(), 0);
    }

    #[test]
    fn test_flush_requires_connection() {
        let serial = mock();
        let controller = ConnectionController::new(USB, serial.clone());

        let err = controller.flush(|_| panic!("flush callback must not run")).unwrap_err();
        assert_eq!(err, LinkError::NotConnected { operation: "flush" });
        assert_eq!(serial.flush_calls(), 0);
    }

    #[test]
    fn test_flush_reports_provider_result_once() {
        let serial = mock();
        let controller = ConnectionController::new(USB, serial.clone());
        controller.connect();

        let calls = Rc::new(RefCell::new(Vec::new()));
        let c = calls.clone();
        controller.flush(move |ok| c.borrow_mut().push(ok)).unwrap();

        assert_eq!(*calls.borrow(), vec![true]);
        assert_eq!(serial.flush_calls(), 1);
    }

    #[test]
    fn test_send_requires_connection() {
        let serial = mock();
        let controller = ConnectionController::new(USB, serial.clone());

        assert_eq!(
            controller.send(vec![1, 2, 3]),
            Err(LinkError::NotConnected { operation: "send" })
        );
        assert_eq!(serial.send_calls(), 0);
    }

    #[test]
    fn test_send_writes_to_device() {
        let serial = mock();
        let controller = ConnectionController::new(USB, serial.clone());
        controller.connect();
        controller.set_error_callback(|f| panic!("unexpected send failure: {f:?}"));

        controller.send(*b"AT\r").unwrap();
        controller.send(vec![0x01]).unwrap();

        assert_eq!(serial.written(controller.handle().unwrap()), b"AT\r\x01".to_vec());
    }

    #[test]
    fn test_send_error_routed_with_buffer() {
        let serial = mock();
        let controller = ConnectionController::new(USB, serial.clone());
        let failures = Rc::new(RefCell::new(Vec::new()));
        let f = failures.clone();
        controller.set_error_callback(move |failure| f.borrow_mut().push(failure.clone()));
        controller.connect();

        serial.fail_next_send(SendError::Timeout);
        controller.send(vec![0xAA, 0xBB]).unwrap();
        controller.send(vec![0xCC]).unwrap();

        let failures = failures.borrow();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].buffer, vec![0xAA, 0xBB]);
        assert_eq!(failures[0].info.error, Some(SendError::Timeout));
        assert_eq!(serial.written(controller.handle().unwrap()), vec![0xCC]);
    }

    #[test]
    fn test_listener_attached_once_across_reconnects() {
        let serial = mock();
        let controller = ConnectionController::new(USB, serial.clone());

        for _ in 0..3 {
            controller.connect();
            controller.disconnect();
        }

        assert_eq!(serial.listener_count(), 1);
        assert_eq!(serial.open_calls(), 3);
        assert_eq!(serial.close_calls(), 3);
    }

    #[test]
    fn test_data_after_reconnect_uses_new_handle() {
        let serial = mock();
        let controller = ConnectionController::new(USB, serial.clone());
        let received = Rc::new(RefCell::new(Vec::new()));
        let r = received.clone();
        controller.set_data_callback(move |data| r.borrow_mut().extend_from_slice(data));

        controller.connect();
        let first = controller.handle().unwrap();
        controller.disconnect();
        controller.connect();
        let second = controller.handle().unwrap();
        assert_ne!(first, second);

        serial.inject(first, [0x01u8]);
        serial.inject(second, [0x02u8]);
        assert_eq!(*received.borrow(), vec![0x02]);
    }

    #[test]
    fn test_callback_replaced_inside_callback() {
        let serial = mock();
        let controller = Rc::new(ConnectionController::new(USB, serial.clone()));
        let second_hits = Rc::new(Cell::new(0));

        let c = Rc::downgrade(&controller);
        let hits = second_hits.clone();
        controller.set_data_callback(move |_| {
            if let Some(c) = c.upgrade() {
                let hits = hits.clone();
                c.set_data_callback(move |_| hits.set(hits.get() + 1));
            }
        });
        controller.connect();
        let handle = controller.handle().unwrap();

        serial.inject(handle, [1u8]);
        assert_eq!(second_hits.get(), 0);
        serial.inject(handle, [2u8]);
        serial.inject(handle, [3u8]);
        assert_eq!(second_hits.get(), 2);
    }

    #[test]
    fn test_dropped_controller_stops_receiving() {
        let serial = mock();
        let hits = Rc::new(Cell::new(0));
        let handle = {
            let controller = ConnectionController::new(USB, serial.clone());
            let h = hits.clone();
            controller.set_data_callback(move |_| h.set(h.get() + 1));
            controller.connect();
            controller.handle().unwrap()
        };

        serial.inject(handle, [0x10u8]);
        assert_eq!(hits.get(), 0);
        assert_eq!(serial.listener_count(), 1);
    }

    #[test]
    fn test_debug_output_names_path_and_state() {
        let serial = mock();
        let controller = ConnectionController::new(COM, serial);
        let debug = format!("{controller:?}");
        assert!(debug.contains("COM1"));
        assert!(debug.contains("Disconnected"));
    }
}
