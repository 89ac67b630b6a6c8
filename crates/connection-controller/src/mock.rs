//! In-memory channel provider for tests
//!
//! `MockSerial` behaves like a host serial API with a fixed set of device
//! paths. Handles are sequential indices into its connection table, and
//! every injected receive event is broadcast to every registered listener,
//! exactly as a real provider would.
//!
//! Two completion modes are available:
//! - [`MockSerial::new`] completes every request before returning
//! - [`MockSerial::deferred`] queues completions until [`MockSerial::run_pending`]
//!   or [`MockSerial::complete_next`], to model requests that are still outstanding

use link_protocol::{ConnectionHandle, OpenError, ReceiveEvent, SendError, SendInfo, SerialConfig};
use link_runtime::link_trace;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::constants::mock::FIRST_HANDLE;
use crate::provider::{ChannelProvider, OpenCallback, ReceiveListener, ResultCallback, SendCallback};

struct MockConnection {
    path: String,
    config: SerialConfig,
    open: bool,
    written: Vec<u8>,
}

enum PendingOp {
    Open {
        path: String,
        config: SerialConfig,
        done: OpenCallback,
    },
    Close {
        handle: ConnectionHandle,
        done: ResultCallback,
    },
    Flush {
        done: ResultCallback,
    },
    Send {
        handle: ConnectionHandle,
        data: Vec<u8>,
        done: SendCallback,
    },
}

/// Fake provider backed by in-memory devices
pub struct MockSerial {
    devices: RefCell<Vec<String>>,
    connections: RefCell<Vec<MockConnection>>,
    listeners: RefCell<Vec<ReceiveListener>>,

    deferred: bool,
    pending: RefCell<VecDeque<PendingOp>>,
    send_failures: RefCell<VecDeque<SendError>>,

    open_calls: Cell<usize>,
    close_calls: Cell<usize>,
    flush_calls: Cell<usize>,
    send_calls: Cell<usize>,
}

impl MockSerial {
    /// Provider that completes every request synchronously
    pub fn new<I, S>(devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(devices, false)
    }

    /// Provider that holds completions until they are run explicitly
    pub fn deferred<I, S>(devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(devices, true)
    }

    fn build<I, S>(devices: I, deferred: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            devices: RefCell::new(devices.into_iter().map(Into::into).collect()),
            connections: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            deferred,
            pending: RefCell::new(VecDeque::new()),
            send_failures: RefCell::new(VecDeque::new()),
            open_calls: Cell::new(0),
            close_calls: Cell::new(0),
            flush_calls: Cell::new(0),
            send_calls: Cell::new(0),
        }
    }

    /// Paths of the devices currently present
    pub fn devices(&self) -> Vec<String> {
        self.devices.borrow().clone()
    }

    pub fn add_device(&self, path: impl Into<String>) {
        let path = path.into();
        let mut devices = self.devices.borrow_mut();
        if !devices.contains(&path) {
            devices.push(path);
        }
    }

    /// Unplug a device; its open connections stop accepting data
    pub fn remove_device(&self, path: &str) {
        self.devices.borrow_mut().retain(|p| p != path);
        for conn in self.connections.borrow_mut().iter_mut() {
            if conn.path == path {
                conn.open = false;
            }
        }
    }

    /// Deliver bytes from the device behind `handle` to every listener
    pub fn inject(&self, handle: ConnectionHandle, data: impl Into<Vec<u8>>) {
        let event = ReceiveEvent::new(handle, data);
        // Snapshot so listeners may register or call back into the provider
        let listeners = self.listeners.borrow().clone();
        link_trace!(%handle, len = event.data.len(), listeners = listeners.len(), "mock rx");
        for listener in listeners {
            listener(&event);
        }
    }

    /// Make the next send fail with `error` instead of reaching the device
    pub fn fail_next_send(&self, error: SendError) {
        self.send_failures.borrow_mut().push_back(error);
    }

    /// Run the oldest queued completion; false if none was queued
    pub fn complete_next(&self) -> bool {
        let op = self.pending.borrow_mut().pop_front();
        match op {
            Some(op) => {
                self.execute(op);
                true
            }
            None => false,
        }
    }

    /// Run queued completions until the queue is empty, including any they enqueue
    pub fn run_pending(&self) {
        while self.complete_next() {}
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn open_calls(&self) -> usize {
        self.open_calls.get()
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.get()
    }

    pub fn flush_calls(&self) -> usize {
        self.flush_calls.get()
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.get()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_open(&self, handle: ConnectionHandle) -> bool {
        self.with_connection(handle, |conn| conn.open).unwrap_or(false)
    }

    /// Everything successfully sent on `handle`, in order
    pub fn written(&self, handle: ConnectionHandle) -> Vec<u8> {
        self.with_connection(handle, |conn| conn.written.clone())
            .unwrap_or_default()
    }

    /// Configuration `handle` was opened with
    pub fn connection_config(&self, handle: ConnectionHandle) -> Option<SerialConfig> {
        self.with_connection(handle, |conn| conn.config.clone())
    }

    fn with_connection<T>(
        &self,
        handle: ConnectionHandle,
        f: impl FnOnce(&mut MockConnection) -> T,
    ) -> Option<T> {
        let index = handle.0.checked_sub(FIRST_HANDLE)? as usize;
        let mut connections = self.connections.borrow_mut();
        connections.get_mut(index).map(f)
    }

    fn submit(&self, op: PendingOp) {
        if self.deferred {
            self.pending.borrow_mut().push_back(op);
        } else {
            self.execute(op);
        }
    }

    // Completions run with no borrow held, since they may call straight back in
    fn execute(&self, op: PendingOp) {
        match op {
            PendingOp::Open { path, config, done } => {
                let result = if self.devices.borrow().contains(&path) {
                    let mut connections = self.connections.borrow_mut();
                    let handle = ConnectionHandle(FIRST_HANDLE + connections.len() as u32);
                    connections.push(MockConnection {
                        path,
                        config,
                        open: true,
                        written: Vec::new(),
                    });
                    Ok(handle)
                } else {
                    Err(OpenError::DeviceNotFound(path))
                };
                done(result);
            }
            PendingOp::Close { handle, done } => {
                // Closing an unknown or already closed handle fails
                let ok = self
                    .with_connection(handle, |conn| std::mem::replace(&mut conn.open, false))
                    .unwrap_or(false);
                done(ok);
            }
            PendingOp::Flush { done } => {
                // Nothing is buffered
                done(true);
            }
            PendingOp::Send { handle, data, done } => {
                let forced = self.send_failures.borrow_mut().pop_front();
                let info = match forced {
                    Some(error) => SendInfo::failed(error),
                    None => self
                        .with_connection(handle, |conn| {
                            if conn.open {
                                conn.written.extend_from_slice(&data);
                                SendInfo::sent(data.len())
                            } else {
                                SendInfo::failed(SendError::Disconnected)
                            }
                        })
                        .unwrap_or_else(|| SendInfo::failed(SendError::Disconnected)),
                };
                done(info);
            }
        }
    }
}

impl ChannelProvider for MockSerial {
    fn open(&self, path: &str, config: &SerialConfig, done: OpenCallback) {
        self.open_calls.set(self.open_calls.get() + 1);
        self.submit(PendingOp::Open {
            path: path.to_string(),
            config: config.clone(),
            done,
        });
    }

    fn close(&self, handle: ConnectionHandle, done: ResultCallback) {
        self.close_calls.set(self.close_calls.get() + 1);
        self.submit(PendingOp::Close { handle, done });
    }

    fn flush(&self, _handle: ConnectionHandle, done: ResultCallback) {
        self.flush_calls.set(self.flush_calls.get() + 1);
        self.submit(PendingOp::Flush { done });
    }

    fn send(&self, handle: ConnectionHandle, data: Vec<u8>, done: SendCallback) {
        self.send_calls.set(self.send_calls.get() + 1);
        self.submit(PendingOp::Send { handle, data, done });
    }

    fn add_receive_listener(&self, listener: ReceiveListener) {
        self.listeners.borrow_mut().push(listener);
    }
}
