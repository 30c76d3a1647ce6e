//! Connection registry and broadcast fanout for the auction server
//!
//! This module tracks every live client connection and the single optional
//! monitor connection. A [`ConnectionHandle`] stands in for a socket: it
//! carries the connection's outbound queue (drained by a dedicated writer
//! task) and a close signal that tells the owning handler to stop reading.
//!
//! The registry itself is plain data. All mutation happens while the caller
//! holds the server-wide state lock, so no synchronization lives here.

use log::{info, warn};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::Notify;

/// Handle to a live client connection.
///
/// Cloneable so it can sit in the registry, in a room member list, and in the
/// connection's own session at the same time. Sending queues a line on the
/// connection's writer task; closing fires a signal the handler's read loop
/// listens for. The socket itself is closed exactly once, by ownership, when
/// the reader and writer tasks drop their halves.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: u32,
    addr: SocketAddr,
    sender: mpsc::UnboundedSender<String>,
    closed: Arc<Notify>,
}

impl ConnectionHandle {
    /// Creates a handle and the receiving end of its outbound queue.
    ///
    /// The caller hands the receiver to the connection's writer task; once
    /// every clone of the handle is dropped, the receiver sees the channel
    /// close and the writer task releases the socket.
    pub fn new(id: u32, addr: SocketAddr) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = ConnectionHandle {
            id,
            addr,
            sender,
            closed: Arc::new(Notify::new()),
        };
        (handle, receiver)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Queues one line for delivery. Returns false if the writer task is
    /// gone, which means the connection is already dead or closing.
    pub fn send(&self, line: &str) -> bool {
        self.sender.send(line.to_string()).is_ok()
    }

    /// Tells the owning handler to stop reading and release the connection.
    /// Idempotent; the signal is stored if the handler is not yet waiting.
    pub fn close(&self) {
        self.closed.notify_one();
    }

    /// Resolves once [`close`](Self::close) has been called.
    pub async fn closed(&self) {
        self.closed.notified().await;
    }
}

/// The set of all live client connections plus the monitor slot.
///
/// Every connection present in any auction room's member list is also present
/// here, until both are removed together during that connection's teardown.
/// The monitor is tracked separately and excluded from the general broadcast
/// set.
pub struct ConnectionRegistry {
    connections: HashMap<u32, ConnectionHandle>,
    monitor: Option<ConnectionHandle>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        ConnectionRegistry {
            connections: HashMap::new(),
            monitor: None,
        }
    }

    /// Adds a connection to the live set.
    pub fn register(&mut self, handle: ConnectionHandle) {
        info!(
            "Client {} connected from {}. Total clients: {}",
            handle.id(),
            handle.addr(),
            self.connections.len() + 1
        );
        self.connections.insert(handle.id(), handle);
    }

    /// Removes a connection from the live set and closes it. Removing an
    /// already-absent connection is a no-op, not an error.
    pub fn unregister(&mut self, id: u32) -> bool {
        if let Some(handle) = self.connections.remove(&id) {
            handle.close();
            info!(
                "Client {} removed from registry. Total clients: {}",
                id,
                self.connections.len()
            );
            true
        } else {
            false
        }
    }

    /// Sends `line` to every registered connection except `exclude`.
    ///
    /// A failed send is logged and skipped; the dead connection is left for
    /// its own handler to detect and unregister.
    pub fn broadcast_all(&self, line: &str, exclude: Option<u32>) {
        for (id, handle) in &self.connections {
            if Some(*id) == exclude {
                continue;
            }
            if !handle.send(line) {
                warn!("Send failed to client {}", id);
            }
        }
    }

    /// Installs `handle` as the monitor, closing and replacing any previous
    /// monitor. The promoted connection leaves the general broadcast set.
    pub fn set_monitor(&mut self, handle: ConnectionHandle) {
        if let Some(previous) = self.monitor.take() {
            info!("Replacing existing monitor client {}", previous.id());
            previous.close();
        }
        self.connections.remove(&handle.id());
        info!("Monitor client {} registered", handle.id());
        self.monitor = Some(handle);
    }

    /// Mirrors `line` to the monitor, if one is set. A failed send closes
    /// and clears the slot, since no handler owns monitor cleanup until its
    /// own read fails.
    pub fn send_to_monitor(&mut self, line: &str) {
        let failed = match &self.monitor {
            Some(monitor) => !monitor.send(line),
            None => return,
        };
        if failed {
            if let Some(monitor) = self.monitor.take() {
                warn!("Monitor send failed, releasing monitor client {}", monitor.id());
                monitor.close();
            }
        }
    }

    /// Releases and closes the monitor slot iff it currently holds `id`.
    /// Used by a disconnecting monitor's teardown.
    pub fn clear_monitor_if(&mut self, id: u32) -> bool {
        let held = matches!(&self.monitor, Some(monitor) if monitor.id() == id);
        if held {
            if let Some(monitor) = self.monitor.take() {
                monitor.close();
            }
        }
        held
    }

    /// Closes every tracked connection, monitor included, and clears the
    /// registry. Each handler observes its close signal and runs its own
    /// teardown, which finds nothing left to remove.
    pub fn close_all(&mut self) {
        for handle in self.connections.values() {
            handle.close();
        }
        self.connections.clear();
        if let Some(monitor) = self.monitor.take() {
            monitor.close();
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.connections.contains_key(&id)
    }

    pub fn monitor_id(&self) -> Option<u32> {
        self.monitor.as_ref().map(|monitor| monitor.id())
    }

    /// Returns the number of registered client connections (monitor excluded).
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
