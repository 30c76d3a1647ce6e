//! Server network layer handling the TCP accept loop and per-connection tasks
//!
//! The supervisor accepts connections and spawns two tasks per socket: a
//! writer task that drains the connection's outbound queue, and a handler
//! task that owns the read loop, message dispatch and teardown. Handlers are
//! fire-and-forget; shutdown reaches them by closing every tracked
//! connection, which each handler observes as its close signal.

use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, Mutex};

use crate::registry::ConnectionHandle;
use crate::router::{route_message, AuctionState, Session, Verdict};

/// Cloneable trigger that stops the server from any task.
///
/// Safe to fire from a signal handler context and idempotent: repeated calls
/// after the server is already gone do nothing.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    trigger: broadcast::Sender<()>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        // An error just means the accept loop already returned.
        let _ = self.trigger.send(());
    }
}

/// The auction server: listening socket, shared state and shutdown channel.
pub struct Server {
    listener: TcpListener,
    state: Arc<Mutex<AuctionState>>,
    shutdown: broadcast::Sender<()>,
}

impl Server {
    /// Binds the listening socket. Failing to bind is fatal at startup and
    /// surfaces to the caller; everything after this point is per-connection.
    pub async fn new(addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let (shutdown, _) = broadcast::channel(1);

        Ok(Server {
            listener,
            state: Arc::new(Mutex::new(AuctionState::new())),
            shutdown,
        })
    }

    /// The address the listener actually bound, for callers that asked for
    /// an ephemeral port.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            trigger: self.shutdown.clone(),
        }
    }

    /// Accept loop. Runs until a shutdown is requested, then closes every
    /// tracked connection (forcing each handler to observe termination) and
    /// returns, dropping the listening socket.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut shutdown_rx = self.shutdown.subscribe();
        let mut next_conn_id: u32 = 1;

        info!("Server started successfully");

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((socket, addr)) => {
                            let id = next_conn_id;
                            next_conn_id += 1;
                            self.spawn_connection(id, socket, addr).await;
                        }
                        Err(e) => {
                            // Scoped to the one failed accept; keep serving.
                            error!("Accept failed: {}", e);
                            continue;
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown requested, closing all connections");
                    let mut state = self.state.lock().await;
                    state.registry.close_all();
                    state.rooms.clear();
                    break;
                }
            }
        }

        Ok(())
    }

    /// Registers the accepted socket and spawns its writer and handler tasks.
    /// The handler outlives this call; the supervisor never joins it.
    async fn spawn_connection(&self, id: u32, socket: TcpStream, addr: SocketAddr) {
        let (read_half, write_half) = socket.into_split();
        let (handle, outbound) = ConnectionHandle::new(id, addr);

        {
            let mut state = self.state.lock().await;
            state.registry.register(handle.clone());
        }

        tokio::spawn(write_loop(id, write_half, outbound));
        tokio::spawn(handle_connection(
            read_half,
            Arc::clone(&self.state),
            Session::new(handle),
        ));
    }
}

/// Drains one connection's outbound queue onto its socket, framing each
/// queued line with a trailing newline. Ends when the queue closes (every
/// handle clone dropped) or a write fails; dropping the write half then
/// finishes closing the socket.
async fn write_loop(
    id: u32,
    mut write_half: OwnedWriteHalf,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    while let Some(line) = outbound.recv().await {
        let framed = format!("{}\n", line);
        if let Err(e) = write_half.write_all(framed.as_bytes()).await {
            debug!("Write to client {} failed: {}", id, e);
            break;
        }
    }
}

/// Per-connection read loop and teardown.
///
/// A zero-byte read, a read error and the server-side close signal all end
/// the loop the same way: as a normal disconnect. Exactly one teardown path
/// runs per connection, whether or not it ever joined a room.
async fn handle_connection(
    read_half: OwnedReadHalf,
    state: Arc<Mutex<AuctionState>>,
    mut session: Session,
) {
    let id = session.handle.id();
    let close_signal = session.handle.clone();

    if !session.handle.send(shared::WELCOME_BANNER) {
        warn!("Failed to send welcome to client {}", id);
    }

    let mut lines = BufReader::new(read_half).lines();

    loop {
        tokio::select! {
            _ = close_signal.closed() => {
                debug!("Client {} closed by server", id);
                break;
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        debug!("Received from client {}: {}", id, line.trim_end());
                        let verdict = {
                            let mut state = state.lock().await;
                            route_message(&mut state, &mut session, &line)
                        };
                        if verdict == Verdict::Disconnect {
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("Client {} disconnected", id);
                        break;
                    }
                    Err(e) => {
                        warn!("Read from client {} failed: {}", id, e);
                        break;
                    }
                }
            }
        }
    }

    let mut state = state.lock().await;
    if session.is_monitor {
        if state.registry.clear_monitor_if(id) {
            info!("Monitor client {} disconnected", id);
        }
    } else {
        // Departure via disconnect is silent; only an explicit LEAVE
        // broadcasts a notice, and that path already emptied both entries.
        state.rooms.remove_connection(id);
        state.registry.unregister(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_server_binds_ephemeral_port() {
        let server = assert_ok!(Server::new("127.0.0.1:0").await);
        let addr = assert_ok!(server.local_addr());
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_handle_is_idempotent() {
        let server = assert_ok!(Server::new("127.0.0.1:0").await);
        let handle = server.shutdown_handle();
        handle.shutdown();
        handle.shutdown();
        drop(server);
        // Firing after the server is gone must not panic either.
        handle.shutdown();
    }

    #[tokio::test]
    async fn test_welcome_banner_and_shutdown_close() {
        let mut server = assert_ok!(Server::new("127.0.0.1:0").await);
        let addr = assert_ok!(server.local_addr());
        let shutdown = server.shutdown_handle();
        let server_task = tokio::spawn(async move { server.run().await.is_ok() });

        let stream = assert_ok!(TcpStream::connect(addr).await);
        let mut reader = BufReader::new(stream).lines();

        let banner = assert_ok!(reader.next_line().await);
        assert_eq!(banner.as_deref(), Some(shared::WELCOME_BANNER));

        shutdown.shutdown();

        // The server closes the connection; the read sees end of stream.
        let eof = assert_ok!(reader.next_line().await);
        assert_eq!(eof, None);

        assert!(assert_ok!(server_task.await));
    }
}
