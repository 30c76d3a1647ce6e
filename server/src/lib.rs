//! # Auction Server Library
//!
//! This library provides the server side of the live auction system. It
//! accepts an unbounded number of concurrent TCP clients, tracks which
//! auction room each participant has joined, and fans out join, bid and
//! departure notices to the right subset of connections, with an optional
//! monitor connection mirroring all room activity server-wide.
//!
//! ## Core Responsibilities
//!
//! ### Connection Management
//! Handles the complete lifecycle of client connections:
//! - Accept and registration in the shared connection registry
//! - One detached handler task per connection with a single teardown path
//! - Forced termination of every handler on shutdown
//!
//! ### Room Membership
//! Auction rooms are created implicitly on first join and deleted when the
//! last member departs. Membership changes and the broadcasts they trigger
//! are observed atomically under one server-wide lock.
//!
//! ### Broadcast Fanout
//! Notices are delivered best-effort to a target set: one room, the general
//! client list, or the single monitor. A failed send never aborts delivery
//! to the remaining recipients.
//!
//! ## Architecture Design
//!
//! ### Task-Per-Connection
//! Each accepted socket gets a reader/handler task and a writer task. All
//! blocking I/O blocks only its own task; shared state is touched only
//! inside the single lock, and outbound lines are queued per connection so
//! a slow peer cannot stall a broadcast.
//!
//! ### Single Synchronization Domain
//! The connection registry and the room directory form one mutual-exclusion
//! domain. Operations that span both, like "join room and notify the
//! monitor", hold the lock across the mutation and the fanout, so two bids
//! in the same room are never reordered relative to each other.
//!
//! ## Module Organization
//!
//! ### Registry Module (`registry`)
//! Connection handles and the live-connection set:
//! - Outbound queue and close signal per connection
//! - Registration, idempotent removal, broadcast with sender exclusion
//! - The monitor slot with its eviction policy
//!
//! ### Rooms Module (`rooms`)
//! Auction room membership:
//! - Insertion-ordered member lists keyed by auction code
//! - Implicit room creation and empty-room garbage collection
//! - Room-scoped broadcast
//!
//! ### Router Module (`router`)
//! The protocol state machine:
//! - Per-connection session state (name, room, monitor flag)
//! - Dispatch of parsed client lines to registry and room operations
//! - Direct error replies for malformed input
//!
//! ### Network Module (`network`)
//! The TCP transport:
//! - Accept loop and per-connection task spawning
//! - Line-framed reads and writes
//! - Shutdown handle that closes every tracked connection
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Bind the listening socket on the configured address
//!     let mut server = Server::new("127.0.0.1:8000").await?;
//!
//!     // Obtain a handle first if something needs to stop the server later
//!     let shutdown = server.shutdown_handle();
//!
//!     // Run the accept loop; returns once shutdown() has been called and
//!     // every tracked connection has been closed
//!     server.run().await?;
//!
//!     drop(shutdown);
//!     Ok(())
//! }
//! ```

pub mod network;
pub mod registry;
pub mod rooms;
pub mod router;
