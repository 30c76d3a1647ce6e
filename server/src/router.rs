//! Protocol dispatch for the auction server
//!
//! Each accepted connection is a small state machine: unregistered by
//! default, optionally promoted to monitor (terminal for the connection's
//! lifetime), with the unregistered state subdivided into not-joined and
//! joined-to-room depending on whether a join message has arrived.
//!
//! [`route_message`] maps one parsed client line onto registry and room
//! mutations plus the broadcasts they imply. It runs while the caller holds
//! the single server-wide lock, so every mutation-plus-broadcast pair is
//! observed atomically relative to concurrent joins, leaves and disconnects.

use log::{info, warn};
use shared::{parse_message, ClientMessage};

use crate::registry::{ConnectionHandle, ConnectionRegistry};
use crate::rooms::{Bidder, RoomDirectory};

/// All shared server state, guarded together by one lock.
///
/// Operations like "join room and notify the monitor" touch both structures
/// and must be atomic relative to each other, so the registry and the room
/// directory share a synchronization domain instead of carrying their own.
pub struct AuctionState {
    pub registry: ConnectionRegistry,
    pub rooms: RoomDirectory,
}

impl AuctionState {
    pub fn new() -> Self {
        AuctionState {
            registry: ConnectionRegistry::new(),
            rooms: RoomDirectory::new(),
        }
    }
}

impl Default for AuctionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-connection protocol state, owned by the connection's handler.
pub struct Session {
    pub handle: ConnectionHandle,
    pub name: String,
    pub auction_code: String,
    pub is_monitor: bool,
}

impl Session {
    pub fn new(handle: ConnectionHandle) -> Self {
        Session {
            handle,
            name: String::new(),
            auction_code: String::new(),
            is_monitor: false,
        }
    }

    pub fn is_joined(&self) -> bool {
        !self.auction_code.is_empty()
    }
}

/// What the connection handler should do after one routed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Disconnect,
}

/// Routes one raw client line.
///
/// Protocol errors are answered directly to the sender and never broadcast;
/// they do not close the connection. The only disconnect verdict comes from
/// an explicit leave.
pub fn route_message(state: &mut AuctionState, session: &mut Session, line: &str) -> Verdict {
    // A monitor never re-enters client behavior; everything it sends after
    // promotion is dropped, repeated MONITOR_CLIENT included.
    if session.is_monitor {
        return Verdict::Continue;
    }

    let message = match parse_message(line) {
        Ok(message) => message,
        Err(error) => {
            info!(
                "Client {} sent an unusable line: {}",
                session.handle.id(),
                error
            );
            if !session.handle.send(error.reply()) {
                warn!("Failed to reply to client {}", session.handle.id());
            }
            return Verdict::Continue;
        }
    };

    match message {
        ClientMessage::Monitor => {
            session.is_monitor = true;
            // A joined client that becomes the monitor gives up its room
            // membership; the monitor is strictly a read-only mirror.
            state.rooms.remove_connection(session.handle.id());
            state.registry.set_monitor(session.handle.clone());
            if !session.handle.send(shared::MONITOR_ACK) {
                warn!("Failed to reply to client {}", session.handle.id());
            }
            Verdict::Continue
        }

        ClientMessage::Leave => {
            // The leaver is still a member while the notice goes out, so it
            // receives its own departure line; delivery is best-effort.
            let notice = shared::leave_notice(&session.name);
            state.rooms.broadcast(&session.auction_code, &notice);
            state.rooms.remove_connection(session.handle.id());
            state.registry.unregister(session.handle.id());
            Verdict::Disconnect
        }

        ClientMessage::Join { name, auction_code } => {
            if session.is_joined() {
                // A participant is in exactly one room; a re-join moves it.
                state.rooms.remove_connection(session.handle.id());
            }
            session.name = name;
            session.auction_code = auction_code;

            state.rooms.join(
                &session.auction_code,
                Bidder {
                    name: session.name.clone(),
                    conn: session.handle.clone(),
                },
            );

            let notice = shared::join_notice(&session.name, &session.auction_code);
            state.rooms.broadcast(&session.auction_code, &notice);
            state.registry.send_to_monitor(&notice);
            Verdict::Continue
        }

        ClientMessage::Bid {
            name,
            auction_code,
            amount,
        } => {
            // Every syntactically valid bid is announced unconditionally;
            // there is no comparison against a previous high bid. The room
            // is taken from the message fields, as is the bidder name.
            info!("{} placed {} on {}", name, amount, auction_code);
            let notice = shared::bid_notice(amount, &name, &auction_code);
            state.rooms.broadcast(&auction_code, &notice);
            state.registry.send_to_monitor(&notice);
            Verdict::Continue
        }
    }
}
