//! Auction room membership and room-scoped broadcast
//!
//! Rooms are created implicitly on first join to an unknown auction code and
//! deleted immediately when their last member leaves, so an empty room never
//! exists in the directory. Member order is insertion order; it only matters
//! as a stable iteration order for broadcasts.

use log::{info, warn};
use std::collections::HashMap;

use crate::registry::ConnectionHandle;

/// A participant joined to an auction room.
///
/// Two bidders may share a display name; the connection id is the identity
/// used for removal.
#[derive(Debug, Clone)]
pub struct Bidder {
    pub name: String,
    pub conn: ConnectionHandle,
}

/// Maps auction codes to their ordered member lists.
pub struct RoomDirectory {
    rooms: HashMap<String, Vec<Bidder>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        RoomDirectory {
            rooms: HashMap::new(),
        }
    }

    /// Appends `bidder` to the named room, creating the room if absent.
    /// Always succeeds; there is no capacity limit or duplicate-name check.
    pub fn join(&mut self, auction_code: &str, bidder: Bidder) {
        info!("{} joined auction {}", bidder.name, auction_code);
        self.rooms
            .entry(auction_code.to_string())
            .or_default()
            .push(bidder);
    }

    /// Removes the member with the given connection id from whichever room
    /// holds it, deleting the room if it becomes empty. Returns the removed
    /// member; `None` means the connection was not in any room.
    pub fn remove_connection(&mut self, id: u32) -> Option<Bidder> {
        let auction_code = self.rooms.iter().find_map(|(code, members)| {
            members
                .iter()
                .any(|bidder| bidder.conn.id() == id)
                .then(|| code.clone())
        })?;

        let members = self.rooms.get_mut(&auction_code)?;
        let position = members.iter().position(|bidder| bidder.conn.id() == id)?;
        let bidder = members.remove(position);
        info!("{} left auction {}", bidder.name, auction_code);

        if members.is_empty() {
            self.rooms.remove(&auction_code);
            info!("Auction room {} closed (empty)", auction_code);
        }

        Some(bidder)
    }

    /// Sends `line` to every member of the named room, in list order.
    /// An unknown auction code has no members to reach and is a no-op.
    pub fn broadcast(&self, auction_code: &str, line: &str) {
        if let Some(members) = self.rooms.get(auction_code) {
            for bidder in members {
                if !bidder.conn.send(line) {
                    warn!(
                        "Send failed to {} in auction {}",
                        bidder.name, auction_code
                    );
                }
            }
        }
    }

    pub fn contains_room(&self, auction_code: &str) -> bool {
        self.rooms.contains_key(auction_code)
    }

    /// Returns the member count for a room, zero if the room does not exist.
    pub fn room_size(&self, auction_code: &str) -> usize {
        self.rooms.get(auction_code).map_or(0, |members| members.len())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn clear(&mut self) {
        self.rooms.clear();
    }
}

impl Default for RoomDirectory {
    fn default() -> Self {
        Self::new()
    }
}
