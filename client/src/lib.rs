//! # Auction Client Library
//!
//! This library provides the client side of the live auction system: a
//! terminal program that connects to the auction server, prints every line
//! the server broadcasts, and turns user input into protocol messages.
//!
//! ## Modes
//!
//! ### Bidder
//! Joins one auction room under a display name, then reads stdin in a loop:
//! anything typed is sent as a bid (the server validates it), `leave` sends
//! the explicit departure message, and `quit` drops the connection without
//! one. The two exits are deliberately different: the server broadcasts a
//! departure notice only for `leave`.
//!
//! ### Monitor
//! Registers as the server's single monitor connection and prints the
//! mirrored feed of all room activity until the server closes the
//! connection, either because another monitor replaced this one or because
//! the server shut down.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! Connection setup, the receive task that prints the feed, and the stdin
//! command loop.

pub mod network;
