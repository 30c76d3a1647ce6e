//! Performance benchmarks for critical server paths

use server::registry::{ConnectionHandle, ConnectionRegistry};
use server::rooms::{Bidder, RoomDirectory};
use shared::{bid_notice, parse_message, ClientMessage};
use std::net::SocketAddr;
use std::time::Instant;

fn test_addr() -> SocketAddr {
    "127.0.0.1:8080".parse().unwrap()
}

/// Benchmarks wire-line parsing throughput
#[test]
fn benchmark_message_parsing() {
    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        let line = format!("Alice|R1|{}.5", i);
        match parse_message(&line) {
            Ok(ClientMessage::Bid { .. }) => {}
            other => panic!("Unexpected parse result: {:?}", other),
        }
    }

    let duration = start.elapsed();
    println!(
        "Message parsing: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in well under a second for 100k lines
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks broadcast fanout across a wide room
#[test]
fn benchmark_room_broadcast_fanout() {
    let members = 100;
    let mut rooms = RoomDirectory::new();
    let mut receivers = Vec::new();

    for id in 0..members {
        let (conn, receiver) = ConnectionHandle::new(id, test_addr());
        rooms.join(
            "R1",
            Bidder {
                name: format!("bidder-{}", id),
                conn,
            },
        );
        receivers.push(receiver);
    }

    let iterations = 1_000;
    let start = Instant::now();

    for i in 0..iterations {
        rooms.broadcast("R1", &bid_notice(i as f64, "bidder-0", "R1"));
    }

    let duration = start.elapsed();
    println!(
        "Room fanout: {} members × {} broadcasts in {:?} ({:.2} μs/broadcast)",
        members,
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Every member received every broadcast
    for receiver in &mut receivers {
        let mut count = 0;
        while receiver.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, iterations);
    }

    // Should complete in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks join/leave churn with room garbage collection
#[test]
fn benchmark_membership_churn() {
    let mut rooms = RoomDirectory::new();
    let iterations = 10_000;
    let start = Instant::now();

    for id in 0..iterations {
        let (conn, _receiver) = ConnectionHandle::new(id, test_addr());
        rooms.join(
            "churn",
            Bidder {
                name: format!("bidder-{}", id),
                conn,
            },
        );
        rooms.remove_connection(id);
    }

    let duration = start.elapsed();
    println!(
        "Membership churn: {} join/leave cycles in {:?} ({:.2} μs/cycle)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Every cycle emptied the room, so it must have been collected
    assert!(rooms.is_empty());
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks the general broadcast primitive with an excluded sender
#[test]
fn benchmark_broadcast_all() {
    let clients = 100;
    let mut registry = ConnectionRegistry::new();
    let mut receivers = Vec::new();

    for id in 0..clients {
        let (handle, receiver) = ConnectionHandle::new(id, test_addr());
        registry.register(handle);
        receivers.push(receiver);
    }

    let iterations = 1_000;
    let start = Instant::now();

    for _ in 0..iterations {
        registry.broadcast_all("server notice", Some(0));
    }

    let duration = start.elapsed();
    println!(
        "General broadcast: {} clients × {} rounds in {:?} ({:.2} μs/round)",
        clients,
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // The excluded connection saw nothing; everyone else saw every round
    let mut excluded = 0;
    while receivers[0].try_recv().is_ok() {
        excluded += 1;
    }
    assert_eq!(excluded, 0);

    for receiver in &mut receivers[1..] {
        let mut count = 0;
        while receiver.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, iterations);
    }

    assert!(duration.as_millis() < 5000);
}
