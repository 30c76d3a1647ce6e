//! Client-side networking: server connection, feed printing and the bid loop

use log::{error, info};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// What to do with one non-empty line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Drop the connection without telling the room (silent disconnect).
    Quit,
    /// Send the explicit departure message, then exit.
    Leave,
    /// Anything else is treated as a bid amount; the server validates it.
    Bid(String),
}

/// Maps a raw stdin line to a client action.
pub fn parse_input(line: &str) -> Command {
    match line.trim() {
        "quit" => Command::Quit,
        "leave" => Command::Leave,
        other => Command::Bid(other.to_string()),
    }
}

/// A connected auction client.
pub struct Client {
    stream: TcpStream,
}

impl Client {
    pub async fn connect(server: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let stream = TcpStream::connect(server).await?;
        info!("Connected to auction server at {}", server);
        Ok(Client { stream })
    }

    /// Joins `auction` as `name` and runs the interactive bid loop until the
    /// user exits or the server closes the connection.
    pub async fn run_bidder(
        self,
        name: &str,
        auction: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (read_half, mut write_half) = self.stream.into_split();
        let mut printer = tokio::spawn(print_feed(read_half));

        send_line(&mut write_half, &shared::join_line(name, auction)).await?;

        let mut input = BufReader::new(tokio::io::stdin()).lines();
        println!("Enter your bid amount ('leave' to leave the auction, 'quit' to exit):");

        loop {
            tokio::select! {
                _ = &mut printer => {
                    // Server side is gone; nothing left to bid on.
                    break;
                }
                line = input.next_line() => {
                    let line = match line? {
                        Some(line) => line,
                        None => break,
                    };
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match parse_input(trimmed) {
                        Command::Quit => break,
                        Command::Leave => {
                            send_line(&mut write_half, shared::LEAVE_COMMAND).await?;
                            break;
                        }
                        Command::Bid(amount) => {
                            send_line(&mut write_half, &shared::bid_line(name, auction, &amount))
                                .await?;
                        }
                    }
                }
            }
        }

        printer.abort();
        Ok(())
    }

    /// Registers as the monitor and prints the mirrored feed until the
    /// server closes the connection.
    pub async fn run_monitor(self) -> Result<(), Box<dyn std::error::Error>> {
        let (read_half, mut write_half) = self.stream.into_split();
        send_line(&mut write_half, shared::MONITOR_COMMAND).await?;
        print_feed(read_half).await;
        Ok(())
    }
}

async fn send_line(write_half: &mut OwnedWriteHalf, line: &str) -> Result<(), std::io::Error> {
    write_half.write_all(format!("{}\n", line).as_bytes()).await
}

/// Prints every server line until the connection ends.
async fn print_feed(read_half: OwnedReadHalf) {
    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => println!("[SERVER] {}", line),
            Ok(None) => {
                info!("Connection closed by server");
                break;
            }
            Err(e) => {
                error!("Receive failed: {}", e);
                break;
            }
        }
    }
}
