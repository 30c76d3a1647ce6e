use thiserror::Error;

pub const DELIMITER: char = '|';
pub const MONITOR_COMMAND: &str = "MONITOR_CLIENT";
pub const LEAVE_COMMAND: &str = "LEAVE";
pub const JOIN_KEYWORD: &str = "JOIN";
pub const DEFAULT_PORT: u16 = 8000;

pub const WELCOME_BANNER: &str = "Welcome to the Auction Server!";
pub const MONITOR_ACK: &str = "Monitor mode activated. You will receive all auction updates.";
pub const INVALID_BID_REPLY: &str = "Invalid bid input.";
pub const UNRECOGNIZED_REPLY: &str = "Unrecognized message format.";

/// One parsed line of client input.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Monitor,
    Leave,
    Join {
        name: String,
        auction_code: String,
    },
    Bid {
        name: String,
        auction_code: String,
        amount: f64,
    },
}

/// Why a client line could not be parsed. Each variant maps to exactly one
/// reply line sent back to the offending sender and nobody else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("bid value is not a number")]
    InvalidBid,
    #[error("unrecognized message format")]
    UnrecognizedFormat,
}

impl ParseError {
    pub fn reply(&self) -> &'static str {
        match self {
            ParseError::InvalidBid => INVALID_BID_REPLY,
            ParseError::UnrecognizedFormat => UNRECOGNIZED_REPLY,
        }
    }
}

/// Parses one wire line into a [`ClientMessage`].
///
/// Trailing carriage-return and line-feed characters are stripped before
/// matching. The two command literals are checked before field splitting, so
/// a name or auction code may contain anything except the delimiter.
pub fn parse_message(line: &str) -> Result<ClientMessage, ParseError> {
    let msg = line.trim_end_matches(['\r', '\n']);

    if msg == MONITOR_COMMAND {
        return Ok(ClientMessage::Monitor);
    }
    if msg == LEAVE_COMMAND {
        return Ok(ClientMessage::Leave);
    }

    let parts: Vec<&str> = msg.split(DELIMITER).collect();
    if parts.len() != 3 {
        return Err(ParseError::UnrecognizedFormat);
    }

    if parts[2] == JOIN_KEYWORD {
        return Ok(ClientMessage::Join {
            name: parts[0].to_string(),
            auction_code: parts[1].to_string(),
        });
    }

    match parts[2].trim().parse::<f64>() {
        Ok(amount) => Ok(ClientMessage::Bid {
            name: parts[0].to_string(),
            auction_code: parts[1].to_string(),
            amount,
        }),
        Err(_) => Err(ParseError::InvalidBid),
    }
}

// Server -> client notice lines. The transport appends the newline.

pub fn join_notice(name: &str, auction_code: &str) -> String {
    format!("[JOIN] {} joined {}", name, auction_code)
}

pub fn bid_notice(amount: f64, name: &str, auction_code: &str) -> String {
    format!("NEW HIGH BID! {} by {} in {}", amount, name, auction_code)
}

pub fn leave_notice(name: &str) -> String {
    format!("{} left the auction.", name)
}

// Client -> server line composition.

pub fn join_line(name: &str, auction_code: &str) -> String {
    format!(
        "{}{}{}{}{}",
        name, DELIMITER, auction_code, DELIMITER, JOIN_KEYWORD
    )
}

pub fn bid_line(name: &str, auction_code: &str, amount: &str) -> String {
    format!("{}{}{}{}{}", name, DELIMITER, auction_code, DELIMITER, amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_parse_monitor_command() {
        assert_eq!(parse_message("MONITOR_CLIENT"), Ok(ClientMessage::Monitor));
        assert_eq!(
            parse_message("MONITOR_CLIENT\r\n"),
            Ok(ClientMessage::Monitor)
        );
    }

    #[test]
    fn test_parse_leave_command() {
        assert_eq!(parse_message("LEAVE"), Ok(ClientMessage::Leave));
        assert_eq!(parse_message("LEAVE\n"), Ok(ClientMessage::Leave));
    }

    #[test]
    fn test_parse_join() {
        let parsed = parse_message("Alice|R1|JOIN").unwrap();
        assert_eq!(
            parsed,
            ClientMessage::Join {
                name: "Alice".to_string(),
                auction_code: "R1".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_join_allows_empty_fields() {
        // Field values are not validated, only the shape is.
        let parsed = parse_message("||JOIN").unwrap();
        assert_eq!(
            parsed,
            ClientMessage::Join {
                name: String::new(),
                auction_code: String::new(),
            }
        );
    }

    #[test]
    fn test_parse_bid() {
        match parse_message("Alice|R1|42.5").unwrap() {
            ClientMessage::Bid {
                name,
                auction_code,
                amount,
            } => {
                assert_eq!(name, "Alice");
                assert_eq!(auction_code, "R1");
                assert_approx_eq!(amount, 42.5, 1e-9);
            }
            other => panic!("Expected bid, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_bid_negative_and_integral() {
        match parse_message("Bob|R2|-3").unwrap() {
            ClientMessage::Bid { amount, .. } => assert_approx_eq!(amount, -3.0, 1e-9),
            other => panic!("Expected bid, got {:?}", other),
        }
        match parse_message("Bob|R2| 100 ").unwrap() {
            ClientMessage::Bid { amount, .. } => assert_approx_eq!(amount, 100.0, 1e-9),
            other => panic!("Expected bid, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_bid_not_a_number() {
        assert_eq!(parse_message("Alice|R1|notanumber"), Err(ParseError::InvalidBid));
        assert_eq!(parse_message("Alice|R1|"), Err(ParseError::InvalidBid));
        assert_eq!(parse_message("Alice|R1|42abc"), Err(ParseError::InvalidBid));
    }

    #[test]
    fn test_parse_unrecognized_shapes() {
        assert_eq!(parse_message(""), Err(ParseError::UnrecognizedFormat));
        assert_eq!(parse_message("hello"), Err(ParseError::UnrecognizedFormat));
        assert_eq!(parse_message("a|b"), Err(ParseError::UnrecognizedFormat));
        assert_eq!(
            parse_message("a|b|JOIN|extra"),
            Err(ParseError::UnrecognizedFormat)
        );
    }

    #[test]
    fn test_parse_error_replies() {
        assert_eq!(ParseError::InvalidBid.reply(), INVALID_BID_REPLY);
        assert_eq!(ParseError::UnrecognizedFormat.reply(), UNRECOGNIZED_REPLY);
    }

    #[test]
    fn test_notice_formatting() {
        assert_eq!(join_notice("Alice", "R1"), "[JOIN] Alice joined R1");
        assert_eq!(
            bid_notice(42.5, "Alice", "R1"),
            "NEW HIGH BID! 42.5 by Alice in R1"
        );
        assert_eq!(leave_notice("Alice"), "Alice left the auction.");
    }

    #[test]
    fn test_composed_lines_parse_back() {
        assert_eq!(
            parse_message(&join_line("Alice", "R1")).unwrap(),
            ClientMessage::Join {
                name: "Alice".to_string(),
                auction_code: "R1".to_string(),
            }
        );
        match parse_message(&bid_line("Alice", "R1", "7.25")).unwrap() {
            ClientMessage::Bid { amount, .. } => assert_approx_eq!(amount, 7.25, 1e-9),
            other => panic!("Expected bid, got {:?}", other),
        }
    }
}
