//! STOMP 1.2 frame codec.
//!
//! One WebSocket text message carries one or more NUL-terminated frames.
//! Bare newlines between frames are heart-beats and are skipped.
//! Header values are escaped per STOMP 1.2 (`\\`, `\n`, `\r`, `\c`), except
//! on CONNECT/CONNECTED frames which are sent unescaped.

use std::fmt;

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
    Connected,
    Subscribe,
    Unsubscribe,
    Disconnect,
    Send,
    Message,
    Receipt,
    Error,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Connected => "CONNECTED",
            Command::Subscribe => "SUBSCRIBE",
            Command::Unsubscribe => "UNSUBSCRIBE",
            Command::Disconnect => "DISCONNECT",
            Command::Send => "SEND",
            Command::Message => "MESSAGE",
            Command::Receipt => "RECEIPT",
            Command::Error => "ERROR",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "CONNECT" | "STOMP" => Command::Connect,
            "CONNECTED" => Command::Connected,
            "SUBSCRIBE" => Command::Subscribe,
            "UNSUBSCRIBE" => Command::Unsubscribe,
            "DISCONNECT" => Command::Disconnect,
            "SEND" => Command::Send,
            "MESSAGE" => Command::Message,
            "RECEIPT" => Command::Receipt,
            "ERROR" => Command::Error,
            _ => return None,
        })
    }

    fn escapes_headers(self) -> bool {
        !matches!(self, Command::Connect | Command::Connected)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of a header; repeated headers keep the first occurrence.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn connect(host: &str) -> Self {
        Frame::new(Command::Connect)
            .header("accept-version", "1.2,1.1")
            .header("host", host)
            .header("heart-beat", "0,0")
    }

    pub fn subscribe(id: &str, destination: &str) -> Self {
        Frame::new(Command::Subscribe)
            .header("id", id)
            .header("destination", destination)
            .header("ack", "auto")
    }

    pub fn unsubscribe(id: &str) -> Self {
        Frame::new(Command::Unsubscribe).header("id", id)
    }

    pub fn disconnect() -> Self {
        Frame::new(Command::Disconnect)
    }

    pub fn encode(&self) -> String {
        let escape = self.command.escapes_headers();
        let mut out = String::with_capacity(64 + self.body.len());
        out.push_str(self.command.as_str());
        out.push('\n');
        for (k, v) in &self.headers {
            if escape {
                out.push_str(&escape_header(k));
                out.push(':');
                out.push_str(&escape_header(v));
            } else {
                out.push_str(k);
                out.push(':');
                out.push_str(v);
            }
            out.push('\n');
        }
        if !self.body.is_empty() && self.get("content-length").is_none() {
            out.push_str(&format!("content-length:{}\n", self.body.len()));
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Decode every frame in one transport message. Heart-beats yield nothing.
    pub fn decode_all(text: &str) -> Result<Vec<Frame>> {
        let mut frames = Vec::new();
        let mut rest = text;
        loop {
            rest = rest.trim_start_matches(['\n', '\r']);
            if rest.is_empty() {
                break;
            }
            let (frame, remaining) = Frame::decode_one(rest)?;
            frames.push(frame);
            rest = remaining;
        }
        Ok(frames)
    }

    fn decode_one(text: &str) -> Result<(Frame, &str)> {
        let (head, after_head) = text
            .split_once("\n\n")
            .or_else(|| text.split_once("\r\n\r\n"))
            .ok_or_else(|| ClientError::Protocol("frame has no header terminator".to_string()))?;

        let mut lines = head.lines();
        let command_line = lines.next().unwrap_or("").trim_end_matches('\r');
        let command = Command::parse(command_line)
            .ok_or_else(|| ClientError::Protocol(format!("unknown STOMP command: {:?}", command_line)))?;

        let mut headers = Vec::new();
        for line in lines {
            let line = line.trim_end_matches('\r');
            let (k, v) = line
                .split_once(':')
                .ok_or_else(|| ClientError::Protocol(format!("malformed header line: {:?}", line)))?;
            if command.escapes_headers() {
                headers.push((unescape_header(k)?, unescape_header(v)?));
            } else {
                headers.push((k.to_string(), v.to_string()));
            }
        }

        let content_length = headers
            .iter()
            .find(|(k, _)| k == "content-length")
            .and_then(|(_, v)| v.trim().parse::<usize>().ok());

        let (body, remaining) = match content_length {
            Some(len) if after_head.len() > len && after_head.is_char_boundary(len) => {
                let (body, tail) = after_head.split_at(len);
                (body, tail.strip_prefix('\0').unwrap_or(tail))
            }
            _ => match after_head.split_once('\0') {
                Some((body, tail)) => (body, tail),
                None => (after_head, ""),
            },
        };

        Ok((
            Frame {
                command,
                headers,
                body: body.to_string(),
            },
            remaining,
        ))
    }
}

fn escape_header(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_header(value: &str) -> Result<String> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            other => {
                return Err(ClientError::Protocol(format!(
                    "invalid header escape: \\{}",
                    other.map(String::from).unwrap_or_default()
                )));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_subscribe() {
        let encoded = Frame::subscribe("sub-0", "/topic/progress/abc").encode();
        assert_eq!(
            encoded,
            "SUBSCRIBE\nid:sub-0\ndestination:/topic/progress/abc\nack:auto\n\n\0"
        );
    }

    #[test]
    fn test_decode_spring_message() {
        let text = "MESSAGE\ndestination:/topic/progress/abc\ncontent-type:application/json\nsubscription:sub-0\nmessage-id:1-0\n\n{\"message\":\"Scanning\",\"status\":\"running\"}\0";
        let frames = Frame::decode_all(text).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].command, Command::Message);
        assert_eq!(frames[0].get("subscription"), Some("sub-0"));
        assert_eq!(frames[0].body, r#"{"message":"Scanning","status":"running"}"#);
    }

    #[test]
    fn test_decode_exact_body() {
        let body = r#"{"percentage":50}"#;
        let text = format!(
            "MESSAGE\nsubscription:sub-1\ncontent-length:{}\n\n{}\0",
            body.len(),
            body
        );
        let frames = Frame::decode_all(&text).unwrap();
        assert_eq!(frames[0].body, body);
    }

    #[test]
    fn test_heartbeats_are_skipped() {
        assert!(Frame::decode_all("\n").unwrap().is_empty());
        let frames = Frame::decode_all("\nCONNECTED\nversion:1.2\n\n\0\n").unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].get("version"), Some("1.2"));
    }

    #[test]
    fn test_two_frames_in_one_message() {
        let text = "RECEIPT\nreceipt-id:1\n\n\0ERROR\nmessage:boom\n\nbad things\0";
        let frames = Frame::decode_all(text).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].command, Command::Error);
        assert_eq!(frames[1].body, "bad things");
    }

    #[test]
    fn test_header_escaping() {
        let frame = Frame::new(Command::Send).header("note", "a:b\nc");
        let decoded = Frame::decode_all(&frame.encode()).unwrap();
        assert_eq!(decoded[0].get("note"), Some("a:b\nc"));
    }

    #[test]
    fn test_connect_headers_not_escaped() {
        let encoded = Frame::connect("localhost:8080").encode();
        assert!(encoded.contains("host:localhost:8080\n"));
    }

    #[test]
    fn test_garbage_is_a_protocol_error() {
        assert!(Frame::decode_all("HELLO\n\n\0").is_err());
        assert!(Frame::decode_all("MESSAGE no terminator").is_err());
    }
}
