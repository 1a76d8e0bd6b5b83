//! Length-driven frame reader
//!
//! Every parser state names the exact number of bytes it needs. The reader
//! buffers inbound data until that many bytes are available, splits off
//! exactly that frame and runs the state's transition, which yields the next
//! state (and its byte count) or a terminal outcome. Bytes beyond the current
//! frame stay buffered for the next state, and whatever is left once parsing
//! is done belongs to the relay.

use super::consts::*;
use super::handshake;
use super::reply::Reply;
use super::request;
use super::types::{Request, SocksCommand};
use crate::error::Socks5Error;
use bytes::BytesMut;
use tracing::trace;

/// Parser states, each carrying what it needs to know about its frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// `[VER, NMETHODS]`
    HandshakeStart,
    /// The advertised method list
    HandshakeMethods(usize),
    /// `[VER, CMD, RSV, ATYP]`
    RequestStart,
    /// IPv4 address and port
    RequestIpv4(SocksCommand),
    /// Domain name length prefix
    RequestDomainLen(SocksCommand),
    /// Domain name of the given length, then port
    RequestDomain(SocksCommand, usize),
}

impl ParseState {
    /// Exact frame size this state consumes
    pub fn bytes_needed(&self) -> usize {
        match self {
            ParseState::HandshakeStart => GREETING_HEADER_LEN,
            ParseState::HandshakeMethods(n) => *n,
            ParseState::RequestStart => REQUEST_HEADER_LEN,
            ParseState::RequestIpv4(_) => IPV4_ADDR_PORT_LEN,
            ParseState::RequestDomainLen(_) => DOMAIN_LEN_PREFIX,
            ParseState::RequestDomain(_, len) => len + PORT_LEN,
        }
    }

    /// Whether the state still belongs to the method negotiation
    pub fn is_handshake(&self) -> bool {
        matches!(
            self,
            ParseState::HandshakeStart | ParseState::HandshakeMethods(_)
        )
    }

    /// Consume a frame of exactly `bytes_needed()` bytes
    pub fn transition(self, frame: &[u8]) -> Result<Transition, Socks5Error> {
        debug_assert_eq!(frame.len(), self.bytes_needed());
        match self {
            ParseState::HandshakeStart => handshake::parse_greeting(frame),
            ParseState::HandshakeMethods(_) => Ok(handshake::select_method(frame)),
            ParseState::RequestStart => request::parse_header(frame),
            ParseState::RequestIpv4(command) => Ok(request::parse_ipv4(command, frame)),
            ParseState::RequestDomainLen(command) => Ok(request::parse_domain_len(command, frame)),
            ParseState::RequestDomain(command, _) => request::parse_domain(command, frame),
        }
    }
}

/// Result of running one state
#[derive(Debug, PartialEq, Eq)]
pub enum Transition {
    /// Move to `next`, writing `reply` to the client first if present
    Continue {
        /// Following state
        next: ParseState,
        /// Bytes to send before reading the next frame
        reply: Option<&'static [u8]>,
    },
    /// Parsing is over for this session
    Done(Outcome),
}

impl Transition {
    /// Continue without writing anything
    pub fn next(next: ParseState) -> Self {
        Transition::Continue { next, reply: None }
    }
}

/// Terminal result of parsing
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A complete request to hand to an operator
    Request(Request),
    /// The request cannot be served; send `reply` and close
    Reject {
        /// Failure reply to send
        reply: Reply,
        /// Why the request was refused
        reason: Socks5Error,
    },
}

/// Something the session has to act on
#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    /// Write these bytes to the client, then keep parsing
    Write(&'static [u8]),
    /// Parsing finished
    Done(Outcome),
}

/// Buffering state machine driver for one session
#[derive(Debug)]
pub struct FrameReader {
    state: Option<ParseState>,
    buf: BytesMut,
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReader {
    /// Start at the greeting
    pub fn new() -> Self {
        FrameReader {
            state: Some(ParseState::HandshakeStart),
            buf: BytesMut::with_capacity(DEFAULT_BUFFER_SIZE),
        }
    }

    /// Current state, `None` once parsing has finished or failed
    pub fn state(&self) -> Option<ParseState> {
        self.state
    }

    /// Buffer to read inbound data into
    pub fn buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Number of buffered, unconsumed bytes
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Append an inbound chunk
    pub fn feed(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Run states for as long as complete frames are buffered
    ///
    /// Returns `Ok(None)` when more input is needed (or parsing is over).
    /// An error leaves the reader finished; the caller must close the
    /// connection without replying.
    pub fn next_event(&mut self) -> Result<Option<Event>, Socks5Error> {
        loop {
            let state = match self.state {
                Some(state) => state,
                None => return Ok(None),
            };

            let needed = state.bytes_needed();
            if self.buf.len() < needed {
                return Ok(None);
            }

            let frame = self.buf.split_to(needed);
            trace!("RECEIVED: {:?} in {:?}", &frame[..], state);

            self.state = None;
            match state.transition(&frame)? {
                Transition::Continue { next, reply } => {
                    self.state = Some(next);
                    if let Some(bytes) = reply {
                        return Ok(Some(Event::Write(bytes)));
                    }
                }
                Transition::Done(outcome) => return Ok(Some(Event::Done(outcome))),
            }
        }
    }

    /// Give up parsing and hand over everything still buffered
    pub fn into_remaining(self) -> BytesMut {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socks::handshake::NO_AUTH_SELECTED;

    fn connect_ipv4(ip: [u8; 4], port: u16) -> Vec<u8> {
        let mut data = vec![
            SOCKS5_VERSION,
            SOCKS5_CMD_TCP_CONNECT,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_IPV4,
        ];
        data.extend_from_slice(&ip);
        data.extend_from_slice(&port.to_be_bytes());
        data
    }

    #[test]
    fn test_bytes_needed() {
        assert_eq!(ParseState::HandshakeStart.bytes_needed(), 2);
        assert_eq!(ParseState::HandshakeMethods(3).bytes_needed(), 3);
        assert_eq!(ParseState::RequestStart.bytes_needed(), 4);
        assert_eq!(
            ParseState::RequestIpv4(SocksCommand::Connect).bytes_needed(),
            6
        );
        assert_eq!(
            ParseState::RequestDomainLen(SocksCommand::Connect).bytes_needed(),
            1
        );
        assert_eq!(
            ParseState::RequestDomain(SocksCommand::Resolve, 11).bytes_needed(),
            13
        );
    }

    #[test]
    fn test_full_exchange_in_one_chunk() {
        let mut reader = FrameReader::new();
        reader.feed(&[SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE]);
        reader.feed(&connect_ipv4([10, 0, 0, 1], 80));

        assert_eq!(
            reader.next_event().unwrap(),
            Some(Event::Write(&NO_AUTH_SELECTED))
        );
        assert_eq!(
            reader.next_event().unwrap(),
            Some(Event::Done(Outcome::Request(Request::new(
                SocksCommand::Connect,
                "10.0.0.1",
                80
            ))))
        );
        assert!(reader.state().is_none());
        assert_eq!(reader.next_event().unwrap(), None);
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut data = vec![SOCKS5_VERSION, 2, 0x00, 0x02];
        data.extend_from_slice(&connect_ipv4([127, 0, 0, 1], 8080));

        let mut reader = FrameReader::new();
        let mut events = Vec::new();
        for byte in data {
            reader.feed(&[byte]);
            while let Some(event) = reader.next_event().unwrap() {
                events.push(event);
            }
        }

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Event::Write(&NO_AUTH_SELECTED));
        assert_eq!(
            events[1],
            Event::Done(Outcome::Request(Request::new(
                SocksCommand::Connect,
                "127.0.0.1",
                8080
            )))
        );
    }

    #[test]
    fn test_partial_frame_waits() {
        let mut reader = FrameReader::new();
        reader.feed(&[SOCKS5_VERSION]);
        assert_eq!(reader.next_event().unwrap(), None);
        assert_eq!(reader.state(), Some(ParseState::HandshakeStart));
        assert_eq!(reader.buffered(), 1);
    }

    #[test]
    fn test_zero_methods_replies_immediately() {
        let mut reader = FrameReader::new();
        reader.feed(&[SOCKS5_VERSION, 0]);
        assert_eq!(
            reader.next_event().unwrap(),
            Some(Event::Write(&NO_AUTH_SELECTED))
        );
        assert_eq!(reader.state(), Some(ParseState::RequestStart));
    }

    #[test]
    fn test_excess_bytes_retained_after_request() {
        let mut reader = FrameReader::new();
        reader.feed(&[SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE]);
        reader.feed(&connect_ipv4([1, 2, 3, 4], 443));
        reader.feed(b"GET / HTTP/1.1\r\n");

        while let Some(event) = reader.next_event().unwrap() {
            if let Event::Done(_) = event {
                break;
            }
        }

        assert!(reader.state().is_none());
        assert_eq!(&reader.into_remaining()[..], b"GET / HTTP/1.1\r\n");
    }

    #[test]
    fn test_bad_version_is_fatal() {
        let mut reader = FrameReader::new();
        reader.feed(&[0x04, 1, 0]);
        assert_eq!(
            reader.next_event(),
            Err(Socks5Error::UnsupportedVersion(4))
        );
        assert!(reader.state().is_none());
        assert_eq!(reader.next_event().unwrap(), None);
    }

    #[test]
    fn test_is_handshake() {
        assert!(ParseState::HandshakeStart.is_handshake());
        assert!(ParseState::HandshakeMethods(1).is_handshake());
        assert!(!ParseState::RequestStart.is_handshake());
    }
}
