//! SOCKS5 module for Socksrelay
//!
//! This module implements the SOCKS5 protocol (RFC 1928, no-auth, CONNECT)
//! plus the Tor RESOLVE extension. Parsing is a length-driven state machine
//! ([`FrameReader`]); once a CONNECT succeeds the session becomes a plain
//! byte relay.

mod connect;
mod consts;
mod frame;
mod handshake;
mod relay;
mod reply;
mod request;
mod resolve;
mod session;
mod types;

pub use connect::{connect_target, send_connect_result};
pub use consts::*;
pub use frame::{Event, FrameReader, Outcome, ParseState, Transition};
pub use handshake::NO_AUTH_SELECTED;
pub use relay::relay_tcp;
pub use reply::{resolved_reply, send_reply, Reply};
pub use resolve::{lookup, Resolver, SystemResolver};
pub use session::{handle_socks5_session, SessionContext};
pub use types::{Request, SocksCommand};
