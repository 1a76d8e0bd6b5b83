//! Method negotiation
//!
//! Only "no authentication required" is ever offered, so the method list
//! is read to keep the framing intact and otherwise ignored.

use super::consts::*;
use super::frame::{ParseState, Transition};
use crate::error::Socks5Error;
use tracing::trace;

/// Method selection message sent to every client
pub const NO_AUTH_SELECTED: [u8; 2] = [SOCKS5_VERSION, SOCKS5_AUTH_METHOD_NONE];

/// Handle `[VER, NMETHODS]`
pub fn parse_greeting(frame: &[u8]) -> Result<Transition, Socks5Error> {
    let version = frame[0];
    if version != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(version));
    }

    let num_methods = frame[1] as usize;
    Ok(Transition::next(ParseState::HandshakeMethods(num_methods)))
}

/// Handle the method list and answer with no-auth
pub fn select_method(methods: &[u8]) -> Transition {
    trace!("Client offered methods: {:?}", methods);
    Transition::Continue {
        next: ParseState::RequestStart,
        reply: Some(&NO_AUTH_SELECTED),
    }
}
