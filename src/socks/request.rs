//! SOCKS5 request parser
//!
//! # SOCKS5 Request Format
//!
//! ```text
//! +----+-----+-------+------+----------+----------+
//! |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
//! +----+-----+-------+------+----------+----------+
//! | 1  |  1  | X'00' |  1   | Variable |    2     |
//! +----+-----+-------+------+----------+----------+
//! ```
//!
//! The header is one frame; the address is one (IPv4) or two (domain)
//! further frames.

use super::consts::*;
use super::frame::{Outcome, ParseState, Transition};
use super::reply::Reply;
use super::types::{Request, SocksCommand};
use crate::error::Socks5Error;
use std::net::Ipv4Addr;

fn reject(reason: Socks5Error) -> Transition {
    debug_assert!(!reason.is_protocol_violation());
    Transition::Done(Outcome::Reject {
        reply: Reply::command_not_supported(),
        reason,
    })
}

fn read_port(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

/// Handle `[VER, CMD, RSV, ATYP]`
pub fn parse_header(frame: &[u8]) -> Result<Transition, Socks5Error> {
    let version = frame[0];
    let cmd_byte = frame[1];
    let reserved = frame[2];
    let addr_type = frame[3];

    if version != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(version));
    }
    if reserved != SOCKS5_RESERVED {
        return Err(Socks5Error::InvalidReserved(reserved));
    }

    let command = match SocksCommand::from_byte(cmd_byte) {
        Some(command) => command,
        None => return Ok(reject(Socks5Error::CommandNotSupported(cmd_byte))),
    };

    let transition = match addr_type {
        SOCKS5_ADDR_TYPE_IPV4 => Transition::next(ParseState::RequestIpv4(command)),
        SOCKS5_ADDR_TYPE_DOMAIN => Transition::next(ParseState::RequestDomainLen(command)),
        // IPv6 included
        _ => reject(Socks5Error::AddressTypeNotSupported(addr_type)),
    };
    Ok(transition)
}

/// Handle a 4-byte address plus 2-byte port
pub fn parse_ipv4(command: SocksCommand, frame: &[u8]) -> Transition {
    let ip = Ipv4Addr::new(frame[0], frame[1], frame[2], frame[3]);
    let port = read_port(&frame[4..6]);
    Transition::Done(Outcome::Request(Request::new(
        command,
        ip.to_string(),
        port,
    )))
}

/// Handle the domain length prefix
pub fn parse_domain_len(command: SocksCommand, frame: &[u8]) -> Transition {
    Transition::next(ParseState::RequestDomain(command, frame[0] as usize))
}

/// Handle `L` domain bytes plus 2-byte port
pub fn parse_domain(command: SocksCommand, frame: &[u8]) -> Result<Transition, Socks5Error> {
    let (name, port) = frame.split_at(frame.len() - PORT_LEN);
    let host = std::str::from_utf8(name)
        .map_err(|_| Socks5Error::InvalidDomain(String::from_utf8_lossy(name).into_owned()))?;

    Ok(Transition::Done(Outcome::Request(Request::new(
        command,
        host,
        read_port(port),
    ))))
}
