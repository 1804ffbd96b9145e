//! Telnet option filtering for console streams.
//!
//! Emulator console listeners speak telnet. The console layer does not need
//! any option, so every `DO` is answered with `WONT` and every `WILL` with
//! `DONT`, subnegotiations are skipped, and only device text is passed on.
//! Sequences may be split across reads; the filter keeps its state between
//! calls.

use bytes::{BufMut, BytesMut};
use memchr::memchr;

pub const IAC: u8 = 255;
pub const DONT: u8 = 254;
pub const DO: u8 = 253;
pub const WONT: u8 = 252;
pub const WILL: u8 = 251;
pub const SB: u8 = 250;
pub const SE: u8 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Data,
    Iac,
    Negotiate(u8),
    Sub,
    SubIac,
}

/// Output of one filtering step.
#[derive(Debug, Default)]
pub struct Filtered {
    /// Device text with telnet commands removed.
    pub data: BytesMut,

    /// Negotiation replies to write back to the peer.
    pub replies: BytesMut,
}

/// Incremental telnet command stripper.
#[derive(Debug, Default)]
pub struct TelnetFilter {
    state: State,
}

impl TelnetFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip telnet commands from `input`.
    pub fn filter(&mut self, input: &[u8]) -> Filtered {
        let mut out = Filtered {
            data: BytesMut::with_capacity(input.len()),
            replies: BytesMut::new(),
        };

        let mut rest = input;
        while !rest.is_empty() {
            if self.state == State::Data {
                // Plain text until the next IAC
                match memchr(IAC, rest) {
                    Some(pos) => {
                        out.data.put_slice(&rest[..pos]);
                        self.state = State::Iac;
                        rest = &rest[pos + 1..];
                    }
                    None => {
                        out.data.put_slice(rest);
                        break;
                    }
                }
                continue;
            }

            let byte = rest[0];
            rest = &rest[1..];
            self.state = match (self.state, byte) {
                (State::Iac, IAC) => {
                    out.data.put_u8(IAC);
                    State::Data
                }
                (State::Iac, DO | DONT | WILL | WONT) => State::Negotiate(byte),
                (State::Iac, SB) => State::Sub,
                // NOP, GA and friends carry no payload
                (State::Iac, _) => State::Data,
                (State::Negotiate(verb), option) => {
                    match verb {
                        DO => out.replies.put_slice(&[IAC, WONT, option]),
                        WILL => out.replies.put_slice(&[IAC, DONT, option]),
                        _ => {}
                    }
                    State::Data
                }
                (State::Sub, IAC) => State::SubIac,
                (State::Sub, _) => State::Sub,
                (State::SubIac, SE) => State::Data,
                (State::SubIac, _) => State::Sub,
                (State::Data, _) => unreachable!("data bytes are consumed above"),
            };
        }

        out
    }
}

/// Escape outgoing 0xFF bytes as `IAC IAC`.
pub fn escape(data: &[u8]) -> BytesMut {
    let mut out = BytesMut::with_capacity(data.len());
    let mut rest = data;
    while let Some(pos) = memchr(IAC, rest) {
        out.put_slice(&rest[..=pos]);
        out.put_u8(IAC);
        rest = &rest[pos + 1..];
    }
    out.put_slice(rest);
    out
}
