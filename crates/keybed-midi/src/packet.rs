use serde::{Deserialize, Serialize};

use crate::MidiTimestamp;

/// Bytes delivered by a transport in one callback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MidiPacket {
    /// Microseconds since the connection was opened.
    pub timestamp: MidiTimestamp,
    pub bytes: Vec<u8>,
}

impl MidiPacket {
    pub fn new(timestamp: MidiTimestamp, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            timestamp,
            bytes: bytes.into(),
        }
    }

    /// Iterate over the individual messages held by this packet.
    pub fn events(&self) -> Events<'_> {
        events(&self.bytes)
    }
}

/// Split a packet into messages.
///
/// Each message starts at a status byte and runs up to the next one. Data
/// bytes with no preceding status are skipped; running status is not
/// reconstructed.
pub fn events(packet: &[u8]) -> Events<'_> {
    Events { rest: packet }
}

/// Iterator returned by [`events`].
#[derive(Debug, Clone)]
pub struct Events<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Events<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.rest.iter().position(|byte| byte & 0x80 != 0)?;
        let tail = &self.rest[start..];
        let end = tail[1..]
            .iter()
            .position(|byte| byte & 0x80 != 0)
            .map_or(tail.len(), |offset| offset + 1);
        let (event, rest) = tail.split_at(end);
        self.rest = rest;
        Some(event)
    }
}
