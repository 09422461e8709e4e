use serde::{Deserialize, Serialize};

use crate::error::MidiError;

/// MIDI channel, 0-15.
pub type Channel = u8;

/// Family of a channel voice message, selected by the top nibble of the status byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    NoteOff,
    NoteOn,
    PolyAftertouch,
    ControllerChange,
    ProgramChange,
    ChannelAftertouch,
    PitchWheel,
}

impl MessageType {
    /// Map the top nibble of a status byte to its family.
    pub const fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble {
            0x8 => Some(MessageType::NoteOff),
            0x9 => Some(MessageType::NoteOn),
            0xA => Some(MessageType::PolyAftertouch),
            0xB => Some(MessageType::ControllerChange),
            0xC => Some(MessageType::ProgramChange),
            0xD => Some(MessageType::ChannelAftertouch),
            0xE => Some(MessageType::PitchWheel),
            _ => None,
        }
    }

    /// Top nibble used when encoding this family.
    pub const fn nibble(self) -> u8 {
        match self {
            MessageType::NoteOff => 0x8,
            MessageType::NoteOn => 0x9,
            MessageType::PolyAftertouch => 0xA,
            MessageType::ControllerChange => 0xB,
            MessageType::ProgramChange => 0xC,
            MessageType::ChannelAftertouch => 0xD,
            MessageType::PitchWheel => 0xE,
        }
    }

    /// Number of data bytes following the status byte.
    pub const fn data_len(self) -> usize {
        match self {
            MessageType::ProgramChange | MessageType::ChannelAftertouch => 1,
            _ => 2,
        }
    }
}

/// Split a status byte into its message family and channel.
pub fn decode(byte: u8) -> Result<(MessageType, Channel), MidiError> {
    if byte & 0x80 == 0 {
        return Err(MidiError::InvalidStatus(byte));
    }
    let kind = MessageType::from_nibble(byte >> 4).ok_or(MidiError::InvalidStatus(byte))?;
    Ok((kind, byte & 0x0F))
}

/// Build a status byte from a family and channel. Channels above 15 wrap.
pub const fn status_byte(kind: MessageType, channel: Channel) -> u8 {
    (kind.nibble() << 4) | (channel & 0x0F)
}
