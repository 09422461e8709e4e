use serde::{Deserialize, Serialize};

use crate::error::MidiError;
use crate::status::{self, Channel, MessageType};

/// Raw channel voice message triplet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MidiMessage {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl MidiMessage {
    /// Creates a message from the given bytes.
    pub const fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self {
            status,
            data1,
            data2,
        }
    }

    /// Parse the leading message of `bytes`.
    ///
    /// The slice must hold at least as many data bytes as the family needs.
    /// One-byte families always get `data2 = 0`; bytes past the family length
    /// are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MidiError> {
        let Some(&status) = bytes.first() else {
            return Err(MidiError::Truncated {
                expected: 1,
                actual: 0,
            });
        };
        let (kind, _) = status::decode(status)?;
        let expected = 1 + kind.data_len();
        if bytes.len() < expected {
            return Err(MidiError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }
        let data2 = if kind.data_len() == 2 { bytes[2] } else { 0 };
        Ok(Self::new(status, bytes[1], data2))
    }

    /// Raw `[status, data1, data2]` bytes.
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.status, self.data1, self.data2]
    }

    /// Decode the triplet into a typed channel message.
    ///
    /// Data bytes the family uses must be in 0-127.
    pub fn decode(&self) -> Result<ChannelMessage, MidiError> {
        let (kind, channel) = status::decode(self.status)?;
        let (data1, data2) = (self.data1, self.data2);
        if data1 & 0x80 != 0 {
            return Err(MidiError::InvalidData(data1));
        }
        if kind.data_len() == 2 && data2 & 0x80 != 0 {
            return Err(MidiError::InvalidData(data2));
        }
        Ok(match kind {
            MessageType::NoteOn => ChannelMessage::NoteOn {
                channel,
                note: data1,
                velocity: data2,
            },
            MessageType::NoteOff => ChannelMessage::NoteOff {
                channel,
                note: data1,
                velocity: data2,
            },
            MessageType::PolyAftertouch => ChannelMessage::PolyAftertouch {
                channel,
                note: data1,
                pressure: data2,
            },
            MessageType::ChannelAftertouch => ChannelMessage::ChannelAftertouch {
                channel,
                pressure: data1,
            },
            MessageType::ControllerChange => ChannelMessage::ControllerChange {
                channel,
                controller: data1,
                value: data2,
            },
            MessageType::ProgramChange => ChannelMessage::ProgramChange {
                channel,
                program: data1,
            },
            MessageType::PitchWheel => ChannelMessage::PitchWheel {
                channel,
                value: combine_14bit(data1, data2),
            },
        })
    }
}

/// Decoded channel voice message.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChannelMessage {
    NoteOn {
        channel: Channel,
        note: u8,
        velocity: u8,
    },
    NoteOff {
        channel: Channel,
        note: u8,
        velocity: u8,
    },
    PolyAftertouch {
        channel: Channel,
        note: u8,
        pressure: u8,
    },
    ChannelAftertouch {
        channel: Channel,
        pressure: u8,
    },
    ControllerChange {
        channel: Channel,
        controller: u8,
        value: u8,
    },
    ProgramChange {
        channel: Channel,
        program: u8,
    },
    PitchWheel {
        channel: Channel,
        value: u16,
    },
}

impl ChannelMessage {
    /// Channel the message was received on.
    pub fn channel(&self) -> Channel {
        match *self {
            ChannelMessage::NoteOn { channel, .. }
            | ChannelMessage::NoteOff { channel, .. }
            | ChannelMessage::PolyAftertouch { channel, .. }
            | ChannelMessage::ChannelAftertouch { channel, .. }
            | ChannelMessage::ControllerChange { channel, .. }
            | ChannelMessage::ProgramChange { channel, .. }
            | ChannelMessage::PitchWheel { channel, .. } => channel,
        }
    }

    /// Family of the message.
    pub fn kind(&self) -> MessageType {
        match self {
            ChannelMessage::NoteOn { .. } => MessageType::NoteOn,
            ChannelMessage::NoteOff { .. } => MessageType::NoteOff,
            ChannelMessage::PolyAftertouch { .. } => MessageType::PolyAftertouch,
            ChannelMessage::ChannelAftertouch { .. } => MessageType::ChannelAftertouch,
            ChannelMessage::ControllerChange { .. } => MessageType::ControllerChange,
            ChannelMessage::ProgramChange { .. } => MessageType::ProgramChange,
            ChannelMessage::PitchWheel { .. } => MessageType::PitchWheel,
        }
    }
}

/// Join a 7-bit LSB and MSB into a 14-bit value (0-16383).
pub const fn combine_14bit(lsb: u8, msb: u8) -> u16 {
    debug_assert!(lsb < 0x80 && msb < 0x80);
    lsb as u16 | ((msb as u16) << 7)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_wheel_extremes() {
        assert_eq!(combine_14bit(0x7F, 0x7F), 16383);
        assert_eq!(combine_14bit(0, 0), 0);
        assert_eq!(combine_14bit(0x00, 0x40), 8192);

        let decoded = MidiMessage::new(0xE3, 0x7F, 0x7F).decode().unwrap();
        assert_eq!(
            decoded,
            ChannelMessage::PitchWheel {
                channel: 3,
                value: 16383
            }
        );
    }

    #[test]
    fn from_bytes_respects_family_length() {
        assert_eq!(
            MidiMessage::from_bytes(&[0xC2, 5]),
            Ok(MidiMessage::new(0xC2, 5, 0))
        );
        assert_eq!(
            MidiMessage::from_bytes(&[0x90, 60]),
            Err(MidiError::Truncated {
                expected: 3,
                actual: 2
            })
        );
        assert!(matches!(
            MidiMessage::from_bytes(&[]),
            Err(MidiError::Truncated { actual: 0, .. })
        ));
        assert_eq!(
            MidiMessage::from_bytes(&[0xF8, 0, 0]),
            Err(MidiError::InvalidStatus(0xF8))
        );
    }

    #[test]
    fn rejects_data_bytes_with_high_bit() {
        assert_eq!(
            MidiMessage::new(0x90, 0xC8, 100).decode(),
            Err(MidiError::InvalidData(0xC8))
        );
        assert_eq!(
            MidiMessage::new(0x90, 60, 0x90).decode(),
            Err(MidiError::InvalidData(0x90))
        );
        assert_eq!(
            MidiMessage::new(0xE0, 0xFF, 0xFF).decode(),
            Err(MidiError::InvalidData(0xFF))
        );
        assert_eq!(
            MidiMessage::from_bytes(&[0x90, 0x90, 0x7F]).and_then(|m| m.decode()),
            Err(MidiError::InvalidData(0x90))
        );
    }

    #[test]
    fn one_byte_families_ignore_trailing_byte() {
        let message = MidiMessage::from_bytes(&[0xC0, 5, 0x90]).unwrap();
        assert_eq!(message, MidiMessage::new(0xC0, 5, 0));
        assert_eq!(
            message.decode(),
            Ok(ChannelMessage::ProgramChange {
                channel: 0,
                program: 5
            })
        );
        assert_eq!(
            MidiMessage::new(0xD0, 40, 0xFF).decode(),
            Ok(ChannelMessage::ChannelAftertouch {
                channel: 0,
                pressure: 40
            })
        );
    }

    #[test]
    fn one_byte_families_read_data1() {
        let aftertouch = MidiMessage::new(0xD5, 90, 0).decode().unwrap();
        assert_eq!(
            aftertouch,
            ChannelMessage::ChannelAftertouch {
                channel: 5,
                pressure: 90
            }
        );
        assert_eq!(aftertouch.kind(), MessageType::ChannelAftertouch);
        assert_eq!(aftertouch.channel(), 5);
    }
}
