//! Extension points invoked by the dispatcher.
//!
//! Every method defaults to a no-op so consumers only override what they use.
//! Implementations run on the dispatch thread and must not block.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::status::Channel;

/// Note start/stop callbacks.
pub trait NoteHandler {
    /// Start a note.
    fn start(&mut self, note: u8, velocity: u8, channel: Channel) {
        let _ = (note, velocity, channel);
    }

    /// Stop a note.
    fn stop(&mut self, note: u8, channel: Channel) {
        let _ = (note, channel);
    }
}

/// Controller and program change callbacks.
pub trait ControllerHandler {
    /// Controller number and its new value (0-127).
    fn controller_change(&mut self, controller: u8, value: u8, channel: Channel) {
        let _ = (controller, value, channel);
    }

    /// Program (patch) selection (0-127).
    fn program_change(&mut self, program: u8, channel: Channel) {
        let _ = (program, channel);
    }
}

/// Pressure callbacks.
pub trait AftertouchHandler {
    /// Pressure applied to a single held note (0-127).
    fn poly_aftertouch(&mut self, note: u8, pressure: u8, channel: Channel) {
        let _ = (note, pressure, channel);
    }

    /// Pressure applied to the whole channel (0-127).
    fn channel_aftertouch(&mut self, pressure: u8, channel: Channel) {
        let _ = (pressure, channel);
    }
}

pub trait PitchWheelHandler {
    /// Pitch wheel position, 0-16383 with 8192 centred.
    fn pitch_wheel(&mut self, value: u16, channel: Channel) {
        let _ = (value, channel);
    }
}

/// Full capability set consumed by the dispatcher.
pub trait MidiHandler:
    NoteHandler + ControllerHandler + AftertouchHandler + PitchWheelHandler
{
}

impl<T: ?Sized> MidiHandler for T where
    T: NoteHandler + ControllerHandler + AftertouchHandler + PitchWheelHandler
{
}

/// Handler that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHandler;

impl NoteHandler for NullHandler {}
impl ControllerHandler for NullHandler {}
impl AftertouchHandler for NullHandler {}
impl PitchWheelHandler for NullHandler {}

/// One observed handler invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HandlerCall {
    Start {
        note: u8,
        velocity: u8,
        channel: Channel,
    },
    Stop {
        note: u8,
        channel: Channel,
    },
    PolyAftertouch {
        note: u8,
        pressure: u8,
        channel: Channel,
    },
    ChannelAftertouch {
        pressure: u8,
        channel: Channel,
    },
    ControllerChange {
        controller: u8,
        value: u8,
        channel: Channel,
    },
    ProgramChange {
        program: u8,
        channel: Channel,
    },
    PitchWheel {
        value: u16,
        channel: Channel,
    },
}

impl fmt::Display for HandlerCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HandlerCall::Start {
                note,
                velocity,
                channel,
            } => write!(f, "start note={note} velocity={velocity} channel={channel}"),
            HandlerCall::Stop { note, channel } => {
                write!(f, "stop note={note} channel={channel}")
            }
            HandlerCall::PolyAftertouch {
                note,
                pressure,
                channel,
            } => write!(
                f,
                "poly-aftertouch note={note} pressure={pressure} channel={channel}"
            ),
            HandlerCall::ChannelAftertouch { pressure, channel } => {
                write!(f, "channel-aftertouch pressure={pressure} channel={channel}")
            }
            HandlerCall::ControllerChange {
                controller,
                value,
                channel,
            } => write!(
                f,
                "controller controller={controller} value={value} channel={channel}"
            ),
            HandlerCall::ProgramChange { program, channel } => {
                write!(f, "program program={program} channel={channel}")
            }
            HandlerCall::PitchWheel { value, channel } => {
                write!(f, "pitch-wheel value={value} channel={channel}")
            }
        }
    }
}

/// Handler that records every call in arrival order.
#[derive(Debug, Default, Clone)]
pub struct CallRecorder {
    calls: Vec<HandlerCall>,
}

impl CallRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> &[HandlerCall] {
        &self.calls
    }

    /// Retrieves and clears recorded calls.
    pub fn take(&mut self) -> Vec<HandlerCall> {
        std::mem::take(&mut self.calls)
    }
}

impl NoteHandler for CallRecorder {
    fn start(&mut self, note: u8, velocity: u8, channel: Channel) {
        self.calls.push(HandlerCall::Start {
            note,
            velocity,
            channel,
        });
    }

    fn stop(&mut self, note: u8, channel: Channel) {
        self.calls.push(HandlerCall::Stop { note, channel });
    }
}

impl ControllerHandler for CallRecorder {
    fn controller_change(&mut self, controller: u8, value: u8, channel: Channel) {
        self.calls.push(HandlerCall::ControllerChange {
            controller,
            value,
            channel,
        });
    }

    fn program_change(&mut self, program: u8, channel: Channel) {
        self.calls.push(HandlerCall::ProgramChange { program, channel });
    }
}

impl AftertouchHandler for CallRecorder {
    fn poly_aftertouch(&mut self, note: u8, pressure: u8, channel: Channel) {
        self.calls.push(HandlerCall::PolyAftertouch {
            note,
            pressure,
            channel,
        });
    }

    fn channel_aftertouch(&mut self, pressure: u8, channel: Channel) {
        self.calls.push(HandlerCall::ChannelAftertouch { pressure, channel });
    }
}

impl PitchWheelHandler for CallRecorder {
    fn pitch_wheel(&mut self, value: u16, channel: Channel) {
        self.calls.push(HandlerCall::PitchWheel { value, channel });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_calls_for_display() {
        let call = HandlerCall::Start {
            note: 60,
            velocity: 100,
            channel: 0,
        };
        assert_eq!(call.to_string(), "start note=60 velocity=100 channel=0");
    }

    #[test]
    fn serializes_with_call_tag() {
        let json = serde_json::to_string(&HandlerCall::Stop {
            note: 60,
            channel: 2,
        })
        .unwrap();
        assert_eq!(json, r#"{"call":"stop","note":60,"channel":2}"#);
    }
}
