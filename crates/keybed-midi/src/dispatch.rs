//! Routes decoded channel voice messages to handler callbacks.
//!
//! Malformed input is dropped without reaching the handler: a real-time
//! stream keeps going past bad data instead of halting.

use tracing::trace;

use crate::handler::MidiHandler;
use crate::message::{ChannelMessage, MidiMessage};

/// Dispatch a raw status/data triplet.
pub fn handle<H: MidiHandler + ?Sized>(handler: &mut H, status: u8, data1: u8, data2: u8) {
    match MidiMessage::new(status, data1, data2).decode() {
        Ok(message) => dispatch(handler, message),
        Err(err) => trace!(%err, "dropping MIDI message"),
    }
}

/// Dispatch the message at the start of `bytes`, dropping it when the slice is
/// shorter than its family requires.
pub fn handle_bytes<H: MidiHandler + ?Sized>(handler: &mut H, bytes: &[u8]) {
    match MidiMessage::from_bytes(bytes).and_then(|message| message.decode()) {
        Ok(message) => dispatch(handler, message),
        Err(err) => trace!(%err, ?bytes, "dropping MIDI message"),
    }
}

/// Invoke the handler callback matching a decoded message.
pub fn dispatch<H: MidiHandler + ?Sized>(handler: &mut H, message: ChannelMessage) {
    match message {
        ChannelMessage::NoteOn {
            channel,
            note,
            velocity,
        } => {
            // zero velocity note-on is a note-off
            if velocity > 0 {
                handler.start(note, velocity, channel);
            } else {
                handler.stop(note, channel);
            }
        }
        ChannelMessage::NoteOff { channel, note, .. } => handler.stop(note, channel),
        ChannelMessage::PolyAftertouch {
            channel,
            note,
            pressure,
        } => handler.poly_aftertouch(note, pressure, channel),
        ChannelMessage::ChannelAftertouch { channel, pressure } => {
            handler.channel_aftertouch(pressure, channel)
        }
        ChannelMessage::ControllerChange {
            channel,
            controller,
            value,
        } => handler.controller_change(controller, value, channel),
        ChannelMessage::ProgramChange { channel, program } => {
            handler.program_change(program, channel)
        }
        ChannelMessage::PitchWheel { channel, value } => handler.pitch_wheel(value, channel),
    }
}
