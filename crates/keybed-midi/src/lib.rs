//! MIDI input for Keybed instruments.
//!
//! Incoming channel voice messages are decoded from their status byte,
//! dispatched to a consumer's handler callbacks and tracked as active notes.
//! Transports only forward raw packets; all decoding runs sequentially on a
//! single dispatch thread.

pub mod backend;
pub mod backend_midir;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod instrument;
pub mod message;
pub mod packet;
pub mod runner;
pub mod status;
pub mod tracker;

/// Timestamp associated with a MIDI packet, in microseconds.
pub type MidiTimestamp = u64;

pub use backend::{MidiBackend, MidiDeviceId};
pub use backend_midir::MidirBackend;
pub use client::{InstrumentConnection, MidiClient};
pub use config::InstrumentSettings;
pub use error::MidiError;
pub use handler::{
    AftertouchHandler, CallRecorder, ControllerHandler, HandlerCall, MidiHandler, NoteHandler,
    NullHandler, PitchWheelHandler,
};
pub use instrument::MidiInstrument;
pub use message::{ChannelMessage, MidiMessage};
pub use packet::MidiPacket;
pub use runner::{spawn_dispatcher, DispatcherHandle};
pub use status::{Channel, MessageType};
pub use tracker::{ActiveNote, ActiveNoteTracker};
