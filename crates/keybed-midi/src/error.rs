use thiserror::Error;

/// Errors produced while decoding MIDI data or dealing with MIDI backends.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MidiError {
    /// The byte is not a channel voice status byte.
    #[error("invalid status byte {0:#04x}")]
    InvalidStatus(u8),
    /// A data byte has its high bit set.
    #[error("invalid data byte {0:#04x}")]
    InvalidData(u8),
    /// Fewer bytes were supplied than the message family requires.
    #[error("truncated message: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    /// The requested port could not be found.
    #[error("unknown MIDI port '{0}'")]
    UnknownPort(String),
    /// Backend specific failure with additional context.
    #[error("backend error: {0}")]
    Backend(String),
    /// Instrument settings failed validation.
    #[error("invalid settings: {0}")]
    Settings(String),
}
