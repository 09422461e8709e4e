use crossbeam_channel::Sender;

use crate::error::MidiError;
use crate::packet::MidiPacket;

/// Unique identifier for a MIDI input connection.
pub type MidiDeviceId = u64;

/// Backend abstraction for platform specific MIDI transports.
///
/// Backends only forward raw bytes; decoding happens on the dispatch thread.
pub trait MidiBackend: Send {
    /// Enumerate available input port names.
    fn enumerate(&self) -> anyhow::Result<Vec<String>>;

    /// Open an input port and start delivering packets to `tx`.
    fn open_input(
        &mut self,
        port_index: usize,
        tx: Sender<MidiPacket>,
    ) -> anyhow::Result<MidiDeviceId>;

    /// Create a virtual destination other applications can send to.
    fn open_virtual(
        &mut self,
        name: &str,
        tx: Sender<MidiPacket>,
    ) -> anyhow::Result<MidiDeviceId>;

    /// Close a previously opened input.
    fn close_input(&mut self, id: MidiDeviceId);
}

/// Resolve a requested port name against the enumerated ports.
///
/// Matching is a case-insensitive substring search. An empty request,
/// `"auto"` or `"default"` select the first port.
pub fn find_port(ports: &[String], requested: &str) -> Result<usize, MidiError> {
    let requested_lower = requested.trim().to_lowercase();
    let found = if matches!(requested_lower.as_str(), "" | "auto" | "default") {
        (!ports.is_empty()).then_some(0)
    } else {
        ports
            .iter()
            .position(|name| name.to_lowercase().contains(&requested_lower))
    };
    found.ok_or_else(|| MidiError::UnknownPort(requested.to_string()))
}
