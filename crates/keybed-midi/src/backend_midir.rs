use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use crossbeam_channel::{Sender, TrySendError};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiInputPort};
use tracing::{debug, warn};

use crate::backend::{MidiBackend, MidiDeviceId};
use crate::packet::MidiPacket;
use crate::MidiTimestamp;

/// Backend implemented using the `midir` crate.
pub struct MidirBackend {
    client_name: Arc<str>,
    next_id: MidiDeviceId,
    connections: HashMap<MidiDeviceId, MidiInputConnection<()>>,
    epoch: Instant,
}

impl Default for MidirBackend {
    fn default() -> Self {
        Self::new("keybed")
    }
}

impl MidirBackend {
    /// Create a backend that registers with the platform under `client_name`.
    pub fn new(client_name: impl Into<Arc<str>>) -> Self {
        Self {
            client_name: client_name.into(),
            next_id: 1,
            connections: HashMap::new(),
            epoch: Instant::now(),
        }
    }

    fn allocate_id(&mut self) -> MidiDeviceId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn input(&self) -> anyhow::Result<MidiInput> {
        let mut input = MidiInput::new(&self.client_name).context("initialise midir for input")?;
        input.ignore(Ignore::None);
        Ok(input)
    }
}

fn forward_packets(
    epoch: Instant,
    tx: Sender<MidiPacket>,
) -> impl FnMut(u64, &[u8], &mut ()) + Send + 'static {
    move |_timestamp, message, _| {
        if message.is_empty() {
            return;
        }
        let packet = MidiPacket::new(epoch.elapsed().as_micros() as MidiTimestamp, message);
        match tx.try_send(packet) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => warn!("MIDI queue full; dropping packet"),
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

impl MidiBackend for MidirBackend {
    fn enumerate(&self) -> anyhow::Result<Vec<String>> {
        let input = MidiInput::new(&self.client_name).context("initialise midir for enumeration")?;
        let mut names = Vec::new();
        for (index, port) in input.ports().into_iter().enumerate() {
            let name = input
                .port_name(&port)
                .unwrap_or_else(|_| format!("Port {index}"));
            names.push(name);
        }
        Ok(names)
    }

    fn open_input(
        &mut self,
        port_index: usize,
        tx: Sender<MidiPacket>,
    ) -> anyhow::Result<MidiDeviceId> {
        let input = self.input()?;
        let ports: Vec<MidiInputPort> = input.ports();
        let Some(port) = ports.get(port_index) else {
            anyhow::bail!("midi port index out of range");
        };
        let name = input
            .port_name(port)
            .unwrap_or_else(|_| format!("Port {port_index}"));
        let connection = input
            .connect(
                port,
                "keybed-midi-conn",
                forward_packets(self.epoch, tx),
                (),
            )
            .map_err(|err| anyhow::anyhow!("failed to connect midi input: {err}"))?;
        let id = self.allocate_id();
        self.connections.insert(id, connection);
        debug!(id, port = %name, "opened midi input");
        Ok(id)
    }

    #[cfg(unix)]
    fn open_virtual(
        &mut self,
        name: &str,
        tx: Sender<MidiPacket>,
    ) -> anyhow::Result<MidiDeviceId> {
        use midir::os::unix::VirtualInput;

        let input = self.input()?;
        let connection = input
            .create_virtual(name, forward_packets(self.epoch, tx), ())
            .map_err(|err| anyhow::anyhow!("failed to create virtual midi input: {err}"))?;
        let id = self.allocate_id();
        self.connections.insert(id, connection);
        debug!(id, port = name, "opened virtual midi input");
        Ok(id)
    }

    #[cfg(not(unix))]
    fn open_virtual(
        &mut self,
        name: &str,
        _tx: Sender<MidiPacket>,
    ) -> anyhow::Result<MidiDeviceId> {
        Err(crate::error::MidiError::Backend(format!(
            "virtual input '{name}' is not supported on this platform"
        ))
        .into())
    }

    fn close_input(&mut self, id: MidiDeviceId) {
        if self.connections.remove(&id).is_some() {
            debug!(id, "closed midi input");
        }
    }
}
