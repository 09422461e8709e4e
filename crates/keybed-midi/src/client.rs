use std::sync::Arc;

use tracing::debug;

use crate::backend::{find_port, MidiBackend, MidiDeviceId};
use crate::backend_midir::MidirBackend;
use crate::config::InstrumentSettings;
use crate::handler::MidiHandler;
use crate::instrument::MidiInstrument;
use crate::runner::{spawn_dispatcher, DispatcherHandle};

/// Explicitly constructed MIDI client.
///
/// Owns the transport backend and is handed to whatever needs to open
/// inputs; there is no process-wide client.
pub struct MidiClient<B: MidiBackend = MidirBackend> {
    name: Arc<str>,
    backend: B,
}

impl MidiClient<MidirBackend> {
    /// Create a client backed by the platform MIDI services.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        let name = name.into();
        let backend = MidirBackend::new(Arc::clone(&name));
        Self { name, backend }
    }
}

/// Live connection between an input port and an instrument's dispatch thread.
///
/// Pass it back to [`MidiClient::disable_midi`] to close the port and recover
/// the instrument.
pub struct InstrumentConnection<H> {
    id: MidiDeviceId,
    port_name: String,
    dispatcher: DispatcherHandle<H>,
}

impl<H> InstrumentConnection<H> {
    /// Backend identifier of the open input.
    pub fn id(&self) -> MidiDeviceId {
        self.id
    }

    /// Name of the connected port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl<B: MidiBackend> MidiClient<B> {
    /// Create a client on top of an explicit backend.
    pub fn with_backend(name: impl Into<Arc<str>>, backend: B) -> Self {
        Self {
            name: name.into(),
            backend,
        }
    }

    /// Client name registered with the platform.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Access the backend instance.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend instance.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Enumerate available input port names.
    pub fn ports(&self) -> anyhow::Result<Vec<String>> {
        self.backend.enumerate()
    }

    /// Connect `instrument` to the input selected by `settings` and start
    /// dispatching on a dedicated thread.
    ///
    /// Without `input_port` a virtual destination named after the instrument
    /// is created instead.
    pub fn enable_midi<H>(
        &mut self,
        instrument: MidiInstrument<H>,
        settings: &InstrumentSettings,
    ) -> anyhow::Result<InstrumentConnection<H>>
    where
        H: MidiHandler + Send + 'static,
    {
        settings.validate()?;
        let (tx, rx) = crossbeam_channel::bounded(settings.queue_capacity);
        let (id, port_name) = match settings.input_port.as_deref() {
            Some(requested) => {
                let ports = self.backend.enumerate()?;
                let index = find_port(&ports, requested)?;
                let id = self.backend.open_input(index, tx)?;
                (id, ports[index].clone())
            }
            None => {
                let id = self.backend.open_virtual(instrument.name(), tx)?;
                (id, instrument.name().to_string())
            }
        };

        let dispatcher = match spawn_dispatcher(instrument, rx, settings.channel_filter) {
            Ok(dispatcher) => dispatcher,
            Err(err) => {
                self.backend.close_input(id);
                return Err(err);
            }
        };
        debug!(client = %self.name, port = %port_name, "connected MIDI input");
        Ok(InstrumentConnection {
            id,
            port_name,
            dispatcher,
        })
    }

    /// Close the port, drain pending packets and return the instrument.
    pub fn disable_midi<H>(
        &mut self,
        connection: InstrumentConnection<H>,
    ) -> Option<MidiInstrument<H>> {
        self.backend.close_input(connection.id);
        debug!(client = %self.name, port = %connection.port_name, "disconnected MIDI input");
        connection.dispatcher.shutdown()
    }
}
