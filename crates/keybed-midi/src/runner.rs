use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::anyhow;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, trace, warn};

use crate::handler::MidiHandler;
use crate::instrument::MidiInstrument;
use crate::packet::{self, MidiPacket};

const IDLE_POLL: Duration = Duration::from_millis(5);

/// Owns the dispatch thread driving one instrument.
///
/// Dropping the handle stops the thread; [`DispatcherHandle::shutdown`]
/// additionally hands the instrument back.
pub struct DispatcherHandle<H> {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<MidiInstrument<H>>>,
}

impl<H> DispatcherHandle<H> {
    /// Stop the loop after draining queued packets and return the instrument.
    pub fn shutdown(mut self) -> Option<MidiInstrument<H>> {
        self.stop.store(true, Ordering::Release);
        let handle = self.thread.take()?;
        match handle.join() {
            Ok(instrument) => Some(instrument),
            Err(err) => {
                warn!(?err, "failed to join MIDI dispatcher thread");
                None
            }
        }
    }
}

impl<H> Drop for DispatcherHandle<H> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            if let Err(err) = handle.join() {
                warn!(?err, "failed to join MIDI dispatcher thread");
            }
        }
    }
}

/// Whether a message passes the optional channel filter. System messages
/// carry no channel and are always let through.
fn accepts(channel_filter: Option<u8>, event: &[u8]) -> bool {
    match (channel_filter, event.first()) {
        (Some(channel), Some(&status)) if (0x80..0xF0).contains(&status) => {
            status & 0x0F == channel
        }
        _ => true,
    }
}

fn process<H: MidiHandler>(
    instrument: &mut MidiInstrument<H>,
    packet: &MidiPacket,
    channel_filter: Option<u8>,
) {
    for event in packet::events(&packet.bytes) {
        if accepts(channel_filter, event) {
            instrument.receive(event);
        } else {
            trace!(?event, "filtered MIDI message");
        }
    }
}

/// Spawn a thread feeding packets from `rx` into `instrument` one at a time.
///
/// The loop ends on shutdown or once every sender is gone.
pub fn spawn_dispatcher<H>(
    mut instrument: MidiInstrument<H>,
    rx: Receiver<MidiPacket>,
    channel_filter: Option<u8>,
) -> anyhow::Result<DispatcherHandle<H>>
where
    H: MidiHandler + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);
    let thread = thread::Builder::new()
        .name(format!("keybed-midi-{}", instrument.name()))
        .spawn(move || {
            while !stop_flag.load(Ordering::Acquire) {
                match rx.recv_timeout(IDLE_POLL) {
                    Ok(packet) => process(&mut instrument, &packet, channel_filter),
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            // Drain remaining packets on shutdown.
            for packet in rx.try_iter() {
                process(&mut instrument, &packet, channel_filter);
            }
            debug!(instrument = instrument.name(), "MIDI dispatcher stopped");
            instrument
        })
        .map_err(|err| anyhow!("failed to spawn MIDI dispatcher thread: {err}"))?;

    Ok(DispatcherHandle {
        stop,
        thread: Some(thread),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_filter_only_checks_voice_messages() {
        assert!(accepts(None, &[0x93, 60, 1]));
        assert!(accepts(Some(3), &[0x93, 60, 1]));
        assert!(!accepts(Some(2), &[0x93, 60, 1]));
        assert!(accepts(Some(2), &[0xF8]));
        assert!(accepts(Some(2), &[]));
    }
}
