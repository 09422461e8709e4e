use crate::config::InstrumentSettings;
use crate::dispatch;
use crate::handler::{
    AftertouchHandler, ControllerHandler, MidiHandler, NoteHandler, PitchWheelHandler,
};
use crate::packet;
use crate::status::Channel;
use crate::tracker::{ActiveNote, ActiveNoteTracker};

/// Default number of notes the tracker holds without reallocating.
pub const DEFAULT_NOTE_CAPACITY: usize = 32;

/// A MIDI-triggerable instrument.
///
/// Wraps a consumer handler and keeps the active-note set in sync with the
/// start/stop calls forwarded to it.
#[derive(Debug)]
pub struct MidiInstrument<H> {
    name: String,
    handler: H,
    tracker: ActiveNoteTracker,
}

impl<H: MidiHandler> MidiInstrument<H> {
    /// Create an instrument with the default tracker capacity.
    pub fn new(name: impl Into<String>, handler: H) -> Self {
        Self::with_capacity(name, handler, DEFAULT_NOTE_CAPACITY)
    }

    /// Create an instrument whose tracker holds `note_capacity` notes before
    /// reallocating.
    pub fn with_capacity(name: impl Into<String>, handler: H, note_capacity: usize) -> Self {
        Self {
            name: name.into(),
            handler,
            tracker: ActiveNoteTracker::with_capacity(note_capacity),
        }
    }

    /// Create an instrument named and sized from persisted settings.
    pub fn from_settings(settings: &InstrumentSettings, handler: H) -> Self {
        Self::with_capacity(settings.name.clone(), handler, settings.note_capacity)
    }

    /// Handle a single message.
    pub fn receive(&mut self, bytes: &[u8]) {
        dispatch::handle_bytes(self, bytes);
    }

    /// Handle every message contained in a packet, in order.
    pub fn receive_packet(&mut self, bytes: &[u8]) {
        for event in packet::events(bytes) {
            self.receive(event);
        }
    }

    /// Handle a raw status/data triplet.
    pub fn handle(&mut self, status: u8, data1: u8, data2: u8) {
        dispatch::handle(self, status, data1, data2);
    }

    /// Stop every held note, oldest first, and clear the tracker.
    pub fn all_notes_off(&mut self) {
        for active in self.tracker.active_notes() {
            self.handler.stop(active.note, active.channel);
        }
        self.tracker.clear();
    }
}

impl<H> MidiInstrument<H> {
    /// Instrument name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Access the wrapped handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Mutable access to the wrapped handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consume the instrument and return its handler.
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Currently held notes, oldest first.
    pub fn active_notes(&self) -> &[ActiveNote] {
        self.tracker.active_notes()
    }

    /// Access the active-note tracker.
    pub fn tracker(&self) -> &ActiveNoteTracker {
        &self.tracker
    }
}

impl<H: MidiHandler> NoteHandler for MidiInstrument<H> {
    fn start(&mut self, note: u8, velocity: u8, channel: Channel) {
        self.tracker.note_on(note, channel);
        self.handler.start(note, velocity, channel);
    }

    fn stop(&mut self, note: u8, channel: Channel) {
        self.handler.stop(note, channel);
        self.tracker.note_off(note, channel);
    }
}

impl<H: MidiHandler> ControllerHandler for MidiInstrument<H> {
    fn controller_change(&mut self, controller: u8, value: u8, channel: Channel) {
        self.handler.controller_change(controller, value, channel);
    }

    fn program_change(&mut self, program: u8, channel: Channel) {
        self.handler.program_change(program, channel);
    }
}

impl<H: MidiHandler> AftertouchHandler for MidiInstrument<H> {
    fn poly_aftertouch(&mut self, note: u8, pressure: u8, channel: Channel) {
        self.handler.poly_aftertouch(note, pressure, channel);
    }

    fn channel_aftertouch(&mut self, pressure: u8, channel: Channel) {
        self.handler.channel_aftertouch(pressure, channel);
    }
}

impl<H: MidiHandler> PitchWheelHandler for MidiInstrument<H> {
    fn pitch_wheel(&mut self, value: u16, channel: Channel) {
        self.handler.pitch_wheel(value, channel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{CallRecorder, HandlerCall};

    fn instrument() -> MidiInstrument<CallRecorder> {
        MidiInstrument::new("test", CallRecorder::new())
    }

    #[test]
    fn note_on_then_off_leaves_no_active_notes() {
        let mut inst = instrument();
        inst.handle(0x90, 60, 100);
        assert_eq!(inst.active_notes(), &[ActiveNote::new(60, 0)]);
        inst.handle(0x80, 60, 0);
        assert!(inst.active_notes().is_empty());
    }

    #[test]
    fn repeated_note_on_tracks_twice() {
        let mut inst = instrument();
        inst.receive(&[0x90, 60, 100]);
        inst.receive(&[0x90, 60, 100]);
        assert_eq!(inst.active_notes().len(), 2);
    }

    #[test]
    fn zero_velocity_note_on_releases() {
        let mut inst = instrument();
        inst.receive(&[0x93, 48, 90]);
        inst.receive(&[0x93, 48, 0]);
        assert!(inst.active_notes().is_empty());
        assert_eq!(
            inst.handler().calls().last(),
            Some(&HandlerCall::Stop {
                note: 48,
                channel: 3
            })
        );
    }

    #[test]
    fn unrecognized_status_changes_nothing() {
        let mut inst = instrument();
        inst.receive(&[0x90, 60, 100]);
        inst.handler_mut().take();
        inst.receive(&[0xF8, 0, 0]);
        assert!(inst.handler().calls().is_empty());
        assert_eq!(inst.active_notes(), &[ActiveNote::new(60, 0)]);
    }

    #[test]
    fn out_of_range_data_bytes_are_dropped() {
        let mut inst = instrument();
        inst.handle(0x90, 0xC8, 100);
        inst.receive(&[0x90, 0x90, 0x7F]);
        inst.handle(0xE0, 0xFF, 0xFF);
        assert!(inst.active_notes().is_empty());
        assert!(inst.handler().calls().is_empty());
    }

    #[test]
    fn packet_with_on_and_off() {
        let mut inst = instrument();
        inst.receive_packet(&[0x90, 60, 100, 0x80, 60, 0]);
        assert!(inst.active_notes().is_empty());
        assert_eq!(
            inst.handler().calls(),
            &[
                HandlerCall::Start {
                    note: 60,
                    velocity: 100,
                    channel: 0
                },
                HandlerCall::Stop {
                    note: 60,
                    channel: 0
                }
            ]
        );
    }

    #[test]
    fn all_notes_off_stops_in_arrival_order() {
        let mut inst = instrument();
        inst.receive_packet(&[0x90, 64, 80, 0x91, 60, 80, 0x90, 67, 80]);
        inst.handler_mut().take();

        inst.all_notes_off();
        assert!(inst.active_notes().is_empty());
        assert_eq!(
            inst.into_handler().take(),
            vec![
                HandlerCall::Stop {
                    note: 64,
                    channel: 0
                },
                HandlerCall::Stop {
                    note: 60,
                    channel: 1
                },
                HandlerCall::Stop {
                    note: 67,
                    channel: 0
                },
            ]
        );
    }

    #[test]
    fn expression_messages_do_not_touch_tracker() {
        let mut inst = instrument();
        inst.receive_packet(&[0xB0, 64, 127, 0xE0, 0, 64, 0xD0, 50, 0xC0, 3]);
        assert!(inst.active_notes().is_empty());
        assert_eq!(inst.handler().calls().len(), 4);
    }
}
