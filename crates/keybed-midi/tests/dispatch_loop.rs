use keybed_midi::{
    spawn_dispatcher, ActiveNote, CallRecorder, HandlerCall, MidiInstrument, MidiPacket,
};

fn recorder_instrument() -> MidiInstrument<CallRecorder> {
    MidiInstrument::new("loop", CallRecorder::new())
}

#[test]
fn packets_are_dispatched_in_order() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let dispatcher = spawn_dispatcher(recorder_instrument(), rx, None).unwrap();

    tx.send(MidiPacket::new(0, vec![0x90, 60, 100])).unwrap();
    tx.send(MidiPacket::new(250, vec![0x90, 64, 90, 0xE0, 0x00, 0x40])).unwrap();
    tx.send(MidiPacket::new(540, vec![0x80, 60, 0])).unwrap();
    drop(tx);

    let instrument = dispatcher.shutdown().unwrap();
    assert_eq!(instrument.active_notes(), &[ActiveNote::new(64, 0)]);
    assert_eq!(
        instrument.handler().calls(),
        &[
            HandlerCall::Start {
                note: 60,
                velocity: 100,
                channel: 0
            },
            HandlerCall::Start {
                note: 64,
                velocity: 90,
                channel: 0
            },
            HandlerCall::PitchWheel {
                value: 8192,
                channel: 0
            },
            HandlerCall::Stop {
                note: 60,
                channel: 0
            },
        ]
    );
}

#[test]
fn channel_filter_drops_foreign_channels() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let dispatcher = spawn_dispatcher(recorder_instrument(), rx, Some(1)).unwrap();

    tx.send(MidiPacket::new(0, vec![0x90, 60, 100, 0x91, 62, 100]))
        .unwrap();
    tx.send(MidiPacket::new(10, vec![0xB0, 7, 127, 0xB1, 7, 64]))
        .unwrap();

    let instrument = dispatcher.shutdown().unwrap();
    assert_eq!(instrument.active_notes(), &[ActiveNote::new(62, 1)]);
    assert_eq!(
        instrument.handler().calls(),
        &[
            HandlerCall::Start {
                note: 62,
                velocity: 100,
                channel: 1
            },
            HandlerCall::ControllerChange {
                controller: 7,
                value: 64,
                channel: 1
            },
        ]
    );
}

#[test]
fn realtime_and_malformed_bytes_are_ignored() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let dispatcher = spawn_dispatcher(recorder_instrument(), rx, None).unwrap();

    tx.send(MidiPacket::new(0, vec![0xF8])).unwrap();
    tx.send(MidiPacket::new(1, vec![0x90, 60])).unwrap();
    tx.send(MidiPacket::new(2, vec![0x3C, 0x40])).unwrap();
    drop(tx);

    let instrument = dispatcher.shutdown().unwrap();
    assert!(instrument.active_notes().is_empty());
    assert!(instrument.handler().calls().is_empty());
}

#[test]
fn duplicate_note_on_survives_single_note_off() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let dispatcher = spawn_dispatcher(recorder_instrument(), rx, None).unwrap();

    for ts in 0..2 {
        tx.send(MidiPacket::new(ts, vec![0x90, 60, 100])).unwrap();
    }
    tx.send(MidiPacket::new(2, vec![0x80, 60, 0])).unwrap();

    let instrument = dispatcher.shutdown().unwrap();
    assert_eq!(instrument.active_notes(), &[ActiveNote::new(60, 0)]);
}
