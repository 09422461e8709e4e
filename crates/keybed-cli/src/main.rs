use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use keybed_midi::{
    config, packet, ActiveNote, AftertouchHandler, CallRecorder, Channel, ChannelMessage,
    ControllerHandler, HandlerCall, InstrumentSettings, MidiClient, MidiInstrument, MidiMessage,
    NoteHandler, PitchWheelHandler,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    match cli.command {
        Commands::Decode(args) => execute_decode(args),
        Commands::Ports => execute_ports(),
        Commands::Monitor(args) => execute_monitor(args),
    }
}

#[derive(Parser)]
#[command(author, version, about = "MIDI input tools for Keybed instruments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode hex MIDI bytes and show the handler calls they produce.
    Decode(DecodeArgs),
    /// List available MIDI inputs.
    Ports,
    /// Connect to an input and log every handler call until Enter is pressed.
    Monitor(MonitorArgs),
}

#[derive(Args)]
struct DecodeArgs {
    /// Bytes in hex, e.g. `90 3c 64` or `0x90,0x3c,0x64`.
    #[arg(required = true)]
    bytes: Vec<String>,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct MonitorArgs {
    /// Input port to connect to; a virtual input is created when omitted.
    #[arg(long)]
    port: Option<String>,
    /// Only accept messages on this channel (0-15).
    #[arg(long)]
    channel: Option<u8>,
    /// Instrument name, also used for the virtual input.
    #[arg(long)]
    name: Option<String>,
    /// Settings file to use instead of the default location.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Persist the effective settings after the session.
    #[arg(long)]
    save: bool,
}

fn parse_hex_bytes(args: &[String]) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for token in args
        .iter()
        .flat_map(|arg| arg.split(|c: char| c.is_whitespace() || c == ','))
        .filter(|token| !token.is_empty())
    {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        let byte = u8::from_str_radix(digits, 16)
            .with_context(|| format!("'{token}' is not a hex byte"))?;
        bytes.push(byte);
    }
    Ok(bytes)
}

#[derive(Debug, Serialize)]
struct DecodedEvent {
    bytes: Vec<u8>,
    message: Option<ChannelMessage>,
    dropped: Option<String>,
    calls: Vec<HandlerCall>,
}

#[derive(Debug, Serialize)]
struct DecodeReport {
    events: Vec<DecodedEvent>,
    active_notes: Vec<ActiveNote>,
}

fn decode_report(bytes: &[u8]) -> DecodeReport {
    let mut instrument = MidiInstrument::new("decode", CallRecorder::new());
    let mut events = Vec::new();
    for event in packet::events(bytes) {
        let decoded = MidiMessage::from_bytes(event).and_then(|message| message.decode());
        instrument.receive(event);
        let (message, dropped) = match decoded {
            Ok(message) => (Some(message), None),
            Err(err) => (None, Some(err.to_string())),
        };
        events.push(DecodedEvent {
            bytes: event.to_vec(),
            message,
            dropped,
            calls: instrument.handler_mut().take(),
        });
    }
    DecodeReport {
        events,
        active_notes: instrument.active_notes().to_vec(),
    }
}

fn execute_decode(args: DecodeArgs) -> Result<()> {
    let bytes = parse_hex_bytes(&args.bytes)?;
    let report = decode_report(&bytes);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.events.is_empty() {
        println!("No status bytes found");
    }
    for event in &report.events {
        let hex: Vec<String> = event.bytes.iter().map(|b| format!("{b:02X}")).collect();
        match (&event.message, &event.dropped) {
            (Some(message), _) => println!("{}: {message:?}", hex.join(" ")),
            (None, Some(reason)) => println!("{}: dropped ({reason})", hex.join(" ")),
            (None, None) => println!("{}", hex.join(" ")),
        }
        for call in &event.calls {
            println!("  -> {call}");
        }
    }
    if !report.active_notes.is_empty() {
        println!("Active notes:");
        for active in &report.active_notes {
            println!("  note={} channel={}", active.note, active.channel);
        }
    }
    Ok(())
}

fn execute_ports() -> Result<()> {
    let client = MidiClient::new("keybed-cli");
    let ports = client.ports()?;
    if ports.is_empty() {
        println!("No MIDI inputs available");
    }
    for (index, name) in ports.iter().enumerate() {
        println!("{index}: {name}");
    }
    Ok(())
}

/// Handler that logs every call through tracing.
struct LogHandler;

impl NoteHandler for LogHandler {
    fn start(&mut self, note: u8, velocity: u8, channel: Channel) {
        info!(note, velocity, channel, "note on");
    }

    fn stop(&mut self, note: u8, channel: Channel) {
        info!(note, channel, "note off");
    }
}

impl ControllerHandler for LogHandler {
    fn controller_change(&mut self, controller: u8, value: u8, channel: Channel) {
        info!(controller, value, channel, "controller change");
    }

    fn program_change(&mut self, program: u8, channel: Channel) {
        info!(program, channel, "program change");
    }
}

impl AftertouchHandler for LogHandler {
    fn poly_aftertouch(&mut self, note: u8, pressure: u8, channel: Channel) {
        info!(note, pressure, channel, "poly aftertouch");
    }

    fn channel_aftertouch(&mut self, pressure: u8, channel: Channel) {
        info!(pressure, channel, "channel aftertouch");
    }
}

impl PitchWheelHandler for LogHandler {
    fn pitch_wheel(&mut self, value: u16, channel: Channel) {
        info!(value, channel, "pitch wheel");
    }
}

fn monitor_settings(args: &MonitorArgs) -> Result<InstrumentSettings> {
    let mut settings = match &args.settings {
        Some(path) => config::load_from(path)?,
        None => config::load(),
    };
    if let Some(port) = &args.port {
        settings.input_port = Some(port.clone());
    }
    if let Some(channel) = args.channel {
        settings.channel_filter = Some(channel);
    }
    if let Some(name) = &args.name {
        settings.name = name.clone();
    }
    settings.validate()?;
    Ok(settings)
}

fn execute_monitor(args: MonitorArgs) -> Result<()> {
    let settings = monitor_settings(&args)?;
    let mut client = MidiClient::new("keybed-cli");
    let instrument = MidiInstrument::from_settings(&settings, LogHandler);
    let connection = client.enable_midi(instrument, &settings)?;
    println!(
        "Monitoring '{}' as '{}'; press Enter to stop",
        connection.port_name(),
        settings.name
    );

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;

    if let Some(mut instrument) = client.disable_midi(connection) {
        if !instrument.active_notes().is_empty() {
            println!("Releasing {} held notes", instrument.active_notes().len());
            instrument.all_notes_off();
        }
    }

    if args.save {
        match &args.settings {
            Some(path) => config::save_to(path, &settings)?,
            None => config::save(&settings),
        }
    }
    Ok(())
}
