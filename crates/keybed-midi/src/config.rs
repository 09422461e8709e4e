use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::MidiError;
use crate::instrument::DEFAULT_NOTE_CAPACITY;

/// Default depth of the packet queue between transport and dispatch thread.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Persisted instrument settings stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentSettings {
    /// Instrument name, also used for the virtual input port.
    pub name: String,
    /// Input to connect to, matched case-insensitively against port names.
    /// `"auto"` or `"default"` pick the first port. `None` opens a virtual port.
    pub input_port: Option<String>,
    /// Only accept messages on this channel (0-15).
    pub channel_filter: Option<u8>,
    /// Notes held before the tracker reallocates.
    pub note_capacity: usize,
    /// Packets buffered between the transport and the dispatch thread.
    pub queue_capacity: usize,
}

impl Default for InstrumentSettings {
    fn default() -> Self {
        Self {
            name: "keybed".into(),
            input_port: None,
            channel_filter: None,
            note_capacity: DEFAULT_NOTE_CAPACITY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl InstrumentSettings {
    /// Check that the settings describe a usable instrument.
    pub fn validate(&self) -> Result<(), MidiError> {
        if self.name.trim().is_empty() {
            return Err(MidiError::Settings("instrument name is empty".into()));
        }
        if let Some(channel) = self.channel_filter {
            if channel > 15 {
                return Err(MidiError::Settings(format!(
                    "channel filter {channel} out of range 0-15"
                )));
            }
        }
        if self.queue_capacity == 0 {
            return Err(MidiError::Settings("queue capacity must be non-zero".into()));
        }
        Ok(())
    }
}

fn settings_path() -> Option<PathBuf> {
    let mut base = dirs::config_dir()?;
    base.push("Keybed");
    if !base.exists() {
        let _ = fs::create_dir_all(&base);
    }
    base.push("midi.json");
    Some(base)
}

/// Load settings from disk. Returns defaults if loading fails.
pub fn load() -> InstrumentSettings {
    let Some(path) = settings_path() else {
        return InstrumentSettings::default();
    };
    match load_from(&path) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::debug!(?err, "using default midi settings");
            InstrumentSettings::default()
        }
    }
}

/// Save settings to disk.
pub fn save(settings: &InstrumentSettings) {
    let Some(path) = settings_path() else {
        return;
    };
    if let Err(err) = save_to(&path, settings) {
        tracing::warn!(?err, "failed to write midi settings");
    }
}

/// Read and validate settings from an explicit path.
pub fn load_from(path: &Path) -> anyhow::Result<InstrumentSettings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let settings: InstrumentSettings = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid settings file", path.display()))?;
    settings.validate()?;
    Ok(settings)
}

/// Write settings to an explicit path.
pub fn save_to(path: &Path, settings: &InstrumentSettings) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(settings).context("serialise midi settings")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("midi.json");
        let settings = InstrumentSettings {
            name: "lead".into(),
            input_port: Some("Keystation".into()),
            channel_filter: Some(2),
            ..InstrumentSettings::default()
        };
        save_to(&path, &settings).unwrap();
        assert_eq!(load_from(&path).unwrap(), settings);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: InstrumentSettings = serde_json::from_str(r#"{"name":"pad"}"#).unwrap();
        assert_eq!(parsed.name, "pad");
        assert_eq!(parsed.note_capacity, DEFAULT_NOTE_CAPACITY);
        assert_eq!(parsed.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn rejects_out_of_range_channel_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("midi.json");
        fs::write(&path, r#"{"channel_filter":16}"#).unwrap();
        assert!(load_from(&path).is_err());

        let settings = InstrumentSettings {
            channel_filter: Some(16),
            ..InstrumentSettings::default()
        };
        assert!(matches!(settings.validate(), Err(MidiError::Settings(_))));
    }
}
