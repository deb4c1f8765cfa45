//! Performance type definitions
//!
//! This module defines the arranger's output: timed note events grouped by
//! instrument track, plus the tempo and meter needed to serialize them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::BacklineError;
use crate::score::TimeSignature;

/// Accompaniment instruments, one track each.
///
/// # Channels
/// Every instrument has its own MIDI channel so voices never collide:
/// - Drums: channel 9 (General MIDI percussion, "channel 10" one-based)
/// - Bass: channel 0
/// - Piano: channel 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Drums,
    Bass,
    Piano,
}

impl Instrument {
    pub const ALL: [Instrument; 3] = [Instrument::Drums, Instrument::Bass, Instrument::Piano];

    pub fn channel(&self) -> u8 {
        match self {
            Instrument::Drums => 9,
            Instrument::Bass => 0,
            Instrument::Piano => 1,
        }
    }

    /// General MIDI program for melodic tracks (Acoustic Bass, Acoustic Grand Piano).
    pub fn program(&self) -> Option<u8> {
        match self {
            Instrument::Drums => None,
            Instrument::Bass => Some(32),
            Instrument::Piano => Some(0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Instrument::Drums => "drums",
            Instrument::Bass => "bass",
            Instrument::Piano => "piano",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single timed note
///
/// # Fields
/// - `start`: Absolute start time in beats from the top of the performance
/// - `pitch`: MIDI note number (a GM drum voice on the percussion channel)
/// - `duration`: Length in beats
/// - `velocity`: 0-127, already scaled by the instrument volume
/// - `channel`: MIDI channel (0-15)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub start: f64,
    pub pitch: u8,
    pub duration: f64,
    pub velocity: u8,
    pub channel: u8,
}

impl NoteEvent {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A rendered accompaniment
///
/// # Fields
/// - `tempo`: Tempo in BPM (beat = quarter note)
/// - `time_signature`: Meter of the whole performance
/// - `total_beats`: Length of the performance including repeats
/// - `tracks`: Events per enabled instrument, in emission order
///
/// Every enabled instrument has an entry, even when it holds no events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub tempo: u16,
    pub time_signature: TimeSignature,
    pub total_beats: u32,
    pub tracks: BTreeMap<Instrument, Vec<NoteEvent>>,
}

impl Performance {
    /// Events of one instrument; empty when the instrument is disabled.
    pub fn track(&self, instrument: Instrument) -> &[NoteEvent] {
        self.tracks
            .get(&instrument)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn event_count(&self) -> usize {
        self.tracks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.event_count() == 0
    }

    /// Length of the performance in seconds at its tempo.
    pub fn duration_seconds(&self) -> f64 {
        self.total_beats as f64 * 60.0 / self.tempo as f64
    }

    /// Serialize as a JSON event list.
    ///
    /// ```
    /// use backline::{render_chart, Performance, RenderConfig};
    ///
    /// let performance = render_chart("| C | G |", &RenderConfig::default())?;
    /// let json = performance.to_json()?;
    /// assert_eq!(Performance::from_json(&json)?, performance);
    /// # Ok::<(), backline::BacklineError>(())
    /// ```
    pub fn to_json(&self) -> Result<String, BacklineError> {
        serde_json::to_string_pretty(self).map_err(|e| BacklineError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, BacklineError> {
        serde_json::from_str(json).map_err(|e| BacklineError::Serialization(e.to_string()))
    }
}
