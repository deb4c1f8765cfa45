pub mod backend;
pub mod chord;
pub mod config;
pub mod error;
pub mod ireal;
pub mod midi;
pub mod mma;
pub mod patterns;
pub mod pitch;
pub mod playback;
pub mod progression;
pub mod score;

pub use backend::{
    generate_midi_file, generate_midi_file_with, select_backend, Backend, BackendKind, BuiltinBackend,
    Capabilities,
};
pub use chord::{normalize_chord_symbol, ChordSymbol};
pub use config::{InstrumentConfig, InstrumentSettings, RenderConfig};
pub use error::*;
pub use ireal::ExternalChartParser;
pub use patterns::{patterns_for, Style};
pub use pitch::chord_to_pitches;
pub use playback::{render, Arranger, Instrument, NoteEvent, Performance};
pub use progression::{parse_chart, parse_chart_with_defaults, parse_progression};
pub use score::{ensure_score, ensure_score_with, Measure, Metadata, Score, ScoreInput, TimeSignature};

/// Render chart text (or a chart URL) to a performance.
/// This is the main entry point for the library.
pub fn render_chart(source: &str, config: &RenderConfig) -> Result<Performance, BacklineError> {
    config.validate()?;
    let score = ensure_score(source, &Metadata::default())?;
    render(&score, config)
}

/// Render chart text straight to Standard MIDI File bytes with the built-in backend.
pub fn render_chart_to_midi(source: &str, config: &RenderConfig) -> Result<Vec<u8>, BacklineError> {
    let score = ensure_score(source, &Metadata::default())?;
    BuiltinBackend.render(&score, config)
}
