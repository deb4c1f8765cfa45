//! Arrangement engine
//!
//! Walks a score bar by bar and expands the style's templates into absolute
//! note events for every enabled instrument.

use std::collections::BTreeMap;

use super::types::{Instrument, NoteEvent, Performance};
use crate::chord::ChordSymbol;
use crate::config::{InstrumentConfig, RenderConfig};
use crate::error::BacklineError;
use crate::patterns::{
    BassPattern, CompFallback, CompVoicing, CompingPattern, DrumPattern, Style, StylePatterns,
};
use crate::pitch::{PitchResolver, PitchSet, TableResolver};
use crate::score::Score;

/// Length of every drum hit, in beats.
const DRUM_HIT_BEATS: f64 = 0.25;

/// Lowest note of the bass register (C2).
const BASS_REGISTER: u8 = 36;

/// Lowest note of the comping register (C4).
const COMP_REGISTER: u8 = 60;

/// Most chord tones the comping instrument plays at once.
const MAX_VOICES: usize = 4;

/// Base velocity and note length of the structural comping fallback.
const FALLBACK_COMP_VELOCITY: u8 = 90;
const FALLBACK_COMP_LENGTH: f64 = 0.9;

/// Scale a template velocity by an instrument volume.
///
/// ```
/// use backline::playback::scale_velocity;
///
/// assert_eq!(scale_velocity(100, 0.8), 80);
/// assert_eq!(scale_velocity(75, 0.5), 38);
/// assert_eq!(scale_velocity(127, 1.0), 127);
/// ```
pub fn scale_velocity(base: u8, volume: f64) -> u8 {
    (base as f64 * volume).round().clamp(0.0, 127.0) as u8
}

/// Pick the configured template variant, falling back to the first.
fn pick<T>(templates: &[T], variant: usize) -> Option<&T> {
    templates.get(variant).or_else(|| templates.first())
}

/// Turns scores into performances.
///
/// The arranger holds no state between calls; one instance can render any
/// number of scores, and the same inputs always give the same events.
///
/// # Example
/// ```rust
/// use backline::{parse_chart, Arranger, Instrument, RenderConfig};
///
/// let score = parse_chart("| Dm7 | G7 | C^7 | A7b9 |")?;
/// let performance = Arranger::new().arrange(&score, &RenderConfig::new("swing").with_tempo(160));
///
/// assert_eq!(performance.total_beats, 16);
/// assert_eq!(performance.track(Instrument::Bass).len(), 16);
/// # Ok::<(), backline::BacklineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Arranger<R = TableResolver> {
    resolver: R,
}

impl Arranger<TableResolver> {
    pub fn new() -> Self {
        Self {
            resolver: TableResolver,
        }
    }
}

impl<R: PitchResolver> Arranger<R> {
    /// Use a different chord-to-pitch resolver.
    pub fn with_resolver(resolver: R) -> Self {
        Self { resolver }
    }

    /// Render a score with a configuration that has already been validated.
    ///
    /// Volumes outside `[0.0, 1.0]` still produce legal velocities here; use
    /// [`render`] to have the configuration checked first.
    pub fn arrange(&self, score: &Score, config: &RenderConfig) -> Performance {
        let style = config.style();
        let templates = Templates::select(style, config.variant);
        let beats_per_bar = score.beats_per_bar();

        let mut tracks: BTreeMap<Instrument, Vec<NoteEvent>> = config
            .enabled_instruments()
            .map(|instrument| (instrument, Vec::new()))
            .collect();

        let mut cursor = 0u32;
        for _ in 0..config.repeats {
            for measure in score.iter() {
                let mut offset = 0u32;
                for (chord, beats) in measure.chords.iter().zip(measure.slice_beats(beats_per_bar)) {
                    let slice = Slice {
                        start: (cursor + offset) as f64,
                        beats: beats as f64,
                    };
                    offset += beats;

                    if chord.is_rest() || beats == 0 {
                        continue;
                    }

                    let pitches = self.resolver.resolve(chord);
                    for (instrument, events) in tracks.iter_mut() {
                        let mix = config.instruments.get(*instrument);
                        templates.expand(*instrument, &slice, chord, &pitches, mix, events);
                    }
                }
                cursor += beats_per_bar;
            }
        }

        let performance = Performance {
            tempo: config.tempo,
            time_signature: score.metadata.time_signature,
            total_beats: cursor,
            tracks,
        };

        tracing::debug!(
            style = style.name(),
            measures = score.len(),
            repeats = config.repeats,
            events = performance.event_count(),
            "arranged score"
        );

        performance
    }
}

/// Validate the configuration, then arrange with the built-in resolver.
///
/// # Errors
/// [`BacklineError::InvalidConfig`] when the configuration is out of range.
pub fn render(score: &Score, config: &RenderConfig) -> Result<Performance, BacklineError> {
    config.validate()?;
    Ok(Arranger::new().arrange(score, config))
}

/// Span of beats one chord owns.
#[derive(Debug, Clone, Copy)]
struct Slice {
    start: f64,
    beats: f64,
}

/// Templates chosen for one render.
struct Templates {
    style: Style,
    drums: Option<&'static DrumPattern>,
    bass: Option<&'static BassPattern>,
    comp: Option<&'static CompingPattern>,
}

impl Templates {
    fn select(style: Style, variant: usize) -> Self {
        let StylePatterns { drums, bass, comp } = style.patterns();
        Self {
            style,
            drums: pick(drums, variant),
            bass: pick(bass, variant),
            comp: pick(comp, variant),
        }
    }

    fn expand(
        &self,
        instrument: Instrument,
        slice: &Slice,
        chord: &ChordSymbol,
        pitches: &PitchSet,
        mix: &InstrumentConfig,
        events: &mut Vec<NoteEvent>,
    ) {
        let channel = instrument.channel();
        match instrument {
            Instrument::Drums => {
                if let Some(groove) = self.drums {
                    expand_drums(groove, slice, mix.volume, channel, events);
                }
            }
            Instrument::Bass => {
                if let Some(line) = self.bass {
                    expand_bass(line, slice, pitches, mix.volume, channel, events);
                }
            }
            Instrument::Piano => {
                let voicing = comp_voicing(pitches);
                match self.comp {
                    Some(pattern) => expand_comp(pattern, slice, &voicing, mix.volume, channel, events),
                    None => {
                        tracing::trace!(chord = %chord, style = %self.style, "structural comping");
                        expand_comp_fallback(
                            self.style.comp_fallback(),
                            slice,
                            &voicing,
                            mix.volume,
                            channel,
                            events,
                        )
                    }
                }
            }
        }
    }
}

fn expand_drums(
    groove: &DrumPattern,
    slice: &Slice,
    volume: f64,
    channel: u8,
    events: &mut Vec<NoteEvent>,
) {
    for hit in groove.hits.iter().filter(|hit| hit.beat < slice.beats) {
        events.push(NoteEvent {
            start: slice.start + hit.beat,
            pitch: hit.drum,
            duration: DRUM_HIT_BEATS,
            velocity: scale_velocity(hit.velocity, volume),
            channel,
        });
    }
}

fn expand_bass(
    line: &BassPattern,
    slice: &Slice,
    pitches: &PitchSet,
    volume: f64,
    channel: u8,
    events: &mut Vec<NoteEvent>,
) {
    let root = pitches.first().copied().unwrap_or(BASS_REGISTER) % 12 + BASS_REGISTER;

    for note in line.notes.iter().filter(|note| note.beat < slice.beats) {
        // Never ring past the end of the chord
        let duration = note.duration.min(slice.beats - note.beat);
        events.push(NoteEvent {
            start: slice.start + note.beat,
            pitch: (root as i16 + note.offset as i16).clamp(0, 127) as u8,
            duration,
            velocity: scale_velocity(note.velocity, volume),
            channel,
        });
    }
}

/// Up to four chord tones moved into the comping register, lowest first.
fn comp_voicing(pitches: &PitchSet) -> Vec<u8> {
    let mut voicing: Vec<u8> = pitches
        .iter()
        .take(MAX_VOICES)
        .map(|pitch| pitch % 12 + COMP_REGISTER)
        .collect();
    voicing.sort_unstable();
    voicing.dedup();
    voicing
}

fn expand_comp(
    pattern: &CompingPattern,
    slice: &Slice,
    voicing: &[u8],
    volume: f64,
    channel: u8,
    events: &mut Vec<NoteEvent>,
) {
    if voicing.is_empty() {
        return;
    }

    let hits = pattern.hits.iter().filter(|hit| hit.beat < slice.beats);
    for (index, hit) in hits.enumerate() {
        let start = slice.start + hit.beat;
        let velocity = scale_velocity(hit.velocity, volume);
        match pattern.voicing {
            CompVoicing::Block => {
                for pitch in voicing {
                    events.push(NoteEvent {
                        start,
                        pitch: *pitch,
                        duration: hit.duration,
                        velocity,
                        channel,
                    });
                }
            }
            CompVoicing::Arpeggio => {
                events.push(NoteEvent {
                    start,
                    pitch: voicing[index % voicing.len()],
                    duration: hit.duration,
                    velocity,
                    channel,
                });
            }
        }
    }
}

fn expand_comp_fallback(
    fallback: CompFallback,
    slice: &Slice,
    voicing: &[u8],
    volume: f64,
    channel: u8,
    events: &mut Vec<NoteEvent>,
) {
    let velocity = scale_velocity(FALLBACK_COMP_VELOCITY, volume);
    let strikes: Vec<(f64, f64)> = match fallback {
        CompFallback::EveryBeat => (0..slice.beats as u32)
            .map(|beat| (beat as f64, FALLBACK_COMP_LENGTH))
            .collect(),
        CompFallback::Sustain => vec![(0.0, slice.beats * FALLBACK_COMP_LENGTH)],
    };

    for (beat, duration) in strikes {
        for pitch in voicing {
            events.push(NoteEvent {
                start: slice.start + beat,
                pitch: *pitch,
                duration,
                velocity,
                channel,
            });
        }
    }
}
