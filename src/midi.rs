//! Standard MIDI File export
//!
//! Writes a [`Performance`] as a format 1 SMF using `midly`: one track per
//! instrument, each opening with its name, the tempo and the time signature,
//! then a program change for melodic instruments, then the notes.

use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};
use std::path::Path;

use crate::error::BacklineError;
use crate::playback::{Instrument, NoteEvent, Performance};

/// Largest resolution a metrical SMF header can carry.
const MAX_PPQ: u16 = 0x7FFF;

/// Beat position to absolute ticks.
fn beat_to_tick(beat: f64, ppq: u16) -> u32 {
    (beat * ppq as f64).round().max(0.0) as u32
}

/// Encode a performance as Standard MIDI File bytes.
///
/// Notes with velocity 0 are left out: a note-on with velocity 0 means
/// note-off on the wire.
///
/// # Example
/// ```
/// use backline::{midi, render_chart, RenderConfig};
///
/// let performance = render_chart("| C | G |", &RenderConfig::default())?;
/// let bytes = midi::to_smf_bytes(&performance, 480)?;
/// assert_eq!(&bytes[..4], b"MThd");
/// # Ok::<(), backline::BacklineError>(())
/// ```
///
/// # Errors
/// [`BacklineError::Serialization`] if `ppq` is 0, the time signature cannot be
/// written (zero beats, or a beat unit that is not a power of two) or the file
/// cannot be encoded.
pub fn to_smf_bytes(performance: &Performance, ppq: u16) -> Result<Vec<u8>, BacklineError> {
    if ppq == 0 {
        return Err(BacklineError::Serialization(
            "ppq must be greater than 0".to_string(),
        ));
    }
    let ppq = ppq.min(MAX_PPQ);
    performance
        .time_signature
        .validate()
        .map_err(|e| BacklineError::Serialization(e.to_string()))?;

    let header = Header {
        format: Format::Parallel,
        timing: Timing::Metrical(ppq.into()),
    };

    let end_tick = beat_to_tick(performance.total_beats as f64, ppq);
    let tracks = performance
        .tracks
        .iter()
        .map(|(instrument, events)| build_track(*instrument, events, performance, ppq, end_tick))
        .collect();

    let smf = Smf { header, tracks };

    let mut bytes = Vec::new();
    smf.write(&mut bytes)
        .map_err(|e| BacklineError::Serialization(format!("Failed to write MIDI: {}", e)))?;

    tracing::debug!(
        tracks = performance.tracks.len(),
        bytes = bytes.len(),
        "encoded standard midi file"
    );
    Ok(bytes)
}

/// Encode and write to `path`.
pub fn write_smf(performance: &Performance, ppq: u16, path: impl AsRef<Path>) -> Result<(), BacklineError> {
    let bytes = to_smf_bytes(performance, ppq)?;
    std::fs::write(path.as_ref(), bytes)?;
    tracing::info!(path = %path.as_ref().display(), "wrote midi file");
    Ok(())
}

fn build_track<'a>(
    instrument: Instrument,
    notes: &[NoteEvent],
    performance: &Performance,
    ppq: u16,
    end_tick: u32,
) -> Track<'a> {
    let mut track = Track::new();
    let channel = instrument.channel();

    add_meta(&mut track, MetaMessage::TrackName(instrument.name().as_bytes()));
    add_meta(&mut track, MetaMessage::Tempo(tempo_micros(performance.tempo).into()));
    add_meta(&mut track, time_signature(performance));

    if let Some(program) = instrument.program() {
        track.push(TrackEvent {
            delta: 0u32.into(),
            kind: TrackEventKind::Midi {
                channel: channel.into(),
                message: MidiMessage::ProgramChange {
                    program: program.into(),
                },
            },
        });
    }

    // (tick, note-off first at equal ticks, message)
    let mut events: Vec<(u32, u8, MidiMessage)> = Vec::with_capacity(notes.len() * 2);
    for note in notes.iter().filter(|note| note.velocity > 0) {
        let on = beat_to_tick(note.start, ppq);
        let off = beat_to_tick(note.end(), ppq).max(on + 1);
        let key = note.pitch.min(127);
        events.push((
            on,
            1,
            MidiMessage::NoteOn {
                key: key.into(),
                vel: note.velocity.min(127).into(),
            },
        ));
        events.push((
            off,
            0,
            MidiMessage::NoteOff {
                key: key.into(),
                vel: 0u8.into(),
            },
        ));
    }
    events.sort_by_key(|(tick, order, _)| (*tick, *order));

    let mut last_tick = 0;
    for (tick, _, message) in events {
        track.push(TrackEvent {
            delta: (tick - last_tick).into(),
            kind: TrackEventKind::Midi {
                channel: channel.into(),
                message,
            },
        });
        last_tick = tick;
    }

    track.push(TrackEvent {
        delta: end_tick.saturating_sub(last_tick).into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    track
}

fn add_meta<'a>(track: &mut Track<'a>, message: MetaMessage<'a>) {
    track.push(TrackEvent {
        delta: 0u32.into(),
        kind: TrackEventKind::Meta(message),
    });
}

/// Microseconds per quarter note.
fn tempo_micros(bpm: u16) -> u32 {
    60_000_000 / bpm.max(1) as u32
}

fn time_signature<'a>(performance: &Performance) -> MetaMessage<'a> {
    let ts = performance.time_signature;
    // Denominator is stored as a power of two
    let denominator = ts.beat_unit.max(1).trailing_zeros() as u8;
    MetaMessage::TimeSignature(ts.beats_per_bar, denominator, 24, 8)
}
