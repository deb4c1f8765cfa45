use super::*;
use crate::patterns::drums::{CLOSED_HIHAT, RIDE};
use crate::pitch::{PitchResolver, PitchSet};
use crate::{ensure_score, parse_chart, ChordSymbol, Measure, Metadata, RenderConfig, Score, TimeSignature};
use pretty_assertions::assert_eq;

fn chart(source: &str) -> Score {
    parse_chart(source).unwrap()
}

fn starts(events: &[NoteEvent]) -> Vec<f64> {
    events.iter().map(|e| e.start).collect()
}

fn pitches(events: &[NoteEvent]) -> Vec<u8> {
    events.iter().map(|e| e.pitch).collect()
}

#[test]
fn test_swing_end_to_end() {
    let score = chart("| Dm7 | G7 | C^7 | A7b9 |");
    let config = RenderConfig::new("swing").with_tempo(160);
    let performance = render(&score, &config).unwrap();

    assert_eq!(performance.tempo, 160);
    assert_eq!(performance.total_beats, 16);

    // One walking-bass cluster per measure, anchored on the downbeat
    let bass = performance.track(Instrument::Bass);
    for (bar, anchor) in [0.0, 4.0, 8.0, 12.0].iter().enumerate() {
        let cluster: Vec<&NoteEvent> = bass
            .iter()
            .filter(|e| e.start >= *anchor && e.start < anchor + 4.0)
            .collect();
        assert!(!cluster.is_empty(), "bar {} has no bass", bar);
        assert_eq!(cluster[0].start, *anchor);
    }
    assert_eq!(bass.len(), 16);

    // Ride groove in every bar
    let drums = performance.track(Instrument::Drums);
    for bar in 0..4 {
        let low = bar as f64 * 4.0;
        assert!(drums
            .iter()
            .any(|e| e.pitch == RIDE && e.start >= low && e.start < low + 4.0));
    }
}

#[test]
fn test_walking_bass_register() {
    let performance = render(&chart("| C |"), &RenderConfig::default()).unwrap();
    let bass = performance.track(Instrument::Bass);
    assert_eq!(pitches(bass), vec![36, 40, 43, 47]);
    assert_eq!(starts(bass), vec![0.0, 1.0, 2.0, 3.0]);
    assert!(bass.iter().all(|e| e.channel == 0));
}

#[test]
fn test_repeats_scale_event_count() {
    let score = chart("| C | Am | F | G7 |");
    let once = render(&score, &RenderConfig::new("bossa")).unwrap();
    let four = render(&score, &RenderConfig::new("bossa").with_repeats(4)).unwrap();

    for instrument in Instrument::ALL {
        assert_eq!(
            four.track(instrument).len(),
            4 * once.track(instrument).len(),
            "{}",
            instrument
        );
    }
    assert_eq!(four.total_beats, 64);

    // The second pass starts where the first ended
    let second_pass: Vec<f64> = four
        .track(Instrument::Bass)
        .iter()
        .skip(once.track(Instrument::Bass).len())
        .map(|e| e.start - 16.0)
        .collect();
    assert_eq!(second_pass[..3], starts(once.track(Instrument::Bass))[..3]);
}

#[test]
fn test_render_is_deterministic() {
    let score = chart("| Dm7 G7 | C^7 | Fm7 Bb7 | Eb^7 |");
    let config = RenderConfig::new("funk").with_repeats(2);
    let first = render(&score, &config).unwrap();
    let second = render(&score, &config).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn test_empty_score_gives_empty_tracks() {
    let score = Score::new(vec![], Metadata::default());
    for repeats in [0, 1, 5] {
        let performance = render(&score, &RenderConfig::default().with_repeats(repeats)).unwrap();
        assert_eq!(performance.tracks.len(), 3);
        assert!(performance.tracks.values().all(Vec::is_empty));
        assert_eq!(performance.total_beats, 0);
    }
}

#[test]
fn test_zero_repeats_renders_nothing() {
    let performance = render(&chart("| C | G |"), &RenderConfig::default().with_repeats(0)).unwrap();
    assert!(performance.is_empty());
}

#[test]
fn test_unknown_style_renders_as_swing() {
    let score = chart("| C | Am | F | G |");
    let unknown = render(&score, &RenderConfig::new("polka")).unwrap();
    let swing = render(&score, &RenderConfig::new("swing")).unwrap();
    assert_eq!(unknown, swing);
}

#[test]
fn test_disabled_instruments_have_no_track() {
    let config = RenderConfig::default().without(Instrument::Piano).without(Instrument::Drums);
    let performance = render(&chart("| C | G |"), &config).unwrap();
    assert_eq!(performance.tracks.keys().copied().collect::<Vec<_>>(), vec![Instrument::Bass]);
    assert!(performance.track(Instrument::Piano).is_empty());
}

#[test]
fn test_channels_are_distinct() {
    let performance = render(&chart("| C | G |"), &RenderConfig::default()).unwrap();
    for instrument in Instrument::ALL {
        let events = performance.track(instrument);
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e.channel == instrument.channel()));
    }
    assert_eq!(Instrument::Drums.channel(), 9);
}

#[test]
fn test_velocity_scaling() {
    let config = RenderConfig::default().with_volume(Instrument::Drums, 0.5);
    let performance = render(&chart("| C |"), &config).unwrap();
    let first_ride = performance.track(Instrument::Drums)[0];
    assert_eq!(first_ride.pitch, RIDE);
    assert_eq!(first_ride.velocity, 45);

    assert_eq!(scale_velocity(0, 1.0), 0);
    assert_eq!(scale_velocity(127, 0.0), 0);
    for base in [0u8, 1, 63, 64, 100, 127] {
        for step in 0..=20 {
            let volume = step as f64 / 20.0;
            assert!(scale_velocity(base, volume) <= 127);
        }
    }
}

#[test]
fn test_silent_volume_keeps_events() {
    let config = RenderConfig::default().with_volume(Instrument::Bass, 0.0);
    let performance = render(&chart("| C |"), &config).unwrap();
    let bass = performance.track(Instrument::Bass);
    assert_eq!(bass.len(), 4);
    assert!(bass.iter().all(|e| e.velocity == 0));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = RenderConfig::default().with_volume(Instrument::Piano, 1.2);
    assert!(matches!(
        render(&chart("| C |"), &config),
        Err(crate::BacklineError::InvalidConfig(_))
    ));
}

#[test]
fn test_rest_slice_is_silent() {
    let score = ensure_score(vec![vec!["C", "N.C."]], &Metadata::default()).unwrap();
    let performance = render(&score, &RenderConfig::new("rock")).unwrap();
    assert_eq!(performance.total_beats, 4);
    for instrument in Instrument::ALL {
        assert!(performance.track(instrument).iter().all(|e| e.start < 2.0), "{}", instrument);
    }
}

#[test]
fn test_uneven_split_covers_every_beat() {
    let performance = render(&chart("| C F G |"), &RenderConfig::new("rock")).unwrap();
    let bass = performance.track(Instrument::Bass);
    assert_eq!(starts(bass), vec![0.0, 1.0, 2.0, 3.0]);
    // C C | F | G, each on its own root
    assert_eq!(pitches(bass), vec![36, 36, 41, 43]);
}

#[test]
fn test_bass_clipped_at_slice_end() {
    let performance = render(&chart("| C F G E |"), &RenderConfig::new("ballad")).unwrap();
    let bass = performance.track(Instrument::Bass);
    assert_eq!(bass.len(), 4);
    assert!(bass.iter().all(|e| e.duration == 1.0));
    assert!(bass.windows(2).all(|pair| pair[0].end() <= pair[1].start));
}

#[test]
fn test_only_entries_inside_slice_play() {
    // Two chords per bar: the swing ride on beats 2 and 3 belongs to the second chord
    let performance = render(&chart("| C G |"), &RenderConfig::default()).unwrap();
    let ride: Vec<f64> = performance
        .track(Instrument::Drums)
        .iter()
        .filter(|e| e.pitch == RIDE)
        .map(|e| e.start)
        .collect();
    assert_eq!(ride, vec![0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn test_swing_comping_block_chords() {
    let performance = render(&chart("| Dm7 |"), &RenderConfig::default()).unwrap();
    let piano = performance.track(Instrument::Piano);
    // D-7 voiced as C4 D4 F4 A4 on the "and" of 2 and 4
    assert_eq!(pitches(piano), vec![60, 62, 65, 69, 60, 62, 65, 69]);
    assert_eq!(starts(piano), vec![1.5, 1.5, 1.5, 1.5, 3.5, 3.5, 3.5, 3.5]);
    assert!(piano.iter().all(|e| e.channel == 1));
}

#[test]
fn test_ballad_comping_arpeggiates() {
    let performance = render(&chart("| C |"), &RenderConfig::new("ballad")).unwrap();
    let piano = performance.track(Instrument::Piano);
    assert_eq!(piano.len(), 8);
    assert_eq!(pitches(piano), vec![60, 64, 67, 60, 64, 67, 60, 64]);
    assert_eq!(starts(piano), vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5]);
}

#[test]
fn test_rock_comping_falls_back_to_block_chords() {
    let performance = render(&chart("| C |"), &RenderConfig::new("rock")).unwrap();
    let piano = performance.track(Instrument::Piano);
    assert_eq!(piano.len(), 12);
    assert_eq!(starts(piano)[..3], [0.0, 0.0, 0.0]);
    assert_eq!(piano[11].start, 3.0);
    assert!(piano.iter().all(|e| e.duration == 0.9));
    assert_eq!(piano[0].velocity, scale_velocity(90, 0.7));
}

#[test]
fn test_waltz_sustains_one_chord_per_bar() {
    let source = "---\ntime-signature: 3/4\n---\n| C | G7 |";
    let performance = render(&chart(source), &RenderConfig::new("waltz")).unwrap();
    assert_eq!(performance.total_beats, 6);
    assert_eq!(performance.time_signature, TimeSignature::new(3, 4));

    let piano = performance.track(Instrument::Piano);
    assert_eq!(starts(piano), vec![0.0, 0.0, 0.0, 3.0, 3.0, 3.0, 3.0]);
    assert!(piano.iter().all(|e| (e.duration - 2.7).abs() < 1e-9));

    let bass = performance.track(Instrument::Bass);
    assert_eq!(starts(bass), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn test_waltz_groove_in_four_four_stays_inside_bar() {
    let performance = render(&chart("| C |"), &RenderConfig::new("waltz")).unwrap();
    assert!(performance.track(Instrument::Drums).iter().all(|e| e.start < 3.0));
    assert_eq!(performance.total_beats, 4);
}

#[test]
fn test_pattern_variant_selection() {
    let score = chart("| C |");
    let driving = render(&score, &RenderConfig::new("rock").with_variant(1)).unwrap();
    assert_eq!(driving.track(Instrument::Bass).len(), 8);

    let brushes = render(&score, &RenderConfig::new("swing").with_variant(1)).unwrap();
    assert!(brushes.track(Instrument::Drums).iter().any(|e| e.pitch == CLOSED_HIHAT));

    // Out of range uses the first template
    let fallback = render(&score, &RenderConfig::new("rock").with_variant(7)).unwrap();
    let basic = render(&score, &RenderConfig::new("rock")).unwrap();
    assert_eq!(fallback, basic);
}

struct OctaveUp;

impl PitchResolver for OctaveUp {
    fn resolve(&self, chord: &ChordSymbol) -> PitchSet {
        crate::pitch::chord_to_pitches(chord.as_str())
            .into_iter()
            .map(|p| p + 12)
            .collect()
    }
}

#[test]
fn test_custom_resolver() {
    let score = Score::new(vec![Measure::new(vec![ChordSymbol::new("D")])], Metadata::default());
    let config = RenderConfig::default();
    let custom = Arranger::with_resolver(OctaveUp).arrange(&score, &config);
    let builtin = Arranger::new().arrange(&score, &config);
    // Registers are fixed, so an octave shift in the resolver changes nothing
    assert_eq!(custom, builtin);
}

#[test]
fn test_unknown_quality_still_renders() {
    let performance = render(&chart("| Cxyz |"), &RenderConfig::default()).unwrap();
    assert_eq!(pitches(performance.track(Instrument::Bass)), vec![36, 40, 43, 47]);
}

#[test]
fn test_json_round_trip() {
    let performance = render(&chart("| C | G7 |"), &RenderConfig::new("latin")).unwrap();
    let json = performance.to_json().unwrap();
    assert!(json.contains("\"totalBeats\""));
    assert!(json.contains("\"drums\""));
    assert_eq!(Performance::from_json(&json).unwrap(), performance);
}

#[test]
fn test_json_rejects_garbage() {
    assert!(matches!(
        Performance::from_json("{not json"),
        Err(crate::BacklineError::Serialization(_))
    ));
}
