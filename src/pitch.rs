//! Chord-to-pitch resolution
//!
//! Turns a canonical chord symbol into MIDI note numbers for the arranger.
//! Roots are placed in the C3 octave (MIDI 48-59) before intervals are added;
//! the arranger moves the result into each instrument's register.

use crate::chord::{normalize_quality, split_root, ChordSymbol};

/// Ordered MIDI pitches realizing one chord. The first entry is always the root.
pub type PitchSet = Vec<u8>;

/// Octave the root is placed in (C3 = 48).
const REFERENCE_OCTAVE: i16 = 3;

const MAJOR_TRIAD: &[i16] = &[0, 4, 7];

const INTERVALS: &[(&str, &[i16])] = &[
    ("", MAJOR_TRIAD),
    ("^", MAJOR_TRIAD),
    ("-", &[0, 3, 7]),
    ("-7", &[0, 3, 7, 10]),
    ("7", &[0, 4, 7, 10]),
    ("6", &[0, 4, 7, 9]),
    ("-6", &[0, 3, 7, 9]),
    ("^7", &[0, 4, 7, 11]),
    ("-^7", &[0, 3, 7, 11]),
    ("o", &[0, 3, 6]),
    ("o7", &[0, 3, 6, 9]),
    ("h", &[0, 3, 6, 10]),
    ("h7", &[0, 3, 6, 10]),
    ("sus", &[0, 5, 7]),
    ("sus2", &[0, 2, 7]),
    ("+", &[0, 4, 8]),
    ("9", &[0, 4, 7, 10, 14]),
    ("-9", &[0, 3, 7, 10, 14]),
    ("^9", &[0, 4, 7, 11, 14]),
];

/// Maps a chord symbol to concrete pitches.
///
/// Implementations must be total: every symbol yields at least a triad, with
/// the root first. [`TableResolver`] is the built-in implementation; a richer
/// theory engine can be swapped in through [`crate::Arranger::with_resolver`].
pub trait PitchResolver {
    fn resolve(&self, chord: &ChordSymbol) -> PitchSet;
}

/// Fixed interval-table resolver. Needs nothing beyond this module.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableResolver;

impl PitchResolver for TableResolver {
    fn resolve(&self, chord: &ChordSymbol) -> PitchSet {
        chord_to_pitches(chord.as_str())
    }
}

/// Resolve a chord symbol string into MIDI pitches.
///
/// The symbol is normalized first, so any accepted spelling works. A slash bass
/// is ignored; unknown qualities fall back to a major triad. Trailing
/// alterations (`b9`, `#11`) are dropped when the full quality is not in the
/// table, so `A7b9` sounds as `A7`.
///
/// # Examples
/// ```
/// use backline::pitch::chord_to_pitches;
///
/// // C major: C3, E3, G3
/// assert_eq!(chord_to_pitches("C"), vec![48, 52, 55]);
///
/// // D minor seventh: D3, F3, A3, C4
/// assert_eq!(chord_to_pitches("Dm7"), vec![50, 53, 57, 60]);
///
/// // Unknown quality is a major triad
/// assert_eq!(chord_to_pitches("Cxyz"), chord_to_pitches("C"));
/// ```
///
/// # MIDI Note Reference
/// - C3 = 48, D3 = 50, E3 = 52, F3 = 53, G3 = 55, A3 = 57, B3 = 59
pub fn chord_to_pitches(symbol: &str) -> PitchSet {
    let canonical = ChordSymbol::new(symbol);
    let head = canonical.as_str().split('/').next().unwrap_or("");
    let (root, quality) = split_root(head);

    let root_midi = note_to_midi(root, REFERENCE_OCTAVE);
    chord_intervals(quality)
        .iter()
        .map(|interval| (root_midi + interval).clamp(0, 127) as u8)
        .collect()
}

/// Interval table lookup, falling back to a major triad.
///
/// An altered quality that is not in the table is retried without its
/// alterations, in canonical spelling (`m7b9` becomes `-7`).
pub fn chord_intervals(quality: &str) -> &'static [i16] {
    lookup(quality)
        .or_else(|| {
            let stem = strip_alterations(quality);
            lookup(stem).or_else(|| lookup(&normalize_quality(stem)))
        })
        .unwrap_or(MAJOR_TRIAD)
}

fn lookup(quality: &str) -> Option<&'static [i16]> {
    INTERVALS
        .iter()
        .find(|(name, _)| *name == quality)
        .map(|(_, intervals)| *intervals)
}

/// Drop trailing `b9` / `#11` style alterations.
fn strip_alterations(quality: &str) -> &str {
    let mut end = quality.len();
    loop {
        let head = &quality[..end];
        let digits_start = head.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        if digits_start == end {
            break;
        }
        let before = &head[..digits_start];
        if before.ends_with('b') || before.ends_with('#') {
            end = digits_start - 1;
        } else {
            break;
        }
    }
    &quality[..end]
}

/// MIDI note for a note name (`C`, `F#`, `Bb`) in the given octave.
/// Unknown names resolve to C.
///
/// ```
/// use backline::pitch::note_to_midi;
///
/// assert_eq!(note_to_midi("C", 4), 60);
/// assert_eq!(note_to_midi("Bb", 3), 58);
/// ```
pub fn note_to_midi(name: &str, octave: i16) -> i16 {
    (octave + 1) * 12 + pitch_class(name)
}

/// Pitch class 0-11 (may be -1 or 12 for `Cb` / `B#`).
pub fn pitch_class(name: &str) -> i16 {
    let mut chars = name.chars();
    let natural = match chars.next() {
        Some('C') => 0,
        Some('D') => 2,
        Some('E') => 4,
        Some('F') => 5,
        Some('G') => 7,
        Some('A') => 9,
        Some('B') => 11,
        _ => 0,
    };
    let accidental = match chars.next() {
        Some('#') => 1,
        Some('b') => -1,
        _ => 0,
    };
    natural + accidental
}
