//! MMA script export
//!
//! Builds the text input for the external Musical MIDI Accompaniment tool.
//! Running the tool is the caller's business; this module only writes the
//! script, so a host can hand it to `mma` when that backend is available.
//!
//! ## Script Layout
//! ```text
//! // Generated by backline
//! // Autumn Leaves
//!
//! Tempo 120
//! TimeSig 4/4
//! KeySig G
//!
//! Groove Swing
//!
//! DrumVolume 80
//! BassVolume 90
//! ChordVolume 70
//!
//! 1 Am7
//! 2 D7
//! ```

use crate::chord::{split_root, ChordSymbol};
use crate::config::RenderConfig;
use crate::patterns::Style;
use crate::playback::Instrument;
use crate::score::Score;

/// Canonical quality prefixes and their MMA spelling, longest first.
const MMA_QUALITIES: &[(&str, &str)] = &[
    ("-^7", "mM7"),
    ("sus2", "sus2"),
    ("sus", "sus4"),
    ("^7", "maj7"),
    ("^9", "maj9"),
    ("-7", "m7"),
    ("-9", "m9"),
    ("h7", "m7b5"),
    ("o7", "dim7"),
    ("^", ""),
    ("-", "m"),
    ("h", "m7b5"),
    ("o", "dim"),
    ("+", "aug"),
];

/// MMA groove library name for a style.
pub fn groove_name(style: Style) -> &'static str {
    match style {
        Style::Swing => "Swing",
        Style::Bossa => "BossaNova",
        Style::Rock => "Rock",
        Style::Ballad => "Ballad",
        Style::Funk => "Funk",
        Style::Latin => "Latin",
        Style::Waltz => "Waltz",
        Style::Blues => "Blues",
    }
}

/// MMA track that plays an instrument's part.
fn track_name(instrument: Instrument) -> &'static str {
    match instrument {
        Instrument::Drums => "Drum",
        Instrument::Bass => "Bass",
        Instrument::Piano => "Chord",
    }
}

/// Spell a canonical chord the way MMA reads it.
///
/// ```
/// use backline::mma::mma_chord;
/// use backline::ChordSymbol;
///
/// assert_eq!(mma_chord(&ChordSymbol::new("Dm7")), "Dm7");
/// assert_eq!(mma_chord(&ChordSymbol::new("Cmaj7/G")), "Cmaj7/G");
/// assert_eq!(mma_chord(&ChordSymbol::new("F#m7b5")), "F#m7b5");
/// assert_eq!(mma_chord(&ChordSymbol::new("N.C.")), "z");
/// ```
pub fn mma_chord(chord: &ChordSymbol) -> String {
    if chord.is_rest() {
        return "z".to_string();
    }

    let symbol = chord.as_str();
    let (head, bass) = match symbol.find('/') {
        Some(idx) => symbol.split_at(idx),
        None => (symbol, ""),
    };
    let (root, quality) = split_root(head);

    let quality = MMA_QUALITIES
        .iter()
        .find(|(canonical, _)| quality.starts_with(canonical))
        .map(|(canonical, spelled)| format!("{}{}", spelled, &quality[canonical.len()..]))
        .unwrap_or_else(|| quality.to_string());

    format!("{}{}{}", root, quality, bass)
}

/// Render a score and configuration as an MMA script.
///
/// Disabled instruments get no volume line. Repeats above one add a trailing
/// `Repeat N` directive.
///
/// # Example
/// ```
/// use backline::{mma, parse_chart, RenderConfig};
///
/// let score = parse_chart("| C | Am |")?;
/// let script = mma::to_mma_script(&score, &RenderConfig::new("bossa").with_tempo(140));
/// assert!(script.contains("Tempo 140"));
/// assert!(script.contains("Groove BossaNova"));
/// assert!(script.contains("2 Am"));
/// # Ok::<(), backline::BacklineError>(())
/// ```
pub fn to_mma_script(score: &Score, config: &RenderConfig) -> String {
    let metadata = &score.metadata;
    let mut lines = vec![
        "// Generated by backline".to_string(),
        format!("// {}", metadata.title),
        String::new(),
        format!("Tempo {}", config.tempo),
        format!(
            "TimeSig {}/{}",
            metadata.time_signature.beats_per_bar, metadata.time_signature.beat_unit
        ),
        format!("KeySig {}", metadata.key),
        String::new(),
        format!("Groove {}", groove_name(config.style())),
        String::new(),
    ];

    for instrument in config.enabled_instruments() {
        let volume = config.instruments.get(instrument).volume;
        lines.push(format!(
            "{}Volume {}",
            track_name(instrument),
            (volume * 100.0).round() as u32
        ));
    }
    lines.push(String::new());

    for (number, measure) in score.iter().enumerate() {
        let chords = if measure.chords.is_empty() {
            "z".to_string()
        } else {
            measure.chords.iter().map(mma_chord).collect::<Vec<_>>().join(" ")
        };
        lines.push(format!("{} {}", number + 1, chords));
    }

    if config.repeats > 1 {
        lines.push(String::new());
        lines.push(format!("Repeat {}", config.repeats));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{Measure, Metadata, TimeSignature};
    use crate::parse_chart;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_script() {
        let score = parse_chart("---\ntitle: Blue Bossa\nkey: C-\n---\n| Cm7 | Fm7 | Dm7b5 G7 |").unwrap();
        let config = RenderConfig::new("bossa").with_tempo(150).with_repeats(2);
        let expected = "\
// Generated by backline
// Blue Bossa

Tempo 150
TimeSig 4/4
KeySig C-

Groove BossaNova

DrumVolume 80
BassVolume 90
ChordVolume 70

1 Cm7
2 Fm7
3 Dm7b5 G7

Repeat 2";
        assert_eq!(to_mma_script(&score, &config), expected);
    }

    #[test]
    fn test_disabled_instruments_and_single_pass() {
        let score = parse_chart("| C |").unwrap();
        let config = RenderConfig::default().without(Instrument::Piano);
        let script = to_mma_script(&score, &config);
        assert!(script.contains("DrumVolume 80"));
        assert!(!script.contains("ChordVolume"));
        assert!(!script.contains("Repeat"));
    }

    #[test]
    fn test_unknown_style_uses_swing_groove() {
        let score = parse_chart("| C |").unwrap();
        assert!(to_mma_script(&score, &RenderConfig::new("polka")).contains("Groove Swing"));
    }

    #[test]
    fn test_every_style_has_a_groove() {
        let grooves: Vec<&str> = Style::ALL.iter().map(|s| groove_name(*s)).collect();
        assert_eq!(
            grooves,
            vec!["Swing", "BossaNova", "Rock", "Ballad", "Funk", "Latin", "Waltz", "Blues"]
        );
    }

    #[test]
    fn test_time_signature_and_rests() {
        let metadata = Metadata {
            time_signature: TimeSignature::new(3, 4),
            ..Metadata::default()
        };
        let score = Score::new(
            vec![
                Measure::new(vec![ChordSymbol::new("C")]),
                Measure::new(vec![ChordSymbol::rest()]),
                Measure::new(vec![]),
            ],
            metadata,
        );
        let script = to_mma_script(&score, &RenderConfig::new("waltz"));
        assert!(script.contains("TimeSig 3/4"));
        assert!(script.ends_with("1 C\n2 z\n3 z"));
    }

    #[test]
    fn test_chord_spelling() {
        let cases = [
            ("C", "C"),
            ("Cmaj", "C"),
            ("Cm", "Cm"),
            ("Cmaj9", "Cmaj9"),
            ("Cdim", "Cdim"),
            ("Cdim7", "Cdim7"),
            ("Caug", "Caug"),
            ("Csus4", "Csus4"),
            ("Csus2", "Csus2"),
            ("Cmmaj7", "CmM7"),
            ("C7b9", "C7b9"),
            ("Bb-7b5", "Bbm7b5"),
            ("Am/E", "Am/E"),
        ];
        for (raw, expected) in cases {
            assert_eq!(mma_chord(&ChordSymbol::new(raw)), expected, "{}", raw);
        }
    }
}
