//! # Score Model
//!
//! The canonical in-memory representation of a chord progression.
//!
//! ## Type Hierarchy
//! ```text
//! Score
//!   ├── Metadata (title, composer, key, time signature)
//!   └── Vec<Measure>
//!         └── Vec<ChordSymbol> (one or more, splitting the bar evenly)
//! ```
//!
//! ## Input Shapes
//! [`ensure_score`] coerces every supported input into a [`Score`]:
//! - an existing `Score` (returned as-is)
//! - chart text (`"| C | Am | F | G |"`, optionally with YAML frontmatter)
//! - a chart URL (`irealb://...`), see [`crate::ireal`]
//! - `(chord, beats)` pairs, grouped into bars
//! - flat chord symbols, one per bar
//! - pre-built measures
//!
//! A score is immutable once handed to the arranger; only metadata such as the
//! composer may be patched after construction.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::chord::{is_rest, ChordSymbol};
use crate::error::BacklineError;
use crate::ireal::{self, ExternalChartParser};
use crate::progression::{parse_chart_with_defaults, ChordStream};

/// Tolerance when deciding whether accumulated beats fill a bar.
const BAR_EPSILON: f64 = 1e-9;

/// Time signature (e.g., 4/4, 3/4, 6/8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub beats_per_bar: u8,
    pub beat_unit: u8,
}

impl TimeSignature {
    /// Unchecked; [`ensure_score`] and the MIDI writer call [`TimeSignature::validate`].
    pub fn new(beats_per_bar: u8, beat_unit: u8) -> Self {
        Self {
            beats_per_bar,
            beat_unit,
        }
    }

    /// At least one beat per bar, and a power-of-two beat unit.
    ///
    /// ```
    /// use backline::TimeSignature;
    ///
    /// assert!(TimeSignature::new(6, 8).validate().is_ok());
    /// assert!(TimeSignature::new(0, 4).validate().is_err());
    /// assert!(TimeSignature::new(4, 3).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), BacklineError> {
        if self.beats_per_bar == 0 {
            return Err(BacklineError::InvalidInput(
                "time signature needs at least one beat per bar".to_string(),
            ));
        }
        if !self.beat_unit.is_power_of_two() {
            return Err(BacklineError::InvalidInput(format!(
                "time signature beat unit {} is not a power of two",
                self.beat_unit
            )));
        }
        Ok(())
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

impl FromStr for TimeSignature {
    type Err = BacklineError;

    /// Parse `"N/D"`. Zero beats and non-power-of-two units are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (beats, unit) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| BacklineError::MetadataError(format!("Invalid time signature: {}", s)))?;

        let beats_per_bar: u8 = beats.trim().parse().map_err(|_| {
            BacklineError::MetadataError(format!("Invalid time signature beats: {}", s))
        })?;
        let beat_unit: u8 = unit.trim().parse().map_err(|_| {
            BacklineError::MetadataError(format!("Invalid time signature beat unit: {}", s))
        })?;

        let signature = Self::new(beats_per_bar, beat_unit);
        signature.validate().map_err(|_| {
            BacklineError::MetadataError(format!(
                "Time signature needs positive beats and a power-of-two unit: {}",
                s
            ))
        })?;

        Ok(signature)
    }
}

/// Score metadata. Also used as the defaults for every coerce path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub composer: String,
    pub key: String,
    pub time_signature: TimeSignature,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            composer: String::new(),
            key: "C".to_string(),
            time_signature: TimeSignature::default(),
        }
    }
}

/// Raw metadata for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub struct RawMetadata {
    pub title: Option<String>,
    pub composer: Option<String>,
    pub key: Option<String>,
    pub time_signature: Option<String>,
}

/// One bar of the progression. Its chords share the bar's beats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub chords: Vec<ChordSymbol>,
}

impl Measure {
    pub fn new(chords: Vec<ChordSymbol>) -> Self {
        Self { chords }
    }

    /// Beats given to each chord of this measure.
    ///
    /// The bar is split by integer division; leftover beats go one each to the
    /// first chords, so the slices always add up to the bar.
    ///
    /// ```
    /// use backline::{ChordSymbol, Measure};
    ///
    /// let bar = Measure::new(vec!["C".into(), "F".into(), "G".into()]);
    /// assert_eq!(bar.slice_beats(4), vec![2, 1, 1]);
    /// ```
    pub fn slice_beats(&self, beats_per_bar: u32) -> Vec<u32> {
        let count = self.chords.len() as u32;
        if count == 0 {
            return Vec::new();
        }
        let base = beats_per_bar / count;
        let remainder = beats_per_bar % count;
        (0..count)
            .map(|i| if i < remainder { base + 1 } else { base })
            .collect()
    }
}

/// A complete chord chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub metadata: Metadata,
    pub measures: Vec<Measure>,
}

impl Score {
    pub fn new(measures: Vec<Measure>, metadata: Metadata) -> Self {
        Self { metadata, measures }
    }

    /// Parse progression text (with optional frontmatter) into a score.
    ///
    /// ```
    /// use backline::{Metadata, Score};
    ///
    /// let score = Score::from_progression("| C | Am | F | G |", Metadata::default())?;
    /// assert_eq!(score.len(), 4);
    /// # Ok::<(), backline::BacklineError>(())
    /// ```
    pub fn from_progression(text: &str, metadata: Metadata) -> Result<Self, BacklineError> {
        parse_chart_with_defaults(text, metadata)
    }

    pub fn len(&self) -> usize {
        self.measures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Measure> {
        self.measures.iter()
    }

    pub fn beats_per_bar(&self) -> u32 {
        self.metadata.time_signature.beats_per_bar as u32
    }

    /// Length of one pass through the form, in beats.
    pub fn total_beats(&self) -> u32 {
        self.beats_per_bar() * self.measures.len() as u32
    }

    pub fn with_composer(mut self, composer: impl Into<String>) -> Self {
        self.metadata.composer = composer.into();
        self
    }
}

impl<'a> IntoIterator for &'a Score {
    type Item = &'a Measure;
    type IntoIter = std::slice::Iter<'a, Measure>;

    fn into_iter(self) -> Self::IntoIter {
        self.measures.iter()
    }
}

/// Every input shape [`ensure_score`] accepts.
#[derive(Debug, Clone)]
pub enum ScoreInput {
    Score(Score),
    /// Chart text or a chart URL
    Text(String),
    /// `(chord, beats)` pairs
    Specs(Vec<(String, f64)>),
    /// One chord per bar
    Symbols(Vec<String>),
    /// Already split into bars
    Measures(Vec<Vec<String>>),
}

impl From<Score> for ScoreInput {
    fn from(score: Score) -> Self {
        ScoreInput::Score(score)
    }
}

impl From<&str> for ScoreInput {
    fn from(text: &str) -> Self {
        ScoreInput::Text(text.to_string())
    }
}

impl From<String> for ScoreInput {
    fn from(text: String) -> Self {
        ScoreInput::Text(text)
    }
}

impl From<Vec<(&str, f64)>> for ScoreInput {
    fn from(specs: Vec<(&str, f64)>) -> Self {
        ScoreInput::Specs(specs.into_iter().map(|(c, b)| (c.to_string(), b)).collect())
    }
}

impl From<Vec<(String, f64)>> for ScoreInput {
    fn from(specs: Vec<(String, f64)>) -> Self {
        ScoreInput::Specs(specs)
    }
}

impl From<Vec<&str>> for ScoreInput {
    fn from(symbols: Vec<&str>) -> Self {
        ScoreInput::Symbols(symbols.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for ScoreInput {
    fn from(symbols: Vec<String>) -> Self {
        ScoreInput::Symbols(symbols)
    }
}

impl From<Vec<Vec<&str>>> for ScoreInput {
    fn from(measures: Vec<Vec<&str>>) -> Self {
        ScoreInput::Measures(
            measures
                .into_iter()
                .map(|m| m.into_iter().map(str::to_string).collect())
                .collect(),
        )
    }
}

/// Coerce any supported input into a [`Score`], using `defaults` for metadata
/// the input does not carry.
///
/// # Examples
/// ```
/// use backline::{ensure_score, Metadata, ScoreInput};
///
/// let score = ensure_score("| C | Am | F | G |", &Metadata::default())?;
/// assert_eq!(score.len(), 4);
///
/// let specs = vec![("F#m7b5", 4.0), ("B7", 4.0), ("Em", 8.0)];
/// let score = ensure_score(specs, &Metadata::default())?;
/// assert_eq!(score.measures[0].chords[0].as_str(), "F#h7");
/// assert_eq!(score.len(), 4);
/// # Ok::<(), backline::BacklineError>(())
/// ```
///
/// # Errors
/// [`BacklineError::InvalidInput`] for empty pre-built measures or malformed chart
/// URLs, [`BacklineError::MetadataError`] for bad chart frontmatter.
pub fn ensure_score(
    input: impl Into<ScoreInput>,
    defaults: &Metadata,
) -> Result<Score, BacklineError> {
    ensure_score_with(input, defaults, None)
}

/// [`ensure_score`] with an optional external parser for chart URLs.
pub fn ensure_score_with(
    input: impl Into<ScoreInput>,
    defaults: &Metadata,
    url_parser: Option<&dyn ExternalChartParser>,
) -> Result<Score, BacklineError> {
    defaults.time_signature.validate()?;

    match input.into() {
        ScoreInput::Score(score) => Ok(score),
        ScoreInput::Text(text) => {
            let text = text.trim();
            if ireal::is_chart_url(text) {
                ireal::parse_chart_url(text, url_parser)
            } else {
                parse_chart_with_defaults(text, defaults.clone())
            }
        }
        ScoreInput::Specs(specs) => score_from_chord_specs(&specs, defaults.clone()),
        ScoreInput::Symbols(symbols) => {
            let mut stream = ChordStream::default();
            let measures = symbols
                .iter()
                .map(|s| Measure::new(vec![stream.resolve(s)]))
                .collect();
            Ok(Score::new(measures, defaults.clone()))
        }
        ScoreInput::Measures(raw) => {
            let mut stream = ChordStream::default();
            let mut measures = Vec::with_capacity(raw.len());
            for (i, bar) in raw.iter().enumerate() {
                if bar.is_empty() {
                    return Err(BacklineError::InvalidInput(format!(
                        "measure {} has no chords",
                        i + 1
                    )));
                }
                measures.push(Measure::new(bar.iter().map(|c| stream.resolve(c)).collect()));
            }
            Ok(Score::new(measures, defaults.clone()))
        }
    }
}

/// Group `(chord, beats)` pairs into bars.
///
/// Whole bars become single-chord measures. Shorter durations share a bar
/// until it is full; a partial bar still open at the end is flushed as is.
/// Rests and non-positive durations are skipped.
///
/// # Errors
/// [`BacklineError::InvalidInput`] when the metadata's time signature is invalid.
pub fn score_from_chord_specs(
    specs: &[(String, f64)],
    metadata: Metadata,
) -> Result<Score, BacklineError> {
    metadata.time_signature.validate()?;
    let bar_beats = metadata.time_signature.beats_per_bar as f64;

    let mut stream = ChordStream::default();
    let mut measures = Vec::new();
    let mut open_bar: Vec<ChordSymbol> = Vec::new();
    let mut open_beats = 0.0;

    for (raw, beats) in specs {
        if is_rest(raw) || *beats <= 0.0 {
            continue;
        }
        let chord = stream.resolve(raw);
        let mut remaining = *beats;

        // Finish a partially filled bar first so chords stay in order
        if !open_bar.is_empty() {
            let take = remaining.min(bar_beats - open_beats);
            open_bar.push(chord.clone());
            open_beats += take;
            remaining -= take;
            if open_beats >= bar_beats - BAR_EPSILON {
                measures.push(Measure::new(std::mem::take(&mut open_bar)));
                open_beats = 0.0;
            }
        }

        let full_bars = (remaining / bar_beats + BAR_EPSILON).floor() as usize;
        for _ in 0..full_bars {
            measures.push(Measure::new(vec![chord.clone()]));
        }
        remaining -= full_bars as f64 * bar_beats;

        if remaining > BAR_EPSILON {
            open_bar.push(chord);
            open_beats += remaining;
        }
    }

    if !open_bar.is_empty() {
        measures.push(Measure::new(open_bar));
    }

    Ok(Score::new(measures, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn symbols(score: &Score) -> Vec<Vec<&str>> {
        score
            .iter()
            .map(|m| m.chords.iter().map(ChordSymbol::as_str).collect())
            .collect()
    }

    fn specs(items: &[(&str, f64)]) -> Vec<(String, f64)> {
        items.iter().map(|(c, b)| (c.to_string(), *b)).collect()
    }

    #[test]
    fn test_time_signature_parsing() {
        assert_eq!("3/4".parse::<TimeSignature>().unwrap(), TimeSignature::new(3, 4));
        assert_eq!(" 6 / 8 ".parse::<TimeSignature>().unwrap(), TimeSignature::new(6, 8));
        assert!("0/4".parse::<TimeSignature>().is_err());
        assert!("4".parse::<TimeSignature>().is_err());
        assert!("a/b".parse::<TimeSignature>().is_err());
        assert!(matches!(
            "4/3".parse::<TimeSignature>(),
            Err(BacklineError::MetadataError(_))
        ));
        assert!("4/0".parse::<TimeSignature>().is_err());
    }

    #[test]
    fn test_ensure_score_rejects_invalid_default_time_signature() {
        for signature in [TimeSignature::new(0, 4), TimeSignature::new(4, 0), TimeSignature::new(4, 3)] {
            let defaults = Metadata {
                time_signature: signature,
                ..Metadata::default()
            };
            assert!(matches!(
                ensure_score(vec![("C", 4.0)], &defaults),
                Err(BacklineError::InvalidInput(_))
            ));
            assert!(matches!(
                ensure_score("| C | G |", &defaults),
                Err(BacklineError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_specs_reject_zero_beat_bars() {
        let metadata = Metadata {
            time_signature: TimeSignature::new(0, 4),
            ..Metadata::default()
        };
        let result = score_from_chord_specs(&specs(&[("C", 4.0)]), metadata);
        assert!(matches!(result, Err(BacklineError::InvalidInput(_))));
    }

    #[test]
    fn test_slice_beats_even_and_uneven() {
        let two = Measure::new(vec!["C".into(), "G".into()]);
        assert_eq!(two.slice_beats(4), vec![2, 2]);

        let three = Measure::new(vec!["C".into(), "F".into(), "G".into()]);
        assert_eq!(three.slice_beats(4), vec![2, 1, 1]);
        assert_eq!(three.slice_beats(4).iter().sum::<u32>(), 4);

        let crowded = Measure::new(vec!["C".into(); 5]);
        assert_eq!(crowded.slice_beats(4), vec![1, 1, 1, 1, 0]);
    }

    #[test]
    fn test_ensure_score_identity() {
        let score = Score::new(vec![Measure::new(vec!["C".into()])], Metadata::default());
        let same = ensure_score(score.clone(), &Metadata::default()).unwrap();
        assert_eq!(same, score);
    }

    #[test]
    fn test_ensure_score_text_uses_defaults() {
        let defaults = Metadata {
            title: "ii-V-I".to_string(),
            time_signature: TimeSignature::new(3, 4),
            ..Metadata::default()
        };
        let score = ensure_score("| Dm7 | G7 | Cmaj7 |", &defaults).unwrap();
        assert_eq!(score.metadata.title, "ii-V-I");
        assert_eq!(score.beats_per_bar(), 3);
        assert_eq!(symbols(&score), vec![vec!["D-7"], vec!["G7"], vec!["C^7"]]);
    }

    #[test]
    fn test_ensure_score_symbols() {
        let score = ensure_score(vec!["C", "Am", "F", "G"], &Metadata::default()).unwrap();
        assert_eq!(symbols(&score), vec![vec!["C"], vec!["A-"], vec!["F"], vec!["G"]]);
    }

    #[test]
    fn test_ensure_score_measures() {
        let score = ensure_score(vec![vec!["C"], vec!["Am", "F"], vec!["G"]], &Metadata::default())
            .unwrap();
        assert_eq!(symbols(&score), vec![vec!["C"], vec!["A-", "F"], vec!["G"]]);
    }

    #[test]
    fn test_ensure_score_rejects_empty_measure() {
        let result = ensure_score(vec![vec!["C"], vec![]], &Metadata::default());
        assert!(matches!(result, Err(BacklineError::InvalidInput(_))));
    }

    #[test]
    fn test_ensure_score_empty_inputs_are_valid() {
        let empty: Vec<&str> = Vec::new();
        assert!(ensure_score(empty, &Metadata::default()).unwrap().is_empty());
        assert!(ensure_score("", &Metadata::default()).unwrap().is_empty());
    }

    #[test]
    fn test_specs_whole_bars() {
        let score = score_from_chord_specs(
            &specs(&[("F#m7b5", 4.0), ("B7", 4.0), ("Em", 8.0)]),
            Metadata::default(),
        ).unwrap();
        assert_eq!(
            symbols(&score),
            vec![vec!["F#h7"], vec!["B7"], vec!["E-"], vec!["E-"]]
        );
    }

    #[test]
    fn test_specs_half_bars_group() {
        let score = score_from_chord_specs(
            &specs(&[("C", 4.0), ("Am", 2.0), ("F", 2.0), ("G", 4.0)]),
            Metadata::default(),
        ).unwrap();
        assert_eq!(symbols(&score), vec![vec!["C"], vec!["A-", "F"], vec!["G"]]);
    }

    #[test]
    fn test_specs_keep_order_across_open_bar() {
        let score = score_from_chord_specs(&specs(&[("C", 2.0), ("G", 6.0)]), Metadata::default()).unwrap();
        assert_eq!(symbols(&score), vec![vec!["C", "G"], vec!["G"]]);
    }

    #[test]
    fn test_specs_trailing_partial_bar_flushed() {
        let score = score_from_chord_specs(&specs(&[("C", 4.0), ("G", 1.0)]), Metadata::default()).unwrap();
        assert_eq!(symbols(&score), vec![vec!["C"], vec!["G"]]);
    }

    #[test]
    fn test_specs_skip_rests_and_bad_durations() {
        let score = score_from_chord_specs(
            &specs(&[("N.C.", 4.0), ("C", 0.0), ("D", -2.0), ("G", 4.0)]),
            Metadata::default(),
        ).unwrap();
        assert_eq!(symbols(&score), vec![vec!["G"]]);
    }

    #[test]
    fn test_specs_respect_time_signature() {
        let metadata = Metadata {
            time_signature: TimeSignature::new(3, 4),
            ..Metadata::default()
        };
        let score = score_from_chord_specs(&specs(&[("C", 6.0), ("G", 3.0)]), metadata).unwrap();
        assert_eq!(symbols(&score), vec![vec!["C"], vec!["C"], vec!["G"]]);
    }

    #[test]
    fn test_total_beats_and_composer_patch() {
        let score = ensure_score("| C | G |", &Metadata::default())
            .unwrap()
            .with_composer("Anon");
        assert_eq!(score.total_beats(), 8);
        assert_eq!(score.metadata.composer, "Anon");
    }
}
