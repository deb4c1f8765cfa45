//! # Progression Parser
//!
//! Turns chord-chart text into measures of canonical chord symbols.
//!
//! ## Accepted Shapes
//! - Bar lines: `| C | Am | F | G |` (one measure per bar)
//! - Multi-chord bars: `| C Am | F G |` (chords split the bar evenly)
//! - Plain tokens: `C Am F G` (one chord per measure)
//! - Repeats: `%` or `x` repeat the most recent chord
//!
//! ## Chart Files
//! A chart may carry a YAML frontmatter block, anywhere in the text, delimited
//! by `---` lines:
//!
//! ```text
//! ---
//! title: Autumn Leaves
//! composer: Kosma
//! key: G
//! time-signature: 4/4
//! ---
//! | A-7 | D7 | G^7 | C^7 |
//! ```

use crate::chord::{is_repeat, ChordSymbol};
use crate::error::BacklineError;
use crate::score::{Measure, Metadata, RawMetadata, Score, TimeSignature};

/// Chord used when a repeat marker appears before any chord.
const DEFAULT_CHORD: &str = "C";

/// Parse a progression string into measures.
///
/// Bar lines split measures when present; otherwise each whitespace-separated
/// token is its own measure. Empty bars are dropped. Repeat markers resolve to
/// the most recently resolved chord across the whole progression.
///
/// # Examples
/// ```
/// use backline::parse_progression;
///
/// let measures = parse_progression("| C Am | F G |");
/// assert_eq!(measures.len(), 2);
/// assert_eq!(measures[0].chords.len(), 2);
///
/// let repeated = parse_progression("| Dm7 | G7 | C^7 | % |");
/// assert_eq!(repeated[3].chords[0].as_str(), "C^7");
/// ```
pub fn parse_progression(text: &str) -> Vec<Measure> {
    let text = text.trim();
    let bars: Vec<&str> = if text.contains('|') {
        text.split('|').map(str::trim).filter(|bar| !bar.is_empty()).collect()
    } else {
        text.split_whitespace().collect()
    };

    let mut stream = ChordStream::default();
    let mut measures = Vec::with_capacity(bars.len());

    for bar in bars {
        let chords: Vec<ChordSymbol> = bar.split_whitespace().map(|t| stream.resolve(t)).collect();
        if !chords.is_empty() {
            measures.push(Measure::new(chords));
        }
    }

    measures
}

/// Running "most recent chord" state shared by every input shape that can
/// contain repeat markers.
#[derive(Debug, Default)]
pub(crate) struct ChordStream {
    last: Option<ChordSymbol>,
}

impl ChordStream {
    /// Normalize `token`, substituting the previous chord for a repeat marker.
    pub(crate) fn resolve(&mut self, token: &str) -> ChordSymbol {
        let chord = if is_repeat(token) {
            self.last
                .clone()
                .unwrap_or_else(|| ChordSymbol::new(DEFAULT_CHORD))
        } else {
            ChordSymbol::new(token)
        };
        self.last = Some(chord.clone());
        chord
    }
}

/// Parse a chart: optional YAML frontmatter plus a progression body.
///
/// # Example
/// ```
/// use backline::parse_chart;
///
/// let chart = r#"---
/// title: ii-V-I
/// time-signature: 3/4
/// ---
/// | Dm7 | G7 | Cmaj7 |
/// "#;
/// let score = parse_chart(chart)?;
/// assert_eq!(score.metadata.title, "ii-V-I");
/// assert_eq!(score.metadata.time_signature.beats_per_bar, 3);
/// assert_eq!(score.len(), 3);
/// # Ok::<(), backline::BacklineError>(())
/// ```
///
/// # Errors
/// Returns [`BacklineError::MetadataError`] if the frontmatter is not valid YAML
/// or its time signature cannot be read.
pub fn parse_chart(source: &str) -> Result<Score, BacklineError> {
    parse_chart_with_defaults(source, Metadata::default())
}

/// Like [`parse_chart`], with caller-supplied metadata for every key the
/// frontmatter leaves out.
pub fn parse_chart_with_defaults(source: &str, defaults: Metadata) -> Result<Score, BacklineError> {
    let (metadata_content, body) = extract_metadata(source);

    let metadata = match metadata_content {
        Some(content) => parse_yaml_metadata(&content, defaults)?,
        None => defaults,
    };

    Ok(Score {
        metadata,
        measures: parse_progression(&body),
    })
}

fn parse_yaml_metadata(content: &str, defaults: Metadata) -> Result<Metadata, BacklineError> {
    // serde_yaml rejects an empty document
    if content.trim().is_empty() {
        return Ok(defaults);
    }

    let raw: RawMetadata =
        serde_yaml::from_str(content).map_err(|e| BacklineError::MetadataError(e.to_string()))?;

    let time_signature = match &raw.time_signature {
        Some(ts) => ts.parse::<TimeSignature>()?,
        None => defaults.time_signature,
    };

    Ok(Metadata {
        title: raw.title.unwrap_or(defaults.title),
        composer: raw.composer.unwrap_or(defaults.composer),
        key: raw.key.unwrap_or(defaults.key),
        time_signature,
    })
}

/// Extract metadata block from source (can be at top or bottom)
/// Returns (metadata_content, remaining_source)
fn extract_metadata(source: &str) -> (Option<String>, String) {
    let lines: Vec<&str> = source.lines().collect();

    let mut start_idx = None;
    let mut end_idx = None;

    for (i, line) in lines.iter().enumerate() {
        if line.trim() == "---" {
            if start_idx.is_none() {
                start_idx = Some(i);
            } else {
                end_idx = Some(i);
                break;
            }
        }
    }

    match (start_idx, end_idx) {
        (Some(start), Some(end)) => {
            let metadata_content = lines[start + 1..end].join("\n");

            let remaining: Vec<&str> = lines[..start]
                .iter()
                .chain(lines[end + 1..].iter())
                .copied()
                .collect();

            (Some(metadata_content), remaining.join("\n"))
        }
        _ => (None, source.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn symbols(measures: &[Measure]) -> Vec<Vec<&str>> {
        measures
            .iter()
            .map(|m| m.chords.iter().map(ChordSymbol::as_str).collect())
            .collect()
    }

    #[test]
    fn test_bar_lines_one_chord_each() {
        let measures = parse_progression("| C | Am | F | G |");
        assert_eq!(symbols(&measures), vec![vec!["C"], vec!["A-"], vec!["F"], vec!["G"]]);
    }

    #[test]
    fn test_multi_chord_bars() {
        let measures = parse_progression("| C Am | F G |");
        assert_eq!(symbols(&measures), vec![vec!["C", "A-"], vec!["F", "G"]]);
    }

    #[test]
    fn test_space_separated_one_chord_per_measure() {
        let measures = parse_progression("C Am F G");
        assert_eq!(measures.len(), 4);
        assert!(measures.iter().all(|m| m.chords.len() == 1));
        assert_eq!(measures[1].chords[0].as_str(), "A-");
    }

    #[test]
    fn test_repeat_copies_previous_measure() {
        let measures = parse_progression("| C | G | % |");
        assert_eq!(measures.len(), 3);
        assert_eq!(measures[2].chords, measures[1].chords);
    }

    #[test]
    fn test_repeat_with_x_marker() {
        let measures = parse_progression("| Dm7 | x |");
        assert_eq!(symbols(&measures), vec![vec!["D-7"], vec!["D-7"]]);
    }

    #[test]
    fn test_repeat_first_defaults_to_c() {
        let measures = parse_progression("| % | G |");
        assert_eq!(symbols(&measures), vec![vec!["C"], vec!["G"]]);
    }

    #[test]
    fn test_repeat_tracks_last_chord_within_bar() {
        let measures = parse_progression("| C Am | % |");
        assert_eq!(symbols(&measures), vec![vec!["C", "A-"], vec!["A-"]]);
    }

    #[test]
    fn test_empty_bars_dropped() {
        let measures = parse_progression("|| C |  | G ||");
        assert_eq!(symbols(&measures), vec![vec!["C"], vec!["G"]]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_progression("").is_empty());
        assert!(parse_progression("   ").is_empty());
        assert!(parse_progression("| |").is_empty());
    }

    #[test]
    fn test_ireal_style_symbols() {
        let measures = parse_progression("C-7 F7 | Bb^7 | Eh7 A7b9 |");
        assert_eq!(
            symbols(&measures),
            vec![vec!["C-7", "F7"], vec!["Bb^7"], vec!["Eh7", "A7b9"]]
        );
    }

    #[test]
    fn test_chart_with_metadata() {
        let source = r#"---
title: Test Song
composer: Someone
key: F
time-signature: 3/4
---
| F | C7 | F |"#;
        let score = parse_chart(source).unwrap();
        assert_eq!(score.metadata.title, "Test Song");
        assert_eq!(score.metadata.composer, "Someone");
        assert_eq!(score.metadata.key, "F");
        assert_eq!(score.metadata.time_signature, TimeSignature::new(3, 4));
        assert_eq!(score.measures.len(), 3);
    }

    #[test]
    fn test_chart_with_metadata_at_bottom() {
        let source = r#"| C | G |
---
title: Bottom
---"#;
        let score = parse_chart(source).unwrap();
        assert_eq!(score.metadata.title, "Bottom");
        assert_eq!(score.measures.len(), 2);
    }

    #[test]
    fn test_chart_without_metadata_uses_defaults() {
        let score = parse_chart("| C | G |").unwrap();
        assert_eq!(score.metadata, Metadata::default());
    }

    #[test]
    fn test_chart_frontmatter_overrides_defaults() {
        let defaults = Metadata {
            title: "Default".to_string(),
            key: "Bb".to_string(),
            ..Metadata::default()
        };
        let score = parse_chart_with_defaults("---\ntitle: Mine\n---\n| C |", defaults).unwrap();
        assert_eq!(score.metadata.title, "Mine");
        assert_eq!(score.metadata.key, "Bb");
    }

    #[test]
    fn test_chart_bad_time_signature() {
        let source = "---\ntime-signature: four\n---\n| C |";
        assert!(matches!(parse_chart(source), Err(BacklineError::MetadataError(_))));
    }

    #[test]
    fn test_chart_bad_yaml() {
        let source = "---\ntitle: [unclosed\n---\n| C |";
        assert!(matches!(parse_chart(source), Err(BacklineError::MetadataError(_))));
    }
}
