//! Chart URLs (`irealb://`, `irealbook://`)
//!
//! A full chart-URL parser is an external collaborator, injected through
//! [`ExternalChartParser`]. Without one, a best-effort local parser pulls the
//! title, composer, key and chord sequence out of the URL. It does not decode
//! every feature of the format: each chord becomes one 4-beat bar.

use regex::Regex;

use crate::chord::is_rest;
use crate::error::BacklineError;
use crate::score::{score_from_chord_specs, Metadata, Score};

const URL_SCHEMES: [&str; 2] = ["irealbook://", "irealb://"];

/// Beats given to every chord recovered by the local parser.
const FALLBACK_CHORD_BEATS: f64 = 4.0;

/// Single-character layout markers (brackets, final bars, codas, segnos).
const STRUCTURAL_MARKERS: [char; 10] = ['{', '}', '[', ']', 'Z', '*', 'Y', 'Q', 'S', 'T'];

/// Tokens that carry no chord (no-chord, repeat, slash and size marks).
const SKIPPED_TOKENS: [&str; 7] = ["n", "x", "r", "%", "p", "s", "l"];

/// Section labels (`*A`), ending marks (`N1`), comments (`<...>`) and time
/// signatures (`T44`).
const MARKUP_PATTERN: &str = r"\*[A-Za-z]|N\d|<[^>]*>|T\d\d";

const CHORD_PATTERN: &str = r"^([A-G][#b]?)(.*)$";

/// A full parser for chart URLs, supplied by the host.
pub trait ExternalChartParser {
    /// Parse `url`, or return `None` to let the local parser handle it.
    fn parse_url(&self, url: &str) -> Option<Result<Score, BacklineError>>;
}

/// True when `text` uses a chart-URL scheme.
pub fn is_chart_url(text: &str) -> bool {
    URL_SCHEMES.iter().any(|scheme| text.starts_with(scheme))
}

/// Parse a chart URL, preferring `external` when one is supplied.
pub fn parse_chart_url(
    url: &str,
    external: Option<&dyn ExternalChartParser>,
) -> Result<Score, BacklineError> {
    if let Some(result) = external.and_then(|parser| parser.parse_url(url)) {
        return result;
    }
    tracing::warn!("no chart-url parser available, using best-effort local parsing");
    parse_chart_url_fallback(url)
}

/// Best-effort local parser.
///
/// # Example
/// ```
/// use backline::ireal::parse_chart_url_fallback;
///
/// let url = "irealb://Blue%20Monk=Monk%20Thelonious==Bb=Medium%20Swing=[T44Bb6 Eb7 |Bb6 Bb7 Z";
/// let score = parse_chart_url_fallback(url)?;
/// assert_eq!(score.metadata.title, "Blue Monk");
/// assert_eq!(score.metadata.composer, "Monk Thelonious");
/// assert_eq!(score.metadata.key, "Bb");
/// assert_eq!(score.len(), 4);
/// # Ok::<(), backline::BacklineError>(())
/// ```
///
/// # Errors
/// [`BacklineError::InvalidInput`] when the URL has fewer than six `=` fields
/// or is not valid percent-encoding.
pub fn parse_chart_url_fallback(url: &str) -> Result<Score, BacklineError> {
    let raw = URL_SCHEMES
        .iter()
        .find_map(|scheme| url.strip_prefix(scheme))
        .unwrap_or(url);

    let decoded = percent_decode(raw)?;
    let fields: Vec<&str> = decoded.split('=').collect();
    if fields.len() < 6 {
        return Err(BacklineError::InvalidInput(format!(
            "chart URL has {} fields, expected at least 6",
            fields.len()
        )));
    }

    let defaults = Metadata::default();
    let metadata = Metadata {
        title: non_empty(fields[0]).unwrap_or(defaults.title),
        composer: fields[1].to_string(),
        key: non_empty(fields[3]).unwrap_or(defaults.key),
        time_signature: defaults.time_signature,
    };

    let specs: Vec<(String, f64)> = extract_chords(fields[5])?
        .into_iter()
        .map(|chord| (chord, FALLBACK_CHORD_BEATS))
        .collect();

    tracing::debug!(title = %metadata.title, chords = specs.len(), "parsed chart url locally");
    score_from_chord_specs(&specs, metadata)
}

fn non_empty(field: &str) -> Option<String> {
    let field = field.trim();
    (!field.is_empty()).then(|| field.to_string())
}

/// Pull chord tokens out of the chart body, in order.
fn extract_chords(body: &str) -> Result<Vec<String>, BacklineError> {
    let markup =
        Regex::new(MARKUP_PATTERN).map_err(|e| BacklineError::InvalidInput(e.to_string()))?;
    let chord =
        Regex::new(CHORD_PATTERN).map_err(|e| BacklineError::InvalidInput(e.to_string()))?;

    let cleaned = markup.replace_all(body, " ");
    let cleaned: String = cleaned
        .chars()
        .map(|c| if STRUCTURAL_MARKERS.contains(&c) { ' ' } else { c })
        .collect();

    let mut chords = Vec::new();
    for token in cleaned.split(|c: char| c == '|' || c.is_whitespace()) {
        if token.is_empty() || SKIPPED_TOKENS.contains(&token) {
            continue;
        }
        // Small/large chord size marks prefix the chord
        let token = token.trim_start_matches(['s', 'l']);

        let Some(captures) = chord.captures(token) else {
            continue;
        };
        let root = &captures[1];
        // Keep the first of comma-separated chords and drop slash basses
        let quality = captures[2]
            .split(',')
            .next()
            .unwrap_or("")
            .split('/')
            .next()
            .unwrap_or("");

        let symbol = format!("{}{}", root, quality);
        if !is_rest(&symbol) {
            chords.push(symbol);
        }
    }
    Ok(chords)
}

/// Decode `%XX` escapes. Invalid UTF-8 is replaced rather than rejected.
fn percent_decode(input: &str) -> Result<String, BacklineError> {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|pair| std::str::from_utf8(pair).ok())
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| {
                    BacklineError::InvalidInput(format!("bad percent escape at byte {}", i))
                })?;
            decoded.push(hex);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    Ok(String::from_utf8_lossy(&decoded).into_owned())
}
