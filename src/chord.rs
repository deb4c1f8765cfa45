//! Chord symbol normalization
//!
//! Maps heterogeneous chord spellings (`Cm7`, `Cmin7`, `Cmaj7`, `Cm7b5`, `Cdim`)
//! onto one canonical vocabulary:
//!
//! | Quality            | Canonical      | Accepted spellings                 |
//! |--------------------|----------------|------------------------------------|
//! | major              | `C`, `C^`      | `maj`                              |
//! | minor              | `C-`           | `m`, `min`                         |
//! | major 7th / 9th    | `C^7`, `C^9`   | `maj7`, `M7`, `maj9`, `M9`         |
//! | minor 7th / 9th    | `C-7`, `C-9`   | `m7`, `min7`, `m9`, `min9`         |
//! | minor-major 7th    | `C-^7`         | `mmaj7`                            |
//! | dominant           | `C7`, `C9`     | digits only                        |
//! | diminished         | `Co`, `Co7`    | `dim`, `dim7`, `°`, `°7`           |
//! | half-diminished    | `Ch7`          | `m7b5`, `-7b5`, `ø7`, `ø`          |
//! | augmented          | `C+`           | `aug`                              |
//! | suspended          | `Csus`, `Csus2`| `sus4`                             |
//!
//! Alterations (`b9`, `#11`) and slash basses (`/G`) are preserved verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbols that mean "no chord sounds here".
pub const REST_SYMBOLS: [&str; 4] = ["", "n", "N.C.", "NC"];

/// Symbols that mean "same chord as before".
pub const REPEAT_SYMBOLS: [&str; 2] = ["%", "x"];

// Longest patterns first: a pattern must come before every pattern that is a
// suffix of it, otherwise `dim` would be caught by `m` and become `di-`.
const SUFFIX_TABLE: &[(&str, &str)] = &[
    ("mmaj7", "-^7"),
    ("m7b5", "h7"),
    ("-7b5", "h7"),
    ("maj7", "^7"),
    ("maj9", "^9"),
    ("min7", "-7"),
    ("min9", "-9"),
    ("min6", "-6"),
    ("dim7", "o7"),
    ("sus4", "sus"),
    ("ø7", "h7"),
    ("°7", "o7"),
    ("maj", "^"),
    ("min", "-"),
    ("dim", "o"),
    ("aug", "+"),
    ("ø", "h"),
    ("°", "o"),
    ("m7", "-7"),
    ("m9", "-9"),
    ("m6", "-6"),
    ("M7", "^7"),
    ("M9", "^9"),
    ("m", "-"),
];

/// Normalize a raw chord spelling to its canonical form.
///
/// Rest and repeat sentinels pass through untouched; the progression parser
/// resolves them. Only one suffix substitution is applied, anchored at the end
/// of the chord (before any `/bass`), so the result is idempotent.
///
/// # Examples
/// ```
/// use backline::chord::normalize_chord_symbol;
///
/// assert_eq!(normalize_chord_symbol("Cm7"), "C-7");
/// assert_eq!(normalize_chord_symbol("Cdim"), "Co");
/// assert_eq!(normalize_chord_symbol("F#m7b5"), "F#h7");
/// assert_eq!(normalize_chord_symbol("Cmaj7/G"), "C^7/G");
/// assert_eq!(normalize_chord_symbol("N.C."), "N.C.");
/// ```
pub fn normalize_chord_symbol(raw: &str) -> String {
    let symbol = raw.trim();
    if REST_SYMBOLS.contains(&symbol) || REPEAT_SYMBOLS.contains(&symbol) {
        return symbol.to_string();
    }

    let (head, bass) = match symbol.find('/') {
        Some(idx) => symbol.split_at(idx),
        None => (symbol, ""),
    };

    for (pattern, replacement) in SUFFIX_TABLE {
        // Never consume the root itself
        if head.len() > pattern.len() && head.ends_with(pattern) {
            let stem = &head[..head.len() - pattern.len()];
            return format!("{}{}{}", stem, replacement, bass);
        }
    }

    symbol.to_string()
}

/// Apply the suffix table to a bare quality (no root).
pub(crate) fn normalize_quality(quality: &str) -> String {
    SUFFIX_TABLE
        .iter()
        .find(|(pattern, _)| quality.ends_with(pattern))
        .map(|(pattern, replacement)| {
            format!("{}{}", &quality[..quality.len() - pattern.len()], replacement)
        })
        .unwrap_or_else(|| quality.to_string())
}

/// True for the no-chord sentinels (`N.C.`, `NC`, `n`, empty).
pub fn is_rest(symbol: &str) -> bool {
    REST_SYMBOLS.contains(&symbol.trim())
}

/// True for the repeat-previous-chord sentinels (`%`, `x`).
pub fn is_repeat(symbol: &str) -> bool {
    REPEAT_SYMBOLS.contains(&symbol.trim())
}

/// A canonical chord symbol: `<root><quality><alterations>[/<bass>]`.
///
/// Construction always normalizes, so two spellings of the same chord compare equal.
///
/// ```
/// use backline::ChordSymbol;
///
/// let chord = ChordSymbol::new("Bbmaj7/D");
/// assert_eq!(chord.as_str(), "Bb^7/D");
/// assert_eq!(chord.root(), "Bb");
/// assert_eq!(chord.quality(), "^7");
/// assert_eq!(chord.bass(), Some("D"));
/// assert_eq!(chord, ChordSymbol::new("Bb^7/D"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ChordSymbol(String);

impl ChordSymbol {
    pub fn new(raw: &str) -> Self {
        Self(normalize_chord_symbol(raw))
    }

    /// The no-chord symbol.
    pub fn rest() -> Self {
        Self("N.C.".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_rest(&self) -> bool {
        is_rest(&self.0)
    }

    /// Root letter plus optional accidental, e.g. `"F#"`.
    pub fn root(&self) -> &str {
        split_root(self.chord_part()).0
    }

    /// Everything between the root and the slash bass, e.g. `"-7"` for `D-7/C`.
    pub fn quality(&self) -> &str {
        split_root(self.chord_part()).1
    }

    pub fn bass(&self) -> Option<&str> {
        self.0.split_once('/').map(|(_, bass)| bass)
    }

    fn chord_part(&self) -> &str {
        self.0.split('/').next().unwrap_or("")
    }
}

/// Split a chord into (root, quality). The root is the first character plus a
/// trailing `#` or `b` if present.
pub(crate) fn split_root(chord: &str) -> (&str, &str) {
    let mut chars = chord.char_indices();
    let Some((_, first)) = chars.next() else {
        return ("", "");
    };
    let mut root_end = first.len_utf8();
    if let Some((idx, c)) = chars.next() {
        if c == '#' || c == 'b' {
            root_end = idx + 1;
        }
    }
    chord.split_at(root_end)
}

impl fmt::Display for ChordSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ChordSymbol {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for ChordSymbol {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<ChordSymbol> for String {
    fn from(symbol: ChordSymbol) -> Self {
        symbol.0
    }
}

impl PartialEq<&str> for ChordSymbol {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
