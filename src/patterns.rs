//! # Style Pattern Library
//!
//! Fixed catalog of one-bar rhythmic templates per style: drum grooves, bass
//! shapes and comping rhythms. Everything here is `'static` data; lookups hand
//! out borrowed slices and nothing is ever mutated.
//!
//! ## Styles
//! `swing`, `bossa`, `rock`, `ballad`, `funk`, `latin`, `waltz`, `blues`.
//! Any other name resolves to `swing`.
//!
//! ## Variants
//! A style may carry more than one template per instrument (swing drums have
//! a ride groove and a brushes groove). The arranger uses the first unless a
//! variant index is configured.
//!
//! ## Example
//! ```rust
//! use backline::patterns::patterns_for;
//!
//! let bossa = patterns_for("bossa");
//! assert_eq!(bossa.drums[0].name, "bossa");
//! assert!(patterns_for("rock").comp.is_empty());
//! assert_eq!(patterns_for("polka"), patterns_for("swing"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// General MIDI percussion voices (channel 10).
pub mod drums {
    pub const KICK: u8 = 36;
    pub const SIDE_STICK: u8 = 37;
    pub const SNARE: u8 = 38;
    pub const CLOSED_HIHAT: u8 = 42;
    pub const PEDAL_HIHAT: u8 = 44;
    pub const LOW_TOM: u8 = 45;
    pub const OPEN_HIHAT: u8 = 46;
    pub const MID_TOM: u8 = 47;
    pub const CRASH: u8 = 49;
    pub const HIGH_TOM: u8 = 50;
    pub const RIDE: u8 = 51;
    pub const RIDE_BELL: u8 = 53;
    pub const COWBELL: u8 = 56;
    pub const SHAKER: u8 = 70;
    pub const CLAVES: u8 = 75;
}

use drums::*;

/// A single drum hit: beat offset within the bar, GM voice, base velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrumHit {
    pub beat: f64,
    pub drum: u8,
    pub velocity: u8,
}

/// One bass note: beat offset, semitones above the chord root, length, base velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BassNote {
    pub beat: f64,
    pub offset: i8,
    pub duration: f64,
    pub velocity: u8,
}

/// One comping hit: beat offset, length, base velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompHit {
    pub beat: f64,
    pub duration: f64,
    pub velocity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrumPattern {
    pub name: &'static str,
    pub beats_per_bar: u8,
    pub hits: &'static [DrumHit],
}

impl DrumPattern {
    /// Length of one bar of this groove in seconds.
    ///
    /// ```
    /// use backline::patterns::patterns_for;
    ///
    /// let groove = patterns_for("swing").drums[0];
    /// assert_eq!(groove.seconds_at(120), 2.0);
    /// ```
    pub fn seconds_at(&self, tempo: u16) -> f64 {
        60.0 / tempo as f64 * self.beats_per_bar as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BassPattern {
    pub name: &'static str,
    pub notes: &'static [BassNote],
}

/// How a comping hit voices the chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompVoicing {
    /// Every chord tone on every hit
    Block,
    /// One chord tone per hit, cycling upward through the voicing
    Arpeggio,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompingPattern {
    pub name: &'static str,
    pub voicing: CompVoicing,
    pub hits: &'static [CompHit],
}

/// What the comping instrument plays when a style has no comping template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompFallback {
    /// Block chord on every beat of the slice
    EveryBeat,
    /// One chord held for most of the slice
    Sustain,
}

/// Every template a style offers, per instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StylePatterns {
    pub drums: &'static [DrumPattern],
    pub bass: &'static [BassPattern],
    pub comp: &'static [CompingPattern],
}

/// Accompaniment styles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Swing,
    Bossa,
    Rock,
    Ballad,
    Funk,
    Latin,
    Waltz,
    Blues,
}

impl Style {
    pub const ALL: [Style; 8] = [
        Style::Swing,
        Style::Bossa,
        Style::Rock,
        Style::Ballad,
        Style::Funk,
        Style::Latin,
        Style::Waltz,
        Style::Blues,
    ];

    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|style| style.name() == name)
    }

    /// Like [`Style::from_name`], falling back to swing for unknown names.
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::warn!(style = name, "unknown style, falling back to swing");
            Style::Swing
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Style::Swing => "swing",
            Style::Bossa => "bossa",
            Style::Rock => "rock",
            Style::Ballad => "ballad",
            Style::Funk => "funk",
            Style::Latin => "latin",
            Style::Waltz => "waltz",
            Style::Blues => "blues",
        }
    }

    pub fn patterns(&self) -> StylePatterns {
        match self {
            Style::Swing => StylePatterns {
                drums: &[SWING_DRUMS_BASIC, SWING_DRUMS_BRUSHES],
                bass: &[SWING_BASS_WALKING],
                comp: &[SWING_COMP],
            },
            Style::Bossa => StylePatterns {
                drums: &[BOSSA_DRUMS],
                bass: &[BOSSA_BASS],
                comp: &[BOSSA_COMP],
            },
            Style::Rock => StylePatterns {
                drums: &[ROCK_DRUMS_BASIC, ROCK_DRUMS_HEAVY],
                bass: &[ROCK_BASS, ROCK_BASS_DRIVING],
                comp: &[],
            },
            Style::Ballad => StylePatterns {
                drums: &[BALLAD_DRUMS],
                bass: &[BALLAD_BASS],
                comp: &[BALLAD_COMP],
            },
            Style::Funk => StylePatterns {
                drums: &[FUNK_DRUMS],
                bass: &[FUNK_BASS],
                comp: &[],
            },
            Style::Latin => StylePatterns {
                drums: &[LATIN_DRUMS],
                bass: &[LATIN_BASS],
                comp: &[],
            },
            Style::Waltz => StylePatterns {
                drums: &[WALTZ_DRUMS],
                bass: &[WALTZ_BASS],
                comp: &[],
            },
            Style::Blues => StylePatterns {
                drums: &[BLUES_DRUMS],
                bass: &[BLUES_BASS],
                comp: &[],
            },
        }
    }

    pub fn comp_fallback(&self) -> CompFallback {
        match self {
            Style::Rock | Style::Funk => CompFallback::EveryBeat,
            _ => CompFallback::Sustain,
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Look up a style's templates by name. Unknown names get swing.
pub fn patterns_for(style: &str) -> StylePatterns {
    Style::resolve(style).patterns()
}

const fn hit(beat: f64, drum: u8, velocity: u8) -> DrumHit {
    DrumHit {
        beat,
        drum,
        velocity,
    }
}

const fn note(beat: f64, offset: i8, duration: f64, velocity: u8) -> BassNote {
    BassNote {
        beat,
        offset,
        duration,
        velocity,
    }
}

const fn comp(beat: f64, duration: f64, velocity: u8) -> CompHit {
    CompHit {
        beat,
        duration,
        velocity,
    }
}

// Swing

pub const SWING_DRUMS_BASIC: DrumPattern = DrumPattern {
    name: "swing_basic",
    beats_per_bar: 4,
    hits: &[
        hit(0.0, RIDE, 90),
        hit(1.0, RIDE, 70),
        hit(2.0, RIDE, 85),
        hit(3.0, RIDE, 70),
        // foot on 2 and 4
        hit(1.0, PEDAL_HIHAT, 80),
        hit(3.0, PEDAL_HIHAT, 80),
    ],
};

pub const SWING_DRUMS_BRUSHES: DrumPattern = DrumPattern {
    name: "swing_brushes",
    beats_per_bar: 4,
    hits: &[
        hit(0.0, SIDE_STICK, 60),
        hit(0.67, CLOSED_HIHAT, 40),
        hit(1.0, SIDE_STICK, 50),
        hit(1.67, CLOSED_HIHAT, 40),
        hit(2.0, SIDE_STICK, 60),
        hit(2.67, CLOSED_HIHAT, 40),
        hit(3.0, SIDE_STICK, 50),
        hit(3.67, CLOSED_HIHAT, 40),
    ],
};

pub const SWING_BASS_WALKING: BassPattern = BassPattern {
    name: "walking",
    notes: &[
        note(0.0, 0, 0.9, 100),
        note(1.0, 4, 0.9, 90),
        note(2.0, 7, 0.9, 95),
        // chromatic approach
        note(3.0, 11, 0.9, 85),
    ],
};

pub const SWING_COMP: CompingPattern = CompingPattern {
    name: "swing_comp",
    voicing: CompVoicing::Block,
    hits: &[comp(1.5, 0.4, 75), comp(3.5, 0.4, 80)],
};

// Bossa nova

pub const BOSSA_DRUMS: DrumPattern = DrumPattern {
    name: "bossa",
    beats_per_bar: 4,
    hits: &[
        hit(0.0, SIDE_STICK, 70),
        hit(2.0, SIDE_STICK, 65),
        hit(0.0, CLOSED_HIHAT, 60),
        hit(0.5, CLOSED_HIHAT, 40),
        hit(1.0, CLOSED_HIHAT, 50),
        hit(1.5, CLOSED_HIHAT, 40),
        hit(2.0, CLOSED_HIHAT, 60),
        hit(2.5, CLOSED_HIHAT, 40),
        hit(3.0, CLOSED_HIHAT, 50),
        hit(3.5, CLOSED_HIHAT, 40),
        hit(0.0, KICK, 80),
        hit(1.5, KICK, 70),
        hit(3.0, KICK, 75),
    ],
};

pub const BOSSA_BASS: BassPattern = BassPattern {
    name: "bossa",
    notes: &[
        note(0.0, 0, 1.3, 90),
        note(1.5, 7, 0.8, 75),
        note(2.5, 0, 1.3, 85),
    ],
};

pub const BOSSA_COMP: CompingPattern = CompingPattern {
    name: "bossa_comp",
    voicing: CompVoicing::Block,
    hits: &[
        comp(0.0, 0.3, 70),
        comp(1.5, 0.3, 65),
        comp(2.5, 0.3, 70),
        comp(3.5, 0.3, 60),
    ],
};

// Rock

pub const ROCK_DRUMS_BASIC: DrumPattern = DrumPattern {
    name: "rock_basic",
    beats_per_bar: 4,
    hits: &[
        hit(0.0, KICK, 110),
        hit(2.0, KICK, 105),
        hit(1.0, SNARE, 100),
        hit(3.0, SNARE, 100),
        hit(0.0, CLOSED_HIHAT, 80),
        hit(0.5, CLOSED_HIHAT, 60),
        hit(1.0, CLOSED_HIHAT, 80),
        hit(1.5, CLOSED_HIHAT, 60),
        hit(2.0, CLOSED_HIHAT, 80),
        hit(2.5, CLOSED_HIHAT, 60),
        hit(3.0, CLOSED_HIHAT, 80),
        hit(3.5, CLOSED_HIHAT, 60),
    ],
};

pub const ROCK_DRUMS_HEAVY: DrumPattern = DrumPattern {
    name: "rock_heavy",
    beats_per_bar: 4,
    hits: &[
        hit(0.0, KICK, 120),
        hit(0.5, KICK, 90),
        hit(1.0, SNARE, 110),
        hit(2.0, KICK, 115),
        hit(2.75, KICK, 85),
        hit(3.0, SNARE, 110),
        hit(3.5, CLOSED_HIHAT, 70),
    ],
};

pub const ROCK_BASS: BassPattern = BassPattern {
    name: "rock",
    notes: &[
        note(0.0, 0, 0.9, 100),
        note(1.0, 0, 0.9, 90),
        note(2.0, 0, 0.9, 100),
        note(3.0, 0, 0.9, 90),
    ],
};

pub const ROCK_BASS_DRIVING: BassPattern = BassPattern {
    name: "rock_driving",
    notes: &[
        note(0.0, 0, 0.45, 100),
        note(0.5, 0, 0.45, 80),
        note(1.0, 0, 0.45, 95),
        note(1.5, 0, 0.45, 80),
        note(2.0, 0, 0.45, 100),
        note(2.5, 0, 0.45, 80),
        note(3.0, 0, 0.45, 95),
        note(3.5, 0, 0.45, 80),
    ],
};

// Funk

pub const FUNK_DRUMS: DrumPattern = DrumPattern {
    name: "funk",
    beats_per_bar: 4,
    hits: &[
        hit(0.0, KICK, 110),
        hit(0.75, KICK, 85),
        hit(1.5, KICK, 90),
        hit(2.5, KICK, 100),
        hit(3.25, KICK, 80),
        // backbeat plus ghost notes
        hit(0.5, SNARE, 40),
        hit(1.0, SNARE, 105),
        hit(2.25, SNARE, 35),
        hit(3.0, SNARE, 105),
        hit(3.75, SNARE, 45),
        hit(0.0, CLOSED_HIHAT, 75),
        hit(0.25, CLOSED_HIHAT, 50),
        hit(0.5, CLOSED_HIHAT, 65),
        hit(0.75, CLOSED_HIHAT, 50),
        hit(1.0, OPEN_HIHAT, 80),
        hit(1.25, CLOSED_HIHAT, 50),
        hit(1.5, CLOSED_HIHAT, 65),
        hit(1.75, CLOSED_HIHAT, 50),
        hit(2.0, CLOSED_HIHAT, 75),
        hit(2.25, CLOSED_HIHAT, 50),
        hit(2.5, CLOSED_HIHAT, 65),
        hit(2.75, CLOSED_HIHAT, 50),
        hit(3.0, OPEN_HIHAT, 80),
        hit(3.25, CLOSED_HIHAT, 50),
        hit(3.5, CLOSED_HIHAT, 65),
        hit(3.75, CLOSED_HIHAT, 50),
    ],
};

pub const FUNK_BASS: BassPattern = BassPattern {
    name: "funk",
    notes: &[
        note(0.0, 0, 0.4, 110),
        note(0.75, 0, 0.2, 80),
        note(1.25, 7, 0.3, 90),
        note(1.75, 0, 0.2, 75),
        note(2.5, 0, 0.4, 100),
        note(3.0, 5, 0.3, 85),
        note(3.5, 7, 0.3, 80),
    ],
};

// Ballad

pub const BALLAD_DRUMS: DrumPattern = DrumPattern {
    name: "ballad",
    beats_per_bar: 4,
    hits: &[
        hit(0.0, KICK, 70),
        hit(2.0, SIDE_STICK, 60),
        hit(0.0, CLOSED_HIHAT, 50),
        hit(1.0, CLOSED_HIHAT, 40),
        hit(2.0, CLOSED_HIHAT, 50),
        hit(3.0, CLOSED_HIHAT, 40),
    ],
};

pub const BALLAD_BASS: BassPattern = BassPattern {
    name: "ballad",
    notes: &[note(0.0, 0, 2.0, 80), note(2.0, 7, 2.0, 70)],
};

pub const BALLAD_COMP: CompingPattern = CompingPattern {
    name: "ballad_arp",
    voicing: CompVoicing::Arpeggio,
    hits: &[
        comp(0.0, 0.8, 60),
        comp(0.5, 0.8, 55),
        comp(1.0, 0.8, 50),
        comp(1.5, 0.8, 55),
        comp(2.0, 0.8, 60),
        comp(2.5, 0.8, 55),
        comp(3.0, 0.8, 50),
        comp(3.5, 0.8, 55),
    ],
};

// Latin

pub const LATIN_DRUMS: DrumPattern = DrumPattern {
    name: "latin",
    beats_per_bar: 4,
    hits: &[
        // son clave 3-2
        hit(0.0, CLAVES, 90),
        hit(0.75, CLAVES, 85),
        hit(1.5, CLAVES, 80),
        hit(2.5, CLAVES, 90),
        hit(3.5, CLAVES, 85),
        hit(0.0, KICK, 90),
        hit(2.5, KICK, 85),
        hit(0.0, COWBELL, 70),
        hit(0.5, COWBELL, 55),
        hit(1.0, COWBELL, 65),
        hit(1.5, COWBELL, 55),
        hit(2.0, COWBELL, 70),
        hit(2.5, COWBELL, 55),
        hit(3.0, COWBELL, 65),
        hit(3.5, COWBELL, 55),
    ],
};

pub const LATIN_BASS: BassPattern = BassPattern {
    name: "montuno",
    notes: &[
        note(0.0, 0, 0.4, 95),
        note(0.5, 7, 0.4, 80),
        note(1.5, 0, 0.4, 90),
        note(2.0, 7, 0.4, 85),
        note(2.5, 0, 0.4, 90),
        note(3.5, 5, 0.4, 80),
    ],
};

// Waltz

pub const WALTZ_DRUMS: DrumPattern = DrumPattern {
    name: "waltz",
    beats_per_bar: 3,
    hits: &[
        hit(0.0, KICK, 90),
        hit(1.0, CLOSED_HIHAT, 60),
        hit(2.0, CLOSED_HIHAT, 60),
    ],
};

pub const WALTZ_BASS: BassPattern = BassPattern {
    name: "waltz",
    notes: &[
        note(0.0, 0, 0.9, 95),
        note(1.0, 4, 0.9, 75),
        note(2.0, 7, 0.9, 75),
    ],
};

// Blues

pub const BLUES_DRUMS: DrumPattern = DrumPattern {
    name: "blues_shuffle",
    beats_per_bar: 4,
    hits: &[
        hit(0.0, KICK, 95),
        hit(0.0, CLOSED_HIHAT, 80),
        hit(0.67, CLOSED_HIHAT, 60),
        hit(1.0, CLOSED_HIHAT, 75),
        hit(1.0, SNARE, 90),
        hit(1.67, CLOSED_HIHAT, 60),
        hit(2.0, KICK, 90),
        hit(2.0, CLOSED_HIHAT, 80),
        hit(2.67, CLOSED_HIHAT, 60),
        hit(3.0, CLOSED_HIHAT, 75),
        hit(3.0, SNARE, 90),
        hit(3.67, CLOSED_HIHAT, 60),
    ],
};

pub const BLUES_BASS: BassPattern = BassPattern {
    name: "blues_shuffle",
    notes: &[
        note(0.0, 0, 0.6, 95),
        note(0.67, 0, 0.3, 80),
        note(1.0, 7, 0.6, 90),
        note(1.67, 7, 0.3, 75),
        note(2.0, 0, 0.6, 95),
        note(2.67, 0, 0.3, 80),
        note(3.0, 7, 0.6, 90),
        // sixth for the turnaround
        note(3.67, 9, 0.3, 75),
    ],
};
