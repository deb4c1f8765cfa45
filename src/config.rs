//! # Render Configuration
//!
//! Everything the arranger and the serializers read besides the score itself.
//!
//! ## YAML
//! ```yaml
//! style: bossa
//! tempo: 140
//! repeats: 2
//! variant: 0
//! ppq: 480
//! instruments:
//!   drums: { enabled: true, volume: 0.8 }
//!   bass: { volume: 1.0 }
//!   piano: { enabled: false }
//! ```
//!
//! Every key is optional. Instruments left out keep their defaults
//! (drums 0.8, bass 0.9, piano 0.7, all enabled).
//!
//! Volumes outside `[0.0, 1.0]`, a zero tempo and a zero ppq are rejected by
//! [`RenderConfig::validate`]; they are never clamped. An unknown style is not
//! an error: it renders as swing.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::BacklineError;
use crate::patterns::Style;
use crate::playback::Instrument;

pub const DEFAULT_TEMPO: u16 = 120;
pub const DEFAULT_PPQ: u16 = 480;

/// Per-instrument mixer settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub enabled: bool,
    /// Velocity scale in `[0.0, 1.0]`
    pub volume: f64,
}

impl InstrumentConfig {
    pub fn new(volume: f64) -> Self {
        Self {
            enabled: true,
            volume,
        }
    }
}

/// Mixer settings for every instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawInstrumentSettings")]
pub struct InstrumentSettings {
    pub drums: InstrumentConfig,
    pub bass: InstrumentConfig,
    pub piano: InstrumentConfig,
}

impl Default for InstrumentSettings {
    fn default() -> Self {
        Self {
            drums: InstrumentConfig::new(0.8),
            bass: InstrumentConfig::new(0.9),
            piano: InstrumentConfig::new(0.7),
        }
    }
}

impl InstrumentSettings {
    pub fn get(&self, instrument: Instrument) -> &InstrumentConfig {
        match instrument {
            Instrument::Drums => &self.drums,
            Instrument::Bass => &self.bass,
            Instrument::Piano => &self.piano,
        }
    }

    pub fn get_mut(&mut self, instrument: Instrument) -> &mut InstrumentConfig {
        match instrument {
            Instrument::Drums => &mut self.drums,
            Instrument::Bass => &mut self.bass,
            Instrument::Piano => &mut self.piano,
        }
    }

    /// Enabled instruments in track order.
    pub fn enabled(&self) -> impl Iterator<Item = Instrument> + '_ {
        Instrument::ALL
            .into_iter()
            .filter(move |instrument| self.get(*instrument).enabled)
    }
}

/// Raw instrument settings for YAML deserialization
#[derive(Deserialize, Debug, Default)]
struct RawInstrumentSettings {
    drums: Option<RawInstrument>,
    bass: Option<RawInstrument>,
    piano: Option<RawInstrument>,
}

#[derive(Deserialize, Debug, Default)]
struct RawInstrument {
    enabled: Option<bool>,
    volume: Option<f64>,
}

impl RawInstrument {
    fn merge(self, defaults: InstrumentConfig) -> InstrumentConfig {
        InstrumentConfig {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            volume: self.volume.unwrap_or(defaults.volume),
        }
    }
}

impl From<RawInstrumentSettings> for InstrumentSettings {
    fn from(raw: RawInstrumentSettings) -> Self {
        let defaults = InstrumentSettings::default();
        let merge = |raw: Option<RawInstrument>, fallback: InstrumentConfig| {
            raw.map(|r| r.merge(fallback)).unwrap_or(fallback)
        };
        Self {
            drums: merge(raw.drums, defaults.drums),
            bass: merge(raw.bass, defaults.bass),
            piano: merge(raw.piano, defaults.piano),
        }
    }
}

/// Render configuration
///
/// # Example
/// ```
/// use backline::{Instrument, RenderConfig};
///
/// let config = RenderConfig::new("bossa")
///     .with_tempo(140)
///     .with_repeats(2)
///     .with_volume(Instrument::Bass, 1.0)
///     .without(Instrument::Piano);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.enabled_instruments().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RenderConfig {
    /// Style name; unknown names render as swing
    pub style: String,
    /// Beats per minute
    pub tempo: u16,
    /// Full passes over the score; 0 renders nothing
    pub repeats: u32,
    pub instruments: InstrumentSettings,
    /// Which template to use when a style offers several
    pub variant: usize,
    /// MIDI ticks per quarter note
    pub ppq: u16,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            style: Style::default().name().to_string(),
            tempo: DEFAULT_TEMPO,
            repeats: 1,
            instruments: InstrumentSettings::default(),
            variant: 0,
            ppq: DEFAULT_PPQ,
        }
    }
}

impl RenderConfig {
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            ..Self::default()
        }
    }

    pub fn with_tempo(mut self, tempo: u16) -> Self {
        self.tempo = tempo;
        self
    }

    pub fn with_repeats(mut self, repeats: u32) -> Self {
        self.repeats = repeats;
        self
    }

    pub fn with_variant(mut self, variant: usize) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_ppq(mut self, ppq: u16) -> Self {
        self.ppq = ppq;
        self
    }

    pub fn with_volume(mut self, instrument: Instrument, volume: f64) -> Self {
        self.instruments.get_mut(instrument).volume = volume;
        self
    }

    /// Disable an instrument.
    pub fn without(mut self, instrument: Instrument) -> Self {
        self.instruments.get_mut(instrument).enabled = false;
        self
    }

    /// Resolved style (unknown names become swing).
    pub fn style(&self) -> Style {
        Style::resolve(&self.style)
    }

    pub fn enabled_instruments(&self) -> impl Iterator<Item = Instrument> + '_ {
        self.instruments.enabled()
    }

    /// Check every value the renderer cannot repair on its own.
    ///
    /// # Errors
    /// [`BacklineError::InvalidConfig`] for a zero tempo, a zero ppq, or any
    /// volume outside `[0.0, 1.0]` (including NaN).
    pub fn validate(&self) -> Result<(), BacklineError> {
        if self.tempo == 0 {
            return Err(BacklineError::InvalidConfig(
                "tempo must be greater than 0".to_string(),
            ));
        }
        if self.ppq == 0 {
            return Err(BacklineError::InvalidConfig(
                "ppq must be greater than 0".to_string(),
            ));
        }
        for instrument in Instrument::ALL {
            let volume = self.instruments.get(instrument).volume;
            if !(0.0..=1.0).contains(&volume) {
                return Err(BacklineError::InvalidConfig(format!(
                    "{} volume {} is outside [0.0, 1.0]",
                    instrument, volume
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a YAML configuration.
    ///
    /// ```
    /// use backline::RenderConfig;
    ///
    /// let config = RenderConfig::from_yaml("style: waltz\ntempo: 90\n")?;
    /// assert_eq!(config.tempo, 90);
    /// assert_eq!(config.repeats, 1);
    /// # Ok::<(), backline::BacklineError>(())
    /// ```
    pub fn from_yaml(content: &str) -> Result<Self, BacklineError> {
        // serde_yaml rejects an empty document
        let config: RenderConfig = if content.trim().is_empty() {
            RenderConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| BacklineError::InvalidConfig(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, BacklineError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn to_yaml(&self) -> Result<String, BacklineError> {
        serde_yaml::to_string(self).map_err(|e| BacklineError::Serialization(e.to_string()))
    }
}
