//! Rendering backends
//!
//! A backend turns a score into MIDI bytes. The built-in backend arranges
//! the score itself; the MMA backend writes a script and hands it to a
//! host-supplied runner, since launching external tools is the host's job.
//!
//! Backend availability is never probed here. The caller states what the
//! environment offers through [`Capabilities`] and [`select_backend`] decides.
//!
//! ## Example
//! ```rust
//! use backline::{select_backend, BackendKind, Capabilities, BacklineError};
//!
//! let caps = Capabilities::default();
//! assert_eq!(select_backend(BackendKind::Auto, &caps)?, BackendKind::Builtin);
//!
//! let err = select_backend(BackendKind::Mma, &caps).unwrap_err();
//! assert!(matches!(err, BacklineError::Environment { .. }));
//! # Ok::<(), BacklineError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::RenderConfig;
use crate::error::BacklineError;
use crate::ireal::ExternalChartParser;
use crate::midi;
use crate::mma;
use crate::playback::Arranger;
use crate::score::{ensure_score_with, Metadata, Score, ScoreInput};

/// Something that renders a score to Standard MIDI File bytes.
pub trait Backend {
    fn name(&self) -> &str;

    fn render(&self, score: &Score, config: &RenderConfig) -> Result<Vec<u8>, BacklineError>;
}

/// Arranger plus SMF encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinBackend;

impl Backend for BuiltinBackend {
    fn name(&self) -> &str {
        "builtin"
    }

    fn render(&self, score: &Score, config: &RenderConfig) -> Result<Vec<u8>, BacklineError> {
        config.validate()?;
        let performance = Arranger::new().arrange(score, config);
        midi::to_smf_bytes(&performance, config.ppq)
    }
}

/// Hands an MMA script to `runner`, which returns the MIDI it produced.
///
/// ```
/// use backline::backend::{Backend, MmaBackend};
/// use backline::{parse_chart, RenderConfig};
///
/// let backend = MmaBackend::new(|script: &str| Ok(script.as_bytes().to_vec()));
/// let score = parse_chart("| C | G |")?;
/// let bytes = backend.render(&score, &RenderConfig::default())?;
/// assert!(String::from_utf8_lossy(&bytes).contains("Groove Swing"));
/// # Ok::<(), backline::BacklineError>(())
/// ```
pub struct MmaBackend<F> {
    runner: F,
}

impl<F> MmaBackend<F>
where
    F: Fn(&str) -> Result<Vec<u8>, BacklineError>,
{
    pub fn new(runner: F) -> Self {
        Self { runner }
    }
}

impl<F> Backend for MmaBackend<F>
where
    F: Fn(&str) -> Result<Vec<u8>, BacklineError>,
{
    fn name(&self) -> &str {
        "mma"
    }

    fn render(&self, score: &Score, config: &RenderConfig) -> Result<Vec<u8>, BacklineError> {
        config.validate()?;
        let script = mma::to_mma_script(score, config);
        tracing::debug!(bytes = script.len(), "handing script to mma runner");
        (self.runner)(&script)
    }
}

/// Backend the caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Auto,
    Builtin,
    Mma,
}

/// What the host environment can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub mma: bool,
}

/// Resolve a requested backend against the environment.
///
/// `Auto` prefers MMA when it is available and the built-in renderer otherwise.
///
/// # Errors
/// [`BacklineError::Environment`] when MMA is requested but not available.
pub fn select_backend(
    requested: BackendKind,
    capabilities: &Capabilities,
) -> Result<BackendKind, BacklineError> {
    let selected = match requested {
        BackendKind::Auto if capabilities.mma => BackendKind::Mma,
        BackendKind::Auto | BackendKind::Builtin => BackendKind::Builtin,
        BackendKind::Mma if capabilities.mma => BackendKind::Mma,
        BackendKind::Mma => {
            return Err(BacklineError::Environment {
                backend: "mma".to_string(),
                message: "MMA backend requested but MMA is not available; \
                          install MMA or use the builtin backend"
                    .to_string(),
            })
        }
    };
    tracing::info!(requested = ?requested, selected = ?selected, "selected backend");
    Ok(selected)
}

/// Coerce `input`, render it with `backend` and write the MIDI to `path`.
///
/// A `.mid` extension is added unless the path already ends in `.mid` or
/// `.midi`. Returns the path actually written.
///
/// # Example
/// ```no_run
/// use backline::{generate_midi_file, BuiltinBackend, RenderConfig};
///
/// let path = generate_midi_file("| C | Am | F | G |", &RenderConfig::new("rock"), &BuiltinBackend, "song")?;
/// assert_eq!(path.extension().and_then(|e| e.to_str()), Some("mid"));
/// # Ok::<(), backline::BacklineError>(())
/// ```
pub fn generate_midi_file(
    input: impl Into<ScoreInput>,
    config: &RenderConfig,
    backend: &dyn Backend,
    path: impl AsRef<Path>,
) -> Result<PathBuf, BacklineError> {
    generate_midi_file_with(input, &Metadata::default(), None, config, backend, path)
}

/// [`generate_midi_file`] with caller metadata defaults and an optional
/// external parser for chart URLs, as in [`ensure_score_with`].
pub fn generate_midi_file_with(
    input: impl Into<ScoreInput>,
    defaults: &Metadata,
    url_parser: Option<&dyn ExternalChartParser>,
    config: &RenderConfig,
    backend: &dyn Backend,
    path: impl AsRef<Path>,
) -> Result<PathBuf, BacklineError> {
    config.validate()?;
    let score = ensure_score_with(input, defaults, url_parser)?;
    let bytes = backend.render(&score, config)?;

    let path = midi_path(path.as_ref());
    std::fs::write(&path, bytes)?;
    tracing::info!(backend = backend.name(), path = %path.display(), "wrote accompaniment");
    Ok(path)
}

fn midi_path(path: &Path) -> PathBuf {
    let has_midi_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mid") || ext.eq_ignore_ascii_case("midi"));

    if has_midi_extension {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".mid");
        PathBuf::from(name)
    }
}
