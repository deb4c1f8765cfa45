//! # Error Types
//!
//! This module defines all error types for the accompaniment renderer.
//!
//! Unknown-but-benign values (an unrecognized chord quality, an unknown style
//! name) are never errors: they resolve through documented fallbacks so a
//! render always completes. Everything here is something the caller did or
//! something the environment lacks.
//!
//! ## Error Types
//! - `InvalidInput` - A progression or score input that cannot be coerced
//! - `MetadataError` - Invalid YAML frontmatter or time signature text
//! - `InvalidConfig` - Configuration rejected at the boundary
//! - `Environment` - A requested backend is not available
//! - `Serialization` - MIDI or JSON encoding/decoding failures
//! - `Io` - Writing output files
//!
//! ## Usage
//! ```rust
//! use backline::{render_chart, BacklineError, RenderConfig};
//!
//! match render_chart("| C | Am | F | G |", &RenderConfig::default()) {
//!     Ok(performance) => println!("{} beats", performance.total_beats),
//!     Err(BacklineError::InvalidConfig(message)) => eprintln!("Bad config: {}", message),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacklineError {
    /// The input could not be turned into a score.
    ///
    /// # Example
    /// ```
    /// # use backline::BacklineError;
    /// let err = BacklineError::InvalidInput("measure 2 is empty".to_string());
    /// assert_eq!(err.to_string(), "Invalid input: measure 2 is empty");
    /// ```
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid metadata error.
    ///
    /// Occurs when chart frontmatter is not valid YAML or carries unsupported values.
    ///
    /// # Example
    /// ```
    /// # use backline::BacklineError;
    /// let err = BacklineError::MetadataError("time-signature must be in format N/D".to_string());
    /// assert_eq!(err.to_string(), "Invalid metadata: time-signature must be in format N/D");
    /// ```
    #[error("Invalid metadata: {0}")]
    MetadataError(String),

    /// Configuration values outside their legal range.
    ///
    /// Volumes outside `[0.0, 1.0]` land here instead of being clamped.
    ///
    /// # Example
    /// ```
    /// # use backline::BacklineError;
    /// let err = BacklineError::InvalidConfig("bass volume 1.5 is outside [0.0, 1.0]".to_string());
    /// assert_eq!(err.to_string(), "Invalid configuration: bass volume 1.5 is outside [0.0, 1.0]");
    /// ```
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A rendering backend was requested but is not available.
    ///
    /// The caller can fix the environment and retry, or pick another backend.
    ///
    /// # Example
    /// ```
    /// # use backline::BacklineError;
    /// let err = BacklineError::Environment {
    ///     backend: "mma".to_string(),
    ///     message: "not installed".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Backend 'mma' unavailable: not installed");
    /// ```
    #[error("Backend '{backend}' unavailable: {message}")]
    Environment { backend: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
