//! # Playback Module
//!
//! Expand a chord chart into a multi-track accompaniment.
//!
//! ## Purpose
//! This module is the heart of the crate. It converts a [`Score`](crate::Score)
//! into per-instrument note events:
//! 1. **Drums** - fixed GM percussion hits from the style's groove
//! 2. **Bass** - a bass line shaped around each chord root, low register
//! 3. **Piano** - comping rhythms voicing up to four chord tones, mid register
//!
//! ## Sub-modules
//! - `types` - Performance, NoteEvent, Instrument type definitions
//! - `engine` - The arranger itself
//!
//! ## Key Types
//! - [`Performance`] - Complete render (tracks + tempo + meter + length)
//! - [`NoteEvent`] - Single note with absolute start, pitch, length, velocity, channel
//! - [`Instrument`] - Track identity and its fixed MIDI channel
//!
//! ## Entry Points
//! - [`render()`] - Validate a configuration and render a score
//! - [`Arranger`] - Render with a custom pitch resolver
//!
//! ## Example
//! ```rust
//! use backline::playback::render;
//! use backline::{parse_chart, Instrument, RenderConfig};
//!
//! let score = parse_chart("| C | Am | F | G |")?;
//! let performance = render(&score, &RenderConfig::new("rock"))?;
//!
//! assert_eq!(performance.total_beats, 16);
//! assert_eq!(performance.track(Instrument::Bass)[0].start, 0.0);
//! # Ok::<(), backline::BacklineError>(())
//! ```
//!
//! ## Timing
//!
//! All times are in beats from the top of the performance. A beat cursor
//! advances by one bar per measure and never rewinds; repeats simply keep
//! walking the score. Inside a bar each chord owns a slice of whole beats and
//! only template entries that start inside the slice are played.

mod engine;
mod types;

#[cfg(test)]
mod tests;

pub use engine::{render, scale_velocity, Arranger};
pub use types::{Instrument, NoteEvent, Performance};
