//! Declarative configuration for gestura.
//!
//! - [`Preset`]: manager options plus an ordered recognizer list with
//!   simultaneous and require-failure relations
//! - [`Trace`]: a recorded stream of pointer events that can be replayed
//!   into a manager
//!
//! Both load from YAML, TOML or JSON, picked by file extension.

mod error;
mod format;
mod preset;
mod trace;

pub use error::ConfigError;
pub use format::Format;
pub use preset::{Preset, RecognizerConfig, RecognizerSpec};
pub use trace::{RecordedGesture, Trace, TraceEvent};
