//! encly - Encore score to LilyPond converter
//!
//! Decodes the binary Encore score format into a linked [`Document`], then
//! sequences every staff/voice pair into LilyPond notation.

pub mod convert;
pub mod encore;
pub mod error;
pub mod partition;
pub mod record_parser;
pub mod score;
pub mod sequencer;
pub mod types;
pub mod util;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use convert::{Conversion, ConvertOptions, convert_bytes, convert_document};
pub use encore::{Document, ElementId, read_document};
pub use error::{Anomaly, AnomalyKind, Error, FormatError, SequenceError, Warning};
pub use partition::VoiceKey;
pub use score::Score;

pub type Result<T> = std::result::Result<T, Error>;
