use crate::partition::VoiceKey;
use std::fmt;
use thiserror::Error;

/// Structural corruption in the input buffer. Decoding of the whole file stops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("{record} at byte {offset:#x}: got tag {found:?}, want {expected:?}")]
    TagMismatch {
        record: &'static str,
        expected: String,
        found: String,
        offset: usize,
    },

    #[error("{record} at byte {offset:#x}: need {needed} bytes, {available} available")]
    Truncated {
        record: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("{record} at byte {offset:#x}: invalid {what} {value}")]
    BadCount {
        record: &'static str,
        what: &'static str,
        value: i64,
        offset: usize,
    },

    #[error("line at byte {offset:#x}: staff block of {len} bytes is not a multiple of 30")]
    BadStaffBlock { offset: usize, len: usize },

    #[error("element at byte {offset:#x}: declared size {size} is smaller than its header")]
    ElementTooSmall { offset: usize, size: u8 },

    #[error("measure {measure} at byte {offset:#x}: end marker not found, have {remainder:02x?}")]
    BadSentinel {
        measure: usize,
        offset: usize,
        remainder: Vec<u8>,
    },

    #[error("element at byte {offset:#x}: staff {staff} out of range ({staff_count} staves)")]
    BadStaffIndex {
        offset: usize,
        staff: usize,
        staff_count: usize,
    },
}

/// Unsupported structure found while sequencing a voice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("{key}: tuplet opened at tick {tick} while the tuplet ending at {open_until} is active")]
    OverlappingTuplet {
        key: VoiceKey,
        tick: u32,
        open_until: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

/// Recoverable oddity found while decoding; the document is still usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    MissingSentinel {
        measure: usize,
        offset: usize,
        remainder: Vec<u8>,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingSentinel {
                measure,
                offset,
                remainder,
            } => write!(
                f,
                "measure {} at byte {:#x}: end marker not found, have {:02x?}",
                measure, offset, remainder
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnomalyKind {
    #[error("tie without preceding note")]
    TieWithoutNote,
    #[error("chord note without preceding chord")]
    OrphanChordNote,
    #[error("alteration {0} out of range, using natural")]
    AlterationOutOfRange(i32),
    #[error("unknown clef {0}, using treble")]
    UnknownClef(u8),
    #[error("unknown key {0}, using c major")]
    UnknownKey(u8),
}

/// Notation oddity in one voice. Conversion continues with a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    pub key: VoiceKey,
    pub tick: u32,
    pub kind: AnomalyKind,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} tick {}: {}", self.key, self.tick, self.kind)
    }
}
