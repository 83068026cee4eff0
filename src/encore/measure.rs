use crate::error::{FormatError, Warning};
use crate::record_parser::{Field, Record, TaggedRecord};

use super::element::{Element, MIN_ELEMENT_SIZE};

/// Terminates the element stream of a measure.
pub const END_MARKER: [u8; 2] = [0xff, 0xff];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Measure {
    pub id: usize,
    pub offset: usize,
    pub raw: Vec<u8>,

    pub var_size: i32,
    pub bpm: u16,
    pub time_sig_glyph: u8,
    pub beat_ticks: u16,
    pub duration_ticks: u16,
    pub time_sig_num: u8,
    pub time_sig_den: u8,
    pub bar_type_start: u8,
    pub bar_type_end: u8,
    pub repeat_marker: u8,
    pub repeat_alternative: u8,
    pub coda: u32,

    pub elements: Vec<Element>,
    /// Sum of the durations of all previous measures.
    pub absolute_tick: u32,
}

impl Record for Measure {
    const SIZE: usize = 62;
    const FIELDS: &'static [Field<Self>] = &[
        Field::u32("var_size", 4, |r, v| r.var_size = v.i32()),
        Field::u16("bpm", 8, |r, v| r.bpm = v.u16()),
        Field::u8("time_sig_glyph", 10, |r, v| r.time_sig_glyph = v.u8()),
        Field::u16("beat_ticks", 12, |r, v| r.beat_ticks = v.u16()),
        Field::u16("duration_ticks", 14, |r, v| r.duration_ticks = v.u16()),
        Field::u8("time_sig_num", 16, |r, v| r.time_sig_num = v.u8()),
        Field::u8("time_sig_den", 17, |r, v| r.time_sig_den = v.u8()),
        Field::u8("bar_type_start", 20, |r, v| r.bar_type_start = v.u8()),
        Field::u8("bar_type_end", 21, |r, v| r.bar_type_end = v.u8()),
        Field::u8("repeat_marker", 22, |r, v| r.repeat_marker = v.u8()),
        Field::u8("repeat_alternative", 23, |r, v| r.repeat_alternative = v.u8()),
        Field::u32("coda", 33, |r, v| r.coda = v.u32()),
    ];
}

impl TaggedRecord for Measure {
    const NAME: &'static str = "measure";
    const TAG: &'static [u8] = b"MEAS";
    const FIXED_SIZE: usize = 62;
}

/// Zero bytes, optionally behind an end marker, left where the end marker
/// alone was expected.
fn is_padding(rest: &[u8]) -> bool {
    rest.strip_prefix(&END_MARKER)
        .unwrap_or(rest)
        .iter()
        .all(|&b| b == 0)
}

impl Measure {
    pub fn time_signature(&self) -> (u8, u8) {
        (self.time_sig_num, self.time_sig_den)
    }

    /// Parses the element stream following the fixed header. `offset` is the
    /// file offset of the stream. A missing end marker is tolerated when
    /// nothing but zero bytes is left, and reported as a warning.
    pub fn read_elements(
        &mut self,
        stream: &[u8],
        offset: usize,
    ) -> Result<Option<Warning>, FormatError> {
        let mut rest = stream;
        let mut offset = offset;

        while rest.len() >= MIN_ELEMENT_SIZE as usize
            && rest[..2] != END_MARKER
            && !is_padding(rest)
        {
            let size = *rest.get(3).ok_or(FormatError::Truncated {
                record: "element",
                offset,
                needed: 4,
                available: rest.len(),
            })?;
            if size < MIN_ELEMENT_SIZE {
                return Err(FormatError::ElementTooSmall { offset, size });
            }
            let raw = rest.get(..size as usize).ok_or(FormatError::Truncated {
                record: "element",
                offset,
                needed: size as usize,
                available: rest.len(),
            })?;

            self.elements.push(Element::decode(raw, offset));
            rest = &rest[size as usize..];
            offset += size as usize;
        }

        if rest == END_MARKER {
            return Ok(None);
        }

        if is_padding(rest) {
            return Ok(Some(Warning::MissingSentinel {
                measure: self.id,
                offset,
                remainder: rest.to_vec(),
            }));
        }

        Err(FormatError::BadSentinel {
            measure: self.id,
            offset,
            remainder: rest.to_vec(),
        })
    }
}
