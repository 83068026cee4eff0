use crate::error::FormatError;
use crate::record_parser::{Field, Record, TaggedRecord, decode, fill};

use super::header::BlockHead;

/// Line head, tag and payload size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineHead(pub BlockHead);

impl Record for LineHead {
    const SIZE: usize = 8;
    const FIELDS: &'static [Field<Self>] = &[];

    fn fill_embedded(&mut self, raw: &[u8]) {
        fill(raw, &mut self.0);
    }
}

impl TaggedRecord for LineHead {
    const NAME: &'static str = "line";
    const TAG: &'static [u8] = b"LINE";
    const FIXED_SIZE: usize = 8;
}

/// Fixed region of the line payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineData {
    pub measure_start: u16,
    pub measure_count: u8,
}

impl Record for LineData {
    const SIZE: usize = LineData::STAFF_BLOCKS_OFFSET;
    const FIELDS: &'static [Field<Self>] = &[
        Field::u16("measure_start", 10, |r, v| r.measure_start = v.u16()),
        Field::u8("measure_count", 12, |r, v| r.measure_count = v.u8()),
    ];
}

impl LineData {
    pub const STAFF_BLOCKS_OFFSET: usize = 26;
}

/// Clef, key and placement of one staff within one system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineStaffData {
    pub id: usize,
    pub clef: u8,
    pub key: u8,
    pub page_index: u8,
    pub staff_type: u8,
    pub staff_index: u8,
}

impl Record for LineStaffData {
    const SIZE: usize = LineStaffData::BLOCK_SIZE;
    const FIELDS: &'static [Field<Self>] = &[
        Field::u8("clef", 1, |r, v| r.clef = v.u8()),
        Field::u8("key", 2, |r, v| r.key = v.u8()),
        Field::u8("page_index", 3, |r, v| r.page_index = v.u8()),
        Field::u8("staff_type", 7, |r, v| r.staff_type = v.u8()),
        Field::u8("staff_index", 8, |r, v| r.staff_index = v.u8()),
    ];
}

impl LineStaffData {
    pub const BLOCK_SIZE: usize = 30;
}

/// A printed system: a run of measures plus per-staff settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub id: usize,
    pub offset: usize,
    pub raw: Vec<u8>,
    pub data: LineData,
    pub staves: Vec<LineStaffData>,
}

impl Line {
    /// Builds a line from its head bytes and the variable payload following them.
    pub fn from_parts(
        id: usize,
        offset: usize,
        head: &[u8],
        payload: &[u8],
    ) -> Result<Self, FormatError> {
        let data: LineData = decode(payload);
        let blocks = payload
            .get(LineData::STAFF_BLOCKS_OFFSET..)
            .unwrap_or_default();
        if blocks.len() % LineStaffData::BLOCK_SIZE != 0 {
            return Err(FormatError::BadStaffBlock {
                offset,
                len: blocks.len(),
            });
        }

        let staves = blocks
            .chunks_exact(LineStaffData::BLOCK_SIZE)
            .enumerate()
            .map(|(id, block)| LineStaffData {
                id,
                ..decode(block)
            })
            .collect();

        let mut raw = head.to_vec();
        raw.extend_from_slice(payload);
        Ok(Self {
            id,
            offset,
            raw,
            data,
            staves,
        })
    }

    pub fn measure_start(&self) -> usize {
        self.data.measure_start as usize
    }

    /// Index one past the last measure of the system.
    pub fn measure_end(&self) -> usize {
        self.measure_start() + self.data.measure_count as usize
    }

    pub fn covers(&self, measure: usize) -> bool {
        (self.measure_start()..self.measure_end()).contains(&measure)
    }

    pub fn staff(&self, staff: usize) -> Option<&LineStaffData> {
        self.staves.get(staff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_parser::check_layout;

    fn payload(start: u16, count: u8, blocks: &[(u8, u8)]) -> Vec<u8> {
        let mut data = vec![0u8; LineData::STAFF_BLOCKS_OFFSET];
        data[10..12].copy_from_slice(&start.to_le_bytes());
        data[12] = count;
        for (i, (clef, key)) in blocks.iter().enumerate() {
            let mut block = [0u8; 30];
            block[1] = *clef;
            block[2] = *key;
            block[8] = i as u8;
            data.extend_from_slice(&block);
        }
        data
    }

    #[test]
    fn test_layouts() {
        check_layout::<LineHead>();
        check_layout::<LineData>();
        check_layout::<LineStaffData>();
    }

    #[test]
    fn test_line_staves() {
        let head = b"LINE\x56\0\0\0";
        let line = Line::from_parts(0, 100, head, &payload(4, 3, &[(0, 8), (1, 8)])).unwrap();
        assert_eq!(line.measure_start(), 4);
        assert_eq!(line.measure_end(), 7);
        assert!(line.covers(6));
        assert!(!line.covers(7));
        assert_eq!(line.staves.len(), 2);
        assert_eq!(line.staff(1).map(|s| (s.clef, s.key, s.staff_index)), Some((1, 8, 1)));
        assert_eq!(line.raw.len(), 8 + 86);
    }

    #[test]
    fn test_short_payload_has_no_staves() {
        let line = Line::from_parts(0, 0, b"LINE\0\0\0\0", &[0u8; 13]).unwrap();
        assert!(line.staves.is_empty());
    }

    #[test]
    fn test_partial_staff_block() {
        let mut data = payload(0, 1, &[(0, 0)]);
        data.pop();
        let err = Line::from_parts(0, 40, b"LINE\0\0\0\0", &data).unwrap_err();
        assert_eq!(err, FormatError::BadStaffBlock { offset: 40, len: 29 });
    }
}
