use crate::record_parser::{Field, Record, TaggedRecord};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub line_count: i16,
    pub page_count: i16,
    pub staff_count: u8,
    pub staff_per_system: u8,
    pub measure_count: i16,
}

impl Header {
    /// Offset of the first staff record, embedded in the header block.
    pub const FIRST_STAFF_OFFSET: usize = 194;
}

impl Record for Header {
    const SIZE: usize = 194;
    const FIELDS: &'static [Field<Self>] = &[
        Field::u16("line_count", 0x2e, |r, v| r.line_count = v.i16()),
        Field::u16("page_count", 0x30, |r, v| r.page_count = v.i16()),
        Field::u8("staff_count", 0x32, |r, v| r.staff_count = v.u8()),
        Field::u8("staff_per_system", 0x33, |r, v| r.staff_per_system = v.u8()),
        Field::u16("measure_count", 0x34, |r, v| r.measure_count = v.i16()),
    ];
}

impl TaggedRecord for Header {
    const NAME: &'static str = "header";
    const TAG: &'static [u8] = b"SCOW";
    const FIXED_SIZE: usize = Header::FIRST_STAFF_OFFSET;
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "systems {} pages {} staves {} staves/system {} measures {}",
            self.line_count,
            self.page_count,
            self.staff_count,
            self.staff_per_system,
            self.measure_count
        )
    }
}

/// The 8-byte prefix shared by staff and line records: tag and payload size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockHead {
    pub var_size: u32,
}

impl Record for BlockHead {
    const SIZE: usize = 8;
    const FIELDS: &'static [Field<Self>] = &[Field::u32("var_size", 4, |r, v| r.var_size = v.u32())];
}

/// Staff head, tagged `TK00` or `TK01` depending on the file version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffHead(pub BlockHead);

impl Record for StaffHead {
    const SIZE: usize = 8;
    const FIELDS: &'static [Field<Self>] = &[];

    fn fill_embedded(&mut self, raw: &[u8]) {
        crate::record_parser::fill(raw, &mut self.0);
    }
}

impl TaggedRecord for StaffHead {
    const NAME: &'static str = "staff";
    const TAG: &'static [u8] = b"TK0";
    const FIXED_SIZE: usize = 8;
}

/// One instrument track. Offsets are relative to the start of the staff
/// record, head included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Staff {
    pub id: usize,
    pub offset: usize,
    pub raw: Vec<u8>,

    pub name: [u8; 10],
    /// In semitones; a B-flat clarinet is -2.
    pub transposition: i8,
    /// Same codes as the system staff clef.
    pub clef: u8,

    // Unverified, carried as-is.
    pub unknown_164: u8,
    pub piano_flag: u8,
    pub midi_channels: [u8; 8],
    pub midi_programs: [u8; 8],
    pub midi_volumes: [u8; 8],
}

fn copy_into<const N: usize>(dest: &mut [u8; N], src: &[u8]) {
    let n = src.len().min(N);
    dest[..n].copy_from_slice(&src[..n]);
}

impl Record for Staff {
    const SIZE: usize = 242;
    const FIELDS: &'static [Field<Self>] = &[
        Field::bytes("name", 8, 10, |r, v| copy_into(&mut r.name, v.bytes())),
        Field::u8("unknown_164", 164, |r, v| r.unknown_164 = v.u8()),
        Field::u8("transposition", 165, |r, v| r.transposition = v.i8()),
        Field::u8("clef", 172, |r, v| r.clef = v.u8()),
        Field::bytes("midi_channels", 180, 8, |r, v| {
            copy_into(&mut r.midi_channels, v.bytes())
        }),
        Field::u8("piano_flag", 181, |r, v| r.piano_flag = v.u8()),
        Field::bytes("midi_programs", 188, 8, |r, v| {
            copy_into(&mut r.midi_programs, v.bytes())
        }),
        Field::bytes("midi_volumes", 196, 8, |r, v| {
            copy_into(&mut r.midi_volumes, v.bytes())
        }),
    ];
}

impl Staff {
    /// Display name up to the first NUL byte.
    pub fn display_name(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        String::from_utf8_lossy(&self.name[..end]).trim().to_string()
    }
}

/// Page layout record. Only its tag is understood.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub id: usize,
    pub offset: usize,
    pub raw: Vec<u8>,
}

impl Record for Page {
    const SIZE: usize = 34;
    const FIELDS: &'static [Field<Self>] = &[];
}

impl TaggedRecord for Page {
    const NAME: &'static str = "page";
    const TAG: &'static [u8] = b"PAGE";
    const FIXED_SIZE: usize = 34;
}
