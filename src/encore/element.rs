//! Measure elements: a common header plus one payload per element type.

use crate::record_parser::{Field, Record, decode, fill};
use num_rational::Rational64;

/// Ticks in a whole note: 16 sixteenths of 60 ticks.
pub const WHOLE_NOTE_TICKS: i64 = 960;

pub const TYPE_CLEF: u8 = 1;
pub const TYPE_KEYCHANGE: u8 = 2;
pub const TYPE_TIE: u8 = 3;
pub const TYPE_BEAM: u8 = 4;
pub const TYPE_ORNAMENT: u8 = 5;
pub const TYPE_REST: u8 = 8;
pub const TYPE_NOTE: u8 = 9;

/// Ornaments are told apart by their size byte.
const ORNAMENT_SCRIPT_SIZE: u8 = 16;
const ORNAMENT_SLUR_SIZE: u8 = 28;

/// Smallest size an element may declare.
pub const MIN_ELEMENT_SIZE: u8 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementHeader {
    /// Relative to the measure start.
    pub tick: u16,
    /// `type << 4 | voice`
    pub type_voice: u8,
    pub size: u8,
    pub staff: u8,
}

impl Record for ElementHeader {
    const SIZE: usize = 5;
    const FIELDS: &'static [Field<Self>] = &[
        Field::u16("tick", 0, |r, v| r.tick = v.u16()),
        Field::u8("type_voice", 2, |r, v| r.type_voice = v.u8()),
        Field::u8("size", 3, |r, v| r.size = v.u8()),
        Field::u8("staff", 4, |r, v| r.staff = v.u8()),
    ];
}

/// Duration block shared by notes and rests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WithDuration {
    /// Low nibble: 3 = quarter, 4 = eighth, ... High nibble: note head.
    pub face_value: u8,
    /// `den << 4 | num`, so 0x32 is 2/3 for a triplet. Zero means no tuplet.
    pub tuplet: u8,
    /// `& 3`: dot count, `& 4`: vertical dot position.
    pub dot_control: u8,
    pub playback_ticks: u16,
}

impl Record for WithDuration {
    const SIZE: usize = 18;
    const FIELDS: &'static [Field<Self>] = &[
        Field::u8("face_value", 5, |r, v| r.face_value = v.u8()),
        Field::u8("tuplet", 13, |r, v| r.tuplet = v.u8()),
        Field::u8("dot_control", 14, |r, v| r.dot_control = v.u8()),
        Field::u16("playback_ticks", 16, |r, v| r.playback_ticks = v.u16()),
    ];
}

impl WithDuration {
    /// Log2 of the duration relative to a whole note; 2 is a quarter.
    pub fn duration_log(&self) -> i32 {
        (self.face_value & 0xf) as i32 - 1
    }

    /// Only single dots are understood.
    pub fn dots(&self) -> u8 {
        if self.dot_control & 0x3 == 1 { 1 } else { 0 }
    }

    pub fn tuplet_num(&self) -> u8 {
        self.tuplet & 0xf
    }

    pub fn tuplet_den(&self) -> u8 {
        self.tuplet >> 4
    }

    /// The tuplet ratio, when the element carries a usable one.
    pub fn tuplet_ratio(&self) -> Option<(u8, u8)> {
        match self.tuplet_den() {
            0 => None,
            den => Some((self.tuplet_num(), den)),
        }
    }

    pub fn duration_ticks(&self) -> u32 {
        let mut ticks = Rational64::from_integer(WHOLE_NOTE_TICKS);
        let log = self.duration_log();
        if log >= 0 {
            ticks /= Rational64::from_integer(1 << log);
        } else {
            ticks *= Rational64::from_integer(1 << -log);
        }
        if self.dots() == 1 {
            ticks *= Rational64::new(3, 2);
        }
        if let Some((num, den)) = self.tuplet_ratio() {
            ticks *= Rational64::new(num as i64, den as i64);
        }
        ticks.to_integer() as u32
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Note {
    pub duration: WithDuration,
    pub grace: u8,
    pub x_offset: u8,
    /// Diatonic steps above the ledger line below the staff; the top line is 10.
    pub position: i8,
    /// Sounding pitch without the staff transposition; 60 is middle C.
    pub semitone_pitch: u8,
    pub velocity: u8,
    /// 128 is the stem-down bit.
    pub options: u8,
    /// 1 sharp, 2 flat, 3 natural, 4 double sharp, 5 double flat.
    pub alteration_glyph: u8,
    pub articulation_up: u8,
    pub articulation_down: u8,
}

impl Record for Note {
    const SIZE: usize = 28;
    const FIELDS: &'static [Field<Self>] = &[
        Field::u8("grace", 6, |r, v| r.grace = v.u8()),
        Field::u8("x_offset", 10, |r, v| r.x_offset = v.u8()),
        Field::u8("position", 12, |r, v| r.position = v.i8()),
        Field::u8("semitone_pitch", 15, |r, v| r.semitone_pitch = v.u8()),
        Field::u8("velocity", 19, |r, v| r.velocity = v.u8()),
        Field::u8("options", 20, |r, v| r.options = v.u8()),
        Field::u8("alteration_glyph", 21, |r, v| r.alteration_glyph = v.u8()),
        Field::u8("articulation_up", 24, |r, v| r.articulation_up = v.u8()),
        Field::u8("articulation_down", 26, |r, v| r.articulation_down = v.u8()),
    ];

    fn fill_embedded(&mut self, raw: &[u8]) {
        fill(raw, &mut self.duration);
    }
}

impl Note {
    /// Printed accidental, as a semitone offset.
    pub fn alteration(&self) -> i32 {
        match self.alteration_glyph {
            1 => 1,
            2 => -1,
            4 => 2,
            5 => -2,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rest {
    pub duration: WithDuration,
    pub x_offset: u8,
    pub position: i8,
}

impl Record for Rest {
    const SIZE: usize = 18;
    const FIELDS: &'static [Field<Self>] = &[
        Field::u8("x_offset", 10, |r, v| r.x_offset = v.u8()),
        Field::u8("position", 12, |r, v| r.position = v.i8()),
    ];

    fn fill_embedded(&mut self, raw: &[u8]) {
        fill(raw, &mut self.duration);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tie {
    pub left_duration_type: u8,
    pub x_offset: u8,
    pub note_position: u8,
    pub tie_position: u8,
}

impl Record for Tie {
    const SIZE: usize = 16;
    const FIELDS: &'static [Field<Self>] = &[
        Field::u8("left_duration_type", 5, |r, v| r.left_duration_type = v.u8()),
        Field::u8("x_offset", 10, |r, v| r.x_offset = v.u8()),
        Field::u8("note_position", 12, |r, v| r.note_position = v.u8()),
        Field::u8("tie_position", 14, |r, v| r.tie_position = v.u8()),
    ];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubBeam {
    pub start_x: u8,
    pub end_x: u8,
}

impl Record for SubBeam {
    const SIZE: usize = Beam::SUB_BEAM_SIZE;
    const FIELDS: &'static [Field<Self>] = &[
        Field::u8("start_x", 0, |r, v| r.start_x = v.u8()),
        Field::u8("end_x", 2, |r, v| r.end_x = v.u8()),
    ];
}

/// Beam, also used as tuplet bracket. The positional fields and the tuplet
/// data live in the first sub-beam only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Beam {
    pub left_pos: i8,
    pub right_pos: i8,
    /// Tick of the last note under the beam, relative to the measure.
    pub end_note_tick: u16,
    pub tuplet_number: u8,
    pub sub_beams: Vec<SubBeam>,
}

impl Record for Beam {
    const SIZE: usize = Beam::HEAD_SIZE + Beam::SUB_BEAM_SIZE;
    const FIELDS: &'static [Field<Self>] = &[
        Field::u8("left_pos", 18, |r, v| r.left_pos = v.i8()),
        Field::u8("right_pos", 19, |r, v| r.right_pos = v.i8()),
        Field::u16("end_note_tick", 20, |r, v| r.end_note_tick = v.u16()),
        Field::u8("tuplet_number", 23, |r, v| r.tuplet_number = v.u8()),
    ];

    fn fill_embedded(&mut self, raw: &[u8]) {
        self.sub_beams = raw
            .get(Beam::HEAD_SIZE..)
            .unwrap_or_default()
            .chunks_exact(Beam::SUB_BEAM_SIZE)
            .map(decode)
            .collect();
    }
}

impl Beam {
    pub const HEAD_SIZE: usize = 14;
    pub const SUB_BEAM_SIZE: usize = 16;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clef {
    pub clef_type: u8,
    pub x_offset: u8,
}

impl Record for Clef {
    const SIZE: usize = 12;
    const FIELDS: &'static [Field<Self>] = &[
        Field::u8("clef_type", 5, |r, v| r.clef_type = v.u8()),
        Field::u8("x_offset", 10, |r, v| r.x_offset = v.u8()),
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyChange {
    pub new_key: u8,
    pub old_key: u8,
}

impl Record for KeyChange {
    const SIZE: usize = 12;
    const FIELDS: &'static [Field<Self>] = &[
        Field::u8("new_key", 5, |r, v| r.new_key = v.u8()),
        Field::u8("old_key", 10, |r, v| r.old_key = v.u8()),
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    pub x_offset: u8,
}

impl Record for Script {
    const SIZE: usize = ORNAMENT_SCRIPT_SIZE as usize;
    const FIELDS: &'static [Field<Self>] = &[Field::u8("x_offset", 10, |r, v| r.x_offset = v.u8())];
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slur {
    /// 33 is a slur, 16 an 8va line.
    pub slur_type: u8,
    pub left_x: u8,
    pub left_position: u8,
    pub middle_x: u8,
    pub middle_position: u8,
    pub measure_delta: u8,
    pub right_x: u8,
    pub right_position: u8,
}

impl Record for Slur {
    const SIZE: usize = ORNAMENT_SLUR_SIZE as usize;
    const FIELDS: &'static [Field<Self>] = &[
        Field::u8("slur_type", 5, |r, v| r.slur_type = v.u8()),
        Field::u8("left_x", 10, |r, v| r.left_x = v.u8()),
        Field::u8("left_position", 12, |r, v| r.left_position = v.u8()),
        Field::u8("middle_x", 14, |r, v| r.middle_x = v.u8()),
        Field::u8("middle_position", 16, |r, v| r.middle_position = v.u8()),
        Field::u8("measure_delta", 18, |r, v| r.measure_delta = v.u8()),
        Field::u8("right_x", 20, |r, v| r.right_x = v.u8()),
        Field::u8("right_position", 22, |r, v| r.right_position = v.u8()),
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Clef(Clef),
    KeyChange(KeyChange),
    Tie(Tie),
    Beam(Beam),
    Script(Script),
    Slur(Slur),
    Rest(Rest),
    Note(Note),
    /// Not understood; the element's raw bytes are all there is.
    Other,
}

impl Payload {
    fn decode(header: &ElementHeader, raw: &[u8]) -> Self {
        match header.type_voice >> 4 {
            TYPE_CLEF => Payload::Clef(decode(raw)),
            TYPE_KEYCHANGE => Payload::KeyChange(decode(raw)),
            TYPE_TIE => Payload::Tie(decode(raw)),
            TYPE_BEAM => Payload::Beam(decode(raw)),
            TYPE_ORNAMENT => match header.size {
                ORNAMENT_SCRIPT_SIZE => Payload::Script(decode(raw)),
                ORNAMENT_SLUR_SIZE => Payload::Slur(decode(raw)),
                _ => Payload::Other,
            },
            TYPE_REST => Payload::Rest(decode(raw)),
            TYPE_NOTE => Payload::Note(decode(raw)),
            _ => Payload::Other,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Payload::Clef(_) => "Clef",
            Payload::KeyChange(_) => "KeyChange",
            Payload::Tie(_) => "Tie",
            Payload::Beam(_) => "Beam",
            Payload::Script(_) => "Script",
            Payload::Slur(_) => "Slur",
            Payload::Rest(_) => "Rest",
            Payload::Note(_) => "Note",
            Payload::Other => "Other",
        }
    }

    pub fn with_duration(&self) -> Option<&WithDuration> {
        match self {
            Payload::Note(note) => Some(&note.duration),
            Payload::Rest(rest) => Some(&rest.duration),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Byte offset in the file.
    pub offset: usize,
    pub raw: Vec<u8>,
    pub header: ElementHeader,
    pub payload: Payload,

    /// Owning measure index, set when the document is linked.
    pub measure: usize,
    /// Index of the system covering the owning measure.
    pub line: Option<usize>,
}

impl Element {
    /// Decodes one element from exactly its declared bytes.
    pub fn decode(raw: &[u8], offset: usize) -> Self {
        let header: ElementHeader = decode(raw);
        let payload = Payload::decode(&header, raw);
        Self {
            offset,
            raw: raw.to_vec(),
            header,
            payload,
            measure: 0,
            line: None,
        }
    }

    pub fn tick(&self) -> u32 {
        self.header.tick as u32
    }

    pub fn element_type(&self) -> u8 {
        self.header.type_voice >> 4
    }

    pub fn voice(&self) -> u8 {
        self.header.type_voice & 0xf
    }

    pub fn staff(&self) -> usize {
        (self.header.staff & 63) as usize
    }

    pub fn type_name(&self) -> &'static str {
        self.payload.type_name()
    }

    pub fn duration_ticks(&self) -> u32 {
        self.payload
            .with_duration()
            .map_or(0, WithDuration::duration_ticks)
    }
}
