//! Builds small score files in memory for tests.

use crate::encore::element::{
    TYPE_BEAM, TYPE_CLEF, TYPE_KEYCHANGE, TYPE_NOTE, TYPE_ORNAMENT, TYPE_REST, TYPE_TIE,
};
use crate::encore::measure::END_MARKER;

const STAFF_SIZE: usize = 242;

#[derive(Debug, Clone)]
pub struct ElementSpec {
    pub raw: Vec<u8>,
}

impl ElementSpec {
    fn new(kind: u8, size: u8, tick: u16, voice: u8, staff: u8) -> Self {
        let mut raw = vec![0u8; size as usize];
        raw[0..2].copy_from_slice(&tick.to_le_bytes());
        raw[2] = kind << 4 | voice;
        raw[3] = size;
        raw[4] = staff;
        Self { raw }
    }

    pub fn note(tick: u16, voice: u8, staff: u8, face: u8, position: i8, semitone: u8) -> Self {
        let mut spec = Self::new(TYPE_NOTE, 28, tick, voice, staff);
        spec.raw[5] = face;
        spec.raw[12] = position as u8;
        spec.raw[15] = semitone;
        spec
    }

    pub fn rest(tick: u16, voice: u8, staff: u8, face: u8) -> Self {
        let mut spec = Self::new(TYPE_REST, 18, tick, voice, staff);
        spec.raw[5] = face;
        spec
    }

    pub fn tie(tick: u16, voice: u8, staff: u8) -> Self {
        Self::new(TYPE_TIE, 16, tick, voice, staff)
    }

    pub fn beam(tick: u16, voice: u8, staff: u8, end_note_tick: u16, tuplet_number: u8) -> Self {
        let mut spec = Self::new(TYPE_BEAM, 30, tick, voice, staff);
        spec.raw[20..22].copy_from_slice(&end_note_tick.to_le_bytes());
        spec.raw[23] = tuplet_number;
        spec
    }

    pub fn clef(tick: u16, voice: u8, staff: u8, clef: u8) -> Self {
        let mut spec = Self::new(TYPE_CLEF, 12, tick, voice, staff);
        spec.raw[5] = clef;
        spec
    }

    pub fn key(tick: u16, voice: u8, staff: u8, key: u8) -> Self {
        let mut spec = Self::new(TYPE_KEYCHANGE, 12, tick, voice, staff);
        spec.raw[5] = key;
        spec
    }

    pub fn script(tick: u16, voice: u8, staff: u8) -> Self {
        Self::new(TYPE_ORNAMENT, 16, tick, voice, staff)
    }

    pub fn slur(tick: u16, voice: u8, staff: u8) -> Self {
        let mut spec = Self::new(TYPE_ORNAMENT, 28, tick, voice, staff);
        spec.raw[5] = 33;
        spec
    }

    /// Single dot on a note or rest.
    pub fn dotted(mut self) -> Self {
        self.raw[14] = 1;
        self
    }

    pub fn tuplet(mut self, num: u8, den: u8) -> Self {
        self.raw[13] = den << 4 | num;
        self
    }
}

#[derive(Debug, Clone)]
pub struct MeasureSpec {
    pub tag: [u8; 4],
    pub duration_ticks: u16,
    pub time_signature: (u8, u8),
    pub bar_type_start: u8,
    pub bar_type_end: u8,
    pub repeat_alternative: u8,
    pub elements: Vec<ElementSpec>,
    /// Bytes after the last element.
    pub sentinel: Vec<u8>,
}

impl Default for MeasureSpec {
    fn default() -> Self {
        Self {
            tag: *b"MEAS",
            duration_ticks: 960,
            time_signature: (4, 4),
            bar_type_start: 0,
            bar_type_end: 0,
            repeat_alternative: 0,
            elements: Vec::new(),
            sentinel: END_MARKER.to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineSpec {
    pub measure_start: u16,
    pub measure_count: u8,
    /// Clef and key per staff.
    pub staves: Vec<(u8, u8)>,
}

#[derive(Debug, Clone)]
pub struct ScoreBuilder {
    pub staff_names: Vec<String>,
    pub page_count: usize,
    pub lines: Vec<LineSpec>,
    pub measures: Vec<MeasureSpec>,
}

impl ScoreBuilder {
    pub fn new(staff_count: usize) -> Self {
        Self {
            staff_names: (0..staff_count).map(|i| format!("Staff {}", i)).collect(),
            page_count: 1,
            lines: Vec::new(),
            measures: Vec::new(),
        }
    }

    /// A system with treble clef and C major on every staff.
    pub fn line(&mut self, measure_start: u16, measure_count: u8) -> &mut Self {
        let staves = vec![(0, 0); self.staff_names.len()];
        self.line_with(measure_start, measure_count, &staves)
    }

    pub fn line_with(
        &mut self,
        measure_start: u16,
        measure_count: u8,
        staves: &[(u8, u8)],
    ) -> &mut Self {
        self.lines.push(LineSpec {
            measure_start,
            measure_count,
            staves: staves.to_vec(),
        });
        self
    }

    pub fn measure(&mut self, measure: MeasureSpec) -> &mut Self {
        self.measures.push(measure);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = vec![0u8; 194];
        buf[..4].copy_from_slice(b"SCOW");
        buf[0x2e..0x30].copy_from_slice(&(self.lines.len() as i16).to_le_bytes());
        buf[0x30..0x32].copy_from_slice(&(self.page_count as i16).to_le_bytes());
        buf[0x32] = self.staff_names.len() as u8;
        buf[0x33] = self.staff_names.len() as u8;
        buf[0x34..0x36].copy_from_slice(&(self.measures.len() as i16).to_le_bytes());

        for name in &self.staff_names {
            let mut staff = vec![0u8; STAFF_SIZE];
            staff[..4].copy_from_slice(b"TK00");
            staff[4..8].copy_from_slice(&((STAFF_SIZE - 8) as u32).to_le_bytes());
            let name = name.as_bytes();
            let n = name.len().min(10);
            staff[8..8 + n].copy_from_slice(&name[..n]);
            buf.extend_from_slice(&staff);
        }

        for _ in 0..self.page_count {
            let mut page = vec![0u8; 34];
            page[..4].copy_from_slice(b"PAGE");
            buf.extend_from_slice(&page);
        }

        for line in &self.lines {
            let mut payload = vec![0u8; 26];
            payload[10..12].copy_from_slice(&line.measure_start.to_le_bytes());
            payload[12] = line.measure_count;
            for (i, (clef, key)) in line.staves.iter().enumerate() {
                let mut block = [0u8; 30];
                block[1] = *clef;
                block[2] = *key;
                block[8] = i as u8;
                payload.extend_from_slice(&block);
            }
            buf.extend_from_slice(b"LINE");
            buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            buf.extend_from_slice(&payload);
        }

        for measure in &self.measures {
            let mut stream: Vec<u8> = measure
                .elements
                .iter()
                .flat_map(|e| e.raw.iter().copied())
                .collect();
            stream.extend_from_slice(&measure.sentinel);

            let mut head = vec![0u8; 62];
            head[..4].copy_from_slice(&measure.tag);
            head[4..8].copy_from_slice(&(stream.len() as i32).to_le_bytes());
            head[8..10].copy_from_slice(&120u16.to_le_bytes());
            head[12..14].copy_from_slice(&240u16.to_le_bytes());
            head[14..16].copy_from_slice(&measure.duration_ticks.to_le_bytes());
            head[16] = measure.time_signature.0;
            head[17] = measure.time_signature.1;
            head[20] = measure.bar_type_start;
            head[21] = measure.bar_type_end;
            head[23] = measure.repeat_alternative;
            buf.extend_from_slice(&head);
            buf.extend_from_slice(&stream);
        }
        buf
    }
}
