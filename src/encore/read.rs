use crate::error::FormatError;
use crate::record_parser::{TaggedRecord, decode, read_tagged, take};

use super::Document;
use super::header::{Header, Page, Staff, StaffHead};
use super::line::{Line, LineHead};
use super::measure::Measure;

fn count(value: i16, what: &'static str) -> Result<usize, FormatError> {
    usize::try_from(value).map_err(|_| FormatError::BadCount {
        record: Header::NAME,
        what,
        value: value as i64,
        offset: 0,
    })
}

fn payload_len(value: i64, record: &'static str, offset: usize) -> Result<usize, FormatError> {
    usize::try_from(value).map_err(|_| FormatError::BadCount {
        record,
        what: "payload size",
        value,
        offset,
    })
}

fn read_staff(buf: &[u8], id: usize, offset: usize) -> Result<Staff, FormatError> {
    let (head, _) = read_tagged::<StaffHead>(buf, offset)?;
    let len = StaffHead::FIXED_SIZE + payload_len(head.0.var_size as i64, StaffHead::NAME, offset)?;
    let raw = take(buf, offset, len, StaffHead::NAME)?;
    Ok(Staff {
        id,
        offset,
        raw: raw.to_vec(),
        ..decode(raw)
    })
}

/// Decodes a whole file: header, staves, pages, systems and measures, then
/// links every element to its measure and system.
pub fn read_document(buf: &[u8]) -> Result<Document, FormatError> {
    let (header, _) = read_tagged::<Header>(buf, 0)?;
    let line_count = count(header.line_count, "line count")?;
    let page_count = count(header.page_count, "page count")?;
    let measure_count = count(header.measure_count, "measure count")?;
    log::debug!("header: {}", header);

    let mut doc = Document {
        header,
        ..Default::default()
    };

    // The first staff sits inside the header block; the rest follow it.
    let mut offset = Header::FIRST_STAFF_OFFSET;
    for id in 0..doc.header.staff_count as usize {
        let staff = read_staff(buf, id, offset)?;
        offset += staff.raw.len();
        doc.staves.push(staff);
    }

    for id in 0..page_count {
        let (_, raw) = read_tagged::<Page>(buf, offset)?;
        doc.pages.push(Page {
            id,
            offset,
            raw: raw.to_vec(),
        });
        offset += Page::FIXED_SIZE;
    }

    for id in 0..line_count {
        let (head, head_raw) = read_tagged::<LineHead>(buf, offset)?;
        let len = payload_len(head.0.var_size as i64, LineHead::NAME, offset)?;
        let payload = take(buf, offset + LineHead::FIXED_SIZE, len, LineHead::NAME)?;
        doc.lines.push(Line::from_parts(id, offset, head_raw, payload)?);
        offset += LineHead::FIXED_SIZE + len;
    }

    for id in 0..measure_count {
        let (measure, raw) = read_tagged::<Measure>(buf, offset)?;
        let len = payload_len(measure.var_size as i64, Measure::NAME, offset)?;
        let stream_offset = offset + Measure::FIXED_SIZE;
        let stream = take(buf, stream_offset, len, Measure::NAME)?;

        let mut measure = Measure {
            id,
            offset,
            raw: raw.to_vec(),
            ..measure
        };
        if let Some(warning) = measure.read_elements(stream, stream_offset)? {
            log::warn!("{}", warning);
            doc.warnings.push(warning);
        }
        doc.measures.push(measure);
        offset = stream_offset + len;
    }

    if offset < buf.len() {
        log::debug!("{} trailing bytes after the last measure", buf.len() - offset);
    }

    link(&mut doc)?;
    Ok(doc)
}

/// Sets the back-references of every element and the absolute tick of every
/// measure. The active system only moves forward.
fn link(doc: &mut Document) -> Result<(), FormatError> {
    let staff_count = doc.staves.len();
    let lines = &doc.lines;
    let mut system = 0;
    let mut absolute_tick = 0u32;

    for (index, measure) in doc.measures.iter_mut().enumerate() {
        while system + 1 < lines.len() && lines[system].measure_end() <= index {
            system += 1;
        }
        let line = (!lines.is_empty()).then_some(system);

        measure.absolute_tick = absolute_tick;
        absolute_tick += measure.duration_ticks as u32;

        for element in &mut measure.elements {
            if element.staff() >= staff_count {
                return Err(FormatError::BadStaffIndex {
                    offset: element.offset,
                    staff: element.staff(),
                    staff_count,
                });
            }
            element.measure = index;
            element.line = line;
        }
    }
    Ok(())
}
