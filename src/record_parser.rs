//! Declarative byte-offset record decoding.
//!
//! Every record type publishes a static table of fields, each naming a byte
//! offset, a width and a setter. [`fill`] walks the table and stores the
//! little-endian value found at each offset. Fields that do not fit in the
//! slice keep their zero value, which is what makes the shorter variable
//! payloads of some records decodable with the same table.

use crate::error::FormatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    U8,
    U16,
    U32,
    Bytes(usize),
}

impl Width {
    pub const fn len(self) -> usize {
        match self {
            Width::U8 => 1,
            Width::U16 => 2,
            Width::U32 => 4,
            Width::Bytes(n) => n,
        }
    }
}

/// Raw value read for one field. Signed fields reinterpret the integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    Int(u32),
    Bytes(&'a [u8]),
}

impl<'a> Value<'a> {
    fn int(self) -> u32 {
        match self {
            Value::Int(v) => v,
            Value::Bytes(_) => 0,
        }
    }

    pub fn u8(self) -> u8 {
        self.int() as u8
    }

    pub fn i8(self) -> i8 {
        self.int() as u8 as i8
    }

    pub fn u16(self) -> u16 {
        self.int() as u16
    }

    pub fn i16(self) -> i16 {
        self.int() as u16 as i16
    }

    pub fn u32(self) -> u32 {
        self.int()
    }

    pub fn i32(self) -> i32 {
        self.int() as i32
    }

    pub fn bytes(self) -> &'a [u8] {
        match self {
            Value::Bytes(b) => b,
            Value::Int(_) => &[],
        }
    }
}

pub struct Field<R> {
    pub name: &'static str,
    pub offset: usize,
    pub width: Width,
    pub set: fn(&mut R, Value<'_>),
}

impl<R> Field<R> {
    pub const fn u8(name: &'static str, offset: usize, set: fn(&mut R, Value<'_>)) -> Self {
        Self {
            name,
            offset,
            width: Width::U8,
            set,
        }
    }

    pub const fn u16(name: &'static str, offset: usize, set: fn(&mut R, Value<'_>)) -> Self {
        Self {
            name,
            offset,
            width: Width::U16,
            set,
        }
    }

    pub const fn u32(name: &'static str, offset: usize, set: fn(&mut R, Value<'_>)) -> Self {
        Self {
            name,
            offset,
            width: Width::U32,
            set,
        }
    }

    pub const fn bytes(
        name: &'static str,
        offset: usize,
        len: usize,
        set: fn(&mut R, Value<'_>),
    ) -> Self {
        Self {
            name,
            offset,
            width: Width::Bytes(len),
            set,
        }
    }

    pub const fn end(&self) -> usize {
        self.offset + self.width.len()
    }

    fn read<'a>(&self, raw: &'a [u8]) -> Option<Value<'a>> {
        let bytes = raw.get(self.offset..self.end())?;
        let value = match self.width {
            Width::U8 => Value::Int(bytes[0] as u32),
            Width::U16 => Value::Int(u16::from_le_bytes([bytes[0], bytes[1]]) as u32),
            Width::U32 => Value::Int(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
            Width::Bytes(_) => Value::Bytes(bytes),
        };
        Some(value)
    }
}

/// A record decodable from a byte slice through its field table.
pub trait Record: Default + 'static {
    /// Nominal size of the record layout. Every field must end within it.
    const SIZE: usize;
    const FIELDS: &'static [Field<Self>];

    /// Decodes embedded sub-records sharing the same byte slice. Runs before
    /// the record's own fields.
    fn fill_embedded(&mut self, _raw: &[u8]) {}
}

/// A top-level record starting with a fixed tag.
pub trait TaggedRecord: Record {
    const NAME: &'static str;
    const TAG: &'static [u8];
    /// Bytes consumed by the fixed part of the record.
    const FIXED_SIZE: usize;
}

pub fn fill<R: Record>(raw: &[u8], dest: &mut R) {
    dest.fill_embedded(raw);
    for field in R::FIELDS {
        if let Some(value) = field.read(raw) {
            (field.set)(dest, value);
        }
    }
}

pub fn decode<R: Record>(raw: &[u8]) -> R {
    let mut record = R::default();
    fill(raw, &mut record);
    record
}

/// Returns `len` bytes of `buf` starting at `offset`.
pub fn take<'a>(
    buf: &'a [u8],
    offset: usize,
    len: usize,
    record: &'static str,
) -> Result<&'a [u8], FormatError> {
    buf.get(offset..)
        .and_then(|rest| rest.get(..len))
        .ok_or(FormatError::Truncated {
            record,
            offset,
            needed: len,
            available: buf.len().saturating_sub(offset),
        })
}

/// Checks the tag of the record at `offset`, then decodes its fixed part.
/// Returns the record and the fixed bytes it was decoded from.
pub fn read_tagged<R: TaggedRecord>(buf: &[u8], offset: usize) -> Result<(R, &[u8]), FormatError> {
    let found = buf.get(offset..).unwrap_or_default();
    let found = &found[..found.len().min(R::TAG.len())];
    if found != R::TAG {
        return Err(FormatError::TagMismatch {
            record: R::NAME,
            expected: String::from_utf8_lossy(R::TAG).into_owned(),
            found: String::from_utf8_lossy(found).into_owned(),
            offset,
        });
    }

    let raw = take(buf, offset, R::FIXED_SIZE, R::NAME)?;
    Ok((decode(raw), raw))
}

#[cfg(test)]
pub(crate) fn check_layout<R: Record>() {
    let mut names = std::collections::HashSet::new();
    for field in R::FIELDS {
        assert!(
            field.end() <= R::SIZE,
            "{} ends at {} past record size {}",
            field.name,
            field.end(),
            R::SIZE
        );
        assert!(names.insert(field.name), "duplicate field {}", field.name);
    }
}
