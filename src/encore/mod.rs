//! In-memory model of an Encore score file.
//!
//! The [`Document`] owns every decoded record. Elements point back at their
//! measure, staff and system by index.

pub mod element;
pub mod header;
pub mod line;
pub mod measure;
mod read;

pub use element::{Element, Payload};
pub use header::{Header, Page, Staff};
pub use line::{Line, LineStaffData};
pub use measure::Measure;
pub use read::read_document;

use crate::error::Warning;

/// Position of an element: its measure and its index within that measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId {
    pub measure: usize,
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub header: Header,
    pub staves: Vec<Staff>,
    pub pages: Vec<Page>,
    pub lines: Vec<Line>,
    pub measures: Vec<Measure>,
    pub warnings: Vec<Warning>,
}

impl Document {
    pub fn element(&self, id: ElementId) -> &Element {
        &self.measures[id.measure].elements[id.index]
    }

    /// All elements in measure order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.measures.iter().enumerate().flat_map(|(measure, m)| {
            m.elements
                .iter()
                .enumerate()
                .map(move |(index, element)| (ElementId { measure, index }, element))
        })
    }

    pub fn measure_of(&self, element: &Element) -> &Measure {
        &self.measures[element.measure]
    }

    pub fn staff_of(&self, element: &Element) -> &Staff {
        &self.staves[element.staff()]
    }

    /// Tick of the element counted from the start of the piece.
    pub fn absolute_tick(&self, element: &Element) -> u32 {
        element.tick() + self.measure_of(element).absolute_tick
    }

    /// The staff settings of the system covering the element's measure.
    pub fn line_staff(&self, element: &Element) -> Option<&LineStaffData> {
        let line = self.lines.get(element.line?)?;
        line.staff(element.staff())
    }
}
