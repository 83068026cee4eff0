//! Groups elements into voices and orders each voice by time.

use crate::encore::{Document, Element, ElementId, Payload};
use crate::util::letters;
use std::collections::BTreeMap;
use std::fmt;

/// One parallel voice: a voice number on a staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoiceKey {
    pub staff: usize,
    pub voice: u8,
}

impl VoiceKey {
    pub fn of(element: &Element) -> Self {
        Self {
            staff: element.staff(),
            voice: element.voice(),
        }
    }
}

/// Renders as the identifier used for the voice variable, e.g. `staffAvoiceB`.
impl fmt::Display for VoiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "staff{}voice{}",
            letters(self.staff),
            letters(self.voice as usize)
        )
    }
}

/// Sort key: absolute tick first, then a band putting clefs and keys before
/// beams, and beams before the notes they may open a tuplet for.
pub fn priority(doc: &Document, element: &Element) -> u64 {
    let band = match element.payload {
        Payload::Clef(_) | Payload::KeyChange(_) => 0,
        Payload::Beam(_) => 5,
        Payload::Note(_) | Payload::Rest(_) => 10,
        _ => 20,
    };
    ((doc.absolute_tick(element) as u64) << 10) + band
}

pub fn partition(doc: &Document) -> BTreeMap<VoiceKey, Vec<ElementId>> {
    let mut voices: BTreeMap<VoiceKey, Vec<ElementId>> = BTreeMap::new();
    for (id, element) in doc.elements() {
        voices.entry(VoiceKey::of(element)).or_default().push(id);
    }
    for ids in voices.values_mut() {
        ids.sort_by_key(|&id| priority(doc, doc.element(id)));
    }
    voices
}
