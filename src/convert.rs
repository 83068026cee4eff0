use crate::Result;
use crate::encore::{Document, read_document};
use crate::error::{Anomaly, Warning};
use crate::partition::partition;
use crate::score::{Score, VoicePart};
use crate::sequencer::sequence_voice;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Print staff names as instrument names.
    pub staff_names: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self { staff_names: true }
    }
}

/// A converted score and the recoverable problems met on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub score: Score,
    pub anomalies: Vec<Anomaly>,
    pub warnings: Vec<Warning>,
}

pub fn convert_bytes(buf: &[u8], options: &ConvertOptions) -> Result<Conversion> {
    let doc = read_document(buf)?;
    convert_document(&doc, options)
}

pub fn convert_document(doc: &Document, options: &ConvertOptions) -> Result<Conversion> {
    let mut anomalies = Vec::new();
    let mut parts = Vec::new();

    for (key, ids) in partition(doc) {
        let sequence = sequence_voice(doc, key, &ids)?;
        for anomaly in &sequence.anomalies {
            log::warn!("{}", anomaly);
        }
        anomalies.extend(sequence.anomalies);
        parts.push(VoicePart {
            key,
            atoms: sequence.atoms,
        });
    }

    let score = Score::new(parts, |staff| {
        let name = doc.staves.get(staff)?.display_name();
        (options.staff_names && !name.is_empty()).then_some(name)
    });

    Ok(Conversion {
        score,
        anomalies,
        warnings: doc.warnings.clone(),
    })
}
