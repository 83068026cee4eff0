//! Turns the ordered elements of one voice into notation atoms.
//!
//! Each voice is an independent fold over its elements. The state tracks the
//! chord currently being built, pending ties, an open tuplet scope and the
//! measure-level settings last emitted.

use crate::encore::element::{Note, WithDuration};
use crate::encore::{Document, Element, ElementId, Payload};
use crate::error::{Anomaly, AnomalyKind, SequenceError};
use crate::partition::VoiceKey;
use crate::types::{Atom, BarType, Chord, Clef, Duration, KeySignature, Tuplet};
use num_rational::Rational64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSequence {
    pub key: VoiceKey,
    pub atoms: Vec<Atom>,
    pub anomalies: Vec<Anomaly>,
}

struct TupletScope {
    /// Absolute tick of the last note under the bracket.
    end_tick: u32,
    /// Taken from the first note or rest inside the scope.
    ratio: Option<(u8, u8)>,
    atoms: Vec<Atom>,
}

/// Where the current chord lives.
#[derive(Debug, Clone, Copy)]
enum ChordSlot {
    Outer(usize),
    Open(usize),
    Closed { tuplet: usize, index: usize },
}

struct VoiceState<'a> {
    doc: &'a Document,
    key: VoiceKey,
    atoms: Vec<Atom>,
    anomalies: Vec<Anomaly>,

    tuplet: Option<TupletScope>,
    chord: Option<ChordSlot>,
    articulations: Vec<String>,
    /// Tick of the last note or rest.
    last_tick: Option<u32>,
    /// First tick not covered by an emitted atom.
    next_tick: u32,

    volta: u8,
    time_signature: (u8, u8),
    measure: Option<usize>,
    line: Option<usize>,
    clef: Clef,
}

fn written_duration(duration: &WithDuration) -> Duration {
    Duration::new(duration.duration_log(), duration.dots())
}

impl<'a> VoiceState<'a> {
    fn new(doc: &'a Document, key: VoiceKey) -> Self {
        Self {
            doc,
            key,
            atoms: Vec::new(),
            anomalies: Vec::new(),
            tuplet: None,
            chord: None,
            articulations: Vec::new(),
            last_tick: None,
            next_tick: 0,
            volta: 0,
            time_signature: (4, 4),
            measure: None,
            line: None,
            clef: Clef::Treble,
        }
    }

    fn anomaly(&mut self, tick: u32, kind: AnomalyKind) {
        self.anomalies.push(Anomaly {
            key: self.key,
            tick,
            kind,
        });
    }

    fn push(&mut self, atom: Atom) {
        match &mut self.tuplet {
            Some(scope) => scope.atoms.push(atom),
            None => self.atoms.push(atom),
        }
    }

    fn push_chord(&mut self, chord: Chord) {
        self.chord = Some(match &self.tuplet {
            Some(scope) => ChordSlot::Open(scope.atoms.len()),
            None => ChordSlot::Outer(self.atoms.len()),
        });
        self.push(Atom::Chord(chord));
    }

    fn chord_mut(&mut self) -> Option<&mut Chord> {
        let atom = match self.chord? {
            ChordSlot::Outer(index) => self.atoms.get_mut(index),
            ChordSlot::Open(index) => self.tuplet.as_mut()?.atoms.get_mut(index),
            ChordSlot::Closed { tuplet, index } => match self.atoms.get_mut(tuplet) {
                Some(Atom::Tuplet(tuplet)) => tuplet.atoms.get_mut(index),
                _ => None,
            },
        };
        match atom {
            Some(Atom::Chord(chord)) => Some(chord),
            _ => None,
        }
    }

    fn flush_articulations(&mut self) {
        if self.articulations.is_empty() {
            return;
        }
        let articulations = std::mem::take(&mut self.articulations);
        if let Some(chord) = self.chord_mut() {
            chord.post_events.extend(articulations);
        }
    }

    /// Moves the open scope into the outer sequence. Without a known ratio the
    /// atoms are spliced in as they are.
    fn close_tuplet(&mut self) {
        let Some(scope) = self.tuplet.take() else {
            return;
        };

        let Some((num, den)) = scope.ratio else {
            let base = self.atoms.len();
            if let Some(ChordSlot::Open(index)) = self.chord {
                self.chord = Some(ChordSlot::Outer(base + index));
            }
            self.atoms.extend(scope.atoms);
            return;
        };

        let tuplet = self.atoms.len();
        if let Some(ChordSlot::Open(index)) = self.chord {
            self.chord = Some(ChordSlot::Closed { tuplet, index });
        }
        // skips were measured in real ticks
        let scale = Rational64::new(den as i64, num as i64);
        let atoms = scope
            .atoms
            .into_iter()
            .map(|atom| match atom {
                Atom::Skip(duration) => Atom::Skip(duration.scaled(scale)),
                atom => atom,
            })
            .collect();
        self.atoms.push(Atom::Tuplet(Tuplet { num, den, atoms }));
    }

    fn set_tuplet_ratio(&mut self, duration: &WithDuration) {
        if let Some(scope) = &mut self.tuplet {
            if scope.ratio.is_none() {
                scope.ratio = duration.tuplet_ratio().filter(|&(num, _)| num != 0);
            }
        }
    }

    fn skip_to(&mut self, tick: u32) {
        if self.next_tick < tick {
            self.push(Atom::Skip(Duration::sixteenths(tick - self.next_tick)));
            self.next_tick = tick;
        }
    }

    fn extend_to(&mut self, tick: u32) {
        self.next_tick = self.next_tick.max(tick);
    }

    fn resolve_clef(&mut self, code: u8, tick: u32) -> Clef {
        Clef::from_code(code).unwrap_or_else(|| {
            self.anomaly(tick, AnomalyKind::UnknownClef(code));
            Clef::Treble
        })
    }

    fn resolve_key(&mut self, index: u8, tick: u32) -> KeySignature {
        KeySignature::from_index(index).unwrap_or_else(|| {
            self.anomaly(tick, AnomalyKind::UnknownKey(index));
            KeySignature::C_MAJOR
        })
    }

    /// Key and clef in force where the voice begins.
    fn begin(&mut self, element: &Element, tick: u32) {
        let (key, clef) = match self.doc.line_staff(element) {
            Some(staff) => (staff.key, staff.clef),
            None => (0, self.doc.staff_of(element).clef),
        };
        let key = self.resolve_key(key, tick);
        self.push(Atom::Key(key));
        self.clef = self.resolve_clef(clef, tick);
        self.push(Atom::Clef(self.clef));
    }

    fn enter_measure(&mut self, element: &Element, tick: u32) {
        let doc = self.doc;
        let index = element.measure;
        let measure = &doc.measures[index];
        let first = self.measure.is_none();

        if !first {
            self.skip_to(measure.absolute_tick);
            self.push(Atom::BarCheck);
        }

        let previous_end = match index.checked_sub(1) {
            Some(previous) => BarType::from_code(doc.measures[previous].bar_type_end),
            None => BarType::Single,
        };
        let bar = BarType::between(previous_end, BarType::from_code(measure.bar_type_start));
        if bar != BarType::Single {
            self.push(Atom::Bar(bar));
        }

        if measure.repeat_alternative != self.volta {
            self.push(Atom::Volta {
                from: self.volta,
                to: measure.repeat_alternative,
            });
            self.volta = measure.repeat_alternative;
        }

        let (num, den) = measure.time_signature();
        if num != 0 && den != 0 && (num, den) != self.time_signature {
            self.push(Atom::TimeSignature { num, den });
            self.time_signature = (num, den);
        }

        if !first && element.line != self.line {
            if let Some(staff) = doc.line_staff(element) {
                let clef = self.resolve_clef(staff.clef, tick);
                if clef != self.clef {
                    self.clef = clef;
                    self.push(Atom::Clef(clef));
                }
            }
        }

        self.measure = Some(index);
        self.line = element.line;
    }

    fn note(&mut self, element: &Element, note: &Note, tick: u32) {
        self.set_tuplet_ratio(&note.duration);

        let mut pitch = self.clef.reference_pitch().transposed(note.position as i32);
        let alteration = note.semitone_pitch as i32 - (pitch.semitone() + 60);
        if (-2..=2).contains(&alteration) {
            pitch.alteration = alteration;
        } else {
            self.anomaly(tick, AnomalyKind::AlterationOutOfRange(alteration));
        }

        if self.last_tick == Some(tick) {
            let Some(chord) = self.chord_mut() else {
                self.anomaly(tick, AnomalyKind::OrphanChordNote);
                return;
            };
            chord.pitches.push(pitch);
        } else {
            self.push_chord(Chord {
                pitches: vec![pitch],
                duration: written_duration(&note.duration),
                post_events: Vec::new(),
            });
        }
        self.last_tick = Some(tick);
        self.extend_to(tick + element.duration_ticks());
    }

    fn step(&mut self, element: &Element) -> Result<(), SequenceError> {
        let doc = self.doc;
        let tick = doc.absolute_tick(element);

        if self.last_tick != Some(tick) {
            self.flush_articulations();
        }
        if self.tuplet.as_ref().is_some_and(|scope| tick > scope.end_tick) {
            self.close_tuplet();
        }
        let first = self.measure.is_none();
        if self.measure != Some(element.measure) {
            self.enter_measure(element, tick);
        }
        if first {
            self.begin(element, tick);
        }
        self.skip_to(tick);

        match &element.payload {
            Payload::Beam(beam) if beam.tuplet_number != 0 => {
                if let Some(scope) = &self.tuplet {
                    return Err(SequenceError::OverlappingTuplet {
                        key: self.key,
                        tick,
                        open_until: scope.end_tick,
                    });
                }
                self.tuplet = Some(TupletScope {
                    end_tick: doc.measure_of(element).absolute_tick + beam.end_note_tick as u32,
                    ratio: None,
                    atoms: Vec::new(),
                });
            }
            Payload::Tie(_) => {
                if self.chord.is_some() {
                    self.articulations.push("~".to_string());
                } else {
                    self.anomaly(tick, AnomalyKind::TieWithoutNote);
                }
            }
            Payload::Note(note) => self.note(element, note, tick),
            Payload::Rest(rest) => {
                self.set_tuplet_ratio(&rest.duration);
                self.flush_articulations();
                self.push(Atom::Rest(written_duration(&rest.duration)));
                self.chord = None;
                self.last_tick = Some(tick);
                self.extend_to(tick + element.duration_ticks());
            }
            Payload::KeyChange(change) => {
                let key = self.resolve_key(change.new_key, tick);
                self.push(Atom::Key(key));
            }
            Payload::Clef(clef) => {
                self.clef = self.resolve_clef(clef.clef_type, tick);
                self.push(Atom::Clef(self.clef));
            }
            Payload::Beam(_) | Payload::Script(_) | Payload::Slur(_) | Payload::Other => {}
        }
        Ok(())
    }

    fn finish(mut self) -> VoiceSequence {
        self.flush_articulations();
        self.close_tuplet();
        VoiceSequence {
            key: self.key,
            atoms: self.atoms,
            anomalies: self.anomalies,
        }
    }
}

/// Sequences one voice. `ids` must be in partition order.
pub fn sequence_voice(
    doc: &Document,
    key: VoiceKey,
    ids: &[ElementId],
) -> Result<VoiceSequence, SequenceError> {
    let mut state = VoiceState::new(doc, key);
    for &id in ids {
        state.step(doc.element(id))?;
    }
    let sequence = state.finish();
    log::debug!("{}: {} atoms", key, sequence.atoms.len());
    Ok(sequence)
}
