//! Notation atoms, the output of the sequencer. `Display` renders LilyPond.

use super::duration::Duration;
use super::pitch::Pitch;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clef {
    Treble,
    Bass,
    Alto,
    Tenor,
    TrebleUp8,
    TrebleDown8,
    BassDown8,
}

impl Clef {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Clef::Treble),
            1 => Some(Clef::Bass),
            2 => Some(Clef::Alto),
            3 => Some(Clef::Tenor),
            4 => Some(Clef::TrebleUp8),
            5 => Some(Clef::TrebleDown8),
            6 => Some(Clef::BassDown8),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Clef::Treble => "treble",
            Clef::Bass => "bass",
            Clef::Alto => "alto",
            Clef::Tenor => "tenor",
            Clef::TrebleUp8 => "treble^8",
            Clef::TrebleDown8 => "treble_8",
            Clef::BassDown8 => "bass_8",
        }
    }

    /// Pitch of the ledger line below the staff.
    pub fn reference_pitch(self) -> Pitch {
        match self {
            Clef::Treble => Pitch::new(0, 0, 0),
            Clef::Bass => Pitch::new(-2, 2, 0),
            Clef::Alto => Pitch::new(-1, 1, 0),
            Clef::Tenor => Pitch::new(-2, 6, 0),
            Clef::TrebleUp8 => Pitch::new(1, 0, 0),
            Clef::TrebleDown8 => Pitch::new(-1, 0, 0),
            Clef::BassDown8 => Pitch::new(-3, 2, 0),
        }
    }
}

impl fmt::Display for Clef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\clef \"{}\"", self.name())
    }
}

const KEY_NAMES: [&str; 15] = [
    "c", "f", "bes", "es", "as", "des", "ges", "ces", "g", "d", "a", "e", "b", "fis", "cis",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySignature {
    pub tonic: &'static str,
    pub mode: &'static str,
}

impl KeySignature {
    pub const C_MAJOR: KeySignature = KeySignature {
        tonic: "c",
        mode: "major",
    };

    /// Flats first (1..=7), then sharps (8..=14).
    pub fn from_index(index: u8) -> Option<Self> {
        KEY_NAMES.get(index as usize).map(|&tonic| KeySignature {
            tonic,
            mode: "major",
        })
    }
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\key {} \\{}", self.tonic, self.mode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarType {
    Single,
    Double,
    Final,
    RepeatStart,
    RepeatEnd,
    RepeatBoth,
}

impl BarType {
    /// Unknown codes read as a single bar line.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => BarType::Double,
            2 => BarType::Final,
            3 => BarType::RepeatStart,
            4 => BarType::RepeatEnd,
            5 => BarType::RepeatBoth,
            _ => BarType::Single,
        }
    }

    /// The bar line drawn between a measure ending in `end` and the next one
    /// starting with `start`.
    pub fn between(end: BarType, start: BarType) -> Self {
        match (end, start) {
            (BarType::RepeatEnd, BarType::RepeatStart) => BarType::RepeatBoth,
            (BarType::Single, start) => start,
            (end, _) => end,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            BarType::Single => "|",
            BarType::Double => "||",
            BarType::Final => "|.",
            BarType::RepeatStart => ".|:",
            BarType::RepeatEnd => ":|.",
            BarType::RepeatBoth => ":..:",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chord {
    pub pitches: Vec<Pitch>,
    pub duration: Duration,
    /// Rendered after the duration, each prefixed with `-`.
    pub post_events: Vec<String>,
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pitches.as_slice() {
            [] => write!(f, "s")?,
            [pitch] => write!(f, "{}", pitch)?,
            pitches => {
                write!(f, "<")?;
                for (i, pitch) in pitches.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", pitch)?;
                }
                write!(f, ">")?;
            }
        }
        write!(f, "{}", self.duration)?;
        for event in &self.post_events {
            write!(f, "-{}", event)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuplet {
    pub num: u8,
    pub den: u8,
    pub atoms: Vec<Atom>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    Chord(Chord),
    Rest(Duration),
    /// Invisible filler covering a gap.
    Skip(Duration),
    BarCheck,
    Bar(BarType),
    /// Change of repeat alternative; 0 means none.
    Volta { from: u8, to: u8 },
    TimeSignature { num: u8, den: u8 },
    Key(KeySignature),
    Clef(Clef),
    Tuplet(Tuplet),
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Chord(chord) => write!(f, "{}", chord),
            Atom::Rest(duration) => write!(f, "r{}", duration),
            Atom::Skip(duration) => write!(f, "s{}", duration),
            Atom::BarCheck => write!(f, "|"),
            Atom::Bar(bar) => write!(f, "\\bar \"{}\"", bar.glyph()),
            Atom::Volta { from, to } => {
                write!(f, "\\set Score.repeatCommands = #'(")?;
                if *from != 0 {
                    write!(f, "(volta #f)")?;
                }
                if *from != 0 && *to != 0 {
                    write!(f, " ")?;
                }
                if *to != 0 {
                    write!(f, "(volta \"{}\")", to)?;
                }
                write!(f, ")")
            }
            Atom::TimeSignature { num, den } => write!(f, "\\time {}/{}", num, den),
            Atom::Key(key) => write!(f, "{}", key),
            Atom::Clef(clef) => write!(f, "{}", clef),
            Atom::Tuplet(tuplet) => write!(
                f,
                "\\times {}/{} {{ {} }}",
                tuplet.num,
                tuplet.den,
                Sequence(&tuplet.atoms)
            ),
        }
    }
}

/// Atoms separated by spaces, with a line break after every bar check.
pub struct Sequence<'a>(pub &'a [Atom]);

impl fmt::Display for Sequence<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut previous: Option<&Atom> = None;
        for atom in self.0 {
            match previous {
                Some(Atom::BarCheck) => writeln!(f)?,
                Some(_) => write!(f, " ")?,
                None => {}
            }
            write!(f, "{}", atom)?;
            previous = Some(atom);
        }
        Ok(())
    }
}
