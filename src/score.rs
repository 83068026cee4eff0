//! Renders sequenced voices as parallel LilyPond staves.

use crate::partition::VoiceKey;
use crate::types::{Atom, Sequence};
use crate::util::escape_string;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePart {
    pub key: VoiceKey,
    pub atoms: Vec<Atom>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffPart {
    pub staff: usize,
    pub name: Option<String>,
    pub voices: Vec<VoicePart>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
    pub staves: Vec<StaffPart>,
}

impl Score {
    /// Groups voices by staff, staves and voices in ascending order.
    /// `staff_name` supplies the instrument name printed for a staff.
    pub fn new(
        voices: impl IntoIterator<Item = VoicePart>,
        staff_name: impl Fn(usize) -> Option<String>,
    ) -> Self {
        let mut grouped: BTreeMap<usize, Vec<VoicePart>> = BTreeMap::new();
        for voice in voices {
            grouped.entry(voice.key.staff).or_default().push(voice);
        }

        let staves = grouped
            .into_iter()
            .map(|(staff, mut voices)| {
                voices.sort_by_key(|v| v.key.voice);
                StaffPart {
                    staff,
                    name: staff_name(staff),
                    voices,
                }
            })
            .collect();
        Self { staves }
    }

    pub fn voices(&self) -> impl Iterator<Item = &VoicePart> {
        self.staves.iter().flat_map(|staff| staff.voices.iter())
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for voice in self.voices() {
            writeln!(f, "{} = {{", voice.key)?;
            writeln!(f, "{}", Sequence(&voice.atoms))?;
            writeln!(f, "}}")?;
            writeln!(f)?;
        }

        writeln!(f, "<<")?;
        for staff in &self.staves {
            writeln!(f, "  \\new Staff <<")?;
            if let Some(name) = &staff.name {
                writeln!(
                    f,
                    "    \\set Staff.instrumentName = #\"{}\"",
                    escape_string(name)
                )?;
            }
            for voice in &staff.voices {
                writeln!(f, "    \\new Voice \\{}", voice.key)?;
            }
            writeln!(f, "  >>")?;
        }
        writeln!(f, ">>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Duration, KeySignature};
    use pretty_assertions::assert_eq;

    fn part(staff: usize, voice: u8, atoms: Vec<Atom>) -> VoicePart {
        VoicePart {
            key: VoiceKey { staff, voice },
            atoms,
        }
    }

    #[test]
    fn test_grouping() {
        let score = Score::new(
            vec![
                part(1, 1, vec![]),
                part(0, 2, vec![]),
                part(0, 1, vec![]),
            ],
            |staff| Some(format!("S{}", staff)),
        );
        let layout: Vec<(usize, Vec<u8>)> = score
            .staves
            .iter()
            .map(|s| (s.staff, s.voices.iter().map(|v| v.key.voice).collect()))
            .collect();
        assert_eq!(layout, vec![(0, vec![1, 2]), (1, vec![1])]);
        assert_eq!(score.staves[1].name.as_deref(), Some("S1"));
    }

    #[test]
    fn test_display() {
        let score = Score::new(
            vec![
                part(
                    0,
                    1,
                    vec![
                        Atom::Key(KeySignature::C_MAJOR),
                        Atom::Rest(Duration::new(0, 0)),
                        Atom::BarCheck,
                        Atom::Rest(Duration::new(0, 0)),
                    ],
                ),
                part(0, 2, vec![Atom::Rest(Duration::new(-1, 0))]),
                part(2, 1, vec![Atom::Rest(Duration::new(1, 0))]),
            ],
            |staff| (staff == 0).then(|| "Violin \"I\"".to_string()),
        );
        let expected = r#"staffAvoiceB = {
\key c \major r1 |
r1
}

staffAvoiceC = {
r\breve
}

staffCvoiceB = {
r2
}

<<
  \new Staff <<
    \set Staff.instrumentName = #"Violin \"I\""
    \new Voice \staffAvoiceB
    \new Voice \staffAvoiceC
  >>
  \new Staff <<
    \new Voice \staffCvoiceB
  >>
>>
"#;
        assert_eq!(score.to_string(), expected);
    }

    #[test]
    fn test_empty_score() {
        let score = Score::new(Vec::<VoicePart>::new(), |_| None);
        assert_eq!(score.to_string(), "<<\n>>\n");
    }
}
