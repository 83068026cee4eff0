use std::fmt;

const STEP_NAMES: [&str; 7] = ["c", "d", "e", "f", "g", "a", "b"];
const STEP_SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];
const ALTERATION_SUFFIXES: [&str; 5] = ["eses", "es", "", "is", "isis"];

/// A notated pitch. Octave 0 is the octave starting at middle C (`c'`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pitch {
    pub octave: i32,
    /// Diatonic step, 0 = c. May leave 0..7 until normalized.
    pub step: i32,
    /// Semitones, -2..=2.
    pub alteration: i32,
}

impl Pitch {
    pub const fn new(octave: i32, step: i32, alteration: i32) -> Self {
        Self {
            octave,
            step,
            alteration,
        }
    }

    /// Moves the step into 0..7, carrying into the octave.
    pub fn normalize(&mut self) {
        self.octave += self.step.div_euclid(7);
        self.step = self.step.rem_euclid(7);
    }

    /// Moves by `steps` diatonic steps, keeping the alteration.
    pub fn transposed(self, steps: i32) -> Self {
        let mut pitch = Self {
            step: self.step + steps,
            ..self
        };
        pitch.normalize();
        pitch
    }

    /// Semitones above middle C.
    pub fn semitone(&self) -> i32 {
        let mut pitch = *self;
        pitch.normalize();
        pitch.octave * 12 + STEP_SEMITONES[pitch.step as usize] + pitch.alteration
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pitch = *self;
        pitch.normalize();

        // the sequencer clamps alterations; anything else prints as natural
        let alteration = if (-2..=2).contains(&pitch.alteration) {
            pitch.alteration
        } else {
            0
        };
        write!(
            f,
            "{}{}",
            STEP_NAMES[pitch.step as usize],
            ALTERATION_SUFFIXES[(alteration + 2) as usize]
        )?;

        if pitch.octave < 0 {
            for _ in pitch.octave + 1..0 {
                write!(f, ",")?;
            }
        } else {
            for _ in 0..=pitch.octave {
                write!(f, "'")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display() {
        assert_eq!(Pitch::new(2, 3, -1).to_string(), "fes'''");
        assert_eq!(Pitch::new(0, 0, 0).to_string(), "c'");
        assert_eq!(Pitch::new(-1, 0, 0).to_string(), "c");
        assert_eq!(Pitch::new(-2, 2, 0).to_string(), "e,");
        assert_eq!(Pitch::new(-3, 2, 0).to_string(), "e,,");
        assert_eq!(Pitch::new(0, 3, 1).to_string(), "fis'");
        assert_eq!(Pitch::new(0, 6, -2).to_string(), "beses'");
        assert_eq!(Pitch::new(0, 4, 2).to_string(), "gisis'");
        assert_eq!(Pitch::new(0, 4, 5).to_string(), "g'");
    }

    #[test]
    fn test_normalize() {
        let mut pitch = Pitch::new(0, 9, 0);
        pitch.normalize();
        assert_eq!(pitch, Pitch::new(1, 2, 0));

        let mut pitch = Pitch::new(0, -1, 0);
        pitch.normalize();
        assert_eq!(pitch, Pitch::new(-1, 6, 0));

        assert_eq!(Pitch::new(-2, 2, 0).transposed(-8), Pitch::new(-3, 1, 0));
    }

    #[test]
    fn test_semitone() {
        assert_eq!(Pitch::new(0, 0, 0).semitone(), 0);
        assert_eq!(Pitch::new(-1, 6, 0).semitone(), -1);
        assert_eq!(Pitch::new(0, 3, 1).semitone(), 6);
        assert_eq!(Pitch::new(0, 7, 0).semitone(), 12);
        assert_eq!(Pitch::new(-2, 2, 0).semitone(), -20);
    }
}
