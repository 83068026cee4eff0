pub mod atom;
pub mod duration;
pub mod pitch;

pub use atom::{Atom, BarType, Chord, Clef, KeySignature, Sequence, Tuplet};
pub use duration::Duration;
pub use pitch::Pitch;
