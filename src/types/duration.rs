use num_rational::Rational64;
use std::fmt;

/// Written length of a chord, rest or skip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Duration {
    /// Log2 relative to a whole note: 0 whole, 2 quarter, -1 breve.
    pub log: i32,
    pub dots: u8,
    /// Scaling factor; `None` is 1/1.
    pub factor: Option<Rational64>,
}

impl Duration {
    pub const fn new(log: i32, dots: u8) -> Self {
        Self {
            log,
            dots,
            factor: None,
        }
    }

    /// A sixteenth scaled to span `ticks` (60 ticks per sixteenth).
    pub fn sixteenths(ticks: u32) -> Self {
        Self {
            log: 4,
            dots: 0,
            factor: Some(Rational64::new(ticks as i64, 60)),
        }
    }

    /// Multiplies the factor by `by`.
    pub fn scaled(self, by: Rational64) -> Self {
        Self {
            factor: Some(self.factor.unwrap_or(Rational64::from_integer(1)) * by),
            ..self
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.log {
            -1 => write!(f, "\\breve")?,
            -2 => write!(f, "\\longa")?,
            log if log < -2 => write!(f, "\\maxima")?,
            log => write!(f, "{}", 1u64 << log.min(63))?,
        }
        for _ in 0..self.dots {
            write!(f, ".")?;
        }
        if let Some(factor) = self.factor {
            write!(f, "*{}", factor)?;
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
        let duration = Duration {
            log: 2,
            dots: 1,
            factor: Some(Rational64::new(7, 5)),
        };
        assert_eq!(duration.to_string(), "4.*7/5");
        assert_eq!(Duration::new(0, 0).to_string(), "1");
        assert_eq!(Duration::new(3, 0).to_string(), "8");
        assert_eq!(Duration::new(-1, 1).to_string(), "\\breve.");
        assert_eq!(Duration::new(-2, 0).to_string(), "\\longa");
        assert_eq!(Duration::new(-3, 0).to_string(), "\\maxima");
    }

    #[test]
    fn test_sixteenths() {
        assert_eq!(Duration::sixteenths(240).to_string(), "16*4");
        assert_eq!(Duration::sixteenths(90).to_string(), "16*3/2");
        assert_eq!(
            Duration::sixteenths(240)
                .scaled(Rational64::new(3, 2))
                .to_string(),
            "16*6"
        );
        assert_eq!(
            Duration::new(3, 0).scaled(Rational64::new(2, 3)).to_string(),
            "8*2/3"
        );
    }
}
