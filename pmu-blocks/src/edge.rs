//! Trigger qualification
//!
//! Timers, counters and flip-flops can react to a trigger either while it
//! is held (level) or only when it changes (edge). The previous level is
//! kept by the caller in a single bool.

/// How a trigger input qualifies as "fired"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeMode {
    /// Active while the input is non-zero
    #[default]
    Level,
    /// Fires on a 0 -> non-zero transition
    Rising,
    /// Fires on a non-zero -> 0 transition
    Falling,
    /// Fires on any transition
    Both,
}

impl EdgeMode {
    /// Decode from the wire code (0 = level, 1 = rising, 2 = falling, 3 = both)
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Level),
            1 => Some(Self::Rising),
            2 => Some(Self::Falling),
            3 => Some(Self::Both),
            _ => None,
        }
    }

    /// Wire code of this mode
    pub const fn code(self) -> u8 {
        match self {
            Self::Level => 0,
            Self::Rising => 1,
            Self::Falling => 2,
            Self::Both => 3,
        }
    }

    /// Check whether the trigger fired given the previous and current level
    #[inline]
    pub const fn qualify(self, prev: bool, now: bool) -> bool {
        match self {
            Self::Level => now,
            Self::Rising => !prev && now,
            Self::Falling => prev && !now,
            Self::Both => prev != now,
        }
    }

    /// Check if this mode reacts to a held level rather than a transition
    #[inline]
    pub const fn is_level(self) -> bool {
        matches!(self, Self::Level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level() {
        assert!(EdgeMode::Level.qualify(true, true));
        assert!(EdgeMode::Level.qualify(false, true));
        assert!(!EdgeMode::Level.qualify(true, false));
    }

    #[test]
    fn test_edges() {
        assert!(EdgeMode::Rising.qualify(false, true));
        assert!(!EdgeMode::Rising.qualify(true, true));
        assert!(EdgeMode::Falling.qualify(true, false));
        assert!(!EdgeMode::Falling.qualify(false, false));
        assert!(EdgeMode::Both.qualify(false, true));
        assert!(EdgeMode::Both.qualify(true, false));
        assert!(!EdgeMode::Both.qualify(true, true));
    }

    #[test]
    fn test_codes() {
        for code in 0..4 {
            assert_eq!(EdgeMode::from_code(code).unwrap().code(), code);
        }
        assert_eq!(EdgeMode::from_code(4), None);
    }
}
