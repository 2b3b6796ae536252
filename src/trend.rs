//! Trend codes attached to every reading.

use std::fmt;

/// Trend code used when the direction is unknown
pub const BLANK: char = ' ';

/// Rate-of-change direction reported alongside a reading.
///
/// The wire format carries the raw character, so any Latin-1 character
/// survives a round trip. Only the codes below have a meaning to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    Blank,
    RisingSharply,
    Rising,
    Stable,
    Falling,
    FallingSharply,
}

impl Trend {
    pub const ALL: [Self; 6] = [
        Self::Blank,
        Self::RisingSharply,
        Self::Rising,
        Self::Stable,
        Self::Falling,
        Self::FallingSharply,
    ];

    /// Look up a trend code. Case-insensitive; NUL and blank map to `Blank`.
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        match normalize_code(code) {
            ' ' => Some(Self::Blank),
            'w' => Some(Self::RisingSharply),
            'e' => Some(Self::Rising),
            'd' => Some(Self::Stable),
            'x' => Some(Self::Falling),
            'z' => Some(Self::FallingSharply),
            _ => None,
        }
    }

    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Blank => BLANK,
            Self::RisingSharply => 'w',
            Self::Rising => 'e',
            Self::Stable => 'd',
            Self::Falling => 'x',
            Self::FallingSharply => 'z',
        }
    }

    /// Human-readable phrase shown next to the value
    #[must_use]
    pub const fn phrase(self) -> &'static str {
        match self {
            Self::Blank => " ",
            Self::RisingSharply => "increasing sharply",
            Self::Rising => "increasing",
            Self::Stable => "stable",
            Self::Falling => "decreasing",
            Self::FallingSharply => "decreasing sharply",
        }
    }

    /// Arrow glyph for compact displays
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Blank => " ",
            Self::RisingSharply => "\u{1F851}",
            Self::Rising => "\u{1F855}",
            Self::Stable => "\u{1F852}",
            Self::Falling => "\u{1F856}",
            Self::FallingSharply => "\u{1F853}",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

/// Canonical form of a raw trend character: lower-cased, NUL folded to blank
#[inline]
#[must_use]
pub fn normalize_code(code: char) -> char {
    if code == '\0' {
        BLANK
    } else {
        code.to_lowercase().next().unwrap_or(code)
    }
}
