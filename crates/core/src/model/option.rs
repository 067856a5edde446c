use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OptionLetterError {
    #[error("option index {0} is outside A-D")]
    IndexOutOfRange(usize),

    #[error("invalid option letter: {0:?}")]
    InvalidLetter(String),
}

//
// ─── OPTION LETTER ─────────────────────────────────────────────────────────────
//

/// Label of a selectable option. A question carries at most four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Maximum number of options a question may have.
    pub const MAX_OPTIONS: usize = 4;

    /// Letter for the zero-based option position.
    ///
    /// # Errors
    ///
    /// Returns `OptionLetterError::IndexOutOfRange` for positions past `D`.
    pub fn from_index(index: usize) -> Result<Self, OptionLetterError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(OptionLetterError::IndexOutOfRange(index))
    }

    /// Zero-based position of this option.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }

    /// Whether this letter exists on a question with `option_count` options.
    #[must_use]
    pub fn fits(self, option_count: usize) -> bool {
        self.index() < option_count
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for OptionLetter {
    type Err = OptionLetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            "D" | "d" => Ok(Self::D),
            other => Err(OptionLetterError::InvalidLetter(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_letter_agree() {
        for (idx, letter) in OptionLetter::ALL.iter().enumerate() {
            assert_eq!(letter.index(), idx);
            assert_eq!(OptionLetter::from_index(idx).unwrap(), *letter);
        }
    }

    #[test]
    fn from_index_rejects_fifth_option() {
        assert_eq!(
            OptionLetter::from_index(4),
            Err(OptionLetterError::IndexOutOfRange(4))
        );
    }

    #[test]
    fn parses_case_insensitive() {
        assert_eq!("c".parse::<OptionLetter>().unwrap(), OptionLetter::C);
        assert_eq!(" D ".parse::<OptionLetter>().unwrap(), OptionLetter::D);
        assert!("E".parse::<OptionLetter>().is_err());
        assert!("".parse::<OptionLetter>().is_err());
    }

    #[test]
    fn fits_respects_option_count() {
        assert!(OptionLetter::B.fits(2));
        assert!(!OptionLetter::C.fits(2));
    }
}
