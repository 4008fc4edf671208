use std::error::Error;
use std::fmt;

/// Errors from parsing DE-9IM matrix and mask strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelateError {
    /// The string does not have exactly nine characters
    InvalidLength(usize),
    /// A character outside the allowed alphabet
    InvalidCharacter { position: usize, character: char },
}

impl fmt::Display for RelateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelateError::InvalidLength(len) => {
                write!(f, "Invalid length: expected 9 characters, found {}", len)
            }
            RelateError::InvalidCharacter {
                position,
                character,
            } => write!(
                f,
                "Invalid character: {:?} at position {}",
                character, position
            ),
        }
    }
}

impl Error for RelateError {}

/// Result type for parsing matrices and masks
pub type RelateResult<T> = Result<T, RelateError>;

/// Split a nine character DE-9IM string, checking length.
pub(crate) fn nine_chars(s: &str) -> RelateResult<[char; 9]> {
    let mut chars = ['F'; 9];
    let mut len = 0;
    for c in s.chars() {
        if len < 9 {
            chars[len] = c;
        }
        len += 1;
    }
    if len != 9 {
        return Err(RelateError::InvalidLength(len));
    }
    Ok(chars)
}
