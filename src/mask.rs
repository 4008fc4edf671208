use std::{fmt, str::FromStr};

use geo::{coordinate_position::CoordPos, dimensions::Dimensions};

use crate::{
    error::{nine_chars, RelateError},
    matrix::{cell_index, dimension_char, IntersectionMatrix},
};

/// One entry of an [`IntersectionMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskCell {
    /// `*`: any value.
    Any,
    /// `T`: any non-empty value.
    NonEmpty,
    /// `F`, `0`, `1` or `2`: exactly this dimension.
    Exactly(Dimensions),
}

impl MaskCell {
    /// Whether a matrix value satisfies this entry.
    #[inline]
    pub fn accepts(self, dim: Dimensions) -> bool {
        match self {
            MaskCell::Any => true,
            MaskCell::NonEmpty => dim != Dimensions::Empty,
            MaskCell::Exactly(d) => dim == d,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '*' => MaskCell::Any,
            'T' | 't' => MaskCell::NonEmpty,
            'F' | 'f' => MaskCell::Exactly(Dimensions::Empty),
            '0' => MaskCell::Exactly(Dimensions::ZeroDimensional),
            '1' => MaskCell::Exactly(Dimensions::OneDimensional),
            '2' => MaskCell::Exactly(Dimensions::TwoDimensional),
            _ => return None,
        })
    }

    fn to_char(self) -> char {
        match self {
            MaskCell::Any => '*',
            MaskCell::NonEmpty => 'T',
            MaskCell::Exactly(d) => dimension_char(d),
        }
    }
}

/// A DE-9IM pattern such as `T*F**F***`.
///
/// Parsed from nine characters in row-major order (II, IB, IE, BI, BB,
/// BE, EI, EB, EE) over the alphabet `T F * 0 1 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionMask {
    cells: [[MaskCell; 3]; 3],
}

impl IntersectionMask {
    #[inline]
    pub fn get(&self, a: CoordPos, b: CoordPos) -> MaskCell {
        self.cells[cell_index(a)][cell_index(b)]
    }

    #[inline]
    pub(crate) fn cell(&self, row: usize, col: usize) -> MaskCell {
        self.cells[row][col]
    }

    /// Whether `matrix` satisfies every entry.
    pub fn matches(&self, matrix: &IntersectionMatrix) -> bool {
        (0..3).all(|row| (0..3).all(|col| self.cells[row][col].accepts(matrix.cell(row, col))))
    }
}

impl FromStr for IntersectionMask {
    type Err = RelateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars = nine_chars(s)?;
        let mut cells = [[MaskCell::Any; 3]; 3];
        for (position, &character) in chars.iter().enumerate() {
            cells[position / 3][position % 3] = MaskCell::from_char(character)
                .ok_or(RelateError::InvalidCharacter {
                    position,
                    character,
                })?;
        }
        Ok(IntersectionMask { cells })
    }
}

impl fmt::Display for IntersectionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.iter() {
            for cell in row.iter() {
                write!(f, "{}", cell.to_char())?;
            }
        }
        Ok(())
    }
}
