use std::{fmt, str::FromStr};

use geo::{coordinate_position::CoordPos, dimensions::Dimensions};
use log::{debug, trace};

use crate::{
    error::{nine_chars, RelateError},
    mask::{IntersectionMask, MaskCell},
};

#[inline]
pub(crate) fn cell_index(pos: CoordPos) -> usize {
    match pos {
        CoordPos::Inside => 0,
        CoordPos::OnBoundary => 1,
        CoordPos::Outside => 2,
    }
}

#[inline]
fn rank(dim: Dimensions) -> u8 {
    match dim {
        Dimensions::Empty => 0,
        Dimensions::ZeroDimensional => 1,
        Dimensions::OneDimensional => 2,
        Dimensions::TwoDimensional => 3,
    }
}

pub(crate) fn dimension_char(dim: Dimensions) -> char {
    match dim {
        Dimensions::Empty => 'F',
        Dimensions::ZeroDimensional => '0',
        Dimensions::OneDimensional => '1',
        Dimensions::TwoDimensional => '2',
    }
}

/// The DE-9IM matrix of two geometries.
///
/// Rows are the interior, boundary and exterior of the first geometry;
/// columns those of the second. Each cell holds the dimension of the
/// intersection of the two point sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionMatrix {
    cells: [[Dimensions; 3]; 3],
}

impl IntersectionMatrix {
    /// All cells empty.
    pub fn empty() -> Self {
        IntersectionMatrix {
            cells: [[Dimensions::Empty; 3]; 3],
        }
    }

    #[inline]
    pub fn get(&self, a: CoordPos, b: CoordPos) -> Dimensions {
        self.cells[cell_index(a)][cell_index(b)]
    }

    #[inline]
    pub(crate) fn cell(&self, row: usize, col: usize) -> Dimensions {
        self.cells[row][col]
    }

    /// The matrix of the same pair with the geometries swapped.
    pub fn transposed(&self) -> Self {
        let mut cells = self.cells;
        for (row, cells_row) in cells.iter_mut().enumerate() {
            for (col, cell) in cells_row.iter_mut().enumerate() {
                *cell = self.cells[col][row];
            }
        }
        IntersectionMatrix { cells }
    }

    pub fn matches(&self, mask: &IntersectionMask) -> bool {
        mask.matches(self)
    }

    #[inline]
    fn is_set(&self, a: CoordPos, b: CoordPos) -> bool {
        self.get(a, b) != Dimensions::Empty
    }

    /// The geometries share no point.
    pub fn is_disjoint(&self) -> bool {
        use CoordPos::*;
        !self.is_set(Inside, Inside)
            && !self.is_set(Inside, OnBoundary)
            && !self.is_set(OnBoundary, Inside)
            && !self.is_set(OnBoundary, OnBoundary)
    }

    pub fn is_intersects(&self) -> bool {
        !self.is_disjoint()
    }

    /// The geometries meet only at their boundaries.
    pub fn is_touches(&self) -> bool {
        use CoordPos::*;
        !self.is_set(Inside, Inside)
            && (self.is_set(Inside, OnBoundary)
                || self.is_set(OnBoundary, Inside)
                || self.is_set(OnBoundary, OnBoundary))
    }

    /// The interiors of two curves cross at isolated points.
    pub fn is_crosses(&self) -> bool {
        self.get(CoordPos::Inside, CoordPos::Inside) == Dimensions::ZeroDimensional
    }

    pub fn is_within(&self) -> bool {
        use CoordPos::*;
        self.is_set(Inside, Inside)
            && !self.is_set(Inside, Outside)
            && !self.is_set(OnBoundary, Outside)
    }

    pub fn is_contains(&self) -> bool {
        self.transposed().is_within()
    }

    /// The geometries are topologically equal.
    pub fn is_equal_topo(&self) -> bool {
        self.is_within() && self.is_contains()
    }

    /// The curves share a stretch and each has a part outside the other.
    pub fn is_overlaps(&self) -> bool {
        use CoordPos::*;
        self.get(Inside, Inside) == Dimensions::OneDimensional
            && self.is_set(Inside, Outside)
            && self.is_set(Outside, Inside)
    }
}

impl fmt::Display for IntersectionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.iter() {
            for &cell in row.iter() {
                write!(f, "{}", dimension_char(cell))?;
            }
        }
        Ok(())
    }
}

impl FromStr for IntersectionMatrix {
    type Err = RelateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars = nine_chars(s)?;
        let mut cells = [[Dimensions::Empty; 3]; 3];
        for (position, &character) in chars.iter().enumerate() {
            cells[position / 3][position % 3] = match character {
                'F' | 'f' => Dimensions::Empty,
                '0' => Dimensions::ZeroDimensional,
                '1' => Dimensions::OneDimensional,
                '2' => Dimensions::TwoDimensional,
                _ => {
                    return Err(RelateError::InvalidCharacter {
                        position,
                        character,
                    })
                }
            };
        }
        Ok(IntersectionMatrix { cells })
    }
}

/// Highest value each cell can reach for two curves in the plane.
const LINEAR_LIMITS: [[Dimensions; 3]; 3] = [
    [
        Dimensions::OneDimensional,
        Dimensions::ZeroDimensional,
        Dimensions::OneDimensional,
    ],
    [
        Dimensions::ZeroDimensional,
        Dimensions::ZeroDimensional,
        Dimensions::ZeroDimensional,
    ],
    [
        Dimensions::OneDimensional,
        Dimensions::ZeroDimensional,
        Dimensions::TwoDimensional,
    ],
];

/// When a relate computation may stop early.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Interrupt {
    /// Once every cell holds its highest reachable value.
    Full,
    /// Once the answer to the mask query can no longer change.
    Mask(IntersectionMask),
}

impl Interrupt {
    fn check(&self, matrix: &IntersectionMatrix) -> bool {
        match self {
            Interrupt::Full => (0..3).all(|row| {
                (0..3).all(|col| rank(matrix.cell(row, col)) >= rank(LINEAR_LIMITS[row][col]))
            }),
            Interrupt::Mask(mask) => {
                let mut settled = true;
                for row in 0..3 {
                    for col in 0..3 {
                        let limit = LINEAR_LIMITS[row][col];
                        match cell_state(mask.cell(row, col), matrix.cell(row, col), limit) {
                            CellState::Violated => return true,
                            CellState::Pending => settled = false,
                            CellState::Settled => {}
                        }
                    }
                }
                settled
            }
        }
    }
}

enum CellState {
    /// Can never match, whatever is found later.
    Violated,
    /// Matches now and keeps matching.
    Settled,
    Pending,
}

/// Classify a cell against a mask entry, given that its value only
/// grows and never passes `limit`.
fn cell_state(mask: MaskCell, value: Dimensions, limit: Dimensions) -> CellState {
    let can_grow = rank(value) < rank(limit);
    match mask {
        MaskCell::Any => CellState::Settled,
        MaskCell::NonEmpty => {
            if value != Dimensions::Empty {
                CellState::Settled
            } else if can_grow {
                CellState::Pending
            } else {
                CellState::Violated
            }
        }
        MaskCell::Exactly(dim) => {
            if rank(value) > rank(dim) || rank(dim) > rank(limit) {
                CellState::Violated
            } else if value == dim && !can_grow {
                CellState::Settled
            } else {
                CellState::Pending
            }
        }
    }
}

/// The matrix under construction, together with its interrupt policy.
#[derive(Debug)]
pub(crate) struct MatrixHandler {
    matrix: IntersectionMatrix,
    interrupt: Interrupt,
    interrupted: bool,
}

impl MatrixHandler {
    pub fn new(interrupt: Interrupt) -> Self {
        MatrixHandler {
            matrix: IntersectionMatrix::empty(),
            interrupt,
            interrupted: false,
        }
    }

    /// Write a cell unconditionally.
    pub fn set(&mut self, a: CoordPos, b: CoordPos, dim: Dimensions) {
        self.matrix.cells[cell_index(a)][cell_index(b)] = dim;
    }

    /// Raise a cell to at least `dim`; swaps the position roles when
    /// `transposed`.
    pub fn update(&mut self, a: CoordPos, b: CoordPos, dim: Dimensions, transposed: bool) {
        let (a, b) = if transposed { (b, a) } else { (a, b) };
        let cell = &mut self.matrix.cells[cell_index(a)][cell_index(b)];
        if rank(*cell) >= rank(dim) {
            return;
        }
        trace!("update {a:?}/{b:?}: {prev:?} -> {dim:?}", prev = *cell);
        *cell = dim;
        if self.interrupt.check(&self.matrix) {
            debug!("interrupt at {matrix}", matrix = self.matrix);
            self.interrupted = true;
        }
    }

    #[inline]
    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn into_matrix(self) -> IntersectionMatrix {
        self.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use geo::coordinate_position::CoordPos::*;
    use geo::dimensions::Dimensions::*;

    #[test]
    fn test_display_parse() {
        let matrix: IntersectionMatrix = "0F1FF0102".parse().unwrap();
        assert_eq!(matrix.get(Inside, Inside), ZeroDimensional);
        assert_eq!(matrix.get(Inside, Outside), OneDimensional);
        assert_eq!(matrix.get(OnBoundary, Outside), ZeroDimensional);
        assert_eq!(matrix.get(Outside, Outside), TwoDimensional);
        assert_eq!(matrix.to_string(), "0F1FF0102");
        assert_eq!(IntersectionMatrix::empty().to_string(), "FFFFFFFFF");
        assert!("0F1FF01*2".parse::<IntersectionMatrix>().is_err());
    }

    #[test]
    fn test_transposed() {
        let matrix: IntersectionMatrix = "FF10F0102".parse().unwrap();
        assert_eq!(matrix.transposed().to_string(), "F01FF0102");
        assert_eq!(matrix.transposed().transposed(), matrix);
    }

    #[test]
    fn test_update_only_upgrades() {
        let mut handler = MatrixHandler::new(Interrupt::Full);
        handler.update(Inside, Inside, OneDimensional, false);
        handler.update(Inside, Inside, ZeroDimensional, false);
        handler.update(OnBoundary, Outside, ZeroDimensional, true);
        handler.set(Outside, Outside, TwoDimensional);
        let matrix = handler.into_matrix();
        assert_eq!(matrix.get(Inside, Inside), OneDimensional);
        assert_eq!(matrix.get(Outside, OnBoundary), ZeroDimensional);
        assert_eq!(matrix.get(OnBoundary, Outside), Empty);
        assert_eq!(matrix.to_string(), "1FFFFFF02");
    }

    #[test]
    fn test_full_interrupt() {
        let mut handler = MatrixHandler::new(Interrupt::Full);
        handler.set(Outside, Outside, TwoDimensional);
        for &(a, b, dim) in &[
            (Inside, Inside, OneDimensional),
            (Inside, OnBoundary, ZeroDimensional),
            (Inside, Outside, OneDimensional),
            (OnBoundary, Inside, ZeroDimensional),
            (OnBoundary, OnBoundary, ZeroDimensional),
            (OnBoundary, Outside, ZeroDimensional),
            (Outside, Inside, OneDimensional),
        ] {
            handler.update(a, b, dim, false);
            assert!(!handler.interrupted());
        }
        handler.update(Outside, OnBoundary, ZeroDimensional, false);
        assert!(handler.interrupted());
    }

    #[test]
    fn test_mask_interrupt() {
        // settled once the interiors share a stretch
        let mask: IntersectionMask = "1********".parse().unwrap();
        let mut handler = MatrixHandler::new(Interrupt::Mask(mask));
        handler.update(Inside, Outside, OneDimensional, false);
        assert!(!handler.interrupted());
        handler.update(Inside, Inside, ZeroDimensional, false);
        assert!(!handler.interrupted());
        handler.update(Inside, Inside, OneDimensional, false);
        assert!(handler.interrupted());

        // boundary cannot reach dimension one
        let mask: IntersectionMask = "****1****".parse().unwrap();
        let mut handler = MatrixHandler::new(Interrupt::Mask(mask));
        handler.update(Inside, Inside, ZeroDimensional, false);
        assert!(handler.interrupted());

        let mask: IntersectionMask = "F********".parse().unwrap();
        let mut handler = MatrixHandler::new(Interrupt::Mask(mask));
        handler.update(Outside, Inside, OneDimensional, false);
        assert!(!handler.interrupted());
        handler.update(Inside, Inside, ZeroDimensional, false);
        assert!(handler.interrupted());
    }

    #[test]
    fn test_predicates() {
        let parse = |s: &str| s.parse::<IntersectionMatrix>().unwrap();
        assert!(parse("FF1FF0102").is_disjoint());
        assert!(parse("0F1FF0102").is_crosses());
        assert!(parse("0F1FF0102").is_intersects());
        assert!(parse("FF10F0102").is_touches());
        assert!(parse("FF1F00102").is_touches());
        assert!(parse("1FF0FF102").is_within());
        assert!(parse("101FFFFF2").is_contains());
        assert!(parse("1FFF0FFF2").is_equal_topo());
        assert!(parse("1010F0102").is_overlaps());
        assert!(!parse("1010F0102").is_within());
        assert!(!parse("0F1FF0102").is_touches());
    }
}
