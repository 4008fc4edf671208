//! Turns: the points where two linear geometries meet.
//!
//! A [`Turn`] records one meeting point together with, for each side,
//! the segment it happens on, how far along that segment it lies, and
//! what the curve does after the point (its [`OpType`]). Relate
//! consumes turns sorted along one of the two geometries; see
//! [`sort_turns`].
use std::cmp::Ordering;

use geo::{Coordinate, GeoFloat};

mod generate;
pub use generate::get_turns;
pub(crate) use generate::turns_between;

/// Identifies a segment of a linear geometry.
///
/// Ordered by component, then ring, then segment; this is the order
/// in which a scan walks the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SegmentId {
    pub component: usize,
    /// Always `0` for curves.
    pub ring: usize,
    pub segment: usize,
}

impl SegmentId {
    pub fn new(component: usize, segment: usize) -> Self {
        SegmentId {
            component,
            ring: 0,
            segment,
        }
    }

    /// Whether both segments belong to the same curve.
    #[inline]
    pub fn same_range(&self, other: &SegmentId) -> bool {
        self.component == other.component && self.ring == other.ring
    }
}

/// How the two curves meet at a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Transversal crossing in the interior of both segments.
    Crosses,
    /// Both curves pass through a vertex without running along each other.
    Touch,
    /// A vertex of one curve lies in the interior of the other's segment.
    TouchInterior,
    /// The curves run along each other and both are at a vertex.
    Equal,
    /// The curves run along each other.
    Collinear,
    /// One of the curves ends here.
    Blocked,
}

impl Method {
    #[inline]
    fn priority(self) -> u8 {
        match self {
            Method::Crosses => 0,
            Method::Touch => 1,
            Method::TouchInterior => 2,
            Method::Equal => 3,
            Method::Collinear => 4,
            Method::Blocked => 5,
        }
    }
}

/// What a curve does after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    /// Not classified; ignored by relate.
    None,
    /// The curve leaves along a path not shared with the other curve.
    Union,
    /// The curve continues along the other curve.
    Intersection,
    /// The curve ends here.
    Blocked,
}

impl OpType {
    #[inline]
    fn priority(self) -> u8 {
        match self {
            OpType::None => 0,
            OpType::Blocked => 1,
            OpType::Union => 2,
            OpType::Intersection => 3,
        }
    }
}

/// One side of a [`Turn`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnOperation<T: GeoFloat> {
    pub operation: OpType,
    pub seg_id: SegmentId,
    /// Squared distance of the turn point from the start of the segment.
    pub distance: T,
}

/// A meeting point of two linear geometries.
///
/// `operations[0]` describes the first geometry, `operations[1]` the
/// second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turn<T: GeoFloat> {
    pub point: Coordinate<T>,
    pub method: Method,
    pub operations: [TurnOperation<T>; 2],
}

/// Sort turns for a scan along geometry `side` (`0` or `1`).
///
/// Turns are ordered by the segment on `side`, then by distance along
/// it, then by the operation on `side` (blocked before union before
/// intersection). Remaining ties are broken by the other side so the
/// order does not depend on input order: sorting for side `1` gives
/// the same sequence as sorting the swapped turns for side `0`.
pub fn sort_turns<T: GeoFloat>(turns: &mut [Turn<T>], side: usize) {
    debug_assert!(side < 2);
    turns.sort_by(|a, b| compare_turns(a, b, side));
}

fn compare_turns<T: GeoFloat>(a: &Turn<T>, b: &Turn<T>, side: usize) -> Ordering {
    let other = 1 - side;
    let (l, r) = (&a.operations[side], &b.operations[side]);
    let (lo, ro) = (&a.operations[other], &b.operations[other]);
    l.seg_id
        .cmp(&r.seg_id)
        .then_with(|| compare_distance(l.distance, r.distance))
        .then_with(|| l.operation.priority().cmp(&r.operation.priority()))
        .then_with(|| lo.operation.priority().cmp(&ro.operation.priority()))
        .then_with(|| a.method.priority().cmp(&b.method.priority()))
        .then_with(|| lo.seg_id.cmp(&ro.seg_id))
        .then_with(|| compare_distance(lo.distance, ro.distance))
}

#[inline]
fn compare_distance<T: GeoFloat>(a: T, b: T) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
