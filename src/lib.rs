//! Computes the DE-9IM relationship of two linear geometries.
//!
//! 1. [Relate](#relate)
//! 1. [Turns](#turns)
//! 1. [Masks and Predicates](#masks-and-predicates)
//!
//! # Relate
//!
//! The [Dimensionally Extended 9-Intersection Model][DE-9IM] describes
//! how two geometries interact by the dimension of the intersection
//! of the interior, boundary and exterior of one with those of the
//! other. [`relate`] computes this [`IntersectionMatrix`] for any two
//! [`Linear`] geometries: a [`LineString`] or a [`MultiLineString`].
//!
//! The boundary of a linear geometry follows the mod-2 rule: an end
//! point of a curve is on the boundary iff it ends an odd number of
//! curves. Closed curves have no boundary.
//!
//! ## Usage
//!
//! ```rust
//! use geo::LineString;
//! use geo_relate::relate;
//! let a = LineString::from(vec![(0., 0.), (2., 2.)]);
//! let b = LineString::from(vec![(0., 2.), (2., 0.)]);
//! let matrix = relate(&a, &b);
//! assert_eq!(matrix.to_string(), "0F1FF0102");
//! assert!(matrix.is_crosses());
//! ```
//!
//! # Turns
//!
//! The matrix is derived from the *turns*: the points where the two
//! geometries meet, annotated with what each curve does after the
//! point. [`get_turns`] computes them; [`relate_with_turns`] accepts
//! turns computed elsewhere. Each geometry is then scanned along its
//! curves with the turns in order, tracking when it runs along the
//! other geometry and when it leaves it.
//!
//! # Masks and Predicates
//!
//! An [`IntersectionMask`] is a DE-9IM pattern such as `T*F**F***`.
//! [`relate_pattern`] answers whether the matrix matches a mask, and
//! stops as soon as the answer is known. The named predicates live on
//! [`IntersectionMatrix`].
//!
//! [DE-9IM]: //en.wikipedia.org/wiki/DE-9IM
//! [`LineString`]: geo::LineString
//! [`MultiLineString`]: geo::MultiLineString
mod point;
pub use point::SweepPoint;

mod linear;
pub use linear::{classify, Chain, Chains, CurveKind, Linear};

mod boundary;
pub use boundary::{point_in_geometry, BoundaryChecker, BoundaryQuery};

pub mod turns;
pub use turns::{get_turns, sort_turns, Method, OpType, SegmentId, Turn, TurnOperation};

mod error;
pub use error::{RelateError, RelateResult};

mod matrix;
pub use matrix::IntersectionMatrix;

mod mask;
pub use mask::{IntersectionMask, MaskCell};

mod relate;
pub use relate::{relate, relate_pattern, relate_with_turns, Relate};

#[cfg(test)]
#[path = "../benches/utils/random.rs"]
pub mod random;
