//! DE-9IM relate for pairs of linear geometries.
use geo::{coordinate_position::CoordPos, dimensions::Dimensions, GeoFloat};
use log::debug;

use crate::{
    boundary::BoundaryChecker,
    linear::{Chains, Linear},
    mask::IntersectionMask,
    matrix::{IntersectionMatrix, Interrupt, MatrixHandler},
    turns::{sort_turns, turns_between, Turn},
};

mod analyser;
use analyser::Analyser;

mod disjoint;
use disjoint::scan_disjoint;


/// Compute the DE-9IM matrix of two linear geometries.
///
/// Coordinates that are not finite are never boundary points, and
/// intersections at such coordinates are ignored. The matrix is then
/// a best effort and does not panic.
pub fn relate<A, B>(a: &A, b: &B) -> IntersectionMatrix
where
    A: Linear + ?Sized,
    B: Linear<Scalar = A::Scalar> + ?Sized,
{
    let (a, b) = (Chains::new(a), Chains::new(b));
    let turns = turns_between(&a, &b);
    relate_chains(&a, &b, turns, Interrupt::Full).into_matrix()
}

/// Compute the DE-9IM matrix from turns computed elsewhere.
///
/// `turns` must hold every meeting point of `a` and `b`, with segment
/// indices counted between consecutive distinct points, as produced by
/// [`get_turns`](crate::get_turns).
pub fn relate_with_turns<A, B>(a: &A, b: &B, turns: Vec<Turn<A::Scalar>>) -> IntersectionMatrix
where
    A: Linear + ?Sized,
    B: Linear<Scalar = A::Scalar> + ?Sized,
{
    let (a, b) = (Chains::new(a), Chains::new(b));
    relate_chains(&a, &b, turns, Interrupt::Full).into_matrix()
}

/// Whether the DE-9IM matrix of two linear geometries matches `mask`.
///
/// Stops as soon as the answer is known.
pub fn relate_pattern<A, B>(a: &A, b: &B, mask: &IntersectionMask) -> bool
where
    A: Linear + ?Sized,
    B: Linear<Scalar = A::Scalar> + ?Sized,
{
    let (a, b) = (Chains::new(a), Chains::new(b));
    let turns = turns_between(&a, &b);
    relate_chains(&a, &b, turns, Interrupt::Mask(*mask))
        .into_matrix()
        .matches(mask)
}

fn relate_chains<T: GeoFloat>(
    a: &Chains<T>,
    b: &Chains<T>,
    mut turns: Vec<Turn<T>>,
    interrupt: Interrupt,
) -> MatrixHandler {
    let mut handler = MatrixHandler::new(interrupt);
    handler.set(CoordPos::Outside, CoordPos::Outside, Dimensions::TwoDimensional);

    let boundary_a = BoundaryChecker::new(a);
    let boundary_b = BoundaryChecker::new(b);
    debug!(
        "relate: {na} x {nb} components, {n} turns",
        na = a.len(),
        nb = b.len(),
        n = turns.len()
    );

    scan_disjoint(&mut handler, &turns, 0, &boundary_a, &boundary_b);
    if handler.interrupted() {
        return handler;
    }
    scan_disjoint(&mut handler, &turns, 1, &boundary_b, &boundary_a);
    if handler.interrupted() || turns.is_empty() {
        return handler;
    }

    sort_turns(&mut turns, 0);
    Analyser::new(0, &boundary_a, &boundary_b).analyse(&mut handler, &turns);
    if handler.interrupted() {
        return handler;
    }

    sort_turns(&mut turns, 1);
    Analyser::new(1, &boundary_b, &boundary_a).analyse(&mut handler, &turns);
    handler
}

/// Relate operations on linear geometries.
///
/// Implemented for every [`Linear`] geometry; mixing
/// [`LineString`](geo::LineString) and
/// [`MultiLineString`](geo::MultiLineString) is fine.
pub trait Relate: Linear {
    fn relate<G>(&self, other: &G) -> IntersectionMatrix
    where
        G: Linear<Scalar = Self::Scalar> + ?Sized,
    {
        relate(self, other)
    }

    fn relate_pattern<G>(&self, other: &G, mask: &IntersectionMask) -> bool
    where
        G: Linear<Scalar = Self::Scalar> + ?Sized,
    {
        relate_pattern(self, other, mask)
    }
}

impl<L: Linear + ?Sized> Relate for L {}
