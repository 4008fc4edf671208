use geo::{
    coordinate_position::CoordPos,
    kernels::{HasKernel, Kernel, Orientation},
    Coordinate, GeoFloat, Line,
};

use crate::{
    linear::{Chains, CurveKind, Linear},
    point::SweepPoint,
    turns::SegmentId,
};

/// Which end of a curve a boundary query is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryQuery {
    Front,
    Back,
    Any,
}

/// Boundary of a linear geometry under the mod-2 rule.
///
/// An end point of a curve is on the boundary iff it is an end point
/// of an odd number of curves. A closed curve contributes its start
/// twice, and so has no boundary of its own.
#[derive(Debug, Clone)]
pub struct BoundaryChecker<'a, T: GeoFloat> {
    chains: &'a Chains<T>,
    points: Vec<SweepPoint<T>>,
}

impl<'a, T: GeoFloat> BoundaryChecker<'a, T> {
    pub fn new(chains: &'a Chains<T>) -> Self {
        let mut endpoints = Vec::with_capacity(2 * chains.len());
        for chain in chains.iter().filter(|c| !c.is_degenerate()) {
            // end points that are not finite are not boundary points
            endpoints.extend(chain.front().and_then(SweepPoint::try_new));
            endpoints.extend(chain.back().and_then(SweepPoint::try_new));
        }
        endpoints.sort();

        let mut points = Vec::new();
        let mut idx = 0;
        while idx < endpoints.len() {
            let mut jdx = idx + 1;
            while jdx < endpoints.len() && endpoints[jdx] == endpoints[idx] {
                jdx += 1;
            }
            if (jdx - idx) % 2 == 1 {
                points.push(endpoints[idx]);
            }
            idx = jdx;
        }
        BoundaryChecker { chains, points }
    }

    /// The prepared components this boundary belongs to.
    #[inline]
    pub fn chains(&self) -> &'a Chains<T> {
        self.chains
    }

    #[inline]
    pub fn has_boundary(&self) -> bool {
        !self.points.is_empty()
    }

    /// Whether `coord` is a boundary point.
    ///
    /// Callers use this when `coord` is already known to be an end point
    /// of a curve; `query` only documents which end.
    pub fn is_endpoint_boundary(&self, coord: Coordinate<T>, _query: BoundaryQuery) -> bool {
        SweepPoint::try_new(coord).map_or(false, |pt| self.points.binary_search(&pt).is_ok())
    }

    /// Whether `coord`, found on segment `seg_id`, is a boundary end
    /// point of that segment's curve.
    pub fn is_boundary(
        &self,
        coord: Coordinate<T>,
        seg_id: SegmentId,
        query: BoundaryQuery,
    ) -> bool {
        let chain = match self.chains.get(seg_id.component) {
            Some(chain) if !chain.is_degenerate() => chain,
            _ => return false,
        };
        let at_front = seg_id.segment == 0 && chain.front() == Some(coord);
        let at_back = seg_id.segment + 1 == chain.num_segments() && chain.back() == Some(coord);
        let at_end = match query {
            BoundaryQuery::Front => at_front,
            BoundaryQuery::Back => at_back,
            BoundaryQuery::Any => at_front || at_back,
        };
        at_end && self.is_endpoint_boundary(coord, query)
    }

    /// First point of a component.
    #[inline]
    pub fn front(&self, component: usize) -> Option<Coordinate<T>> {
        self.chains.get(component).and_then(|c| c.front())
    }

    /// Last point of a component.
    #[inline]
    pub fn back(&self, component: usize) -> Option<Coordinate<T>> {
        self.chains.get(component).and_then(|c| c.back())
    }

    /// Locate a coordinate relative to the geometry.
    pub fn position(&self, coord: Coordinate<T>) -> CoordPos {
        if self.is_endpoint_boundary(coord, BoundaryQuery::Any) {
            return CoordPos::OnBoundary;
        }
        let inside = self.chains.iter().any(|chain| match chain.kind() {
            CurveKind::Empty => false,
            CurveKind::SinglePoint => chain.front() == Some(coord),
            CurveKind::Open | CurveKind::Closed => {
                chain.lines().any(|line| on_segment(line, coord))
            }
        });
        if inside {
            CoordPos::Inside
        } else {
            CoordPos::Outside
        }
    }
}

/// Locate a coordinate relative to a linear geometry.
pub fn point_in_geometry<G>(coord: Coordinate<G::Scalar>, geom: &G) -> CoordPos
where
    G: Linear + ?Sized,
{
    let chains = Chains::new(geom);
    BoundaryChecker::new(&chains).position(coord)
}

fn on_segment<T: GeoFloat>(line: Line<T>, coord: Coordinate<T>) -> bool {
    if T::Ker::orient2d(line.start, line.end, coord) != Orientation::Collinear {
        return false;
    }
    let (start, end) = (line.start, line.end);
    start.x.min(end.x) <= coord.x
        && coord.x <= start.x.max(end.x)
        && start.y.min(end.y) <= coord.y
        && coord.y <= start.y.max(end.y)
}
