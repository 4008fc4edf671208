use std::collections::{BTreeMap, BTreeSet};

use geo::{
    line_intersection::{line_intersection, LineIntersection},
    Coordinate, GeoFloat, Line,
};
use itertools::iproduct;
use log::{debug, trace};

use super::{Method, OpType, SegmentId, Turn, TurnOperation};
use crate::{
    linear::{Chain, Chains, Linear},
    point::SweepPoint,
};

/// Compute the turns between two linear geometries.
///
/// Every pair of segments is tested with [`line_intersection`]; a
/// collinear overlap contributes both of its end points. Points where
/// both curves merely continue along a shared stretch produce no turn.
/// Components with fewer than two distinct points produce no turns.
///
/// This is a quadratic pass over the segments.
pub fn get_turns<A, B>(a: &A, b: &B) -> Vec<Turn<A::Scalar>>
where
    A: Linear + ?Sized,
    B: Linear<Scalar = A::Scalar> + ?Sized,
{
    turns_between(&Chains::new(a), &Chains::new(b))
}

pub(crate) fn turns_between<T: GeoFloat>(a: &Chains<T>, b: &Chains<T>) -> Vec<Turn<T>> {
    let mut turns = Vec::new();
    for (ia, ca) in a.iter().enumerate().filter(|(_, c)| !c.is_degenerate()) {
        for (ib, cb) in b.iter().enumerate().filter(|(_, c)| !c.is_degenerate()) {
            component_turns(ia, ca, ib, cb, &mut turns);
        }
    }
    debug!("generated {n} turns", n = turns.len());
    turns
}

/// Where a curve is when it passes an intersection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Position {
    /// At the first point of the segment.
    Start,
    /// Strictly inside the segment.
    Inner,
    /// At the last point of the curve.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Visit {
    segment: usize,
    position: Position,
}

impl Visit {
    /// Normalize a point found on segment `segment` of `chain`.
    ///
    /// The end of a segment is reported as the start of the next one,
    /// so each location on a curve has exactly one visit.
    fn locate<T: GeoFloat>(chain: &Chain<T>, segment: usize, pt: Coordinate<T>) -> Self {
        let line = chain.segment(segment);
        if pt == line.start {
            Visit {
                segment,
                position: Position::Start,
            }
        } else if pt == line.end {
            if segment + 1 < chain.num_segments() {
                Visit {
                    segment: segment + 1,
                    position: Position::Start,
                }
            } else {
                Visit {
                    segment,
                    position: Position::End,
                }
            }
        } else {
            Visit {
                segment,
                position: Position::Inner,
            }
        }
    }
}

/// How a curve approaches and leaves a turn point relative to the
/// other curve.
#[derive(Debug, Clone, Copy)]
struct Approach {
    at_vertex: bool,
    arrives_along: bool,
    /// `None` when the curve ends at the point.
    departs_along: Option<bool>,
}

impl Approach {
    fn new<T: GeoFloat>(
        chain: &Chain<T>,
        visit: Visit,
        pt: Coordinate<T>,
        other: &Chain<T>,
    ) -> Self {
        let line = chain.segment(visit.segment);
        let arrival = match visit.position {
            Position::Start if visit.segment == 0 => None,
            Position::Start => Some(chain.segment(visit.segment - 1)),
            Position::Inner | Position::End => Some(Line::new(line.start, pt)),
        };
        let departure = match visit.position {
            Position::End => None,
            Position::Start | Position::Inner => Some(Line::new(pt, line.end)),
        };
        Approach {
            at_vertex: visit.position != Position::Inner,
            arrives_along: arrival.map_or(false, |piece| runs_along(piece, pt, other)),
            departs_along: departure.map(|piece| runs_along(piece, pt, other)),
        }
    }

    #[inline]
    fn collinear(&self) -> bool {
        self.arrives_along || self.departs_along == Some(true)
    }

    /// In the middle of a stretch shared with the other curve.
    #[inline]
    fn continues_along(&self) -> bool {
        self.arrives_along && self.departs_along == Some(true)
    }

    #[inline]
    fn operation(&self) -> OpType {
        match self.departs_along {
            None => OpType::Blocked,
            Some(true) => OpType::Intersection,
            Some(false) => OpType::Union,
        }
    }
}

/// Whether `piece`, which has `pt` as an end point, overlaps some
/// segment of `other` with positive length next to `pt`.
fn runs_along<T: GeoFloat>(piece: Line<T>, pt: Coordinate<T>, other: &Chain<T>) -> bool {
    if !is_finite(&piece) {
        return false;
    }
    other.lines().filter(is_finite).any(|line| match line_intersection(piece, line) {
        Some(LineIntersection::Collinear { intersection }) => {
            intersection.start == pt || intersection.end == pt
        }
        _ => false,
    })
}

/// Segments with a coordinate that is not finite meet nothing.
#[inline]
fn is_finite<T: GeoFloat>(line: &Line<T>) -> bool {
    line.start.x.is_finite()
        && line.start.y.is_finite()
        && line.end.x.is_finite()
        && line.end.y.is_finite()
}

fn method(a: &Approach, b: &Approach) -> Method {
    if a.collinear() || b.collinear() {
        if a.at_vertex && b.at_vertex {
            Method::Equal
        } else {
            Method::Collinear
        }
    } else if a.departs_along.is_none() || b.departs_along.is_none() {
        Method::Blocked
    } else if !a.at_vertex && !b.at_vertex {
        Method::Crosses
    } else if a.at_vertex != b.at_vertex {
        Method::TouchInterior
    } else {
        Method::Touch
    }
}

fn turn_operation<T: GeoFloat>(
    component: usize,
    chain: &Chain<T>,
    visit: Visit,
    approach: &Approach,
    pt: Coordinate<T>,
) -> TurnOperation<T> {
    let offset = pt - chain.segment(visit.segment).start;
    TurnOperation {
        operation: approach.operation(),
        seg_id: SegmentId::new(component, visit.segment),
        distance: offset.x * offset.x + offset.y * offset.y,
    }
}

fn component_turns<T: GeoFloat>(
    ia: usize,
    ca: &Chain<T>,
    ib: usize,
    cb: &Chain<T>,
    turns: &mut Vec<Turn<T>>,
) {
    // Visits of either curve, keyed by intersection point.
    let mut nodes: BTreeMap<SweepPoint<T>, [BTreeSet<Visit>; 2]> = BTreeMap::new();
    let mut add = |pt: Coordinate<T>, ka: usize, kb: usize| {
        let key = match SweepPoint::try_new(pt) {
            Some(key) => key,
            None => {
                debug!("skipping intersection at {pt:?}");
                return;
            }
        };
        let visits = nodes.entry(key).or_default();
        visits[0].insert(Visit::locate(ca, ka, pt));
        visits[1].insert(Visit::locate(cb, kb, pt));
    };
    for (ka, la) in ca.lines().enumerate().filter(|(_, l)| is_finite(l)) {
        for (kb, lb) in cb.lines().enumerate().filter(|(_, l)| is_finite(l)) {
            match line_intersection(la, lb) {
                None => {}
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    add(intersection, ka, kb);
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    add(intersection.start, ka, kb);
                    add(intersection.end, ka, kb);
                }
            }
        }
    }

    for (pt, [va, vb]) in nodes {
        let pt = pt.coord();
        for (&visit_a, &visit_b) in iproduct!(va.iter(), vb.iter()) {
            let app_a = Approach::new(ca, visit_a, pt, cb);
            let app_b = Approach::new(cb, visit_b, pt, ca);
            if app_a.continues_along() && app_b.continues_along() {
                continue;
            }
            let turn = Turn {
                point: pt,
                method: method(&app_a, &app_b),
                operations: [
                    turn_operation(ia, ca, visit_a, &app_a, pt),
                    turn_operation(ib, cb, visit_b, &app_b, pt),
                ],
            };
            trace!(
                "turn at {pt:?}: {m:?} {a:?}/{b:?}",
                m = turn.method,
                a = turn.operations[0].operation,
                b = turn.operations[1].operation,
            );
            turns.push(turn);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use approx::assert_relative_eq;
    use geo::{LineString, MultiLineString};
    use wkt::TryFromWkt;

    use super::*;
    use crate::relate::tests::init_log;

    fn ops(turn: &Turn<f64>) -> (OpType, OpType) {
        (turn.operations[0].operation, turn.operations[1].operation)
    }

    fn line_turns(wkt1: &str, wkt2: &str) -> Result<Vec<Turn<f64>>, Box<dyn Error>> {
        init_log();
        let a = LineString::<f64>::try_from_wkt_str(wkt1)?;
        let b = LineString::<f64>::try_from_wkt_str(wkt2)?;
        Ok(get_turns(&a, &b))
    }

    #[test]
    fn test_crossing() -> Result<(), Box<dyn Error>> {
        let turns = line_turns("LINESTRING(0 0,2 2)", "LINESTRING(0 2,2 0)")?;
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].method, Method::Crosses);
        assert_eq!(ops(&turns[0]), (OpType::Union, OpType::Union));
        assert_relative_eq!(turns[0].point.x, 1., epsilon = 1e-12);
        assert_relative_eq!(turns[0].point.y, 1., epsilon = 1e-12);
        assert_relative_eq!(turns[0].operations[0].distance, 2., epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_end_on_interior() -> Result<(), Box<dyn Error>> {
        let turns = line_turns("LINESTRING(1 1,1 0)", "LINESTRING(0 0,2 0)")?;
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].method, Method::Blocked);
        assert_eq!(ops(&turns[0]), (OpType::Blocked, OpType::Union));

        let turns = line_turns("LINESTRING(1 0,1 1)", "LINESTRING(0 0,2 0)")?;
        assert_eq!(turns[0].method, Method::TouchInterior);
        assert_eq!(ops(&turns[0]), (OpType::Union, OpType::Union));
        assert_eq!(turns[0].operations[1].distance, 1.);
        Ok(())
    }

    #[test]
    fn test_identical() -> Result<(), Box<dyn Error>> {
        let turns = line_turns("LINESTRING(0 0,1 0,2 0)", "LINESTRING(0 0,1 0,2 0)")?;
        // the shared vertex at (1 0) is in the middle of the overlap
        assert_eq!(turns.len(), 2);
        assert_eq!(ops(&turns[0]), (OpType::Intersection, OpType::Intersection));
        assert_eq!(turns[0].method, Method::Equal);
        assert_eq!(ops(&turns[1]), (OpType::Blocked, OpType::Blocked));
        assert_eq!(turns[1].operations[0].seg_id, SegmentId::new(0, 1));
        Ok(())
    }

    #[test]
    fn test_partial_overlap() -> Result<(), Box<dyn Error>> {
        let turns = line_turns("LINESTRING(0 0,2 0)", "LINESTRING(1 0,3 0)")?;
        assert_eq!(turns.len(), 2);
        assert_eq!(ops(&turns[0]), (OpType::Intersection, OpType::Intersection));
        assert_eq!(turns[0].method, Method::Collinear);
        assert_eq!(ops(&turns[1]), (OpType::Blocked, OpType::Union));
        assert_eq!(turns[1].point, Coordinate { x: 2., y: 0. });
        Ok(())
    }

    #[test]
    fn test_touch_at_vertices() -> Result<(), Box<dyn Error>> {
        let turns = line_turns("LINESTRING(0 0,1 1,2 0)", "LINESTRING(0 2,1 1,2 2)")?;
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].method, Method::Touch);
        assert_eq!(ops(&turns[0]), (OpType::Union, OpType::Union));
        assert_eq!(turns[0].operations[0].seg_id, SegmentId::new(0, 1));
        assert_eq!(turns[0].operations[0].distance, 0.);
        Ok(())
    }

    #[test]
    fn test_multi_components() -> Result<(), Box<dyn Error>> {
        init_log();
        let a = MultiLineString::<f64>::try_from_wkt_str(
            "MULTILINESTRING((0 0,1 0),(1 0,2 0),(5 5,5 5))",
        )?;
        let b = LineString::<f64>::try_from_wkt_str("LINESTRING(1 -1,1 1)")?;
        let turns = get_turns(&a, &b);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].operations[0].seg_id.component, 0);
        assert_eq!(ops(&turns[0]), (OpType::Blocked, OpType::Union));
        assert_eq!(turns[1].operations[0].seg_id.component, 1);
        assert_eq!(ops(&turns[1]), (OpType::Union, OpType::Union));
        assert_eq!(turns[1].method, Method::TouchInterior);
        Ok(())
    }

    #[test]
    fn test_disjoint() -> Result<(), Box<dyn Error>> {
        let turns = line_turns("LINESTRING(0 0,1 0)", "LINESTRING(0 5,1 5)")?;
        assert!(turns.is_empty());
        Ok(())
    }

    #[test]
    fn test_skips_non_finite_segments() {
        init_log();
        let a = LineString::from(vec![(0., 0.), (2., 2.), (f64::NAN, 0.)]);
        let b = LineString::from(vec![(0., 2.), (2., 0.), (4., 2.)]);
        let turns = get_turns(&a, &b);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].method, Method::Crosses);
        assert_eq!(turns[0].operations[0].seg_id, SegmentId::new(0, 0));
    }
}
