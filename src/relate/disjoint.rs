use geo::{coordinate_position::CoordPos, dimensions::Dimensions, GeoFloat};
use log::debug;

use crate::{
    boundary::{BoundaryChecker, BoundaryQuery},
    linear::{Chain, CurveKind},
    matrix::MatrixHandler,
    turns::Turn,
};

/// Record the facts contributed by the components of geometry `side`
/// that meet the other geometry in no turn.
///
/// `this` is the boundary of geometry `side`, `other` that of the
/// other geometry.
pub(crate) fn scan_disjoint<T: GeoFloat>(
    handler: &mut MatrixHandler,
    turns: &[Turn<T>],
    side: usize,
    this: &BoundaryChecker<T>,
    other: &BoundaryChecker<T>,
) {
    let chains = this.chains();
    let mut detected = vec![false; chains.len()];
    for turn in turns {
        if let Some(flag) = detected.get_mut(turn.operations[side].seg_id.component) {
            *flag = true;
        }
    }

    let mut scan = DisjointScan::new(side != 0);
    for (component, chain) in chains.iter().enumerate() {
        if detected[component] {
            continue;
        }
        if !scan.apply(handler, chain, this, other) {
            debug!("disjoint scan of side {side} stopped at component {component}");
            break;
        }
    }
}

const POINT_INSIDE: u8 = 1;
const POINT_BOUNDARY: u8 = 2;
const POINT_OUTSIDE: u8 = 4;
const POINT_ALL: u8 = POINT_INSIDE | POINT_BOUNDARY | POINT_OUTSIDE;

struct DisjointScan {
    transposed: bool,
    /// Which locations of lone points were recorded.
    point_mask: u8,
    detected_open_boundary: bool,
}

impl DisjointScan {
    fn new(transposed: bool) -> Self {
        DisjointScan {
            transposed,
            point_mask: 0,
            detected_open_boundary: false,
        }
    }

    /// Returns `false` once nothing more can be learned.
    fn apply<T: GeoFloat>(
        &mut self,
        handler: &mut MatrixHandler,
        chain: &Chain<T>,
        this: &BoundaryChecker<T>,
        other: &BoundaryChecker<T>,
    ) -> bool {
        match chain.kind() {
            CurveKind::Empty => {}
            CurveKind::SinglePoint => {
                if let Some(pt) = chain.front().filter(|_| self.point_mask != POINT_ALL) {
                    let (col, bit) = match other.position(pt) {
                        CoordPos::Inside => (CoordPos::Inside, POINT_INSIDE),
                        CoordPos::OnBoundary => (CoordPos::OnBoundary, POINT_BOUNDARY),
                        CoordPos::Outside => (CoordPos::Outside, POINT_OUTSIDE),
                    };
                    if self.point_mask & bit == 0 {
                        handler.update(
                            CoordPos::Inside,
                            col,
                            Dimensions::ZeroDimensional,
                            self.transposed,
                        );
                        self.point_mask |= bit;
                    }
                }
            }
            CurveKind::Open | CurveKind::Closed => {
                if !self.detected_open_boundary {
                    handler.update(
                        CoordPos::Inside,
                        CoordPos::Outside,
                        Dimensions::OneDimensional,
                        self.transposed,
                    );
                    let front = chain
                        .front()
                        .map_or(false, |pt| this.is_endpoint_boundary(pt, BoundaryQuery::Front));
                    let back = chain
                        .back()
                        .map_or(false, |pt| this.is_endpoint_boundary(pt, BoundaryQuery::Back));
                    if front || back {
                        handler.update(
                            CoordPos::OnBoundary,
                            CoordPos::Outside,
                            Dimensions::ZeroDimensional,
                            self.transposed,
                        );
                        self.detected_open_boundary = true;
                    }
                }
            }
        }
        let all_detected = self.point_mask == POINT_ALL && self.detected_open_boundary;
        !all_detected && !handler.interrupted()
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use geo::{LineString, MultiLineString};
    use wkt::TryFromWkt;

    use super::*;
    use crate::{linear::Chains, matrix::Interrupt};

    #[test]
    fn test_scan_components() -> Result<(), Box<dyn Error>> {
        let a = MultiLineString::<f64>::try_from_wkt_str(
            "MULTILINESTRING((1 0,1 0),(0 5,0 5),(5 5,6 6),(7 7,8 8,7 8,7 7))",
        )?;
        let b = LineString::<f64>::try_from_wkt_str("LINESTRING(0 0,2 0)")?;
        let (ca, cb) = (Chains::new(&a), Chains::new(&b));
        let (ba, bb) = (BoundaryChecker::new(&ca), BoundaryChecker::new(&cb));

        let mut handler = MatrixHandler::new(Interrupt::Full);
        scan_disjoint::<f64>(&mut handler, &[], 0, &ba, &bb);
        assert_eq!(handler.into_matrix().to_string(), "0F1FF0FFF");

        let mut handler = MatrixHandler::new(Interrupt::Full);
        scan_disjoint::<f64>(&mut handler, &[], 1, &bb, &ba);
        assert_eq!(handler.into_matrix().to_string(), "FFFFFF10F");
        Ok(())
    }

    #[test]
    fn test_closed_has_no_boundary() -> Result<(), Box<dyn Error>> {
        let a = LineString::<f64>::try_from_wkt_str("LINESTRING(0 0,1 0,1 1,0 0)")?;
        let b = LineString::<f64>::try_from_wkt_str("LINESTRING(5 5,6 6)")?;
        let (ca, cb) = (Chains::new(&a), Chains::new(&b));
        let (ba, bb) = (BoundaryChecker::new(&ca), BoundaryChecker::new(&cb));

        let mut handler = MatrixHandler::new(Interrupt::Full);
        scan_disjoint::<f64>(&mut handler, &[], 0, &ba, &bb);
        assert_eq!(handler.into_matrix().to_string(), "FF1FFFFFF");
        Ok(())
    }
}
