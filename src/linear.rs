use std::slice;

use geo::{Coordinate, GeoFloat, Line, LineString, MultiLineString};
use itertools::Itertools;

/// A geometry made of one or more curves.
///
/// Lets single and multi curves flow through the same relate code. A
/// [`LineString`] is a single component, a [`MultiLineString`] exposes
/// each of its line-strings as a component in order.
pub trait Linear {
    type Scalar: GeoFloat;

    fn components(&self) -> &[LineString<Self::Scalar>];
}

impl<T: GeoFloat> Linear for LineString<T> {
    type Scalar = T;

    fn components(&self) -> &[LineString<T>] {
        slice::from_ref(self)
    }
}

impl<T: GeoFloat> Linear for MultiLineString<T> {
    type Scalar = T;

    fn components(&self) -> &[LineString<T>] {
        &self.0
    }
}

/// Shape of a single curve as far as its topology is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    /// No points at all.
    Empty,
    /// One distinct location, possibly repeated.
    SinglePoint,
    /// First and last points coincide and some point differs from them.
    Closed,
    /// First and last points differ.
    Open,
}

/// Classify a sequence of points as a curve.
pub fn classify<T: GeoFloat>(coords: &[Coordinate<T>]) -> CurveKind {
    match coords {
        [] => CurveKind::Empty,
        [_] => CurveKind::SinglePoint,
        [first, .., last] if first != last => CurveKind::Open,
        [first, inner @ .., _] => {
            if inner.iter().any(|c| c != first) {
                CurveKind::Closed
            } else {
                CurveKind::SinglePoint
            }
        }
    }
}

/// A curve component with consecutive repeated points collapsed.
///
/// Segment indices used by turns refer to the segments of the chain,
/// i.e. between consecutive *distinct* points of the input.
#[derive(Debug, Clone)]
pub struct Chain<T: GeoFloat> {
    coords: Vec<Coordinate<T>>,
    kind: CurveKind,
}

impl<T: GeoFloat> Chain<T> {
    pub fn new(ls: &LineString<T>) -> Self {
        let coords: Vec<_> = ls.0.iter().copied().dedup().collect();
        let kind = classify(&coords);
        Chain { coords, kind }
    }

    #[inline]
    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    #[inline]
    pub fn coords(&self) -> &[Coordinate<T>] {
        &self.coords
    }

    /// Chains without a segment take no part in turns or boundaries.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.coords.len() < 2
    }

    #[inline]
    pub fn num_segments(&self) -> usize {
        self.coords.len().saturating_sub(1)
    }

    #[inline]
    pub fn segment(&self, idx: usize) -> Line<T> {
        Line::new(self.coords[idx], self.coords[idx + 1])
    }

    pub fn lines(&self) -> impl Iterator<Item = Line<T>> + '_ {
        self.coords
            .iter()
            .tuple_windows()
            .map(|(start, end)| Line::new(*start, *end))
    }

    #[inline]
    pub fn front(&self) -> Option<Coordinate<T>> {
        self.coords.first().copied()
    }

    #[inline]
    pub fn back(&self) -> Option<Coordinate<T>> {
        self.coords.last().copied()
    }
}

/// The prepared components of a [`Linear`] geometry.
#[derive(Debug, Clone)]
pub struct Chains<T: GeoFloat> {
    chains: Vec<Chain<T>>,
}

impl<T: GeoFloat> Chains<T> {
    pub fn new<G: Linear<Scalar = T> + ?Sized>(geom: &G) -> Self {
        Chains {
            chains: geom.components().iter().map(Chain::new).collect(),
        }
    }

    #[inline]
    pub fn get(&self, component: usize) -> Option<&Chain<T>> {
        self.chains.get(component)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Chain<T>> {
        self.chains.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(pts: &[(f64, f64)]) -> Vec<Coordinate<f64>> {
        pts.iter().map(|&(x, y)| Coordinate { x, y }).collect()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify::<f64>(&[]), CurveKind::Empty);
        assert_eq!(classify(&coords(&[(1., 1.)])), CurveKind::SinglePoint);
        assert_eq!(
            classify(&coords(&[(1., 1.), (1., 1.), (1., 1.)])),
            CurveKind::SinglePoint
        );
        assert_eq!(classify(&coords(&[(0., 0.), (1., 0.)])), CurveKind::Open);
        assert_eq!(
            classify(&coords(&[(0., 0.), (1., 0.), (1., 1.), (0., 0.)])),
            CurveKind::Closed
        );
        assert_eq!(
            classify(&coords(&[(0., 0.), (1., 0.), (0., 0.)])),
            CurveKind::Closed
        );
    }

    #[test]
    fn test_chain_collapses_repeats() {
        let ls = LineString::from(vec![(0., 0.), (0., 0.), (1., 0.), (1., 0.), (1., 1.)]);
        let chain = Chain::new(&ls);
        assert_eq!(chain.kind(), CurveKind::Open);
        assert_eq!(chain.num_segments(), 2);
        assert_eq!(chain.segment(1), Line::new((1., 0.), (1., 1.)));
        assert_eq!(chain.lines().count(), 2);

        let ls = LineString::from(vec![(2., 2.), (2., 2.)]);
        let chain = Chain::new(&ls);
        assert!(chain.is_degenerate());
        assert_eq!(chain.kind(), CurveKind::SinglePoint);
        assert_eq!(chain.front(), Some(Coordinate { x: 2., y: 2. }));
    }

    #[test]
    fn test_components() {
        let mls = MultiLineString(vec![
            LineString::from(vec![(0., 0.), (1., 0.)]),
            LineString(vec![]),
        ]);
        let chains = Chains::new(&mls);
        assert_eq!(chains.len(), 2);
        assert_eq!(chains.get(1).map(|c| c.kind()), Some(CurveKind::Empty));
        assert!(chains.get(2).is_none());

        let ls = LineString::from(vec![(0., 0.), (1., 0.)]);
        assert_eq!(ls.components().len(), 1);
    }
}
