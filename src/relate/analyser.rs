use geo::{coordinate_position::CoordPos, dimensions::Dimensions, Coordinate, GeoFloat};
use log::trace;
use smallvec::SmallVec;

use crate::{
    boundary::{BoundaryChecker, BoundaryQuery},
    matrix::MatrixHandler,
    turns::{Method, OpType, SegmentId, Turn, TurnOperation},
};

/// Tracks whether consecutive turns stay on the same curve.
#[derive(Debug, Default)]
pub(crate) struct SegmentWatcher {
    last: Option<SegmentId>,
}

impl SegmentWatcher {
    /// Returns `true` if `seg_id` starts a new curve.
    pub fn update(&mut self, seg_id: SegmentId) -> bool {
        let first = self.last.map_or(true, |last| !last.same_range(&seg_id));
        self.last = Some(seg_id);
        first
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry<T: GeoFloat> {
    point: Coordinate<T>,
    other_id: SegmentId,
}

/// The last exit from the other geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Exit<T: GeoFloat> {
    pub point: Coordinate<T>,
    pub operation: OpType,
}

/// Tracks the stretches along which the scanned curve runs on the
/// other geometry.
#[derive(Debug)]
pub(crate) struct ExitWatcher<T: GeoFloat> {
    entries: SmallVec<[Entry<T>; 4]>,
    exit: Option<Exit<T>>,
}

impl<T: GeoFloat> Default for ExitWatcher<T> {
    fn default() -> Self {
        ExitWatcher {
            entries: SmallVec::new(),
            exit: None,
        }
    }
}

impl<T: GeoFloat> ExitWatcher<T> {
    /// Start running along the curve `other_id` belongs to. Returns
    /// `true` if the scan was outside the other geometry until now.
    pub fn enter(&mut self, point: Coordinate<T>, other_id: SegmentId) -> bool {
        let was_outside = self.entries.is_empty();
        self.entries.push(Entry { point, other_id });
        was_outside
    }

    /// Stop running along the curve `other_id` belongs to. Returns
    /// `true` if the scan was outside the other geometry.
    ///
    /// An exit from a curve with no pending entry, while entries on
    /// other curves remain, changes nothing.
    pub fn exit(
        &mut self,
        point: Coordinate<T>,
        other_id: SegmentId,
        operation: OpType,
    ) -> bool {
        if self.entries.is_empty() {
            return true;
        }
        if let Some(idx) = self
            .entries
            .iter()
            .position(|e| e.other_id.same_range(&other_id))
        {
            let entry = self.entries.remove(idx);
            trace!(
                "exit at {point:?} closes entry at {entry:?}",
                entry = entry.point
            );
            self.exit = Some(Exit { point, operation });
        }
        false
    }

    #[inline]
    pub fn pending_exit(&self) -> Option<Exit<T>> {
        self.exit
    }

    #[inline]
    pub fn reset_detected_exit(&mut self) {
        self.exit = None;
    }
}

/// Scan of the turns sorted along one geometry.
///
/// Walks the turns in order, tracking whether the scanned curve runs
/// on the other geometry, and records the facts each turn reveals.
/// `side` is the geometry walked; facts are written transposed when it
/// is the second one.
pub(crate) struct Analyser<'a, 'b, T: GeoFloat> {
    side: usize,
    this: &'a BoundaryChecker<'b, T>,
    other: &'a BoundaryChecker<'b, T>,
    segment_watcher: SegmentWatcher,
    exit_watcher: ExitWatcher<T>,
    last_union: bool,
    /// Index of the last turn acted on.
    last_index: Option<usize>,
}

impl<'a, 'b, T: GeoFloat> Analyser<'a, 'b, T> {
    pub fn new(
        side: usize,
        this: &'a BoundaryChecker<'b, T>,
        other: &'a BoundaryChecker<'b, T>,
    ) -> Self {
        debug_assert!(side < 2);
        Analyser {
            side,
            this,
            other,
            segment_watcher: SegmentWatcher::default(),
            exit_watcher: ExitWatcher::default(),
            last_union: false,
            last_index: None,
        }
    }

    /// Process `turns`, which must be sorted for `side`.
    pub fn analyse(mut self, handler: &mut MatrixHandler, turns: &[Turn<T>]) {
        for idx in 0..turns.len() {
            self.apply(handler, turns, idx);
            if handler.interrupted() {
                return;
            }
        }
        self.finish(handler, turns);
    }

    #[inline]
    fn update(&self, handler: &mut MatrixHandler, a: CoordPos, b: CoordPos, dim: Dimensions) {
        handler.update(a, b, dim, self.side != 0);
    }

    fn apply(&mut self, handler: &mut MatrixHandler, turns: &[Turn<T>], idx: usize) {
        let turn = &turns[idx];
        let this_op = turn.operations[self.side];
        let other_op = turn.operations[1 - self.side];
        let op = this_op.operation;
        if op == OpType::None {
            return;
        }
        let pt = turn.point;
        let seg_id = this_op.seg_id;
        let first_in_range = self.segment_watcher.update(seg_id);
        trace!(
            "turn {idx} at {pt:?}: {op:?} on {seg_id:?}, first in range: {first_in_range}"
        );

        // a union exit is confirmed once the scan moves on to another point
        let mut fake_enter_detected = false;
        if let Some(exit) = self.exit_watcher.pending_exit() {
            match exit.operation {
                OpType::Union if exit.point != pt => {
                    self.exit_watcher.reset_detected_exit();
                    self.update(
                        handler,
                        CoordPos::Inside,
                        CoordPos::Outside,
                        Dimensions::OneDimensional,
                    );
                }
                OpType::Union if op == OpType::Intersection => {
                    self.exit_watcher.reset_detected_exit();
                    fake_enter_detected = true;
                }
                // a curve ended on the other geometry at an interior point
                // and the next one carries on from there
                OpType::Blocked
                    if exit.point == pt
                        && op == OpType::Intersection
                        && first_in_range
                        && !self.this.is_endpoint_boundary(pt, BoundaryQuery::Back) =>
                {
                    self.exit_watcher.reset_detected_exit();
                    fake_enter_detected = true;
                }
                _ => {}
            }
        }

        // the previous curve ended outside the other geometry
        if first_in_range && !fake_enter_detected && self.last_union {
            debug_assert!(self.last_index.is_some(), "union without a previous turn");
            if let Some(prev) = self.last_index {
                self.check_back(handler, turns[prev].operations[self.side].seg_id);
            }
        }

        self.last_union = op == OpType::Union;
        self.last_index = Some(idx);

        match op {
            OpType::Intersection => {
                let was_outside = self.exit_watcher.enter(pt, other_op.seg_id);
                self.update(
                    handler,
                    CoordPos::Inside,
                    CoordPos::Inside,
                    Dimensions::OneDimensional,
                );
                if self.this.is_boundary(pt, seg_id, BoundaryQuery::Front) {
                    self.update_boundary(handler, pt, &other_op);
                } else if was_outside && !fake_enter_detected {
                    self.update(
                        handler,
                        CoordPos::Inside,
                        CoordPos::Outside,
                        Dimensions::OneDimensional,
                    );
                    if first_in_range {
                        self.check_front(handler, seg_id);
                    }
                }
            }
            OpType::Union | OpType::Blocked => {
                let blocked = op == OpType::Blocked;
                let was_outside = self.exit_watcher.exit(pt, other_op.seg_id, op);
                if !was_outside {
                    if blocked && self.this.is_endpoint_boundary(pt, BoundaryQuery::Back) {
                        self.update_boundary(handler, pt, &other_op);
                    }
                    return;
                }

                self.update(
                    handler,
                    CoordPos::Inside,
                    CoordPos::Outside,
                    Dimensions::OneDimensional,
                );
                if turn.method == Method::Crosses {
                    self.update(
                        handler,
                        CoordPos::Inside,
                        CoordPos::Inside,
                        Dimensions::ZeroDimensional,
                    );
                    if first_in_range {
                        self.check_front(handler, seg_id);
                    }
                    return;
                }

                let this_boundary = if blocked {
                    self.this.is_endpoint_boundary(pt, BoundaryQuery::Back)
                } else {
                    self.this.is_boundary(pt, seg_id, BoundaryQuery::Front)
                };
                if this_boundary {
                    self.update_boundary(handler, pt, &other_op);
                    if first_in_range && blocked {
                        self.check_front(handler, seg_id);
                    }
                } else {
                    // the interior touches the other geometry here
                    let col = if self.other_is_boundary(pt, &other_op) {
                        CoordPos::OnBoundary
                    } else {
                        CoordPos::Inside
                    };
                    self.update(handler, CoordPos::Inside, col, Dimensions::ZeroDimensional);
                    if first_in_range {
                        self.check_front(handler, seg_id);
                    }
                }
            }
            OpType::None => {}
        }
    }

    fn finish(&mut self, handler: &mut MatrixHandler, turns: &[Turn<T>]) {
        let pending_union = self
            .exit_watcher
            .pending_exit()
            .map_or(false, |exit| exit.operation == OpType::Union);
        if pending_union || self.last_union {
            self.update(
                handler,
                CoordPos::Inside,
                CoordPos::Outside,
                Dimensions::OneDimensional,
            );
            debug_assert!(self.last_index.is_some(), "union without a previous turn");
            if let Some(prev) = self.last_index {
                self.check_back(handler, turns[prev].operations[self.side].seg_id);
            }
        }
    }

    fn other_is_boundary(&self, pt: Coordinate<T>, other_op: &TurnOperation<T>) -> bool {
        if other_op.operation == OpType::Blocked {
            self.other.is_endpoint_boundary(pt, BoundaryQuery::Back)
        } else {
            self.other.is_boundary(pt, other_op.seg_id, BoundaryQuery::Any)
        }
    }

    /// A boundary point of the scanned geometry lies on the other one.
    fn update_boundary(
        &self,
        handler: &mut MatrixHandler,
        pt: Coordinate<T>,
        other_op: &TurnOperation<T>,
    ) {
        let col = if self.other_is_boundary(pt, other_op) {
            CoordPos::OnBoundary
        } else {
            CoordPos::Inside
        };
        self.update(handler, CoordPos::OnBoundary, col, Dimensions::ZeroDimensional);
    }

    /// The curve of `seg_id` starts outside the other geometry.
    fn check_front(&self, handler: &mut MatrixHandler, seg_id: SegmentId) {
        if let Some(front) = self.this.front(seg_id.component) {
            if self.this.is_endpoint_boundary(front, BoundaryQuery::Front) {
                self.update(
                    handler,
                    CoordPos::OnBoundary,
                    CoordPos::Outside,
                    Dimensions::ZeroDimensional,
                );
            }
        }
    }

    /// The curve of `seg_id` ends outside the other geometry.
    fn check_back(&self, handler: &mut MatrixHandler, seg_id: SegmentId) {
        if let Some(back) = self.this.back(seg_id.component) {
            if self.this.is_endpoint_boundary(back, BoundaryQuery::Back) {
                self.update(
                    handler,
                    CoordPos::OnBoundary,
                    CoordPos::Outside,
                    Dimensions::ZeroDimensional,
                );
            }
        }
    }
}
