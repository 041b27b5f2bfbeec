//! Divide-and-conquer closest pair, replayed as a lazy event stream.
//!
//! [`solve`] does not compute anything up front beyond the two sorted views.
//! Each call to [`EventStream::next`] runs the algorithm just far enough to
//! produce the next [`Event`]; dropping the stream abandons the run.
//!
//! The recursion is kept on an explicit stack of frames. Per call, the stream
//! emits:
//!
//! 1. `EnterSubproblem`, `Delay`.
//! 2. Base case (at most three points): `DrawPair`, `Delay`, `ExitSubproblem`.
//! 3. Otherwise `DrawDivider`, `Delay`, `ExitSubproblem`, then the whole left
//!    call, then the whole right call.
//! 4. Combine: two `HighlightBlock`s for the halves, `Delay`, `RemovePair` for
//!    the losing child line, `Delay`.
//! 5. Strip: `HighlightBlock` for the strip, `Delay`, and when the scan finds a
//!    closer pair `RemovePair`, `DrawPair`, `Delay`.
//! 6. Cleanup: remove both halves, the divider and the strip, `Delay`.
//!
//! The line of the final pair is the only handle the stream never removes.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use crate::{
    error::{Error, Result},
    event::{Event, RecursionResult},
    geometry::{self, distance},
    point_set::PointSet,
    types::{BlockTag, Bounds, HandleId, Pair, Point},
};

/// Subproblems of at most this many points are solved by brute force.
const BASE_CASE_LEN: usize = 3;

/// Starts a closest-pair run over `points`.
///
/// ### Errors
/// [`Error::InsufficientPoints`] when there are fewer than two points.
pub fn solve(points: &PointSet) -> Result<EventStream> {
    EventStream::new(points.points().to_vec())
}

/// Runs the engine to completion and returns only the answer.
pub fn closest_pair(points: &PointSet) -> Result<RecursionResult> {
    let mut stream = solve(points)?;
    stream.by_ref().for_each(drop);
    stream.into_result().ok_or(Error::InsufficientPoints {
        count: points.len(),
    })
}

/// Lazy, single-use sequence of [`Event`]s for one run.
///
/// Once the iterator returns `None`, [`EventStream::result`] holds the final
/// pair.
#[derive(Debug)]
pub struct EventStream {
    points: Vec<Point>,
    /// Global x-ordering of `points`, as indices.
    by_x: Vec<usize>,
    /// Position of each point inside `by_x`.
    rank_x: Vec<usize>,
    stack: Vec<Frame>,
    pending: VecDeque<Event>,
    next_handle: u64,
    result: Option<RecursionResult>,
}

/// One recursive call: the points `by_x[lo..hi]` plus the same points by y.
#[derive(Debug)]
struct Frame {
    lo: usize,
    hi: usize,
    by_y: Vec<usize>,
    bounds: Bounds,
    stage: Stage,
}

impl Frame {
    fn new(lo: usize, hi: usize, by_y: Vec<usize>, bounds: Bounds) -> Self {
        Self {
            lo,
            hi,
            by_y,
            bounds,
            stage: Stage::Enter,
        }
    }

    fn len(&self) -> usize {
        self.hi - self.lo
    }
}

#[derive(Clone, Copy, Debug)]
struct Split {
    /// Index into the global `by_x` of the first right-hand point.
    at: usize,
    mid_x: f64,
    divider: HandleId,
    left: Bounds,
    right: Bounds,
}

/// What a frame does the next time it is advanced.
#[derive(Debug)]
enum Stage {
    Enter,
    Base {
        subproblem: HandleId,
    },
    Divide {
        subproblem: HandleId,
    },
    /// Left child is running.
    Left {
        split: Split,
    },
    /// Right child is running.
    Right {
        split: Split,
        left: RecursionResult,
    },
    Combine {
        split: Split,
        left: RecursionResult,
        right: RecursionResult,
    },
    Strip {
        split: Split,
        best: RecursionResult,
        halves: [HandleId; 2],
    },
    Scan {
        split: Split,
        best: RecursionResult,
        halves: [HandleId; 2],
        strip: HandleId,
    },
    Cleanup {
        split: Split,
        best: RecursionResult,
        halves: [HandleId; 2],
        strip: HandleId,
    },
}

impl EventStream {
    fn new(points: Vec<Point>) -> Result<Self> {
        let n = points.len();
        if n < 2 {
            return Err(Error::InsufficientPoints { count: n });
        }

        let by_x = geometry::sorted_by_x(&points);
        let by_y = geometry::sorted_by_y(&points);
        let mut rank_x = vec![0; n];
        for (rank, &id) in by_x.iter().enumerate() {
            rank_x[id] = rank;
        }

        let bounds = Bounds::new(points[by_x[0]].x, points[by_x[n - 1]].x);
        let root = Frame::new(0, n, by_y, bounds);

        Ok(Self {
            points,
            by_x,
            rank_x,
            stack: vec![root],
            pending: VecDeque::with_capacity(8),
            next_handle: 0,
            result: None,
        })
    }

    /// Final pair, distance and surviving line; `None` until fully drained.
    pub fn result(&self) -> Option<&RecursionResult> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<RecursionResult> {
        self.result
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some() && self.pending.is_empty()
    }

    /// Number of points this run covers.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    fn alloc(&mut self) -> HandleId {
        let id = HandleId(self.next_handle);
        self.next_handle += 1;
        id
    }

    fn emit(&mut self, event: Event) {
        self.pending.push_back(event);
    }

    /// Builds the frame for `by_x[lo..hi]`, keeping the parent's y-order.
    fn child(&self, parent: &Frame, lo: usize, hi: usize, bounds: Bounds) -> Frame {
        let by_y = parent
            .by_y
            .iter()
            .copied()
            .filter(|&id| (lo..hi).contains(&self.rank_x[id]))
            .collect();
        Frame::new(lo, hi, by_y, bounds)
    }

    /// Runs one stage of `frame`, queueing its events.
    fn advance(&mut self, mut frame: Frame) {
        match std::mem::replace(&mut frame.stage, Stage::Enter) {
            Stage::Enter => {
                let subproblem = self.alloc();
                tracing::trace!(
                    len = frame.len(),
                    left = frame.bounds.left,
                    right = frame.bounds.right,
                    "entering subproblem"
                );
                self.emit(Event::EnterSubproblem {
                    handle: subproblem,
                    bounds: frame.bounds,
                });
                self.emit(Event::Delay);

                frame.stage = if frame.len() <= BASE_CASE_LEN {
                    Stage::Base { subproblem }
                } else {
                    Stage::Divide { subproblem }
                };
                self.stack.push(frame);
            }

            Stage::Base { subproblem } => {
                let slice: Vec<Point> = self.by_x[frame.lo..frame.hi]
                    .iter()
                    .map(|&id| self.points[id])
                    .collect();
                let Some((a, b, distance)) = geometry::brute_force(&slice) else {
                    unreachable!("subproblems always hold at least two points");
                };
                let pair = Pair::new(slice[a], slice[b]);
                let line = self.alloc();

                self.emit(Event::DrawPair { handle: line, pair });
                self.emit(Event::Delay);
                self.emit(Event::ExitSubproblem { handle: subproblem });
                self.finish(RecursionResult {
                    pair,
                    distance,
                    line,
                });
            }

            Stage::Divide { subproblem } => {
                let at = frame.lo + frame.len() / 2;
                let mid_x = self.points[self.by_x[at]].x;
                let divider = self.alloc();

                self.emit(Event::DrawDivider {
                    handle: divider,
                    x: mid_x,
                });
                self.emit(Event::Delay);
                self.emit(Event::ExitSubproblem { handle: subproblem });

                let split = Split {
                    at,
                    mid_x,
                    divider,
                    left: Bounds::new(frame.bounds.left, mid_x),
                    right: Bounds::new(mid_x, frame.bounds.right),
                };
                let left = self.child(&frame, frame.lo, at, split.left);
                frame.stage = Stage::Left { split };
                self.stack.push(frame);
                self.stack.push(left);
            }

            stage @ (Stage::Left { .. } | Stage::Right { .. }) => {
                unreachable!("frame advanced while a child was running: {stage:?}");
            }

            Stage::Combine { split, left, right } => {
                let halves = [self.alloc(), self.alloc()];
                self.emit(Event::HighlightBlock {
                    handle: halves[0],
                    bounds: split.left,
                    tag: BlockTag::Half,
                });
                self.emit(Event::HighlightBlock {
                    handle: halves[1],
                    bounds: split.right,
                    tag: BlockTag::Half,
                });
                self.emit(Event::Delay);

                // Ties keep the left result.
                let (best, loser) = if right.distance < left.distance {
                    (right, left)
                } else {
                    (left, right)
                };
                self.emit(Event::RemovePair {
                    handle: loser.line,
                });
                self.emit(Event::Delay);

                frame.stage = Stage::Strip {
                    split,
                    best,
                    halves,
                };
                self.stack.push(frame);
            }

            Stage::Strip {
                split,
                best,
                halves,
            } => {
                let strip = self.alloc();
                self.emit(Event::HighlightBlock {
                    handle: strip,
                    bounds: Bounds::new(split.mid_x - best.distance, split.mid_x + best.distance),
                    tag: BlockTag::Strip,
                });
                self.emit(Event::Delay);

                frame.stage = Stage::Scan {
                    split,
                    best,
                    halves,
                    strip,
                };
                self.stack.push(frame);
            }

            Stage::Scan {
                split,
                mut best,
                halves,
                strip,
            } => {
                let candidates: Vec<Point> = frame
                    .by_y
                    .iter()
                    .map(|&id| self.points[id])
                    .filter(|p| (p.x - split.mid_x).abs() < best.distance)
                    .collect();

                if let Some((pair, distance)) = closest_in_strip(&candidates, best.distance) {
                    tracing::debug!(
                        old = best.distance,
                        new = distance,
                        mid_x = split.mid_x,
                        "strip scan found a closer pair"
                    );
                    let line = self.alloc();
                    self.emit(Event::RemovePair { handle: best.line });
                    self.emit(Event::DrawPair { handle: line, pair });
                    self.emit(Event::Delay);
                    best = RecursionResult {
                        pair,
                        distance,
                        line,
                    };
                }

                frame.stage = Stage::Cleanup {
                    split,
                    best,
                    halves,
                    strip,
                };
                self.stack.push(frame);
            }

            Stage::Cleanup {
                split,
                best,
                halves,
                strip,
            } => {
                self.emit(Event::RemoveBlock { handle: halves[0] });
                self.emit(Event::RemoveBlock { handle: halves[1] });
                self.emit(Event::RemoveDivider {
                    handle: split.divider,
                });
                self.emit(Event::RemoveBlock { handle: strip });
                self.emit(Event::Delay);
                self.finish(best);
            }
        }
    }

    /// Hands a finished call's result to its parent, or records the answer.
    fn finish(&mut self, result: RecursionResult) {
        let Some(mut parent) = self.stack.pop() else {
            tracing::debug!(distance = result.distance, "closest pair run finished");
            self.result = Some(result);
            return;
        };

        match std::mem::replace(&mut parent.stage, Stage::Enter) {
            Stage::Left { split } => {
                let right = self.child(&parent, split.at, parent.hi, split.right);
                parent.stage = Stage::Right {
                    split,
                    left: result,
                };
                self.stack.push(parent);
                self.stack.push(right);
            }
            Stage::Right { split, left } => {
                parent.stage = Stage::Combine {
                    split,
                    left,
                    right: result,
                };
                self.stack.push(parent);
            }
            stage => unreachable!("child finished under a parent in {stage:?}"),
        }
    }
}

impl Iterator for EventStream {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            let frame = self.stack.pop()?;
            self.advance(frame);
        }
    }
}

impl FusedIterator for EventStream {}

/// Scans a y-sorted strip for a pair strictly closer than `min_dist`.
///
/// For each point only the following points less than the running minimum
/// away in y are compared; the window is not capped at a fixed count.
fn closest_in_strip(strip: &[Point], mut min_dist: f64) -> Option<(Pair, f64)> {
    let mut found = None;
    for i in 0..strip.len() {
        for j in (i + 1)..strip.len() {
            if !(strip[j].y - strip[i].y < min_dist) {
                break;
            }
            let d = distance(strip[i], strip[j]);
            if d < min_dist {
                min_dist = d;
                found = Some((Pair::new(strip[i], strip[j]), d));
            }
        }
    }
    found
}
