//! Visualization events emitted by the closest-pair engine.

use crate::types::{BlockTag, Bounds, HandleId, Pair};

/// One drawing instruction of a closest-pair run.
///
/// Creating variants carry the [`HandleId`] they bring to life; removing
/// variants name a handle created earlier in the same stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// Highlights the x-range of the call that just started.
    EnterSubproblem { handle: HandleId, bounds: Bounds },
    /// Drops the highlight created by [`Event::EnterSubproblem`].
    ExitSubproblem { handle: HandleId },
    /// Draws the vertical line splitting a subproblem at `x`.
    DrawDivider { handle: HandleId, x: f64 },
    RemoveDivider { handle: HandleId },
    /// Draws the segment joining a candidate closest pair.
    DrawPair { handle: HandleId, pair: Pair },
    RemovePair { handle: HandleId },
    HighlightBlock {
        handle: HandleId,
        bounds: Bounds,
        tag: BlockTag,
    },
    RemoveBlock { handle: HandleId },
    /// Pacing marker; players wait here and nowhere else.
    Delay,
}

impl Event {
    /// Handle brought to life by this event, if any.
    pub fn created(&self) -> Option<HandleId> {
        match *self {
            Event::EnterSubproblem { handle, .. }
            | Event::DrawDivider { handle, .. }
            | Event::DrawPair { handle, .. }
            | Event::HighlightBlock { handle, .. } => Some(handle),
            _ => None,
        }
    }

    /// Handle released by this event, if any.
    pub fn removed(&self) -> Option<HandleId> {
        match *self {
            Event::ExitSubproblem { handle }
            | Event::RemoveDivider { handle }
            | Event::RemovePair { handle }
            | Event::RemoveBlock { handle } => Some(handle),
            _ => None,
        }
    }

    pub fn is_delay(&self) -> bool {
        matches!(self, Event::Delay)
    }
}

/// What a finished call hands back to its parent.
///
/// `line` is the handle of the segment currently drawn for `pair`; the parent
/// decides whether it survives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecursionResult {
    pub pair: Pair,
    pub distance: f64,
    pub line: HandleId,
}
