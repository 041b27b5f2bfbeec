//! Applies an event stream to a renderer, one paced step at a time.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::{
    error::{Error, Result},
    event::Event,
    types::{BlockTag, Bounds, HandleId, LineKind, Point},
};

/// Drawing capabilities the player needs from a rendering surface.
///
/// Each draw call returns the surface's own handle for the new element, and
/// [`Renderer::remove`] takes it back. The `kind` and `tag` arguments only
/// select a style.
pub trait Renderer {
    type Handle;

    fn draw_point(&mut self, p: Point) -> Self::Handle;
    fn draw_line(&mut self, a: Point, b: Point, kind: LineKind) -> Self::Handle;
    fn draw_rect(&mut self, bounds: Bounds, tag: BlockTag) -> Self::Handle;
    fn remove(&mut self, handle: Self::Handle);
}

/// Shared flag asking a blocking playback to stop before its next event.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Every event was applied.
    Completed,
    /// The token was cancelled; the rest of the stream was not touched.
    Cancelled,
}

/// Where a call to [`EventPlayer::step`] stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Stopped right after a `Delay` event; more events may follow.
    Paced,
    /// The stream is exhausted.
    Finished,
}

/// Replays events onto a [`Renderer`], tracking which logical handle maps to
/// which renderer handle.
#[derive(Debug)]
pub struct EventPlayer<H> {
    live: HashMap<HandleId, H>,
    delay: Duration,
    /// Vertical span of divider lines.
    y_extent: (f64, f64),
}

impl<H> EventPlayer<H> {
    pub fn new(delay: Duration) -> Self {
        Self {
            live: HashMap::new(),
            delay,
            y_extent: (0.0, 0.0),
        }
    }

    pub fn with_y_extent(mut self, lo: f64, hi: f64) -> Self {
        self.set_y_extent(lo, hi);
        self
    }

    pub fn set_y_extent(&mut self, lo: f64, hi: f64) {
        self.y_extent = (lo, hi);
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Number of elements drawn by events and not yet removed.
    pub fn outstanding(&self) -> usize {
        self.live.len()
    }

    /// Applies a single event. `Delay` is a no-op here; pacing is up to
    /// [`EventPlayer::step`] and [`EventPlayer::play`].
    ///
    /// ### Errors
    /// [`Error::DanglingHandle`] when removing a handle that is not live, and
    /// [`Error::DuplicateHandle`] when creating one that already is. Both mean
    /// the stream is broken; the renderer is not called in either case.
    pub fn apply<R>(&mut self, event: &Event, renderer: &mut R) -> Result<()>
    where
        R: Renderer<Handle = H>,
    {
        match *event {
            Event::EnterSubproblem { handle, bounds } => {
                self.create(handle, || renderer.draw_rect(bounds, BlockTag::Subproblem))
            }
            Event::DrawDivider { handle, x } => {
                let (lo, hi) = self.y_extent;
                self.create(handle, || {
                    renderer.draw_line(Point::new(x, lo), Point::new(x, hi), LineKind::Divider)
                })
            }
            Event::DrawPair { handle, pair } => {
                self.create(handle, || renderer.draw_line(pair.a, pair.b, LineKind::Pair))
            }
            Event::HighlightBlock { handle, bounds, tag } => {
                self.create(handle, || renderer.draw_rect(bounds, tag))
            }
            Event::ExitSubproblem { handle }
            | Event::RemoveDivider { handle }
            | Event::RemovePair { handle }
            | Event::RemoveBlock { handle } => self.release(handle, renderer),
            Event::Delay => Ok(()),
        }
    }

    /// Applies events up to and including the next `Delay`, without waiting.
    ///
    /// Meant for hosts that pace playback themselves, such as a UI redrawing
    /// every frame.
    pub fn step<I, R>(&mut self, events: &mut I, renderer: &mut R) -> Result<Step>
    where
        I: Iterator<Item = Event>,
        R: Renderer<Handle = H>,
    {
        for event in events {
            self.apply(&event, renderer)?;
            if event.is_delay() {
                return Ok(Step::Paced);
            }
        }
        Ok(Step::Finished)
    }

    /// Applies every event in order, sleeping for the configured delay at each
    /// `Delay`.
    ///
    /// `cancel` is checked before each event; once it is set, no further
    /// events are pulled and the renderer is not called again.
    pub fn play<I, R>(
        &mut self,
        events: I,
        renderer: &mut R,
        cancel: &CancelToken,
    ) -> Result<PlaybackOutcome>
    where
        I: IntoIterator<Item = Event>,
        R: Renderer<Handle = H>,
    {
        for event in events {
            if cancel.is_cancelled() {
                tracing::info!("playback cancelled");
                return Ok(PlaybackOutcome::Cancelled);
            }
            self.apply(&event, renderer)?;
            if event.is_delay() && !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
        }
        Ok(PlaybackOutcome::Completed)
    }

    /// Removes everything still drawn, oldest handle first.
    pub fn clear<R>(&mut self, renderer: &mut R)
    where
        R: Renderer<Handle = H>,
    {
        let mut live: Vec<(HandleId, H)> = self.live.drain().collect();
        live.sort_by_key(|(id, _)| *id);
        for (_, handle) in live {
            renderer.remove(handle);
        }
    }

    fn create(&mut self, handle: HandleId, draw: impl FnOnce() -> H) -> Result<()> {
        if self.live.contains_key(&handle) {
            tracing::error!(%handle, "event re-creates a live handle");
            return Err(Error::DuplicateHandle { handle });
        }
        self.live.insert(handle, draw());
        Ok(())
    }

    fn release<R>(&mut self, handle: HandleId, renderer: &mut R) -> Result<()>
    where
        R: Renderer<Handle = H>,
    {
        let Some(drawn) = self.live.remove(&handle) else {
            tracing::error!(%handle, "event removes an unknown handle");
            return Err(Error::DanglingHandle { handle });
        };
        renderer.remove(drawn);
        Ok(())
    }
}
