//! Run context tying a point set, its static rendering and one playback
//! together.
//!
//! The three UI triggers map onto [`Session::load`] (upload),
//! [`Session::clear`] and [`Session::start`] / [`Session::run`] (run).
//! Frame-driven hosts call [`Session::tick`] instead of blocking in
//! [`Session::run`].

use crate::{
    config::PlaybackConfig,
    engine::{self, EventStream},
    error::Result,
    event::RecursionResult,
    player::{CancelToken, EventPlayer, PlaybackOutcome, Renderer, Step},
    point_set::PointSet,
};

#[derive(Debug)]
pub struct Session<H> {
    cfg: PlaybackConfig,
    points: PointSet,
    point_handles: Vec<H>,
    player: EventPlayer<H>,
    stream: Option<EventStream>,
    result: Option<RecursionResult>,
}

impl<H> Session<H> {
    pub fn new(cfg: PlaybackConfig) -> Self {
        Self {
            cfg,
            points: PointSet::default(),
            point_handles: Vec::new(),
            player: EventPlayer::new(cfg.delay()),
            stream: None,
            result: None,
        }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.cfg
    }

    pub fn set_config(&mut self, cfg: PlaybackConfig) {
        self.cfg = cfg;
        self.player.set_delay(cfg.delay());
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    /// Answer of the last run that played to the end.
    pub fn result(&self) -> Option<&RecursionResult> {
        self.result.as_ref()
    }

    /// Whether a run has been started and not yet drained or abandoned.
    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    /// Visual elements this session still owns on the renderer.
    pub fn outstanding_handles(&self) -> usize {
        self.point_handles.len() + self.player.outstanding()
    }

    /// Parses `text` with the configured malformed-line policy and loads it.
    ///
    /// On a parse error the current state is left untouched.
    pub fn load_text<R>(&mut self, text: &str, renderer: &mut R) -> Result<usize>
    where
        R: Renderer<Handle = H>,
    {
        let points = PointSet::parse(text, self.cfg.malformed_lines)?;
        Ok(self.load(points, renderer))
    }

    /// Replaces the current points, drawing each one.
    ///
    /// Everything drawn for the previous point set is removed first.
    pub fn load<R>(&mut self, points: PointSet, renderer: &mut R) -> usize
    where
        R: Renderer<Handle = H>,
    {
        self.clear(renderer);
        self.point_handles = points
            .points()
            .iter()
            .map(|&p| renderer.draw_point(p))
            .collect();
        self.points = points;
        tracing::info!(count = self.points.len(), "loaded points");
        self.points.len()
    }

    /// Drops the points, any run in progress, and everything they drew.
    pub fn clear<R>(&mut self, renderer: &mut R)
    where
        R: Renderer<Handle = H>,
    {
        self.abort(renderer);
        for handle in self.point_handles.drain(..) {
            renderer.remove(handle);
        }
        self.points = PointSet::default();
        self.result = None;
    }

    /// Abandons the run in progress, if any, and erases what runs drew.
    pub fn abort<R>(&mut self, renderer: &mut R)
    where
        R: Renderer<Handle = H>,
    {
        if self.stream.take().is_some() {
            tracing::info!("abandoning closest pair run");
        }
        self.player.clear(renderer);
    }

    /// Starts a new run over the current points.
    ///
    /// The previous run's surviving line and any half-played run are
    /// removed first.
    ///
    /// ### Errors
    /// [`crate::error::Error::InsufficientPoints`] with fewer than 2 points.
    pub fn start<R>(&mut self, renderer: &mut R) -> Result<()>
    where
        R: Renderer<Handle = H>,
    {
        let stream = engine::solve(&self.points)?;
        self.abort(renderer);
        self.result = None;

        let (lo, hi) = self.points.y_extent().unwrap_or((0.0, 0.0));
        self.player
            .set_y_extent(lo - self.cfg.y_margin, hi + self.cfg.y_margin);
        self.stream = Some(stream);
        tracing::info!(points = self.points.len(), "starting closest pair run");
        Ok(())
    }

    /// Advances the current run to its next `Delay`.
    ///
    /// Returns `None` when no run is in progress. A handle error ends the
    /// run.
    pub fn tick<R>(&mut self, renderer: &mut R) -> Result<Option<Step>>
    where
        R: Renderer<Handle = H>,
    {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };

        let step = match self.player.step(stream, renderer) {
            Ok(step) => step,
            Err(err) => {
                self.stream = None;
                return Err(err);
            }
        };

        if step == Step::Finished {
            self.finish_run();
        }
        Ok(Some(step))
    }

    /// Starts a run and plays it to the end, sleeping at every `Delay`.
    pub fn run<R>(&mut self, renderer: &mut R, cancel: &CancelToken) -> Result<PlaybackOutcome>
    where
        R: Renderer<Handle = H>,
    {
        self.start(renderer)?;
        let Some(mut stream) = self.stream.take() else {
            return Ok(PlaybackOutcome::Cancelled);
        };

        let outcome = self.player.play(&mut stream, renderer, cancel)?;
        if outcome == PlaybackOutcome::Completed {
            self.stream = Some(stream);
            self.finish_run();
        }
        Ok(outcome)
    }

    fn finish_run(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.result = stream.into_result();
            if let Some(result) = &self.result {
                tracing::info!(
                    distance = result.distance,
                    a = ?result.pair.a,
                    b = ?result.pair.b,
                    "closest pair found"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::scene::{Scene, Shape};
    use crate::types::LineKind;

    fn session() -> Session<crate::scene::ShapeId> {
        Session::new(PlaybackConfig::instant())
    }

    #[test]
    fn load_draws_one_point_per_line() {
        let mut scene = Scene::default();
        let mut s = session();
        let count = s.load_text("0,0\n1,1\n5,5", &mut scene).expect("valid input");
        assert_eq!(count, 3);
        assert_eq!(scene.len(), 3);
        assert!(scene.shapes().all(|(_, shape)| matches!(shape, Shape::Point(_))));
    }

    #[test]
    fn failed_load_keeps_previous_points() {
        let mut scene = Scene::default();
        let mut s = session();
        s.load_text("0,0\n1,1", &mut scene).expect("valid input");
        let err = s.load_text("2,2\nbad", &mut scene).expect_err("malformed");
        assert!(matches!(err, Error::MalformedPointLine { line: 2, .. }));
        assert_eq!(s.points().len(), 2);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn run_leaves_points_and_the_final_line() {
        let mut scene = Scene::default();
        let mut s = session();
        s.load_text("0,0\n10,10\n3,4\n20,1\n7,7\n15,3", &mut scene)
            .expect("valid input");

        let outcome = s.run(&mut scene, &CancelToken::new()).expect("run");
        assert_eq!(outcome, PlaybackOutcome::Completed);
        assert!(!s.is_running());

        let result = *s.result().expect("finished run has a result");
        assert_eq!(scene.len(), 6 + 1);
        let lines: Vec<&Shape> = scene
            .shapes()
            .map(|(_, shape)| shape)
            .filter(|shape| matches!(shape, Shape::Line { .. }))
            .collect();
        assert_eq!(
            lines,
            vec![&Shape::Line {
                a: result.pair.a,
                b: result.pair.b,
                kind: LineKind::Pair
            }]
        );
    }

    #[test]
    fn rerun_replaces_previous_line() {
        let mut scene = Scene::default();
        let mut s = session();
        s.load_text("0,0\n3,4\n9,9", &mut scene).expect("valid input");
        s.run(&mut scene, &CancelToken::new()).expect("first run");
        s.run(&mut scene, &CancelToken::new()).expect("second run");
        assert_eq!(scene.len(), 3 + 1);
        assert_eq!(s.outstanding_handles(), 4);
    }

    #[test]
    fn tick_walks_the_run_one_delay_at_a_time() {
        let mut scene = Scene::default();
        let mut s = session();
        s.load_text("0,0\n3,4", &mut scene).expect("valid input");

        assert_eq!(s.tick(&mut scene).expect("idle"), None);
        s.start(&mut scene).expect("two points");

        // Enter + delay, then pair + delay, then the final exit.
        assert_eq!(s.tick(&mut scene).expect("tick"), Some(Step::Paced));
        assert_eq!(scene.len(), 2 + 1);
        assert_eq!(s.tick(&mut scene).expect("tick"), Some(Step::Paced));
        assert_eq!(s.tick(&mut scene).expect("tick"), Some(Step::Finished));
        assert_eq!(s.result().map(|r| r.distance), Some(5.0));
        assert_eq!(s.tick(&mut scene).expect("idle"), None);
        assert_eq!(scene.len(), 2 + 1);
    }

    #[test]
    fn start_refuses_a_single_point() {
        let mut scene = Scene::default();
        let mut s = session();
        s.load_text("1,1", &mut scene).expect("valid input");
        let err = s.start(&mut scene).expect_err("one point");
        assert!(matches!(err, Error::InsufficientPoints { count: 1 }));
        assert!(!s.is_running());
    }

    #[test]
    fn clear_mid_run_leaves_nothing_behind() {
        let mut scene = Scene::default();
        let mut s = session();
        s.load_text("0,0\n1,5\n2,1\n3,3\n4,8\n5,2\n6,6\n7,0", &mut scene)
            .expect("valid input");
        s.start(&mut scene).expect("enough points");
        for _ in 0..5 {
            s.tick(&mut scene).expect("tick");
        }
        assert!(s.outstanding_handles() > 8);

        s.clear(&mut scene);
        assert!(s.points().is_empty());
        assert_eq!(s.outstanding_handles(), 0);
        assert!(scene.is_empty());
        assert!(!s.is_running());

        // Clearing again changes nothing.
        s.clear(&mut scene);
        assert_eq!(s.outstanding_handles(), 0);
    }
}
