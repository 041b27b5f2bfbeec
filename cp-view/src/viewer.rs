//! Interactive closest-pair viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Session`] and the
//! [`Scene`] it draws into, and implements [`eframe::App`] to replay runs
//! frame by frame.

use cp_core::{
    config::{MalformedLinePolicy, PlaybackConfig},
    player::Step,
    point_set::PointSet,
    scene::{Scene, Shape, ShapeId},
    session::Session,
    types::{BlockTag, LineKind, Point},
};
use eframe::App;
use glam::DVec2;
use rand::rng;

/// Screen distance, in pixels, within which hovering a point shows its tooltip.
const HOVER_RADIUS: f32 = 6.0;

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The run context: [`Session`] (points, playback, event stream).
/// - The [`Scene`] the session draws into, painted every frame.
/// - UI state (pan/zoom, file path, random spawning, timing).
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and the configured delay has passed, call
///    [`Viewer::step_once`].
/// 3. Paint the scene and the hover tooltip.
///
/// ### Fields
/// - `session` - Points, player and the run in progress.
/// - `scene` - Shapes currently drawn by the session.
/// - `cfg` - Playback settings edited in the side panel.
///
/// - `rng` - Random number generator used for random point sets.
/// - `spawn_count` - Number of points generated by "Random".
/// - `path` - File path typed in the top panel.
///
/// - `running` - Whether playback auto-advances; cleared by "Pause".
/// - `zoom` - Zoom factor for world-to-screen coordinate mapping.
/// - `pan` - Screen-space pan offset in pixels.
/// - `fit_pending` - Refit the camera to the points on the next frame.
///
/// - `last_step_time` - Time stamp of the last playback step (egui time).
/// - `status` - Last error or notice shown in the status bar.
pub struct Viewer {
    session: Session<ShapeId>,
    scene: Scene,
    cfg: PlaybackConfig,

    rng: rand::rngs::ThreadRng,
    spawn_count: usize,
    path: String,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,
    fit_pending: bool,

    last_step_time: f64,
    status: Option<String>,
}

impl Viewer {
    /// Creates an empty viewer with the default playback settings.
    pub fn new() -> Self {
        let cfg = PlaybackConfig::default();
        Self {
            session: Session::new(cfg),
            scene: Scene::default(),
            cfg,
            rng: rng(),
            spawn_count: 32,
            path: String::new(),
            running: false,
            zoom: 1.0,
            pan: egui::vec2(0.0, 0.0),
            fit_pending: false,
            last_step_time: 0.0,
            status: None,
        }
    }

    /// Loads the point file named in `path`.
    fn load_file(&mut self) {
        match PointSet::from_path(self.path.trim(), self.cfg.malformed_lines) {
            Ok(points) => self.load_points(points),
            Err(err) => {
                tracing::warn!(path = %self.path, %err, "failed to load points");
                self.status = Some(err.to_string());
            }
        }
    }

    /// Replaces the points with a random cloud.
    fn load_random(&mut self) {
        let points = PointSet::random_in_rect(
            Point::new(400.0, 300.0),
            Point::new(380.0, 280.0),
            self.spawn_count,
            &mut self.rng,
        );
        self.load_points(points);
    }

    fn load_points(&mut self, points: PointSet) {
        let count = self.session.load(points, &mut self.scene);
        self.running = false;
        self.fit_pending = true;
        self.status = Some(format!("loaded {count} points"));
    }

    /// Discards the points, any run in progress and everything drawn.
    fn clear(&mut self) {
        self.session.clear(&mut self.scene);
        self.running = false;
        self.status = None;
    }

    /// Starts a fresh run and lets it auto-advance.
    fn start_run(&mut self) {
        self.session.set_config(self.cfg);
        match self.session.start(&mut self.scene) {
            Ok(()) => {
                self.running = true;
                self.last_step_time = 0.0;
                self.status = None;
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    /// Applies the events up to the next delay of the current run.
    fn step_once(&mut self) {
        match self.session.tick(&mut self.scene) {
            Ok(Some(Step::Finished)) => {
                self.running = false;
                if let Some(result) = self.session.result() {
                    self.status = Some(format!("closest distance = {:.4}", result.distance));
                }
            }
            Ok(Some(Step::Paced)) => {}
            Ok(None) => self.running = false,
            Err(err) => {
                tracing::error!(%err, "playback aborted");
                self.running = false;
                self.status = Some(err.to_string());
            }
        }
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World coordinates are scaled by `zoom`, offset by `pan`, and then
    /// centered inside the given `rect`. The y-axis is flipped so that
    /// positive y goes up in world space.
    fn world_to_screen(&self, p: Point, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x as f32 * self.zoom + self.pan.x,
            center.y - p.y as f32 * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to world-space.
    ///
    /// Inverse of [`Viewer::world_to_screen`] up to floating point rounding.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Point {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        DVec2::new(f64::from(x), f64::from(y))
    }

    /// Chooses zoom and pan so every point fits inside `rect`.
    fn fit_to_points(&mut self, rect: egui::Rect) {
        let points = self.session.points().points();
        let Some(first) = points.first() else {
            return;
        };
        let (min, max) = points
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));

        let size = (max - min).max(DVec2::splat(1.0));
        let zoom_x = f64::from(rect.width()) * 0.9 / size.x;
        let zoom_y = f64::from(rect.height()) * 0.9 / size.y;
        self.zoom = (zoom_x.min(zoom_y) as f32).clamp(0.01, 100.0);

        let mid = (min + max) * 0.5;
        self.pan = egui::vec2(-(mid.x as f32) * self.zoom, mid.y as f32 * self.zoom);
    }

    /// Point under the cursor, if any is within [`HOVER_RADIUS`].
    fn hovered_point(&self, hover: egui::Pos2, rect: egui::Rect) -> Option<Point> {
        self.session
            .points()
            .points()
            .iter()
            .copied()
            .map(|p| (p, self.world_to_screen(p, rect).distance(hover)))
            .filter(|(_, d)| *d <= HOVER_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p)
    }

    fn block_fill(tag: BlockTag) -> egui::Color32 {
        match tag {
            BlockTag::Subproblem => egui::Color32::from_rgba_unmultiplied(255, 220, 0, 40),
            BlockTag::Half => egui::Color32::from_rgba_unmultiplied(80, 160, 255, 35),
            BlockTag::Strip => egui::Color32::from_rgba_unmultiplied(255, 80, 80, 50),
        }
    }

    fn line_stroke(kind: LineKind) -> egui::Stroke {
        match kind {
            LineKind::Pair => egui::Stroke::new(2.0, egui::Color32::from_rgb(60, 120, 255)),
            LineKind::Divider => egui::Stroke::new(1.0, egui::Color32::GRAY),
        }
    }

    /// Builds the top panel UI (loading, run controls, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut self.path)
                        .hint_text("points file (x,y per line)")
                        .desired_width(220.0),
                );
                if ui.button("Load").clicked() {
                    self.load_file();
                }
                if ui.button("Random").clicked() {
                    self.load_random();
                }

                ui.separator();

                if ui.button("▶ Run").clicked() {
                    self.start_run();
                }

                let busy = self.session.is_running();
                if ui
                    .add_enabled(
                        busy,
                        egui::Button::new(if self.running { "⏸ Pause" } else { "⏵ Resume" }),
                    )
                    .clicked()
                {
                    self.running = !self.running;
                }

                if ui.add_enabled(busy, egui::Button::new("Step")).clicked() {
                    self.running = false;
                    self.step_once();
                }

                if ui.button("Clear").clicked() {
                    self.clear();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.01..=100.0).logarithmic(true).text("Zoom"));
                if ui.button("Fit").clicked() {
                    self.fit_pending = true;
                }
            });
        });
    }

    /// Builds the bottom status bar (points, live handles, result, errors).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("delay = {} ms", self.cfg.delay_ms));
                ui.separator();
                ui.label(format!("shapes = {}", self.scene.len()));
                ui.label(format!("points = {}", self.session.points().len()));
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status);
                }
            });
        });
    }

    /// Builds the right-hand configuration panel.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(200.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Playback");
                ui.horizontal(|ui| {
                    ui.label("delay_ms:");
                    ui.add(
                        egui::DragValue::new(&mut self.cfg.delay_ms)
                            .range(0..=5000)
                            .speed(10.0),
                    );
                });
                ui.horizontal(|ui| {
                    ui.label("y_margin:");
                    ui.add(
                        egui::DragValue::new(&mut self.cfg.y_margin)
                            .range(0.0..=1000.0)
                            .speed(1.0),
                    );
                });

                ui.separator();
                ui.label("Loading");
                let mut skip = self.cfg.malformed_lines == MalformedLinePolicy::Skip;
                if ui.checkbox(&mut skip, "skip malformed lines").changed() {
                    self.cfg.malformed_lines = if skip {
                        MalformedLinePolicy::Skip
                    } else {
                        MalformedLinePolicy::Reject
                    };
                }
                ui.horizontal(|ui| {
                    ui.label("random count:");
                    ui.add(
                        egui::DragValue::new(&mut self.spawn_count)
                            .range(2..=2000)
                            .speed(1.0),
                    );
                });

                ui.separator();
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = PlaybackConfig::default();
                }

                self.session.set_config(self.cfg);
            });
    }

    /// Builds the central panel where the scene is painted.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            if self.fit_pending {
                self.fit_to_points(rect);
                self.fit_pending = false;
            }

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.01, 100.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            // Blocks first so lines and points stay visible on top.
            for (_, shape) in self.scene.shapes() {
                if let Shape::Rect { bounds, tag } = shape {
                    let left = self.world_to_screen(Point::new(bounds.left, 0.0), rect).x;
                    let right = self.world_to_screen(Point::new(bounds.right, 0.0), rect).x;
                    let block = egui::Rect::from_x_y_ranges(left.min(right)..=left.max(right), rect.y_range());
                    painter.rect_filled(block, 0.0, Self::block_fill(*tag));
                }
            }

            for (_, shape) in self.scene.shapes() {
                match shape {
                    Shape::Line { a, b, kind } => {
                        let a = self.world_to_screen(*a, rect);
                        let b = self.world_to_screen(*b, rect);
                        painter.line_segment([a, b], Self::line_stroke(*kind));
                    }
                    Shape::Point(p) => {
                        painter.circle_filled(self.world_to_screen(*p, rect), 3.0, egui::Color32::LIGHT_GRAY);
                    }
                    Shape::Rect { .. } => {}
                }
            }

            // Coordinate tooltip.
            if let Some(hover) = response.hover_pos()
                && let Some(p) = self.hovered_point(hover, rect)
            {
                painter.text(
                    hover + egui::vec2(8.0, -8.0),
                    egui::Align2::LEFT_BOTTOM,
                    format!("({:.2}, {:.2})", p.x, p.y),
                    egui::FontId::monospace(12.0),
                    egui::Color32::WHITE,
                );
            }

            // Auto-advance playback.
            if self.running && self.session.is_running() {
                let now = ctx.input(|i| i.time);
                let interval = self.cfg.delay_ms as f64 / 1000.0;
                if now - self.last_step_time >= interval {
                    self.step_once();
                    self.last_step_time = now;
                }
                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
