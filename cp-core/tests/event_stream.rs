use std::collections::{HashMap, HashSet};

use cp_core::{
    config::PlaybackConfig,
    engine::{self, closest_pair},
    event::{Event, RecursionResult},
    geometry,
    player::{CancelToken, EventPlayer, PlaybackOutcome},
    point_set::PointSet,
    scene::{Scene, Shape},
    session::Session,
    types::{HandleId, Point},
};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

fn collect(points: &PointSet) -> (Vec<Event>, RecursionResult) {
    let mut stream = engine::solve(points).expect("at least two points");
    let events: Vec<Event> = stream.by_ref().collect();
    let result = stream.into_result().expect("drained stream has a result");
    (events, result)
}

/// Every handle is created once, removed once after creation, except the
/// final line which is never removed.
fn assert_handles_balanced(events: &[Event], final_line: HandleId) {
    let mut created: HashMap<HandleId, usize> = HashMap::new();
    let mut removed: HashSet<HandleId> = HashSet::new();

    for (i, event) in events.iter().enumerate() {
        if let Some(h) = event.created() {
            assert!(created.insert(h, i).is_none(), "{h} created twice");
        }
        if let Some(h) = event.removed() {
            assert!(created.contains_key(&h), "{h} removed before creation");
            assert!(removed.insert(h), "{h} removed twice");
        }
    }

    for h in created.keys() {
        if *h == final_line {
            assert!(!removed.contains(h), "final line {h} was removed");
        } else {
            assert!(removed.contains(h), "{h} never removed");
        }
    }
}

fn ground_truth(points: &PointSet) -> f64 {
    geometry::brute_force(points.points())
        .map(|(_, _, d)| d)
        .expect("at least two points")
}

#[test]
fn seeded_random_sets_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for count in [2, 3, 4, 5, 7, 16, 33, 100, 257] {
        let points =
            PointSet::random_in_rect(Point::new(400.0, 300.0), Point::new(380.0, 280.0), count, &mut rng);
        let (events, result) = collect(&points);

        assert!(
            (result.distance - ground_truth(&points)).abs() < 1e-9,
            "count {count}"
        );
        assert!((result.pair.distance() - result.distance).abs() < 1e-12);
        assert_handles_balanced(&events, result.line);
    }
}

#[test]
fn vertical_line_with_tied_x_matches_brute_force() {
    let ys = [0.0, 10.0, 10.5, 20.0, 100.0, 200.0, 300.0, 400.0, 400.25];
    let points = PointSet::from_positions(ys.iter().map(|&y| Point::new(0.0, y)).collect());
    let result = closest_pair(&points).expect("enough points");
    assert_eq!(result.distance, 0.25);
}

#[test]
fn collinear_six_points_have_unit_distance() {
    let points = PointSet::from_positions((0..6).map(|i| Point::new(0.0, i as f64)).collect());
    let (events, result) = collect(&points);
    assert_eq!(result.distance, 1.0);
    assert_handles_balanced(&events, result.line);
}

#[test]
fn every_remove_event_follows_its_create() {
    let points = PointSet::parse(
        "12,3\n4,40\n7,7\n30,2\n31,30\n18,18\n2,22\n25,9\n9,33\n40,40",
        Default::default(),
    )
    .expect("valid input");
    let (events, result) = collect(&points);
    assert_handles_balanced(&events, result.line);
    assert!(matches!(events.last(), Some(Event::Delay)));
}

#[test]
fn full_playback_leaves_only_the_final_line() {
    let mut rng = StdRng::seed_from_u64(11);
    let points = PointSet::random_in_rect(Point::ZERO, Point::new(50.0, 50.0), 40, &mut rng);
    let stream = engine::solve(&points).expect("enough points");

    let mut scene = Scene::default();
    let mut player = EventPlayer::new(std::time::Duration::ZERO).with_y_extent(-60.0, 60.0);
    let outcome = player
        .play(stream, &mut scene, &CancelToken::new())
        .expect("engine streams are well formed");

    assert_eq!(outcome, PlaybackOutcome::Completed);
    assert_eq!(player.outstanding(), 1);
    let shapes: Vec<&Shape> = scene.shapes().map(|(_, s)| s).collect();
    assert!(matches!(shapes.as_slice(), [Shape::Line { .. }]));
}

#[test]
fn abandoning_a_stream_stops_renderer_calls() {
    let mut rng = StdRng::seed_from_u64(3);
    let points = PointSet::random_in_rect(Point::ZERO, Point::new(10.0, 10.0), 30, &mut rng);
    let mut stream = engine::solve(&points).expect("enough points");

    let mut scene = Scene::default();
    let mut player = EventPlayer::new(std::time::Duration::ZERO);
    for _ in 0..3 {
        player.step(&mut stream, &mut scene).expect("step");
    }
    let calls = scene.draw_calls() + scene.remove_calls();
    drop(stream);

    assert_eq!(scene.draw_calls() + scene.remove_calls(), calls);
    player.clear(&mut scene);
    assert!(scene.is_empty());
}

#[test]
fn clear_after_run_is_idempotent() {
    let mut scene = Scene::default();
    let mut session = Session::new(PlaybackConfig::instant());
    session
        .load_text("0,0\n0,1\n0,2\n0,3\n0,4\n0,5", &mut scene)
        .expect("valid input");
    session
        .run(&mut scene, &CancelToken::new())
        .expect("run completes");
    assert_eq!(session.result().map(|r| r.distance), Some(1.0));

    for _ in 0..2 {
        session.clear(&mut scene);
        assert!(session.points().is_empty());
        assert_eq!(session.outstanding_handles(), 0);
        assert!(scene.is_empty());
    }
}

proptest! {
    #[test]
    fn distance_matches_brute_force(
        coords in prop::collection::vec((-1000.0f64..1000.0, -1000.0f64..1000.0), 2..120)
    ) {
        let points = PointSet::from_positions(
            coords.into_iter().map(|(x, y)| Point::new(x, y)).collect(),
        );
        let (events, result) = collect(&points);
        prop_assert!((result.distance - ground_truth(&points)).abs() < 1e-9);
        assert_handles_balanced(&events, result.line);
    }

    #[test]
    fn grid_points_with_ties_match_brute_force(
        coords in prop::collection::vec((0i32..8, 0i32..8), 2..60)
    ) {
        let points = PointSet::from_positions(
            coords
                .into_iter()
                .map(|(x, y)| Point::new(f64::from(x), f64::from(y)))
                .collect(),
        );
        let (events, result) = collect(&points);
        prop_assert_eq!(result.distance, ground_truth(&points));
        assert_handles_balanced(&events, result.line);
    }
}
