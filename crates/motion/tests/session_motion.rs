//! End-to-end motion synthesis: path, timing and segments together.

use std::sync::Arc;

use motion::geodesy::offset_meters;
use motion::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

const START_MS: i64 = 1_700_000_000_000;

fn center() -> GeoPoint {
    GeoPoint::new(120.523568, 30.647431)
}

fn synthesizer() -> PathSynthesizer {
    PathSynthesizer::new(SynthesisConfig::default(), Arc::new(NoRoute))
}

#[tokio::test]
async fn test_loop_session_matches_declared_totals() {
    let totals = SessionTotals::new(3000, 786, 1894);
    let mut rng = StdRng::seed_from_u64(2024);

    let path = synthesizer()
        .synthesize(&PathRequest::around(center()).duration_hint(786.0), &mut rng)
        .await;
    assert_eq!(path.strategy, Strategy::Loop);
    assert_eq!(path.points.len(), 300);

    let timing = TimingProfile::new(RunnerProfile::for_session(3000.0, 786.0));
    let trajectory = timing.attach_timing(&path.points, START_MS, 786.0, 1, &mut rng);
    let elapsed = trajectory.last().unwrap().timestamp_ms - START_MS;
    assert!((elapsed - 786_000).abs() <= 1);

    let segments = SegmentDataGenerator::new().generate(&totals);
    assert_eq!(segments.pace.iter().map(|s| s.distance).sum::<u32>(), 3000);
    assert_eq!(segments.steps.iter().map(|s| s.time).sum::<u32>(), 786);
    assert_eq!(segments.steps.iter().map(|s| s.step).sum::<u32>(), 1894);
    assert_eq!(segments.strides.iter().map(|s| s.step_count).sum::<u32>(), 1894);
}

#[tokio::test]
async fn test_two_checkpoints_without_route_service() {
    let a = Checkpoint::new("A", center());
    let b = Checkpoint::new("B", offset_meters(center(), 0.0, 500.0));
    let mut rng = StdRng::seed_from_u64(9);

    let request = PathRequest::around(center()).checkpoints(vec![a.clone(), b.clone()]);
    let path = synthesizer().synthesize(&request, &mut rng).await;

    assert_eq!(path.strategy, Strategy::Checkpoints);
    assert!(path.points.len() >= 80, "only {} points", path.points.len());
    assert_eq!(path.points[0].position, a.position);
    assert_eq!(path.points.last().unwrap().position, b.position);
    assert_eq!(path.checkpoint_indices(), vec![0, path.points.len() - 1]);

    // Densification leaves no wide gaps between interpolated points
    for pair in path.points.windows(2) {
        if pair[0].source.is_checkpoint() || pair[1].source.is_checkpoint() {
            continue;
        }
        assert!(haversine_distance(pair[0].position, pair[1].position) < 15.0);
    }

    let trajectory = TimingProfile::default().attach_timing(&path.points, START_MS, 300.0, 1, &mut rng);
    assert_eq!(trajectory[0].position, a.position);
    assert_eq!(trajectory.last().unwrap().position, b.position);
    for pair in trajectory.windows(2) {
        assert!(pair[1].index > pair[0].index);
        assert!(pair[1].timestamp_ms >= pair[0].timestamp_ms);
    }
}

#[tokio::test]
async fn test_same_seed_same_shape() {
    let checkpoints = vec![
        Checkpoint::new("1", center()),
        Checkpoint::new("2", offset_meters(center(), 200.0, 100.0)),
        Checkpoint::new("3", offset_meters(center(), 350.0, -50.0)),
    ];
    let request = PathRequest::around(center()).checkpoints(checkpoints);

    let first = synthesizer()
        .synthesize(&request, &mut StdRng::seed_from_u64(77))
        .await;
    let second = synthesizer()
        .synthesize(&request, &mut StdRng::seed_from_u64(77))
        .await;

    assert_eq!(first.points.len(), second.points.len());
    assert_eq!(first.checkpoint_indices(), second.checkpoint_indices());
    assert_eq!(first.checkpoint_indices().len(), 3);
}

#[tokio::test]
async fn test_zero_distance_destination() {
    let mut rng = StdRng::seed_from_u64(1);
    let request = PathRequest::between(center(), center()).duration_hint(600.0);

    let path = synthesizer().synthesize(&request, &mut rng).await;
    assert_eq!(path.strategy, Strategy::Degenerate);
    assert_eq!(path.points.len(), 1);

    let trajectory = TimingProfile::default().attach_timing(&path.points, START_MS, 600.0, 1, &mut rng);
    assert_eq!(trajectory.len(), 1);
    assert!(trajectory[0].speed_mps.is_finite());
}

#[tokio::test]
async fn test_recorded_trajectory_round_trips_through_gpx() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.gpx");
    let mut rng = StdRng::seed_from_u64(5);

    let path = synthesizer()
        .synthesize(&PathRequest::around(center()), &mut rng)
        .await;
    let trajectory = TimingProfile::default().attach_timing(&path.points, START_MS, 786.0, 1, &mut rng);
    GpxLoader::write_file(&file, &trajectory, Some("loop")).unwrap();

    let recorded = GpxLoader::load_file(&file).unwrap();
    let replay = synthesizer()
        .synthesize(&PathRequest::around(center()).recorded(recorded), &mut rng)
        .await;

    assert_eq!(replay.strategy, Strategy::Recorded);
    assert_eq!(replay.points.len(), trajectory.len());
}
