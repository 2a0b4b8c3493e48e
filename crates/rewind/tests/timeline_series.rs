//! End-to-end: a [`SeriesRecorder`] driven through a full
//! record/undo/replay lifecycle, including no-op ticks and branch
//! divergence.

use rewind::{RecorderError, SeriesRecorder, Timeline, TimelineConfig};

#[test]
fn record_undo_replay_roundtrip() {
    let mut timeline = Timeline::new(TimelineConfig::compact());
    let mut rec = SeriesRecorder::new(4);

    // More samples than slots, so the circular array wraps.
    let samples = [1.5, -2.25, 0.0, 3.75, 0.5];
    for &v in &samples {
        rec.stage(v);
        timeline.step(&mut rec).unwrap();
    }
    assert_eq!(rec.series().top(), 0.5);

    let recorded: Vec<f64> = rec.series().values().to_vec();
    let recorded_head = rec.series().head();

    for _ in &samples {
        timeline.undo(&mut rec).unwrap();
    }
    assert!(!timeline.has_undo());
    assert_eq!(rec.series().values(), &[0.0; 4]);
    assert_eq!(rec.series().head(), 0);

    // Replay everything. Nothing is staged, so any (wrong) diff call
    // would fail with NothingStaged instead of replaying.
    for _ in &samples {
        timeline.step(&mut rec).unwrap();
    }
    assert_eq!(rec.series().values(), recorded.as_slice());
    assert_eq!(rec.series().head(), recorded_head);
    assert!(!timeline.has_redo());
}

#[test]
fn idle_ticks_are_recorded_and_replayed() {
    let mut timeline = Timeline::new(TimelineConfig::compact());
    let mut rec = SeriesRecorder::new(8);

    rec.stage(7.0);
    timeline.step(&mut rec).unwrap();
    for _ in 0..100 {
        rec.stage_idle();
        timeline.step(&mut rec).unwrap();
    }
    rec.stage(-1.0);
    timeline.step(&mut rec).unwrap();

    for _ in 0..102 {
        timeline.undo(&mut rec).unwrap();
    }
    assert!(!timeline.has_undo());
    assert_eq!(rec.series().values(), &[0.0; 8]);

    for _ in 0..102 {
        timeline.step(&mut rec).unwrap();
    }
    assert_eq!(rec.series().top(), -1.0);
}

#[test]
fn divergent_edit_requires_clearing_forward_history() {
    let mut timeline = Timeline::new(TimelineConfig::compact());
    let mut rec = SeriesRecorder::new(4);

    for &v in &[1.0, 2.0, 3.0] {
        rec.stage(v);
        timeline.step(&mut rec).unwrap();
    }
    timeline.undo(&mut rec).unwrap();
    timeline.undo(&mut rec).unwrap();
    assert_eq!(rec.series().top(), 1.0);
    assert!(timeline.has_redo());

    // The caller branches: discard the stale forward patches, then record
    // a fresh transition.
    timeline.clear_forward_history();
    rec.stage(9.0);
    timeline.step(&mut rec).unwrap();
    assert_eq!(rec.series().top(), 9.0);

    // The new branch undoes cleanly back past the divergence point.
    timeline.undo(&mut rec).unwrap();
    timeline.undo(&mut rec).unwrap();
    assert_eq!(rec.series().top(), 0.0);
}

#[test]
fn replay_without_history_needs_staging() {
    let mut timeline = Timeline::new(TimelineConfig::compact());
    let mut rec = SeriesRecorder::new(2);
    assert_eq!(
        timeline.step(&mut rec).unwrap_err(),
        RecorderError::NothingStaged
    );
    assert!(!timeline.has_undo());
}
