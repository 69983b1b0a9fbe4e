mod common;

use traj_annotator_lib::{
    error::AnnotationError,
    models::SegmentStatus,
    navigation::NavigationController,
    selection::{SelectionController, SelectionMode, Target},
};

#[test]
fn candidates_start_with_anchor_and_include_continuations() {
    let (trajectories, _) = common::stores();
    let ids: Vec<u64> = trajectories
        .candidates_for(1)
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids[0], 1);
    assert!(ids.contains(&2));
    assert!(!ids.contains(&4));
}

#[test]
fn connecting_two_trajectories_creates_manual_segment() {
    let (trajectories, mut segments) = common::stores();
    let mut navigation = NavigationController::new(5000, 1800);
    let mut selection = SelectionController::new(&trajectories, &segments, 50);

    selection
        .select(Target::Trajectory, 1, &trajectories, &segments)
        .unwrap();
    selection
        .select(Target::Trajectory, 2, &trajectories, &segments)
        .unwrap();
    let created = selection
        .connect(&trajectories, &mut segments, &mut navigation)
        .unwrap();

    assert_eq!(created, vec![13]);
    let segment = segments.by_id(13).unwrap();
    assert_eq!((segment.frame_in, segment.frame_out), (100, 150));
    assert!(segment.is_manual);
    assert_eq!(segment.status, SegmentStatus::Correct);
    assert_eq!(segment.xs, vec![6.0, 2.0]);
    assert_eq!(selection.mode(), SelectionMode::Idle);
    assert_eq!(navigation.current_frame(), 150);
    assert_eq!(segments.new_count(), 1);
}

#[test]
fn incorrect_label_keeps_reasons() {
    let (trajectories, mut segments) = common::stores();
    let mut selection = SelectionController::new(&trajectories, &segments, 610);
    let before = segments.incorrect_count();

    selection
        .select(Target::Segment, 11, &trajectories, &segments)
        .unwrap();
    selection
        .apply_label(
            SegmentStatus::Incorrect,
            ["large distance"],
            &trajectories,
            &mut segments,
            610,
        )
        .unwrap();

    let segment = segments.by_id(11).unwrap();
    assert_eq!(segment.status, SegmentStatus::Incorrect);
    assert!(segment.comments.contains("large distance"));
    assert_eq!(segments.incorrect_count(), before + 1);
    assert!(!selection.views().segment_ids().contains(&11));
    assert_eq!(selection.views().incorrect.len(), 1);
}

#[test]
fn relabeling_manual_segment_removes_it() {
    let (trajectories, mut segments) = common::stores();
    let mut navigation = NavigationController::new(5000, 1800);
    let mut selection = SelectionController::new(&trajectories, &segments, 50);
    for id in [1, 2] {
        selection
            .select(Target::Trajectory, id, &trajectories, &segments)
            .unwrap();
    }
    let created = selection
        .connect(&trajectories, &mut segments, &mut navigation)
        .unwrap();
    let total = segments.total_count();

    selection
        .select(Target::Segment, created[0], &trajectories, &segments)
        .unwrap();
    let change = selection
        .apply_label(
            SegmentStatus::Incorrect,
            Vec::<String>::new(),
            &trajectories,
            &mut segments,
            navigation.current_frame(),
        )
        .unwrap();

    assert_eq!(change.removed, created);
    assert!(matches!(
        segments.by_id(created[0]),
        Err(AnnotationError::NotFound { .. })
    ));
    assert_eq!(segments.new_count(), 0);
    assert_eq!(segments.total_count(), total);
}

#[test]
fn next_interest_skips_labeled_segments() {
    let (_, segments) = common::stores();
    assert_eq!(segments.find_next_interest(500).unwrap(), 600);
    assert_eq!(segments.find_next_interest(100).unwrap(), 600);
    assert_eq!(
        segments.find_next_interest(900).unwrap_err(),
        AnnotationError::NoInterestAfter(900)
    );
}

#[test]
fn navigation_follows_unlabeled_segments() {
    let (_, segments) = common::stores();
    let mut navigation = NavigationController::new(5000, 1800);
    assert_eq!(navigation.jump_to_next_interest(&segments), Some(600));
    // 600 is still on screen, so the next stop is the segment at 900.
    assert_eq!(navigation.jump_to_next_interest(&segments), Some(900));
    assert_eq!(navigation.jump_to_next_interest(&segments), None);
    assert_eq!(navigation.current_frame(), 900);
}

#[test]
fn ratio_is_undefined_without_algorithmic_segments() {
    let segments = traj_annotator_lib::store::SegmentStore::new(Vec::new(), 400, None).unwrap();
    assert_eq!(segments.correct_ratio(), None);
    assert!(segments.stats().to_string().ends_with("Accuracy: n/a"));

    let (_, segments) = common::stores();
    let ratio = segments.correct_ratio().unwrap();
    assert!((ratio - 1.0 / 3.0).abs() < 1e-9);
}
