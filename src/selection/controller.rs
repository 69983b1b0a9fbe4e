use std::collections::BTreeSet;

use log::info;

use super::{
    state::{ActiveTab, Controls, SelectionMode, Target},
    views::{candidate_rows, trajectory_window, ViewSet},
};
use crate::{
    error::{AnnotationError, AnnotationResult},
    models::SegmentStatus,
    navigation::NavigationController,
    store::{SegmentStore, StatusChange, TrajectoryStore},
};

/// Interaction state behind "pick lines on the current frame, then connect
/// or label them". Only one store can hold a selection at a time.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    trajectories: Vec<u64>,
    segments: Vec<u64>,
    active_tab: ActiveTab,
    views: ViewSet,
}

impl SelectionController {
    pub fn new(trajectories: &TrajectoryStore, segments: &SegmentStore, frame: u64) -> Self {
        Self {
            views: ViewSet::build(trajectories, segments, frame),
            ..Self::default()
        }
    }

    pub fn mode(&self) -> SelectionMode {
        if !self.trajectories.is_empty() {
            SelectionMode::TrajectorySelecting
        } else if !self.segments.is_empty() {
            SelectionMode::SegmentSelecting
        } else {
            SelectionMode::Idle
        }
    }

    pub fn selected_trajectories(&self) -> &[u64] {
        &self.trajectories
    }

    pub fn selected_segments(&self) -> &[u64] {
        &self.segments
    }

    pub fn views(&self) -> &ViewSet {
        &self.views
    }

    pub fn active_tab(&self) -> ActiveTab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: ActiveTab) {
        self.active_tab = tab;
    }

    pub fn controls(&self) -> Controls {
        Controls::for_selection(self.trajectories.len(), self.segments.len(), self.active_tab)
    }

    /// Adds `id` to the selection of `target`, dropping any selection held in
    /// the other store. The first trajectory picked from an idle state swaps
    /// the trajectory view for its candidates.
    pub fn select(
        &mut self,
        target: Target,
        id: u64,
        trajectories: &TrajectoryStore,
        segments: &SegmentStore,
    ) -> AnnotationResult<()> {
        match target {
            Target::Trajectory => {
                trajectories.by_id(id)?;
                self.segments.clear();
                if self.trajectories.is_empty() {
                    self.show_candidates(id, trajectories)?;
                }
                push_unique(&mut self.trajectories, id);
            }
            Target::Segment => {
                segments.by_id(id)?;
                if !self.trajectories.is_empty() {
                    self.clear_trajectories(trajectories);
                }
                push_unique(&mut self.segments, id);
            }
        }
        Ok(())
    }

    /// Empties both selections and brings back the regular trajectory view.
    pub fn clear(&mut self, trajectories: &TrajectoryStore) {
        self.clear_trajectories(trajectories);
        self.segments.clear();
    }

    /// Recomputes every view for `frame` and drops the selection.
    pub fn refresh(&mut self, trajectories: &TrajectoryStore, segments: &SegmentStore, frame: u64) {
        self.trajectories.clear();
        self.segments.clear();
        self.views = ViewSet::build(trajectories, segments, frame);
    }

    /// Joins the selected trajectories pairwise in selection order, then moves
    /// to the end of the last new segment. Returns the new segment ids.
    pub fn connect(
        &mut self,
        trajectories: &TrajectoryStore,
        segments: &mut SegmentStore,
        navigation: &mut NavigationController,
    ) -> AnnotationResult<Vec<u64>> {
        if self.trajectories.len() < 2 || !self.segments.is_empty() {
            return Err(AnnotationError::InvalidSelection(format!(
                "connect needs at least two trajectories and no segments, got {} and {}",
                self.trajectories.len(),
                self.segments.len()
            )));
        }

        let mut created = Vec::with_capacity(self.trajectories.len() - 1);
        let mut last_frame_out = navigation.current_frame();
        for pair in self.trajectories.windows(2) {
            let t1 = trajectories.by_id(pair[0])?;
            let t2 = trajectories.by_id(pair[1])?;
            let segment = segments.create_segment(t1, t2);
            last_frame_out = segment.frame_out;
            let id = segments.append_segment(segment);
            info!("Connected trajectory {} to {} with segment {id}", t1.id, t2.id);
            created.push(id);
        }

        let frame = navigation.jump_to(last_frame_out);
        self.refresh(trajectories, segments, frame);
        Ok(created)
    }

    /// Labels the selected segments and refreshes the views.
    pub fn apply_label<I, S>(
        &mut self,
        status: SegmentStatus,
        comments: I,
        trajectories: &TrajectoryStore,
        segments: &mut SegmentStore,
        frame: u64,
    ) -> AnnotationResult<StatusChange>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.segments.is_empty() || !self.trajectories.is_empty() {
            return Err(AnnotationError::InvalidSelection(format!(
                "labeling needs at least one segment and no trajectories, got {} and {}",
                self.segments.len(),
                self.trajectories.len()
            )));
        }

        let change = segments.set_status(status, comments, &self.segments)?;
        self.refresh(trajectories, segments, frame);
        Ok(change)
    }

    /// Returns the selected segments to the unlabeled state. Manual segments
    /// are deleted instead.
    pub fn reset_label(
        &mut self,
        trajectories: &TrajectoryStore,
        segments: &mut SegmentStore,
        frame: u64,
    ) -> AnnotationResult<StatusChange> {
        if !self.active_tab.is_labeled_table() {
            return Err(AnnotationError::InvalidSelection(format!(
                "labels can only be reset from a labeled table, active tab is {:?}",
                self.active_tab
            )));
        }
        self.apply_label(
            SegmentStatus::Unlabeled,
            BTreeSet::<String>::new(),
            trajectories,
            segments,
            frame,
        )
    }

    fn show_candidates(&mut self, id: u64, trajectories: &TrajectoryStore) -> AnnotationResult<()> {
        let candidates = trajectories.candidates_for(id)?;
        self.views.current_trajectories = candidate_rows(&candidates);
        self.views.candidate_anchor = Some(id);
        Ok(())
    }

    fn clear_trajectories(&mut self, trajectories: &TrajectoryStore) {
        self.trajectories.clear();
        if self.views.candidate_anchor.take().is_some() {
            self.views.current_trajectories = trajectory_window(trajectories, self.views.frame);
        }
    }
}

fn push_unique(ids: &mut Vec<u64>, id: u64) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}
