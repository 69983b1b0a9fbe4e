use serde::Serialize;

use crate::{
    models::{Segment, SegmentStatus, Trajectory},
    store::{LineStyle, SegmentStore, Styled, TrajectoryStore},
};

/// One row handed to the rendering layer: the entity's fields plus the style
/// to draw it with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRecord {
    pub id: u64,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub class: u32,
    pub frame_in: u64,
    pub frame_out: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SegmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_manual: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
    #[serde(flatten)]
    pub style: LineStyle,
}

impl ViewRecord {
    pub fn trajectory(trajectory: &Trajectory, style: LineStyle) -> Self {
        Self {
            id: trajectory.id,
            xs: trajectory.xs.clone(),
            ys: trajectory.ys.clone(),
            class: trajectory.class,
            frame_in: trajectory.frame_in,
            frame_out: trajectory.frame_out,
            status: None,
            is_manual: None,
            comments: Vec::new(),
            style,
        }
    }

    pub fn segment(segment: &Segment) -> Self {
        Self {
            id: segment.id,
            xs: segment.xs.clone(),
            ys: segment.ys.clone(),
            class: segment.class,
            frame_in: segment.frame_in,
            frame_out: segment.frame_out,
            status: Some(segment.status),
            is_manual: Some(segment.is_manual),
            comments: segment.comments.iter().cloned().collect(),
            style: segment.line_style(),
        }
    }
}

/// Every projection the rendering layer draws after a change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSet {
    pub frame: u64,
    /// Set while the trajectory view shows the candidates of this trajectory.
    pub candidate_anchor: Option<u64>,
    pub current_trajectories: Vec<ViewRecord>,
    pub current_segments: Vec<ViewRecord>,
    pub incorrect: Vec<ViewRecord>,
    pub correct: Vec<ViewRecord>,
    pub new: Vec<ViewRecord>,
}

impl ViewSet {
    pub fn build(trajectories: &TrajectoryStore, segments: &SegmentStore, frame: u64) -> Self {
        Self {
            frame,
            candidate_anchor: None,
            current_trajectories: trajectory_window(trajectories, frame),
            current_segments: segments
                .frame_window(frame)
                .into_iter()
                .map(ViewRecord::segment)
                .collect(),
            incorrect: segment_rows(segments.by_status(SegmentStatus::Incorrect)),
            correct: segment_rows(segments.by_status(SegmentStatus::Correct)),
            new: segment_rows(segments.new_segments()),
        }
    }

    pub fn trajectory_ids(&self) -> Vec<u64> {
        self.current_trajectories.iter().map(|r| r.id).collect()
    }

    pub fn segment_ids(&self) -> Vec<u64> {
        self.current_segments.iter().map(|r| r.id).collect()
    }
}

pub fn trajectory_window(trajectories: &TrajectoryStore, frame: u64) -> Vec<ViewRecord> {
    trajectories
        .frame_window(frame)
        .into_iter()
        .map(|t| ViewRecord::trajectory(t, t.line_style()))
        .collect()
}

/// Candidate rows: the anchor keeps its class color, the rest share the
/// neutral candidate color.
pub fn candidate_rows(candidates: &[&Trajectory]) -> Vec<ViewRecord> {
    candidates
        .iter()
        .enumerate()
        .map(|(index, t)| {
            let style = if index == 0 {
                t.line_style()
            } else {
                LineStyle::candidate()
            };
            ViewRecord::trajectory(t, style)
        })
        .collect()
}

fn segment_rows(segments: Vec<&Segment>) -> Vec<ViewRecord> {
    segments.into_iter().map(ViewRecord::segment).collect()
}
