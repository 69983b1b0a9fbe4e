use std::{collections::BTreeSet, fmt};

use anyhow::{bail, Context, Result};
use log::{info, warn};
use serde::Serialize;

use super::FrameIndexedStore;
use crate::{
    error::{AnnotationError, AnnotationResult, Entity},
    models::{Segment, SegmentStatus, Trajectory, MANUAL_SEGMENT_CLASS},
};

/// Outcome of a [`SegmentStore::set_status`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusChange {
    pub updated: Vec<u64>,
    pub removed: Vec<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStats {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub new: usize,
    pub correct_ratio: Option<f64>,
}

impl fmt::Display for SegmentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of correct segments: {}", self.correct)?;
        writeln!(f, "Number of incorrect segments: {}", self.incorrect)?;
        writeln!(f, "Number of new segments: {}", self.new)?;
        match self.correct_ratio {
            Some(ratio) => write!(f, "Accuracy: {:.2}%", ratio * 100.0),
            None => write!(f, "Accuracy: n/a"),
        }
    }
}

/// Mutable table of algorithmic and manually created segments.
///
/// Ids are handed out from a monotonic counter and never reused, even after
/// a manual segment is deleted.
#[derive(Debug, Clone)]
pub struct SegmentStore {
    inner: FrameIndexedStore<Segment>,
    next_id: u64,
}

impl SegmentStore {
    /// Builds the store from loaded rows. `next_id` comes from a saved
    /// snapshot; without one, numbering continues after the largest id.
    pub fn new(segments: Vec<Segment>, lookahead: u64, next_id: Option<u64>) -> Result<Self> {
        let mut inner = FrameIndexedStore::new(lookahead);
        for segment in segments {
            segment.validate().context("invalid segment in input table")?;
            let id = segment.id;
            if inner.insert(segment).is_some() {
                bail!("duplicate segment id {id}");
            }
        }

        let floor = inner.max_id().map_or(0, |id| id + 1);
        let next_id = next_id.map_or(floor, |saved| saved.max(floor));

        Ok(Self { inner, next_id })
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn lookahead(&self) -> u64 {
        self.inner.lookahead()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.inner.iter()
    }

    pub fn by_id(&self, id: u64) -> AnnotationResult<&Segment> {
        self.inner.get(id).ok_or(AnnotationError::NotFound {
            entity: Entity::Segment,
            id,
        })
    }

    /// Segments visible at `frame`, skipping the ones judged incorrect.
    pub fn frame_window(&self, frame: u64) -> Vec<&Segment> {
        self.inner.frame_window_by(frame, |s| s.status != SegmentStatus::Incorrect)
    }

    /// Builds a manual segment from the end of `t1` to the start of `t2`.
    /// The id is assigned by [`SegmentStore::append_segment`].
    pub fn create_segment(&self, t1: &Trajectory, t2: &Trajectory) -> Segment {
        if t2.frame_in < t1.frame_out {
            warn!(
                "connecting trajectory {} (ends {}) to {} (starts {}) goes back in time",
                t1.id, t1.frame_out, t2.id, t2.frame_in
            );
        }

        let (x1, y1) = t1.last_point();
        let (x2, y2) = t2.first_point();
        Segment {
            id: self.next_id,
            xs: vec![x1, x2],
            ys: vec![y1, y2],
            class: MANUAL_SEGMENT_CLASS,
            frame_in: t1.frame_out,
            frame_out: t2.frame_in,
            status: SegmentStatus::Correct,
            is_manual: true,
            comments: BTreeSet::new(),
        }
    }

    /// Inserts the segment under a fresh id and returns that id.
    pub fn append_segment(&mut self, mut segment: Segment) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        segment.id = id;
        self.inner.insert(segment);
        id
    }

    /// Labels the given segments. Manual segments are deleted whatever the
    /// requested status; comments are kept only for incorrect segments.
    /// Nothing is changed when any id is unknown.
    pub fn set_status<I, S>(
        &mut self,
        status: SegmentStatus,
        comments: I,
        ids: &[u64],
    ) -> AnnotationResult<StatusChange>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(&missing) = ids.iter().find(|id| !self.inner.contains(**id)) {
            return Err(AnnotationError::NotFound {
                entity: Entity::Segment,
                id: missing,
            });
        }

        let comments: BTreeSet<String> = if status == SegmentStatus::Incorrect {
            comments.into_iter().map(Into::into).collect()
        } else {
            BTreeSet::new()
        };

        let mut change = StatusChange::default();
        for &id in ids {
            let Some(segment) = self.inner.get_mut(id) else {
                // Listed twice and already removed.
                continue;
            };

            if segment.is_manual {
                self.inner.remove(id);
                change.removed.push(id);
                continue;
            }

            segment.status = status;
            segment.comments = comments.clone();
            change.updated.push(id);
        }

        info!(
            "Set status {} on {} segments, removed {} manual segments",
            status,
            change.updated.len(),
            change.removed.len()
        );
        Ok(change)
    }

    pub fn by_status(&self, status: SegmentStatus) -> Vec<&Segment> {
        self.inner.iter().filter(|s| s.status == status).collect()
    }

    pub fn new_segments(&self) -> Vec<&Segment> {
        self.inner.iter().filter(|s| s.is_manual).collect()
    }

    /// Number of segments produced by the algorithm.
    pub fn total_count(&self) -> usize {
        self.inner.iter().filter(|s| !s.is_manual).count()
    }

    pub fn correct_count(&self) -> usize {
        self.count_algorithmic(SegmentStatus::Correct)
    }

    pub fn incorrect_count(&self) -> usize {
        self.count_algorithmic(SegmentStatus::Incorrect)
    }

    pub fn new_count(&self) -> usize {
        self.inner.iter().filter(|s| s.is_manual).count()
    }

    /// Share of algorithmic segments labeled correct; `None` while there are
    /// no algorithmic segments at all.
    pub fn correct_ratio(&self) -> Option<f64> {
        let total = self.total_count();
        if total == 0 {
            return None;
        }
        Some(self.correct_count() as f64 / total as f64)
    }

    pub fn stats(&self) -> SegmentStats {
        SegmentStats {
            total: self.total_count(),
            correct: self.correct_count(),
            incorrect: self.incorrect_count(),
            new: self.new_count(),
            correct_ratio: self.correct_ratio(),
        }
    }

    /// Earliest `frame_in` after `after_frame` among unlabeled segments.
    pub fn find_next_interest(&self, after_frame: u64) -> AnnotationResult<u64> {
        self.inner
            .iter()
            .filter(|s| s.status == SegmentStatus::Unlabeled && s.frame_in > after_frame)
            .map(|s| s.frame_in)
            .min()
            .ok_or(AnnotationError::NoInterestAfter(after_frame))
    }

    fn count_algorithmic(&self, status: SegmentStatus) -> usize {
        self.inner
            .iter()
            .filter(|s| !s.is_manual && s.status == status)
            .count()
    }
}
