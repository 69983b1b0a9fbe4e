use anyhow::{bail, Context, Result};

use super::FrameIndexedStore;
use crate::{
    error::{AnnotationError, AnnotationResult, Entity},
    models::Trajectory,
};

/// Read-only table of broken trajectories.
#[derive(Debug, Clone)]
pub struct TrajectoryStore {
    inner: FrameIndexedStore<Trajectory>,
    candidate_window: u64,
}

impl TrajectoryStore {
    pub fn new(
        trajectories: Vec<Trajectory>,
        lookahead: u64,
        candidate_window: u64,
    ) -> Result<Self> {
        let mut inner = FrameIndexedStore::new(lookahead);
        for trajectory in trajectories {
            trajectory
                .validate()
                .context("invalid trajectory in input table")?;
            let id = trajectory.id;
            if inner.insert(trajectory).is_some() {
                bail!("duplicate trajectory id {id}");
            }
        }

        Ok(Self {
            inner,
            candidate_window,
        })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trajectory> {
        self.inner.iter()
    }

    pub fn lookahead(&self) -> u64 {
        self.inner.lookahead()
    }

    /// Last frame covered by any trajectory, if there is one.
    pub fn max_frame_out(&self) -> Option<u64> {
        self.inner.iter().map(|t| t.frame_out).max()
    }

    /// Trajectories visible at `frame`, ascending by id.
    pub fn frame_window(&self, frame: u64) -> Vec<&Trajectory> {
        self.inner.frame_window_by(frame, |_| true)
    }

    pub fn by_id(&self, id: u64) -> AnnotationResult<&Trajectory> {
        self.inner.get(id).ok_or(AnnotationError::NotFound {
            entity: Entity::Trajectory,
            id,
        })
    }

    /// The anchor trajectory followed by every trajectory that starts at or
    /// after the anchor's end and ends within the candidate window.
    pub fn candidates_for(&self, id: u64) -> AnnotationResult<Vec<&Trajectory>> {
        let anchor = self.by_id(id)?;
        let horizon = anchor.frame_out.saturating_add(self.candidate_window);

        let mut candidates = vec![anchor];
        candidates.extend(self.inner.iter().filter(|t| {
            t.id != anchor.id && t.frame_in >= anchor.frame_out && t.frame_out <= horizon
        }));
        Ok(candidates)
    }
}
