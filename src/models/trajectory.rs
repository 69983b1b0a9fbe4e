use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use super::FrameSpan;

/// A broken trajectory produced by the tracker. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trajectory {
    pub id: u64,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub class: u32,
    pub frame_in: u64,
    pub frame_out: u64,
}

impl Trajectory {
    /// Checks the loading invariants: a non-empty polyline with matching
    /// coordinate counts and an ordered frame span.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.xs.is_empty(),
            "trajectory {} has an empty polyline",
            self.id
        );
        ensure!(
            self.xs.len() == self.ys.len(),
            "trajectory {} has {} xs but {} ys",
            self.id,
            self.xs.len(),
            self.ys.len()
        );
        ensure!(
            self.frame_in <= self.frame_out,
            "trajectory {} starts at frame {} after it ends at {}",
            self.id,
            self.frame_in,
            self.frame_out
        );
        Ok(())
    }

    pub fn first_point(&self) -> (f64, f64) {
        (self.xs[0], self.ys[0])
    }

    pub fn last_point(&self) -> (f64, f64) {
        let last = self.xs.len() - 1;
        (self.xs[last], self.ys[last])
    }
}

impl FrameSpan for Trajectory {
    fn id(&self) -> u64 {
        self.id
    }

    fn frame_in(&self) -> u64 {
        self.frame_in
    }

    fn frame_out(&self) -> u64 {
        self.frame_out
    }
}
