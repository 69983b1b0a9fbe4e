//! Frame-indexed collections of trajectories and segments.
//!
//! Both stores share [`FrameIndexedStore`], which keeps entities ordered by id
//! and answers "what is visible at frame N" queries. An entity is visible from
//! its `frame_in` until `lookahead` frames after its `frame_out`, so a broken
//! trajectory stays selectable for a while after the tracker lost it.

use std::collections::BTreeMap;

use crate::models::FrameSpan;

pub mod segments;
pub mod style;
pub mod trajectories;

pub use segments::{SegmentStats, SegmentStore, StatusChange};
pub use style::{LineStyle, Styled};
pub use trajectories::TrajectoryStore;

#[derive(Debug, Clone)]
pub struct FrameIndexedStore<T> {
    items: BTreeMap<u64, T>,
    lookahead: u64,
}

impl<T: FrameSpan> FrameIndexedStore<T> {
    pub fn new(lookahead: u64) -> Self {
        Self {
            items: BTreeMap::new(),
            lookahead,
        }
    }

    pub fn lookahead(&self) -> u64 {
        self.lookahead
    }

    /// Inserts an item, returning the one previously stored under the same id.
    pub fn insert(&mut self, item: T) -> Option<T> {
        self.items.insert(item.id(), item)
    }

    pub fn remove(&mut self, id: u64) -> Option<T> {
        self.items.remove(&id)
    }

    pub fn get(&self, id: u64) -> Option<&T> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut T> {
        self.items.get_mut(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn max_id(&self) -> Option<u64> {
        self.items.keys().next_back().copied()
    }

    pub fn is_visible(&self, item: &T, frame: u64) -> bool {
        frame >= item.frame_in() && frame <= item.frame_out().saturating_add(self.lookahead)
    }

    /// Items visible at `frame` that also pass `keep`, in ascending id order.
    pub fn frame_window_by<F>(&self, frame: u64, keep: F) -> Vec<&T>
    where
        F: Fn(&T) -> bool,
    {
        self.items
            .values()
            .filter(|item| self.is_visible(item, frame) && keep(item))
            .collect()
    }
}
