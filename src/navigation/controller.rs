use log::debug;
use serde::Serialize;

use crate::store::SegmentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub current_frame: u64,
    pub current_minute: u64,
    /// Half-open `[window_start, window_end)` range of the active minute.
    pub window_start: u64,
    pub window_end: u64,
    pub total_frames: u64,
}

/// Tracks the current frame and the minute bucket that bounds frame scrubbing.
/// Out-of-range requests are clamped, never rejected.
#[derive(Debug, Clone)]
pub struct NavigationController {
    current_frame: u64,
    current_minute: u64,
    total_frames: u64,
    frames_per_minute: u64,
}

impl NavigationController {
    pub fn new(total_frames: u64, frames_per_minute: u64) -> Self {
        Self {
            current_frame: 0,
            current_minute: 0,
            total_frames: total_frames.max(1),
            frames_per_minute: frames_per_minute.max(1),
        }
    }

    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    pub fn current_minute(&self) -> u64 {
        self.current_minute
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Bucket holding the last frame of the video.
    pub fn max_minute(&self) -> u64 {
        (self.total_frames - 1) / self.frames_per_minute
    }

    pub fn minute_window(&self, minute: u64) -> (u64, u64) {
        let start = minute * self.frames_per_minute;
        let end = if minute >= self.max_minute() {
            self.total_frames
        } else {
            (minute + 1) * self.frames_per_minute
        };
        (start, end)
    }

    pub fn state(&self) -> NavigationState {
        let (window_start, window_end) = self.minute_window(self.current_minute);
        NavigationState {
            current_frame: self.current_frame,
            current_minute: self.current_minute,
            window_start,
            window_end,
            total_frames: self.total_frames,
        }
    }

    /// Moves to `frame`, clamped to the video, and returns the frame landed on.
    pub fn jump_to(&mut self, frame: u64) -> u64 {
        let frame = frame.min(self.total_frames - 1);
        self.current_frame = frame;
        self.current_minute = frame / self.frames_per_minute;
        frame
    }

    pub fn step(&mut self, delta_frames: i64) -> u64 {
        self.jump_to(self.current_frame.saturating_add_signed(delta_frames))
    }

    /// Switches to a neighbouring minute bucket. Moving forward lands on the
    /// bucket's first frame, moving back on its last one. Returns `None` when
    /// the target bucket is outside the video.
    pub fn step_minute(&mut self, delta_minutes: i64) -> Option<u64> {
        let next = self.current_minute.checked_add_signed(delta_minutes)?;
        if next > self.max_minute() {
            return None;
        }

        let (start, end) = self.minute_window(next);
        let target = if delta_minutes < 0 { end - 1 } else { start };
        Some(self.jump_to(target))
    }

    /// Jumps to the next unlabeled segment that starts after every segment
    /// currently on screen. Stays put when there is none.
    pub fn jump_to_next_interest(&mut self, segments: &SegmentStore) -> Option<u64> {
        let after = segments
            .frame_window(self.current_frame)
            .iter()
            .map(|s| s.frame_in)
            .max()
            .unwrap_or(self.current_frame);

        match segments.find_next_interest(after) {
            Ok(frame) => Some(self.jump_to(frame)),
            Err(err) => {
                debug!("staying on frame {}: {err}", self.current_frame);
                None
            }
        }
    }
}
