use chrono::{DateTime, Utc};

use crate::models::{Segment, Trajectory};

/// Full contents of one snapshot file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub trajectories: Vec<Trajectory>,
    pub segments: Vec<Segment>,
    /// Id the next manual segment will get. Absent in files that were never
    /// saved by the annotator.
    pub next_segment_id: Option<u64>,
    pub saved_at: Option<DateTime<Utc>>,
}
