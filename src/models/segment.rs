use std::{collections::BTreeSet, fmt, str::FromStr};

use anyhow::{anyhow, ensure, Result};
use serde::{Deserialize, Serialize};

use super::FrameSpan;

/// Category assigned to segments created by the annotator. It sits outside the
/// tracker's class range and only drives the display color.
pub const MANUAL_SEGMENT_CLASS: u32 = 8;

/// Reasons offered to the annotator when marking a segment as incorrect.
pub const INCORRECT_REASONS: [&str; 7] = [
    "lack of good connection",
    "large distance",
    "illegal maneuver",
    "wrong direction",
    "parked vehicle",
    "object misclassification",
    "other",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStatus {
    Correct,
    Incorrect,
    #[default]
    Unlabeled,
}

impl SegmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentStatus::Correct => "correct",
            SegmentStatus::Incorrect => "incorrect",
            SegmentStatus::Unlabeled => "unlabeled",
        }
    }
}

impl fmt::Display for SegmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentStatus {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "correct" => Ok(SegmentStatus::Correct),
            "incorrect" => Ok(SegmentStatus::Incorrect),
            "unlabeled" | "" => Ok(SegmentStatus::Unlabeled),
            other => Err(anyhow!("unknown segment status '{other}'")),
        }
    }
}

/// A connector between the end of one trajectory and the start of another.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: u64,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub class: u32,
    pub frame_in: u64,
    pub frame_out: u64,
    #[serde(default)]
    pub status: SegmentStatus,
    #[serde(default)]
    pub is_manual: bool,
    #[serde(default)]
    pub comments: BTreeSet<String>,
}

impl Segment {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.xs.len() == self.ys.len() && self.xs.len() >= 2,
            "segment {} needs matching xs/ys with at least two points",
            self.id
        );
        ensure!(
            !(self.is_manual && self.status == SegmentStatus::Incorrect),
            "manual segment {} cannot be labeled incorrect",
            self.id
        );
        ensure!(
            self.status == SegmentStatus::Incorrect || self.comments.is_empty(),
            "segment {} carries comments without being incorrect",
            self.id
        );
        // Manual connections may run backwards in time.
        ensure!(
            self.is_manual || self.frame_in <= self.frame_out,
            "segment {} starts at frame {} after it ends at {}",
            self.id,
            self.frame_in,
            self.frame_out
        );
        Ok(())
    }
}

impl FrameSpan for Segment {
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

/// Returns true when the reason is one of the predefined choices.
pub fn is_known_reason(reason: &str) -> bool {
    INCORRECT_REASONS.contains(&reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_its_own_names() {
        for status in [
            SegmentStatus::Correct,
            SegmentStatus::Incorrect,
            SegmentStatus::Unlabeled,
        ] {
            assert_eq!(status.as_str().parse::<SegmentStatus>().unwrap(), status);
        }
        assert_eq!("".parse::<SegmentStatus>().unwrap(), SegmentStatus::Unlabeled);
        assert!("maybe".parse::<SegmentStatus>().is_err());
    }

    #[test]
    fn annotation_fields_default_when_absent() {
        let raw = r#"{"id":3,"xs":[1.0,2.0],"ys":[3.0,4.0],"class":1,"frameIn":5,"frameOut":9}"#;
        let segment: Segment = serde_json::from_str(raw).unwrap();
        assert_eq!(segment.status, SegmentStatus::Unlabeled);
        assert!(!segment.is_manual);
        assert!(segment.comments.is_empty());
    }

    #[test]
    fn manual_segment_cannot_be_incorrect() {
        let segment = Segment {
            id: 1,
            xs: vec![0.0, 1.0],
            ys: vec![0.0, 1.0],
            class: MANUAL_SEGMENT_CLASS,
            frame_in: 1,
            frame_out: 2,
            status: SegmentStatus::Incorrect,
            is_manual: true,
            comments: BTreeSet::new(),
        };
        assert!(segment.validate().is_err());
    }

    #[test]
    fn reversed_frames_are_only_allowed_for_manual_segments() {
        let mut segment = Segment {
            id: 4,
            xs: vec![0.0, 1.0],
            ys: vec![0.0, 1.0],
            class: 2,
            frame_in: 300,
            frame_out: 250,
            status: SegmentStatus::Unlabeled,
            is_manual: false,
            comments: BTreeSet::new(),
        };
        let err = segment.validate().unwrap_err();
        assert!(err.to_string().contains("starts at frame 300 after it ends at 250"));

        segment.is_manual = true;
        segment.class = MANUAL_SEGMENT_CLASS;
        segment.status = SegmentStatus::Correct;
        assert!(segment.validate().is_ok());
    }

    #[test]
    fn known_reasons() {
        assert!(is_known_reason("large distance"));
        assert!(!is_known_reason("looks odd"));
    }
}
