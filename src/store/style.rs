use serde::Serialize;

use crate::models::{Segment, SegmentStatus, Trajectory};

/// Colors indexed by trajectory class.
pub const CLASS_PALETTE: [&str; 9] = [
    "red", "magenta", "green", "orange", "cyan", "yellow", "blue", "black", "navy",
];

pub const CANDIDATE_COLOR: &str = "brown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStyle {
    pub line_color: &'static str,
    pub line_dash: &'static str,
}

impl LineStyle {
    pub const fn solid(color: &'static str) -> Self {
        Self {
            line_color: color,
            line_dash: "solid",
        }
    }

    pub fn for_class(class: u32) -> Self {
        Self::solid(CLASS_PALETTE[class as usize % CLASS_PALETTE.len()])
    }

    pub fn for_status(status: SegmentStatus) -> Self {
        match status {
            SegmentStatus::Correct => Self::solid("navy"),
            SegmentStatus::Unlabeled => Self {
                line_color: "red",
                line_dash: "dashed",
            },
            SegmentStatus::Incorrect => Self {
                line_color: "gray",
                line_dash: "dotted",
            },
        }
    }

    pub const fn candidate() -> Self {
        Self::solid(CANDIDATE_COLOR)
    }
}

/// Default rendering style of an entity kind.
pub trait Styled {
    fn line_style(&self) -> LineStyle;
}

impl Styled for Trajectory {
    fn line_style(&self) -> LineStyle {
        LineStyle::for_class(self.class)
    }
}

impl Styled for Segment {
    fn line_style(&self) -> LineStyle {
        LineStyle::for_status(self.status)
    }
}
