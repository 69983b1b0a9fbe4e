use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Which store the user is picking from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Target {
    Trajectory,
    Segment,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMode {
    #[default]
    Idle,
    TrajectorySelecting,
    SegmentSelecting,
}

/// Table the annotator is looking at next to the video.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ActiveTab {
    #[default]
    CurrentFrame,
    CorrectSegments,
    WrongSegments,
    NewSegments,
    Stats,
}

impl ActiveTab {
    /// Tabs listing segments that already carry a label.
    pub fn is_labeled_table(&self) -> bool {
        matches!(
            self,
            ActiveTab::CorrectSegments | ActiveTab::WrongSegments | ActiveTab::NewSegments
        )
    }
}

impl FromStr for ActiveTab {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "current" => Ok(ActiveTab::CurrentFrame),
            "correct" => Ok(ActiveTab::CorrectSegments),
            "wrong" => Ok(ActiveTab::WrongSegments),
            "new" => Ok(ActiveTab::NewSegments),
            "stats" => Ok(ActiveTab::Stats),
            other => Err(anyhow!("unknown tab '{other}'")),
        }
    }
}

/// Which controls are usable. Derived only from the selection and the tab.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Controls {
    pub connect: bool,
    pub correct: bool,
    pub incorrect: bool,
    pub reset_label: bool,
    pub reason_input_visible: bool,
}

impl Controls {
    pub fn for_selection(trajectories: usize, segments: usize, tab: ActiveTab) -> Self {
        let connect = trajectories >= 2 && segments == 0;
        let label = segments >= 1 && trajectories == 0;
        Self {
            connect,
            correct: label,
            incorrect: label,
            reset_label: label && tab.is_labeled_table(),
            reason_input_visible: label,
        }
    }
}
