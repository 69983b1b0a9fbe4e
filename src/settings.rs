use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const CONFIG_PATH_VAR: &str = "ANNOTATOR_CONFIG";
pub const DATA_DIR_VAR: &str = "ANNOTATOR_DATA_DIR";
pub const DEFAULT_CONFIG_PATH: &str = "annotator.json";

pub const DEFAULT_TRAJECTORY_LOOKAHEAD: u64 = 400;
pub const DEFAULT_SEGMENT_LOOKAHEAD: u64 = 400;
pub const DEFAULT_CANDIDATE_WINDOW: u64 = 900;

/// How long entities stay visible and how far ahead candidates are searched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct FrameWindows {
    pub trajectory_lookahead: u64,
    pub segment_lookahead: u64,
    pub candidate_window: u64,
}

impl Default for FrameWindows {
    fn default() -> Self {
        Self {
            trajectory_lookahead: DEFAULT_TRAJECTORY_LOOKAHEAD,
            segment_lookahead: DEFAULT_SEGMENT_LOOKAHEAD,
            candidate_window: DEFAULT_CANDIDATE_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AnnotatorSettings {
    pub data_dir: PathBuf,
    pub trajectories_file: String,
    pub segments_file: String,
    pub uid_file: String,
    pub fps: u64,
    /// Falls back to the last trajectory frame when the video length is unknown.
    pub total_frames: Option<u64>,
    pub windows: FrameWindows,
    pub autosave_secs: u64,
}

impl Default for AnnotatorSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            trajectories_file: "broken_trajectories.csv".into(),
            segments_file: "segments.csv".into(),
            uid_file: ".annotator_uid".into(),
            fps: 30,
            total_frames: None,
            windows: FrameWindows::default(),
            autosave_secs: 60,
        }
    }
}

impl AnnotatorSettings {
    /// Reads settings from `path`. A missing file yields the defaults, and so
    /// does a file that cannot be parsed (with a warning).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        match serde_json::from_str(&contents) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                warn!(
                    "Ignoring malformed settings file {}: {err}",
                    path.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// Loads from `ANNOTATOR_CONFIG` (or `annotator.json`) and applies the
    /// environment overrides.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut settings = Self::load(&path)?;
        if let Ok(data_dir) = std::env::var(DATA_DIR_VAR) {
            settings.data_dir = PathBuf::from(data_dir);
        }
        Ok(settings)
    }

    pub fn trajectories_path(&self) -> PathBuf {
        self.data_dir.join(&self.trajectories_file)
    }

    pub fn segments_path(&self) -> PathBuf {
        self.data_dir.join(&self.segments_file)
    }

    pub fn uid_path(&self) -> PathBuf {
        self.data_dir.join(&self.uid_file)
    }

    /// Snapshot file holding one user's annotation progress.
    pub fn snapshot_path(&self, uid: &str) -> PathBuf {
        self.data_dir.join(format!("{uid}.sqlite3"))
    }

    pub fn frames_per_minute(&self) -> u64 {
        self.fps.max(1) * 60
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_secs.max(1))
    }
}
