//! Per-user session: which annotator is working and which dataset they resume.

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use log::{info, warn};
use uuid::Uuid;

use crate::{
    db::{Database, Dataset},
    export,
    settings::AnnotatorSettings,
};

pub const UID_VAR: &str = "ANNOTATOR_UID";

/// Where a session's dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetOrigin {
    /// A snapshot previously saved under this uid.
    Snapshot,
    /// The canonical unannotated tables.
    Canonical,
}

pub struct Session {
    pub uid: String,
    pub db: Database,
    pub dataset: Dataset,
    pub origin: DatasetOrigin,
}

fn is_valid_uid(uid: &str) -> bool {
    !uid.is_empty()
        && uid
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// `ANNOTATOR_UID`, else the stored uid file, else a fresh random id.
pub fn resolve_uid(settings: &AnnotatorSettings) -> Result<String> {
    if let Ok(uid) = std::env::var(UID_VAR) {
        let uid = uid.trim().to_string();
        if !is_valid_uid(&uid) {
            bail!("{UID_VAR} must be a non-empty [A-Za-z0-9_-] token, got '{uid}'");
        }
        return Ok(uid);
    }

    let uid_path = settings.uid_path();
    match fs::read_to_string(&uid_path) {
        Ok(contents) => {
            let uid = contents.trim();
            if is_valid_uid(uid) {
                return Ok(uid.to_string());
            }
            warn!("Ignoring malformed uid file {}", uid_path.display());
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read uid file {}", uid_path.display()));
        }
    }

    Ok(Uuid::new_v4().to_string())
}

/// Stores `uid` so the next start resumes the same snapshot.
pub fn remember_uid(settings: &AnnotatorSettings, uid: &str) -> Result<PathBuf> {
    let uid_path = settings.uid_path();
    if let Some(parent) = uid_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&uid_path, uid)
        .with_context(|| format!("failed to write uid file {}", uid_path.display()))?;
    Ok(uid_path)
}

fn load_canonical(settings: &AnnotatorSettings) -> Result<Dataset> {
    Ok(Dataset {
        trajectories: export::read_trajectories(&settings.trajectories_path())?,
        segments: export::read_segments(&settings.segments_path())?,
        next_segment_id: None,
        saved_at: None,
    })
}

/// Opens the snapshot for `uid`. A snapshot that was never saved to falls
/// back to the canonical tables.
pub async fn open_session(settings: &AnnotatorSettings, uid: String) -> Result<Session> {
    let db = Database::new(settings.snapshot_path(&uid))?;
    let stored = db
        .load_dataset()
        .await
        .with_context(|| format!("failed to load snapshot {}", db.path().display()))?;

    let (dataset, origin) = if stored.saved_at.is_some() {
        info!(
            "Resuming session {uid}: {} segments saved at {}",
            stored.segments.len(),
            stored
                .saved_at
                .map(|at| at.to_rfc3339())
                .unwrap_or_default()
        );
        (stored, DatasetOrigin::Snapshot)
    } else {
        info!("Starting session {uid} from canonical tables");
        (load_canonical(settings)?, DatasetOrigin::Canonical)
    };

    Ok(Session {
        uid,
        db,
        dataset,
        origin,
    })
}
