use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    segments::{read_segments, replace_segments},
    trajectories::{read_trajectories, replace_trajectories},
};
use crate::{
    db::{
        connection::Database,
        helpers::{parse_datetime, to_u64},
        models::Dataset,
    },
    models::{Segment, Trajectory},
};

const NEXT_SEGMENT_ID_KEY: &str = "next_segment_id";
const SAVED_AT_KEY: &str = "saved_at";

fn read_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM dataset_meta WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("failed to read dataset_meta {key}"))
}

impl Database {
    /// Replaces the whole snapshot in one transaction. Saving the same state
    /// twice leaves the file unchanged apart from `saved_at`.
    pub async fn save_dataset(
        &self,
        trajectories: Vec<Trajectory>,
        segments: Vec<Segment>,
        next_segment_id: u64,
    ) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            replace_trajectories(&tx, &trajectories)?;
            replace_segments(&tx, &segments)?;

            let mut stmt = tx.prepare(
                "INSERT INTO dataset_meta (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )?;
            stmt.execute(params![NEXT_SEGMENT_ID_KEY, next_segment_id.to_string()])?;
            stmt.execute(params![SAVED_AT_KEY, Utc::now().to_rfc3339()])?;
            drop(stmt);

            tx.commit().context("failed to commit dataset snapshot")?;
            Ok(())
        })
        .await
    }

    pub async fn load_dataset(&self) -> Result<Dataset> {
        self.execute(|conn| {
            let trajectories = read_trajectories(conn)?;
            let segments = read_segments(conn)?;

            let next_segment_id = read_meta(conn, NEXT_SEGMENT_ID_KEY)?
                .map(|raw| {
                    let value: i64 = raw
                        .parse()
                        .with_context(|| format!("invalid {NEXT_SEGMENT_ID_KEY} '{raw}'"))?;
                    to_u64(value, NEXT_SEGMENT_ID_KEY)
                })
                .transpose()?;
            let saved_at = read_meta(conn, SAVED_AT_KEY)?
                .map(|raw| parse_datetime(&raw, SAVED_AT_KEY))
                .transpose()?;

            Ok(Dataset {
                trajectories,
                segments,
                next_segment_id,
                saved_at,
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::{
        db::CURRENT_SCHEMA_VERSION,
        models::{SegmentStatus, MANUAL_SEGMENT_CLASS},
    };

    fn trajectory(id: u64, frame_in: u64, frame_out: u64) -> Trajectory {
        Trajectory {
            id,
            xs: vec![1.0, 2.5],
            ys: vec![3.0, 4.5],
            class: 2,
            frame_in,
            frame_out,
        }
    }

    fn labeled_segments() -> Vec<Segment> {
        vec![
            Segment {
                id: 1,
                xs: vec![2.5, 7.0],
                ys: vec![4.5, 9.0],
                class: 2,
                frame_in: 100,
                frame_out: 150,
                status: SegmentStatus::Incorrect,
                is_manual: false,
                comments: BTreeSet::from(["other".to_string(), "large distance".to_string()]),
            },
            Segment {
                id: 7,
                xs: vec![0.0, 1.0],
                ys: vec![0.0, 1.0],
                class: MANUAL_SEGMENT_CLASS,
                frame_in: 200,
                frame_out: 250,
                status: SegmentStatus::Correct,
                is_manual: true,
                comments: BTreeSet::new(),
            },
        ]
    }

    #[tokio::test]
    async fn saved_dataset_loads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.sqlite3");
        let db = Database::new(path.clone()).unwrap();

        let trajectories = vec![trajectory(0, 0, 100), trajectory(1, 150, 300)];
        let segments = labeled_segments();
        db.save_dataset(trajectories.clone(), segments.clone(), 8)
            .await
            .unwrap();
        drop(db);

        let db = Database::new(path).unwrap();
        let dataset = db.load_dataset().await.unwrap();
        assert_eq!(dataset.trajectories, trajectories);
        assert_eq!(dataset.segments, segments);
        assert_eq!(dataset.next_segment_id, Some(8));
        assert!(dataset.saved_at.is_some());
    }

    #[tokio::test]
    async fn saving_replaces_previous_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("user.sqlite3")).unwrap();

        db.save_dataset(vec![trajectory(0, 0, 10)], labeled_segments(), 8)
            .await
            .unwrap();
        let mut segments = labeled_segments();
        segments.pop();
        db.save_dataset(vec![trajectory(0, 0, 10)], segments.clone(), 8)
            .await
            .unwrap();

        let dataset = db.load_dataset().await.unwrap();
        assert_eq!(dataset.segments, segments);
    }

    #[tokio::test]
    async fn empty_snapshot_has_no_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("fresh.sqlite3")).unwrap();
        let dataset = db.load_dataset().await.unwrap();
        assert_eq!(dataset, Dataset::default());
    }

    #[tokio::test]
    async fn version_one_files_get_annotation_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.sqlite3");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(include_str!("../schemas/schema_v1.sql"))
                .unwrap();
            conn.pragma_update(None, "user_version", 1).unwrap();
            conn.execute(
                "INSERT INTO segments (id, xs, ys, class, frame_in, frame_out)
                 VALUES (3, '[1.0,2.0]', '[3.0,4.0]', 1, 10, 20)",
                [],
            )
            .unwrap();
        }

        let db = Database::new(path.clone()).unwrap();
        let dataset = db.load_dataset().await.unwrap();
        assert_eq!(dataset.segments.len(), 1);
        let segment = &dataset.segments[0];
        assert_eq!(segment.status, SegmentStatus::Unlabeled);
        assert!(!segment.is_manual);
        assert!(segment.comments.is_empty());
        assert_eq!(dataset.next_segment_id, None);
        drop(db);

        let conn = Connection::open(&path).unwrap();
        let version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, CURRENT_SCHEMA_VERSION);
    }
}
