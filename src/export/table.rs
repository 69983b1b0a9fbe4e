use std::{collections::BTreeSet, fs::File, io, path::Path};

use anyhow::{Context, Result};
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    db::helpers::{decode_comments, decode_list, encode_list},
    models::{Segment, SegmentStatus, Trajectory},
};

#[derive(Debug, Deserialize)]
struct TrajectoryRow {
    id: u64,
    xs: String,
    ys: String,
    class: u32,
    frame_in: u64,
    frame_out: u64,
}

impl TrajectoryRow {
    fn into_trajectory(self) -> Result<Trajectory> {
        Ok(Trajectory {
            id: self.id,
            xs: decode_list(&self.xs, "xs")?,
            ys: decode_list(&self.ys, "ys")?,
            class: self.class,
            frame_in: self.frame_in,
            frame_out: self.frame_out,
        })
    }
}

/// Annotation columns are optional so raw tracker output loads as unlabeled.
#[derive(Debug, Serialize, Deserialize)]
struct SegmentRow {
    id: u64,
    xs: String,
    ys: String,
    class: u32,
    frame_in: u64,
    frame_out: u64,
    #[serde(default)]
    status: String,
    #[serde(default)]
    is_manual: String,
    #[serde(default)]
    comments: String,
}

impl SegmentRow {
    fn from_segment(segment: &Segment) -> Result<Self> {
        Ok(Self {
            id: segment.id,
            xs: encode_list(&segment.xs)?,
            ys: encode_list(&segment.ys)?,
            class: segment.class,
            frame_in: segment.frame_in,
            frame_out: segment.frame_out,
            status: segment.status.as_str().to_string(),
            is_manual: segment.is_manual.to_string(),
            comments: encode_list(&segment.comments)?,
        })
    }

    fn into_segment(self) -> Result<Segment> {
        let status: SegmentStatus = self.status.parse()?;
        let comments: BTreeSet<String> = decode_comments(&self.comments)?;
        Ok(Segment {
            id: self.id,
            xs: decode_list(&self.xs, "xs")?,
            ys: decode_list(&self.ys, "ys")?,
            class: self.class,
            frame_in: self.frame_in,
            frame_out: self.frame_out,
            status,
            is_manual: parse_flag(&self.is_manual),
            comments,
        })
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim(), "1" | "true" | "True" | "TRUE")
}

fn read_rows<R, T>(reader: R, source: &Path) -> Result<Vec<T>>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<T>()
        .enumerate()
        .map(|(index, row)| {
            row.with_context(|| format!("bad row {} in {}", index + 1, source.display()))
        })
        .collect()
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("failed to open {}", path.display()))
}

/// Loads the broken-trajectory table.
pub fn read_trajectories(path: &Path) -> Result<Vec<Trajectory>> {
    let rows: Vec<TrajectoryRow> = read_rows(open(path)?, path)?;
    let trajectories = rows
        .into_iter()
        .map(TrajectoryRow::into_trajectory)
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid trajectory list in {}", path.display()))?;
    info!("Read {} trajectories from {}", trajectories.len(), path.display());
    Ok(trajectories)
}

/// Loads a segment table. Missing `status`, `is_manual` or `comments`
/// columns default to an unlabeled algorithmic segment without comments.
pub fn read_segments(path: &Path) -> Result<Vec<Segment>> {
    let rows: Vec<SegmentRow> = read_rows(open(path)?, path)?;
    let segments = rows
        .into_iter()
        .map(SegmentRow::into_segment)
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid segment in {}", path.display()))?;
    info!("Read {} segments from {}", segments.len(), path.display());
    Ok(segments)
}

/// Writes every segment field, list columns as JSON arrays. The output reads
/// back through [`read_segments`] unchanged. Returns the number of rows.
pub fn write_segments<'a, I>(path: &Path, segments: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a Segment>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut written = 0;
    for segment in segments {
        writer
            .serialize(SegmentRow::from_segment(segment)?)
            .with_context(|| format!("failed to write segment {}", segment.id))?;
        written += 1;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;

    info!("Exported {written} segments to {}", path.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MANUAL_SEGMENT_CLASS;

    fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn raw_segments_load_as_unlabeled() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "segments.csv",
            "id,xs,ys,class,frame_in,frame_out\n\
             4,\"[1.0,2.0]\",\"[3.0,4.0]\",2,10,20\n",
        );

        let segments = read_segments(&path).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].status, SegmentStatus::Unlabeled);
        assert!(!segments[0].is_manual);
        assert!(segments[0].comments.is_empty());
        assert_eq!(segments[0].xs, vec![1.0, 2.0]);
    }

    #[test]
    fn trajectories_parse_list_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "broken_trajectories.csv",
            "id,xs,ys,class,frame_in,frame_out\n\
             0,\"[0.5, 1.5, 2.5]\",\"[1, 2, 3]\",1,0,100\n",
        );

        let trajectories = read_trajectories(&path).unwrap();
        assert_eq!(trajectories[0].xs, vec![0.5, 1.5, 2.5]);
        assert_eq!(trajectories[0].ys, vec![1.0, 2.0, 3.0]);
        assert_eq!(trajectories[0].frame_out, 100);
    }

    #[test]
    fn export_keeps_annotation_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("segments.csv");
        let segments = vec![
            Segment {
                id: 1,
                xs: vec![0.25, 1.0],
                ys: vec![2.0, 3.0],
                class: 3,
                frame_in: 5,
                frame_out: 9,
                status: SegmentStatus::Incorrect,
                is_manual: false,
                comments: BTreeSet::from(["wrong direction".to_string()]),
            },
            Segment {
                id: 2,
                xs: vec![1.0, 2.0],
                ys: vec![3.0, 4.0],
                class: MANUAL_SEGMENT_CLASS,
                frame_in: 9,
                frame_out: 12,
                status: SegmentStatus::Correct,
                is_manual: true,
                comments: BTreeSet::new(),
            },
        ];

        assert_eq!(write_segments(&path, &segments).unwrap(), 2);
        let contents = std::fs::read_to_string(&path).unwrap();
        let header = "id,xs,ys,class,frame_in,frame_out,status,is_manual,comments";
        assert!(contents.starts_with(header));
        assert_eq!(read_segments(&path).unwrap(), segments);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_trajectories(Path::new("/nonexistent/trajectories.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/trajectories.csv"));
    }
}
