#![allow(dead_code)]

use std::{
    collections::BTreeSet,
    fs,
    path::Path,
    sync::{Arc, Mutex},
};

use serde_json::Value;
use traj_annotator_lib::{
    app::{AppEvent, EventSink},
    models::{Segment, SegmentStatus, Trajectory},
    settings::AnnotatorSettings,
    store::{SegmentStore, TrajectoryStore},
};

pub fn trajectory(id: u64, frame_in: u64, frame_out: u64) -> Trajectory {
    Trajectory {
        id,
        xs: vec![id as f64, id as f64 + 5.0],
        ys: vec![10.0, 20.0],
        class: 1,
        frame_in,
        frame_out,
    }
}

pub fn segment(id: u64, frame_in: u64, frame_out: u64, status: SegmentStatus) -> Segment {
    Segment {
        id,
        xs: vec![0.0, 1.0],
        ys: vec![0.0, 1.0],
        class: 2,
        frame_in,
        frame_out,
        status,
        is_manual: false,
        comments: BTreeSet::new(),
    }
}

/// T1 ends at 100, T2 runs 150..300, T3 310..400, T4 is far in the future.
pub fn trajectories() -> Vec<Trajectory> {
    vec![
        trajectory(1, 0, 100),
        trajectory(2, 150, 300),
        trajectory(3, 310, 400),
        trajectory(4, 2000, 2100),
    ]
}

/// One labeled segment at 200 and unlabeled ones at 600 and 900.
pub fn segments() -> Vec<Segment> {
    vec![
        segment(10, 200, 220, SegmentStatus::Correct),
        segment(11, 600, 640, SegmentStatus::Unlabeled),
        segment(12, 900, 950, SegmentStatus::Unlabeled),
    ]
}

pub fn stores() -> (TrajectoryStore, SegmentStore) {
    (
        TrajectoryStore::new(trajectories(), 400, 900).unwrap(),
        SegmentStore::new(segments(), 400, None).unwrap(),
    )
}

pub fn settings_in(dir: &Path) -> AnnotatorSettings {
    AnnotatorSettings {
        data_dir: dir.to_path_buf(),
        total_frames: Some(5000),
        ..AnnotatorSettings::default()
    }
}

fn list(values: &[f64]) -> String {
    serde_json::to_string(values).unwrap()
}

/// Writes the fixture tables, segments with their annotation columns.
pub fn write_canonical_tables(settings: &AnnotatorSettings) {
    fs::create_dir_all(&settings.data_dir).unwrap();

    let mut rows = String::from("id,xs,ys,class,frame_in,frame_out\n");
    for t in trajectories() {
        rows.push_str(&format!(
            "{},\"{}\",\"{}\",{},{},{}\n",
            t.id,
            list(&t.xs),
            list(&t.ys),
            t.class,
            t.frame_in,
            t.frame_out
        ));
    }
    fs::write(settings.trajectories_path(), rows).unwrap();

    let mut rows = String::from("id,xs,ys,class,frame_in,frame_out,status,is_manual,comments\n");
    for s in segments() {
        rows.push_str(&format!(
            "{},\"{}\",\"{}\",{},{},{},{},{},[]\n",
            s.id,
            list(&s.xs),
            list(&s.ys),
            s.class,
            s.frame_in,
            s.frame_out,
            s.status,
            s.is_manual
        ));
    }
    fs::write(settings.segments_path(), rows).unwrap();
}

/// Keeps every emitted event as JSON for later inspection.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<Value>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<Value> {
        self.events.lock().unwrap().clone()
    }

    /// Payload of the most recent event called `name`.
    pub fn last(&self, name: &str) -> Option<Value> {
        self.events()
            .into_iter()
            .rev()
            .find(|event| event["event"] == name)
            .map(|event| event["payload"].clone())
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent<'_>) {
        let value = serde_json::to_value(event).unwrap();
        self.events.lock().unwrap().push(value);
    }
}
