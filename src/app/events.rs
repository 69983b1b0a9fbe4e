use std::io::{self, Write};

use log::error;
use serde::Serialize;

use crate::{
    navigation::NavigationState,
    selection::{Controls, SelectionMode, ViewSet},
    store::SegmentStats,
};

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ViewsChangedEvent<'a> {
    pub navigation: NavigationState,
    pub mode: SelectionMode,
    pub selected_trajectories: &'a [u64],
    pub selected_segments: &'a [u64],
    pub views: &'a ViewSet,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StatsChangedEvent {
    pub stats: SegmentStats,
    pub text: String,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SavedEvent {
    pub path: String,
    pub segments: usize,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    pub message: String,
}

/// Everything the rendering side is told after a command.
#[derive(Serialize, Clone)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum AppEvent<'a> {
    ViewsChanged(ViewsChangedEvent<'a>),
    ControlsChanged(Controls),
    StatsChanged(StatsChangedEvent),
    Saved(SavedEvent),
    Exported(SavedEvent),
    Error(ErrorEvent),
}

impl AppEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::ViewsChanged(_) => "views-changed",
            AppEvent::ControlsChanged(_) => "controls-changed",
            AppEvent::StatsChanged(_) => "stats-changed",
            AppEvent::Saved(_) => "saved",
            AppEvent::Exported(_) => "exported",
            AppEvent::Error(_) => "error",
        }
    }
}

pub trait EventSink: Send {
    fn emit(&mut self, event: &AppEvent<'_>);
}

/// Writes one JSON object per line.
pub struct StdoutSink;

impl EventSink for StdoutSink {
    fn emit(&mut self, event: &AppEvent<'_>) {
        let mut stdout = io::stdout().lock();
        let result = serde_json::to_writer(&mut stdout, event)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(stdout))
            .and_then(|()| stdout.flush());
        if let Err(err) = result {
            error!("Failed to emit {}: {err}", event.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_name() {
        let event = AppEvent::Error(ErrorEvent {
            message: "segment 4 not found".into(),
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], event.name());
        assert_eq!(value["payload"]["message"], "segment 4 not found");

        let value = serde_json::to_value(AppEvent::ControlsChanged(Controls::default())).unwrap();
        assert_eq!(value["event"], "controls-changed");
        assert_eq!(value["payload"]["connect"], false);
    }
}
