use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use super::{
    commands::Command,
    events::{AppEvent, ErrorEvent, EventSink, SavedEvent, StatsChangedEvent, ViewsChangedEvent},
};
use crate::{
    db::{Database, Dataset},
    export,
    models::{is_known_reason, SegmentStatus},
    navigation::NavigationController,
    selection::SelectionController,
    session,
    settings::AnnotatorSettings,
    store::{SegmentStore, TrajectoryStore},
};

/// Whether the event loop keeps reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Everything one annotation session works on.
pub struct AppState {
    pub trajectories: TrajectoryStore,
    pub segments: SegmentStore,
    pub selection: SelectionController,
    pub navigation: NavigationController,
}

impl AppState {
    pub fn from_dataset(dataset: Dataset, settings: &AnnotatorSettings) -> Result<Self> {
        let windows = settings.windows;
        let trajectories = TrajectoryStore::new(
            dataset.trajectories,
            windows.trajectory_lookahead,
            windows.candidate_window,
        )?;
        let segments = SegmentStore::new(
            dataset.segments,
            windows.segment_lookahead,
            dataset.next_segment_id,
        )?;

        let total_frames = settings
            .total_frames
            .or_else(|| trajectories.max_frame_out().map(|frame| frame + 1))
            .unwrap_or(1);
        let navigation = NavigationController::new(total_frames, settings.frames_per_minute());
        let selection =
            SelectionController::new(&trajectories, &segments, navigation.current_frame());

        Ok(Self {
            trajectories,
            segments,
            selection,
            navigation,
        })
    }

    /// Moves to `frame` and rebuilds every view. Any selection is dropped.
    fn show_frame(&mut self, frame: u64) {
        let frame = self.navigation.jump_to(frame);
        self.refresh_views(frame);
    }

    fn refresh_views(&mut self, frame: u64) {
        self.selection
            .refresh(&self.trajectories, &self.segments, frame);
    }
}

/// Single reducer for every user action. Taking `&mut self` means a command
/// is always fully applied before the next one starts.
pub struct AppController {
    state: AppState,
    db: Database,
    settings: AnnotatorSettings,
    uid: String,
    sink: Box<dyn EventSink>,
    dirty: bool,
}

impl AppController {
    pub fn new(
        state: AppState,
        db: Database,
        settings: AnnotatorSettings,
        uid: String,
        sink: Box<dyn EventSink>,
    ) -> Self {
        Self {
            state,
            db,
            settings,
            uid,
            sink,
            dirty: false,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn settings(&self) -> &AnnotatorSettings {
        &self.settings
    }

    /// True when annotations changed since the last save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub async fn dispatch(&mut self, command: Command) -> Result<Flow> {
        debug!("dispatching {command:?}");
        let mutates = command.mutates_segments();
        let state = &mut self.state;

        match command {
            Command::Select { target, id } => {
                state
                    .selection
                    .select(target, id, &state.trajectories, &state.segments)?;
            }
            Command::Clear => state.selection.clear(&state.trajectories),
            Command::Connect => {
                let created = state.selection.connect(
                    &state.trajectories,
                    &mut state.segments,
                    &mut state.navigation,
                )?;
                info!("Created {} manual segment(s): {created:?}", created.len());
            }
            Command::Correct => {
                let frame = state.navigation.current_frame();
                state.selection.apply_label(
                    SegmentStatus::Correct,
                    Vec::<String>::new(),
                    &state.trajectories,
                    &mut state.segments,
                    frame,
                )?;
            }
            Command::Incorrect(reasons) => {
                for reason in reasons.iter().filter(|r| !is_known_reason(r)) {
                    warn!("Non-standard incorrect reason '{reason}'");
                }
                let frame = state.navigation.current_frame();
                state.selection.apply_label(
                    SegmentStatus::Incorrect,
                    reasons,
                    &state.trajectories,
                    &mut state.segments,
                    frame,
                )?;
            }
            Command::Reset => {
                let frame = state.navigation.current_frame();
                state
                    .selection
                    .reset_label(&state.trajectories, &mut state.segments, frame)?;
            }
            Command::Tab(tab) => state.selection.set_active_tab(tab),
            Command::Jump(frame) => state.show_frame(frame),
            Command::Step(delta) => {
                let frame = state.navigation.step(delta);
                state.refresh_views(frame);
            }
            Command::StepSeconds(delta) => {
                let fps = i64::try_from(self.settings.fps).unwrap_or(i64::MAX);
                let frame = state.navigation.step(delta.saturating_mul(fps));
                state.refresh_views(frame);
            }
            Command::Minute(delta) => match state.navigation.step_minute(delta) {
                Some(frame) => state.refresh_views(frame),
                None => debug!("minute step {delta} leaves the video, staying put"),
            },
            Command::Next => match state.navigation.jump_to_next_interest(&state.segments) {
                Some(frame) => state.refresh_views(frame),
                None => info!(
                    "No unlabeled segment left after frame {}",
                    state.navigation.current_frame()
                ),
            },
            Command::Goto(id) => {
                let frame = state.segments.by_id(id)?.frame_in;
                state.show_frame(frame);
            }
            Command::Save => {
                self.save().await?;
                return Ok(Flow::Continue);
            }
            Command::Export(path) => {
                self.export(&path)?;
                return Ok(Flow::Continue);
            }
            Command::Stats => {
                self.emit_stats();
                return Ok(Flow::Continue);
            }
            Command::Quit => return Ok(Flow::Quit),
        }

        if mutates {
            self.dirty = true;
            self.emit_stats();
        }
        self.emit_views();
        Ok(Flow::Continue)
    }

    /// Writes the whole snapshot and remembers the uid for the next start.
    pub async fn save(&mut self) -> Result<()> {
        let trajectories = self.state.trajectories.iter().cloned().collect();
        let segments: Vec<_> = self.state.segments.iter().cloned().collect();
        let count = segments.len();

        self.db
            .save_dataset(trajectories, segments, self.state.segments.next_id())
            .await
            .with_context(|| format!("failed to save session {}", self.uid))?;
        session::remember_uid(&self.settings, &self.uid)?;
        self.dirty = false;

        info!("Saved {count} segments to {}", self.db.path().display());
        self.sink.emit(&AppEvent::Saved(SavedEvent {
            path: self.db.path().display().to_string(),
            segments: count,
        }));
        Ok(())
    }

    /// Periodic save. Failures are logged and left for the next tick.
    pub async fn autosave(&mut self) {
        if !self.dirty {
            debug!("autosave skipped, nothing changed");
            return;
        }
        if let Err(err) = self.save().await {
            error!("Autosave failed, retrying next tick: {err:?}");
        }
    }

    pub fn export(&mut self, path: &Path) -> Result<usize> {
        let written = export::write_segments(path, self.state.segments.iter())?;
        self.sink.emit(&AppEvent::Exported(SavedEvent {
            path: path.display().to_string(),
            segments: written,
        }));
        Ok(written)
    }

    pub fn report_error(&mut self, err: &anyhow::Error) {
        warn!("{err:#}");
        self.sink.emit(&AppEvent::Error(ErrorEvent {
            message: format!("{err:#}"),
        }));
    }

    /// Sends the full picture: views, controls and statistics.
    pub fn publish(&mut self) {
        self.emit_views();
        self.emit_stats();
    }

    fn emit_views(&mut self) {
        let selection = &self.state.selection;
        self.sink.emit(&AppEvent::ViewsChanged(ViewsChangedEvent {
            navigation: self.state.navigation.state(),
            mode: selection.mode(),
            selected_trajectories: selection.selected_trajectories(),
            selected_segments: selection.selected_segments(),
            views: selection.views(),
        }));
        self.sink.emit(&AppEvent::ControlsChanged(selection.controls()));
    }

    fn emit_stats(&mut self) {
        let stats = self.state.segments.stats();
        self.sink.emit(&AppEvent::StatsChanged(StatsChangedEvent {
            stats,
            text: stats.to_string(),
        }));
    }
}
