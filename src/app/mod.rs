pub mod commands;
pub mod controller;
pub mod event_loop;
pub mod events;

pub use commands::Command;
pub use controller::{AppController, AppState, Flow};
pub use event_loop::{annotation_loop, spawn_stdin_reader};
pub use events::{AppEvent, EventSink, StdoutSink};
