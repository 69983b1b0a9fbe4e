pub mod controller;
pub mod state;
pub mod views;

pub use controller::SelectionController;
pub use state::{ActiveTab, Controls, SelectionMode, Target};
pub use views::{ViewRecord, ViewSet};
