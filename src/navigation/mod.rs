pub mod controller;

pub use controller::{NavigationController, NavigationState};
