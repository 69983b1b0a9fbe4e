pub mod dataset;
pub mod segments;
pub mod trajectories;
