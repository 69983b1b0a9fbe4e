//! Flat CSV tables: the tracker's unannotated output on the way in, the full
//! annotated segment table on the way out.

mod table;

pub use table::{read_segments, read_trajectories, write_segments};
