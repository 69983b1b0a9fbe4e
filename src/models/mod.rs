pub mod segment;
pub mod trajectory;

pub use segment::{
    is_known_reason, Segment, SegmentStatus, INCORRECT_REASONS, MANUAL_SEGMENT_CLASS,
};
pub use trajectory::Trajectory;

/// Entities that occupy an inclusive range of video frames.
pub trait FrameSpan {
    fn id(&self) -> u64;
    fn frame_in(&self) -> u64;
    fn frame_out(&self) -> u64;
}
