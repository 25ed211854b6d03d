pub mod path_geometry;
pub mod scale_tree;
pub mod time_markers;
pub mod track_offset;

pub use path_geometry::{
    PathData, PathDirection, PathPoint, path_direction, space_at_time,
    split_segment_at_breakpoints,
};
pub use scale_tree::{NormalizedScale, Scale, ScaleExtent, ScaleTree, flat_steps};
pub use time_markers::{
    TimeAxisTimeZone, TimeMarker, compute_time_markers_in, compute_visible_time_markers,
};
pub use track_offset::{
    CoreTrackRange, TrackDirection, TrackOffset, find_path_position, find_track_section_offset,
    track_length_cumulative_sums,
};
