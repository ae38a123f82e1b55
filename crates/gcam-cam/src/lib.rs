pub mod compensation;
pub mod corner;
pub mod error;
pub mod hexagon;
pub mod leadin;
pub mod multipass;
pub mod pattern;
pub mod safety;
pub mod tube_void;

pub use compensation::{compensate_path, compensation_offset, cut_radius};
pub use corner::{corner_feed_factor, identify_corners, path_corner_factors, segment_angle, Corner};
pub use error::CamError;
pub use hexagon::{apothem, circumradius, compensated_vertices, hexagon_vertices};
pub use leadin::{
    circle_lead_in_point, hexagon_lead_in_point, lead_in_distance, line_lead_in_point,
    helix_radius_for_circle, helix_radius_for_hexagon, helix_revolutions, helix_start_point,
    helical_step_feed, MIN_HELIX_RADIUS,
};
pub use multipass::{iter_passes, num_passes, Pass};
pub use pattern::{expand_operations, ExpandedOperations};
pub use safety::{standard_chain, Adjuster, ArcSlowdownAdjuster, CornerSlowdownAdjuster, FeedContext, FirstPassAdjuster, SafetyChain};
pub use tube_void::{filter_for_tube, FilteredOperations};
