mod beam;
mod distribution;
mod filter;

pub use beam::{beam_width, BeamWidthStats};
pub use distribution::DistanceDistribution;
pub use filter::{DistanceBounds, FilteredView};
