mod great_circle;
mod station;

pub(crate) use great_circle::normalize_deg;
pub use great_circle::{bearing_deg, distance_nm, is_valid_position};
pub use station::Station;
