mod path;
mod proximity;

pub use path::{chronological_path, should_draw_path};
pub use proximity::{DEFAULT_PROXIMITY_THRESHOLD_DEG, Grouping, group_by_proximity};
