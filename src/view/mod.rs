mod hover;
mod map_view;
mod search;
mod selection;

pub use hover::HoverPreview;
pub use map_view::{MapView, ViewSnapshot};
pub use search::SearchDispatcher;
pub use selection::Selection;
