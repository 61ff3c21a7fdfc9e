mod map_cache;
mod state;

pub use map_cache::{MapCache, MapKey};
pub use state::{ComparisonMode, SessionState, StateError, StateSummary, ViewStage};
