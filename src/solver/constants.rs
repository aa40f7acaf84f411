// Configuration constants for the search controller

/// A chain arena holding more nodes than this is rebuilt from its incumbent
pub const COMPACT_THRESHOLD: usize = 1 << 20;

/// Name of the background thread that runs asynchronous searches
pub const SEARCH_THREAD_NAME: &str = "eureka-search";

/// Expression text reported when no valid candidate was found
pub const NO_CANDIDATE: &str = "no candidate";

/// Result text reported when no valid candidate was found
pub const NO_VALUE: &str = "NaN";
