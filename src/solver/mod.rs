pub mod config;
pub mod constants;
pub mod controller;
pub mod errors;
pub mod handle;
pub mod incumbent;
pub mod report;
pub mod score;

pub use config::{SearchConfig, deadline_from_seconds, tolerance_from_precision};
pub use controller::{
    CancellationToken, SearchController, SearchState, SearchStats, TerminationReason, search,
    search_with_cancellation,
};
pub use errors::SearchError;
pub use handle::{SearchHandle, spawn_search};
pub use incumbent::{Improvement, Incumbent, SharedIncumbent};
pub use report::SearchReport;
pub use score::{Score, distance};
