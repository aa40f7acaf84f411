use thiserror::Error;

use crate::inputs::ValidationError;
use crate::solver::controller::SearchState;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid search parameters: {0}")]
    Validation(#[from] ValidationError),
    #[error("Failed to start the search thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Search worker stopped without delivering a result")]
    Disconnected,
    #[error("Search result was already taken")]
    AlreadyTaken,
    #[error("Operation not allowed while the search is {0:?}")]
    InvalidState(SearchState),
}
