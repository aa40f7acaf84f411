use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{debug, error};

use crate::inputs::SearchInputs;
use crate::solver::config::SearchConfig;
use crate::solver::constants::SEARCH_THREAD_NAME;
use crate::solver::controller::{CancellationToken, SearchController};
use crate::solver::errors::SearchError;
use crate::solver::report::SearchReport;

type Outcome = Result<SearchReport, SearchError>;

/// Caller side of a search running on a background thread
#[derive(Debug)]
pub struct SearchHandle {
    receiver: Receiver<Outcome>,
    cancel: CancellationToken,
    thread: Option<JoinHandle<()>>,
    taken: bool,
}

/// Validate the parameters and start the search on its own thread.
///
/// Returns as soon as the worker is running; the report is delivered
/// through the handle exactly once.
///
/// # Errors
///
/// Returns `SearchError::Validation` for invalid parameters (nothing is
/// started then) and `SearchError::Spawn` if the thread cannot be created.
pub fn spawn_search(inputs: SearchInputs, config: SearchConfig) -> Result<SearchHandle, SearchError> {
    let mut controller = SearchController::new(inputs, config)?;
    let cancel = controller.cancellation_token();
    let (sender, receiver) = mpsc::sync_channel::<Outcome>(1);

    let thread = thread::Builder::new()
        .name(SEARCH_THREAD_NAME.to_string())
        .spawn(move || {
            let outcome = controller.run().and_then(|_| controller.report());
            if let Err(e) = &outcome {
                error!("Search failed: {}", e);
            }
            if sender.send(outcome).is_err() {
                debug!("Search handle dropped before the report was delivered");
            }
        })?;

    Ok(SearchHandle {
        receiver,
        cancel,
        thread: Some(thread),
        taken: false,
    })
}

impl SearchHandle {
    /// Block until the search finishes and return its report
    ///
    /// # Errors
    ///
    /// Returns `AlreadyTaken` if the report was collected with
    /// [`SearchHandle::try_take`] and `Disconnected` if the worker died.
    pub fn wait(mut self) -> Result<SearchReport, SearchError> {
        if self.taken {
            return Err(SearchError::AlreadyTaken);
        }
        let outcome = self.receiver.recv().map_err(|_| SearchError::Disconnected);
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            error!("Search thread panicked");
        }
        outcome?
    }

    /// Collect the report if the search has finished, without blocking
    ///
    /// # Errors
    ///
    /// Returns `AlreadyTaken` after the report was collected once and
    /// `Disconnected` if the worker died without reporting.
    pub fn try_take(&mut self) -> Result<Option<SearchReport>, SearchError> {
        if self.taken {
            return Err(SearchError::AlreadyTaken);
        }
        match self.receiver.try_recv() {
            Ok(outcome) => {
                self.taken = true;
                outcome.map(Some)
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SearchError::Disconnected),
        }
    }

    /// Ask the search to stop; it reports its incumbent as if timed out
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }
}
