use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use crate::VideoAnalysis;
use crate::error::Error;

/// Progress of the current analysis request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnalysisState {
    #[default]
    Idle,
    Loading,
    Success(VideoAnalysis),
    Failure(Error),
}

impl AnalysisState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AnalysisState::Loading)
    }

    pub fn data(&self) -> Option<&VideoAnalysis> {
        match self {
            AnalysisState::Success(analysis) => Some(analysis),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            AnalysisState::Failure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Result<VideoAnalysis, Error>> for AnalysisState {
    fn from(result: Result<VideoAnalysis, Error>) -> Self {
        match result {
            Ok(analysis) => AnalysisState::Success(analysis),
            Err(err) => AnalysisState::Failure(err),
        }
    }
}

/// Identifies one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Hands out request tokens; only the newest one is current.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token, superseding every earlier one
    pub fn next(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

/// Analysis state plus the tracker enforcing "last request wins"
#[derive(Debug, Default)]
pub struct Session {
    state: AnalysisState,
    tracker: RequestTracker,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    /// Start a request: state goes to loading and the returned token
    /// supersedes any request still in flight.
    pub fn begin(&mut self) -> RequestToken {
        let token = self.tracker.next();
        debug!("Request {token:?} started");
        self.state = AnalysisState::Loading;
        token
    }

    /// Apply a finished request's result if it is still the newest one.
    ///
    /// Returns whether the result was applied; stale results are dropped.
    pub fn finish(&mut self, token: RequestToken, result: Result<VideoAnalysis, Error>) -> bool {
        if !self.tracker.is_current(token) {
            debug!("Discarding stale result for request {token:?}");
            return false;
        }
        self.state = result.into();
        true
    }
}
