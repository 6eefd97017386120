use crate::fiber::QueryResult;
use crate::picker::event::FrameId;

/// State of one inspection, from activation to deactivation
///
/// Created on activate and dropped on deactivate, so nothing leaks from one session into the
/// next. Events stamped with another session's epoch are stale.
#[derive(Debug)]
pub struct Session {
    epoch: u64,

    /// A query is in flight; further pointer samples only update `pointer`
    pub pending_query: bool,

    /// Result of the most recent answered query
    pub latest: Option<QueryResult>,

    /// Most recent pointer position
    pub pointer: Option<(f64, f64)>,

    /// Outstanding animation frame request
    pub frame: Option<FrameId>,

    /// A clipboard write has started; clicks are ignored until the session ends
    pub copying: bool,
}

impl Session {
    pub fn new(epoch: u64) -> Self {
        Self { epoch, pending_query: false, latest: None, pointer: None, frame: None, copying: false }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The cached result has something to copy
    pub fn has_components(&self) -> bool {
        self.latest.as_ref().is_some_and(|r| !r.components.is_empty())
    }
}
