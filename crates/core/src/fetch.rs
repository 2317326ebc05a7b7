//! Request lifecycle for one asynchronous flow (report fetch, narrative generation).
//!
//! Every `begin` hands out a fresh [`RequestId`]. Only the completion carrying the most
//! recently issued id is applied; older completions are reported as stale and dropped.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

#[derive(Debug, Clone)]
pub struct FetchTracker<T> {
    state: FetchState<T>,
    issued: u64,
}

impl<T> Default for FetchTracker<T> {
    fn default() -> Self {
        Self {
            state: FetchState::Idle,
            issued: 0,
        }
    }
}

impl<T> FetchTracker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn latest_request(&self) -> Option<RequestId> {
        (self.issued > 0).then_some(RequestId(self.issued))
    }

    /// Enters `Loading` and returns the id the eventual completion must carry.
    ///
    /// Calling this while already loading keeps a single loading state; the earlier
    /// request becomes stale.
    pub fn begin(&mut self) -> RequestId {
        self.issued += 1;
        self.state = FetchState::Loading;
        RequestId(self.issued)
    }

    /// Re-enters `Loading` from `Error` only.
    pub fn retry(&mut self) -> Option<RequestId> {
        match self.state {
            FetchState::Error(_) => Some(self.begin()),
            _ => None,
        }
    }

    /// Clears an error banner.
    pub fn dismiss_error(&mut self) -> bool {
        if matches!(self.state, FetchState::Error(_)) {
            self.state = FetchState::Idle;
            true
        } else {
            false
        }
    }

    /// Back to `Idle`. A request still in flight becomes stale; the id sequence carries on.
    pub fn reset(&mut self) {
        self.state = FetchState::Idle;
    }

    pub fn complete<E: fmt::Display>(&mut self, id: RequestId, result: Result<T, E>) -> Completion {
        if id.0 != self.issued || !self.state.is_loading() {
            return Completion::Stale;
        }

        self.state = match result {
            Ok(data) => FetchState::Success(data),
            Err(err) => FetchState::Error(error_message(&err)),
        };
        Completion::Applied
    }
}

fn error_message<E: fmt::Display>(err: &E) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        "request failed".to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_idle_loading_success() {
        let mut t = FetchTracker::<u32>::new();
        assert_eq!(t.state(), &FetchState::Idle);
        let id = t.begin();
        assert!(t.state().is_loading());
        assert_eq!(t.complete::<String>(id, Ok(7)), Completion::Applied);
        assert_eq!(t.state().data(), Some(&7));
    }

    #[test]
    fn stale_completion_cannot_overwrite_newer_data() {
        let mut t = FetchTracker::<&str>::new();
        let old = t.begin();
        let new = t.begin();
        assert!(t.state().is_loading());

        assert_eq!(t.complete::<String>(new, Ok("fresh")), Completion::Applied);
        assert_eq!(t.complete::<String>(old, Ok("stale")), Completion::Stale);
        assert_eq!(t.state().data(), Some(&"fresh"));
    }

    #[test]
    fn stale_error_is_dropped_while_newer_request_loads() {
        let mut t = FetchTracker::<u8>::new();
        let old = t.begin();
        let new = t.begin();
        assert_eq!(t.complete(old, Err::<u8, _>("boom")), Completion::Stale);
        assert!(t.state().is_loading());
        assert_eq!(t.latest_request(), Some(new));
    }

    #[test]
    fn retry_only_leaves_error() {
        let mut t = FetchTracker::<u8>::new();
        assert!(t.retry().is_none());

        let id = t.begin();
        t.complete(id, Err::<u8, _>("HTTP 502"));
        assert_eq!(t.state().error(), Some("HTTP 502"));

        let retry = t.retry().unwrap();
        assert!(retry > id);
        assert!(t.state().is_loading());
        assert!(t.state().error().is_none());
        assert!(t.retry().is_none());
    }

    #[test]
    fn empty_error_messages_get_a_fallback() {
        let mut t = FetchTracker::<u8>::new();
        let id = t.begin();
        t.complete(id, Err::<u8, _>("   "));
        assert_eq!(t.state().error(), Some("request failed"));
    }

    #[test]
    fn dismiss_returns_to_idle() {
        let mut t = FetchTracker::<u8>::new();
        assert!(!t.dismiss_error());
        let id = t.begin();
        t.complete(id, Err::<u8, _>("nope"));
        assert!(t.dismiss_error());
        assert_eq!(t.state(), &FetchState::Idle);
    }
}
