//! # Async state machine
//!
//! Every hook tracks one `AsyncState<T>` and changes it only by feeding
//! `Action`s through [`reduce`].
//!
//! | Action | loading | data | error |
//! |--------|---------|------|-------|
//! | `Start { keep_data: true }` | `true` | unchanged | `None` |
//! | `Start { keep_data: false }` | `true` | `None` | `None` |
//! | `Succeed(t)` | `false` | `Some(t)` | `None` |
//! | `Fail(e)` | `false` | `None` | `Some(e)` |
//! | `Cancel` | `false` | unchanged | unchanged |
//!
//! Hooks always start with `keep_data: true`; clearing on start is only
//! reachable by calling [`reduce`] directly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::client::Failure;

/// The `{data, loading, error}` triple exposed by every hook
#[derive(Debug, Clone)]
pub struct AsyncState<T> {
    /// Result of the last successful call
    pub data: Option<T>,
    /// A call is outstanding
    pub loading: bool,
    /// Failure of the last call, as the client raised it
    pub error: Option<Failure>,
}

impl<T> AsyncState<T> {
    /// Empty state, optionally already marked as loading
    pub fn initial(loading: bool) -> Self {
        Self {
            data: None,
            loading,
            error: None,
        }
    }

    /// Coarse view of this state
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Failed
        } else if self.data.is_some() {
            Phase::Success
        } else {
            Phase::Idle
        }
    }
}

impl<T> Default for AsyncState<T> {
    fn default() -> Self {
        Self::initial(false)
    }
}

/// Coarse view of an `AsyncState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing requested yet, or the request was skipped
    Idle,
    /// A call is outstanding
    Loading,
    /// The last settled call succeeded
    Success,
    /// The last settled call failed
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone)]
pub enum Action<T> {
    /// A call was issued
    Start {
        /// Keep showing the previous data while loading
        keep_data: bool,
    },
    /// The call resolved
    Succeed(T),
    /// The call was rejected
    Fail(Failure),
    /// The call was dropped before it settled
    Cancel,
}

impl<T> Action<T> {
    /// Name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Start { .. } => "start",
            Action::Succeed(_) => "succeed",
            Action::Fail(_) => "fail",
            Action::Cancel => "cancel",
        }
    }
}

/// Apply `action` to `state`
pub fn reduce<T: Clone>(state: &AsyncState<T>, action: Action<T>) -> AsyncState<T> {
    match action {
        Action::Start { keep_data } => AsyncState {
            data: if keep_data { state.data.clone() } else { None },
            loading: true,
            error: None,
        },
        Action::Succeed(data) => AsyncState {
            data: Some(data),
            loading: false,
            error: None,
        },
        Action::Fail(error) => AsyncState {
            data: None,
            loading: false,
            error: Some(error),
        },
        Action::Cancel => AsyncState {
            data: state.data.clone(),
            loading: false,
            error: state.error.clone(),
        },
    }
}

/// Which completion wins when calls of one hook overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Only the most recently issued call may settle the state; earlier
    /// calls that finish late are dropped
    #[default]
    LatestRequest,
    /// Every completion is applied, so whichever finishes last wins even if
    /// it was issued first
    LastCompletion,
}
