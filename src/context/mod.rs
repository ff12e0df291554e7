//! The `context` module models the execution context of a publish call.
//!
//! A context represents the current virtual user and iteration. It is passed
//! explicitly to every publish call; a context without state cannot be used
//! for publishing.

mod state;

pub use state::{PublishStats, VuState};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    state: Option<Arc<VuState>>,
    cancel: CancellationToken,
}

impl ExecutionContext {
    pub fn new(state: VuState) -> Self {
        Self::from_shared(Arc::new(state))
    }

    /// Creates a context around state that is shared with other contexts,
    /// e.g. one context per iteration of the same virtual user.
    pub fn from_shared(state: Arc<VuState>) -> Self {
        Self {
            state: Some(state),
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a context whose cancellation is driven by `cancel`.
    pub fn with_cancellation(state: Arc<VuState>, cancel: CancellationToken) -> Self {
        Self {
            state: Some(state),
            cancel,
        }
    }

    /// A context with no virtual-user state attached.
    pub fn detached() -> Self {
        Self {
            state: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> Option<&Arc<VuState>> {
        self.state.as_ref()
    }

    /// A context sharing this context's state whose cancellation follows the
    /// parent's.
    pub fn child(&self) -> Self {
        Self {
            state: self.state.clone(),
            cancel: self.cancel.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Completes once the context is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}
