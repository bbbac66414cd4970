//! Mock source sync for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::source::{SourceError, SourceSync};

/// Mock implementation of [`SourceSync`].
///
/// Resolves every checkout to a fixed revision unless scripted to fail, and
/// records how it was called.
pub struct MockSourceSync {
    revision: String,
    fail_checkout: Arc<RwLock<Option<String>>>,
    delay: Arc<RwLock<Option<Duration>>>,
    ensure_calls: Arc<RwLock<usize>>,
    checkout_calls: Arc<RwLock<Vec<String>>>,
}

impl MockSourceSync {
    /// Creates a mock resolving every ref to `revision`.
    pub fn new(revision: impl Into<String>) -> Self {
        Self {
            revision: revision.into(),
            fail_checkout: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(None)),
            ensure_calls: Arc::new(RwLock::new(0)),
            checkout_calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Makes the next checkouts fail as unknown-ref with this message.
    pub async fn fail_checkout(&self, git_ref: impl Into<String>) {
        *self.fail_checkout.write().await = Some(git_ref.into());
    }

    /// Makes checkout take `delay`, to hold the publish pipeline open.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// How many times `ensure_repository` ran.
    pub async fn ensure_calls(&self) -> usize {
        *self.ensure_calls.read().await
    }

    /// Refs passed to `checkout`, in order.
    pub async fn checkout_calls(&self) -> Vec<String> {
        self.checkout_calls.read().await.clone()
    }
}

#[async_trait]
impl SourceSync for MockSourceSync {
    async fn ensure_repository(&self) -> Result<(), SourceError> {
        *self.ensure_calls.write().await += 1;
        Ok(())
    }

    async fn checkout(&self, git_ref: &str) -> Result<String, SourceError> {
        self.checkout_calls.write().await.push(git_ref.to_string());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(bad_ref) = self.fail_checkout.read().await.clone() {
            return Err(SourceError::UnknownRef { git_ref: bad_ref });
        }
        Ok(self.revision.clone())
    }
}
