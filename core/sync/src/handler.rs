//! Save endpoint abstraction.

use async_trait::async_trait;
use std::future::Future;

use tascboard_common::Result;

/// Remote persistence call used by the auto-sync controller.
///
/// The controller owns its handler for its whole lifetime, so a handler
/// is never swapped out between edits.
#[async_trait]
pub trait SaveHandler<S>: Send + Sync {
    /// Record returned by a successful save.
    type Output: Send + 'static;

    /// Persist a snapshot.
    ///
    /// # Postconditions
    /// - On `Ok`, the endpoint holds exactly `values`
    ///
    /// # Errors
    /// - Validation, authorization or network errors from the endpoint
    async fn save(&self, values: S) -> Result<Self::Output>;
}

/// Adapter turning an async closure into a [`SaveHandler`].
pub struct SaveFn<F>(F);

/// Wrap an async closure as a save handler.
pub fn save_fn<F>(f: F) -> SaveFn<F> {
    SaveFn(f)
}

#[async_trait]
impl<S, F, Fut, T> SaveHandler<S> for SaveFn<F>
where
    S: Send + 'static,
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send,
    T: Send + 'static,
{
    type Output = T;

    async fn save(&self, values: S) -> Result<T> {
        (self.0)(values).await
    }
}
