//! Commit / rollback orchestration shared by every store backend

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::{AuthError, AuthResult};

/// An open transaction that can be finished exactly once
pub(crate) trait TransactionScope: Sized + Send {
    fn commit(self) -> impl Future<Output = AuthResult<()>> + Send;

    fn rollback(self) -> impl Future<Output = AuthResult<()>> + Send;
}

/// Run `f` against `scope`, then commit or roll back.
///
/// Exactly one of commit / rollback is attempted on every path, including
/// a panic inside `f`, which is resumed after the rollback.
pub(crate) async fn run_in_scope<S, T, F>(scope: S, f: F) -> AuthResult<T>
where
    S: TransactionScope + Sync,
    T: Send,
    F: for<'t> FnOnce(&'t S) -> BoxFuture<'t, AuthResult<T>> + Send,
{
    // `f` is called inside the guarded future so a panic while building the
    // callback's future is caught as well.
    let outcome = AssertUnwindSafe(async { f(&scope).await })
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(value)) => {
            scope.commit().await?;
            Ok(value)
        }
        Ok(Err(err)) => match scope.rollback().await {
            Ok(()) => Err(err),
            Err(rollback) => {
                tracing::error!(error = %err, rollback = %rollback, "Rollback failed");
                Err(AuthError::RollbackFailed {
                    source: Box::new(err),
                    rollback: rollback.to_string(),
                })
            }
        },
        Err(panic) => {
            if let Err(rollback) = scope.rollback().await {
                tracing::error!(rollback = %rollback, "Rollback after panic failed");
            }
            std::panic::resume_unwind(panic)
        }
    }
}
