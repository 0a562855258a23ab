//! Check-then-act helper shared by every task mutation.

use super::TaskLifecycleResult;
use crate::context::OperationContext;
use crate::task::ports::{TaskRepository, TaskTransaction};

/// Runs `query`, `guard`, and `mutation` inside one repository transaction.
///
/// `query` reads the state the guard depends on, `guard` decides whether the
/// mutation may proceed, and `mutation` performs the write. Because all
/// three share the transaction, the state the guard observed is the state
/// the write applies to. Any error from any step rolls the transaction back.
pub(super) async fn guarded_mutation<R, S, P, T, Q, G, M>(
    repository: &R,
    ctx: &OperationContext,
    query: Q,
    guard: G,
    mutation: M,
) -> TaskLifecycleResult<T>
where
    R: TaskRepository,
    Q: FnOnce(&mut dyn TaskTransaction) -> TaskLifecycleResult<S> + Send + 'static,
    G: FnOnce(&mut dyn TaskTransaction, S) -> TaskLifecycleResult<P> + Send + 'static,
    M: FnOnce(&mut dyn TaskTransaction, P) -> TaskLifecycleResult<T> + Send + 'static,
    T: Send + 'static,
{
    repository
        .transaction(ctx, move |tx: &mut dyn TaskTransaction| {
            let observed = query(&mut *tx)?;
            let admitted = guard(&mut *tx, observed)?;
            mutation(&mut *tx, admitted)
        })
        .await
}
