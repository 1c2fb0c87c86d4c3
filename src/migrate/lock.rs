//! migrate::lock
//!
//! Scoped stack lock.
//!
//! [`with_lock`] locks a stack, runs the body, and then always attempts to
//! unlock, whatever the body returned. The unlock result is handed back next
//! to the body's result instead of replacing it, so a failed unlock after a
//! successful import is visible without turning the import into a failure.

use std::future::Future;

use crate::api::{ApiError, SpaceliftApi};

/// Result of a body run under a lock.
#[derive(Debug)]
pub struct Locked<T> {
    /// What the body returned.
    pub value: T,
    /// Outcome of the unlock attempt.
    pub unlock: Result<(), ApiError>,
}

/// Lock `stack_id`, run `body`, then unlock.
///
/// Returns `Err` only when the lock could not be taken, in which case the
/// body does not run and no unlock is attempted.
pub async fn with_lock<T, F, Fut>(
    api: &dyn SpaceliftApi,
    stack_id: &str,
    body: F,
) -> Result<Locked<T>, ApiError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    api.lock_stack(stack_id).await?;
    let value = body().await;
    let unlock = api.unlock_stack(stack_id).await;
    Ok(Locked { value, unlock })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{FailOn, MockApi, MockOperation};

    fn lock_ops(api: &MockApi) -> Vec<MockOperation> {
        api.operations()
            .into_iter()
            .filter(|op| {
                matches!(
                    op,
                    MockOperation::Lock { .. } | MockOperation::Unlock { .. }
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn unlocks_after_body() {
        let api = MockApi::new();
        let locked = with_lock(&api, "vpc", || async { 42 }).await.unwrap();
        assert_eq!(locked.value, 42);
        assert!(locked.unlock.is_ok());
        assert_eq!(
            lock_ops(&api),
            vec![
                MockOperation::Lock {
                    stack_id: "vpc".into()
                },
                MockOperation::Unlock {
                    stack_id: "vpc".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn failing_body_still_unlocks() {
        let api = MockApi::new();
        let locked = with_lock(&api, "vpc", || async { Err::<(), _>("import failed") })
            .await
            .unwrap();
        assert!(locked.value.is_err());
        assert_eq!(lock_ops(&api).len(), 2);
    }

    #[tokio::test]
    async fn unlock_failure_is_reported_separately() {
        let api = MockApi::new().fail_on(
            FailOn::Unlock("vpc".into()),
            ApiError::GraphQl("not locked".into()),
        );
        let locked = with_lock(&api, "vpc", || async { "imported" }).await.unwrap();
        assert_eq!(locked.value, "imported");
        assert!(locked.unlock.is_err());
    }

    #[tokio::test]
    async fn lock_failure_skips_body_and_unlock() {
        let api = MockApi::new().fail_on(
            FailOn::Lock("vpc".into()),
            ApiError::GraphQl("already locked".into()),
        );
        let ran = std::cell::Cell::new(false);
        let flag = &ran;
        let result = with_lock(&api, "vpc", || async move { flag.set(true) }).await;
        assert!(result.is_err());
        assert!(!ran.get());
        assert_eq!(lock_ops(&api).len(), 1);
    }
}
