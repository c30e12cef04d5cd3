//! Per-pull-request exclusive locks.
//!
//! SQLite has no `SELECT ... FOR UPDATE`, so the engine serializes work on a
//! pull request through this registry before opening its transaction. Locks
//! are created the first time a pull request id is seen and dropped from the
//! registry once nobody holds or waits for them, so the map only contains
//! pull requests that are in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError, Weak};
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = HashMap<String, Weak<Mutex<()>>>;

/// Registry of lazily created per-PR locks. Clones share the same registry.
#[derive(Clone, Default)]
pub struct PrLockRegistry {
    locks: Arc<StdMutex<LockMap>>,
}

impl PrLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `pr_id`.
    ///
    /// The returned guard releases the lock when dropped. Dropping the
    /// future while it waits is safe and leaves no registry entry behind.
    pub async fn acquire(&self, pr_id: &str) -> PrLockGuard {
        let (ticket, lock) = self.ticket(pr_id);
        let guard = lock.lock_owned().await;

        PrLockGuard {
            _guard: guard,
            _ticket: ticket,
        }
    }

    /// Number of pull requests that currently have a holder or waiter.
    pub fn in_flight(&self) -> usize {
        self.entries().len()
    }

    fn ticket(&self, pr_id: &str) -> (LockTicket, Arc<Mutex<()>>) {
        let mut locks = self.entries();

        let lock = match locks.get(pr_id).and_then(Weak::upgrade) {
            Some(existing) => existing,
            None => {
                let fresh = Arc::new(Mutex::new(()));
                locks.insert(pr_id.to_string(), Arc::downgrade(&fresh));
                fresh
            }
        };

        let ticket = LockTicket {
            registry: self.clone(),
            pr_id: pr_id.to_string(),
            lock: Some(lock.clone()),
        };
        (ticket, lock)
    }

    fn entries(&self) -> MutexGuard<'_, LockMap> {
        // The map is never left half-updated, so a poisoned lock is still usable
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Interest in a PR lock, held by both waiters and holders.
///
/// The last ticket for a pull request removes the registry entry. Tickets
/// drop their reference while the map is locked so that the strong count
/// seen there is exact.
struct LockTicket {
    registry: PrLockRegistry,
    pr_id: String,
    lock: Option<Arc<Mutex<()>>>,
}

impl Drop for LockTicket {
    fn drop(&mut self) {
        let mut locks = self.registry.entries();
        drop(self.lock.take());

        if locks
            .get(&self.pr_id)
            .is_some_and(|weak| weak.strong_count() == 0)
        {
            locks.remove(&self.pr_id);
        }
    }
}

/// Exclusive access to one pull request.
///
/// Field order matters: the mutex guard is released before the ticket
/// checks whether the registry entry can go.
pub struct PrLockGuard {
    _guard: OwnedMutexGuard<()>,
    _ticket: LockTicket,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_entry_evicted_after_release() {
        let registry = PrLockRegistry::new();

        let guard = registry.acquire("pr-1").await;
        assert_eq!(registry.in_flight(), 1);

        drop(guard);
        assert_eq!(registry.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_same_pr_is_exclusive() {
        let registry = PrLockRegistry::new();
        let held = registry.acquire("pr-1").await;

        let contender = registry.clone();
        let waiter = tokio::spawn(async move {
            let _guard = contender.acquire("pr-1").await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(held);
        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(registry.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_different_prs_do_not_block() {
        let registry = PrLockRegistry::new();
        let _first = registry.acquire("pr-1").await;

        let second = tokio::time::timeout(Duration::from_secs(1), registry.acquire("pr-2")).await;
        assert!(second.is_ok());
        assert_eq!(registry.in_flight(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_leaves_no_entry() {
        let registry = PrLockRegistry::new();
        let held = registry.acquire("pr-1").await;

        let timed_out =
            tokio::time::timeout(Duration::from_millis(20), registry.acquire("pr-1")).await;
        assert!(timed_out.is_err());

        drop(held);
        assert_eq!(registry.in_flight(), 0);
    }
}
