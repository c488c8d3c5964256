use std::collections::VecDeque;
use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::select;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::driver::Driver;
use crate::errors::{ClientError, Error};
use crate::query::session::{QuerySession, SessionState};

#[derive(Debug, Clone)]
pub struct SessionPoolOptions {
    /// Sessions plus in-flight creations never exceed this bound.
    pub max_size: usize,
}

impl Default for SessionPoolOptions {
    fn default() -> Self {
        Self { max_size: 50 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPoolStats {
    pub total: usize,
    pub idle: usize,
    pub busy: usize,
    pub closed: usize,
    pub invalidated: usize,
    pub waiting: usize,
    pub max_size: usize,
}

type Waiter = oneshot::Sender<Result<Arc<QuerySession>, Error>>;

struct PoolInner {
    sessions: Vec<Arc<QuerySession>>,
    waiters: VecDeque<Waiter>,
    /// Creations in flight; they count toward `max_size`.
    creating: usize,
    closed: bool,
}

impl PoolInner {
    fn total(&self) -> usize {
        self.sessions.len() + self.creating
    }

    fn take_waiter(&mut self) -> Option<Waiter> {
        while let Some(waiter) = self.waiters.pop_front() {
            // cancelled waiters left the queue logically already
            if !waiter.is_closed() {
                return Some(waiter);
            }
        }
        None
    }

    fn purge_dead(&mut self) {
        self.sessions.retain(|s| {
            matches!(s.state(), SessionState::Idle | SessionState::Busy)
        });
    }
}

/// Bounded pool of query sessions with strictly FIFO waiters.
pub struct SessionPool {
    driver: Driver,
    options: SessionPoolOptions,
    inner: Mutex<PoolInner>,
}

impl SessionPool {
    pub fn new(driver: Driver, options: SessionPoolOptions) -> Arc<SessionPool> {
        Arc::new(SessionPool {
            driver,
            options,
            inner: Mutex::new(PoolInner {
                sessions: Vec::new(),
                waiters: VecDeque::new(),
                creating: 0,
                closed: false,
            }),
        })
    }

    /// Returns an IDLE session marked BUSY, creating one when under the
    /// bound, or parks the caller in the FIFO waiter queue.
    pub async fn acquire(
        self: &Arc<Self>,
        cancel: Option<CancellationToken>,
    ) -> Result<Arc<QuerySession>, Error> {
        let waiter = {
            let mut inner = self.inner.lock();
            if inner.closed {
                return Err(ClientError::PoolClosed.into());
            }
            inner.purge_dead();

            if let Some(session) = inner
                .sessions
                .iter()
                .find(|s| s.state() == SessionState::Idle)
                .cloned()
            {
                session.acquire()?;
                return Ok(session);
            }

            if inner.total() < self.options.max_size {
                inner.creating += 1;
                None
            } else {
                let (tx, rx) = oneshot::channel();
                inner.waiters.push_back(tx);
                Some(rx)
            }
        };

        match waiter {
            None => self.create_for_caller().await,
            Some(rx) => {
                let cancel = cancel.unwrap_or_default();
                select! {
                    _ = cancel.cancelled() => {
                        // dropping the receiver marks the queued waiter closed
                        Err(Error::Cancelled)
                    }
                    result = rx => match result {
                        Ok(result) => result,
                        Err(_) => Err(ClientError::PoolClosed.into()),
                    },
                }
            }
        }
    }

    /// Creation on behalf of the calling acquirer. The caller sees the
    /// original error; queued waiters see a retryable creation-failed marker
    /// so their next acquire starts afresh.
    async fn create_for_caller(self: &Arc<Self>) -> Result<Arc<QuerySession>, Error> {
        match QuerySession::create(&self.driver).await {
            Ok(session) => {
                session.acquire()?;
                let mut inner = self.inner.lock();
                inner.creating -= 1;
                inner.sessions.push(Arc::clone(&session));
                Ok(session)
            }
            Err(e) => {
                let waiters = {
                    let mut inner = self.inner.lock();
                    inner.creating -= 1;
                    mem::take(&mut inner.waiters)
                };
                for waiter in waiters {
                    let _ = waiter.send(Err(Error::SessionCreationFailed));
                }
                Err(e)
            }
        }
    }

    /// Returns a session to the pool. Dead sessions are dropped; live ones go
    /// back to IDLE or are handed to the head waiter, re-marked BUSY before
    /// the waiter resumes.
    pub fn release(self: &Arc<Self>, session: &Arc<QuerySession>) {
        let mut inner = self.inner.lock();
        match session.state() {
            SessionState::Invalidated | SessionState::Closed => {
                inner.sessions.retain(|s| !Arc::ptr_eq(s, session));
                let has_waiters = inner.waiters.iter().any(|w| !w.is_closed());
                if has_waiters && inner.total() < self.options.max_size {
                    inner.creating += 1;
                    drop(inner);
                    self.spawn_replenish();
                }
            }
            SessionState::Busy => {
                if session.release().is_err() {
                    return;
                }
                if let Some(waiter) = inner.take_waiter() {
                    if session.acquire().is_ok() {
                        let _ = waiter.send(Ok(Arc::clone(session)));
                    }
                }
            }
            SessionState::Idle => {}
        }
    }

    /// Background creation for a queued waiter after a dead session was
    /// dropped.
    fn spawn_replenish(self: &Arc<Self>) {
        let pool = Arc::clone(self);
        tokio::spawn(async move {
            match QuerySession::create(&pool.driver).await {
                Ok(session) => {
                    let mut inner = pool.inner.lock();
                    inner.creating -= 1;
                    inner.sessions.push(Arc::clone(&session));
                    if let Some(waiter) = inner.take_waiter() {
                        if session.acquire().is_ok() {
                            let _ = waiter.send(Ok(session));
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!("session replenish failed: {e}");
                    let waiter = {
                        let mut inner = pool.inner.lock();
                        inner.creating -= 1;
                        inner.take_waiter()
                    };
                    if let Some(waiter) = waiter {
                        let _ = waiter.send(Err(Error::SessionCreationFailed));
                    }
                }
            }
        });
    }

    /// Rejects all waiters and deletes all sessions in parallel, swallowing
    /// per-session errors.
    pub async fn close(self: &Arc<Self>) {
        let (waiters, sessions) = {
            let mut inner = self.inner.lock();
            inner.closed = true;
            (mem::take(&mut inner.waiters), mem::take(&mut inner.sessions))
        };
        for waiter in waiters {
            let _ = waiter.send(Err(ClientError::PoolClosed.into()));
        }
        let deletes = sessions.iter().map(|s| s.delete());
        futures_util::future::join_all(deletes).await;
    }

    pub fn stats(&self) -> SessionPoolStats {
        let inner = self.inner.lock();
        let mut stats = SessionPoolStats {
            total: inner.total(),
            idle: 0,
            busy: 0,
            closed: 0,
            invalidated: 0,
            waiting: inner.waiters.iter().filter(|w| !w.is_closed()).count(),
            max_size: self.options.max_size,
        };
        for session in &inner.sessions {
            match session.state() {
                SessionState::Idle => stats.idle += 1,
                SessionState::Busy => stats.busy += 1,
                SessionState::Closed => stats.closed += 1,
                SessionState::Invalidated => stats.invalidated += 1,
            }
        }
        stats
    }

    #[cfg(test)]
    fn inject_for_test(&self, session: Arc<QuerySession>) {
        self.inner.lock().sessions.push(session);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::DriverOptions;

    async fn test_driver() -> Driver {
        let mut options = DriverOptions::default();
        options.enable_discovery = false;
        Driver::new("grpc://localhost:1/local", options, None)
            .await
            .unwrap()
    }

    fn pool_of(driver: &Driver, sessions: usize, max_size: usize) -> Arc<SessionPool> {
        let pool = SessionPool::new(driver.clone(), SessionPoolOptions { max_size });
        for i in 0..sessions {
            pool.inject_for_test(QuerySession::new_for_test(driver, &format!("s{i}"), 1));
        }
        pool
    }

    #[tokio::test]
    async fn test_acquire_idle_session() {
        let driver = test_driver().await;
        let pool = pool_of(&driver, 1, 1);
        let session = pool.acquire(None).await.unwrap();
        assert_eq!(session.state(), SessionState::Busy);
        assert_eq!(pool.stats().busy, 1);

        pool.release(&session);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(pool.stats().idle, 1);
    }

    #[tokio::test]
    async fn test_waiters_served_fifo() {
        let driver = test_driver().await;
        let pool = pool_of(&driver, 1, 1);
        let held = pool.acquire(None).await.unwrap();

        let first = tokio::spawn({
            let pool = Arc::clone(&pool);
            async move { pool.acquire(None).await.map(|s| ("first", s)) }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = tokio::spawn({
            let pool = Arc::clone(&pool);
            async move { pool.acquire(None).await.map(|s| ("second", s)) }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let stats = pool.stats();
        assert_eq!(stats.waiting, 2);
        // invariant: waiters imply a full pool with nothing idle
        assert_eq!(stats.total, stats.max_size);
        assert_eq!(stats.idle, 0);

        pool.release(&held);
        let (who, session) = first.await.unwrap().unwrap();
        assert_eq!(who, "first");
        assert_eq!(session.state(), SessionState::Busy);

        pool.release(&session);
        let (who, session) = second.await.unwrap().unwrap();
        assert_eq!(who, "second");
        pool.release(&session);
    }

    #[tokio::test]
    async fn test_waiter_cancellation_removes_it() {
        let driver = test_driver().await;
        let pool = pool_of(&driver, 1, 1);
        let held = pool.acquire(None).await.unwrap();

        let cancel = CancellationToken::new();
        let waiter = tokio::spawn({
            let pool = Arc::clone(&pool);
            let cancel = cancel.clone();
            async move { pool.acquire(Some(cancel)).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(pool.stats().waiting, 1);

        cancel.cancel();
        let result = waiter.await.unwrap();
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(pool.stats().waiting, 0);

        // the released session goes back to idle instead of a dead waiter
        pool.release(&held);
        assert_eq!(pool.stats().idle, 1);
    }

    #[tokio::test]
    async fn test_invalidated_session_not_reoffered() {
        let driver = test_driver().await;
        let pool = pool_of(&driver, 1, 2);
        let session = pool.acquire(None).await.unwrap();
        session.invalidate();
        pool.release(&session);
        assert_eq!(pool.stats().total, 0);
    }

    #[tokio::test]
    async fn test_creation_failure_rejects_initiator_with_cause() {
        let driver = test_driver().await;
        // empty pool, creation must fail against the unreachable endpoint
        let pool = pool_of(&driver, 0, 1);
        let result = pool.acquire(None).await;
        match result {
            Err(Error::Grpc(_)) | Err(Error::Client(_)) => {}
            other => panic!("expected the original creation error, got {other:?}"),
        }
        assert_eq!(pool.stats().total, 0);
    }

    #[tokio::test]
    async fn test_creation_failure_rejects_waiters_with_marker() {
        let driver = test_driver().await;
        let pool = pool_of(&driver, 0, 1);

        // occupy the only creation slot with a slow-failing attempt and queue
        // a second caller behind it
        let initiator = tokio::spawn({
            let pool = Arc::clone(&pool);
            async move { pool.acquire(None).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        let waiter = tokio::spawn({
            let pool = Arc::clone(&pool);
            async move { pool.acquire(None).await }
        });

        let initiator_result = initiator.await.unwrap();
        assert!(initiator_result.is_err());
        let waiter_result = waiter.await.unwrap();
        match waiter_result {
            Err(Error::SessionCreationFailed) => {}
            // the waiter may have enqueued after the failure already drained
            // the queue, in which case it initiated its own creation
            Err(Error::Grpc(_)) | Err(Error::Client(_)) => {}
            other => panic!("unexpected waiter outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_close_rejects_waiters() {
        let driver = test_driver().await;
        let pool = pool_of(&driver, 1, 1);
        let _held = pool.acquire(None).await.unwrap();

        let waiter = tokio::spawn({
            let pool = Arc::clone(&pool);
            async move { pool.acquire(None).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        pool.close().await;

        let result = waiter.await.unwrap();
        assert!(matches!(
            result,
            Err(Error::Client(ClientError::PoolClosed))
        ));
        assert!(matches!(
            pool.acquire(None).await,
            Err(Error::Client(ClientError::PoolClosed))
        ));
    }
}
