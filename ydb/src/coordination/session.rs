use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::Stream;
use parking_lot::Mutex;
use tokio::select;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bidi::{Action, BidiHandler, BidiStream};
use crate::coordination::lock::Lock;
use crate::driver::Driver;
use crate::errors::{check_status, ClientError, Error, OperationError};
use ydb_apis::coordination::{
    session_request, session_response, SemaphoreDescription, SessionRequest, SessionResponse,
};
use ydb_apis::ydb::status_ids::StatusCode;
use ydb_gax::retry::Strategy;

/// Hard server-protocol constant, not configurable.
const SESSION_START_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Grace interval during which a disconnected session may be reattached
    /// with the same id. Also the default acquire timeout.
    pub recovery_window: Duration,
    pub description: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            recovery_window: Duration::from_secs(30),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AcquireOptions {
    /// Units to acquire; defaults to 1.
    pub count: Option<u64>,
    /// Defaults to the recovery window. Zero fails immediately when the
    /// semaphore cannot be acquired.
    pub timeout: Option<Duration>,
    pub data: Vec<u8>,
    pub ephemeral: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DescribeOptions {
    pub include_owners: bool,
    pub include_waiters: bool,
    pub watch_data: bool,
    pub watch_owners: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WatchOptions {
    /// Re-describe on data changes. Exactly one of `data`/`owners` must be set.
    pub data: bool,
    /// Re-describe on owner changes.
    pub owners: bool,
    pub include_owners: bool,
    pub include_waiters: bool,
}

#[derive(Debug, Clone)]
pub struct DescribeResult {
    pub description: SemaphoreDescription,
    pub watch_added: bool,
}

#[derive(Debug, Clone)]
pub struct SemaphoreChange {
    pub name: String,
    pub data_changed: bool,
    pub owners_changed: bool,
}

struct WatchEntry {
    name: String,
    tx: oneshot::Sender<SemaphoreChange>,
}

/// State shared between the response handler and the session facade.
struct Shared {
    session_id: AtomicU64,
    /// Strictly increases across reconnects of the same session.
    seq_no: AtomicU64,
    req_id: AtomicU64,
    watches: Mutex<HashMap<u64, WatchEntry>>,
    started_tx: Mutex<Option<oneshot::Sender<u64>>>,
    stopped_tx: Mutex<Option<oneshot::Sender<()>>>,
    /// Fires when the server declares the session gone; replaced afterwards
    /// so later locks observe the next generation.
    expired: Mutex<CancellationToken>,
}

impl Shared {
    fn expire(&self) {
        self.session_id.store(0, Ordering::SeqCst);
        self.watches.lock().clear();
        let previous = {
            let mut expired = self.expired.lock();
            std::mem::replace(&mut *expired, CancellationToken::new())
        };
        previous.cancel();
    }
}

struct CoordHandler {
    shared: Arc<Shared>,
}

impl BidiHandler for CoordHandler {
    type Req = SessionRequest;
    type Res = SessionResponse;

    fn on_response(&self, message: &SessionResponse) -> Action<SessionRequest> {
        use session_response::Response;
        match &message.response {
            Some(Response::Ping(ping)) => Action::Reply(SessionRequest {
                request: Some(session_request::Request::Pong(session_request::PingPong {
                    opaque: ping.opaque,
                })),
            }),
            Some(Response::Failure(failure)) => {
                let code = StatusCode::from_i32(failure.status);
                if matches!(
                    code,
                    Some(StatusCode::SessionExpired) | Some(StatusCode::BadSession)
                ) {
                    tracing::debug!("coordination session expired");
                    self.shared.expire();
                }
                Action::Disconnect
            }
            Some(Response::SessionStarted(started)) => {
                self.shared
                    .session_id
                    .store(started.session_id, Ordering::SeqCst);
                if let Some(tx) = self.shared.started_tx.lock().take() {
                    let _ = tx.send(started.session_id);
                }
                Action::Nothing
            }
            Some(Response::SessionStopped(_)) => {
                if let Some(tx) = self.shared.stopped_tx.lock().take() {
                    let _ = tx.send(());
                }
                Action::Nothing
            }
            Some(Response::DescribeSemaphoreChanged(changed)) => {
                if let Some(entry) = self.shared.watches.lock().remove(&changed.req_id) {
                    let _ = entry.tx.send(SemaphoreChange {
                        name: entry.name,
                        data_changed: changed.data_changed,
                        owners_changed: changed.owners_changed,
                    });
                }
                Action::Nothing
            }
            // informational; the result arrives later
            Some(Response::AcquireSemaphorePending(_)) => Action::Nothing,
            _ => Action::Nothing,
        }
    }

    fn request_id(&self, message: &SessionResponse) -> Option<u64> {
        use session_response::Response;
        match &message.response {
            Some(Response::AcquireSemaphoreResult(r)) => Some(r.req_id),
            Some(Response::ReleaseSemaphoreResult(r)) => Some(r.req_id),
            Some(Response::CreateSemaphoreResult(r)) => Some(r.req_id),
            Some(Response::UpdateSemaphoreResult(r)) => Some(r.req_id),
            Some(Response::DeleteSemaphoreResult(r)) => Some(r.req_id),
            Some(Response::DescribeSemaphoreResult(r)) => Some(r.req_id),
            _ => None,
        }
    }

    fn check(&self, message: &SessionResponse) -> Result<(), Error> {
        use session_response::Response;
        match &message.response {
            Some(Response::AcquireSemaphoreResult(r)) => check_status(r.status, &r.issues),
            Some(Response::ReleaseSemaphoreResult(r)) => check_status(r.status, &r.issues),
            Some(Response::CreateSemaphoreResult(r)) => check_status(r.status, &r.issues),
            Some(Response::UpdateSemaphoreResult(r)) => check_status(r.status, &r.issues),
            Some(Response::DeleteSemaphoreResult(r)) => check_status(r.status, &r.issues),
            Some(Response::DescribeSemaphoreResult(r)) => check_status(r.status, &r.issues),
            _ => Ok(()),
        }
    }
}

struct Inner {
    driver: Driver,
    path: String,
    options: SessionOptions,
    shared: Arc<Shared>,
    harness: Arc<BidiStream<CoordHandler>>,
    closed: AtomicBool,
    close_token: CancellationToken,
    started: watch::Sender<bool>,
    connection_task: Mutex<Option<JoinHandle<()>>>,
}

/// A coordination session: a reconnecting bidirectional stream that
/// preserves session identity across transport failures.
#[derive(Clone)]
pub struct CoordinationSession {
    inner: Arc<Inner>,
}

impl CoordinationSession {
    /// Connects and resolves once the first SessionStarted arrives. The
    /// connection loop keeps reattaching with increasing seq_no afterwards.
    pub async fn connect(
        driver: Driver,
        path: impl Into<String>,
        options: SessionOptions,
    ) -> Result<CoordinationSession, Error> {
        let shared = Arc::new(Shared {
            session_id: AtomicU64::new(0),
            seq_no: AtomicU64::new(0),
            req_id: AtomicU64::new(0),
            watches: Mutex::new(HashMap::new()),
            started_tx: Mutex::new(None),
            stopped_tx: Mutex::new(None),
            expired: Mutex::new(CancellationToken::new()),
        });
        let harness = BidiStream::new(Arc::new(CoordHandler {
            shared: Arc::clone(&shared),
        }));
        let (started, mut first_started) = watch::channel(false);
        let session = CoordinationSession {
            inner: Arc::new(Inner {
                driver,
                path: path.into(),
                options,
                shared,
                harness,
                closed: AtomicBool::new(false),
                close_token: CancellationToken::new(),
                started,
                connection_task: Mutex::new(None),
            }),
        };

        let task = tokio::spawn({
            let inner = Arc::clone(&session.inner);
            async move { connection_loop(inner).await }
        });
        *session.inner.connection_task.lock() = Some(task);

        while !*first_started.borrow_and_update() {
            if first_started.changed().await.is_err() {
                return Err(ClientError::StreamClosed.into());
            }
        }
        Ok(session)
    }

    pub fn session_id(&self) -> u64 {
        self.inner.shared.session_id.load(Ordering::SeqCst)
    }

    /// Fires when the server declares the current session gone.
    pub fn on_expired(&self) -> CancellationToken {
        self.inner.shared.expired.lock().clone()
    }

    pub(crate) fn recovery_window(&self) -> Duration {
        self.inner.options.recovery_window
    }

    fn next_req_id(&self) -> u64 {
        self.inner.shared.req_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn request(request: session_request::Request) -> SessionRequest {
        SessionRequest {
            request: Some(request),
        }
    }

    pub async fn create_semaphore(
        &self,
        name: &str,
        limit: u64,
        data: Vec<u8>,
    ) -> Result<(), Error> {
        let req_id = self.next_req_id();
        let request = Self::request(session_request::Request::CreateSemaphore(
            session_request::CreateSemaphore {
                req_id,
                name: name.to_string(),
                limit,
                data,
            },
        ));
        self.inner.harness.send_request(req_id, request, None).await?;
        Ok(())
    }

    /// Replaces the semaphore data.
    pub async fn update_semaphore(&self, name: &str, data: Vec<u8>) -> Result<(), Error> {
        let req_id = self.next_req_id();
        let request = Self::request(session_request::Request::UpdateSemaphore(
            session_request::UpdateSemaphore {
                req_id,
                name: name.to_string(),
                data,
            },
        ));
        self.inner.harness.send_request(req_id, request, None).await?;
        Ok(())
    }

    /// `force` removes the semaphore even while held.
    pub async fn delete_semaphore(&self, name: &str, force: bool) -> Result<(), Error> {
        let req_id = self.next_req_id();
        let request = Self::request(session_request::Request::DeleteSemaphore(
            session_request::DeleteSemaphore {
                req_id,
                name: name.to_string(),
                force,
            },
        ));
        self.inner.harness.send_request(req_id, request, None).await?;
        Ok(())
    }

    pub async fn describe_semaphore(
        &self,
        name: &str,
        options: DescribeOptions,
    ) -> Result<DescribeResult, Error> {
        let (result, _) = self.describe_with_watch(name, options).await?;
        Ok(result)
    }

    /// Describe that may register a change watch. The watch entry is
    /// registered before the request is sent so a change arriving right
    /// after the result cannot be missed.
    async fn describe_with_watch(
        &self,
        name: &str,
        options: DescribeOptions,
    ) -> Result<(DescribeResult, Option<oneshot::Receiver<SemaphoreChange>>), Error> {
        let req_id = self.next_req_id();
        let wants_watch = options.watch_data || options.watch_owners;
        let change_rx = if wants_watch {
            let (tx, rx) = oneshot::channel();
            self.inner.shared.watches.lock().insert(
                req_id,
                WatchEntry {
                    name: name.to_string(),
                    tx,
                },
            );
            Some(rx)
        } else {
            None
        };

        let request = Self::request(session_request::Request::DescribeSemaphore(
            session_request::DescribeSemaphore {
                req_id,
                name: name.to_string(),
                include_owners: options.include_owners,
                include_waiters: options.include_waiters,
                watch_data: options.watch_data,
                watch_owners: options.watch_owners,
            },
        ));
        let response = self.inner.harness.send_request(req_id, request, None).await;
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                self.inner.shared.watches.lock().remove(&req_id);
                return Err(e);
            }
        };
        let result = match response.response {
            Some(session_response::Response::DescribeSemaphoreResult(result)) => result,
            _ => return Err(ClientError::MalformedResult("describe result".to_string()).into()),
        };
        if !result.watch_added {
            self.inner.shared.watches.lock().remove(&req_id);
        }
        Ok((
            DescribeResult {
                description: result.semaphore_description.unwrap_or_default(),
                watch_added: result.watch_added,
            },
            if result.watch_added { change_rx } else { None },
        ))
    }

    /// Resolves to a lock handle once acquired; a timed-out acquire fails
    /// with TIMEOUT.
    pub async fn acquire_semaphore(
        &self,
        name: &str,
        options: AcquireOptions,
    ) -> Result<Lock, Error> {
        match self.try_acquire_semaphore(name, options).await? {
            Some(lock) => Ok(lock),
            None => Err(OperationError {
                code: StatusCode::Timeout,
                issues: Vec::new(),
            }
            .into()),
        }
    }

    /// Like [`acquire_semaphore`] but returns None on acquire timeout.
    pub async fn try_acquire_semaphore(
        &self,
        name: &str,
        options: AcquireOptions,
    ) -> Result<Option<Lock>, Error> {
        let req_id = self.next_req_id();
        let timeout = options
            .timeout
            .unwrap_or(self.inner.options.recovery_window);
        let timeout_millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let request = Self::request(session_request::Request::AcquireSemaphore(
            session_request::AcquireSemaphore {
                req_id,
                name: name.to_string(),
                timeout_millis,
                count: options.count.unwrap_or(1),
                data: options.data,
                ephemeral: options.ephemeral,
            },
        ));
        let response = self.inner.harness.send_request(req_id, request, None).await?;
        let acquired = match response.response {
            Some(session_response::Response::AcquireSemaphoreResult(result)) => result.acquired,
            _ => return Err(ClientError::MalformedResult("acquire result".to_string()).into()),
        };
        if !acquired {
            return Ok(None);
        }
        Ok(Some(Lock::new(
            self.clone(),
            name.to_string(),
            self.on_expired(),
        )))
    }

    /// Returns the server's `released` flag: false when the semaphore was
    /// not held by this session.
    pub async fn release_semaphore(&self, name: &str) -> Result<bool, Error> {
        let req_id = self.next_req_id();
        let request = Self::request(session_request::Request::ReleaseSemaphore(
            session_request::ReleaseSemaphore {
                req_id,
                name: name.to_string(),
            },
        ));
        let response = self.inner.harness.send_request(req_id, request, None).await?;
        match response.response {
            Some(session_response::Response::ReleaseSemaphoreResult(result)) => {
                Ok(result.released)
            }
            _ => Err(ClientError::MalformedResult("release result".to_string()).into()),
        }
    }

    /// Async sequence of descriptions: re-describes and yields on every
    /// matching change event. Watching owners implies including them.
    pub fn watch_semaphore(
        &self,
        name: &str,
        options: WatchOptions,
    ) -> impl Stream<Item = Result<SemaphoreDescription, Error>> + Send + 'static {
        let session = self.clone();
        let name = name.to_string();
        async_stream::try_stream! {
            if options.data == options.owners {
                Err(Error::from(ClientError::InvalidConfig(
                    "watch takes exactly one of data/owners".to_string(),
                )))?;
            }
            let describe = DescribeOptions {
                include_owners: options.include_owners || options.owners,
                include_waiters: options.include_waiters,
                watch_data: options.data,
                watch_owners: options.owners,
            };
            loop {
                if session.inner.closed.load(Ordering::SeqCst) {
                    break;
                }
                let (result, change_rx) = session.describe_with_watch(&name, describe).await?;
                yield result.description;
                if !result.watch_added {
                    break;
                }
                let Some(change_rx) = change_rx else { break };
                // a dropped sender means the watch map was cleared by session
                // expiry; the next describe re-registers on the new session
                let _ = change_rx.await;
            }
        }
    }

    /// Graceful shutdown: announces SessionStop, waits for SessionStopped up
    /// to the timeout (5s default), then closes the stream permanently.
    pub async fn close(&self, timeout: Option<Duration>) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.close_token.cancel();
        self.inner.shared.watches.lock().clear();

        let (tx, rx) = oneshot::channel();
        *self.inner.shared.stopped_tx.lock() = Some(tx);
        let stop = Self::request(session_request::Request::SessionStop(
            session_request::SessionStop {},
        ));
        if self.inner.harness.send(stop).await.is_ok() {
            let timeout = timeout.unwrap_or(DEFAULT_CLOSE_TIMEOUT);
            if tokio::time::timeout(timeout, rx).await.is_err() {
                tracing::debug!("session stop timed out");
            }
        }
        self.inner.harness.close().await;
        if let Some(task) = self.inner.connection_task.lock().take() {
            task.abort();
        }
    }

    /// Forced shutdown without the stop handshake. Idempotent.
    pub fn dispose(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.close_token.cancel();
        self.inner.harness.disconnect();
        if let Some(task) = self.inner.connection_task.lock().take() {
            task.abort();
        }
    }
}

/// Infinite reconnect loop. Each iteration awaits driver readiness, opens
/// the stream, sends SessionStart with the next seq_no and waits for the
/// stream to die before trying again.
async fn connection_loop(inner: Arc<Inner>) {
    let reconnect = &inner.driver.options().connection;
    let backoff = Strategy::combine(vec![
        Strategy::backoff(
            reconnect.initial_reconnect_backoff.as_millis() as u64,
            reconnect.max_reconnect_backoff.as_millis() as u64,
        ),
        Strategy::jitter(50),
    ]);
    let mut attempt: usize = 0;
    loop {
        if inner.closed.load(Ordering::SeqCst) {
            break;
        }
        let outcome: Result<(), Error> = async {
            inner.driver.ready().await?;

            let (started_tx, started_rx) = oneshot::channel();
            *inner.shared.started_tx.lock() = Some(started_tx);
            let seq_no = inner.shared.seq_no.fetch_add(1, Ordering::SeqCst) + 1;
            let start = SessionRequest {
                request: Some(session_request::Request::SessionStart(
                    session_request::SessionStart {
                        path: inner.path.clone(),
                        session_id: inner.shared.session_id.load(Ordering::SeqCst),
                        timeout_millis: inner.options.recovery_window.as_millis() as u64,
                        description: inner.options.description.clone(),
                        seq_no,
                        protection_key: Vec::new(),
                    },
                )),
            };

            let client = inner.driver.coordination_raw();
            inner
                .harness
                .start(|outgoing| async move { client.session(outgoing).await }, start)
                .await?;

            match tokio::time::timeout(SESSION_START_TIMEOUT, started_rx).await {
                Ok(Ok(session_id)) => {
                    tracing::debug!(session_id, seq_no, "coordination session started");
                    let _ = inner.started.send(true);
                }
                _ => {
                    inner.harness.disconnect();
                    return Err(ydb_gax::grpc::Status::deadline_exceeded(
                        "session start timed out",
                    )
                    .into());
                }
            }

            inner.harness.wait_for_disconnect().await;
            Ok(())
        }
        .await;

        if inner.closed.load(Ordering::SeqCst) {
            break;
        }
        match outcome {
            Ok(()) => {
                attempt = 0;
                tracing::debug!("coordination stream disconnected, reconnecting");
            }
            Err(e) => {
                attempt += 1;
                tracing::debug!("coordination connect failed: {e}");
            }
        }
        select! {
            _ = tokio::time::sleep(backoff.delay(attempt.max(1))) => {}
            _ = inner.close_token.cancelled() => break,
        }
    }
    tracing::trace!("shutdown coordination connection loop");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> Arc<Shared> {
        Arc::new(Shared {
            session_id: AtomicU64::new(7),
            seq_no: AtomicU64::new(0),
            req_id: AtomicU64::new(0),
            watches: Mutex::new(HashMap::new()),
            started_tx: Mutex::new(None),
            stopped_tx: Mutex::new(None),
            expired: Mutex::new(CancellationToken::new()),
        })
    }

    fn response(inner: session_response::Response) -> SessionResponse {
        SessionResponse {
            response: Some(inner),
        }
    }

    #[test]
    fn test_ping_answered_with_pong() {
        let handler = CoordHandler { shared: shared() };
        let action = handler.on_response(&response(session_response::Response::Ping(
            session_request::PingPong { opaque: 42 },
        )));
        match action {
            Action::Reply(reply) => match reply.request {
                Some(session_request::Request::Pong(pong)) => assert_eq!(pong.opaque, 42),
                other => panic!("unexpected reply {other:?}"),
            },
            _ => panic!("ping must be answered"),
        }
    }

    #[test]
    fn test_failure_resets_expired_session() {
        let shared = shared();
        let expired = shared.expired.lock().clone();
        let (tx, _rx) = oneshot::channel();
        shared.watches.lock().insert(
            1,
            WatchEntry {
                name: "s".to_string(),
                tx,
            },
        );
        let handler = CoordHandler {
            shared: Arc::clone(&shared),
        };
        let action = handler.on_response(&response(session_response::Response::Failure(
            session_response::Failure {
                status: StatusCode::SessionExpired as i32,
                issues: Vec::new(),
            },
        )));
        assert!(matches!(action, Action::Disconnect));
        assert_eq!(shared.session_id.load(Ordering::SeqCst), 0);
        assert!(shared.watches.lock().is_empty());
        assert!(expired.is_cancelled());
        // the replacement token belongs to the next session generation
        assert!(!shared.expired.lock().is_cancelled());
    }

    #[test]
    fn test_transient_failure_keeps_session_id() {
        let shared = shared();
        let handler = CoordHandler {
            shared: Arc::clone(&shared),
        };
        let action = handler.on_response(&response(session_response::Response::Failure(
            session_response::Failure {
                status: StatusCode::Unavailable as i32,
                issues: Vec::new(),
            },
        )));
        // still a disconnect, but the session id survives for reattach
        assert!(matches!(action, Action::Disconnect));
        assert_eq!(shared.session_id.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_session_started_resolves_waiter() {
        let shared = shared();
        let (tx, mut rx) = oneshot::channel();
        *shared.started_tx.lock() = Some(tx);
        let handler = CoordHandler {
            shared: Arc::clone(&shared),
        };
        handler.on_response(&response(session_response::Response::SessionStarted(
            session_response::SessionStarted {
                session_id: 99,
                timeout_millis: 0,
            },
        )));
        assert_eq!(shared.session_id.load(Ordering::SeqCst), 99);
        assert_eq!(rx.try_recv().unwrap(), 99);
    }

    #[test]
    fn test_semaphore_changed_fires_watch_once() {
        let shared = shared();
        let (tx, mut rx) = oneshot::channel();
        shared.watches.lock().insert(
            5,
            WatchEntry {
                name: "lease".to_string(),
                tx,
            },
        );
        let handler = CoordHandler {
            shared: Arc::clone(&shared),
        };
        let changed = session_response::DescribeSemaphoreChanged {
            req_id: 5,
            data_changed: false,
            owners_changed: true,
        };
        handler.on_response(&response(
            session_response::Response::DescribeSemaphoreChanged(changed.clone()),
        ));
        let event = rx.try_recv().unwrap();
        assert_eq!(event.name, "lease");
        assert!(event.owners_changed);
        assert!(shared.watches.lock().is_empty());

        // a second event for the same req id is a no-op
        handler.on_response(&response(
            session_response::Response::DescribeSemaphoreChanged(changed),
        ));
    }

    #[test]
    fn test_request_ids_extracted_from_results() {
        let handler = CoordHandler { shared: shared() };
        let message = response(session_response::Response::AcquireSemaphoreResult(
            session_response::AcquireSemaphoreResult {
                req_id: 12,
                status: StatusCode::Success as i32,
                issues: Vec::new(),
                acquired: true,
            },
        ));
        assert_eq!(handler.request_id(&message), Some(12));
        assert!(handler.check(&message).is_ok());

        let failed = response(session_response::Response::AcquireSemaphoreResult(
            session_response::AcquireSemaphoreResult {
                req_id: 13,
                status: StatusCode::PreconditionFailed as i32,
                issues: Vec::new(),
                acquired: false,
            },
        ));
        assert!(handler.check(&failed).is_err());

        let pending = response(session_response::Response::AcquireSemaphorePending(
            session_response::AcquireSemaphorePending { req_id: 12 },
        ));
        assert_eq!(handler.request_id(&pending), None);
    }
}
