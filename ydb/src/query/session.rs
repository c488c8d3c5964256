use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::apiv1::query_client::Client;
use crate::driver::Driver;
use crate::errors::{check_status, ClientError, Error};
use ydb_apis::ydb::status_ids::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Busy,
    Closed,
    Invalidated,
}

/// A server-attached query session. The attach stream opened at creation is
/// held for the session lifetime; when it closes or reports a non-success
/// state the session becomes INVALIDATED and is never handed out again.
pub struct QuerySession {
    id: String,
    node_id: u32,
    client: Client,
    state: Mutex<SessionState>,
    invalidated: CancellationToken,
    watchdog: Mutex<Option<JoinHandle<()>>>,
}

impl QuerySession {
    pub(crate) async fn create(driver: &Driver) -> Result<Arc<QuerySession>, Error> {
        let client = driver.query_raw();
        let created = client.create_session().await?;
        let node_id = created.node_id as u32;

        let mut stream = client.attach_session(&created.session_id, Some(node_id)).await?;
        // the first frame is the attach acknowledgement and is read before
        // the session is considered alive
        match stream.message().await {
            Ok(Some(state)) => {
                if let Err(e) = check_status(state.status, &state.issues) {
                    return Err(e);
                }
            }
            Ok(None) => return Err(ClientError::StreamClosed.into()),
            Err(status) => return Err(status.into()),
        }

        let session = Arc::new(QuerySession {
            id: created.session_id,
            node_id,
            client,
            state: Mutex::new(SessionState::Idle),
            invalidated: CancellationToken::new(),
            watchdog: Mutex::new(None),
        });

        // keep the stream iterator alive for the session lifetime
        let watchdog_session = Arc::clone(&session);
        let watchdog = tokio::spawn(async move {
            loop {
                match stream.message().await {
                    Ok(Some(state)) if state.status == StatusCode::Success as i32 => continue,
                    Ok(Some(state)) => {
                        tracing::debug!(
                            session_id = %watchdog_session.id,
                            status = state.status,
                            "attach stream reported failure"
                        );
                        break;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::debug!(
                            session_id = %watchdog_session.id,
                            "attach stream error: {e}"
                        );
                        break;
                    }
                }
            }
            watchdog_session.invalidate();
        });
        *session.watchdog.lock() = Some(watchdog);
        Ok(session)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn node_id(&self) -> u32 {
        self.node_id
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// Fires when the session becomes INVALIDATED.
    pub(crate) fn on_invalidated(&self) -> CancellationToken {
        self.invalidated.clone()
    }

    /// IDLE -> BUSY. Only legal from IDLE.
    pub(crate) fn acquire(&self) -> Result<(), Error> {
        let mut state = self.state.lock();
        match *state {
            SessionState::Idle => {
                *state = SessionState::Busy;
                Ok(())
            }
            other => Err(ClientError::IllegalSessionState(format!(
                "acquire on {other:?} session"
            ))
            .into()),
        }
    }

    /// BUSY -> IDLE. Only legal from BUSY.
    pub(crate) fn release(&self) -> Result<(), Error> {
        let mut state = self.state.lock();
        match *state {
            SessionState::Busy => {
                *state = SessionState::Idle;
                Ok(())
            }
            other => Err(ClientError::IllegalSessionState(format!(
                "release on {other:?} session"
            ))
            .into()),
        }
    }

    pub(crate) fn invalidate(&self) {
        let mut state = self.state.lock();
        if *state != SessionState::Closed {
            *state = SessionState::Invalidated;
        }
        drop(state);
        self.invalidated.cancel();
    }

    /// Best-effort server-side delete. The session always reaches CLOSED and
    /// the attach stream is dropped, even when the call fails.
    pub(crate) async fn delete(&self) {
        {
            let mut state = self.state.lock();
            if *state == SessionState::Closed {
                return;
            }
            *state = SessionState::Closed;
        }
        if let Some(watchdog) = self.watchdog.lock().take() {
            watchdog.abort();
        }
        if let Err(e) = self.client.delete_session(&self.id, Some(self.node_id)).await {
            tracing::debug!(session_id = %self.id, "failed to delete session: {e}");
        }
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(driver: &Driver, id: &str, node_id: u32) -> Arc<QuerySession> {
        Arc::new(QuerySession {
            id: id.to_string(),
            node_id,
            client: driver.query_raw(),
            state: Mutex::new(SessionState::Idle),
            invalidated: CancellationToken::new(),
            watchdog: Mutex::new(None),
        })
    }
}

impl Drop for QuerySession {
    fn drop(&mut self) {
        if let Some(watchdog) = self.watchdog.lock().take() {
            watchdog.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriverOptions;

    async fn test_driver() -> Driver {
        let mut options = DriverOptions::default();
        options.enable_discovery = false;
        Driver::new("grpc://localhost:1/local", options, None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let driver = test_driver().await;
        let session = QuerySession::new_for_test(&driver, "s1", 1);
        assert_eq!(session.state(), SessionState::Idle);

        session.acquire().unwrap();
        assert_eq!(session.state(), SessionState::Busy);
        assert!(session.acquire().is_err(), "double acquire must fail");

        session.release().unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.release().is_err(), "release from idle must fail");
    }

    #[tokio::test]
    async fn test_invalidate_notifies_listeners() {
        let driver = test_driver().await;
        let session = QuerySession::new_for_test(&driver, "s1", 1);
        let token = session.on_invalidated();
        assert!(!token.is_cancelled());
        session.invalidate();
        assert_eq!(session.state(), SessionState::Invalidated);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_delete_reaches_closed_without_server() {
        let driver = test_driver().await;
        let session = QuerySession::new_for_test(&driver, "s1", 1);
        session.delete().await;
        assert_eq!(session.state(), SessionState::Closed);
        // a closed session stays closed
        session.invalidate();
        assert_eq!(session.state(), SessionState::Closed);
    }
}
