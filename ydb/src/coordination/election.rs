use std::time::Duration;

use futures_util::{Stream, StreamExt};
use tokio::select;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::coordination::session::{AcquireOptions, CoordinationSession, WatchOptions};
use crate::errors::Error;

/// One observation of the current leader.
pub struct LeaderEvent {
    /// Data published by the leader at acquire time.
    pub data: Vec<u8>,
    pub is_me: bool,
    /// Fires when leadership changes again, so work tied to this leader can
    /// stop.
    pub signal: CancellationToken,
}

struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Leader election over a `limit=1` semaphore: every participant runs an
/// endless acquire loop while following owner changes. The first owner in
/// each description is the current leader.
pub fn elect(
    session: CoordinationSession,
    name: &str,
    data: Vec<u8>,
) -> impl Stream<Item = Result<LeaderEvent, Error>> + Send + 'static {
    let name = name.to_string();
    async_stream::try_stream! {
        let cancel = CancellationToken::new();
        let _cancel_guard = cancel.clone().drop_guard();
        let _acquire_task = AbortOnDrop(tokio::spawn(acquire_loop(
            session.clone(),
            name.clone(),
            data,
            cancel.clone(),
        )));

        let watch = session.watch_semaphore(
            &name,
            WatchOptions {
                owners: true,
                include_owners: true,
                ..Default::default()
            },
        );
        futures_util::pin_mut!(watch);

        let mut current: Option<CancellationToken> = None;
        while let Some(description) = watch.next().await {
            let description = description?;
            let Some(owner) = description.owners.first() else {
                continue;
            };
            let signal = CancellationToken::new();
            if let Some(previous) = current.replace(signal.clone()) {
                previous.cancel();
            }
            yield LeaderEvent {
                data: owner.data.clone(),
                is_me: owner.session_id == session.session_id(),
                signal,
            };
        }
    }
}

/// Keeps one acquire outstanding; on success holds the lock until the
/// session expires or the election is dropped.
async fn acquire_loop(
    session: CoordinationSession,
    name: String,
    data: Vec<u8>,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            return;
        }
        let acquire = session.acquire_semaphore(
            &name,
            AcquireOptions {
                count: Some(1),
                timeout: Some(Duration::from_millis(u64::MAX)),
                data: data.clone(),
                ephemeral: false,
            },
        );
        let lock = select! {
            _ = cancel.cancelled() => return,
            result = acquire => match result {
                Ok(lock) => lock,
                Err(e) => {
                    tracing::debug!("election acquire failed: {e}");
                    select! {
                        _ = cancel.cancelled() => return,
                        _ = tokio::time::sleep(Duration::from_secs(1)) => continue,
                    }
                }
            },
        };
        // leadership holds until the session expires or the caller stops
        let signal = lock.signal();
        select! {
            _ = cancel.cancelled() => {
                let _ = lock.release().await;
                return;
            }
            _ = signal.cancelled() => continue,
        }
    }
}
