use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

use crate::coordination::session::CoordinationSession;
use crate::errors::Error;

/// Handle to an acquired semaphore. Explicit release is preferred; dropping
/// the handle releases best-effort in the background.
pub struct Lock {
    session: CoordinationSession,
    name: String,
    released: AtomicBool,
    expired: CancellationToken,
}

impl Lock {
    pub(crate) fn new(
        session: CoordinationSession,
        name: String,
        expired: CancellationToken,
    ) -> Lock {
        Lock {
            session,
            name,
            released: AtomicBool::new(false),
            expired,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fires when the owning session expires, so work depending on the lock
    /// can stop.
    pub fn signal(&self) -> CancellationToken {
        self.expired.clone()
    }

    /// Idempotent. Returns the server's `released` flag; repeated calls
    /// return false without another request.
    pub async fn release(&self) -> Result<bool, Error> {
        if self.released.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }
        self.session.release_semaphore(&self.name).await
    }
}

impl Drop for Lock {
    fn drop(&mut self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        let session = self.session.clone();
        let name = std::mem::take(&mut self.name);
        let _forget = tokio::spawn(async move {
            if let Err(e) = session.release_semaphore(&name).await {
                tracing::debug!("failed to release lock {name}: {e}");
            }
        });
    }
}
