use std::mem;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::select;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use token_source::{TokenSource, TokenSourceProvider};

use crate::apiv1;
use crate::config::{ConnectionString, DriverOptions};
use crate::conn_pool::{AcquireOptions, ConnectionPool, Endpoint};
use crate::errors::{default_predicate, default_retryable, Error};
use ydb_gax::conn::Channel;
use ydb_gax::grpc::metadata::MetadataMap;
use ydb_gax::grpc::{Code, Status};
use ydb_gax::retry::{invoke, RetrySetting, TryAs};

/// Wraps the configured token source with the driver's token timeout.
#[derive(Debug)]
struct TimeoutTokenSource {
    inner: Arc<dyn TokenSource>,
    timeout: Duration,
}

#[async_trait::async_trait]
impl TokenSource for TimeoutTokenSource {
    async fn token(&self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        match tokio::time::timeout(self.timeout, self.inner.token()).await {
            Ok(result) => result,
            Err(_) => Err("token acquisition timed out".into()),
        }
    }
}

struct DriverInner {
    database: String,
    application: Option<String>,
    options: DriverOptions,
    pool: ConnectionPool,
    token_source: Option<Arc<dyn TokenSource>>,
    call_metadata: MetadataMap,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Root object of the client: owns the connection pool, keeps the endpoint
/// list fresh through periodic discovery and hands out service clients.
/// One driver per database URL; cloning is cheap and shares state.
#[derive(Clone)]
pub struct Driver {
    inner: Arc<DriverInner>,
}

impl Driver {
    pub async fn new(
        dsn: &str,
        options: DriverOptions,
        token_source_provider: Option<Box<dyn TokenSourceProvider>>,
    ) -> Result<Driver, Error> {
        options.validate()?;
        let connection_string = ConnectionString::parse(dsn)?;

        let token_source: Option<Arc<dyn TokenSource>> =
            token_source_provider.map(|provider| {
                Arc::new(TimeoutTokenSource {
                    inner: provider.token_source(),
                    timeout: options.token_timeout,
                }) as Arc<dyn TokenSource>
            });

        let pool = ConnectionPool::new(
            options.connection.clone(),
            token_source.clone(),
            options.local_dc.clone(),
        );
        // the primary connection keeps node id 0, which discovery never uses
        pool.add(Endpoint {
            host: connection_string.host.clone(),
            port: connection_string.port as u32,
            node_id: 0,
            location: String::new(),
            ssl: connection_string.ssl,
            ssl_target_name_override: None,
        })?;

        let call_metadata = apiv1::client_metadata(
            &connection_string.database,
            connection_string.application.as_deref(),
        );

        let driver = Driver {
            inner: Arc::new(DriverInner {
                database: connection_string.database,
                application: connection_string.application,
                options,
                pool,
                token_source,
                call_metadata,
                cancel: CancellationToken::new(),
                tasks: Mutex::new(Vec::new()),
            }),
        };

        if driver.inner.options.enable_discovery {
            driver.initial_discovery().await?;
            let task = driver.spawn_discovery_task();
            driver.inner.tasks.lock().push(task);
        }
        Ok(driver)
    }

    pub fn database(&self) -> &str {
        &self.inner.database
    }

    pub fn application(&self) -> Option<&str> {
        self.inner.application.as_deref()
    }

    pub(crate) fn options(&self) -> &DriverOptions {
        &self.inner.options
    }

    pub(crate) fn call_metadata(&self) -> MetadataMap {
        self.inner.call_metadata.clone()
    }

    pub(crate) fn max_message_size(&self) -> usize {
        self.inner.options.connection.max_message_size
    }

    /// Current bearer token, when a token source is configured. Streaming
    /// subsystems push it periodically through UpdateToken requests.
    pub(crate) async fn token(&self) -> Option<String> {
        let token_source = self.inner.token_source.clone()?;
        match token_source.token().await {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!("token refresh failed: {e}");
                None
            }
        }
    }

    /// Resolves a channel from the pool, optionally pinned to a node.
    pub(crate) fn channel(&self, prefer_node_id: Option<u32>) -> Result<(Channel, u32), Error> {
        let conn = self
            .inner
            .pool
            .acquire(prefer_node_id, &AcquireOptions::default())?;
        Ok((conn.channel(), conn.node_id()))
    }

    /// Pessimizes the node behind a failed call. NotFound is a caller error,
    /// not an endpoint fault.
    pub(crate) fn report_transport_error(&self, node_id: u32, status: &Status) {
        if status.code() != Code::NotFound {
            self.inner.pool.pessimize(node_id);
        }
    }

    pub fn discovery(&self) -> apiv1::discovery_client::Client {
        apiv1::discovery_client::Client::new(self.clone())
    }

    pub(crate) fn query_raw(&self) -> apiv1::query_client::Client {
        apiv1::query_client::Client::new(self.clone())
    }

    pub(crate) fn coordination_raw(&self) -> apiv1::coordination_client::Client {
        apiv1::coordination_client::Client::new(self.clone())
    }

    pub(crate) fn topic_raw(&self) -> apiv1::topic_client::Client {
        apiv1::topic_client::Client::new(self.clone())
    }

    /// Verifies end-to-end connectivity within the ready timeout.
    pub async fn ready(&self) -> Result<(), Error> {
        let timeout = self.inner.options.ready_timeout;
        match tokio::time::timeout(timeout, self.discovery().who_am_i(None, None)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(Error::Timeout),
        }
    }

    /// One discovery round without inner retries; callers drive the policy.
    async fn discover(&self) -> Result<usize, Error> {
        let mut single_attempt = RetrySetting::new(default_predicate());
        single_attempt.budget = 1;
        let discovery = self.discovery();
        let round =
            discovery.list_endpoints(Some(self.inner.cancel.child_token()), Some(single_attempt));
        let result =
            match tokio::time::timeout(self.inner.options.discovery_timeout, round).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(Status::deadline_exceeded("discovery round timed out").into())
                }
            };
        let count = result.endpoints.len();
        for info in &result.endpoints {
            self.inner.pool.add(Endpoint::from_info(info))?;
        }
        Ok(count)
    }

    async fn initial_discovery(&self) -> Result<(), Error> {
        let mut setting = RetrySetting::new(Box::new(|e: &Error, _| {
            // a timed-out round is worth another try during startup
            default_retryable(e, true)
                || e.try_as().map_or(false, |s| s.code() == Code::DeadlineExceeded)
        }));
        setting.idempotent = true;
        let driver = self.clone();
        let count = invoke(Some(self.inner.cancel.clone()), setting, move |_| {
            let driver = driver.clone();
            async move { driver.discover().await }
        })
        .await?;
        tracing::debug!(endpoints = count, "initial discovery complete");
        Ok(())
    }

    fn spawn_discovery_task(&self) -> JoinHandle<()> {
        let driver = self.clone();
        let cancel = self.inner.cancel.clone();
        let interval = self.inner.options.discovery_interval;
        let start = tokio::time::Instant::now() + interval;
        let mut timer = tokio::time::interval_at(start, interval);
        tokio::spawn(async move {
            loop {
                select! {
                    _ = timer.tick() => {},
                    _ = cancel.cancelled() => break,
                }
                match driver.discover().await {
                    Ok(count) => tracing::debug!(endpoints = count, "discovery refreshed"),
                    Err(e) => tracing::warn!("discovery round failed: {e}"),
                }
            }
            tracing::trace!("shutdown discovery task");
        })
    }

    /// Forced shutdown: aborts background work and drops all channels.
    /// Idempotent.
    pub fn dispose(&self) {
        self.inner.cancel.cancel();
        for task in self.inner.tasks.lock().drain(..) {
            task.abort();
        }
        self.inner.pool.close();
    }

    /// Graceful shutdown: stops background tasks and waits for them before
    /// closing the pool. Idempotent.
    pub async fn close(&self) {
        self.inner.cancel.cancel();
        let tasks = { mem::take(&mut *self.inner.tasks.lock()) };
        for task in tasks {
            let _ = task.await;
        }
        self.inner.pool.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_driver_without_discovery() {
        let mut options = DriverOptions::default();
        options.enable_discovery = false;
        let driver = Driver::new("grpc://localhost:2136/local", options, None)
            .await
            .unwrap();
        assert_eq!(driver.database(), "/local");
        let (_, node_id) = driver.channel(None).unwrap();
        assert_eq!(node_id, 0);
        driver.close().await;
        assert!(driver.channel(None).is_err());
    }

    #[tokio::test]
    async fn test_driver_rejects_bad_options() {
        let mut options = DriverOptions::default();
        options.discovery_interval = Duration::from_secs(1);
        let result = Driver::new("grpc://localhost:2136/local", options, None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_dispose_is_idempotent() {
        let mut options = DriverOptions::default();
        options.enable_discovery = false;
        let driver = Driver::new("grpc://localhost:2136/local", options, None)
            .await
            .unwrap();
        driver.dispose();
        driver.dispose();
        driver.close().await;
    }
}
