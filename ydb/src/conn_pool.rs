use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use token_source::TokenSource;

use crate::errors::{ClientError, Error};
use ydb_apis::discovery::EndpointInfo;
use ydb_gax::conn::{build_channel, Channel, ConnectionOptions};

/// How long a faulty connection is excluded from primary selection.
const PESSIMIZATION_INTERVAL: Duration = Duration::from_secs(60);

/// Address record published by discovery. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u32,
    /// Stable numeric node identifier across discovery rounds.
    pub node_id: u32,
    /// Datacenter tag.
    pub location: String,
    pub ssl: bool,
    pub ssl_target_name_override: Option<String>,
}

impl Endpoint {
    pub(crate) fn from_info(info: &EndpointInfo) -> Endpoint {
        Endpoint {
            host: info.address.clone(),
            port: info.port,
            node_id: info.node_id,
            location: info.location.clone(),
            ssl: info.ssl,
            ssl_target_name_override: if info.ssl_target_name_override.is_empty() {
                None
            } else {
                Some(info.ssl_target_name_override.clone())
            },
        }
    }

    pub fn uri(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

/// One lazily established channel to one database node. Closing the
/// connection drops the channel and every stream running on it.
pub struct Connection {
    endpoint: Endpoint,
    channel: Channel,
    pessimized_until: Mutex<Option<Instant>>,
}

impl Connection {
    fn new(endpoint: Endpoint, channel: Channel) -> Connection {
        Connection {
            endpoint,
            channel,
            pessimized_until: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn node_id(&self) -> u32 {
        self.endpoint.node_id
    }

    /// clone() reuses the underlying http/2 connection.
    pub fn channel(&self) -> Channel {
        self.channel.clone()
    }

    fn pessimize_until(&self, deadline: Instant) {
        *self.pessimized_until.lock() = Some(deadline);
    }

    fn is_pessimized(&self, now: Instant) -> bool {
        self.pessimized_until.lock().map_or(false, |d| d > now)
    }

    fn clear_pessimization(&self) {
        *self.pessimized_until.lock() = None;
    }
}

#[derive(Debug, Clone)]
pub struct AcquireOptions {
    /// Restrict selection to these datacenter tags.
    pub preferred_locations: Option<Vec<String>>,
    /// Restrict selection to the configured local datacenter.
    pub prefer_local: bool,
    /// Widen to the full set when the filtered set is empty.
    pub allow_fallback: bool,
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self {
            preferred_locations: None,
            prefer_local: false,
            allow_fallback: true,
        }
    }
}

struct Sets {
    good: VecDeque<Arc<Connection>>,
    pessimized: VecDeque<Arc<Connection>>,
    closed: bool,
}

/// Ordered sets of good and pessimized connections. A connection lives in
/// exactly one set; lapsed pessimization deadlines migrate it back to good on
/// the next selection.
pub struct ConnectionPool {
    inner: Mutex<Sets>,
    options: ConnectionOptions,
    token_source: Option<Arc<dyn TokenSource>>,
    local_dc: Option<String>,
}

impl ConnectionPool {
    pub fn new(
        options: ConnectionOptions,
        token_source: Option<Arc<dyn TokenSource>>,
        local_dc: Option<String>,
    ) -> ConnectionPool {
        ConnectionPool {
            inner: Mutex::new(Sets {
                good: VecDeque::new(),
                pessimized: VecDeque::new(),
                closed: false,
            }),
            options,
            token_source,
            local_dc,
        }
    }

    /// Creates a lazy connection for the endpoint, replacing any existing
    /// connection for the same node id.
    pub fn add(&self, endpoint: Endpoint) -> Result<(), Error> {
        let channel = build_channel(
            endpoint.uri(),
            endpoint.ssl,
            endpoint.ssl_target_name_override.as_deref(),
            &self.options,
            self.token_source.clone(),
        )
        .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        let conn = Arc::new(Connection::new(endpoint, channel));

        let mut sets = self.inner.lock();
        if sets.closed {
            return Err(ClientError::PoolClosed.into());
        }
        let node_id = conn.node_id();
        sets.good.retain(|c| c.node_id() != node_id);
        sets.pessimized.retain(|c| c.node_id() != node_id);
        sets.good.push_back(conn);
        Ok(())
    }

    /// Selection order: exact node match among good, round-robin good,
    /// preferred match among pessimized, round-robin pessimized.
    pub fn acquire(
        &self,
        prefer_node_id: Option<u32>,
        options: &AcquireOptions,
    ) -> Result<Arc<Connection>, Error> {
        let mut sets = self.inner.lock();
        if sets.closed {
            return Err(ClientError::PoolClosed.into());
        }

        let now = Instant::now();
        revive_lapsed(&mut sets, now);

        let filter = match &options.preferred_locations {
            Some(locations) => Some(locations.clone()),
            None if options.prefer_local => self.local_dc.clone().map(|dc| vec![dc]),
            None => None,
        };

        if let Some(conn) = select(&mut sets, prefer_node_id, filter.as_deref()) {
            return Ok(conn);
        }
        if filter.is_some() && options.allow_fallback {
            if let Some(conn) = select(&mut sets, prefer_node_id, None) {
                return Ok(conn);
            }
        }
        Err(ClientError::NoConnectionAvailable.into())
    }

    /// Excludes the node from primary selection for the pessimization interval.
    pub fn pessimize(&self, node_id: u32) {
        self.pessimize_with_deadline(node_id, Instant::now() + PESSIMIZATION_INTERVAL);
    }

    fn pessimize_with_deadline(&self, node_id: u32, deadline: Instant) {
        let mut sets = self.inner.lock();
        if let Some(pos) = sets.good.iter().position(|c| c.node_id() == node_id) {
            let conn = sets.good.remove(pos).unwrap();
            conn.pessimize_until(deadline);
            tracing::debug!(node_id, "connection pessimized");
            sets.pessimized.push_back(conn);
        } else if let Some(conn) = sets.pessimized.iter().find(|c| c.node_id() == node_id) {
            conn.pessimize_until(deadline);
        }
    }

    pub fn close(&self) {
        let mut sets = self.inner.lock();
        sets.closed = true;
        sets.good.clear();
        sets.pessimized.clear();
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        let sets = self.inner.lock();
        sets.good
            .iter()
            .chain(sets.pessimized.iter())
            .map(|c| c.endpoint().clone())
            .collect()
    }

    #[cfg(test)]
    fn pessimize_for_test(&self, node_id: u32, deadline: Instant) {
        self.pessimize_with_deadline(node_id, deadline);
    }
}

fn revive_lapsed(sets: &mut Sets, now: Instant) {
    let mut index = 0;
    while index < sets.pessimized.len() {
        if sets.pessimized[index].is_pessimized(now) {
            index += 1;
        } else {
            let conn = sets.pessimized.remove(index).unwrap();
            conn.clear_pessimization();
            tracing::debug!(node_id = conn.node_id(), "pessimization lapsed");
            sets.good.push_back(conn);
        }
    }
}

fn select(
    sets: &mut Sets,
    prefer_node_id: Option<u32>,
    filter: Option<&[String]>,
) -> Option<Arc<Connection>> {
    take(&mut sets.good, prefer_node_id, filter)
        .or_else(|| take(&mut sets.pessimized, prefer_node_id, filter))
}

/// Removes the selected connection and re-inserts it at the tail, which is
/// what makes repeated selection round-robin.
fn take(
    set: &mut VecDeque<Arc<Connection>>,
    prefer_node_id: Option<u32>,
    filter: Option<&[String]>,
) -> Option<Arc<Connection>> {
    let matches = |conn: &Arc<Connection>| {
        filter.map_or(true, |locations| {
            locations.iter().any(|l| *l == conn.endpoint().location)
        })
    };
    let position = prefer_node_id
        .and_then(|node| {
            set.iter()
                .position(|c| c.node_id() == node && matches(c))
        })
        .or_else(|| set.iter().position(matches))?;
    let conn = set.remove(position).unwrap();
    set.push_back(conn.clone());
    Some(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(node_id: u32, location: &str) -> Endpoint {
        Endpoint {
            host: "localhost".to_string(),
            port: 2000 + node_id,
            node_id,
            location: location.to_string(),
            ssl: false,
            ssl_target_name_override: None,
        }
    }

    fn pool_with(endpoints: Vec<Endpoint>) -> ConnectionPool {
        let pool = ConnectionPool::new(ConnectionOptions::default(), None, None);
        for e in endpoints {
            pool.add(e).unwrap();
        }
        pool
    }

    #[test]
    fn test_round_robin_order() {
        let pool = pool_with(vec![endpoint(1, "a"), endpoint(2, "a"), endpoint(3, "a")]);
        let options = AcquireOptions::default();
        let order: Vec<u32> = (0..6)
            .map(|_| pool.acquire(None, &options).unwrap().node_id())
            .collect();
        assert_eq!(order, vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn test_preferred_node() {
        let pool = pool_with(vec![endpoint(1, "a"), endpoint(2, "a"), endpoint(3, "a")]);
        let options = AcquireOptions::default();
        for _ in 0..3 {
            assert_eq!(pool.acquire(Some(2), &options).unwrap().node_id(), 2);
        }
        // an unknown preferred node falls back to round robin
        assert_eq!(pool.acquire(Some(9), &options).unwrap().node_id(), 1);
    }

    #[test]
    fn test_pessimized_skipped_while_good_exist() {
        let pool = pool_with(vec![endpoint(1, "a"), endpoint(2, "a")]);
        let options = AcquireOptions::default();
        pool.pessimize(1);
        for _ in 0..3 {
            assert_eq!(pool.acquire(None, &options).unwrap().node_id(), 2);
        }
        // even when preferred
        assert_eq!(pool.acquire(Some(1), &options).unwrap().node_id(), 2);
    }

    #[test]
    fn test_pessimized_used_when_no_good_left() {
        let pool = pool_with(vec![endpoint(1, "a"), endpoint(2, "a")]);
        let options = AcquireOptions::default();
        pool.pessimize(1);
        pool.pessimize(2);
        assert_eq!(pool.acquire(None, &options).unwrap().node_id(), 1);
        assert_eq!(pool.acquire(None, &options).unwrap().node_id(), 2);
    }

    #[test]
    fn test_pessimization_lapses() {
        let pool = pool_with(vec![endpoint(1, "a"), endpoint(2, "a")]);
        let options = AcquireOptions::default();
        pool.pessimize_for_test(1, Instant::now() - Duration::from_secs(1));
        // node 1 migrates back to good (at the tail) on the next selection
        assert_eq!(pool.acquire(None, &options).unwrap().node_id(), 2);
        assert_eq!(pool.acquire(None, &options).unwrap().node_id(), 1);
    }

    #[test]
    fn test_location_filter_and_fallback() {
        let pool = ConnectionPool::new(ConnectionOptions::default(), None, None);
        pool.add(endpoint(1, "dc1")).unwrap();
        pool.add(endpoint(2, "dc2")).unwrap();
        let options = AcquireOptions {
            preferred_locations: Some(vec!["dc2".to_string()]),
            ..Default::default()
        };
        for _ in 0..3 {
            assert_eq!(pool.acquire(None, &options).unwrap().node_id(), 2);
        }

        let missing = AcquireOptions {
            preferred_locations: Some(vec!["dc9".to_string()]),
            ..Default::default()
        };
        // empty filtered set widens to the full set
        assert_eq!(pool.acquire(None, &missing).unwrap().node_id(), 1);

        let no_fallback = AcquireOptions {
            preferred_locations: Some(vec!["dc9".to_string()]),
            allow_fallback: false,
            ..Default::default()
        };
        assert!(matches!(
            pool.acquire(None, &no_fallback),
            Err(Error::Client(ClientError::NoConnectionAvailable))
        ));
    }

    #[test]
    fn test_local_dc_filter() {
        let pool =
            ConnectionPool::new(ConnectionOptions::default(), None, Some("dc1".to_string()));
        pool.add(endpoint(1, "dc1")).unwrap();
        pool.add(endpoint(2, "dc2")).unwrap();
        let options = AcquireOptions {
            prefer_local: true,
            ..Default::default()
        };
        for _ in 0..3 {
            assert_eq!(pool.acquire(None, &options).unwrap().node_id(), 1);
        }
    }

    #[test]
    fn test_add_replaces_same_node() {
        let pool = pool_with(vec![endpoint(1, "a")]);
        pool.add(endpoint(1, "b")).unwrap();
        let endpoints = pool.endpoints();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].location, "b");
    }

    #[test]
    fn test_closed_pool() {
        let pool = pool_with(vec![endpoint(1, "a")]);
        pool.close();
        assert!(matches!(
            pool.acquire(None, &AcquireOptions::default()),
            Err(Error::Client(ClientError::PoolClosed))
        ));
        assert!(pool.add(endpoint(2, "a")).is_err());
    }

    #[test]
    fn test_empty_pool() {
        let pool = ConnectionPool::new(ConnectionOptions::default(), None, None);
        assert!(matches!(
            pool.acquire(None, &AcquireOptions::default()),
            Err(Error::Client(ClientError::NoConnectionAvailable))
        ));
    }
}
