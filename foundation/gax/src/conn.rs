use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use http::header::AUTHORIZATION;
use http::{HeaderValue, Request};
use tonic::body::BoxBody;
use tonic::transport::{Channel as TonicChannel, ClientTlsConfig, Endpoint};
use tonic::{Code, Status};
use tower::filter::{AsyncFilter, AsyncFilterLayer, AsyncPredicate};
use tower::util::Either;
use tower::{BoxError, ServiceBuilder};

use token_source::TokenSource;

pub type Channel = Either<AsyncFilter<TonicChannel, AsyncAuthInterceptor>, TonicChannel>;

/// Per-call middleware resolving a bearer token and attaching it as the
/// `authorization` header.
#[derive(Clone, Debug)]
pub struct AsyncAuthInterceptor {
    token_source: Arc<dyn TokenSource>,
}

impl AsyncAuthInterceptor {
    fn new(token_source: Arc<dyn TokenSource>) -> Self {
        Self { token_source }
    }
}

impl AsyncPredicate<Request<BoxBody>> for AsyncAuthInterceptor {
    type Future = Pin<Box<dyn Future<Output = Result<Self::Request, BoxError>> + Send>>;
    type Request = Request<BoxBody>;

    fn check(&mut self, request: Request<BoxBody>) -> Self::Future {
        let ts = self.token_source.clone();
        Box::pin(async move {
            let token = ts
                .token()
                .await
                .map_err(|e| Status::new(Code::Unauthenticated, format!("token error: {e:?}")))?;
            let token_header = HeaderValue::from_str(token.as_str())
                .map_err(|e| Status::new(Code::Unauthenticated, format!("token error: {e:?}")))?;
            let (mut parts, body) = request.into_parts();
            parts.headers.insert(AUTHORIZATION, token_header);
            Ok(Request::from_parts(parts, body))
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("tonic error : {0}")]
    TonicTransport(#[from] tonic::transport::Error),

    #[error("invalid endpoint uri: {0}")]
    InvalidUri(String),
}

#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    /// HTTP/2 keepalive ping interval.
    pub keep_alive_interval: Duration,
    /// How long to wait for a keepalive pong before closing the channel.
    pub keep_alive_timeout: Duration,
    pub keep_alive_while_idle: bool,
    /// Maximum encoded size of inbound and outbound messages.
    /// Applied by the generated clients, not by the transport.
    pub max_message_size: usize,
    /// First delay of the stream reconnection loops built on this channel.
    pub initial_reconnect_backoff: Duration,
    /// Cap for the stream reconnection loops built on this channel.
    pub max_reconnect_backoff: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            keep_alive_interval: Duration::from_secs(30),
            keep_alive_timeout: Duration::from_secs(5),
            keep_alive_while_idle: true,
            max_message_size: 64 * 1024 * 1024,
            initial_reconnect_backoff: Duration::from_millis(50),
            max_reconnect_backoff: Duration::from_secs(5),
        }
    }
}

impl ConnectionOptions {
    fn apply(&self, mut endpoint: Endpoint) -> Endpoint {
        endpoint = match self.timeout {
            Some(t) => endpoint.timeout(t),
            None => endpoint,
        };
        endpoint = match self.connect_timeout {
            Some(t) => endpoint.connect_timeout(t),
            None => endpoint,
        };
        endpoint
            .http2_keep_alive_interval(self.keep_alive_interval)
            .keep_alive_timeout(self.keep_alive_timeout)
            .keep_alive_while_idle(self.keep_alive_while_idle)
    }
}

/// Builds a lazily connected channel. No I/O happens until the first call,
/// so channels can be created for every discovered endpoint up front.
pub fn build_channel(
    uri: impl Into<String>,
    tls: bool,
    sni_override: Option<&str>,
    options: &ConnectionOptions,
    token_source: Option<Arc<dyn TokenSource>>,
) -> Result<Channel, Error> {
    let uri = uri.into();
    let mut endpoint =
        TonicChannel::from_shared(uri.clone().into_bytes()).map_err(|_| Error::InvalidUri(uri))?;
    if tls {
        let mut tls_config = ClientTlsConfig::new();
        if let Some(domain) = sni_override {
            tls_config = tls_config.domain_name(domain);
        }
        endpoint = endpoint.tls_config(tls_config)?;
    }
    let channel = options.apply(endpoint).connect_lazy();

    // token per call, reusing the same underlying http/2 connection
    let auth_layer = token_source.map(|ts| AsyncFilterLayer::new(AsyncAuthInterceptor::new(ts)));
    Ok(ServiceBuilder::new().option_layer(auth_layer).service(channel))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_channel_is_lazy() {
        // no server is listening on this port; construction must still succeed
        let channel = build_channel(
            "http://localhost:1",
            false,
            None,
            &ConnectionOptions::default(),
            None,
        );
        assert!(channel.is_ok());
    }

    #[test]
    fn test_build_channel_rejects_bad_uri() {
        let channel = build_channel(
            "not a uri",
            false,
            None,
            &ConnectionOptions::default(),
            None,
        );
        assert!(matches!(channel, Err(Error::InvalidUri(_))));
    }
}
