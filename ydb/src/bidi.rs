use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use parking_lot::Mutex;
use tokio::select;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::errors::{ClientError, Error};

/// Effect of an inbound message, decided by the handler before request
/// matching runs.
pub(crate) enum Action<Req> {
    Nothing,
    /// Enqueue an immediate reply (e.g. pong for ping).
    Reply(Req),
    /// Tear the stream down; pending requests are preserved for replay.
    Disconnect,
}

/// Per-subsystem protocol hooks of the full-duplex wrapper.
pub(crate) trait BidiHandler: Send + Sync + 'static {
    type Req: Clone + Send + 'static;
    type Res: Send + 'static;

    /// Applies state effects of an inbound message. Must not block.
    fn on_response(&self, message: &Self::Res) -> Action<Self::Req>;

    /// Request id the message answers, if any.
    fn request_id(&self, message: &Self::Res) -> Option<u64>;

    /// Validates a matched message; an error rejects the pending request.
    fn check(&self, message: &Self::Res) -> Result<(), Error>;
}

struct Pending<Req, Res> {
    /// The original request, kept for replay after reconnect.
    request: Req,
    tx: oneshot::Sender<Result<Res, Error>>,
}

struct State<Req, Res> {
    queue: Option<async_channel::Sender<Req>>,
    pending: HashMap<u64, Pending<Req, Res>>,
    /// Fire-and-forget requests, also kept for replay.
    fire_and_forget: Vec<Req>,
    reader: Option<JoinHandle<()>>,
    stream_cancel: CancellationToken,
    closed: bool,
}

/// Single-writer/single-reader full-duplex wrapper over a bidirectional RPC.
/// Survives reconnects: `disconnect` preserves in-flight requests and the
/// next `start` replays them on the fresh stream.
pub(crate) struct BidiStream<H: BidiHandler> {
    handler: Arc<H>,
    state: Mutex<State<H::Req, H::Res>>,
    connected: watch::Sender<bool>,
}

const QUEUE_CAPACITY: usize = 64;

impl<H: BidiHandler> BidiStream<H> {
    pub fn new(handler: Arc<H>) -> Arc<BidiStream<H>> {
        let (connected, _) = watch::channel(false);
        Arc::new(BidiStream {
            handler,
            state: Mutex::new(State {
                queue: None,
                pending: HashMap::new(),
                fire_and_forget: Vec::new(),
                reader: None,
                stream_cancel: CancellationToken::new(),
                closed: false,
            }),
            connected,
        })
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    /// Opens a fresh stream: new outgoing queue seeded with `initial`, reader
    /// task launched, then all pending and fire-and-forget requests replayed.
    pub async fn start<S, F, Fut>(
        self: &Arc<Self>,
        create_stream: F,
        initial: H::Req,
    ) -> Result<(), Error>
    where
        F: FnOnce(async_channel::Receiver<H::Req>) -> Fut,
        Fut: Future<Output = Result<S, Error>>,
        S: Stream<Item = Result<H::Res, ydb_gax::grpc::Status>> + Send + Unpin + 'static,
    {
        let (tx, rx) = async_channel::bounded(QUEUE_CAPACITY);
        let (replay, cancel) = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(ClientError::Disposed.into());
            }
            if let Some(previous) = state.reader.take() {
                previous.abort();
            }
            state.stream_cancel = CancellationToken::new();
            state.queue = Some(tx.clone());
            let mut replay: Vec<H::Req> =
                state.pending.values().map(|p| p.request.clone()).collect();
            replay.extend(state.fire_and_forget.iter().cloned());
            (replay, state.stream_cancel.clone())
        };

        let _ = tx.send(initial).await;
        let stream = match create_stream(rx).await {
            Ok(stream) => stream,
            Err(e) => {
                self.disconnect();
                return Err(e);
            }
        };

        let _ = self.connected.send(true);
        let reader = tokio::spawn({
            let this = Arc::clone(self);
            async move { this.read_loop(stream, cancel).await }
        });
        self.state.lock().reader = Some(reader);

        for request in replay {
            let _ = tx.send(request).await;
        }
        Ok(())
    }

    async fn read_loop<S>(self: Arc<Self>, mut stream: S, cancel: CancellationToken)
    where
        S: Stream<Item = Result<H::Res, ydb_gax::grpc::Status>> + Send + Unpin + 'static,
    {
        loop {
            let message = select! {
                _ = cancel.cancelled() => break,
                item = stream.next() => item,
            };
            let message = match message {
                Some(Ok(message)) => message,
                Some(Err(status)) => {
                    tracing::debug!("stream read error: {status}");
                    break;
                }
                None => break,
            };
            let mut teardown = false;
            match self.handler.on_response(&message) {
                Action::Nothing => {}
                Action::Reply(reply) => self.push(reply),
                Action::Disconnect => teardown = true,
            }
            if let Some(req_id) = self.handler.request_id(&message) {
                // removed from the map before the caller resumes
                let entry = self.state.lock().pending.remove(&req_id);
                if let Some(entry) = entry {
                    let result = match self.handler.check(&message) {
                        Ok(()) => Ok(message),
                        Err(e) => Err(e),
                    };
                    let _ = entry.tx.send(result);
                }
            }
            if teardown {
                break;
            }
        }
        self.disconnect();
    }

    /// Registers a pending entry and pushes the request. If the queue is
    /// already closed the entry stays registered and is replayed after the
    /// next reconnect.
    pub async fn send_request(
        &self,
        req_id: u64,
        request: H::Req,
        cancel: Option<&CancellationToken>,
    ) -> Result<H::Res, Error> {
        let (tx, rx) = oneshot::channel();
        let queue = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(ClientError::StreamClosed.into());
            }
            state.pending.insert(
                req_id,
                Pending {
                    request: request.clone(),
                    tx,
                },
            );
            state.queue.clone()
        };
        if let Some(queue) = queue {
            let _ = queue.send(request).await;
        }

        let wait = async {
            match rx.await {
                Ok(result) => result,
                Err(_) => Err(ClientError::StreamClosed.into()),
            }
        };
        match cancel {
            Some(token) => {
                select! {
                    _ = token.cancelled() => {
                        self.state.lock().pending.remove(&req_id);
                        Err(Error::Cancelled)
                    }
                    result = wait => result,
                }
            }
            None => wait.await,
        }
    }

    /// Fire-and-forget with the same queue-closed preservation rule.
    pub async fn send(&self, request: H::Req) -> Result<(), Error> {
        let queue = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(ClientError::StreamClosed.into());
            }
            state.fire_and_forget.push(request.clone());
            state.queue.clone()
        };
        if let Some(queue) = queue {
            let _ = queue.send(request).await;
        }
        Ok(())
    }

    /// Best-effort immediate push that is not replayed (pong replies).
    pub fn push(&self, request: H::Req) {
        let queue = self.state.lock().queue.clone();
        if let Some(queue) = queue {
            let _ = queue.try_send(request);
        }
    }

    /// Tears the stream down while preserving pending requests. Used to
    /// trigger reconnection.
    pub fn disconnect(&self) {
        {
            let mut state = self.state.lock();
            if let Some(queue) = state.queue.take() {
                queue.close();
            }
            state.stream_cancel.cancel();
        }
        let _ = self.connected.send(false);
    }

    /// Permanent shutdown; every pending request is rejected.
    pub async fn close(&self) {
        let (pending, reader) = {
            let mut state = self.state.lock();
            state.closed = true;
            if let Some(queue) = state.queue.take() {
                queue.close();
            }
            state.stream_cancel.cancel();
            state.fire_and_forget.clear();
            (
                state.pending.drain().collect::<Vec<_>>(),
                state.reader.take(),
            )
        };
        for (_, entry) in pending {
            let _ = entry.tx.send(Err(ClientError::StreamClosed.into()));
        }
        if let Some(reader) = reader {
            let _ = reader.await;
        }
        let _ = self.connected.send(false);
    }

    /// Resolves when the reader coroutine exits.
    pub async fn wait_for_disconnect(&self) {
        let mut rx = self.connected.subscribe();
        loop {
            if !*rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct TestResponse {
        req_id: u64,
        ok: bool,
        ping: bool,
    }

    struct TestHandler {
        pings_seen: AtomicU64,
    }

    impl BidiHandler for TestHandler {
        type Req = u64;
        type Res = TestResponse;

        fn on_response(&self, message: &TestResponse) -> Action<u64> {
            if message.ping {
                self.pings_seen.fetch_add(1, Ordering::SeqCst);
                return Action::Reply(999);
            }
            Action::Nothing
        }

        fn request_id(&self, message: &TestResponse) -> Option<u64> {
            (message.req_id != 0).then_some(message.req_id)
        }

        fn check(&self, message: &TestResponse) -> Result<(), Error> {
            if message.ok {
                Ok(())
            } else {
                Err(ClientError::MalformedResult("refused".to_string()).into())
            }
        }
    }

    struct FakeServer {
        outgoing: async_channel::Receiver<u64>,
        inbound: async_channel::Sender<Result<TestResponse, ydb_gax::grpc::Status>>,
    }

    async fn connect(
        harness: &Arc<BidiStream<TestHandler>>,
        initial: u64,
    ) -> FakeServer {
        let (inbound_tx, inbound_rx) = async_channel::unbounded();
        let mut server = None;
        harness
            .start(
                |outgoing| {
                    server = Some(outgoing);
                    async move { Ok(inbound_rx) }
                },
                initial,
            )
            .await
            .unwrap();
        FakeServer {
            outgoing: server.unwrap(),
            inbound: inbound_tx,
        }
    }

    fn harness() -> Arc<BidiStream<TestHandler>> {
        BidiStream::new(Arc::new(TestHandler {
            pings_seen: AtomicU64::new(0),
        }))
    }

    #[tokio::test]
    async fn test_request_response() {
        let harness = harness();
        let server = connect(&harness, 1).await;
        assert_eq!(server.outgoing.recv().await.unwrap(), 1);

        let request = tokio::spawn({
            let harness = Arc::clone(&harness);
            async move { harness.send_request(7, 7, None).await }
        });
        assert_eq!(server.outgoing.recv().await.unwrap(), 7);
        server
            .inbound
            .send(Ok(TestResponse {
                req_id: 7,
                ok: true,
                ping: false,
            }))
            .await
            .unwrap();
        let response = request.await.unwrap().unwrap();
        assert_eq!(response.req_id, 7);
        // the pending entry is gone once the caller resumed
        assert_eq!(harness.pending_len(), 0);
        harness.close().await;
    }

    #[tokio::test]
    async fn test_check_failure_rejects() {
        let harness = harness();
        let server = connect(&harness, 1).await;
        let request = tokio::spawn({
            let harness = Arc::clone(&harness);
            async move { harness.send_request(2, 2, None).await }
        });
        let _ = server.outgoing.recv().await;
        let _ = server.outgoing.recv().await;
        server
            .inbound
            .send(Ok(TestResponse {
                req_id: 2,
                ok: false,
                ping: false,
            }))
            .await
            .unwrap();
        assert!(request.await.unwrap().is_err());
        harness.close().await;
    }

    #[tokio::test]
    async fn test_reply_action() {
        let harness = harness();
        let server = connect(&harness, 1).await;
        let _ = server.outgoing.recv().await;
        server
            .inbound
            .send(Ok(TestResponse {
                req_id: 0,
                ok: true,
                ping: true,
            }))
            .await
            .unwrap();
        // the pong reply lands on the outgoing queue
        assert_eq!(server.outgoing.recv().await.unwrap(), 999);
        assert_eq!(harness.handler().pings_seen.load(Ordering::SeqCst), 1);
        harness.close().await;
    }

    #[tokio::test]
    async fn test_pending_survives_reconnect_and_is_replayed() {
        let harness = harness();
        let server = connect(&harness, 1).await;
        let _ = server.outgoing.recv().await;

        let request = tokio::spawn({
            let harness = Arc::clone(&harness);
            async move { harness.send_request(5, 5, None).await }
        });
        assert_eq!(server.outgoing.recv().await.unwrap(), 5);

        // connection drops before the response arrives
        harness.disconnect();
        harness.wait_for_disconnect().await;
        assert_eq!(harness.pending_len(), 1);

        let server2 = connect(&harness, 1).await;
        assert_eq!(server2.outgoing.recv().await.unwrap(), 1, "initial request");
        assert_eq!(server2.outgoing.recv().await.unwrap(), 5, "replayed request");
        server2
            .inbound
            .send(Ok(TestResponse {
                req_id: 5,
                ok: true,
                ping: false,
            }))
            .await
            .unwrap();
        assert!(request.await.unwrap().is_ok());
        harness.close().await;
    }

    #[tokio::test]
    async fn test_fire_and_forget_replayed() {
        let harness = harness();
        let server = connect(&harness, 1).await;
        let _ = server.outgoing.recv().await;
        harness.send(42).await.unwrap();
        assert_eq!(server.outgoing.recv().await.unwrap(), 42);

        harness.disconnect();
        let server2 = connect(&harness, 1).await;
        assert_eq!(server2.outgoing.recv().await.unwrap(), 1);
        assert_eq!(server2.outgoing.recv().await.unwrap(), 42);
        harness.close().await;
    }

    #[tokio::test]
    async fn test_cancel_removes_pending() {
        let harness = harness();
        let server = connect(&harness, 1).await;
        let _ = server.outgoing.recv().await;

        let cancel = CancellationToken::new();
        let request = tokio::spawn({
            let harness = Arc::clone(&harness);
            let cancel = cancel.clone();
            async move { harness.send_request(3, 3, Some(&cancel)).await }
        });
        let _ = server.outgoing.recv().await;
        cancel.cancel();
        assert!(matches!(request.await.unwrap(), Err(Error::Cancelled)));
        assert_eq!(harness.pending_len(), 0);
        harness.close().await;
    }

    #[tokio::test]
    async fn test_close_rejects_pending() {
        let harness = harness();
        let server = connect(&harness, 1).await;
        let _ = server.outgoing.recv().await;
        let request = tokio::spawn({
            let harness = Arc::clone(&harness);
            async move { harness.send_request(4, 4, None).await }
        });
        let _ = server.outgoing.recv().await;
        harness.close().await;
        assert!(matches!(
            request.await.unwrap(),
            Err(Error::Client(ClientError::StreamClosed))
        ));
        // permanently closed
        assert!(harness.send(1).await.is_err());
        drop(server);
    }

    #[tokio::test]
    async fn test_reader_exit_triggers_disconnect() {
        let harness = harness();
        let server = connect(&harness, 1).await;
        let _ = server.outgoing.recv().await;
        drop(server.inbound);
        tokio::time::timeout(Duration::from_secs(1), harness.wait_for_disconnect())
            .await
            .unwrap();
        harness.close().await;
    }
}
