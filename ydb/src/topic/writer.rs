use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use tokio::select;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::driver::Driver;
use crate::errors::{check_status, ClientError, Error};
use ydb_apis::topic::stream_write_message::{
    self, from_client, from_server, write_request, write_response,
};
use ydb_apis::topic::{Codec, MetadataItem, TransactionIdentity, UpdateTokenRequest};
use ydb_gax::retry::Strategy;

#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub path: String,
    /// Messages of one producer are deduplicated by seq_no, which lets the
    /// writer resend unacknowledged messages after reconnect.
    pub producer_id: String,
    pub get_last_seq_no: bool,
    pub codec: Codec,
    pub update_token_interval: Duration,
    /// When set, writes become visible on transaction commit.
    pub tx: Option<TransactionIdentity>,
}

impl WriterOptions {
    pub fn new(path: impl Into<String>, producer_id: impl Into<String>) -> WriterOptions {
        WriterOptions {
            path: path.into(),
            producer_id: producer_id.into(),
            get_last_seq_no: true,
            codec: Codec::Raw,
            update_token_interval: Duration::from_secs(60),
            tx: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteResult {
    pub offset: Option<i64>,
    /// The message was deduplicated away by the server.
    pub skipped: bool,
    pub written_in_tx: bool,
}

/// Resolves when the server acknowledges the write.
pub struct WriteAck {
    rx: oneshot::Receiver<Result<WriteResult, Error>>,
}

impl WriteAck {
    pub async fn wait(self, cancel: Option<CancellationToken>) -> Result<WriteResult, Error> {
        let awaited = match cancel {
            Some(cancel) => {
                select! {
                    _ = cancel.cancelled() => return Err(Error::Cancelled),
                    result = self.rx => result,
                }
            }
            None => self.rx.await,
        };
        match awaited {
            Ok(result) => result,
            Err(_) => Err(ClientError::StreamClosed.into()),
        }
    }
}

struct PendingWrite {
    seq_no: Option<i64>,
    data: Vec<u8>,
    metadata_items: Vec<MetadataItem>,
    created_at: Option<prost_types::Timestamp>,
    tx: Option<oneshot::Sender<Result<WriteResult, Error>>>,
    sent: bool,
}

struct WriterState {
    pending: VecDeque<PendingWrite>,
    /// Established from the server's last_seq_no on init.
    next_seq_no: Option<i64>,
    outgoing: Option<async_channel::Sender<stream_write_message::FromClient>>,
    session_id: String,
    partition_id: i64,
    closed: bool,
}

impl WriterState {
    /// Assigns seq_nos to unsent messages and marks them sent, returning the
    /// wire form. No-op before init establishes the seq_no base.
    fn take_sendable(&mut self) -> Vec<write_request::MessageData> {
        let Some(next) = self.next_seq_no.as_mut() else {
            return Vec::new();
        };
        let mut sendable = Vec::new();
        for pending in self.pending.iter_mut().filter(|p| !p.sent) {
            let seq_no = match pending.seq_no {
                Some(seq_no) => seq_no,
                None => {
                    let seq_no = *next;
                    *next += 1;
                    pending.seq_no = Some(seq_no);
                    seq_no
                }
            };
            pending.sent = true;
            sendable.push(write_request::MessageData {
                seq_no,
                created_at: pending.created_at.clone(),
                data: pending.data.clone(),
                uncompressed_size: pending.data.len() as i64,
                message_group_id: String::new(),
                metadata_items: pending.metadata_items.clone(),
            });
        }
        sendable
    }

    /// Resolves the pending entry matching an acknowledgement.
    fn resolve_ack(&mut self, ack: &write_response::WriteAck) {
        let Some(position) = self
            .pending
            .iter()
            .position(|p| p.seq_no == Some(ack.seq_no))
        else {
            return;
        };
        let mut pending = self.pending.remove(position).unwrap();
        let result = match &ack.message_write_status {
            Some(write_response::write_ack::MessageWriteStatus::Written(written)) => WriteResult {
                offset: Some(written.offset),
                skipped: false,
                written_in_tx: false,
            },
            Some(write_response::write_ack::MessageWriteStatus::Skipped(_)) => WriteResult {
                offset: None,
                skipped: true,
                written_in_tx: false,
            },
            Some(write_response::write_ack::MessageWriteStatus::WrittenInTx(_)) => WriteResult {
                offset: None,
                skipped: false,
                written_in_tx: true,
            },
            None => WriteResult {
                offset: None,
                skipped: false,
                written_in_tx: false,
            },
        };
        if let Some(tx) = pending.tx.take() {
            let _ = tx.send(Ok(result));
        }
    }
}

struct WriterInner {
    driver: Driver,
    options: WriterOptions,
    state: Mutex<WriterState>,
    /// Woken when new messages are queued for sending.
    wakeup: Notify,
    /// Woken on every acknowledgement; drives flush.
    acked: Notify,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Producer-side writer with seq_no deduplication. Unacknowledged messages
/// are resent after reconnect; the server deduplicates by seq_no.
#[derive(Clone)]
pub struct TopicWriter {
    inner: Arc<WriterInner>,
}

impl TopicWriter {
    pub fn new(driver: Driver, options: WriterOptions) -> TopicWriter {
        let writer = TopicWriter {
            inner: Arc::new(WriterInner {
                driver,
                options,
                state: Mutex::new(WriterState {
                    pending: VecDeque::new(),
                    next_seq_no: None,
                    outgoing: None,
                    session_id: String::new(),
                    partition_id: 0,
                    closed: false,
                }),
                wakeup: Notify::new(),
                acked: Notify::new(),
                cancel: CancellationToken::new(),
                tasks: Mutex::new(Vec::new()),
            }),
        };
        let connection = tokio::spawn(connection_loop(Arc::clone(&writer.inner)));
        let token_refresh = tokio::spawn(token_refresh_loop(Arc::clone(&writer.inner)));
        *writer.inner.tasks.lock() = vec![connection, token_refresh];
        writer
    }

    pub fn session_id(&self) -> String {
        self.inner.state.lock().session_id.clone()
    }

    pub fn partition_id(&self) -> i64 {
        self.inner.state.lock().partition_id
    }

    /// Queues one message. The returned ack resolves once the server
    /// acknowledges (or deduplicates) it.
    pub fn write(&self, data: Vec<u8>) -> Result<WriteAck, Error> {
        self.write_with_metadata(data, Vec::new())
    }

    pub fn write_with_metadata(
        &self,
        data: Vec<u8>,
        metadata_items: Vec<MetadataItem>,
    ) -> Result<WriteAck, Error> {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.inner.state.lock();
            if state.closed {
                return Err(ClientError::Disposed.into());
            }
            state.pending.push_back(PendingWrite {
                seq_no: None,
                data,
                metadata_items,
                created_at: Some(prost_types::Timestamp::from(SystemTime::now())),
                tx: Some(tx),
                sent: false,
            });
        }
        self.inner.wakeup.notify_one();
        Ok(WriteAck { rx })
    }

    /// Awaits acknowledgement of everything written so far.
    pub async fn flush(&self) -> Result<(), Error> {
        loop {
            let acked = self.inner.acked.notified();
            tokio::pin!(acked);
            acked.as_mut().enable();
            {
                let state = self.inner.state.lock();
                if state.pending.is_empty() {
                    return Ok(());
                }
                if state.closed {
                    return Err(ClientError::Disposed.into());
                }
            }
            select! {
                _ = acked => {}
                _ = self.inner.cancel.cancelled() => return Err(ClientError::Disposed.into()),
            }
        }
    }

    /// Graceful shutdown: flushes, then tears the stream down.
    pub async fn close(&self) -> Result<(), Error> {
        let flushed = self.flush().await;
        self.dispose();
        flushed
    }

    /// Forced shutdown: rejects in-flight writes. Idempotent.
    pub fn dispose(&self) {
        let pending = {
            let mut state = self.inner.state.lock();
            state.closed = true;
            if let Some(outgoing) = state.outgoing.take() {
                outgoing.close();
            }
            state
                .pending
                .drain(..)
                .filter_map(|mut p| p.tx.take())
                .collect::<Vec<_>>()
        };
        for tx in pending {
            let _ = tx.send(Err(ClientError::Disposed.into()));
        }
        self.inner.cancel.cancel();
        self.inner.acked.notify_waiters();
        for task in self.inner.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

impl WriterInner {
    /// Sends everything sendable over the current stream.
    async fn pump(&self) {
        let (messages, outgoing) = {
            let mut state = self.state.lock();
            (state.take_sendable(), state.outgoing.clone())
        };
        let Some(outgoing) = outgoing else { return };
        for message in messages {
            let request = stream_write_message::FromClient {
                client_message: Some(from_client::ClientMessage::WriteRequest(
                    stream_write_message::WriteRequest {
                        messages: vec![message],
                        codec: self.options.codec as i32,
                        tx: self.options.tx.clone(),
                    },
                )),
            };
            let _ = outgoing.send(request).await;
        }
    }
}

async fn connection_loop(inner: Arc<WriterInner>) {
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
        if inner.cancel.is_cancelled() || inner.state.lock().closed {
            break;
        }
        let outcome = run_stream(&inner).await;
        if inner.cancel.is_cancelled() || inner.state.lock().closed {
            break;
        }
        match outcome {
            Ok(()) => {
                attempt = 0;
                tracing::debug!("write stream disconnected, reconnecting");
            }
            Err(e) => {
                attempt += 1;
                tracing::debug!("write stream failed: {e}");
            }
        }
        {
            let mut state = inner.state.lock();
            if let Some(outgoing) = state.outgoing.take() {
                outgoing.close();
            }
        }
        select! {
            _ = tokio::time::sleep(backoff.delay(attempt.max(1))) => {}
            _ = inner.cancel.cancelled() => break,
        }
    }
    tracing::trace!("shutdown topic write loop");
}

async fn run_stream(inner: &Arc<WriterInner>) -> Result<(), Error> {
    inner.driver.ready().await?;

    let (tx, rx) = async_channel::bounded(64);
    {
        let mut state = inner.state.lock();
        state.outgoing = Some(tx.clone());
        // everything unacknowledged goes out again; the server deduplicates
        for pending in state.pending.iter_mut() {
            pending.sent = false;
        }
    }

    let init = stream_write_message::FromClient {
        client_message: Some(from_client::ClientMessage::InitRequest(
            stream_write_message::InitRequest {
                path: inner.options.path.clone(),
                producer_id: inner.options.producer_id.clone(),
                write_session_meta: Default::default(),
                get_last_seq_no: inner.options.get_last_seq_no,
            },
        )),
    };
    let _ = tx.send(init).await;

    let mut stream = inner.driver.topic_raw().stream_write(rx).await?;
    loop {
        select! {
            _ = inner.cancel.cancelled() => return Ok(()),
            _ = inner.wakeup.notified() => inner.pump().await,
            message = stream.message() => {
                let Some(message) = message.map_err(Error::Grpc)? else {
                    return Ok(());
                };
                check_status(message.status, &message.issues)?;
                match message.server_message {
                    Some(from_server::ServerMessage::InitResponse(init)) => {
                        {
                            let mut state = inner.state.lock();
                            if state.next_seq_no.is_none() {
                                state.next_seq_no = Some(init.last_seq_no + 1);
                            }
                            state.session_id = init.session_id.clone();
                            state.partition_id = init.partition_id;
                        }
                        tracing::debug!(
                            session_id = %init.session_id,
                            last_seq_no = init.last_seq_no,
                            "write stream initialized"
                        );
                        inner.pump().await;
                    }
                    Some(from_server::ServerMessage::WriteResponse(response)) => {
                        {
                            let mut state = inner.state.lock();
                            for ack in &response.acks {
                                state.resolve_ack(ack);
                            }
                        }
                        inner.acked.notify_waiters();
                    }
                    Some(from_server::ServerMessage::UpdateTokenResponse(_)) | None => {}
                }
            }
        }
    }
}

async fn token_refresh_loop(inner: Arc<WriterInner>) {
    let mut timer = tokio::time::interval(inner.options.update_token_interval);
    timer.tick().await;
    loop {
        select! {
            _ = timer.tick() => {}
            _ = inner.cancel.cancelled() => break,
        }
        if let Some(token) = inner.driver.token().await {
            let outgoing = inner.state.lock().outgoing.clone();
            if let Some(outgoing) = outgoing {
                let request = stream_write_message::FromClient {
                    client_message: Some(from_client::ClientMessage::UpdateTokenRequest(
                        UpdateTokenRequest { token },
                    )),
                };
                let _ = outgoing.try_send(request);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> WriterState {
        WriterState {
            pending: VecDeque::new(),
            next_seq_no: None,
            outgoing: None,
            session_id: String::new(),
            partition_id: 0,
            closed: false,
        }
    }

    fn queued(data: &[u8]) -> PendingWrite {
        PendingWrite {
            seq_no: None,
            data: data.to_vec(),
            metadata_items: Vec::new(),
            created_at: None,
            tx: None,
            sent: false,
        }
    }

    #[tokio::test]
    async fn test_dispose_rejects_pending_writes() {
        let mut options = crate::config::DriverOptions::default();
        options.enable_discovery = false;
        let driver = crate::driver::Driver::new("grpc://localhost:1/local", options, None)
            .await
            .unwrap();
        let writer = TopicWriter::new(driver, WriterOptions::new("/topic", "producer"));
        let ack = writer.write(b"payload".to_vec()).unwrap();
        writer.dispose();
        assert!(ack.wait(None).await.is_err());
        assert!(writer.write(b"more".to_vec()).is_err());
    }

    #[test]
    fn test_nothing_sendable_before_init() {
        let mut state = state();
        state.pending.push_back(queued(b"a"));
        assert!(state.take_sendable().is_empty());
    }

    #[test]
    fn test_seq_no_assignment_continues_from_last() {
        let mut state = state();
        state.next_seq_no = Some(8);
        state.pending.push_back(queued(b"a"));
        state.pending.push_back(queued(b"b"));
        let sendable = state.take_sendable();
        assert_eq!(sendable.len(), 2);
        assert_eq!(sendable[0].seq_no, 8);
        assert_eq!(sendable[1].seq_no, 9);
        // already sent; nothing new to send
        assert!(state.take_sendable().is_empty());
    }

    #[test]
    fn test_resend_keeps_assigned_seq_no() {
        let mut state = state();
        state.next_seq_no = Some(1);
        state.pending.push_back(queued(b"a"));
        let first = state.take_sendable();
        assert_eq!(first[0].seq_no, 1);

        // reconnect marks everything unsent again
        for pending in state.pending.iter_mut() {
            pending.sent = false;
        }
        let resent = state.take_sendable();
        assert_eq!(resent[0].seq_no, 1, "dedup relies on a stable seq_no");
    }

    #[test]
    fn test_ack_resolution() {
        let mut state = state();
        state.next_seq_no = Some(1);
        let (tx, mut rx) = oneshot::channel();
        let mut pending = queued(b"a");
        pending.tx = Some(tx);
        state.pending.push_back(pending);
        state.take_sendable();

        state.resolve_ack(&write_response::WriteAck {
            seq_no: 1,
            message_write_status: Some(write_response::write_ack::MessageWriteStatus::Written(
                write_response::Written { offset: 5 },
            )),
        });
        assert!(state.pending.is_empty());
        let result = rx.try_recv().unwrap().unwrap();
        assert_eq!(result.offset, Some(5));
        assert!(!result.skipped);
    }

    #[test]
    fn test_skipped_ack_marks_deduplicated() {
        let mut state = state();
        state.next_seq_no = Some(1);
        let (tx, mut rx) = oneshot::channel();
        let mut pending = queued(b"a");
        pending.tx = Some(tx);
        state.pending.push_back(pending);
        state.take_sendable();

        state.resolve_ack(&write_response::WriteAck {
            seq_no: 1,
            message_write_status: Some(write_response::write_ack::MessageWriteStatus::Skipped(
                write_response::Skipped { reason: 1 },
            )),
        });
        let result = rx.try_recv().unwrap().unwrap();
        assert!(result.skipped);
        assert_eq!(result.offset, None);
    }

    #[test]
    fn test_unknown_ack_ignored() {
        let mut state = state();
        state.resolve_ack(&write_response::WriteAck {
            seq_no: 42,
            message_write_status: None,
        });
    }
}
