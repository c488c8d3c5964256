use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use futures_util::Stream;
use parking_lot::Mutex;
use tokio::select;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::driver::Driver;
use crate::errors::{check_status, ClientError, Error};
use crate::topic::codec::CodecRegistry;
use crate::topic::message::TopicMessage;
use crate::topic::partition_session::PartitionSession;
use ydb_apis::topic::stream_read_message::{
    self, commit_offset_request, from_client, from_server, read_response,
};
use ydb_apis::topic::{OffsetsRange, UpdateTokenRequest};
use ydb_gax::retry::Strategy;

/// Grace period of a graceful partition-session stop.
const GRACEFUL_STOP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct TopicSelector {
    pub path: String,
    /// Empty means all partitions.
    pub partition_ids: Vec<i64>,
    pub max_lag: Option<Duration>,
    pub read_from: Option<prost_types::Timestamp>,
}

impl TopicSelector {
    pub fn new(path: impl Into<String>) -> TopicSelector {
        TopicSelector {
            path: path.into(),
            partition_ids: Vec::new(),
            max_lag: None,
            read_from: None,
        }
    }
}

/// Override offsets returned by the partition-session start hook.
#[derive(Debug, Clone, Copy, Default)]
pub struct StartOffsets {
    pub read_offset: Option<i64>,
    pub commit_offset: Option<i64>,
}

type StartHook =
    Box<dyn Fn(&PartitionSession, i64, (i64, i64)) -> Option<StartOffsets> + Send + Sync>;
type StopHook = Box<dyn Fn(&PartitionSession, bool, i64) + Send + Sync>;

pub struct ReaderOptions {
    pub consumer: String,
    pub topics: Vec<TopicSelector>,
    /// Flow-control window granted to the server.
    pub max_buffer_size: i64,
    pub update_token_interval: Duration,
    pub codecs: CodecRegistry,
    pub on_partition_session_start: Option<StartHook>,
    pub on_partition_session_stop: Option<StopHook>,
}

impl ReaderOptions {
    pub fn new(consumer: impl Into<String>, topic: TopicSelector) -> ReaderOptions {
        ReaderOptions {
            consumer: consumer.into(),
            topics: vec![topic],
            max_buffer_size: 1024 * 1024,
            update_token_interval: Duration::from_secs(60),
            codecs: CodecRegistry::default(),
            on_partition_session_start: None,
            on_partition_session_stop: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Upper bound per yielded batch; default unlimited.
    pub limit: Option<usize>,
    /// An empty batch is yielded when nothing arrives within this window.
    pub wait: Duration,
    pub cancel: Option<CancellationToken>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            limit: None,
            wait: Duration::from_secs(60),
            cancel: None,
        }
    }
}

/// Raw buffered message; decompression happens at yield time.
struct RawMessage {
    partition_session_id: i64,
    partition_id: i64,
    topic: String,
    producer_id: String,
    codec: i32,
    written_at: Option<prost_types::Timestamp>,
    data: read_response::MessageData,
}

struct Frame {
    bytes_size: i64,
    messages: VecDeque<RawMessage>,
}

struct PendingCommit {
    end: i64,
    tx: oneshot::Sender<Result<(), Error>>,
}

struct ReaderState {
    partition_sessions: HashMap<i64, PartitionSession>,
    frames: VecDeque<Frame>,
    free_buffer_size: i64,
    /// Per partition session, entries sorted by end offset.
    pending_commits: HashMap<i64, Vec<PendingCommit>>,
    /// Commit requests not yet acknowledged; replayed after reconnect.
    unacked_commits: Vec<commit_offset_request::PartitionCommitOffset>,
    outgoing: Option<async_channel::Sender<stream_read_message::FromClient>>,
    closed: bool,
}

impl ReaderState {
    /// Pops up to `limit` messages. Fully consumed frames return their bytes
    /// to the flow-control window; the freed amount is reported so the
    /// caller can grant it back to the server.
    fn pop_batch(&mut self, limit: Option<usize>) -> (Vec<RawMessage>, i64) {
        let mut batch = Vec::new();
        let mut freed = 0i64;
        while limit.map_or(true, |l| batch.len() < l) {
            let Some(frame) = self.frames.front_mut() else { break };
            match frame.messages.pop_front() {
                Some(message) => batch.push(message),
                None => {}
            }
            if frame.messages.is_empty() {
                freed += frame.bytes_size;
                self.free_buffer_size += frame.bytes_size;
                self.frames.pop_front();
            } else if limit.map_or(false, |l| batch.len() >= l) {
                break;
            }
        }
        (batch, freed)
    }

    /// Drops buffered messages of a stopped partition session. Frames left
    /// empty return their bytes immediately.
    fn purge_partition(&mut self, partition_session_id: i64) -> i64 {
        let mut freed = 0i64;
        let mut index = 0;
        while index < self.frames.len() {
            let frame = &mut self.frames[index];
            frame
                .messages
                .retain(|m| m.partition_session_id != partition_session_id);
            if frame.messages.is_empty() {
                freed += frame.bytes_size;
                self.free_buffer_size += frame.bytes_size;
                self.frames.remove(index);
            } else {
                index += 1;
            }
        }
        freed
    }

    /// Fires pending entries with end <= committed, in increasing end order.
    fn resolve_commits(&mut self, partition_session_id: i64, committed_offset: i64) {
        if let Some(pending) = self.pending_commits.get_mut(&partition_session_id) {
            pending.sort_by_key(|p| p.end);
            let mut index = 0;
            while index < pending.len() {
                if pending[index].end <= committed_offset {
                    let entry = pending.remove(index);
                    let _ = entry.tx.send(Ok(()));
                } else {
                    index += 1;
                }
            }
            if pending.is_empty() {
                self.pending_commits.remove(&partition_session_id);
            }
        }
        self.unacked_commits.retain_mut(|entry| {
            if entry.partition_session_id != partition_session_id {
                return true;
            }
            entry.offsets.retain(|range| range.end > committed_offset);
            !entry.offsets.is_empty()
        });
    }

    fn reject_commits(&mut self, partition_session_id: i64, reason: &str) {
        if let Some(pending) = self.pending_commits.remove(&partition_session_id) {
            for entry in pending {
                let _ = entry
                    .tx
                    .send(Err(ClientError::MalformedResult(reason.to_string()).into()));
            }
        }
        self.unacked_commits
            .retain(|entry| entry.partition_session_id != partition_session_id);
    }
}

struct ReaderInner {
    driver: Driver,
    options: ReaderOptions,
    state: Mutex<ReaderState>,
    data_available: Notify,
    commits_drained: Notify,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Flow-controlled topic reader: multiplexes server-initiated partition
/// sessions over one read stream, tracks per-partition commits and grants
/// buffer credit as the application consumes messages.
#[derive(Clone)]
pub struct TopicReader {
    inner: Arc<ReaderInner>,
}

impl TopicReader {
    pub fn new(driver: Driver, options: ReaderOptions) -> TopicReader {
        let max_buffer_size = options.max_buffer_size;
        let reader = TopicReader {
            inner: Arc::new(ReaderInner {
                driver,
                options,
                state: Mutex::new(ReaderState {
                    partition_sessions: HashMap::new(),
                    frames: VecDeque::new(),
                    free_buffer_size: max_buffer_size,
                    pending_commits: HashMap::new(),
                    unacked_commits: Vec::new(),
                    outgoing: None,
                    closed: false,
                }),
                data_available: Notify::new(),
                commits_drained: Notify::new(),
                cancel: CancellationToken::new(),
                tasks: Mutex::new(Vec::new()),
            }),
        };
        let connection = tokio::spawn(connection_loop(Arc::clone(&reader.inner)));
        let token_refresh = tokio::spawn(token_refresh_loop(Arc::clone(&reader.inner)));
        *reader.inner.tasks.lock() = vec![connection, token_refresh];
        reader
    }

    /// Current partition sessions, for observability.
    pub fn partition_sessions(&self) -> Vec<PartitionSession> {
        self.inner
            .state
            .lock()
            .partition_sessions
            .values()
            .cloned()
            .collect()
    }

    /// Async sequence of message batches. Yields non-empty batches as data
    /// becomes available and an empty batch when `wait` elapses idle.
    pub fn read(
        &self,
        options: ReadOptions,
    ) -> impl Stream<Item = Result<Vec<TopicMessage>, Error>> + Send + 'static {
        let inner = Arc::clone(&self.inner);
        async_stream::try_stream! {
            if options.limit == Some(0) {
                yield Vec::new();
                return;
            }
            let cancel = options.cancel.clone().unwrap_or_default();
            loop {
                if inner.state.lock().closed {
                    break;
                }
                // register for wakeups before checking the buffer, so data
                // arriving in between is not missed
                let notified = inner.data_available.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();

                let (batch, freed) = inner.state.lock().pop_batch(options.limit);
                if freed > 0 {
                    inner.grant_credit(freed).await;
                }
                if !batch.is_empty() {
                    let mut messages = Vec::with_capacity(batch.len());
                    for raw in batch {
                        messages.push(inner.assemble(raw)?);
                    }
                    yield messages;
                    continue;
                }
                select! {
                    _ = &mut notified => continue,
                    _ = tokio::time::sleep(options.wait) => {
                        yield Vec::new();
                    }
                    _ = cancel.cancelled() => break,
                    _ = inner.cancel.cancelled() => break,
                }
            }
        }
    }

    /// Commits the given messages: offsets are merged into contiguous
    /// half-open ranges per partition session and sent in one request. The
    /// returned ack resolves when the server acknowledges the ranges;
    /// unacknowledged commits are replayed after reconnect.
    pub async fn commit(&self, messages: &[TopicMessage]) -> Result<CommitAck, Error> {
        let commit_offsets = merge_commit_ranges(messages)?;
        if commit_offsets.is_empty() {
            return Ok(CommitAck {
                receivers: Vec::new(),
            });
        }

        let mut receivers = Vec::with_capacity(commit_offsets.len());
        let outgoing = {
            let mut state = self.inner.state.lock();
            if state.closed {
                return Err(ClientError::Disposed.into());
            }
            for entry in &commit_offsets {
                let end = entry.offsets.last().map(|r| r.end).unwrap_or(0);
                let (tx, rx) = oneshot::channel();
                state
                    .pending_commits
                    .entry(entry.partition_session_id)
                    .or_default()
                    .push(PendingCommit { end, tx });
                receivers.push(rx);
                if let Some(session) = state
                    .partition_sessions
                    .get_mut(&entry.partition_session_id)
                {
                    session.next_commit_start = end;
                }
            }
            state.unacked_commits.extend(commit_offsets.iter().cloned());
            state.outgoing.clone()
        };

        let request = stream_read_message::FromClient {
            client_message: Some(from_client::ClientMessage::CommitOffsetRequest(
                stream_read_message::CommitOffsetRequest { commit_offsets },
            )),
        };
        if let Some(outgoing) = outgoing {
            // a closed queue is fine: the commit is replayed after reconnect
            let _ = outgoing.send(request).await;
        }
        Ok(CommitAck { receivers })
    }

    /// Forced shutdown: closes the queue, stops partition sessions and
    /// rejects every pending commit. Idempotent.
    pub fn dispose(&self) {
        let pending = {
            let mut state = self.inner.state.lock();
            state.closed = true;
            if let Some(outgoing) = state.outgoing.take() {
                outgoing.close();
            }
            state.partition_sessions.clear();
            state.frames.clear();
            state
                .pending_commits
                .drain()
                .flat_map(|(_, entries)| entries)
                .collect::<Vec<_>>()
        };
        for entry in pending {
            let _ = entry.tx.send(Err(ClientError::Disposed.into()));
        }
        self.inner.cancel.cancel();
        self.inner.data_available.notify_waiters();
        for task in self.inner.tasks.lock().drain(..) {
            task.abort();
        }
    }

    /// Graceful shutdown: same teardown, awaiting the background tasks.
    pub async fn close(&self) {
        let tasks = {
            let mut tasks = self.inner.tasks.lock();
            std::mem::take(&mut *tasks)
        };
        self.dispose();
        for task in tasks {
            task.abort();
            let _ = task.await;
        }
    }
}

impl ReaderInner {
    fn assemble(&self, raw: RawMessage) -> Result<TopicMessage, Error> {
        let payload = self.options.codecs.decompress(raw.codec, &raw.data.data)?;
        Ok(TopicMessage {
            partition_session_id: raw.partition_session_id,
            partition_id: raw.partition_id,
            topic: raw.topic,
            producer_id: raw.producer_id,
            payload,
            codec: raw.codec,
            seq_no: raw.data.seq_no,
            offset: raw.data.offset,
            uncompressed_size: raw.data.uncompressed_size,
            created_at: raw.data.created_at,
            written_at: raw.written_at,
            metadata_items: raw.data.metadata_items,
        })
    }

    async fn grant_credit(&self, bytes: i64) {
        let outgoing = self.state.lock().outgoing.clone();
        if let Some(outgoing) = outgoing {
            let request = stream_read_message::FromClient {
                client_message: Some(from_client::ClientMessage::ReadRequest(
                    stream_read_message::ReadRequest { bytes_size: bytes },
                )),
            };
            let _ = outgoing.send(request).await;
        }
    }

    fn push(&self, message: stream_read_message::FromClient) {
        let outgoing = self.state.lock().outgoing.clone();
        if let Some(outgoing) = outgoing {
            let _ = outgoing.try_send(message);
        }
    }
}

/// Merges the offsets of the given messages into disjoint half-open ranges
/// per partition session, strictly increasing by start. Out-of-order or
/// duplicate offsets within one call are rejected.
fn merge_commit_ranges(
    messages: &[TopicMessage],
) -> Result<Vec<commit_offset_request::PartitionCommitOffset>, Error> {
    let mut order: Vec<i64> = Vec::new();
    let mut groups: HashMap<i64, Vec<i64>> = HashMap::new();
    for message in messages {
        let offsets = groups.entry(message.partition_session_id).or_insert_with(|| {
            order.push(message.partition_session_id);
            Vec::new()
        });
        offsets.push(message.offset);
    }

    let mut result = Vec::with_capacity(order.len());
    for partition_session_id in order {
        let offsets = &groups[&partition_session_id];
        let mut ranges: Vec<OffsetsRange> = Vec::new();
        for &offset in offsets {
            match ranges.last_mut() {
                Some(range) if offset == range.end => range.end = offset + 1,
                Some(range) if offset < range.end => {
                    return Err(ClientError::InvalidConfig(format!(
                        "commit offsets out of order for partition session {partition_session_id}: {offset}"
                    ))
                    .into());
                }
                _ => ranges.push(OffsetsRange {
                    start: offset,
                    end: offset + 1,
                }),
            }
        }
        result.push(commit_offset_request::PartitionCommitOffset {
            partition_session_id,
            offsets: ranges,
        });
    }
    Ok(result)
}

/// Resolves when the server has acknowledged all committed ranges.
pub struct CommitAck {
    receivers: Vec<oneshot::Receiver<Result<(), Error>>>,
}

impl CommitAck {
    pub async fn wait(self) -> Result<(), Error> {
        for receiver in self.receivers {
            match receiver.await {
                Ok(result) => result?,
                Err(_) => return Err(ClientError::StreamClosed.into()),
            }
        }
        Ok(())
    }
}

/// Reconnect loop mirroring the coordination session's: open the stream,
/// init, grant the full window, then dispatch server messages until the
/// stream dies.
async fn connection_loop(inner: Arc<ReaderInner>) {
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
                tracing::debug!("read stream disconnected, reconnecting");
            }
            Err(e) => {
                attempt += 1;
                tracing::debug!("read stream failed: {e}");
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
    tracing::trace!("shutdown topic read loop");
}

async fn run_stream(inner: &Arc<ReaderInner>) -> Result<(), Error> {
    inner.driver.ready().await?;

    let (tx, rx) = async_channel::bounded(64);
    inner.state.lock().outgoing = Some(tx.clone());

    let init = stream_read_message::FromClient {
        client_message: Some(from_client::ClientMessage::InitRequest(
            stream_read_message::InitRequest {
                topics_read_settings: inner
                    .options
                    .topics
                    .iter()
                    .map(|topic| stream_read_message::init_request::TopicReadSettings {
                        path: topic.path.clone(),
                        partition_ids: topic.partition_ids.clone(),
                        max_lag: topic.max_lag.map(|lag| prost_types::Duration {
                            seconds: lag.as_secs() as i64,
                            nanos: lag.subsec_nanos() as i32,
                        }),
                        read_from: topic.read_from.clone(),
                    })
                    .collect(),
                consumer: inner.options.consumer.clone(),
                reader_name: String::new(),
            },
        )),
    };
    let _ = tx.send(init).await;

    let mut stream = inner.driver.topic_raw().stream_read(rx).await?;
    loop {
        let message = select! {
            _ = inner.cancel.cancelled() => return Ok(()),
            message = stream.message() => message.map_err(Error::Grpc)?,
        };
        let Some(message) = message else { return Ok(()) };
        check_status(message.status, &message.issues)?;
        let Some(server_message) = message.server_message else {
            continue;
        };
        handle_server_message(inner, server_message).await;
    }
}

async fn handle_server_message(inner: &Arc<ReaderInner>, message: from_server::ServerMessage) {
    match message {
        from_server::ServerMessage::InitResponse(init) => {
            tracing::debug!(session_id = %init.session_id, "read stream initialized");
            let (credit, replay) = {
                let state = inner.state.lock();
                (state.free_buffer_size, state.unacked_commits.clone())
            };
            if credit > 0 {
                inner.grant_credit(credit).await;
            }
            if !replay.is_empty() {
                tracing::debug!(count = replay.len(), "replaying unacknowledged commits");
                inner.push(stream_read_message::FromClient {
                    client_message: Some(from_client::ClientMessage::CommitOffsetRequest(
                        stream_read_message::CommitOffsetRequest {
                            commit_offsets: replay,
                        },
                    )),
                });
            }
        }
        from_server::ServerMessage::StartPartitionSessionRequest(start) => {
            let Some(info) = start.partition_session else { return };
            let offsets = start
                .partition_offsets
                .map(|r| (r.start, r.end))
                .unwrap_or((0, 0));
            let session = PartitionSession::new(
                info.partition_session_id,
                info.partition_id,
                info.path,
                offsets.0,
                offsets.1,
                start.committed_offset,
            );
            let overrides = inner
                .options
                .on_partition_session_start
                .as_ref()
                .and_then(|hook| hook(&session, start.committed_offset, offsets))
                .unwrap_or_default();
            {
                let mut state = inner.state.lock();
                state.resolve_commits(session.id, start.committed_offset);
                state.partition_sessions.insert(session.id, session);
            }
            inner.commits_drained.notify_waiters();
            inner.push(stream_read_message::FromClient {
                client_message: Some(from_client::ClientMessage::StartPartitionSessionResponse(
                    stream_read_message::StartPartitionSessionResponse {
                        partition_session_id: info.partition_session_id,
                        read_offset: overrides.read_offset,
                        commit_offset: overrides.commit_offset,
                    },
                )),
            });
        }
        from_server::ServerMessage::StopPartitionSessionRequest(stop) => {
            let session = inner
                .state
                .lock()
                .partition_sessions
                .get(&stop.partition_session_id)
                .cloned();
            if let (Some(hook), Some(session)) =
                (inner.options.on_partition_session_stop.as_ref(), &session)
            {
                hook(session, stop.graceful, stop.committed_offset);
            }
            if !stop.graceful {
                let freed = {
                    let mut state = inner.state.lock();
                    if let Some(session) =
                        state.partition_sessions.get_mut(&stop.partition_session_id)
                    {
                        session.stopped = true;
                    }
                    let freed = state.purge_partition(stop.partition_session_id);
                    state.reject_commits(stop.partition_session_id, "partition session stopped");
                    state.partition_sessions.remove(&stop.partition_session_id);
                    freed
                };
                if freed > 0 {
                    inner.grant_credit(freed).await;
                }
                return;
            }
            // graceful: let in-flight commits drain before answering
            let graceful = Arc::clone(inner);
            tokio::spawn(async move {
                let deadline = tokio::time::Instant::now() + GRACEFUL_STOP_TIMEOUT;
                loop {
                    let wait = graceful.commits_drained.notified();
                    tokio::pin!(wait);
                    wait.as_mut().enable();
                    let drained = !graceful
                        .state
                        .lock()
                        .pending_commits
                        .contains_key(&stop.partition_session_id);
                    if drained {
                        break;
                    }
                    if tokio::time::timeout_at(deadline, wait).await.is_err() {
                        break;
                    }
                }
                {
                    let mut state = graceful.state.lock();
                    state.reject_commits(stop.partition_session_id, "partition session stopped");
                    state.partition_sessions.remove(&stop.partition_session_id);
                }
                graceful.push(stream_read_message::FromClient {
                    client_message: Some(
                        from_client::ClientMessage::StopPartitionSessionResponse(
                            stream_read_message::StopPartitionSessionResponse {
                                partition_session_id: stop.partition_session_id,
                            },
                        ),
                    ),
                });
            });
        }
        from_server::ServerMessage::EndPartitionSession(end) => {
            let mut state = inner.state.lock();
            if let Some(session) = state.partition_sessions.get_mut(&end.partition_session_id) {
                session.ended = true;
            }
        }
        from_server::ServerMessage::CommitOffsetResponse(response) => {
            {
                let mut state = inner.state.lock();
                for committed in &response.partitions_committed_offsets {
                    if let Some(session) = state
                        .partition_sessions
                        .get_mut(&committed.partition_session_id)
                    {
                        session.committed_offset = committed.committed_offset;
                    }
                    state.resolve_commits(
                        committed.partition_session_id,
                        committed.committed_offset,
                    );
                }
            }
            inner.commits_drained.notify_waiters();
        }
        from_server::ServerMessage::ReadResponse(response) => {
            let mut messages = VecDeque::new();
            let sessions = &inner.state;
            for partition_data in response.partition_data {
                let (topic, partition_id) = {
                    let state = sessions.lock();
                    match state
                        .partition_sessions
                        .get(&partition_data.partition_session_id)
                    {
                        Some(s) => (s.topic.clone(), s.partition_id),
                        None => continue,
                    }
                };
                for batch in partition_data.batches {
                    for data in batch.message_data {
                        messages.push_back(RawMessage {
                            partition_session_id: partition_data.partition_session_id,
                            partition_id,
                            topic: topic.clone(),
                            producer_id: batch.producer_id.clone(),
                            codec: batch.codec,
                            written_at: batch.written_at.clone(),
                            data,
                        });
                    }
                }
            }
            {
                let mut state = inner.state.lock();
                state.free_buffer_size -= response.bytes_size;
                state.frames.push_back(Frame {
                    bytes_size: response.bytes_size,
                    messages,
                });
            }
            inner.data_available.notify_waiters();
        }
        from_server::ServerMessage::UpdateTokenResponse(_) => {}
    }
}

async fn token_refresh_loop(inner: Arc<ReaderInner>) {
    let mut timer = tokio::time::interval(inner.options.update_token_interval);
    timer.tick().await;
    loop {
        select! {
            _ = timer.tick() => {}
            _ = inner.cancel.cancelled() => break,
        }
        if let Some(token) = inner.driver.token().await {
            inner.push(stream_read_message::FromClient {
                client_message: Some(from_client::ClientMessage::UpdateTokenRequest(
                    UpdateTokenRequest { token },
                )),
            });
        }
    }
}

/// Transaction-aware reader: records the `[first, last]` offsets of every
/// message yielded inside the block, per partition session. Nothing is
/// committed through `commit`; the transaction coordinator advances the
/// consumer offset atomically on commit.
pub struct TxTopicReader {
    reader: TopicReader,
    ranges: Arc<Mutex<HashMap<i64, (i64, i64)>>>,
}

impl TxTopicReader {
    pub fn new(reader: TopicReader) -> TxTopicReader {
        TxTopicReader {
            reader,
            ranges: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn read(
        &self,
        options: ReadOptions,
    ) -> impl Stream<Item = Result<Vec<TopicMessage>, Error>> + Send + 'static {
        let ranges = Arc::clone(&self.ranges);
        let stream = self.reader.read(options);
        async_stream::try_stream! {
            futures_util::pin_mut!(stream);
            while let Some(batch) = futures_util::StreamExt::next(&mut stream).await {
                let batch = batch?;
                {
                    let mut ranges = ranges.lock();
                    for message in &batch {
                        let entry = ranges
                            .entry(message.partition_session_id)
                            .or_insert((message.offset, message.offset));
                        entry.0 = entry.0.min(message.offset);
                        entry.1 = entry.1.max(message.offset);
                    }
                }
                yield batch;
            }
        }
    }

    /// Offset ranges to hand to the transaction coordinator at commit time:
    /// `(partition_session_id, [start, end))`.
    pub fn offset_ranges(&self) -> Vec<(i64, OffsetsRange)> {
        self.ranges
            .lock()
            .iter()
            .map(|(&id, &(first, last))| {
                (
                    id,
                    OffsetsRange {
                        start: first,
                        end: last + 1,
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(partition_session_id: i64, offset: i64) -> TopicMessage {
        TopicMessage {
            partition_session_id,
            partition_id: 0,
            topic: "t".to_string(),
            producer_id: "p".to_string(),
            payload: Vec::new(),
            codec: 1,
            seq_no: offset,
            offset,
            uncompressed_size: 0,
            created_at: None,
            written_at: None,
            metadata_items: Vec::new(),
        }
    }

    fn raw(partition_session_id: i64, offset: i64) -> RawMessage {
        RawMessage {
            partition_session_id,
            partition_id: 0,
            topic: "t".to_string(),
            producer_id: "p".to_string(),
            codec: 1,
            written_at: None,
            data: read_response::MessageData {
                offset,
                seq_no: offset,
                created_at: None,
                data: Vec::new(),
                uncompressed_size: 0,
                message_group_id: String::new(),
                metadata_items: Vec::new(),
            },
        }
    }

    fn state_with_frames(frames: Vec<Frame>) -> ReaderState {
        let used: i64 = frames.iter().map(|f| f.bytes_size).sum();
        ReaderState {
            partition_sessions: HashMap::new(),
            frames: frames.into(),
            free_buffer_size: 1024 - used,
            pending_commits: HashMap::new(),
            unacked_commits: Vec::new(),
            outgoing: None,
            closed: false,
        }
    }

    #[tokio::test]
    async fn test_read_limit_zero_yields_empty_batch_and_returns() {
        let mut options = crate::config::DriverOptions::default();
        options.enable_discovery = false;
        let driver = crate::driver::Driver::new("grpc://localhost:1/local", options, None)
            .await
            .unwrap();
        let reader = TopicReader::new(
            driver,
            ReaderOptions::new("consumer", TopicSelector::new("/topic")),
        );
        let stream = reader.read(ReadOptions {
            limit: Some(0),
            ..Default::default()
        });
        futures_util::pin_mut!(stream);
        let first = futures_util::StreamExt::next(&mut stream)
            .await
            .unwrap()
            .unwrap();
        assert!(first.is_empty());
        assert!(futures_util::StreamExt::next(&mut stream).await.is_none());
        reader.dispose();
    }

    #[tokio::test]
    async fn test_dispose_rejects_pending_commits() {
        let mut options = crate::config::DriverOptions::default();
        options.enable_discovery = false;
        let driver = crate::driver::Driver::new("grpc://localhost:1/local", options, None)
            .await
            .unwrap();
        let reader = TopicReader::new(
            driver,
            ReaderOptions::new("consumer", TopicSelector::new("/topic")),
        );
        let ack = reader.commit(&[message(1, 0)]).await.unwrap();
        reader.dispose();
        assert!(ack.wait().await.is_err());
        // a second dispose is a no-op
        reader.dispose();
        assert!(reader.commit(&[message(1, 1)]).await.is_err());
    }

    #[test]
    fn test_merge_consecutive_offsets() {
        let messages = vec![message(1, 3), message(1, 4), message(1, 5)];
        let merged = merge_commit_ranges(&messages).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].partition_session_id, 1);
        assert_eq!(merged[0].offsets, vec![OffsetsRange { start: 3, end: 6 }]);
    }

    #[test]
    fn test_merge_with_gap_produces_disjoint_increasing_ranges() {
        let messages = vec![message(1, 3), message(1, 4), message(1, 8)];
        let merged = merge_commit_ranges(&messages).unwrap();
        assert_eq!(
            merged[0].offsets,
            vec![
                OffsetsRange { start: 3, end: 5 },
                OffsetsRange { start: 8, end: 9 },
            ]
        );
        // pairwise disjoint, strictly increasing by start
        for window in merged[0].offsets.windows(2) {
            assert!(window[0].end <= window[1].start);
            assert!(window[0].start < window[1].start);
        }
    }

    #[test]
    fn test_merge_groups_by_partition_session() {
        let messages = vec![message(1, 0), message(2, 10), message(1, 1)];
        let merged = merge_commit_ranges(&messages).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].partition_session_id, 1);
        assert_eq!(merged[0].offsets, vec![OffsetsRange { start: 0, end: 2 }]);
        assert_eq!(merged[1].partition_session_id, 2);
    }

    #[test]
    fn test_merge_rejects_duplicates_and_out_of_order() {
        assert!(merge_commit_ranges(&[message(1, 3), message(1, 3)]).is_err());
        assert!(merge_commit_ranges(&[message(1, 4), message(1, 3)]).is_err());
    }

    #[test]
    fn test_pop_batch_returns_frame_credit() {
        let mut state = state_with_frames(vec![Frame {
            bytes_size: 100,
            messages: VecDeque::from([raw(1, 0), raw(1, 1)]),
        }]);
        let (batch, freed) = state.pop_batch(Some(1));
        assert_eq!(batch.len(), 1);
        assert_eq!(freed, 0, "frame not yet consumed");

        let (batch, freed) = state.pop_batch(None);
        assert_eq!(batch.len(), 1);
        assert_eq!(freed, 100, "whole frame consumed");
        assert_eq!(state.free_buffer_size, 1024);
    }

    #[test]
    fn test_pop_batch_spans_frames() {
        let mut state = state_with_frames(vec![
            Frame {
                bytes_size: 10,
                messages: VecDeque::from([raw(1, 0)]),
            },
            Frame {
                bytes_size: 20,
                messages: VecDeque::from([raw(1, 1)]),
            },
        ]);
        let (batch, freed) = state.pop_batch(None);
        assert_eq!(batch.len(), 2);
        assert_eq!(freed, 30);
        // offsets stay monotonically non-decreasing per partition session
        assert!(batch.windows(2).all(|w| w[0].data.offset <= w[1].data.offset));
    }

    #[test]
    fn test_purge_partition_drops_only_its_messages() {
        let mut state = state_with_frames(vec![Frame {
            bytes_size: 100,
            messages: VecDeque::from([raw(1, 0), raw(2, 5), raw(1, 1)]),
        }]);
        let freed = state.purge_partition(1);
        assert_eq!(freed, 0, "frame still holds another session's message");
        assert_eq!(state.frames[0].messages.len(), 1);
        assert_eq!(state.frames[0].messages[0].partition_session_id, 2);

        let freed = state.purge_partition(2);
        assert_eq!(freed, 100);
        assert!(state.frames.is_empty());
    }

    #[test]
    fn test_commits_resolve_in_end_offset_order() {
        let mut state = state_with_frames(Vec::new());
        let (tx1, mut rx1) = oneshot::channel();
        let (tx2, mut rx2) = oneshot::channel();
        let (tx3, mut rx3) = oneshot::channel();
        state.pending_commits.insert(
            1,
            vec![
                PendingCommit { end: 10, tx: tx2 },
                PendingCommit { end: 5, tx: tx1 },
                PendingCommit { end: 20, tx: tx3 },
            ],
        );

        state.resolve_commits(1, 10);
        assert!(rx1.try_recv().unwrap().is_ok());
        assert!(rx2.try_recv().unwrap().is_ok());
        assert!(rx3.try_recv().is_err(), "end=20 is still pending");

        state.resolve_commits(1, 25);
        assert!(rx3.try_recv().unwrap().is_ok());
        assert!(state.pending_commits.is_empty());
    }

    #[test]
    fn test_resolve_prunes_unacked_replay_entries() {
        let mut state = state_with_frames(Vec::new());
        state
            .unacked_commits
            .push(commit_offset_request::PartitionCommitOffset {
                partition_session_id: 1,
                offsets: vec![
                    OffsetsRange { start: 0, end: 5 },
                    OffsetsRange { start: 7, end: 9 },
                ],
            });
        state.resolve_commits(1, 5);
        assert_eq!(state.unacked_commits.len(), 1);
        assert_eq!(
            state.unacked_commits[0].offsets,
            vec![OffsetsRange { start: 7, end: 9 }]
        );
        state.resolve_commits(1, 9);
        assert!(state.unacked_commits.is_empty());
    }
}
