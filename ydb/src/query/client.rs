use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::driver::Driver;
use crate::errors::{check_status, default_retry_setting, ClientError, Error};
use crate::query::session::QuerySession;
use crate::query::session_pool::{SessionPool, SessionPoolOptions, SessionPoolStats};
use crate::query::yql::Statement;
use crate::value::{Type, Value};
use ydb_apis::query::{
    transaction_control::TxSelector, transaction_settings::TxMode, ExecMode, ExecStats,
    ExecuteQueryRequest, OnlineModeSettings, QueryContent, SerializableModeSettings,
    SnapshotModeSettings, StaleModeSettings, StatsMode, Syntax, TransactionControl,
    TransactionSettings,
};
use ydb_gax::retry::{invoke_reuse, RetrySetting};

/// Transaction isolation for a single execution or a transaction block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    /// No transaction control block; the server runs the statement in its
    /// implicit transaction.
    Implicit,
    SerializableReadWrite,
    SnapshotReadOnly,
    OnlineReadOnly { allow_inconsistent_reads: bool },
    StaleReadOnly,
}

impl IsolationLevel {
    pub(crate) fn tx_settings(&self) -> Option<TransactionSettings> {
        let mode = match self {
            IsolationLevel::Implicit => return None,
            IsolationLevel::SerializableReadWrite => {
                TxMode::SerializableReadWrite(SerializableModeSettings {})
            }
            IsolationLevel::SnapshotReadOnly => TxMode::SnapshotReadOnly(SnapshotModeSettings {}),
            IsolationLevel::OnlineReadOnly {
                allow_inconsistent_reads,
            } => TxMode::OnlineReadOnly(OnlineModeSettings {
                allow_inconsistent_reads: *allow_inconsistent_reads,
            }),
            IsolationLevel::StaleReadOnly => TxMode::StaleReadOnly(StaleModeSettings {}),
        };
        Some(TransactionSettings { tx_mode: Some(mode) })
    }
}

pub struct ExecuteOptions {
    pub isolation: IsolationLevel,
    /// Permits retrying statuses that may already have been applied.
    pub idempotent: bool,
    pub stats_mode: StatsMode,
    /// Resource pool to execute in; empty means the default pool.
    pub pool_id: Option<String>,
    pub cancel: Option<CancellationToken>,
    pub timeout: Option<Duration>,
    pub retry: Option<RetrySetting<Error>>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            isolation: IsolationLevel::Implicit,
            idempotent: false,
            stats_mode: StatsMode::Unspecified,
            pool_id: None,
            cancel: None,
            timeout: None,
            retry: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub r#type: Type,
}

#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<Vec<Column>>,
    values: Vec<Value>,
}

impl Row {
    /// Cell by column name, decoded into a native form.
    pub fn get<T: crate::value::FromValue>(&self, name: &str) -> Result<T, Error> {
        let index = self
            .columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| ClientError::MalformedResult(format!("no column '{name}'")))?;
        T::from_value(self.values[index].clone())
    }

    /// Cell by position, decoded into a native form.
    pub fn get_at<T: crate::value::FromValue>(&self, index: usize) -> Result<T, Error> {
        let value = self
            .values
            .get(index)
            .ok_or_else(|| ClientError::MalformedResult(format!("no column {index}")))?;
        T::from_value(value.clone())
    }

    /// The raw typed cells in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub columns: Arc<Vec<Column>>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Default)]
pub struct QueryResult {
    /// Result sets indexed as the server numbered them.
    pub result_sets: Vec<ResultSet>,
    pub stats: Option<ExecStats>,
    pub tx_id: Option<String>,
}

impl QueryResult {
    /// Rows of the first result set.
    pub fn rows(&self) -> &[Row] {
        self.result_sets.first().map(|rs| rs.rows.as_slice()).unwrap_or(&[])
    }
}

/// Executes statements over pooled sessions, retrying with a fresh session
/// per attempt.
#[derive(Clone)]
pub struct QueryClient {
    driver: Driver,
    pool: Arc<SessionPool>,
}

impl QueryClient {
    pub fn new(driver: Driver, options: SessionPoolOptions) -> QueryClient {
        let pool = SessionPool::new(driver.clone(), options);
        QueryClient { driver, pool }
    }

    pub fn stats(&self) -> SessionPoolStats {
        self.pool.stats()
    }

    /// Executes one statement. With a non-implicit isolation level the
    /// statement runs in its own begin+commit transaction.
    pub async fn execute(
        &self,
        statement: impl Into<Statement>,
        mut options: ExecuteOptions,
    ) -> Result<QueryResult, Error> {
        let statement = statement.into();
        let tx_control = options.isolation.tx_settings().map(|settings| {
            TransactionControl {
                commit_tx: true,
                tx_selector: Some(TxSelector::BeginTx(settings)),
            }
        });

        let mut setting = options.retry.take().unwrap_or_else(default_retry_setting);
        setting.idempotent = options.idempotent;
        let cancel = options.cancel.clone();
        let tx_control = &tx_control;
        let options = &options;
        let run = invoke_reuse(
            cancel,
            setting,
            |statement: Statement, attempt_cancel| async move {
                let result = self
                    .execute_attempt(&statement, tx_control.clone(), options, attempt_cancel)
                    .await;
                match result {
                    Ok(r) => Ok(r),
                    Err(e) => Err((e, statement)),
                }
            },
            statement,
        );

        match options.timeout {
            Some(timeout) => tokio::time::timeout(timeout, run)
                .await
                .map_err(|_| Error::Timeout)?,
            None => run.await,
        }
    }

    async fn execute_attempt(
        &self,
        statement: &Statement,
        tx_control: Option<TransactionControl>,
        options: &ExecuteOptions,
        cancel: CancellationToken,
    ) -> Result<QueryResult, Error> {
        let session = self.pool.acquire(Some(cancel)).await?;
        let result = execute_on_session(&session, statement, tx_control, options).await;
        if let Err(e) = &result {
            if e.is_session_invalidating() {
                session.invalidate();
            }
        }
        self.pool.release(&session);
        result
    }

    /// Runs `f` inside a transaction, committing on success and rolling back
    /// on failure. The whole block is retried with a fresh session and
    /// transaction when the error is retryable.
    pub async fn do_tx<F, Fut, R>(
        &self,
        isolation: IsolationLevel,
        mut options: ExecuteOptions,
        f: F,
    ) -> Result<R, Error>
    where
        F: FnMut(Transaction) -> Fut,
        Fut: std::future::Future<Output = Result<R, Error>>,
    {
        let settings = isolation
            .tx_settings()
            .ok_or_else(|| ClientError::InvalidConfig("do_tx needs an isolation level".to_string()))?;

        let mut setting = options.retry.take().unwrap_or_else(default_retry_setting);
        setting.idempotent = options.idempotent;
        let cancel = options.cancel.clone();
        let settings = &settings;
        let options = &options;
        invoke_reuse(
            cancel,
            setting,
            |mut f: F, attempt_cancel| async move {
                let result = self.tx_attempt(settings, options, &mut f, attempt_cancel).await;
                match result {
                    Ok(r) => Ok(r),
                    Err(e) => Err((e, f)),
                }
            },
            f,
        )
        .await
    }

    async fn tx_attempt<F, Fut, R>(
        &self,
        settings: &TransactionSettings,
        options: &ExecuteOptions,
        f: &mut F,
        cancel: CancellationToken,
    ) -> Result<R, Error>
    where
        F: FnMut(Transaction) -> Fut,
        Fut: std::future::Future<Output = Result<R, Error>>,
    {
        let session = self.pool.acquire(Some(cancel)).await?;
        let result = async {
            let meta = session
                .client()
                .begin_transaction(session.id(), Some(session.node_id()), settings.clone())
                .await?;
            let tx = Transaction {
                inner: Arc::new(TxInner {
                    session: Arc::clone(&session),
                    id: meta.id,
                    stats_mode: options.stats_mode,
                    pool_id: options.pool_id.clone(),
                }),
            };
            match f(tx.clone()).await {
                Ok(value) => {
                    session
                        .client()
                        .commit_transaction(session.id(), Some(session.node_id()), tx.id())
                        .await?;
                    Ok(value)
                }
                Err(e) => {
                    if let Err(rollback) = session
                        .client()
                        .rollback_transaction(session.id(), Some(session.node_id()), tx.id())
                        .await
                    {
                        tracing::debug!("rollback failed: {rollback}");
                    }
                    Err(e)
                }
            }
        }
        .await;
        if let Err(e) = &result {
            if e.is_session_invalidating() {
                session.invalidate();
            }
        }
        self.pool.release(&session);
        result
    }

    /// Rejects waiters, deletes pooled sessions, leaves the driver running.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

struct TxInner {
    session: Arc<QuerySession>,
    id: String,
    stats_mode: StatsMode,
    pool_id: Option<String>,
}

/// Execution context of one open transaction: the session, its node and the
/// transaction id travel with every nested statement.
#[derive(Clone)]
pub struct Transaction {
    inner: Arc<TxInner>,
}

impl Transaction {
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn session_id(&self) -> &str {
        self.inner.session.id()
    }

    pub fn node_id(&self) -> u32 {
        self.inner.session.node_id()
    }

    /// Executes a statement inside this transaction.
    pub async fn execute(&self, statement: impl Into<Statement>) -> Result<QueryResult, Error> {
        let statement = statement.into();
        let tx_control = TransactionControl {
            commit_tx: false,
            tx_selector: Some(TxSelector::TxId(self.inner.id.clone())),
        };
        let options = ExecuteOptions {
            stats_mode: self.inner.stats_mode,
            pool_id: self.inner.pool_id.clone(),
            ..Default::default()
        };
        execute_on_session(&self.inner.session, &statement, Some(tx_control), &options).await
    }
}

async fn execute_on_session(
    session: &Arc<QuerySession>,
    statement: &Statement,
    tx_control: Option<TransactionControl>,
    options: &ExecuteOptions,
) -> Result<QueryResult, Error> {
    let parameters: HashMap<String, ydb_apis::ydb::TypedValue> = statement
        .params
        .iter()
        .map(|(name, value)| (name.clone(), value.typed()))
        .collect();

    let request = ExecuteQueryRequest {
        session_id: session.id().to_string(),
        exec_mode: ExecMode::Execute as i32,
        tx_control,
        parameters,
        stats_mode: options.stats_mode as i32,
        concurrent_result_sets: false,
        pool_id: options.pool_id.clone().unwrap_or_default(),
        query: Some(ydb_apis::query::execute_query_request::Query::QueryContent(
            QueryContent {
                syntax: Syntax::YqlV1 as i32,
                text: statement.text.clone(),
            },
        )),
    };

    let mut stream = session
        .client()
        .execute_query(request, Some(session.node_id()))
        .await?;

    let mut result = QueryResult::default();
    while let Some(part) = stream.message().await.map_err(Error::Grpc)? {
        check_status(part.status, &part.issues)?;
        if let Some(meta) = part.tx_meta {
            if !meta.id.is_empty() {
                result.tx_id = Some(meta.id);
            }
        }
        if let Some(stats) = part.exec_stats {
            result.stats = Some(stats);
        }
        let Some(result_set) = part.result_set else {
            continue;
        };
        let index = part.result_set_index as usize;
        if result.result_sets.len() <= index {
            result.result_sets.resize_with(index + 1, ResultSet::default);
        }
        let slot = &mut result.result_sets[index];
        if slot.columns.is_empty() && !result_set.columns.is_empty() {
            let columns = result_set
                .columns
                .iter()
                .map(|c| {
                    let ty = c
                        .r#type
                        .as_ref()
                        .ok_or_else(|| ClientError::MalformedResult("column without type".to_string()))?;
                    Ok(Column {
                        name: c.name.clone(),
                        r#type: Type::from_proto(ty)?,
                    })
                })
                .collect::<Result<Vec<_>, Error>>()?;
            slot.columns = Arc::new(columns);
        }
        for row in &result_set.rows {
            if row.items.len() != slot.columns.len() {
                return Err(ClientError::MalformedResult("row arity mismatch".to_string()).into());
            }
            let values = slot
                .columns
                .iter()
                .zip(row.items.iter())
                .map(|(column, cell)| Value::from_proto(&column.r#type, cell))
                .collect::<Result<Vec<_>, Error>>()?;
            slot.rows.push(Row {
                columns: Arc::clone(&slot.columns),
                values,
            });
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolation_settings() {
        assert!(IsolationLevel::Implicit.tx_settings().is_none());
        let serializable = IsolationLevel::SerializableReadWrite.tx_settings().unwrap();
        assert!(matches!(
            serializable.tx_mode,
            Some(TxMode::SerializableReadWrite(_))
        ));
        let online = IsolationLevel::OnlineReadOnly {
            allow_inconsistent_reads: true,
        }
        .tx_settings()
        .unwrap();
        match online.tx_mode {
            Some(TxMode::OnlineReadOnly(settings)) => {
                assert!(settings.allow_inconsistent_reads)
            }
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[test]
    fn test_row_access() {
        let columns = Arc::new(vec![
            Column {
                name: "id".to_string(),
                r#type: Type::Int64,
            },
            Column {
                name: "name".to_string(),
                r#type: Type::Text,
            },
        ]);
        let row = Row {
            columns: Arc::clone(&columns),
            values: vec![Value::Int64(7), Value::Text("seven".to_string())],
        };
        assert_eq!(row.get::<i64>("id").unwrap(), 7);
        assert_eq!(row.get::<String>("name").unwrap(), "seven");
        assert_eq!(row.get_at::<i64>(0).unwrap(), 7);
        assert!(row.get::<i64>("missing").is_err());
        assert_eq!(row.values().len(), 2);
    }
}
