#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CreateSessionRequest {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateSessionResponse {
    #[prost(enumeration = "super::ydb::status_ids::StatusCode", tag = "1")]
    pub status: i32,
    #[prost(message, repeated, tag = "2")]
    pub issues: ::prost::alloc::vec::Vec<super::issue::IssueMessage>,
    #[prost(string, tag = "3")]
    pub session_id: ::prost::alloc::string::String,
    /// Node the session lives on; subsequent calls should prefer it.
    #[prost(int64, tag = "4")]
    pub node_id: i64,
}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DeleteSessionRequest {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteSessionResponse {
    #[prost(enumeration = "super::ydb::status_ids::StatusCode", tag = "1")]
    pub status: i32,
    #[prost(message, repeated, tag = "2")]
    pub issues: ::prost::alloc::vec::Vec<super::issue::IssueMessage>,
}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct AttachSessionRequest {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
}
/// Periodic state of an attached session. The stream itself is the liveness
/// signal; a non-success status invalidates the session.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SessionState {
    #[prost(enumeration = "super::ydb::status_ids::StatusCode", tag = "1")]
    pub status: i32,
    #[prost(message, repeated, tag = "2")]
    pub issues: ::prost::alloc::vec::Vec<super::issue::IssueMessage>,
}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct SerializableModeSettings {}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct OnlineModeSettings {
    #[prost(bool, tag = "1")]
    pub allow_inconsistent_reads: bool,
}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct StaleModeSettings {}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct SnapshotModeSettings {}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct TransactionSettings {
    #[prost(oneof = "transaction_settings::TxMode", tags = "1, 2, 3, 4")]
    pub tx_mode: ::core::option::Option<transaction_settings::TxMode>,
}
/// Nested message and enum types in `TransactionSettings`.
pub mod transaction_settings {
    #[derive(Clone, PartialEq, Eq, ::prost::Oneof)]
    pub enum TxMode {
        #[prost(message, tag = "1")]
        SerializableReadWrite(super::SerializableModeSettings),
        #[prost(message, tag = "2")]
        OnlineReadOnly(super::OnlineModeSettings),
        #[prost(message, tag = "3")]
        StaleReadOnly(super::StaleModeSettings),
        #[prost(message, tag = "4")]
        SnapshotReadOnly(super::SnapshotModeSettings),
    }
}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct TransactionControl {
    /// Commit the transaction together with this statement.
    #[prost(bool, tag = "10")]
    pub commit_tx: bool,
    #[prost(oneof = "transaction_control::TxSelector", tags = "1, 2")]
    pub tx_selector: ::core::option::Option<transaction_control::TxSelector>,
}
/// Nested message and enum types in `TransactionControl`.
pub mod transaction_control {
    #[derive(Clone, PartialEq, Eq, ::prost::Oneof)]
    pub enum TxSelector {
        #[prost(string, tag = "1")]
        TxId(::prost::alloc::string::String),
        #[prost(message, tag = "2")]
        BeginTx(super::TransactionSettings),
    }
}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct TransactionMeta {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct BeginTransactionRequest {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub tx_settings: ::core::option::Option<TransactionSettings>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BeginTransactionResponse {
    #[prost(enumeration = "super::ydb::status_ids::StatusCode", tag = "1")]
    pub status: i32,
    #[prost(message, repeated, tag = "2")]
    pub issues: ::prost::alloc::vec::Vec<super::issue::IssueMessage>,
    #[prost(message, optional, tag = "3")]
    pub tx_meta: ::core::option::Option<TransactionMeta>,
}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CommitTransactionRequest {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub tx_id: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommitTransactionResponse {
    #[prost(enumeration = "super::ydb::status_ids::StatusCode", tag = "1")]
    pub status: i32,
    #[prost(message, repeated, tag = "2")]
    pub issues: ::prost::alloc::vec::Vec<super::issue::IssueMessage>,
}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct RollbackTransactionRequest {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub tx_id: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RollbackTransactionResponse {
    #[prost(enumeration = "super::ydb::status_ids::StatusCode", tag = "1")]
    pub status: i32,
    #[prost(message, repeated, tag = "2")]
    pub issues: ::prost::alloc::vec::Vec<super::issue::IssueMessage>,
}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct QueryContent {
    #[prost(enumeration = "Syntax", tag = "1")]
    pub syntax: i32,
    #[prost(string, tag = "2")]
    pub text: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteQueryRequest {
    #[prost(string, tag = "1")]
    pub session_id: ::prost::alloc::string::String,
    #[prost(enumeration = "ExecMode", tag = "2")]
    pub exec_mode: i32,
    /// Absent control means an implicit transaction.
    #[prost(message, optional, tag = "3")]
    pub tx_control: ::core::option::Option<TransactionControl>,
    /// Parameter names carry the leading `$`.
    #[prost(map = "string, message", tag = "6")]
    pub parameters:
        ::std::collections::HashMap<::prost::alloc::string::String, super::ydb::TypedValue>,
    #[prost(enumeration = "StatsMode", tag = "7")]
    pub stats_mode: i32,
    #[prost(bool, tag = "8")]
    pub concurrent_result_sets: bool,
    /// Resource pool to execute in; empty means the default pool.
    #[prost(string, tag = "10")]
    pub pool_id: ::prost::alloc::string::String,
    #[prost(oneof = "execute_query_request::Query", tags = "4")]
    pub query: ::core::option::Option<execute_query_request::Query>,
}
/// Nested message and enum types in `ExecuteQueryRequest`.
pub mod execute_query_request {
    #[derive(Clone, PartialEq, Eq, ::prost::Oneof)]
    pub enum Query {
        #[prost(message, tag = "4")]
        QueryContent(super::QueryContent),
    }
}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ExecStats {
    #[prost(string, tag = "1")]
    pub query_plan: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub query_ast: ::prost::alloc::string::String,
    #[prost(uint64, tag = "3")]
    pub total_duration_us: u64,
    #[prost(uint64, tag = "4")]
    pub process_cpu_time_us: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteQueryResponsePart {
    #[prost(enumeration = "super::ydb::status_ids::StatusCode", tag = "1")]
    pub status: i32,
    #[prost(message, repeated, tag = "2")]
    pub issues: ::prost::alloc::vec::Vec<super::issue::IssueMessage>,
    #[prost(int64, tag = "3")]
    pub result_set_index: i64,
    #[prost(message, optional, tag = "4")]
    pub result_set: ::core::option::Option<super::ydb::ResultSet>,
    #[prost(message, optional, tag = "5")]
    pub exec_stats: ::core::option::Option<ExecStats>,
    #[prost(message, optional, tag = "6")]
    pub tx_meta: ::core::option::Option<TransactionMeta>,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Syntax {
    Unspecified = 0,
    /// YQL
    YqlV1 = 1,
    /// PostgresQL
    Pg = 2,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ExecMode {
    Unspecified = 0,
    Parse = 10,
    Validate = 20,
    Explain = 30,
    Execute = 50,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum StatsMode {
    Unspecified = 0,
    /// Stats collection is disabled.
    None = 10,
    /// Aggregated stats of reads, updates and deletes per table.
    Basic = 20,
    /// Add execution stats and plan on top of STATS_MODE_BASIC.
    Full = 30,
    /// Detailed execution stats including stats for individual tasks and channels.
    Profile = 40,
}
/// Generated client implementations.
pub mod query_service_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;
    #[derive(Debug, Clone)]
    pub struct QueryServiceClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl QueryServiceClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> QueryServiceClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }
        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> QueryServiceClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T::ResponseBody: Default,
            T: tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
                Response = http::Response<
                    <T as tonic::client::GrpcService<tonic::body::BoxBody>>::ResponseBody,
                >,
            >,
            <T as tonic::codegen::Service<http::Request<tonic::body::BoxBody>>>::Error:
                Into<StdError> + Send + Sync,
        {
            QueryServiceClient::new(InterceptedService::new(inner, interceptor))
        }
        /// Compress requests with the given encoding.
        ///
        /// This requires the server to support it otherwise it might respond with an
        /// error.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.send_compressed(encoding);
            self
        }
        /// Enable decompressing responses.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.accept_compressed(encoding);
            self
        }
        /// Limits the maximum size of a decoded message.
        ///
        /// Default: `4MB`
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_decoding_message_size(limit);
            self
        }
        /// Limits the maximum size of an encoded message.
        ///
        /// Default: `usize::MAX`
        #[must_use]
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_encoding_message_size(limit);
            self
        }
        /// Creates a new session attached to the node that answers.
        pub async fn create_session(
            &mut self,
            request: impl tonic::IntoRequest<super::CreateSessionRequest>,
        ) -> Result<tonic::Response<super::CreateSessionResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/Ydb.Query.V1.QueryService/CreateSession");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("Ydb.Query.V1.QueryService", "CreateSession"));
            self.inner.unary(req, path, codec).await
        }
        pub async fn delete_session(
            &mut self,
            request: impl tonic::IntoRequest<super::DeleteSessionRequest>,
        ) -> Result<tonic::Response<super::DeleteSessionResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/Ydb.Query.V1.QueryService/DeleteSession");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("Ydb.Query.V1.QueryService", "DeleteSession"));
            self.inner.unary(req, path, codec).await
        }
        /// Attaches to the session identified by the request. The stream stays
        /// open for the session lifetime; its termination invalidates the session.
        pub async fn attach_session(
            &mut self,
            request: impl tonic::IntoRequest<super::AttachSessionRequest>,
        ) -> Result<tonic::Response<tonic::codec::Streaming<super::SessionState>>, tonic::Status>
        {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/Ydb.Query.V1.QueryService/AttachSession");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("Ydb.Query.V1.QueryService", "AttachSession"));
            self.inner.server_streaming(req, path, codec).await
        }
        pub async fn begin_transaction(
            &mut self,
            request: impl tonic::IntoRequest<super::BeginTransactionRequest>,
        ) -> Result<tonic::Response<super::BeginTransactionResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/Ydb.Query.V1.QueryService/BeginTransaction",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("Ydb.Query.V1.QueryService", "BeginTransaction"));
            self.inner.unary(req, path, codec).await
        }
        pub async fn commit_transaction(
            &mut self,
            request: impl tonic::IntoRequest<super::CommitTransactionRequest>,
        ) -> Result<tonic::Response<super::CommitTransactionResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/Ydb.Query.V1.QueryService/CommitTransaction",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("Ydb.Query.V1.QueryService", "CommitTransaction"));
            self.inner.unary(req, path, codec).await
        }
        pub async fn rollback_transaction(
            &mut self,
            request: impl tonic::IntoRequest<super::RollbackTransactionRequest>,
        ) -> Result<tonic::Response<super::RollbackTransactionResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/Ydb.Query.V1.QueryService/RollbackTransaction",
            );
            let mut req = request.into_request();
            req.extensions_mut().insert(GrpcMethod::new(
                "Ydb.Query.V1.QueryService",
                "RollbackTransaction",
            ));
            self.inner.unary(req, path, codec).await
        }
        /// Executes a statement, streaming result-set parts back to the client.
        pub async fn execute_query(
            &mut self,
            request: impl tonic::IntoRequest<super::ExecuteQueryRequest>,
        ) -> Result<
            tonic::Response<tonic::codec::Streaming<super::ExecuteQueryResponsePart>>,
            tonic::Status,
        > {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/Ydb.Query.V1.QueryService/ExecuteQuery");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("Ydb.Query.V1.QueryService", "ExecuteQuery"));
            self.inner.server_streaming(req, path, codec).await
        }
    }
}
