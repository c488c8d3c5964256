/// Describes an owner or a waiter of a semaphore.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct SemaphoreSession {
    /// Monotonically increasing order of the acquire, unique within the node.
    #[prost(uint64, tag = "1")]
    pub order_id: u64,
    #[prost(uint64, tag = "2")]
    pub session_id: u64,
    /// Time remaining for a waiter to either acquire or give up.
    #[prost(uint64, tag = "3")]
    pub timeout_millis: u64,
    #[prost(uint64, tag = "4")]
    pub count: u64,
    #[prost(bytes = "vec", tag = "5")]
    pub data: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct SemaphoreDescription {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub data: ::prost::alloc::vec::Vec<u8>,
    /// Sum of counts of all active acquire operations.
    #[prost(uint64, tag = "3")]
    pub count: u64,
    #[prost(uint64, tag = "4")]
    pub limit: u64,
    #[prost(bool, tag = "5")]
    pub ephemeral: bool,
    #[prost(message, repeated, tag = "6")]
    pub owners: ::prost::alloc::vec::Vec<SemaphoreSession>,
    #[prost(message, repeated, tag = "7")]
    pub waiters: ::prost::alloc::vec::Vec<SemaphoreSession>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SessionRequest {
    #[prost(oneof = "session_request::Request", tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10")]
    pub request: ::core::option::Option<session_request::Request>,
}
/// Nested message and enum types in `SessionRequest`.
pub mod session_request {
    /// First message of a new or restored session.
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct SessionStart {
        /// Path of the coordination node.
        #[prost(string, tag = "1")]
        pub path: ::prost::alloc::string::String,
        /// Zero to create a new session, a previous id to restore it.
        #[prost(uint64, tag = "2")]
        pub session_id: u64,
        /// How long the session survives a client disconnect.
        #[prost(uint64, tag = "3")]
        pub timeout_millis: u64,
        #[prost(string, tag = "4")]
        pub description: ::prost::alloc::string::String,
        /// Strictly increases across reconnects of the same session.
        #[prost(uint64, tag = "5")]
        pub seq_no: u64,
        #[prost(bytes = "vec", tag = "6")]
        pub protection_key: ::prost::alloc::vec::Vec<u8>,
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct SessionStop {}
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct PingPong {
        /// Opaque payload echoed back by the peer.
        #[prost(uint64, tag = "1")]
        pub opaque: u64,
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct AcquireSemaphore {
        #[prost(uint64, tag = "1")]
        pub req_id: u64,
        #[prost(string, tag = "2")]
        pub name: ::prost::alloc::string::String,
        /// Zero fails immediately when the semaphore cannot be acquired.
        #[prost(uint64, tag = "3")]
        pub timeout_millis: u64,
        #[prost(uint64, tag = "4")]
        pub count: u64,
        #[prost(bytes = "vec", tag = "5")]
        pub data: ::prost::alloc::vec::Vec<u8>,
        /// Auto-created on first acquire and auto-deleted on last release.
        #[prost(bool, tag = "6")]
        pub ephemeral: bool,
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct ReleaseSemaphore {
        #[prost(uint64, tag = "1")]
        pub req_id: u64,
        #[prost(string, tag = "2")]
        pub name: ::prost::alloc::string::String,
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct CreateSemaphore {
        #[prost(uint64, tag = "1")]
        pub req_id: u64,
        #[prost(string, tag = "2")]
        pub name: ::prost::alloc::string::String,
        #[prost(uint64, tag = "3")]
        pub limit: u64,
        #[prost(bytes = "vec", tag = "4")]
        pub data: ::prost::alloc::vec::Vec<u8>,
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct UpdateSemaphore {
        #[prost(uint64, tag = "1")]
        pub req_id: u64,
        #[prost(string, tag = "2")]
        pub name: ::prost::alloc::string::String,
        #[prost(bytes = "vec", tag = "3")]
        pub data: ::prost::alloc::vec::Vec<u8>,
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct DeleteSemaphore {
        #[prost(uint64, tag = "1")]
        pub req_id: u64,
        #[prost(string, tag = "2")]
        pub name: ::prost::alloc::string::String,
        /// Delete the semaphore even if it is currently held.
        #[prost(bool, tag = "3")]
        pub force: bool,
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct DescribeSemaphore {
        #[prost(uint64, tag = "1")]
        pub req_id: u64,
        #[prost(string, tag = "2")]
        pub name: ::prost::alloc::string::String,
        #[prost(bool, tag = "3")]
        pub include_owners: bool,
        #[prost(bool, tag = "4")]
        pub include_waiters: bool,
        /// Subscribe to changes of the semaphore data.
        #[prost(bool, tag = "5")]
        pub watch_data: bool,
        /// Subscribe to changes of the owner list.
        #[prost(bool, tag = "6")]
        pub watch_owners: bool,
    }
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Request {
        #[prost(message, tag = "1")]
        Ping(PingPong),
        #[prost(message, tag = "2")]
        Pong(PingPong),
        #[prost(message, tag = "3")]
        SessionStart(SessionStart),
        #[prost(message, tag = "4")]
        SessionStop(SessionStop),
        #[prost(message, tag = "5")]
        AcquireSemaphore(AcquireSemaphore),
        #[prost(message, tag = "6")]
        ReleaseSemaphore(ReleaseSemaphore),
        #[prost(message, tag = "7")]
        CreateSemaphore(CreateSemaphore),
        #[prost(message, tag = "8")]
        UpdateSemaphore(UpdateSemaphore),
        #[prost(message, tag = "9")]
        DeleteSemaphore(DeleteSemaphore),
        #[prost(message, tag = "10")]
        DescribeSemaphore(DescribeSemaphore),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SessionResponse {
    #[prost(
        oneof = "session_response::Response",
        tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13"
    )]
    pub response: ::core::option::Option<session_response::Response>,
}
/// Nested message and enum types in `SessionResponse`.
pub mod session_response {
    /// The server is no longer able to serve this stream.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Failure {
        #[prost(enumeration = "super::super::ydb::status_ids::StatusCode", tag = "1")]
        pub status: i32,
        #[prost(message, repeated, tag = "2")]
        pub issues: ::prost::alloc::vec::Vec<super::super::issue::IssueMessage>,
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct SessionStarted {
        #[prost(uint64, tag = "1")]
        pub session_id: u64,
        #[prost(uint64, tag = "2")]
        pub timeout_millis: u64,
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct SessionStopped {
        #[prost(uint64, tag = "1")]
        pub session_id: u64,
    }
    /// The acquire is blocked on other owners.
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct AcquireSemaphorePending {
        #[prost(uint64, tag = "1")]
        pub req_id: u64,
    }
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct AcquireSemaphoreResult {
        #[prost(uint64, tag = "1")]
        pub req_id: u64,
        #[prost(enumeration = "super::super::ydb::status_ids::StatusCode", tag = "2")]
        pub status: i32,
        #[prost(message, repeated, tag = "3")]
        pub issues: ::prost::alloc::vec::Vec<super::super::issue::IssueMessage>,
        /// False when the timeout expired before the semaphore could be acquired.
        #[prost(bool, tag = "4")]
        pub acquired: bool,
    }
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ReleaseSemaphoreResult {
        #[prost(uint64, tag = "1")]
        pub req_id: u64,
        #[prost(enumeration = "super::super::ydb::status_ids::StatusCode", tag = "2")]
        pub status: i32,
        #[prost(message, repeated, tag = "3")]
        pub issues: ::prost::alloc::vec::Vec<super::super::issue::IssueMessage>,
        /// False when the semaphore was not held by this session.
        #[prost(bool, tag = "4")]
        pub released: bool,
    }
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CreateSemaphoreResult {
        #[prost(uint64, tag = "1")]
        pub req_id: u64,
        #[prost(enumeration = "super::super::ydb::status_ids::StatusCode", tag = "2")]
        pub status: i32,
        #[prost(message, repeated, tag = "3")]
        pub issues: ::prost::alloc::vec::Vec<super::super::issue::IssueMessage>,
    }
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct UpdateSemaphoreResult {
        #[prost(uint64, tag = "1")]
        pub req_id: u64,
        #[prost(enumeration = "super::super::ydb::status_ids::StatusCode", tag = "2")]
        pub status: i32,
        #[prost(message, repeated, tag = "3")]
        pub issues: ::prost::alloc::vec::Vec<super::super::issue::IssueMessage>,
    }
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DeleteSemaphoreResult {
        #[prost(uint64, tag = "1")]
        pub req_id: u64,
        #[prost(enumeration = "super::super::ydb::status_ids::StatusCode", tag = "2")]
        pub status: i32,
        #[prost(message, repeated, tag = "3")]
        pub issues: ::prost::alloc::vec::Vec<super::super::issue::IssueMessage>,
    }
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DescribeSemaphoreResult {
        #[prost(uint64, tag = "1")]
        pub req_id: u64,
        #[prost(enumeration = "super::super::ydb::status_ids::StatusCode", tag = "2")]
        pub status: i32,
        #[prost(message, repeated, tag = "3")]
        pub issues: ::prost::alloc::vec::Vec<super::super::issue::IssueMessage>,
        #[prost(message, optional, tag = "4")]
        pub semaphore_description: ::core::option::Option<super::SemaphoreDescription>,
        #[prost(bool, tag = "5")]
        pub watch_added: bool,
    }
    /// Fires at most once per watch registered by a DescribeSemaphore.
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct DescribeSemaphoreChanged {
        #[prost(uint64, tag = "1")]
        pub req_id: u64,
        #[prost(bool, tag = "2")]
        pub data_changed: bool,
        #[prost(bool, tag = "3")]
        pub owners_changed: bool,
    }
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Response {
        #[prost(message, tag = "1")]
        Ping(super::session_request::PingPong),
        #[prost(message, tag = "2")]
        Pong(super::session_request::PingPong),
        #[prost(message, tag = "3")]
        Failure(Failure),
        #[prost(message, tag = "4")]
        SessionStarted(SessionStarted),
        #[prost(message, tag = "5")]
        SessionStopped(SessionStopped),
        #[prost(message, tag = "6")]
        AcquireSemaphorePending(AcquireSemaphorePending),
        #[prost(message, tag = "7")]
        AcquireSemaphoreResult(AcquireSemaphoreResult),
        #[prost(message, tag = "8")]
        ReleaseSemaphoreResult(ReleaseSemaphoreResult),
        #[prost(message, tag = "9")]
        CreateSemaphoreResult(CreateSemaphoreResult),
        #[prost(message, tag = "10")]
        UpdateSemaphoreResult(UpdateSemaphoreResult),
        #[prost(message, tag = "11")]
        DeleteSemaphoreResult(DeleteSemaphoreResult),
        #[prost(message, tag = "12")]
        DescribeSemaphoreResult(DescribeSemaphoreResult),
        #[prost(message, tag = "13")]
        DescribeSemaphoreChanged(DescribeSemaphoreChanged),
    }
}
/// Generated client implementations.
pub mod coordination_service_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;
    #[derive(Debug, Clone)]
    pub struct CoordinationServiceClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl CoordinationServiceClient<tonic::transport::Channel> {
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
    impl<T> CoordinationServiceClient<T>
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
        ) -> CoordinationServiceClient<InterceptedService<T, F>>
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
            CoordinationServiceClient::new(InterceptedService::new(inner, interceptor))
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
        /// Bidirectional stream carrying one coordination session.
        pub async fn session(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = super::SessionRequest>,
        ) -> Result<tonic::Response<tonic::codec::Streaming<super::SessionResponse>>, tonic::Status>
        {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/Ydb.Coordination.V1.CoordinationService/Session",
            );
            let mut req = request.into_streaming_request();
            req.extensions_mut().insert(GrpcMethod::new(
                "Ydb.Coordination.V1.CoordinationService",
                "Session",
            ));
            self.inner.streaming(req, path, codec).await
        }
    }
}
