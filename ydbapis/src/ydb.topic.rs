#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Codec {
    Unspecified = 0,
    Raw = 1,
    Gzip = 2,
    Lzop = 3,
    Zstd = 4,
}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct SupportedCodecs {
    #[prost(int32, repeated, tag = "1")]
    pub codecs: ::prost::alloc::vec::Vec<i32>,
}
/// Half-open offset interval `[start, end)`.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct OffsetsRange {
    #[prost(int64, tag = "1")]
    pub start: i64,
    #[prost(int64, tag = "2")]
    pub end: i64,
}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct MetadataItem {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct UpdateTokenRequest {
    #[prost(string, tag = "1")]
    pub token: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct UpdateTokenResponse {}
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct TransactionIdentity {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub session_id: ::prost::alloc::string::String,
}
/// Messages of the bidirectional read stream.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct StreamReadMessage {}
/// Nested message and enum types in `StreamReadMessage`.
pub mod stream_read_message {
    /// Server-controlled unit of reading within the stream.
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct PartitionSession {
        /// Identifier of the partition session, unique within the read stream.
        #[prost(int64, tag = "1")]
        pub partition_session_id: i64,
        #[prost(string, tag = "2")]
        pub path: ::prost::alloc::string::String,
        #[prost(int64, tag = "3")]
        pub partition_id: i64,
    }
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct InitRequest {
        #[prost(message, repeated, tag = "1")]
        pub topics_read_settings: ::prost::alloc::vec::Vec<init_request::TopicReadSettings>,
        #[prost(string, tag = "2")]
        pub consumer: ::prost::alloc::string::String,
        #[prost(string, tag = "3")]
        pub reader_name: ::prost::alloc::string::String,
    }
    /// Nested message and enum types in `InitRequest`.
    pub mod init_request {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct TopicReadSettings {
            #[prost(string, tag = "1")]
            pub path: ::prost::alloc::string::String,
            /// Empty list means reading from all partitions.
            #[prost(int64, repeated, tag = "2")]
            pub partition_ids: ::prost::alloc::vec::Vec<i64>,
            #[prost(message, optional, tag = "3")]
            pub max_lag: ::core::option::Option<::prost_types::Duration>,
            #[prost(message, optional, tag = "4")]
            pub read_from: ::core::option::Option<::prost_types::Timestamp>,
        }
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct InitResponse {
        #[prost(string, tag = "1")]
        pub session_id: ::prost::alloc::string::String,
    }
    /// Grants `bytes_size` more bytes of flow-control credit to the server.
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct ReadRequest {
        #[prost(int64, tag = "1")]
        pub bytes_size: i64,
    }
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ReadResponse {
        #[prost(message, repeated, tag = "1")]
        pub partition_data: ::prost::alloc::vec::Vec<read_response::PartitionData>,
        /// Total size of the response; this much credit is consumed.
        #[prost(int64, tag = "2")]
        pub bytes_size: i64,
    }
    /// Nested message and enum types in `ReadResponse`.
    pub mod read_response {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct MessageData {
            #[prost(int64, tag = "1")]
            pub offset: i64,
            #[prost(int64, tag = "2")]
            pub seq_no: i64,
            #[prost(message, optional, tag = "3")]
            pub created_at: ::core::option::Option<::prost_types::Timestamp>,
            /// Compressed with the codec of the enclosing batch.
            #[prost(bytes = "vec", tag = "5")]
            pub data: ::prost::alloc::vec::Vec<u8>,
            #[prost(int64, tag = "6")]
            pub uncompressed_size: i64,
            #[prost(string, tag = "7")]
            pub message_group_id: ::prost::alloc::string::String,
            #[prost(message, repeated, tag = "8")]
            pub metadata_items: ::prost::alloc::vec::Vec<super::super::MetadataItem>,
        }
        /// Messages of a single producer, written with a single codec.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Batch {
            #[prost(message, repeated, tag = "1")]
            pub message_data: ::prost::alloc::vec::Vec<MessageData>,
            #[prost(string, tag = "2")]
            pub producer_id: ::prost::alloc::string::String,
            #[prost(map = "string, string", tag = "3")]
            pub write_session_meta: ::std::collections::HashMap<
                ::prost::alloc::string::String,
                ::prost::alloc::string::String,
            >,
            #[prost(enumeration = "super::super::Codec", tag = "4")]
            pub codec: i32,
            #[prost(message, optional, tag = "5")]
            pub written_at: ::core::option::Option<::prost_types::Timestamp>,
        }
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct PartitionData {
            #[prost(int64, tag = "1")]
            pub partition_session_id: i64,
            #[prost(message, repeated, tag = "2")]
            pub batches: ::prost::alloc::vec::Vec<Batch>,
        }
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct CommitOffsetRequest {
        #[prost(message, repeated, tag = "1")]
        pub commit_offsets:
            ::prost::alloc::vec::Vec<commit_offset_request::PartitionCommitOffset>,
    }
    /// Nested message and enum types in `CommitOffsetRequest`.
    pub mod commit_offset_request {
        #[derive(Clone, PartialEq, Eq, ::prost::Message)]
        pub struct PartitionCommitOffset {
            #[prost(int64, tag = "1")]
            pub partition_session_id: i64,
            /// Disjoint ranges in strictly increasing order of `start`.
            #[prost(message, repeated, tag = "2")]
            pub offsets: ::prost::alloc::vec::Vec<super::super::OffsetsRange>,
        }
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct CommitOffsetResponse {
        #[prost(message, repeated, tag = "1")]
        pub partitions_committed_offsets:
            ::prost::alloc::vec::Vec<commit_offset_response::PartitionCommittedOffset>,
    }
    /// Nested message and enum types in `CommitOffsetResponse`.
    pub mod commit_offset_response {
        #[derive(Clone, PartialEq, Eq, ::prost::Message)]
        pub struct PartitionCommittedOffset {
            #[prost(int64, tag = "1")]
            pub partition_session_id: i64,
            /// All offsets below this one are acknowledged.
            #[prost(int64, tag = "2")]
            pub committed_offset: i64,
        }
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct StartPartitionSessionRequest {
        #[prost(message, optional, tag = "1")]
        pub partition_session: ::core::option::Option<PartitionSession>,
        #[prost(int64, tag = "2")]
        pub committed_offset: i64,
        #[prost(message, optional, tag = "3")]
        pub partition_offsets: ::core::option::Option<super::OffsetsRange>,
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct StartPartitionSessionResponse {
        #[prost(int64, tag = "1")]
        pub partition_session_id: i64,
        /// Absent means reading from the committed offset.
        #[prost(int64, optional, tag = "2")]
        pub read_offset: ::core::option::Option<i64>,
        #[prost(int64, optional, tag = "3")]
        pub commit_offset: ::core::option::Option<i64>,
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct StopPartitionSessionRequest {
        #[prost(int64, tag = "1")]
        pub partition_session_id: i64,
        /// Graceful stop waits for a StopPartitionSessionResponse and keeps
        /// delivering buffered data; an immediate stop drops the session.
        #[prost(bool, tag = "2")]
        pub graceful: bool,
        #[prost(int64, tag = "3")]
        pub committed_offset: i64,
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct StopPartitionSessionResponse {
        #[prost(int64, tag = "1")]
        pub partition_session_id: i64,
    }
    /// No more messages will ever arrive for this partition session.
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct EndPartitionSession {
        #[prost(int64, tag = "1")]
        pub partition_session_id: i64,
    }
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct FromClient {
        #[prost(oneof = "from_client::ClientMessage", tags = "1, 2, 3, 4, 5, 6")]
        pub client_message: ::core::option::Option<from_client::ClientMessage>,
    }
    /// Nested message and enum types in `FromClient`.
    pub mod from_client {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum ClientMessage {
            #[prost(message, tag = "1")]
            InitRequest(super::InitRequest),
            #[prost(message, tag = "2")]
            ReadRequest(super::ReadRequest),
            #[prost(message, tag = "3")]
            CommitOffsetRequest(super::CommitOffsetRequest),
            #[prost(message, tag = "4")]
            StartPartitionSessionResponse(super::StartPartitionSessionResponse),
            #[prost(message, tag = "5")]
            StopPartitionSessionResponse(super::StopPartitionSessionResponse),
            #[prost(message, tag = "6")]
            UpdateTokenRequest(super::super::UpdateTokenRequest),
        }
    }
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct FromServer {
        #[prost(enumeration = "super::super::ydb::status_ids::StatusCode", tag = "1")]
        pub status: i32,
        #[prost(message, repeated, tag = "2")]
        pub issues: ::prost::alloc::vec::Vec<super::super::issue::IssueMessage>,
        #[prost(oneof = "from_server::ServerMessage", tags = "3, 4, 5, 6, 7, 8, 9")]
        pub server_message: ::core::option::Option<from_server::ServerMessage>,
    }
    /// Nested message and enum types in `FromServer`.
    pub mod from_server {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum ServerMessage {
            #[prost(message, tag = "3")]
            InitResponse(super::InitResponse),
            #[prost(message, tag = "4")]
            ReadResponse(super::ReadResponse),
            #[prost(message, tag = "5")]
            CommitOffsetResponse(super::CommitOffsetResponse),
            #[prost(message, tag = "6")]
            StartPartitionSessionRequest(super::StartPartitionSessionRequest),
            #[prost(message, tag = "7")]
            StopPartitionSessionRequest(super::StopPartitionSessionRequest),
            #[prost(message, tag = "8")]
            EndPartitionSession(super::EndPartitionSession),
            #[prost(message, tag = "9")]
            UpdateTokenResponse(super::super::UpdateTokenResponse),
        }
    }
}
/// Messages of the bidirectional write stream.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct StreamWriteMessage {}
/// Nested message and enum types in `StreamWriteMessage`.
pub mod stream_write_message {
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct InitRequest {
        #[prost(string, tag = "1")]
        pub path: ::prost::alloc::string::String,
        /// Messages of one producer are deduplicated by seq_no.
        #[prost(string, tag = "2")]
        pub producer_id: ::prost::alloc::string::String,
        #[prost(map = "string, string", tag = "3")]
        pub write_session_meta: ::std::collections::HashMap<
            ::prost::alloc::string::String,
            ::prost::alloc::string::String,
        >,
        #[prost(bool, tag = "4")]
        pub get_last_seq_no: bool,
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct InitResponse {
        /// Last persisted seq_no of this producer; zero when unknown.
        #[prost(int64, tag = "1")]
        pub last_seq_no: i64,
        #[prost(string, tag = "2")]
        pub session_id: ::prost::alloc::string::String,
        #[prost(int64, tag = "3")]
        pub partition_id: i64,
        #[prost(message, optional, tag = "4")]
        pub supported_codecs: ::core::option::Option<super::SupportedCodecs>,
    }
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct WriteRequest {
        #[prost(message, repeated, tag = "1")]
        pub messages: ::prost::alloc::vec::Vec<write_request::MessageData>,
        #[prost(enumeration = "super::Codec", tag = "2")]
        pub codec: i32,
        /// When set, the written messages become visible on transaction commit.
        #[prost(message, optional, tag = "3")]
        pub tx: ::core::option::Option<super::TransactionIdentity>,
    }
    /// Nested message and enum types in `WriteRequest`.
    pub mod write_request {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct MessageData {
            #[prost(int64, tag = "1")]
            pub seq_no: i64,
            #[prost(message, optional, tag = "2")]
            pub created_at: ::core::option::Option<::prost_types::Timestamp>,
            #[prost(bytes = "vec", tag = "3")]
            pub data: ::prost::alloc::vec::Vec<u8>,
            #[prost(int64, tag = "4")]
            pub uncompressed_size: i64,
            #[prost(string, tag = "5")]
            pub message_group_id: ::prost::alloc::string::String,
            #[prost(message, repeated, tag = "6")]
            pub metadata_items: ::prost::alloc::vec::Vec<super::super::MetadataItem>,
        }
    }
    #[derive(Clone, PartialEq, Eq, ::prost::Message)]
    pub struct WriteResponse {
        #[prost(message, repeated, tag = "1")]
        pub acks: ::prost::alloc::vec::Vec<write_response::WriteAck>,
        #[prost(int64, tag = "2")]
        pub partition_id: i64,
    }
    /// Nested message and enum types in `WriteResponse`.
    pub mod write_response {
        #[derive(Clone, PartialEq, Eq, ::prost::Message)]
        pub struct Written {
            #[prost(int64, tag = "1")]
            pub offset: i64,
        }
        /// The message was deduplicated away.
        #[derive(Clone, PartialEq, Eq, ::prost::Message)]
        pub struct Skipped {
            #[prost(enumeration = "skipped::Reason", tag = "1")]
            pub reason: i32,
        }
        /// Nested message and enum types in `Skipped`.
        pub mod skipped {
            #[derive(
                Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
            )]
            #[repr(i32)]
            pub enum Reason {
                Unspecified = 0,
                AlreadyWritten = 1,
            }
        }
        #[derive(Clone, PartialEq, Eq, ::prost::Message)]
        pub struct WrittenInTx {}
        #[derive(Clone, PartialEq, Eq, ::prost::Message)]
        pub struct WriteAck {
            #[prost(int64, tag = "1")]
            pub seq_no: i64,
            #[prost(oneof = "write_ack::MessageWriteStatus", tags = "2, 3, 4")]
            pub message_write_status: ::core::option::Option<write_ack::MessageWriteStatus>,
        }
        /// Nested message and enum types in `WriteAck`.
        pub mod write_ack {
            #[derive(Clone, PartialEq, Eq, ::prost::Oneof)]
            pub enum MessageWriteStatus {
                #[prost(message, tag = "2")]
                Written(super::Written),
                #[prost(message, tag = "3")]
                Skipped(super::Skipped),
                #[prost(message, tag = "4")]
                WrittenInTx(super::WrittenInTx),
            }
        }
    }
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct FromClient {
        #[prost(oneof = "from_client::ClientMessage", tags = "1, 2, 3")]
        pub client_message: ::core::option::Option<from_client::ClientMessage>,
    }
    /// Nested message and enum types in `FromClient`.
    pub mod from_client {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum ClientMessage {
            #[prost(message, tag = "1")]
            InitRequest(super::InitRequest),
            #[prost(message, tag = "2")]
            WriteRequest(super::WriteRequest),
            #[prost(message, tag = "3")]
            UpdateTokenRequest(super::super::UpdateTokenRequest),
        }
    }
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct FromServer {
        #[prost(enumeration = "super::super::ydb::status_ids::StatusCode", tag = "1")]
        pub status: i32,
        #[prost(message, repeated, tag = "2")]
        pub issues: ::prost::alloc::vec::Vec<super::super::issue::IssueMessage>,
        #[prost(oneof = "from_server::ServerMessage", tags = "3, 4, 5")]
        pub server_message: ::core::option::Option<from_server::ServerMessage>,
    }
    /// Nested message and enum types in `FromServer`.
    pub mod from_server {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum ServerMessage {
            #[prost(message, tag = "3")]
            InitResponse(super::InitResponse),
            #[prost(message, tag = "4")]
            WriteResponse(super::WriteResponse),
            #[prost(message, tag = "5")]
            UpdateTokenResponse(super::super::UpdateTokenResponse),
        }
    }
}
/// Generated client implementations.
pub mod topic_service_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;
    #[derive(Debug, Clone)]
    pub struct TopicServiceClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl TopicServiceClient<tonic::transport::Channel> {
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
    impl<T> TopicServiceClient<T>
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
        ) -> TopicServiceClient<InterceptedService<T, F>>
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
            TopicServiceClient::new(InterceptedService::new(inner, interceptor))
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
        /// Bidirectional stream for reading topic data with client-driven flow control.
        pub async fn stream_read(
            &mut self,
            request: impl tonic::IntoStreamingRequest<
                Message = super::stream_read_message::FromClient,
            >,
        ) -> Result<
            tonic::Response<tonic::codec::Streaming<super::stream_read_message::FromServer>>,
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
                http::uri::PathAndQuery::from_static("/Ydb.Topic.V1.TopicService/StreamRead");
            let mut req = request.into_streaming_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("Ydb.Topic.V1.TopicService", "StreamRead"));
            self.inner.streaming(req, path, codec).await
        }
        /// Bidirectional stream for writing topic data with producer deduplication.
        pub async fn stream_write(
            &mut self,
            request: impl tonic::IntoStreamingRequest<
                Message = super::stream_write_message::FromClient,
            >,
        ) -> Result<
            tonic::Response<tonic::codec::Streaming<super::stream_write_message::FromServer>>,
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
                http::uri::PathAndQuery::from_static("/Ydb.Topic.V1.TopicService/StreamWrite");
            let mut req = request.into_streaming_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("Ydb.Topic.V1.TopicService", "StreamWrite"));
            self.inner.streaming(req, path, codec).await
        }
    }
}
