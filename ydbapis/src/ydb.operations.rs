#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OperationParams {
    #[prost(message, optional, tag = "1")]
    pub operation_timeout: ::core::option::Option<::prost_types::Duration>,
    #[prost(message, optional, tag = "2")]
    pub cancel_after: ::core::option::Option<::prost_types::Duration>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Operation {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    /// False means the operation is still being processed.
    #[prost(bool, tag = "2")]
    pub ready: bool,
    #[prost(enumeration = "super::ydb::status_ids::StatusCode", tag = "3")]
    pub status: i32,
    #[prost(message, repeated, tag = "4")]
    pub issues: ::prost::alloc::vec::Vec<super::issue::IssueMessage>,
    /// Result data packed as the operation-specific result message.
    #[prost(message, optional, tag = "5")]
    pub result: ::core::option::Option<::prost_types::Any>,
}
