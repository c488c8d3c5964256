#![allow(clippy::large_enum_variant)]

#[path = "ydb.rs"]
pub mod ydb;

#[path = "ydb.issue.rs"]
pub mod issue;

#[path = "ydb.operations.rs"]
pub mod operations;

#[path = "ydb.discovery.rs"]
pub mod discovery;

#[path = "ydb.query.rs"]
pub mod query;

#[path = "ydb.coordination.rs"]
pub mod coordination;

#[path = "ydb.topic.rs"]
pub mod topic;
