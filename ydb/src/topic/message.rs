use ydb_apis::topic::MetadataItem;

/// One message read from a topic, decompressed and annotated with its
/// partition session.
#[derive(Debug, Clone)]
pub struct TopicMessage {
    pub partition_session_id: i64,
    pub partition_id: i64,
    pub topic: String,
    pub producer_id: String,
    pub payload: Vec<u8>,
    /// Wire codec the payload arrived with.
    pub codec: i32,
    pub seq_no: i64,
    pub offset: i64,
    pub uncompressed_size: i64,
    pub created_at: Option<prost_types::Timestamp>,
    pub written_at: Option<prost_types::Timestamp>,
    pub metadata_items: Vec<MetadataItem>,
}
