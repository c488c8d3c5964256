pub mod codec;
pub mod message;
pub mod partition_session;
pub mod reader;
pub mod writer;

pub use codec::{CodecRegistry, Decompressor};
pub use message::TopicMessage;
pub use partition_session::PartitionSession;
pub use reader::{
    CommitAck, ReadOptions, ReaderOptions, StartOffsets, TopicReader, TopicSelector, TxTopicReader,
};
pub use writer::{TopicWriter, WriteAck, WriteResult, WriterOptions};

pub use ydb_apis::topic::{Codec, TransactionIdentity};
