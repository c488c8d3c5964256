pub mod election;
pub mod lock;
pub mod session;

pub use election::{elect, LeaderEvent};
pub use lock::Lock;
pub use session::{
    AcquireOptions, CoordinationSession, DescribeOptions, DescribeResult, SessionOptions,
    WatchOptions,
};
