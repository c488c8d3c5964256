pub mod client;
pub mod session;
pub mod session_pool;
pub mod yql;

pub use client::{
    Column, ExecuteOptions, IsolationLevel, QueryClient, QueryResult, ResultSet, Row, Transaction,
};
pub use session::{QuerySession, SessionState};
pub use session_pool::{SessionPool, SessionPoolOptions, SessionPoolStats};
pub use yql::{identifier, Statement, UnsafeString, Yql};
