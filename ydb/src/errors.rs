use ydb_apis::issue::IssueMessage;
use ydb_apis::operations::Operation;
use ydb_apis::ydb::status_ids::StatusCode;
use ydb_gax::grpc::Code;
use ydb_gax::retry::{Abort, DefaultDelay, Predicate, RetrySetting, Strategy, TryAs};

/// Error reported by the server together with the issue tree explaining it.
#[derive(thiserror::Error, Debug, Clone)]
#[error("operation error {code:?}: {}", issues_text(.issues))]
pub struct OperationError {
    pub code: StatusCode,
    pub issues: Vec<IssueMessage>,
}

fn issues_text(issues: &[IssueMessage]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Programmer errors. Never retried.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no connection available")]
    NoConnectionAvailable,

    #[error("pool closed")]
    PoolClosed,

    #[error("illegal session state: {0}")]
    IllegalSessionState(String),

    #[error("object disposed")]
    Disposed,

    #[error("stream closed")]
    StreamClosed,

    #[error("yql template: {0}")]
    Yql(String),

    #[error("malformed operation result: {0}")]
    MalformedResult(String),
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("transport error: {0}")]
    Grpc(#[from] ydb_gax::grpc::Status),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// Marker observed by waiters whose session creation was performed by
    /// another caller and failed. The next acquire starts a fresh creation.
    #[error("session creation failed")]
    SessionCreationFailed,

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation timed out")]
    Timeout,
}

impl Error {
    pub fn operation(status: i32, issues: Vec<IssueMessage>) -> Error {
        Error::Operation(OperationError {
            code: StatusCode::from_i32(status).unwrap_or(StatusCode::StatusCodeUnspecified),
            issues,
        })
    }

    pub fn operation_code(&self) -> Option<StatusCode> {
        match self {
            Error::Operation(op) => Some(op.code),
            _ => None,
        }
    }

    /// BAD_SESSION and SESSION_EXPIRED mean the server-side session is gone;
    /// holders must discard it.
    pub fn is_session_invalidating(&self) -> bool {
        matches!(
            self.operation_code(),
            Some(StatusCode::BadSession) | Some(StatusCode::SessionExpired)
        )
    }
}

impl TryAs<ydb_gax::grpc::Status> for Error {
    fn try_as(&self) -> Option<&ydb_gax::grpc::Status> {
        match self {
            Error::Grpc(s) => Some(s),
            _ => None,
        }
    }
}

impl Abort for Error {
    fn never_retry(&self) -> bool {
        matches!(self, Error::Cancelled | Error::Timeout)
    }

    fn cancelled() -> Self {
        Error::Cancelled
    }
}

impl DefaultDelay for Error {
    fn default_strategy(&self) -> Strategy {
        match self {
            Error::Operation(op) => match op.code {
                StatusCode::BadSession | StatusCode::SessionExpired | StatusCode::Aborted => {
                    Strategy::fixed(0)
                }
                StatusCode::Overloaded => Strategy::exponential(1000),
                _ => Strategy::exponential(10),
            },
            Error::Grpc(status) => match status.code() {
                Code::Aborted => Strategy::fixed(0),
                Code::ResourceExhausted => Strategy::exponential(1000),
                _ => Strategy::exponential(10),
            },
            _ => Strategy::exponential(10),
        }
    }
}

/// The default classifier. Transport ABORTED, INTERNAL and RESOURCE_EXHAUSTED
/// are retried unconditionally, UNAVAILABLE only for idempotent calls.
/// Operation BAD_SESSION, OVERLOADED and UNAVAILABLE are retried
/// unconditionally; SESSION_EXPIRED, TIMEOUT and UNDETERMINED may have been
/// applied and require the idempotent hint.
pub fn default_retryable(err: &Error, idempotent: bool) -> bool {
    match err {
        Error::Grpc(status) => match status.code() {
            Code::Aborted | Code::Internal | Code::ResourceExhausted => true,
            Code::Unavailable => idempotent,
            _ => false,
        },
        Error::Operation(op) => match op.code {
            StatusCode::BadSession | StatusCode::Overloaded | StatusCode::Unavailable => true,
            StatusCode::SessionExpired | StatusCode::Timeout | StatusCode::Undetermined => {
                idempotent
            }
            _ => false,
        },
        Error::SessionCreationFailed => true,
        _ => false,
    }
}

pub fn default_predicate() -> Predicate<Error> {
    Box::new(default_retryable)
}

pub fn default_retry_setting() -> RetrySetting<Error> {
    RetrySetting::new(default_predicate())
}

/// Checks an inline status/issues pair carried by streamed responses.
pub fn check_status(status: i32, issues: &[IssueMessage]) -> Result<(), Error> {
    if status == StatusCode::Success as i32 {
        Ok(())
    } else {
        Err(Error::operation(status, issues.to_vec()))
    }
}

/// Unwraps an `Operation` envelope, checking its status and unpacking the
/// packed result message.
pub fn unpack_operation<T: prost::Message + Default>(
    operation: Option<Operation>,
) -> Result<T, Error> {
    let operation = operation
        .ok_or_else(|| ClientError::MalformedResult("missing operation".to_string()))?;
    check_status(operation.status, &operation.issues)?;
    let result = operation
        .result
        .ok_or_else(|| ClientError::MalformedResult("missing operation result".to_string()))?;
    T::decode(result.value.as_slice())
        .map_err(|e| ClientError::MalformedResult(format!("decode error: {e}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op_error(code: StatusCode) -> Error {
        Error::Operation(OperationError {
            code,
            issues: vec![],
        })
    }

    fn grpc_error(code: Code) -> Error {
        Error::Grpc(ydb_gax::grpc::Status::new(code, "test"))
    }

    #[test]
    fn test_classifier_transport_codes() {
        assert!(default_retryable(&grpc_error(Code::Aborted), false));
        assert!(default_retryable(&grpc_error(Code::Internal), false));
        assert!(default_retryable(&grpc_error(Code::ResourceExhausted), false));
        assert!(!default_retryable(&grpc_error(Code::Unavailable), false));
        assert!(default_retryable(&grpc_error(Code::Unavailable), true));
        assert!(!default_retryable(&grpc_error(Code::NotFound), true));
    }

    #[test]
    fn test_classifier_operation_codes() {
        assert!(default_retryable(&op_error(StatusCode::BadSession), false));
        assert!(default_retryable(&op_error(StatusCode::Overloaded), false));
        assert!(default_retryable(&op_error(StatusCode::Unavailable), false));
        assert!(!default_retryable(&op_error(StatusCode::SessionExpired), false));
        assert!(default_retryable(&op_error(StatusCode::SessionExpired), true));
        assert!(default_retryable(&op_error(StatusCode::Timeout), true));
        assert!(default_retryable(&op_error(StatusCode::Undetermined), true));
        assert!(!default_retryable(&op_error(StatusCode::SchemeError), true));
    }

    #[test]
    fn test_classifier_never_retries_cancellation() {
        assert!(Error::Cancelled.never_retry());
        assert!(Error::Timeout.never_retry());
        assert!(!default_retryable(&Error::Cancelled, true));
        assert!(!default_retryable(&Error::Client(ClientError::PoolClosed), true));
    }

    #[test]
    fn test_creation_failed_marker_is_retryable() {
        assert!(default_retryable(&Error::SessionCreationFailed, false));
    }

    #[test]
    fn test_default_strategy_selection() {
        assert!(matches!(
            op_error(StatusCode::BadSession).default_strategy(),
            Strategy::Fixed(0)
        ));
        assert!(matches!(
            grpc_error(Code::Aborted).default_strategy(),
            Strategy::Fixed(0)
        ));
        assert!(matches!(
            op_error(StatusCode::Overloaded).default_strategy(),
            Strategy::Exponential(1000)
        ));
        assert!(matches!(
            grpc_error(Code::ResourceExhausted).default_strategy(),
            Strategy::Exponential(1000)
        ));
        assert!(matches!(
            op_error(StatusCode::Undetermined).default_strategy(),
            Strategy::Exponential(10)
        ));
    }

    #[test]
    fn test_session_invalidation() {
        assert!(op_error(StatusCode::BadSession).is_session_invalidating());
        assert!(op_error(StatusCode::SessionExpired).is_session_invalidating());
        assert!(!op_error(StatusCode::Overloaded).is_session_invalidating());
        assert!(!grpc_error(Code::Unavailable).is_session_invalidating());
    }
}
