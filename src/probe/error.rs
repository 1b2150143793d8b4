//! Error types for node probing.

use thiserror::Error;

/// Why a probe did not come back healthy.
///
/// Downstream logic only ever sees the collapsed `Unreachable` verdict and
/// the hard/soft split from [`ProbeError::is_hard`]; the variants exist for
/// logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// Request timeout
    #[error("probe timed out after {0}ms")]
    Timeout(u64),

    /// Nothing is listening on the node's port
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    /// Any other connection-level failure (DNS, unreachable host, reset)
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Node answered with a non-success status
    #[error("HTTP error: {0}")]
    HttpStatus(u16),

    /// Request could not be built or the response could not be read
    #[error("request error: {0}")]
    Request(String),
}

impl ProbeError {
    /// A hard failure is a definitive down-signal: the process is not there
    /// to answer. Timeouts and error statuses are soft.
    pub fn is_hard(&self) -> bool {
        matches!(self, ProbeError::ConnectionRefused(_))
    }

    /// Classify a reqwest error.
    pub fn from_reqwest(e: &reqwest::Error, timeout_ms: u64) -> Self {
        if e.is_timeout() {
            return ProbeError::Timeout(timeout_ms);
        }
        if e.is_connect() {
            if is_connection_refused(e) {
                return ProbeError::ConnectionRefused(e.to_string());
            }
            return ProbeError::ConnectionFailed(e.to_string());
        }
        if let Some(status) = e.status() {
            return ProbeError::HttpStatus(status.as_u16());
        }
        ProbeError::Request(e.to_string())
    }
}

/// Walk the source chain looking for an `ECONNREFUSED`.
fn is_connection_refused(e: &(dyn std::error::Error + 'static)) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(e);
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        source = err.source();
    }
    false
}
