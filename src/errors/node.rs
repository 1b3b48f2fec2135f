//! Errors from the remote node.
//!
//! Every failure talking to the node is transient from the scanner's point of
//! view: it is answered by shrinking the request and backing off. The
//! [`NodeErrorKind`] lets callers tune that response (rate limits wait longer)
//! without ever inspecting error messages.

use std::fmt;

/// Classification of a node failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeErrorKind {
    /// The node (or a proxy in front of it) throttled the request
    RateLimited,
    /// No response within the configured request timeout
    Timeout,
    /// Connection reset, DNS failure, 5xx and similar transport problems
    Connection,
    /// The node answered with an error payload (e.g. "query returned more than 10000 results")
    Rejected,
    /// The node does not know the requested block
    MissingBlock,
}

impl NodeErrorKind {
    /// Whether the failure was the node asking us to slow down
    pub fn is_rate_limit(self) -> bool {
        matches!(self, NodeErrorKind::RateLimited)
    }
}

impl fmt::Display for NodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeErrorKind::RateLimited => "rate limited",
            NodeErrorKind::Timeout => "timed out",
            NodeErrorKind::Connection => "connection failure",
            NodeErrorKind::Rejected => "request rejected",
            NodeErrorKind::MissingBlock => "block not found",
        };
        f.write_str(name)
    }
}

/// A failed call to the remote node.
///
/// # Examples
///
/// ```rust
/// use transferscan::{NodeError, NodeErrorKind};
///
/// let error = NodeError::missing_block(42);
/// assert_eq!(error.kind(), NodeErrorKind::MissingBlock);
/// assert!(!error.is_rate_limit());
/// ```
#[derive(Debug, thiserror::Error)]
#[error("Node call {operation} failed ({kind})")]
pub struct NodeError {
    kind: NodeErrorKind,
    operation: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl NodeError {
    /// Creates a node error with an underlying cause
    pub fn new(
        kind: NodeErrorKind,
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            operation: operation.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a node error that has no underlying cause (stubs, synthetic failures)
    pub fn without_source(kind: NodeErrorKind, operation: impl Into<String>) -> Self {
        Self {
            kind,
            operation: operation.into(),
            source: None,
        }
    }

    /// The node returned no block for `block_number`
    pub fn missing_block(block_number: u64) -> Self {
        Self::without_source(
            NodeErrorKind::MissingBlock,
            format!("eth_getBlockByNumber({block_number})"),
        )
    }

    /// The request did not complete within `timeout_ms`
    pub fn timeout(operation: impl Into<String>, timeout_ms: u128) -> Self {
        let operation = operation.into();
        Self::without_source(
            NodeErrorKind::Timeout,
            format!("{operation} after {timeout_ms}ms"),
        )
    }

    pub fn kind(&self) -> NodeErrorKind {
        self.kind
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn is_rate_limit(&self) -> bool {
        self.kind.is_rate_limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_operation_and_kind() {
        let error = NodeError::without_source(NodeErrorKind::RateLimited, "eth_getLogs(1..=100)");
        assert_eq!(
            error.to_string(),
            "Node call eth_getLogs(1..=100) failed (rate limited)"
        );
        assert!(error.is_rate_limit());
    }

    #[test]
    fn test_timeout_helper() {
        let error = NodeError::timeout("eth_blockNumber", 30_000);
        assert_eq!(error.kind(), NodeErrorKind::Timeout);
        assert_eq!(error.operation(), "eth_blockNumber after 30000ms");
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error;

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let error = NodeError::new(NodeErrorKind::Connection, "eth_getLogs", io);
        assert!(error.source().is_some());
    }
}
