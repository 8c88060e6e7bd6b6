use thiserror::Error;

/// Failures surfaced by gateway operations.
///
/// Every operation either returns its typed result or exactly one of these.
/// Batch items never surface a `Query` failure; it is recorded on the item instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Missing or invalid connection settings. Fatal until fixed externally.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network, authentication, or liveness-probe failure while opening a session.
    #[error("Connection to {uri} failed: {reason}")]
    Connection { uri: String, reason: String },

    /// A write-only operation received a statement that is not a write.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The database rejected or failed to execute a statement.
    #[error("Query error: {0}")]
    Query(String),
}

impl GatewayError {
    /// Short, stable name of the failure category.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Connection { .. } => "connection",
            Self::Validation(_) => "validation",
            Self::Query(_) => "query",
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_names_endpoint() {
        let err = GatewayError::Connection {
            uri: "bolt://db:7687".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Connection to bolt://db:7687 failed: connection refused"
        );
        assert_eq!(err.kind(), "connection");
    }

    #[test]
    fn kinds_are_distinct() {
        let kinds = [
            GatewayError::Configuration(String::new()).kind(),
            GatewayError::Validation(String::new()).kind(),
            GatewayError::Query(String::new()).kind(),
        ];
        assert_eq!(kinds, ["configuration", "validation", "query"]);
    }
}
