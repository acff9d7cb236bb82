//! Error types for the Dexcom MCP server.

use thiserror::Error;

use crate::mcp::protocol::error_codes;

/// Result type alias for Dexcom MCP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Dexcom MCP server.
#[derive(Error, Debug)]
pub enum Error {
    // ===== Dexcom Share Errors =====
    #[error("Dexcom API error: {status} {code} - {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid glucose reading: {0}")]
    InvalidReading(String),

    #[error("No glucose readings available")]
    NoReadings,

    // ===== MCP Errors =====
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidToolArguments(String),

    #[error("Provider not initialized")]
    ProviderNotInitialized,

    #[error("Error executing tool: {0}")]
    ToolExecutionFailed(String),

    // ===== I/O Errors =====
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ===== HTTP Errors =====
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP server error: {0}")]
    HttpServer(String),

    // ===== Internal Errors =====
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout: operation timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
}

impl Error {
    /// Create an API error from a Dexcom Share error response.
    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Classify a Dexcom Share `{Code, Message}` error body.
    pub fn from_dexcom(status: u16, code: &str, message: &str) -> Self {
        match code {
            "SessionIdNotFound" | "SessionNotValid" => {
                Self::Session(format!("{}: {}", code, message))
            }
            "AccountPasswordInvalid"
            | "SSO_AuthenticatePasswordInvalid"
            | "SSO_AuthenticateAccountNotFound" => Self::Auth("Invalid username or password".to_string()),
            "SSO_AuthenticateMaxAttemptsExceeded" => {
                Self::Auth("Maximum authentication attempts exceeded".to_string())
            }
            "InvalidArgument" => Self::InvalidArgument(message.to_string()),
            _ => Self::api(status, code, message),
        }
    }

    /// JSON-RPC error code reported for this error.
    pub fn rpc_code(&self) -> i32 {
        match self {
            Self::Parse(_) => error_codes::PARSE_ERROR,
            Self::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            Self::MethodNotFound(_) | Self::ToolNotFound(_) => error_codes::METHOD_NOT_FOUND,
            _ => error_codes::INTERNAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let api_err = Error::api(500, "InternalError", "Something broke");
        assert_eq!(
            api_err.to_string(),
            "Dexcom API error: 500 InternalError - Something broke"
        );

        let auth_err = Error::Auth("Invalid username or password".to_string());
        assert_eq!(
            auth_err.to_string(),
            "Authentication error: Invalid username or password"
        );

        assert_eq!(
            Error::ProviderNotInitialized.to_string(),
            "Provider not initialized"
        );
        assert_eq!(
            Error::NoReadings.to_string(),
            "No glucose readings available"
        );
    }

    #[test]
    fn test_mcp_errors() {
        let method = Error::MethodNotFound("foo".to_string());
        assert_eq!(method.to_string(), "Method not found: foo");

        let tool = Error::ToolNotFound("unknown_tool".to_string());
        assert_eq!(tool.to_string(), "Tool not found: unknown_tool");

        let failed = Error::ToolExecutionFailed("connection refused".to_string());
        assert_eq!(failed.to_string(), "Error executing tool: connection refused");
    }

    #[test]
    fn test_rpc_codes() {
        assert_eq!(Error::MethodNotFound("x".to_string()).rpc_code(), -32601);
        assert_eq!(Error::ToolNotFound("x".to_string()).rpc_code(), -32601);
        assert_eq!(Error::ProviderNotInitialized.rpc_code(), -32603);
        assert_eq!(Error::ToolExecutionFailed("x".to_string()).rpc_code(), -32603);
        assert_eq!(Error::Timeout { seconds: 30 }.rpc_code(), -32603);
        assert_eq!(Error::Parse("x".to_string()).rpc_code(), -32700);
        assert_eq!(Error::InvalidRequest("x".to_string()).rpc_code(), -32600);
    }

    #[test]
    fn test_from_dexcom_codes() {
        assert!(matches!(
            Error::from_dexcom(500, "SessionNotValid", "expired"),
            Error::Session(_)
        ));
        assert!(matches!(
            Error::from_dexcom(500, "SessionIdNotFound", "missing"),
            Error::Session(_)
        ));
        assert!(matches!(
            Error::from_dexcom(500, "AccountPasswordInvalid", "bad"),
            Error::Auth(_)
        ));
        assert!(matches!(
            Error::from_dexcom(500, "SSO_AuthenticateMaxAttemptsExceeded", "locked"),
            Error::Auth(_)
        ));
        assert!(matches!(
            Error::from_dexcom(500, "InvalidArgument", "minutes"),
            Error::InvalidArgument(_)
        ));

        match Error::from_dexcom(503, "Unavailable", "try later") {
            Error::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 503);
                assert_eq!(code, "Unavailable");
                assert_eq!(message, "try later");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_timeout_display() {
        let timeout = Error::Timeout { seconds: 60 };
        assert_eq!(
            timeout.to_string(),
            "Timeout: operation timed out after 60 seconds"
        );
    }
}
