//! Error types for the MCP server.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `From` conversions.

use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

/// Main error type for the Snowflake object server.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Object(#[from] ObjectError),

    #[error("Warehouse error: {0}")]
    Warehouse(#[from] WarehouseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: Cow<'static, str> },
}

/// JSON-RPC 2.0 and MCP protocol errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Parse error: invalid JSON")]
    ParseError,

    #[error("Invalid request: {0}")]
    InvalidRequest(Cow<'static, str>),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(Cow<'static, str>),

    #[error("Internal error: {0}")]
    InternalError(Cow<'static, str>),

    #[error("Server not initialized")]
    NotInitialized,

    #[error("Transport error: {0}")]
    Transport(Cow<'static, str>),
}

impl ProtocolError {
    /// Returns the JSON-RPC 2.0 error code.
    pub fn code(&self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest(_) => -32600,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
            Self::InternalError(_) => -32603,
            Self::NotInitialized => -32002,
            Self::Transport(_) => -32000,
        }
    }
}

/// Classification of an object-management failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownType,
    InvalidArgument,
    MissingParentParameter,
    Protected,
    AlreadyExists,
    PermissionDenied,
    NotFound,
    Conflict,
    Unknown,
}

impl ErrorKind {
    /// HTTP-style status code reported alongside the error.
    pub fn status_code(self) -> u16 {
        match self {
            Self::UnknownType | Self::InvalidArgument | Self::MissingParentParameter => 400,
            Self::Protected | Self::PermissionDenied => 403,
            Self::NotFound => 404,
            Self::AlreadyExists | Self::Conflict => 409,
            Self::Unknown => 500,
        }
    }

    /// Classifies an error message raised by the warehouse.
    ///
    /// Substring matching is the only signal the warehouse gives us for these.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("already exists") {
            Self::AlreadyExists
        } else if lower.contains("insufficient privileges") {
            Self::PermissionDenied
        } else if lower.contains("cannot be dropped") {
            Self::Conflict
        } else {
            Self::Unknown
        }
    }
}

/// The single error shape surfaced by create/list/describe/drop.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{tool}: {message}")]
pub struct ObjectError {
    pub tool: Cow<'static, str>,
    pub kind: ErrorKind,
    pub message: String,
}

impl ObjectError {
    pub fn new(tool: impl Into<Cow<'static, str>>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_argument(tool: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self::new(tool, ErrorKind::InvalidArgument, message)
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// Re-labels the error with the tool that surfaced it.
    pub fn with_tool(mut self, tool: impl Into<Cow<'static, str>>) -> Self {
        self.tool = tool.into();
        self
    }

    /// JSON body returned to the tool caller.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "tool": self.tool,
            "message": self.message,
            "status_code": self.status_code(),
        })
    }
}

/// Failures raised by the external warehouse client.
#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("No Snowflake connection is configured: {0}")]
    NotConnected(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Snowflake API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for WarehouseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Identifier and literal errors raised while rendering SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    #[error("Identifier must not be empty")]
    EmptyIdentifier,

    #[error("Invalid identifier '{0}': control characters are not allowed")]
    InvalidIdentifier(String),

    #[error("Statement text must not be empty")]
    EmptyStatement,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(Cow<'static, str>),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
    },
}

/// Tool execution errors.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),
}

/// Result type alias for McpError.
pub type Result<T> = std::result::Result<T, McpError>;

/// Result type alias for ProtocolError.
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

/// Result type alias for ObjectError.
pub type ObjectResult<T> = std::result::Result<T, ObjectError>;

/// Result type alias for WarehouseError.
pub type WarehouseResult<T> = std::result::Result<T, WarehouseError>;

/// Result type alias for SqlError.
pub type SqlResult<T> = std::result::Result<T, SqlError>;
