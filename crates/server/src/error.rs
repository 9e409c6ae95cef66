//! Errors raised at the tool-invocation boundary.

use kong_mcp_admin::AdminError;
use thiserror::Error;

pub type ToolResult<T> = Result<T, ToolError>;

/// JSON-RPC error codes used at the invocation boundary.
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// Failure of a single tool invocation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments did not match the tool's parameters.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// A parameter was well-formed but outside its documented bounds.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error("failed to serialize tool result: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ToolError {
    pub fn json_rpc_code(&self) -> i32 {
        match self {
            ToolError::UnknownTool(_) => METHOD_NOT_FOUND,
            ToolError::InvalidArguments(_) => INVALID_PARAMS,
            _ => INTERNAL_ERROR,
        }
    }

    /// Errors the caller caused by addressing or calling the tool wrongly,
    /// as opposed to failures of the tool itself.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            ToolError::UnknownTool(_) | ToolError::InvalidArguments(_)
        )
    }
}

impl From<ToolError> for rmcp::ErrorData {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::UnknownTool(_) => {
                rmcp::ErrorData::new(rmcp::model::ErrorCode::METHOD_NOT_FOUND, err.to_string(), None)
            }
            ToolError::InvalidArguments(_) => rmcp::ErrorData::invalid_params(err.to_string(), None),
            _ => rmcp::ErrorData::internal_error(err.to_string(), None),
        }
    }
}
