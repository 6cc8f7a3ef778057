//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes by error kind.

use jsonrpsee::types::ErrorObjectOwned;
use waitline_core::error::{AppError, ErrorKind};

/// RPC Error Codes
pub mod code {
    pub const INVALID_ARGUMENT: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const ALREADY_EXISTS: i32 = 4002;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const INFRASTRUCTURE_ERROR: i32 = 5001;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    let code = match err.kind() {
        ErrorKind::InvalidArgument => code::INVALID_ARGUMENT,
        ErrorKind::NotFound => code::NOT_FOUND,
        ErrorKind::AlreadyExists => code::ALREADY_EXISTS,
        ErrorKind::Infrastructure => {
            tracing::error!(error = %err, "Storage failure while serving request");
            code::INFRASTRUCTURE_ERROR
        }
        ErrorKind::Internal => {
            tracing::error!(error = %err, "Internal failure while serving request");
            code::INTERNAL_ERROR
        }
    };
    ErrorObjectOwned::owned(code, err.to_string(), None::<()>)
}
