//! Error types for jrpc
//!
//! This module provides the two error shapes used throughout the engine:
//!
//! - **Fault**: the wire-format JSON-RPC error object (`code`, `message`, optional `data`)
//! - **Error**: the crate-wide failure type returned by fallible operations (uses thiserror)
//!
//! # Fault Codes
//!
//! JSON-RPC 2.0 defines standard error codes:
//! - `-32700`: Parse error (invalid JSON)
//! - `-32600`: Invalid request (malformed envelope)
//! - `-32601`: Method not found
//! - `-32602`: Invalid parameters
//! - `-32603`: Internal error
//! - `-32099 to -32000`: Server error (application-defined, `-32000` is the default)
//!
//! The whole range `-32768 to -32000` is reserved for the protocol. Codes outside
//! of it belong to the application and round-trip as opaque faults.
//!
//! # Failure Boundary
//!
//! Procedures registered with the dispatcher fail with `Error`. The dispatcher
//! turns every such failure into a `Fault` with [`Error::into_fault`], so a
//! failing procedure always produces a well-formed fault response:
//!
//! ```rust
//! use jrpc_core::{Error, Fault, FaultKind};
//!
//! let fault = Error::Application("disk full".into()).into_fault();
//! assert_eq!(fault.code, Fault::SERVER_ERROR_CODE_DEFAULT);
//! assert_eq!(fault.kind(), FaultKind::ServerError);
//! assert_eq!(fault.message, "disk full");
//! ```

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Result type for jrpc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide failure type
///
/// Every variant maps onto a fault code through [`Error::into_fault`]:
///
/// - `Fault`: already a protocol fault, kept as is
/// - `InvalidArgument` / `OutOfRange`: the caller handed over something unusable,
///   reported as `Invalid parameters` (-32602)
/// - `Application` / `Config`: reported as a server error
///   with the default code (-32000) and the failure's description
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A JSON-RPC fault (protocol, dispatch or application-coded)
    #[error("{0}")]
    Fault(#[from] Fault),

    /// An argument was rejected (duplicate registration, arity mismatch, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A lookup missed (unknown method name, index past the end, ...)
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// Failure raised by user procedure code
    #[error("{0}")]
    Application(String),

    /// Invalid configuration (logging filters, builders)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap any displayable failure as an application error
    pub fn application(err: impl fmt::Display) -> Self {
        Error::Application(err.to_string())
    }

    /// Convert this error into the fault reported to the remote caller
    pub fn into_fault(self) -> Fault {
        match self {
            Error::Fault(fault) => fault,
            Error::InvalidArgument(_) | Error::OutOfRange(_) => Fault::invalid_parameters(),
            Error::Application(message) | Error::Config(message) => {
                Fault::server_error(Fault::SERVER_ERROR_CODE_DEFAULT, message)
            }
        }
    }

    /// The fault carried by this error, if it is one
    pub fn as_fault(&self) -> Option<&Fault> {
        match self {
            Error::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::Application(message)
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::Application(message.to_string())
    }
}

/// Classification of a fault by its code
///
/// This is how a decoded reply is turned back into the most specific failure
/// category so callers can discriminate programmatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// -32700
    ParseError,
    /// -32600
    InvalidRequest,
    /// -32601
    MethodNotFound,
    /// -32602
    InvalidParameters,
    /// -32603
    InternalError,
    /// -32099 to -32000
    ServerError,
    /// Any other code in -32768 to -32000
    Reserved,
    /// Codes outside the reserved range (including the opaque code 0)
    Application,
}

impl FaultKind {
    /// Whether the fault was raised by the protocol layer rather than by a procedure
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            FaultKind::ParseError
                | FaultKind::InvalidRequest
                | FaultKind::MethodNotFound
                | FaultKind::InvalidParameters
                | FaultKind::InternalError
        )
    }
}

/// JSON-RPC 2.0 error object
///
/// This structure is the exact wire format of the `error` member of a
/// response. The optional `data` member is always a string.
///
/// # Examples
///
/// ```rust
/// use jrpc_core::{Fault, FaultKind};
///
/// let fault = Fault::method_not_found("calculate");
/// assert_eq!(fault.code, -32601);
/// assert_eq!(fault.message, "Method not found: calculate");
/// assert_eq!(fault.kind(), FaultKind::MethodNotFound);
///
/// let custom = Fault::new(1001, "Insufficient funds").with_data("balance=50");
/// assert_eq!(custom.kind(), FaultKind::Application);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Fault {
    /// Numeric error code
    pub code: i32,

    /// Short description of the error
    pub message: String,

    /// Optional additional information
    #[serde(default)]
    pub data: Option<String>,
}

impl Fault {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMETERS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    pub const RESERVED_CODE_MIN: i32 = -32768;
    pub const RESERVED_CODE_MAX: i32 = -32000;

    pub const SERVER_ERROR_CODE_MIN: i32 = -32099;
    pub const SERVER_ERROR_CODE_MAX: i32 = -32000;
    pub const SERVER_ERROR_CODE_DEFAULT: i32 = -32000;

    /// Code used for failures that carry no usable description
    pub const UNKNOWN_ERROR: i32 = 0;

    /// Create a fault with an arbitrary code and message
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attach a `data` string to the fault
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Invalid JSON was received (-32700)
    pub fn parse_error() -> Self {
        Self::new(Self::PARSE_ERROR, "Parse error")
    }

    /// The JSON sent is not a valid request or response object (-32600)
    pub fn invalid_request() -> Self {
        Self::new(Self::INVALID_REQUEST, "Invalid request")
    }

    /// The method does not exist (-32601)
    pub fn method_not_found(method: impl AsRef<str>) -> Self {
        Self::new(
            Self::METHOD_NOT_FOUND,
            format!("Method not found: {}", method.as_ref()),
        )
    }

    /// Wrong arity or parameter kinds (-32602)
    pub fn invalid_parameters() -> Self {
        Self::new(Self::INVALID_PARAMETERS, "Invalid parameters")
    }

    /// Internal JSON-RPC error (-32603)
    pub fn internal_error() -> Self {
        Self::new(Self::INTERNAL_ERROR, "Internal error")
    }

    /// Application-defined error in the server error range
    ///
    /// Codes outside `-32099..=-32000` are replaced by the default server
    /// error code (-32000).
    pub fn server_error(code: i32, message: impl Into<String>) -> Self {
        let code = if (Self::SERVER_ERROR_CODE_MIN..=Self::SERVER_ERROR_CODE_MAX).contains(&code) {
            code
        } else {
            Self::SERVER_ERROR_CODE_DEFAULT
        };
        Self::new(code, message)
    }

    /// Opaque fault for failures of unknown shape
    pub fn unknown() -> Self {
        Self::new(Self::UNKNOWN_ERROR, "unknown error")
    }

    /// Reconstruct the most specific fault category from the code
    pub fn kind(&self) -> FaultKind {
        match self.code {
            Self::PARSE_ERROR => FaultKind::ParseError,
            Self::INVALID_REQUEST => FaultKind::InvalidRequest,
            Self::METHOD_NOT_FOUND => FaultKind::MethodNotFound,
            Self::INVALID_PARAMETERS => FaultKind::InvalidParameters,
            Self::INTERNAL_ERROR => FaultKind::InternalError,
            Self::SERVER_ERROR_CODE_MIN..=Self::SERVER_ERROR_CODE_MAX => FaultKind::ServerError,
            Self::RESERVED_CODE_MIN..=Self::RESERVED_CODE_MAX => FaultKind::Reserved,
            _ => FaultKind::Application,
        }
    }
}

impl fmt::Display for Fault {
    /// Formats as "[code] message", e.g. "[-32601] Method not found: foo"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for Fault {}
