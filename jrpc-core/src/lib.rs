//! Core JSON-RPC 2.0 types and codec for jrpc
//!
//! This crate provides the transport-agnostic foundation of the engine:
//!
//! - **Value**: a tagged union for parameters and results that keeps 32/64-bit
//!   integers, binary blobs and timestamps distinct
//! - **Types**: requests, notifications and responses
//! - **Codec**: validation and translation between JSON text and the types above
//! - **Error handling**: the fault taxonomy and the crate-wide `Error`
//! - **Logging**: an optional `tracing-subscriber` setup
//!
//! # Architecture
//!
//! Nothing here performs I/O. The `jrpc-server` crate turns request text into
//! response text; the `jrpc-client` crate builds request text and reads replies.
//! Moving those bytes is left to the host.
//!
//! # Example
//!
//! ```rust
//! use jrpc_core::{codec, params, Id, Request};
//!
//! let request = Request::new("add", params![5, 3], Id::from(1i64));
//! let json = codec::encode_request(&request);
//!
//! let decoded = codec::decode_request(&json).unwrap();
//! assert_eq!(decoded.method, "add");
//! ```

pub mod codec;
pub mod error;
pub mod logging;
pub mod types;
pub mod value;

pub use error::{Error, Fault, FaultKind, Result};
pub use logging::{init_logging, LoggingConfig};
pub use types::{Id, Request, Response};
pub use value::{Array, Binary, FromValue, IntoOutcome, IntoValue, Struct, Value, ValueKind};
