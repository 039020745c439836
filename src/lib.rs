//! jrpc - transport-agnostic JSON-RPC 2.0
//!
//! This is the convenience crate that re-exports all jrpc sub-crates.
//! Use it if you want a single dependency for both sides of a connection.
//!
//! # Architecture
//!
//! jrpc is organized into modular crates:
//!
//! - **jrpc-core**: value model, faults, envelopes, codec, logging setup
//! - **jrpc-server**: method dispatcher and request handling
//! - **jrpc-client**: call building and reply decoding
//! - **jrpc-macros**: the `#[procedure]` attribute
//!
//! None of them performs I/O. Text goes in, text comes out; the transport is
//! the host's business.
//!
//! # Quick Start
//!
//! ```rust
//! use jrpc::core::params;
//! use jrpc::{Client, Server};
//!
//! let server = Server::builder()
//!     .method("add", |a: i32, b: i32| a + b)
//!     .build()
//!     .unwrap();
//! let client = Client::new();
//!
//! let request = client.build_request("add", params![5, 3]);
//! let reply = server.handle_request(&request);
//!
//! assert_eq!(client.parse_result::<i32>(&reply).unwrap(), 8);
//! ```

pub use jrpc_client as client;
pub use jrpc_core as core;
pub use jrpc_macros as macros;
pub use jrpc_server as server;

pub use jrpc_client::Client;
pub use jrpc_core::{Error, Fault, Result, Value};
pub use jrpc_macros::procedure;
pub use jrpc_server::{Dispatcher, Server};
