//! JSON-RPC 2.0 client for jrpc
//!
//! The client side of the engine: it builds request and notification text
//! and decodes the replies. Sending and receiving are left to the host.
//!
//! # Core Features
//!
//! - **Call building**: positional parameters from native values via `params!`
//! - **Id allocation**: per-client counter starting at 0
//! - **Reply decoding**: validated envelopes, faults raised as errors
//!
//! # Quick Start
//!
//! ```rust
//! use jrpc_client::Client;
//! use jrpc_core::params;
//! use jrpc_server::Server;
//!
//! let server = Server::builder()
//!     .method("add", |a: i32, b: i32| a + b)
//!     .build()
//!     .unwrap();
//! let client = Client::new();
//!
//! let reply = server.handle_request(&client.build_request("add", params![3, 2]));
//! let sum: i32 = client.parse_result(&reply).unwrap();
//! assert_eq!(sum, 5);
//! ```

mod client;
mod request;

pub use client::Client;
pub use request::IdCounter;
