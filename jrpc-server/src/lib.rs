//! JSON-RPC 2.0 request handling for jrpc
//!
//! This crate turns request text into response text. It does no I/O: the
//! host reads a request from whatever transport it uses, hands the bytes to
//! [`Server::handle_request`], and writes back whatever comes out.
//!
//! # Core Features
//!
//! - **Dispatcher**: registry of native functions adapted to JSON-RPC methods
//! - **Aliases**: forwarding names with leading arguments bound
//! - **Failure boundary**: errors and panics in methods become faults
//! - **Introspection**: optional `system.*` methods
//!
//! # Quick Start
//!
//! ```rust
//! use jrpc_server::Server;
//!
//! let server = Server::builder()
//!     .method("add", |a: i32, b: i32| a + b)
//!     .method("concat", |a: String, b: String| a + &b)
//!     .build()
//!     .unwrap();
//!
//! let reply = server.handle_request(r#"{"jsonrpc":"2.0","method":"add","id":0,"params":[3,2]}"#);
//! let reply: serde_json::Value = serde_json::from_str(&reply).unwrap();
//! assert_eq!(reply, serde_json::json!({"jsonrpc": "2.0", "id": 0, "result": 5}));
//!
//! // Notifications produce no output at all
//! let reply = server.handle_request(r#"{"jsonrpc":"2.0","method":"add","params":[3,2]}"#);
//! assert!(reply.is_empty());
//! ```
//!
//! # Request Flow
//!
//! 1. The text is parsed and the envelope validated. A failure here is
//!    answered with a fault whose id is null.
//! 2. The dispatcher resolves aliases, finds the method and calls it.
//! 3. The response is serialized, unless the request was a notification.

mod builder;
mod dispatcher;
mod handler;
pub mod introspection;

pub use builder::ServerBuilder;
pub use dispatcher::{AliasWrapper, Dispatcher, MethodWrapper};
pub use handler::{from_raw_fn, IntoBoundMethod, IntoMethod, Method, Procedure};

use jrpc_core::{codec, Id, Response};
use tracing::{debug, trace};

/// JSON-RPC 2.0 server facade
///
/// Owns a [`Dispatcher`] and translates between wire text and dispatcher calls.
#[derive(Debug, Default)]
pub struct Server {
    dispatcher: Dispatcher,
}

impl Server {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a server around an already populated dispatcher
    pub fn with_dispatcher(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// Handle one request and return the serialized response
    ///
    /// Returns an empty string for a notification, whatever the outcome of
    /// the call.
    #[tracing::instrument(level = "debug", skip(self, text), fields(len = text.len()))]
    pub fn handle_request(&self, text: &str) -> String {
        String::from_utf8_lossy(&self.handle_bytes(text.as_bytes())).into_owned()
    }

    /// Byte-oriented variant of [`Server::handle_request`]
    pub fn handle_bytes(&self, bytes: &[u8]) -> Vec<u8> {
        trace!(payload = %String::from_utf8_lossy(bytes), "request received");

        let request = match codec::parse(bytes).and_then(codec::request_from_json) {
            Ok(request) => request,
            Err(err) => {
                let fault = err.into_fault();
                debug!(code = fault.code, "rejected request");
                return codec::encode_response(&Response::fault(fault, Id::Null)).into_bytes();
            }
        };

        match request.id {
            Some(id) => {
                let response = self.dispatcher.invoke(&request.method, request.params, id);
                let reply = codec::encode_response(&response);
                trace!(payload = %reply, "response sent");
                reply.into_bytes()
            }
            None => {
                let response = self
                    .dispatcher
                    .invoke(&request.method, request.params, Id::Null);
                if let Some(fault) = response.error() {
                    debug!(method = %request.method, %fault, "notification failed");
                }
                Vec::new()
            }
        }
    }
}
