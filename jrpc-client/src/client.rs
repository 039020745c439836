//! Client facade: building calls and reading replies
//!
//! The client never touches a transport. It produces request text for the
//! host to send and interprets the reply text the host receives.
//!
//! # Examples
//!
//! ```rust
//! use jrpc_client::Client;
//! use jrpc_core::params;
//!
//! let client = Client::new();
//!
//! let call = client.build_request("add", params![3, 2]);
//! let call: serde_json::Value = serde_json::from_str(&call).unwrap();
//! assert_eq!(call["id"], 0);
//!
//! let sum: i32 = client.parse_result(r#"{"jsonrpc":"2.0","id":0,"result":5}"#).unwrap();
//! assert_eq!(sum, 5);
//! ```

use crate::request::IdCounter;
use jrpc_core::{codec, Error, FromValue, Request, Response, Result, Value};
use tracing::{debug, trace};

/// JSON-RPC 2.0 client
///
/// Each client owns its id counter, so two clients hand out overlapping ids.
#[derive(Debug, Default)]
pub struct Client {
    ids: IdCounter,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose first call gets id `first`
    pub fn starting_at(first: u64) -> Self {
        Self {
            ids: IdCounter::starting_at(first),
        }
    }

    /// Build a call, consuming the next id
    #[tracing::instrument(level = "debug", skip(self, params))]
    pub fn build_request(&self, method: &str, params: Vec<Value>) -> String {
        let request = Request::new(method, params, self.ids.next_id());
        let text = codec::encode_request(&request);
        trace!(payload = %text, "request built");
        text
    }

    /// Build a notification; no id is consumed
    pub fn build_notification(&self, method: &str, params: Vec<Value>) -> String {
        codec::encode_request(&Request::notification(method, params))
    }

    /// The id the next call will carry
    pub fn next_id(&self) -> u64 {
        self.ids.peek()
    }

    /// Decode a reply, turning a fault into `Err(Error::Fault)`
    ///
    /// Use [`jrpc_core::codec::decode_response`] to inspect a fault reply
    /// without treating it as an error. Classify a returned fault with
    /// [`jrpc_core::Fault::kind`].
    pub fn parse_response(&self, text: &str) -> Result<Response> {
        let response = codec::decode_response(text)?;
        match response.error() {
            Some(fault) => {
                debug!(id = %response.id(), %fault, "call failed");
                Err(Error::Fault(fault.clone()))
            }
            None => Ok(response),
        }
    }

    /// Decode a reply and convert its result
    pub fn parse_result<T: FromValue>(&self, text: &str) -> Result<T> {
        let response = self.parse_response(text)?;
        T::from_value(response.into_result()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jrpc_core::{params, Fault, FaultKind, Id};
    use serde_json::json;

    fn json(text: &str) -> serde_json::Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_ids_start_at_zero() {
        let client = Client::new();
        assert_eq!(json(&client.build_request("a", params![]))["id"], json!(0));
        assert_eq!(json(&client.build_request("b", params![]))["id"], json!(1));
        assert_eq!(client.next_id(), 2);
    }

    #[test]
    fn test_request_payload() {
        let client = Client::starting_at(7);
        let call = json(&client.build_request("add", params![3, 2]));
        assert_eq!(
            call,
            json!({"jsonrpc": "2.0", "method": "add", "id": 7, "params": [3, 2]})
        );
    }

    #[test]
    fn test_notification_has_no_id() {
        let client = Client::new();
        let notification = json(&client.build_notification("log", params!["x"]));

        assert!(notification.get("id").is_none());
        assert_eq!(notification["params"], json!(["x"]));
        assert_eq!(client.next_id(), 0);
    }

    #[test]
    fn test_parse_response_success() {
        let client = Client::new();
        let response = client
            .parse_response(r#"{"jsonrpc":"2.0","id":"x","result":[1,2]}"#)
            .unwrap();
        assert_eq!(response.id(), &Id::from("x"));
        assert_eq!(response.result(), Some(&Value::from(params![1, 2])));
    }

    #[test]
    fn test_parse_response_fault() {
        let client = Client::new();
        let err = client
            .parse_response(
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found: x"}}"#,
            )
            .unwrap_err();

        let fault = err.as_fault().unwrap();
        assert_eq!(fault.kind(), FaultKind::MethodNotFound);
        assert_eq!(fault.message, "Method not found: x");

        let err = client
            .parse_response(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32010,"message":"busy"}}"#)
            .unwrap_err();
        assert_eq!(err.as_fault().unwrap().kind(), FaultKind::ServerError);

        let err = client
            .parse_response(r#"{"jsonrpc":"2.0","id":1,"error":{"code":7,"message":"mine"}}"#)
            .unwrap_err();
        assert_eq!(err.into_fault(), Fault::new(7, "mine"));
    }

    #[test]
    fn test_parse_malformed_reply() {
        let client = Client::new();
        let err = client.parse_response(r#"{"jsonrpc":"2.0","id":1}"#).unwrap_err();
        assert_eq!(err.into_fault().code, Fault::INVALID_REQUEST);

        let err = client.parse_response("nope").unwrap_err();
        assert_eq!(err.into_fault().code, Fault::PARSE_ERROR);
    }

    #[test]
    fn test_parse_result_conversion() {
        let client = Client::new();
        let wide: i64 = client
            .parse_result(r#"{"jsonrpc":"2.0","id":1,"result":3000000000}"#)
            .unwrap();
        assert_eq!(wide, 3_000_000_000);

        let narrow = client.parse_result::<i32>(r#"{"jsonrpc":"2.0","id":1,"result":3000000000}"#);
        assert!(narrow.is_err());

        let nothing: Option<String> = client
            .parse_result(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)
            .unwrap();
        assert_eq!(nothing, None);
    }
}
