//! JSON-RPC 2.0 message types
//!
//! These are the in-memory forms of the two envelopes the engine deals with.
//! Parameters and results are [`Value`]s; the translation from and to JSON text
//! lives in [`crate::codec`].
//!
//! # Message Types
//!
//! 1. **Request**: a call that carries an id and expects a response
//! 2. **Notification**: a request without an id; nothing is sent back
//! 3. **Response**: either a result or a fault, echoing the request id
//!
//! Parameters are always positional. Named parameters are not supported.

use crate::error::{Error, Fault};
use crate::value::Value;
use std::fmt;

/// JSON-RPC 2.0 request identifier
///
/// A request id is a string or a number. A response id may additionally be
/// null when the server could not determine the id of the request it answers.
///
/// Numbers keep their original JSON representation so they are echoed back
/// exactly as received.
///
/// # Examples
///
/// ```rust
/// use jrpc_core::Id;
///
/// let id1: Id = "req-123".into();
/// let id2: Id = 42i64.into();
///
/// assert_eq!(id1.to_string(), "\"req-123\"");
/// assert_eq!(id2.to_string(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Id {
    String(String),
    Number(serde_json::Number),
    Null,
}

impl Id {
    pub fn is_null(&self) -> bool {
        matches!(self, Id::Null)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<i32> for Id {
    fn from(n: i32) -> Self {
        Id::Number(n.into())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n.into())
    }
}

impl From<u64> for Id {
    fn from(n: u64) -> Self {
        Id::Number(n.into())
    }
}

/// Ids are handed to procedures and tests as ordinary values
impl From<Id> for Value {
    fn from(id: Id) -> Self {
        match id {
            Id::String(s) => Value::String(s),
            Id::Number(n) => crate::codec::number_to_value(&n),
            Id::Null => Value::Nil,
        }
    }
}

/// JSON-RPC 2.0 request or notification
///
/// A request without an id is a notification.
///
/// # Examples
///
/// ```rust
/// use jrpc_core::{params, Id, Request};
///
/// let request = Request::new("add", params![3, 2], Id::from(0i64));
/// assert!(!request.is_notification());
///
/// let notification = Request::notification("ping", params![]);
/// assert!(notification.is_notification());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: String,
    pub params: Vec<Value>,
    pub id: Option<Id>,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Vec<Value>, id: Id) -> Self {
        Self {
            method: method.into(),
            params,
            id: Some(id),
        }
    }

    pub fn notification(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
            id: None,
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 response
///
/// A response carries exactly one of a result or a fault. This is enforced
/// by construction: the outcome is a `Result` internally.
///
/// # Examples
///
/// ```rust
/// use jrpc_core::{Fault, Id, Response, Value};
///
/// let success = Response::success(Value::from(5), Id::from(0i64));
/// assert!(success.is_success());
///
/// let failure = Response::fault(Fault::method_not_found("missing"), Id::from(1i64));
/// assert!(failure.is_fault());
/// assert_eq!(failure.error().unwrap().code, -32601);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    outcome: Result<Value, Fault>,
    id: Id,
}

impl Response {
    pub fn success(result: Value, id: Id) -> Self {
        Self {
            outcome: Ok(result),
            id,
        }
    }

    pub fn fault(fault: Fault, id: Id) -> Self {
        Self {
            outcome: Err(fault),
            id,
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn is_fault(&self) -> bool {
        self.outcome.is_err()
    }

    /// The result value, if the call succeeded
    pub fn result(&self) -> Option<&Value> {
        self.outcome.as_ref().ok()
    }

    /// The fault, if the call failed
    pub fn error(&self) -> Option<&Fault> {
        self.outcome.as_ref().err()
    }

    pub fn outcome(&self) -> &Result<Value, Fault> {
        &self.outcome
    }

    /// Consume the response, turning a fault into an error
    pub fn into_result(self) -> crate::error::Result<Value> {
        self.outcome.map_err(Error::Fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(Id::from("abc").to_string(), "\"abc\"");
        assert_eq!(Id::from(7i64).to_string(), "7");
        assert_eq!(Id::Null.to_string(), "null");
    }

    #[test]
    fn test_id_into_value() {
        assert_eq!(Value::from(Id::from(3i64)), Value::Integer32(3));
        assert_eq!(Value::from(Id::from(1i64 << 40)), Value::Integer64(1 << 40));
        assert_eq!(Value::from(Id::from("x")), Value::from("x"));
        assert_eq!(Value::from(Id::Null), Value::Nil);
    }

    #[test]
    fn test_response_outcome() {
        let ok = Response::success(Value::from(5), Id::from(0i64));
        assert!(ok.is_success());
        assert_eq!(ok.result(), Some(&Value::Integer32(5)));
        assert!(ok.error().is_none());
        assert_eq!(ok.into_result().unwrap(), Value::Integer32(5));

        let failed = Response::fault(Fault::invalid_request(), Id::Null);
        assert!(failed.is_fault());
        assert!(failed.id().is_null());
        let err = failed.into_result().unwrap_err();
        assert_eq!(err.as_fault().map(|f| f.code), Some(Fault::INVALID_REQUEST));
    }
}
