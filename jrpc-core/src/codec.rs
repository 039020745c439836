//! Codec for JSON-RPC message serialization and deserialization
//!
//! The text format is handled by `serde_json`: it parses bytes into a generic
//! [`serde_json::Value`] tree and serializes such a tree back to text. This
//! module bridges that tree and the engine's own types:
//!
//! - **Validation**: envelopes are checked field by field against JSON-RPC 2.0
//! - **Value mapping**: wire numbers, strings and containers become [`Value`]s
//! - **Error mapping**: every failure is a [`Fault`] with the matching protocol code
//!
//! # Value Mapping
//!
//! | wire                      | decoded as                                   |
//! |---------------------------|----------------------------------------------|
//! | integer fitting 32 bits   | `Integer32`                                  |
//! | other integer within i64  | `Integer64`                                  |
//! | any other number          | `Number`                                     |
//! | string                    | `String`                                     |
//! | array / object            | `Array` / `Struct`                           |
//!
//! On encode, `Binary` is written as a base64 string and `DateTime` as an
//! RFC 3339 string. A non-finite `Number` has no JSON form and is written as null.
//!
//! # Examples
//!
//! ```rust
//! use jrpc_core::{codec, params, Id, Request};
//!
//! let request = Request::new("add", params![3, 2], Id::from(0i64));
//! let text = codec::encode_request(&request);
//!
//! let decoded = codec::decode_request(&text).unwrap();
//! assert_eq!(decoded, request);
//! ```

use crate::error::{Error, Fault, Result};
use crate::types::{Id, Request, Response};
use crate::value::{Struct, Value};
use chrono::SecondsFormat;
use serde::Deserialize;
use serde_json::{Map, Number, Value as Json};

pub const JSONRPC_VERSION: &str = "2.0";

pub const JSONRPC: &str = "jsonrpc";
pub const METHOD: &str = "method";
pub const PARAMS: &str = "params";
pub const ID: &str = "id";
pub const RESULT: &str = "result";
pub const ERROR: &str = "error";
pub const CODE: &str = "code";
pub const MESSAGE: &str = "message";
pub const DATA: &str = "data";

/// Parse raw bytes into a JSON tree
///
/// # Errors
///
/// Returns a `ParseError` fault whose data is the parser's description.
pub fn parse(bytes: &[u8]) -> Result<Json> {
    serde_json::from_slice(bytes)
        .map_err(|e| Error::Fault(Fault::parse_error().with_data(e.to_string())))
}

/// Map a wire number to the narrowest matching kind
pub fn number_to_value(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        match i32::try_from(i) {
            Ok(small) => Value::Integer32(small),
            Err(_) => Value::Integer64(i),
        }
    } else {
        // u64 beyond i64::MAX or a float
        Value::Number(n.as_f64().unwrap_or(f64::NAN))
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Nil,
            Json::Bool(b) => Value::Boolean(b),
            Json::Number(n) => number_to_value(&n),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(members) => Value::Struct(
                members
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect::<Struct>(),
            ),
        }
    }
}

impl From<&Value> for Json {
    fn from(value: &Value) -> Self {
        match value {
            Value::Nil => Json::Null,
            Value::Boolean(b) => Json::Bool(*b),
            Value::Number(n) => Number::from_f64(*n).map(Json::Number).unwrap_or(Json::Null),
            Value::Integer32(n) => Json::from(*n),
            Value::Integer64(n) => Json::from(*n),
            Value::String(s) => Json::String(s.clone()),
            Value::Binary(b) => Json::String(b.to_base64()),
            Value::DateTime(d) => Json::String(d.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Array(items) => Json::Array(items.iter().map(Json::from).collect()),
            Value::Struct(members) => Json::Object(
                members
                    .iter()
                    .map(|(key, value)| (key.clone(), Json::from(value)))
                    .collect::<Map<String, Json>>(),
            ),
        }
    }
}

impl From<&Id> for Json {
    fn from(id: &Id) -> Self {
        match id {
            Id::String(s) => Json::String(s.clone()),
            Id::Number(n) => Json::Number(n.clone()),
            Id::Null => Json::Null,
        }
    }
}

fn invalid_request(detail: &str) -> Error {
    tracing::debug!(detail, "invalid envelope");
    Error::Fault(Fault::invalid_request())
}

fn envelope(json: &Json) -> Result<&Map<String, Json>> {
    let object = json
        .as_object()
        .ok_or_else(|| invalid_request("message is not an object"))?;

    match object.get(JSONRPC) {
        Some(Json::String(version)) if version == JSONRPC_VERSION => Ok(object),
        _ => Err(invalid_request("jsonrpc must be \"2.0\"")),
    }
}

/// Validate a request tree and extract method, params and id
///
/// # Errors
///
/// Returns an `InvalidRequest` fault when:
/// - the root is not an object (including batch arrays)
/// - `jsonrpc` is missing or not exactly `"2.0"`
/// - `method` is missing or not a string
/// - `params` is present but not an array
/// - `id` is present but neither a string nor a number
pub fn request_from_json(json: Json) -> Result<Request> {
    let object = envelope(&json)?;

    let method = match object.get(METHOD) {
        Some(Json::String(method)) => method.clone(),
        _ => return Err(invalid_request("method must be a string")),
    };

    let params = match object.get(PARAMS) {
        None => Vec::new(),
        Some(Json::Array(items)) => items.iter().cloned().map(Value::from).collect(),
        Some(_) => return Err(invalid_request("params must be an array")),
    };

    let id = match object.get(ID) {
        None => None,
        Some(Json::String(s)) => Some(Id::String(s.clone())),
        Some(Json::Number(n)) => Some(Id::Number(n.clone())),
        Some(_) => return Err(invalid_request("id must be a string or a number")),
    };

    Ok(Request { method, params, id })
}

fn fault_from_json(json: &Json) -> Result<Fault> {
    if !json.is_object() {
        return Err(invalid_request("error must be an object"));
    }
    Fault::deserialize(json).map_err(|e| invalid_request(&e.to_string()))
}

/// Validate a response tree
///
/// A response needs an `id` (string, number or null) and exactly one of
/// `result` or `error`. Presence is what counts: `"result": null` is a valid
/// success carrying `Nil`.
pub fn response_from_json(json: Json) -> Result<Response> {
    let object = envelope(&json)?;

    let id = match object.get(ID) {
        Some(Json::String(s)) => Id::String(s.clone()),
        Some(Json::Number(n)) => Id::Number(n.clone()),
        Some(Json::Null) => Id::Null,
        Some(_) => return Err(invalid_request("id must be a string, a number or null")),
        None => return Err(invalid_request("response has no id")),
    };

    match (object.get(RESULT), object.get(ERROR)) {
        (Some(result), None) => Ok(Response::success(Value::from(result.clone()), id)),
        (None, Some(error)) => Ok(Response::fault(fault_from_json(error)?, id)),
        (Some(_), Some(_)) => Err(invalid_request("response has both result and error")),
        (None, None) => Err(invalid_request("response has neither result nor error")),
    }
}

/// Build the JSON tree of a request
pub fn request_to_json(request: &Request) -> Json {
    let mut object = Map::new();
    object.insert(JSONRPC.into(), Json::from(JSONRPC_VERSION));
    object.insert(METHOD.into(), Json::from(request.method.as_str()));
    if let Some(id) = &request.id {
        object.insert(ID.into(), Json::from(id));
    }
    object.insert(
        PARAMS.into(),
        Json::Array(request.params.iter().map(Json::from).collect()),
    );
    Json::Object(object)
}

/// Build the JSON tree of a response
pub fn response_to_json(response: &Response) -> Json {
    let mut object = Map::new();
    object.insert(JSONRPC.into(), Json::from(JSONRPC_VERSION));
    object.insert(ID.into(), Json::from(response.id()));
    match response.outcome() {
        Ok(result) => {
            object.insert(RESULT.into(), Json::from(result));
        }
        Err(fault) => {
            let mut error = Map::new();
            error.insert(CODE.into(), Json::from(fault.code));
            error.insert(MESSAGE.into(), Json::from(fault.message.as_str()));
            if let Some(data) = &fault.data {
                error.insert(DATA.into(), Json::from(data.as_str()));
            }
            object.insert(ERROR.into(), Json::Object(error));
        }
    }
    Json::Object(object)
}

/// Encode a request or notification to JSON text
pub fn encode_request(request: &Request) -> String {
    request_to_json(request).to_string()
}

/// Encode a response to JSON text
pub fn encode_response(response: &Response) -> String {
    response_to_json(response).to_string()
}

/// Parse and validate a request
pub fn decode_request(text: &str) -> Result<Request> {
    request_from_json(parse(text.as_bytes())?)
}

/// Parse and validate a response
pub fn decode_response(text: &str) -> Result<Response> {
    response_from_json(parse(text.as_bytes())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use crate::value::{Binary, ValueKind};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fault_code(result: Result<Request>) -> i32 {
        result.unwrap_err().into_fault().code
    }

    #[test]
    fn test_decode_request() {
        let request =
            decode_request(r#"{"jsonrpc":"2.0","method":"add","id":0,"params":[3,2]}"#).unwrap();

        assert_eq!(request.method, "add");
        assert_eq!(request.params, params![3, 2]);
        assert_eq!(request.id, Some(Id::from(0i64)));
    }

    #[test]
    fn test_decode_notification() {
        let request = decode_request(r#"{"jsonrpc":"2.0","method":"ping"}"#).unwrap();
        assert!(request.is_notification());
        assert!(request.params.is_empty());
    }

    #[test]
    fn test_parse_error() {
        let err = decode_request("{not json").unwrap_err().into_fault();
        assert_eq!(err.code, Fault::PARSE_ERROR);
        assert_eq!(err.message, "Parse error");
        assert!(err.data.is_some());
    }

    #[test]
    fn test_invalid_envelopes() {
        let invalid = [
            "[3,2]",
            "42",
            r#"{"method":"add","id":1}"#,
            r#"{"jsonrpc":"1.0","method":"add","id":1}"#,
            r#"{"jsonrpc":2.0,"method":"add","id":1}"#,
            r#"{"jsonrpc":"2.0","id":1}"#,
            r#"{"jsonrpc":"2.0","method":7,"id":1}"#,
            r#"{"jsonrpc":"2.0","method":"add","params":{"a":1},"id":1}"#,
            r#"{"jsonrpc":"2.0","method":"add","params":null,"id":1}"#,
            r#"{"jsonrpc":"2.0","method":"add","id":[1]}"#,
            r#"{"jsonrpc":"2.0","method":"add","id":{"n":1}}"#,
            r#"{"jsonrpc":"2.0","method":"add","id":null}"#,
        ];

        for text in invalid {
            assert_eq!(
                fault_code(decode_request(text)),
                Fault::INVALID_REQUEST,
                "accepted {}",
                text
            );
        }
    }

    #[test]
    fn test_wire_integer_widths() {
        let request = decode_request(
            r#"{"jsonrpc":"2.0","method":"m","params":[2147483647,2147483648,-1,1.5,18446744073709551615]}"#,
        )
        .unwrap();

        let kinds: Vec<ValueKind> = request.params.iter().map(Value::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ValueKind::Integer32,
                ValueKind::Integer64,
                ValueKind::Integer32,
                ValueKind::Number,
                ValueKind::Number,
            ]
        );
    }

    #[test]
    fn test_request_round_trip() {
        let mut members = Struct::new();
        members.insert("name".into(), Value::from("jrpc"));
        members.insert("size".into(), Value::from(1i64 << 40));

        let request = Request::new(
            "store",
            vec![
                Value::Nil,
                Value::from(true),
                Value::from(0.25),
                Value::from(vec![Value::from(1), Value::from("two")]),
                Value::from(members),
            ],
            Id::from("call-1"),
        );

        let decoded = decode_request(&encode_request(&request)).unwrap();
        assert_eq!(decoded, request);

        let notification = Request::notification("tick", params![]);
        let decoded = decode_request(&encode_request(&notification)).unwrap();
        assert!(decoded.is_notification());
    }

    #[test]
    fn test_rich_kinds_travel_as_strings() {
        let at = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        let request = Request::new(
            "m",
            vec![Value::from(Binary::new(b"hi".to_vec())), Value::from(at)],
            Id::from(1i64),
        );

        let json = request_to_json(&request);
        assert_eq!(json["params"], json!(["aGk=", "2020-01-02T03:04:05Z"]));
    }

    #[test]
    fn test_encode_response() {
        let success = response_to_json(&Response::success(Value::from(5), Id::from(0i64)));
        assert_eq!(success, json!({"jsonrpc": "2.0", "id": 0, "result": 5}));

        let failure = response_to_json(&Response::fault(
            Fault::method_not_found("missing"),
            Id::from(3i64),
        ));
        assert_eq!(
            failure,
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "error": {"code": -32601, "message": "Method not found: missing"}
            })
        );

        let with_data = response_to_json(&Response::fault(
            Fault::server_error(-32001, "busy").with_data("retry later"),
            Id::Null,
        ));
        assert_eq!(with_data["error"]["data"], json!("retry later"));
        assert_eq!(with_data["id"], Json::Null);
    }

    #[test]
    fn test_non_finite_number_encodes_as_null() {
        let response = Response::success(Value::from(f64::NAN), Id::from(1i64));
        assert_eq!(response_to_json(&response)["result"], Json::Null);
    }

    #[test]
    fn test_decode_response() {
        let ok = decode_response(r#"{"jsonrpc":"2.0","id":0,"result":5}"#).unwrap();
        assert_eq!(ok.result(), Some(&Value::Integer32(5)));

        let nil = decode_response(r#"{"jsonrpc":"2.0","id":0,"result":null}"#).unwrap();
        assert_eq!(nil.result(), Some(&Value::Nil));

        let failed = decode_response(
            r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32600,"message":"Invalid request","data":"x"}}"#,
        )
        .unwrap();
        assert!(failed.id().is_null());
        let fault = failed.error().unwrap();
        assert_eq!(fault.code, Fault::INVALID_REQUEST);
        assert_eq!(fault.data.as_deref(), Some("x"));
    }

    #[test]
    fn test_invalid_responses() {
        let invalid = [
            r#"{"jsonrpc":"2.0","result":5}"#,
            r#"{"jsonrpc":"2.0","id":1}"#,
            r#"{"jsonrpc":"2.0","id":1,"result":5,"error":{"code":1,"message":"m"}}"#,
            r#"{"jsonrpc":"2.0","id":1,"error":{"message":"m"}}"#,
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":1.5,"message":"m"}}"#,
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":1}}"#,
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":1,"message":"m","data":3}}"#,
            r#"{"jsonrpc":"2.0","id":1,"error":"boom"}"#,
            r#"{"jsonrpc":"2.0","id":[1],"result":5}"#,
            r#"{"id":1,"result":5}"#,
        ];

        for text in invalid {
            let fault = decode_response(text).unwrap_err().into_fault();
            assert_eq!(fault.code, Fault::INVALID_REQUEST, "accepted {}", text);
        }
    }
}
