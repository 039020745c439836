//! Value model for JSON-RPC parameters and results
//!
//! [`Value`] is a tagged union that can hold anything a remote call transports.
//! Unlike a plain JSON tree it keeps the distinctions the wire format loses:
//! 32-bit and 64-bit integers are separate kinds from floating point numbers,
//! and binary blobs and timestamps have their own tags.
//!
//! # Access Rules
//!
//! - Every accessor checks the active kind and fails with an `Invalid parameters`
//!   fault on mismatch. There is no coercion between unrelated kinds.
//! - `as_i32` also accepts an `Integer64` whose value fits in 32 bits.
//! - `as_f64` accepts all three numeric kinds.
//!
//! # Ownership
//!
//! Copies are explicit: `Clone` deep-copies composite values. [`Value::take`]
//! moves the value out and leaves `Nil` behind.
//!
//! # Examples
//!
//! ```rust
//! use jrpc_core::{Value, ValueKind};
//!
//! let small = Value::from(2147483647i64);
//! assert_eq!(small.kind(), ValueKind::Integer64);
//! assert_eq!(small.as_i32().unwrap(), 2147483647);
//!
//! let large = Value::from(2147483648i64);
//! assert!(large.as_i32().is_err());
//! assert_eq!(large.as_i64().unwrap(), 2147483648);
//! ```

use crate::error::{Error, Fault, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Ordered sequence of values
pub type Array = Vec<Value>;

/// Mapping from unique string keys to values
pub type Struct = BTreeMap<String, Value>;

/// Discriminant of a [`Value`]
///
/// Also used to describe method signatures for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Nil,
    Boolean,
    Number,
    Integer32,
    Integer64,
    String,
    Binary,
    DateTime,
    Array,
    Struct,
}

impl ValueKind {
    /// Name of the kind as shown in signatures and fault data
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Nil => "nil",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "double",
            ValueKind::Integer32 => "i4",
            ValueKind::Integer64 => "i8",
            ValueKind::String => "string",
            ValueKind::Binary => "base64",
            ValueKind::DateTime => "dateTime.iso8601",
            ValueKind::Array => "array",
            ValueKind::Struct => "struct",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque byte sequence
///
/// Travels over the wire as a base64 string. A receiver that expects a
/// `Binary` parameter decodes such a string back into bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Binary(pub Vec<u8>);

impl Binary {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Binary(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// Encode as standard base64 with padding
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }

    /// Decode from standard base64
    pub fn from_base64(text: &str) -> Result<Self> {
        BASE64
            .decode(text)
            .map(Binary)
            .map_err(|e| invalid_parameters(format!("invalid base64: {}", e)))
    }
}

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Self {
        Binary(bytes)
    }
}

impl From<&[u8]> for Binary {
    fn from(bytes: &[u8]) -> Self {
        Binary(bytes.to_vec())
    }
}

/// A JSON-RPC transportable value
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Nil,
    Boolean(bool),
    Number(f64),
    Integer32(i32),
    Integer64(i64),
    String(String),
    Binary(Binary),
    DateTime(DateTime<Utc>),
    Array(Array),
    Struct(Struct),
}

impl Value {
    /// The active kind
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::Integer32(_) => ValueKind::Integer32,
            Value::Integer64(_) => ValueKind::Integer64,
            Value::String(_) => ValueKind::String,
            Value::Binary(_) => ValueKind::Binary,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::Array(_) => ValueKind::Array,
            Value::Struct(_) => ValueKind::Struct,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Move the value out, leaving `Nil` in its place
    pub fn take(&mut self) -> Value {
        std::mem::take(self)
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(mismatch(ValueKind::Boolean, other)),
        }
    }

    /// Read any numeric kind as a double
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Integer32(n) => Ok(f64::from(*n)),
            Value::Integer64(n) => Ok(*n as f64),
            other => Err(mismatch(ValueKind::Number, other)),
        }
    }

    /// Read a 32-bit integer, narrowing an `Integer64` only when it fits
    pub fn as_i32(&self) -> Result<i32> {
        match self {
            Value::Integer32(n) => Ok(*n),
            Value::Integer64(n) => i32::try_from(*n).map_err(|_| {
                invalid_parameters(format!("{} does not fit in {}", n, ValueKind::Integer32))
            }),
            other => Err(mismatch(ValueKind::Integer32, other)),
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Value::Integer64(n) => Ok(*n),
            Value::Integer32(n) => Ok(i64::from(*n)),
            other => Err(mismatch(ValueKind::Integer64, other)),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(mismatch(ValueKind::String, other)),
        }
    }

    pub fn as_binary(&self) -> Result<&Binary> {
        match self {
            Value::Binary(b) => Ok(b),
            other => Err(mismatch(ValueKind::Binary, other)),
        }
    }

    pub fn as_datetime(&self) -> Result<&DateTime<Utc>> {
        match self {
            Value::DateTime(d) => Ok(d),
            other => Err(mismatch(ValueKind::DateTime, other)),
        }
    }

    pub fn as_array(&self) -> Result<&[Value]> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(mismatch(ValueKind::Array, other)),
        }
    }

    pub fn as_struct(&self) -> Result<&Struct> {
        match self {
            Value::Struct(members) => Ok(members),
            other => Err(mismatch(ValueKind::Struct, other)),
        }
    }

    /// Number of elements of an array or members of a struct
    pub fn len(&self) -> Result<usize> {
        match self {
            Value::Array(items) => Ok(items.len()),
            Value::Struct(members) => Ok(members.len()),
            other => Err(mismatch(ValueKind::Array, other)),
        }
    }

    /// Element of an array by position
    pub fn at(&self, index: usize) -> Result<&Value> {
        self.as_array()?.get(index).ok_or_else(|| {
            Error::OutOfRange(format!("index {} past the end of the array", index))
        })
    }

    /// Member of a struct by key
    pub fn member(&self, key: &str) -> Result<&Value> {
        self.as_struct()?
            .get(key)
            .ok_or_else(|| Error::OutOfRange(format!("no member named '{}'", key)))
    }
}

fn invalid_parameters(detail: impl Into<String>) -> Error {
    Error::Fault(Fault::invalid_parameters().with_data(detail))
}

fn mismatch(expected: ValueKind, found: &Value) -> Error {
    invalid_parameters(format!("expected {}, found {}", expected, found.kind()))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Integer32(n) => write!(f, "{}", n),
            Value::Integer64(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Binary(b) => f.write_str(&b.to_base64()),
            Value::DateTime(d) => f.write_str(&d.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Struct(members) => {
                f.write_str("{")?;
                for (i, (key, value)) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer32(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer64(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Binary> for Value {
    fn from(b: Binary) -> Self {
        Value::Binary(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::DateTime(d)
    }
}

impl From<Array> for Value {
    fn from(items: Array) -> Self {
        Value::Array(items)
    }
}

impl From<Struct> for Value {
    fn from(members: Struct) -> Self {
        Value::Struct(members)
    }
}

/// Conversion from a [`Value`] into a native parameter type
///
/// Implementations accept only the kind that structurally matches the
/// native type. `KIND` names that kind for signatures; it is `None` for
/// types that accept more than one shape.
pub trait FromValue: Sized {
    const KIND: Option<ValueKind>;

    fn from_value(value: Value) -> Result<Self>;
}

/// Conversion from a native return type into a [`Value`]
pub trait IntoValue {
    const KIND: Option<ValueKind>;

    fn into_value(self) -> Value;
}

impl FromValue for Value {
    const KIND: Option<ValueKind> = None;

    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl IntoValue for Value {
    const KIND: Option<ValueKind> = None;

    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for bool {
    const KIND: Option<ValueKind> = Some(ValueKind::Boolean);

    fn from_value(value: Value) -> Result<Self> {
        value.as_bool()
    }
}

impl FromValue for f64 {
    const KIND: Option<ValueKind> = Some(ValueKind::Number);

    fn from_value(value: Value) -> Result<Self> {
        value.as_f64()
    }
}

impl FromValue for i32 {
    const KIND: Option<ValueKind> = Some(ValueKind::Integer32);

    fn from_value(value: Value) -> Result<Self> {
        value.as_i32()
    }
}

impl FromValue for i64 {
    const KIND: Option<ValueKind> = Some(ValueKind::Integer64);

    fn from_value(value: Value) -> Result<Self> {
        value.as_i64()
    }
}

impl FromValue for String {
    const KIND: Option<ValueKind> = Some(ValueKind::String);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch(ValueKind::String, &other)),
        }
    }
}

impl FromValue for Binary {
    const KIND: Option<ValueKind> = Some(ValueKind::Binary);

    /// Accepts a `Binary` value or the base64 string it travels as
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Binary(b) => Ok(b),
            Value::String(s) => Binary::from_base64(&s),
            other => Err(mismatch(ValueKind::Binary, &other)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    const KIND: Option<ValueKind> = Some(ValueKind::DateTime);

    /// Accepts a `DateTime` value or the RFC 3339 string it travels as
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(d) => Ok(d),
            Value::String(s) => DateTime::parse_from_rfc3339(&s)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| invalid_parameters(format!("invalid RFC 3339 timestamp: {}", e))),
            other => Err(mismatch(ValueKind::DateTime, &other)),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const KIND: Option<ValueKind> = Some(ValueKind::Array);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch(ValueKind::Array, &other)),
        }
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    const KIND: Option<ValueKind> = Some(ValueKind::Struct);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Struct(members) => members
                .into_iter()
                .map(|(key, value)| Ok((key, T::from_value(value)?)))
                .collect(),
            other => Err(mismatch(ValueKind::Struct, &other)),
        }
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    const KIND: Option<ValueKind> = Some(ValueKind::Struct);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Struct(members) => members
                .into_iter()
                .map(|(key, value)| Ok((key, T::from_value(value)?)))
                .collect(),
            other => Err(mismatch(ValueKind::Struct, &other)),
        }
    }
}

/// `Nil` maps to `None`, anything else must convert to `T`
impl<T: FromValue> FromValue for Option<T> {
    const KIND: Option<ValueKind> = None;

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Nil => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

macro_rules! impl_into_value {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl IntoValue for $ty {
                const KIND: Option<ValueKind> = Some(ValueKind::$kind);

                fn into_value(self) -> Value {
                    Value::from(self)
                }
            }
        )*
    };
}

impl_into_value! {
    bool => Boolean,
    f64 => Number,
    i32 => Integer32,
    i64 => Integer64,
    String => String,
    Binary => Binary,
    DateTime<Utc> => DateTime,
}

impl IntoValue for &str {
    const KIND: Option<ValueKind> = Some(ValueKind::String);

    fn into_value(self) -> Value {
        Value::from(self)
    }
}

/// A procedure without a result produces `Nil`
impl IntoValue for () {
    const KIND: Option<ValueKind> = Some(ValueKind::Nil);

    fn into_value(self) -> Value {
        Value::Nil
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    const KIND: Option<ValueKind> = None;

    fn into_value(self) -> Value {
        self.map(IntoValue::into_value).unwrap_or_default()
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    const KIND: Option<ValueKind> = Some(ValueKind::Array);

    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue> IntoValue for BTreeMap<String, T> {
    const KIND: Option<ValueKind> = Some(ValueKind::Struct);

    fn into_value(self) -> Value {
        Value::Struct(
            self.into_iter()
                .map(|(key, value)| (key, value.into_value()))
                .collect(),
        )
    }
}

impl<T: IntoValue> IntoValue for HashMap<String, T> {
    const KIND: Option<ValueKind> = Some(ValueKind::Struct);

    fn into_value(self) -> Value {
        Value::Struct(
            self.into_iter()
                .map(|(key, value)| (key, value.into_value()))
                .collect(),
        )
    }
}

/// What a procedure may return: a plain value, or a `Result` whose error
/// converts into [`Error`]
pub trait IntoOutcome {
    const KIND: Option<ValueKind>;

    fn into_outcome(self) -> Result<Value>;
}

impl<T: IntoValue> IntoOutcome for T {
    const KIND: Option<ValueKind> = <T as IntoValue>::KIND;

    fn into_outcome(self) -> Result<Value> {
        Ok(self.into_value())
    }
}

impl<T: IntoValue, E: Into<Error>> IntoOutcome for std::result::Result<T, E> {
    const KIND: Option<ValueKind> = <T as IntoValue>::KIND;

    fn into_outcome(self) -> Result<Value> {
        self.map(IntoValue::into_value).map_err(Into::into)
    }
}

/// Build a positional parameter list from heterogeneous native values
///
/// ```rust
/// use jrpc_core::{params, Value};
///
/// let params = params![3, "three", 3.0];
/// assert_eq!(params, vec![Value::Integer32(3), Value::from("three"), Value::Number(3.0)]);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($param:expr),+ $(,)?) => {
        vec![$($crate::IntoValue::into_value($param)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_integer_fidelity() {
        let fits = Value::from(2147483647i64);
        assert_eq!(fits.as_i32().unwrap(), i32::MAX);
        assert_eq!(fits.kind(), ValueKind::Integer64);

        let too_large = Value::from(2147483648i64);
        assert!(too_large.as_i32().is_err());
        assert_eq!(too_large.as_i64().unwrap(), 2147483648);

        let negative = Value::from(-2147483649i64);
        assert!(negative.as_i32().is_err());
    }

    #[test]
    fn test_numeric_kinds_read_as_double() {
        assert_eq!(Value::from(1.5).as_f64().unwrap(), 1.5);
        assert_eq!(Value::from(3).as_f64().unwrap(), 3.0);
        assert_eq!(Value::from(4i64).as_f64().unwrap(), 4.0);

        // The tag of the originating kind is preserved
        assert_eq!(Value::from(3).kind(), ValueKind::Integer32);
    }

    #[test]
    fn test_no_coercion_between_kinds() {
        let err = Value::from("12").as_f64().unwrap_err();
        let fault = err.into_fault();
        assert_eq!(fault.code, Fault::INVALID_PARAMETERS);
        assert_eq!(fault.data.as_deref(), Some("expected double, found string"));

        assert!(Value::from(1.0).as_i32().is_err());
        assert!(Value::from(1).as_bool().is_err());
        assert!(Value::Nil.as_str().is_err());
        assert!(Value::from(Binary::new(b"ab".to_vec())).as_str().is_err());
    }

    #[test]
    fn test_take_leaves_nil() {
        let mut value = Value::from(vec![Value::from(1), Value::from("a")]);
        let moved = value.take();

        assert!(value.is_nil());
        assert_eq!(moved.len().unwrap(), 2);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut members = Struct::new();
        members.insert("list".into(), Value::from(vec![Value::from(1)]));
        let original = Value::from(members);
        let mut copy = original.clone();

        if let Value::Struct(members) = &mut copy {
            members.insert("extra".into(), Value::Nil);
        }

        assert_eq!(original.len().unwrap(), 1);
        assert_eq!(copy.len().unwrap(), 2);
    }

    #[test]
    fn test_display() {
        let mut members = Struct::new();
        members.insert("b".into(), Value::from(true));
        members.insert("a".into(), Value::Nil);

        let value = Value::from(vec![
            Value::from(1),
            Value::from(2.5),
            Value::from("x"),
            Value::from(Binary::new(b"hi".to_vec())),
            Value::from(members),
        ]);

        assert_eq!(value.to_string(), "[1, 2.5, x, aGk=, {a: nil, b: true}]");
    }

    #[test]
    fn test_display_datetime() {
        let at = Utc.with_ymd_and_hms(2015, 6, 1, 12, 30, 0).unwrap();
        assert_eq!(Value::from(at).to_string(), "2015-06-01T12:30:00Z");
    }

    #[test]
    fn test_element_access() {
        let value = Value::from(vec![Value::from(10), Value::from(20)]);
        assert_eq!(value.at(1).unwrap().as_i32().unwrap(), 20);
        assert!(matches!(value.at(2), Err(Error::OutOfRange(_))));
        assert!(value.member("x").is_err());
    }

    #[test]
    fn test_binary_from_wire_string() {
        let binary = Binary::from_value(Value::from("aGk=")).unwrap();
        assert_eq!(binary.as_bytes(), b"hi");
        assert!(Binary::from_value(Value::from("not base64!")).is_err());
        assert!(Binary::from_value(Value::from(1)).is_err());
    }

    #[test]
    fn test_datetime_from_wire_string() {
        let parsed = DateTime::<Utc>::from_value(Value::from("2015-06-01T12:30:00Z")).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2015, 6, 1, 12, 30, 0).unwrap());
        assert!(DateTime::<Utc>::from_value(Value::from("yesterday")).is_err());
    }

    #[test]
    fn test_collection_conversions() {
        let value = vec![1, 2, 3].into_value();
        assert_eq!(value.kind(), ValueKind::Array);
        assert_eq!(Vec::<i64>::from_value(value).unwrap(), vec![1, 2, 3]);

        let mut map = HashMap::new();
        map.insert("k".to_string(), "v".to_string());
        let value = map.clone().into_value();
        assert_eq!(HashMap::<String, String>::from_value(value).unwrap(), map);

        assert!(Vec::<i32>::from_value(vec!["a"].into_value()).is_err());
    }

    #[test]
    fn test_option_and_unit() {
        assert_eq!(().into_value(), Value::Nil);
        assert_eq!(None::<i32>.into_value(), Value::Nil);
        assert_eq!(Option::<i32>::from_value(Value::Nil).unwrap(), None);
        assert_eq!(Option::<i32>::from_value(Value::from(4)).unwrap(), Some(4));
    }

    #[test]
    fn test_params_macro() {
        let empty = params![];
        assert!(empty.is_empty());

        let params = params![1i64, true, "s".to_string()];
        assert_eq!(params[0].kind(), ValueKind::Integer64);
        assert_eq!(params[1].kind(), ValueKind::Boolean);
        assert_eq!(params[2].kind(), ValueKind::String);
    }
}
