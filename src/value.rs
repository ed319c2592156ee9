//! Value model compared by the diff engine
//!
//! [`DiffValue`] is a closed sum type over everything the engine knows how to
//! compare. JSON input converts into it losslessly (apart from number
//! precision), and two extended-JSON shapes are recognised so callers can
//! hand over dates and patterns:
//!
//! - `{"$date": "2024-01-01T00:00:00Z"}` or `{"$date": 1704067200000}`
//! - `{"$regex": "^a+$", "$options": "gi"}`

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Classification tag for a [`DiffValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Undefined,
    Boolean,
    Number,
    String,
    Date,
    Regexp,
    Array,
    Object,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Undefined => "undefined",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Date => "date",
            ValueType::Regexp => "regexp",
            ValueType::Array => "array",
            ValueType::Object => "object",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value on one side of a comparison
///
/// `Undefined` stands for "absent": a missing object key or an array index
/// past the end of the shorter sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateTime<Utc>),
    Regexp { source: String, flags: String },
    Array(Vec<DiffValue>),
    Object(Vec<(String, DiffValue)>),
}

/// Shared "absent" value handed to the comparators for missing keys and indices
pub(crate) static UNDEFINED: DiffValue = DiffValue::Undefined;

impl DiffValue {
    /// Build a pattern value from its source and flags
    pub fn regexp(source: impl Into<String>, flags: impl Into<String>) -> Self {
        DiffValue::Regexp {
            source: source.into(),
            flags: flags.into(),
        }
    }

    /// Classify this value. Total: every value has exactly one tag.
    pub fn value_type(&self) -> ValueType {
        match self {
            DiffValue::Null => ValueType::Null,
            DiffValue::Undefined => ValueType::Undefined,
            DiffValue::Array(_) => ValueType::Array,
            DiffValue::Date(_) => ValueType::Date,
            DiffValue::Regexp { .. } => ValueType::Regexp,
            DiffValue::Object(_) => ValueType::Object,
            DiffValue::String(_) => ValueType::String,
            DiffValue::Number(_) => ValueType::Number,
            DiffValue::Bool(_) => ValueType::Boolean,
        }
    }

    /// Null, undefined or the empty string
    pub fn is_empty(&self) -> bool {
        match self {
            DiffValue::Null | DiffValue::Undefined => true,
            DiffValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// String, number, boolean, null or undefined
    pub fn is_basic(&self) -> bool {
        matches!(
            self,
            DiffValue::String(_)
                | DiffValue::Number(_)
                | DiffValue::Bool(_)
                | DiffValue::Null
                | DiffValue::Undefined
        )
    }

    /// Object or array
    pub fn is_complex(&self) -> bool {
        matches!(self, DiffValue::Object(_) | DiffValue::Array(_))
    }

    pub fn is_same_type(&self, other: &DiffValue) -> bool {
        self.value_type() == other.value_type()
    }

    /// Look up an object entry by key
    pub fn get(&self, key: &str) -> Option<&DiffValue> {
        match self {
            DiffValue::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Render as a JSON value, the same shape the serializer writes
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A container being converted, with the members finished so far
enum Open<'v> {
    Array(std::slice::Iter<'v, Value>, Vec<DiffValue>),
    Object(serde_json::map::Iter<'v>, Vec<(String, DiffValue)>, String),
}

impl Open<'_> {
    fn close(self) -> DiffValue {
        match self {
            Open::Array(_, items) => DiffValue::Array(items),
            Open::Object(_, entries, _) => DiffValue::Object(entries),
        }
    }
}

/// Converts on an explicit stack, so input nesting never grows the call stack
impl From<&Value> for DiffValue {
    fn from(value: &Value) -> Self {
        let mut open: Vec<Open<'_>> = Vec::new();
        let mut next = value;

        loop {
            let mut done = match next {
                Value::Null => Some(DiffValue::Null),
                Value::Bool(b) => Some(DiffValue::Bool(*b)),
                Value::Number(n) => Some(DiffValue::Number(n.as_f64().unwrap_or(f64::NAN))),
                Value::String(s) => Some(DiffValue::String(s.clone())),
                Value::Array(items) => {
                    open.push(Open::Array(items.iter(), Vec::with_capacity(items.len())));
                    None
                }
                Value::Object(map) => extended_json(map).or_else(|| {
                    open.push(Open::Object(map.iter(), Vec::with_capacity(map.len()), String::new()));
                    None
                }),
            };

            // Hand finished values up until some container has a member left
            loop {
                if let Some(value) = done.take() {
                    match open.last_mut() {
                        None => return value,
                        Some(Open::Array(_, items)) => items.push(value),
                        Some(Open::Object(_, entries, key)) => {
                            entries.push((std::mem::take(key), value))
                        }
                    }
                }

                let member = match open.last_mut() {
                    Some(Open::Array(iter, _)) => iter.next(),
                    Some(Open::Object(iter, _, key)) => iter.next().map(|(k, v)| {
                        *key = k.clone();
                        v
                    }),
                    None => return DiffValue::Undefined,
                };
                match member {
                    Some(member) => {
                        next = member;
                        break;
                    }
                    None => done = open.pop().map(Open::close),
                }
            }
        }
    }
}

impl From<Value> for DiffValue {
    fn from(value: Value) -> Self {
        DiffValue::from(&value)
    }
}

/// Recognise `$date` / `$regex` wrapper objects
fn extended_json(map: &Map<String, Value>) -> Option<DiffValue> {
    if let Some(raw) = map.get("$date") {
        if map.len() != 1 {
            return None;
        }
        return match raw {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|d| DiffValue::Date(d.with_timezone(&Utc))),
            Value::Number(n) => n
                .as_i64()
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                .map(DiffValue::Date),
            _ => None,
        };
    }

    if let Some(Value::String(source)) = map.get("$regex") {
        let (flags, expected_len) = match map.get("$options") {
            None => (String::new(), 1),
            Some(Value::String(flags)) => (flags.clone(), 2),
            Some(_) => return None,
        };
        if map.len() == expected_len {
            return Some(DiffValue::regexp(source.clone(), flags));
        }
    }

    None
}

/// Integral values within the exactly-representable range serialize as integers
fn serialize_number<S>(n: f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

    if !n.is_finite() {
        serializer.serialize_unit()
    } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(n as i64)
    } else {
        serializer.serialize_f64(n)
    }
}

impl Serialize for DiffValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            DiffValue::Undefined | DiffValue::Null => serializer.serialize_unit(),
            DiffValue::Bool(b) => serializer.serialize_bool(*b),
            DiffValue::Number(n) => serialize_number(*n, serializer),
            DiffValue::String(s) => serializer.serialize_str(s),
            DiffValue::Date(d) => {
                serializer.serialize_str(&d.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            DiffValue::Regexp { source, flags } => {
                serializer.collect_str(&format_args!("/{}/{}", source, flags))
            }
            DiffValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DiffValue::Object(entries) => {
                // Absent values are dropped, the way JSON.stringify drops undefined
                let mut map = serializer.serialize_map(None)?;
                for (key, value) in entries {
                    if *value != DiffValue::Undefined {
                        map.serialize_entry(key, value)?;
                    }
                }
                map.end()
            }
        }
    }
}
