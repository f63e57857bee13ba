use crate::descriptor::{Primitive, TypeDescriptor};
use serde_json::Value;
use std::fmt;

/// A single string-to-typed-value conversion failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// The raw value does not parse as the expected kind.
    Invalid { expected: &'static str, value: String },
    /// A struct-shaped parameter must be a JSON object literal.
    NotAnObject { value: String },
    /// The field kind has no string conversion at all.
    Unsupported { kind: &'static str },
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Invalid { expected, value } => {
                write!(f, "invalid {expected} value {value:?}")
            }
            ConvertError::NotAnObject { value } => {
                write!(f, "expected a JSON object, got {value:?}")
            }
            ConvertError::Unsupported { kind } => {
                write!(f, "cannot convert parameter to {kind}")
            }
        }
    }
}

impl std::error::Error for ConvertError {}

/// Convert one raw request string into the JSON value shape of a field.
///
/// Used identically for path, query and header binding. Pointer and named
/// indirection are transparent; collections accept both the bracketed JSON
/// form (`[1,3,4]`) and the bare comma form (`1,3,4`); strings shed one
/// layer of surrounding quotes; integers parse at the declared width.
/// Anything without a defined conversion (binary, maps, opaque values) is a
/// hard failure.
pub fn convert_value(ty: &TypeDescriptor, raw: &str) -> Result<Value, ConvertError> {
    match ty {
        TypeDescriptor::Pointer(inner) | TypeDescriptor::Named { inner, .. } => {
            convert_value(inner, raw)
        }

        TypeDescriptor::Deferred { resolve, .. } => convert_value(&resolve(), raw),

        TypeDescriptor::List(item) => {
            if matches!(**item, TypeDescriptor::Primitive(Primitive::U8)) {
                return Err(ConvertError::Unsupported { kind: "binary" });
            }
            let stripped = raw.trim().trim_matches(|c| c == '[' || c == ']');
            if stripped.trim().is_empty() {
                return Ok(Value::Array(Vec::new()));
            }
            let mut items = Vec::new();
            for part in stripped.split(',') {
                items.push(convert_value(item, part.trim())?);
            }
            Ok(Value::Array(items))
        }

        TypeDescriptor::Struct(_) => {
            let parsed: Value =
                serde_json::from_str(raw).map_err(|_| ConvertError::NotAnObject {
                    value: raw.to_string(),
                })?;
            if parsed.is_object() {
                Ok(parsed)
            } else {
                Err(ConvertError::NotAnObject {
                    value: raw.to_string(),
                })
            }
        }

        TypeDescriptor::Timestamp => Ok(Value::String(trim_quotes(raw).to_string())),

        TypeDescriptor::Primitive(p) => convert_primitive(*p, raw),

        TypeDescriptor::Map(_) => Err(ConvertError::Unsupported { kind: "map" }),
        TypeDescriptor::Any => Err(ConvertError::Unsupported { kind: "opaque value" }),
    }
}

fn convert_primitive(p: Primitive, raw: &str) -> Result<Value, ConvertError> {
    match p {
        Primitive::Str => Ok(Value::String(trim_quotes(raw).to_string())),

        Primitive::Bool => raw
            .parse::<bool>()
            .map(Value::from)
            .map_err(|_| invalid("boolean", raw)),

        Primitive::I8 => parse_int::<i8>(raw, "int8"),
        Primitive::I16 => parse_int::<i16>(raw, "int16"),
        Primitive::I32 => parse_int::<i32>(raw, "int32"),
        Primitive::I64 => parse_int::<i64>(raw, "int64"),
        Primitive::U8 => parse_uint::<u8>(raw, "uint8"),
        Primitive::U16 => parse_uint::<u16>(raw, "uint16"),
        Primitive::U32 => parse_uint::<u32>(raw, "uint32"),
        Primitive::U64 => parse_uint::<u64>(raw, "uint64"),

        Primitive::F32 | Primitive::F64 => {
            let parsed = raw.parse::<f64>().map_err(|_| invalid("number", raw))?;
            serde_json::Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| invalid("number", raw))
        }
    }
}

fn parse_int<T>(raw: &str, expected: &'static str) -> Result<Value, ConvertError>
where
    T: std::str::FromStr + Into<i64>,
{
    raw.parse::<T>()
        .map(|n| {
            let wide: i64 = n.into();
            Value::from(wide)
        })
        .map_err(|_| invalid(expected, raw))
}

fn parse_uint<T>(raw: &str, expected: &'static str) -> Result<Value, ConvertError>
where
    T: std::str::FromStr + Into<u64>,
{
    raw.parse::<T>()
        .map(|n| {
            let wide: u64 = n.into();
            Value::from(wide)
        })
        .map_err(|_| invalid(expected, raw))
}

fn invalid(expected: &'static str, raw: &str) -> ConvertError {
    ConvertError::Invalid {
        expected,
        value: raw.to_string(),
    }
}

fn trim_quotes(raw: &str) -> &str {
    raw.trim_matches('"')
}
