//! Field types and definitions
//!
//! A field is a named, typed, optionally required/defaulted/validated data
//! slot. The type set is closed; `type_matches` is the single pure predicate
//! deciding whether a value is acceptable for a declared type. It is total:
//! every (value, type) pair yields an answer, it never fails.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of declared field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Matches any value
    Mixed,
    /// UTF-8 string
    String,
    /// Numeric value with zero fractional remainder
    Integer,
    /// Any numeric value, or a string with a numeric prefix
    Decimal,
    /// Boolean
    Boolean,
    /// Array of values
    Array,
    /// Object with string keys
    Object,
    /// Reference to a registered callable
    Function,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Mixed => "Mixed",
            FieldType::String => "String",
            FieldType::Integer => "Integer",
            FieldType::Decimal => "Decimal",
            FieldType::Boolean => "Boolean",
            FieldType::Array => "Array",
            FieldType::Object => "Object",
            FieldType::Function => "Function",
        };
        f.write_str(name)
    }
}

/// Check whether a value is acceptable for a declared field type
///
/// - `Mixed` matches everything.
/// - `Integer` matches `Int` always, and `Float` when the fractional part
///   is zero.
/// - `Decimal` matches `Int` and `Float` always, and `String` when it has a
///   numeric prefix (e.g. `"12px"` parses, `"px12"` does not).
/// - The remaining types match their canonical variant only.
pub fn type_matches(value: &Value, ty: FieldType) -> bool {
    match ty {
        FieldType::Mixed => true,
        FieldType::String => matches!(value, Value::String(_)),
        FieldType::Integer => match value {
            Value::Int(_) => true,
            Value::Float(f) => f.is_finite() && f.fract() == 0.0,
            _ => false,
        },
        FieldType::Decimal => match value {
            Value::Int(_) | Value::Float(_) => true,
            Value::String(s) => has_numeric_prefix(s),
            _ => false,
        },
        FieldType::Boolean => matches!(value, Value::Bool(_)),
        FieldType::Array => matches!(value, Value::Array(_)),
        FieldType::Object => matches!(value, Value::Object(_)),
        FieldType::Function => matches!(value, Value::Action(_)),
    }
}

/// True if the string starts (after optional whitespace and sign) with at
/// least one decimal digit.
fn has_numeric_prefix(s: &str) -> bool {
    let s = s.trim_start();
    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Declarative definition of a single field slot
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Declared type; `None` means untyped (no type check is applied)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    /// Whether a value must be present at validation time
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Default value realized by `get()` when no value has been set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Named validators applied in order after the type check
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<String>,
    /// Whether the storage collaborator should index this field
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub index: bool,
    /// Whether the index must be unique
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
}

impl FieldDefinition {
    /// A field of the given type with everything else defaulted
    pub fn of_type(field_type: FieldType) -> Self {
        FieldDefinition {
            field_type: Some(field_type),
            ..Default::default()
        }
    }

    /// Mark the field required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Append a named validator
    #[must_use]
    pub fn with_validator(mut self, name: impl Into<String>) -> Self {
        self.validators.push(name.into());
        self
    }

    /// Mark the field indexed (optionally unique)
    #[must_use]
    pub fn indexed(mut self, unique: bool) -> Self {
        self.index = true;
        self.unique = unique;
        self
    }
}
