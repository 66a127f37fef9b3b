//! Named validators
//!
//! Field definitions reference validators by name; the registry resolves
//! those names at validation time. The registry ships with the built-in
//! `machine-name` validator required by the implicit `name` field.
//!
//! # Concurrency
//!
//! The registry uses `RwLock` internally: registration is expected during
//! the quiescent setup phase, lookups happen on the hot validation path.

use crate::error::{Error, Result};
use crate::value::Value;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A named value check
pub trait Validator: Send + Sync {
    /// Accept or reject the value
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` when the value is rejected.
    fn validate(&self, value: &Value) -> Result<()>;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> Result<()> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<()> {
        self(value)
    }
}

/// Registry of named validators
pub struct ValidatorRegistry {
    validators: RwLock<HashMap<String, Arc<dyn Validator>>>,
}

impl ValidatorRegistry {
    /// An empty registry (no built-ins)
    pub fn empty() -> Self {
        ValidatorRegistry {
            validators: RwLock::new(HashMap::new()),
        }
    }

    /// A registry with the built-in validators installed
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register("machine-name", Arc::new(machine_name));
        registry
    }

    /// Register a validator under a name, replacing any previous one
    pub fn register(&self, name: impl Into<String>, validator: Arc<dyn Validator>) {
        self.validators.write().insert(name.into(), validator);
    }

    /// True if a validator is registered under the name
    pub fn registered(&self, name: &str) -> bool {
        self.validators.read().contains_key(name)
    }

    /// Run the named validator against a value
    ///
    /// # Errors
    ///
    /// `UndefinedValidator` when the name is unknown, otherwise whatever
    /// the validator itself returns.
    pub fn validate(&self, name: &str, value: &Value) -> Result<()> {
        let validator = self
            .validators
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UndefinedValidator(name.to_string()))?;
        validator.validate(value)
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The `machine-name` validator
///
/// Accepts non-empty strings of lowercase alphanumerics, underscores, and
/// hyphens that do not start with a digit.
fn machine_name(value: &Value) -> Result<()> {
    let fail = |reason: &str| {
        Err(Error::ValidationFailed {
            validator: "machine-name".to_string(),
            reason: reason.to_string(),
        })
    };

    let Some(s) = value.as_str() else {
        return fail("value is not a string");
    };
    if s.is_empty() {
        return fail("value is empty");
    }
    if s.starts_with(|c: char| c.is_ascii_digit()) {
        return fail("must not start with a digit");
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return fail("only lowercase alphanumerics, '_' and '-' are allowed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_name_accepts_valid_names() {
        let registry = ValidatorRegistry::new();
        for name in ["test", "test-entity", "entity_2", "a"] {
            assert!(
                registry.validate("machine-name", &Value::from(name)).is_ok(),
                "{name} should be accepted"
            );
        }
    }

    #[test]
    fn machine_name_rejects_invalid_names() {
        let registry = ValidatorRegistry::new();
        for name in ["", "Has Upper", "2leading", "spa ce", "dotted.name"] {
            assert!(
                registry.validate("machine-name", &Value::from(name)).is_err(),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn machine_name_rejects_non_strings() {
        let registry = ValidatorRegistry::new();
        assert!(registry.validate("machine-name", &Value::Int(5)).is_err());
        assert!(registry.validate("machine-name", &Value::Null).is_err());
    }

    #[test]
    fn unknown_validator_fails() {
        let registry = ValidatorRegistry::new();
        let err = registry.validate("no-such", &Value::Null).unwrap_err();
        assert!(matches!(err, Error::UndefinedValidator(_)));
    }

    #[test]
    fn custom_validator_registration() {
        let registry = ValidatorRegistry::new();
        registry.register(
            "positive",
            Arc::new(|value: &Value| match value.as_int() {
                Some(i) if i > 0 => Ok(()),
                _ => Err(Error::ValidationFailed {
                    validator: "positive".to_string(),
                    reason: "not a positive integer".to_string(),
                }),
            }),
        );
        assert!(registry.registered("positive"));
        assert!(registry.validate("positive", &Value::Int(3)).is_ok());
        assert!(registry.validate("positive", &Value::Int(-3)).is_err());
    }
}
