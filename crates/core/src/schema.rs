//! Schemas: the declarative definition of an entity type
//!
//! A schema names a storage collection and declares base fields, bundles
//! (named field overlays), hook lists keyed by lifecycle event, plugin
//! names, and a method map. Schemas are plain data: every callable is
//! referenced through a [`HookRef`] — a string key into the runtime action
//! registry — so the persisted form contains keys only, never source text.
//!
//! The overlay rule for bundles is replacement, not merging: a bundle field
//! named like a base field fully replaces that field's definition.

use crate::error::{Error, Result};
use crate::event::Event;
use crate::field::{FieldDefinition, FieldType};
use crate::value::Value;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Reference to a registered callable, persisted as `@action{<key>}`
///
/// The legacy `@fnc{<source>}` encoding (literal source text reconstituted
/// by dynamic evaluation) is rejected on load.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct HookRef(String);

impl HookRef {
    /// Reference the action registered under `key`
    pub fn new(key: impl Into<String>) -> Self {
        HookRef(key.into())
    }

    /// The action registry key
    pub fn key(&self) -> &str {
        &self.0
    }

    /// The persisted text form
    pub fn encode(&self) -> String {
        format!("@action{{{}}}", self.0)
    }

    /// Parse the persisted text form
    pub fn decode(text: &str) -> Result<Self> {
        if let Some(key) = text.strip_prefix("@action{").and_then(|s| s.strip_suffix('}')) {
            if key.is_empty() {
                return Err(Error::Serialization("empty action key".to_string()));
            }
            return Ok(HookRef(key.to_string()));
        }
        if text.starts_with("@fnc{") {
            return Err(Error::Serialization(
                "function source encoding is not supported; register an action key instead"
                    .to_string(),
            ));
        }
        Err(Error::Serialization(format!(
            "unrecognized callable encoding: {text}"
        )))
    }
}

impl From<&str> for HookRef {
    fn from(key: &str) -> Self {
        HookRef::new(key)
    }
}

impl Serialize for HookRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for HookRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct HookRefVisitor;

        impl Visitor<'_> for HookRefVisitor {
            type Value = HookRef;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string of the form @action{key}")
            }

            fn visit_str<E: de::Error>(self, text: &str) -> std::result::Result<HookRef, E> {
                HookRef::decode(text).map_err(|e| E::custom(e.to_string()))
            }
        }

        deserializer.deserialize_str(HookRefVisitor)
    }
}

/// Field overlay applied atop a schema's base fields
pub type BundleFields = BTreeMap<String, FieldDefinition>;

/// Declarative definition of an entity type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Storage collection name; derived as `entities_<type>` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Base field map
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDefinition>,
    /// Bundle name to overlay field map
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bundles: BTreeMap<String, BundleFields>,
    /// Hook lists keyed by lifecycle event, run in declaration order
    #[serde(default)]
    pub hooks: BTreeMap<Event, Vec<HookRef>>,
    /// Plugin names applied in order at entity initialization
    #[serde(default)]
    pub plugins: Vec<String>,
    /// Behavior map: method name to action key
    #[serde(default)]
    pub methods: BTreeMap<String, HookRef>,
}

impl Schema {
    /// An empty schema
    pub fn new() -> Self {
        Schema::default()
    }

    /// Fill the structural defaults every persisted schema carries
    ///
    /// Derives the collection name and installs an (empty) hook list for
    /// every recognized event. Existing entries are left untouched.
    pub fn normalize(&mut self, entity_type: &str) {
        if self.collection.is_none() {
            self.collection = Some(format!("entities_{entity_type}"));
        }
        for event in Event::ALL {
            self.hooks.entry(event).or_default();
        }
    }

    /// Install the implicit base fields every entity type has
    ///
    /// `name` (required, unique-indexed, machine-name-validated) and
    /// `bundle` (string, default empty). Declared fields with those names
    /// win — the implicit definitions fill gaps only.
    pub fn ensure_base_fields(&mut self) {
        self.fields.entry("name".to_string()).or_insert_with(|| {
            FieldDefinition::of_type(FieldType::String)
                .required()
                .with_validator("machine-name")
                .indexed(true)
        });
        self.fields.entry("bundle".to_string()).or_insert_with(|| {
            FieldDefinition::of_type(FieldType::String).with_default("")
        });
    }

    /// True if the named bundle is declared
    pub fn has_bundle(&self, bundle: &str) -> bool {
        self.bundles.contains_key(bundle)
    }

    /// Look up a field's effective definition
    ///
    /// The active bundle's overlay wins over the base field map.
    pub fn field(&self, bundle: Option<&str>, name: &str) -> Option<&FieldDefinition> {
        if let Some(bundle) = bundle {
            if let Some(fld) = self.bundles.get(bundle).and_then(|b| b.get(name)) {
                return Some(fld);
            }
        }
        self.fields.get(name)
    }

    /// The effective field set: base fields overlaid by the active bundle
    ///
    /// Overlay replaces a same-named field's whole definition; there is no
    /// per-field deep merge.
    pub fn effective_fields(&self, bundle: Option<&str>) -> BTreeMap<String, FieldDefinition> {
        let mut fields = self.fields.clone();
        if let Some(overlay) = bundle.and_then(|b| self.bundles.get(b)) {
            for (name, fld) in overlay {
                fields.insert(name.clone(), fld.clone());
            }
        }
        fields
    }

    /// Append a hook to an event's list (builder style)
    #[must_use]
    pub fn with_hook(mut self, event: Event, hook: impl Into<HookRef>) -> Self {
        self.hooks.entry(event).or_default().push(hook.into());
        self
    }

    /// Declare a field (builder style)
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, fld: FieldDefinition) -> Self {
        self.fields.insert(name.into(), fld);
        self
    }

    /// Declare a bundle overlay (builder style)
    #[must_use]
    pub fn with_bundle(mut self, name: impl Into<String>, fields: BundleFields) -> Self {
        self.bundles.insert(name.into(), fields);
        self
    }

    /// Declare a plugin by registered name (builder style)
    #[must_use]
    pub fn with_plugin(mut self, name: impl Into<String>) -> Self {
        self.plugins.push(name.into());
        self
    }

    /// Declare a method backed by a registered action (builder style)
    #[must_use]
    pub fn with_method(mut self, name: impl Into<String>, action: impl Into<HookRef>) -> Self {
        self.methods.insert(name.into(), action.into());
        self
    }

    /// Serialize to the document value persisted in `entity_schemas`
    pub fn to_value(&self) -> Result<Value> {
        let json = serde_json::to_value(self).map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(Value::from(json))
    }

    /// Deserialize from the persisted document value
    pub fn from_value(value: &Value) -> Result<Self> {
        let json = serde_json::Value::from(value.clone());
        serde_json::from_value(json).map_err(|e| Error::Serialization(e.to_string()))
    }
}
