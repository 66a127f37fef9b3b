//! Identity, document, and actor types
//!
//! The storage collaborator deals in flat documents: an optional identity
//! plus a string-keyed value map. Filters are equality matches over the
//! same shape, which is all the entity layer ever asks of its store.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Opaque document identity, assigned by the storage collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocId(Uuid);

impl DocId {
    /// Generate a fresh identity
    pub fn new() -> Self {
        DocId(Uuid::new_v4())
    }

    /// Parse an identity from its string form
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(DocId)
    }
}

impl Default for DocId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A flat document: optional identity plus field data
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Identity, absent until the store has assigned one
    pub id: Option<DocId>,
    /// Field values keyed by field name
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    /// An empty document with no identity
    pub fn new() -> Self {
        Document::default()
    }

    /// Set a field value (builder style)
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set the identity (builder style)
    #[must_use]
    pub fn with_id(mut self, id: DocId) -> Self {
        self.id = Some(id);
        self
    }

    /// Get a field value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Equality filter over documents
///
/// Matches a document when every clause holds. `Filter::id` matches the
/// document identity; field clauses match field values exactly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    /// Identity clause, if any
    pub id: Option<DocId>,
    /// Field equality clauses
    pub fields: BTreeMap<String, Value>,
}

impl Filter {
    /// Match everything
    pub fn all() -> Self {
        Filter::default()
    }

    /// Match a single document by identity
    pub fn by_id(id: DocId) -> Self {
        Filter {
            id: Some(id),
            fields: BTreeMap::new(),
        }
    }

    /// Match documents where `name` equals `value`
    pub fn by_field(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::all().and(name, value)
    }

    /// Add a field equality clause
    #[must_use]
    pub fn and(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// True when the document satisfies every clause
    pub fn matches(&self, doc: &Document) -> bool {
        if let Some(id) = self.id {
            if doc.id != Some(id) {
                return false;
            }
        }
        self.fields
            .iter()
            .all(|(name, value)| doc.get(name) == Some(value))
    }
}

/// Descriptor of the actor responsible for a persistence operation
///
/// Saves, trashes, and restores record who drove them: either the literal
/// system actor or a reference to another entity (usually a user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    /// The system itself
    System,
    /// Another entity, by type and identity
    Entity {
        /// The acting entity's type
        entity_type: String,
        /// The acting entity's identity, if persisted
        id: Option<DocId>,
    },
}

impl Actor {
    /// Value representation persisted in waste-record metadata
    pub fn to_value(&self) -> Value {
        match self {
            Actor::System => Value::String("system".to_string()),
            Actor::Entity { entity_type, id } => {
                let mut map = BTreeMap::new();
                map.insert("type".to_string(), Value::String(entity_type.clone()));
                map.insert(
                    "id".to_string(),
                    id.map(|i| Value::String(i.to_string())).unwrap_or(Value::Null),
                );
                Value::Object(map)
            }
        }
    }
}

impl Default for Actor {
    fn default() -> Self {
        Actor::System
    }
}
