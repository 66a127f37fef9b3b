//! Lifecycle events
//!
//! The closed set of lifecycle events an entity moves through. Hook lists
//! are keyed by these identifiers and consumers subscribe to them on the
//! global event bus, so the string forms are a stable wire contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle events hooks can attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Event {
    /// Entity initialized (plugins applied, indexes ensured)
    Init,
    /// Reserved read event for subscribers; `get()` itself is a pure read
    Get,
    /// A field value was validated and is about to be committed
    Set,
    /// Entity data adopted from the store
    Loaded,
    /// Snapshot taken, about to be persisted
    Presave,
    /// Persisted successfully
    Saved,
    /// About to move to the waste store
    Pretrash,
    /// Moved to the waste store
    Trashed,
    /// About to move back from the waste store
    Prerestore,
    /// Moved back and re-saved
    Restored,
    /// About to purge both locations
    Predelete,
    /// Purged; in-memory state reset
    Deleted,
    /// All fields validated
    Validate,
}

impl Event {
    /// Every recognized event, in declaration order
    pub const ALL: [Event; 13] = [
        Event::Init,
        Event::Get,
        Event::Set,
        Event::Loaded,
        Event::Presave,
        Event::Saved,
        Event::Pretrash,
        Event::Trashed,
        Event::Prerestore,
        Event::Restored,
        Event::Predelete,
        Event::Deleted,
        Event::Validate,
    ];

    /// Stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::Init => "init",
            Event::Get => "get",
            Event::Set => "set",
            Event::Loaded => "loaded",
            Event::Presave => "presave",
            Event::Saved => "saved",
            Event::Pretrash => "pretrash",
            Event::Trashed => "trashed",
            Event::Prerestore => "prerestore",
            Event::Restored => "restored",
            Event::Predelete => "predelete",
            Event::Deleted => "deleted",
            Event::Validate => "validate",
        }
    }

    /// The two global channels this event is dispatched on for a type
    ///
    /// `entities[<type>].<event>` targets subscribers of one entity type,
    /// `entities.<event>` targets subscribers of every type.
    pub fn channels(&self, entity_type: &str) -> [String; 2] {
        [
            format!("entities[{entity_type}].{}", self.as_str()),
            format!("entities.{}", self.as_str()),
        ]
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
