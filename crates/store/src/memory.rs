//! In-memory document store
//!
//! Reference implementation of the [`DocumentStore`] collaborator:
//! `RwLock`-guarded maps, equality-filter matching, identity assignment on
//! insert, and unique-index enforcement. Single-document operations are
//! atomic under the write lock, which is exactly the native per-document
//! atomicity the entity layer assumes of any backend.

use entitydb_core::{Collection, DocId, Document, DocumentStore, Error, Filter, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

#[derive(Default)]
struct CollectionInner {
    docs: BTreeMap<DocId, Document>,
    indexes: BTreeSet<String>,
    unique_indexes: BTreeSet<String>,
}

impl CollectionInner {
    /// Check every unique index against the candidate document.
    fn check_unique(&self, doc: &Document, exclude: Option<DocId>) -> Result<()> {
        for field in &self.unique_indexes {
            let Some(value) = doc.get(field) else {
                continue;
            };
            let clash = self.docs.values().any(|other| {
                other.id != exclude && other.id != doc.id && other.get(field) == Some(value)
            });
            if clash {
                return Err(Error::Storage(format!(
                    "unique index violation on field {field}"
                )));
            }
        }
        Ok(())
    }
}

/// A single in-memory collection
#[derive(Default)]
pub struct MemoryCollection {
    inner: RwLock<CollectionInner>,
}

impl MemoryCollection {
    /// An empty collection
    pub fn new() -> Self {
        MemoryCollection::default()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.inner.read().docs.len()
    }

    /// True when no documents are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Collection for MemoryCollection {
    fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        let inner = self.inner.read();
        Ok(inner.docs.values().find(|doc| filter.matches(doc)).cloned())
    }

    fn count(&self, filter: &Filter) -> Result<usize> {
        let inner = self.inner.read();
        Ok(inner.docs.values().filter(|doc| filter.matches(doc)).count())
    }

    fn insert(&self, mut doc: Document) -> Result<DocId> {
        let mut inner = self.inner.write();
        let id = doc.id.unwrap_or_else(DocId::new);
        doc.id = Some(id);
        if inner.docs.contains_key(&id) {
            return Err(Error::Storage(format!("document {id} already exists")));
        }
        inner.check_unique(&doc, None)?;
        inner.docs.insert(id, doc);
        Ok(id)
    }

    fn save(&self, mut doc: Document) -> Result<DocId> {
        let mut inner = self.inner.write();
        let id = doc.id.unwrap_or_else(DocId::new);
        doc.id = Some(id);
        inner.check_unique(&doc, Some(id))?;
        inner.docs.insert(id, doc);
        Ok(id)
    }

    fn remove(&self, filter: &Filter) -> Result<usize> {
        let mut inner = self.inner.write();
        let matched: Vec<DocId> = inner
            .docs
            .iter()
            .filter(|(_, doc)| filter.matches(doc))
            .map(|(id, _)| *id)
            .collect();
        for id in &matched {
            inner.docs.remove(id);
        }
        Ok(matched.len())
    }

    fn create_index(&self, field: &str, unique: bool) -> Result<()> {
        let mut inner = self.inner.write();
        inner.indexes.insert(field.to_string());
        if unique {
            inner.unique_indexes.insert(field.to_string());
        }
        Ok(())
    }
}

/// In-memory document store
///
/// Collections are created on first access and shared thereafter. Cloning
/// the store clones the handle, not the data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Arc<MemoryCollection>>>>,
}

impl MemoryStore {
    /// An empty store
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Collection names created so far
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl DocumentStore for MemoryStore {
    fn collection(&self, name: &str) -> Arc<dyn Collection> {
        let mut collections = self.collections.write();
        collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryCollection::new()))
            .clone()
    }
}
