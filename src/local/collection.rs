//! LocalCollection: lazily populated name -> property map

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use tracing::debug;

use super::property::{LocalPropertyBuilder, PropertyInner};
use super::{kind_name, lock, LocalProperty, State, ValidationError};
use crate::error::Result;

#[derive(Clone)]
pub(crate) struct LocalCollectionBuilder {
    name: String,
    item: LocalPropertyBuilder,
}

impl LocalCollectionBuilder {
    pub(crate) fn new(name: impl Into<String>, item: LocalPropertyBuilder) -> Self {
        Self {
            name: name.into(),
            item,
        }
    }
}

struct CollectionInner {
    name: String,
    item: LocalPropertyBuilder,
    parent: Option<Weak<PropertyInner>>,
    items: Mutex<HashMap<String, LocalProperty>>,
}

/// Client-side collection of named local properties.
///
/// Items are created from the declared item template on first access and
/// cached; removing an item only evicts it locally.
#[derive(Clone)]
pub struct LocalCollection {
    inner: Arc<CollectionInner>,
}

impl fmt::Debug for LocalCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCollection")
            .field("name", &self.inner.name)
            .field("items", &self.names())
            .finish()
    }
}

impl LocalCollection {
    /// Standalone collection with no parent property
    pub fn new(name: impl Into<String>, item: LocalPropertyBuilder) -> Self {
        Self::with_parent(LocalCollectionBuilder::new(name, item), None)
    }

    pub(crate) fn from_builder(builder: LocalCollectionBuilder, parent: Weak<PropertyInner>) -> Self {
        Self::with_parent(builder, Some(parent))
    }

    fn with_parent(builder: LocalCollectionBuilder, parent: Option<Weak<PropertyInner>>) -> Self {
        Self {
            inner: Arc::new(CollectionInner {
                name: builder.name,
                item: builder.item,
                parent,
                items: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Cached item names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.inner.items).keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        lock(&self.inner.items).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.inner.items).is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        lock(&self.inner.items).contains_key(name)
    }

    /// Item called `name`, created on first access.
    pub fn get_item(&self, name: &str) -> LocalProperty {
        let mut items = lock(&self.inner.items);
        if let Some(existing) = items.get(name) {
            return existing.clone();
        }
        debug!(collection = %self.inner.name, item = %name, "creating local item");
        let item = self
            .inner
            .item
            .clone()
            .renamed(name)
            .build_with_parent(self.inner.parent.clone());
        items.insert(name.to_string(), item.clone());
        item
    }

    /// Replace the full state of an existing or new item.
    pub fn set_item(&self, name: &str, value: Value) -> Result<()> {
        self.get_item(name).set_state(value)
    }

    /// Evict an item from the local cache. Nothing is sent anywhere.
    pub fn del_item(&self, name: &str) -> Option<LocalProperty> {
        lock(&self.inner.items).remove(name)
    }

    pub fn get_state(&self, with_attributes: bool) -> State {
        let items: Vec<(String, LocalProperty)> = lock(&self.inner.items)
            .iter()
            .map(|(name, item)| (name.clone(), item.clone()))
            .collect();
        State::Composite(
            items
                .into_iter()
                .map(|(name, item)| (name, item.get_state(with_attributes)))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    /// Write every entry of a map as an item.
    pub fn set_state(&self, value: Value) -> Result<()> {
        match value {
            Value::Object(map) => {
                for (name, state) in map {
                    self.set_item(&name, state)?;
                }
                Ok(())
            }
            Value::Null => Ok(()),
            other => Err(ValidationError::TypeMismatch {
                expected: "map",
                found: kind_name(&other),
            }
            .into()),
        }
    }
}
