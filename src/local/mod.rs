/*!
 * Client-held properties and collections
 *
 * These objects never talk to the remote application. They cache a value,
 * validate writes against declared attributes and invalidate each other
 * through change callbacks. Post-processing objects layered on top of a
 * results subsystem are built from them.
 */

pub mod collection;
pub mod property;

pub use collection::LocalCollection;
pub use property::{CacheState, LocalProperty, LocalPropertyBuilder};

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::error::Result;

/// Write rejected by a local property
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// New value has a different type than the one already held
    #[error("expected a {expected} value, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Numeric value outside the declared inclusive range
    #[error("{value} is outside [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    /// Value (or one list element) not in the declared allowed set
    #[error("{value} is not one of the allowed values")]
    NotAllowed { value: String },
}

/// Aggregated state of a local object.
///
/// A property with nested members reads as `Composite`; a leaf reads as
/// `Scalar`.
#[derive(Debug, Clone, PartialEq)]
pub enum State {
    Scalar(Value),
    Composite(BTreeMap<String, State>),
}

impl State {
    pub fn is_scalar(&self) -> bool {
        matches!(self, State::Scalar(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, State::Composite(_))
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            State::Scalar(value) => Some(value),
            State::Composite(_) => None,
        }
    }

    /// Member of a composite state
    pub fn get(&self, name: &str) -> Option<&State> {
        match self {
            State::Composite(members) => members.get(name),
            State::Scalar(_) => None,
        }
    }

    /// Flatten into a plain value (composites become objects)
    pub fn into_value(self) -> Value {
        match self {
            State::Scalar(value) => value,
            State::Composite(members) => Value::Object(
                members
                    .into_iter()
                    .map(|(name, state)| (name, state.into_value()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

/// Member of a local object: a nested property or a named collection.
#[derive(Clone)]
pub enum LocalNode {
    Property(LocalProperty),
    Collection(LocalCollection),
}

impl LocalNode {
    pub fn name(&self) -> &str {
        match self {
            LocalNode::Property(property) => property.name(),
            LocalNode::Collection(collection) => collection.name(),
        }
    }

    pub fn get_state(&self, with_attributes: bool) -> State {
        match self {
            LocalNode::Property(property) => property.get_state(with_attributes),
            LocalNode::Collection(collection) => collection.get_state(with_attributes),
        }
    }

    pub fn set_state(&self, value: Value) -> Result<()> {
        match self {
            LocalNode::Property(property) => property.set_state(value),
            LocalNode::Collection(collection) => collection.set_state(value),
        }
    }

    pub fn as_property(&self) -> Option<&LocalProperty> {
        match self {
            LocalNode::Property(property) => Some(property),
            LocalNode::Collection(_) => None,
        }
    }

    pub fn as_collection(&self) -> Option<&LocalCollection> {
        match self {
            LocalNode::Collection(collection) => Some(collection),
            LocalNode::Property(_) => None,
        }
    }
}

impl std::fmt::Debug for LocalNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocalNode::Property(property) => std::fmt::Debug::fmt(property, f),
            LocalNode::Collection(collection) => std::fmt::Debug::fmt(collection, f),
        }
    }
}

/// Short type name used in validation messages
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Lock that survives a panicked writer
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
