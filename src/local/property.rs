//! LocalProperty: cached, validated client-side value

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use tracing::{trace, warn};

use super::collection::{LocalCollection, LocalCollectionBuilder};
use super::{kind_name, lock, LocalNode, State, ValidationError};
use crate::error::{MeshlinkError, Result};

/// Computes the value of a property that has not been written yet
pub type DefaultFn = Arc<dyn Fn(&LocalProperty) -> Value + Send + Sync>;

/// Decides whether a property is currently visible through its parent
pub type AvailabilityFn = Arc<dyn Fn(&LocalProperty) -> bool + Send + Sync>;

/// Fired after every successful write
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// Where a property's cached value stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Never written, no default computed yet
    Unset,
    /// Holds a validated or computed value
    Cached,
    /// A dependency changed; the next read recomputes
    Invalidated,
}

/// Validation metadata declared on a property
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    pub range: Option<(f64, f64)>,
    pub allowed_values: Option<Vec<Value>>,
}

struct Cell {
    state: CacheState,
    value: Value,
}

pub(crate) struct PropertyInner {
    name: String,
    parent: Option<Weak<PropertyInner>>,
    attributes: Attributes,
    default: Option<DefaultFn>,
    availability: Option<AvailabilityFn>,
    reset_on_change: Vec<String>,
    children: Vec<LocalNode>,
    cell: Mutex<Cell>,
    callbacks: Mutex<Vec<ChangeCallback>>,
}

impl PropertyInner {
    fn invalidate(&self) {
        let mut cell = lock(&self.cell);
        if cell.state == CacheState::Cached {
            trace!(property = %self.name, "invalidated by dependency");
            cell.state = CacheState::Invalidated;
        }
    }
}

/// Shared handle to a local property; clones refer to the same value.
///
/// # Example
///
/// ```
/// use meshlink::local::LocalProperty;
/// use serde_json::json;
///
/// let contour = LocalProperty::builder("contour")
///     .child(LocalProperty::builder("field"))
///     .child(LocalProperty::builder("levels").range(0.0, 100.0))
///     .build();
///
/// contour.set_state(json!({"field": "pressure", "levels": 20})).unwrap();
/// assert_eq!(
///     contour.get_state(false).into_value(),
///     json!({"field": "pressure", "levels": 20})
/// );
/// ```
#[derive(Clone)]
pub struct LocalProperty {
    inner: Arc<PropertyInner>,
}

impl fmt::Debug for LocalProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalProperty")
            .field("name", &self.inner.name)
            .field("state", &self.cache_state())
            .field("children", &self.inner.children.len())
            .finish()
    }
}

impl LocalProperty {
    pub fn builder(name: impl Into<String>) -> LocalPropertyBuilder {
        LocalPropertyBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn attributes(&self) -> &Attributes {
        &self.inner.attributes
    }

    pub fn parent(&self) -> Option<LocalProperty> {
        self.inner
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| LocalProperty { inner })
    }

    pub fn cache_state(&self) -> CacheState {
        lock(&self.inner.cell).state
    }

    pub fn has_children(&self) -> bool {
        !self.inner.children.is_empty()
    }

    /// Names of the declared members, in declaration order
    pub fn child_names(&self) -> Vec<String> {
        self.inner
            .children
            .iter()
            .map(|child| child.name().to_string())
            .collect()
    }

    /// Availability of this property as seen from its parent
    pub fn is_available(&self) -> bool {
        match &self.inner.availability {
            Some(predicate) => predicate(self),
            None => true,
        }
    }

    fn find(&self, name: &str) -> Option<&LocalNode> {
        self.inner.children.iter().find(|child| child.name() == name)
    }

    /// Look up a member.
    ///
    /// An undeclared name is an error; a declared but currently unavailable
    /// member is `Ok(None)`.
    pub fn get(&self, name: &str) -> Result<Option<LocalNode>> {
        let child = self
            .find(name)
            .ok_or_else(|| MeshlinkError::UnknownAttribute {
                path: self.inner.name.clone(),
                name: name.to_string(),
            })?;
        match child {
            LocalNode::Property(property) if !property.is_available() => Ok(None),
            other => Ok(Some(other.clone())),
        }
    }

    /// Current scalar value, computing the default when nothing is cached.
    pub fn value(&self) -> Value {
        if let Some(value) = self.cached() {
            return value;
        }

        // computed outside the lock: a default may read its parent or siblings
        let computed = self.compute_default();
        let mut cell = lock(&self.inner.cell);
        if cell.state == CacheState::Cached {
            // a write landed while the default was being computed
            return cell.value.clone();
        }
        match computed {
            Some(value) => {
                cell.value = value.clone();
                cell.state = CacheState::Cached;
                value
            }
            None => {
                cell.value = Value::Null;
                cell.state = CacheState::Unset;
                Value::Null
            }
        }
    }

    fn cached(&self) -> Option<Value> {
        let cell = lock(&self.inner.cell);
        (cell.state == CacheState::Cached).then(|| cell.value.clone())
    }

    fn compute_default(&self) -> Option<Value> {
        self.inner.default.as_ref().map(|default| default(self))
    }

    /// What a read would return, without caching a computed default
    fn effective_value(&self) -> Value {
        self.cached()
            .or_else(|| self.compute_default())
            .unwrap_or(Value::Null)
    }

    /// Read the property.
    ///
    /// With members, returns a composite keyed by member name; otherwise the
    /// cached scalar. `with_attributes` adds `member.range` and
    /// `member.allowed_values` entries for members that declare them.
    pub fn get_state(&self, with_attributes: bool) -> State {
        if self.inner.children.is_empty() {
            return State::Scalar(self.value());
        }

        let mut members = BTreeMap::new();
        for child in &self.inner.children {
            if let LocalNode::Property(property) = child {
                if !property.is_available() {
                    continue;
                }
                if with_attributes {
                    let attributes = property.attributes();
                    if let Some((min, max)) = attributes.range {
                        members.insert(
                            format!("{}.range", property.name()),
                            State::Scalar(json!([min, max])),
                        );
                    }
                    if let Some(allowed) = &attributes.allowed_values {
                        members.insert(
                            format!("{}.allowed_values", property.name()),
                            State::Scalar(Value::Array(allowed.clone())),
                        );
                    }
                }
            }
            members.insert(child.name().to_string(), child.get_state(with_attributes));
        }
        State::Composite(members)
    }

    /// Write the property.
    ///
    /// A map on a property with members is dispatched member by member;
    /// anything else is validated and cached. Change callbacks fire after
    /// the write succeeds.
    pub fn set_state(&self, value: Value) -> Result<()> {
        match value {
            Value::Object(map) if self.has_children() => {
                for (name, member) in map {
                    let child = self.find(&name).ok_or_else(|| MeshlinkError::UnknownAttribute {
                        path: self.inner.name.clone(),
                        name: name.clone(),
                    })?;
                    child.set_state(member)?;
                }
            }
            scalar => {
                self.validate(&scalar)?;
                let mut cell = lock(&self.inner.cell);
                cell.value = scalar;
                cell.state = CacheState::Cached;
            }
        }
        self.fire_callbacks();
        Ok(())
    }

    fn validate(&self, value: &Value) -> std::result::Result<(), ValidationError> {
        if value.is_null() {
            return Ok(());
        }

        let previous = self.effective_value();
        if !previous.is_null() && kind_name(&previous) != kind_name(value) {
            return Err(ValidationError::TypeMismatch {
                expected: kind_name(&previous),
                found: kind_name(value),
            });
        }

        let attributes = &self.inner.attributes;
        if let Some((min, max)) = attributes.range {
            let number = value.as_f64().ok_or(ValidationError::TypeMismatch {
                expected: "number",
                found: kind_name(value),
            })?;
            if number < min || number > max {
                return Err(ValidationError::OutOfRange {
                    value: number,
                    min,
                    max,
                });
            }
        }

        if let Some(allowed) = &attributes.allowed_values {
            let candidates: Vec<&Value> = match value {
                Value::Array(items) => items.iter().collect(),
                scalar => vec![scalar],
            };
            if let Some(rejected) = candidates.into_iter().find(|v| !allowed.contains(v)) {
                return Err(ValidationError::NotAllowed {
                    value: rejected.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Register a callback fired after every successful write.
    ///
    /// Registrations last as long as the property.
    pub fn on_change(&self, callback: impl Fn() + Send + Sync + 'static) {
        lock(&self.inner.callbacks).push(Arc::new(callback));
    }

    /// Invalidate this property whenever `dependency` is written.
    pub fn reset_on_change(&self, dependency: &LocalProperty) {
        let dependent: Weak<PropertyInner> = Arc::downgrade(&self.inner);
        dependency.on_change(move || {
            if let Some(inner) = dependent.upgrade() {
                inner.invalidate();
            }
        });
    }

    /// Drop the cached value as if a dependency had changed
    pub fn invalidate(&self) {
        self.inner.invalidate();
    }

    fn fire_callbacks(&self) {
        let callbacks: Vec<ChangeCallback> = lock(&self.inner.callbacks).clone();
        for callback in callbacks {
            callback();
        }
    }
}

/// Member declaration inside a [`LocalPropertyBuilder`]
#[derive(Clone)]
enum MemberBuilder {
    Property(LocalPropertyBuilder),
    Collection(LocalCollectionBuilder),
}

/// Declarative description of a local property.
///
/// Cloneable so collections can stamp out one property per item.
#[derive(Clone)]
pub struct LocalPropertyBuilder {
    name: String,
    attributes: Attributes,
    default: Option<DefaultFn>,
    availability: Option<AvailabilityFn>,
    reset_on_change: Vec<String>,
    members: Vec<MemberBuilder>,
}

impl LocalPropertyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::default(),
            default: None,
            availability: None,
            reset_on_change: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Inclusive numeric range
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.attributes.range = Some((min, max));
        self
    }

    pub fn allowed_values(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.attributes.allowed_values = Some(values.into_iter().collect());
        self
    }

    /// Fixed value returned until the first write
    pub fn default_value(self, value: Value) -> Self {
        self.default_with(move |_| value.clone())
    }

    /// Value computed on first read and after every invalidation.
    ///
    /// The function may read the parent or sibling properties; reading the
    /// property being computed recurses without end.
    pub fn default_with(
        mut self,
        default: impl Fn(&LocalProperty) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.default = Some(Arc::new(default));
        self
    }

    pub fn available_when(
        mut self,
        predicate: impl Fn(&LocalProperty) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.availability = Some(Arc::new(predicate));
        self
    }

    /// Invalidate this property when the named sibling is written
    pub fn reset_on_change(mut self, sibling: impl Into<String>) -> Self {
        self.reset_on_change.push(sibling.into());
        self
    }

    pub fn child(mut self, child: LocalPropertyBuilder) -> Self {
        self.members.push(MemberBuilder::Property(child));
        self
    }

    /// Named collection member whose items are built from `item`
    pub fn collection(mut self, name: impl Into<String>, item: LocalPropertyBuilder) -> Self {
        self.members.push(MemberBuilder::Collection(LocalCollectionBuilder::new(
            name, item,
        )));
        self
    }

    pub fn build(self) -> LocalProperty {
        if !self.reset_on_change.is_empty() {
            warn!(
                property = %self.name,
                "reset-on-change dependencies ignored on a root property"
            );
        }
        self.build_with_parent(None)
    }

    pub(crate) fn build_with_parent(self, parent: Option<Weak<PropertyInner>>) -> LocalProperty {
        let LocalPropertyBuilder {
            name,
            attributes,
            default,
            availability,
            reset_on_change,
            members,
        } = self;

        let inner = Arc::new_cyclic(|weak: &Weak<PropertyInner>| {
            let children = members
                .into_iter()
                .map(|member| match member {
                    MemberBuilder::Property(builder) => {
                        LocalNode::Property(builder.build_with_parent(Some(weak.clone())))
                    }
                    MemberBuilder::Collection(builder) => {
                        LocalNode::Collection(LocalCollection::from_builder(builder, weak.clone()))
                    }
                })
                .collect();

            PropertyInner {
                name,
                parent,
                attributes,
                default,
                availability,
                reset_on_change,
                children,
                cell: Mutex::new(Cell {
                    state: CacheState::Unset,
                    value: Value::Null,
                }),
                callbacks: Mutex::new(Vec::new()),
            }
        });

        let property = LocalProperty { inner };
        property.wire_dependencies();
        property
    }

    /// Name this builder will give its property
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl LocalProperty {
    fn wire_dependencies(&self) {
        for child in &self.inner.children {
            let LocalNode::Property(dependent) = child else {
                continue;
            };
            for sibling in &dependent.inner.reset_on_change {
                match self.find(sibling) {
                    Some(LocalNode::Property(dependency)) => dependent.reset_on_change(dependency),
                    _ => warn!(
                        property = %dependent.name(),
                        dependency = %sibling,
                        "reset-on-change dependency is not a sibling property"
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plot() -> LocalProperty {
        LocalProperty::builder("plot")
            .child(LocalProperty::builder("field").default_value(json!("pressure")))
            .child(
                LocalProperty::builder("levels")
                    .range(0.0, 10.0)
                    .reset_on_change("field"),
            )
            .child(
                LocalProperty::builder("coloring")
                    .allowed_values([json!("banded"), json!("smooth")])
                    .default_value(json!("smooth")),
            )
            .build()
    }

    fn member(parent: &LocalProperty, name: &str) -> LocalProperty {
        parent
            .get(name)
            .unwrap()
            .unwrap()
            .as_property()
            .unwrap()
            .clone()
    }

    #[test]
    fn test_leaf_reads_scalar_and_caches() {
        let field = LocalProperty::builder("field")
            .default_value(json!("pressure"))
            .build();
        assert_eq!(field.cache_state(), CacheState::Unset);
        assert_eq!(field.get_state(false), State::Scalar(json!("pressure")));
        assert_eq!(field.cache_state(), CacheState::Cached);
    }

    #[test]
    fn test_unwritten_leaf_without_default_is_null() {
        let levels = LocalProperty::builder("levels").build();
        assert_eq!(levels.value(), Value::Null);
        assert_eq!(levels.cache_state(), CacheState::Unset);
    }

    #[test]
    fn test_invalidation_cycle() {
        let plot = plot();
        let levels = member(&plot, "levels");
        let field = member(&plot, "field");

        assert_eq!(levels.cache_state(), CacheState::Unset);
        levels.set_state(json!(5)).unwrap();
        assert_eq!(levels.cache_state(), CacheState::Cached);

        field.set_state(json!("velocity")).unwrap();
        assert_eq!(levels.cache_state(), CacheState::Invalidated);

        // no default declared: the recomputed value is empty
        assert_eq!(levels.value(), Value::Null);
        levels.set_state(json!(7)).unwrap();
        assert_eq!(levels.cache_state(), CacheState::Cached);
        assert_eq!(levels.value(), json!(7));
    }

    #[test]
    fn test_invalidated_default_is_recomputed() {
        let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let seen = Arc::clone(&counter);
        let root = LocalProperty::builder("mesh")
            .child(LocalProperty::builder("surface"))
            .child(
                LocalProperty::builder("size")
                    .default_with(move |_| {
                        json!(seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst))
                    })
                    .reset_on_change("surface"),
            )
            .build();
        let size = member(&root, "size");
        assert_eq!(size.value(), json!(0));
        assert_eq!(size.value(), json!(0));

        member(&root, "surface").set_state(json!("wall")).unwrap();
        assert_eq!(size.cache_state(), CacheState::Invalidated);
        assert_eq!(size.value(), json!(1));
        assert_eq!(size.cache_state(), CacheState::Cached);
    }

    #[test]
    fn test_range_error_keeps_previous_value() {
        let plot = plot();
        let levels = member(&plot, "levels");
        levels.set_state(json!(4)).unwrap();

        let err = levels.set_state(json!(11)).unwrap_err();
        assert!(matches!(
            err,
            MeshlinkError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert_eq!(levels.value(), json!(4));

        // bounds are inclusive
        levels.set_state(json!(10)).unwrap();
        levels.set_state(json!(0.0)).unwrap();
    }

    #[test]
    fn test_type_must_match_previous_value() {
        let label = LocalProperty::builder("label").build();
        label.set_state(json!("inlet")).unwrap();
        let err = label.set_state(json!(3)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value: expected a string value, got number"
        );
        assert_eq!(label.value(), json!("inlet"));
    }

    #[test]
    fn test_allowed_values() {
        let plot = plot();
        let coloring = member(&plot, "coloring");
        assert!(coloring.set_state(json!("banded")).is_ok());
        assert!(coloring.set_state(json!("rainbow")).is_err());

        let surfaces = LocalProperty::builder("surfaces")
            .allowed_values([json!("inlet"), json!("outlet"), json!("wall")])
            .build();
        assert!(surfaces.set_state(json!(["inlet", "wall"])).is_ok());
        let err = surfaces.set_state(json!(["inlet", "symmetry"])).unwrap_err();
        assert!(matches!(
            err,
            MeshlinkError::Validation(ValidationError::NotAllowed { ref value }) if value == "\"symmetry\""
        ));
        assert_eq!(surfaces.value(), json!(["inlet", "wall"]));
    }

    #[test]
    fn test_composite_read_and_member_wise_write() {
        let plot = plot();
        plot.set_state(json!({"field": "temperature", "levels": 3}))
            .unwrap();
        assert_eq!(
            plot.get_state(false).into_value(),
            json!({"field": "temperature", "levels": 3, "coloring": "smooth"})
        );
    }

    #[test]
    fn test_write_to_unknown_member_is_an_error() {
        let plot = plot();
        let err = plot.set_state(json!({"colour": "red"})).unwrap_err();
        assert!(matches!(err, MeshlinkError::UnknownAttribute { ref name, .. } if name == "colour"));
    }

    #[test]
    fn test_read_with_attributes() {
        let state = plot().get_state(true);
        assert_eq!(state.get("levels.range"), Some(&State::Scalar(json!([0.0, 10.0]))));
        assert_eq!(
            state.get("coloring.allowed_values"),
            Some(&State::Scalar(json!(["banded", "smooth"])))
        );
        assert!(state.get("field.range").is_none());
    }

    #[test]
    fn test_availability_gates_member_access() {
        let plot = LocalProperty::builder("plot")
            .child(LocalProperty::builder("filled").default_value(json!(false)))
            .child(LocalProperty::builder("fill_color").available_when(|property| {
                property
                    .parent()
                    .and_then(|parent| parent.get("filled").ok().flatten())
                    .and_then(|node| node.as_property().map(LocalProperty::value))
                    == Some(json!(true))
            }))
            .build();

        assert!(plot.get("fill_color").unwrap().is_none());
        assert!(plot.get_state(false).get("fill_color").is_none());

        member(&plot, "filled").set_state(json!(true)).unwrap();
        assert!(plot.get("fill_color").unwrap().is_some());
        assert!(plot.get("no_such_member").is_err());
    }

    #[test]
    fn test_callbacks_fire_after_every_write() {
        let hits = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let property = LocalProperty::builder("x").build();
        let counter = Arc::clone(&hits);
        property.on_change(move || {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

        property.set_state(json!(1)).unwrap();
        property.set_state(json!(2)).unwrap();
        let _ = property.set_state(json!("bad"));
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn test_declared_default_fixes_the_type_before_any_read() {
        let field = LocalProperty::builder("field")
            .default_value(json!("pressure"))
            .build();

        let err = field.set_state(json!(3)).unwrap_err();
        assert!(matches!(
            err,
            MeshlinkError::Validation(ValidationError::TypeMismatch {
                expected: "string",
                found: "number"
            })
        ));
        // the check does not cache the default
        assert_eq!(field.cache_state(), CacheState::Unset);

        assert_eq!(field.value(), json!("pressure"));
        assert!(field.set_state(json!(3)).is_err());
        field.set_state(json!("velocity")).unwrap();
    }

    #[test]
    fn test_write_during_default_computation_is_kept() {
        for _ in 0..50 {
            let levels = LocalProperty::builder("levels")
                .default_with(|_| {
                    std::thread::sleep(std::time::Duration::from_millis(1));
                    json!(0)
                })
                .build();

            std::thread::scope(|scope| {
                let reader = levels.clone();
                scope.spawn(move || reader.value());
                let writer = levels.clone();
                scope.spawn(move || writer.set_state(json!(7)).unwrap());
            });

            assert_eq!(levels.value(), json!(7));
            assert_eq!(levels.cache_state(), CacheState::Cached);
        }
    }

    #[test]
    fn test_default_may_read_a_sibling() {
        let plot = LocalProperty::builder("plot")
            .child(LocalProperty::builder("field").default_value(json!("pressure")))
            .child(LocalProperty::builder("title").default_with(|title| {
                let field = title
                    .parent()
                    .and_then(|parent| parent.get("field").ok().flatten())
                    .and_then(|node| node.as_property().map(LocalProperty::value))
                    .unwrap_or(Value::Null);
                json!(format!("Contours of {}", field.as_str().unwrap_or("nothing")))
            }))
            .build();

        assert_eq!(member(&plot, "title").value(), json!("Contours of pressure"));
    }
}
