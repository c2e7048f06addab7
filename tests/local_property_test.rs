/*!
 * Integration tests for client-held properties and collections
 */

use meshlink::local::{CacheState, LocalCollection, LocalNode, LocalProperty, State, ValidationError};
use meshlink::MeshlinkError;
use serde_json::json;

fn contour() -> LocalProperty {
    LocalProperty::builder("contour")
        .child(LocalProperty::builder("field").default_value(json!("pressure")))
        .child(
            LocalProperty::builder("levels")
                .range(0.0, 10.0)
                .default_with(|_| json!(5))
                .reset_on_change("field"),
        )
        .child(
            LocalProperty::builder("surfaces")
                .allowed_values([json!("inlet"), json!("outlet"), json!("wall")]),
        )
        .collection(
            "clip_planes",
            LocalProperty::builder("plane")
                .child(LocalProperty::builder("offset").range(-1.0, 1.0)),
        )
        .build()
}

fn property(parent: &LocalProperty, name: &str) -> LocalProperty {
    match parent.get(name) {
        Ok(Some(LocalNode::Property(property))) => property,
        other => panic!("{name} is not an available property: {other:?}"),
    }
}

#[test]
fn test_invalidation_state_machine() {
    let contour = contour();
    let levels = property(&contour, "levels");
    let field = property(&contour, "field");

    assert_eq!(levels.cache_state(), CacheState::Unset);
    levels.set_state(json!(8)).unwrap();
    assert_eq!(levels.cache_state(), CacheState::Cached);
    assert_eq!(levels.value(), json!(8));

    field.set_state(json!("temperature")).unwrap();
    assert_eq!(levels.cache_state(), CacheState::Invalidated);

    // next read recomputes the default
    assert_eq!(levels.value(), json!(5));
    assert_eq!(levels.cache_state(), CacheState::Cached);
}

#[test]
fn test_out_of_range_write_keeps_cached_value() {
    let contour = contour();
    let levels = property(&contour, "levels");
    levels.set_state(json!(3)).unwrap();

    let err = levels.set_state(json!(11)).unwrap_err();
    match err {
        MeshlinkError::Validation(ValidationError::OutOfRange { value, min, max }) => {
            assert_eq!((value, min, max), (11.0, 0.0, 10.0));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(levels.value(), json!(3));
    assert_eq!(levels.cache_state(), CacheState::Cached);
}

#[test]
fn test_allowed_values_scalar_and_list() {
    let contour = contour();
    let surfaces = property(&contour, "surfaces");

    assert!(surfaces.set_state(json!("symmetry")).is_err());
    assert!(surfaces.set_state(json!(["inlet", "symmetry"])).is_err());
    surfaces.set_state(json!(["inlet", "outlet"])).unwrap();
    assert_eq!(surfaces.value(), json!(["inlet", "outlet"]));
}

#[test]
fn test_aggregated_state_with_attributes() {
    let contour = contour();
    contour
        .set_state(json!({"levels": 2, "surfaces": ["wall"]}))
        .unwrap();

    let state = contour.get_state(true);
    assert!(state.is_composite());
    assert_eq!(state.get("levels"), Some(&State::Scalar(json!(2))));
    assert_eq!(state.get("levels.range"), Some(&State::Scalar(json!([0.0, 10.0]))));
    assert_eq!(
        state.get("surfaces.allowed_values"),
        Some(&State::Scalar(json!(["inlet", "outlet", "wall"])))
    );
    assert_eq!(state.get("clip_planes"), Some(&State::Composite(Default::default())));

    let plain = contour.get_state(false).into_value();
    assert_eq!(
        plain,
        json!({
            "field": "pressure",
            "levels": 2,
            "surfaces": ["wall"],
            "clip_planes": {}
        })
    );
}

#[test]
fn test_nested_collection_through_parent() {
    let contour = contour();
    let planes = match contour.get("clip_planes").unwrap() {
        Some(LocalNode::Collection(collection)) => collection,
        other => panic!("clip_planes is not a collection: {other:?}"),
    };

    contour
        .set_state(json!({"clip_planes": {"z0": {"offset": 0.25}}}))
        .unwrap();
    assert_eq!(planes.names(), vec!["z0"]);

    let plane = planes.get_item("z0");
    assert_eq!(plane.parent().map(|p| p.name().to_string()), Some("contour".to_string()));
    assert!(planes.set_item("z1", json!({"offset": 2.0})).is_err());
}

#[test]
fn test_collection_eviction_is_local_only() {
    let planes = LocalCollection::new(
        "planes",
        LocalProperty::builder("plane").child(LocalProperty::builder("offset")),
    );
    planes.set_item("a", json!({"offset": 0.1})).unwrap();
    planes.set_item("b", json!({"offset": 0.2})).unwrap();

    assert!(planes.del_item("a").is_some());
    assert_eq!(planes.names(), vec!["b"]);
    assert_eq!(
        planes.get_state(false).into_value(),
        json!({"b": {"offset": 0.2}})
    );
}
