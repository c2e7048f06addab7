/*!
 * Conversion between local JSON values and the datamodel `Variant`
 */

use meshlink_proto::{variant::Kind, Variant, VariantMap, VariantVector};
use serde_json::{Map, Number, Value};

/// Encode a local value.
///
/// `Null` encodes to a `Variant` with no tag set. Integers that fit in `i64`
/// use `int64_state`, every other number uses `double_state`.
pub fn to_wire(value: &Value) -> Variant {
    let kind = match value {
        Value::Null => None,
        // bool is matched on its own tag, never folded into numbers
        Value::Bool(b) => Some(Kind::BoolState(*b)),
        Value::Number(n) => number_to_kind(n),
        Value::String(s) => Some(Kind::StringState(s.clone())),
        Value::Array(items) => Some(Kind::VariantVectorState(VariantVector {
            item: items.iter().map(to_wire).collect(),
        })),
        Value::Object(map) => Some(Kind::VariantMapState(map_to_wire(map))),
    };
    Variant { kind }
}

fn number_to_kind(n: &Number) -> Option<Kind> {
    if let Some(i) = n.as_i64() {
        Some(Kind::Int64State(i))
    } else {
        n.as_f64().map(Kind::DoubleState)
    }
}

/// Encode a string-keyed map field by field.
pub fn map_to_wire(map: &Map<String, Value>) -> VariantMap {
    VariantMap {
        item: map
            .iter()
            .map(|(key, value)| (key.clone(), to_wire(value)))
            .collect(),
    }
}

/// Decode a wire value. An unset tag decodes to `Null`.
pub fn from_wire(variant: &Variant) -> Value {
    match &variant.kind {
        None => Value::Null,
        Some(Kind::BoolState(b)) => Value::Bool(*b),
        Some(Kind::Int64State(i)) => Value::Number(Number::from(*i)),
        Some(Kind::DoubleState(f)) => Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::StringState(s)) => Value::String(s.clone()),
        Some(Kind::VariantVectorState(vector)) => {
            Value::Array(vector.item.iter().map(from_wire).collect())
        }
        Some(Kind::VariantMapState(map)) => Value::Object(map_from_wire(map)),
    }
}

pub fn map_from_wire(map: &VariantMap) -> Map<String, Value> {
    map.item
        .iter()
        .map(|(key, value)| (key.clone(), from_wire(value)))
        .collect()
}

/// Decode an optional message field; a missing field is `Null`.
pub fn from_wire_opt(variant: Option<&Variant>) -> Value {
    variant.map(from_wire).unwrap_or(Value::Null)
}

/// Decode a value that should be a list of strings; anything else is empty.
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
