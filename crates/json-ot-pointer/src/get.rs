use serde_json::Value;

use crate::types::PathStep;

/// Get a value from a JSON document by path.
///
/// Returns `None` if a step does not resolve: a missing key, an index past
/// the end, or a step whose kind does not match the container.
pub fn get<'a>(val: &'a Value, path: &[PathStep]) -> Option<&'a Value> {
    let mut current = val;
    for step in path {
        current = match (step, current) {
            (PathStep::Key(k), Value::Object(map)) => map.get(k)?,
            (PathStep::Index(i), Value::Array(arr)) => arr.get(*i)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Get a mutable reference to a value in a JSON document by path.
pub fn get_mut<'a>(val: &'a mut Value, path: &[PathStep]) -> Option<&'a mut Value> {
    let mut current = val;
    for step in path {
        current = match (step, current) {
            (PathStep::Key(k), Value::Object(map)) => map.get_mut(k)?,
            (PathStep::Index(i), Value::Array(arr)) => arr.get_mut(*i)?,
            _ => return None,
        };
    }
    Some(current)
}
