//! Applying operations to a JSON document.
//!
//! Every check runs before the document is touched, so a failing operation
//! leaves the value unchanged.

use json_ot_pointer::{format_json_pointer, get_mut};
use serde_json::{Number, Value};

use crate::error::OtError;
use crate::operation::{
    ArrayOp, BooleanOp, NullOp, NumberOp, ObjectOp, OpKind, Operation, StringOp, ValueType,
};

/// Apply a single operation to `doc` in place. No-ops apply as nothing.
pub fn apply_operation(doc: &mut Value, op: &Operation) -> Result<(), OtError> {
    if op.is_noop() {
        return Ok(());
    }
    let target = get_mut(doc, op.path()).ok_or_else(|| {
        OtError::precondition(format!(
            "path \"{}\" does not resolve",
            format_json_pointer(op.path())
        ))
    })?;
    let found = ValueType::of(target);
    if found != op.value_type() {
        return Err(OtError::precondition(format!(
            "{op} targets a {} value",
            found.as_str()
        )));
    }
    match (op.kind(), target) {
        (OpKind::String(kind), Value::String(s)) => apply_string(s, kind),
        (OpKind::Array(kind), Value::Array(arr)) => apply_array(arr, kind),
        (OpKind::Object(kind), Value::Object(map)) => {
            match kind {
                ObjectOp::SetProperty { key, value } => {
                    map.insert(key.clone(), value.clone());
                }
                ObjectOp::RemoveProperty { key } => {
                    map.remove(key).ok_or_else(|| {
                        OtError::precondition(format!("missing property \"{key}\""))
                    })?;
                }
            }
            Ok(())
        }
        (OpKind::Number(kind), target @ Value::Number(_)) => {
            *target = match kind {
                NumberOp::Add { delta } => {
                    let base = integer_value(target).ok_or_else(|| {
                        OtError::precondition(format!("{op} needs an integer, found {target}"))
                    })?;
                    let sum = base.checked_add(*delta).ok_or_else(|| {
                        OtError::precondition(format!("{base} + {delta} overflows"))
                    })?;
                    Value::from(sum)
                }
                NumberOp::Set { value } => number_value(*value)?,
            };
            Ok(())
        }
        (OpKind::Boolean(BooleanOp::Set { value }), target) => {
            *target = Value::Bool(*value);
            Ok(())
        }
        (OpKind::Null(NullOp::Set), target) => {
            *target = Value::Null;
            Ok(())
        }
        _ => Err(OtError::precondition(format!("{op} cannot apply here"))),
    }
}

fn apply_string(s: &mut String, op: &StringOp) -> Result<(), OtError> {
    let len = s.chars().count();
    match op {
        StringOp::Insert { index, text } => {
            if *index > len {
                return Err(OtError::precondition(format!(
                    "string insert at {index} past length {len}"
                )));
            }
            let at = byte_offset(s, *index);
            s.insert_str(at, text);
        }
        StringOp::Remove { index, text } => {
            let count = text.chars().count();
            let end = index.checked_add(count).filter(|end| *end <= len).ok_or_else(|| {
                OtError::precondition(format!(
                    "string remove of {count} at {index} past length {len}"
                ))
            })?;
            let start = byte_offset(s, *index);
            let end = byte_offset(s, end);
            if &s[start..end] != text.as_str() {
                return Err(OtError::precondition(format!(
                    "removed text {:?} does not match {:?} at {index}",
                    text,
                    &s[start..end]
                )));
            }
            s.replace_range(start..end, "");
        }
    }
    Ok(())
}

fn apply_array(arr: &mut Vec<Value>, op: &ArrayOp) -> Result<(), OtError> {
    let len = arr.len();
    let out_of_range = |index: usize, limit: usize| {
        OtError::precondition(format!("array index {index} out of range (limit {limit})"))
    };
    match op {
        ArrayOp::Insert { index, value } => {
            if *index > len {
                return Err(out_of_range(*index, len));
            }
            arr.insert(*index, value.clone());
        }
        ArrayOp::Remove { index } => {
            if *index >= len {
                return Err(out_of_range(*index, len));
            }
            arr.remove(*index);
        }
        ArrayOp::Set { index, value } => {
            let slot = arr.get_mut(*index).ok_or_else(|| out_of_range(*index, len))?;
            *slot = value.clone();
        }
        ArrayOp::Move { from, to, .. } => {
            if *from >= len {
                return Err(out_of_range(*from, len));
            }
            if *to >= len {
                return Err(out_of_range(*to, len));
            }
            let element = arr.remove(*from);
            arr.insert(*to, element);
        }
    }
    Ok(())
}

fn byte_offset(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Largest magnitude up to which every integer has an exact `f64`.
const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// `n` as an `i64` when it is a whole number `f64` holds exactly.
pub(crate) fn exact_integer(n: f64) -> Option<i64> {
    let limit = MAX_SAFE_INTEGER as f64;
    (n.fract() == 0.0 && n.abs() <= limit).then_some(n as i64)
}

/// `value + delta` when the sum can be written as a set without rounding.
pub(crate) fn exact_sum(value: f64, delta: i64) -> Option<f64> {
    let sum = exact_integer(value)?.checked_add(delta)?;
    (sum.abs() <= MAX_SAFE_INTEGER).then_some(sum as f64)
}

fn integer_value(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().and_then(exact_integer))
}

/// Integral results stay integers so `1 + 2` reads back as `3`, not `3.0`.
pub(crate) fn number_value(n: f64) -> Result<Value, OtError> {
    if let Some(i) = exact_integer(n) {
        return Ok(Value::from(i));
    }
    Number::from_f64(n)
        .map(Value::Number)
        .ok_or_else(|| OtError::precondition(format!("{n} is not a finite number")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use json_ot_pointer::PathStep;
    use serde_json::json;

    fn op(path: &[&str], kind: impl Into<OpKind>) -> Operation {
        Operation::new(path.iter().map(|k| PathStep::from(*k)).collect(), kind)
    }

    #[test]
    fn string_insert_and_remove_use_char_offsets() {
        let mut doc = json!({"t": "héllo"});
        apply_operation(&mut doc, &op(&["t"], StringOp::insert(2, "X"))).unwrap();
        assert_eq!(doc, json!({"t": "héXllo"}));
        apply_operation(&mut doc, &op(&["t"], StringOp::remove(1, "éX"))).unwrap();
        assert_eq!(doc, json!({"t": "hllo"}));
    }

    #[test]
    fn string_remove_checks_text() {
        let mut doc = json!({"t": "hello"});
        let err = apply_operation(&mut doc, &op(&["t"], StringOp::remove(0, "x"))).unwrap_err();
        assert!(matches!(err, OtError::PreconditionViolation(_)));
        assert_eq!(doc, json!({"t": "hello"}));
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut doc = json!([1, 2, 3]);
        let bad = [
            Operation::new(vec![], ArrayOp::Insert { index: 4, value: json!(0) }),
            Operation::new(vec![], ArrayOp::Remove { index: 3 }),
            Operation::new(vec![], ArrayOp::Set { index: 3, value: json!(0) }),
            Operation::new(vec![], ArrayOp::Move { from: 0, to: 3 }),
        ];
        for op in bad {
            assert!(apply_operation(&mut doc, &op).is_err(), "{op} must fail");
        }
        assert_eq!(doc, json!([1, 2, 3]));
    }

    #[test]
    fn array_move_lands_at_post_removal_index() {
        let mut doc = json!(["a", "b", "c", "d"]);
        let mv = Operation::new(vec![], ArrayOp::Move { from: 0, to: 2 });
        apply_operation(&mut doc, &mv).unwrap();
        assert_eq!(doc, json!(["b", "c", "a", "d"]));
    }

    #[test]
    fn object_and_scalars() {
        let mut doc = json!({"n": 1, "b": false, "z": null});
        apply_operation(&mut doc, &op(&["n"], NumberOp::Add { delta: 2 })).unwrap();
        apply_operation(&mut doc, &op(&["b"], BooleanOp::Set { value: true })).unwrap();
        apply_operation(&mut doc, &op(&["z"], NullOp::Set)).unwrap();
        apply_operation(
            &mut doc,
            &op(&[], ObjectOp::SetProperty { key: "k".into(), value: json!("v") }),
        )
        .unwrap();
        assert_eq!(doc, json!({"n": 3, "b": true, "z": null, "k": "v"}));
        let missing = op(&[], ObjectOp::RemoveProperty { key: "nope".into() });
        assert!(apply_operation(&mut doc, &missing).is_err());
    }

    #[test]
    fn type_mismatch_is_a_precondition_violation() {
        let mut doc = json!({"n": "not a number"});
        let err = apply_operation(&mut doc, &op(&["n"], NumberOp::Add { delta: 1 })).unwrap_err();
        assert!(matches!(err, OtError::PreconditionViolation(_)));
    }

    #[test]
    fn noop_applies_as_nothing() {
        let mut doc = json!({"t": "x"});
        let noop = op(&["missing"], StringOp::insert(9, "y")).into_noop();
        apply_operation(&mut doc, &noop).unwrap();
        assert_eq!(doc, json!({"t": "x"}));
    }

    #[test]
    fn remove_far_past_the_end_is_rejected() {
        let mut doc = json!("abc");
        let huge = Operation::new(vec![], StringOp::remove(usize::MAX, "a"));
        let err = apply_operation(&mut doc, &huge).unwrap_err();
        assert!(matches!(err, OtError::PreconditionViolation(_)));
        assert_eq!(doc, json!("abc"));
    }

    #[test]
    fn add_needs_an_integer_and_stays_exact() {
        let mut doc = json!({"n": 0.1, "m": 9_007_199_254_740_993i64, "f": 4.0});
        let err = apply_operation(&mut doc, &op(&["n"], NumberOp::Add { delta: 1 })).unwrap_err();
        assert!(matches!(err, OtError::PreconditionViolation(_)));

        apply_operation(&mut doc, &op(&["m"], NumberOp::Add { delta: 2 })).unwrap();
        assert_eq!(doc["m"], json!(9_007_199_254_740_995i64));
        apply_operation(&mut doc, &op(&["f"], NumberOp::Add { delta: -1 })).unwrap();
        assert_eq!(doc["f"], json!(3));

        let overflow = op(&["m"], NumberOp::Add { delta: i64::MAX });
        assert!(apply_operation(&mut doc, &overflow).is_err());
        assert_eq!(doc["m"], json!(9_007_199_254_740_995i64));
    }

    #[test]
    fn exact_sums_only_for_whole_values() {
        assert_eq!(exact_sum(4.0, -6), Some(-2.0));
        assert_eq!(exact_sum(0.5, 1), None);
        assert_eq!(exact_sum(9_007_199_254_740_991.0, 1), None);
    }

    #[test]
    fn fractional_numbers_stay_floats() {
        assert_eq!(number_value(2.5).unwrap(), json!(2.5));
        assert_eq!(number_value(-4.0).unwrap(), json!(-4));
        assert!(number_value(f64::NAN).is_err());
    }
}
