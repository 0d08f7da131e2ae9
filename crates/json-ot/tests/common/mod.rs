//! Shared fixtures: one document shape and a seed-driven operation builder
//! that only produces operations valid against the document it is given.

#![allow(dead_code)]

use json_ot::{ArrayOp, BooleanOp, NullOp, NumberOp, ObjectOp, Operation, OtError, StringOp};
use json_ot_pointer::{Path, PathStep};
use proptest::prelude::*;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct OpSeed {
    pub target: u8,
    pub kind: u8,
    pub p1: f64,
    pub p2: f64,
    pub text: String,
    pub number: i32,
}

pub fn op_seed() -> impl Strategy<Value = OpSeed> {
    (
        0u8..8,
        0u8..4,
        0.0..1.0f64,
        0.0..1.0f64,
        "[a-e]{1,3}",
        -20i32..20,
    )
        .prop_map(|(target, kind, p1, p2, text, number)| OpSeed {
            target,
            kind,
            p1,
            p2,
            text,
            number,
        })
}

pub fn origin() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("a"), Just("b")]
}

/// A whole number or one with a fractional part that `f64` cannot hold
/// exactly.
pub fn number() -> impl Strategy<Value = Value> {
    prop_oneof![
        (-50i64..50).prop_map(|n| json!(n)),
        (-50i32..50).prop_map(|n| json!(fraction(n))),
    ]
}

pub fn fraction(n: i32) -> f64 {
    f64::from(n) / 10.0 + 0.05
}

pub fn base_doc() -> impl Strategy<Value = Value> {
    (
        "[a-e]{0,6}",
        prop::collection::vec("[a-e]{1,3}", 0..4),
        number(),
        any::<bool>(),
    )
        .prop_map(|(text, list, n, flag)| {
            json!({
                "text": text,
                "list": list,
                "obj": {"x": 1, "y": 2},
                "n": n,
                "flag": flag,
                "nil": null
            })
        })
}

pub fn path(keys: &[&str]) -> Path {
    keys.iter().map(|k| PathStep::from(*k)).collect()
}

/// Index in `0..n` picked by `p`. `n` must be non-zero.
fn pick(p: f64, n: usize) -> usize {
    ((p * n as f64) as usize).min(n - 1)
}

/// Build an operation that applies cleanly to `doc`.
pub fn build(doc: &Value, seed: &OpSeed) -> Operation {
    let list = doc["list"].as_array().cloned().unwrap_or_default();
    match seed.target {
        1 => array_op(&list, seed),
        2 if !list.is_empty() => {
            let i = seed.number.unsigned_abs() as usize % list.len();
            let element = list[i].as_str().unwrap_or_default();
            string_op(vec![PathStep::from("list"), PathStep::from(i)], element, seed)
        }
        3 => match doc.get("obj") {
            Some(obj) => object_op(obj, seed),
            None => root_op(seed, false),
        },
        4 => root_op(seed, doc.get("obj").is_some() && seed.kind % 2 == 1),
        5 => Operation::new(path(&["n"]), number_op(&doc["n"], seed)),
        6 => Operation::new(path(&["flag"]), BooleanOp::Set { value: seed.kind % 2 == 0 }),
        7 => Operation::new(path(&["nil"]), NullOp::Set),
        _ => string_op(path(&["text"]), doc["text"].as_str().unwrap_or_default(), seed),
    }
}

pub fn string_op(at: Path, current: &str, seed: &OpSeed) -> Operation {
    let chars: Vec<char> = current.chars().collect();
    let len = chars.len();
    if seed.kind % 2 == 0 || len == 0 {
        let index = pick(seed.p1, len + 1);
        return Operation::new(at, StringOp::insert(index, seed.text.as_str()));
    }
    let start = pick(seed.p1, len);
    let count = 1 + pick(seed.p2, len - start);
    let removed: String = chars[start..start + count].iter().collect();
    Operation::new(at, StringOp::remove(start, removed))
}

/// Adds only land on whole numbers; everything else becomes a set, half of
/// them fractional.
pub fn number_op(current: &Value, seed: &OpSeed) -> NumberOp {
    let whole = current.as_f64().is_some_and(|n| n.fract() == 0.0);
    match seed.kind {
        0 | 2 if whole => NumberOp::Add { delta: i64::from(seed.number) },
        1 => NumberOp::Set { value: f64::from(seed.number) },
        _ => NumberOp::Set { value: fraction(seed.number) },
    }
}

fn array_op(list: &[Value], seed: &OpSeed) -> Operation {
    let len = list.len();
    let kind = match seed.kind {
        _ if len == 0 => ArrayOp::Insert { index: 0, value: json!(seed.text) },
        0 => ArrayOp::Insert { index: pick(seed.p1, len + 1), value: json!(seed.text) },
        1 => ArrayOp::Remove { index: pick(seed.p1, len) },
        2 => ArrayOp::Set { index: pick(seed.p1, len), value: json!(seed.text) },
        _ => ArrayOp::Move { from: pick(seed.p1, len), to: pick(seed.p2, len) },
    };
    Operation::new(path(&["list"]), kind)
}

fn object_op(obj: &Value, seed: &OpSeed) -> Operation {
    let key = ["x", "y", "z"][pick(seed.p1, 3)];
    let kind = if seed.kind % 2 == 0 || obj.get(key).is_none() {
        ObjectOp::SetProperty { key: key.into(), value: json!(seed.number) }
    } else {
        ObjectOp::RemoveProperty { key: key.into() }
    };
    Operation::new(path(&["obj"]), kind)
}

fn root_op(seed: &OpSeed, remove: bool) -> Operation {
    let kind = if remove {
        ObjectOp::RemoveProperty { key: "obj".into() }
    } else {
        ObjectOp::SetProperty { key: "obj".into(), value: json!({"x": seed.number}) }
    };
    Operation::new(vec![], kind)
}

/// Apply `ops` in order to a copy of `doc`.
pub fn apply_all<'a>(
    doc: &Value,
    ops: impl IntoIterator<Item = &'a Operation>,
) -> Result<Value, OtError> {
    let mut out = doc.clone();
    for op in ops {
        json_ot::apply_operation(&mut out, op)?;
    }
    Ok(out)
}

/// Build `seeds` one after another, each against the result of the last.
pub fn build_sequence(doc: &Value, seeds: &[OpSeed]) -> Vec<Operation> {
    let mut current = doc.clone();
    let mut ops = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let op = build(&current, seed);
        json_ot::apply_operation(&mut current, &op).expect("built operation must apply");
        ops.push(op);
    }
    ops
}
