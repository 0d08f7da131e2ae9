//! Property tests for the transformation registry, the composer and the
//! reference transformer.

mod common;

use common::{apply_all, base_doc, build, build_sequence, number, number_op, op_seed, origin, path};
use json_ot::{
    compose, transform, transform_patch, transform_reference, Anchor, Operation, Patch, RefState,
    Reference, StringOp, SyncController, SyncOptions,
};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Both orders of applying a concurrent pair end in the same document.
    #[test]
    fn concurrent_pairs_converge(
        doc in base_doc(),
        s in op_seed(),
        c in op_seed(),
        so in origin(),
        co in origin(),
    ) {
        let server = build(&doc, &s).with_origin(so);
        let client = build(&doc, &c).with_origin(co);
        let (s2, c2) = transform(&server, &client).expect("pair must transform");

        let left = apply_all(&doc, std::iter::once(&server).chain(&c2))
            .unwrap_or_else(|e| panic!("server then {c2:?}: {e}"));
        let right = apply_all(&doc, std::iter::once(&client).chain(&s2))
            .unwrap_or_else(|e| panic!("client then {s2:?}: {e}"));
        prop_assert_eq!(left, right);
    }

    /// Multi-operation patches converge the same way.
    #[test]
    fn concurrent_patches_converge(
        doc in base_doc(),
        s in prop::collection::vec(op_seed(), 1..4),
        c in prop::collection::vec(op_seed(), 1..4),
    ) {
        let server = Patch::new(
            build_sequence(&doc, &s).into_iter().map(|op| op.with_origin("a")).collect(),
        );
        let client = Patch::new(
            build_sequence(&doc, &c).into_iter().map(|op| op.with_origin("b")).collect(),
        );
        let (s2, c2) = transform_patch(&server, &client).expect("patches must transform");

        let left = apply_all(&doc, server.ops().iter().chain(c2.ops())).expect("left side applies");
        let right = apply_all(&doc, client.ops().iter().chain(s2.ops())).expect("right side applies");
        prop_assert_eq!(left, right);
    }

    /// A no-op on one side hands the other side back untouched.
    #[test]
    fn noop_is_transparent(doc in base_doc(), a in op_seed(), b in op_seed()) {
        let op = build(&doc, &a);
        let noop = build(&doc, &b).into_noop();
        let (n2, op2) = transform(&noop, &op).unwrap();
        prop_assert_eq!(&op2, &vec![op.clone()]);
        prop_assert_eq!(&n2, &vec![noop.clone()]);
        let (op3, n3) = transform(&op, &noop).unwrap();
        prop_assert_eq!(op3, vec![op]);
        prop_assert_eq!(n3, vec![noop]);
    }

    /// A composed edit has the same effect as its two parts in sequence.
    #[test]
    fn composition_is_equivalent(doc in base_doc(), a in op_seed(), b in op_seed()) {
        let ops = build_sequence(&doc, &[a, b]);
        if let Some(merged) = compose(&ops[0], &ops[1]) {
            let stepwise = apply_all(&doc, &ops).unwrap();
            let composed = apply_all(&doc, [&merged]).unwrap();
            prop_assert_eq!(composed, stepwise);
        }
    }

    /// Number edits folded together locally give the server the same value
    /// the replica already shows, fractional values included.
    #[test]
    fn composed_number_edits_match_the_server(
        start in number(),
        seeds in prop::collection::vec(op_seed(), 1..6),
    ) {
        let doc = json!({"n": start});
        let mut replica = SyncController::new(SyncOptions::new("me"), doc.clone(), 0);
        for seed in &seeds {
            let kind = number_op(&replica.document()["n"], seed);
            replica.apply_local(Operation::new(path(&["n"]), kind)).unwrap();
        }
        let sent = replica.take_outgoing().unwrap();
        let server = apply_all(&doc, sent.iter().flat_map(|o| o.patch.ops())).unwrap();
        prop_assert_eq!(replica.document(), &server);
    }

    /// Typing runs always compose.
    #[test]
    fn adjacent_typing_composes(text in "[a-e]{0,6}", p in 0.0..1.0f64, first in "[a-z]{1,4}", second in "[a-z]{1,4}") {
        let doc = json!({"text": text});
        let at = ((p * (text.len() + 1) as f64) as usize).min(text.len());
        let a = Operation::new(path(&["text"]), StringOp::insert(at, first.as_str()));
        let b = Operation::new(path(&["text"]), StringOp::insert(at + first.len(), second.as_str()));
        let merged = compose(&a, &b).expect("adjacent inserts compose");
        prop_assert_eq!(apply_all(&doc, [&merged]).unwrap(), apply_all(&doc, [&a, &b]).unwrap());
    }

    /// Edits past the end of a selection, or on another path, leave it alone.
    #[test]
    fn references_ignore_edits_after_them(
        text in "[a-e]{2,8}",
        p1 in 0.0..1.0f64,
        p2 in 0.0..1.0f64,
        p3 in 0.0..1.0f64,
        insert in any::<bool>(),
        added in "[a-z]{1,3}",
    ) {
        let len = text.len();
        let start = ((p1 * len as f64) as usize).min(len - 1);
        let end = start + ((p2 * (len - start) as f64) as usize).min(len - start - 1);
        let reference = RefState::from(Reference::range(path(&["text"]), start, end));

        let edit = if insert {
            let at = end + 1 + ((p3 * (len - end) as f64) as usize).min(len - end - 1);
            StringOp::insert(at, added.as_str())
        } else {
            let at = end + ((p3 * (len - end) as f64) as usize).min(len - end - 1);
            StringOp::remove(at, &text[at..at + 1])
        };
        let after = Operation::new(path(&["text"]), edit);
        prop_assert_eq!(transform_reference(&reference, &after), reference.clone());

        let elsewhere = Operation::new(path(&["other"]), StringOp::insert(0, added.as_str()));
        prop_assert_eq!(transform_reference(&reference, &elsewhere), reference);
    }
}

#[test]
fn collapsed_range_tracks_insert_like_a_cursor() {
    let state = RefState::from(Reference::range(path(&["text"]), 2, 2));
    let insert = Operation::new(path(&["text"]), StringOp::insert(2, "abc"));
    let moved = transform_reference(&state, &insert);
    assert_eq!(moved.attached().unwrap().anchor, Anchor::Range { start: 5, end: 5 });
}
