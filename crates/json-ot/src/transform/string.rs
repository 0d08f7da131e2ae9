//! String insert/remove transforms.

use super::position::after_remove;
use super::Transformed;
use crate::operation::{Operation, StringOp};

pub(super) fn transform(
    server: &Operation,
    s: &StringOp,
    client: &Operation,
    c: &StringOp,
) -> Transformed {
    use StringOp::*;
    match (s, c) {
        (Insert { index: si, text: st }, Insert { index: ci, text: ct }) => {
            // Equal indices: the server's text goes first.
            if si <= ci {
                let shifted = StringOp::insert(ci.saturating_add(char_len(st)), ct.as_str());
                (vec![server.clone()], vec![client.with_kind(shifted)])
            } else {
                let shifted = StringOp::insert(si.saturating_add(char_len(ct)), st.as_str());
                (vec![server.with_kind(shifted)], vec![client.clone()])
            }
        }
        (Insert { index, text }, Remove { index: at, text: removed }) => {
            insert_against_remove(server, *index, text, client, *at, removed)
        }
        (Remove { index: at, text: removed }, Insert { index, text }) => {
            let (c2, s2) = insert_against_remove(client, *index, text, server, *at, removed);
            (s2, c2)
        }
        (Remove { index: sa, text: st }, Remove { index: ca, text: ct }) => (
            vec![subtract(server, *sa, st, *ca, char_len(ct))],
            vec![subtract(client, *ca, ct, *sa, char_len(st))],
        ),
    }
}

/// Returns `(insert', remove')`.
fn insert_against_remove(
    ins: &Operation,
    index: usize,
    text: &str,
    rem: &Operation,
    at: usize,
    removed: &str,
) -> Transformed {
    let n = char_len(removed);
    let k = char_len(text);
    if index <= at {
        let shifted = StringOp::remove(at.saturating_add(k), removed);
        (vec![ins.clone()], vec![rem.with_kind(shifted)])
    } else if index >= at.saturating_add(n) {
        let shifted = StringOp::insert(index - n, text);
        (vec![ins.with_kind(shifted)], vec![rem.clone()])
    } else {
        // The insertion lands inside the removed span: it survives at the
        // start of the span and the removal is split around it.
        let head: String = removed.chars().take(index - at).collect();
        let tail: String = removed.chars().skip(index - at).collect();
        (
            vec![ins.with_kind(StringOp::insert(at, text))],
            vec![
                rem.with_kind(StringOp::remove(at, head)),
                rem.with_kind(StringOp::remove(at.saturating_add(k), tail)),
            ],
        )
    }
}

/// `op` (removing `text` at `at`) after `other_len` chars at `other_at` are
/// gone. The overlap is dropped from `text`; nothing left means no-op.
fn subtract(op: &Operation, at: usize, text: &str, other_at: usize, other_len: usize) -> Operation {
    let len = char_len(text);
    let lo = at.max(other_at);
    let hi = at.saturating_add(len).min(other_at.saturating_add(other_len));
    let rest: String = if lo < hi {
        text.chars()
            .enumerate()
            .filter(|(i, _)| !(lo..hi).contains(&at.saturating_add(*i)))
            .map(|(_, ch)| ch)
            .collect()
    } else {
        text.to_string()
    };
    let start = after_remove(at, other_at, other_len);
    let next = op.with_kind(StringOp::remove(start, rest.as_str()));
    if rest.is_empty() && len > 0 {
        next.into_noop()
    } else {
        next
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
