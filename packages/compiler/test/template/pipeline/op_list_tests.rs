//! OpList integration tests
//!
//! Exercises the list through its public API only, with real update ops as payloads.

use angular_template_pipeline::output::output_ast::{literal, Expression, LiteralValue, Statement};
use angular_template_pipeline::template::pipeline::ir::ops::shared::StatementOp;
use angular_template_pipeline::template::pipeline::ir::{ListId, OpId, OpList, UpdateOp};

fn op(n: u32) -> UpdateOp {
    UpdateOp::Statement(StatementOp::new(Statement::expression(
        literal(LiteralValue::Number(n as f64)),
        None,
    )))
}

fn value(op: &UpdateOp) -> u32 {
    match op {
        UpdateOp::Statement(StatementOp {
            statement: Statement::Expression(stmt),
        }) => match &*stmt.expr {
            Expression::Literal(lit) => match lit.value {
                LiteralValue::Number(n) => n as u32,
                _ => panic!("unexpected literal {lit:?}"),
            },
            other => panic!("unexpected expression {other:?}"),
        },
        other => panic!("unexpected op {other:?}"),
    }
}

fn values(list: &OpList<UpdateOp>) -> Vec<u32> {
    list.iter().map(value).collect()
}

/// Deterministic linear congruential generator, so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

#[test]
fn random_edits_match_a_vec_model() {
    let mut rng = Lcg(0x5eed);
    let mut list = OpList::new(ListId::new(0));
    let mut model: Vec<(OpId, u32)> = Vec::new();
    let mut next_value = 0u32;
    let mut fresh = || {
        next_value += 1;
        next_value
    };

    for step in 0..2_000 {
        let choice = if model.is_empty() { rng.below(2) } else { rng.below(7) };
        match choice {
            0 => {
                let v = fresh();
                model.push((list.push(op(v)), v));
            }
            1 => {
                let v = fresh();
                let id = list.prepend([op(v)])[0];
                model.insert(0, (id, v));
            }
            2 => {
                let at = rng.below(model.len());
                let v = fresh();
                let id = list.insert_before(op(v), model[at].0);
                model.insert(at, (id, v));
            }
            3 => {
                let at = rng.below(model.len());
                let v = fresh();
                let id = list.insert_after(op(v), model[at].0);
                model.insert(at + 1, (id, v));
            }
            4 => {
                let at = rng.below(model.len());
                let (id, _) = model.remove(at);
                list.remove(id);
                assert_eq!(list.owner(id), None);
            }
            5 => {
                let at = rng.below(model.len());
                let v = fresh();
                let id = list.replace(model[at].0, op(v));
                model[at] = (id, v);
            }
            _ => {
                let at = rng.below(model.len());
                let count = rng.below(3);
                let replacements: Vec<(OpId, u32)> = (0..count)
                    .map(|_| {
                        let v = fresh();
                        (list.create(op(v)), v)
                    })
                    .collect();
                let ids: Vec<OpId> = replacements.iter().map(|(id, _)| *id).collect();
                list.replace_with_many(model[at].0, &ids);
                model.splice(at..=at, replacements);
            }
        }

        assert_eq!(list.len(), model.len(), "length diverged at step {step}");
        if step % 50 == 0 {
            list.assert_consistent();
        }
    }

    list.assert_consistent();
    let expected: Vec<u32> = model.iter().map(|(_, v)| *v).collect();
    assert_eq!(values(&list), expected);
    let reversed: Vec<u32> = list.reversed().map(value).collect();
    assert_eq!(reversed, expected.iter().rev().copied().collect::<Vec<_>>());
    assert_eq!(list.first(), model.first().map(|(id, _)| *id));
    assert_eq!(list.last(), model.last().map(|(id, _)| *id));
}

#[test]
fn cursor_survives_removing_and_replacing_the_current_op() {
    let mut list = OpList::new(ListId::new(0));
    list.push_all((1..=6).map(op));

    let mut cursor = list.cursor();
    while let Some(id) = cursor.next(&list) {
        let v = value(&list[id]);
        if v % 2 == 0 {
            list.remove(id);
        } else if v == 3 {
            list.replace(id, op(30));
        } else {
            list.insert_after(op(v * 100), id);
        }
    }

    // Ops inserted after the current position are not visited by the running cursor.
    assert_eq!(values(&list), [1, 100, 30, 5, 500]);
    list.assert_consistent();
}

#[test]
fn replace_and_replace_back_restores_the_list() {
    let mut list = OpList::new(ListId::new(0));
    let ids = list.push_all((1..=3).map(op));
    let before = values(&list);

    let replacement = list.replace(ids[1], op(42));
    assert_eq!(values(&list), [1, 42, 3]);
    list.replace_node(replacement, ids[1]);

    assert_eq!(values(&list), before);
    assert_eq!(list.owner(replacement), None);
    list.assert_consistent();
}

#[test]
fn replace_with_nothing_is_remove() {
    let mut removed = OpList::new(ListId::new(0));
    let mut replaced = OpList::new(ListId::new(1));
    let a = removed.push_all((1..=3).map(op));
    let b = replaced.push_all((1..=3).map(op));

    removed.remove(a[1]);
    replaced.replace_with_many(b[1], &[]);

    assert_eq!(values(&removed), values(&replaced));
    assert_eq!(replaced.owner(b[1]), None);
    replaced.assert_consistent();
}

#[test]
fn detached_ops_can_be_relinked_and_taken() {
    let mut list = OpList::new(ListId::new(0));
    let ids = list.push_all((1..=3).map(op));

    list.remove(ids[0]);
    list.push_node(ids[0]);
    assert_eq!(values(&list), [2, 3, 1]);

    list.remove(ids[2]);
    let taken = list.take(ids[2]);
    assert_eq!(value(&taken), 3);
    assert_eq!(values(&list), [2, 1]);
    list.assert_consistent();
}

#[test]
fn neighbors_end_at_sentinels() {
    let mut list = OpList::new(ListId::new(0));
    let only = list.push(op(1));

    let prev = list.prev(only).expect("linked op has a predecessor");
    let next = list.next(only).expect("linked op has a successor");
    assert!(list.is_sentinel(prev));
    assert!(list.is_sentinel(next));
    assert_eq!(prev, list.head());
    assert_eq!(next, list.tail());
}

#[test]
#[should_panic(expected = "Illegal operation")]
fn ops_cannot_move_between_lists_by_id() {
    let mut a = OpList::new(ListId::new(0));
    let mut b: OpList<UpdateOp> = OpList::new(ListId::new(1));
    let id = a.push(op(1));
    b.remove(id);
}

#[test]
#[should_panic(expected = "Illegal operation")]
fn owned_ops_cannot_be_inserted_twice() {
    let mut list = OpList::new(ListId::new(0));
    let ids = list.push_all((1..=2).map(op));
    list.insert_node_before(ids[0], ids[1]);
}

#[test]
#[should_panic(expected = "Illegal operation")]
fn detached_ops_cannot_be_removed() {
    let mut list = OpList::new(ListId::new(0));
    let id = list.push(op(1));
    list.remove(id);
    list.remove(id);
}

#[test]
#[should_panic(expected = "Illegal operation")]
fn sentinels_cannot_be_removed() {
    let mut list: OpList<UpdateOp> = OpList::new(ListId::new(0));
    let head = list.head();
    list.remove(head);
}

#[test]
#[should_panic(expected = "Illegal state")]
fn cursor_detects_removal_of_the_next_op() {
    let mut list = OpList::new(ListId::new(0));
    let ids = list.push_all((1..=3).map(op));

    let mut cursor = list.cursor();
    cursor.next(&list);
    list.remove(ids[1]);
    cursor.next(&list);
}
