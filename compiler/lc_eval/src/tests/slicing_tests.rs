use lc_ir::{Annotation, Def, ExprBuilder, ExprId, Kont, Lattice, Node};
use lc_runtime::{Expl, ExplValue};
use pretty_assertions::assert_eq;

use super::eval_tests::even_odd;
use super::{length_of, three_plus_four_times_two, Fixture};
use crate::Interpreter;

/// Clear everything, demand all of `result`, slice backward.
fn demand_all(interp: &Interpreter<'_>, root: ExprId, result: ExplValue) -> ExprId {
    interp.clear_annotations(root);
    interp.store().set_annotation(result.value, Annotation::Top);
    interp.backward_slice(result).unwrap()
}

fn marked(fx: &Fixture, exprs: &[ExprId]) -> Vec<Annotation> {
    exprs.iter().map(|&e| fx.annotation(e)).collect()
}

// Forward

#[test]
fn test_forward_single_operand_is_not_enough() {
    let mut fx = Fixture::new();
    let (root, [three, four, two, times, plus]) = fx.build(three_plus_four_times_two);
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();

    interp.set_all_annotations(root, Annotation::Bot);
    fx.arena.set_annotation(four, Annotation::Top);
    let available = interp.forward_slice(result).unwrap();

    assert_eq!(available, Annotation::Bot);
    assert_eq!(interp.store().annotation(result.value), Annotation::Bot);
    assert_eq!(
        marked(&fx, &[three, four, two, times, plus]),
        vec![
            Annotation::Bot,
            Annotation::Top,
            Annotation::Bot,
            Annotation::Bot,
            Annotation::Bot,
        ]
    );
}

#[test]
fn test_forward_everything_available() {
    let mut fx = Fixture::new();
    let (root, nodes) = fx.build(three_plus_four_times_two);
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();

    interp.set_all_annotations(root, Annotation::Top);
    interp.set_all_value_annotations(Annotation::Bot);
    assert_eq!(interp.forward_slice(result).unwrap(), Annotation::Top);
    assert!(marked(&fx, &nodes).into_iter().all(Annotation::is_top));
}

#[test]
fn test_forward_operator_node_gates_result() {
    let mut fx = Fixture::new();
    let (root, [.., times, _]) = fx.build(three_plus_four_times_two);
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();

    interp.set_all_annotations(root, Annotation::Top);
    fx.arena.set_annotation(times, Annotation::Bot);
    assert_eq!(interp.forward_slice(result).unwrap(), Annotation::Bot);
}

#[test]
fn test_forward_length_needs_spine_not_elements() {
    let mut fx = Fixture::new();
    let (root, elems, _) = fx.build(|b| length_of(b, &[1.0, 2.0, 3.0]));
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();

    interp.set_all_annotations(root, Annotation::Top);
    for &e in &elems {
        fx.arena.set_annotation(e, Annotation::Bot);
    }
    assert_eq!(interp.forward_slice(result).unwrap(), Annotation::Top);
}

#[test]
fn test_forward_length_needs_binder() {
    let mut fx = Fixture::new();
    let (root, _, def) = fx.build(|b| length_of(b, &[1.0, 2.0]));
    let Def::LetRec(group) = def else {
        panic!("expected a recursive group")
    };
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();

    interp.set_all_annotations(root, Annotation::Top);
    fx.arena.set_annotation(group[0].x, Annotation::Bot);
    assert_eq!(interp.forward_slice(result).unwrap(), Annotation::Bot);
}

#[test]
fn test_forward_let_binder_gates_uses() {
    let mut fx = Fixture::new();
    let (root, x) = fx.build(|b| {
        let two = b.num(2.0);
        let def = b.let_("x", two);
        let Def::Let { x, .. } = def else {
            unreachable!()
        };
        let xv = b.var("x");
        let three = b.num(3.0);
        let body = b.binary("*", xv, three);
        (b.defs(vec![def], body), x)
    });
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();

    interp.set_all_annotations(root, Annotation::Top);
    fx.arena.set_annotation(x, Annotation::Bot);
    assert_eq!(interp.forward_slice(result).unwrap(), Annotation::Bot);

    interp.set_all_annotations(root, Annotation::Top);
    assert_eq!(interp.forward_slice(result).unwrap(), Annotation::Top);
}

// Backward

#[test]
fn test_backward_marks_every_operand() {
    let mut fx = Fixture::new();
    let (root, nodes) = fx.build(three_plus_four_times_two);
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();

    assert_eq!(demand_all(&interp, root, result), root);
    assert_eq!(marked(&fx, &nodes), vec![Annotation::Top; 5]);
}

#[test]
fn test_backward_without_demand_marks_nothing() {
    let mut fx = Fixture::new();
    let (root, nodes) = fx.build(three_plus_four_times_two);
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();

    interp.clear_annotations(root);
    interp.backward_slice(result).unwrap();
    assert_eq!(marked(&fx, &nodes), vec![Annotation::Bot; 5]);
}

#[test]
fn test_backward_match_keeps_only_taken_branch() {
    let mut fx = Fixture::new();
    let (root, [scrutinee, five, nil, zero, h]) = fx.build(|b| {
        let five = b.num(5.0);
        let nil = b.constr("Nil", &[]);
        let list = b.constr("Cons", &[five, nil]);
        let zero = b.num(0.0);
        let nil_branch = b.branch("Nil", &[], zero);
        let h = b.var("h");
        let cons_branch = b.branch("Cons", &["h", "t"], h);
        let trie = b.case(vec![nil_branch, cons_branch]);
        (b.match_as(list, trie), [list, five, nil, zero, h])
    });
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();
    demand_all(&interp, root, result);

    assert_eq!(
        marked(&fx, &[root, scrutinee, five, h]),
        vec![Annotation::Top; 4]
    );
    // The unused tail and the other branch stay out of the slice.
    assert_eq!(marked(&fx, &[nil, zero]), vec![Annotation::Bot; 2]);
}

#[test]
fn test_backward_through_function_argument() {
    let mut fx = Fixture::new();
    let (root, [five, nil, zero, h]) = fx.build(|b| {
        // (fun xs -> match xs as { Nil -> 0; Cons(h, t) -> h }) Cons(5, Nil)
        let zero = b.num(0.0);
        let nil_branch = b.branch("Nil", &[], zero);
        let h = b.var("h");
        let cons_branch = b.branch("Cons", &["h", "t"], h);
        let trie = b.case(vec![nil_branch, cons_branch]);
        let xs = b.var("xs");
        let body = b.match_as(xs, trie);
        let f = b.lambda("xs", body);
        let five = b.num(5.0);
        let nil = b.constr("Nil", &[]);
        let list = b.constr("Cons", &[five, nil]);
        (b.app(f, list), [five, nil, zero, h])
    });
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();
    demand_all(&interp, root, result);

    assert_eq!(marked(&fx, &[five, h]), vec![Annotation::Top; 2]);
    assert_eq!(marked(&fx, &[nil, zero]), vec![Annotation::Bot; 2]);
}

#[test]
fn test_backward_partial_demand_on_result() {
    let mut fx = Fixture::new();
    let (root, [one, two, plus, three, four, times]) = fx.build(|b| {
        // Pair(1 + 2, 3 * 4), demanding only the first component.
        let one = b.num(1.0);
        let two = b.num(2.0);
        let plus = b.binary("+", one, two);
        let three = b.num(3.0);
        let four = b.num(4.0);
        let times = b.binary("*", three, four);
        (
            b.constr("Pair", &[plus, times]),
            [one, two, plus, three, four, times],
        )
    });
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();

    interp.clear_annotations(root);
    let fst = interp.value(result).fields()[0];
    interp.store().set_annotation(fst, Annotation::Top);
    interp.backward_slice(result).unwrap();

    assert_eq!(marked(&fx, &[one, two, plus]), vec![Annotation::Top; 3]);
    assert_eq!(
        marked(&fx, &[three, four, times, root]),
        vec![Annotation::Bot; 4]
    );
}

#[test]
fn test_backward_unused_let_is_dropped() {
    let mut fx = Fixture::new();
    let (root, x, [bound, body]) = fx.build(|b| {
        let one = b.num(1.0);
        let other = b.num(1.0);
        let bound = b.binary("+", one, other);
        let def = b.let_("x", bound);
        let Def::Let { x, .. } = def else {
            unreachable!()
        };
        let body = b.num(5.0);
        (b.defs(vec![def], body), x, [bound, body])
    });
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();
    demand_all(&interp, root, result);

    assert_eq!(fx.annotation(body), Annotation::Top);
    assert_eq!(fx.annotation(bound), Annotation::Bot);
    assert_eq!(fx.arena.annotation(x), Annotation::Bot);
}

#[test]
fn test_backward_used_let_marks_binder_and_definition() {
    let mut fx = Fixture::new();
    let (root, x, bound) = fx.build(|b| {
        let two = b.num(2.0);
        let def = b.let_("x", two);
        let Def::Let { x, .. } = def else {
            unreachable!()
        };
        let xv = b.var("x");
        let three = b.num(3.0);
        let body = b.binary("*", xv, three);
        (b.defs(vec![def], body), x, two)
    });
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();
    demand_all(&interp, root, result);

    assert_eq!(fx.arena.annotation(x), Annotation::Top);
    assert_eq!(fx.annotation(bound), Annotation::Top);
}

#[test]
fn test_backward_length_needs_spine_not_elements() {
    let mut fx = Fixture::new();
    let (root, elems, def) = fx.build(|b| length_of(b, &[1.0, 2.0, 3.0]));
    let Def::LetRec(group) = def else {
        panic!("expected a recursive group")
    };
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();
    demand_all(&interp, root, result);

    assert_eq!(fx.arena.annotation(group[0].x), Annotation::Top);
    assert_eq!(marked(&fx, &elems), vec![Annotation::Bot; 3]);

    // Every list cell was inspected by a match, so the whole spine is kept.
    let spine: Vec<_> = fx
        .arena
        .subtree(root)
        .into_iter()
        .filter_map(|node| match node {
            Node::Expr(e) => Some(e),
            Node::Binder(_) => None,
        })
        .filter(|&e| matches!(fx.arena.kind(e), lc_ir::ExprKind::Constr { .. }))
        .collect();
    assert_eq!(spine.len(), 4);
    assert!(marked(&fx, &spine).into_iter().all(Annotation::is_top));
}

#[test]
fn test_backward_unclose_marks_whole_group() {
    let mut fx = Fixture::new();
    let group = fx.build(even_odd);
    let Def::LetRec(defs) = group.clone() else {
        panic!("expected a recursive group")
    };
    let root = fx.build(|b| {
        let f = b.var("even");
        let n = b.num(2.0);
        let call = b.app(f, n);
        b.defs(vec![group], call)
    });
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();
    demand_all(&interp, root, result);

    for def in &defs {
        assert_eq!(fx.arena.annotation(def.x), Annotation::Top);
    }
}

#[test]
fn test_backward_is_idempotent() {
    let mut fx = Fixture::new();
    let (root, _, _) = fx.build(|b| length_of(b, &[1.0, 2.0]));
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();
    demand_all(&interp, root, result);

    let nodes = fx.arena.subtree(root);
    let before: Vec<_> = nodes.iter().map(|&n| fx.arena.annotation(n)).collect();
    interp.backward_slice(result).unwrap();
    let after: Vec<_> = nodes.iter().map(|&n| fx.arena.annotation(n)).collect();
    assert_eq!(before, after);
}

#[test]
fn test_round_trip_from_full_annotation() {
    let mut fx = Fixture::new();
    let (root, _, _) = fx.build(|b| length_of(b, &[1.0, 2.0]));
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();

    interp.set_all_annotations(root, Annotation::Top);
    assert_eq!(interp.forward_slice(result).unwrap(), Annotation::Top);
    assert_eq!(interp.backward_slice(result).unwrap(), root);
    assert!(fx
        .arena
        .subtree(root)
        .into_iter()
        .all(|n| fx.arena.annotation(n).is_top()));
}

#[test]
fn test_backward_demand_only_grows() {
    let mut fx = Fixture::new();
    let (root, nodes) = fx.build(three_plus_four_times_two);
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();

    interp.clear_annotations(root);
    interp.backward_slice(result).unwrap();
    let low = marked(&fx, &nodes);

    demand_all(&interp, root, result);
    let high = marked(&fx, &nodes);
    for (l, h) in low.into_iter().zip(high) {
        assert!(l.leq(h));
    }
}

#[test]
fn test_backward_literal() {
    let mut fx = Fixture::new();
    let root = fx.build(|b| b.num(1.0));
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();
    assert!(matches!(interp.store().expl(result.expl), Expl::Empty));
    assert_eq!(demand_all(&interp, root, result), root);
    assert_eq!(fx.annotation(root), Annotation::Top);
}

// Higher-order

/// `letrec map = fun f -> fun xs -> match xs as { Nil -> Nil; Cons(h, t) ->
/// Cons(f h, map f t) }; map (fun x -> x + 1) [elems]`, returning the root
/// and the element literals.
fn map_succ(b: &mut ExprBuilder<'_>, elems: &[f64]) -> (ExprId, Vec<ExprId>) {
    let nil = b.constr("Nil", &[]);
    let on_nil = b.branch("Nil", &[], nil);
    let f = b.var("f");
    let h = b.var("h");
    let head = b.app(f, h);
    let map = b.var("map");
    let f = b.var("f");
    let t = b.var("t");
    let tail = b.apps(map, &[f, t]);
    let cons = b.constr("Cons", &[head, tail]);
    let on_cons = b.branch("Cons", &["h", "t"], cons);
    let trie = b.case(vec![on_nil, on_cons]);
    let xs = b.var("xs");
    let body = b.match_as(xs, trie);
    let over_list = b.lambda("xs", body);
    let trie = b.var_trie("f", Kont::Expr(over_list));
    let def = b.letrec(vec![("map", trie)]);

    let x = b.var("x");
    let one = b.num(1.0);
    let succ_body = b.binary("+", x, one);
    let succ = b.lambda("x", succ_body);
    let lits: Vec<_> = elems.iter().map(|&n| b.num(n)).collect();
    let list = b.list(&lits);
    let map = b.var("map");
    let call = b.apps(map, &[succ, list]);
    (b.defs(vec![def], call), lits)
}

/// The first `n` elements of a list value, as value handles.
fn heads(interp: &Interpreter<'_>, list: lc_runtime::Vid, n: usize) -> Vec<lc_runtime::Vid> {
    let mut out = Vec::with_capacity(n);
    let mut cell = list;
    for _ in 0..n {
        let fields = interp.store().value(cell).fields();
        out.push(fields[0]);
        cell = fields[1];
    }
    out
}

#[test]
fn test_map_evaluates_elementwise() {
    let mut fx = Fixture::new();
    let (root, _) = fx.build(|b| map_succ(b, &[1.0, 2.0, 3.0]));
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();

    let values: Vec<_> = heads(&interp, result.value, 3)
        .into_iter()
        .map(|v| match interp.store().value(v) {
            lc_runtime::Value::Num(n) => *n,
            other => panic!("expected a number, got {other:?}"),
        })
        .collect();
    assert_eq!(values, vec![2.0, 3.0, 4.0]);
}

#[test]
fn test_backward_map_head_demand_marks_first_element() {
    let mut fx = Fixture::new();
    let (root, lits) = fx.build(|b| map_succ(b, &[1.0, 2.0, 3.0]));
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();

    interp.clear_annotations(root);
    let head = heads(&interp, result.value, 1)[0];
    interp.store().set_annotation(head, Annotation::Top);
    assert_eq!(interp.backward_slice(result).unwrap(), root);

    assert_eq!(
        marked(&fx, &lits),
        vec![Annotation::Top, Annotation::Bot, Annotation::Bot]
    );
}

#[test]
fn test_forward_map_unavailable_element() {
    let mut fx = Fixture::new();
    let (root, lits) = fx.build(|b| map_succ(b, &[1.0, 2.0, 3.0]));
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();

    interp.set_all_annotations(root, Annotation::Top);
    fx.arena.set_annotation(lits[1], Annotation::Bot);
    interp.forward_slice(result).unwrap();

    let available: Vec<_> = heads(&interp, result.value, 2)
        .into_iter()
        .map(|v| interp.store().annotation(v))
        .collect();
    assert_eq!(available, vec![Annotation::Top, Annotation::Bot]);
}

#[test]
fn test_backward_closure_escaping_its_let() {
    let mut fx = Fixture::new();
    let (root, seven) = fx.build(|b| {
        // let g = (let k = 7 in fun u -> k) in g 0
        let seven = b.num(7.0);
        let k = b.let_("k", seven);
        let kv = b.var("k");
        let lam = b.lambda("u", kv);
        let bound = b.defs(vec![k], lam);
        let g = b.let_("g", bound);
        let gv = b.var("g");
        let zero = b.num(0.0);
        let call = b.app(gv, zero);
        (b.defs(vec![g], call), seven)
    });
    let mut interp = fx.interpreter();
    let result = interp.evaluate(root).unwrap();
    assert_eq!(super::num(&interp, result), 7.0);

    demand_all(&interp, root, result);
    assert_eq!(fx.annotation(seven), Annotation::Top);
}
