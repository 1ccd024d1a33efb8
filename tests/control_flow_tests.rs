//! Conditionals, loops, labels, and the break protocol.

use sprig::{Interpreter, NullSink};

fn eval(src: &str) -> String {
    Interpreter::new()
        .with_output(NullSink)
        .eval_text(src)
        .expect("evaluation should succeed")
}

// ============================================================================
// IF
// ============================================================================

#[test]
fn if_takes_the_then_branch_on_true() {
    assert_eq!(eval("(if (eq 1 1) 'A' 'B')"), "A");
    assert_eq!(eval("(if (eq 1 2) 'A' 'B')"), "B");
}

#[test]
fn if_without_else_yields_false() {
    assert_eq!(eval("(if (eq 1 2) 'A')"), "#false");
}

#[test]
fn if_compares_condition_text_exactly() {
    assert_eq!(eval("(if '#true' 'A')"), "A");
    assert_eq!(eval("(if 'true' 'A')"), "#false");
    assert_eq!(eval("(if x 'A')"), "#false");
}

// ============================================================================
// COMPARISONS AND CONNECTIVES
// ============================================================================

#[test]
fn equality_is_textual_ordering_is_numeric() {
    assert_eq!(eval("(eq 'AB' 'AB')"), "#true");
    assert_eq!(eval("(neq 'AB' 'CD')"), "#true");
    assert_eq!(eval("(lt 2 10)"), "#true");
    assert_eq!(eval("(le 2 2)"), "#true");
    assert_eq!(eval("(gt 2 10)"), "#false");
    assert_eq!(eval("(ge 3 2)"), "#true");
}

#[test]
fn connectives_resolve_both_operands() {
    assert_eq!(eval("(and (eq 1 1) (eq 2 2))"), "#true");
    assert_eq!(eval("(and (eq 1 1) (eq 1 2))"), "#false");
    assert_eq!(eval("(or (eq 1 2) (eq 2 2))"), "#true");
    // No short circuit: the second operand's side effect happens even
    // when the first already decides the result.
    assert_eq!(eval("(set n 0)(or (eq 1 1) (set n 1))(get n)"), "1");
}

// ============================================================================
// LOOPS
// ============================================================================

#[test]
fn while_runs_until_the_condition_leaves_true() {
    assert_eq!(
        eval("(set x 0)(set y 0)(while (neq x 5) ((set x (add x 1)) (set y (add y 3)))) (get y)"),
        "15"
    );
}

#[test]
fn while_with_a_false_condition_yields_null() {
    assert_eq!(eval("(while (eq 1 2) (get 'X'))"), "#null");
}

#[test]
fn for_counts_inclusively() {
    assert_eq!(eval("(set z '')(for x 0 9 (addto z x))(get z)"), "0123456789");
}

#[test]
fn downfor_counts_downward() {
    assert_eq!(eval("(set z '')(downfor x 9 0 (addto z x))(get z)"), "9876543210");
}

#[test]
fn for_deletes_its_counter() {
    assert_eq!(eval("(for x 0 3 (get x))(get x)"), "#undef");
}

#[test]
fn for_rereads_its_bound_each_iteration() {
    assert_eq!(
        eval("(set limit 3)(set z '')(for x 0 limit ((if (eq x 1) (set limit 1))(addto z x)))(get z)"),
        "01"
    );
}

#[test]
fn loop_runs_its_whole_body_chain() {
    assert_eq!(eval("(set sum 0)(loop 5 (set sum (add sum 3)))"), "15");
    assert_eq!(eval("(loop 3 (get 'ABC')(get 'DEF'))"), "DEF");
}

#[test]
fn loop_with_a_nonpositive_count_yields_nothing() {
    assert_eq!(eval("(loop 0 (get 'ABC'))"), "");
}

// ============================================================================
// LABELS AND BREAK
// ============================================================================

#[test]
fn break_unwinds_a_while_to_its_label() {
    assert_eq!(eval("(label1: while '#true' ((print 'ABC')(break label1)))"), "'ABC'");
}

#[test]
fn break_skips_the_rest_of_the_iteration() {
    assert_eq!(
        eval("(set y '')(label0: for x 0 5 ((if (eq x 3) (break label0)) (addto y x)))(get y)"),
        "012"
    );
}

#[test]
fn forever_loops_until_broken() {
    assert_eq!(
        eval("(label0: (set x 0) [forever ((if (eq x 3) (break label0))(set x (add x 1)))]) (get x)"),
        "3"
    );
}

#[test]
fn break_crosses_nested_loops() {
    assert_eq!(
        eval("(set n 0)(outer: for i 0 9 (for j 0 9 ((set n (add n 1))(if (eq n 5) (break outer)))))(get n)"),
        "5"
    );
}

#[test]
fn the_matching_label_clears_the_break() {
    let mut interp = Interpreter::new().with_output(NullSink);
    let out = interp
        .eval_text("(label0: forever (break label0))(get 'after')")
        .unwrap();
    assert_eq!(out, "after");
    assert!(interp.env.break_target.is_none());
}

// ============================================================================
// SWITCH
// ============================================================================

#[test]
fn switch_matches_by_resolved_text() {
    assert_eq!(
        eval("(set x 2)(switch x (1 'ABC')(2 'DEF')(default 'GHI'))"),
        "DEF"
    );
}

#[test]
fn switch_falls_back_to_default() {
    assert_eq!(
        eval("(set x 9)(switch x (1 'ABC')(2 'DEF')(default 'GHI'))"),
        "GHI"
    );
}

#[test]
fn switch_without_a_match_yields_null() {
    assert_eq!(eval("(set x 9)(switch x (1 'ABC')(2 'DEF'))"), "#null");
}

#[test]
fn switch_case_labels_are_resolved() {
    assert_eq!(eval("(set x 2)(set y 2)(switch x (1 'ABC')(y 'DEF'))"), "DEF");
}
