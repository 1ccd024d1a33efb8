//! End-to-end evaluation: source text in, flattened text out.

use sprig::{Interpreter, NullSink};

fn eval(src: &str) -> String {
    Interpreter::new()
        .with_output(NullSink)
        .eval_text(src)
        .expect("evaluation should succeed")
}

// ============================================================================
// ARITHMETIC
// ============================================================================

#[test]
fn arithmetic_folds_left_to_right() {
    assert_eq!(eval("(add 1 2 3 4 5 6 7 8 9 10)"), "55");
    assert_eq!(eval("(sub 10 1 2)"), "7");
    assert_eq!(eval("(mul 2 3 4)"), "24");
    assert_eq!(eval("(div 10 2 2)"), "2.5");
}

#[test]
fn quoted_numbers_are_numbers_too() {
    assert_eq!(eval("(add '1' '2' '3')"), "6");
}

#[test]
fn integral_results_print_without_fraction() {
    assert_eq!(eval("(add 1.5 2.5)"), "4");
    assert_eq!(eval("(add 1.5 2.7)"), "4.2");
}

#[test]
fn unparsable_operands_count_as_zero() {
    assert_eq!(eval("(add 'x' 3)"), "3");
}

#[test]
fn single_operand_seeds_the_accumulator() {
    assert_eq!(eval("(sub 5)"), "5");
    assert_eq!(eval("(div 8)"), "8");
}

#[test]
fn operands_nest() {
    assert_eq!(eval("(add (mul 2 3) (sub 10 5))"), "11");
    assert_eq!(eval("(add -5 3)"), "-2");
}

// ============================================================================
// GET / LET / SET / PRINT
// ============================================================================

#[test]
fn get_concatenates_without_separators() {
    assert_eq!(eval("(get 'ABC')"), "ABC");
    assert_eq!(eval("(get 'ABC' 'DEF')"), "ABCDEF");
    assert_eq!(eval("(get 「日本語」'も'『使えるよ』)"), "日本語も使えるよ");
}

#[test]
fn unbound_variables_read_as_undef() {
    assert_eq!(eval("(get x)"), "#undef");
    assert_eq!(eval("(print x)"), "'#undef'");
}

#[test]
fn let_stores_unevaluated_chains() {
    assert_eq!(eval("(let x 'AAA')(print x)"), "'AAA'");
    assert_eq!(eval("(let x 'AAA' 'BBB')(print x)"), "'AAA' 'BBB'");
    assert_eq!(
        eval("(let x 'AAA' (get 'BBB' 'CCC'))(print x)"),
        "'AAA' (get 'BBB' 'CCC')"
    );
    assert_eq!(eval("(let x (add 1 2))(print x)"), "(add '1' '2')");
}

#[test]
fn get_evaluates_deferred_groups() {
    assert_eq!(eval("(let x (add 1 2))(get x)"), "3");
}

#[test]
fn set_stores_resolved_values() {
    assert_eq!(eval("(set x 'AAA' 'BBB')(get x)"), "AAABBB");
    assert_eq!(eval("(set x (add 1 2))(print x)"), "'3'");
    assert_eq!(eval("(set x 'AAA')(set y x x)(get y)"), "AAAAAA");
}

#[test]
fn variable_names_can_be_full_width() {
    assert_eq!(eval("(set 歩の価値 250)(get 歩の価値)"), "250");
}

#[test]
fn print_space_separates_arguments() {
    assert_eq!(
        eval("(let x 'AAA') (let y 'BBB' 'CCC') (print x y)"),
        "'AAA' 'BBB' 'CCC'"
    );
}

#[test]
fn addto_appends_to_existing_values() {
    assert_eq!(eval("(set x 'A')(addto x 'B' 'C')(get x)"), "ABC");
    assert_eq!(eval("(addto z 'A')(get z)"), "A");
}

#[test]
fn set_of_an_unbound_reference_embeds_undef() {
    assert_eq!(eval("(let x y)(set y x)"), "#undef");
}

#[test]
fn get_interleaves_variables_and_literals() {
    assert_eq!(
        eval("(set x 'ABC')(set y 'DEF')(get x 'と' y)"),
        "ABCとDEF"
    );
}

#[test]
fn a_program_yields_its_last_nonempty_result() {
    assert_eq!(eval("(set x 'A') (set y 'B') (get x y)"), "AB");
    // A trailing bare atom evaluates to nothing, so the group's result
    // stands.
    assert_eq!(eval("(get 'A') 'bare'"), "A");
}

#[test]
fn bracket_families_mix_across_forms() {
    assert_eq!(eval("(set y {add 1 2}) (let x {get 'ABC' y})[eval x]"), "ABC3");
}

// ============================================================================
// ARRAYS
// ============================================================================

#[test]
fn array_reads_by_position() {
    assert_eq!(eval("(set x 'AAA' 'BBB' 'CCC')(array x 1)"), "BBB");
    assert_eq!(eval("(set x 'AAA' 'BBB' 'CCC')(car x)"), "AAA");
    assert_eq!(eval("(set x 'AAA' 'BBB' 'CCC')(cdr x)"), "BBBCCC");
    assert_eq!(eval("(set x 'AAA' 'BBB' 'CCC')(length x)"), "3");
}

#[test]
fn array_reads_past_the_end_yield_null() {
    assert_eq!(eval("(set x 'AAA')(array x 5)"), "#null");
}

#[test]
fn cdr_of_a_single_element_chain_is_null() {
    assert_eq!(eval("(let x 1)(cdr x)"), "#null");
}

#[test]
fn arrays_nest() {
    assert_eq!(
        eval("(let x ('AAA' 'BBB')('CCC' 'DDD'))(set y (array (array x 1) 1))(get y)"),
        "DDD"
    );
}

#[test]
fn setarray_replaces_a_slot_in_place() {
    assert_eq!(
        eval("(set x 'AAA' 'BBB' 'CCC')(setarray x 1 'ZZZ')(get x)"),
        "AAAZZZCCC"
    );
}

#[test]
fn setarray_grows_with_null_cells() {
    assert_eq!(eval("(setarray x 10 'DDD')(setarray x 3 'CCC')(get x)"), "CCCDDD");
    assert_eq!(eval("(setarray x 10 'DDD')(length x)"), "11");
    assert_eq!(eval("(setarray x 10 'DDD')(array x 2)"), "#null");
}

#[test]
fn array_storage_scales_to_large_indexes() {
    assert_eq!(eval("(setarray x 200000 'v')(array x 200000)"), "v");
    assert_eq!(eval("(setarray x 200000 'v')(length x)"), "200001");
    assert_eq!(eval("(setarray x 200000 'v')(addto x 'w')(length x)"), "200002");
}

#[test]
fn set_copies_are_independent_of_their_source() {
    assert_eq!(eval("(set x 'AAA')(set y x)(setarray x 0 'Z')(get y)"), "AAA");
    assert_eq!(eval("(set x 'A' 'B')(set y x)(setarray y 1 'Q')(get x)"), "AB");
}

#[test]
fn foreach_concatenates_body_results() {
    assert_eq!(
        eval("(set x 'AAA' 'BBB' 'CCC')(foreach e x (get e '/'))"),
        "AAA/BBB/CCC/"
    );
}

#[test]
fn foreach_over_an_unbound_collection_is_empty() {
    assert_eq!(eval("(foreach e nope (get 'X'))"), "");
}

#[test]
fn foreach_nests() {
    assert_eq!(
        eval("(set a 'A' 'B')(set b '1' '2')(foreach x a (foreach y b (get x y)))"),
        "A1A2B1B2"
    );
}

#[test]
fn foreach_elements_keep_their_structure() {
    assert_eq!(
        eval("(let x ('AAA' 'BBB')('CCC' 'DDD'))(foreach e x (get (array e 1)))"),
        "BBBDDD"
    );
}

// ============================================================================
// STRINGS
// ============================================================================

#[test]
fn case_folding_assigns_to_the_named_variable() {
    assert_eq!(eval("(tolower z 'AbC')(get z)"), "abc");
    assert_eq!(eval("(set x 'Abc')(set y 'deF')(tolower z x y)(get z)"), "abcdef");
    assert_eq!(eval("(toupper z 'abc')(get z)"), "ABC");
}

#[test]
fn replace_applies_literal_pairs() {
    assert_eq!(eval("(replace 'ABCDE' 'CD' 'XY')"), "ABXYE");
    assert_eq!(eval("(replace 'AABB' 'A' 'X' 'B' 'Y')"), "XXYY");
}

#[test]
fn regex_applies_pattern_pairs() {
    assert_eq!(eval(r"(regex 'AB/*CDE*/FG' '/\*.*?\*/' 'XYZ')"), "ABXYZFG");
}

#[test]
fn regex_rejects_bad_patterns_inline() {
    let out = eval(r"(regex 'A' '[' 'B')");
    assert!(out.contains("regex: error"), "got {out}");
}

// ============================================================================
// FUNCTIONS
// ============================================================================

#[test]
fn functions_evaluate_their_stored_body() {
    assert_eq!(eval("(func F (get 'ABC'))(F)"), "ABC");
}

#[test]
fn arguments_bind_positionally() {
    assert_eq!(eval("(func F (get @0 'と' @1))(F 'ABC' 'DEF')"), "ABCとDEF");
}

#[test]
fn variable_arguments_pass_whole_chains() {
    assert_eq!(
        eval("(let p1 'ABC' 'DEF')(let p2 'GHI')(func F (get @0 'と' @1))(F p1 p2)"),
        "ABCDEFとGHI"
    );
    assert_eq!(
        eval("(func F [print @0 'と' @1]) (let p1 ('ABC' 'DEF'))(let p2 'GHI') (F p1 p2)"),
        "('ABC' 'DEF') 'と' 'GHI'"
    );
}

#[test]
fn calls_nest_with_fresh_frames() {
    assert_eq!(eval("(func F (get @0 @0))(func G (F @0))(G 'x')"), "xx");
}

#[test]
fn unbound_parameters_read_as_undef() {
    assert_eq!(eval("(func F (get @1))(F 'A')"), "#undef");
}

// ============================================================================
// EVAL / EVALSTR
// ============================================================================

#[test]
fn eval_runs_stored_chains() {
    assert_eq!(eval("(let x (get 'ABC'))(eval x)"), "ABC");
    assert_eq!(eval("(let x (set y 'ABC')(addto y 'DEF'))(eval x)"), "ABCDEF");
}

#[test]
fn eval_inside_a_branch() {
    assert_eq!(
        eval("(set x 3)(let z (add x 4))(set y (if (eq x 5) 1 (eval z)))(get y)"),
        "7"
    );
}

#[test]
fn evalstr_reads_atoms_as_programs() {
    assert_eq!(eval("(evalstr 「(get 'ABC')」)"), "ABC");
}
