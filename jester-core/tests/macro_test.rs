// jester-core - Macro and core-library tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

#[test]
fn test_defmacro_expands_at_parse_time() {
    assert_eval!(
        "(defmacro unless [test then else] (list 'if test else then))
         (unless false :yes :no)",
        ":yes"
    );
}

#[test]
fn test_macro_receives_unevaluated_forms() {
    assert_eval!(
        "(defmacro stringify [form] (pr-str form))
         (stringify (+ 1 2))",
        "\"(+ 1 2)\""
    );
}

#[test]
fn test_syntax_quote_macro() {
    assert_eval!(
        "(defmacro twice [form] `(do ~form ~form))
         (def n (atom 0))
         (twice (swap! n inc))
         @n",
        "2"
    );
}

#[test]
fn test_auto_gensym_hygiene() {
    assert_eval!(
        "(defmacro swap-pair [a b] `(let [tmp# ~a] [~b tmp#]))
         (let [tmp :outer] (swap-pair 1 2))",
        "[2 1]"
    );
}

#[test]
fn test_defn_from_core_lib() {
    assert_eval!("(defn square [x] (* x x)) (square 5)", "25");
}

#[test]
fn test_when_and_when_not() {
    assert_eval!("(when true 1 2)", "2");
    assert_eval!("(when false 1)", "nil");
    assert_eval!("(when-not false :ok)", ":ok");
}

#[test]
fn test_cond() {
    assert_eval!(
        "(defn classify [n]
           (cond (neg? n) :neg
                 (zero? n) :zero
                 true :pos))
         [(classify -1) (classify 0) (classify 5)]",
        "[:neg :zero :pos]"
    );
    assert_eval!("(cond)", "nil");
}

#[test]
fn test_and_or_short_circuit() {
    assert_eval!("(and)", "true");
    assert_eval!("(and 1 2 3)", "3");
    assert_eval!("(and 1 nil 3)", "nil");
    assert_eval!("(or)", "nil");
    assert_eval!("(or nil false 3)", "3");
    assert_eval!("(or 1 2)", "1");
    // The later forms never evaluate once the answer is known.
    assert_eval!(
        "(def hits (atom 0))
         (or :early (swap! hits inc))
         @hits",
        "0"
    );
}

#[test]
fn test_threading_macros() {
    assert_eval!("(-> 1 (+ 2) (* 3))", "9");
    assert_eval!("(-> {:a {:b 3}} (get :a) (get :b))", "3");
    assert_eval!("(->> (range 6) (filter odd?) (map inc) (reduce +))", "12");
    assert_eval!("(-> 5 inc)", "6");
}

#[test]
fn test_if_let_when_let() {
    assert_eval!("(if-let [x (get {:a 1} :a)] x :missing)", "1");
    assert_eval!("(if-let [x (get {} :a)] x :missing)", ":missing");
    assert_eval!("(when-let [x 5] (* x 2))", "10");
    assert_eval!("(when-let [x nil] :never)", "nil");
}

#[test]
fn test_complement_and_constantly() {
    assert_eval!("((complement odd?) 2)", "true");
    assert_eval!("((constantly 7) 1 2 3)", "7");
}

#[test]
fn test_macro_var_flag() {
    assert_eval!(
        "(defmacro m [] 1)
         (defn probe [] 2)
         [(meta (var m)) (probe)]",
        "[nil 2]"
    );
}

#[test]
fn test_recursive_macro_expansion_depth_limited() {
    assert_eval_err_contains!(
        "(defmacro forever [] `(forever))
         (forever)",
        "too deep"
    );
}
