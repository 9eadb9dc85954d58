use tinylisp::interpreter::DEFAULT_MAX_DEPTH;
use tinylisp::printer::{pr_str, PrintMode};
use tinylisp::reader::{read_str, ReadError};
use tinylisp::tokens::TokenizerError;
use tinylisp::{
    Buffer, Cell, ClosureScoping, Config, Diagnostic, Error, Interpreter, MemoryLoader,
};

fn interpreter() -> Interpreter {
    Interpreter::new(MemoryLoader::new(), Buffer::new())
}

fn run(source: &str) -> Cell {
    interpreter().eval_program(source).unwrap()
}

fn ints(xs: &[i64]) -> Cell {
    Cell::wrap_list(xs.iter().map(|&x| Cell::Int(x)).collect())
}

#[test]
fn arithmetic() {
    assert_eq!(run("(+ 1 2 3)"), Cell::Int(6));
    assert_eq!(run("(+ 1.5 2)"), Cell::Float(3.5));
    assert_eq!(run("(- 10 (* 2 3))"), Cell::Int(4));
    assert_eq!(run("(/ 7 2)"), Cell::Int(3));
    assert_eq!(run("(% 7 2)"), Cell::Int(1));
}

#[test]
fn division_by_zero() {
    assert!(matches!(
        interpreter().eval_program("(/ 1 0)"),
        Err(Error::DivisionByZero("/"))
    ));
}

#[test]
fn if_picks_a_branch() {
    assert_eq!(run("(if (< 1 2) \"yes\" \"no\")"), Cell::new_string("yes"));
    assert_eq!(run("(if (> 1 2) \"yes\" \"no\")"), Cell::new_string("no"));
    assert_eq!(run("(if false 1)"), Cell::Null);
}

#[test]
fn if_only_evaluates_the_chosen_branch() {
    assert_eq!(run("(if true 1 (/ 1 0))"), Cell::Int(1));
}

#[test]
fn while_loop() {
    assert_eq!(
        run("(set i 0) (set s 0) (while (< i 5) (set s (+ s i)) (set i (+ i 1))) s"),
        Cell::Int(10)
    );
}

#[test]
fn factorial() {
    let program = "
        ; classic recursion
        (defun fact (n)
            (if (< n 2)
                1
                (* n (fact (- n 1)))))
        (fact 5)";
    assert_eq!(run(program), Cell::Int(120));
}

#[test]
fn closures_require_exact_arity() {
    assert!(matches!(
        interpreter().eval_program("(defun f (a b) a) (f 1)"),
        Err(Error::BadArgCount(_))
    ));
}

#[test]
fn lists() {
    assert_eq!(run("(list 1 2 3)"), ints(&[1, 2, 3]));
    assert_eq!(run("(length (list 1 2 3))"), Cell::Int(3));
    assert_eq!(run("(get (list 1 2 3) 1)"), Cell::Int(2));
    assert_eq!(run("(append (list 1) 2 3)"), ints(&[1, 2, 3]));
    assert_eq!(run("(append null 1)"), ints(&[1]));
    assert_eq!(run("(set l (list 1)) (append l 2) l"), ints(&[1]));
}

#[test]
fn get_out_of_range() {
    assert!(matches!(
        interpreter().eval_program("(get (list 1 2 3) 3)"),
        Err(Error::IndexOutOfRange { index: 3, len: 3 })
    ));
}

#[test]
fn unbound_symbols_are_silently_null() {
    let mut interp = interpreter();
    assert_eq!(interp.eval_program("nothing-here").unwrap(), Cell::Null);
    assert!(interp.diagnostics().is_empty());
}

#[test]
fn calling_a_non_procedure_is_a_diagnostic() {
    let mut interp = interpreter();
    assert_eq!(interp.eval_program("(nope 1 2)").unwrap(), Cell::Null);
    assert_eq!(
        interp.take_diagnostics(),
        vec![Diagnostic::UndefinedProcedure("nope".into())]
    );
    assert!(interp.diagnostics().is_empty());

    assert_eq!(interp.eval_program("(set x 1) (x)").unwrap(), Cell::Null);
    assert_eq!(interp.diagnostics().len(), 1);
}

#[test]
fn procedures_are_values() {
    assert_eq!(run("(set add +) (add 1 2)"), Cell::Int(3));
    assert_eq!(run("(= + +)"), Cell::Bool(true));
    assert_eq!(run("(= + -)"), Cell::Bool(false));
    assert_eq!(run("(defun f () 1) (set g f) (= f g)"), Cell::Bool(true));
}

#[test]
fn set_inside_a_function_is_local() {
    assert_eq!(run("(defun f () (set l 5)) (f) l"), Cell::Null);
    assert_eq!(run("(set l 1) (defun f () (set l 5)) (f) l"), Cell::Int(1));
}

#[test]
fn setg_inside_a_function_is_global() {
    assert_eq!(run("(defun f () (setg g 5)) (f) g"), Cell::Int(5));
}

#[test]
fn functions_see_globals() {
    assert_eq!(run("(set k 10) (defun f (x) (+ x k)) (f 1)"), Cell::Int(11));
}

#[test]
fn parameters_shadow_globals() {
    assert_eq!(run("(set x 10) (defun f (x) x) (f 1)"), Cell::Int(1));
    assert_eq!(run("(set x 10) (defun f (x) x) (f 1) x"), Cell::Int(10));
}

#[test]
fn eval_special_form() {
    assert_eq!(run("(eval \"(+ 1 2)\")"), Cell::Int(3));
    assert_eq!(run("(eval (strcat \"(set z \" 4 \")\")) z"), Cell::Int(4));
    assert_eq!(run("(eval \"\")"), Cell::Null);
}

#[test]
fn eval_uses_the_current_environment() {
    assert_eq!(
        run("(defun f (x) (eval \"(set y (* x 2))\") y) (f 4)"),
        Cell::Int(8)
    );
    assert_eq!(run("(defun f (x) (eval \"(set y 1)\")) (f 4) y"), Cell::Null);
}

#[test]
fn typeof_reports_names() {
    assert_eq!(run("(typeof 1.5)"), Cell::new_string("Float"));
    assert_eq!(run("(defun f () 1) (typeof f)"), Cell::new_string("Proc"));
}

#[test]
fn output_goes_to_the_output_collaborator() {
    let out = Buffer::new();
    let mut interp = Interpreter::new(MemoryLoader::new(), out.clone());
    let program = r#"
        (print 1 " " 2.5)
        (println)
        (format "%d-%s\n" 3 "x")
        (println true (list))"#;
    interp.eval_program(program).unwrap();
    assert_eq!(out.contents(), "1 2.500000\n3-x\ntrue\n(  )\n");
}

#[test]
fn read_errors() {
    assert!(matches!(
        interpreter().eval_program("(+ 1"),
        Err(Error::Read(ReadError::UnexpectedEof))
    ));
    assert!(matches!(
        interpreter().eval_program(")"),
        Err(Error::Read(ReadError::UnexpectedCloseParen))
    ));
    assert!(matches!(
        interpreter().eval_program("(+ 12abc 1)"),
        Err(Error::Read(ReadError::BadInt(_)))
    ));
    assert!(matches!(
        interpreter().eval_program("(print \"unterminated)"),
        Err(Error::Read(ReadError::Tokenizer(TokenizerError::UnbalancedString)))
    ));
}

#[test]
fn forms_before_a_read_error_still_run() {
    let mut interp = interpreter();
    assert!(interp.eval_program("(set a 1) (set b").is_err());
    assert_eq!(interp.global().get("a"), Some(Cell::Int(1)));
}

#[test]
fn readable_representation_reads_back() {
    let mut interp = interpreter();
    let value = interp
        .eval_program("(list 1 2.0 \"three\" null true (list) (list -4.25 false))")
        .unwrap();
    let source = pr_str(&value, PrintMode::ReadableRepresentation);
    assert_eq!(interp.eval_program(&source).unwrap(), value);
}

#[test]
fn readable_literals_read_back_as_equal_cells() {
    let literals = vec![
        Cell::Int(-7),
        Cell::Int(0),
        Cell::Float(2.5),
        Cell::Float(3.0),
        Cell::Float(-0.125),
        Cell::new_string("two words"),
        Cell::new_string(""),
    ];
    for literal in literals {
        let source = pr_str(&literal, PrintMode::ReadableRepresentation);
        assert_eq!(read_str(&source), Ok(literal.clone()), "{}", source);
    }
}

const SUM_DOWN: &str = "(defun f (n) (if (< n 1) 0 (+ (f (- n 1)) n))) (f 3)";

#[test]
fn fresh_scoping_keeps_each_call_separate() {
    assert_eq!(run(SUM_DOWN), Cell::Int(6));
}

#[test]
fn shared_scoping_lets_recursion_clobber_parameters() {
    let config = Config {
        closure_scoping: ClosureScoping::SharedPerFunction,
        ..Config::default()
    };
    let mut interp = Interpreter::with_config(config, MemoryLoader::new(), Buffer::new());
    assert_eq!(interp.eval_program(SUM_DOWN).unwrap(), Cell::Int(0));
}

#[test]
fn runaway_recursion_overflows() {
    let config = Config {
        max_depth: 100,
        ..Config::default()
    };
    let mut interp = Interpreter::with_config(config, MemoryLoader::new(), Buffer::new());
    assert!(matches!(
        interp.eval_program("(defun forever (n) (forever (+ n 1))) (forever 0)"),
        Err(Error::StackOverflow(100))
    ));
    assert_eq!(interp.eval_program("(+ 1 1)").unwrap(), Cell::Int(2));
}

const COUNT_DOWN: &str = "(defun f (n) (if (< n 1) 0 (+ 1 (f (- n 1)))))";

#[test]
fn default_depth_limit_reports_overflow_instead_of_crashing() {
    let mut interp = interpreter();
    interp.eval_program(COUNT_DOWN).unwrap();
    assert!(matches!(
        interp.eval_program("(f 100000)"),
        Err(Error::StackOverflow(limit)) if limit == DEFAULT_MAX_DEPTH
    ));
    assert_eq!(interp.eval_program("(f 300)").unwrap(), Cell::Int(300));
}

#[test]
fn deeply_nested_source_is_rejected() {
    let config = Config {
        max_read_depth: 10,
        ..Config::default()
    };
    let mut interp = Interpreter::with_config(config, MemoryLoader::new(), Buffer::new());
    let source = format!("{}{}", "(list ".repeat(20), ")".repeat(20));
    assert!(matches!(
        interp.eval_program(&source),
        Err(Error::Read(ReadError::TooDeep(10)))
    ));
}
