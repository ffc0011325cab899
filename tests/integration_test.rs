// ABOUTME: Integration tests exercising complete Vibe programs end to end

use vibe::env::Environment;
use vibe::eval::{Evaluator, ModuleResolver};
use vibe::value::Value;

struct NullResolver;

impl ModuleResolver for NullResolver {
    fn resolve(&self, path: &str) -> Result<String, String> {
        Err(format!("no modules available: {}", path))
    }
}

struct MapResolver(Vec<(&'static str, &'static str)>);

impl ModuleResolver for MapResolver {
    fn resolve(&self, path: &str) -> Result<String, String> {
        self.0
            .iter()
            .find(|(p, _)| *p == path)
            .map(|(_, src)| src.to_string())
            .ok_or_else(|| format!("not found: {}", path))
    }
}

fn run(source: &str) -> Value {
    let (program, errors) = vibe::parser::parse(source);
    assert!(errors.is_empty(), "parse errors: {:?}", errors);
    let resolver = NullResolver;
    let evaluator = Evaluator::new(&resolver);
    let env = Environment::new();
    evaluator.evaluate(&program, &env)
}

#[test]
fn factorial_recursion() {
    let code = r#"
    def factorial(n)
      if n <= 1 do
        return 1
      end
      return n * factorial(n - 1)
    end

    factorial(5)
    "#;
    assert_eq!(run(code), Value::Integer(120));
}

#[test]
fn fibonacci_recursion() {
    let code = r#"
    def fib(n)
      if n < 2 do
        return n
      end
      return fib(n - 1) + fib(n - 2)
    end

    fib(10)
    "#;
    assert_eq!(run(code), Value::Integer(55));
}

#[test]
fn closures_capture_their_defining_environment() {
    let code = r#"
    def make_adder(n)
      def adder(x)
        return n + x
      end
      return adder
    end

    add5 = make_adder(5)
    add100 = make_adder(100)
    [add5(10), add100(23)]
    "#;
    assert_eq!(
        run(code),
        Value::array(vec![Value::Integer(15), Value::Integer(123)])
    );
}

#[test]
fn spec_scenario_3_lowercase_int_annotation_sums_to_15() {
    // spec.md §8 scenario 3, verbatim: lowercase `int` must resolve to the
    // same builtin type as `Int` elsewhere in this suite.
    let code = "x: int = 5\ny: int = 10\nz: int = x + y\nz";
    assert_eq!(run(code), Value::Integer(15));
}

#[test]
fn spec_scenario_5_lowercase_function_return_type_closure_adds_to_15() {
    // spec.md §8 scenario 5, verbatim: `: function` is the lone deliberately
    // lowercase entry in the canonical type list and must match a real
    // `Function` value's runtime type.
    let code = r#"
    def makeAdder(x: int): function do
      def inner(y: int): int do
        x + y
      end
      inner
    end
    adder = makeAdder(5)
    adder(10)
    "#;
    assert_eq!(run(code), Value::Integer(15));
}

#[test]
fn while_loop_accumulates_state() {
    let code = r#"
    total: Int = 0
    i: Int = 1
    while i <= 10 do
      total = total + i
      i = i + 1
    end
    total
    "#;
    assert_eq!(run(code), Value::Integer(55));
}

#[test]
fn for_loop_over_a_range() {
    let code = r#"
    total: Int = 0
    for i in 1..5 do
      total = total + i
    end
    total
    "#;
    assert_eq!(run(code), Value::Integer(15));
}

#[test]
fn for_loop_over_an_array() {
    let code = r#"
    total: Int = 0
    for x in [10, 20, 30] do
      total = total + x
    end
    total
    "#;
    assert_eq!(run(code), Value::Integer(60));
}

#[test]
fn arrays_support_concatenation_indexing_and_append_on_write() {
    let code = r#"
    a = [1, 2, 3]
    b = a + [4]
    b[3] = 99
    [b.length(), b[0], b[3]]
    "#;
    assert_eq!(
        run(code),
        Value::array(vec![
            Value::Integer(4),
            Value::Integer(1),
            Value::Integer(99),
        ])
    );
}

#[test]
fn out_of_range_read_is_nil_not_an_error() {
    let code = "a = [1, 2, 3]\na[10]";
    assert_eq!(run(code), Value::Nil);
}

#[test]
fn classes_support_instantiation_ivars_and_inheritance() {
    let code = r#"
    class Animal
      def init(name)
        @name = name
      end

      def speak()
        return @name + " makes a sound"
      end
    end

    class Dog < Animal
      def speak()
        return super.speak() + " (woof!)"
      end
    end

    d = Dog.new("Rex")
    d.speak()
    "#;
    assert_eq!(
        run(code),
        Value::Str("Rex makes a sound (woof!)".to_string())
    );
}

#[test]
fn typed_assignment_rejects_mismatched_types() {
    let code = r#"
    x: Int = 1
    x = "oops"
    x
    "#;
    assert!(run(code).is_error());
}

#[test]
fn division_by_zero_is_an_error_value() {
    assert!(run("1 / 0").is_error());
}

#[test]
fn integer_arithmetic_does_not_silently_widen_to_float() {
    assert_eq!(run("3 + 4 * 2"), Value::Integer(11));
    match run("7 / 2") {
        Value::Integer(3) => {}
        other => panic!("expected integer division, got {:?}", other),
    }
    match run("7.0 / 2") {
        Value::Float(f) => assert!((f - 3.5).abs() < f64::EPSILON),
        other => panic!("expected float division, got {:?}", other),
    }
}

#[test]
fn power_is_right_associative() {
    // 2 ** (3 ** 2) == 2 ** 9 == 512, not (2 ** 3) ** 2 == 64
    assert_eq!(run("2 ** 3 ** 2"), Value::Integer(512));
}

#[test]
fn short_circuiting_boolean_operators() {
    assert_eq!(run("false && (1 / 0 == 0)"), Value::Boolean(false));
    assert_eq!(run("true || (1 / 0 == 0)"), Value::Boolean(true));
}

#[test]
fn require_executes_into_the_callers_root_environment() {
    let code = r#"
    require("lib")
    greet()
    "#;
    let (program, errors) = vibe::parser::parse(code);
    assert!(errors.is_empty());
    let resolver = MapResolver(vec![("lib", "def greet()\n  return \"hi\"\nend\n")]);
    let evaluator = Evaluator::new(&resolver);
    let env = Environment::new();
    assert_eq!(
        evaluator.evaluate(&program, &env),
        Value::Str("hi".to_string())
    );
}

#[test]
fn undefined_identifier_is_a_name_error() {
    assert!(run("totally_undefined_name").is_error());
}
