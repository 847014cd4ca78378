mod common;

#[cfg(test)]
mod interpreter_tests {
    use std::io::Cursor;

    use rox as lox;

    use crate::common::{lox_with_input, run, run_err, run_ok, SharedBuf};

    // ───────────────────────────── expressions ─────────────────────────────

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(run_ok("print 1 + 2 * 3;"), vec!["7"]);
        assert_eq!(run_ok("print (1 + 2) * 3;"), vec!["9"]);
        assert_eq!(run_ok("print 10 / 4;"), vec!["2.5"]);
        assert_eq!(run_ok("print -3 - -3;"), vec!["0"]);
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        assert_eq!(run_ok("print 1 / 0;"), vec!["inf"]);
        assert_eq!(run_ok("print -1 / 0;"), vec!["-inf"]);
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(run_ok("print \"foo\" + \"bar\";"), vec!["foobar"]);
    }

    #[test]
    fn test_truthiness() {
        assert_eq!(
            run_ok("print !0; print !\"\"; print !nil; print !false;"),
            vec!["false", "false", "true", "true"]
        );
    }

    #[test]
    fn test_equality() {
        assert_eq!(
            run_ok("print nil == false; print nil == nil; print 1 == 1; print \"a\" == \"a\"; print 1 == \"1\";"),
            vec!["false", "true", "true", "true", "false"]
        );
    }

    #[test]
    fn test_objects_compare_by_identity() {
        assert_eq!(
            run_ok("class A {} var a = A(); var b = A(); print a == a; print a == b; print A == A;"),
            vec!["true", "false", "true"]
        );
    }

    #[test]
    fn test_logical_operators_yield_operands() {
        assert_eq!(
            run_ok("print nil or \"x\"; print 1 and 2; print false and boom;"),
            vec!["x", "2", "false"]
        );
    }

    #[test]
    fn test_comparison() {
        assert_eq!(
            run_ok("print 1 < 2; print 2 <= 2; print 3 > 4; print 4 >= 5;"),
            vec!["true", "true", "false", "false"]
        );
    }

    // ───────────────────────────── statements ──────────────────────────────

    #[test]
    fn test_block_shadowing() {
        assert_eq!(
            run_ok("var a = 1; { var a = 2; print a; } print a;"),
            vec!["2", "1"]
        );
    }

    #[test]
    fn test_uninitialized_variable_is_nil() {
        assert_eq!(run_ok("var a; print a;"), vec!["nil"]);
    }

    #[test]
    fn test_while_and_for_loops() {
        assert_eq!(
            run_ok("var i = 0; while (i < 3) { print i; i = i + 1; }"),
            vec!["0", "1", "2"]
        );

        assert_eq!(
            run_ok("var sum = 0; for (var i = 1; i <= 4; i = i + 1) sum = sum + i; print sum;"),
            vec!["10"]
        );
    }

    #[test]
    fn test_if_else() {
        assert_eq!(
            run_ok("if (nil) print 1; else print 2; if (0) print 3;"),
            vec!["2", "3"]
        );
    }

    // ───────────────────────────── functions ───────────────────────────────

    #[test]
    fn test_recursion() {
        let source = r#"
            fun fib(n) {
                if (n < 2) return n;
                return fib(n - 1) + fib(n - 2);
            }
            print fib(10);
        "#;

        assert_eq!(run_ok(source), vec!["55"]);
    }

    #[test]
    fn test_return_unwinds_loops() {
        let source = r#"
            fun first() {
                for (var i = 0; ; i = i + 1) {
                    while (true) { return i; }
                }
            }
            print first();
        "#;

        assert_eq!(run_ok(source), vec!["0"]);
    }

    #[test]
    fn test_function_without_return_yields_nil() {
        assert_eq!(run_ok("fun f() {} print f();"), vec!["nil"]);
    }

    #[test]
    fn test_closure_counter() {
        let source = r#"
            fun makeCounter() {
                var i = 0;
                fun count() {
                    i = i + 1;
                    print i;
                }
                return count;
            }
            var counter = makeCounter();
            counter();
            counter();
        "#;

        assert_eq!(run_ok(source), vec!["1", "2"]);
    }

    #[test]
    fn test_closures_share_captured_binding() {
        let source = r#"
            var get;
            var set;
            {
                var shared = "before";
                fun g() { return shared; }
                fun s(v) { shared = v; }
                get = g;
                set = s;
            }
            set("after");
            print get();
        "#;

        assert_eq!(run_ok(source), vec!["after"]);
    }

    #[test]
    fn test_static_scoping_ignores_later_shadowing() {
        let source = r#"
            var a = "global";
            {
                fun showA() { print a; }
                showA();
                var a = "block";
                showA();
            }
        "#;

        assert_eq!(run_ok(source), vec!["global", "global"]);
    }

    #[test]
    fn test_stringification_of_callables_and_objects() {
        assert_eq!(
            run_ok("fun f() {} class K {} print f; print clock; print K; print K();"),
            vec!["<fn f>", "<native fn>", "K", "K instance"]
        );
    }

    // ───────────────────────────── classes ─────────────────────────────────

    #[test]
    fn test_fields_and_methods() {
        let source = r#"
            class Bagel {
                eat() { print "Crunch " + this.kind; }
            }
            var b = Bagel();
            b.kind = "sesame";
            b.eat();
        "#;

        assert_eq!(run_ok(source), vec!["Crunch sesame"]);
    }

    #[test]
    fn test_fields_shadow_methods() {
        let source = r#"
            class A { m() { return "method"; } }
            var a = A();
            a.m = "field";
            print a.m;
        "#;

        assert_eq!(run_ok(source), vec!["field"]);
    }

    #[test]
    fn test_bound_method_keeps_receiver() {
        let source = r#"
            class Person {
                init(name) { this.name = name; }
                greet() { print "hi " + this.name; }
            }
            var greet = Person("jane").greet;
            greet();
        "#;

        assert_eq!(run_ok(source), vec!["hi jane"]);
    }

    #[test]
    fn test_initializer_always_yields_instance() {
        let source = r#"
            class Foo {
                init() {
                    this.x = 1;
                    return;
                }
            }
            var f = Foo();
            print f.x;
            print f.init() == f;
        "#;

        assert_eq!(run_ok(source), vec!["1", "true"]);
    }

    #[test]
    fn test_class_arity_comes_from_init() {
        let errors = run_err("class P { init(a, b) {} } P(1);");

        assert_eq!(
            errors,
            vec!["[line 1] Runtime error at ')': Expected 2 arguments but got 1."]
        );
    }

    #[test]
    fn test_inherited_methods_and_super() {
        let source = r#"
            class A {
                method() { print "A method"; }
            }
            class B < A {
                method() { print "B method"; }
                test() { super.method(); }
            }
            class C < B {}
            C().test();
            C().method();
        "#;

        assert_eq!(run_ok(source), vec!["A method", "B method"]);
    }

    #[test]
    fn test_super_method_runs_on_original_instance() {
        let source = r#"
            class Base {
                init(name) { this.name = name; }
                describe() { return "I am " + this.name; }
            }
            class Derived < Base {
                init(name) { super.init(name + "!"); }
                describe() { return super.describe() + " (derived)"; }
            }
            print Derived("d").describe();
        "#;

        assert_eq!(run_ok(source), vec!["I am d! (derived)"]);
    }

    #[test]
    fn test_inherited_init_sets_arity() {
        let source = r#"
            class A { init(x) { this.x = x; } }
            class B < A {}
            print B(7).x;
        "#;

        assert_eq!(run_ok(source), vec!["7"]);
    }

    // ───────────────────────────── runtime errors ──────────────────────────

    #[test]
    fn test_operand_type_errors() {
        assert_eq!(
            run_err("print 1 + \"a\";"),
            vec!["[line 1] Runtime error at '+': Operands must be two numbers or two strings."]
        );

        assert_eq!(
            run_err("print -\"x\";"),
            vec!["[line 1] Runtime error at '-': Operand must be a number."]
        );

        assert_eq!(
            run_err("print 1 < nil;"),
            vec!["[line 1] Runtime error at '<': Operands must be numbers."]
        );
    }

    #[test]
    fn test_undefined_variable() {
        assert_eq!(
            run_err("print x;"),
            vec!["[line 1] Runtime error at 'x': Undefined variable 'x'."]
        );

        assert_eq!(
            run_err("y = 1;"),
            vec!["[line 1] Runtime error at 'y': Undefined variable 'y'."]
        );
    }

    #[test]
    fn test_calling_non_callable() {
        assert_eq!(
            run_err("\"str\"();"),
            vec!["[line 1] Runtime error at ')': Can only call functions and classes."]
        );
    }

    #[test]
    fn test_function_arity_mismatch() {
        assert_eq!(
            run_err("fun f(a, b) {}\nf(1);"),
            vec!["[line 2] Runtime error at ')': Expected 2 arguments but got 1."]
        );
    }

    #[test]
    fn test_property_errors() {
        assert_eq!(
            run_err("var a = 1; print a.x;"),
            vec!["[line 1] Runtime error at 'x': Only instances have properties."]
        );

        assert_eq!(
            run_err("var a = 1; a.x = 2;"),
            vec!["[line 1] Runtime error at 'x': Only instances have fields."]
        );

        assert_eq!(
            run_err("class A {} A().missing;"),
            vec!["[line 1] Runtime error at 'missing': Undefined property 'missing'."]
        );
    }

    #[test]
    fn test_superclass_must_be_a_class() {
        assert_eq!(
            run_err("var NotAClass = 1; class B < NotAClass {}"),
            vec!["[line 1] Runtime error at 'NotAClass': Superclass must be a class."]
        );
    }

    #[test]
    fn test_missing_super_method() {
        let errors = run_err("class A {} class B < A { m() { return super.nope; } } B().m();");

        assert_eq!(
            errors,
            vec!["[line 1] Runtime error at 'nope': Undefined property 'nope'."]
        );
    }

    #[test]
    fn test_runtime_error_halts_program() {
        let (out, result) = run("print 1;\nprint nil + 1;\nprint 2;");

        assert_eq!(out, "1\n");

        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_runtime());
        assert_eq!(errors[0].line(), Some(2));
        assert_eq!(errors[0].exit_code(), 70);
    }

    // ───────────────────────────── natives ─────────────────────────────────

    #[test]
    fn test_clock_is_a_positive_number() {
        assert_eq!(run_ok("var t = clock(); print t > 0; print t - t;"), vec!["true", "0"]);
    }

    #[test]
    fn test_read_line_strips_terminators() {
        let (mut lox, out) = lox_with_input("hello\r\nworld\n");

        lox.run("print readLine(); print readLine(); print readLine() == \"\";")
            .unwrap();

        assert_eq!(out.contents(), "hello\nworld\ntrue\n");
    }

    #[test]
    fn test_read_line_replaces_invalid_utf8() {
        let out = SharedBuf::default();
        let mut lox = lox::Lox::with_io(
            Box::new(out.clone()),
            Box::new(Cursor::new(vec![0xff, 0xfe, b'\n'])),
        );

        lox.run("print \"a\"; var l = readLine(); print l == \"\"; print \"b\";")
            .unwrap();

        assert_eq!(out.contents(), "a\nfalse\nb\n");
    }

    #[test]
    fn test_natives_are_globals() {
        let (lox, _) = lox_with_input("");

        assert_eq!(lox.interpreter().global_names(), vec!["clock", "readLine"]);
    }

    // ───────────────────────────── sessions ────────────────────────────────

    #[test]
    fn test_state_persists_across_runs() {
        let (mut lox, out) = lox_with_input("");

        lox.run("var a = 1;").unwrap();
        lox.run("fun f() { var local = a; return local + 1; }").unwrap();
        lox.run("{ var b = f(); print b; }").unwrap();

        assert_eq!(out.contents(), "2\n");
    }

    #[test]
    fn test_runtime_error_does_not_poison_next_run() {
        let (mut lox, out) = lox_with_input("");

        let errors = lox.run("{ var a = 1; print nil + a; }").unwrap_err();
        assert!(errors[0].is_runtime());

        lox.run("var a = 2; print a;").unwrap();

        assert_eq!(out.contents(), "2\n");
    }

    #[test]
    fn test_static_error_is_reported_with_exit_code() {
        let (mut lox, _) = lox_with_input("");

        let errors: Vec<lox::LoxError> = lox.run("print ;").unwrap_err();

        assert!(errors.iter().all(|e| e.is_static()));
        assert_eq!(errors[0].exit_code(), 65);
    }
}
