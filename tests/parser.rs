#[cfg(test)]
mod parser_tests {
    use rox as lox;

    use lox::ast::{ExprIds, ExprKind, Stmt};
    use lox::ast_printer::AstPrinter;
    use lox::parser::Parser;
    use lox::scanner::scan_tokens;
    use lox::token::{Token, TokenType};
    use lox::Lox;

    fn assert_parses_to(source: &str, expected: &[&str]) {
        let mut lox = Lox::new();
        let statements = match lox.parse(source) {
            Ok(statements) => statements,
            Err(errors) => panic!("unexpected parse errors: {:?}", errors),
        };

        let printed: Vec<String> = statements.iter().map(AstPrinter::print_stmt).collect();

        assert_eq!(printed, expected);
    }

    fn parse_errors(source: &str) -> Vec<String> {
        let mut lox = Lox::new();

        match lox.parse(source) {
            Ok(_) => panic!("expected parse errors for {:?}", source),
            Err(errors) => errors.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_parses_to(
            "print 1 + 2 * 3 - 4 / 2;",
            &["(print (- (+ 1.0 (* 2.0 3.0)) (/ 4.0 2.0)))"],
        );
    }

    #[test]
    fn test_unary_grouping_and_equality() {
        assert_parses_to(
            "print -(1 - 2) == !true;",
            &["(print (== (- (group (- 1.0 2.0))) (! true)))"],
        );
    }

    #[test]
    fn test_logical_operators_bind_looser_than_equality() {
        assert_parses_to(
            "a or b and c == d;",
            &["(; (or a (and b (== c d))))"],
        );
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_parses_to("a = b = 3;", &["(; (= a (= b 3.0)))"]);
    }

    #[test]
    fn test_property_get_set_and_calls() {
        assert_parses_to(
            "a.b.c = f(1, \"two\")(x).y;",
            &["(; (set (. a b) c (. (call (call f 1.0 two) x) y)))"],
        );
    }

    #[test]
    fn test_for_is_desugared_into_while() {
        assert_parses_to(
            "for (var i = 0; i < 3; i = i + 1) print i;",
            &["(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"],
        );
    }

    #[test]
    fn test_for_without_clauses_loops_on_true() {
        assert_parses_to("for (;;) print 1;", &["(while true (print 1.0))"]);
    }

    #[test]
    fn test_if_else_and_blocks() {
        assert_parses_to(
            "if (x) { print 1; } else print 2;",
            &["(if x (block (print 1.0)) (print 2.0))"],
        );
    }

    #[test]
    fn test_function_and_return() {
        assert_parses_to(
            "fun add(a, b) { return a + b; }\nfun nop() { return; }",
            &[
                "(fun add (a b) (return (+ a b)))",
                "(fun nop () (return))",
            ],
        );
    }

    #[test]
    fn test_class_with_superclass_and_super_call() {
        assert_parses_to(
            "class B < A { init(x) { this.x = x; } get() { return super.get(); } }",
            &["(class B < A (fun init (x) (; (set this x x))) (fun get () (return (call (super get)))))"],
        );
    }

    #[test]
    fn test_missing_semicolon_reports_at_end() {
        assert_eq!(
            parse_errors("print 1"),
            vec!["[line 1] Error at end: Expect ';' after value."]
        );
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(
            parse_errors("1 = 2;"),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
    }

    #[test]
    fn test_recovers_and_reports_every_bad_statement() {
        let errors = parse_errors("var = 1;\nprint 2;\nvar x = ;");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error at '=': Expect variable name.",
                "[line 3] Error at ';': Expect expression.",
            ]
        );
    }

    #[test]
    fn test_scan_and_parse_errors_reported_together() {
        let errors = parse_errors("@ print ;");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error: Unexpected character: '@'.",
                "[line 1] Error at ';': Expect expression.",
            ]
        );
    }

    #[test]
    fn test_too_many_arguments() {
        let args: Vec<&str> = vec!["0"; 256];
        let source = format!("f({});", args.join(", "));

        let errors = parse_errors(&source);

        assert_eq!(errors.len(), 1);
        assert!(errors[0].ends_with("Can't have more than 255 arguments."));
    }

    #[test]
    fn test_too_many_parameters() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source = format!("fun f({}) {{}}", params.join(", "));

        let errors = parse_errors(&source);

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            "[line 1] Error at 'p255': Can't have more than 255 parameters."
        );
    }

    #[test]
    fn test_token_slice_without_eof_does_not_panic() {
        let tokens = vec![Token::new(TokenType::IDENTIFIER, "x", None, 1)];

        let mut ids = ExprIds::new();
        let mut parser = Parser::new(&tokens, &mut ids);
        let statements = parser.parse();
        let errors = parser.take_errors();

        assert!(statements.is_empty());
        assert_eq!(
            errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["[line 1] Error at 'x': Expect ';' after expression."]
        );
    }

    #[test]
    fn test_super_requires_method_name() {
        let errors = parse_errors("class B < A { f() { super; } }");

        assert!(errors[0].ends_with("Expect '.' after 'super'."));
    }

    #[test]
    fn test_every_expression_gets_its_own_id() {
        let (tokens, errors) = scan_tokens("a + a;");
        assert!(errors.is_empty());

        let mut ids = ExprIds::new();
        let mut parser = Parser::new(&tokens, &mut ids);
        let statements = parser.parse();

        let Stmt::Expression(expr) = &statements[0] else {
            panic!("expected an expression statement");
        };

        let ExprKind::Binary { left, right, .. } = &expr.kind else {
            panic!("expected a binary expression");
        };

        assert_ne!(left.id, right.id);
        assert_ne!(expr.id, left.id);
        assert_ne!(expr.id, right.id);
    }
}
