//! Syntax check of expressions passed to the debugger `print` command.
//!
//! The debugger understands only a small subset of OCaml expressions: (qualified) names,
//! history values, record fields, array and string indexing and dereference of references.
use crate::debugger::error::Error;
use chumsky::prelude::*;
use chumsky::Parser;
use itertools::Itertools;

type Err<'a> = extra::Err<Rich<'a, char>>;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Variable(String),
    /// `$N`, value from the debugger history.
    History(u32),
    Integer(i64),
    Field(Box<Expression>, String),
    ArrayIndex(Box<Expression>, u64),
    StringIndex(Box<Expression>, u64),
    Deref(Box<Expression>),
}

fn ident<'a>() -> impl Parser<'a, &'a str, &'a str, Err<'a>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_' || *c == '\'')
                .repeated(),
        )
        .to_slice()
        .labelled("identifier")
}

enum Postfix {
    Field(String),
    Array(u64),
    Str(u64),
}

pub fn parser<'a>() -> impl Parser<'a, &'a str, Expression, Err<'a>> {
    let expr = recursive(|expr| {
        let op = |c| just(c).padded();

        let variable = ident().map(|name: &str| Expression::Variable(name.to_string()));
        let history = just('$')
            .ignore_then(text::int(10).from_str().unwrapped())
            .map(Expression::History)
            .labelled("history value");
        let integer = text::int(10)
            .from_str()
            .unwrapped()
            .map(Expression::Integer)
            .labelled("integer");
        let atom = choice((
            variable,
            history,
            integer,
            expr.delimited_by(op('('), op(')')),
        ))
        .padded();

        let index = || text::int(10).from_str().unwrapped().padded();
        let array = just('.')
            .ignore_then(index().delimited_by(just('('), just(')')))
            .map(Postfix::Array)
            .labelled("array index");
        let string = just('.')
            .ignore_then(index().delimited_by(just('['), just(']')))
            .map(Postfix::Str)
            .labelled("string index");
        let field = just('.')
            .ignore_then(ident())
            .map(|name: &str| Postfix::Field(name.to_string()))
            .labelled("field name");

        let postfix = atom.foldl(
            choice((array, string, field)).padded().repeated(),
            |lhs, op| match op {
                Postfix::Field(name) => Expression::Field(Box::new(lhs), name),
                Postfix::Array(idx) => Expression::ArrayIndex(Box::new(lhs), idx),
                Postfix::Str(idx) => Expression::StringIndex(Box::new(lhs), idx),
            },
        );

        op('!')
            .repeated()
            .foldr(postfix, |_op, rhs| Expression::Deref(Box::new(rhs)))
    });

    expr.then_ignore(end())
}

/// Check expression syntax before it is sent to the debugger.
pub fn validate(input: &str) -> Result<Expression, Error> {
    parser().parse(input).into_result().map_err(|errors| {
        Error::InvalidExpression(
            input.to_string(),
            errors.iter().map(ToString::to_string).join("; "),
        )
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn var(name: &str) -> Box<Expression> {
        Box::new(Expression::Variable(name.to_string()))
    }

    #[test]
    fn test_expr_parsing() {
        struct TestCase {
            string: &'static str,
            expr: Expression,
        }
        let test_cases = vec![
            TestCase {
                string: "x",
                expr: Expression::Variable("x".to_string()),
            },
            TestCase {
                string: " counter' ",
                expr: Expression::Variable("counter'".to_string()),
            },
            TestCase {
                string: "Foo.bar",
                expr: Expression::Field(var("Foo"), "bar".to_string()),
            },
            TestCase {
                string: "!r",
                expr: Expression::Deref(var("r")),
            },
            TestCase {
                string: "(!r).field",
                expr: Expression::Field(
                    Box::new(Expression::Deref(var("r"))),
                    "field".to_string(),
                ),
            },
            TestCase {
                string: "arr.(3)",
                expr: Expression::ArrayIndex(var("arr"), 3),
            },
            TestCase {
                string: "s.[ 0 ]",
                expr: Expression::StringIndex(var("s"), 0),
            },
            TestCase {
                string: "$2",
                expr: Expression::History(2),
            },
            TestCase {
                string: "42",
                expr: Expression::Integer(42),
            },
        ];

        for tc in test_cases {
            let expr = validate(tc.string).unwrap();
            assert_eq!(expr, tc.expr, "input: {}", tc.string);
        }
    }

    #[test]
    fn test_invalid_expressions() {
        let cases = ["", "x +", "arr.(", "1x", "f x", "!", "(x"];
        for input in cases {
            assert!(
                matches!(validate(input), Err(Error::InvalidExpression(_, _))),
                "input: {input}"
            );
        }
    }
}
