//! Conversion Module
//!
//! Lowers the binding parser's expression AST into output and IR expressions.

use crate::error::{location, CompileError, Result};
use crate::expression_parser::ast::{self, ParseSpan, AST};
use crate::output::output_ast::{
    BinaryOperator, BinaryOperatorExpr, ConditionalExpr, Expression, InvokeFunctionExpr,
    LiteralArrayExpr, LiteralExpr, LiteralMapEntry, LiteralMapExpr, LiteralValue, NotExpr,
    ReadKeyExpr, ReadPropExpr, TypeofExpr, UnaryOperator, UnaryOperatorExpr, VoidExpr,
};
use crate::parse_util::ParseSourceSpan;
use crate::template::pipeline::ir::expression::{
    ContextExpr, EmptyExpr, LexicalReadExpr, PipeBindingExpr, SafeInvokeFunctionExpr,
    SafeKeyedReadExpr, SafePropertyReadExpr,
};
use crate::template::pipeline::ir::{Namespace, SlotHandle};
use crate::template::pipeline::src::compilation::CompilationJob;

/// Binary operator mappings from string to BinaryOperator
pub static BINARY_OPERATORS: &[(&str, BinaryOperator)] = &[
    ("&&", BinaryOperator::And),
    (">", BinaryOperator::Bigger),
    (">=", BinaryOperator::BiggerEquals),
    ("|", BinaryOperator::BitwiseOr),
    ("&", BinaryOperator::BitwiseAnd),
    ("/", BinaryOperator::Divide),
    ("=", BinaryOperator::Assign),
    ("==", BinaryOperator::Equals),
    ("===", BinaryOperator::Identical),
    ("<", BinaryOperator::Lower),
    ("<=", BinaryOperator::LowerEquals),
    ("-", BinaryOperator::Minus),
    ("%", BinaryOperator::Modulo),
    ("**", BinaryOperator::Exponentiation),
    ("*", BinaryOperator::Multiply),
    ("!=", BinaryOperator::NotEquals),
    ("!==", BinaryOperator::NotIdentical),
    ("??", BinaryOperator::NullishCoalesce),
    ("||", BinaryOperator::Or),
    ("+", BinaryOperator::Plus),
    ("in", BinaryOperator::In),
];

pub fn binary_operator_from_str(op: &str) -> Option<BinaryOperator> {
    BINARY_OPERATORS
        .iter()
        .find(|(k, _)| *k == op)
        .map(|(_, v)| *v)
}

pub fn key_for_namespace(namespace: Namespace) -> Option<&'static str> {
    match namespace {
        Namespace::SVG => Some("svg"),
        Namespace::Math => Some("math"),
        Namespace::HTML => None,
    }
}

/// Re-applies the `:ns:` prefix a tag name was split from.
pub fn prefix_with_namespace(stripped_tag: &str, namespace: Namespace) -> String {
    match key_for_namespace(namespace) {
        Some(key) => format!(":{}:{}", key, stripped_tag),
        None => stripped_tag.to_string(),
    }
}

/// Maps a span relative to an expression onto the template file, using the span of the
/// attribute or block the expression was parsed from.
pub fn convert_source_span(
    span: &ParseSpan,
    base_source_span: Option<&ParseSourceSpan>,
) -> Option<ParseSourceSpan> {
    let base = base_source_span?;
    let start = base.start.move_by(span.start as i64);
    let end = base.start.move_by(span.end as i64);
    Some(ParseSourceSpan::new(start, end))
}

fn unsupported(
    ast: &AST,
    reason: &'static str,
    base_source_span: Option<&ParseSourceSpan>,
) -> CompileError {
    let span = convert_source_span(&ast.span(), base_source_span);
    CompileError::UnsupportedExpression {
        kind: ast.type_name(),
        reason,
        location: location(span.as_ref().or(base_source_span)),
    }
}

fn convert_all(
    asts: &[Box<AST>],
    job: &mut dyn CompilationJob,
    base_source_span: Option<&ParseSourceSpan>,
) -> Result<Vec<Expression>> {
    asts.iter()
        .map(|arg| convert_ast(arg, job, base_source_span))
        .collect()
}

/// Convert a template AST expression into an output expression.
///
/// Reads from the implicit receiver stay lexical (`LexicalRead`) until name resolution decides
/// whether they refer to a local or to the component. Pipes allocate their own xref.
pub fn convert_ast(
    ast: &AST,
    job: &mut dyn CompilationJob,
    base_source_span: Option<&ParseSourceSpan>,
) -> Result<Expression> {
    let span = |s: &ParseSpan| convert_source_span(s, base_source_span);

    let expr = match ast {
        AST::PropertyRead(prop) => match *prop.receiver {
            AST::ImplicitReceiver(_) => {
                Expression::LexicalRead(LexicalReadExpr::new(prop.name.clone(), span(&prop.span)))
            }
            _ => Expression::ReadProp(ReadPropExpr {
                receiver: Box::new(convert_ast(&prop.receiver, job, base_source_span)?),
                name: prop.name.clone(),
                source_span: span(&prop.span),
            }),
        },
        AST::Call(call) => {
            if matches!(*call.receiver, AST::ImplicitReceiver(_)) {
                return Err(unsupported(
                    ast,
                    "a call must have an explicit callee",
                    base_source_span,
                ));
            }
            Expression::InvokeFn(InvokeFunctionExpr {
                fn_: Box::new(convert_ast(&call.receiver, job, base_source_span)?),
                args: convert_all(&call.args, job, base_source_span)?,
                source_span: span(&call.span),
                pure: false,
            })
        }
        AST::LiteralPrimitive(lit) => {
            let value = match &lit.value {
                ast::LiteralValue::String(s) => LiteralValue::String(s.clone()),
                ast::LiteralValue::Number(n) => LiteralValue::Number(*n),
                ast::LiteralValue::Boolean(b) => LiteralValue::Bool(*b),
                ast::LiteralValue::Null => LiteralValue::Null,
                ast::LiteralValue::Undefined => LiteralValue::Undefined,
            };
            Expression::Literal(LiteralExpr {
                value,
                source_span: span(&lit.span),
            })
        }
        AST::Unary(un) => {
            let operator = match un.operator.as_str() {
                "+" => UnaryOperator::Plus,
                "-" => UnaryOperator::Minus,
                _ => return Err(unsupported(ast, "unknown unary operator", base_source_span)),
            };
            Expression::Unary(UnaryOperatorExpr {
                operator,
                expr: Box::new(convert_ast(&un.expr, job, base_source_span)?),
                source_span: span(&un.span),
            })
        }
        AST::Binary(bin) => {
            let Some(operator) = binary_operator_from_str(&bin.operation) else {
                return Err(unsupported(ast, "unknown binary operator", base_source_span));
            };
            Expression::BinaryOp(BinaryOperatorExpr {
                operator,
                lhs: Box::new(convert_ast(&bin.left, job, base_source_span)?),
                rhs: Box::new(convert_ast(&bin.right, job, base_source_span)?),
                source_span: span(&bin.span),
            })
        }
        AST::ThisReceiver(_) => Expression::Context(ContextExpr {
            view: job.root_xref(),
        }),
        AST::KeyedRead(keyed) => Expression::ReadKey(ReadKeyExpr {
            receiver: Box::new(convert_ast(&keyed.receiver, job, base_source_span)?),
            index: Box::new(convert_ast(&keyed.key, job, base_source_span)?),
            source_span: span(&keyed.span),
        }),
        AST::Chain(_) => {
            return Err(unsupported(
                ast,
                "chains are only allowed in event handlers",
                base_source_span,
            ))
        }
        AST::LiteralMap(map) => Expression::LiteralMap(LiteralMapExpr {
            entries: map
                .keys
                .iter()
                .zip(map.values.iter())
                .map(|(key, value)| {
                    Ok(LiteralMapEntry {
                        key: key.key.clone(),
                        value: Box::new(convert_ast(value, job, base_source_span)?),
                        quoted: key.quoted,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            source_span: span(&map.span),
        }),
        AST::LiteralArray(arr) => Expression::LiteralArray(LiteralArrayExpr {
            entries: convert_all(&arr.expressions, job, base_source_span)?,
            source_span: span(&arr.span),
        }),
        AST::Conditional(cond) => Expression::Conditional(ConditionalExpr {
            condition: Box::new(convert_ast(&cond.condition, job, base_source_span)?),
            true_case: Box::new(convert_ast(&cond.true_exp, job, base_source_span)?),
            false_case: Some(Box::new(convert_ast(&cond.false_exp, job, base_source_span)?)),
            source_span: span(&cond.span),
        }),
        // A non-null assertion has no runtime effect.
        AST::NonNullAssert(nn) => convert_ast(&nn.expression, job, base_source_span)?,
        AST::BindingPipe(pipe) => {
            let target = job.allocate_xref_id();
            let mut args = vec![convert_ast(&pipe.exp, job, base_source_span)?];
            args.extend(convert_all(&pipe.args, job, base_source_span)?);
            Expression::PipeBinding(PipeBindingExpr {
                target,
                target_slot: SlotHandle::new(),
                name: pipe.name.clone(),
                args,
            })
        }
        AST::SafeKeyedRead(safe) => Expression::SafeKeyedRead(SafeKeyedReadExpr {
            receiver: Box::new(convert_ast(&safe.receiver, job, base_source_span)?),
            index: Box::new(convert_ast(&safe.key, job, base_source_span)?),
            source_span: span(&safe.span),
        }),
        AST::SafePropertyRead(safe) => Expression::SafePropertyRead(SafePropertyReadExpr {
            receiver: Box::new(convert_ast(&safe.receiver, job, base_source_span)?),
            name: safe.name.clone(),
        }),
        AST::SafeCall(call) => Expression::SafeInvokeFunction(SafeInvokeFunctionExpr {
            receiver: Box::new(convert_ast(&call.receiver, job, base_source_span)?),
            args: convert_all(&call.args, job, base_source_span)?,
        }),
        AST::EmptyExpr(empty) => Expression::Empty(EmptyExpr {
            source_span: span(&empty.span),
        }),
        AST::PrefixNot(not) => Expression::NotExpr(NotExpr {
            condition: Box::new(convert_ast(&not.expression, job, base_source_span)?),
            source_span: span(&not.span),
        }),
        AST::TypeofExpression(ty) => Expression::TypeOf(TypeofExpr {
            expr: Box::new(convert_ast(&ty.expression, job, base_source_span)?),
            source_span: span(&ty.span),
        }),
        AST::VoidExpression(void) => Expression::Void(VoidExpr {
            expr: Box::new(convert_ast(&void.expression, job, base_source_span)?),
            source_span: span(&void.span),
        }),
        AST::ParenthesizedExpression(paren) => {
            convert_ast(&paren.expression, job, base_source_span)?
        }
        AST::ImplicitReceiver(_) => {
            return Err(unsupported(
                ast,
                "the implicit receiver is only valid as the target of a read",
                base_source_span,
            ))
        }
        AST::Interpolation(_) => {
            return Err(unsupported(
                ast,
                "interpolation is not allowed in this position",
                base_source_span,
            ))
        }
    };
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerOptions;
    use crate::template::pipeline::src::compilation::ComponentCompilationJob;

    fn job() -> ComponentCompilationJob {
        ComponentCompilationJob::new("TestCmp", CompilerOptions::default())
    }

    #[test]
    fn implicit_reads_become_lexical() {
        let mut job = job();
        let expr = convert_ast(&AST::read("isOn"), &mut job, None).unwrap();
        match expr {
            Expression::LexicalRead(read) => assert_eq!(read.name, "isOn"),
            other => panic!("expected a lexical read, got {other:?}"),
        }
    }

    #[test]
    fn this_reads_go_through_root_context() {
        let mut job = job();
        let root = job.root_xref();
        let expr = convert_ast(&AST::prop(AST::this_receiver(), "name"), &mut job, None).unwrap();
        let Expression::ReadProp(read) = expr else {
            panic!("expected a property read");
        };
        assert_eq!(*read.receiver, Expression::Context(ContextExpr { view: root }));
        assert_eq!(read.name, "name");
    }

    #[test]
    fn pipes_allocate_fresh_xrefs() {
        let mut job = job();
        let pipe = AST::pipe(AST::read("value"), "async", vec![AST::number(1.0)]);
        let first = convert_ast(&pipe, &mut job, None).unwrap();
        let second = convert_ast(&pipe, &mut job, None).unwrap();
        let (Expression::PipeBinding(a), Expression::PipeBinding(b)) = (first, second) else {
            panic!("expected pipe bindings");
        };
        assert_ne!(a.target, b.target);
        assert_eq!(a.args.len(), 2);
        assert_eq!(a.name, "async");
    }

    #[test]
    fn binary_operators_map_by_symbol() {
        let mut job = job();
        let expr = convert_ast(
            &AST::binary("??", AST::read("a"), AST::number(0.0)),
            &mut job,
            None,
        )
        .unwrap();
        let Expression::BinaryOp(bin) = expr else {
            panic!("expected a binary expression");
        };
        assert_eq!(bin.operator, BinaryOperator::NullishCoalesce);
        assert!(binary_operator_from_str("+=").is_none());
    }

    #[test]
    fn rejects_chains_and_bare_calls() {
        let mut job = job();
        let chain = AST::chain(vec![AST::read("a"), AST::read("b")]);
        assert!(matches!(
            convert_ast(&chain, &mut job, None),
            Err(CompileError::UnsupportedExpression { kind: "Chain", .. })
        ));

        let bare_call = AST::call(AST::implicit_receiver(), vec![]);
        assert!(matches!(
            convert_ast(&bare_call, &mut job, None),
            Err(CompileError::UnsupportedExpression { kind: "Call", .. })
        ));
    }

    #[test]
    fn namespaces_prefix_tags() {
        assert_eq!(prefix_with_namespace("svg", Namespace::SVG), ":svg:svg");
        assert_eq!(prefix_with_namespace("div", Namespace::HTML), "div");
    }
}
