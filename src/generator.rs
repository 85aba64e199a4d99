use std::fmt;

use log::trace;

use crate::ast::{Expr, Operator, Token};
use crate::error::StructureError;
use crate::parser::Postfix;

/// Prefix of every TeX command the generated code calls
pub const COMMAND_PREFIX: &str = "gettextmath";

/// Render `\<prefix><name>{arg1}{arg2}...`.
pub fn command_call<I, A>(prefix: &str, name: &str, args: I) -> String
where
    I: IntoIterator<Item = A>,
    A: fmt::Display,
{
    let args: String = args.into_iter().map(|arg| format!("{{{arg}}}")).collect();
    format!("\\{prefix}{name}{args}")
}

/// Entry on the operand stack during reduction. A `:` is only an intermediate
/// pairing of two branches waiting for its `?`.
#[derive(Debug)]
enum Node {
    Expr(Expr),
    Alternative { on_true: Expr, on_false: Expr },
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Expr(Expr::Number(n)) => write!(f, "Number({n})"),
            Node::Expr(Expr::Identifier(name)) => write!(f, "Identifier(\"{name}\")"),
            Node::Expr(Expr::Binary { op, .. }) => write!(f, "Operator(\"{}\")", op.symbol()),
            Node::Expr(Expr::Conditional { .. }) => f.write_str("Operator(\"?\")"),
            Node::Alternative { .. } => f.write_str("Operator(\":\")"),
        }
    }
}

struct OperandStack(Vec<Node>);

impl OperandStack {
    fn pop_node(&mut self, operator: Operator) -> Result<Node, StructureError> {
        self.0
            .pop()
            .ok_or(StructureError::MissingOperand { operator })
    }

    fn pop_expr(&mut self, operator: Operator) -> Result<Expr, StructureError> {
        match self.pop_node(operator)? {
            Node::Expr(expr) => Ok(expr),
            Node::Alternative { .. } => Err(StructureError::StrayAlternative),
        }
    }
}

/// Replay the postfix queue against an operand stack, letting every operator
/// take ownership of the operands it pops.
pub fn reduce(postfix: &Postfix) -> Result<Expr, StructureError> {
    let mut stack = OperandStack(Vec::with_capacity(postfix.len()));

    for token in postfix.iter() {
        let node = match token {
            Token::Number(n) => Node::Expr(Expr::Number(n.clone())),
            Token::Identifier(name) => Node::Expr(Expr::Identifier(name.clone())),
            Token::Operator(op @ Operator::TernaryMiddle) => {
                let on_false = stack.pop_expr(*op)?;
                let on_true = stack.pop_expr(*op)?;
                Node::Alternative { on_true, on_false }
            }
            Token::Operator(op @ Operator::TernaryStart) => {
                let branches = stack.pop_node(*op)?;
                let condition = stack.pop_expr(*op)?;
                match branches {
                    Node::Alternative { on_true, on_false } => Node::Expr(Expr::Conditional {
                        condition: Box::new(condition),
                        on_true: Box::new(on_true),
                        on_false: Box::new(on_false),
                    }),
                    other => {
                        return Err(StructureError::TernaryWithoutAlternative {
                            found: other.to_string(),
                        });
                    }
                }
            }
            Token::Operator(op @ Operator::Binary(binary)) => {
                let rhs = stack.pop_expr(*op)?;
                let lhs = stack.pop_expr(*op)?;
                Node::Expr(Expr::Binary {
                    op: *binary,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                })
            }
            // Grouping never reaches the postfix queue; treat a stray marker as
            // leftover stack content.
            Token::OpenGroup | Token::CloseGroup => {
                return Err(StructureError::UnbalancedStack {
                    contents: token.to_string(),
                });
            }
        };
        stack.0.push(node);
    }

    let mut nodes = stack.0;
    match (nodes.pop(), nodes.is_empty()) {
        (Some(Node::Expr(root)), true) => Ok(root),
        (Some(Node::Alternative { .. }), true) => Err(StructureError::StrayAlternative),
        (last, _) => {
            nodes.extend(last);
            Err(StructureError::UnbalancedStack {
                contents: format!(
                    "[{}]",
                    nodes
                        .iter()
                        .map(Node::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
        }
    }
}

impl Expr {
    /// Render the tree as nested TeX command calls using `prefix`.
    pub fn render(&self, prefix: &str) -> String {
        match self {
            Expr::Number(n) => n.to_string(),
            Expr::Identifier(name) => name.clone(),
            Expr::Binary { op, lhs, rhs } => command_call(
                prefix,
                op.command(),
                [lhs.render(prefix), rhs.render(prefix)],
            ),
            Expr::Conditional {
                condition,
                on_true,
                on_false,
            } => command_call(
                prefix,
                "ifthenelse",
                [
                    condition.render(prefix),
                    on_true.render(prefix),
                    on_false.render(prefix),
                ],
            ),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(COMMAND_PREFIX))
    }
}

/// Reduce `postfix` and render it with [`COMMAND_PREFIX`].
pub fn generate(postfix: &Postfix) -> Result<String, StructureError> {
    let root = reduce(postfix)?;
    trace!("reduced tree: {root:?}");
    Ok(root.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOperator, Number};
    use crate::parser::PluralParser;
    use pretty_assertions::assert_eq;

    fn generate_source(source: &str) -> Result<String, StructureError> {
        generate(&PluralParser::parse_postfix(source).unwrap())
    }

    #[test]
    fn test_command_call() {
        assert_eq!(command_call("p", "and", ["a", "b"]), "\\pand{a}{b}");
        assert_eq!(command_call("p", "x", [1, 2, 3]), "\\px{1}{2}{3}");
        assert_eq!(command_call("p", "x", Vec::<String>::new()), "\\px");
    }

    #[test]
    fn test_generate_leaves() {
        assert_eq!(generate_source("007").unwrap(), "7");
        assert_eq!(generate_source("count").unwrap(), "count");
    }

    #[test]
    fn test_generate_binary_operand_order() {
        assert_eq!(
            generate_source("n < 2").unwrap(),
            "\\gettextmathlesserthan{n}{2}"
        );
        assert_eq!(
            generate_source("n%10 == 1").unwrap(),
            "\\gettextmathequal{\\gettextmathmodulo{n}{10}}{1}"
        );
        assert_eq!(
            generate_source("a && b || c != d").unwrap(),
            "\\gettextmathor{\\gettextmathand{a}{b}}{\\gettextmathnotequal{c}{d}}"
        );
        assert_eq!(
            generate_source("a >= 1 && b <= 2 && c > 3").unwrap(),
            "\\gettextmathand{\\gettextmathgreaterequal{a}{1}}\
             {\\gettextmathand{\\gettextmathlesserequal{b}{2}}{\\gettextmathgreaterthan{c}{3}}}"
        );
    }

    #[test]
    fn test_generate_nested_ternary() {
        assert_eq!(
            generate_source("n==1 ? 0 : n==2 ? 1 : 2").unwrap(),
            "\\gettextmathifthenelse{\\gettextmathequal{n}{1}}{0}\
             {\\gettextmathifthenelse{\\gettextmathequal{n}{2}}{1}{2}}"
        );
        assert_eq!(
            generate_source("(n ? 1 : 2) ? 3 : 4").unwrap(),
            "\\gettextmathifthenelse{\\gettextmathifthenelse{n}{1}{2}}{3}{4}"
        );
    }

    #[test]
    fn test_reduce_builds_owned_tree() {
        let postfix = PluralParser::parse_postfix("n > 1 ? 1 : 0").unwrap();
        assert_eq!(
            reduce(&postfix).unwrap(),
            Expr::Conditional {
                condition: Box::new(Expr::Binary {
                    op: BinaryOperator::GreaterThan,
                    lhs: Box::new(Expr::Identifier("n".to_owned())),
                    rhs: Box::new(Expr::Number(Number::from(1))),
                }),
                on_true: Box::new(Expr::Number(Number::from(1))),
                on_false: Box::new(Expr::Number(Number::from(0))),
            }
        );
    }

    #[test]
    fn test_render_hand_built_binary_trees() {
        let cases = [
            (BinaryOperator::Equal, "equal"),
            (BinaryOperator::NotEqual, "notequal"),
            (BinaryOperator::GreaterEqual, "greaterequal"),
            (BinaryOperator::LesserEqual, "lesserequal"),
            (BinaryOperator::GreaterThan, "greaterthan"),
            (BinaryOperator::LesserThan, "lesserthan"),
            (BinaryOperator::And, "and"),
            (BinaryOperator::Or, "or"),
            (BinaryOperator::Modulo, "modulo"),
        ];
        for (op, command) in cases {
            let tree = Expr::Binary {
                op,
                lhs: Box::new(Expr::Number(Number::from(1))),
                rhs: Box::new(Expr::Identifier("n".to_owned())),
            };
            assert_eq!(tree.to_string(), format!("\\gettextmath{command}{{1}}{{n}}"));
            assert_eq!(tree.render("p"), format!("\\p{command}{{1}}{{n}}"));
        }
    }

    #[test]
    fn test_generate_long_numbers() {
        assert_eq!(
            generate_source("n == 0018446744073709551616").unwrap(),
            "\\gettextmathequal{n}{18446744073709551616}"
        );
    }

    #[test]
    fn test_ternary_without_alternative() {
        assert_eq!(
            generate_source("1 ? 2"),
            Err(StructureError::TernaryWithoutAlternative {
                found: "Number(2)".to_owned(),
            })
        );
    }

    #[test]
    fn test_stray_alternative() {
        assert_eq!(
            generate_source("1 : 2"),
            Err(StructureError::StrayAlternative)
        );
        assert_eq!(
            generate_source("(1 : 2) == 3"),
            Err(StructureError::StrayAlternative)
        );
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(
            generate_source("== 1"),
            Err(StructureError::MissingOperand {
                operator: Operator::Binary(BinaryOperator::Equal),
            })
        );
        assert_eq!(
            generate_source("?"),
            Err(StructureError::MissingOperand {
                operator: Operator::TernaryStart,
            })
        );
    }

    #[test]
    fn test_missing_operand_message() {
        assert_eq!(
            generate_source("1 %").unwrap_err().to_string(),
            "operator \"%\" is missing an operand, it takes 2"
        );
    }

    #[test]
    fn test_unbalanced_stack() {
        assert_eq!(
            generate_source("0 1"),
            Err(StructureError::UnbalancedStack {
                contents: "[Number(0), Number(1)]".to_owned(),
            })
        );
        assert_eq!(
            generate(&Postfix::default()),
            Err(StructureError::UnbalancedStack {
                contents: "[]".to_owned(),
            })
        );
    }
}
