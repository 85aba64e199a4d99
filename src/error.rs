use thiserror::Error;

use crate::ast::Operator;

/// Failure to split the source into tokens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// No lexical rule matches at `position`; `near` holds up to ten characters from there.
    #[error("no token matches \"{near}<...>\" at byte {position}")]
    NoMatch { position: usize, near: String },
}

/// Failure to bring the tokens into postfix order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unmatched parenthesis: could not find matching left parenthesis")]
    UnmatchedCloseGroup,
    #[error("unmatched parenthesis: left parenthesis is never closed")]
    UnclosedGroup,
}

/// Failure to reduce the postfix queue to a single tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("ternary operator missing matching alternative marker: operator \"?\" must have matching \":\", but {found} found")]
    TernaryWithoutAlternative { found: String },
    #[error("operator \":\" is not part of a \"?\" expression")]
    StrayAlternative,
    #[error(
        "operator \"{}\" is missing an operand, it takes {}",
        .operator.symbol(),
        .operator.arity()
    )]
    MissingOperand { operator: Operator },
    #[error("RPN processing problem, stack size is not 1 ({contents})")]
    UnbalancedStack { contents: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Structure(#[from] StructureError),
}
