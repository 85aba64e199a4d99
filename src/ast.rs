use std::fmt;

/// Operators that combine a left and a right operand into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Equal,
    NotEqual,
    GreaterEqual,
    LesserEqual,
    GreaterThan,
    LesserThan,
    And,
    Or,
    Modulo,
}

impl BinaryOperator {
    fn priority(self) -> u8 {
        match self {
            BinaryOperator::Modulo => 3,
            BinaryOperator::GreaterEqual
            | BinaryOperator::LesserEqual
            | BinaryOperator::GreaterThan
            | BinaryOperator::LesserThan => 6,
            BinaryOperator::Equal | BinaryOperator::NotEqual => 7,
            BinaryOperator::And => 11,
            BinaryOperator::Or => 12,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::LesserEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LesserThan => "<",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::Modulo => "%",
        }
    }

    /// TeX command suffix, appended to the command prefix.
    pub fn command(self) -> &'static str {
        match self {
            BinaryOperator::Equal => "equal",
            BinaryOperator::NotEqual => "notequal",
            BinaryOperator::GreaterEqual => "greaterequal",
            BinaryOperator::LesserEqual => "lesserequal",
            BinaryOperator::GreaterThan => "greaterthan",
            BinaryOperator::LesserThan => "lesserthan",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
            BinaryOperator::Modulo => "modulo",
        }
    }
}

/// Operators of the plural expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Binary(BinaryOperator),
    /// `?`, the first half of `cond ? a : b`
    TernaryStart,
    /// `:`, the second half of `cond ? a : b`
    TernaryMiddle,
}

impl From<BinaryOperator> for Operator {
    fn from(op: BinaryOperator) -> Self {
        Operator::Binary(op)
    }
}

/// Priority shared by both ternary markers and the grouping markers.
/// Ordinary operators never pop anything at this level off the stack.
pub const GROUPING_PRIORITY: u8 = 100;

impl Operator {
    /// Binding power; lower binds tighter.
    pub fn priority(self) -> u8 {
        match self {
            Operator::Binary(op) => op.priority(),
            Operator::TernaryStart | Operator::TernaryMiddle => GROUPING_PRIORITY,
        }
    }

    /// Number of operands the operator combines. `?` counts its condition and
    /// the `:` pair, `:` counts its two branches.
    pub fn arity(self) -> usize {
        2
    }

    /// Whether the operator takes a parenthesised argument list directly after it,
    /// in which case closing that list also emits the operator.
    pub fn is_function_like(self) -> bool {
        false
    }

    /// Source spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Binary(op) => op.symbol(),
            Operator::TernaryStart => "?",
            Operator::TernaryMiddle => ":",
        }
    }
}

/// Unsigned decimal literal of any length, kept as its digits without leading zeros
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number(String);

impl Number {
    /// Normalize a run of ASCII digits; an all-zero run becomes `0`.
    pub fn from_digits(digits: &str) -> Self {
        match digits.trim_start_matches('0') {
            "" => Number("0".to_owned()),
            significant => Number(significant.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number(value.to_string())
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lexical unit of a plural expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Number(Number),
    /// `[A-Za-z_][A-Za-z0-9_]*`
    Identifier(String),
    Operator(Operator),
    /// `(`
    OpenGroup,
    /// `)`
    CloseGroup,
}

impl Token {
    /// Priority of the token while it sits on the operator stack.
    pub fn priority(&self) -> u8 {
        match self {
            Token::Operator(op) => op.priority(),
            _ => GROUPING_PRIORITY,
        }
    }

    pub fn is_function_like(&self) -> bool {
        matches!(self, Token::Operator(op) if op.is_function_like())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "Number({n})"),
            Token::Identifier(name) => write!(f, "Identifier(\"{name}\")"),
            Token::Operator(op) => write!(f, "Operator(\"{}\")", op.symbol()),
            Token::OpenGroup => f.write_str("OpenParenthesis"),
            Token::CloseGroup => f.write_str("CloseParenthesis"),
        }
    }
}

/// A token together with the source text it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub token: Token,
    pub text: &'a str,
}

/// Fully reduced expression tree. Every node owns its operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Number(Number),
    Identifier(String),
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `condition ? on_true : on_false`
    Conditional {
        condition: Box<Expr>,
        on_true: Box<Expr>,
        on_false: Box<Expr>,
    },
}
