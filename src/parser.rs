use std::collections::BTreeMap;

use log::trace;
use pest::{Parser, iterators::Pair};
use pest_derive::Parser;

use crate::ast::{BinaryOperator, Lexeme, Number, Operator, Token};
use crate::error::{CompileError, LexError, ParseError};

#[derive(Parser)]
#[grammar = "src/plural.pest"]
pub struct PluralParser;

/// Identifier renames applied to a postfix queue, old name to new name
pub type Rewrites = BTreeMap<String, String>;

/// Instruction queue in reverse-Polish order. Never contains grouping markers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Postfix(pub Vec<Token>);

impl std::ops::Deref for Postfix {
    type Target = Vec<Token>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Postfix {
    /// Replace every identifier named in `rewrites`, leaving everything else in place.
    pub fn rewrite_identifiers(&self, rewrites: &Rewrites) -> Postfix {
        Postfix(
            self.iter()
                .map(|token| match token {
                    Token::Identifier(name) => Token::Identifier(
                        rewrites.get(name).cloned().unwrap_or_else(|| name.clone()),
                    ),
                    other => other.clone(),
                })
                .collect(),
        )
    }
}

impl PluralParser {
    /// Split `source` into lexemes, dropping whitespace.
    pub fn tokenize(source: &str) -> Result<Vec<Lexeme<'_>>, LexError> {
        let mut pairs =
            PluralParser::parse(Rule::tokens, source).map_err(|_| no_match(source, 0))?;
        let Some(tokens) = pairs.next() else {
            return Err(no_match(source, 0));
        };

        let consumed = tokens.as_span().end();
        if consumed < source.len() {
            return Err(no_match(source, consumed));
        }

        let lexemes = tokens
            .into_inner()
            .map(Self::parse_lexeme)
            .collect::<Result<Vec<_>, _>>()?;
        trace!("tokenized {source:?} into {} tokens", lexemes.len());
        Ok(lexemes)
    }

    fn parse_lexeme(pair: Pair<'_, Rule>) -> Result<Lexeme<'_>, LexError> {
        let text = pair.as_str();
        let token = match pair.as_rule() {
            Rule::number => Token::Number(Number::from_digits(text)),
            Rule::identifier => Token::Identifier(text.to_owned()),
            Rule::open_group => Token::OpenGroup,
            Rule::close_group => Token::CloseGroup,
            Rule::equal => Token::Operator(Operator::Binary(BinaryOperator::Equal)),
            Rule::not_equal => Token::Operator(Operator::Binary(BinaryOperator::NotEqual)),
            Rule::greater_equal => Token::Operator(Operator::Binary(BinaryOperator::GreaterEqual)),
            Rule::lesser_equal => Token::Operator(Operator::Binary(BinaryOperator::LesserEqual)),
            Rule::greater_than => Token::Operator(Operator::Binary(BinaryOperator::GreaterThan)),
            Rule::lesser_than => Token::Operator(Operator::Binary(BinaryOperator::LesserThan)),
            Rule::and => Token::Operator(Operator::Binary(BinaryOperator::And)),
            Rule::or => Token::Operator(Operator::Binary(BinaryOperator::Or)),
            Rule::ternary_start => Token::Operator(Operator::TernaryStart),
            Rule::ternary_middle => Token::Operator(Operator::TernaryMiddle),
            Rule::modulo => Token::Operator(Operator::Binary(BinaryOperator::Modulo)),
            _ => return Err(no_match(text, 0)),
        };
        Ok(Lexeme { token, text })
    }

    /// Shunting-yard: reorder infix tokens into postfix.
    ///
    /// An operator pops every stacked operator with a strictly lower priority
    /// number before being pushed itself, so neither grouping nor the ternary
    /// markers are ever popped by an ordinary operator. Matching `?` with `:` is
    /// left to tree reduction.
    pub fn to_postfix<I>(tokens: I) -> Result<Postfix, ParseError>
    where
        I: IntoIterator<Item = Token>,
    {
        let mut output = Vec::new();
        let mut stack: Vec<Token> = Vec::new();

        for token in tokens {
            match token {
                Token::Number(_) | Token::Identifier(_) => output.push(token),
                Token::Operator(op) => {
                    while let Some(top) = stack.last() {
                        if top.priority() >= op.priority() {
                            break;
                        }
                        output.extend(stack.pop());
                    }
                    stack.push(token);
                }
                Token::OpenGroup => stack.push(token),
                Token::CloseGroup => {
                    loop {
                        match stack.pop() {
                            Some(Token::OpenGroup) => break,
                            Some(top) => output.push(top),
                            None => return Err(ParseError::UnmatchedCloseGroup),
                        }
                    }
                    if stack.last().is_some_and(Token::is_function_like) {
                        output.extend(stack.pop());
                    }
                }
            }
        }

        while let Some(top) = stack.pop() {
            if top == Token::OpenGroup {
                return Err(ParseError::UnclosedGroup);
            }
            output.push(top);
        }

        Ok(Postfix(output))
    }

    /// Tokenize and reorder `source` into postfix, without any identifier rewriting.
    pub fn parse_postfix(source: &str) -> Result<Postfix, CompileError> {
        let lexemes = Self::tokenize(source)?;
        let postfix = Self::to_postfix(lexemes.into_iter().map(|lexeme| lexeme.token))?;
        trace!(
            "postfix: [{}]",
            postfix
                .iter()
                .map(Token::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(postfix)
    }
}

fn no_match(source: &str, position: usize) -> LexError {
    LexError::NoMatch {
        position,
        near: source[position..].chars().take(10).collect(),
    }
}
