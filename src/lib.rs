//! Compiles C-style plural-form expressions, as found in gettext catalogs
//! (`n%10==1 && n%100!=11 ? 0 : n!=0 ? 1 : 2`), into TeX macro definitions
//! built from nested `\gettextmath...` command calls.

pub mod ast;
pub mod error;
pub mod generator;
pub mod parser;

use log::debug;

pub use ast::{BinaryOperator, Expr, Lexeme, Number, Operator, Token};
pub use error::{CompileError, LexError, ParseError, StructureError};
pub use generator::{COMMAND_PREFIX, command_call, generate, reduce};
pub use parser::{PluralParser, Postfix, Rewrites};

/// Name of the plural count in gettext expressions
pub const COUNT_VARIABLE: &str = "n";
/// Reference to the single formal parameter of the generated macro
pub const COUNT_PARAMETER: &str = "#1";

/// Whether the generated macro is introduced or replaces an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Directive {
    #[default]
    New,
    Renew,
}

impl Directive {
    pub fn keyword(self) -> &'static str {
        match self {
            Directive::New => "\\newcommand",
            Directive::Renew => "\\renewcommand",
        }
    }
}

/// Expression compiler configured with a set of identifier rewrites
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    rewrites: Rewrites,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiler that binds the count variable to the macro's parameter.
    pub fn for_command() -> Self {
        Self::new().rewrite(COUNT_VARIABLE, COUNT_PARAMETER)
    }

    pub fn rewrite(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.rewrites.insert(old.into(), new.into());
        self
    }

    pub fn rewrites(&self) -> &Rewrites {
        &self.rewrites
    }

    /// Parse `source`, apply the rewrites and reduce it to a tree.
    pub fn compile(&self, source: &str) -> Result<Expr, CompileError> {
        let postfix = PluralParser::parse_postfix(source)?.rewrite_identifiers(&self.rewrites);
        Ok(reduce(&postfix)?)
    }

    /// Compile `source` into its TeX rendering.
    pub fn generate(&self, source: &str) -> Result<String, CompileError> {
        Ok(self.compile(source)?.to_string())
    }
}

/// Produce `\newcommand{<name>}[1]{<body>}` (or `\renewcommand`) where the
/// body evaluates `source` with `n` bound to the macro's argument.
pub fn generate_command(
    name: &str,
    source: &str,
    directive: Directive,
) -> Result<String, CompileError> {
    debug!("generating {name} from plural expression {source:?}");
    let body = Compiler::for_command().generate(source)?;
    Ok(format!("{}{{{name}}}[1]{{{body}}}", directive.keyword()))
}
