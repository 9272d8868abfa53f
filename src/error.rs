//! Errores de compilación.
//!
//! Todo error es fatal para la unidad de compilación: la primera falla
//! aborta la pasada en curso y el resto del pipeline.

use thiserror::Error;

use crate::{
    codegen::CodegenError, lex::LexerError, parse::ParserError,
    semantic::SemanticError,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Lexical(#[from] LexerError),

    #[error(transparent)]
    Syntax(ParserError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl Error {
    /// Categoría del error, para reportes.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Lexical(_) => "Lexical error",
            Error::Syntax(_) => "Syntax error",
            Error::Semantic(SemanticError::Undefined(_)) => "Symbol resolution error",
            Error::Semantic(_) => "Semantic error",
            Error::Codegen(_) => "Code generation error",
        }
    }
}

/// Los errores que un observador reporta a través del parser conservan
/// su categoría semántica.
impl From<ParserError> for Error {
    fn from(error: ParserError) -> Self {
        match error {
            ParserError::Action(error) => Error::Semantic(error),
            error => Error::Syntax(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{codegen::regs::Resident, lex::Identifier};

    #[test]
    fn observer_errors_are_semantic() {
        let error = Error::from(ParserError::Action(SemanticError::Undefined(
            Identifier::new("x"),
        )));

        assert_eq!(error.kind(), "Symbol resolution error");
        assert_eq!(error.to_string(), "Symbol `x` is undefined");
    }

    #[test]
    fn kinds() {
        assert_eq!(Error::from(LexerError::BadChar('%')).kind(), "Lexical error");
        assert_eq!(
            Error::from(ParserError::UnexpectedEof).kind(),
            "Syntax error"
        );
        assert_eq!(
            Error::from(SemanticError::BadLiteral("9".repeat(20))).kind(),
            "Semantic error"
        );
        assert_eq!(
            Error::from(CodegenError::OutOfRegisters(Resident::Scratch)).kind(),
            "Code generation error"
        );
    }
}
