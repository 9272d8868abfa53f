//! Análisis semántico dirigido por la sintaxis.
//!
//! Dos observadores reciben los mismos eventos del parser (ver
//! [`crate::parse::ActionObserver`]):
//!
//! - [`binding::TypeBinder`] asigna tipos a las entradas de la tabla de
//!   símbolos a partir de las declaraciones.
//! - [`lowering::IrEmitter`] sintetiza valores de IR y acumula la
//!   secuencia de instrucciones.
//!
//! Cada uno lleva una pila de atributos privada cuya disciplina de
//! aridad replica la del parser: un `shift` apila una celda, un
//! `reduce` de una regla de aridad `k` desapila `k` celdas y apila una,
//! y `accept` exige que quede exactamente una celda.

use thiserror::Error;

use crate::{lex::Identifier, parse::Production};

pub mod binding;
pub mod lowering;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// Referencia a un identificador que no está en la tabla de símbolos.
    #[error("Symbol `{0}` is undefined")]
    Undefined(Identifier),

    /// Se declaró un identificador que no está en la tabla de símbolos.
    #[error("Cannot bind a type to unregistered symbol `{0}`")]
    UnboundDeclaration(Identifier),

    #[error("Invalid integer literal `{0}`")]
    BadLiteral(String),

    #[error("Attribute stack underflow while reducing `{0}`")]
    StackUnderflow(Production),

    #[error("Reduction `{production}` expected {expected} on the attribute stack")]
    UnexpectedAttribute {
        production: Production,
        expected: &'static str,
    },

    #[error("Accepted with {0} attribute cells on the stack, expected exactly one")]
    UnbalancedAccept(usize),
}

pub type Semantic<T> = Result<T, SemanticError>;

/// Pila de atributos sincronizada con la pila del parser.
#[derive(Debug)]
struct AttributeStack<T> {
    cells: Vec<T>,
}

impl<T> AttributeStack<T> {
    fn push(&mut self, cell: T) {
        self.cells.push(cell);
    }

    fn pop(&mut self, production: Production) -> Semantic<T> {
        self.cells
            .pop()
            .ok_or(SemanticError::StackUnderflow(production))
    }

    /// Descarta tantas celdas como la aridad de la regla.
    fn discard(&mut self, production: Production) -> Semantic<()> {
        let arity = production.arity();
        if self.cells.len() < arity {
            return Err(SemanticError::StackUnderflow(production));
        }

        self.cells.truncate(self.cells.len() - arity);
        Ok(())
    }

    fn accept(&mut self) -> Semantic<()> {
        match self.cells.len() {
            1 => {
                self.cells.clear();
                Ok(())
            }

            len => Err(SemanticError::UnbalancedAccept(len)),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.cells.len()
    }
}

impl<T> Default for AttributeStack<T> {
    fn default() -> Self {
        AttributeStack { cells: Vec::new() }
    }
}
