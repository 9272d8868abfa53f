//! Asignación de tipos a partir de declaraciones.

use std::cell::RefCell;

use log::debug;

use super::{AttributeStack, Semantic, SemanticError};
use crate::{
    lex::{Identifier, Token},
    parse::{ActionObserver, Production},
    symtab::{SourceType, SymbolTable},
};

/// Celda de atributo: un terminal desplazado, el tipo sintetizado por
/// un declarador o nada.
#[derive(Debug)]
enum Attribute {
    Terminal(Token),
    Type(SourceType),
    Empty,
}

pub struct TypeBinder<'a> {
    symbols: &'a RefCell<SymbolTable>,
    stack: AttributeStack<Attribute>,
}

impl<'a> TypeBinder<'a> {
    pub fn new(symbols: &'a RefCell<SymbolTable>) -> Self {
        TypeBinder {
            symbols,
            stack: AttributeStack::default(),
        }
    }

    fn id(&mut self, production: Production) -> Semantic<Identifier> {
        match self.stack.pop(production)? {
            Attribute::Terminal(Token::Id(id)) => Ok(id),
            _ => Err(SemanticError::UnexpectedAttribute {
                production,
                expected: "an identifier",
            }),
        }
    }

    fn ty(&mut self, production: Production) -> Semantic<SourceType> {
        match self.stack.pop(production)? {
            Attribute::Type(ty) => Ok(ty),
            _ => Err(SemanticError::UnexpectedAttribute {
                production,
                expected: "a type",
            }),
        }
    }

    fn bind(&self, id: Identifier, ty: SourceType) -> Semantic<()> {
        let mut symbols = self.symbols.borrow_mut();
        let entry = symbols
            .get_mut(id.as_ref())
            .ok_or_else(|| SemanticError::UnboundDeclaration(id.clone()))?;

        // La última declaración prevalece
        if let Some(previous) = entry.set_ty(ty) {
            debug!("`{}` redeclared, was {}", id, previous);
        }

        debug!("bind `{}`: {}", id, ty);
        Ok(())
    }
}

impl ActionObserver for TypeBinder<'_> {
    fn shift(&mut self, token: &Token) -> Semantic<()> {
        self.stack.push(Attribute::Terminal(token.clone()));
        Ok(())
    }

    fn reduce(&mut self, production: Production) -> Semantic<()> {
        use Production::*;

        let cell = match production {
            Declarator => {
                self.stack.pop(production)?;
                Attribute::Type(SourceType::Int)
            }

            Declaration => {
                let id = self.id(production)?;
                let ty = self.ty(production)?;
                self.bind(id, ty)?;

                Attribute::Empty
            }

            Program | StatementList | LastStatement | Assignment | Return | Add | Sub
            | Expression | Mul | Term | Paren | Variable | Constant => {
                self.stack.discard(production)?;
                Attribute::Empty
            }
        };

        self.stack.push(cell);
        Ok(())
    }

    fn accept(&mut self) -> Semantic<()> {
        self.stack.accept()
    }
}
