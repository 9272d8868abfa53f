//! Generación de IR.
//!
//! Los atributos sintetizados son valores de IR. Las expresiones
//! aritméticas producen una variable temporal nueva por operación y
//! no se realiza plegado de constantes.

use std::cell::RefCell;

use log::trace;

use super::{AttributeStack, Semantic, SemanticError};
use crate::{
    ir::{BinOp, Instruction, IrValue, IrVariable},
    lex::{Identifier, Token},
    parse::{ActionObserver, Production},
    symtab::SymbolTable,
};

#[derive(Debug)]
enum Attribute {
    Terminal(Token),
    Value(IrValue),
    Empty,
}

pub struct IrEmitter<'a> {
    symbols: &'a RefCell<SymbolTable>,
    stack: AttributeStack<Attribute>,
    code: Vec<Instruction>,
    next_temp: u32,
}

impl<'a> IrEmitter<'a> {
    pub fn new(symbols: &'a RefCell<SymbolTable>) -> Self {
        IrEmitter {
            symbols,
            stack: AttributeStack::default(),
            code: Vec::new(),
            next_temp: 0,
        }
    }

    /// Instrucciones generadas hasta el momento, en orden de inserción.
    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    pub fn into_code(self) -> Vec<Instruction> {
        self.code
    }

    fn emit(&mut self, instruction: Instruction) {
        trace!("emit {}", instruction);
        self.code.push(instruction);
    }

    fn temp(&mut self) -> IrVariable {
        let temp = IrVariable::Temp(self.next_temp);
        self.next_temp += 1;

        temp
    }

    fn resolve(&self, id: Identifier) -> Semantic<IrVariable> {
        if self.symbols.borrow().has(id.as_ref()) {
            Ok(IrVariable::Named(id))
        } else {
            Err(SemanticError::Undefined(id))
        }
    }

    fn terminal(&mut self, production: Production) -> Semantic<Token> {
        match self.stack.pop(production)? {
            Attribute::Terminal(token) => Ok(token),
            _ => Err(SemanticError::UnexpectedAttribute {
                production,
                expected: "a terminal",
            }),
        }
    }

    fn id(&mut self, production: Production) -> Semantic<Identifier> {
        match self.terminal(production)? {
            Token::Id(id) => Ok(id),
            _ => Err(SemanticError::UnexpectedAttribute {
                production,
                expected: "an identifier",
            }),
        }
    }

    fn value(&mut self, production: Production) -> Semantic<IrValue> {
        match self.stack.pop(production)? {
            Attribute::Value(value) => Ok(value),
            _ => Err(SemanticError::UnexpectedAttribute {
                production,
                expected: "a value",
            }),
        }
    }

    fn binary(&mut self, production: Production, op: BinOp) -> Semantic<Attribute> {
        let rhs = self.value(production)?;
        self.stack.pop(production)?;
        let lhs = self.value(production)?;

        let dest = self.temp();
        self.emit(Instruction::Binary {
            op,
            dest: dest.clone(),
            lhs,
            rhs,
        });

        Ok(Attribute::Value(dest.into()))
    }
}

impl ActionObserver for IrEmitter<'_> {
    fn shift(&mut self, token: &Token) -> Semantic<()> {
        self.stack.push(Attribute::Terminal(token.clone()));
        Ok(())
    }

    fn reduce(&mut self, production: Production) -> Semantic<()> {
        use Production::*;

        let cell = match production {
            Assignment => {
                let src = self.value(production)?;
                self.stack.pop(production)?;
                let id = self.id(production)?;

                let dest = self.resolve(id)?;
                self.emit(Instruction::Mov { dest, src });

                Attribute::Empty
            }

            Return => {
                let value = self.value(production)?;
                self.stack.pop(production)?;
                self.emit(Instruction::Ret { value });

                Attribute::Empty
            }

            Add => self.binary(production, BinOp::Add)?,
            Sub => self.binary(production, BinOp::Sub)?,
            Mul => self.binary(production, BinOp::Mul)?,

            // Producciones de paso, no emiten instrucciones
            Expression | Term => Attribute::Value(self.value(production)?),

            Paren => {
                self.stack.pop(production)?;
                let value = self.value(production)?;
                self.stack.pop(production)?;

                Attribute::Value(value)
            }

            Variable => {
                let id = self.id(production)?;
                Attribute::Value(self.resolve(id)?.into())
            }

            Constant => match self.terminal(production)? {
                Token::IntConst(text) => match text.parse() {
                    Ok(value) => Attribute::Value(IrValue::Immediate(value)),
                    Err(_) => return Err(SemanticError::BadLiteral(text)),
                },

                _ => {
                    return Err(SemanticError::UnexpectedAttribute {
                        production,
                        expected: "an integer literal",
                    })
                }
            },

            Program | StatementList | LastStatement | Declaration | Declarator => {
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
