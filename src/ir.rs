//! Representación intermedia.
//!
//! Un programa es una secuencia lineal de instrucciones (un único
//! bloque básico, sin etiquetas ni saltos). Los operandos son valores
//! inmediatos o variables; las variables pueden ser nombradas, si
//! provienen del código fuente, o temporales, si son sintetizadas por
//! el compilador para resultados intermedios.

use std::{
    collections::HashMap,
    fmt::{self, Display},
};

use log::trace;
use thiserror::Error;

use crate::lex::Identifier;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IrVariable {
    Named(Identifier),
    Temp(u32),
}

impl IrVariable {
    pub fn is_temp(&self) -> bool {
        matches!(self, IrVariable::Temp(_))
    }
}

impl Display for IrVariable {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrVariable::Named(name) => name.fmt(fmt),
            IrVariable::Temp(id) => write!(fmt, "${}", id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IrValue {
    Immediate(i32),
    Variable(IrVariable),
}

impl From<IrVariable> for IrValue {
    fn from(variable: IrVariable) -> Self {
        IrValue::Variable(variable)
    }
}

impl Display for IrValue {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrValue::Immediate(value) => value.fmt(fmt),
            IrValue::Variable(variable) => variable.fmt(fmt),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
}

impl BinOp {
    /// Aritmética de 32 bits con wrapping, igual a la del hardware objetivo.
    pub fn apply(self, lhs: i32, rhs: i32) -> i32 {
        match self {
            BinOp::Add => lhs.wrapping_add(rhs),
            BinOp::Sub => lhs.wrapping_sub(rhs),
            BinOp::Mul => lhs.wrapping_mul(rhs),
        }
    }
}

impl Display for BinOp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinOp::Add => "Add",
            BinOp::Sub => "Sub",
            BinOp::Mul => "Mul",
        };

        fmt.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Mov {
        dest: IrVariable,
        src: IrValue,
    },

    Binary {
        op: BinOp,
        dest: IrVariable,
        lhs: IrValue,
        rhs: IrValue,
    },

    Ret {
        value: IrValue,
    },
}

impl Display for Instruction {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Mov { dest, src } => write!(fmt, "Mov {}, {}", dest, src),
            Instruction::Binary { op, dest, lhs, rhs } => {
                write!(fmt, "{} {}, {}, {}", op, dest, lhs, rhs)
            }

            Instruction::Ret { value } => write!(fmt, "Ret {}", value),
        }
    }
}

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("Variable `{0}` was read before being assigned")]
    Uninitialized(IrVariable),
}

/// Intérprete de IR.
///
/// Ejecuta la secuencia en orden y se detiene en el primer `Ret`.
#[derive(Default)]
pub struct Emulator {
    values: HashMap<IrVariable, i32>,
}

impl Emulator {
    pub fn run(&mut self, code: &[Instruction]) -> Result<Option<i32>, EvalError> {
        for instruction in code {
            trace!("emulate {}", instruction);

            match instruction {
                Instruction::Mov { dest, src } => {
                    let value = self.read(src)?;
                    self.values.insert(dest.clone(), value);
                }

                Instruction::Binary { op, dest, lhs, rhs } => {
                    let value = op.apply(self.read(lhs)?, self.read(rhs)?);
                    self.values.insert(dest.clone(), value);
                }

                Instruction::Ret { value } => return self.read(value).map(Some),
            }
        }

        Ok(None)
    }

    /// Valor actual de una variable, si ya fue asignada.
    pub fn value_of(&self, variable: &IrVariable) -> Option<i32> {
        self.values.get(variable).copied()
    }

    fn read(&self, value: &IrValue) -> Result<i32, EvalError> {
        match value {
            IrValue::Immediate(value) => Ok(*value),
            IrValue::Variable(variable) => self
                .value_of(variable)
                .ok_or_else(|| EvalError::Uninitialized(variable.clone())),
        }
    }
}

/// Ejecuta un programa completo con un emulador nuevo.
pub fn emulate(code: &[Instruction]) -> Result<Option<i32>, EvalError> {
    Emulator::default().run(code)
}
