//! Generación de código ensamblador.
//!
//! Selección de instrucciones y asignación de registros ocurren en una
//! sola pasada hacia adelante sobre la IR, sin análisis de vida previo.
//! Los operandos se resuelven a registros antes que el destino. Tras
//! emitir una instrucción se liberan los registros de los operandos
//! temporales, ya que cada temporal se consume una única vez; las
//! variables nombradas permanecen en su registro hasta el final.

use thiserror::Error;

use crate::ir::{BinOp, Instruction, IrValue, IrVariable};

pub mod asm;
pub mod regs;

use asm::{fits_imm12, AsmInstruction, Reg};
use regs::{RegisterFile, Resident};

/// Tamaño del pool de registros asignables.
pub const POOL_SIZE: usize = Reg::FILE.len();

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error("Out of registers while allocating {0}")]
    OutOfRegisters(Resident),
}

pub type Codegen<T> = Result<T, CodegenError>;

/// Lado en el que aparece el operando inmediato.
#[derive(Copy, Clone)]
enum Side {
    Left,
    Right,
}

#[derive(Default)]
pub struct AssemblyGenerator {
    regs: RegisterFile,
    output: Vec<AsmInstruction>,
    peak: usize,
}

impl AssemblyGenerator {
    /// Traduce una instrucción de IR, añadiendo su expansión a la salida.
    pub fn lower(&mut self, instruction: &Instruction) -> Codegen<()> {
        use AsmInstruction::*;

        match instruction {
            Instruction::Mov {
                dest,
                src: IrValue::Immediate(imm),
            } => {
                let rd = self.resolve(dest)?;
                emit!(self, Li { rd, imm: *imm });
            }

            Instruction::Mov {
                dest,
                src: IrValue::Variable(src),
            } => {
                let rs = self.resolve(src)?;
                let rd = self.resolve(dest)?;
                emit!(self, Mv { rd, rs });
                self.release_temp(src, rs);
            }

            Instruction::Binary { op, dest, lhs, rhs } => self.binary(*op, dest, lhs, rhs)?,

            Instruction::Ret {
                value: IrValue::Immediate(imm),
            } => emit!(self, Li { rd: Reg::RETURN, imm: *imm }),

            Instruction::Ret {
                value: IrValue::Variable(value),
            } => {
                let rs = self.resolve(value)?;
                emit!(self, Mv { rd: Reg::RETURN, rs });
            }
        }

        Ok(())
    }

    /// Máxima cantidad de registros ocupados simultáneamente hasta ahora.
    pub fn peak_pressure(&self) -> usize {
        self.peak
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    pub fn into_lines(self) -> Vec<AsmInstruction> {
        self.output
    }

    fn binary(
        &mut self,
        op: BinOp,
        dest: &IrVariable,
        lhs: &IrValue,
        rhs: &IrValue,
    ) -> Codegen<()> {
        match (lhs, rhs) {
            (IrValue::Variable(lhs), IrValue::Variable(rhs)) => {
                let rs1 = self.resolve(lhs)?;
                let rs2 = self.resolve(rhs)?;
                let rd = self.resolve(dest)?;

                emit!(self, AsmInstruction::register_form(op, rd, rs1, rs2));
                self.release_temp(lhs, rs1);
                self.release_temp(rhs, rs2);
            }

            (IrValue::Variable(lhs), IrValue::Immediate(imm)) => {
                let rs = self.resolve(lhs)?;
                let rd = self.resolve(dest)?;

                self.with_immediate(op, rd, rs, *imm, Side::Right)?;
                self.release_temp(lhs, rs);
            }

            (IrValue::Immediate(imm), IrValue::Variable(rhs)) => {
                let rs = self.resolve(rhs)?;
                let rd = self.resolve(dest)?;

                self.with_immediate(op, rd, rs, *imm, Side::Left)?;
                self.release_temp(rhs, rs);
            }

            // Sin plegado de constantes: el izquierdo se carga en el destino
            (IrValue::Immediate(left), IrValue::Immediate(right)) => {
                let rd = self.resolve(dest)?;

                emit!(self, AsmInstruction::Li { rd, imm: *left });
                self.with_immediate(op, rd, rd, *right, Side::Right)?;
            }
        }

        Ok(())
    }

    /// Emite `rd = rs <op> imm` o `rd = imm <op> rs` según `side`.
    fn with_immediate(
        &mut self,
        op: BinOp,
        rd: Reg,
        rs: Reg,
        imm: i32,
        side: Side,
    ) -> Codegen<()> {
        let addend = match (op, side) {
            (BinOp::Add, _) => Some(imm),
            (BinOp::Sub, Side::Right) => imm.checked_neg(),
            _ => None,
        };

        if let Some(addend) = addend.filter(|&addend| fits_imm12(addend)) {
            emit!(self, AsmInstruction::Addi { rd, rs1: rs, imm: addend });
            return Ok(());
        }

        // No hay forma inmediata: se materializa en un registro auxiliar
        let scratch = self.allocate(Resident::Scratch)?;
        emit!(self, AsmInstruction::Li { rd: scratch, imm });

        let (rs1, rs2) = match side {
            Side::Left => (scratch, rs),
            Side::Right => (rs, scratch),
        };

        emit!(self, AsmInstruction::register_form(op, rd, rs1, rs2));
        self.regs.release(scratch);

        Ok(())
    }

    fn resolve(&mut self, variable: &IrVariable) -> Codegen<Reg> {
        match self.regs.locate(variable) {
            Some(reg) => Ok(reg),
            None => self.allocate(Resident::Variable(variable.clone())),
        }
    }

    fn allocate(&mut self, resident: Resident) -> Codegen<Reg> {
        if !self.regs.has_free() {
            return Err(CodegenError::OutOfRegisters(resident));
        }

        let reg = self
            .regs
            .allocate(resident.clone())
            .ok_or(CodegenError::OutOfRegisters(resident))?;

        self.peak = self.peak.max(self.regs.bound());
        Ok(reg)
    }

    fn release_temp(&mut self, variable: &IrVariable, reg: Reg) {
        if variable.is_temp() {
            self.regs.release(reg);
        }
    }
}

/// Traduce un programa completo a líneas de ensamblador.
pub fn generate(code: &[Instruction]) -> Codegen<Vec<AsmInstruction>> {
    let mut generator = AssemblyGenerator::default();
    for instruction in code {
        generator.lower(instruction)?;
    }

    Ok(generator.into_lines())
}
