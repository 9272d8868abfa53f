//! Subconjunto de ensamblador RISC-V que emite el generador.

use std::fmt::{self, Display};

use crate::ir::BinOp;

/// Registro de procesador.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Reg {
    /// Registro temporal `t0`-`t6`.
    T(u8),

    /// Registro de valor de retorno.
    A0,
}

impl Reg {
    /// Registros disponibles para asignación, en orden de preferencia.
    pub const FILE: [Reg; 7] = [
        Reg::T(0),
        Reg::T(1),
        Reg::T(2),
        Reg::T(3),
        Reg::T(4),
        Reg::T(5),
        Reg::T(6),
    ];

    pub const RETURN: Reg = Reg::A0;
}

impl Display for Reg {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reg::T(number) => write!(formatter, "t{}", number),
            Reg::A0 => formatter.write_str("a0"),
        }
    }
}

/// Una línea de ensamblador.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AsmInstruction {
    Li { rd: Reg, imm: i32 },
    Mv { rd: Reg, rs: Reg },
    Add { rd: Reg, rs1: Reg, rs2: Reg },
    Addi { rd: Reg, rs1: Reg, imm: i32 },
    Sub { rd: Reg, rs1: Reg, rs2: Reg },
    Mul { rd: Reg, rs1: Reg, rs2: Reg },
}

impl AsmInstruction {
    /// Forma registro-registro de una operación binaria.
    pub fn register_form(op: BinOp, rd: Reg, rs1: Reg, rs2: Reg) -> Self {
        match op {
            BinOp::Add => AsmInstruction::Add { rd, rs1, rs2 },
            BinOp::Sub => AsmInstruction::Sub { rd, rs1, rs2 },
            BinOp::Mul => AsmInstruction::Mul { rd, rs1, rs2 },
        }
    }
}

impl Display for AsmInstruction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        use AsmInstruction::*;

        match self {
            Li { rd, imm } => write!(formatter, "li {}, {}", rd, imm),
            Mv { rd, rs } => write!(formatter, "mv {}, {}", rd, rs),
            Add { rd, rs1, rs2 } => write!(formatter, "add {}, {}, {}", rd, rs1, rs2),
            Addi { rd, rs1, imm } => write!(formatter, "addi {}, {}, {}", rd, rs1, imm),
            Sub { rd, rs1, rs2 } => write!(formatter, "sub {}, {}, {}", rd, rs1, rs2),
            Mul { rd, rs1, rs2 } => write!(formatter, "mul {}, {}, {}", rd, rs1, rs2),
        }
    }
}

/// Determina si un inmediato cabe en el campo de 12 bits con signo de `addi`.
pub fn fits_imm12(imm: i32) -> bool {
    (-2048..=2047).contains(&imm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonics() {
        let lines = [
            AsmInstruction::Li {
                rd: Reg::T(0),
                imm: -5,
            },
            AsmInstruction::Mv {
                rd: Reg::RETURN,
                rs: Reg::T(0),
            },
            AsmInstruction::register_form(BinOp::Sub, Reg::T(2), Reg::T(0), Reg::T(1)),
            AsmInstruction::Addi {
                rd: Reg::T(1),
                rs1: Reg::T(1),
                imm: -1,
            },
        ];

        let text: Vec<_> = lines.iter().map(ToString::to_string).collect();
        assert_eq!(
            text,
            ["li t0, -5", "mv a0, t0", "sub t2, t0, t1", "addi t1, t1, -1"]
        );
    }

    #[test]
    fn imm12_bounds() {
        assert!(fits_imm12(2047));
        assert!(fits_imm12(-2048));
        assert!(!fits_imm12(2048));
        assert!(!fits_imm12(-2049));
    }
}
