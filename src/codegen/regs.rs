//! Tabla de asignación de registros.
//!
//! Cada registro del pool aloja a lo sumo una variable y cada variable
//! reside en a lo sumo un registro. No existe ruta de spill: si todos
//! los registros están ocupados, la asignación falla.

use std::fmt::{self, Display};

use log::debug;

use super::asm::Reg;
use crate::ir::IrVariable;

/// Ocupante de un registro.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resident {
    Variable(IrVariable),

    /// Registro auxiliar para materializar un inmediato.
    Scratch,
}

impl Display for Resident {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resident::Variable(variable) => write!(fmt, "`{}`", variable),
            Resident::Scratch => fmt.write_str("a scratch register"),
        }
    }
}

struct Slot {
    reg: Reg,
    resident: Option<Resident>,
}

pub struct RegisterFile {
    slots: Vec<Slot>,
}

impl RegisterFile {
    /// Busca el registro donde reside una variable.
    pub fn locate(&self, variable: &IrVariable) -> Option<Reg> {
        self.slots
            .iter()
            .find(|slot| matches!(&slot.resident, Some(Resident::Variable(v)) if v == variable))
            .map(|slot| slot.reg)
    }

    pub fn has_free(&self) -> bool {
        self.bound() < self.slots.len()
    }

    /// Cantidad de registros ocupados.
    pub fn bound(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.resident.is_some())
            .count()
    }

    /// Asocia el registro libre de menor número. Retorna `None` si el
    /// pool está agotado.
    pub fn allocate(&mut self, resident: Resident) -> Option<Reg> {
        let slot = self.slots.iter_mut().find(|slot| slot.resident.is_none())?;

        debug!("bind {} to {}", slot.reg, resident);
        slot.resident = Some(resident);

        Some(slot.reg)
    }

    pub fn release(&mut self, reg: Reg) {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.reg == reg) {
            if let Some(resident) = slot.resident.take() {
                debug!("release {} from {}", slot.reg, resident);
            }
        }
    }

    pub fn resident(&self, reg: Reg) -> Option<&Resident> {
        self.slots
            .iter()
            .find(|slot| slot.reg == reg)
            .and_then(|slot| slot.resident.as_ref())
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        let slots = Reg::FILE
            .iter()
            .copied()
            .map(|reg| Slot {
                reg,
                resident: None,
            })
            .collect();

        RegisterFile { slots }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp(id: u32) -> Resident {
        Resident::Variable(IrVariable::Temp(id))
    }

    #[test]
    fn lowest_free_register_first() {
        let mut regs = RegisterFile::default();
        assert_eq!(regs.allocate(temp(0)), Some(Reg::T(0)));
        assert_eq!(regs.allocate(temp(1)), Some(Reg::T(1)));
        assert_eq!(regs.allocate(temp(2)), Some(Reg::T(2)));

        regs.release(Reg::T(1));
        assert_eq!(regs.locate(&IrVariable::Temp(1)), None);
        assert_eq!(regs.allocate(Resident::Scratch), Some(Reg::T(1)));
        assert_eq!(regs.resident(Reg::T(1)), Some(&Resident::Scratch));
        assert_eq!(regs.locate(&IrVariable::Temp(2)), Some(Reg::T(2)));
    }

    #[test]
    fn exhaustion() {
        let mut regs = RegisterFile::default();
        for id in 0..7 {
            assert!(regs.has_free());
            assert!(regs.allocate(temp(id)).is_some());
        }

        assert!(!regs.has_free());
        assert_eq!(regs.bound(), 7);
        assert_eq!(regs.allocate(temp(7)), None);
    }

    #[test]
    fn release_is_idempotent() {
        let mut regs = RegisterFile::default();
        regs.allocate(temp(0));
        regs.release(Reg::T(0));
        regs.release(Reg::T(0));
        regs.release(Reg::A0);

        assert_eq!(regs.bound(), 0);
    }
}
