//! Tabla de símbolos.
//!
//! Existe un único ámbito plano. Las entradas se crean durante el
//! análisis léxico sin tipo y nunca se eliminan. El tipo se asigna
//! más adelante por [`crate::semantic::binding::TypeBinder`]; una
//! redeclaración simplemente sobrescribe el tipo anterior.

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use crate::lex::Identifier;

/// Tipo de una variable en el lenguaje fuente.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceType {
    Int,
}

impl Display for SourceType {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Int => fmt.write_str("Int"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolEntry {
    ty: Option<SourceType>,
}

impl SymbolEntry {
    pub fn ty(&self) -> Option<SourceType> {
        self.ty
    }

    /// Asigna el tipo, retornando el anterior si lo había.
    pub fn set_ty(&mut self, ty: SourceType) -> Option<SourceType> {
        self.ty.replace(ty)
    }
}

/// Símbolos ordenados por nombre, lo cual vuelve deterministas los volcados.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: BTreeMap<Identifier, SymbolEntry>,
}

impl SymbolTable {
    pub fn has(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Registra un nombre sin tipo. No hace nada si ya existe.
    pub fn add(&mut self, id: Identifier) {
        self.symbols.entry(id).or_default();
    }

    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.symbols.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SymbolEntry> {
        self.symbols.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &SymbolEntry)> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Display for SymbolTable {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, entry) in self.iter() {
            match entry.ty {
                Some(ty) => writeln!(fmt, "({}, {})", name, ty)?,
                None => writeln!(fmt, "({}, null)", name)?,
            }
        }

        Ok(())
    }
}
