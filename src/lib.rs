//! Compilador para un subconjunto mínimo de C con destino RISC-V.
//!
//! # Front end
//! Cada programa deriva de un único archivo de código fuente. Este
//! archivo se somete primero a análisis léxico en [`lex`], de lo cual
//! se obtiene un flujo de tokens y una tabla de símbolos inicial en
//! [`symtab`]. El flujo de tokens se reconoce en [`parse`], que no
//! construye un árbol sintáctico sino que notifica cada desplazamiento
//! y reducción a observadores. Los observadores de [`semantic`] ligan
//! tipos a declaraciones y emiten la representación intermedia descrita
//! en [`ir`], con lo cual concluyen las fases delanteras.
//!
//! # Back end
//! [`codegen`] traduce la IR a ensamblador RISC-V con un asignador de
//! registros voraz sobre `t0..t6`. El valor de retorno queda en `a0`.
//! [`pipeline`] orquesta las fases y [`dump`] vuelca cada artefacto
//! intermedio a disco.

#[macro_use]
mod macros;

pub mod codegen;
pub mod dump;
pub mod error;
pub mod ir;
pub mod lex;
pub mod parse;
pub mod pipeline;
pub mod semantic;
pub mod symtab;

pub use error::Error;
pub use pipeline::{compile, Compilation};
