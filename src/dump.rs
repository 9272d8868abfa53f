//! Volcado de artefactos intermedios a archivos.

use std::{
    fmt::Display,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
    str::FromStr,
};

use bitflags::bitflags;
use thiserror::Error;

use crate::{ir::EvalError, pipeline::Compilation};

bitflags! {
    /// Artefactos a volcar tras una compilación.
    pub struct Dumps: u32 {
        /// Flujo de tokens.
        const TOKENS = 0x01;

        /// Tabla de símbolos antes y después del análisis semántico.
        const SYMBOLS = 0x02;

        /// Listado de IR.
        const IR = 0x04;

        /// Resultado de emular la IR.
        const EVAL = 0x08;

        /// Código ensamblador.
        const ASM = 0x10;
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown artifact kind `{0}`")]
pub struct UnknownDump(pub String);

impl FromStr for Dumps {
    type Err = UnknownDump;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "tokens" => Ok(Dumps::TOKENS),
            "symbols" => Ok(Dumps::SYMBOLS),
            "ir" => Ok(Dumps::IR),
            "eval" => Ok(Dumps::EVAL),
            "asm" => Ok(Dumps::ASM),
            "all" => Ok(Dumps::all()),
            _ => Err(UnknownDump(string.to_owned())),
        }
    }
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("I/O error")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

pub const TOKENS_FILE: &str = "token.txt";
pub const OLD_SYMBOLS_FILE: &str = "old_symbol_table.txt";
pub const NEW_SYMBOLS_FILE: &str = "new_symbol_table.txt";
pub const IR_FILE: &str = "intermediate_code.txt";
pub const EVAL_FILE: &str = "ir_emulate_result.txt";
pub const ASM_FILE: &str = "assembly_language.asm";

/// Escribe los artefactos seleccionados en `dir`, creándolo si no existe.
pub fn write_all(compilation: &Compilation, dumps: Dumps, dir: &Path) -> Result<(), DumpError> {
    fs::create_dir_all(dir)?;

    if dumps.contains(Dumps::TOKENS) {
        write_file(&dir.join(TOKENS_FILE), &compilation.tokens)?;
    }

    if dumps.contains(Dumps::SYMBOLS) {
        fs::write(
            dir.join(OLD_SYMBOLS_FILE),
            compilation.scanned_symbols.to_string(),
        )?;

        fs::write(dir.join(NEW_SYMBOLS_FILE), compilation.symbols.to_string())?;
    }

    if dumps.contains(Dumps::IR) {
        write_file(&dir.join(IR_FILE), &compilation.ir)?;
    }

    if dumps.contains(Dumps::EVAL) {
        let result = match compilation.emulate()? {
            Some(value) => format!("{}\n", value),
            None => String::from("no return value\n"),
        };

        fs::write(dir.join(EVAL_FILE), result)?;
    }

    if dumps.contains(Dumps::ASM) {
        write_file(&dir.join(ASM_FILE), &compilation.asm)?;
    }

    Ok(())
}

/// Escribe un elemento por línea.
pub fn write_lines<W, I>(output: &mut W, items: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator,
    I::Item: Display,
{
    for item in items {
        writeln!(output, "{}", item)?;
    }

    Ok(())
}

fn write_file<I>(path: &Path, items: I) -> io::Result<()>
where
    I: IntoIterator,
    I::Item: Display,
{
    let mut output = BufWriter::new(File::create(path)?);
    write_lines(&mut output, items)?;
    output.flush()
}
