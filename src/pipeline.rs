//! Orquestación de las fases.
//!
//! Las tres pasadas corren en secuencia y cada una materializa por
//! completo su salida antes de que inicie la siguiente. La tabla de
//! símbolos pertenece a este módulo y se presta a cada fase: el lexer
//! solo inserta, [`TypeBinder`] solo escribe tipos e [`IrEmitter`]
//! solo lee.

use std::cell::RefCell;

use log::debug;

use crate::{
    codegen::{self, asm::AsmInstruction},
    error::Error,
    ir::{self, EvalError, Instruction},
    lex::{self, Token},
    parse,
    semantic::{binding::TypeBinder, lowering::IrEmitter},
    symtab::SymbolTable,
};

/// Resultado de una compilación exitosa, con todos los artefactos intermedios.
#[derive(Debug)]
pub struct Compilation {
    pub tokens: Vec<Token>,

    /// Tabla de símbolos tal y como la deja el análisis léxico.
    pub scanned_symbols: SymbolTable,

    /// Tabla de símbolos con tipos, tras el análisis semántico.
    pub symbols: SymbolTable,

    pub ir: Vec<Instruction>,
    pub asm: Vec<AsmInstruction>,
}

impl Compilation {
    /// Ejecuta la IR generada y retorna el valor de retorno del programa.
    pub fn emulate(&self) -> Result<Option<i32>, EvalError> {
        ir::emulate(&self.ir)
    }
}

pub fn compile(source: &str) -> Result<Compilation, Error> {
    let mut symbols = SymbolTable::default();

    let tokens = lex::tokenize(source, &mut symbols)?;
    debug!("{} tokens, {} symbols", tokens.len(), symbols.len());

    let scanned_symbols = symbols.clone();
    let symbols = RefCell::new(symbols);

    let ir = {
        let mut binder = TypeBinder::new(&symbols);
        let mut emitter = IrEmitter::new(&symbols);

        parse::parse(&tokens, (&mut binder, &mut emitter))?;
        emitter.into_code()
    };

    debug!("{} IR instructions", ir.len());

    let asm = codegen::generate(&ir)?;
    debug!("{} assembly lines", asm.len());

    Ok(Compilation {
        tokens,
        scanned_symbols,
        symbols: symbols.into_inner(),
        ir,
        asm,
    })
}
