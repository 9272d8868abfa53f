//! Punto de entrada ("driver").
//!
//! Este módulo lee el archivo fuente, invoca el pipeline de compilación
//! y expone una CLI.

use anyhow::Context;
use clap::{crate_version, Arg, Command};
use log::info;
use minicc::dump::{self, Dumps};

use std::{
    fs,
    io::{self, Read},
    path::Path,
    str::FromStr,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Parsing de CLI
    let args = Command::new("minicc")
        .version(crate_version!())
        .about("Compiles a small C subset to RISC-V assembly")
        .arg(
            Arg::new("input")
                .value_name("FILE")
                .required(true)
                .help("Source file ('-' for stdin)"),
        )
        .arg(
            Arg::new("asm")
                .short('S')
                .help("Print assembly to stdout"),
        )
        .arg(
            Arg::new("out-dir")
                .short('o')
                .long("out-dir")
                .takes_value(true)
                .value_name("DIR")
                .default_value(".")
                .help("Directory for intermediate artifacts"),
        )
        .arg(
            Arg::new("dump")
                .long("dump")
                .takes_value(true)
                .multiple_occurrences(true)
                .value_name("KIND")
                .possible_values(["tokens", "symbols", "ir", "eval", "asm", "all"])
                .help("Artifacts to write (default: all, unless -S is given)"),
        )
        .get_matches();

    // Se extraen argumentos necesarios
    let input = args.value_of("input").context("No input file")?;
    let out_dir = args.value_of("out-dir").unwrap_or(".");
    let asm = args.is_present("asm");

    let dumps = match args.values_of("dump") {
        Some(kinds) => kinds
            .map(Dumps::from_str)
            .collect::<Result<Dumps, _>>()
            .context("main.rs allowed a bad artifact kind")?,

        None if asm => Dumps::empty(),
        None => Dumps::all(),
    };

    let source = read_source(input)?;
    let compilation = minicc::compile(&source).map_err(|error| {
        let kind = error.kind();
        anyhow::Error::new(error).context(kind)
    })?;

    info!(
        "{}: {} IR instructions, {} assembly lines",
        input,
        compilation.ir.len(),
        compilation.asm.len()
    );

    if asm {
        let stdout = io::stdout();
        dump::write_lines(&mut stdout.lock(), &compilation.asm)
            .context("Failed to emit to stdout")?;
    }

    if !dumps.is_empty() {
        dump::write_all(&compilation, dumps, Path::new(out_dir))
            .with_context(|| format!("Failed to write artifacts to: {}", out_dir))?;
    }

    Ok(())
}

fn read_source(input: &str) -> anyhow::Result<String> {
    match input {
        "-" => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read from stdin")?;

            Ok(source)
        }

        path => fs::read_to_string(path).with_context(|| format!("Failed to read: {}", path)),
    }
}
