macro_rules! emit {
    ($generator:expr, $instruction:expr) => {{
        let instruction = $instruction;
        log::trace!("\t{}", instruction);
        $generator.output.push(instruction);
    }};
}
