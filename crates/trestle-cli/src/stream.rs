//! Stream adapter: standard input to standard output.

use std::io::{Read, Write};

use log::debug;

use crate::{CliError, Phase, Renderer, decode, render};

const INPUT: &str = "standard input";
const OUTPUT: &str = "standard output";

/// Read `input` to its end, render it once and write the SVG to `output`.
///
/// Nothing is written if reading or rendering fails.
///
/// # Errors
///
/// Returns [`CliError::Acquire`] if reading fails, [`CliError::Render`] if
/// the renderer rejects the source and [`CliError::Emit`] if writing or
/// flushing fails.
pub fn run_stream<R, I, O>(renderer: &R, input: I, output: O) -> Result<(), CliError>
where
    R: Renderer + ?Sized,
    I: Read,
    O: Write,
{
    let source = acquire(input)?;
    let svg = render(renderer, source)?;
    emit(output, &svg)
}

fn acquire(mut input: impl Read) -> Result<String, CliError> {
    Phase::Acquiring.enter();

    let mut buffer = Vec::new();
    input
        .read_to_end(&mut buffer)
        .map_err(|err| CliError::acquire(INPUT, err))?;
    debug!(bytes = buffer.len(); "Input acquired");

    Ok(decode(buffer))
}

fn emit(mut output: impl Write, svg: &str) -> Result<(), CliError> {
    Phase::Emitting.enter();

    output
        .write_all(svg.as_bytes())
        .and_then(|()| output.flush())
        .map_err(|err| CliError::emit(OUTPUT, err))
}
