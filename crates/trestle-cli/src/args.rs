//! Command-line argument definitions for the Trestle CLI.
//!
//! The positional arguments alone decide the [`InvocationMode`]: none means
//! stream mode, two mean a file-pair conversion.

use std::path::PathBuf;

use clap::Parser;

/// Render Trestle diagrams to SVG.
///
/// Without arguments, reads a diagram from standard input and writes SVG to
/// standard output. With two paths, converts the input file into the output
/// file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input diagram file
    #[arg(requires = "output")]
    pub input: Option<PathBuf>,

    /// Path to the output SVG file, replaced if it exists
    pub output: Option<PathBuf>,
}

/// Which adapter runs for this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationMode {
    /// Standard input to standard output.
    Stream,
    /// One input file to one output file.
    FilePair { input: PathBuf, output: PathBuf },
}

impl Args {
    pub fn mode(&self) -> InvocationMode {
        match (&self.input, &self.output) {
            (Some(input), Some(output)) => InvocationMode::FilePair {
                input: input.clone(),
                output: output.clone(),
            },
            // clap rejects an input without an output
            _ => InvocationMode::Stream,
        }
    }
}
