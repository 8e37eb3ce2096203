//! CLI logic for the Trestle diagram tool.
//!
//! One invocation renders exactly one diagram. The input is read completely,
//! rendered once and written completely, in that order:
//!
//! ```text
//! Idle → Acquiring → Rendering → Emitting → Done
//!            └───────────┴───────────┴──→ Failed
//! ```
//!
//! [`stream`] connects standard input to standard output; [`file`] converts
//! one file into another.

pub mod error_adapter;
pub mod file;
pub mod stream;

mod args;
mod error;

pub use args::{Args, InvocationMode};
pub use error::CliError;

use std::io;

use log::{debug, info, warn};

use trestle::{DiagramBuilder, TrestleError};

/// Turns diagram source text into SVG markup.
pub trait Renderer {
    /// Render one complete diagram.
    ///
    /// # Errors
    ///
    /// Returns [`TrestleError`] if the source is not a valid diagram.
    fn render_svg(&self, source: &str) -> Result<String, TrestleError>;
}

impl Renderer for DiagramBuilder {
    fn render_svg(&self, source: &str) -> Result<String, TrestleError> {
        let diagram = self.parse(source)?;
        DiagramBuilder::render_svg(self, &diagram)
    }
}

/// Progress of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Acquiring,
    Rendering,
    Emitting,
    Done,
    Failed,
}

impl Phase {
    pub(crate) fn enter(self) {
        debug!(phase:? = self; "Entering phase");
    }
}

/// Run the Trestle CLI application.
///
/// Dispatches to the adapter selected by the arguments, rendering with the
/// default configuration.
///
/// # Errors
///
/// Returns [`CliError`] naming the phase that failed.
pub fn run(args: &Args) -> Result<(), CliError> {
    Phase::Idle.enter();
    let renderer = DiagramBuilder::default();

    let result = match args.mode() {
        InvocationMode::Stream => {
            info!("Rendering standard input to standard output");
            stream::run_stream(&renderer, io::stdin().lock(), io::stdout().lock())
        }
        InvocationMode::FilePair { input, output } => {
            info!(
                input_path:? = input,
                output_path:? = output;
                "Processing diagram"
            );
            file::run_file_pair(&renderer, &input, &output)
        }
    };

    match &result {
        Ok(()) => Phase::Done.enter(),
        Err(_) => Phase::Failed.enter(),
    }
    result
}

/// Decode raw input as UTF-8, replacing invalid sequences with U+FFFD.
pub(crate) fn decode(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|err| {
        warn!(valid_up_to = err.utf8_error().valid_up_to(); "Input is not valid UTF-8, replacing invalid sequences");
        String::from_utf8_lossy(err.as_bytes()).into_owned()
    })
}

/// Invoke the renderer once, consuming the acquired source.
pub(crate) fn render<R>(renderer: &R, source: String) -> Result<String, CliError>
where
    R: Renderer + ?Sized,
{
    Phase::Rendering.enter();
    let svg = renderer.render_svg(&source)?;
    debug!(source_len = source.len(), svg_len = svg.len(); "Diagram rendered");
    Ok(svg)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::{Cell, RefCell};

    use trestle::TrestleError;

    use super::Renderer;

    /// Wraps the source in an `<svg>` element and remembers every call.
    #[derive(Default)]
    pub struct RecordingRenderer {
        pub calls: Cell<usize>,
        pub sources: RefCell<Vec<String>>,
    }

    impl Renderer for RecordingRenderer {
        fn render_svg(&self, source: &str) -> Result<String, TrestleError> {
            self.calls.set(self.calls.get() + 1);
            self.sources.borrow_mut().push(source.to_string());
            Ok(format!("<svg>{source}</svg>"))
        }
    }

    /// Rejects every source.
    pub struct FailingRenderer;

    impl Renderer for FailingRenderer {
        fn render_svg(&self, _source: &str) -> Result<String, TrestleError> {
            Err(TrestleError::Config("rejected".to_string()))
        }
    }
}
