//! Trestle - renders box-and-arrow diagrams to SVG.
//!
//! Parsing is done by [`trestle_parser`]; this crate resolves the diagram's
//! style, lays it out and exports SVG.
//!
//! # Examples
//!
//! ```
//! let svg = trestle::render_svg("[Alice]->[Bob]").expect("valid diagram");
//! assert!(svg.starts_with("<svg"));
//! ```

pub mod config;
pub mod geometry;

mod error;
mod export;
mod layout;

pub use error::TrestleError;

use log::{debug, info, trace};

use config::{AppConfig, StyleConfig};

/// A parsed diagram together with the style it will be rendered with.
#[derive(Debug, Clone)]
pub struct Diagram {
    inner: trestle_parser::Diagram,
    style: StyleConfig,
}

impl Diagram {
    /// The parsed nodes, relations and directives.
    pub fn inner(&self) -> &trestle_parser::Diagram {
        &self.inner
    }

    /// Style after applying the diagram's directives to the configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Builder for parsing and rendering Trestle diagrams.
///
/// # Examples
///
/// ```
/// use trestle::{DiagramBuilder, config::AppConfig};
///
/// let builder = DiagramBuilder::new(AppConfig::default());
///
/// let diagram = builder.parse("[Customer]->[Order]")
///     .expect("Failed to parse");
///
/// let svg = builder.render_svg(&diagram)
///     .expect("Failed to render");
/// assert!(svg.contains("Customer"));
/// ```
#[derive(Debug, Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse source code into a [`Diagram`].
    ///
    /// Directives in the source are applied on top of the configured style.
    ///
    /// # Errors
    ///
    /// Returns [`TrestleError::Parse`] for syntax errors and invalid directive
    /// values, and [`TrestleError::Config`] when the resulting style is
    /// unusable.
    pub fn parse(&self, source: &str) -> Result<Diagram, TrestleError> {
        info!("Parsing diagram");

        let inner = trestle_parser::parse(source)
            .map_err(|err| TrestleError::new_parse_error(err, source))?;

        let style = self
            .config
            .style()
            .with_directives(inner.directives())
            .map_err(|err| TrestleError::new_parse_error(err, source))?;
        style.validate().map_err(TrestleError::Config)?;

        debug!(
            nodes = inner.nodes().len(),
            relations = inner.relations().len(),
            direction:% = style.direction();
            "Diagram parsed successfully"
        );
        trace!(diagram:? = inner; "Parsed diagram");

        Ok(Diagram { inner, style })
    }

    /// Render a parsed [`Diagram`] to an SVG string.
    ///
    /// The output only depends on the diagram and its style.
    ///
    /// # Errors
    ///
    /// Returns [`TrestleError::Config`] if the diagram's style is invalid.
    pub fn render_svg(&self, diagram: &Diagram) -> Result<String, TrestleError> {
        diagram.style.validate().map_err(TrestleError::Config)?;

        let layout = layout::Engine::new(&diagram.style).calculate(&diagram.inner);
        let document = export::svg::Svg::new(&diagram.style).render_layout(&layout);

        info!("SVG rendered successfully");
        Ok(document.to_string())
    }
}

/// Parse and render `source` with the default configuration.
///
/// # Errors
///
/// Returns [`TrestleError`] if the source does not parse.
pub fn render_svg(source: &str) -> Result<String, TrestleError> {
    let builder = DiagramBuilder::default();
    let diagram = builder.parse(source)?;
    builder.render_svg(&diagram)
}
