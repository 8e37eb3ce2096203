//! Export of laid-out diagrams.
//!
//! This is the final stage of the rendering pipeline:
//!
//! ```text
//! Source Text
//!     ↓ parse
//! Diagram
//!     ↓ layout
//! Layout
//!     ↓ export (this module)
//! SVG text
//! ```

/// SVG export backend.
pub mod svg;
