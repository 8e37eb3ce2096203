//! Semantic model produced by the parser.
//!
//! A [`Diagram`] is a flat list of [`Node`]s in first-appearance order,
//! the [`Relation`]s between them and any style [`Directive`]s found in the
//! source. Relations refer to nodes by index into [`Diagram::nodes`].

use std::fmt;

use crate::span::{Span, Spanned};

/// How a node is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// A box with compartments. The default.
    #[default]
    Class,
    /// Like [`NodeKind::Class`], with the name set in italics.
    Abstract,
    /// A box with a folded top-right corner.
    Note,
    /// Text only, no outline.
    Label,
}

impl NodeKind {
    /// Look up a kind by the name used in `<kind>` position.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "class" => Some(NodeKind::Class),
            "abstract" => Some(NodeKind::Abstract),
            "note" => Some(NodeKind::Note),
            "label" => Some(NodeKind::Label),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Class => "class",
            NodeKind::Abstract => "abstract",
            NodeKind::Note => "note",
            NodeKind::Label => "label",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A diagram node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    kind: NodeKind,
    compartments: Vec<Vec<String>>,
    span: Span,
}

impl Node {
    pub(crate) fn new(
        name: String,
        kind: NodeKind,
        compartments: Vec<Vec<String>>,
        span: Span,
    ) -> Self {
        Self {
            name,
            kind,
            compartments,
            span,
        }
    }

    /// The node's identity: the text of its first compartment.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Text lines of every compartment, the name compartment first.
    pub fn compartments(&self) -> &[Vec<String>] {
        &self.compartments
    }

    /// Span of the definition the node's content was taken from.
    pub fn span(&self) -> Span {
        self.span
    }
}

/// Decoration at one end of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Marker {
    #[default]
    None,
    /// Filled arrow head: `<` or `>`.
    Arrow,
    /// Hollow triangle: `<:` or `:>`.
    Triangle,
}

/// Stroke of a relation line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineStyle {
    /// `-`
    #[default]
    Solid,
    /// `--`
    Dashed,
}

/// A directed link between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    source: usize,
    target: usize,
    source_marker: Marker,
    target_marker: Marker,
    line: LineStyle,
    span: Span,
}

impl Relation {
    pub(crate) fn new(
        source: usize,
        target: usize,
        (source_marker, line, target_marker): (Marker, LineStyle, Marker),
        span: Span,
    ) -> Self {
        Self {
            source,
            target,
            source_marker,
            target_marker,
            line,
            span,
        }
    }

    /// Index of the node on the left of the association.
    pub fn source(&self) -> usize {
        self.source
    }

    /// Index of the node on the right of the association.
    pub fn target(&self) -> usize {
        self.target
    }

    pub fn source_marker(&self) -> Marker {
        self.source_marker
    }

    pub fn target_marker(&self) -> Marker {
        self.target_marker
    }

    pub fn line(&self) -> LineStyle {
        self.line
    }

    /// Span of the association token.
    pub fn span(&self) -> Span {
        self.span
    }
}

/// A `#key: value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    key: Spanned<String>,
    value: Spanned<String>,
}

impl Directive {
    pub(crate) fn new(key: Spanned<String>, value: Spanned<String>) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &Spanned<String> {
        &self.key
    }

    pub fn value(&self) -> &Spanned<String> {
        &self.value
    }
}

/// A fully parsed diagram.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagram {
    nodes: Vec<Node>,
    relations: Vec<Relation>,
    directives: Vec<Directive>,
}

impl Diagram {
    pub(crate) fn new(nodes: Vec<Node>, relations: Vec<Relation>, directives: Vec<Directive>) -> Self {
        Self {
            nodes,
            relations,
            directives,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Returns `true` if the diagram has nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
