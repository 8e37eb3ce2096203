//! Turns parsed statements into a [`Diagram`].
//!
//! Node bodies are split into kind and compartments, nodes are merged by
//! name, and every association in a chain becomes a [`Relation`].

use indexmap::{IndexMap, map::Entry};
use log::{debug, trace};

use crate::{
    diagram::{Diagram, Directive, Node, NodeKind, Relation},
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    parser::{RawNode, Statement},
    span::{Span, Spanned},
};

/// Accumulates nodes, relations and directives across statements.
pub(crate) struct Builder<'d> {
    nodes: IndexMap<String, Node>,
    relations: Vec<Relation>,
    directives: Vec<Directive>,
    diagnostics: &'d mut DiagnosticCollector,
}

impl<'d> Builder<'d> {
    pub(crate) fn new(diagnostics: &'d mut DiagnosticCollector) -> Self {
        Self {
            nodes: IndexMap::new(),
            relations: Vec::new(),
            directives: Vec::new(),
            diagnostics,
        }
    }

    pub(crate) fn add_statement(&mut self, statement: Statement<'_>) {
        match statement {
            Statement::Directive { key, value } => {
                self.directives.push(Directive::new(
                    key.map(str::to_string),
                    value.map(str::to_string),
                ));
            }
            Statement::Chain { head, links } => {
                let mut previous = self.add_node(&head);
                for (association, raw) in links {
                    let current = self.add_node(&raw);
                    if let (Some(source), Some(target)) = (previous, current) {
                        self.relations.push(Relation::new(
                            source,
                            target,
                            *association.inner(),
                            association.span(),
                        ));
                    }
                    previous = current;
                }
            }
        }
    }

    pub(crate) fn build(self) -> Diagram {
        let nodes: Vec<Node> = self.nodes.into_values().collect();
        debug!(
            nodes = nodes.len(),
            relations = self.relations.len(),
            directives = self.directives.len();
            "Diagram elaborated"
        );
        Diagram::new(nodes, self.relations, self.directives)
    }

    /// Register a node and return its index.
    ///
    /// A later reference with more compartments replaces the earlier content
    /// but keeps the original position. Returns `None` if the node is invalid.
    fn add_node(&mut self, raw: &RawNode<'_>) -> Option<usize> {
        let node = self.elaborate_node(raw)?;

        match self.nodes.entry(node.name().to_string()) {
            Entry::Occupied(mut entry) => {
                if node.compartments().len() > entry.get().compartments().len() {
                    trace!(name = node.name(); "Replacing node with richer definition");
                    entry.insert(node);
                }
                Some(entry.index())
            }
            Entry::Vacant(entry) => {
                let index = entry.index();
                entry.insert(node);
                Some(index)
            }
        }
    }

    fn elaborate_node(&mut self, raw: &RawNode<'_>) -> Option<Node> {
        // Body text starts right after the opening bracket.
        let body_start = raw.span.start() + 1;

        let (kind, rest, rest_offset) = match split_kind(raw.body) {
            Some((name, rest, rest_offset)) => {
                let kind_span = Span::new(
                    body_start + name.span().start()..body_start + name.span().end(),
                );
                match NodeKind::from_name(name.inner()) {
                    Some(kind) => (kind, rest, rest_offset),
                    None => {
                        self.diagnostics.emit(
                            Diagnostic::error(format!("unknown node kind `{}`", name.inner()))
                                .with_code(ErrorCode::E201)
                                .with_label(kind_span, ErrorCode::E201.description())
                                .with_help("expected one of `class`, `abstract`, `note` or `label`"),
                        );
                        return None;
                    }
                }
            }
            None => (NodeKind::default(), raw.body, 0),
        };

        let compartments: Vec<Vec<String>> = rest
            .split('|')
            .map(|compartment| {
                compartment
                    .split(';')
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .collect();

        let name = compartments
            .first()
            .map(|lines| lines.join("\n"))
            .unwrap_or_default();

        if name.is_empty() {
            let name_end = rest.find('|').unwrap_or(rest.len());
            let name_span = Span::new(
                body_start + rest_offset..body_start + rest_offset + name_end,
            );
            self.diagnostics.emit(
                Diagnostic::error("node has an empty name")
                    .with_code(ErrorCode::E200)
                    .with_label(name_span, ErrorCode::E200.description())
                    .with_secondary_label(raw.span, "in this node")
                    .with_help("write a name between the brackets, e.g. `[Alice]`"),
            );
            return None;
        }

        Some(Node::new(name, kind, compartments, raw.span))
    }
}

/// Split a leading `<kind>` off a node body.
///
/// Returns the kind name (spanned relative to the body), the remaining text
/// and the remaining text's offset in the body.
fn split_kind(body: &str) -> Option<(Spanned<&str>, &str, usize)> {
    let trimmed = body.trim_start();
    let lead = body.len() - trimmed.len();

    let inner = trimmed.strip_prefix('<')?;
    let close = inner.find('>')?;
    let name = inner[..close].trim();

    let name_start = lead + 1 + (inner[..close].len() - inner[..close].trim_start().len());
    let rest_offset = lead + 1 + close + 1;

    Some((
        Spanned::new(name, Span::new(name_start..name_start + name.len())),
        &body[rest_offset..],
        rest_offset,
    ))
}
