//! SVG rendering for positioned diagrams.

use log::debug;
use svg::{self, node::Text as SvgText, node::element as svg_element};

use trestle_parser::diagram::{LineStyle, Marker, NodeKind};

use crate::{
    config::StyleConfig,
    geometry::{Bounds, Point},
    layout::{Layout, PositionedNode, Route},
};

/// Relative to the font size, like the layout's line metrics.
const LINE_HEIGHT: f32 = 1.4;

const ARROW_MARKER_ID: &str = "arrow";
const TRIANGLE_MARKER_ID: &str = "triangle";

/// Sets the style's stroke color and width on an SVG element.
macro_rules! apply_stroke {
    ($element:expr, $style:expr) => {
        $element
            .set("stroke", $style.stroke())
            .set("stroke-width", $style.line_width())
    };
}

/// Turns a [`Layout`] into an SVG document using one style.
pub struct Svg<'s> {
    style: &'s StyleConfig,
}

impl<'s> Svg<'s> {
    pub fn new(style: &'s StyleConfig) -> Self {
        Self { style }
    }

    /// Renders the complete layout to an SVG document.
    ///
    /// Relations are drawn below nodes so that their ends tuck under the
    /// node outlines.
    pub fn render_layout(&self, layout: &Layout<'_>) -> svg::Document {
        let bounds = layout.bounds();
        let margin = self.style.spacing() / 2.0;
        let width = bounds.width() + 2.0 * margin;
        let height = bounds.height() + 2.0 * margin;

        let mut main_group = svg_element::Group::new().set(
            "transform",
            format!(
                "translate({}, {})",
                margin - bounds.min_x(),
                margin - bounds.min_y()
            ),
        );

        for route in layout.routes() {
            main_group = main_group.add(self.render_route(route));
        }
        for node in layout.nodes() {
            main_group = main_group.add(self.render_node(node));
        }

        debug!(width, height; "SVG document rendered");

        svg::Document::new()
            .set("viewBox", format!("0 0 {width} {height}"))
            .set("width", width)
            .set("height", height)
            .add(self.marker_definitions())
            .add(main_group)
    }

    fn marker_definitions(&self) -> svg_element::Definitions {
        svg_element::Definitions::new()
            .add(self.create_marker(ARROW_MARKER_ID, self.style.stroke()))
            .add(self.create_marker(TRIANGLE_MARKER_ID, "#ffffff"))
    }

    fn create_marker(&self, id: &str, fill: &str) -> svg_element::Marker {
        svg_element::Marker::new()
            .set("id", id)
            .set("viewBox", "0 0 10 10")
            .set("refX", 9)
            .set("refY", 5)
            .set("markerWidth", 6)
            .set("markerHeight", 6)
            .set("orient", "auto-start-reverse")
            .add(
                svg_element::Path::new()
                    .set("d", "M 0 0 L 10 5 L 0 10 z")
                    .set("fill", fill)
                    .set("stroke", self.style.stroke())
                    .set("stroke-width", 1),
            )
    }

    fn render_route(&self, route: &Route<'_>) -> svg_element::Path {
        let relation = route.relation();

        let path = svg_element::Path::new()
            .set("d", path_data(route.points()))
            .set("fill", "none");
        let mut path = apply_stroke!(path, self.style);

        if relation.line() == LineStyle::Dashed {
            path = path.set("stroke-dasharray", "6 4");
        }
        if let Some(id) = marker_id(relation.source_marker()) {
            path = path.set("marker-start", format!("url(#{id})"));
        }
        if let Some(id) = marker_id(relation.target_marker()) {
            path = path.set("marker-end", format!("url(#{id})"));
        }

        path
    }

    fn render_node(&self, positioned: &PositionedNode<'_>) -> svg_element::Group {
        let node = positioned.node();
        let bounds = positioned.bounds();
        let mut group = svg_element::Group::new();

        match node.kind() {
            NodeKind::Class | NodeKind::Abstract => {
                let rect = svg_element::Rectangle::new()
                    .set("x", bounds.min_x())
                    .set("y", bounds.min_y())
                    .set("width", bounds.width())
                    .set("height", bounds.height())
                    .set("fill", self.style.fill());
                group = group.add(apply_stroke!(rect, self.style));

                // Separators between compartments
                let mut top = bounds.min_y();
                for height in positioned
                    .compartment_heights()
                    .iter()
                    .take(positioned.compartment_heights().len().saturating_sub(1))
                {
                    top += height;
                    let separator = svg_element::Line::new()
                        .set("x1", bounds.min_x())
                        .set("y1", top)
                        .set("x2", bounds.max_x())
                        .set("y2", top);
                    group = group.add(apply_stroke!(separator, self.style));
                }
            }
            NodeKind::Note => {
                let fold = self.style.padding().min(bounds.width() / 2.0);
                let corner = Point::new(bounds.max_x() - fold, bounds.min_y());
                let outline = format!(
                    "M {} {} L {} {} L {} {} L {} {} L {} {} Z",
                    bounds.min_x(),
                    bounds.min_y(),
                    corner.x(),
                    corner.y(),
                    bounds.max_x(),
                    bounds.min_y() + fold,
                    bounds.max_x(),
                    bounds.max_y(),
                    bounds.min_x(),
                    bounds.max_y(),
                );
                let crease = format!(
                    "M {} {} L {} {} L {} {}",
                    corner.x(),
                    corner.y(),
                    corner.x(),
                    bounds.min_y() + fold,
                    bounds.max_x(),
                    bounds.min_y() + fold,
                );
                let outline = svg_element::Path::new()
                    .set("d", outline)
                    .set("fill", self.style.fill());
                let crease = svg_element::Path::new()
                    .set("d", crease)
                    .set("fill", "none");
                group = group
                    .add(apply_stroke!(outline, self.style))
                    .add(apply_stroke!(crease, self.style));
            }
            NodeKind::Label => {}
        }

        let mut top = bounds.min_y();
        for (index, (lines, height)) in node
            .compartments()
            .iter()
            .zip(positioned.compartment_heights())
            .enumerate()
        {
            if !lines.is_empty() {
                group = group.add(self.render_text(lines, bounds, top, index == 0, node.kind()));
            }
            top += height;
        }

        group
    }

    fn render_text(
        &self,
        lines: &[String],
        bounds: Bounds,
        top: f32,
        is_name: bool,
        kind: NodeKind,
    ) -> svg_element::Text {
        let font_size = self.style.font_size();
        let padding = self.style.padding();
        let line_height = LINE_HEIGHT * font_size;

        let (x, anchor) = if is_name {
            (bounds.center().x(), "middle")
        } else {
            (bounds.min_x() + padding, "start")
        };

        let mut text = svg_element::Text::new("")
            .set("x", x)
            .set("y", top + padding - line_height / 2.0)
            .set("text-anchor", anchor)
            .set("dominant-baseline", "central")
            .set("font-family", self.style.font())
            .set("font-size", font_size)
            .set("fill", self.style.stroke());

        if is_name && matches!(kind, NodeKind::Class | NodeKind::Abstract) {
            text = text.set("font-weight", "bold");
        }
        if is_name && kind == NodeKind::Abstract {
            text = text.set("font-style", "italic");
        }

        for line in lines {
            text = text.add(
                svg_element::TSpan::new("")
                    .set("x", x)
                    .set("dy", line_height)
                    .add(SvgText::new(line.as_str())),
            );
        }

        text
    }
}

fn marker_id(marker: Marker) -> Option<&'static str> {
    match marker {
        Marker::None => None,
        Marker::Arrow => Some(ARROW_MARKER_ID),
        Marker::Triangle => Some(TRIANGLE_MARKER_ID),
    }
}

fn path_data(points: &[Point]) -> String {
    points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let command = if index == 0 { "M" } else { "L" };
            format!("{command} {} {}", point.x(), point.y())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Engine;

    fn render(source: &str) -> String {
        let diagram = trestle_parser::parse(source).expect("test source must parse");
        let style = StyleConfig::default();
        let layout = Engine::new(&style).calculate(&diagram);
        Svg::new(&style).render_layout(&layout).to_string()
    }

    #[test]
    fn test_path_data() {
        let points = [Point::new(0.0, 1.0), Point::new(2.5, 3.0)];
        assert_eq!(path_data(&points), "M 0 1 L 2.5 3");
    }

    #[test]
    fn test_empty_document_has_margin_only() {
        let svg = render("");
        assert!(svg.contains(r#"viewBox="0 0 40 40""#), "{svg}");
        assert!(svg.contains(r#"id="arrow""#));
        assert!(!svg.contains("<rect"));
    }

    #[test]
    fn test_class_node_text() {
        let svg = render("[Alice]->[Bob]");
        assert!(svg.contains(">Alice</tspan>"), "{svg}");
        assert!(svg.contains(">Bob</tspan>"));
        assert!(svg.contains(r#"font-weight="bold""#));
        assert!(svg.contains(r#"marker-end="url(#arrow)""#));
        assert!(!svg.contains("marker-start"));
    }

    #[test]
    fn test_dashed_triangle_relation() {
        let svg = render("[Shape]<:--[Circle]");
        assert!(svg.contains(r#"stroke-dasharray="6 4""#), "{svg}");
        assert!(svg.contains(r#"marker-start="url(#triangle)""#));
    }

    #[test]
    fn test_abstract_name_is_italic() {
        let svg = render("[<abstract> Shape]");
        assert!(svg.contains(r#"font-style="italic""#), "{svg}");
    }

    #[test]
    fn test_compartment_separators() {
        let svg = render("[Account | id | deposit()]");
        assert_eq!(svg.matches("<line").count(), 2, "{svg}");
        assert!(svg.contains(r#"text-anchor="start""#));
    }

    #[test]
    fn test_label_has_no_outline() {
        let svg = render("[<label> just text]");
        assert!(!svg.contains("<rect"));
        // only the two marker shapes
        assert_eq!(svg.matches("<path").count(), 2, "{svg}");
        assert!(svg.contains("just text"));
    }

    #[test]
    fn test_text_is_escaped() {
        let svg = render("[List<T> & more]");
        assert!(svg.contains("List&lt;T&gt; &amp; more"), "{svg}");
    }
}
