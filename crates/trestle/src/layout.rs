//! Rank-based layout.
//!
//! Nodes are sized from their text, assigned ranks by longest path over the
//! relations and placed rank by rank along the configured [`Direction`].
//! Relations become polylines clipped to the node boxes.

use log::{debug, trace};

use trestle_parser::diagram::{Diagram, Node, Relation};

use crate::{
    config::{Direction, StyleConfig},
    geometry::{Bounds, Point, Size},
};

/// Horizontal advance of one character, relative to the font size.
const CHAR_ADVANCE: f32 = 0.6;
/// Height of one text line, relative to the font size.
const LINE_HEIGHT: f32 = 1.4;

/// A node with its final position.
#[derive(Debug)]
pub struct PositionedNode<'a> {
    node: &'a Node,
    bounds: Bounds,
    compartment_heights: Vec<f32>,
}

impl<'a> PositionedNode<'a> {
    pub fn node(&self) -> &'a Node {
        self.node
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Height of each compartment, top to bottom.
    pub fn compartment_heights(&self) -> &[f32] {
        &self.compartment_heights
    }
}

/// A relation with the polyline it is drawn along.
#[derive(Debug)]
pub struct Route<'a> {
    relation: &'a Relation,
    points: Vec<Point>,
}

impl<'a> Route<'a> {
    pub fn relation(&self) -> &'a Relation {
        self.relation
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// The positioned contents of one diagram.
#[derive(Debug)]
pub struct Layout<'a> {
    nodes: Vec<PositionedNode<'a>>,
    routes: Vec<Route<'a>>,
    bounds: Bounds,
}

impl<'a> Layout<'a> {
    /// Nodes in the same order as the diagram's nodes.
    pub fn nodes(&self) -> &[PositionedNode<'a>] {
        &self.nodes
    }

    /// Routes in the same order as the diagram's relations.
    pub fn routes(&self) -> &[Route<'a>] {
        &self.routes
    }

    /// Bounds of all nodes and routes. Default (zero) for an empty diagram.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// Computes a [`Layout`] for diagrams with a fixed style.
pub struct Engine<'s> {
    style: &'s StyleConfig,
}

impl<'s> Engine<'s> {
    pub fn new(style: &'s StyleConfig) -> Self {
        Self { style }
    }

    pub fn calculate<'a>(&self, diagram: &'a Diagram) -> Layout<'a> {
        let sizes: Vec<(Size, Vec<f32>)> =
            diagram.nodes().iter().map(|node| self.measure(node)).collect();

        let ranks = assign_ranks(diagram.nodes().len(), diagram.relations());
        let centers = self.place(&sizes, &ranks);

        let nodes: Vec<PositionedNode<'a>> = diagram
            .nodes()
            .iter()
            .zip(sizes)
            .zip(centers)
            .map(|((node, (size, compartment_heights)), center)| PositionedNode {
                node,
                bounds: Bounds::new_from_center(center, size),
                compartment_heights,
            })
            .collect();

        let routes: Vec<Route<'a>> = diagram
            .relations()
            .iter()
            .map(|relation| Route {
                relation,
                points: self.route(
                    nodes[relation.source()].bounds,
                    nodes[relation.target()].bounds,
                    relation.source() == relation.target(),
                ),
            })
            .collect();

        let bounds = nodes
            .iter()
            .map(|node| node.bounds)
            .chain(routes.iter().flat_map(|route| {
                route
                    .points
                    .iter()
                    .map(|point| Bounds::new_from_center(*point, Size::default()))
            }))
            .reduce(|acc, bounds| acc.merge(&bounds))
            .unwrap_or_default();

        debug!(
            nodes = nodes.len(),
            routes = routes.len(),
            width = bounds.width(),
            height = bounds.height();
            "Layout calculated"
        );

        Layout {
            nodes,
            routes,
            bounds,
        }
    }

    /// Size of a node and the height of each of its compartments.
    fn measure(&self, node: &Node) -> (Size, Vec<f32>) {
        let font_size = self.style.font_size();
        let padding = self.style.padding();

        let mut width: f32 = 0.0;
        let mut heights = Vec::with_capacity(node.compartments().len());
        for lines in node.compartments() {
            let longest = lines
                .iter()
                .map(|line| line.chars().count())
                .max()
                .unwrap_or(0);
            width = width.max(longest as f32 * CHAR_ADVANCE * font_size + 2.0 * padding);
            heights.push(lines.len() as f32 * LINE_HEIGHT * font_size + 2.0 * padding);
        }

        let size = Size::new(width, heights.iter().sum());
        trace!(name = node.name(), width = size.width(), height = size.height(); "Node measured");
        (size, heights)
    }

    /// Center point of every node.
    fn place(&self, sizes: &[(Size, Vec<f32>)], ranks: &[usize]) -> Vec<Point> {
        let spacing = self.style.spacing();
        let direction = self.style.direction();

        // (cross, main) extents, where main is the axis ranks are stacked along.
        let extents = |size: Size| match direction {
            Direction::Down => (size.width(), size.height()),
            Direction::Right => (size.height(), size.width()),
        };

        let rank_count = ranks.iter().max().map_or(0, |max| max + 1);
        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
        for (index, rank) in ranks.iter().enumerate() {
            rows[*rank].push(index);
        }
        rows.retain(|row| !row.is_empty());

        let row_extent = |row: &[usize]| {
            let cross: f32 = row.iter().map(|i| extents(sizes[*i].0).0).sum::<f32>()
                + spacing * row.len().saturating_sub(1) as f32;
            let main = row
                .iter()
                .map(|i| extents(sizes[*i].0).1)
                .fold(0.0, f32::max);
            (cross, main)
        };

        let widest = rows
            .iter()
            .map(|row| row_extent(row).0)
            .fold(0.0, f32::max);

        let mut centers = vec![Point::default(); sizes.len()];
        let mut main_cursor = 0.0;
        for row in &rows {
            let (row_cross, row_main) = row_extent(row);
            let mut cross_cursor = (widest - row_cross) / 2.0;
            let main_center = main_cursor + row_main / 2.0;

            for index in row {
                let (cross, _) = extents(sizes[*index].0);
                let cross_center = cross_cursor + cross / 2.0;
                centers[*index] = match direction {
                    Direction::Down => Point::new(cross_center, main_center),
                    Direction::Right => Point::new(main_center, cross_center),
                };
                cross_cursor += cross + spacing;
            }

            main_cursor += row_main + spacing;
        }

        centers
    }

    fn route(&self, source: Bounds, target: Bounds, is_loop: bool) -> Vec<Point> {
        if is_loop {
            let reach = source.max_x() + self.style.spacing() / 2.0;
            let quarter = source.height() / 4.0;
            let center_y = source.center().y();
            return vec![
                Point::new(source.max_x(), center_y - quarter),
                Point::new(reach, center_y - quarter),
                Point::new(reach, center_y + quarter),
                Point::new(source.max_x(), center_y + quarter),
            ];
        }

        vec![
            source.exit_point(target.center()),
            target.exit_point(source.center()),
        ]
    }
}

/// Rank of every node by longest path from a node without predecessors.
///
/// Self-relations are ignored. Ranks never reach `node_count`, so cycles
/// settle after at most `node_count` passes.
fn assign_ranks(node_count: usize, relations: &[Relation]) -> Vec<usize> {
    let mut ranks = vec![0; node_count];

    for _ in 0..node_count {
        let mut changed = false;
        for relation in relations {
            let (source, target) = (relation.source(), relation.target());
            if source == target {
                continue;
            }
            let candidate = ranks[source] + 1;
            if candidate > ranks[target] && candidate < node_count {
                ranks[target] = candidate;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    ranks
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn layout_of(source: &str, style: &StyleConfig, check: impl FnOnce(&Layout<'_>)) {
        let diagram = trestle_parser::parse(source).expect("test source must parse");
        let layout = Engine::new(style).calculate(&diagram);
        check(&layout);
    }

    #[test]
    fn test_ranks_follow_longest_path() {
        layout_of("[a]->[b]->[c]\n[a]->[c]\n[d]", &StyleConfig::default(), |layout| {
            let relations: Vec<Relation> = layout
                .routes()
                .iter()
                .map(|route| *route.relation())
                .collect();
            assert_eq!(assign_ranks(4, &relations), vec![0, 1, 2, 0]);
        });
    }

    #[test]
    fn test_ranks_terminate_on_cycles() {
        layout_of("[a]->[b]->[c]->[a]", &StyleConfig::default(), |layout| {
            let relations: Vec<Relation> = layout
                .routes()
                .iter()
                .map(|route| *route.relation())
                .collect();
            let ranks = assign_ranks(3, &relations);
            assert!(ranks.iter().all(|rank| *rank < 3));
        });
    }

    #[test]
    fn test_node_size_from_text() {
        let style = StyleConfig::default();
        layout_of("[Alice | age; name]", &style, |layout| {
            let node = &layout.nodes()[0];
            // "Alice" is 5 chars, "name" and "age" shorter
            let expected_width = 5.0 * 0.6 * 12.0 + 16.0;
            let expected_height = (1.4 * 12.0 + 16.0) + (2.0 * 1.4 * 12.0 + 16.0);
            assert!(approx_eq!(f32, node.bounds().width(), expected_width, ulps = 4));
            assert!(approx_eq!(f32, node.bounds().height(), expected_height, ulps = 4));
            assert_eq!(node.compartment_heights().len(), 2);
        });
    }

    #[test]
    fn test_down_direction_stacks_vertically() {
        layout_of("[Alice]->[Bob]", &StyleConfig::default(), |layout| {
            let alice = layout.nodes()[0].bounds();
            let bob = layout.nodes()[1].bounds();
            assert!(bob.min_y() >= alice.max_y() + 40.0 - 0.001);
            assert!(approx_eq!(f32, alice.center().x(), bob.center().x(), ulps = 4));
        });
    }

    #[test]
    fn test_right_direction_stacks_horizontally() {
        let style = StyleConfig::default()
            .with_directives(
                trestle_parser::parse("#direction: right")
                    .unwrap()
                    .directives(),
            )
            .unwrap();
        layout_of("[Alice]->[Bob]", &style, |layout| {
            let alice = layout.nodes()[0].bounds();
            let bob = layout.nodes()[1].bounds();
            assert!(bob.min_x() >= alice.max_x() + 40.0 - 0.001);
            assert!(approx_eq!(f32, alice.center().y(), bob.center().y(), ulps = 4));
        });
    }

    #[test]
    fn test_route_is_clipped_to_boxes() {
        layout_of("[Alice]->[Bob]", &StyleConfig::default(), |layout| {
            let alice = layout.nodes()[0].bounds();
            let bob = layout.nodes()[1].bounds();
            let points = layout.routes()[0].points();
            assert_eq!(points.len(), 2);
            assert!(approx_eq!(f32, points[0].y(), alice.max_y(), ulps = 4));
            assert!(approx_eq!(f32, points[1].y(), bob.min_y(), ulps = 4));
        });
    }

    #[test]
    fn test_self_relation_loops_on_the_right() {
        layout_of("[Loop]->[Loop]", &StyleConfig::default(), |layout| {
            let node = layout.nodes()[0].bounds();
            let points = layout.routes()[0].points();
            assert_eq!(points.len(), 4);
            assert!(points[1].x() > node.max_x());
            assert!(layout.bounds().max_x() > node.max_x());
        });
    }

    #[test]
    fn test_empty_diagram() {
        layout_of("", &StyleConfig::default(), |layout| {
            assert!(layout.nodes().is_empty());
            assert_eq!(layout.bounds(), Bounds::default());
        });
    }

    #[test]
    fn test_rank_is_centered_across_widest() {
        layout_of("[root]->[a]\n[root]->[b]", &StyleConfig::default(), |layout| {
            let root = layout.nodes()[0].bounds();
            let a = layout.nodes()[1].bounds();
            let b = layout.nodes()[2].bounds();
            let middle = (a.min_x() + b.max_x()) / 2.0;
            assert!(approx_eq!(f32, root.center().x(), middle, ulps = 4));
        });
    }
}
