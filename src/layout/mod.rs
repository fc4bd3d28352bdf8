//! Automatic layout
//!
//! Computes diagram interchange for a BPMN model that has none: a grid
//! placement per process or sub-process, pools and lanes around the grids,
//! and orthogonal edges between the shapes.

pub mod config;
pub mod grid;
pub mod routing;

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::models::bpmn::{Collaboration, Definitions, FlowContainer, FlowNode, FlowNodeKind};
use crate::models::di::{Bounds, DiDiagram, DiEdge, DiShape, Waypoint};

pub use config::{ConfigError, LayoutConfig};
use grid::{Grid, compute_grid, is_attached};
use routing::{Endpoint, route_message_flow, route_sequence_flow};

/// Maximum width of an external label
const LABEL_MAX_WIDTH: i32 = 90;
/// Approximate width of one label character
const LABEL_CHAR_WIDTH: i32 = 7;
const LABEL_LINE_HEIGHT: i32 = 14;
/// Gap between a shape and its external label
const LABEL_OFFSET: i32 = 7;

/// Layout engine
///
/// Turns the semantic model into `BPMNDiagram`s. The result only depends
/// on the model and the configuration.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

/// Shapes and edges of one container, relative to its grid origin.
#[derive(Debug, Default)]
struct PlacedContainer {
    shapes: Vec<DiShape>,
    edges: Vec<DiEdge>,
    grid: Grid,
    width: i32,
    height: i32,
}

impl PlacedContainer {
    fn translate(&mut self, dx: i32, dy: i32) {
        for shape in &mut self.shapes {
            shape.bounds = shift(shape.bounds, dx, dy);
            shape.label = shape.label.map(|label| shift(label, dx, dy));
        }
        for edge in &mut self.edges {
            for point in &mut edge.waypoints {
                point.x += dx;
                point.y += dy;
            }
            edge.label = edge.label.map(|label| shift(label, dx, dy));
        }
    }
}

impl LayoutEngine {
    /// Create a layout engine with the given metrics
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out every collaboration and every process not shown in a pool.
    ///
    /// Sub-process contents get their own diagrams, placed right after the
    /// diagram that shows the sub-process. Diagrams are numbered from 1 in
    /// the order they are produced.
    pub fn layout(&self, definitions: &Definitions) -> Vec<DiDiagram> {
        let mut diagrams = Vec::new();

        let pooled: HashSet<&str> = definitions
            .collaborations
            .iter()
            .flat_map(|collaboration| &collaboration.participants)
            .filter_map(|participant| participant.process_ref.as_deref())
            .collect();

        // A process shown by several participants is drawn in the first pool only
        let mut drawn: HashSet<&str> = HashSet::new();
        for collaboration in &definitions.collaborations {
            let mut nested = Vec::new();
            diagrams.push(self.layout_collaboration(
                collaboration,
                definitions,
                &mut drawn,
                &mut nested,
            ));
            diagrams.append(&mut nested);
        }

        for process in &definitions.processes {
            if pooled.contains(process.id.as_str()) {
                continue;
            }
            let mut nested = Vec::new();
            diagrams.push(self.layout_plane(&process.id, process, &mut nested));
            diagrams.append(&mut nested);
        }

        for (position, diagram) in diagrams.iter_mut().enumerate() {
            diagram.id = format!("BPMNDiagram_{}", position + 1);
            diagram.plane_id = format!("BPMNPlane_{}", position + 1);
        }

        info!(
            "Laid out {} diagram(s) with {} shape(s) and {} edge(s)",
            diagrams.len(),
            diagrams.iter().map(|d| d.shapes.len()).sum::<usize>(),
            diagrams.iter().map(|d| d.edges.len()).sum::<usize>()
        );

        diagrams
    }

    /// A process or sub-process on its own plane, without pool or lanes.
    fn layout_plane(
        &self,
        plane_element: &str,
        container: &FlowContainer,
        nested: &mut Vec<DiDiagram>,
    ) -> DiDiagram {
        let mut placed = self.place_container(container, false, nested);
        placed.translate(self.config.origin_x, self.config.origin_y);

        let mut diagram = DiDiagram::new(0, plane_element);
        diagram.shapes = placed.shapes;
        diagram.edges = placed.edges;
        diagram
    }

    fn layout_collaboration<'a>(
        &self,
        collaboration: &Collaboration,
        definitions: &'a Definitions,
        drawn: &mut HashSet<&'a str>,
        nested: &mut Vec<DiDiagram>,
    ) -> DiDiagram {
        let config = &self.config;
        let mut diagram = DiDiagram::new(0, &collaboration.id);

        let placed: Vec<Option<PlacedContainer>> = collaboration
            .participants
            .iter()
            .map(|participant| {
                let process = participant
                    .process_ref
                    .as_deref()
                    .and_then(|id| definitions.process(id))?;
                if !drawn.insert(process.id.as_str()) {
                    return None;
                }
                Some(self.place_container(process, true, nested))
            })
            .collect();

        let pool_width = placed
            .iter()
            .map(|content| {
                let content_width = content.as_ref().map_or(0, |c| c.width);
                config.pool_label_width + content_width + 2 * config.pool_padding
            })
            .max()
            .unwrap_or(0)
            .max(config.min_pool_width);

        let mut pool_bounds: HashMap<&str, Bounds> = HashMap::new();
        let mut y = config.origin_y;
        for (participant, content) in collaboration.participants.iter().zip(placed) {
            let content_height = content.as_ref().map_or(0, |c| c.height);
            let pool_height = (content_height + 2 * config.pool_padding).max(config.min_pool_height);
            let pool = Bounds::new(config.origin_x, y, pool_width, pool_height);

            let mut shape = DiShape::new(&participant.id, pool);
            shape.is_horizontal = Some(true);
            diagram.shapes.push(shape);
            pool_bounds.insert(participant.id.as_str(), pool);

            if let Some(mut content) = content {
                diagram.shapes.extend(self.lane_shapes(&content.grid, pool));
                content.translate(
                    pool.x + config.pool_label_width + config.pool_padding,
                    pool.y + config.pool_padding,
                );
                diagram.shapes.append(&mut content.shapes);
                diagram.edges.append(&mut content.edges);
            }

            y += pool_height + config.pool_gap;
        }

        for flow in &collaboration.message_flows {
            let source = diagram.shape(&flow.source_ref).map(|shape| shape.bounds);
            let target = diagram.shape(&flow.target_ref).map(|shape| shape.bounds);
            let (Some(source), Some(target)) = (source, target) else {
                debug!("Message flow {} has an endpoint without a shape", flow.id);
                continue;
            };
            let waypoints = route_message_flow(
                &source,
                pool_bounds.contains_key(flow.source_ref.as_str()),
                &target,
                pool_bounds.contains_key(flow.target_ref.as_str()),
            );
            let mut edge = DiEdge::new(&flow.id, waypoints);
            edge.label = flow.name.as_deref().map(|name| edge_label(&edge.waypoints, name));
            diagram.edges.push(edge);
        }

        diagram
    }

    /// Lane shapes fill the pool right of its name band; the first and last
    /// band reach the pool's top and bottom border.
    fn lane_shapes(&self, grid: &Grid, pool: Bounds) -> Vec<DiShape> {
        let config = &self.config;
        let band_top = |row: usize| pool.y + config.pool_padding + row as i32 * config.cell_height;
        let last = grid.bands.len().saturating_sub(1);

        grid.bands
            .iter()
            .enumerate()
            .filter_map(|(position, band)| {
                let lane_id = band.lane_id.as_deref()?;
                let top = if position == 0 {
                    pool.y
                } else {
                    band_top(band.first_row)
                };
                let bottom = if position == last {
                    pool.bottom()
                } else {
                    band_top(band.first_row + band.rows)
                };
                let bounds = Bounds::new(
                    pool.x + config.pool_label_width,
                    top,
                    pool.width - config.pool_label_width,
                    bottom - top,
                );
                let mut shape = DiShape::new(lane_id, bounds);
                shape.is_horizontal = Some(true);
                Some(shape)
            })
            .collect()
    }

    /// Place a container's nodes and flows relative to `(0, 0)`.
    fn place_container(
        &self,
        container: &FlowContainer,
        use_lanes: bool,
        nested: &mut Vec<DiDiagram>,
    ) -> PlacedContainer {
        let config = &self.config;
        let grid = compute_grid(container, use_lanes);
        let mut placed = PlacedContainer {
            width: grid.columns as i32 * config.cell_width,
            height: grid.rows as i32 * config.cell_height,
            ..Default::default()
        };
        let mut endpoints: HashMap<&str, Endpoint> = HashMap::new();

        for node in &container.flow_nodes {
            let Some(cell) = grid.cell(&node.id) else {
                continue;
            };
            let (width, height) = node.kind.size();
            let bounds = Bounds::centered(
                cell.column as i32 * config.cell_width + config.cell_width / 2,
                cell.row as i32 * config.cell_height + config.cell_height / 2,
                width,
                height,
            );
            placed.shapes.push(node_shape(node.id.as_str(), node.kind, node.name.as_deref(), bounds));
            endpoints.insert(
                node.id.as_str(),
                Endpoint {
                    bounds,
                    kind: node.kind,
                    attached: false,
                },
            );

            if let Some(children) = node.children.as_deref() {
                if !children.is_empty() {
                    // Reserve the slot so the plane precedes its own sub-processes
                    let slot = nested.len();
                    nested.push(DiDiagram::new(0, &node.id));
                    let diagram = self.layout_plane(&node.id, children, nested);
                    nested[slot] = diagram;
                }
            }
        }

        // Boundary events spread along the bottom edge of their host
        let mut attached: Vec<(&str, Vec<&FlowNode>)> = Vec::new();
        for node in container.flow_nodes.iter().filter(|node| is_attached(node)) {
            let host = node.attached_to.as_deref().unwrap_or_default();
            match attached.iter_mut().find(|(id, _)| *id == host) {
                Some((_, events)) => events.push(node),
                None => attached.push((host, vec![node])),
            }
        }
        for (host, events) in attached {
            let Some(host_bounds) = endpoints.get(host).map(|endpoint| endpoint.bounds) else {
                continue;
            };
            let count = events.len() as i32;
            for (k, event) in events.into_iter().enumerate() {
                let (width, height) = event.kind.size();
                let bounds = Bounds::centered(
                    host_bounds.x + host_bounds.width * (k as i32 + 1) / (count + 1),
                    host_bounds.bottom(),
                    width,
                    height,
                );
                placed
                    .shapes
                    .push(node_shape(&event.id, event.kind, event.name.as_deref(), bounds));
                endpoints.insert(
                    event.id.as_str(),
                    Endpoint {
                        bounds,
                        kind: event.kind,
                        attached: true,
                    },
                );
            }
        }

        for flow in &container.sequence_flows {
            let (Some(source), Some(target)) = (
                endpoints.get(flow.source_ref.as_str()),
                endpoints.get(flow.target_ref.as_str()),
            ) else {
                continue;
            };
            let waypoints = route_sequence_flow(source, target, config.loop_offset);
            let mut edge = DiEdge::new(&flow.id, waypoints);
            edge.label = flow.name.as_deref().map(|name| edge_label(&edge.waypoints, name));
            placed.edges.push(edge);
        }

        placed.grid = grid;
        placed
    }
}

fn node_shape(id: &str, kind: FlowNodeKind, name: Option<&str>, bounds: Bounds) -> DiShape {
    let mut shape = DiShape::new(id, bounds);
    if kind == FlowNodeKind::SubProcess {
        shape.is_expanded = Some(false);
    }
    if kind.has_external_label() {
        if let Some(name) = name {
            let (width, height) = label_size(name);
            shape.label = Some(Bounds::new(
                bounds.center_x() - width / 2,
                bounds.bottom() + LABEL_OFFSET,
                width,
                height,
            ));
        }
    }
    shape
}

/// Label above the middle segment of an edge.
fn edge_label(waypoints: &[Waypoint], name: &str) -> Bounds {
    let (width, height) = label_size(name);
    let middle = waypoints.len() / 2;
    let (a, b) = match middle {
        0 => (waypoints[0], waypoints[0]),
        _ => (waypoints[middle - 1], waypoints[middle]),
    };
    let x = (a.x + b.x) / 2;
    let y = (a.y + b.y) / 2;
    Bounds::new(x - width / 2, y - height - LABEL_OFFSET, width, height)
}

/// Estimated label box for `text`, wrapped at the maximum label width.
fn label_size(text: &str) -> (i32, i32) {
    let chars = text.chars().count().max(1) as i32;
    let natural = chars * LABEL_CHAR_WIDTH;
    let width = natural.min(LABEL_MAX_WIDTH);
    let lines = (natural + LABEL_MAX_WIDTH - 1) / LABEL_MAX_WIDTH;
    (width, lines * LABEL_LINE_HEIGHT)
}

fn shift(bounds: Bounds, dx: i32, dy: i32) -> Bounds {
    Bounds::new(bounds.x + dx, bounds.y + dy, bounds.width, bounds.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bpmn::{Lane, MessageFlow, Participant, SequenceFlow};

    fn node(id: &str, kind: FlowNodeKind) -> FlowNode {
        FlowNode {
            id: id.to_string(),
            name: None,
            kind,
            attached_to: None,
            children: None,
        }
    }

    fn flow(id: &str, source: &str, target: &str) -> SequenceFlow {
        SequenceFlow {
            id: id.to_string(),
            name: None,
            source_ref: source.to_string(),
            target_ref: target.to_string(),
        }
    }

    fn simple_process(id: &str) -> FlowContainer {
        let mut process = FlowContainer::new(id);
        process.flow_nodes = vec![
            node(&format!("{id}_S"), FlowNodeKind::StartEvent),
            node(&format!("{id}_T"), FlowNodeKind::Task),
        ];
        process.sequence_flows = vec![flow(
            &format!("{id}_F"),
            &format!("{id}_S"),
            &format!("{id}_T"),
        )];
        process
    }

    #[test]
    fn test_single_process_layout() {
        let definitions = Definitions {
            processes: vec![simple_process("P")],
            ..Default::default()
        };
        let diagrams = LayoutEngine::default().layout(&definitions);

        assert_eq!(diagrams.len(), 1);
        let diagram = &diagrams[0];
        assert_eq!(diagram.id, "BPMNDiagram_1");
        assert_eq!(diagram.plane_element, "P");
        // Start event centred in the first 150x140 cell at (160, 80)
        assert_eq!(diagram.shape("P_S").unwrap().bounds, Bounds::new(217, 132, 36, 36));
        assert_eq!(diagram.shape("P_T").unwrap().bounds, Bounds::new(335, 110, 100, 80));
        assert_eq!(
            diagram.edge("P_F").unwrap().waypoints,
            vec![Waypoint::new(253, 150), Waypoint::new(335, 150)]
        );
    }

    #[test]
    fn test_collaboration_pools_and_message_flow() {
        let definitions = Definitions {
            processes: vec![simple_process("A"), simple_process("B")],
            collaborations: vec![Collaboration {
                id: "C".to_string(),
                participants: vec![
                    Participant {
                        id: "Pool_A".to_string(),
                        name: Some("A".to_string()),
                        process_ref: Some("A".to_string()),
                    },
                    Participant {
                        id: "Pool_B".to_string(),
                        name: None,
                        process_ref: Some("B".to_string()),
                    },
                    Participant {
                        id: "Black_Box".to_string(),
                        name: None,
                        process_ref: None,
                    },
                ],
                message_flows: vec![MessageFlow {
                    id: "M".to_string(),
                    name: None,
                    source_ref: "A_T".to_string(),
                    target_ref: "B_T".to_string(),
                }],
            }],
            ..Default::default()
        };
        let diagrams = LayoutEngine::default().layout(&definitions);

        assert_eq!(diagrams.len(), 1);
        let diagram = &diagrams[0];
        assert_eq!(diagram.plane_element, "C");

        let pool_a = diagram.shape("Pool_A").unwrap();
        let pool_b = diagram.shape("Pool_B").unwrap();
        let black_box = diagram.shape("Black_Box").unwrap();
        assert_eq!(pool_a.is_horizontal, Some(true));
        assert_eq!(pool_a.bounds, Bounds::new(160, 80, 600, 250));
        assert_eq!(pool_b.bounds, Bounds::new(160, 370, 600, 250));
        assert_eq!(black_box.bounds.y, 660);

        // Contents sit inside their pools
        let task_a = diagram.shape("A_T").unwrap().bounds;
        assert!(task_a.x > pool_a.bounds.x && task_a.bottom() < pool_a.bounds.bottom());

        let message = diagram.edge("M").unwrap();
        assert_eq!(message.waypoints.first().unwrap().y, task_a.bottom());
        assert_eq!(
            message.waypoints.last().unwrap().y,
            diagram.shape("B_T").unwrap().bounds.y
        );
        assert_eq!(diagram.shapes.len(), 7);
        assert_eq!(diagram.edges.len(), 3);
    }

    #[test]
    fn test_process_shared_by_collaborations_is_drawn_once() {
        let collaboration = |id: &str, pool: &str| Collaboration {
            id: id.to_string(),
            participants: vec![Participant {
                id: pool.to_string(),
                name: None,
                process_ref: Some("P".to_string()),
            }],
            message_flows: vec![],
        };
        let definitions = Definitions {
            processes: vec![simple_process("P")],
            collaborations: vec![collaboration("C1", "Pool_1"), collaboration("C2", "Pool_2")],
            ..Default::default()
        };
        let diagrams = LayoutEngine::default().layout(&definitions);

        assert_eq!(diagrams.len(), 2);
        let task_shapes = diagrams
            .iter()
            .flat_map(|diagram| &diagram.shapes)
            .filter(|shape| shape.id == "P_T_di")
            .count();
        assert_eq!(task_shapes, 1);
        assert!(diagrams[0].shape("P_T").is_some());
        // The second pool is drawn empty
        assert_eq!(diagrams[1].shapes.len(), 1);
        assert!(diagrams[1].edges.is_empty());
    }

    #[test]
    fn test_lanes_without_nodes_get_shapes() {
        let mut process = FlowContainer::new("P");
        process.lanes = vec![
            Lane {
                id: "L1".to_string(),
                name: None,
                flow_node_refs: vec![],
            },
            Lane {
                id: "L2".to_string(),
                name: None,
                flow_node_refs: vec![],
            },
        ];
        let definitions = Definitions {
            processes: vec![process],
            collaborations: vec![Collaboration {
                id: "C".to_string(),
                participants: vec![Participant {
                    id: "Pool".to_string(),
                    name: None,
                    process_ref: Some("P".to_string()),
                }],
                message_flows: vec![],
            }],
            ..Default::default()
        };
        let diagram = &LayoutEngine::default().layout(&definitions)[0];

        assert_eq!(diagram.shapes.len(), 3);
        let pool = diagram.shape("Pool").unwrap().bounds;
        let lane1 = diagram.shape("L1").unwrap().bounds;
        let lane2 = diagram.shape("L2").unwrap().bounds;
        assert_eq!(lane1.y, pool.y);
        assert_eq!(lane1.bottom(), lane2.y);
        assert_eq!(lane2.bottom(), pool.bottom());
    }

    #[test]
    fn test_lanes_fill_their_pool() {
        let mut process = simple_process("P");
        process.lanes = vec![
            Lane {
                id: "L1".to_string(),
                name: None,
                flow_node_refs: vec!["P_S".to_string()],
            },
            Lane {
                id: "L2".to_string(),
                name: None,
                flow_node_refs: vec!["P_T".to_string()],
            },
        ];
        let definitions = Definitions {
            processes: vec![process],
            collaborations: vec![Collaboration {
                id: "C".to_string(),
                participants: vec![Participant {
                    id: "Pool".to_string(),
                    name: None,
                    process_ref: Some("P".to_string()),
                }],
                message_flows: vec![],
            }],
            ..Default::default()
        };
        let diagrams = LayoutEngine::default().layout(&definitions);
        let diagram = &diagrams[0];

        let pool = diagram.shape("Pool").unwrap().bounds;
        let lane1 = diagram.shape("L1").unwrap().bounds;
        let lane2 = diagram.shape("L2").unwrap().bounds;
        assert_eq!(lane1.y, pool.y);
        assert_eq!(lane1.bottom(), lane2.y);
        assert_eq!(lane2.bottom(), pool.bottom());
        assert_eq!(lane1.x, pool.x + 30);
        assert_eq!(lane1.right(), pool.right());

        let task = diagram.shape("P_T").unwrap().bounds;
        assert!(task.y >= lane2.y && task.bottom() <= lane2.bottom());
    }

    #[test]
    fn test_subprocess_gets_own_plane() {
        let mut sub = node("Sub", FlowNodeKind::SubProcess);
        sub.children = Some(Box::new(simple_process("Inner")));
        let mut process = FlowContainer::new("P");
        process.flow_nodes = vec![sub, node("After", FlowNodeKind::Task)];
        process.sequence_flows = vec![flow("F", "Sub", "After")];

        let definitions = Definitions {
            processes: vec![process],
            ..Default::default()
        };
        let diagrams = LayoutEngine::default().layout(&definitions);

        assert_eq!(diagrams.len(), 2);
        assert_eq!(diagrams[0].plane_element, "P");
        assert_eq!(diagrams[0].shape("Sub").unwrap().is_expanded, Some(false));
        assert_eq!(diagrams[1].id, "BPMNDiagram_2");
        assert_eq!(diagrams[1].plane_element, "Sub");
        assert!(diagrams[1].shape("Inner_T").is_some());
        assert!(diagrams[0].shape("Inner_T").is_none());
    }

    #[test]
    fn test_boundary_event_on_host_border() {
        let mut boundary = node("B", FlowNodeKind::BoundaryEvent);
        boundary.attached_to = Some("T".to_string());
        let mut process = FlowContainer::new("P");
        process.flow_nodes = vec![node("T", FlowNodeKind::Task), boundary];

        let definitions = Definitions {
            processes: vec![process],
            ..Default::default()
        };
        let diagram = &LayoutEngine::default().layout(&definitions)[0];
        let host = diagram.shape("T").unwrap().bounds;
        let event = diagram.shape("B").unwrap().bounds;
        assert_eq!(event.center_y(), host.bottom());
        assert_eq!(event.center_x(), host.center_x());
    }

    #[test]
    fn test_named_gateway_has_label_below() {
        let mut gateway = node("G", FlowNodeKind::Gateway);
        gateway.name = Some("Approved?".to_string());
        let mut process = FlowContainer::new("P");
        process.flow_nodes = vec![gateway];

        let definitions = Definitions {
            processes: vec![process],
            ..Default::default()
        };
        let diagram = &LayoutEngine::default().layout(&definitions)[0];
        let shape = diagram.shape("G").unwrap();
        let label = shape.label.unwrap();
        assert_eq!(label.y, shape.bounds.bottom() + LABEL_OFFSET);
        assert_eq!(label.width, 63);
        assert_eq!(label.height, 14);
    }

    #[test]
    fn test_label_size_wraps() {
        assert_eq!(label_size("Go"), (14, 14));
        assert_eq!(label_size("A rather long label for a gateway"), (90, 42));
    }
}
