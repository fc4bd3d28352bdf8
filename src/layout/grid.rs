//! Grid placement of flow nodes
//!
//! Columns come from the longest path over the sequence-flow graph with back
//! edges removed; rows are handed out per column, keeping a node on the row
//! of its first placed predecessor where possible.

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::warn;

use crate::models::bpmn::{FlowContainer, FlowNode, FlowNodeKind};

/// Grid position of a flow node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub column: usize,
    pub row: usize,
}

/// A horizontal band of rows, one per lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneBand {
    /// `None` for nodes outside every lane
    pub lane_id: Option<String>,
    pub first_row: usize,
    pub rows: usize,
}

/// Placement of a container's flow nodes on the grid.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    /// Placed nodes in document order
    pub cells: Vec<(String, Cell)>,
    pub columns: usize,
    pub rows: usize,
    pub bands: Vec<LaneBand>,
}

impl Grid {
    pub fn cell(&self, id: &str) -> Option<Cell> {
        self.cells
            .iter()
            .find(|(node_id, _)| node_id == id)
            .map(|(_, cell)| *cell)
    }
}

/// Boundary events attached to a host are placed with their host, not on
/// the grid.
pub fn is_attached(node: &FlowNode) -> bool {
    node.kind == FlowNodeKind::BoundaryEvent && node.attached_to.is_some()
}

/// Place the nodes of `container` on the grid.
///
/// With `use_lanes` set and lanes present, rows are allocated separately
/// inside each lane's band.
pub fn compute_grid(container: &FlowContainer, use_lanes: bool) -> Grid {
    let nodes: Vec<&FlowNode> = container
        .flow_nodes
        .iter()
        .filter(|node| !is_attached(node))
        .collect();
    if nodes.is_empty() {
        return empty_lanes_grid(container, use_lanes);
    }

    let graph = build_graph(container, &nodes);
    let back_edges = find_back_edges(&graph, &nodes);
    let dag = graph.filter_map(
        |_, weight| Some(*weight),
        |edge, weight| (!back_edges.contains(&edge)).then_some(*weight),
    );

    let columns = assign_columns(&dag);
    let band_of = band_assignment(container, &nodes, use_lanes);
    let band_count = if use_lanes {
        container.lanes.len() + 1
    } else {
        1
    };

    // Visit by column, then document order
    let mut order: Vec<NodeIndex> = dag.node_indices().collect();
    order.sort_by_key(|index| (columns[index.index()], index.index()));

    let mut local_rows: Vec<Option<usize>> = vec![None; nodes.len()];
    let mut occupied: Vec<HashSet<(usize, usize)>> = vec![HashSet::new(); band_count];
    for index in order {
        let position = index.index();
        let band = band_of[position];
        let column = columns[position];

        let mut incoming: Vec<_> = dag
            .edges_directed(index, petgraph::Direction::Incoming)
            .map(|edge| (edge.id(), edge.source()))
            .collect();
        incoming.sort_by_key(|(edge, _)| *edge);
        let preferred = incoming
            .iter()
            .map(|(_, source)| source.index())
            .filter(|source| band_of[*source] == band)
            .find_map(|source| local_rows[source])
            .unwrap_or(0);

        let mut row = preferred;
        while occupied[band].contains(&(column, row)) {
            row += 1;
        }
        occupied[band].insert((column, row));
        local_rows[position] = Some(row);
    }

    // Stack the bands
    let lane_ids = lane_ids(container, use_lanes);
    let mut bands = Vec::new();
    let mut band_start = vec![0; band_count];
    let mut first_row = 0;
    for band in 0..band_count {
        let used = (0..nodes.len())
            .filter(|position| band_of[*position] == band)
            .filter_map(|position| local_rows[position])
            .max()
            .map(|row| row + 1);
        let lane_id = lane_ids.get(band).cloned();
        let rows = match (&lane_id, used) {
            (_, Some(rows)) => rows,
            // Empty lanes still get one row
            (Some(_), None) => 1,
            (None, None) => continue,
        };
        band_start[band] = first_row;
        bands.push(LaneBand {
            lane_id,
            first_row,
            rows,
        });
        first_row += rows;
    }

    let cells = nodes
        .iter()
        .enumerate()
        .map(|(position, node)| {
            let row = band_start[band_of[position]] + local_rows[position].unwrap_or(0);
            (
                node.id.clone(),
                Cell {
                    column: columns[position],
                    row,
                },
            )
        })
        .collect::<Vec<_>>();

    Grid {
        columns: columns.iter().copied().max().unwrap_or(0) + 1,
        rows: first_row,
        bands,
        cells,
    }
}

/// A container without grid nodes still shows its lanes, one row each.
fn empty_lanes_grid(container: &FlowContainer, use_lanes: bool) -> Grid {
    let bands: Vec<LaneBand> = lane_ids(container, use_lanes)
        .into_iter()
        .enumerate()
        .map(|(position, lane_id)| LaneBand {
            lane_id: Some(lane_id),
            first_row: position,
            rows: 1,
        })
        .collect();
    Grid {
        cells: Vec::new(),
        columns: 0,
        rows: bands.len(),
        bands,
    }
}

/// Graph over grid nodes; flows leaving an attached boundary event count
/// as leaving its host.
fn build_graph(
    container: &FlowContainer,
    nodes: &[&FlowNode],
) -> DiGraph<usize, ()> {
    let mut graph = DiGraph::new();
    let mut index_of = HashMap::new();
    for (position, node) in nodes.iter().enumerate() {
        index_of.insert(node.id.clone(), graph.add_node(position));
    }

    let host_of: HashMap<&str, &str> = container
        .flow_nodes
        .iter()
        .filter(|node| is_attached(node))
        .filter_map(|node| Some((node.id.as_str(), node.attached_to.as_deref()?)))
        .collect();

    for flow in &container.sequence_flows {
        let source_id = host_of
            .get(flow.source_ref.as_str())
            .copied()
            .unwrap_or(flow.source_ref.as_str());
        let (Some(&source), Some(&target)) =
            (index_of.get(source_id), index_of.get(flow.target_ref.as_str()))
        else {
            continue;
        };
        if source != target {
            graph.add_edge(source, target, ());
        }
    }

    graph
}

/// Depth-first search from the roots, in document order; an edge into a
/// node still on the stack closes a cycle.
fn find_back_edges(graph: &DiGraph<usize, ()>, nodes: &[&FlowNode]) -> HashSet<EdgeIndex> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }

    let mut roots: Vec<NodeIndex> = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.kind == FlowNodeKind::StartEvent)
        .map(|(position, _)| NodeIndex::new(position))
        .collect();
    roots.extend(graph.node_indices().filter(|index| {
        graph
            .edges_directed(*index, petgraph::Direction::Incoming)
            .next()
            .is_none()
    }));
    // Whatever is left sits on unreached cycles
    roots.extend(graph.node_indices());

    let mut marks = vec![Mark::New; graph.node_count()];
    let mut back_edges = HashSet::new();

    for root in roots {
        if marks[root.index()] != Mark::New {
            continue;
        }
        marks[root.index()] = Mark::Active;
        let mut stack = vec![(root, outgoing(graph, root), 0usize)];

        while let Some((node, edges, next)) = stack.last_mut() {
            let Some(&(edge, target)) = edges.get(*next) else {
                marks[node.index()] = Mark::Done;
                stack.pop();
                continue;
            };
            *next += 1;
            match marks[target.index()] {
                Mark::Active => {
                    back_edges.insert(edge);
                }
                Mark::New => {
                    marks[target.index()] = Mark::Active;
                    stack.push((target, outgoing(graph, target), 0));
                }
                Mark::Done => {}
            }
        }
    }

    back_edges
}

/// Outgoing edges in the order the flows were declared.
fn outgoing(graph: &DiGraph<usize, ()>, node: NodeIndex) -> Vec<(EdgeIndex, NodeIndex)> {
    let mut edges: Vec<_> = graph
        .edges(node)
        .map(|edge| (edge.id(), edge.target()))
        .collect();
    edges.sort_by_key(|(edge, _)| *edge);
    edges
}

/// Longest path from any root.
fn assign_columns(dag: &DiGraph<usize, ()>) -> Vec<usize> {
    let mut columns = vec![0; dag.node_count()];
    let order = match toposort(dag, None) {
        Ok(order) => order,
        Err(cycle) => {
            warn!(
                "Cycle through node {} left after removing back edges; using document order",
                cycle.node_id().index()
            );
            dag.node_indices().collect()
        }
    };
    for node in order {
        for successor in dag.neighbors(node) {
            let candidate = columns[node.index()] + 1;
            if columns[successor.index()] < candidate {
                columns[successor.index()] = candidate;
            }
        }
    }
    columns
}

fn lane_ids(container: &FlowContainer, use_lanes: bool) -> Vec<String> {
    if use_lanes {
        container.lanes.iter().map(|lane| lane.id.clone()).collect()
    } else {
        Vec::new()
    }
}

/// Band index per grid node: its first lane, or the trailing band.
fn band_assignment(container: &FlowContainer, nodes: &[&FlowNode], use_lanes: bool) -> Vec<usize> {
    if !use_lanes || container.lanes.is_empty() {
        return vec![0; nodes.len()];
    }
    let unlaned = container.lanes.len();
    nodes
        .iter()
        .map(|node| {
            container
                .lanes
                .iter()
                .position(|lane| lane.flow_node_refs.contains(&node.id))
                .unwrap_or(unlaned)
        })
        .collect()
}
