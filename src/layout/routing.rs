//! Orthogonal edge routing

use crate::models::bpmn::FlowNodeKind;
use crate::models::di::{Bounds, Waypoint};

/// One end of a sequence flow.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub bounds: Bounds,
    pub kind: FlowNodeKind,
    /// Attached boundary event
    pub attached: bool,
}

/// Route a sequence flow between two placed nodes.
pub fn route_sequence_flow(source: &Endpoint, target: &Endpoint, loop_offset: i32) -> Vec<Waypoint> {
    let from = source.bounds;
    let to = target.bounds;
    let forward = to.x > from.right();

    let points = if !forward {
        let below = from.bottom().max(to.bottom()) + loop_offset;
        vec![
            from.bottom_mid(),
            Waypoint::new(from.center_x(), below),
            Waypoint::new(to.center_x(), below),
            to.bottom_mid(),
        ]
    } else if source.attached {
        vec![
            from.bottom_mid(),
            Waypoint::new(from.center_x(), to.center_y()),
            to.left_mid(),
        ]
    } else if from.center_y() == to.center_y() {
        vec![from.right_mid(), to.left_mid()]
    } else if source.kind == FlowNodeKind::Gateway {
        let start = if to.center_y() > from.center_y() {
            from.bottom_mid()
        } else {
            from.top_mid()
        };
        vec![
            start,
            Waypoint::new(from.center_x(), to.center_y()),
            to.left_mid(),
        ]
    } else {
        let mid_x = (from.right() + to.x) / 2;
        vec![
            from.right_mid(),
            Waypoint::new(mid_x, from.center_y()),
            Waypoint::new(mid_x, to.center_y()),
            to.left_mid(),
        ]
    };

    dedup(points)
}

/// Route a message flow vertically between pools or their contents.
///
/// A pool end takes the x of the other end when that falls inside the pool.
pub fn route_message_flow(
    source: &Bounds,
    source_is_pool: bool,
    target: &Bounds,
    target_is_pool: bool,
) -> Vec<Waypoint> {
    let mut source_x = source.center_x();
    let mut target_x = target.center_x();
    if source_is_pool && !target_is_pool {
        source_x = target_x.clamp(source.x, source.right());
    } else if target_is_pool && !source_is_pool {
        target_x = source_x.clamp(target.x, target.right());
    }

    let (start_y, end_y) = if source.center_y() <= target.center_y() {
        (source.bottom(), target.y)
    } else {
        (source.y, target.bottom())
    };

    let points = if source_x == target_x {
        vec![
            Waypoint::new(source_x, start_y),
            Waypoint::new(target_x, end_y),
        ]
    } else {
        let mid_y = (start_y + end_y) / 2;
        vec![
            Waypoint::new(source_x, start_y),
            Waypoint::new(source_x, mid_y),
            Waypoint::new(target_x, mid_y),
            Waypoint::new(target_x, end_y),
        ]
    };

    dedup(points)
}

fn dedup(mut points: Vec<Waypoint>) -> Vec<Waypoint> {
    points.dedup();
    points
}
