//! Diagram interchange (DI) structures
//!
//! Geometry in whole pixels, as modelers write it.

use serde::{Deserialize, Serialize};

/// Rectangle in diagram coordinates (origin top-left, y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounds of the given size centred on `(cx, cy)`.
    pub fn centered(cx: i32, cy: i32, width: i32, height: i32) -> Self {
        Self::new(cx - width / 2, cy - height / 2, width, height)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }

    pub fn left_mid(&self) -> Waypoint {
        Waypoint::new(self.x, self.center_y())
    }

    pub fn right_mid(&self) -> Waypoint {
        Waypoint::new(self.right(), self.center_y())
    }

    pub fn top_mid(&self) -> Waypoint {
        Waypoint::new(self.center_x(), self.y)
    }

    pub fn bottom_mid(&self) -> Waypoint {
        Waypoint::new(self.center_x(), self.bottom())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: i32,
    pub y: i32,
}

impl Waypoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// `BPMNShape`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiShape {
    pub id: String,
    pub element_ref: String,
    pub bounds: Bounds,
    /// Set for pools and lanes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_horizontal: Option<bool>,
    /// Set for sub-processes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,
    /// External label bounds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Bounds>,
}

impl DiShape {
    pub fn new(element_ref: &str, bounds: Bounds) -> Self {
        Self {
            id: format!("{}_di", element_ref),
            element_ref: element_ref.to_string(),
            bounds,
            is_horizontal: None,
            is_expanded: None,
            label: None,
        }
    }
}

/// `BPMNEdge`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiEdge {
    pub id: String,
    pub element_ref: String,
    pub waypoints: Vec<Waypoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Bounds>,
}

impl DiEdge {
    pub fn new(element_ref: &str, waypoints: Vec<Waypoint>) -> Self {
        Self {
            id: format!("{}_di", element_ref),
            element_ref: element_ref.to_string(),
            waypoints,
            label: None,
        }
    }
}

/// `BPMNDiagram` with its single `BPMNPlane`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiDiagram {
    pub id: String,
    pub plane_id: String,
    /// Collaboration, process or sub-process shown on the plane
    pub plane_element: String,
    pub shapes: Vec<DiShape>,
    pub edges: Vec<DiEdge>,
}

impl DiDiagram {
    /// Diagram number `index` (1-based) for `plane_element`.
    pub fn new(index: usize, plane_element: &str) -> Self {
        Self {
            id: format!("BPMNDiagram_{}", index),
            plane_id: format!("BPMNPlane_{}", index),
            plane_element: plane_element.to_string(),
            shapes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn shape(&self, element_ref: &str) -> Option<&DiShape> {
        self.shapes
            .iter()
            .find(|shape| shape.element_ref == element_ref)
    }

    pub fn edge(&self, element_ref: &str) -> Option<&DiEdge> {
        self.edges.iter().find(|edge| edge.element_ref == element_ref)
    }
}
