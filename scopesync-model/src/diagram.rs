//! Diagram part kinds.
//!
//! Diagrams are built from four kinds of objects. A graph lists its nodes
//! and edges, an edge connects a source and a target node, and nodes and
//! edges list their labels. Containment points downwards only: the graph of
//! a node or the owner of a label is found through the referrer index, so
//! a freshly built diagram never forms a reference cycle. Every part has a
//! transient `tag` property holding the renderer's handle for it.

use crate::{TypeDescriptor, TypeRegistry};

/// Property names used by the diagram parts.
pub mod props {
    pub const NODES: &str = "nodes";
    pub const EDGES: &str = "edges";
    pub const SOURCE: &str = "source";
    pub const TARGET: &str = "target";
    pub const LABELS: &str = "labels";
    pub const TEXT: &str = "text";
    pub const TAG: &str = "tag";
}

/// The closed set of diagram object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    Graph,
    Node,
    Edge,
    Label,
}

impl PartKind {
    pub const ALL: [PartKind; 4] = [
        PartKind::Graph,
        PartKind::Node,
        PartKind::Edge,
        PartKind::Label,
    ];

    /// The type name objects of this kind are registered under.
    pub fn type_name(self) -> &'static str {
        match self {
            PartKind::Graph => "Graph",
            PartKind::Node => "Node",
            PartKind::Edge => "Edge",
            PartKind::Label => "Label",
        }
    }

    pub fn from_type_name(type_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == type_name)
    }

    /// The preset descriptor for this kind.
    pub fn descriptor(self) -> TypeDescriptor {
        let base = TypeDescriptor::new(self.type_name()).with_transient(props::TAG);
        match self {
            PartKind::Graph => base.with_owned(props::NODES).with_owned(props::EDGES),
            // Edges hang off their end points.
            PartKind::Node => base
                .with_owned(props::LABELS)
                .with_dependent(props::SOURCE)
                .with_dependent(props::TARGET),
            PartKind::Edge => base.with_owned(props::LABELS),
            PartKind::Label => base,
        }
    }
}

/// A registry containing exactly the four diagram part kinds.
pub fn diagram_registry() -> TypeRegistry {
    PartKind::ALL.into_iter().map(PartKind::descriptor).collect()
}
