//! Content-derivation graph.
//!
//! Derived on demand from the frames' `parentId` links; never stored. A frame
//! gains its parent only at creation, so the graph is a forest.

use crate::id::FrameId;
use crate::store::FrameStore;
use petgraph::Direction;
use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;

#[derive(Debug, Clone, Default)]
pub struct ConnectionGraph {
    graph: DiGraphMap<FrameId, ()>,
    /// Edge order follows store order of the child frames.
    edges: Vec<(FrameId, FrameId)>,
}

impl ConnectionGraph {
    pub fn derive(store: &FrameStore) -> Self {
        let mut graph = DiGraphMap::new();
        let mut edges = Vec::new();
        for frame in store.frames() {
            graph.add_node(frame.id);
        }
        for frame in store.frames() {
            if let Some(parent) = frame.connections.parent_id {
                if graph.contains_node(parent) {
                    graph.add_edge(parent, frame.id, ());
                    edges.push((parent, frame.id));
                }
            }
        }
        Self { graph, edges }
    }

    /// `(parent, child)` pairs.
    pub fn edges(&self) -> &[(FrameId, FrameId)] {
        &self.edges
    }

    pub fn parent(&self, id: FrameId) -> Option<FrameId> {
        self.graph
            .neighbors_directed(id, Direction::Incoming)
            .next()
    }

    pub fn children(&self, id: FrameId) -> Vec<FrameId> {
        self.edges
            .iter()
            .filter(|(p, _)| *p == id)
            .map(|(_, c)| *c)
            .collect()
    }

    /// Parent chain from nearest to root.
    pub fn ancestors(&self, id: FrameId) -> Vec<FrameId> {
        let mut out = Vec::new();
        let mut cursor = self.parent(id);
        while let Some(p) = cursor {
            if out.contains(&p) || p == id {
                break;
            }
            out.push(p);
            cursor = self.parent(p);
        }
        out
    }

    pub fn roots(&self) -> Vec<FrameId> {
        self.graph
            .nodes()
            .filter(|n| self.parent(*n).is_none())
            .collect()
    }

    /// No cycles and at most one parent per frame.
    pub fn is_forest(&self) -> bool {
        !is_cyclic_directed(&self.graph)
            && self
                .graph
                .nodes()
                .all(|n| self.graph.neighbors_directed(n, Direction::Incoming).count() <= 1)
    }

    /// Whether every `childIds` entry agrees with the child's `parentId`
    /// and vice versa.
    pub fn is_consistent_with(&self, store: &FrameStore) -> bool {
        store.frames().iter().all(|frame| {
            let listed = &frame.connections.child_ids;
            let derived = self.children(frame.id);
            listed.len() == derived.len() && derived.iter().all(|c| listed.contains(c))
        })
    }
}
