// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! An undirected bipartite graph of the conducting equipment and the
//! connectivity nodes they terminate on.
//!
//! Two pieces of equipment are *electrically adjacent* iff they share a
//! connectivity node. The graph performs no inference itself; it is the sole
//! input of the busbar resolver and supplies node degrees to the validator.

mod creation;
mod retrieval;

use petgraph::graph::{NodeIndex, UnGraph};

/// One endpoint of the bipartite graph: either a piece of equipment or a
/// connectivity node, identified by its snapshot arena index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TopoNode {
    Equipment(usize),
    Cn(usize),
}

/// The bipartite Equipment ↔ ConnectivityNode graph of one snapshot.
///
/// Edges carry the terminal arena index; parallel edges are kept, so the
/// degree of a connectivity node equals the number of terminals referencing
/// it.
pub struct ConnectivityGraph {
    graph: UnGraph<TopoNode, usize>,
    /// `NodeIndex` per equipment arena index.
    equipment_nodes: Vec<NodeIndex>,
    /// `NodeIndex` per connectivity-node arena index.
    cn_nodes: Vec<NodeIndex>,
}
