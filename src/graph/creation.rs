// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Builds [`ConnectivityGraph`] instances from a topology snapshot.

use petgraph::graph::UnGraph;

use crate::TopologySnapshot;

use super::{ConnectivityGraph, TopoNode};

impl ConnectivityGraph {
    /// Builds the bipartite graph for the given snapshot.
    ///
    /// The snapshot has already been validated against the input contract,
    /// so construction cannot fail: every terminal references an equipment
    /// and a connectivity node that exist in the arenas.
    pub fn new(snapshot: &TopologySnapshot) -> Self {
        let mut graph = UnGraph::new_undirected();

        let equipment_nodes = (0..snapshot.equipment.len())
            .map(|i| graph.add_node(TopoNode::Equipment(i)))
            .collect::<Vec<_>>();
        let cn_nodes = (0..snapshot.connectivity_nodes.len())
            .map(|i| graph.add_node(TopoNode::Cn(i)))
            .collect::<Vec<_>>();

        for (terminal_index, terminal) in snapshot.terminals.iter().enumerate() {
            graph.add_edge(
                equipment_nodes[terminal.equipment],
                cn_nodes[terminal.connectivity_node],
                terminal_index,
            );
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built connectivity graph"
        );

        ConnectivityGraph {
            graph,
            equipment_nodes,
            cn_nodes,
        }
    }
}
