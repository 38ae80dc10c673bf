// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for querying the adjacency structure of a [`ConnectivityGraph`].

use super::{ConnectivityGraph, TopoNode};

/// Adjacency retrieval.
///
/// All methods return arena indices in ascending order, independent of edge
/// insertion order, so that every consumer of the graph is deterministic.
impl ConnectivityGraph {
    /// Returns the equipment terminating on the given connectivity node.
    pub fn equipment_on_cn(&self, cn: usize) -> Vec<usize> {
        let mut equipment = self
            .graph
            .neighbors(self.cn_nodes[cn])
            .map(|index| match self.graph[index] {
                TopoNode::Equipment(e) => e,
                TopoNode::Cn(_) => unreachable!("bipartite edge between two CNs"),
            })
            .collect::<Vec<_>>();
        equipment.sort_unstable();
        equipment.dedup();
        equipment
    }

    /// Returns the connectivity nodes the given equipment terminates on.
    pub fn cns_of_equipment(&self, equipment: usize) -> Vec<usize> {
        let mut cns = self
            .graph
            .neighbors(self.equipment_nodes[equipment])
            .map(|index| match self.graph[index] {
                TopoNode::Cn(c) => c,
                TopoNode::Equipment(_) => unreachable!("bipartite edge between two equipment"),
            })
            .collect::<Vec<_>>();
        cns.sort_unstable();
        cns.dedup();
        cns
    }

    /// Returns the electrical degree of a connectivity node: the number of
    /// terminals referencing it. Degree 1 is an open end, degree 0 an orphan.
    pub fn cn_degree(&self, cn: usize) -> usize {
        self.graph.edges(self.cn_nodes[cn]).count()
    }

    /// Returns true if the two pieces of equipment share a connectivity node.
    pub fn is_electrically_adjacent(&self, a: usize, b: usize) -> bool {
        let cns = self.cns_of_equipment(a);
        self.cns_of_equipment(b).iter().any(|cn| cns.binary_search(cn).is_ok())
    }
}
