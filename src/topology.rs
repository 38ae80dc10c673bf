// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The extraction adapter: turns flat query rows into a typed, indexed,
//! immutable snapshot of the substation topology.
//!
//! Entities are stored in one arena per kind and reference each other with
//! dense indices, so the containment tree (substation → voltage level → bay
//! → equipment) stays acyclic-safe and cheap to traverse. URI lookups go
//! through `HashMap` indices.

use std::collections::HashMap;

use crate::equipment_type::EquipmentType;
use crate::input::TopologyRows;
use crate::Error;

/// A substation, the root of the containment tree.
#[derive(Clone, Debug)]
pub struct Substation {
    pub uri: String,
    pub name: String,
    /// Indices into [`TopologySnapshot::voltage_levels`], in document order.
    pub voltage_levels: Vec<usize>,
    pub source_order: usize,
}

/// A voltage level inside a substation.
#[derive(Clone, Debug)]
pub struct VoltageLevel {
    pub uri: String,
    pub name: String,
    /// Nominal voltage as carried by the source, if any.
    pub voltage: Option<String>,
    pub substation: usize,
    /// Indices into [`TopologySnapshot::bays`], in document order.
    pub bays: Vec<usize>,
    pub source_order: usize,
}

/// A bay: one functional column of equipment inside a voltage level.
#[derive(Clone, Debug)]
pub struct Bay {
    pub uri: String,
    pub name: String,
    /// True when the bay exists solely to link two busbars. Either declared
    /// by the source or derived from the RTE bay-name convention.
    pub is_coupling: bool,
    pub voltage_level: usize,
    /// Indices into [`TopologySnapshot::equipment`], in document order.
    pub equipment: Vec<usize>,
    pub source_order: usize,
}

/// A piece of conducting equipment.
#[derive(Clone, Debug)]
pub struct Equipment {
    pub uri: String,
    pub name: String,
    pub equipment_type: EquipmentType,
    /// RTE subtype code for disconnectors (`SA1`, `SL`, `ST`, `SS`).
    pub subtype: Option<String>,
    pub bay: usize,
    /// Indices into [`TopologySnapshot::terminals`].
    pub terminals: Vec<usize>,
    pub source_order: u32,
}

/// A terminal: the link between one equipment and one connectivity node.
#[derive(Clone, Debug)]
pub struct Terminal {
    pub uri: String,
    pub equipment: usize,
    pub connectivity_node: usize,
    /// Document order of the terminal row, used by the busbar-facing
    /// terminal heuristic.
    pub source_order: usize,
}

/// An electrical connection point shared by the terminals referencing it.
#[derive(Clone, Debug)]
pub struct ConnectivityNode {
    pub uri: String,
    pub name: Option<String>,
    /// Indices into [`TopologySnapshot::terminals`]. The length of this list
    /// is the node's electrical degree.
    pub terminals: Vec<usize>,
}

/// RTE bay-name convention for coupling bays.
pub(crate) fn coupling_bay_name(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    upper.contains("CBO") || upper.contains("COUPL")
}

/// A typed, indexed snapshot of one extraction run.
///
/// Constructed once per run from a single set of query rows and read-only
/// thereafter; a new run produces an entirely new snapshot.
#[derive(Clone, Debug, Default)]
pub struct TopologySnapshot {
    pub substations: Vec<Substation>,
    pub voltage_levels: Vec<VoltageLevel>,
    pub bays: Vec<Bay>,
    pub equipment: Vec<Equipment>,
    pub terminals: Vec<Terminal>,
    pub connectivity_nodes: Vec<ConnectivityNode>,

    equipment_indices: HashMap<String, usize>,
    cn_indices: HashMap<String, usize>,
}

impl TopologySnapshot {
    /// Builds a snapshot from query rows.
    ///
    /// Returns a `MalformedTopology` error on input-contract violations:
    /// duplicate URIs within a row set, dangling containment references, a
    /// terminal referencing an unknown equipment, or (when connectivity
    /// nodes are declared up front) a terminal referencing an undeclared
    /// node.
    pub fn try_new(rows: &TopologyRows) -> Result<Self, Error> {
        let mut snapshot = TopologySnapshot::default();

        let mut substation_indices = HashMap::new();
        let mut vl_indices = HashMap::new();
        let mut bay_indices = HashMap::new();

        for (order, row) in rows.substations.iter().enumerate() {
            if substation_indices
                .insert(row.substation_uri.clone(), snapshot.substations.len())
                .is_some()
            {
                return Err(Error::malformed_topology(format!(
                    "Duplicate substation URI: {}",
                    row.substation_uri
                )));
            }
            snapshot.substations.push(Substation {
                uri: row.substation_uri.clone(),
                name: row.name.clone(),
                voltage_levels: vec![],
                source_order: order,
            });
        }

        for (order, row) in rows.voltage_levels.iter().enumerate() {
            let substation = *substation_indices.get(&row.substation_uri).ok_or_else(|| {
                Error::malformed_topology(format!(
                    "VoltageLevel {} references unknown substation {}",
                    row.voltage_level_uri, row.substation_uri
                ))
            })?;
            if vl_indices
                .insert(row.voltage_level_uri.clone(), snapshot.voltage_levels.len())
                .is_some()
            {
                return Err(Error::malformed_topology(format!(
                    "Duplicate voltage level URI: {}",
                    row.voltage_level_uri
                )));
            }
            let index = snapshot.voltage_levels.len();
            snapshot.substations[substation].voltage_levels.push(index);
            snapshot.voltage_levels.push(VoltageLevel {
                uri: row.voltage_level_uri.clone(),
                name: row.name.clone(),
                voltage: row.voltage.clone(),
                substation,
                bays: vec![],
                source_order: order,
            });
        }

        for (order, row) in rows.bays.iter().enumerate() {
            let voltage_level = *vl_indices.get(&row.voltage_level_uri).ok_or_else(|| {
                Error::malformed_topology(format!(
                    "Bay {} references unknown voltage level {}",
                    row.bay_uri, row.voltage_level_uri
                ))
            })?;
            if bay_indices
                .insert(row.bay_uri.clone(), snapshot.bays.len())
                .is_some()
            {
                return Err(Error::malformed_topology(format!(
                    "Duplicate bay URI: {}",
                    row.bay_uri
                )));
            }
            let index = snapshot.bays.len();
            snapshot.voltage_levels[voltage_level].bays.push(index);
            snapshot.bays.push(Bay {
                uri: row.bay_uri.clone(),
                name: row.name.clone(),
                is_coupling: row.is_coupling.unwrap_or_else(|| coupling_bay_name(&row.name)),
                voltage_level,
                equipment: vec![],
                source_order: order,
            });
        }

        for row in &rows.equipment {
            let bay = *bay_indices.get(&row.bay_uri).ok_or_else(|| {
                Error::malformed_topology(format!(
                    "Equipment {} references unknown bay {}",
                    row.equipment_uri, row.bay_uri
                ))
            })?;
            if snapshot
                .equipment_indices
                .insert(row.equipment_uri.clone(), snapshot.equipment.len())
                .is_some()
            {
                return Err(Error::malformed_topology(format!(
                    "Duplicate equipment URI: {}",
                    row.equipment_uri
                )));
            }
            let index = snapshot.equipment.len();
            snapshot.bays[bay].equipment.push(index);
            snapshot.equipment.push(Equipment {
                uri: row.equipment_uri.clone(),
                name: row.name.clone(),
                equipment_type: EquipmentType::from_code(&row.equipment_type),
                subtype: row.subtype.clone(),
                bay,
                terminals: vec![],
                source_order: row.source_order,
            });
        }

        // When CN declarations are present they fix the CN universe; without
        // them, nodes are registered on first terminal reference.
        let declared_cns = !rows.connectivity_nodes.is_empty();
        for row in &rows.connectivity_nodes {
            if snapshot
                .cn_indices
                .insert(row.connectivity_node_uri.clone(), snapshot.connectivity_nodes.len())
                .is_some()
            {
                return Err(Error::malformed_topology(format!(
                    "Duplicate connectivity node URI: {}",
                    row.connectivity_node_uri
                )));
            }
            snapshot.connectivity_nodes.push(ConnectivityNode {
                uri: row.connectivity_node_uri.clone(),
                name: row.name.clone(),
                terminals: vec![],
            });
        }

        for (order, row) in rows.terminals.iter().enumerate() {
            let equipment =
                *snapshot.equipment_indices.get(&row.equipment_uri).ok_or_else(|| {
                    Error::malformed_topology(format!(
                        "Terminal {} references unknown equipment {}",
                        row.terminal_uri, row.equipment_uri
                    ))
                })?;
            let connectivity_node = match snapshot.cn_indices.get(&row.connectivity_node_uri).copied() {
                Some(index) => index,
                None if declared_cns => {
                    return Err(Error::malformed_topology(format!(
                        "Terminal {} references undeclared connectivity node {}",
                        row.terminal_uri, row.connectivity_node_uri
                    )));
                }
                None => {
                    let index = snapshot.connectivity_nodes.len();
                    snapshot
                        .cn_indices
                        .insert(row.connectivity_node_uri.clone(), index);
                    snapshot.connectivity_nodes.push(ConnectivityNode {
                        uri: row.connectivity_node_uri.clone(),
                        name: None,
                        terminals: vec![],
                    });
                    index
                }
            };

            let index = snapshot.terminals.len();
            snapshot.equipment[equipment].terminals.push(index);
            snapshot.connectivity_nodes[connectivity_node].terminals.push(index);
            snapshot.terminals.push(Terminal {
                uri: row.terminal_uri.clone(),
                equipment,
                connectivity_node,
                source_order: order,
            });
        }

        tracing::info!(
            substations = snapshot.substations.len(),
            voltage_levels = snapshot.voltage_levels.len(),
            bays = snapshot.bays.len(),
            equipment = snapshot.equipment.len(),
            terminals = snapshot.terminals.len(),
            connectivity_nodes = snapshot.connectivity_nodes.len(),
            "extracted topology snapshot"
        );

        Ok(snapshot)
    }

    /// Returns the equipment with the given URI, if it exists.
    pub fn equipment_by_uri(&self, uri: &str) -> Result<&Equipment, Error> {
        self.equipment_indices
            .get(uri)
            .map(|i| &self.equipment[*i])
            .ok_or_else(|| Error::entity_not_found(format!("Equipment {} not found.", uri)))
    }

    /// Returns the connectivity node with the given URI, if it exists.
    pub fn cn_by_uri(&self, uri: &str) -> Result<&ConnectivityNode, Error> {
        self.cn_indices
            .get(uri)
            .map(|i| &self.connectivity_nodes[*i])
            .ok_or_else(|| {
                Error::entity_not_found(format!("Connectivity node {} not found.", uri))
            })
    }

    /// Iterates over the equipment indices of one voltage level, in document
    /// order.
    pub fn equipment_in_level(&self, voltage_level: usize) -> impl Iterator<Item = usize> + '_ {
        self.voltage_levels[voltage_level]
            .bays
            .iter()
            .flat_map(move |bay| self.bays[*bay].equipment.iter().copied())
    }
}
