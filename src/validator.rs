// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The topology validator: a read-only pass over the resolved graph that
//! collects findings without ever blocking the pipeline.
//!
//! Findings are attached to the output document for the caller to display
//! or log; only the extraction stage can abort a run.

use serde::Serialize;

use crate::{BusbarResolution, ConnectivityGraph, TopologySnapshot};

/// The kind of a validation finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    /// Equipment without a resolvable connection; kept in its bay but
    /// excluded from busbar membership.
    DisconnectedEquipment,
    /// A connectivity node no terminal references (degree 0).
    OrphanConnectivityNode,
    /// A connectivity node with a single terminal (degree 1). Informational:
    /// feeder stubs look like this by design.
    OpenEnd,
    /// A connectivity node claimed by more than one busbar. The resolver's
    /// per-level precedence should make this impossible within one voltage
    /// level, but fallback busbars of adjacent levels can both reach a
    /// transformer node.
    BusbarConflict,
}

/// One validation finding.
#[derive(Clone, Debug, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    /// URI of the entity the finding is about.
    pub uri: String,
    pub message: String,
}

/// Runs all validation passes and returns the findings, in a deterministic
/// order (pass order, then arena order).
pub fn validate_topology(
    snapshot: &TopologySnapshot,
    graph: &ConnectivityGraph,
    resolution: &BusbarResolution,
) -> Vec<Finding> {
    let mut findings = vec![];

    for equipment in &snapshot.equipment {
        if equipment.terminals.is_empty() {
            findings.push(Finding {
                kind: FindingKind::DisconnectedEquipment,
                uri: equipment.uri.clone(),
                message: format!(
                    "Equipment {} has no terminal; kept in bay {} without busbar membership.",
                    equipment.name, snapshot.bays[equipment.bay].name
                ),
            });
        }
    }

    for (index, cn) in snapshot.connectivity_nodes.iter().enumerate() {
        match graph.cn_degree(index) {
            0 => findings.push(Finding {
                kind: FindingKind::OrphanConnectivityNode,
                uri: cn.uri.clone(),
                message: format!("Connectivity node {} has no terminal.", cn.uri),
            }),
            1 => findings.push(Finding {
                kind: FindingKind::OpenEnd,
                uri: cn.uri.clone(),
                message: format!("Connectivity node {} has a single terminal.", cn.uri),
            }),
            _ => {}
        }
    }

    for (index, cn) in snapshot.connectivity_nodes.iter().enumerate() {
        let claimants = resolution
            .busbars
            .iter()
            .filter(|busbar| busbar.cns.contains(&index))
            .map(|busbar| busbar.id.as_str())
            .collect::<Vec<_>>();
        if claimants.len() > 1 {
            findings.push(Finding {
                kind: FindingKind::BusbarConflict,
                uri: cn.uri.clone(),
                message: format!(
                    "Connectivity node {} is claimed by busbars {}.",
                    cn.uri,
                    claimants.join(", ")
                ),
            });
        }
    }

    if !findings.is_empty() {
        tracing::warn!(count = findings.len(), "topology validation findings");
    }
    findings
}
