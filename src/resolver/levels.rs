// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The four resolver levels, each a pure function over one voltage level.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::equipment_type::{sa_number, EquipmentType};
use crate::{ConnectivityGraph, TopologySnapshot};

use super::{Busbar, BusbarOrigin, CouplingLink};

/// Level 1: one busbar per explicit `BUSBAR` equipment.
///
/// Membership grows from the busbar's own terminal nodes and expands
/// transitively through other explicit-busbar equipment of the same voltage
/// level (busbar sections). Busbars are processed in lexicographic URI
/// order and a node claimed by an earlier busbar is never re-claimed.
pub(super) fn explicit(
    snapshot: &TopologySnapshot,
    graph: &ConnectivityGraph,
    voltage_level: usize,
) -> Option<Vec<Busbar>> {
    let mut busbar_equipment = snapshot
        .equipment_in_level(voltage_level)
        .filter(|e| snapshot.equipment[*e].equipment_type == EquipmentType::Busbar)
        .collect::<Vec<_>>();
    if busbar_equipment.is_empty() {
        return None;
    }
    busbar_equipment.sort_by(|a, b| snapshot.equipment[*a].uri.cmp(&snapshot.equipment[*b].uri));

    let in_level = |e: usize| snapshot.bays[snapshot.equipment[e].bay].voltage_level == voltage_level;

    let mut claimed = BTreeSet::new();
    let mut busbars = vec![];
    for owner in busbar_equipment {
        let mut busbar = Busbar {
            id: snapshot.equipment[owner].uri.clone(),
            voltage_level,
            origin: BusbarOrigin::Explicit,
            members: BTreeSet::new(),
            cns: BTreeSet::new(),
        };

        let mut frontier = VecDeque::from(graph.cns_of_equipment(owner));
        while let Some(cn) = frontier.pop_front() {
            if !claimed.insert(cn) {
                continue;
            }
            busbar.cns.insert(cn);
            for equipment in graph.equipment_on_cn(cn) {
                if equipment == owner {
                    continue;
                }
                busbar.members.insert(equipment);
                let is_section = snapshot.equipment[equipment].equipment_type
                    == EquipmentType::Busbar
                    && in_level(equipment);
                if is_section {
                    frontier.extend(graph.cns_of_equipment(equipment));
                }
            }
        }
        busbars.push(busbar);
    }

    Some(busbars)
}

/// Level 2: virtual busbars inferred from `SA<n>` disconnector subtypes.
///
/// One busbar per distinct busbar index `n` observed in the voltage level,
/// seeded with the busbar-facing terminal node of each `SA<n>`
/// disconnector.
pub(super) fn subtype(
    snapshot: &TopologySnapshot,
    graph: &ConnectivityGraph,
    voltage_level: usize,
) -> Option<Vec<Busbar>> {
    let mut sa_groups: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for equipment in snapshot.equipment_in_level(voltage_level) {
        let record = &snapshot.equipment[equipment];
        if record.equipment_type != EquipmentType::Disconnector {
            continue;
        }
        if let Some(n) = record.subtype.as_deref().and_then(sa_number) {
            sa_groups.entry(n).or_default().push(equipment);
        }
    }
    if sa_groups.is_empty() {
        return None;
    }

    let level_name = &snapshot.voltage_levels[voltage_level].name;
    let mut claimed = BTreeSet::new();
    let mut busbars = vec![];
    for (n, group) in sa_groups {
        let mut busbar = Busbar {
            id: format!("BB{n}_{level_name}"),
            voltage_level,
            origin: BusbarOrigin::InferredSubtype,
            members: BTreeSet::new(),
            cns: BTreeSet::new(),
        };
        for sa in group {
            let Some(cn) = busbar_facing_cn(snapshot, graph, sa) else {
                continue;
            };
            // A node already claimed by a lower busbar index stays there.
            if claimed.insert(cn) {
                busbar.cns.insert(cn);
            }
        }
        for cn in busbar.cns.clone() {
            busbar.members.extend(graph.equipment_on_cn(cn));
        }
        busbars.push(busbar);
    }

    Some(busbars)
}

/// Picks the busbar-facing terminal node of a busbar-selection disconnector:
/// the node carrying no other equipment of the disconnector's own bay.
/// When every node fails that test, the lowest-document-order terminal wins.
/// A disconnector without terminals contributes nothing.
fn busbar_facing_cn(
    snapshot: &TopologySnapshot,
    graph: &ConnectivityGraph,
    sa: usize,
) -> Option<usize> {
    let bay = snapshot.equipment[sa].bay;
    let mut terminals = snapshot.equipment[sa].terminals.clone();
    if terminals.is_empty() {
        return None;
    }
    terminals.sort_by_key(|t| snapshot.terminals[*t].source_order);

    terminals
        .iter()
        .map(|t| snapshot.terminals[*t].connectivity_node)
        .find(|cn| {
            graph
                .equipment_on_cn(*cn)
                .iter()
                .all(|e| *e == sa || snapshot.equipment[*e].bay != bay)
        })
        .or(Some(snapshot.terminals[terminals[0]].connectivity_node))
}

/// Level 3: coupling-bay link annotation.
///
/// Runs only when level 2 left at least two busbars with disjoint equipment
/// membership. Coupling bays (flagged, or detected structurally) touching
/// two or more busbars yield link annotations; membership is never merged.
pub(super) fn coupling(
    snapshot: &TopologySnapshot,
    graph: &ConnectivityGraph,
    voltage_level: usize,
    busbars: &[Busbar],
    structural_detection: bool,
) -> (Vec<CouplingLink>, BTreeSet<usize>) {
    let mut links = vec![];
    let mut coupling_bays = BTreeSet::new();

    let any_disjoint = busbars.iter().enumerate().any(|(i, a)| {
        busbars[i + 1..]
            .iter()
            .any(|b| a.members.is_disjoint(&b.members))
    });
    if busbars.len() < 2 || !any_disjoint {
        return (links, coupling_bays);
    }

    for &bay in &snapshot.voltage_levels[voltage_level].bays {
        let is_coupling = snapshot.bays[bay].is_coupling
            || (structural_detection && is_structurally_coupling(snapshot, graph, bay));
        if !is_coupling {
            continue;
        }
        coupling_bays.insert(bay);

        let touched = busbars
            .iter()
            .enumerate()
            .filter(|(_, busbar)| {
                snapshot.bays[bay]
                    .equipment
                    .iter()
                    .any(|e| busbar.members.contains(e))
            })
            .map(|(position, _)| position)
            .collect::<Vec<_>>();
        for (i, a) in touched.iter().enumerate() {
            for b in &touched[i + 1..] {
                tracing::debug!(
                    bay = snapshot.bays[bay].name.as_str(),
                    from = busbars[*a].id.as_str(),
                    to = busbars[*b].id.as_str(),
                    "busbars linked via coupling bay"
                );
                links.push(CouplingLink {
                    from: busbars[*a].id.clone(),
                    to: busbars[*b].id.clone(),
                    via_bay: bay,
                });
            }
        }
    }

    (links, coupling_bays)
}

/// Structural coupling-bay test: exactly one breaker, everything else
/// disconnectors, and no terminal on a degree-1 node (no feeder stub).
fn is_structurally_coupling(
    snapshot: &TopologySnapshot,
    graph: &ConnectivityGraph,
    bay: usize,
) -> bool {
    let equipment = &snapshot.bays[bay].equipment;
    if equipment.is_empty() {
        return false;
    }
    let mut breakers = 0;
    for &e in equipment {
        match snapshot.equipment[e].equipment_type {
            EquipmentType::CircuitBreaker => breakers += 1,
            EquipmentType::Disconnector => {}
            _ => return false,
        }
        if graph.cns_of_equipment(e).iter().any(|cn| graph.cn_degree(*cn) == 1) {
            return false;
        }
    }
    breakers == 1
}

/// Level 4: a single synthesized busbar holding the entire voltage level.
/// Equipment without any terminal stays in its bay but cannot join busbar
/// membership; the validator reports it.
pub(super) fn fallback(
    snapshot: &TopologySnapshot,
    graph: &ConnectivityGraph,
    voltage_level: usize,
) -> Busbar {
    let mut busbar = Busbar {
        id: format!("BB_{}", snapshot.voltage_levels[voltage_level].name),
        voltage_level,
        origin: BusbarOrigin::FallbackSingle,
        members: BTreeSet::new(),
        cns: BTreeSet::new(),
    };
    for equipment in snapshot.equipment_in_level(voltage_level) {
        if snapshot.equipment[equipment].terminals.is_empty() {
            continue;
        }
        busbar.members.insert(equipment);
        busbar.cns.extend(graph.cns_of_equipment(equipment));
    }
    busbar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TopologyBuilder;

    #[test]
    fn test_explicit_busbar_sections_expand_transitively() {
        let mut builder = TopologyBuilder::new();
        let bay = builder.bay("4BUIS1");
        let section_a = builder.equipment(bay, "BUSBAR", None);
        let section_b = builder.equipment(bay, "BUSBAR", None);
        builder.terminal(section_a, "cn:a");
        builder.terminal(section_a, "cn:shared");
        builder.terminal(section_b, "cn:shared");
        builder.terminal(section_b, "cn:b");
        let feeder = builder.bay("4LINE1");
        let cbr = builder.equipment(feeder, "CBR", None);
        builder.terminal(cbr, "cn:b");

        let snapshot = builder.snapshot();
        let graph = ConnectivityGraph::new(&snapshot);
        let busbars = explicit(&snapshot, &graph, 0).unwrap();

        // eq:0 sorts before eq:1 and absorbs the shared node chain; the
        // second section keeps its busbar entity but claims nothing new.
        assert_eq!(busbars.len(), 2);
        assert_eq!(busbars[0].cns.len(), 3);
        assert!(busbars[0].members.contains(&cbr));
        assert!(busbars[1].cns.is_empty());
    }

    #[test]
    fn test_busbar_facing_cn_prefers_foreign_node() {
        let mut builder = TopologyBuilder::new();
        builder.feeder_bay(0, "4LINE1", "SA1", "cn:bb1");
        builder.feeder_bay(0, "4LINE2", "SA1", "cn:bb1");
        let snapshot = builder.snapshot();
        let graph = ConnectivityGraph::new(&snapshot);

        let busbars = subtype(&snapshot, &graph, 0).unwrap();
        assert_eq!(busbars.len(), 1);
        let bb1_cn = snapshot.cn_by_uri("cn:bb1").unwrap();
        assert_eq!(busbars[0].cns.len(), 1);
        let cn = *busbars[0].cns.iter().next().unwrap();
        assert_eq!(snapshot.connectivity_nodes[cn].uri, bb1_cn.uri);
    }

    #[test]
    fn test_bare_sa_subtype_is_not_level_two_evidence() {
        let mut builder = TopologyBuilder::new();
        let bay = builder.bay("4LINE1");
        let dis = builder.equipment(bay, "DIS", Some("SA"));
        builder.terminal(dis, "cn:a");
        let snapshot = builder.snapshot();
        let graph = ConnectivityGraph::new(&snapshot);

        assert!(subtype(&snapshot, &graph, 0).is_none());
    }

    #[test]
    fn test_coupling_skipped_when_busbars_share_members() {
        let mut builder = TopologyBuilder::new();
        // Both SA groups select the same physical node. BB1 claims it first,
        // leaving BB2 empty, and the coupling bay touches only one busbar.
        builder.feeder_bay(0, "4LINE1", "SA1", "cn:bb");
        builder.feeder_bay(0, "4LINE2", "SA2", "cn:bb");
        builder.coupling_bay(0, "4CBO1", "SA1", "cn:bb", "SA2", "cn:bb");
        let snapshot = builder.snapshot();
        let graph = ConnectivityGraph::new(&snapshot);

        let busbars = subtype(&snapshot, &graph, 0).unwrap();
        let (links, _) = coupling(&snapshot, &graph, 0, &busbars, true);
        assert!(links.is_empty());
    }

    #[test]
    fn test_structural_coupling_detection_rejects_feeder_bay() {
        let mut builder = TopologyBuilder::new();
        builder.feeder_bay(0, "4LINE1", "SA1", "cn:bb1");
        // The earthing disconnector ends on a degree-1 feeder stub.
        let snapshot = builder.snapshot();
        let graph = ConnectivityGraph::new(&snapshot);
        assert!(!is_structurally_coupling(&snapshot, &graph, 0));
    }

    #[test]
    fn test_structural_coupling_detection_accepts_unnamed_coupler() {
        let mut builder = TopologyBuilder::new();
        builder.feeder_bay(0, "4LINE1", "SA1", "cn:bb1");
        builder.feeder_bay(0, "4LINE2", "SA2", "cn:bb2");
        // Plain name: neither CBO nor COUPL, only the structure gives it away.
        let bay = builder.coupling_bay(0, "4TRX9", "SA1", "cn:bb1", "SA2", "cn:bb2");
        let snapshot = builder.snapshot();
        let graph = ConnectivityGraph::new(&snapshot);

        assert!(!snapshot.bays[bay].is_coupling);
        assert!(is_structurally_coupling(&snapshot, &graph, bay));

        let busbars = subtype(&snapshot, &graph, 0).unwrap();
        let (links, coupling_bays) = coupling(&snapshot, &graph, 0, &busbars, true);
        assert_eq!(links.len(), 1);
        assert!(coupling_bays.contains(&bay));

        // With structural detection off, the unnamed coupler is invisible.
        let (links, _) = coupling(&snapshot, &graph, 0, &busbars, false);
        assert!(links.is_empty());
    }

    #[test]
    fn test_fallback_covers_empty_voltage_level() {
        let builder = TopologyBuilder::new();
        let snapshot = builder.snapshot();
        let graph = ConnectivityGraph::new(&snapshot);

        let busbar = fallback(&snapshot, &graph, 0);
        assert_eq!(busbar.id, "BB_4");
        assert!(busbar.members.is_empty());
    }
}
