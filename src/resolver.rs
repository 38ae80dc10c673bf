// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The busbar resolver: determines which connectivity nodes and equipment
//! belong to which busbar, producing explicit or virtual busbars.
//!
//! Four levels are tried strictly in order, per voltage level independently:
//!
//! 1. explicit `BUSBAR` equipment,
//! 2. inference from `SA<n>` busbar-selection disconnector subtypes,
//! 3. coupling-bay link annotation between inferred busbars,
//! 4. a single synthesized fallback busbar.
//!
//! Each level is a pure function over the voltage level's slice of the
//! connectivity graph; once a level has assigned busbars for a voltage
//! level, later levels are skipped for that level only. Every level is
//! deterministic: ties are broken by lexicographic URI order.

mod levels;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{ConnectivityGraph, EngineConfig, TopologySnapshot};

/// Records which resolver level produced a busbar. Part of the output
/// contract: consumers display it to audit how precise the reconstruction
/// was.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BusbarOrigin {
    Explicit,
    InferredSubtype,
    InferredCoupling,
    FallbackSingle,
}

/// A busbar, explicit or virtual, scoped to one voltage level.
#[derive(Clone, Debug)]
pub struct Busbar {
    /// Equipment URI for explicit busbars, synthesized `BB...` id otherwise.
    pub id: String,
    pub voltage_level: usize,
    pub origin: BusbarOrigin,
    /// Equipment arena indices attached to this busbar.
    pub members: BTreeSet<usize>,
    /// Connectivity-node arena indices assigned to this busbar.
    pub cns: BTreeSet<usize>,
}

/// An auditable "linked via coupling bay" fact between two busbars.
///
/// The busbars stay distinct entities; whether they should ever be merged is
/// left open in the source conventions, so the resolver only annotates.
#[derive(Clone, Debug, PartialEq)]
pub struct CouplingLink {
    pub from: String,
    pub to: String,
    pub via_bay: usize,
}

/// The resolver level that ended the cascade for a voltage level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionLevel {
    Explicit,
    Subtype,
    Fallback,
}

/// The resolver output for one snapshot.
#[derive(Clone, Debug, Default)]
pub struct BusbarResolution {
    /// All busbars, grouped by voltage level in arena order.
    pub busbars: Vec<Busbar>,
    pub coupling_links: Vec<CouplingLink>,
    /// Bays treated as coupling bays by the resolver, including ones only
    /// detected structurally (one breaker plus disconnectors, no feeder
    /// stub).
    pub coupling_bays: BTreeSet<usize>,
    /// Which level assigned busbars, per voltage level.
    pub levels: Vec<Option<ResolutionLevel>>,
}

impl BusbarResolution {
    /// Iterates over the busbars of one voltage level with their positions
    /// in [`busbars`][BusbarResolution::busbars].
    pub fn busbars_of_level(
        &self,
        voltage_level: usize,
    ) -> impl Iterator<Item = (usize, &Busbar)> {
        self.busbars
            .iter()
            .enumerate()
            .filter(move |(_, busbar)| busbar.voltage_level == voltage_level)
    }
}

/// Resolves busbar membership for every voltage level of the snapshot.
///
/// Heuristic levels never fail: absence of evidence falls through to the
/// next level, and level 4 guarantees at least one busbar per voltage level.
pub fn resolve_busbars(
    snapshot: &TopologySnapshot,
    graph: &ConnectivityGraph,
    config: &EngineConfig,
) -> BusbarResolution {
    let mut resolution = BusbarResolution::default();

    for voltage_level in 0..snapshot.voltage_levels.len() {
        let name = &snapshot.voltage_levels[voltage_level].name;

        if let Some(busbars) = levels::explicit(snapshot, graph, voltage_level) {
            tracing::debug!(
                voltage_level = name.as_str(),
                count = busbars.len(),
                "explicit busbars"
            );
            resolution.busbars.extend(busbars);
            resolution.levels.push(Some(ResolutionLevel::Explicit));
            continue;
        }

        if let Some(busbars) = levels::subtype(snapshot, graph, voltage_level) {
            tracing::debug!(
                voltage_level = name.as_str(),
                count = busbars.len(),
                "no explicit busbar, inferred from SA disconnectors"
            );
            let (links, coupling_bays) = levels::coupling(
                snapshot,
                graph,
                voltage_level,
                &busbars,
                config.structural_coupling_detection,
            );
            resolution.busbars.extend(busbars);
            resolution.coupling_links.extend(links);
            resolution.coupling_bays.extend(coupling_bays);
            resolution.levels.push(Some(ResolutionLevel::Subtype));
            continue;
        }

        tracing::warn!(
            voltage_level = name.as_str(),
            "no busbar evidence, using single-busbar fallback"
        );
        resolution
            .busbars
            .push(levels::fallback(snapshot, graph, voltage_level));
        resolution.levels.push(Some(ResolutionLevel::Fallback));
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TopologyBuilder;

    fn resolve(builder: &TopologyBuilder) -> (crate::TopologySnapshot, BusbarResolution) {
        let snapshot = builder.snapshot();
        let graph = ConnectivityGraph::new(&snapshot);
        let resolution = resolve_busbars(&snapshot, &graph, &EngineConfig::default());
        (snapshot, resolution)
    }

    #[test]
    fn test_explicit_wins_over_subtype_evidence() {
        let mut builder = TopologyBuilder::new();
        let bb_bay = builder.bay("4BUIS1");
        let busbar = builder.equipment(bb_bay, "BUSBAR", None);
        builder.terminal(busbar, "cn:bb1");
        // SA evidence present, but the explicit busbar must preempt it.
        builder.feeder_bay(0, "4LINE1", "SA1", "cn:bb1");
        let (snapshot, resolution) = resolve(&builder);

        assert_eq!(resolution.levels, vec![Some(ResolutionLevel::Explicit)]);
        assert_eq!(resolution.busbars.len(), 1);
        let resolved = &resolution.busbars[0];
        assert_eq!(resolved.origin, BusbarOrigin::Explicit);
        assert_eq!(resolved.id, snapshot.equipment[busbar].uri);
        // The feeder's SA disconnector shares cn:bb1 and is attached.
        assert!(resolved.members.contains(&(busbar + 1)));
    }

    #[test]
    fn test_two_sa_groups_yield_two_virtual_busbars() {
        let mut builder = TopologyBuilder::new();
        builder.feeder_bay(0, "4LINE1", "SA1", "cn:bb1");
        builder.feeder_bay(0, "4LINE2", "SA2", "cn:bb2");
        let (_, resolution) = resolve(&builder);

        assert_eq!(resolution.levels, vec![Some(ResolutionLevel::Subtype)]);
        let ids = resolution.busbars.iter().map(|b| b.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["BB1_4", "BB2_4"]);
        assert!(resolution
            .busbars
            .iter()
            .all(|b| b.origin == BusbarOrigin::InferredSubtype));
    }

    #[test]
    fn test_fallback_attaches_every_equipment() {
        let mut builder = TopologyBuilder::new();
        let bay = builder.bay("4LINE1");
        let cbr = builder.equipment(bay, "CBR", None);
        let ctr = builder.equipment(bay, "CTR", None);
        builder.terminal(cbr, "cn:a");
        builder.terminal(ctr, "cn:a");
        let (_, resolution) = resolve(&builder);

        assert_eq!(resolution.levels, vec![Some(ResolutionLevel::Fallback)]);
        assert_eq!(resolution.busbars.len(), 1);
        let busbar = &resolution.busbars[0];
        assert_eq!(busbar.id, "BB_4");
        assert_eq!(busbar.origin, BusbarOrigin::FallbackSingle);
        assert_eq!(busbar.members.iter().copied().collect::<Vec<_>>(), vec![cbr, ctr]);
    }

    #[test]
    fn test_coupling_bay_links_disconnected_busbars() {
        let mut builder = TopologyBuilder::new();
        builder.feeder_bay(0, "4LINE1", "SA1", "cn:bb1");
        builder.feeder_bay(0, "4LINE2", "SA2", "cn:bb2");
        let cbo = builder.coupling_bay(0, "4CBO1", "SA1", "cn:bb1", "SA2", "cn:bb2");
        let (_, resolution) = resolve(&builder);

        assert_eq!(resolution.busbars.len(), 2);
        assert_eq!(
            resolution.coupling_links,
            vec![CouplingLink {
                from: "BB1_4".into(),
                to: "BB2_4".into(),
                via_bay: cbo,
            }]
        );
        assert!(resolution.coupling_bays.contains(&cbo));
    }

    #[test]
    fn test_levels_are_independent_per_voltage_level() {
        let mut builder = TopologyBuilder::new();
        let bb_bay = builder.bay("4BUIS1");
        let busbar = builder.equipment(bb_bay, "BUSBAR", None);
        builder.terminal(busbar, "cn:bb1");

        let level_6 = builder.level("6", Some("63"));
        builder.feeder_bay(level_6, "6LINE1", "SA1", "cn:6bb1");

        let level_7 = builder.level("7", Some("20"));
        let bay = builder.bay_in(level_7, "7LINE1");
        let cbr = builder.equipment(bay, "CBR", None);
        builder.terminal(cbr, "cn:7a");

        let (_, resolution) = resolve(&builder);
        assert_eq!(
            resolution.levels,
            vec![
                Some(ResolutionLevel::Explicit),
                Some(ResolutionLevel::Subtype),
                Some(ResolutionLevel::Fallback),
            ]
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let mut builder = TopologyBuilder::new();
        builder.feeder_bay(0, "4LINE1", "SA1", "cn:bb1");
        builder.feeder_bay(0, "4LINE2", "SA2", "cn:bb2");
        builder.coupling_bay(0, "4CBO1", "SA1", "cn:bb1", "SA2", "cn:bb2");

        let (_, first) = resolve(&builder);
        let (_, second) = resolve(&builder);
        let ids = |r: &BusbarResolution| {
            r.busbars
                .iter()
                .map(|b| (b.id.clone(), b.members.clone(), b.cns.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first.coupling_links, second.coupling_links);
    }
}
