// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The layout assembler: merges the resolved topology and the convention's
//! ordering decisions into the final hierarchical document.

use std::collections::BTreeSet;

use crate::layout::convention::LayoutConvention;
use crate::layout::document::{
    BayLayout, BusbarLayout, CouplingLinkLayout, EquipmentLayout, SldDocument, Statistics,
    SubstationLayout, VoltageLevelLayout,
};
use crate::{BusbarResolution, Finding, TopologySnapshot};

/// Assembles the output document.
///
/// Bays without equipment and voltage levels without a non-coupling bay are
/// filtered out; the statistics keep count of what was excluded.
pub(crate) fn assemble(
    snapshot: &TopologySnapshot,
    resolution: &BusbarResolution,
    findings: Vec<Finding>,
    convention: &dyn LayoutConvention,
) -> SldDocument {
    let mut statistics = Statistics {
        substations: 0,
        voltage_levels: 0,
        bays: 0,
        equipments: 0,
        excluded_voltage_levels: 0,
        excluded_bays: 0,
        findings_count: findings.len(),
    };

    let mut substations = vec![];
    for substation in &snapshot.substations {
        let mut voltage_levels = vec![];
        for level in convention.voltage_level_order(snapshot, &substation.voltage_levels) {
            match assemble_level(snapshot, resolution, convention, level, &mut statistics) {
                Some(layout) => voltage_levels.push(layout),
                None => statistics.excluded_voltage_levels += 1,
            }
        }
        statistics.substations += 1;
        statistics.voltage_levels += voltage_levels.len();
        substations.push(SubstationLayout {
            name: substation.name.clone(),
            voltage_levels,
        });
    }

    SldDocument {
        substations,
        statistics,
        findings,
        generator: "component-based",
    }
}

/// Assembles one voltage level, or `None` when the level carries no diagram
/// value (no non-coupling bay with equipment).
fn assemble_level(
    snapshot: &TopologySnapshot,
    resolution: &BusbarResolution,
    convention: &dyn LayoutConvention,
    level: usize,
    statistics: &mut Statistics,
) -> Option<VoltageLevelLayout> {
    let record = &snapshot.voltage_levels[level];

    let coupling = record
        .bays
        .iter()
        .copied()
        .filter(|bay| snapshot.bays[*bay].is_coupling || resolution.coupling_bays.contains(bay))
        .collect::<BTreeSet<_>>();

    let mut bays = vec![];
    for bay in convention.bay_order(snapshot, &record.bays, &coupling) {
        match assemble_bay(snapshot, convention, bay, coupling.contains(&bay)) {
            Some(layout) => bays.push(layout),
            None => statistics.excluded_bays += 1,
        }
    }
    if !bays.iter().any(|bay| !bay.is_coupling) {
        statistics.excluded_bays += bays.len();
        return None;
    }
    statistics.bays += bays.len();
    statistics.equipments += bays.iter().map(|bay| bay.equipments.len()).sum::<usize>();

    let mut busbars = resolution
        .busbars_of_level(level)
        .map(|(_, busbar)| BusbarLayout {
            id: busbar.id.clone(),
            origin: busbar.origin,
        })
        .collect::<Vec<_>>();
    busbars.sort_by(|a, b| a.id.cmp(&b.id));

    let coupling_links = resolution
        .coupling_links
        .iter()
        .filter(|link| snapshot.bays[link.via_bay].voltage_level == level)
        .map(|link| CouplingLinkLayout {
            from: link.from.clone(),
            to: link.to.clone(),
            via_bay: snapshot.bays[link.via_bay].name.clone(),
        })
        .collect();

    Some(VoltageLevelLayout {
        name: record.name.clone(),
        voltage: record.voltage.clone(),
        busbars,
        coupling_links,
        bays,
    })
}

/// Assembles one bay, or `None` when it holds no equipment.
fn assemble_bay(
    snapshot: &TopologySnapshot,
    convention: &dyn LayoutConvention,
    bay: usize,
    is_coupling: bool,
) -> Option<BayLayout> {
    let record = &snapshot.bays[bay];
    if record.equipment.is_empty() {
        return None;
    }

    let mut equipment = record.equipment.clone();
    equipment.sort_by_key(|e| {
        let record = &snapshot.equipment[*e];
        (
            convention.equipment_layer(record.equipment_type, record.subtype.as_deref()),
            record.source_order,
            record.uri.clone(),
        )
    });

    let equipments = equipment
        .iter()
        .enumerate()
        .map(|(rank, e)| {
            let record = &snapshot.equipment[*e];
            EquipmentLayout {
                name: record.name.clone(),
                equipment_type: record.equipment_type.code().to_string(),
                subtype: record.subtype.clone(),
                order: rank as u32,
            }
        })
        .collect();

    Some(BayLayout {
        name: record.name.clone(),
        is_coupling,
        equipments,
    })
}
