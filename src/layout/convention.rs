// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Regional layout conventions.
//!
//! A convention is a capability set: vertical layering of equipment inside
//! a bay, stacking of voltage levels, and placement of coupling bays,
//! selected by name through [`ConventionKind`][crate::ConventionKind].
//! Adding a second regional convention means implementing
//! [`LayoutConvention`] for a new type, not subclassing anything.

use std::collections::BTreeSet;

use crate::equipment_type::{subtype_role, EquipmentType};
use crate::TopologySnapshot;

/// Layer value for equipment the convention does not rank; sorts below all
/// ranked layers, leaving the source order as the only key.
pub const UNRANKED_LAYER: u32 = 999;

/// Placement policy for coupling bays within a voltage level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CouplingPosition {
    Left,
    Right,
    Inline,
}

/// The ordering decisions a regional convention contributes to the layout.
pub trait LayoutConvention {
    /// Vertical stacking order of equipment within a bay; smaller is closer
    /// to the busbar. Equipment sharing a layer keep their source order.
    fn equipment_layer(&self, equipment_type: EquipmentType, subtype: Option<&str>) -> u32;

    /// Placement of coupling bays relative to the feeder bays.
    fn coupling_bay_position(&self) -> CouplingPosition;

    /// Vertical stacking order of the given voltage levels: nominal voltage
    /// descending, ties and unparseable voltages by source order.
    fn voltage_level_order(&self, snapshot: &TopologySnapshot, levels: &[usize]) -> Vec<usize> {
        let mut ordered = levels.to_vec();
        ordered.sort_by(|a, b| {
            let va = nominal_voltage(snapshot, *a);
            let vb = nominal_voltage(snapshot, *b);
            match (va, vb) {
                (Some(va), Some(vb)) => vb
                    .partial_cmp(&va)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| cmp_source_order(snapshot, *a, *b)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => cmp_source_order(snapshot, *a, *b),
            }
        });
        ordered
    }

    /// Left-to-right order of the bays of one voltage level: stable by
    /// source order, with coupling bays pinned per
    /// [`coupling_bay_position`][LayoutConvention::coupling_bay_position].
    fn bay_order(
        &self,
        snapshot: &TopologySnapshot,
        bays: &[usize],
        coupling: &BTreeSet<usize>,
    ) -> Vec<usize> {
        let mut ordered = bays.to_vec();
        ordered.sort_by_key(|bay| snapshot.bays[*bay].source_order);
        match self.coupling_bay_position() {
            CouplingPosition::Inline => ordered,
            CouplingPosition::Left => {
                let (pinned, feeders): (Vec<_>, Vec<_>) =
                    ordered.into_iter().partition(|bay| coupling.contains(bay));
                pinned.into_iter().chain(feeders).collect()
            }
            CouplingPosition::Right => {
                let (pinned, feeders): (Vec<_>, Vec<_>) =
                    ordered.into_iter().partition(|bay| coupling.contains(bay));
                feeders.into_iter().chain(pinned).collect()
            }
        }
    }
}

fn nominal_voltage(snapshot: &TopologySnapshot, level: usize) -> Option<f64> {
    let text = snapshot.voltage_levels[level].voltage.as_deref()?;
    let numeric: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    numeric.parse().ok()
}

fn cmp_source_order(snapshot: &TopologySnapshot, a: usize, b: usize) -> std::cmp::Ordering {
    snapshot.voltage_levels[a]
        .source_order
        .cmp(&snapshot.voltage_levels[b].source_order)
}

/// The RTE representation rules for single-line diagrams.
///
/// Busbars are horizontal, coupling bays sit on the left, and a feeder
/// column stacks busbar-selection disconnector, line disconnector, breaker,
/// earthing disconnector, then the measurement transformers.
pub struct RteConvention;

impl LayoutConvention for RteConvention {
    fn equipment_layer(&self, equipment_type: EquipmentType, subtype: Option<&str>) -> u32 {
        match equipment_type {
            EquipmentType::Busbar => 0,
            EquipmentType::Disconnector => match subtype.map(subtype_role) {
                Some("SA") => 1,
                Some("SL") => 2,
                Some("ST") => 4,
                _ => UNRANKED_LAYER,
            },
            EquipmentType::CircuitBreaker => 3,
            EquipmentType::CurrentTransformer => 5,
            EquipmentType::VoltageTransformer => 5,
            _ => UNRANKED_LAYER,
        }
    }

    fn coupling_bay_position(&self) -> CouplingPosition {
        CouplingPosition::Left
    }
}
