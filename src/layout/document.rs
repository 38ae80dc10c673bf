// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The serializable layout document handed to the rendering layer.
//!
//! The structure is stable and deterministic: running the pipeline twice on
//! the same snapshot serializes to identical JSON. Rendering (symbol
//! geometry, coordinates, SVG) happens downstream and is out of scope here.

use serde::Serialize;

use crate::{BusbarOrigin, Finding};

/// The root document: the ordered substation hierarchy, summary statistics
/// and validation findings.
#[derive(Clone, Debug, Serialize)]
pub struct SldDocument {
    pub substations: Vec<SubstationLayout>,
    pub statistics: Statistics,
    pub findings: Vec<Finding>,
    /// Identifies the producing generator to the rendering layer.
    pub generator: &'static str,
}

#[derive(Clone, Debug, Serialize)]
pub struct SubstationLayout {
    pub name: String,
    pub voltage_levels: Vec<VoltageLevelLayout>,
}

#[derive(Clone, Debug, Serialize)]
pub struct VoltageLevelLayout {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<String>,
    /// The level's busbars with their resolution provenance, for audit.
    pub busbars: Vec<BusbarLayout>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coupling_links: Vec<CouplingLinkLayout>,
    pub bays: Vec<BayLayout>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BusbarLayout {
    pub id: String,
    pub origin: BusbarOrigin,
}

/// A "linked via coupling bay" annotation between two busbars of the level.
#[derive(Clone, Debug, Serialize)]
pub struct CouplingLinkLayout {
    pub from: String,
    pub to: String,
    pub via_bay: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct BayLayout {
    pub name: String,
    pub is_coupling: bool,
    pub equipments: Vec<EquipmentLayout>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EquipmentLayout {
    pub name: String,
    /// SCL type code, e.g. `CBR`.
    #[serde(rename = "type")]
    pub equipment_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// Rank after the `(layer, source order)` sort within the bay.
    pub order: u32,
}

/// Post-filter counts, plus how much the filters removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub substations: usize,
    pub voltage_levels: usize,
    pub bays: usize,
    pub equipments: usize,
    /// Voltage levels dropped for carrying no non-coupling bay.
    pub excluded_voltage_levels: usize,
    /// Bays dropped for holding no equipment or for sitting in an excluded
    /// voltage level.
    pub excluded_bays: usize,
    pub findings_count: usize,
}
