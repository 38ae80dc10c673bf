// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Input row types for the extraction adapter.
//!
//! The engine consumes the result rows of four SPARQL-shaped queries against
//! the triple store (plus an optional fifth declaring connectivity nodes up
//! front). The store itself and the query execution are external
//! collaborators; the engine only sees deserialized rows.

use serde::Deserialize;

/// Equipment rows without an explicit order sort after all ordered ones.
fn unordered() -> u32 {
    999
}

/// One row of the primary-equipment query.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentRow {
    pub equipment_uri: String,
    pub name: String,
    /// SCL type code (`CBR`, `DIS`, `BUSBAR`, ...).
    #[serde(rename = "type")]
    pub equipment_type: String,
    /// RTE subtype for disconnectors (`SA1`, `SL`, `ST`, `SS`).
    #[serde(default)]
    pub subtype: Option<String>,
    pub bay_uri: String,
    /// Document order within the source file, used for stable tie-breaks.
    #[serde(default = "unordered")]
    pub source_order: u32,
}

/// One row of the connectivity query: a terminal linking an equipment to a
/// connectivity node.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalRow {
    pub terminal_uri: String,
    pub equipment_uri: String,
    pub connectivity_node_uri: String,
}

/// One row of the containment query, bay level.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BayRow {
    pub bay_uri: String,
    pub name: String,
    /// Left unset in most source files; the extraction then falls back to
    /// the RTE name heuristic (`CBO` / `COUPL`).
    #[serde(default)]
    pub is_coupling: Option<bool>,
    pub voltage_level_uri: String,
}

/// One row of the containment query, voltage-level level.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoltageLevelRow {
    pub voltage_level_uri: String,
    pub name: String,
    /// Nominal voltage as carried by the source, e.g. `"400"` or `"225 kV"`.
    #[serde(default)]
    pub voltage: Option<String>,
    pub substation_uri: String,
}

/// One row of the containment query, substation level.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstationRow {
    pub substation_uri: String,
    pub name: String,
}

/// One row of the optional connectivity-node declaration query.
///
/// When present, these rows fix the CN universe of the snapshot, which makes
/// nodes without any terminal (orphans) observable to the validator.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityNodeRow {
    pub connectivity_node_uri: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// The complete row set of one extraction run.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyRows {
    pub substations: Vec<SubstationRow>,
    pub voltage_levels: Vec<VoltageLevelRow>,
    pub bays: Vec<BayRow>,
    pub equipment: Vec<EquipmentRow>,
    pub terminals: Vec<TerminalRow>,
    #[serde(default)]
    pub connectivity_nodes: Vec<ConnectivityNodeRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equipment_row_deserialization() {
        let row: EquipmentRow = serde_json::from_str(
            r#"{
                "equipmentUri": "urn:eq:1",
                "name": "DJ1",
                "type": "CBR",
                "bayUri": "urn:bay:1",
                "sourceOrder": 3
            }"#,
        )
        .unwrap();
        assert_eq!(row.equipment_type, "CBR");
        assert_eq!(row.subtype, None);
        assert_eq!(row.source_order, 3);
    }

    #[test]
    fn test_missing_source_order_sorts_last() {
        let row: EquipmentRow = serde_json::from_str(
            r#"{
                "equipmentUri": "urn:eq:1",
                "name": "DJ1",
                "type": "CBR",
                "bayUri": "urn:bay:1"
            }"#,
        )
        .unwrap();
        assert_eq!(row.source_order, 999);
    }

    #[test]
    fn test_rows_without_cn_declarations() {
        let rows: TopologyRows = serde_json::from_str(
            r#"{
                "substations": [],
                "voltageLevels": [],
                "bays": [],
                "equipment": [],
                "terminals": []
            }"#,
        )
        .unwrap();
        assert!(rows.connectivity_nodes.is_empty());
    }
}
