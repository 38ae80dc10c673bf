// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module is only compiled when running unit tests and contains a
//! declarative builder for topology row sets, shared by the test modules of
//! all pipeline stages.

use crate::input::{
    BayRow, ConnectivityNodeRow, EquipmentRow, SubstationRow, TerminalRow, TopologyRows,
    VoltageLevelRow,
};
use crate::TopologySnapshot;

/// Builds [`TopologyRows`] for tests, handing out arena indices as it goes.
///
/// A fresh builder starts with one substation (`POSTE`) holding one 400 kV
/// voltage level named `4`, which is where [`bay`][TopologyBuilder::bay]
/// places bays. Returned indices are valid for the snapshot built from the
/// same rows, because extraction preserves row order.
pub(crate) struct TopologyBuilder {
    rows: TopologyRows,
}

impl TopologyBuilder {
    pub(crate) fn new() -> Self {
        let mut builder = TopologyBuilder {
            rows: TopologyRows::default(),
        };
        builder.substation("POSTE");
        builder.level("4", Some("400"));
        builder
    }

    pub(crate) fn substation(&mut self, name: &str) -> usize {
        let index = self.rows.substations.len();
        self.rows.substations.push(SubstationRow {
            substation_uri: format!("ss:{index}"),
            name: name.into(),
        });
        index
    }

    /// Adds a voltage level to the most recently added substation.
    pub(crate) fn level(&mut self, name: &str, voltage: Option<&str>) -> usize {
        let index = self.rows.voltage_levels.len();
        let substation_uri = self
            .rows
            .substations
            .last()
            .expect("no substation added")
            .substation_uri
            .clone();
        self.rows.voltage_levels.push(VoltageLevelRow {
            voltage_level_uri: format!("vl:{index}"),
            name: name.into(),
            voltage: voltage.map(Into::into),
            substation_uri,
        });
        index
    }

    /// Adds a bay to the default voltage level.
    pub(crate) fn bay(&mut self, name: &str) -> usize {
        self.bay_in(0, name)
    }

    pub(crate) fn bay_in(&mut self, level: usize, name: &str) -> usize {
        let index = self.rows.bays.len();
        self.rows.bays.push(BayRow {
            bay_uri: format!("bay:{index}"),
            name: name.into(),
            is_coupling: None,
            voltage_level_uri: self.rows.voltage_levels[level].voltage_level_uri.clone(),
        });
        index
    }

    /// Adds equipment to a bay; source order is the insertion order.
    pub(crate) fn equipment(&mut self, bay: usize, type_code: &str, subtype: Option<&str>) -> usize {
        let index = self.rows.equipment.len();
        self.rows.equipment.push(EquipmentRow {
            equipment_uri: format!("eq:{index}"),
            name: format!("{type_code}{index}"),
            equipment_type: type_code.into(),
            subtype: subtype.map(Into::into),
            bay_uri: self.rows.bays[bay].bay_uri.clone(),
            source_order: index as u32,
        });
        index
    }

    pub(crate) fn terminal(&mut self, equipment: usize, cn_uri: &str) -> usize {
        let index = self.rows.terminals.len();
        self.rows.terminals.push(TerminalRow {
            terminal_uri: format!("t:{index}"),
            equipment_uri: self.rows.equipment[equipment].equipment_uri.clone(),
            connectivity_node_uri: cn_uri.into(),
        });
        index
    }

    /// Declares a connectivity node up front. Once any node is declared, all
    /// terminals must reference declared nodes.
    pub(crate) fn declare_cn(&mut self, uri: &str) {
        self.rows.connectivity_nodes.push(ConnectivityNodeRow {
            connectivity_node_uri: uri.into(),
            name: None,
        });
    }

    pub(crate) fn rows(&self) -> TopologyRows {
        self.rows.clone()
    }

    pub(crate) fn snapshot(&self) -> TopologySnapshot {
        TopologySnapshot::try_new(&self.rows).expect("fixture rows are well-formed")
    }

    /// Adds a complete RTE feeder bay: an `SA<n>` busbar-selection
    /// disconnector on `busbar_cn`, a breaker, and an earthing disconnector
    /// towards the feeder stub. Returns the bay index.
    pub(crate) fn feeder_bay(&mut self, level: usize, name: &str, sa: &str, busbar_cn: &str) -> usize {
        let bay = self.bay_in(level, name);
        let sa_dis = self.equipment(bay, "DIS", Some(sa));
        let cbr = self.equipment(bay, "CBR", None);
        let st_dis = self.equipment(bay, "DIS", Some("ST"));
        self.terminal(sa_dis, busbar_cn);
        self.terminal(sa_dis, &format!("cn:{name}:mid"));
        self.terminal(cbr, &format!("cn:{name}:mid"));
        self.terminal(cbr, &format!("cn:{name}:out"));
        self.terminal(st_dis, &format!("cn:{name}:out"));
        bay
    }

    /// Adds a coupling bay linking `from_cn` and `to_cn` through two
    /// busbar-selection disconnectors and a breaker.
    pub(crate) fn coupling_bay(
        &mut self,
        level: usize,
        name: &str,
        from_sa: &str,
        from_cn: &str,
        to_sa: &str,
        to_cn: &str,
    ) -> usize {
        let bay = self.bay_in(level, name);
        let sa_from = self.equipment(bay, "DIS", Some(from_sa));
        let cbr = self.equipment(bay, "CBR", None);
        let sa_to = self.equipment(bay, "DIS", Some(to_sa));
        self.terminal(sa_from, from_cn);
        self.terminal(sa_from, &format!("cn:{name}:a"));
        self.terminal(cbr, &format!("cn:{name}:a"));
        self.terminal(cbr, &format!("cn:{name}:b"));
        self.terminal(sa_to, &format!("cn:{name}:b"));
        self.terminal(sa_to, to_cn);
        bay
    }
}
