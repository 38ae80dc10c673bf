// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The conversion pipeline: extraction → connectivity graph → busbar
//! resolution → validation → layout assembly.
//!
//! One invocation is a pure, synchronous batch computation over a single
//! immutable snapshot. Runs over distinct row sets share no state and may
//! execute on parallel workers without coordination.

use crate::input::TopologyRows;
use crate::layout::assemble;
use crate::layout::document::SldDocument;
use crate::resolver::resolve_busbars;
use crate::validator::validate_topology;
use crate::{ConnectivityGraph, EngineConfig, Error, TopologySnapshot};

/// The layout engine, parameterized by an [`EngineConfig`].
pub struct SldEngine {
    config: EngineConfig,
}

impl SldEngine {
    /// Creates an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        SldEngine { config }
    }

    /// Runs the full pipeline over one extraction row set.
    ///
    /// Returns an error only for input-contract violations in the rows; the
    /// heuristic and layout stages degrade instead of failing and report
    /// through the document's findings.
    pub fn generate(&self, rows: &TopologyRows) -> Result<SldDocument, Error> {
        let snapshot = TopologySnapshot::try_new(rows)?;
        let graph = ConnectivityGraph::new(&snapshot);
        let resolution = resolve_busbars(&snapshot, &graph, &self.config);
        let findings = validate_topology(&snapshot, &graph, &resolution);
        let document = assemble(&snapshot, &resolution, findings, self.config.convention.rules());

        tracing::info!(
            substations = document.statistics.substations,
            voltage_levels = document.statistics.voltage_levels,
            bays = document.statistics.bays,
            equipments = document.statistics.equipments,
            findings = document.statistics.findings_count,
            "layout generated"
        );
        Ok(document)
    }
}

/// Runs the pipeline with the default configuration (RTE convention).
pub fn generate_layout(rows: &TopologyRows) -> Result<SldDocument, Error> {
    SldEngine::new(EngineConfig::default()).generate(rows)
}
