// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

/*!
# Substation SLD Engine

This is a library for reconstructing the electrical topology of a substation
from a semantic (RDF triple) description of its configuration, and computing
a deterministic, convention-driven single-line-diagram layout from that
topology.

The source rows come from SPARQL-shaped queries against a triple store and
carry no guarantee that the topology is fully or consistently specified. The
engine infers the missing structure (in particular which busbars a feeder
connects to) and assigns every piece of equipment an ordered position in
the substation → voltage level → bay → equipment hierarchy.

## Pipeline

Conversion is a strictly forward pipeline over one immutable snapshot:

1. [`TopologySnapshot::try_new`] turns flat query rows into typed, indexed
   records (the only stage that can fail).
2. [`ConnectivityGraph::new`] builds the undirected bipartite graph of
   equipment and connectivity nodes, with terminals as edges.
3. [`resolve_busbars`] runs a four-level cascading heuristic per voltage
   level: explicit `BUSBAR` equipment, `SA<n>` disconnector subtypes,
   coupling-bay link annotation, then a single-busbar fallback. Every
   busbar carries a [`BusbarOrigin`] provenance tag for audit.
4. [`validate_topology`] records findings (orphan nodes, open ends,
   disconnected equipment, busbar conflicts) without blocking output.
5. A [`LayoutConvention`] (the RTE rules by default) decides vertical
   layering within bays, voltage-level stacking and coupling-bay placement.
6. The assembler merges everything into the serializable [`SldDocument`]
   consumed by the rendering layer.

[`SldEngine::generate`] (or the [`generate_layout`] helper) runs the whole
pipeline. Running it twice on unchanged input produces identical output.

## What this library does not do

It performs no electrical simulation, does not validate protection or
control logic, and does not promise a *correct* topology from ambiguous
data, only a consistent, deterministic, best-effort one with auditable
fallback levels. Rendering, symbol geometry and the triple store itself are
external collaborators.
*/

mod config;
pub use config::{ConventionKind, EngineConfig};

mod engine;
pub use engine::{generate_layout, SldEngine};

mod equipment_type;
pub use equipment_type::EquipmentType;

mod error;
pub use error::Error;

mod graph;
pub use graph::ConnectivityGraph;

pub mod input;

mod layout;
pub use layout::convention::{CouplingPosition, LayoutConvention, RteConvention, UNRANKED_LAYER};
pub use layout::document::{
    BayLayout, BusbarLayout, CouplingLinkLayout, EquipmentLayout, SldDocument, Statistics,
    SubstationLayout, VoltageLevelLayout,
};

mod resolver;
pub use resolver::{
    resolve_busbars, Busbar, BusbarOrigin, BusbarResolution, CouplingLink, ResolutionLevel,
};

mod topology;
pub use topology::{
    Bay, ConnectivityNode, Equipment, Substation, Terminal, TopologySnapshot, VoltageLevel,
};

mod validator;
pub use validator::{validate_topology, Finding, FindingKind};

#[cfg(test)]
mod test_utils;
