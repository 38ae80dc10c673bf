// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the configuration options for the [`SldEngine`][crate::SldEngine].

use crate::layout::convention::{LayoutConvention, RteConvention};

/// The regional layout convention to apply, selected by name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConventionKind {
    /// The RTE (France) single-line-diagram representation rules.
    #[default]
    Rte,
}

impl ConventionKind {
    /// Returns the rule set for this convention.
    pub fn rules(&self) -> &'static dyn LayoutConvention {
        match self {
            ConventionKind::Rte => &RteConvention,
        }
    }
}

/// Configuration options for the `SldEngine`.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// The layout convention applied by the rule engine.
    pub convention: ConventionKind,

    /// Whether bays that look like couplers (one breaker plus
    /// disconnectors, no feeder stub) count as coupling evidence even when
    /// neither the source flag nor the bay name says so.
    pub structural_coupling_detection: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            convention: ConventionKind::default(),
            structural_coupling_detection: true,
        }
    }
}
