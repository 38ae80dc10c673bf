// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the `EquipmentType` enum, which represents the type of
//! a piece of conducting equipment, and helpers for the RTE disconnector
//! subtype codes.

use std::fmt::Display;

/// Represents the type of a piece of conducting equipment.
///
/// Source data carries SCL type codes (`CBR`, `DIS`, ...); codes outside the
/// primary-equipment set are mapped to [`Other`][EquipmentType::Other] rather
/// than rejected, so that unknown equipment still lands in its bay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EquipmentType {
    Busbar,
    CircuitBreaker,
    Disconnector,
    CurrentTransformer,
    VoltageTransformer,
    PowerTransformer,
    Capacitor,
    Reactor,
    Generator,
    Battery,
    Motor,
    Other,
}

impl EquipmentType {
    /// Parses an SCL type code. Unknown codes become `Other`.
    pub fn from_code(code: &str) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "BUSBAR" => EquipmentType::Busbar,
            "CBR" => EquipmentType::CircuitBreaker,
            "DIS" => EquipmentType::Disconnector,
            "CTR" => EquipmentType::CurrentTransformer,
            "VTR" => EquipmentType::VoltageTransformer,
            "PTR" => EquipmentType::PowerTransformer,
            "CAP" => EquipmentType::Capacitor,
            "REA" => EquipmentType::Reactor,
            "GEN" => EquipmentType::Generator,
            "BAT" => EquipmentType::Battery,
            "MOT" => EquipmentType::Motor,
            _ => EquipmentType::Other,
        }
    }

    /// Returns the SCL type code for this equipment type.
    pub fn code(&self) -> &'static str {
        match self {
            EquipmentType::Busbar => "BUSBAR",
            EquipmentType::CircuitBreaker => "CBR",
            EquipmentType::Disconnector => "DIS",
            EquipmentType::CurrentTransformer => "CTR",
            EquipmentType::VoltageTransformer => "VTR",
            EquipmentType::PowerTransformer => "PTR",
            EquipmentType::Capacitor => "CAP",
            EquipmentType::Reactor => "REA",
            EquipmentType::Generator => "GEN",
            EquipmentType::Battery => "BAT",
            EquipmentType::Motor => "MOT",
            EquipmentType::Other => "OTHER",
        }
    }
}

impl Display for EquipmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Extracts the busbar index from an RTE aiguillage-disconnector subtype.
///
/// `SA1` selects busbar 1, `SA2` busbar 2, and so on. A bare `SA` carries no
/// index and is not usable as busbar-inference evidence.
pub(crate) fn sa_number(subtype: &str) -> Option<u32> {
    let digits = subtype.strip_prefix("SA")?;
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Strips the trailing busbar index from a disconnector subtype, so that
/// `SA1` and `SA2` share the `SA` layer in the layout rules.
pub(crate) fn subtype_role(subtype: &str) -> &str {
    subtype.trim_end_matches(|c: char| c.is_ascii_digit())
}
