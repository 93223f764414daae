use serde::{Deserialize, Serialize};
use std::fmt;

/// Fuel burned by the vehicle being estimated.
///
/// Names are matched exactly. Anything outside the three known fuels maps to
/// [`FuelType::Unknown`], which carries no travel emissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Gasoline,
    Diesel,
    Electric,
    #[serde(other)]
    Unknown,
}

impl FuelType {
    pub const KNOWN: [FuelType; 3] = [FuelType::Gasoline, FuelType::Diesel, FuelType::Electric];

    pub fn from_name(name: &str) -> Self {
        match name {
            "gasoline" => FuelType::Gasoline,
            "diesel" => FuelType::Diesel,
            "electric" => FuelType::Electric,
            _ => FuelType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Gasoline => "gasoline",
            FuelType::Diesel => "diesel",
            FuelType::Electric => "electric",
            FuelType::Unknown => "unknown",
        }
    }

    /// Human readable label used by the form.
    pub fn label(&self) -> &'static str {
        match self {
            FuelType::Gasoline => "Gasoline",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Unknown => "Other",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_round_trip() {
        for fuel in FuelType::KNOWN {
            assert_eq!(FuelType::from_name(fuel.as_str()), fuel);
        }
    }

    #[test]
    fn unrecognised_names_fall_back_to_unknown() {
        assert_eq!(FuelType::from_name("hydrogen"), FuelType::Unknown);
        assert_eq!(FuelType::from_name(""), FuelType::Unknown);
        // Matching is case sensitive.
        assert_eq!(FuelType::from_name("Diesel"), FuelType::Unknown);
    }

    #[test]
    fn deserializes_unknown_names() {
        let fuel: FuelType = serde_json::from_str("\"lpg\"").unwrap();
        assert_eq!(fuel, FuelType::Unknown);
        let fuel: FuelType = serde_json::from_str("\"diesel\"").unwrap();
        assert_eq!(fuel, FuelType::Diesel);
    }
}
