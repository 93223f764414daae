use serde::{Deserialize, Serialize};

use crate::fuel::FuelType;

const GASOLINE_KG_PER_LITER: f64 = 2.31;
const DIESEL_KG_PER_LITER: f64 = 2.68;
const ELECTRIC_KG_PER_LITER: f64 = 0.0;
const MEAT_KG_PER_KG: f64 = 27.0;
const LIGHTBULB_KG_PER_BULB_DAY: f64 = 0.42;

/// Emission factors in kg CO2 per unit of activity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactorTable {
    /// kg CO2 per liter of gasoline.
    pub gasoline: f64,
    /// kg CO2 per liter of diesel.
    pub diesel: f64,
    /// kg CO2 per liter-equivalent for electric vehicles.
    pub electric: f64,
    /// kg CO2 per kg of meat (average across meat types).
    pub meat: f64,
    /// kg CO2 per incandescent bulb per day.
    pub lightbulb: f64,
}

impl EmissionFactorTable {
    pub const STANDARD: Self = Self {
        gasoline: GASOLINE_KG_PER_LITER,
        diesel: DIESEL_KG_PER_LITER,
        electric: ELECTRIC_KG_PER_LITER,
        meat: MEAT_KG_PER_KG,
        lightbulb: LIGHTBULB_KG_PER_BULB_DAY,
    };

    /// Travel factor for `fuel`. Unknown fuels contribute nothing.
    pub fn fuel_factor(&self, fuel: FuelType) -> f64 {
        match fuel {
            FuelType::Gasoline => self.gasoline,
            FuelType::Diesel => self.diesel,
            FuelType::Electric => self.electric,
            FuelType::Unknown => 0.0,
        }
    }
}

impl Default for EmissionFactorTable {
    fn default() -> Self {
        Self::STANDARD
    }
}
