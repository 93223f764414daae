use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::EmissionsError;
use crate::factors::EmissionFactorTable;
use crate::fuel::FuelType;
use crate::request::EmissionsRequest;

/// Per-activity sub-totals in kg CO2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionsBreakdown {
    pub travel: f64,
    pub meat: f64,
    pub lightbulb: f64,
}

impl EmissionsBreakdown {
    pub fn total(&self) -> f64 {
        self.travel + self.meat + self.lightbulb
    }
}

/// Estimated emissions for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionsResult {
    /// Total kg CO2, always `breakdown.total()`.
    pub emissions: f64,
    pub breakdown: EmissionsBreakdown,
    pub fuel_type: FuelType,
}

/// Stateless estimator over a fixed factor table.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EmissionsCalculator {
    factors: EmissionFactorTable,
}

impl EmissionsCalculator {
    pub const fn new(factors: EmissionFactorTable) -> Self {
        Self { factors }
    }

    pub fn factors(&self) -> &EmissionFactorTable {
        &self.factors
    }

    pub fn travel_emissions(&self, request: &EmissionsRequest) -> Result<f64, EmissionsError> {
        if request.fuel_efficiency == 0.0 {
            return Err(EmissionsError::ZeroFuelEfficiency);
        }
        let liters = request.distance / request.fuel_efficiency;
        Ok(liters * self.factors.fuel_factor(request.fuel_type))
    }

    pub fn meat_emissions(&self, request: &EmissionsRequest) -> f64 {
        request.meat_consumption * self.factors.meat
    }

    pub fn lightbulb_emissions(&self, request: &EmissionsRequest) -> f64 {
        f64::from(request.lightbulb_count) * self.factors.lightbulb
    }

    /// Sum travel, meat and lightbulb emissions for `request`.
    ///
    /// Zero fuel efficiency is rejected even when the request skipped form
    /// validation, so the total is never infinite or NaN.
    pub fn calculate(&self, request: &EmissionsRequest) -> Result<EmissionsResult, EmissionsError> {
        let breakdown = EmissionsBreakdown {
            travel: self.travel_emissions(request)?,
            meat: self.meat_emissions(request),
            lightbulb: self.lightbulb_emissions(request),
        };
        let emissions = breakdown.total();
        if !emissions.is_finite() {
            return Err(EmissionsError::OutOfRange);
        }

        trace!(
            fuel = %request.fuel_type,
            travel = breakdown.travel,
            meat = breakdown.meat,
            lightbulb = breakdown.lightbulb,
            emissions,
            "estimated emissions"
        );

        Ok(EmissionsResult {
            emissions,
            breakdown,
            fuel_type: request.fuel_type,
        })
    }
}
