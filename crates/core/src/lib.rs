//! Household CO2 emissions estimate.
//!
//! Turns a form submission describing vehicle travel, meat consumption and
//! lightbulb usage into kilograms of CO2 using fixed emission factors. The
//! calculator is pure: it performs no I/O and holds no mutable state, so a
//! single instance can be shared by every request handler.

pub mod calculator;
pub mod error;
pub mod factors;
pub mod fuel;
pub mod request;

pub use calculator::{EmissionsBreakdown, EmissionsCalculator, EmissionsResult};
pub use error::EmissionsError;
pub use factors::EmissionFactorTable;
pub use fuel::FuelType;
pub use request::{EmissionsForm, EmissionsRequest};
