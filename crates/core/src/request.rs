use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::EmissionsError;
use crate::fuel::FuelType;

pub const FIELD_DISTANCE: &str = "distance";
pub const FIELD_FUEL_EFFICIENCY: &str = "fuel_efficiency";
pub const FIELD_FUEL_TYPE: &str = "fuel_type";
pub const FIELD_MEAT_CONSUMPTION: &str = "meat_consumption";
pub const FIELD_LIGHTBULBS: &str = "lightbulbs";

/// A submission exactly as the client sent it.
///
/// Every field is optional so that a missing value surfaces as
/// [`EmissionsError::MissingField`] during [`EmissionsForm::validate`] rather
/// than as an opaque extractor rejection. Non-string JSON values are kept in
/// their JSON text form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionsForm {
    #[serde(default, deserialize_with = "lenient_field")]
    pub distance: Option<String>,
    #[serde(default, deserialize_with = "lenient_field")]
    pub fuel_efficiency: Option<String>,
    #[serde(default, deserialize_with = "lenient_field")]
    pub fuel_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_field")]
    pub meat_consumption: Option<String>,
    #[serde(default, deserialize_with = "lenient_field")]
    pub lightbulbs: Option<String>,
}

/// Validated calculator input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionsRequest {
    /// Kilometers traveled.
    pub distance: f64,
    /// Kilometers per liter of fuel. Never zero once validated.
    pub fuel_efficiency: f64,
    pub fuel_type: FuelType,
    /// Kilograms of meat consumed.
    pub meat_consumption: f64,
    pub lightbulb_count: u32,
}

impl EmissionsForm {
    /// Coerce every field to its typed form, failing on the first bad one.
    ///
    /// Fields are checked in form order so the reported error is stable.
    pub fn validate(&self) -> Result<EmissionsRequest, EmissionsError> {
        let distance = parse_real(FIELD_DISTANCE, self.distance.as_deref())?;
        let fuel_efficiency = parse_real(FIELD_FUEL_EFFICIENCY, self.fuel_efficiency.as_deref())?;
        if fuel_efficiency == 0.0 {
            return Err(EmissionsError::ZeroFuelEfficiency);
        }
        let fuel_type = self
            .fuel_type
            .as_deref()
            .map(FuelType::from_name)
            .ok_or(EmissionsError::MissingField {
                field: FIELD_FUEL_TYPE,
            })?;
        let meat_consumption =
            parse_real(FIELD_MEAT_CONSUMPTION, self.meat_consumption.as_deref())?;
        let lightbulb_count = parse_count(FIELD_LIGHTBULBS, self.lightbulbs.as_deref())?;

        Ok(EmissionsRequest {
            distance,
            fuel_efficiency,
            fuel_type,
            meat_consumption,
            lightbulb_count,
        })
    }
}

impl TryFrom<EmissionsForm> for EmissionsRequest {
    type Error = EmissionsError;

    fn try_from(form: EmissionsForm) -> Result<Self, Self::Error> {
        form.validate()
    }
}

impl TryFrom<&EmissionsForm> for EmissionsRequest {
    type Error = EmissionsError;

    fn try_from(form: &EmissionsForm) -> Result<Self, Self::Error> {
        form.validate()
    }
}

fn parse_real(field: &'static str, raw: Option<&str>) -> Result<f64, EmissionsError> {
    let raw = raw.ok_or(EmissionsError::MissingField { field })?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| EmissionsError::InvalidNumber {
            field,
            value: raw.to_string(),
        })?;
    if !value.is_finite() {
        return Err(EmissionsError::NonFinite { field });
    }
    Ok(value)
}

fn parse_count(field: &'static str, raw: Option<&str>) -> Result<u32, EmissionsError> {
    let raw = raw.ok_or(EmissionsError::MissingField { field })?;
    let invalid = || EmissionsError::InvalidInteger {
        field,
        value: raw.to_string(),
    };
    // Whole floats such as `2.0` or `2e0` are counts too.
    let value: f64 = raw.trim().parse().map_err(|_| invalid())?;
    let in_range = value >= 0.0 && value <= f64::from(u32::MAX);
    if !value.is_finite() || value.fract() != 0.0 || !in_range {
        return Err(invalid());
    }
    Ok(value as u32)
}

/// Accepts any value for a field and keeps its text. Strings pass through
/// as-is, anything else (numbers, booleans, arrays, objects) is kept in its
/// JSON form so validation can report it.
fn lenient_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|value| match value {
        Value::String(text) => text,
        other => other.to_string(),
    }))
}
