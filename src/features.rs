//! Feature Vector Builder
//!
//! Maps validated soil/climate measurements into the ordered numeric
//! feature vector the crop classifier was trained on. The feature order
//! is fixed by the training schema and must never change here without
//! retraining the model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical feature order from the classifier's training schema.
pub const FEATURE_ORDER: [&str; 7] = [
    "N",
    "P",
    "K",
    "temperature",
    "humidity",
    "ph",
    "rainfall",
];

/// Soil measurements for one request. N/P/K in kg/ha, pH unitless.
///
/// Fields are optional because upstream callers may submit partial
/// readings; the builder rejects anything incomplete rather than
/// imputing dataset averages.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SoilSample {
    #[serde(rename = "N")]
    pub n: Option<f64>,
    #[serde(rename = "P")]
    pub p: Option<f64>,
    #[serde(rename = "K")]
    pub k: Option<f64>,
    pub ph: Option<f64>,
}

/// Climate measurements for one request. Temperature in °C, humidity in
/// percent, rainfall in mm.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClimateSample {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub rainfall: Option<f64>,
}

/// Errors raised while assembling a feature vector
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeatureError {
    #[error("missing required feature '{0}'")]
    MissingFeature(&'static str),

    #[error("feature '{0}' is not a finite number")]
    InvalidValue(&'static str),
}

/// Ordered numeric encoding of soil + climate measurements.
///
/// Invariant: exactly the 7 values of [`FEATURE_ORDER`], all finite,
/// in schema order. Constructed fresh per request and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; 7],
}

impl FeatureVector {
    /// Build a feature vector from one soil and one climate sample.
    ///
    /// Fails if any of the 7 required measurements is absent or
    /// non-finite. No averaging or imputation: every call must supply
    /// real measurements.
    pub fn build(soil: &SoilSample, climate: &ClimateSample) -> Result<Self, FeatureError> {
        let values = [
            require("N", soil.n)?,
            require("P", soil.p)?,
            require("K", soil.k)?,
            require("temperature", climate.temperature)?,
            require("humidity", climate.humidity)?,
            require("ph", soil.ph)?,
            require("rainfall", climate.rainfall)?,
        ];

        Ok(Self { values })
    }

    /// Feature values in schema order (parallel to [`FEATURE_ORDER`]).
    pub fn as_slice(&self) -> &[f64; 7] {
        &self.values
    }

    /// Look up a single feature by schema name.
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_ORDER
            .iter()
            .position(|&f| f == name)
            .map(|i| self.values[i])
    }
}

fn require(name: &'static str, value: Option<f64>) -> Result<f64, FeatureError> {
    let v = value.ok_or(FeatureError::MissingFeature(name))?;
    if !v.is_finite() {
        return Err(FeatureError::InvalidValue(name));
    }
    Ok(v)
}
