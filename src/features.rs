use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of model input columns.
pub const FEATURE_COUNT: usize = 7;

/// Model input columns, declared in training order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Temperature,
    Humidity,
    WindSpeed,
    GeneralDiffuseFlows,
    DiffuseFlows,
    Zone1Consumption,
    Zone2Consumption,
}

impl Field {
    /// All fields in column order.
    pub const ALL: [Field; FEATURE_COUNT] = [
        Field::Temperature,
        Field::Humidity,
        Field::WindSpeed,
        Field::GeneralDiffuseFlows,
        Field::DiffuseFlows,
        Field::Zone1Consumption,
        Field::Zone2Consumption,
    ];

    /// Column position in the feature row.
    pub fn column(self) -> usize {
        self as usize
    }

    /// Wire key used by the form and the JSON API.
    pub fn key(self) -> &'static str {
        match self {
            Field::Temperature => "temperature",
            Field::Humidity => "humidity",
            Field::WindSpeed => "wind_speed",
            Field::GeneralDiffuseFlows => "general_diffuse_flows",
            Field::DiffuseFlows => "diffuse_flows",
            Field::Zone1Consumption => "zone1_consumption",
            Field::Zone2Consumption => "zone2_consumption",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.key() == s)
            .ok_or_else(|| format!("Unknown field: {s}"))
    }
}

/// One model input row. Field declaration order is the training column
/// order; `to_row` is the only way to flatten it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub general_diffuse_flows: f64,
    pub diffuse_flows: f64,
    pub zone1_consumption: f64,
    pub zone2_consumption: f64,
}

impl FeatureVector {
    pub fn to_row(&self) -> [f64; FEATURE_COUNT] {
        [
            self.temperature,
            self.humidity,
            self.wind_speed,
            self.general_diffuse_flows,
            self.diffuse_flows,
            self.zone1_consumption,
            self.zone2_consumption,
        ]
    }

    pub fn get(&self, field: Field) -> f64 {
        self.to_row()[field.column()]
    }
}

/// Pack the seven readings into a feature vector. Values pass through
/// unchanged; the model was trained on raw units.
#[allow(clippy::too_many_arguments)]
pub fn assemble(
    temperature: f64,
    humidity: f64,
    wind_speed: f64,
    general_diffuse_flows: f64,
    diffuse_flows: f64,
    zone1_consumption: f64,
    zone2_consumption: f64,
) -> FeatureVector {
    FeatureVector {
        temperature,
        humidity,
        wind_speed,
        general_diffuse_flows,
        diffuse_flows,
        zone1_consumption,
        zone2_consumption,
    }
}
