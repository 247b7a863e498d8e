use crate::errors::{ForecastError, ForecastResult};
use serde::{Deserialize, Serialize};

/// A loaded, read-only regression model.
pub trait Predictor: Send + Sync {
    /// Short name of the backing model type, e.g. `linear_regression`.
    fn kind(&self) -> &'static str;

    /// Predict one scalar per row.
    fn predict_batch(&self, rows: &[Vec<f64>]) -> ForecastResult<Vec<f64>>;
}

/// Serialized linear regression artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearRegressionArtifact {
    pub model_type: String,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

pub const LINEAR_MODEL_TYPE: &str = "linear_regression";

/// Ordinary least squares model: `intercept + sum(coef_i * x_i)`.
#[derive(Debug, Clone)]
pub struct LinearRegressionModel {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearRegressionModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    /// Build a model from a deserialized artifact, rejecting anything that
    /// is not a usable linear regression.
    pub fn from_artifact(artifact: LinearRegressionArtifact) -> Result<Self, String> {
        if artifact.model_type != LINEAR_MODEL_TYPE {
            return Err(format!(
                "expected model_type '{LINEAR_MODEL_TYPE}', found '{}'",
                artifact.model_type
            ));
        }
        if artifact.coefficients.is_empty() {
            return Err("artifact has no coefficients".to_string());
        }
        if !artifact.intercept.is_finite() || artifact.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("artifact contains non-finite parameters".to_string());
        }
        if let Some(names) = &artifact.feature_names {
            if names.len() != artifact.coefficients.len() {
                return Err(format!(
                    "artifact lists {} feature names for {} coefficients",
                    names.len(),
                    artifact.coefficients.len()
                ));
            }
        }

        Ok(Self::new(artifact.intercept, artifact.coefficients))
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    fn predict_row(&self, row: &[f64]) -> ForecastResult<f64> {
        if row.len() != self.coefficients.len() {
            return Err(ForecastError::inference(format!(
                "X has {} features, but the model is expecting {} features as input",
                row.len(),
                self.coefficients.len()
            )));
        }

        let value = self.intercept
            + row
                .iter()
                .zip(self.coefficients.iter())
                .map(|(x, w)| x * w)
                .sum::<f64>();

        if !value.is_finite() {
            return Err(ForecastError::inference("prediction is not a finite number"));
        }
        Ok(value)
    }
}

impl Predictor for LinearRegressionModel {
    fn kind(&self) -> &'static str {
        LINEAR_MODEL_TYPE
    }

    fn predict_batch(&self, rows: &[Vec<f64>]) -> ForecastResult<Vec<f64>> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }
}
