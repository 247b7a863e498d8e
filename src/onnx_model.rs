use crate::errors::{ForecastError, ForecastResult};
use crate::features::FEATURE_COUNT;
use crate::predictor::Predictor;
use std::path::Path;
use tract_onnx::prelude::*;

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// ONNX regression graph executed with tract.
///
/// The input is pinned to a single `f32` row of the model's column count,
/// so batches are run one row at a time.
pub struct OnnxRegressor {
    plan: OnnxPlan,
}

impl OnnxRegressor {
    pub fn load(path: &Path) -> Result<Self, String> {
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| {
                model.with_input_fact(0, f32::fact([1, FEATURE_COUNT]).into())
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| format!("invalid ONNX model: {e}"))?;

        Ok(Self { plan })
    }

    fn predict_row(&self, row: &[f64]) -> ForecastResult<f64> {
        let input: Vec<f32> = row.iter().map(|x| *x as f32).collect();
        let tensor = Tensor::from_shape(&[1, row.len()], &input)
            .map_err(|e| ForecastError::inference(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| ForecastError::inference(e.to_string()))?;

        let first = outputs
            .first()
            .ok_or_else(|| ForecastError::inference("model produced no outputs"))?;
        let view = first
            .to_array_view::<f32>()
            .map_err(|e| ForecastError::inference(e.to_string()))?;

        view.iter()
            .next()
            .map(|v| f64::from(*v))
            .ok_or_else(|| ForecastError::inference("model produced an empty output"))
    }
}

impl Predictor for OnnxRegressor {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn predict_batch(&self, rows: &[Vec<f64>]) -> ForecastResult<Vec<f64>> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn garbage_file_is_rejected_at_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a protobuf graph").unwrap();

        let err = OnnxRegressor::load(file.path()).err().unwrap();
        assert!(err.starts_with("invalid ONNX model"));
    }
}
