use crate::errors::{ForecastError, ForecastResult};
use crate::features::FeatureVector;
use crate::model_loader::ModelSlot;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// Predict one value for an assembled feature vector.
pub fn predict(model: &ModelSlot, vector: &FeatureVector) -> ForecastResult<f64> {
    predict_row(model, &vector.to_row())
}

/// Run a single raw row as a one-row batch and return its scalar.
///
/// The row width is not checked here; a mismatch with the model is
/// reported by the predictor as an inference failure.
pub fn predict_row(model: &ModelSlot, row: &[f64]) -> ForecastResult<f64> {
    let predictor = match model {
        ModelSlot::Loaded { predictor, .. } => predictor,
        ModelSlot::Absent { reason, .. } => {
            return Err(ForecastError::model_unavailable(reason.clone()));
        }
    };

    debug!(kind = predictor.kind(), row = ?row, "Running inference");

    let batch = vec![row.to_vec()];
    let outcome = catch_unwind(AssertUnwindSafe(|| predictor.predict_batch(&batch)))
        .unwrap_or_else(|panic| Err(ForecastError::inference(panic_message(&*panic))));

    let result = outcome.and_then(|values| {
        let value = values
            .first()
            .copied()
            .ok_or_else(|| ForecastError::inference("model returned no predictions"))?;
        if !value.is_finite() {
            return Err(ForecastError::inference("prediction is not a finite number"));
        }
        Ok(value)
    });

    match &result {
        Ok(value) => info!(kind = predictor.kind(), prediction = value, "Prediction complete"),
        Err(e) => warn!(kind = predictor.kind(), error = %e, "Prediction failed"),
    }

    result
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("inference backend panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("inference backend panicked: {s}")
    } else {
        "inference backend panicked".to_string()
    }
}
