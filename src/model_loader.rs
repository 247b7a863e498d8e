//! Loads the serialized model artifact once per process.
//!
//! A missing or corrupt artifact is not fatal: the loader returns
//! [`ModelSlot::Absent`] and every later prediction is refused with
//! `ModelUnavailable`.

use crate::onnx_model::OnnxRegressor;
use crate::predictor::{LinearRegressionArtifact, LinearRegressionModel, Predictor};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// Default artifact location, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "electricity_consumption_lr_model.json";

/// Serialization format of the artifact, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFormat {
    LinearJson,
    Onnx,
}

impl ModelFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ModelFormat::LinearJson),
            "onnx" => Some(ModelFormat::Onnx),
            _ => None,
        }
    }
}

/// Metadata describing the artifact that was loaded.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub path: PathBuf,
    pub format: ModelFormat,
    pub sha256: String,
    pub loaded_at: DateTime<Utc>,
}

/// Outcome of loading the artifact.
#[derive(Clone)]
pub enum ModelSlot {
    Loaded {
        predictor: Arc<dyn Predictor>,
        info: ArtifactInfo,
    },
    Absent {
        path: PathBuf,
        reason: String,
    },
}

impl ModelSlot {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelSlot::Loaded { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            ModelSlot::Loaded { info, .. } => &info.path,
            ModelSlot::Absent { path, .. } => path,
        }
    }

    pub fn predictor(&self) -> Option<&Arc<dyn Predictor>> {
        match self {
            ModelSlot::Loaded { predictor, .. } => Some(predictor),
            ModelSlot::Absent { .. } => None,
        }
    }

    /// Reason text shown while the model is absent.
    pub fn absence_reason(&self) -> Option<&str> {
        match self {
            ModelSlot::Loaded { .. } => None,
            ModelSlot::Absent { reason, .. } => Some(reason),
        }
    }

    /// Wrap an already constructed predictor.
    pub fn from_predictor(
        predictor: Arc<dyn Predictor>,
        path: impl Into<PathBuf>,
        format: ModelFormat,
    ) -> Self {
        ModelSlot::Loaded {
            predictor,
            info: ArtifactInfo {
                path: path.into(),
                format,
                sha256: String::new(),
                loaded_at: Utc::now(),
            },
        }
    }

    /// JSON status document for the model endpoint.
    pub fn status(&self) -> serde_json::Value {
        match self {
            ModelSlot::Loaded { predictor, info } => serde_json::json!({
                "loaded": true,
                "path": info.path.display().to_string(),
                "format": info.format,
                "kind": predictor.kind(),
                "sha256": info.sha256,
                "loaded_at": info.loaded_at.to_rfc3339(),
            }),
            ModelSlot::Absent { path, reason } => serde_json::json!({
                "loaded": false,
                "path": path.display().to_string(),
                "reason": reason,
            }),
        }
    }
}

impl fmt::Debug for ModelSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSlot::Loaded { predictor, info } => f
                .debug_struct("Loaded")
                .field("kind", &predictor.kind())
                .field("info", info)
                .finish(),
            ModelSlot::Absent { path, reason } => f
                .debug_struct("Absent")
                .field("path", path)
                .field("reason", reason)
                .finish(),
        }
    }
}

/// Load the artifact at `path`. Never panics; failures produce `Absent`.
pub fn load(path: impl AsRef<Path>) -> ModelSlot {
    let path = path.as_ref();

    match try_load(path) {
        Ok((predictor, format, sha256)) => {
            info!(
                path = %path.display(),
                format = ?format,
                kind = predictor.kind(),
                sha256 = %sha256,
                "Model loaded"
            );
            ModelSlot::Loaded {
                predictor,
                info: ArtifactInfo {
                    path: path.to_path_buf(),
                    format,
                    sha256,
                    loaded_at: Utc::now(),
                },
            }
        }
        Err(reason) => {
            warn!(path = %path.display(), reason = %reason, "Model unavailable");
            ModelSlot::Absent {
                path: path.to_path_buf(),
                reason,
            }
        }
    }
}

fn try_load(path: &Path) -> Result<(Arc<dyn Predictor>, ModelFormat, String), String> {
    let format = ModelFormat::from_path(path).ok_or_else(|| {
        format!(
            "unsupported model format for '{}' (expected .json or .onnx)",
            path.display()
        )
    })?;

    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => format!(
            "Model file not found! Please make sure '{}' is in the working directory.",
            path.display()
        ),
        _ => format!("failed to read '{}': {e}", path.display()),
    })?;

    let sha256 = format!("{:x}", Sha256::digest(&bytes));

    let predictor: Arc<dyn Predictor> = match format {
        ModelFormat::LinearJson => {
            let artifact: LinearRegressionArtifact = serde_json::from_slice(&bytes)
                .map_err(|e| format!("corrupt model artifact '{}': {e}", path.display()))?;
            let model = LinearRegressionModel::from_artifact(artifact)
                .map_err(|e| format!("corrupt model artifact '{}': {e}", path.display()))?;
            Arc::new(model)
        }
        ModelFormat::Onnx => Arc::new(OnnxRegressor::load(path)?),
    };

    Ok((predictor, format, sha256))
}

static SHARED_MODEL: OnceLock<Arc<ModelSlot>> = OnceLock::new();

/// Process-wide model, loaded on first call. Later calls return the same
/// slot and ignore `path`.
pub fn shared_model(path: impl AsRef<Path>) -> Arc<ModelSlot> {
    SHARED_MODEL
        .get_or_init(|| Arc::new(load(path)))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            ModelFormat::from_path(Path::new("model.JSON")),
            Some(ModelFormat::LinearJson)
        );
        assert_eq!(
            ModelFormat::from_path(Path::new("dir/model.onnx")),
            Some(ModelFormat::Onnx)
        );
        assert_eq!(ModelFormat::from_path(Path::new("model.pkl")), None);
        assert_eq!(ModelFormat::from_path(Path::new("model")), None);
    }

    #[test]
    fn unsupported_extension_is_absent() {
        let slot = load("electricity_consumption_lr_model.pkl");
        assert!(!slot.is_loaded());
        assert!(slot.absence_reason().unwrap().contains("unsupported model format"));
    }

    #[test]
    fn shared_model_is_loaded_once() {
        let first = shared_model("does/not/exist.json");
        let second = shared_model("some/other/path.json");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.path(), Path::new("does/not/exist.json"));
    }
}
