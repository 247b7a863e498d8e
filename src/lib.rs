//! Library root for the `zone3_forecaster` crate
//! Predicts Zone 3 power consumption from a pre-trained regression model

// Core error handling
pub mod errors;

// Configuration & CLI
pub mod cli;
pub mod config;

// Prediction pipeline
pub mod features;
pub mod inference;
pub mod input_form;
pub mod model_loader;
pub mod presenter;

// Model backends
pub mod onnx_model;
pub mod predictor;

// Web server interface
pub mod api_errors;
pub mod web;

pub use errors::{ForecastError, ForecastResult};
pub use features::{assemble, FeatureVector, Field};
pub use inference::predict;
pub use model_loader::{load, shared_model, ModelSlot};
pub use presenter::{present, Presentation};
