use crate::config::ForecasterConfig;
use crate::errors::{ForecastError, ForecastResult};
use crate::features::{Field, FeatureVector};
use crate::inference::predict;
use crate::input_form::{InputForm, FIELD_SPECS};
use crate::model_loader::{shared_model, ModelSlot};
use crate::presenter::{present, Presentation};
use crate::web::{build_router, AppState};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Top-level CLI interface for the forecaster
#[derive(Parser, Debug)]
#[command(
    name = "zone3_forecaster",
    version,
    about = "Predict Zone 3 power consumption from weather and neighbouring zone loads"
)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the prediction form and JSON API
    Serve {
        /// Host/IP to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(long)]
        port: Option<u16>,
        /// Model artifact path
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Run one prediction and print the result
    Predict(PredictArgs),

    /// List the input fields with their bounds and defaults
    Fields,
}

/// Readings for a one-shot prediction; omitted readings use the form defaults.
#[derive(Args, Debug, Default)]
pub struct PredictArgs {
    /// Model artifact path
    #[arg(long)]
    pub model: Option<PathBuf>,
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
    #[arg(long, allow_negative_numbers = true)]
    pub temperature: Option<f64>,
    #[arg(long)]
    pub humidity: Option<f64>,
    #[arg(long)]
    pub wind_speed: Option<f64>,
    #[arg(long)]
    pub general_diffuse_flows: Option<f64>,
    #[arg(long)]
    pub diffuse_flows: Option<f64>,
    #[arg(long)]
    pub zone1_consumption: Option<f64>,
    #[arg(long)]
    pub zone2_consumption: Option<f64>,
}

impl PredictArgs {
    pub fn to_form(&self) -> ForecastResult<InputForm> {
        let readings = [
            (Field::Temperature, self.temperature),
            (Field::Humidity, self.humidity),
            (Field::WindSpeed, self.wind_speed),
            (Field::GeneralDiffuseFlows, self.general_diffuse_flows),
            (Field::DiffuseFlows, self.diffuse_flows),
            (Field::Zone1Consumption, self.zone1_consumption),
            (Field::Zone2Consumption, self.zone2_consumption),
        ];
        InputForm::from_readings(readings)
    }
}

/// Execute a parsed command against the loaded configuration.
pub fn run(cli: Cli, mut config: ForecasterConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { host, port, model } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(model) = model {
                config.model_path = model;
            }
            serve(&config)
        }
        Commands::Predict(args) => {
            let path = args.model.clone().unwrap_or(config.model_path);
            let model = shared_model(&path);
            let (vector, outcome) = predict_once(&model, &args)?;
            println!("{}", render_outcome(&vector, &outcome, args.json)?);
            outcome.map(|_| ()).map_err(Into::into)
        }
        Commands::Fields => {
            println!("{}", render_fields());
            Ok(())
        }
    }
}

/// Assemble the readings and run the pipeline once. Invalid readings are
/// an error of their own; pipeline failures come back in the outcome.
pub fn predict_once(
    model: &ModelSlot,
    args: &PredictArgs,
) -> ForecastResult<(FeatureVector, ForecastResult<f64>)> {
    let vector = args.to_form()?.assemble();
    let outcome = predict(model, &vector);
    Ok((vector, outcome))
}

pub fn render_outcome(
    vector: &FeatureVector,
    outcome: &ForecastResult<f64>,
    json: bool,
) -> anyhow::Result<String> {
    let presentation = present(outcome);
    if json {
        let doc = serde_json::json!({
            "features": vector.to_row(),
            "result": presentation,
        });
        return Ok(serde_json::to_string_pretty(&doc)?);
    }

    Ok(match presentation {
        Presentation::Prediction { display, .. } => {
            format!("Predicted Consumption (Zone 3): {display}")
        }
        Presentation::Error { message, hint } if hint.is_empty() => message,
        Presentation::Error { message, hint } => format!("{message}\n{hint}"),
    })
}

pub fn render_fields() -> String {
    let mut lines = vec![format!(
        "{:<4}{:<24}{:>10}{:>10}{:>12}{:>8}",
        "col", "key", "min", "max", "default", "step"
    )];
    for spec in &FIELD_SPECS {
        let max = spec
            .max
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "{:<4}{:<24}{:>10}{:>10}{:>12}{:>8}",
            spec.field.column(),
            spec.field.key(),
            spec.min,
            max,
            spec.default,
            spec.step
        ));
    }
    lines.join("\n")
}

fn serve(config: &ForecasterConfig) -> anyhow::Result<()> {
    // Load before binding; an absent model is logged once here.
    let model = shared_model(&config.model_path);

    let model_loaded = model.is_loaded();
    let app = build_router(AppState::new(model));
    let addr = config.bind_addr();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ForecastError::io("building tokio runtime", e))?;

    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ForecastError::io(format!("binding {addr}"), e))?;
        info!(addr = %addr, model_loaded = model_loaded, "HTTP server listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| ForecastError::io("serving HTTP", e))?;
        Ok::<(), anyhow::Error>(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_loader::ModelFormat;
    use crate::predictor::LinearRegressionModel;
    use std::sync::Arc;

    #[test]
    fn parses_predict_flags_including_negative_temperature() {
        let cli = Cli::try_parse_from([
            "zone3_forecaster",
            "predict",
            "--temperature",
            "-4.5",
            "--zone1-consumption",
            "30000",
            "--json",
        ])
        .unwrap();

        let Commands::Predict(args) = cli.command else {
            panic!("expected predict command");
        };
        assert!(args.json);
        let row = args.to_form().unwrap().assemble().to_row();
        assert_eq!(row, [-4.5, 73.8, 0.08, 0.05, 0.12, 30000.0, 16128.0]);
    }

    #[test]
    fn parses_serve_overrides_and_global_config() {
        let cli = Cli::try_parse_from([
            "zone3_forecaster",
            "serve",
            "--port",
            "9000",
            "--config",
            "other.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("other.toml")));
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000), .. }));
    }

    #[test]
    fn predict_once_runs_pipeline_and_renders_text() {
        let model = ModelSlot::from_predictor(
            Arc::new(LinearRegressionModel::new(1000.0, vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 0.0])),
            "inline.json",
            ModelFormat::LinearJson,
        );
        let (vector, outcome) = predict_once(&model, &PredictArgs::default()).unwrap();
        assert_eq!(outcome.as_ref().unwrap(), &18027.5);

        let text = render_outcome(&vector, &outcome, false).unwrap();
        assert_eq!(text, "Predicted Consumption (Zone 3): 18,027.50 KW");
    }

    #[test]
    fn out_of_bound_reading_is_rejected_before_inference() {
        let model = ModelSlot::Absent {
            path: PathBuf::from("missing.json"),
            reason: "not found".to_string(),
        };
        let args = PredictArgs {
            humidity: Some(120.0),
            ..Default::default()
        };
        let err = predict_once(&model, &args).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidInput { .. }));
    }

    #[test]
    fn failure_renders_message_and_hint() {
        let vector = InputForm::new().assemble();
        let outcome = Err(ForecastError::inference("X has 7 features, but the model is expecting 5"));
        let text = render_outcome(&vector, &outcome, false).unwrap();
        assert!(text.starts_with("Error during prediction: X has 7 features"));
        assert!(text.ends_with("Please ensure input feature order matches the trained model."));

        let json = render_outcome(&vector, &outcome, true).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(doc["result"]["status"], "error");
        assert_eq!(doc["features"][5], 34055.0);
    }

    #[test]
    fn fields_table_lists_every_column() {
        let table = render_fields();
        assert_eq!(table.lines().count(), 8);
        assert!(table.contains("zone2_consumption"));
    }
}
