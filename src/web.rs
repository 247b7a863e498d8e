use crate::api_errors::AppError;
use crate::errors::ForecastResult;
use crate::features::{Field, FEATURE_COUNT};
use crate::inference::predict;
use crate::input_form::{FieldSpec, InputForm, FIELD_SPECS};
use crate::model_loader::ModelSlot;
use crate::presenter::{
    format_consumption, html_escape_into, present, Presentation, MISSING_MODEL_HINT, UNIT,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info_span;
use uuid::Uuid;

/// Shared, read-only server state.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ModelSlot>,
}

impl AppState {
    pub fn new(model: Arc<ModelSlot>) -> Self {
        Self { model }
    }
}

/// JSON prediction request. Omitted fields keep their defaults.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictRequest {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub general_diffuse_flows: Option<f64>,
    pub diffuse_flows: Option<f64>,
    pub zone1_consumption: Option<f64>,
    pub zone2_consumption: Option<f64>,
}

impl PredictRequest {
    fn entries(&self) -> [(Field, Option<f64>); FEATURE_COUNT] {
        [
            (Field::Temperature, self.temperature),
            (Field::Humidity, self.humidity),
            (Field::WindSpeed, self.wind_speed),
            (Field::GeneralDiffuseFlows, self.general_diffuse_flows),
            (Field::DiffuseFlows, self.diffuse_flows),
            (Field::Zone1Consumption, self.zone1_consumption),
            (Field::Zone2Consumption, self.zone2_consumption),
        ]
    }

    pub fn to_form(&self) -> ForecastResult<InputForm> {
        InputForm::from_readings(self.entries())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: f64,
    pub display: String,
    pub unit: String,
    pub features: [f64; FEATURE_COUNT],
    pub predicted_at: DateTime<Utc>,
    pub request_id: Uuid,
}

/// Build the router exposing the form page, the JSON API and health checks
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_form))
        .route("/api/predict", post(predict_json))
        .route("/api/fields", get(fields))
        .route("/api/model", get(model_status))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .with_state(state)
}

/// Assemble, invoke and present, all synchronously.
fn run_prediction(
    model: &ModelSlot,
    form: &InputForm,
) -> (Uuid, [f64; FEATURE_COUNT], ForecastResult<f64>) {
    let request_id = Uuid::new_v4();
    let span = info_span!("predict", %request_id);
    let _entered = span.enter();

    let vector = form.assemble();
    let outcome = predict(model, &vector);
    (request_id, vector.to_row(), outcome)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state.model, &InputForm::new(), None, None))
}

async fn predict_form(
    State(state): State<AppState>,
    Form(raw): Form<HashMap<String, String>>,
) -> Response {
    let mut form = InputForm::new();
    let mut errors = Vec::new();
    for field in Field::ALL {
        if let Some(text) = raw.get(field.key()) {
            if let Err(e) = form.set_text(field, text) {
                errors.push(e.to_string());
            }
        }
    }

    if !errors.is_empty() {
        let page = render_page(&state.model, &form, Some(errors.as_slice()), None);
        return (StatusCode::BAD_REQUEST, Html(page)).into_response();
    }

    let (_, _, outcome) = run_prediction(&state.model, &form);
    let presentation = present(&outcome);
    Html(render_page(&state.model, &form, None, Some(&presentation))).into_response()
}

async fn predict_json(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let Json(req) = payload?;
    let form = req.to_form()?;
    let (request_id, features, outcome) = run_prediction(&state.model, &form);
    let prediction = outcome?;

    Ok(Json(PredictResponse {
        prediction,
        display: format_consumption(prediction),
        unit: UNIT.to_string(),
        features,
        predicted_at: Utc::now(),
        request_id,
    }))
}

async fn fields() -> Json<Vec<FieldSpec>> {
    Json(FIELD_SPECS.to_vec())
}

async fn model_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.model.status())
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let ready = state.model.is_loaded();
    let code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(serde_json::json!({ "ready": ready })))
}

const STYLE: &str = "body{font-family:sans-serif;background:#f5f7f9;margin:2rem}\
.grid{display:grid;grid-template-columns:repeat(3,1fr);gap:1rem}\
label{display:block;font-weight:bold;margin-bottom:.25rem}\
button{width:100%;background:#4CAF50;color:#fff;font-size:18px;border:none;border-radius:10px;padding:10px;margin-top:1.5rem}\
.result-card{background:#fff;padding:20px;border-radius:15px;text-align:center;border-left:5px solid #4CAF50;margin-top:1.5rem}\
.prediction{color:#4CAF50;font-size:48px}\
.error{background:#fdecea;color:#b71c1c;padding:1rem;margin-top:1rem}\
.warning{background:#fff8e1;color:#8a6d00;padding:1rem;margin-top:1rem}";

/// Render the whole single-page form.
pub fn render_page(
    model: &ModelSlot,
    form: &InputForm,
    input_errors: Option<&[String]>,
    result: Option<&Presentation>,
) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    out.push_str("<title>Power Zone 3 Predictor</title><style>");
    out.push_str(STYLE);
    out.push_str("</style></head><body>");
    out.push_str("<h1>Electricity Consumption Forecaster</h1>");
    out.push_str("<p>Enter the environmental parameters and current zone loads below to predict Zone 3 usage.</p>");

    if let Some(reason) = model.absence_reason() {
        out.push_str("<div class=\"error\" id=\"model-warning\">Model unavailable: ");
        html_escape_into(&mut out, reason);
        out.push_str("</div><div class=\"warning\">");
        html_escape_into(&mut out, MISSING_MODEL_HINT);
        out.push_str("</div>");
    }

    out.push_str("<form method=\"post\" action=\"/predict\">");
    let mut section = "";
    for spec in &FIELD_SPECS {
        if spec.section != section {
            if !section.is_empty() {
                out.push_str("</div>");
            }
            section = spec.section;
            out.push_str("<h3>");
            html_escape_into(&mut out, section);
            out.push_str("</h3><div class=\"grid\">");
        }
        render_input(&mut out, spec, form.value(spec.field));
    }
    out.push_str("</div><button type=\"submit\">Predict Consumption</button></form>");

    if let Some(errors) = input_errors {
        for error in errors {
            out.push_str("<div class=\"error\">");
            html_escape_into(&mut out, error);
            out.push_str("</div>");
        }
    }

    out.push_str("<div id=\"result\">");
    if let Some(result) = result {
        out.push_str(&result.to_html());
    }
    out.push_str("</div></body></html>");
    out
}

fn render_input(out: &mut String, spec: &FieldSpec, value: f64) {
    let key = spec.field.key();
    out.push_str("<div><label for=\"");
    out.push_str(key);
    out.push_str("\">");
    html_escape_into(out, spec.label);
    out.push_str("</label>");
    out.push_str(&format!(
        "<input type=\"number\" id=\"{key}\" name=\"{key}\" value=\"{value}\" min=\"{}\" step=\"{}\"",
        spec.min, spec.step
    ));
    if let Some(max) = spec.max {
        out.push_str(&format!(" max=\"{max}\""));
    }
    out.push_str(" required></div>");
}
