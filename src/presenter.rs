use crate::errors::{ForecastError, ForecastResult};
use serde::Serialize;

pub const UNIT: &str = "KW";
pub const RESULT_HEADING: &str = "Predicted Consumption (Zone 3)";
pub const FEATURE_ORDER_HINT: &str = "Please ensure input feature order matches the trained model.";
pub const MISSING_MODEL_HINT: &str = "Make sure the model artifact is present and restart the server.";

/// What the result region shows for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Presentation {
    Prediction {
        value: f64,
        display: String,
    },
    Error {
        message: String,
        hint: String,
    },
}

/// Turn a prediction outcome into something displayable.
pub fn present(outcome: &ForecastResult<f64>) -> Presentation {
    match outcome {
        Ok(value) => Presentation::Prediction {
            value: *value,
            display: format_consumption(*value),
        },
        Err(ForecastError::ModelUnavailable { reason }) => Presentation::Error {
            message: format!("Model unavailable: {reason}"),
            hint: MISSING_MODEL_HINT.to_string(),
        },
        Err(ForecastError::InferenceFailure { message }) => Presentation::Error {
            message: format!("Error during prediction: {message}"),
            hint: FEATURE_ORDER_HINT.to_string(),
        },
        Err(other) => Presentation::Error {
            message: other.to_string(),
            hint: String::new(),
        },
    }
}

impl Presentation {
    /// HTML fragment for the result region of the page.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        match self {
            Presentation::Prediction { display, .. } => {
                out.push_str("<div class=\"result-card\"><h2>");
                html_escape_into(&mut out, RESULT_HEADING);
                out.push_str("</h2><h1 class=\"prediction\">");
                html_escape_into(&mut out, display);
                out.push_str("</h1></div>");
            }
            Presentation::Error { message, hint } => {
                out.push_str("<div class=\"error\">");
                html_escape_into(&mut out, message);
                out.push_str("</div>");
                if !hint.is_empty() {
                    out.push_str("<div class=\"warning\">");
                    html_escape_into(&mut out, hint);
                    out.push_str("</div>");
                }
            }
        }
        out
    }
}

/// Format a consumption value as `12,345.68 KW`.
pub fn format_consumption(value: f64) -> String {
    format!("{} {UNIT}", group_thousands(value))
}

/// Two decimals with comma thousands separators.
pub fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // "-0.00" reads as noise
    let negative = value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    format!("{}{grouped}.{frac_part}", if negative { "-" } else { "" })
}

pub(crate) fn html_escape_into(out: &mut String, s: &str) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_separators_and_two_decimals() {
        assert_eq!(format_consumption(12345.678), "12,345.68 KW");
        assert_eq!(format_consumption(1234567.0), "1,234,567.00 KW");
        assert_eq!(format_consumption(999.994), "999.99 KW");
        assert_eq!(format_consumption(999.999), "1,000.00 KW");
        assert_eq!(format_consumption(0.0), "0.00 KW");
    }

    #[test]
    fn formats_negative_values() {
        assert_eq!(group_thousands(-1234.5), "-1,234.50");
        assert_eq!(group_thousands(-0.001), "0.00");
    }

    #[test]
    fn success_presentation() {
        let p = present(&Ok(17000.456));
        assert_eq!(
            p,
            Presentation::Prediction {
                value: 17000.456,
                display: "17,000.46 KW".to_string()
            }
        );
        assert!(p.to_html().contains("17,000.46 KW"));
        assert!(p.to_html().contains(RESULT_HEADING));
    }

    #[test]
    fn inference_failure_carries_feature_order_hint() {
        let p = present(&Err(ForecastError::inference("X has 6 features")));
        match &p {
            Presentation::Error { message, hint } => {
                assert_eq!(message, "Error during prediction: X has 6 features");
                assert_eq!(hint, FEATURE_ORDER_HINT);
            }
            other => panic!("unexpected presentation: {other:?}"),
        }
    }

    #[test]
    fn unavailable_model_is_reported_as_such() {
        let p = present(&Err(ForecastError::model_unavailable("file not found")));
        let html = p.to_html();
        assert!(html.contains("Model unavailable: file not found"));
        assert!(html.contains(MISSING_MODEL_HINT));
    }

    #[test]
    fn error_text_is_escaped() {
        let p = present(&Err(ForecastError::inference("<script>alert(\"x\")</script>")));
        let html = p.to_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"));
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_value(present(&Ok(1.0))).unwrap();
        assert_eq!(json["status"], "prediction");
        assert_eq!(json["display"], "1.00 KW");
    }
}
