use crate::errors::{ForecastError, ForecastResult};
use crate::features::{assemble, FeatureVector, Field, FEATURE_COUNT};
use serde::Serialize;

/// Bounds and presentation of one numeric input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub field: Field,
    pub label: &'static str,
    pub section: &'static str,
    pub min: f64,
    /// `None` means unbounded above.
    pub max: Option<f64>,
    pub default: f64,
    pub step: f64,
}

const ENVIRONMENT: &str = "Environmental Factors";
const OTHER_ZONES: &str = "Other Zones Consumption";

/// Field catalogue in column order.
pub const FIELD_SPECS: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec {
        field: Field::Temperature,
        label: "Temperature (°C)",
        section: ENVIRONMENT,
        min: -10.0,
        max: Some(50.0),
        default: 6.5,
        step: 0.1,
    },
    FieldSpec {
        field: Field::Humidity,
        label: "Humidity (%)",
        section: ENVIRONMENT,
        min: 0.0,
        max: Some(100.0),
        default: 73.8,
        step: 0.1,
    },
    FieldSpec {
        field: Field::WindSpeed,
        label: "Wind Speed (m/s)",
        section: ENVIRONMENT,
        min: 0.0,
        max: Some(50.0),
        default: 0.08,
        step: 0.01,
    },
    FieldSpec {
        field: Field::GeneralDiffuseFlows,
        label: "General Diffuse Flows",
        section: ENVIRONMENT,
        min: 0.0,
        max: None,
        default: 0.05,
        step: 0.01,
    },
    FieldSpec {
        field: Field::DiffuseFlows,
        label: "Diffuse Flows",
        section: ENVIRONMENT,
        min: 0.0,
        max: None,
        default: 0.12,
        step: 0.01,
    },
    FieldSpec {
        field: Field::Zone1Consumption,
        label: "Power Consumption Zone 1 (KW)",
        section: OTHER_ZONES,
        min: 0.0,
        max: None,
        default: 34055.0,
        step: 10.0,
    },
    FieldSpec {
        field: Field::Zone2Consumption,
        label: "Power Consumption Zone 2 (KW)",
        section: OTHER_ZONES,
        min: 0.0,
        max: None,
        default: 16128.0,
        step: 10.0,
    },
];

impl FieldSpec {
    pub fn of(field: Field) -> &'static FieldSpec {
        &FIELD_SPECS[field.column()]
    }

    /// Reject non-finite and out-of-bound values.
    pub fn check(&self, value: f64) -> ForecastResult<f64> {
        if !value.is_finite() {
            return Err(ForecastError::invalid_input(
                self.field.key(),
                "must be a finite number",
            ));
        }
        if value < self.min {
            return Err(ForecastError::invalid_input(
                self.field.key(),
                format!("must be at least {}", self.min),
            ));
        }
        if let Some(max) = self.max {
            if value > max {
                return Err(ForecastError::invalid_input(
                    self.field.key(),
                    format!("must be at most {max}"),
                ));
            }
        }
        Ok(value)
    }
}

/// Current value of every input, starting from the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct InputForm {
    values: [f64; FEATURE_COUNT],
}

impl InputForm {
    pub fn new() -> Self {
        Self {
            values: FIELD_SPECS.map(|spec| spec.default),
        }
    }

    /// Edit one field. An out-of-bound value is rejected and the previous
    /// value is kept.
    pub fn set(&mut self, field: Field, value: f64) -> ForecastResult<()> {
        let value = FieldSpec::of(field).check(value)?;
        self.values[field.column()] = value;
        Ok(())
    }

    /// Start from the defaults and apply the given readings. `None` keeps
    /// the default for that field.
    pub fn from_readings(
        readings: impl IntoIterator<Item = (Field, Option<f64>)>,
    ) -> ForecastResult<Self> {
        let mut form = Self::new();
        for (field, value) in readings {
            if let Some(value) = value {
                form.set(field, value)?;
            }
        }
        Ok(form)
    }

    /// Parse and apply a raw text entry, as submitted by the HTML form.
    /// Blank entries leave the field unchanged.
    pub fn set_text(&mut self, field: Field, raw: &str) -> ForecastResult<()> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(());
        }
        let value = raw
            .parse::<f64>()
            .map_err(|_| ForecastError::invalid_input(field.key(), "must be a number"))?;
        self.set(field, value)
    }

    pub fn value(&self, field: Field) -> f64 {
        self.values[field.column()]
    }

    /// Reset every field to its default.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Read the current values into a feature vector.
    pub fn assemble(&self) -> FeatureVector {
        assemble(
            self.value(Field::Temperature),
            self.value(Field::Humidity),
            self.value(Field::WindSpeed),
            self.value(Field::GeneralDiffuseFlows),
            self.value(Field::DiffuseFlows),
            self.value(Field::Zone1Consumption),
            self.value(Field::Zone2Consumption),
        )
    }
}

impl Default for InputForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_form_holds_defaults() {
        let form = InputForm::new();
        assert_eq!(
            form.assemble().to_row(),
            [6.5, 73.8, 0.08, 0.05, 0.12, 34055.0, 16128.0]
        );
    }

    #[test]
    fn catalogue_is_in_column_order() {
        for (i, spec) in FIELD_SPECS.iter().enumerate() {
            assert_eq!(spec.field.column(), i);
            assert!(spec.check(spec.default).is_ok());
        }
    }

    #[test]
    fn edit_order_does_not_change_vector_order() {
        let mut form = InputForm::new();
        form.set(Field::Zone2Consumption, 7.0).unwrap();
        form.set(Field::Temperature, 1.0).unwrap();
        form.set(Field::DiffuseFlows, 5.0).unwrap();
        form.set(Field::Humidity, 2.0).unwrap();
        form.set(Field::Zone1Consumption, 6.0).unwrap();
        form.set(Field::WindSpeed, 3.0).unwrap();
        form.set(Field::GeneralDiffuseFlows, 4.0).unwrap();

        assert_eq!(
            form.assemble().to_row(),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]
        );
    }

    #[test]
    fn out_of_bound_values_are_rejected_and_previous_value_kept() {
        let mut form = InputForm::new();

        let err = form.set(Field::Temperature, 50.5).unwrap_err();
        assert!(err.to_string().contains("at most 50"));
        assert_eq!(form.value(Field::Temperature), 6.5);

        assert!(form.set(Field::Humidity, -0.1).is_err());
        assert!(form.set(Field::WindSpeed, f64::NAN).is_err());
        assert_eq!(form.value(Field::Humidity), 73.8);
    }

    #[test]
    fn unbounded_fields_accept_large_values() {
        let mut form = InputForm::new();
        form.set(Field::Zone1Consumption, 1.0e9).unwrap();
        assert_eq!(form.value(Field::Zone1Consumption), 1.0e9);
        assert!(form.set(Field::Zone1Consumption, f64::INFINITY).is_err());
    }

    #[test]
    fn bounds_are_inclusive() {
        let mut form = InputForm::new();
        form.set(Field::Temperature, -10.0).unwrap();
        form.set(Field::Humidity, 100.0).unwrap();
        form.set(Field::DiffuseFlows, 0.0).unwrap();
    }

    #[test]
    fn text_entries_are_parsed_or_ignored_when_blank() {
        let mut form = InputForm::new();
        form.set_text(Field::WindSpeed, " 1.25 ").unwrap();
        form.set_text(Field::Humidity, "").unwrap();
        assert_eq!(form.value(Field::WindSpeed), 1.25);
        assert_eq!(form.value(Field::Humidity), 73.8);

        let err = form.set_text(Field::Humidity, "humid").unwrap_err();
        assert!(err.to_string().contains("must be a number"));

        form.reset();
        assert_eq!(form, InputForm::new());
    }
}
