//! Form-input parsing and request assembly for the diagnosis page.
//!
//! Numeric policy: any numeric field whose text fails to parse is
//! "unspecified" and left out of the payload, never zero and never NaN.
//! The one exception is age, which falls back to 0.

use super::diagnosis::DiagnosisRequest;
use super::enums::Gender;
use super::measurements::{LabResults, VitalSigns};
use super::ModelError;

/// Parse a vital or lab input. Blank, unparsable and non-finite text is
/// unspecified.
pub fn parse_measurement(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse a whole-day duration. Blank or unparsable text is unspecified.
pub fn parse_duration_days(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok()
}

/// Parse an age. Unparsable text becomes 0 for compatibility with existing
/// records, unlike every other numeric field.
pub fn parse_age(input: &str) -> u32 {
    input.trim().parse::<u32>().unwrap_or(0)
}

/// Editable state behind the diagnosis page.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisForm {
    pub patient_id: Option<String>,
    pub age: u32,
    pub gender: Gender,
    pub symptom_duration_days: Option<u32>,
    pub smoking: bool,
    pub alcohol: bool,
    symptoms: Vec<String>,
    existing_conditions: Vec<String>,
    family_history: Vec<String>,
    vital_signs: VitalSigns,
    lab_results: LabResults,
}

impl Default for DiagnosisForm {
    fn default() -> Self {
        Self {
            patient_id: None,
            age: 30,
            gender: Gender::Male,
            symptom_duration_days: Some(7),
            smoking: false,
            alcohol: false,
            symptoms: Vec::new(),
            existing_conditions: Vec::new(),
            family_history: Vec::new(),
            vital_signs: VitalSigns::default(),
            lab_results: LabResults::default(),
        }
    }
}

impl DiagnosisForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_age(&mut self, input: &str) {
        self.age = parse_age(input);
    }

    pub fn set_symptom_duration(&mut self, input: &str) {
        self.symptom_duration_days = parse_duration_days(input);
    }

    pub fn set_vital(&mut self, key: &str, input: &str) -> Result<(), ModelError> {
        self.vital_signs.set(key, parse_measurement(input))
    }

    pub fn set_lab(&mut self, key: &str, input: &str) -> Result<(), ModelError> {
        self.lab_results.set(key, parse_measurement(input))
    }

    /// Add the symptom if absent, remove it if present. Order of the
    /// remaining symptoms is preserved.
    pub fn toggle_symptom(&mut self, symptom: &str) {
        let symptom = symptom.trim();
        if symptom.is_empty() {
            return;
        }
        if let Some(pos) = self.symptoms.iter().position(|s| s == symptom) {
            self.symptoms.remove(pos);
        } else {
            self.symptoms.push(symptom.to_string());
        }
    }

    pub fn add_existing_condition(&mut self, condition: &str) {
        push_trimmed(&mut self.existing_conditions, condition);
    }

    pub fn add_family_history(&mut self, entry: &str) {
        push_trimmed(&mut self.family_history, entry);
    }

    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    pub fn vital_signs(&self) -> &VitalSigns {
        &self.vital_signs
    }

    pub fn lab_results(&self) -> &LabResults {
        &self.lab_results
    }

    /// Assemble the wire request. Panels with nothing measured are omitted.
    /// Validation happens separately, at submit time.
    pub fn to_request(&self) -> DiagnosisRequest {
        DiagnosisRequest {
            patient_id: self.patient_id.clone(),
            age: self.age,
            gender: self.gender,
            symptoms: self.symptoms.clone(),
            symptom_duration_days: self.symptom_duration_days,
            smoking: self.smoking,
            alcohol: self.alcohol,
            existing_conditions: self.existing_conditions.clone(),
            family_history: self.family_history.clone(),
            vital_signs: (!self.vital_signs.is_empty()).then(|| self.vital_signs.clone()),
            lab_results: (!self.lab_results.is_empty()).then(|| self.lab_results.clone()),
        }
    }
}

fn push_trimmed(list: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        list.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measurement_parse_policy() {
        assert_eq!(parse_measurement("98.6"), Some(98.6));
        assert_eq!(parse_measurement(" 120 "), Some(120.0));
        assert_eq!(parse_measurement(""), None);
        assert_eq!(parse_measurement("abc"), None);
        assert_eq!(parse_measurement("NaN"), None);
        assert_eq!(parse_measurement("inf"), None);
        assert_eq!(parse_measurement("0"), Some(0.0));
    }

    #[test]
    fn duration_parse_policy() {
        assert_eq!(parse_duration_days("14"), Some(14));
        assert_eq!(parse_duration_days("0"), Some(0));
        assert_eq!(parse_duration_days(""), None);
        assert_eq!(parse_duration_days("two"), None);
        assert_eq!(parse_duration_days("-3"), None);
    }

    #[test]
    fn unparsable_age_becomes_zero() {
        assert_eq!(parse_age("45"), 45);
        assert_eq!(parse_age(""), 0);
        assert_eq!(parse_age("forty"), 0);
        assert_eq!(parse_age("-1"), 0);
    }

    #[test]
    fn toggle_preserves_order() {
        let mut form = DiagnosisForm::new();
        form.toggle_symptom("fever");
        form.toggle_symptom("cough");
        form.toggle_symptom("headache");
        form.toggle_symptom("cough");
        assert_eq!(form.symptoms(), ["fever", "headache"]);
        form.toggle_symptom("  ");
        assert_eq!(form.symptoms().len(), 2);
    }

    #[test]
    fn bad_vital_input_is_omitted_not_zeroed() {
        let mut form = DiagnosisForm::new();
        form.toggle_symptom("fever");
        form.set_vital("temperature", "39.1").unwrap();
        form.set_vital("heart_rate", "fast").unwrap();
        let req = form.to_request();
        let vitals = req.vital_signs.unwrap();
        assert_eq!(vitals.temperature, Some(39.1));
        assert_eq!(vitals.heart_rate, None);
        assert!(req.lab_results.is_none());
    }

    #[test]
    fn clearing_last_vital_drops_panel() {
        let mut form = DiagnosisForm::new();
        form.set_lab("tsh", "2.5").unwrap();
        assert!(form.to_request().lab_results.is_some());
        form.set_lab("tsh", "").unwrap();
        assert!(form.to_request().lab_results.is_none());
    }

    #[test]
    fn unknown_panel_key_is_an_error() {
        let mut form = DiagnosisForm::new();
        assert!(form.set_lab("ferritin", "40").is_err());
    }

    #[test]
    fn blank_duration_is_unspecified_in_request() {
        let mut form = DiagnosisForm::new();
        assert_eq!(form.to_request().symptom_duration_days, Some(7));
        form.set_symptom_duration("");
        assert_eq!(form.to_request().symptom_duration_days, None);
    }

    #[test]
    fn history_lists_keep_duplicates() {
        let mut form = DiagnosisForm::new();
        form.add_existing_condition("asthma");
        form.add_existing_condition("asthma");
        form.add_family_history("diabetes");
        form.add_family_history("");
        let req = form.to_request();
        assert_eq!(req.existing_conditions, vec!["asthma", "asthma"]);
        assert_eq!(req.family_history, vec!["diabetes"]);
    }
}
