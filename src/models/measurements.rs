//! Vital-sign and lab panels.
//!
//! Every field is independently optional: `None` means "not measured" and is
//! left out of the JSON payload entirely, never sent as zero. Fields are also
//! addressable by their snake_case key so form inputs and spreadsheet
//! columns (`vs_<key>`, `lab_<key>`) can fill them generically.

use serde::{Deserialize, Serialize};

use super::ModelError;

macro_rules! measurement_panel {
    ($(#[$meta:meta])* $name:ident { $($field:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $(
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<f64>,
            )+
        }

        impl $name {
            /// Wire keys, in declaration order.
            pub const KEYS: &'static [&'static str] = &[$(stringify!($field)),+];

            pub fn get(&self, key: &str) -> Option<f64> {
                match key {
                    $(stringify!($field) => self.$field,)+
                    _ => None,
                }
            }

            pub fn set(&mut self, key: &str, value: Option<f64>) -> Result<(), ModelError> {
                match key {
                    $(stringify!($field) => {
                        self.$field = value;
                        Ok(())
                    })+
                    _ => Err(ModelError::UnknownMeasurement {
                        panel: stringify!($name).into(),
                        key: key.into(),
                    }),
                }
            }

            /// True when nothing in the panel was measured.
            pub fn is_empty(&self) -> bool {
                $(self.$field.is_none())&&+
            }

            /// Measured values only, in declaration order.
            pub fn measured(&self) -> Vec<(&'static str, f64)> {
                let mut out = Vec::new();
                $(
                    if let Some(value) = self.$field {
                        out.push((stringify!($field), value));
                    }
                )+
                out
            }
        }
    };
}

measurement_panel!(
    /// Bedside vital signs.
    VitalSigns {
        blood_pressure_systolic,
        blood_pressure_diastolic,
        heart_rate,
        temperature,
        respiratory_rate,
        oxygen_saturation,
        bmi,
    }
);

measurement_panel!(
    /// Laboratory panel values (CBC, glucose, lipids, renal, liver,
    /// thyroid, vitamins, electrolytes).
    LabResults {
        hemoglobin,
        wbc_count,
        rbc_count,
        platelet_count,
        blood_sugar_fasting,
        blood_sugar_pp,
        hba1c,
        cholesterol_total,
        cholesterol_hdl,
        cholesterol_ldl,
        triglycerides,
        creatinine,
        urea,
        uric_acid,
        sgot,
        sgpt,
        alkaline_phosphatase,
        bilirubin_total,
        albumin,
        tsh,
        t3,
        t4,
        vitamin_d,
        vitamin_b12,
        iron,
        calcium,
        sodium,
        potassium,
    }
);

/// Column prefix for vital signs in batch spreadsheets.
pub const VITAL_COLUMN_PREFIX: &str = "vs_";
/// Column prefix for lab values in batch spreadsheets.
pub const LAB_COLUMN_PREFIX: &str = "lab_";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_omitted_from_json() {
        let vitals = VitalSigns {
            heart_rate: Some(88.0),
            ..Default::default()
        };
        let json = serde_json::to_string(&vitals).unwrap();
        assert_eq!(json, r#"{"heart_rate":88.0}"#);
    }

    #[test]
    fn empty_panel_serializes_as_empty_object() {
        let labs = LabResults::default();
        assert!(labs.is_empty());
        assert_eq!(serde_json::to_string(&labs).unwrap(), "{}");
    }

    #[test]
    fn set_and_get_by_key() {
        let mut labs = LabResults::default();
        labs.set("hba1c", Some(6.8)).unwrap();
        labs.set("sodium", Some(139.0)).unwrap();
        assert_eq!(labs.get("hba1c"), Some(6.8));
        assert_eq!(labs.hba1c, Some(6.8));
        assert!(!labs.is_empty());
        assert_eq!(labs.measured(), vec![("hba1c", 6.8), ("sodium", 139.0)]);

        labs.set("hba1c", None).unwrap();
        assert_eq!(labs.get("hba1c"), None);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut vitals = VitalSigns::default();
        let err = vitals.set("pulse", Some(70.0)).unwrap_err();
        assert!(err.to_string().contains("pulse"));
        assert!(vitals.is_empty());
    }

    #[test]
    fn panel_sizes() {
        assert_eq!(VitalSigns::KEYS.len(), 7);
        assert_eq!(LabResults::KEYS.len(), 28);
        assert_eq!(VitalSigns::KEYS[0], "blood_pressure_systolic");
    }

    #[test]
    fn missing_keys_deserialize_as_unmeasured() {
        let vitals: VitalSigns =
            serde_json::from_str(r#"{"temperature":38.4,"bmi":null}"#).unwrap();
        assert_eq!(vitals.temperature, Some(38.4));
        assert_eq!(vitals.bmi, None);
        assert_eq!(vitals.heart_rate, None);
    }
}
