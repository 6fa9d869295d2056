use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The wire spelling doubles as the serde name.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.as_str())
            }
        }
    };
}

str_enum!(Gender {
    Male => "male",
    Female => "female",
    Other => "other",
});

str_enum!(Severity {
    Mild => "Mild",
    Moderate => "Moderate",
    Severe => "Severe",
});

str_enum!(ImageType {
    Xray => "xray",
    Mri => "mri",
    Ct => "ct",
    Other => "other",
});

impl Default for Gender {
    fn default() -> Self {
        Gender::Male
    }
}

impl Default for ImageType {
    fn default() -> Self {
        ImageType::Xray
    }
}

impl ImageType {
    /// Label used when presenting findings.
    pub fn label(&self) -> &'static str {
        match self {
            ImageType::Xray => "chest X-ray",
            ImageType::Mri => "MRI scan",
            ImageType::Ct => "CT scan",
            ImageType::Other => "medical image",
        }
    }
}
