//! TOML bill scenarios: which tariff to bill, and the readings to bill it with.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::billing::{EnergyReading, PowerReading, ReadingInput};

/// One bill to compute, parsed from TOML.
///
/// ```toml
/// tariff = "residencial_simple"
/// catalog = "data/tarifas.json"  # optional, built-in catalog otherwise
///
/// [readings.energy]
/// kind = "total"
/// kwh = 150.0
///
/// [readings.power]
/// kind = "single"
/// kw = 1.0
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BillScenario {
    /// Tariff id to select from the catalog.
    pub tariff: String,
    /// Tariff catalog JSON file; relative paths resolve against the
    /// working directory.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    pub readings: ReadingInput,
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"readings.energy.kwh"`).
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl BillScenario {
    /// The reference residential bill: 150 kWh and 1 kW on `residencial_simple`.
    pub fn residential() -> Self {
        Self {
            tariff: "residencial_simple".to_string(),
            catalog: None,
            readings: ReadingInput::simple(150.0, 1.0),
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["residential"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "residential" => Ok(Self::residential()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// The engine clamps bad readings to zero; a scenario file holding them
    /// is still rejected so typos surface before billing.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.tariff.trim().is_empty() {
            errors.push(ConfigError::new("tariff", "must not be empty"));
        }

        let r = &self.readings;
        let mut check = |field: &str, value: f64| {
            if !value.is_finite() || value < 0.0 {
                errors.push(ConfigError::new(
                    format!("readings.{field}"),
                    format!("must be a finite number >= 0, got {value}"),
                ));
            }
        };

        match r.energy {
            EnergyReading::Total { kwh } => check("energy.kwh", kwh),
            EnergyReading::TwoBand {
                peak_kwh,
                off_peak_kwh,
            } => {
                check("energy.peak_kwh", peak_kwh);
                check("energy.off_peak_kwh", off_peak_kwh);
            }
            EnergyReading::ThreeBand {
                peak_kwh,
                standard_kwh,
                off_peak_kwh,
            } => {
                check("energy.peak_kwh", peak_kwh);
                check("energy.standard_kwh", standard_kwh);
                check("energy.off_peak_kwh", off_peak_kwh);
            }
            EnergyReading::Seasonal {
                business_peak_kwh,
                non_business_peak_kwh,
                standard_kwh,
                off_peak_kwh,
            } => {
                check("energy.business_peak_kwh", business_peak_kwh);
                check("energy.non_business_peak_kwh", non_business_peak_kwh);
                check("energy.standard_kwh", standard_kwh);
                check("energy.off_peak_kwh", off_peak_kwh);
            }
        }

        match r.power {
            None => {}
            Some(PowerReading::Single { kw }) => check("power.kw", kw),
            Some(PowerReading::Contracted {
                contracted_kw,
                metered_kw,
            }) => {
                check("power.contracted_kw", contracted_kw);
                if let Some(m) = metered_kw {
                    check("power.metered_kw", m);
                }
            }
            Some(PowerReading::TwoBand { peak, off_peak }) => {
                for (name, band) in [("peak", peak), ("off_peak", off_peak)] {
                    check(&format!("power.{name}.contracted_kw"), band.contracted_kw);
                    check(&format!("power.{name}.metered_kw"), band.metered_kw);
                }
            }
            Some(PowerReading::ThreeBand {
                peak,
                standard,
                off_peak,
            }) => {
                for (name, band) in [("peak", peak), ("standard", standard), ("off_peak", off_peak)] {
                    check(&format!("power.{name}.contracted_kw"), band.contracted_kw);
                    check(&format!("power.{name}.metered_kw"), band.metered_kw);
                }
            }
        }

        if let Some(reactive) = r.reactive {
            check("reactive.kvarh", reactive.kvarh);
            if let Some(p) = reactive.peak_kvarh {
                check("reactive.peak_kvarh", p);
            }
        }

        if r.reactive_enabled && r.reactive.is_none() {
            errors.push(ConfigError::new(
                "readings.reactive",
                "required when readings.reactive_enabled is true",
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::{BandPower, ReactiveReading};

    #[test]
    fn residential_preset_valid() {
        let cfg = BillScenario::residential();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "residential should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = BillScenario::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.expect_err("unknown preset");
        assert!(e.message.contains("unknown preset"));
        assert!(BillScenario::from_preset("residential").is_ok());
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
tariff = "mc1"
catalog = "data/tarifas.json"

[readings]
reactive_enabled = true

[readings.energy]
kind = "three_band"
peak_kwh = 100.0
standard_kwh = 250.0
off_peak_kwh = 400.0

[readings.power]
kind = "three_band"
peak = { contracted_kw = 40.0, metered_kw = 42.0 }
standard = { contracted_kw = 40.0, metered_kw = 38.0 }
off_peak = { contracted_kw = 40.0, metered_kw = 20.0 }

[readings.reactive]
kvarh = 300.0
peak_kvarh = 60.0
"#;
        let cfg = BillScenario::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.tariff.as_str()), Some("mc1"));
        assert_eq!(
            cfg.as_ref().and_then(|c| c.catalog.as_deref()),
            Some(Path::new("data/tarifas.json"))
        );
        assert_eq!(
            cfg.as_ref().map(|c| c.readings.energy.kind()),
            Some("three_band")
        );
        assert!(cfg.map(|c| c.validate().is_empty()).unwrap_or(false));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
tariff = "residencial_simple"
bogus_field = true

[readings.energy]
kind = "total"
kwh = 1.0
"#;
        assert!(BillScenario::from_toml_str(toml).is_err());
    }

    #[test]
    fn missing_file_reported_as_scenario() {
        let err = BillScenario::from_toml_file(Path::new("/no/such/bill.toml"))
            .expect_err("should fail");
        assert_eq!(err.field, "scenario");
    }

    #[test]
    fn validation_catches_negative_reading() {
        let mut cfg = BillScenario::residential();
        cfg.readings.energy = EnergyReading::Total { kwh: -5.0 };
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "readings.energy.kwh"));
    }

    #[test]
    fn validation_catches_nan_band_power() {
        let mut cfg = BillScenario::residential();
        cfg.readings.power = Some(PowerReading::TwoBand {
            peak: BandPower {
                contracted_kw: 10.0,
                metered_kw: f64::NAN,
            },
            off_peak: BandPower::default(),
        });
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "readings.power.peak.metered_kw"));
    }

    #[test]
    fn validation_requires_reactive_when_enabled() {
        let mut cfg = BillScenario::residential();
        cfg.readings.reactive_enabled = true;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "readings.reactive"));

        cfg.readings = cfg.readings.with_reactive(ReactiveReading {
            kvarh: 10.0,
            peak_kvarh: None,
        });
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validation_catches_empty_tariff() {
        let mut cfg = BillScenario::residential();
        cfg.tariff = "  ".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "tariff"));
    }
}
