//! Tariff definitions as loaded from the JSON catalog.
//!
//! Field names are snake_case; the keys used by the original Spanish
//! documents (`nombre`, `cargoFijo`, `energia`, `iva`, ...) are accepted as
//! aliases so existing `tarifas.json` files load unchanged.

pub mod catalog;
pub mod pricing;
pub mod validate;

use serde::{Deserialize, Serialize};

pub use catalog::{CatalogError, TariffCatalog, TariffSummary};
pub use pricing::{
    EnergyPricing, EnergyRange, ExcessSurcharge, FlatContractedPower, PowerPricing, RangeEnergy,
    ReactiveConfig, ReactiveModel, SeasonalEnergy, SimplePower, ThreeBandPower, Tier,
    TieredEnergy, TimeOfDayEnergy, TripleTimeOfDayEnergy, TwoBandPower,
};
pub use validate::ValidationError;

/// VAT rate used when a tariff does not declare one.
pub const DEFAULT_TAX_RATE: f64 = 0.22;

/// One billing plan. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tariff {
    /// Unique identifier, used to select the tariff.
    pub id: String,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "notas", skip_serializing_if = "String::is_empty")]
    pub notes: String,
    /// Amount billed every period regardless of consumption.
    #[serde(default, alias = "cargoFijo")]
    pub fixed_charge: f64,
    #[serde(default, alias = "potencia", skip_serializing_if = "Option::is_none")]
    pub power: Option<PowerPricing>,
    #[serde(alias = "energia")]
    pub energy: EnergyPricing,
    #[serde(default, alias = "reactiva", skip_serializing_if = "Option::is_none")]
    pub reactive: Option<ReactiveConfig>,
    #[serde(default, alias = "iva")]
    pub tax: TaxConfig,
}

/// VAT rate and which charge categories it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaxConfig {
    /// Fraction in `[0, 1]`, e.g. `0.22`.
    #[serde(alias = "tasa")]
    pub rate: f64,
    #[serde(alias = "aplica")]
    pub applies: TaxApplicability,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            rate: DEFAULT_TAX_RATE,
            applies: TaxApplicability::default(),
        }
    }
}

/// Per-category taxability flags.
///
/// Defaults follow the residential rule: the fixed charge is exempt, every
/// consumption-based charge is taxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaxApplicability {
    #[serde(alias = "cargoFijo")]
    pub fixed_charge: bool,
    #[serde(alias = "potencia")]
    pub power: bool,
    #[serde(alias = "energia")]
    pub energy: bool,
    #[serde(alias = "reactiva")]
    pub reactive: bool,
}

impl Default for TaxApplicability {
    fn default() -> Self {
        Self {
            fixed_charge: false,
            power: true,
            energy: true,
            reactive: true,
        }
    }
}

impl Tariff {
    /// The residential tariff embedded in the first release of the simulator.
    pub fn residential_simple() -> Self {
        Self {
            id: "residencial_simple".to_string(),
            name: "Tarifa Residencial Simple (<= 40 kW, 230/400V)".to_string(),
            notes: "Modalidad Residencial. Potencia contratada <= 40 kW.".to_string(),
            fixed_charge: 324.9,
            power: Some(PowerPricing::Simple(SimplePower { price_per_kw: 83.2 })),
            energy: EnergyPricing::Tiered(TieredEnergy {
                tiers: vec![
                    Tier {
                        up_to: Some(100.0),
                        price: 6.744,
                    },
                    Tier {
                        up_to: Some(600.0),
                        price: 8.452,
                    },
                    Tier {
                        up_to: None,
                        price: 10.539,
                    },
                ],
            }),
            reactive: None,
            tax: TaxConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_document_keys_are_accepted() {
        let json = r#"{
            "id": "residencial_simple",
            "nombre": "Tarifa Residencial Simple",
            "cargoFijo": 324.9,
            "potencia": { "precioPorkW": 83.2 },
            "energia": {
                "tipo": "escalones",
                "escalones": [
                    { "hastaIncluye": 100, "precioPorKWh": 6.744 },
                    { "hastaIncluye": 600, "precioPorKWh": 8.452 },
                    { "hastaIncluye": null, "precioPorKWh": 10.539 }
                ]
            },
            "notas": "Modalidad Residencial.",
            "iva": { "tasa": 0.22, "aplica": { "cargoFijo": false, "potencia": true } }
        }"#;
        let t: Tariff = serde_json::from_str(json).expect("document should parse");
        assert_eq!(t.fixed_charge, 324.9);
        assert_eq!(t.tax.rate, 0.22);
        assert!(!t.tax.applies.fixed_charge);
        assert!(t.tax.applies.power);
        assert!(t.tax.applies.energy);
        assert_eq!(t.energy.kind(), "tiered");
    }

    #[test]
    fn missing_tax_uses_defaults() {
        let json = r#"{
            "id": "x",
            "name": "X",
            "energy": { "type": "time_of_day", "peak_price": 9.0, "off_peak_price": 3.0 }
        }"#;
        let t: Tariff = serde_json::from_str(json).expect("should parse");
        assert_eq!(t.tax, TaxConfig::default());
        assert_eq!(t.fixed_charge, 0.0);
        assert!(t.power.is_none());
    }

    #[test]
    fn unknown_top_level_field_rejected() {
        let json = r#"{
            "id": "x",
            "name": "X",
            "bogus": 1,
            "energy": { "type": "time_of_day", "peak_price": 9.0, "off_peak_price": 3.0 }
        }"#;
        assert!(serde_json::from_str::<Tariff>(json).is_err());
    }

    #[test]
    fn builtin_tariff_round_trips_through_json() {
        let t = Tariff::residential_simple();
        let json = serde_json::to_string(&t).expect("serialize");
        let back: Tariff = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, t);
    }
}
