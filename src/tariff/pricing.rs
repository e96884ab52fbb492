//! Pricing configuration per billing axis: energy, power and reactive energy.
//!
//! Energy and power pricing are discriminated by a `type` field (`tipo` in
//! the original tariff documents). An unknown discriminant is kept as
//! `Unsupported { kind }` instead of failing the whole document, so the
//! billing engine can decide how fatal it is.

use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// One step of a progressive (cumulative) energy schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tier {
    /// Inclusive cumulative upper bound in kWh; `None` means unbounded.
    #[serde(default, alias = "hastaIncluye")]
    pub up_to: Option<f64>,
    /// Price per kWh billed inside this tier.
    #[serde(alias = "precioPorKWh")]
    pub price: f64,
}

/// Progressive energy pricing over cumulative thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TieredEnergy {
    #[serde(alias = "escalones")]
    pub tiers: Vec<Tier>,
}

/// One absolute consumption range, counted in whole units starting at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnergyRange {
    /// First kWh billed in this range (inclusive).
    #[serde(alias = "desde")]
    pub from: f64,
    /// Last kWh billed in this range (inclusive); `None` means unbounded.
    #[serde(default, alias = "hasta")]
    pub to: Option<f64>,
    #[serde(alias = "precioPorKWh")]
    pub price: f64,
}

/// Energy pricing over explicit `[from, to]` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeEnergy {
    #[serde(alias = "rangos")]
    pub ranges: Vec<EnergyRange>,
}

/// Two-band time-of-day energy prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeOfDayEnergy {
    pub peak_price: f64,
    pub off_peak_price: f64,
}

/// Three-band time-of-day energy prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TripleTimeOfDayEnergy {
    pub peak_price: f64,
    pub standard_price: f64,
    pub off_peak_price: f64,
}

/// Seasonal time-of-day prices with the peak split by business day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeasonalEnergy {
    pub business_peak_price: f64,
    pub non_business_peak_price: f64,
    pub standard_price: f64,
    pub off_peak_price: f64,
}

/// Energy pricing scheme of a tariff.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum EnergyPricing {
    /// `tiered` (`escalones`).
    Tiered(TieredEnergy),
    /// `absolute_range`.
    AbsoluteRange(RangeEnergy),
    /// `time_of_day`: peak / off-peak.
    TimeOfDay(TimeOfDayEnergy),
    /// `triple_time_of_day`: peak / standard / off-peak.
    TripleTimeOfDay(TripleTimeOfDayEnergy),
    /// `seasonal_time_of_day`: business peak / non-business peak / standard / off-peak.
    SeasonalTimeOfDay(SeasonalEnergy),
    /// Any discriminant this crate does not know how to bill.
    Unsupported { kind: String },
}

impl EnergyPricing {
    /// Discriminant as written in tariff documents.
    pub fn kind(&self) -> &str {
        match self {
            Self::Tiered(_) => "tiered",
            Self::AbsoluteRange(_) => "absolute_range",
            Self::TimeOfDay(_) => "time_of_day",
            Self::TripleTimeOfDay(_) => "triple_time_of_day",
            Self::SeasonalTimeOfDay(_) => "seasonal_time_of_day",
            Self::Unsupported { kind } => kind,
        }
    }
}

impl TryFrom<Value> for EnergyPricing {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let (kind, body) = split_kind(value)?;
        let Some(kind) = kind else {
            return Err(invalid("missing field `type`"));
        };
        match kind.as_str() {
            "tiered" | "escalones" => serde_json::from_value(body).map(Self::Tiered),
            "absolute_range" => serde_json::from_value(body).map(Self::AbsoluteRange),
            "time_of_day" => serde_json::from_value(body).map(Self::TimeOfDay),
            "triple_time_of_day" => serde_json::from_value(body).map(Self::TripleTimeOfDay),
            "seasonal_time_of_day" => serde_json::from_value(body).map(Self::SeasonalTimeOfDay),
            _ => Ok(Self::Unsupported { kind }),
        }
    }
}

impl Serialize for EnergyPricing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match self {
            Self::Tiered(e) => serde_json::to_value(e),
            Self::AbsoluteRange(e) => serde_json::to_value(e),
            Self::TimeOfDay(e) => serde_json::to_value(e),
            Self::TripleTimeOfDay(e) => serde_json::to_value(e),
            Self::SeasonalTimeOfDay(e) => serde_json::to_value(e),
            Self::Unsupported { .. } => Ok(Value::Object(Map::new())),
        }
        .map_err(S::Error::custom)?;
        with_kind(self.kind(), body).serialize(serializer)
    }
}

/// Escalating surcharge for metered power above the contracted power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExcessSurcharge {
    /// Step 1 covers metered power up to `contracted × threshold_factor`.
    pub threshold_factor: f64,
    /// Price multiplier for step 1.
    pub step1_multiplier: f64,
    /// Price multiplier for everything above the threshold.
    pub step2_multiplier: f64,
}

impl Default for ExcessSurcharge {
    fn default() -> Self {
        Self {
            threshold_factor: 1.3,
            step1_multiplier: 1.0,
            step2_multiplier: 3.0,
        }
    }
}

/// Single price per kW applied to the entered power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimplePower {
    #[serde(alias = "precioPorkW")]
    pub price_per_kw: f64,
}

/// Contracted power billed at one price, with a minimum-billing floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlatContractedPower {
    #[serde(alias = "precioPorkW")]
    pub price_per_kw: f64,
    /// Billed power is never below `min_billing_factor × contracted`.
    #[serde(default)]
    pub min_billing_factor: f64,
}

/// Peak / off-peak power bands with excess surcharge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TwoBandPower {
    pub peak_price: f64,
    pub off_peak_price: f64,
    #[serde(default)]
    pub min_billing_factor: f64,
    #[serde(default)]
    pub excess: ExcessSurcharge,
}

/// Peak / standard / off-peak power bands with excess surcharge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThreeBandPower {
    pub peak_price: f64,
    pub standard_price: f64,
    pub off_peak_price: f64,
    #[serde(default)]
    pub min_billing_factor: f64,
    #[serde(default)]
    pub excess: ExcessSurcharge,
}

/// Power pricing scheme of a tariff.
///
/// A power object without a discriminant is a [`PowerPricing::Simple`]
/// price, which is how the original residential documents write it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum PowerPricing {
    Simple(SimplePower),
    FlatContracted(FlatContractedPower),
    TwoBand(TwoBandPower),
    ThreeBand(ThreeBandPower),
    Unsupported { kind: String },
}

impl PowerPricing {
    /// Discriminant as written in tariff documents.
    pub fn kind(&self) -> &str {
        match self {
            Self::Simple(_) => "simple",
            Self::FlatContracted(_) => "flat_contracted",
            Self::TwoBand(_) => "two_band",
            Self::ThreeBand(_) => "three_band",
            Self::Unsupported { kind } => kind,
        }
    }

    /// Whether any band carries a positive price per kW.
    pub fn has_positive_price(&self) -> bool {
        match self {
            Self::Simple(p) => p.price_per_kw > 0.0,
            Self::FlatContracted(p) => p.price_per_kw > 0.0,
            Self::TwoBand(p) => p.peak_price > 0.0 || p.off_peak_price > 0.0,
            Self::ThreeBand(p) => {
                p.peak_price > 0.0 || p.standard_price > 0.0 || p.off_peak_price > 0.0
            }
            Self::Unsupported { .. } => false,
        }
    }
}

impl TryFrom<Value> for PowerPricing {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let (kind, body) = split_kind(value)?;
        match kind.as_deref().unwrap_or("simple") {
            "simple" => serde_json::from_value(body).map(Self::Simple),
            "flat_contracted" => serde_json::from_value(body).map(Self::FlatContracted),
            "two_band" => serde_json::from_value(body).map(Self::TwoBand),
            "three_band" => serde_json::from_value(body).map(Self::ThreeBand),
            other => Ok(Self::Unsupported {
                kind: other.to_string(),
            }),
        }
    }
}

impl Serialize for PowerPricing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match self {
            Self::Simple(p) => serde_json::to_value(p),
            Self::FlatContracted(p) => serde_json::to_value(p),
            Self::TwoBand(p) => serde_json::to_value(p),
            Self::ThreeBand(p) => serde_json::to_value(p),
            Self::Unsupported { .. } => Ok(Value::Object(Map::new())),
        }
        .map_err(S::Error::custom)?;
        with_kind(self.kind(), body).serialize(serializer)
    }
}

/// Reactive-energy coefficient model.
///
/// | model        | thresholds   | split         | cost base        |
/// |--------------|--------------|---------------|------------------|
/// | `grupo1`     | 0.426 / 0.7  | 0.40 / 0.60   | total energy     |
/// | `grupo2`     | 0.426 / 0.7  | 0.36 / 0.64   | total energy     |
/// | `grupo3`     | 0.329 / 0.7  | 0.62 / 0.38   | peak energy cost |
/// | `grupo3_2`   | 0.329 / 0.7  | A% / (100−A)% | peak energy cost |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ReactiveModel {
    Grupo1,
    Grupo2,
    Grupo3,
    #[serde(rename = "grupo3_2", alias = "grupo3.2")]
    Grupo3Split {
        /// Share of the first segment, in percent.
        split_percent: f64,
    },
}

/// Reactive surcharge configuration of a tariff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReactiveConfig {
    #[serde(flatten)]
    pub model: ReactiveModel,
    /// Billed on every calculation instead of only when the user asks.
    #[serde(default)]
    pub always_on: bool,
    /// Also surcharge each power band using its metered-power cost.
    #[serde(default)]
    pub surcharge_power: bool,
    /// Overrides whether a zero surcharge still produces a line item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_zero: Option<bool>,
}

/// Pulls the `type` (or `tipo`) discriminant out of a JSON object.
fn split_kind(value: Value) -> Result<(Option<String>, Value), serde_json::Error> {
    let Value::Object(mut map) = value else {
        return Err(invalid("expected an object"));
    };
    let raw = map.remove("type").or_else(|| map.remove("tipo"));
    let kind = match raw {
        None => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            return Err(invalid(format!(
                "`type` must be a string, got {other}"
            )));
        }
    };
    Ok((kind, Value::Object(map)))
}

fn invalid(msg: impl std::fmt::Display) -> serde_json::Error {
    <serde_json::Error as serde::de::Error>::custom(msg)
}

fn with_kind(kind: &str, body: Value) -> Value {
    let mut map = match body {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    map.insert("type".to_string(), Value::String(kind.to_string()));
    Value::Object(map)
}
