//! Consumption readings entered for one bill calculation.
//!
//! Each variant matches one pricing scheme of [`crate::tariff`]; the engine
//! rejects a reading whose variant does not fit the tariff. Values are taken
//! as entered; clamping happens inside the strategies.

use serde::{Deserialize, Serialize};

/// Energy consumed in the billing period, split as the tariff requires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnergyReading {
    /// Single total, for tiered and absolute-range tariffs.
    Total { kwh: f64 },
    /// Peak / off-peak.
    TwoBand { peak_kwh: f64, off_peak_kwh: f64 },
    /// Peak / standard / off-peak.
    ThreeBand {
        peak_kwh: f64,
        standard_kwh: f64,
        off_peak_kwh: f64,
    },
    /// Seasonal schedule with the peak split by business day.
    Seasonal {
        business_peak_kwh: f64,
        non_business_peak_kwh: f64,
        standard_kwh: f64,
        off_peak_kwh: f64,
    },
}

impl EnergyReading {
    /// Discriminant used in error messages and reading files.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Total { .. } => "total",
            Self::TwoBand { .. } => "two_band",
            Self::ThreeBand { .. } => "three_band",
            Self::Seasonal { .. } => "seasonal",
        }
    }
}

/// Contracted and metered power for one time band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandPower {
    pub contracted_kw: f64,
    pub metered_kw: f64,
}

/// Power figures, split as the tariff requires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PowerReading {
    /// Single power figure, for simple power pricing.
    Single { kw: f64 },
    /// Contracted power, with the metered peak when known.
    Contracted {
        contracted_kw: f64,
        #[serde(default)]
        metered_kw: Option<f64>,
    },
    TwoBand { peak: BandPower, off_peak: BandPower },
    ThreeBand {
        peak: BandPower,
        standard: BandPower,
        off_peak: BandPower,
    },
}

impl PowerReading {
    /// Discriminant used in error messages and reading files.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Single { .. } => "single",
            Self::Contracted { .. } => "contracted",
            Self::TwoBand { .. } => "two_band",
            Self::ThreeBand { .. } => "three_band",
        }
    }
}

/// Reactive energy measured in the billing period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReactiveReading {
    /// Total reactive energy (kVArh).
    pub kvarh: f64,
    /// Reactive energy in the peak period, used by peak-based models.
    /// Falls back to `kvarh` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_kvarh: Option<f64>,
}

/// Everything the user entered for one calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadingInput {
    pub energy: EnergyReading,
    /// Absent power bills zero kW.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<PowerReading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactive: Option<ReactiveReading>,
    /// User toggle for tariffs whose reactive surcharge is not always on.
    #[serde(default)]
    pub reactive_enabled: bool,
}

impl ReadingInput {
    /// Readings for a residential tariff: one energy total and one power figure.
    ///
    /// # Examples
    ///
    /// ```
    /// use tariff_sim::billing::{EnergyReading, ReadingInput};
    ///
    /// let r = ReadingInput::simple(150.0, 1.0);
    /// assert_eq!(r.energy, EnergyReading::Total { kwh: 150.0 });
    /// assert!(!r.reactive_enabled);
    /// ```
    pub fn simple(kwh: f64, kw: f64) -> Self {
        Self {
            energy: EnergyReading::Total { kwh },
            power: Some(PowerReading::Single { kw }),
            reactive: None,
            reactive_enabled: false,
        }
    }

    /// Adds a reactive reading and turns the user toggle on.
    pub fn with_reactive(mut self, reactive: ReactiveReading) -> Self {
        self.reactive = Some(reactive);
        self.reactive_enabled = true;
        self
    }
}
