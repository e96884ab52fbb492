//! Reactive-energy surcharge.
//!
//! The surcharge grows piecewise linearly with the reactive / active energy
//! ratio. Each model fixes the two ratio thresholds, the slope of each
//! segment and the cost the resulting coefficient is applied to.

use crate::format::{clamp_reading, format_money, format_quantity, round_cents};
use crate::tariff::{ReactiveConfig, ReactiveModel};

use super::bill::{Charge, ReactiveSummary};
use super::energy::EnergyCharge;
use super::power::PowerBand;
use super::readings::ReactiveReading;

/// Energy figure a model applies its coefficient to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostBase {
    /// Whole energy charge; the ratio uses total active energy.
    TotalEnergy,
    /// Cost of the peak period; the ratio uses peak active energy.
    PeakEnergy,
}

/// Coefficient parameters of one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactiveParams {
    pub low_threshold: f64,
    pub high_threshold: f64,
    /// Slope above `low_threshold`.
    pub low_share: f64,
    /// Additional slope above `high_threshold`.
    pub high_share: f64,
    pub base: CostBase,
}

impl ReactiveModel {
    pub fn params(&self) -> ReactiveParams {
        match *self {
            Self::Grupo1 => ReactiveParams {
                low_threshold: 0.426,
                high_threshold: 0.7,
                low_share: 0.40,
                high_share: 0.60,
                base: CostBase::TotalEnergy,
            },
            Self::Grupo2 => ReactiveParams {
                low_threshold: 0.426,
                high_threshold: 0.7,
                low_share: 0.36,
                high_share: 0.64,
                base: CostBase::TotalEnergy,
            },
            Self::Grupo3 => ReactiveParams {
                low_threshold: 0.329,
                high_threshold: 0.7,
                low_share: 0.62,
                high_share: 0.38,
                base: CostBase::PeakEnergy,
            },
            Self::Grupo3Split { split_percent } => {
                let a = if split_percent.is_finite() {
                    split_percent.clamp(0.0, 100.0) / 100.0
                } else {
                    0.0
                };
                ReactiveParams {
                    low_threshold: 0.329,
                    high_threshold: 0.7,
                    low_share: a,
                    high_share: 1.0 - a,
                    base: CostBase::PeakEnergy,
                }
            }
        }
    }

    /// Whether a zero surcharge still gets a line item when the tariff does
    /// not say otherwise.
    pub fn shows_zero_by_default(&self) -> bool {
        matches!(self, Self::Grupo3 | Self::Grupo3Split { .. })
    }
}

/// Reactive over active energy; `0` when there is no active energy.
pub fn ratio(reactive_kvarh: f64, active_kwh: f64) -> f64 {
    let active = clamp_reading(active_kwh);
    if active <= 0.0 {
        return 0.0;
    }
    clamp_reading(reactive_kvarh) / active
}

/// Piecewise linear coefficient for `ratio`.
///
/// # Examples
///
/// ```
/// use tariff_sim::billing::reactive::coefficient;
/// use tariff_sim::tariff::ReactiveModel;
///
/// let c = coefficient(0.5, &ReactiveModel::Grupo1.params());
/// assert!((c - 0.0296).abs() < 1e-12);
/// ```
pub fn coefficient(ratio: f64, params: &ReactiveParams) -> f64 {
    let mut c = 0.0;
    if ratio > params.low_threshold {
        c += params.low_share * (ratio - params.low_threshold);
    }
    if ratio > params.high_threshold {
        c += params.high_share * (ratio - params.high_threshold);
    }
    c
}

/// Surcharge lines produced for one bill.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactiveCharge {
    /// Line for the energy section; `None` when suppressed at zero.
    pub energy: Option<Charge>,
    /// One line per power band when `surcharge_power` is set.
    pub power: Vec<Charge>,
    pub summary: ReactiveSummary,
}

/// Computes the reactive surcharge from the already priced energy and power.
pub fn surcharge(
    config: &ReactiveConfig,
    reading: ReactiveReading,
    energy: &EnergyCharge,
    power_bands: &[PowerBand],
) -> ReactiveCharge {
    let params = config.model.params();
    let (reactive_kvarh, active_kwh, cost_base) = match params.base {
        CostBase::TotalEnergy => (reading.kvarh, energy.active_kwh, energy.total),
        // Without a peak reactive reading the ratio is taken over the whole
        // period, then applied to the peak cost.
        CostBase::PeakEnergy => match reading.peak_kvarh {
            Some(peak_kvarh) => (peak_kvarh, energy.peak_kwh, energy.peak_cost),
            None => (reading.kvarh, energy.active_kwh, energy.peak_cost),
        },
    };
    let ratio = ratio(reactive_kvarh, active_kwh);
    let coefficient = coefficient(ratio, &params);
    let show_zero = config
        .show_zero
        .unwrap_or_else(|| config.model.shows_zero_by_default());
    let percent = format_quantity(coefficient * 100.0);

    let amount = round_cents(coefficient * cost_base);
    let energy_line = (amount != 0.0 || show_zero).then(|| {
        Charge::lump(
            format!(
                "Reactive energy surcharge ({percent}% of {})",
                format_money(cost_base)
            ),
            amount,
        )
    });

    let power_lines = if config.surcharge_power {
        power_bands
            .iter()
            .filter_map(|band| {
                let amount = round_cents(coefficient * band.metered_cost);
                (amount != 0.0 || show_zero).then(|| {
                    Charge::lump(
                        format!(
                            "Reactive surcharge on {} power ({percent}% of {})",
                            band.name.to_lowercase(),
                            format_money(band.metered_cost)
                        ),
                        amount,
                    )
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    ReactiveCharge {
        energy: energy_line,
        power: power_lines,
        summary: ReactiveSummary {
            ratio,
            coefficient,
            cost_base,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(model: ReactiveModel) -> ReactiveConfig {
        ReactiveConfig {
            model,
            always_on: false,
            surcharge_power: false,
            show_zero: None,
        }
    }

    fn flat_energy(kwh: f64, cost: f64) -> EnergyCharge {
        EnergyCharge {
            charges: vec![Charge::lump("energy", cost)],
            total: cost,
            active_kwh: kwh,
            peak_kwh: kwh,
            peak_cost: cost,
        }
    }

    fn banded_energy() -> EnergyCharge {
        EnergyCharge {
            charges: vec![Charge::lump("peak", 400.0), Charge::lump("off-peak", 600.0)],
            total: 1000.0,
            active_kwh: 1000.0,
            peak_kwh: 200.0,
            peak_cost: 400.0,
        }
    }

    fn kvarh(kvarh: f64) -> ReactiveReading {
        ReactiveReading {
            kvarh,
            peak_kvarh: None,
        }
    }

    #[test]
    fn ratio_is_zero_without_active_energy() {
        assert_eq!(ratio(50.0, 0.0), 0.0);
        assert_eq!(ratio(50.0, -3.0), 0.0);
        assert_eq!(ratio(50.0, 100.0), 0.5);
    }

    #[test]
    fn coefficient_has_two_segments() {
        let p = ReactiveModel::Grupo1.params();
        assert_eq!(coefficient(0.426, &p), 0.0);
        let at_high = 0.40 * (0.7 - 0.426);
        assert!((coefficient(0.7, &p) - at_high).abs() < 1e-12);
        let above = at_high + 0.40 * 0.1 + 0.60 * 0.1;
        assert!((coefficient(0.8, &p) - above).abs() < 1e-12);
    }

    #[test]
    fn split_model_uses_percent() {
        let p = ReactiveModel::Grupo3Split { split_percent: 25.0 }.params();
        assert_eq!(p.low_share, 0.25);
        assert_eq!(p.high_share, 0.75);
        let clamped = ReactiveModel::Grupo3Split { split_percent: 250.0 }.params();
        assert_eq!(clamped.low_share, 1.0);
        assert_eq!(clamped.high_share, 0.0);
    }

    #[test]
    fn grupo1_half_ratio_costs_2_96_percent() {
        let r = surcharge(
            &config(ReactiveModel::Grupo1),
            kvarh(500.0),
            &flat_energy(1000.0, 1000.0),
            &[],
        );
        assert_eq!(r.summary.ratio, 0.5);
        assert!((r.summary.coefficient - 0.0296).abs() < 1e-12);
        let line = r.energy.expect("surcharge line");
        assert!((line.amount - 29.60).abs() < 1e-9);
        assert_eq!(line.label, "Reactive energy surcharge (2.96% of 1000.00)");
        assert!(r.power.is_empty());
    }

    #[test]
    fn below_threshold_suppressed_for_grupo1() {
        let r = surcharge(
            &config(ReactiveModel::Grupo1),
            kvarh(400.0),
            &flat_energy(1000.0, 1000.0),
            &[],
        );
        assert_eq!(r.summary.coefficient, 0.0);
        assert!(r.energy.is_none());
    }

    #[test]
    fn below_threshold_shown_for_grupo3() {
        let r = surcharge(
            &config(ReactiveModel::Grupo3),
            kvarh(10.0),
            &banded_energy(),
            &[],
        );
        let line = r.energy.expect("zero line kept");
        assert_eq!(line.amount, 0.0);
    }

    #[test]
    fn show_zero_override_wins() {
        let mut cfg = config(ReactiveModel::Grupo3);
        cfg.show_zero = Some(false);
        let r = surcharge(&cfg, kvarh(10.0), &banded_energy(), &[]);
        assert!(r.energy.is_none());

        let mut cfg = config(ReactiveModel::Grupo2);
        cfg.show_zero = Some(true);
        let r = surcharge(&cfg, kvarh(10.0), &flat_energy(100.0, 100.0), &[]);
        assert_eq!(r.energy.map(|c| c.amount), Some(0.0));
    }

    #[test]
    fn peak_models_use_peak_figures() {
        let reading = ReactiveReading {
            kvarh: 0.0,
            peak_kvarh: Some(100.0),
        };
        let r = surcharge(&config(ReactiveModel::Grupo3), reading, &banded_energy(), &[]);
        assert_eq!(r.summary.ratio, 0.5);
        assert_eq!(r.summary.cost_base, 400.0);
        let expected = round_cents(0.62 * (0.5 - 0.329) * 400.0);
        assert_eq!(r.energy.map(|c| c.amount), Some(expected));
    }

    #[test]
    fn peak_models_without_peak_reading_use_whole_period_ratio() {
        // 150 kVArh over 1000 kWh is 0.15, below the 0.329 threshold even
        // though it exceeds the peak energy of 200 kWh by a wide margin.
        let r = surcharge(&config(ReactiveModel::Grupo3), kvarh(150.0), &banded_energy(), &[]);
        assert_eq!(r.summary.ratio, 0.15);
        assert_eq!(r.summary.coefficient, 0.0);
        assert_eq!(r.summary.cost_base, 400.0);

        let r = surcharge(&config(ReactiveModel::Grupo3), kvarh(500.0), &banded_energy(), &[]);
        let expected = round_cents(0.62 * (0.5 - 0.329) * 400.0);
        assert_eq!(r.energy.map(|c| c.amount), Some(expected));
    }

    #[test]
    fn power_bands_surcharged_when_enabled() {
        let mut cfg = config(ReactiveModel::Grupo1);
        cfg.surcharge_power = true;
        let bands = [
            PowerBand {
                name: "Peak",
                metered_cost: 1000.0,
            },
            PowerBand {
                name: "Off-peak",
                metered_cost: 0.0,
            },
        ];
        let r = surcharge(&cfg, kvarh(500.0), &flat_energy(1000.0, 1000.0), &bands);
        assert_eq!(r.power.len(), 1);
        assert!((r.power[0].amount - 29.60).abs() < 1e-9);
        assert!(r.power[0].label.starts_with("Reactive surcharge on peak power"));
    }
}
