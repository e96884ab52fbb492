//! Energy pricing strategies.
//!
//! Every strategy clamps its quantities, prices each band, and reports the
//! figures the reactive surcharge needs: the active energy and the cost of
//! the peak period.

use crate::format::{clamp_reading, format_quantity, ordinal};
use crate::tariff::{EnergyRange, SeasonalEnergy, Tier, TimeOfDayEnergy, TripleTimeOfDayEnergy};

use super::bill::Charge;

/// Result of pricing the energy of one bill.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyCharge {
    pub charges: Vec<Charge>,
    /// Sum of `charges`.
    pub total: f64,
    /// Billed active energy (kWh, clamped).
    pub active_kwh: f64,
    /// Active energy in the peak period. Schemes without time bands report
    /// the whole consumption.
    pub peak_kwh: f64,
    /// Cost of `peak_kwh`.
    pub peak_cost: f64,
}

impl EnergyCharge {
    fn without_bands(charges: Vec<Charge>, active_kwh: f64) -> Self {
        let total: f64 = charges.iter().map(|c| c.amount).sum();
        Self {
            charges,
            total,
            active_kwh,
            peak_kwh: active_kwh,
            peak_cost: total,
        }
    }
}

fn price_label(quantity: f64, price: f64) -> String {
    format!("{} kWh @ {price} $/kWh", format_quantity(quantity))
}

/// Progressive pricing over cumulative thresholds.
///
/// Each tier bills at most `up_to − previous up_to` kWh. Tiers whose bound
/// does not exceed the previous one bill nothing. Empty tiers produce no
/// line item.
///
/// # Examples
///
/// ```
/// use tariff_sim::billing::energy::tiered;
/// use tariff_sim::tariff::Tier;
///
/// let tiers = [
///     Tier { up_to: Some(100.0), price: 6.744 },
///     Tier { up_to: Some(600.0), price: 8.452 },
///     Tier { up_to: None, price: 10.539 },
/// ];
/// let e = tiered(150.0, &tiers);
/// assert_eq!(e.charges.len(), 2);
/// assert!((e.total - 1097.0).abs() < 1e-9);
/// ```
pub fn tiered(kwh: f64, tiers: &[Tier]) -> EnergyCharge {
    let kwh = clamp_reading(kwh);
    let mut remaining = kwh;
    let mut billed_up_to = 0.0_f64;
    let mut charges = Vec::new();

    for (i, tier) in tiers.iter().enumerate() {
        if remaining <= 0.0 {
            break;
        }
        let capacity = match tier.up_to {
            Some(up_to) => (up_to - billed_up_to).max(0.0),
            None => f64::INFINITY,
        };
        if let Some(up_to) = tier.up_to {
            billed_up_to = billed_up_to.max(up_to);
        }

        let quantity = remaining.min(capacity);
        if quantity <= 0.0 {
            continue;
        }
        charges.push(Charge::priced(
            format!("{} tier: {}", ordinal(i + 1), price_label(quantity, tier.price)),
            quantity,
            tier.price,
        ));
        remaining -= quantity;
    }

    if remaining > 0.0 {
        tracing::warn!(
            unbilled_kwh = remaining,
            "consumption exceeds the last bounded tier; remainder not billed"
        );
    }

    EnergyCharge::without_bands(charges, kwh)
}

/// Pricing over absolute, inclusive `[from, to]` ranges counted from 1.
///
/// A range bills `min(kwh, to) − from + 1` kWh, so `101–140` bills 40 kWh
/// once consumption reaches 140. Empty ranges produce no line item.
pub fn absolute_range(kwh: f64, ranges: &[EnergyRange]) -> EnergyCharge {
    let kwh = clamp_reading(kwh);
    let charges = ranges
        .iter()
        .filter_map(|range| {
            let upper = range.to.map_or(kwh, |to| kwh.min(to));
            let quantity = (upper - range.from + 1.0).max(0.0);
            if quantity <= 0.0 {
                return None;
            }
            let span = match range.to {
                Some(to) => format!("{}-{}", format_quantity(range.from), format_quantity(to)),
                None => format!("{}+", format_quantity(range.from)),
            };
            Some(Charge::priced(
                format!("Range {span}: {}", price_label(quantity, range.price)),
                quantity,
                range.price,
            ))
        })
        .collect();

    EnergyCharge::without_bands(charges, kwh)
}

/// Prices each `(name, kWh, price)` band uniformly, one line per band.
fn banded(bands: &[(&str, f64, f64)]) -> Vec<Charge> {
    bands
        .iter()
        .map(|&(name, kwh, price)| {
            let kwh = clamp_reading(kwh);
            Charge::priced(format!("{name}: {}", price_label(kwh, price)), kwh, price)
        })
        .collect()
}

fn from_bands(charges: Vec<Charge>, peak_bands: usize) -> EnergyCharge {
    let peak = &charges[..peak_bands.min(charges.len())];
    let peak_kwh: f64 = peak.iter().filter_map(|c| c.quantity).sum();
    let peak_cost: f64 = peak.iter().map(|c| c.amount).sum();
    EnergyCharge {
        total: charges.iter().map(|c| c.amount).sum(),
        active_kwh: charges.iter().filter_map(|c| c.quantity).sum(),
        peak_kwh,
        peak_cost,
        charges,
    }
}

/// Peak / off-peak pricing.
pub fn time_of_day(peak_kwh: f64, off_peak_kwh: f64, prices: &TimeOfDayEnergy) -> EnergyCharge {
    from_bands(
        banded(&[
            ("Peak", peak_kwh, prices.peak_price),
            ("Off-peak", off_peak_kwh, prices.off_peak_price),
        ]),
        1,
    )
}

/// Peak / standard / off-peak pricing.
pub fn triple_time_of_day(
    peak_kwh: f64,
    standard_kwh: f64,
    off_peak_kwh: f64,
    prices: &TripleTimeOfDayEnergy,
) -> EnergyCharge {
    from_bands(
        banded(&[
            ("Peak", peak_kwh, prices.peak_price),
            ("Standard", standard_kwh, prices.standard_price),
            ("Off-peak", off_peak_kwh, prices.off_peak_price),
        ]),
        1,
    )
}

/// Seasonal pricing; the peak cost covers both business and non-business
/// day peaks.
pub fn seasonal_time_of_day(
    business_peak_kwh: f64,
    non_business_peak_kwh: f64,
    standard_kwh: f64,
    off_peak_kwh: f64,
    prices: &SeasonalEnergy,
) -> EnergyCharge {
    from_bands(
        banded(&[
            ("Peak (business day)", business_peak_kwh, prices.business_peak_price),
            (
                "Peak (non-business day)",
                non_business_peak_kwh,
                prices.non_business_peak_price,
            ),
            ("Standard", standard_kwh, prices.standard_price),
            ("Off-peak", off_peak_kwh, prices.off_peak_price),
        ]),
        2,
    )
}
