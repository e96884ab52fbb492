//! Power pricing strategies.

use crate::format::{clamp_reading, format_quantity};
use crate::tariff::{ExcessSurcharge, FlatContractedPower, SimplePower, ThreeBandPower, TwoBandPower};

use super::bill::Charge;
use super::readings::BandPower;

/// Metered-power cost of one band, the base for the reactive power surcharge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerBand {
    pub name: &'static str,
    pub metered_cost: f64,
}

/// Result of pricing the power of one bill.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerCharge {
    pub charges: Vec<Charge>,
    /// Sum of `charges`.
    pub total: f64,
    pub bands: Vec<PowerBand>,
}

impl PowerCharge {
    fn new(charges: Vec<Charge>, bands: Vec<PowerBand>) -> Self {
        Self {
            total: charges.iter().map(|c| c.amount).sum(),
            charges,
            bands,
        }
    }
}

fn price_label(kw: f64, price: f64) -> String {
    format!("{} kW @ {price} $/kW", format_quantity(kw))
}

/// `kw × price`.
pub fn simple(kw: f64, pricing: &SimplePower) -> PowerCharge {
    let kw = clamp_reading(kw);
    let price = pricing.price_per_kw;
    PowerCharge::new(
        vec![Charge::priced(format!("Power: {}", price_label(kw, price)), kw, price)],
        vec![PowerBand {
            name: "Power",
            metered_cost: kw * price,
        }],
    )
}

/// Contracted power at one price, never below `min_billing_factor × contracted`.
///
/// Without a metered figure the contracted power itself is billed.
pub fn flat_contracted(
    contracted_kw: f64,
    metered_kw: Option<f64>,
    pricing: &FlatContractedPower,
) -> PowerCharge {
    let contracted = clamp_reading(contracted_kw);
    let metered = clamp_reading(metered_kw.unwrap_or(contracted));
    let billed = metered.max(clamp_reading(pricing.min_billing_factor) * contracted);
    let price = pricing.price_per_kw;
    PowerCharge::new(
        vec![Charge::priced(
            format!("Contracted power: {}", price_label(billed, price)),
            billed,
            price,
        )],
        vec![PowerBand {
            name: "Power",
            metered_cost: metered * price,
        }],
    )
}

/// Prices one band: base charge on the billed power, then up to two excess
/// steps when the metered power exceeds the contracted power.
fn band_with_excess(
    name: &'static str,
    reading: BandPower,
    price: f64,
    min_billing_factor: f64,
    excess: &ExcessSurcharge,
    charges: &mut Vec<Charge>,
) -> PowerBand {
    let contracted = clamp_reading(reading.contracted_kw);
    let metered = clamp_reading(reading.metered_kw);
    let billed = metered.max(clamp_reading(min_billing_factor) * contracted);
    charges.push(Charge::priced(
        format!("{name} power: {}", price_label(billed, price)),
        billed,
        price,
    ));

    if metered > contracted {
        let threshold = contracted * excess.threshold_factor.max(1.0);
        let step1 = (metered.min(threshold) - contracted).max(0.0);
        let step2 = (metered - threshold).max(0.0);
        for (step, kw, multiplier) in [
            (1, step1, excess.step1_multiplier),
            (2, step2, excess.step2_multiplier),
        ] {
            if kw > 0.0 {
                let step_price = price * multiplier;
                charges.push(Charge::priced(
                    format!(
                        "{name} excess power (step {step}): {}",
                        price_label(kw, step_price)
                    ),
                    kw,
                    step_price,
                ));
            }
        }
    }

    PowerBand {
        name,
        metered_cost: metered * price,
    }
}

/// Peak and off-peak bands, each with floor and excess surcharge.
pub fn two_band(peak: BandPower, off_peak: BandPower, pricing: &TwoBandPower) -> PowerCharge {
    let mut charges = Vec::new();
    let f = pricing.min_billing_factor;
    let bands = vec![
        band_with_excess("Peak", peak, pricing.peak_price, f, &pricing.excess, &mut charges),
        band_with_excess(
            "Off-peak",
            off_peak,
            pricing.off_peak_price,
            f,
            &pricing.excess,
            &mut charges,
        ),
    ];
    PowerCharge::new(charges, bands)
}

/// Peak, standard and off-peak bands, each with floor and excess surcharge.
pub fn three_band(
    peak: BandPower,
    standard: BandPower,
    off_peak: BandPower,
    pricing: &ThreeBandPower,
) -> PowerCharge {
    let mut charges = Vec::new();
    let f = pricing.min_billing_factor;
    let bands = vec![
        band_with_excess("Peak", peak, pricing.peak_price, f, &pricing.excess, &mut charges),
        band_with_excess(
            "Standard",
            standard,
            pricing.standard_price,
            f,
            &pricing.excess,
            &mut charges,
        ),
        band_with_excess(
            "Off-peak",
            off_peak,
            pricing.off_peak_price,
            f,
            &pricing.excess,
            &mut charges,
        ),
    ];
    PowerCharge::new(charges, bands)
}
