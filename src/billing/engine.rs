//! Bill orchestration: prices each section of a tariff and totals the result.

use tracing::{debug, warn};

use crate::tariff::{EnergyPricing, PowerPricing, Tariff};

use super::bill::{BillResult, BillTotals, Charge, ChargeCategory, LineItem};
use super::energy::{self, EnergyCharge};
use super::power::{self, PowerCharge};
use super::reactive;
use super::readings::{EnergyReading, PowerReading, ReadingInput};
use super::BillingError;

/// Computes the itemized bill of `tariff` for `input`.
///
/// Readings are clamped (negative or non-finite values bill as zero). A
/// missing power reading bills zero power; an unsupported power pricing
/// scheme omits the power section.
///
/// # Errors
///
/// Returns `BillingError::UnsupportedEnergyType` when the tariff's energy
/// pricing is not recognized, and `BillingError::ReadingMismatch` when a
/// reading variant does not fit the tariff's pricing scheme. No partial
/// bill is produced.
///
/// # Examples
///
/// ```
/// use tariff_sim::billing::{compute_bill, ReadingInput};
/// use tariff_sim::tariff::Tariff;
///
/// let bill = compute_bill(&Tariff::residential_simple(), &ReadingInput::simple(150.0, 1.0))
///     .expect("residential tariff is supported");
/// assert!((bill.totals.total - 1764.744).abs() < 1e-6);
/// ```
pub fn compute_bill(tariff: &Tariff, input: &ReadingInput) -> Result<BillResult, BillingError> {
    let applies = tariff.tax.applies;

    let fixed_charge = if tariff.fixed_charge.is_finite() && tariff.fixed_charge > 0.0 {
        vec![
            Charge::lump("Fixed monthly charge", tariff.fixed_charge)
                .into_item(ChargeCategory::FixedCharge, applies.fixed_charge),
        ]
    } else {
        Vec::new()
    };

    let power = match &tariff.power {
        Some(pricing)
            if matches!(pricing, PowerPricing::Unsupported { .. }) || pricing.has_positive_price() =>
        {
            price_power(pricing, input.power)?
        }
        _ => None,
    };
    let energy = price_energy(&tariff.energy, input.energy)?;

    let mut power_items: Vec<LineItem> = power
        .as_ref()
        .map(|p| {
            p.charges
                .iter()
                .cloned()
                .map(|c| c.into_item(ChargeCategory::Power, applies.power))
                .collect()
        })
        .unwrap_or_default();
    let mut energy_items: Vec<LineItem> = energy
        .charges
        .iter()
        .cloned()
        .map(|c| c.into_item(ChargeCategory::Energy, applies.energy))
        .collect();

    let mut reactive_summary = None;
    if let Some(config) = &tariff.reactive
        && (config.always_on || input.reactive_enabled)
    {
        let bands = power.as_ref().map(|p| p.bands.as_slice()).unwrap_or_default();
        let r = reactive::surcharge(
            config,
            input.reactive.unwrap_or_default(),
            &energy,
            bands,
        );
        energy_items.extend(
            r.energy
                .map(|c| c.into_item(ChargeCategory::Reactive, applies.reactive)),
        );
        power_items.extend(
            r.power
                .into_iter()
                .map(|c| c.into_item(ChargeCategory::Reactive, applies.reactive)),
        );
        reactive_summary = Some(r.summary);
    }

    let mut bill = BillResult {
        tariff_id: tariff.id.clone(),
        fixed_charge,
        power: power_items,
        energy: energy_items,
        reactive: reactive_summary,
        totals: BillTotals {
            taxable_subtotal: 0.0,
            non_taxable_subtotal: 0.0,
            tax_rate: 0.0,
            tax: 0.0,
            total: 0.0,
        },
    };
    bill.totals = totals(bill.items(), tariff.tax.rate);

    debug!(
        tariff = %tariff.id,
        items = bill.items().count(),
        total = bill.totals.total,
        "bill computed"
    );
    Ok(bill)
}

fn totals<'a>(items: impl Iterator<Item = &'a LineItem>, rate: f64) -> BillTotals {
    let (mut taxable, mut non_taxable) = (0.0, 0.0);
    for item in items {
        if item.taxable {
            taxable += item.amount;
        } else {
            non_taxable += item.amount;
        }
    }
    let tax_rate = if rate.is_finite() { rate.clamp(0.0, 1.0) } else { 0.0 };
    let tax = taxable * tax_rate;
    BillTotals {
        taxable_subtotal: taxable,
        non_taxable_subtotal: non_taxable,
        tax_rate,
        tax,
        total: taxable + non_taxable + tax,
    }
}

fn price_energy(pricing: &EnergyPricing, reading: EnergyReading) -> Result<EnergyCharge, BillingError> {
    let charge = match (pricing, reading) {
        (EnergyPricing::Unsupported { kind }, _) => {
            return Err(BillingError::UnsupportedEnergyType { kind: kind.clone() });
        }
        (EnergyPricing::Tiered(p), EnergyReading::Total { kwh }) => energy::tiered(kwh, &p.tiers),
        (EnergyPricing::AbsoluteRange(p), EnergyReading::Total { kwh }) => {
            energy::absolute_range(kwh, &p.ranges)
        }
        (
            EnergyPricing::TimeOfDay(p),
            EnergyReading::TwoBand {
                peak_kwh,
                off_peak_kwh,
            },
        ) => energy::time_of_day(peak_kwh, off_peak_kwh, p),
        (
            EnergyPricing::TripleTimeOfDay(p),
            EnergyReading::ThreeBand {
                peak_kwh,
                standard_kwh,
                off_peak_kwh,
            },
        ) => energy::triple_time_of_day(peak_kwh, standard_kwh, off_peak_kwh, p),
        (
            EnergyPricing::SeasonalTimeOfDay(p),
            EnergyReading::Seasonal {
                business_peak_kwh,
                non_business_peak_kwh,
                standard_kwh,
                off_peak_kwh,
            },
        ) => energy::seasonal_time_of_day(
            business_peak_kwh,
            non_business_peak_kwh,
            standard_kwh,
            off_peak_kwh,
            p,
        ),
        (pricing, reading) => {
            return Err(BillingError::ReadingMismatch {
                expected: expected_energy_reading(pricing),
                found: reading.kind(),
            });
        }
    };
    Ok(charge)
}

fn expected_energy_reading(pricing: &EnergyPricing) -> &'static str {
    match pricing {
        EnergyPricing::Tiered(_) | EnergyPricing::AbsoluteRange(_) => "total",
        EnergyPricing::TimeOfDay(_) => "two_band",
        EnergyPricing::TripleTimeOfDay(_) => "three_band",
        EnergyPricing::SeasonalTimeOfDay(_) => "seasonal",
        EnergyPricing::Unsupported { .. } => "none",
    }
}

/// `Ok(None)` when the power section is omitted.
fn price_power(
    pricing: &PowerPricing,
    reading: Option<PowerReading>,
) -> Result<Option<PowerCharge>, BillingError> {
    let charge = match (pricing, reading) {
        (PowerPricing::Unsupported { kind }, _) => {
            warn!(kind = %kind, "unsupported power pricing, power section omitted");
            return Ok(None);
        }
        (PowerPricing::Simple(p), None) => power::simple(0.0, p),
        (PowerPricing::Simple(p), Some(PowerReading::Single { kw })) => power::simple(kw, p),
        (PowerPricing::FlatContracted(p), None) => power::flat_contracted(0.0, None, p),
        (
            PowerPricing::FlatContracted(p),
            Some(PowerReading::Contracted {
                contracted_kw,
                metered_kw,
            }),
        ) => power::flat_contracted(contracted_kw, metered_kw, p),
        (PowerPricing::TwoBand(p), None) => power::two_band(Default::default(), Default::default(), p),
        (PowerPricing::TwoBand(p), Some(PowerReading::TwoBand { peak, off_peak })) => {
            power::two_band(peak, off_peak, p)
        }
        (PowerPricing::ThreeBand(p), None) => {
            power::three_band(Default::default(), Default::default(), Default::default(), p)
        }
        (
            PowerPricing::ThreeBand(p),
            Some(PowerReading::ThreeBand {
                peak,
                standard,
                off_peak,
            }),
        ) => power::three_band(peak, standard, off_peak, p),
        (pricing, Some(reading)) => {
            return Err(BillingError::ReadingMismatch {
                expected: expected_power_reading(pricing),
                found: reading.kind(),
            });
        }
    };
    Ok(Some(charge))
}

fn expected_power_reading(pricing: &PowerPricing) -> &'static str {
    match pricing {
        PowerPricing::Simple(_) => "single",
        PowerPricing::FlatContracted(_) => "contracted",
        PowerPricing::TwoBand(_) => "two_band",
        PowerPricing::ThreeBand(_) => "three_band",
        PowerPricing::Unsupported { .. } => "none",
    }
}
