//! Structural checks on a tariff definition.
//!
//! These mirror what the tariff editing panel enforces before a catalog is
//! exported. Billing never calls them; it clamps instead.

use thiserror::Error;

use super::pricing::{EnergyPricing, EnergyRange, ExcessSurcharge, PowerPricing, ReactiveModel, Tier};
use super::Tariff;

/// A single validation failure with the offending field path.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted field path (e.g., `"energy.tiers[2].up_to"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Tariff {
    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the tariff is well formed.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.id.trim().is_empty() {
            errors.push(ValidationError::new("id", "must not be empty"));
        }
        if self.name.trim().is_empty() {
            errors.push(ValidationError::new("name", "must not be empty"));
        }
        check_price(&mut errors, "fixed_charge", self.fixed_charge);

        if let Some(power) = &self.power {
            validate_power(&mut errors, power);
        }
        validate_energy(&mut errors, &self.energy);

        if let Some(reactive) = &self.reactive
            && let ReactiveModel::Grupo3Split { split_percent } = reactive.model
            && !(0.0..=100.0).contains(&split_percent)
        {
            errors.push(ValidationError::new(
                "reactive.split_percent",
                "must be in [0, 100]",
            ));
        }

        if !(0.0..=1.0).contains(&self.tax.rate) {
            errors.push(ValidationError::new(
                "tax.rate",
                format!("must be in [0.0, 1.0] (e.g. 0.22), got {}", self.tax.rate),
            ));
        }

        errors
    }
}

fn check_price(errors: &mut Vec<ValidationError>, field: &str, value: f64) {
    if !value.is_finite() {
        errors.push(ValidationError::new(field, "must be a finite number"));
    } else if value < 0.0 {
        errors.push(ValidationError::new(field, "must be >= 0"));
    }
}

fn validate_power(errors: &mut Vec<ValidationError>, power: &PowerPricing) {
    match power {
        PowerPricing::Simple(p) => check_price(errors, "power.price_per_kw", p.price_per_kw),
        PowerPricing::FlatContracted(p) => {
            check_price(errors, "power.price_per_kw", p.price_per_kw);
            check_price(errors, "power.min_billing_factor", p.min_billing_factor);
        }
        PowerPricing::TwoBand(p) => {
            check_price(errors, "power.peak_price", p.peak_price);
            check_price(errors, "power.off_peak_price", p.off_peak_price);
            check_price(errors, "power.min_billing_factor", p.min_billing_factor);
            validate_excess(errors, &p.excess);
        }
        PowerPricing::ThreeBand(p) => {
            check_price(errors, "power.peak_price", p.peak_price);
            check_price(errors, "power.standard_price", p.standard_price);
            check_price(errors, "power.off_peak_price", p.off_peak_price);
            check_price(errors, "power.min_billing_factor", p.min_billing_factor);
            validate_excess(errors, &p.excess);
        }
        // Billing omits the section; nothing to check.
        PowerPricing::Unsupported { .. } => {}
    }
}

fn validate_excess(errors: &mut Vec<ValidationError>, excess: &ExcessSurcharge) {
    if !excess.threshold_factor.is_finite() || excess.threshold_factor < 1.0 {
        errors.push(ValidationError::new(
            "power.excess.threshold_factor",
            "must be >= 1",
        ));
    }
    check_price(errors, "power.excess.step1_multiplier", excess.step1_multiplier);
    check_price(errors, "power.excess.step2_multiplier", excess.step2_multiplier);
}

fn validate_energy(errors: &mut Vec<ValidationError>, energy: &EnergyPricing) {
    match energy {
        EnergyPricing::Tiered(t) => validate_tiers(errors, &t.tiers),
        EnergyPricing::AbsoluteRange(r) => validate_ranges(errors, &r.ranges),
        EnergyPricing::TimeOfDay(e) => {
            check_price(errors, "energy.peak_price", e.peak_price);
            check_price(errors, "energy.off_peak_price", e.off_peak_price);
        }
        EnergyPricing::TripleTimeOfDay(e) => {
            check_price(errors, "energy.peak_price", e.peak_price);
            check_price(errors, "energy.standard_price", e.standard_price);
            check_price(errors, "energy.off_peak_price", e.off_peak_price);
        }
        EnergyPricing::SeasonalTimeOfDay(e) => {
            check_price(errors, "energy.business_peak_price", e.business_peak_price);
            check_price(
                errors,
                "energy.non_business_peak_price",
                e.non_business_peak_price,
            );
            check_price(errors, "energy.standard_price", e.standard_price);
            check_price(errors, "energy.off_peak_price", e.off_peak_price);
        }
        EnergyPricing::Unsupported { kind } => errors.push(ValidationError::new(
            "energy.type",
            format!("unsupported energy pricing type \"{kind}\""),
        )),
    }
}

fn validate_tiers(errors: &mut Vec<ValidationError>, tiers: &[Tier]) {
    if tiers.is_empty() {
        errors.push(ValidationError::new("energy.tiers", "must not be empty"));
        return;
    }

    let last = tiers.len() - 1;
    let mut prev_up_to = 0.0;
    for (i, tier) in tiers.iter().enumerate() {
        check_price(errors, &format!("energy.tiers[{i}].price"), tier.price);
        match tier.up_to {
            Some(up_to) if !up_to.is_finite() => errors.push(ValidationError::new(
                format!("energy.tiers[{i}].up_to"),
                "must be a finite number",
            )),
            Some(up_to) => {
                if up_to <= prev_up_to {
                    errors.push(ValidationError::new(
                        format!("energy.tiers[{i}].up_to"),
                        format!("must be greater than the previous bound ({prev_up_to})"),
                    ));
                }
                prev_up_to = up_to;
            }
            None if i != last => errors.push(ValidationError::new(
                format!("energy.tiers[{i}].up_to"),
                "only the last tier may be unbounded",
            )),
            None => {}
        }
    }
}

fn validate_ranges(errors: &mut Vec<ValidationError>, ranges: &[EnergyRange]) {
    if ranges.is_empty() {
        errors.push(ValidationError::new("energy.ranges", "must not be empty"));
        return;
    }

    let last = ranges.len() - 1;
    let mut prev_to: Option<f64> = None;
    for (i, range) in ranges.iter().enumerate() {
        let field = format!("energy.ranges[{i}]");
        check_price(errors, &format!("{field}.price"), range.price);
        if !range.from.is_finite() || range.from < 1.0 {
            errors.push(ValidationError::new(
                format!("{field}.from"),
                "must be a finite number >= 1",
            ));
        }
        if let Some(prev) = prev_to
            && range.from <= prev
        {
            errors.push(ValidationError::new(
                format!("{field}.from"),
                format!("must be greater than the previous range end ({prev})"),
            ));
        }
        match range.to {
            Some(to) if !to.is_finite() || to < range.from => errors.push(ValidationError::new(
                format!("{field}.to"),
                "must be a finite number >= from",
            )),
            Some(to) => prev_to = Some(to),
            None if i != last => errors.push(ValidationError::new(
                format!("{field}.to"),
                "only the last range may be unbounded",
            )),
            None => {}
        }
    }
}
