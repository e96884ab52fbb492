//! Itemized bill produced by [`super::compute_bill`].

use std::fmt;

use serde::Serialize;

use crate::format::{format_money, format_quantity};

/// Which tariff component a line item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeCategory {
    FixedCharge,
    Power,
    Energy,
    Reactive,
}

/// One priced quantity, before taxability is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Charge {
    pub label: String,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub amount: f64,
}

impl Charge {
    /// `quantity × unit_price`, labeled.
    pub fn priced(label: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            label: label.into(),
            quantity: Some(quantity),
            unit_price: Some(unit_price),
            amount: quantity * unit_price,
        }
    }

    /// A lump amount with no quantity breakdown.
    pub fn lump(label: impl Into<String>, amount: f64) -> Self {
        Self {
            label: label.into(),
            quantity: None,
            unit_price: None,
            amount,
        }
    }

    pub(crate) fn into_item(self, category: ChargeCategory, taxable: bool) -> LineItem {
        LineItem {
            label: self.label,
            category,
            quantity: self.quantity,
            unit_price: self.unit_price,
            amount: self.amount,
            taxable,
        }
    }
}

/// A billed line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub label: String,
    pub category: ChargeCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    pub amount: f64,
    /// Whether VAT applies to this line.
    pub taxable: bool,
}

/// How the reactive surcharge was derived, for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReactiveSummary {
    /// Reactive over active energy.
    pub ratio: f64,
    /// Fraction applied to the cost base (e.g. `0.0296`).
    pub coefficient: f64,
    /// Energy cost the coefficient was applied to.
    pub cost_base: f64,
}

/// Aggregate amounts of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BillTotals {
    pub taxable_subtotal: f64,
    pub non_taxable_subtotal: f64,
    /// Rate actually applied, after clamping to `[0, 1]`.
    pub tax_rate: f64,
    pub tax: f64,
    pub total: f64,
}

/// Itemized bill for one tariff and one set of readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillResult {
    pub tariff_id: String,
    pub fixed_charge: Vec<LineItem>,
    /// Empty when the tariff has no (supported) power component.
    pub power: Vec<LineItem>,
    /// Energy lines followed by the reactive surcharge, if any.
    pub energy: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactive: Option<ReactiveSummary>,
    pub totals: BillTotals,
}

impl BillResult {
    /// All line items in display order: fixed charge, power, energy.
    pub fn items(&self) -> impl Iterator<Item = &LineItem> {
        self.fixed_charge
            .iter()
            .chain(&self.power)
            .chain(&self.energy)
    }

    /// Sum of every line item amount.
    pub fn items_total(&self) -> f64 {
        self.items().map(|i| i.amount).sum()
    }
}

const LABEL_WIDTH: usize = 56;
const AMOUNT_WIDTH: usize = 12;

fn write_section(f: &mut fmt::Formatter<'_>, title: &str, items: &[LineItem]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(f, "{title}")?;
    for item in items {
        let mark = if item.taxable { "" } else { " *" };
        writeln!(
            f,
            "  {:<w$}{:>aw$}{mark}",
            item.label,
            format_money(item.amount),
            w = LABEL_WIDTH,
            aw = AMOUNT_WIDTH
        )?;
    }
    Ok(())
}

impl fmt::Display for BillResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Bill: {} ---", self.tariff_id)?;
        write_section(f, "Fixed charge", &self.fixed_charge)?;
        write_section(f, "Power", &self.power)?;
        write_section(f, "Energy", &self.energy)?;
        if let Some(r) = &self.reactive {
            writeln!(
                f,
                "  (reactive ratio {}, coefficient {}%)",
                format_quantity(r.ratio),
                format_quantity(r.coefficient * 100.0)
            )?;
        }
        let t = &self.totals;
        let w = LABEL_WIDTH + 2;
        writeln!(
            f,
            "{:<w$}{:>AMOUNT_WIDTH$}",
            "Taxable subtotal",
            format_money(t.taxable_subtotal)
        )?;
        writeln!(
            f,
            "{:<w$}{:>AMOUNT_WIDTH$}",
            "Non-taxable subtotal (*)",
            format_money(t.non_taxable_subtotal)
        )?;
        writeln!(
            f,
            "{:<w$}{:>AMOUNT_WIDTH$}",
            format!("VAT ({}%)", format_quantity(t.tax_rate * 100.0)),
            format_money(t.tax)
        )?;
        write!(f, "{:<w$}{:>AMOUNT_WIDTH$}", "Total", format_money(t.total))
    }
}
