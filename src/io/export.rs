//! CSV export for computed bills.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::billing::{BillResult, LineItem};
use crate::format::format_quantity;

/// Column header for CSV bill export.
const HEADER: &str = "section,label,quantity,unit_price,amount,taxable";

/// Exports a bill to a CSV file at the given path.
///
/// Writes a header row, one row per line item in display order, then the
/// summary rows `taxable_subtotal`, `non_taxable_subtotal`, `tax` and
/// `total`. Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(bill: &BillResult, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(bill, buf)
}

fn optional(value: Option<f64>) -> String {
    value.map(format_quantity).unwrap_or_default()
}

fn item_record(section: &str, item: &LineItem) -> [String; 6] {
    [
        section.to_string(),
        item.label.clone(),
        optional(item.quantity),
        optional(item.unit_price),
        format!("{:.4}", item.amount),
        item.taxable.to_string(),
    ]
}

fn summary_record(label: &str, amount: f64, unit_price: Option<f64>) -> [String; 6] {
    [
        "summary".to_string(),
        label.to_string(),
        String::new(),
        optional(unit_price),
        format!("{amount:.4}"),
        String::new(),
    ]
}

/// Writes a bill as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(bill: &BillResult, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    let sections = [
        ("fixed_charge", &bill.fixed_charge),
        ("power", &bill.power),
        ("energy", &bill.energy),
    ];
    for (section, items) in sections {
        for item in items {
            wtr.write_record(item_record(section, item))?;
        }
    }

    let t = &bill.totals;
    wtr.write_record(summary_record("taxable_subtotal", t.taxable_subtotal, None))?;
    wtr.write_record(summary_record(
        "non_taxable_subtotal",
        t.non_taxable_subtotal,
        None,
    ))?;
    wtr.write_record(summary_record("tax", t.tax, Some(t.tax_rate)))?;
    wtr.write_record(summary_record("total", t.total, None))?;

    wtr.flush()?;
    Ok(())
}
