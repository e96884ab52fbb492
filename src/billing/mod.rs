//! Bill calculation: readings in, itemized bill out.
//!
//! [`compute_bill`] is the single entry point. It dispatches to the energy,
//! power and reactive strategies of the selected [`crate::tariff::Tariff`]
//! and partitions the resulting line items into taxable and non-taxable
//! subtotals. Everything here is synchronous and free of shared state.

pub mod bill;
pub mod energy;
mod engine;
pub mod power;
pub mod reactive;
pub mod readings;

use thiserror::Error;

pub use bill::{BillResult, BillTotals, Charge, ChargeCategory, LineItem, ReactiveSummary};
pub use engine::compute_bill;
pub use readings::{BandPower, EnergyReading, PowerReading, ReactiveReading, ReadingInput};

/// Errors that abort a bill calculation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    #[error("unsupported energy pricing type \"{kind}\"")]
    UnsupportedEnergyType { kind: String },
    #[error("reading does not fit the tariff: expected {expected} readings, got {found}")]
    ReadingMismatch {
        expected: &'static str,
        found: &'static str,
    },
}
