//! Electricity tariff billing engine.
//!
//! A [`tariff::Tariff`] describes how a utility prices its fixed charge,
//! contracted or metered power, active energy and reactive energy. Given the
//! readings of one billing period, [`billing::compute_bill`] produces an
//! itemized [`billing::BillResult`] with taxable and non-taxable subtotals
//! and VAT.

#[cfg(feature = "api")]
pub mod api;
pub mod billing;
pub mod cli;
pub mod config;
pub mod format;
pub mod io;
pub mod tariff;
