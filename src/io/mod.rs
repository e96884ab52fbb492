//! File output for computed bills.

pub mod export;
