//! Shared test fixtures for integration tests.

use tariff_sim::billing::{BandPower, EnergyReading, PowerReading, ReactiveReading, ReadingInput};
use tariff_sim::tariff::{
    EnergyPricing, EnergyRange, ExcessSurcharge, PowerPricing, RangeEnergy, ReactiveConfig,
    ReactiveModel, SimplePower, Tariff, TariffCatalog, TaxConfig, ThreeBandPower,
    TripleTimeOfDayEnergy,
};

/// Sample catalog shipped in `data/tariffs.json`.
pub const SAMPLE_CATALOG: &str = include_str!("../../data/tariffs.json");

pub fn sample_catalog() -> TariffCatalog {
    TariffCatalog::from_json_str(SAMPLE_CATALOG).expect("sample catalog should parse")
}

/// Absolute ranges 1–100 @ 7.0, 101–140 @ 8.5, 141+ @ 10.2, no power.
#[allow(dead_code)]
pub fn range_tariff() -> Tariff {
    Tariff {
        id: "ranges".into(),
        name: "Range tariff".into(),
        notes: String::new(),
        fixed_charge: 0.0,
        power: None,
        energy: EnergyPricing::AbsoluteRange(RangeEnergy {
            ranges: vec![
                EnergyRange { from: 1.0, to: Some(100.0), price: 7.0 },
                EnergyRange { from: 101.0, to: Some(140.0), price: 8.5 },
                EnergyRange { from: 141.0, to: None, price: 10.2 },
            ],
        }),
        reactive: None,
        tax: TaxConfig::default(),
    }
}

/// Three-band tariff with a grupo1 surcharge on energy and power.
#[allow(dead_code)]
pub fn three_band_tariff() -> Tariff {
    Tariff {
        id: "three_band".into(),
        name: "Three-band medium consumer".into(),
        notes: String::new(),
        fixed_charge: 1500.0,
        power: Some(PowerPricing::ThreeBand(ThreeBandPower {
            peak_price: 300.0,
            standard_price: 100.0,
            off_peak_price: 50.0,
            min_billing_factor: 0.85,
            excess: ExcessSurcharge::default(),
        })),
        energy: EnergyPricing::TripleTimeOfDay(TripleTimeOfDayEnergy {
            peak_price: 10.0,
            standard_price: 5.0,
            off_peak_price: 2.0,
        }),
        reactive: Some(ReactiveConfig {
            model: ReactiveModel::Grupo1,
            always_on: true,
            surcharge_power: true,
            show_zero: None,
        }),
        tax: TaxConfig::default(),
    }
}

/// Residential tariff with a reactive surcharge the user must toggle.
#[allow(dead_code)]
pub fn residential_with_reactive(model: ReactiveModel) -> Tariff {
    Tariff {
        reactive: Some(ReactiveConfig {
            model,
            always_on: false,
            surcharge_power: false,
            show_zero: None,
        }),
        power: Some(PowerPricing::Simple(SimplePower { price_per_kw: 83.2 })),
        ..Tariff::residential_simple()
    }
}

#[allow(dead_code)]
pub fn band(contracted_kw: f64, metered_kw: f64) -> BandPower {
    BandPower {
        contracted_kw,
        metered_kw,
    }
}

/// Readings for [`three_band_tariff`]: 1000 kWh total, 500 kVArh.
#[allow(dead_code)]
pub fn three_band_readings() -> ReadingInput {
    ReadingInput {
        energy: EnergyReading::ThreeBand {
            peak_kwh: 200.0,
            standard_kwh: 300.0,
            off_peak_kwh: 500.0,
        },
        power: Some(PowerReading::ThreeBand {
            peak: band(40.0, 60.0),
            standard: band(40.0, 40.0),
            off_peak: band(40.0, 10.0),
        }),
        reactive: Some(ReactiveReading {
            kvarh: 500.0,
            peak_kvarh: None,
        }),
        reactive_enabled: false,
    }
}

#[allow(dead_code)]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
