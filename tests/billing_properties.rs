//! Seeded sweeps over random readings checking billing invariants.

mod common;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tariff_sim::billing::energy::{absolute_range, tiered};
use tariff_sim::billing::reactive::{coefficient, ratio};
use tariff_sim::billing::{
    BillResult, ChargeCategory, EnergyReading, ReactiveReading, ReadingInput, compute_bill,
};
use tariff_sim::tariff::{EnergyPricing, EnergyRange, ReactiveConfig, ReactiveModel, Tariff};

use common::assert_close;

const SAMPLES: usize = 500;

fn residential_tiers() -> Vec<tariff_sim::tariff::Tier> {
    match Tariff::residential_simple().energy {
        EnergyPricing::Tiered(t) => t.tiers,
        other => panic!("unexpected energy pricing {}", other.kind()),
    }
}

#[test]
fn tiered_energy_is_monotonic() {
    let tiers = residential_tiers();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..SAMPLES {
        let a = rng.random_range(0.0..2000.0);
        let b = a + rng.random_range(0.0..500.0);
        let (ea, eb) = (tiered(a, &tiers).total, tiered(b, &tiers).total);
        assert!(ea <= eb + 1e-9, "energy({a}) = {ea} > energy({b}) = {eb}");
    }
}

#[test]
fn tiered_energy_is_continuous_at_bounds() {
    let tiers = residential_tiers();
    for bound in [100.0, 600.0] {
        let below = tiered(bound - 1e-6, &tiers).total;
        let above = tiered(bound + 1e-6, &tiers).total;
        assert!((above - below).abs() < 1e-3, "jump at {bound}: {below} -> {above}");
    }
}

#[test]
fn tiered_quantities_sum_to_consumption() {
    let tiers = residential_tiers();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..SAMPLES {
        let kwh = rng.random_range(0.0..5000.0);
        let billed: f64 = tiered(kwh, &tiers)
            .charges
            .iter()
            .filter_map(|c| c.quantity)
            .sum();
        assert!((billed - kwh).abs() < 1e-6, "billed {billed} of {kwh} kWh");
    }
}

fn sample_ranges() -> Vec<EnergyRange> {
    match common::range_tariff().energy {
        EnergyPricing::AbsoluteRange(r) => r.ranges,
        other => panic!("unexpected energy pricing {}", other.kind()),
    }
}

#[test]
fn absolute_range_energy_is_monotonic() {
    let ranges = sample_ranges();
    let mut rng = StdRng::seed_from_u64(21);
    for _ in 0..SAMPLES {
        let a = rng.random_range(0.0..400.0);
        let b = a + rng.random_range(0.0..100.0);
        let (ea, eb) = (absolute_range(a, &ranges).total, absolute_range(b, &ranges).total);
        assert!(ea <= eb + 1e-9, "energy({a}) = {ea} > energy({b}) = {eb}");
    }
}

#[test]
fn absolute_range_energy_is_continuous_at_bounds() {
    let ranges = sample_ranges();
    for bound in [100.0, 140.0] {
        let below = absolute_range(bound - 1e-6, &ranges).total;
        let above = absolute_range(bound + 1e-6, &ranges).total;
        assert!((above - below).abs() < 1e-3, "jump at {bound}: {below} -> {above}");
    }
}

#[test]
fn absolute_range_quantities_sum_to_fractional_consumption() {
    let ranges = sample_ranges();
    let mut rng = StdRng::seed_from_u64(3);
    let fixed = [0.5, 100.5, 140.2, 140.9];
    let random = (0..SAMPLES).map(|_| rng.random_range(0.0..1000.0));
    for kwh in fixed.into_iter().chain(random) {
        let billed: f64 = absolute_range(kwh, &ranges)
            .charges
            .iter()
            .filter_map(|c| c.quantity)
            .sum();
        assert!((billed - kwh).abs() < 1e-6, "billed {billed} of {kwh} kWh");
    }
}

#[test]
fn totals_add_up_and_tax_matches_rate() {
    let tariffs = [
        Tariff::residential_simple(),
        common::three_band_tariff(),
        common::range_tariff(),
    ];
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..SAMPLES {
        let kwh = rng.random_range(0.0..3000.0);
        let kw = rng.random_range(0.0..40.0);
        let residential = compute_bill(&tariffs[0], &ReadingInput::simple(kwh, kw))
            .expect("should compute");

        let mut three_band_input = common::three_band_readings();
        three_band_input.reactive = Some(ReactiveReading {
            kvarh: rng.random_range(0.0..2000.0),
            peak_kvarh: None,
        });
        let three_band =
            compute_bill(&tariffs[1], &three_band_input).expect("should compute");

        let ranges = compute_bill(
            &tariffs[2],
            &ReadingInput {
                power: None,
                ..ReadingInput::simple(kwh, 0.0)
            },
        )
        .expect("should compute");

        for bill in [residential, three_band, ranges] {
            let t = &bill.totals;
            let items = bill.items_total();
            assert!((t.taxable_subtotal + t.non_taxable_subtotal - items).abs() < 1e-6);
            assert!((t.tax - t.taxable_subtotal * t.tax_rate).abs() < 1e-9);
            assert!(
                (t.total - (t.taxable_subtotal + t.non_taxable_subtotal + t.tax)).abs() < 1e-9
            );
            let taxable: f64 = bill.items().filter(|i| i.taxable).map(|i| i.amount).sum();
            assert!((taxable - t.taxable_subtotal).abs() < 1e-6);
        }
    }
}

#[test]
fn reactive_is_zero_below_threshold() {
    let tariff = common::residential_with_reactive(ReactiveModel::Grupo2);
    let params = ReactiveModel::Grupo2.params();
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..SAMPLES {
        let kwh = rng.random_range(1.0..3000.0);
        let kvarh = kwh * rng.random_range(0.0..params.low_threshold - 0.01);
        assert_eq!(coefficient(ratio(kvarh, kwh), &params), 0.0);

        let bill = compute_bill(
            &tariff,
            &ReadingInput::simple(kwh, 1.0).with_reactive(ReactiveReading {
                kvarh,
                peak_kvarh: None,
            }),
        )
        .expect("should compute");
        assert!(bill.items().all(|i| i.category != ChargeCategory::Reactive));
    }
}

const ALL_MODELS: [ReactiveModel; 4] = [
    ReactiveModel::Grupo1,
    ReactiveModel::Grupo2,
    ReactiveModel::Grupo3,
    ReactiveModel::Grupo3Split { split_percent: 60.0 },
];

fn assert_no_reactive_charge(bill: &BillResult) {
    let summary = bill.reactive.as_ref().expect("reactive evaluated");
    assert_eq!(summary.coefficient, 0.0, "ratio {}", summary.ratio);
    assert!(
        bill.items()
            .filter(|i| i.category == ChargeCategory::Reactive)
            .all(|i| i.amount == 0.0)
    );
}

#[test]
fn reactive_is_zero_below_threshold_for_every_model_on_banded_energy() {
    let mut rng = StdRng::seed_from_u64(2024);
    for model in ALL_MODELS {
        let tariff = Tariff {
            reactive: Some(ReactiveConfig {
                model,
                ..common::three_band_tariff().reactive.expect("reactive configured")
            }),
            ..common::three_band_tariff()
        };
        let low = model.params().low_threshold - 0.01;
        for _ in 0..SAMPLES {
            let (peak, standard, off_peak) = (
                rng.random_range(1.0..2000.0),
                rng.random_range(0.0..2000.0),
                rng.random_range(0.0..2000.0),
            );
            let r = rng.random_range(0.0..low);
            let with_peak = rng.random_bool(0.5);
            let mut input = common::three_band_readings();
            input.energy = EnergyReading::ThreeBand {
                peak_kwh: peak,
                standard_kwh: standard,
                off_peak_kwh: off_peak,
            };
            input.reactive = Some(ReactiveReading {
                kvarh: (peak + standard + off_peak) * r,
                peak_kvarh: with_peak.then_some(peak * r),
            });
            let bill = compute_bill(&tariff, &input).expect("should compute");
            assert_no_reactive_charge(&bill);
        }
    }
}

#[test]
fn seasonal_peak_model_uses_whole_period_ratio_without_peak_reading() {
    let catalog = common::sample_catalog();
    let tariff = catalog.get("grandes_consumidores").expect("present");
    let low = ReactiveModel::Grupo3.params().low_threshold - 0.01;
    let mut rng = StdRng::seed_from_u64(430);
    for _ in 0..SAMPLES {
        let readings = [
            rng.random_range(0.0..500.0),
            rng.random_range(0.0..500.0),
            rng.random_range(0.0..3000.0),
            rng.random_range(1.0..3000.0),
        ];
        let total: f64 = readings.iter().sum();
        let kvarh = total * rng.random_range(0.0..low);
        let input = ReadingInput {
            energy: EnergyReading::Seasonal {
                business_peak_kwh: readings[0],
                non_business_peak_kwh: readings[1],
                standard_kwh: readings[2],
                off_peak_kwh: readings[3],
            },
            power: None,
            reactive: None,
            reactive_enabled: false,
        }
        .with_reactive(ReactiveReading {
            kvarh,
            peak_kvarh: None,
        });
        let bill = compute_bill(tariff, &input).expect("should compute");
        assert_no_reactive_charge(&bill);
        let summary = bill.reactive.expect("reactive evaluated");
        assert_close(summary.ratio, kvarh / total);
        assert_close(
            summary.cost_base,
            readings[0] * 11.0 + readings[1] * 7.5,
        );
    }
}

#[test]
fn billing_is_idempotent() {
    let tariff = common::three_band_tariff();
    let input = common::three_band_readings();
    let first = compute_bill(&tariff, &input).expect("should compute");
    let second = compute_bill(&tariff, &input).expect("should compute");
    assert_eq!(first, second);
}
