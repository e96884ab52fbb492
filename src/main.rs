//! Tariff billing entry point: CLI wiring, catalog loading and bill output.

use std::path::Path;
use std::process;

use tracing_subscriber::EnvFilter;

use tariff_sim::billing::{ReactiveReading, ReadingInput, compute_bill};
use tariff_sim::cli::{self, BillSource, CliOptions, Command};
use tariff_sim::config::BillScenario;
use tariff_sim::io::export::export_csv;
use tariff_sim::tariff::TariffCatalog;

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// `--tariffs` wins over the scenario's `catalog`; the built-in catalog is
/// used when neither is given.
fn load_catalog(cli_path: Option<&Path>, scenario_path: Option<&Path>) -> TariffCatalog {
    match cli_path.or(scenario_path) {
        Some(path) => TariffCatalog::from_json_file(path).unwrap_or_else(|e| fail(e)),
        None => TariffCatalog::builtin(),
    }
}

fn resolve_scenario(source: &BillSource) -> BillScenario {
    match source {
        BillSource::Scenario(path) => {
            BillScenario::from_toml_file(path).unwrap_or_else(|e| fail(e))
        }
        BillSource::Preset(name) => BillScenario::from_preset(name).unwrap_or_else(|e| fail(e)),
        BillSource::Quick {
            tariff,
            kwh,
            kw,
            kvarh,
            reactive,
        } => {
            let mut readings = ReadingInput::simple(*kwh, *kw);
            if let Some(kvarh) = kvarh {
                readings = readings.with_reactive(ReactiveReading {
                    kvarh: *kvarh,
                    peak_kvarh: None,
                });
            }
            readings.reactive_enabled = *reactive;
            BillScenario {
                tariff: tariff.clone(),
                catalog: None,
                readings,
            }
        }
    }
}

fn run_bill(opts: &CliOptions, source: &BillSource) -> TariffCatalog {
    let scenario = resolve_scenario(source);
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let catalog = load_catalog(opts.tariffs.as_deref(), scenario.catalog.as_deref());
    let tariff = catalog.get(&scenario.tariff).unwrap_or_else(|e| fail(e));
    let bill = compute_bill(tariff, &scenario.readings).unwrap_or_else(|e| fail(e));

    println!("{}", tariff.name);
    if !tariff.notes.is_empty() {
        println!("{}", tariff.notes);
    }
    println!();
    println!("{bill}");

    if let Some(path) = &opts.csv_out {
        if let Err(e) = export_csv(&bill, path) {
            fail(format_args!("failed to write CSV: {e}"));
        }
        eprintln!("Bill written to {}", path.display());
    }
    catalog
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = cli::parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        cli::print_usage();
        process::exit(2);
    });

    #[cfg_attr(not(feature = "api"), expect(unused_variables))]
    let catalog = match &opts.command {
        Command::List => {
            let catalog = load_catalog(opts.tariffs.as_deref(), None);
            for s in catalog.summaries() {
                println!("{:<24} {}", s.id, s.name);
                if !s.notes.is_empty() {
                    println!("{:<24} {}", "", s.notes);
                }
            }
            catalog
        }
        Command::Validate => {
            let catalog = load_catalog(opts.tariffs.as_deref(), None);
            let errors = catalog.validate();
            if !errors.is_empty() {
                for e in &errors {
                    eprintln!("{e}");
                }
                process::exit(1);
            }
            println!("{} tariff(s) valid", catalog.tariffs.len());
            catalog
        }
        Command::Export(path) => {
            let catalog = load_catalog(opts.tariffs.as_deref(), None);
            catalog.export_json_file(path).unwrap_or_else(|e| fail(e));
            eprintln!("Catalog written to {}", path.display());
            catalog
        }
        Command::Bill(source) => run_bill(&opts, source),
        Command::Serve => load_catalog(opts.tariffs.as_deref(), None),
    };

    #[cfg(feature = "api")]
    if opts.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(tariff_sim::api::AppState { catalog });
        let addr = SocketAddr::from(([0, 0, 0, 0], opts.port));
        let rt = tokio::runtime::Runtime::new()
            .unwrap_or_else(|e| fail(format_args!("failed to create tokio runtime: {e}")));
        if let Err(e) = rt.block_on(tariff_sim::api::serve(state, addr)) {
            fail(format_args!("API server on {addr}: {e}"));
        }
    }
}
