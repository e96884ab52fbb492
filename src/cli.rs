//! Command-line argument parsing.

use std::env;
use std::path::PathBuf;

use crate::format::parse_number_any;

/// Default tariff for quick bills given with `--kwh`.
pub const DEFAULT_TARIFF: &str = "residencial_simple";
/// Default API port.
pub const DEFAULT_PORT: u16 = 3000;

/// Where the readings of a bill come from.
#[derive(Debug, Clone, PartialEq)]
pub enum BillSource {
    /// TOML bill scenario file.
    Scenario(PathBuf),
    /// Built-in bill scenario.
    Preset(String),
    /// Single energy total and power figure given on the command line.
    Quick {
        tariff: String,
        kwh: f64,
        kw: f64,
        kvarh: Option<f64>,
        reactive: bool,
    },
}

/// What the run should do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the catalog's tariffs.
    List,
    /// Validate every tariff of the catalog.
    Validate,
    /// Validate and write the catalog as pretty JSON.
    Export(PathBuf),
    /// Compute and print one bill.
    Bill(BillSource),
    /// Only start the API server.
    Serve,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    /// Tariff catalog JSON; overrides the scenario's `catalog`.
    pub tariffs: Option<PathBuf>,
    pub command: Command,
    /// Bill CSV export path.
    pub csv_out: Option<PathBuf>,
    pub serve: bool,
    pub port: u16,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_number(flag: &str, raw: &str) -> Result<f64, String> {
    parse_number_any(raw).ok_or_else(|| format!("{flag} value \"{raw}\" is not a number"))
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut tariffs = None;
    let mut scenario = None;
    let mut preset = None;
    let mut tariff = None;
    let mut kwh = None;
    let mut kw = None;
    let mut kvarh = None;
    let mut reactive = false;
    let mut csv_out = None;
    let mut list = false;
    let mut validate = false;
    let mut export = None;
    #[cfg_attr(not(feature = "api"), allow(unused_mut))]
    let mut serve = false;
    #[cfg_attr(not(feature = "api"), allow(unused_mut))]
    let mut port = None;

    while i < args.len() {
        match args[i].as_str() {
            "--tariffs" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --tariffs (expected a JSON file path)",
                )?;
                if tariffs.replace(PathBuf::from(path)).is_some() {
                    return Err("--tariffs provided more than once".to_string());
                }
            }
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --scenario (expected a TOML file path)",
                )?;
                if scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--tariff" => {
                i += 1;
                let id = args.next_or_err(i, "missing value for --tariff (expected a tariff id)")?;
                if tariff.replace(id.to_string()).is_some() {
                    return Err("--tariff provided more than once".to_string());
                }
            }
            "--kwh" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --kwh (expected a number)")?;
                if kwh.replace(parse_number("--kwh", raw)?).is_some() {
                    return Err("--kwh provided more than once".to_string());
                }
            }
            "--kw" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --kw (expected a number)")?;
                if kw.replace(parse_number("--kw", raw)?).is_some() {
                    return Err("--kw provided more than once".to_string());
                }
            }
            "--kvarh" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --kvarh (expected a number)")?;
                if kvarh.replace(parse_number("--kvarh", raw)?).is_some() {
                    return Err("--kvarh provided more than once".to_string());
                }
            }
            "--reactive" => reactive = true,
            "--csv-out" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --csv-out (expected a file path)")?;
                if csv_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--csv-out provided more than once".to_string());
                }
            }
            "--list" => list = true,
            "--validate" => validate = true,
            "--export" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --export (expected a file path)")?;
                if export.replace(PathBuf::from(path)).is_some() {
                    return Err("--export provided more than once".to_string());
                }
            }
            #[cfg(feature = "api")]
            "--serve" => serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                let p = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
                if port.replace(p).is_some() {
                    return Err("--port provided more than once".to_string());
                }
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    let catalog_commands = usize::from(list) + usize::from(validate) + usize::from(export.is_some());
    if catalog_commands > 1 {
        return Err("arguments `--list`, `--validate` and `--export` are mutually exclusive".to_string());
    }
    if scenario.is_some() && preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }
    let quick = tariff.is_some() || kwh.is_some() || kw.is_some() || kvarh.is_some() || reactive;
    if quick && (scenario.is_some() || preset.is_some()) {
        return Err(
            "`--tariff`, `--kwh`, `--kw`, `--kvarh` and `--reactive` cannot be combined with `--scenario` or `--preset`"
                .to_string(),
        );
    }
    let bill_requested = quick || scenario.is_some() || preset.is_some() || csv_out.is_some();
    if catalog_commands > 0 && bill_requested {
        return Err("catalog commands cannot be combined with bill arguments".to_string());
    }
    if port.is_some() && !serve {
        return Err("--port requires --serve".to_string());
    }

    let command = if list {
        Command::List
    } else if validate {
        Command::Validate
    } else if let Some(path) = export {
        Command::Export(path)
    } else if let Some(path) = scenario {
        Command::Bill(BillSource::Scenario(path))
    } else if let Some(name) = preset {
        Command::Bill(BillSource::Preset(name))
    } else if quick {
        let kwh = kwh.ok_or_else(|| "--kwh is required for a bill without --scenario".to_string())?;
        Command::Bill(BillSource::Quick {
            tariff: tariff.unwrap_or_else(|| DEFAULT_TARIFF.to_string()),
            kwh,
            kw: kw.unwrap_or(0.0),
            kvarh,
            reactive: reactive || kvarh.is_some(),
        })
    } else if serve && csv_out.is_none() {
        Command::Serve
    } else {
        Command::Bill(BillSource::Preset("residential".to_string()))
    };

    Ok(CliOptions {
        tariffs,
        command,
        csv_out,
        serve,
        port: port.unwrap_or(DEFAULT_PORT),
    })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("tariff-sim: itemized electricity bills from tariff definitions");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  tariff-sim [--tariffs <json>] [--scenario <toml> | --preset <name>] [--csv-out <path>]");
    eprintln!("  tariff-sim [--tariffs <json>] [--tariff <id>] --kwh <n> [--kw <n>] [--kvarh <n>] [--reactive]");
    eprintln!("  tariff-sim [--tariffs <json>] --list | --validate | --export <path>");
    #[cfg(feature = "api")]
    eprintln!("  tariff-sim [--tariffs <json>] --serve [--port <u16>]");
    eprintln!();
    eprintln!("Numbers accept a comma or a dot as decimal separator.");
    eprintln!("Without arguments the residential preset (150 kWh, 1 kW) is billed.");
    eprintln!("Set RUST_LOG=debug to trace each calculation.");
}
