//! gridpilot entry point — CLI wiring for forecasts and optimization.

use std::path::Path;
use std::process;

use gridpilot::autopilot::Autopilot;
use gridpilot::config::AppConfig;
use gridpilot::grid::{GridOracle, Region, RegionTable};
use gridpilot::io::export::{export_schedules, write_forecast_csv};
use gridpilot::model::{OptimizationWeights, ScheduleResult, Workload, WorkloadSpec};

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<String>,
    forecast_only: bool,
    region: Option<String>,
    hours: Option<usize>,
    name: Option<String>,
    duration: Option<f32>,
    power: Option<f32>,
    deadline: Option<f32>,
    price_weight: Option<f32>,
    carbon_weight: Option<f32>,
    min_delay: Option<f32>,
    fleet_path: Option<String>,
    out_path: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("gridpilot — carbon/cost-aware scheduling for time-shiftable workloads");
    eprintln!();
    eprintln!("Usage: gridpilot [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load defaults from a TOML config file");
    eprintln!("  --forecast               Print the grid forecast and exit");
    eprintln!("  --region <name>          Grid region (US-WEST, US-EAST, EU-WEST, NORDIC)");
    eprintln!("  --hours <n>              Forecast horizon in hours");
    eprintln!("  --name <str>             Workload name");
    eprintln!("  --duration <hours>       Workload runtime");
    eprintln!("  --power <kw>             Workload power draw");
    eprintln!("  --deadline <hours>       Completion deadline");
    eprintln!("  --price-weight <0..1>    Weight for cost optimization");
    eprintln!("  --carbon-weight <0..1>   Weight for carbon optimization");
    eprintln!("  --min-delay <hours>      Minimum delay before any start");
    eprintln!("  --fleet <path>           Optimize a fleet from a JSON workload list");
    eprintln!("  --out <path>             Export results (.json or .csv)");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start the REST API server");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
}

/// Parses a flag value, exiting with a message when missing or malformed.
fn take_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str, kind: &str) -> T {
    let Some(raw) = args.get(i) else {
        eprintln!("error: {flag} requires a {kind} argument");
        process::exit(1);
    };
    match raw.parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("error: {flag} value \"{raw}\" is not a valid {kind}");
            process::exit(1);
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        forecast_only: false,
        region: None,
        hours: None,
        name: None,
        duration: None,
        power: None,
        deadline: None,
        price_weight: None,
        carbon_weight: None,
        min_delay: None,
        fleet_path: None,
        out_path: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--forecast" => cli.forecast_only = true,
            "--config" => {
                i += 1;
                cli.config_path = Some(take_value(&args, i, "--config", "path"));
            }
            "--region" => {
                i += 1;
                cli.region = Some(take_value(&args, i, "--region", "name"));
            }
            "--hours" => {
                i += 1;
                cli.hours = Some(take_value(&args, i, "--hours", "positive integer"));
            }
            "--name" => {
                i += 1;
                cli.name = Some(take_value(&args, i, "--name", "string"));
            }
            "--duration" => {
                i += 1;
                cli.duration = Some(take_value(&args, i, "--duration", "number of hours"));
            }
            "--power" => {
                i += 1;
                cli.power = Some(take_value(&args, i, "--power", "number of kW"));
            }
            "--deadline" => {
                i += 1;
                cli.deadline = Some(take_value(&args, i, "--deadline", "number of hours"));
            }
            "--price-weight" => {
                i += 1;
                cli.price_weight = Some(take_value(&args, i, "--price-weight", "number"));
            }
            "--carbon-weight" => {
                i += 1;
                cli.carbon_weight = Some(take_value(&args, i, "--carbon-weight", "number"));
            }
            "--min-delay" => {
                i += 1;
                cli.min_delay = Some(take_value(&args, i, "--min-delay", "number of hours"));
            }
            "--fleet" => {
                i += 1;
                cli.fleet_path = Some(take_value(&args, i, "--fleet", "path"));
            }
            "--out" => {
                i += 1;
                cli.out_path = Some(take_value(&args, i, "--out", "path"));
            }
            #[cfg(feature = "api")]
            "--serve" => cli.serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                cli.port = take_value(&args, i, "--port", "u16");
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Loads workload specs for fleet mode from a JSON file.
fn load_fleet(path: &str) -> Vec<Workload> {
    let content = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: cannot read fleet file \"{path}\": {e}");
        process::exit(1);
    });
    let specs: Vec<WorkloadSpec> = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("error: invalid fleet JSON in \"{path}\": {e}");
        process::exit(1);
    });
    specs
        .into_iter()
        .map(|spec| {
            spec.into_workload().unwrap_or_else(|e| {
                eprintln!("{e}");
                process::exit(1);
            })
        })
        .collect()
}

fn export_or_exit(results: &[ScheduleResult], path: &str) {
    if let Err(e) = export_schedules(results, Path::new(path)) {
        eprintln!("error: failed to export results: {e}");
        process::exit(1);
    }
    eprintln!("Results written to {path}");
}

fn main() {
    let cli = parse_args();

    // Persisted defaults: --config takes priority over built-in defaults.
    let config = match cli.config_path {
        Some(ref path) => match AppConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        },
        None => AppConfig::default(),
    };
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let table = RegionTable::builtin();

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(gridpilot::api::AppState { table, config });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        rt.block_on(gridpilot::api::serve(state, addr));
        return;
    }

    let region_str = cli.region.as_deref().unwrap_or(&config.defaults.region);
    let region = match Region::parse(region_str) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let oracle = GridOracle::new(&table, region);

    // Forecast-only mode: print the windows and exit.
    if cli.forecast_only {
        let hours = cli.hours.unwrap_or(24);
        let forecast = match oracle.forecast(hours) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        };
        println!("Grid forecast for {region} ({hours}h):");
        for w in &forecast {
            println!("{w}");
        }
        if let Some(ref path) = cli.out_path {
            let file = match std::fs::File::create(path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("error: cannot create \"{path}\": {e}");
                    process::exit(1);
                }
            };
            if let Err(e) = write_forecast_csv(&forecast, std::io::BufWriter::new(file)) {
                eprintln!("error: failed to export forecast: {e}");
                process::exit(1);
            }
            eprintln!("Forecast written to {path}");
        }
        return;
    }

    let weights = match OptimizationWeights::new(
        cli.price_weight.unwrap_or(config.optimization.price_weight),
        cli.carbon_weight
            .unwrap_or(config.optimization.carbon_weight),
    ) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let min_delay = cli.min_delay.unwrap_or(config.optimization.min_delay_hours);
    let pilot = Autopilot::new(weights).with_min_delay(min_delay);

    // Fleet mode: independent per-workload optimization from a JSON list.
    if let Some(ref path) = cli.fleet_path {
        let workloads = load_fleet(path);
        let max_deadline = workloads
            .iter()
            .map(|w| w.deadline_hours)
            .fold(0.0_f32, f32::max);
        let hours = cli.hours.unwrap_or((max_deadline.ceil() as usize).max(24));
        let forecast = match oracle.forecast(hours) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        };
        let report = match pilot.optimize_fleet(&workloads, &forecast) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        };
        println!("{report}");
        if let Some(ref out) = cli.out_path {
            export_or_exit(&report.schedules, out);
        }
        return;
    }

    // Single-workload mode.
    let workload = match Workload::new(
        cli.name.as_deref().unwrap_or("workload"),
        cli.duration.unwrap_or(config.defaults.duration_hours),
        cli.power.unwrap_or(config.defaults.power_draw_kw),
        cli.deadline.unwrap_or(config.defaults.deadline_hours),
    ) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let hours = cli
        .hours
        .unwrap_or((workload.deadline_hours.ceil() as usize).max(24));
    let forecast = match oracle.forecast(hours) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let result = match pilot.optimize(&workload, &forecast) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    println!("Region: {region}");
    println!("{result}");
    if let Some(ref path) = cli.out_path {
        export_or_exit(std::slice::from_ref(&result), path);
    }
}
