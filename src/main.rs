//! wattcast entry point: CLI wiring, summary output and alert dispatch.

use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration as StdDuration;

use chrono::{Local, NaiveDateTime, Utc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wattcast::alerts::{AlertSink, DisabledSink, HttpAlertSink};
use wattcast::config::AppConfig;
use wattcast::dashboard::{
    ApplianceFilter, Dashboard, DashboardSnapshot, ForecastRequest, MAX_DAY_OFFSET,
};
use wattcast::dataset::SampleDataset;
use wattcast::io::export::export_csv;
use wattcast::noise::{entropy, seeded};
use wattcast::notify::AlertService;
use wattcast::settings::DashboardSettings;

/// Format accepted by `--reference`.
const REFERENCE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parsed CLI arguments.
#[derive(Default)]
struct CliArgs {
    config_path: Option<String>,
    preset: Option<String>,
    dataset: Option<String>,
    forecast_hours: Option<i64>,
    lookback_hours: Option<i64>,
    tariff: Option<f64>,
    budget: Option<f64>,
    seed: Option<u64>,
    reference: Option<NaiveDateTime>,
    day_offset: i64,
    appliance: Option<String>,
    export: Option<String>,
    settings: Option<String>,
    email: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("wattcast: household energy forecast dashboard");
    eprintln!();
    eprintln!("Usage: wattcast [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load configuration from TOML file");
    eprintln!("  --preset <name>          Use a built-in preset (default, scenario)");
    eprintln!("  --dataset <path>         Sample dataset JSON");
    eprintln!("  --forecast-hours <n>     Forward window in hours");
    eprintln!("  --lookback-hours <n>     Lookback window in hours");
    eprintln!("  --tariff <x>             Currency per kWh");
    eprintln!("  --budget <x>             Budget for the forward window");
    eprintln!("  --seed <u64>             Seed synthesized values");
    eprintln!("  --reference <datetime>   Anchor time, \"YYYY-MM-DD HH:MM\" (default: now)");
    eprintln!("  --day-offset <n>         Shift the view by whole days (negative: earlier)");
    eprintln!("  --appliance <key>        Chart one appliance (fan, ac, ref, wm) or breakdown");
    eprintln!("  --export <path>          Export chart series to CSV");
    eprintln!("  --settings <path>        Notification settings JSON");
    eprintln!("  --email <address>        Save a Gmail address for budget alerts");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after the summary");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --config or --preset is given, the default preset is used.");
}

fn fail(message: &str) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str, what: &str) -> &'a str {
    *i += 1;
    match args.get(*i) {
        Some(v) => v.as_str(),
        None => fail(&format!("{flag} requires {what}")),
    }
}

fn parse_value<T: std::str::FromStr>(
    args: &[String],
    i: &mut usize,
    flag: &str,
    what: &str,
) -> T {
    let raw = next_value(args, i, flag, what);
    raw.parse::<T>()
        .unwrap_or_else(|_| fail(&format!("{flag} value \"{raw}\" is not {what}")))
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        #[cfg(feature = "api")]
        port: 3000,
        ..CliArgs::default()
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => {
                cli.config_path = Some(next_value(&args, &mut i, flag, "a path").into());
            }
            "--preset" => cli.preset = Some(next_value(&args, &mut i, flag, "a name").into()),
            "--dataset" => cli.dataset = Some(next_value(&args, &mut i, flag, "a path").into()),
            "--forecast-hours" => {
                cli.forecast_hours = Some(parse_value(&args, &mut i, flag, "an integer"));
            }
            "--lookback-hours" => {
                cli.lookback_hours = Some(parse_value(&args, &mut i, flag, "an integer"));
            }
            "--tariff" => cli.tariff = Some(parse_value(&args, &mut i, flag, "a number")),
            "--budget" => cli.budget = Some(parse_value(&args, &mut i, flag, "a number")),
            "--seed" => cli.seed = Some(parse_value(&args, &mut i, flag, "a valid u64")),
            "--reference" => {
                let raw = next_value(&args, &mut i, flag, "a date-time");
                let parsed = NaiveDateTime::parse_from_str(raw, REFERENCE_FORMAT)
                    .unwrap_or_else(|_| {
                        fail(&format!("--reference value \"{raw}\" is not \"YYYY-MM-DD HH:MM\""))
                    });
                cli.reference = Some(parsed);
            }
            "--day-offset" => {
                let days: i64 = parse_value(&args, &mut i, flag, "an integer");
                if !(-MAX_DAY_OFFSET..=MAX_DAY_OFFSET).contains(&days) {
                    fail(&format!(
                        "--day-offset value {days} is more than {MAX_DAY_OFFSET} days away"
                    ));
                }
                cli.day_offset = days;
            }
            "--appliance" => {
                cli.appliance = Some(next_value(&args, &mut i, flag, "a key").into());
            }
            "--export" => cli.export = Some(next_value(&args, &mut i, flag, "a path").into()),
            "--settings" => {
                cli.settings = Some(next_value(&args, &mut i, flag, "a path").into());
            }
            "--email" => {
                cli.email = Some(next_value(&args, &mut i, flag, "an address").into());
            }
            #[cfg(feature = "api")]
            "--serve" => cli.serve = true,
            #[cfg(feature = "api")]
            "--port" => cli.port = parse_value(&args, &mut i, flag, "a valid u16"),
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

/// Loads the configuration and applies CLI overrides.
fn load_config(cli: &CliArgs) -> AppConfig {
    let loaded = if let Some(ref path) = cli.config_path {
        AppConfig::from_toml_file(Path::new(path))
    } else if let Some(ref name) = cli.preset {
        AppConfig::from_preset(name)
    } else {
        Ok(AppConfig::baseline())
    };
    let mut cfg = loaded.unwrap_or_else(|e| fail(&e.to_string()));

    let d = &mut cfg.dashboard;
    if let Some(ref path) = cli.dataset {
        d.dataset_path = Some(PathBuf::from(path));
    }
    if let Some(hours) = cli.forecast_hours {
        d.forecast_hours = hours;
    }
    if let Some(hours) = cli.lookback_hours {
        d.lookback_hours = hours;
    }
    if cli.tariff.is_some() {
        d.tariff = cli.tariff;
    }
    if cli.budget.is_some() {
        d.budget = cli.budget;
    }
    if cli.seed.is_some() {
        d.seed = cli.seed;
    }
    if let Some(ref path) = cli.settings {
        d.settings_path = Some(PathBuf::from(path));
    }

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    cfg
}

/// Applies an `--email` change, then evaluates notifications for the snapshot.
///
/// Returns the settings in effect afterwards.
fn run_alerts<S: AlertSink>(
    sink: S,
    cfg: &AppConfig,
    settings: DashboardSettings,
    email: Option<&str>,
    snapshot: &DashboardSnapshot,
) -> DashboardSettings {
    let cooldown = chrono::Duration::hours(cfg.alerts.cooldown_hours);
    let mut service = AlertService::with_cooldown(sink, cooldown);

    let settings = match email {
        Some(address) => {
            let next = settings.clone().with_email(address);
            if !next.email_enabled {
                warn!(address, "not a Gmail address, emails stay disabled");
            }
            service
                .save_settings(&settings, next, cfg.dashboard.settings_path.as_deref())
                .unwrap_or_else(|e| fail(&e.to_string()))
        }
        None => settings,
    };

    let evaluation = service.process(
        &settings,
        snapshot.summary.next_cost,
        snapshot.budget,
        Utc::now(),
    );
    for n in &evaluation.notifications {
        println!("[{:?}] {}: {}", n.priority, n.title, n.message);
    }
    settings
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();
    let cfg = load_config(&cli);

    let dataset = cfg
        .dashboard
        .dataset_path
        .as_deref()
        .and_then(SampleDataset::load_or_degrade);
    let dashboard = Dashboard::new(dataset, cfg.appliance_set());

    let filter = match cli.appliance.as_deref() {
        None => ApplianceFilter::All,
        Some(name) => ApplianceFilter::parse(name, dashboard.appliances())
            .unwrap_or_else(|| fail(&format!("unknown appliance \"{name}\""))),
    };
    let request = ForecastRequest {
        forecast_hours: cfg.dashboard.forecast_hours,
        lookback_hours: cfg.dashboard.lookback_hours,
        reference: cli.reference.unwrap_or_else(|| Local::now().naive_local()),
        tariff: cfg.dashboard.tariff,
        budget: cfg.dashboard.budget,
        filter,
        scenario: cfg.scenario(),
    }
    .shifted_days(cli.day_offset);

    // a settings file only overrides the fields it actually contains
    let configured = DashboardSettings {
        threshold_approaching: cfg.alerts.threshold_approaching,
        threshold_critical: cfg.alerts.threshold_critical,
        ..DashboardSettings::default()
    };
    let settings = match cfg.dashboard.settings_path.as_deref() {
        Some(path) => DashboardSettings::load_or(path, configured),
        None => configured,
    };
    let thresholds = settings.thresholds();

    let snapshot = match cfg.dashboard.seed {
        Some(seed) => dashboard.snapshot(&request, thresholds, &mut seeded(seed)),
        None => dashboard.snapshot(&request, thresholds, &mut entropy()),
    };

    println!(
        "{} (tariff {:.2}, budget {:.2})",
        snapshot.period_text, snapshot.tariff, snapshot.budget
    );
    for ((label, actual), forecast) in snapshot
        .labels
        .combined()
        .iter()
        .zip(&snapshot.actual_series)
        .zip(&snapshot.forecast_series)
    {
        match actual {
            Some(a) => println!("{label}  actual {a:>7.3}  forecast {forecast:>7.3}"),
            None => println!("{label}  actual       -  forecast {forecast:>7.3}"),
        }
    }
    for line in &snapshot.breakdown {
        let values: Vec<String> = line.values.iter().map(|v| format!("{v:.3}")).collect();
        println!("{:<16} {}", line.name, values.join(" "));
    }
    println!("\n{}", snapshot.summary);

    let email = cli.email.as_deref();
    #[cfg_attr(not(feature = "api"), allow(unused_variables))]
    let settings = match cfg.alerts.endpoint.as_deref() {
        Some(endpoint) => {
            let timeout = StdDuration::from_secs(cfg.alerts.timeout_secs);
            match HttpAlertSink::new(endpoint, timeout) {
                Ok(sink) => run_alerts(sink, &cfg, settings, email, &snapshot),
                Err(e) => {
                    error!(error = %e, "cannot build alert client, emails disabled");
                    run_alerts(DisabledSink, &cfg, settings, email, &snapshot)
                }
            }
        }
        None => run_alerts(DisabledSink, &cfg, settings, email, &snapshot),
    };

    if let Some(ref path) = cli.export {
        if let Err(e) = export_csv(&snapshot, Path::new(path)) {
            fail(&format!("failed to write CSV: {e}"));
        }
        info!(path = %path, "chart series exported");
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(wattcast::api::AppState {
            dashboard,
            settings,
            forecast_hours: request.forecast_hours,
            lookback_hours: request.lookback_hours,
            tariff: request.tariff,
            budget: request.budget,
            scenario: request.scenario,
            reference: cli.reference.map(|_| request.reference),
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new()
            .unwrap_or_else(|e| fail(&format!("failed to create tokio runtime: {e}")));
        if let Err(e) = rt.block_on(wattcast::api::serve(state, addr)) {
            fail(&format!("server error: {e}"));
        }
    }
}
