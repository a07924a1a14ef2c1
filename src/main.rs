mod collectors;
mod config;
mod evaluate;
mod exit_code;
mod report;
mod summary;

use clap::Parser;
use collectors::simulated::{SimulatedSource, SimulationProfile};
use collectors::system::{host_info, SystemSource};
use collectors::MetricSource;
use config::{parse_percent, Config, ConfigError};
use exit_code::EXIT_FAILING;
use report::HealthReport;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "infra-health")]
#[command(version)]
#[command(about = "Sample CPU/memory/disk, scan logs for problem keywords, write a health report.")]
struct Cli {
    /// Optional YAML config; CLI flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    print_default_config: bool,
    /// Do not print the human summary.
    #[arg(long)]
    json_only: bool,
    /// Suppress non-essential output.
    #[arg(long)]
    quiet: bool,
    /// Also write a Markdown report next to the JSON one.
    #[arg(long, conflicts_with = "no_save")]
    export_md: bool,
    /// Do not write any report file.
    #[arg(long)]
    no_save: bool,
    #[arg(long, value_parser = parse_percent)]
    cpu_warn: Option<f64>,
    #[arg(long, value_parser = parse_percent)]
    cpu_critical: Option<f64>,
    #[arg(long, value_parser = parse_percent)]
    mem_warn: Option<f64>,
    #[arg(long, value_parser = parse_percent)]
    mem_critical: Option<f64>,
    #[arg(long, value_parser = parse_percent)]
    disk_warn: Option<f64>,
    #[arg(long, value_parser = parse_percent)]
    disk_critical: Option<f64>,
    /// Directory of log files to scan [default: logs]
    #[arg(long)]
    logs_dir: Option<PathBuf>,
    /// Directory reports are written to [default: reports]
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Replace sampled utilization with fixed demo values.
    #[arg(long, value_enum)]
    simulate: Option<SimulationProfile>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return;
    }

    let cfg = match resolve_config(&cli) {
        Ok(cfg) => cfg,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            eprintln!("error: {err}");
            std::process::exit(EXIT_FAILING.into());
        }
    };

    let code = run(&cli, &cfg);
    std::process::exit(code.into());
}

fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults, then the optional config file, then CLI flags.
fn resolve_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut cfg = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    if let Some(v) = cli.cpu_warn {
        cfg.thresholds.cpu.warn = v;
    }
    if let Some(v) = cli.cpu_critical {
        cfg.thresholds.cpu.critical = Some(v);
    }
    if let Some(v) = cli.mem_warn {
        cfg.thresholds.memory.warn = v;
    }
    if let Some(v) = cli.mem_critical {
        cfg.thresholds.memory.critical = Some(v);
    }
    if let Some(v) = cli.disk_warn {
        cfg.thresholds.disk.warn = v;
    }
    if let Some(v) = cli.disk_critical {
        cfg.thresholds.disk.critical = Some(v);
    }
    if let Some(dir) = &cli.logs_dir {
        cfg.logs_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        cfg.output_dir = dir.clone();
    }

    cfg.validate()?;
    Ok(cfg)
}

fn run(cli: &Cli, cfg: &Config) -> u8 {
    let started = Instant::now();

    let mut source: Box<dyn MetricSource> = match cli.simulate {
        Some(profile) => {
            info!(profile = ?profile, "simulation mode, sampled utilization is replaced");
            Box::new(SimulatedSource::new(profile, host_info()))
        }
        None => Box::new(SystemSource::new()),
    };

    let snapshot = source.snapshot();
    let log_analysis = collectors::logs::scan(&cfg.logs_dir, &cfg.patterns);
    let evaluations = evaluate::evaluate(&snapshot, &cfg.thresholds);
    let report = HealthReport::build(snapshot, log_analysis, cfg.thresholds, evaluations);

    if !cli.json_only {
        println!("{}", summary::render_summary(&report));
    }

    let mut save_failed = false;
    let mut saved: Vec<PathBuf> = Vec::new();
    if !cli.no_save {
        match report.persist(&cfg.output_dir) {
            Ok(path) => saved.push(path),
            Err(err) => {
                error!(error = %err, "failed to save JSON report");
                eprintln!("error: {err}");
                save_failed = true;
            }
        }
        if cli.export_md && !save_failed {
            match report.export_markdown(&cfg.output_dir) {
                Ok(path) => saved.push(path),
                Err(err) => {
                    error!(error = %err, "failed to save Markdown report");
                    eprintln!("error: {err}");
                    save_failed = true;
                }
            }
        }
    }

    if !cli.quiet {
        println!("Health check complete.");
        if cli.no_save {
            println!("No files saved (--no-save).");
        }
    }
    for path in &saved {
        let kind = match path.extension().and_then(|e| e.to_str()) {
            Some("md") => "Markdown",
            _ => "JSON",
        };
        println!("{kind} report saved to: {}", path.display());
    }

    let code = if save_failed {
        EXIT_FAILING
    } else {
        exit_code::resolve(report.evaluations.statuses())
    };

    let worst = report.worst_status();
    if code == EXIT_FAILING {
        warn!(worst = %worst, exit_code = code, "health check needs attention");
    }
    info!(
        worst = %worst,
        exit_code = code,
        elapsed = %humantime::format_duration(started.elapsed()),
        "health check finished"
    );
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let mut argv = vec!["infra-health"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv)
    }

    #[test]
    fn cli_flags_override_defaults() {
        let cli = parse(&["--cpu-warn", "50", "--disk-critical", "99", "--logs-dir", "/var/log/app"])
            .expect("valid args");
        let cfg = resolve_config(&cli).expect("valid config");
        assert_eq!(cfg.thresholds.cpu.warn, 50.0);
        assert_eq!(cfg.thresholds.cpu.critical, Some(90.0));
        assert_eq!(cfg.thresholds.disk.critical, Some(99.0));
        assert_eq!(cfg.logs_dir, PathBuf::from("/var/log/app"));
        assert_eq!(cfg.output_dir, PathBuf::from("reports"));
    }

    #[test]
    fn out_of_range_threshold_is_a_usage_error() {
        let err = parse(&["--mem-warn", "101"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn export_md_conflicts_with_no_save() {
        let err = parse(&["--export-md", "--no-save"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn simulate_accepts_known_profiles_only() {
        let cli = parse(&["--simulate", "critical"]).expect("valid profile");
        assert_eq!(cli.simulate, Some(SimulationProfile::Critical));
        assert!(parse(&["--simulate", "meltdown"]).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = parse(&["--config", "/does/not/exist.yaml"]).expect("valid args");
        assert!(matches!(resolve_config(&cli), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn cli_flag_replaces_out_of_range_file_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("health.yaml");
        std::fs::write(&path, "thresholds:\n  cpu:\n    warn: 150\n").expect("write");
        let path = path.to_string_lossy().to_string();

        let cli = parse(&["--config", &path]).expect("valid args");
        assert!(matches!(
            resolve_config(&cli),
            Err(ConfigError::Validation(_))
        ));

        let cli = parse(&["--config", &path, "--cpu-warn", "65"]).expect("valid args");
        let cfg = resolve_config(&cli).expect("override fixes the file value");
        assert_eq!(cfg.thresholds.cpu.warn, 65.0);
    }
}
