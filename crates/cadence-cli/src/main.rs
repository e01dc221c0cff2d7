//! `cadence-cli` – hosted device runner
//!
//! Runs the cadence application on the host as if it were firmware:
//!
//! 1. Loads `cadence.toml` (first argument, or the working directory);
//!    `cadence --init [path]` writes a default one instead.
//! 2. Builds a host board: wall clock, software watchdog, configured MAC,
//!    process-exit reset.
//! 3. Forms the device identity, registers the demo components, runs setup.
//! 4. Ticks until Ctrl-C, a reboot, or `max_ticks`, then runs the safe
//!    shutdown hooks and prints a JSON run summary.

mod components;
mod config;

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use cadence_hal::{Board, SoftwareWatchdog};
use cadence_runtime::{Application, NullScheduler, init_tracing};
use colored::Colorize;
use serde::Serialize;
use tracing::{error, info, warn};

use components::{StatusReporter, UptimeSensor, VersionTextSensor};
use config::Config;

const COMPILATION_TIME: &str = env!("CADENCE_COMPILATION_TIME");

/// Printed on exit.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    name: &'a str,
    compilation_time: &'a str,
    ticks: u64,
    app_state: u32,
    last_reported_state: u32,
    components: usize,
    looping: usize,
    entities: usize,
    rebooted: bool,
}

fn main() -> ExitCode {
    if let Err(e) = init_tracing() {
        eprintln!("tracing already initialised: {e}");
    }

    let mut args = std::env::args().skip(1);
    let first = args.next();
    if first.as_deref() == Some("--init") {
        return write_default_config(config::config_path(args.next()));
    }

    print_banner();

    let path = config::config_path(first);
    let cfg = match config::load_from(&path) {
        Ok(Some(cfg)) => {
            println!("  Config loaded from {}", path.display().to_string().bold());
            cfg
        }
        Ok(None) => {
            println!(
                "  {} not found; using defaults.",
                path.display().to_string().bold()
            );
            let mut cfg = Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            return ExitCode::FAILURE;
        }
    };

    match run(&cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "device run aborted");
            ExitCode::FAILURE
        }
    }
}

fn run(cfg: &Config) -> Result<(), config::ConfigError> {
    // ── Shutdown flag ─────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – shutting down …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; shutdown hooks will not run on Ctrl-C");
    }

    // ── Board & application ───────────────────────────────────────────────
    let board = Board::builder()
        .watchdog(Box::new(SoftwareWatchdog::new(Duration::from_millis(
            cfg.watchdog_timeout_ms,
        ))))
        .mac_address(cfg.mac()?)
        .build();

    let mut app = Application::new(board, Box::new(NullScheduler));
    app.pre_setup(&cfg.name, COMPILATION_TIME, cfg.name_add_mac_suffix);
    app.set_loop_interval(cfg.loop_interval_ms);

    let version = format!("{} {}", env!("CARGO_PKG_VERSION"), COMPILATION_TIME);
    // Component registration only fails after setup has begun.
    let reporter = StatusReporter::new();
    let last_reported = reporter.last_seen();
    for result in [
        app.register_component(reporter),
        app.register_component(UptimeSensor::new(cfg.uptime_update_interval_ms)),
        app.register_component(VersionTextSensor::new(version)),
    ] {
        if let Err(e) = result {
            warn!(error = %e, "component not registered");
        }
    }

    println!(
        "  Device {} starting ({} ms loop)\n",
        app.get_name().bold().cyan(),
        app.get_loop_interval()
    );

    app.setup();
    app.schedule_dump_config();

    // ── Main loop ─────────────────────────────────────────────────────────
    while !shutdown.load(Ordering::SeqCst) && !app.is_halted() {
        if cfg.max_ticks.is_some_and(|max| app.tick_count() >= max) {
            info!(ticks = app.tick_count(), "tick limit reached");
            break;
        }
        app.tick();
    }

    let rebooted = app.is_halted();
    if !rebooted {
        app.run_safe_shutdown_hooks();
    }

    let summary = RunSummary {
        name: app.get_name(),
        compilation_time: app.get_compilation_time(),
        ticks: app.tick_count(),
        app_state: app.get_app_state(),
        last_reported_state: last_reported.get().bits(),
        components: app.components().len(),
        looping: app.components().looping().len(),
        entities: app.entities().len(),
        rebooted,
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!(error = %e, "failed to render run summary"),
    }
    Ok(())
}

fn write_default_config(path: std::path::PathBuf) -> ExitCode {
    match config::save_to(&Config::default(), &path) {
        Ok(()) => {
            println!(
                "  {} Config written to {}",
                "✓".green().bold(),
                path.display().to_string().bold()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}: {}", "Error writing config".red(), e);
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ______          __                    "#.bold().cyan());
    println!("{}", r#"  / ____/___ _____/ /__  ____  ________  "#.bold().cyan());
    println!("{}", r#" / /   / __ `/ __  / _ \/ __ \/ ___/ _ \ "#.bold().cyan());
    println!("{}", r#"/ /___/ /_/ / /_/ /  __/ / / / /__/  __/ "#.bold().cyan());
    println!("{}", r#"\____/\__,_/\__,_/\___/_/ /_/\___/\___/  "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "Cadence".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Hosted device runtime, built {COMPILATION_TIME}");
    println!();
}
