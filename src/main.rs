//! brightr binary entry point.
//!
//! Parses the small CLI surface, wires the production collaborators (TOML
//! settings store, HTTP lookups, sysfs backlight), and runs the trigger loop
//! that feeds the scheduling engine.

use anyhow::Result;
use std::sync::Arc;

use brightr::{log_block_start, log_end, log_error, log_pipe, log_version};

use brightr::backend;
use brightr::common::constants::EXIT_FAILURE;
use brightr::config::{self, TomlSettingsStore};
use brightr::core::{Engine, EngineParams, Trigger};
use brightr::geo::lookup::HttpGeoLookup;
use brightr::io::notify::LogNotifier;
use brightr::io::signals::{self, EngineSignal, setup_signal_handler};
use brightr::sun::lookup::HttpSunTimesSource;

struct Args {
    debug: bool,
    once: bool,
    config_dir: Option<String>,
}

fn print_help() {
    println!("brightr v{}", env!("CARGO_PKG_VERSION"));
    println!("Automatic sunrise/sunset brightness scheduling for laptop displays");
    println!();
    println!("Usage: brightr [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -d, --debug         Enable detailed debug output");
    println!("      --once          Run a single apply-now cycle and exit");
    println!("  -c, --config <DIR>  Use an alternate configuration directory");
    println!("  -h, --help          Print help");
    println!("  -V, --version       Print version");
    println!();
    println!("Signals:");
    println!("  SIGUSR1             Apply the schedule now");
    println!("  SIGUSR2             Reload settings from disk");
    println!("  SIGTERM/SIGINT      Shut down");
}

fn parse_args() -> Args {
    let mut args = Args {
        debug: false,
        once: false,
        config_dir: None,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-d" | "--debug" => args.debug = true,
            "--once" => args.once = true,
            "-c" | "--config" => match iter.next() {
                Some(dir) => args.config_dir = Some(dir),
                None => {
                    eprintln!("Error: --config requires a directory argument");
                    std::process::exit(EXIT_FAILURE);
                }
            },
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("brightr {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            other => {
                eprintln!("Error: unknown argument '{other}' (try --help)");
                std::process::exit(EXIT_FAILURE);
            }
        }
    }

    args
}

fn main() {
    let args = parse_args();
    if let Err(e) = run(args) {
        log_pipe!();
        log_error!("{e:#}");
        log_end!();
        std::process::exit(EXIT_FAILURE);
    }
}

fn run(args: Args) -> Result<()> {
    config::set_config_dir(args.config_dir)?;

    log_version!();

    let settings = config::loading::load();
    settings.log_settings();

    let backend = backend::detect_backend(args.debug)?;
    log_block_start!("Detected backend: {}", backend.backend_name());

    let engine = Engine::new(EngineParams {
        settings,
        store: Box::new(TomlSettingsStore),
        geo: Box::new(HttpGeoLookup::new()?),
        sun: Box::new(HttpSunTimesSource::new()?),
        backend,
        notifier: Box::new(LogNotifier),
        debug_enabled: args.debug,
    });

    if args.once {
        let _ = engine.run_cycle_blocking(Trigger::ApplyNow);
        log_end!();
        return Ok(());
    }

    let signal_state = setup_signal_handler(args.debug)?;
    signals::spawn_tick_timer(
        signal_state.sender.clone(),
        Arc::clone(&signal_state.running),
        engine.update_interval(),
    );

    // Initial cycle counts as user-initiated, like pressing "Apply now"
    engine.trigger(Trigger::ApplyNow);

    for message in &signal_state.receiver {
        match message {
            EngineSignal::Tick => {
                engine.trigger(Trigger::Periodic);
            }
            EngineSignal::ApplyNow => {
                engine.trigger(Trigger::ApplyNow);
            }
            EngineSignal::ReloadSettings => {
                log_block_start!("Reloading settings");
                engine.reload_settings();
                engine.trigger(Trigger::ApplyNow);
            }
            EngineSignal::Shutdown => break,
        }
    }

    log_block_start!("Shutting down brightr...");
    log_end!();
    Ok(())
}
