// SkyBench - Flight Sensor Simulation Bench
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{error, warn};

use skybench_config::{BackendKind, BenchManifest};
use skybench_core::backend::{Backend, RegisterPage, RegisterPageMut};
use skybench_core::ctrl;
use skybench_core::reader;
use skybench_core::regmap::{self, DEFAULT_DEVICE_PATH, DEFAULT_SHM_PATH};
use skybench_core::writer::Writer;

const EXIT_OK: u8 = 0;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

/// Cleared by the interrupt handler; every long-running loop polls it.
static RUNNING: AtomicBool = AtomicBool::new(true);

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "SkyBench flight sensor register bench",
    long_about = None
)]
struct Cli {
    /// Enable debug-level diagnostics
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the sensor writer until interrupted.
    Run(RunArgs),

    /// Set or clear CTRL bits on a live register page.
    Ctrl(CtrlArgs),

    /// Poll and print decoded sensor frames.
    Watch(WatchArgs),

    /// Poll and print only the tick counter.
    Tick(TickArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendChoice {
    /// Memory-mapped device node (UIO region)
    Device,
    /// Plain shared file
    File,
}

#[derive(Args, Debug)]
struct BackendArgs {
    /// Memory backend for the register page
    #[arg(long, value_enum, default_value_t = BackendChoice::Device)]
    backend: BackendChoice,

    /// Device node path for the device backend
    #[arg(long, default_value = DEFAULT_DEVICE_PATH)]
    device: PathBuf,

    /// Shared file path for the file backend
    #[arg(long, default_value = DEFAULT_SHM_PATH)]
    file: PathBuf,
}

impl BackendArgs {
    fn to_backend(&self) -> Backend {
        match self.backend {
            BackendChoice::Device => Backend::Device(self.device.clone()),
            BackendChoice::File => Backend::File(self.file.clone()),
        }
    }
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Memory backend for the register page (overrides the manifest)
    #[arg(long, value_enum)]
    backend: Option<BackendChoice>,

    /// Device node path for the device backend
    #[arg(long)]
    device: Option<PathBuf>,

    /// Shared file path for the file backend
    #[arg(long)]
    file: Option<PathBuf>,

    /// Update rate in Hz
    #[arg(long)]
    rate: Option<f64>,

    /// Fixed noise seed; drawn from the wall clock when omitted
    #[arg(long)]
    seed: Option<u32>,

    /// Bench manifest (YAML); explicit flags take precedence
    #[arg(short, long)]
    manifest: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct CtrlArgs {
    #[command(flatten)]
    backend: BackendArgs,

    /// Bit index to set (1-based, 0 = none)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=32))]
    set: u32,

    /// Bit index to clear (1-based, 0 = none); applied after --set
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=32))]
    clear: u32,
}

#[derive(Parser, Debug)]
struct WatchArgs {
    #[command(flatten)]
    backend: BackendArgs,

    /// Number of polls before exiting (0 = run until interrupted)
    #[arg(long, default_value_t = 20)]
    count: u64,

    /// Poll interval in seconds
    #[arg(long, default_value_t = 0.2)]
    interval: f64,

    /// Print each frame as one JSON object per line
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct TickArgs {
    #[command(flatten)]
    backend: BackendArgs,

    /// Number of polls before exiting (0 = run until interrupted)
    #[arg(long, default_value_t = 10)]
    count: u64,

    /// Poll interval in seconds
    #[arg(long, default_value_t = 0.2)]
    interval: f64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    if let Err(e) = ctrlc::set_handler(|| RUNNING.store(false, Ordering::SeqCst)) {
        warn!("Failed to install interrupt handler: {e}");
    }

    match cli.command {
        Commands::Run(args) => run_writer(args),
        Commands::Ctrl(args) => run_ctrl(args),
        Commands::Watch(args) => run_watch(args),
        Commands::Tick(args) => run_tick(args),
    }
}

struct RunConfig {
    backend: Backend,
    rate_hz: f64,
    seed: Option<u32>,
}

fn resolve_run_config(args: &RunArgs) -> anyhow::Result<RunConfig> {
    let manifest = match &args.manifest {
        Some(path) => Some(BenchManifest::from_file(path)?),
        None => None,
    };

    let rate_hz = args
        .rate
        .or(manifest.as_ref().map(|m| m.rate_hz))
        .unwrap_or(100.0);
    if !rate_hz.is_finite() || rate_hz <= 0.0 {
        anyhow::bail!("--rate must be positive and finite, got {rate_hz}");
    }

    let seed = args.seed.or(manifest.as_ref().and_then(|m| m.seed));

    let kind = match (args.backend, &manifest) {
        (Some(BackendChoice::Device), _) => BackendKind::Device,
        (Some(BackendChoice::File), _) => BackendKind::File,
        (None, Some(m)) => m.backend.kind,
        (None, None) => BackendKind::Device,
    };
    // The manifest's path only applies when the effective kind is the
    // manifest's own; a --backend override must not inherit it.
    let manifest_path = manifest
        .as_ref()
        .filter(|m| m.backend.kind == kind)
        .and_then(|m| m.backend.path.clone());
    let backend = match kind {
        BackendKind::Device => Backend::Device(
            args.device
                .clone()
                .or(manifest_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DEVICE_PATH)),
        ),
        BackendKind::File => Backend::File(
            args.file
                .clone()
                .or(manifest_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SHM_PATH)),
        ),
    };

    Ok(RunConfig {
        backend,
        rate_hz,
        seed,
    })
}

fn seed_from_clock() -> u32 {
    // Truncated to the register width; only the low bits need to vary
    // between runs.
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or_default()
}

fn run_writer(args: RunArgs) -> ExitCode {
    let config = match resolve_run_config(&args) {
        Ok(c) => c,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    tracing::info!(backend = %config.backend, rate_hz = config.rate_hz, "starting sensor writer");
    let page = match RegisterPageMut::open(&config.backend) {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    };

    let seed = config.seed.unwrap_or_else(seed_from_clock);
    let mut writer = Writer::new(page, config.rate_hz, seed);
    writer.run(&RUNNING);
    ExitCode::from(EXIT_OK)
}

fn run_ctrl(args: CtrlArgs) -> ExitCode {
    let backend = args.backend.to_backend();
    let mut page = match RegisterPageMut::open(&backend) {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    };

    let old = page.read_u32(regmap::CTRL);
    let new = ctrl::apply_bits(old, args.set, args.clear);
    page.write_u32(regmap::CTRL, new);
    if let Err(e) = page.flush() {
        error!("CTRL write-back failed: {e}");
        return ExitCode::from(EXIT_RUNTIME_ERROR);
    }

    println!("CTRL: 0x{old:08X} -> 0x{new:08X}");
    ExitCode::from(EXIT_OK)
}

fn run_watch(args: WatchArgs) -> ExitCode {
    let backend = args.backend.to_backend();
    let page = match RegisterPage::open(&backend) {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    };

    let interval = Duration::from_secs_f64(args.interval.max(0.0));
    let mut polled = 0u64;
    while RUNNING.load(Ordering::SeqCst) && (args.count == 0 || polled < args.count) {
        let frame = reader::decode_sample(page.bytes());
        if args.json {
            match serde_json::to_string(&frame) {
                Ok(line) => println!("{line}"),
                Err(e) => {
                    error!("Failed to encode frame: {e}");
                    return ExitCode::from(EXIT_RUNTIME_ERROR);
                }
            }
        } else {
            let s = &frame.sample;
            println!(
                "tick={:10} ax={:+.3} gz={:+.3} v={:5.2} lat={:+.6} lon={:+.6} alt={:6.1}",
                frame.tick_us,
                s.accel[0],
                s.gyro[2],
                s.airspeed_ms,
                s.gps_lat_deg,
                s.gps_lon_deg,
                s.gps_alt_m
            );
        }

        polled += 1;
        if args.count == 0 || polled < args.count {
            thread::sleep(interval);
        }
    }

    ExitCode::from(EXIT_OK)
}

fn run_tick(args: TickArgs) -> ExitCode {
    let backend = args.backend.to_backend();
    let page = match RegisterPage::open(&backend) {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    };

    let interval = Duration::from_secs_f64(args.interval.max(0.0));
    let mut polled = 0u64;
    while RUNNING.load(Ordering::SeqCst) && (args.count == 0 || polled < args.count) {
        println!("{}", reader::decode_tick_us(page.bytes()));
        polled += 1;
        if args.count == 0 || polled < args.count {
            thread::sleep(interval);
        }
    }

    ExitCode::from(EXIT_OK)
}
