mod config;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{bail, Result, WrapErr};
use wattprobe_platform::ReaderConfig;

use config::{config_path, LogLevel, UserConfig};
use logging::LogMode;

/// Sample per-domain CPU power from the Linux powercap interface.
///
/// Every sample blocks for the measurement window (one second by default)
/// and reports the average power of each energy domain over that window.
#[derive(Debug, Parser)]
#[command(name = "wattprobe", version, verbatim_doc_comment)]
struct Cli {
    /// Powercap root directory [default: /sys/class/powercap]
    #[arg(long)]
    root: Option<PathBuf>,

    /// Zone name prefix of the energy domains [default: intel-rapl]
    #[arg(long)]
    prefix: Option<String>,

    /// Measurement window in milliseconds [default: 1000]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    delay_ms: Option<u64>,

    /// Number of samples to take (0 = until interrupted)
    #[arg(short, long, default_value_t = 1)]
    samples: u32,

    /// Print one JSON object per sample
    #[arg(short, long)]
    json: bool,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Write logs to a daily log file instead of stderr
    #[arg(long)]
    log_file: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_override = match cli.log_level.as_deref() {
        Some(level) => match LogLevel::from_str(level) {
            Some(level) => Some(level),
            None => bail!("Unknown log level: {}", level),
        },
        None => None,
    };

    let path = cli.config.clone().unwrap_or_else(config_path);
    let mut user_config = UserConfig::load_from(&path);
    user_config.merge_with_args(cli.root.clone(), cli.prefix.clone(), cli.delay_ms);
    user_config
        .validate()
        .wrap_err_with(|| format!("Invalid configuration in {}", path.display()))?;

    let mode = if cli.log_file {
        LogMode::File
    } else {
        LogMode::Stderr
    };
    let _log_guard = logging::init(user_config.log_level, mode, log_override);

    run(&cli, user_config.reader)
}

#[cfg(target_os = "linux")]
fn run(cli: &Cli, reader_config: ReaderConfig) -> Result<()> {
    use color_eyre::eyre::Report;
    use color_eyre::Section;
    use tracing::{debug, info, warn};
    use wattprobe_platform::linux::EnergyDomainReader;
    use wattprobe_platform::PowerBackend;

    use output::SampleRecord;

    let mut reader = EnergyDomainReader::new(reader_config);
    if !reader.is_available() {
        bail!("No energy counters found under {}", reader.root().display());
    }

    reader.initialize()?;
    info!(
        backend = reader.name(),
        domains = reader.domains().len(),
        delay_ms = reader.measure_delay().as_millis() as u64,
        "Backend initialized"
    );
    if reader.domains().is_empty() {
        warn!(root = %reader.root().display(), "No energy domains discovered");
    }

    let mut taken = 0u32;
    loop {
        let sample = reader.sample_domains().map_err(|e| {
            let denied = e.is_permission_denied();
            let report = Report::new(e).wrap_err("Failed to sample energy counters");
            if denied {
                report.suggestion(
                    "Energy counters are usually readable by root only, try running with sudo",
                )
            } else {
                report
            }
        })?;

        let record = SampleRecord::new(chrono::Utc::now(), &sample);
        if cli.json {
            println!("{}", record.to_json()?);
        } else {
            println!("{}", record.to_text());
        }

        taken += 1;
        debug!(taken, "Sample written");
        if cli.samples != 0 && taken >= cli.samples {
            break;
        }
    }

    reader.shutdown()?;
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn run(_cli: &Cli, _reader_config: ReaderConfig) -> Result<()> {
    bail!("wattprobe reads the Linux powercap interface and is not supported on this platform")
}
