//! remote-array - paint a networked LED strip from a config file
//!
//! Connects to the controller named in the config, paints every LED with
//! one color and flushes. With `--hold` it keeps re-sending the frame once
//! per second so a controller that reboots picks the colors up again.

use remote_array::config::MirrorConfig;
use remote_array::{Error, RemoteLed, Result};
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Command line options
struct Args {
    config_path: Option<String>,
    color: Option<u32>,
    hold: Option<Duration>,
}

/// Parse a color given as `0xRRGGBB`, `#RRGGBB` or decimal
fn parse_color(value: &str) -> Result<u32> {
    let parsed = if let Some(hex) = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .or_else(|| value.strip_prefix('#'))
    {
        u32::from_str_radix(hex, 16)
    } else {
        value.parse()
    };
    parsed.map_err(|e| Error::Config(format!("Invalid color '{}': {}", value, e)))
}

/// Parse command line arguments.
///
/// Supports:
/// - `remote-array <path>` (positional config path)
/// - `remote-array --config <path>` / `-c <path>`
/// - `--color <value>` to override `strip.fill`
/// - `--hold <secs>` to keep re-flushing (0 = until Ctrl-C)
fn parse_args() -> Result<Args> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut parsed = Args {
        config_path: None,
        color: None,
        hold: None,
    };

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args.get(i + 1);
        match (flag, value) {
            ("--config" | "-c", Some(v)) => parsed.config_path = Some(v.clone()),
            ("--color", Some(v)) => parsed.color = Some(parse_color(v)?),
            ("--hold", Some(v)) => {
                let secs: u64 = v
                    .parse()
                    .map_err(|e| Error::Config(format!("Invalid hold '{}': {}", v, e)))?;
                parsed.hold = Some(Duration::from_secs(secs));
            }
            (positional, _) if !positional.starts_with('-') => {
                parsed.config_path = Some(positional.to_string());
                i += 1;
                continue;
            }
            (other, _) => {
                return Err(Error::Config(format!("Unknown or incomplete option: {}", other)));
            }
        }
        i += 2;
    }

    Ok(parsed)
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let config = match &args.config_path {
        Some(path) => MirrorConfig::from_file(path)?,
        None => MirrorConfig::default(),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("remote-array v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &args.config_path {
        log::info!("Using config: {}", path);
    }

    let fill = args.color.unwrap_or(config.strip.fill);
    let mut strip = RemoteLed::connect_with_options(
        &config.endpoint.host,
        config.endpoint.port,
        config.strip.count,
        fill,
        config.transport.options(),
    )?;
    log::info!(
        "Painted {} LEDs with {:#010x} on {}",
        strip.len(),
        fill,
        strip.endpoint()
    );

    if let Some(hold) = args.hold {
        let running = Arc::new(AtomicBool::new(true));
        let r = Arc::clone(&running);
        ctrlc::set_handler(move || {
            log::info!("Received shutdown signal");
            r.store(false, Ordering::Relaxed);
        })
        .map_err(|e| Error::Config(format!("Error setting Ctrl-C handler: {}", e)))?;

        let started = Instant::now();
        let mut last_flush = Instant::now();
        while running.load(Ordering::Relaxed) && (hold.is_zero() || started.elapsed() < hold) {
            if last_flush.elapsed() >= Duration::from_secs(1) {
                strip.flush(false)?;
                last_flush = Instant::now();
            }
            thread::sleep(Duration::from_millis(50));
        }

        let stats = strip.stats();
        log::info!(
            "Sent {} frames ({} bytes), {} reconnects",
            stats.frames_sent,
            stats.bytes_sent,
            stats.reconnects
        );
    }

    strip.close();
    log::info!("remote-array stopped");
    Ok(())
}
