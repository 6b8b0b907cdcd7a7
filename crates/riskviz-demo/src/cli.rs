#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `RISKVIZ_DEMO_*` prefix. Engine options
//! (colors, thresholds, timing) come from the `RISKVIZ_*` variables read by
//! `VisualizerConfig::from_env`.

use std::env;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
riskviz demo: live risk score badges in the terminal

USAGE:
    riskviz-demo [OPTIONS]

OPTIONS:
    --duration-ms=N   Quit after N milliseconds (default: 0, run until q)
    --frame-ms=N      Frame period in milliseconds (default: 50)
    --drift-ms=N      Time between score drifts (default: 2000)
    --no-animate      Do not opt badges into pulsing
    --help, -h        Show this help message
    --version, -V     Show version

KEYBINDINGS:
    s               Stop all animations
    r               Re-initialize every badge
    q / Esc / Ctrl+C  Quit

ENVIRONMENT VARIABLES:
    RISKVIZ_DEMO_DURATION_MS   Override --duration-ms
    RISKVIZ_DEMO_FRAME_MS      Override --frame-ms
    RISKVIZ_DEMO_DRIFT_MS      Override --drift-ms
    RISKVIZ_*                  Engine options (see riskviz_runtime::config)
    RUST_LOG                   Log filter (logs go to stderr)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub duration_ms: u64,
    /// Frame period.
    pub frame_ms: u64,
    /// Period of the score drift.
    pub drift_ms: u64,
    /// Whether badges opt into pulsing.
    pub animate: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            duration_ms: 0,
            frame_ms: 50,
            drift_ms: 2000,
            animate: true,
        }
    }
}

/// Outcome of parsing: run, or print something and exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse process arguments and environment, exiting on `--help`,
    /// `--version` or invalid input.
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match Self::parse_from(&args, |key| env::var(key).ok()) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("riskviz-demo {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with `get` as the environment.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit flags. Unparseable environment values are ignored.
    pub fn parse_from<F>(args: &[String], mut get: F) -> Result<Parsed, String>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        if let Some(n) = get("RISKVIZ_DEMO_DURATION_MS").and_then(|v| v.parse().ok()) {
            opts.duration_ms = n;
        }
        if let Some(n) = get("RISKVIZ_DEMO_FRAME_MS").and_then(|v| v.parse().ok()) {
            opts.frame_ms = n;
        }
        if let Some(n) = get("RISKVIZ_DEMO_DRIFT_MS").and_then(|v| v.parse().ok()) {
            opts.drift_ms = n;
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "--no-animate" => opts.animate = false,
                other => {
                    if let Some(val) = other.strip_prefix("--duration-ms=") {
                        opts.duration_ms = parse_ms("--duration-ms", val)?;
                    } else if let Some(val) = other.strip_prefix("--frame-ms=") {
                        opts.frame_ms = parse_ms("--frame-ms", val)?;
                    } else if let Some(val) = other.strip_prefix("--drift-ms=") {
                        opts.drift_ms = parse_ms("--drift-ms", val)?;
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        opts.frame_ms = opts.frame_ms.max(1);
        opts.drift_ms = opts.drift_ms.max(1);
        Ok(Parsed::Run(opts))
    }
}

fn parse_ms(flag: &str, val: &str) -> Result<u64, String> {
    val.parse()
        .map_err(|_| format!("Invalid {flag} value: {val}"))
}
