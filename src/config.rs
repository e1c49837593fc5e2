use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::error::ErrorKind;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "gpu_monitor", version)]
#[command(about = "Poll GPU SM utilization and power draw", long_about = None)]
pub struct Args {
    /// GPU device index
    #[arg(short = 'd', long = "device", default_value = "0")]
    device: u32,

    /// Redraw a live summary instead of printing a table
    #[arg(short = 'i', long)]
    interactive: bool,

    /// Poll interval in milliseconds
    #[arg(
        short = 't',
        long = "interval",
        default_value = "500",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    interval_ms: u64,

    /// Append samples to this CSV file (table mode only)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Stop after this many samples; negative runs until interrupted
    #[arg(short = 'x', long = "max-iterations", allow_negative_numbers = true)]
    max_iterations: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    Tabular,
}

/// Settings for a whole run. Built once from the command line, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub device: u32,
    pub mode: Mode,
    pub interval: Duration,
    pub output: Option<PathBuf>,
    /// `None` polls until interrupted
    pub max_iterations: Option<u64>,
}

impl Args {
    pub fn into_config(self) -> Config {
        Config {
            device: self.device,
            mode: if self.interactive {
                Mode::Interactive
            } else {
                Mode::Tabular
            },
            interval: Duration::from_millis(self.interval_ms),
            output: self.output,
            max_iterations: self.max_iterations.and_then(|n| u64::try_from(n).ok()),
        }
    }
}

impl Config {
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Args::try_parse_from(args).map(Args::into_config)
    }

    /// The CSV path, if one applies. Interactive mode never persists.
    pub fn sink_path(&self) -> Option<&Path> {
        match self.mode {
            Mode::Tabular => self.output.as_deref(),
            Mode::Interactive => None,
        }
    }

    pub fn should_continue(&self, completed: u64) -> bool {
        self.max_iterations.map_or(true, |max| completed < max)
    }
}

/// Process exit status for a command line that did not parse into a `Config`
pub fn exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::from_args(std::iter::once("gpu_monitor").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.device, 0);
        assert_eq!(config.mode, Mode::Tabular);
        assert_eq!(config.interval, Duration::from_millis(500));
        assert_eq!(config.output, None);
        assert_eq!(config.max_iterations, None);
    }

    #[test]
    fn test_all_flags() {
        let config = parse(&["-d", "2", "-i", "-t", "250", "-o", "out.csv", "-x", "10"]).unwrap();
        assert_eq!(config.device, 2);
        assert_eq!(config.mode, Mode::Interactive);
        assert_eq!(config.interval, Duration::from_millis(250));
        assert_eq!(config.output, Some(PathBuf::from("out.csv")));
        assert_eq!(config.max_iterations, Some(10));
    }

    #[test]
    fn test_flag_order_does_not_matter() {
        let a = parse(&["-x", "3", "-d", "1", "-t", "100"]).unwrap();
        let b = parse(&["-t", "100", "-d", "1", "-x", "3"]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_negative_iterations_are_unbounded() {
        let config = parse(&["-x", "-1"]).unwrap();
        assert_eq!(config.max_iterations, None);
        assert!(config.should_continue(u64::MAX - 1));
    }

    #[test]
    fn test_iteration_bound() {
        let config = parse(&["-x", "3"]).unwrap();
        assert!(config.should_continue(2));
        assert!(!config.should_continue(3));

        let config = parse(&["-x", "0"]).unwrap();
        assert!(!config.should_continue(0));
    }

    #[test]
    fn test_help_exits_successfully() {
        let err = parse(&["-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(exit_code(&err), 0);
    }

    #[test]
    fn test_help_wins_over_later_flags() {
        let err = parse(&["-h", "-d", "3"]).unwrap_err();
        assert_eq!(exit_code(&err), 0);
    }

    #[test]
    fn test_unknown_flag_fails() {
        let err = parse(&["-q"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn test_missing_value_fails() {
        for flag in ["-d", "-t", "-o", "-x"] {
            let err = parse(&[flag]).unwrap_err();
            assert_eq!(exit_code(&err), 1, "flag {flag}");
        }
    }

    #[test]
    fn test_bad_values_fail() {
        assert_eq!(exit_code(&parse(&["-t", "0"]).unwrap_err()), 1);
        assert_eq!(exit_code(&parse(&["-t", "fast"]).unwrap_err()), 1);
        assert_eq!(exit_code(&parse(&["-d", "-1"]).unwrap_err()), 1);
    }

    #[test]
    fn test_sink_only_in_tabular_mode() {
        let config = parse(&["-o", "out.csv"]).unwrap();
        assert_eq!(config.sink_path(), Some(Path::new("out.csv")));

        let config = parse(&["-i", "-o", "out.csv"]).unwrap();
        assert_eq!(config.sink_path(), None);
    }
}
