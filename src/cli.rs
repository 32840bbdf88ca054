//! Command-line parsing, `clap` derive in place of the original's
//! `getopt(argc, argv, "lqm")` (spec.md §2 NEW) — same three flags, same
//! "reject non-option arguments" behavior (clap derive has no positional
//! arguments declared, so any stray token is already a parse error).

use std::path::PathBuf;

use clap::Parser;

/// Quadrotor attitude control core and flight-mode supervisor.
#[derive(Parser, Debug)]
#[command(name = "flight-core")]
#[command(version)]
#[command(about = "Quadrotor attitude control core and flight-mode supervisor")]
pub struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "/etc/flight-core/flight.toml")]
    pub config: PathBuf,

    /// Enable saving a CSV log file for the flight.
    #[arg(short = 'l', long)]
    pub logging: bool,

    /// Enable mavlink-equivalent telemetry over UDP.
    #[arg(short = 'm', long)]
    pub mavlink: bool,

    /// Suppress the console printer thread.
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_all_disabled() {
        let args = Args::parse_from(["flight-core"]);
        assert!(!args.logging);
        assert!(!args.mavlink);
        assert!(!args.quiet);
        assert!(!args.verbose);
    }

    #[test]
    fn short_flags_combine() {
        let args = Args::parse_from(["flight-core", "-l", "-m", "-q"]);
        assert!(args.logging);
        assert!(args.mavlink);
        assert!(args.quiet);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let result = Args::try_parse_from(["flight-core", "--bogus"]);
        assert!(result.is_err());
    }
}
