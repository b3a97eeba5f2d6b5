use std::process::ExitCode;

use civic_core::config::DEFAULT_SEED;
use civic_core::params::CivicParams;

mod agent_mode;

/// Command-line switches. Everything else is configured through `MPULSE_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub seed: u64,
    /// Replace the seeded simulated source with one that always fails, so
    /// every sync scores the fallback readings.
    pub offline: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            offline: false,
        }
    }
}

impl CliOptions {
    pub fn parse<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--offline" => options.offline = true,
                "--seed" => {
                    let value = args.next().ok_or("--seed needs a value")?;
                    options.seed = value
                        .parse()
                        .map_err(|_| format!("--seed expects an unsigned integer, got {value:?}"))?;
                }
                other => return Err(format!("unknown argument {other:?}")),
            }
        }
        Ok(options)
    }
}

fn main() -> ExitCode {
    let options = match CliOptions::parse(std::env::args().skip(1)) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("mpulse: {e}");
            eprintln!("usage: mpulse [--seed N] [--offline]");
            return ExitCode::from(2);
        }
    };
    let params = match CivicParams::from_env() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("mpulse: {e}");
            return ExitCode::from(2);
        }
    };

    agent_mode::run_agent_mode(options, params);
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions, String> {
        CliOptions::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_without_arguments() {
        assert_eq!(parse(&[]).unwrap(), CliOptions::default());
    }

    #[test]
    fn seed_and_offline() {
        let options = parse(&["--offline", "--seed", "7"]).unwrap();
        assert!(options.offline);
        assert_eq!(options.seed, 7);
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(parse(&["--seed"]).is_err());
        assert!(parse(&["--seed", "-1"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
    }
}
