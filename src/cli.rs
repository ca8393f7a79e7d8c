use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "exovet")]
#[command(about = "Exoplanet candidate triage and threshold analysis", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a prediction batch and evaluate threshold metrics
    Triage {
        /// Prediction response JSON (omit to synthesize a demo set)
        input: Option<PathBuf>,

        /// Decision threshold, 0.0 to 1.0 (defaults to config)
        #[arg(short, long, value_parser = parse_unit_interval)]
        threshold: Option<f64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// How many top SHAP features to keep (defaults to config)
        #[arg(long = "top-k")]
        top_k: Option<usize>,

        /// Show feature attributions for the target at this index
        #[arg(long)]
        explain: Option<usize>,

        /// Demo set size when no input file is given
        #[arg(long, default_value = "1000")]
        samples: usize,

        /// Demo set seed when no input file is given
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    Json,
    Terminal,
}

impl From<OutputFormat> for crate::io::output::OutputFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Json => crate::io::output::OutputFormat::Json,
            OutputFormat::Terminal => crate::io::output::OutputFormat::Terminal,
        }
    }
}

fn parse_unit_interval(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("not a number: {e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside the range 0.0 to 1.0"))
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triage_defaults() {
        let cli = Cli::try_parse_from(["exovet", "triage"]).unwrap();
        match cli.command {
            Commands::Triage {
                input,
                threshold,
                format,
                samples,
                seed,
                ..
            } => {
                assert!(input.is_none());
                assert!(threshold.is_none());
                assert_eq!(format, OutputFormat::Terminal);
                assert_eq!(samples, 1000);
                assert_eq!(seed, 42);
            }
            _ => panic!("expected triage"),
        }
    }

    #[test]
    fn triage_accepts_a_file_and_threshold() {
        let cli =
            Cli::try_parse_from(["exovet", "triage", "preds.json", "--threshold", "0.7"]).unwrap();
        match cli.command {
            Commands::Triage {
                input, threshold, ..
            } => {
                assert_eq!(input.unwrap(), PathBuf::from("preds.json"));
                assert_eq!(threshold, Some(0.7));
            }
            _ => panic!("expected triage"),
        }
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        assert!(Cli::try_parse_from(["exovet", "triage", "--threshold", "1.5"]).is_err());
        assert!(Cli::try_parse_from(["exovet", "triage", "--threshold", "-0.1"]).is_err());
        assert!(Cli::try_parse_from(["exovet", "triage", "--threshold", "nan"]).is_err());
    }

    #[test]
    fn json_format_parses() {
        let cli = Cli::try_parse_from(["exovet", "triage", "--format", "json"]).unwrap();
        match cli.command {
            Commands::Triage { format, .. } => assert_eq!(format, OutputFormat::Json),
            _ => panic!("expected triage"),
        }
    }

    #[test]
    fn init_parses_force_flag() {
        let cli = Cli::try_parse_from(["exovet", "init", "--force"]).unwrap();
        match cli.command {
            Commands::Init { force } => assert!(force),
            _ => panic!("expected init"),
        }
    }
}
