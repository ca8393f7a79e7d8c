use anyhow::Result;
use exovet::cli::{self, Commands};
use exovet::commands::{init_config, triage};

fn main() -> Result<()> {
    env_logger::init();

    let cli = cli::parse_args();
    match cli.command {
        Commands::Triage {
            input,
            threshold,
            format,
            output,
            top_k,
            explain,
            samples,
            seed,
        } => triage::run(triage::TriageConfig {
            input,
            threshold,
            format: format.into(),
            output,
            top_k,
            explain,
            samples,
            seed,
        }),
        Commands::Init { force } => init_config(force),
    }
}
