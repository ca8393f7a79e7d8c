use crate::config::CONFIG_FILE_NAME;
use crate::io;
use anyhow::Result;
use std::path::PathBuf;

/// Template written by `exovet init`; values match the built-in defaults.
const DEFAULT_CONFIG: &str = r#"# Exovet Configuration

[threshold]
default = 0.5

[shap]
top_k = 8

[monitor]
poll_interval_ms = 2000

[grading]
f1_excellent = 0.8
f1_good = 0.6
mcc_imbalance = 0.3
"#;

pub fn init_config(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if io::file_exists(&config_path) && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    io::write_file(&config_path, DEFAULT_CONFIG)?;
    println!("Created {CONFIG_FILE_NAME} configuration file");

    Ok(())
}
