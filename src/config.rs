use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Decision threshold configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdSection {
    /// Starting threshold for sessions and the CLI (0.0-1.0)
    #[serde(default = "default_threshold")]
    pub default: f64,
}

impl Default for ThresholdSection {
    fn default() -> Self {
        Self {
            default: default_threshold(),
        }
    }
}

impl ThresholdSection {
    fn validate(&self) -> Result<(), String> {
        if (0.0..=1.0).contains(&self.default) {
            Ok(())
        } else {
            Err(format!(
                "threshold default must be between 0.0 and 1.0, got {}",
                self.default
            ))
        }
    }
}

fn default_threshold() -> f64 {
    0.5 // Even split between the classes until tuned
}

/// Feature attribution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapSection {
    /// How many features to keep when ranking SHAP values
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for ShapSection {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

impl ShapSection {
    fn validate(&self) -> Result<(), String> {
        if self.top_k >= 1 {
            Ok(())
        } else {
            Err("shap top_k must be at least 1".to_string())
        }
    }
}

fn default_top_k() -> usize {
    8
}

/// Job monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSection {
    /// Delay between status fetches, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl MonitorSection {
    fn validate(&self) -> Result<(), String> {
        if self.poll_interval_ms >= 1 {
            Ok(())
        } else {
            Err("monitor poll_interval_ms must be at least 1".to_string())
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    2000
}

/// Grade bands for threshold advice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingSection {
    /// F1 at or above this grades Excellent (0.0-1.0)
    #[serde(default = "default_f1_excellent")]
    pub f1_excellent: f64,

    /// F1 at or above this grades Good (0.0-1.0)
    #[serde(default = "default_f1_good")]
    pub f1_good: f64,

    /// MCC below this flags a likely class imbalance (0.0-1.0)
    #[serde(default = "default_mcc_imbalance")]
    pub mcc_imbalance: f64,
}

impl Default for GradingSection {
    fn default() -> Self {
        Self {
            f1_excellent: default_f1_excellent(),
            f1_good: default_f1_good(),
            mcc_imbalance: default_mcc_imbalance(),
        }
    }
}

impl GradingSection {
    fn collect_band_validations(&self) -> Vec<Result<(), String>> {
        vec![
            Self::validate_band(self.f1_excellent, "f1_excellent"),
            Self::validate_band(self.f1_good, "f1_good"),
            Self::validate_band(self.mcc_imbalance, "mcc_imbalance"),
        ]
    }

    fn validate_band(band: f64, name: &str) -> Result<(), String> {
        if (0.0..=1.0).contains(&band) {
            Ok(())
        } else {
            Err(format!("grading {} must be between 0.0 and 1.0", name))
        }
    }

    fn validate(&self) -> Result<(), String> {
        for validation in self.collect_band_validations() {
            validation?;
        }
        if self.f1_good > self.f1_excellent {
            return Err(format!(
                "grading f1_good ({}) must not exceed f1_excellent ({})",
                self.f1_good, self.f1_excellent
            ));
        }
        Ok(())
    }
}

fn default_f1_excellent() -> f64 {
    0.8
}

fn default_f1_good() -> f64 {
    0.6
}

fn default_mcc_imbalance() -> f64 {
    0.3 // Below this, healthy precision/recall usually hides an imbalance
}

/// Root configuration structure for exovet
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExovetConfig {
    /// Decision threshold configuration
    #[serde(default)]
    pub threshold: Option<ThresholdSection>,

    /// Feature attribution configuration
    #[serde(default)]
    pub shap: Option<ShapSection>,

    /// Job monitor configuration
    #[serde(default)]
    pub monitor: Option<MonitorSection>,

    /// Grade bands for threshold advice
    #[serde(default)]
    pub grading: Option<GradingSection>,
}

impl ExovetConfig {
    /// Every validation failure across all present sections.
    pub fn validation_errors(&self) -> Vec<String> {
        let validations = [
            self.threshold.as_ref().map(|s| s.validate()),
            self.shap.as_ref().map(|s| s.validate()),
            self.monitor.as_ref().map(|s| s.validate()),
            self.grading.as_ref().map(|s| s.validate()),
        ];
        validations
            .into_iter()
            .flatten()
            .filter_map(Result::err)
            .collect()
    }
}

/// Cache the configuration
static CONFIG: OnceLock<ExovetConfig> = OnceLock::new();

pub const CONFIG_FILE_NAME: &str = "exovet.toml";

/// Pure function to read config file contents
fn read_config_file(path: &Path) -> Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Pure function to parse and validate config from TOML string
#[cfg(test)]
pub(crate) fn parse_and_validate_config(contents: &str) -> Result<ExovetConfig, String> {
    parse_and_validate_config_impl(contents)
}

fn parse_and_validate_config_impl(contents: &str) -> Result<ExovetConfig, String> {
    let mut config = toml::from_str::<ExovetConfig>(contents)
        .map_err(|e| format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e))?;

    // An invalid section falls back to its defaults; the rest of the file
    // still applies.
    if let Some(ref threshold) = config.threshold {
        if let Err(e) = threshold.validate() {
            eprintln!("Warning: {}. Using defaults.", e);
            config.threshold = Some(ThresholdSection::default());
        }
    }
    if let Some(ref shap) = config.shap {
        if let Err(e) = shap.validate() {
            eprintln!("Warning: {}. Using defaults.", e);
            config.shap = Some(ShapSection::default());
        }
    }
    if let Some(ref monitor) = config.monitor {
        if let Err(e) = monitor.validate() {
            eprintln!("Warning: {}. Using defaults.", e);
            config.monitor = Some(MonitorSection::default());
        }
    }
    if let Some(ref grading) = config.grading {
        if let Err(e) = grading.validate() {
            eprintln!("Warning: {}. Using defaults.", e);
            config.grading = Some(GradingSection::default());
        }
    }

    Ok(config)
}

/// Pure function to try loading config from a specific path
fn try_load_config_from_path(config_path: &Path) -> Option<ExovetConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config_impl(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            eprintln!("Warning: {}. Using defaults.", e);
            None
        }
    }
}

/// Handle file read errors with appropriate logging
fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

fn directory_ancestors_impl(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

pub fn load_config() -> ExovetConfig {
    const MAX_TRAVERSAL_DEPTH: usize = 10;

    let current = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            return ExovetConfig::default();
        }
    };

    // Search for config file in directory hierarchy
    directory_ancestors_impl(current, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            ExovetConfig::default()
        })
}

/// Get the cached configuration
pub fn get_config() -> &'static ExovetConfig {
    CONFIG.get_or_init(load_config)
}

/// Starting decision threshold (default: 0.5)
pub fn get_default_threshold() -> f64 {
    get_config()
        .threshold
        .as_ref()
        .map(|t| t.default)
        .unwrap_or_else(default_threshold)
}

/// SHAP ranking depth (default: 8)
pub fn get_top_k() -> usize {
    get_config()
        .shap
        .as_ref()
        .map(|s| s.top_k)
        .unwrap_or_else(default_top_k)
}

/// Delay between job status fetches (default: 2s)
pub fn get_poll_interval() -> Duration {
    let ms = get_config()
        .monitor
        .as_ref()
        .map(|m| m.poll_interval_ms)
        .unwrap_or_else(default_poll_interval_ms);
    Duration::from_millis(ms)
}

/// Grade bands for threshold advice (with defaults)
pub fn get_grading() -> GradingSection {
    get_config().grading.clone().unwrap_or_default()
}
