//! CLI command implementations for exovet operations.
//!
//! Each submodule handles one command with its configuration and
//! execution logic.
//!
//! Available commands:
//! - **triage**: Evaluate a prediction set at a decision threshold
//! - **init**: Initialize a new exovet configuration file

pub mod init;
pub mod triage;

pub use init::init_config;
pub use triage::{build_report, TriageConfig, TriageReport};
