//! Batch triage of scored targets at a decision threshold.
//!
//! Takes a scoring response from a file (or the deterministic demo set),
//! evaluates confusion metrics at the threshold, classifies every target,
//! and surfaces the most uncertain ones for follow-up. Report assembly is
//! pure; file reads and writer creation stay at the edges.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config;
use crate::core::{Attribution, ClassProbs, Disposition, Prediction, PredictionResponse};
use crate::io::output::{create_writer, OutputFormat};
use crate::metrics::prediction_uncertainty;
use crate::policy::{classify, disposition_counts, DispositionCounts};
use crate::shap;
use crate::synthetic;
use crate::threshold::{evaluate_at, PredictionSet, ThresholdAdvice, ThresholdMetrics};

/// How many of the most uncertain targets the review queue keeps.
const REVIEW_QUEUE_LEN: usize = 10;

pub struct TriageConfig {
    pub input: Option<PathBuf>,
    pub threshold: Option<f64>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub top_k: Option<usize>,
    pub explain: Option<usize>,
    pub samples: usize,
    pub seed: u64,
}

/// Where the triaged predictions came from.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportSource {
    File { path: PathBuf, targets: usize },
    Synthetic { samples: usize, seed: u64 },
}

/// One row of the uncertainty review queue.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TriageRow {
    pub object_id: String,
    pub disposition: Disposition,
    pub positive_probability: f64,
    pub uncertainty: f64,
    pub conf: f64,
}

/// Attribution breakdown for one requested target, strongest feature last.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExplainSection {
    pub object_id: String,
    pub top_attributions: Vec<Attribution>,
}

/// Everything one triage run produces, in writer-ready form.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TriageReport {
    pub source: ReportSource,
    pub metrics: ThresholdMetrics,
    pub advice: ThresholdAdvice,
    pub dispositions: DispositionCounts,
    pub uncertain: Vec<TriageRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explain: Option<ExplainSection>,
}

/// Run a triage pass and write the report in the requested format.
pub fn run(config: TriageConfig) -> Result<()> {
    let report = build_report(&config)?;
    log::info!(
        "triaged {} targets at threshold {:.2}",
        report.dispositions.total(),
        report.metrics.threshold
    );

    let mut writer = create_writer(config.format, config.output.as_deref())?;
    writer.write_report(&report)
}

/// Assemble the report for a config. File input gets the unlabeled
/// fallback metrics; without a file the synthetic demo set supplies
/// ground truth and full confusion counts.
pub fn build_report(config: &TriageConfig) -> Result<TriageReport> {
    let threshold = config.threshold.unwrap_or_else(config::get_default_threshold);
    let top_k = config.top_k.unwrap_or_else(config::get_top_k);

    let (source, evaluation, predictions) = match &config.input {
        Some(path) => {
            let predictions = load_predictions(path)?;
            let probs: Vec<ClassProbs> = predictions.iter().map(|p| p.probs.clone()).collect();
            let source = ReportSource::File {
                path: path.clone(),
                targets: predictions.len(),
            };
            (source, PredictionSet::Unlabeled(probs), predictions)
        }
        None => {
            let samples = synthetic::labeled_samples(config.samples, config.seed);
            let predictions = synthetic::predictions(config.samples, config.seed);
            let source = ReportSource::Synthetic {
                samples: config.samples,
                seed: config.seed,
            };
            (source, PredictionSet::Labeled(samples), predictions)
        }
    };

    let metrics = evaluate_at(threshold, &evaluation);
    let grading = config::get_grading();
    let advice = ThresholdAdvice::with_floors(
        &metrics,
        grading.f1_excellent,
        grading.f1_good,
        grading.mcc_imbalance,
    );

    let probs: Vec<ClassProbs> = predictions.iter().map(|p| p.probs.clone()).collect();
    let explain = match config.explain {
        Some(index) => Some(explain_section(&predictions, index, top_k)?),
        None => None,
    };

    Ok(TriageReport {
        source,
        metrics,
        advice,
        dispositions: disposition_counts(&probs, threshold),
        uncertain: review_queue(&predictions, threshold),
        explain,
    })
}

fn load_predictions(path: &Path) -> Result<Vec<Prediction>> {
    let content = crate::io::read_file(path)
        .with_context(|| format!("Failed to read predictions file: {}", path.display()))?;
    let response = PredictionResponse::from_json(&content)
        .with_context(|| format!("Failed to decode predictions from: {}", path.display()))?;
    Ok(response.predictions)
}

/// The most uncertain targets, highest entropy first, capped at
/// [`REVIEW_QUEUE_LEN`]. Ties keep input order.
fn review_queue(predictions: &[Prediction], threshold: f64) -> Vec<TriageRow> {
    let mut rows: Vec<TriageRow> = predictions
        .iter()
        .enumerate()
        .map(|(index, prediction)| TriageRow {
            object_id: display_id(prediction, index),
            disposition: classify(&prediction.probs, threshold),
            positive_probability: prediction.probs.positive_probability(),
            uncertainty: prediction_uncertainty(&prediction.probs),
            conf: prediction.conf,
        })
        .collect();
    rows.sort_by(|a, b| b.uncertainty.total_cmp(&a.uncertainty));
    rows.truncate(REVIEW_QUEUE_LEN);
    rows
}

fn explain_section(
    predictions: &[Prediction],
    index: usize,
    top_k: usize,
) -> Result<ExplainSection> {
    let prediction = predictions.get(index).with_context(|| {
        format!(
            "explain index {index} is out of range ({} targets)",
            predictions.len()
        )
    })?;
    Ok(ExplainSection {
        object_id: display_id(prediction, index),
        top_attributions: shap::top_attributions(prediction.attributions(), top_k),
    })
}

/// Identifier shown for a target; positional when the payload has none.
fn display_id(prediction: &Prediction, index: usize) -> String {
    prediction
        .object_id
        .clone()
        .unwrap_or_else(|| format!("TARGET-{}", index + 1))
}
