//! UI session state in one place
//!
//! [`Session`] keeps the threshold, the selected view, the uploaded dataset,
//! and the prediction list in one explicitly owned struct rather than
//! scattered across presentation-layer state. The UI holds a `Session` and
//! mutates it through these methods; the core only produces derived values
//! from it.

use crate::core::{Attribution, DatasetRef, Prediction};
use crate::policy::{disposition_counts, DispositionCounts};
use crate::shap::{top_attributions, DEFAULT_TOP_K};
use crate::threshold::{PredictionSet, ThresholdController, ThresholdMetrics, DEFAULT_THRESHOLD};

/// Which page of the vetting workflow is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Detect,
    Explore,
    Train,
}

/// Everything one interactive session owns: the active view, the uploaded
/// dataset handle, the current predictions, the SHAP display budget, and
/// the embedded threshold controller.
pub struct Session {
    view: View,
    dataset: Option<DatasetRef>,
    predictions: Vec<Prediction>,
    top_k: usize,
    controller: ThresholdController,
}

impl Session {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_THRESHOLD)
    }

    /// Session whose controller resets to the given threshold.
    pub fn with_threshold(initial_threshold: f64) -> Self {
        Self {
            view: View::default(),
            dataset: None,
            predictions: Vec::new(),
            top_k: DEFAULT_TOP_K,
            controller: ThresholdController::new(initial_threshold),
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn select_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn dataset(&self) -> Option<&DatasetRef> {
        self.dataset.as_ref()
    }

    pub fn attach_dataset(&mut self, dataset: DatasetRef) {
        self.dataset = Some(dataset);
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    /// Replace the active predictions and rebuild the controller's
    /// unlabeled set from their probability shapes. Metrics recompute and
    /// subscribers fire before this returns.
    pub fn load_predictions(&mut self, predictions: Vec<Prediction>) {
        let probs = predictions.iter().map(|p| p.probs.clone()).collect();
        self.predictions = predictions;
        self.controller
            .set_predictions(PredictionSet::Unlabeled(probs));
    }

    pub fn threshold(&self) -> f64 {
        self.controller.threshold()
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.controller.set_threshold(threshold);
    }

    pub fn reset_threshold(&mut self) {
        self.controller.reset();
    }

    pub fn metrics(&self) -> &ThresholdMetrics {
        self.controller.metrics()
    }

    /// Register a callback on the embedded controller.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&ThresholdMetrics) + Send + 'static) {
        self.controller.subscribe(subscriber);
    }

    /// How the current predictions split across dispositions at the
    /// current threshold.
    pub fn dispositions(&self) -> DispositionCounts {
        let probs: Vec<_> = self.predictions.iter().map(|p| p.probs.clone()).collect();
        disposition_counts(&probs, self.controller.threshold())
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn set_top_k(&mut self, top_k: usize) {
        self.top_k = top_k;
    }

    /// The display-ready attribution list for the prediction at `index`:
    /// the top-K strongest by magnitude, ascending. Out-of-range indices
    /// and predictions without explanations yield an empty list.
    pub fn top_attributions(&self, index: usize) -> Vec<Attribution> {
        self.predictions
            .get(index)
            .map(|p| top_attributions(p.attributions(), self.top_k))
            .unwrap_or_default()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
