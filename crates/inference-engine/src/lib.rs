//! Classifier Ensemble
//!
//! Combines up to four independently optional classifiers (anomaly,
//! arrhythmia, bradycardia, tachycardia) into one [`Verdict`], falling back to
//! threshold rules when no classifier is loaded or when the loaded ones are
//! all negative while the rules flag something.
//!
//! [`Verdict`]: vitals_core::Verdict

mod classifier;
mod ensemble;
mod onnx;
mod policy;

pub use classifier::{from_fn, Classifier, ClassifierSlots, FnClassifier, Score};
pub use ensemble::{ClassifierEnsemble, ClassifierFailure, EnsembleOutcome, EnsembleRun};
pub use onnx::{load_slots, LabelEncoding, ModelConfig, OnnxClassifier};
pub use policy::{resolve_verdict, Decision};

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid output: {0}")]
    InvalidOutput(String),
}
