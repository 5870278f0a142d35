//! ONNX Classifier
//!
//! Runs a single-output ONNX classifier (e.g. an exported scikit-learn model)
//! on a `[1, 2]` float tensor of `(heart_rate, spo2)` and reads the first
//! output as an integer label.

use crate::classifier::{Classifier, ClassifierSlots, Score};
use crate::InferenceError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tract_onnx::prelude::*;
use vitals_core::Condition;

type RunnableModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// How the model's integer label maps to a [`Score`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelEncoding {
    /// Isolation-forest style: `-1` marks an outlier, anything else an inlier
    OutlierSign,
    /// `0` means not detected, nonzero means detected
    Coded,
}

impl LabelEncoding {
    /// Encoding conventionally used for a condition's model
    pub fn for_condition(condition: Condition) -> Self {
        match condition {
            Condition::Anomaly => LabelEncoding::OutlierSign,
            _ => LabelEncoding::Coded,
        }
    }

    fn decode(&self, label: i64) -> Score {
        match self {
            LabelEncoding::OutlierSign => Score::Presence(label == -1),
            LabelEncoding::Coded => Score::Coded(label),
        }
    }
}

/// Model file locations, one per condition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub anomaly: Option<PathBuf>,
    pub arrhythmia: Option<PathBuf>,
    pub bradycardia: Option<PathBuf>,
    pub tachycardia: Option<PathBuf>,
}

impl ModelConfig {
    /// Configured path for a condition
    pub fn path(&self, condition: Condition) -> Option<&Path> {
        match condition {
            Condition::Anomaly => self.anomaly.as_deref(),
            Condition::Arrhythmia => self.arrhythmia.as_deref(),
            Condition::Bradycardia => self.bradycardia.as_deref(),
            Condition::Tachycardia => self.tachycardia.as_deref(),
        }
    }
}

/// ONNX-backed classifier
pub struct OnnxClassifier {
    model_path: PathBuf,
    plan: RunnableModel,
    encoding: LabelEncoding,
}

impl OnnxClassifier {
    /// Load and optimize a model from disk
    pub fn load(path: impl AsRef<Path>, encoding: LabelEncoding) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, 2]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            model_path: path.to_path_buf(),
            plan,
            encoding,
        })
    }

    /// Get model path
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl Classifier for OnnxClassifier {
    fn score(&self, heart_rate: u32, spo2: u32) -> Result<Score, InferenceError> {
        let input: Tensor = tract_ndarray::arr2(&[[heart_rate as f32, spo2 as f32]]).into();
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let label = outputs
            .first()
            .ok_or_else(|| InferenceError::InvalidOutput("model produced no outputs".to_string()))?
            .cast_to::<i64>()
            .map_err(|e| InferenceError::InvalidOutput(e.to_string()))?;
        let value = label
            .as_slice::<i64>()
            .map_err(|e| InferenceError::InvalidOutput(e.to_string()))?
            .first()
            .copied()
            .ok_or_else(|| InferenceError::InvalidOutput("empty label tensor".to_string()))?;

        Ok(self.encoding.decode(value))
    }
}

/// Load every configured model; a model that fails to load leaves its slot empty
pub fn load_slots(config: &ModelConfig) -> ClassifierSlots {
    let mut slots = ClassifierSlots::empty();

    for condition in Condition::ALL {
        let Some(path) = config.path(condition) else {
            info!("No {} model configured", condition);
            continue;
        };

        match OnnxClassifier::load(path, LabelEncoding::for_condition(condition)) {
            Ok(classifier) => {
                info!("Loaded {} model from {}", condition, path.display());
                slots.insert(condition, Box::new(classifier));
            }
            Err(e) => warn!("{} model unavailable: {}", condition, e),
        }
    }

    info!("{} of 4 classifiers loaded", slots.loaded_count());
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_encodings() {
        assert_eq!(LabelEncoding::OutlierSign.decode(-1), Score::Presence(true));
        assert_eq!(LabelEncoding::OutlierSign.decode(1), Score::Presence(false));
        assert_eq!(LabelEncoding::Coded.decode(1), Score::Coded(1));
        assert!(!LabelEncoding::Coded.decode(0).detected());
    }

    #[test]
    fn test_anomaly_model_uses_outlier_sign() {
        assert_eq!(LabelEncoding::for_condition(Condition::Anomaly), LabelEncoding::OutlierSign);
        assert_eq!(LabelEncoding::for_condition(Condition::Bradycardia), LabelEncoding::Coded);
    }

    #[test]
    fn test_missing_model_file_is_load_error() {
        let result = OnnxClassifier::load("/nonexistent/brady_model.onnx", LabelEncoding::Coded);
        assert!(matches!(result, Err(InferenceError::ModelLoadError(_))));
    }

    #[test]
    fn test_unloadable_models_leave_slots_empty() {
        let config = ModelConfig {
            tachycardia: Some(PathBuf::from("/nonexistent/tachy_model.onnx")),
            ..Default::default()
        };
        let slots = load_slots(&config);
        assert!(slots.is_empty());
    }
}
