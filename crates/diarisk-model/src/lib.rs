//! ONNX classifier loading and inference (pure Rust via `tract-onnx`).
//!
//! The model artifact is produced by an external training/export process and
//! treated as an opaque blob: this crate only promises the [`Scorer`] contract
//! over a fixed six-feature input row. Loading happens exactly once at process
//! startup; the loaded plan is read-only and shared across requests.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use tract_onnx::prelude::*;

use diarisk_core::{FeatureVector, Score, ScoreError, Scorer, FEATURE_COUNT};

/// Errors raised while loading the model artifact.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The artifact could not be read, parsed, or optimized.
    #[error("failed to load model artifact '{path}': {message}")]
    Load { path: String, message: String },

    /// The model loaded but exposes no output interpretable as probabilities.
    #[error("model artifact '{path}' has no float probability output")]
    NoProbabilityOutput { path: String },
}

impl ModelError {
    fn load(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Load {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

/// A pre-trained binary classifier specialized to a `[1, 6]` f32 input row.
pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
    /// Index of the model output carrying class probabilities. Classifier
    /// exports often emit a label tensor first; we score from the first
    /// float-convertible output instead.
    proba_output: usize,
    proba_dim: usize,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("proba_output", &self.proba_output)
            .field("proba_dim", &self.proba_dim)
            .finish()
    }
}

impl OnnxClassifier {
    /// Loads an ONNX artifact and specializes it to a single six-feature row.
    ///
    /// Runs a dummy forward pass to locate the probability output, so an
    /// artifact that cannot actually be executed fails here rather than on
    /// the first request.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| ModelError::load(path, e))?;

        let input_fact =
            InferenceFact::dt_shape(f32::datum_type(), tvec!(1, FEATURE_COUNT));
        let plan = model
            .with_input_fact(0, input_fact)
            .map_err(|e| ModelError::load(path, e))?
            .into_optimized()
            .map_err(|e| ModelError::load(path, e))?
            .into_runnable()
            .map_err(|e| ModelError::load(path, e))?;

        let dummy = tract_ndarray::ArrayD::<f32>::zeros(tract_ndarray::IxDyn(&[
            1,
            FEATURE_COUNT,
        ]))
        .into_tvalue();
        let outputs = plan
            .run(tvec!(dummy))
            .map_err(|e| ModelError::load(path, e))?;

        let (proba_output, proba_dim) = outputs
            .iter()
            .enumerate()
            .find_map(|(i, out)| {
                let arr = out.to_array_view::<f32>().ok()?;
                (!arr.is_empty()).then_some((i, arr.len()))
            })
            .ok_or_else(|| ModelError::NoProbabilityOutput {
                path: path.display().to_string(),
            })?;

        info!(
            component = "model-loader",
            path = %path.display(),
            proba_output,
            proba_dim,
            "model loaded successfully"
        );

        Ok(Self {
            plan,
            proba_output,
            proba_dim,
        })
    }

    fn run(&self, features: &FeatureVector) -> Result<Vec<f32>, ScoreError> {
        let row: Vec<f32> = features.as_array().iter().map(|v| *v as f32).collect();
        let tensor = tract_ndarray::ArrayD::<f32>::from_shape_vec(
            tract_ndarray::IxDyn(&[1, FEATURE_COUNT]),
            row,
        )
        .map_err(|e| ScoreError::Inference(format!("input reshape failed: {e}")))?
        .into_tvalue();

        let outputs = self
            .plan
            .run(tvec!(tensor))
            .map_err(|e| ScoreError::Inference(e.to_string()))?;
        let out = outputs
            .get(self.proba_output)
            .ok_or_else(|| ScoreError::Output("probability output missing".to_string()))?;
        let arr = out
            .to_array_view::<f32>()
            .map_err(|e| ScoreError::Output(e.to_string()))?;

        if arr.len() != self.proba_dim {
            return Err(ScoreError::Output(format!(
                "probability output changed shape: got {}, expected {}",
                arr.len(),
                self.proba_dim
            )));
        }
        Ok(arr.iter().copied().collect())
    }
}

impl Scorer for OnnxClassifier {
    fn score(&self, features: &FeatureVector) -> Result<Score, ScoreError> {
        interpret(&self.run(features)?)
    }
}

/// Maps a raw probability tensor to a [`Score`].
///
/// Two or more elements is a per-class distribution with the positive class at
/// index 1; a single element is the positive probability itself (sigmoid
/// output), thresholded at 0.5 for the class label.
fn interpret(probs: &[f32]) -> Result<Score, ScoreError> {
    let score = match probs {
        [] => return Err(ScoreError::Output("empty probability output".to_string())),
        [p] => Score {
            class: u8::from(*p >= 0.5),
            probability: f64::from(*p),
        },
        [neg, pos, ..] => Score {
            class: u8::from(*pos >= *neg),
            probability: f64::from(*pos),
        },
    };
    // Probabilities leave the service in [0, 1] even if the export is sloppy.
    Ok(Score {
        probability: score.probability.clamp(0.0, 1.0),
        ..score
    })
}

/// Loads the classifier at startup, degrading instead of crashing.
///
/// On failure logs the error plus the working directory and artifact-directory
/// contents for diagnosis, and returns `None`: the service stays reachable and
/// reports the model as unavailable per request.
pub fn load_or_warn(path: &Path) -> Option<Arc<dyn Scorer>> {
    info!(
        component = "model-loader",
        path = %path.display(),
        "attempting to load model"
    );
    match OnnxClassifier::load(path) {
        Ok(classifier) => Some(Arc::new(classifier)),
        Err(e) => {
            error!(component = "model-loader", error = %e, "error loading model");
            let cwd = std::env::current_dir()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|_| "<unknown>".to_string());
            error!(component = "model-loader", cwd = %cwd, "current working directory");
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            error!(
                component = "model-loader",
                contents = %list_dir(dir.unwrap_or(Path::new("."))),
                "directory contents"
            );
            None
        }
    }
}

fn list_dir(dir: &Path) -> String {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(", "),
        Err(e) => format!("<unreadable: {e}>"),
    }
}
