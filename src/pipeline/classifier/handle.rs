use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::{
    ClassifierError, ConditionModel, FeatureColumns, ProfileMatchModel, COLUMNS_FILE,
    PROFILES_FILE,
};

/// Feature layout plus the model that consumes it. Read-only once loaded.
pub struct ModelArtifacts {
    pub columns: FeatureColumns,
    pub model: Box<dyn ConditionModel>,
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("width", &self.columns.width())
            .finish_non_exhaustive()
    }
}

impl ModelArtifacts {
    /// Load columns and the best available model from an artifact directory.
    ///
    /// With the `onnx-classifier` feature an exported `disease_model.onnx`
    /// takes precedence over `condition_profiles.json`.
    pub fn load(dir: &Path) -> Result<Self, ClassifierError> {
        let columns_path = dir.join(COLUMNS_FILE);
        if !columns_path.exists() {
            return Err(ClassifierError::NotReady(dir.to_path_buf()));
        }
        let columns = FeatureColumns::load(&columns_path)?;

        if let Some(model) = exported_model(dir, columns.width())? {
            return Ok(Self { columns, model });
        }

        let profiles_path = dir.join(PROFILES_FILE);
        if !profiles_path.exists() {
            return Err(ClassifierError::NotReady(dir.to_path_buf()));
        }
        let model = ProfileMatchModel::load(&profiles_path, &columns)?;

        Ok(Self {
            columns,
            model: Box::new(model),
        })
    }
}

#[cfg(feature = "onnx-classifier")]
fn exported_model(
    dir: &Path,
    width: usize,
) -> Result<Option<Box<dyn ConditionModel>>, ClassifierError> {
    if !dir.join(super::ONNX_MODEL_FILE).exists() {
        return Ok(None);
    }
    let model = super::OnnxConditionModel::load(dir, width)?;
    Ok(Some(Box::new(model)))
}

#[cfg(not(feature = "onnx-classifier"))]
fn exported_model(
    _dir: &Path,
    _width: usize,
) -> Result<Option<Box<dyn ConditionModel>>, ClassifierError> {
    Ok(None)
}

enum ModelSource {
    Directory(PathBuf),
    Preloaded,
    Unavailable,
}

/// Lazily initialised model artifacts.
///
/// A directory-backed handle retries loading on every call until it
/// succeeds, so a conversation started before the artifacts exist recovers
/// without a restart. Owned by whoever builds the engine.
pub struct ModelHandle {
    source: ModelSource,
    loaded: RwLock<Option<Arc<ModelArtifacts>>>,
}

impl ModelHandle {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            source: ModelSource::Directory(dir.into()),
            loaded: RwLock::new(None),
        }
    }

    /// Already-built artifacts, e.g. a fake model in tests.
    pub fn preloaded(columns: FeatureColumns, model: impl ConditionModel + 'static) -> Self {
        Self {
            source: ModelSource::Preloaded,
            loaded: RwLock::new(Some(Arc::new(ModelArtifacts {
                columns,
                model: Box::new(model),
            }))),
        }
    }

    /// A handle that never becomes ready.
    pub fn unavailable() -> Self {
        Self {
            source: ModelSource::Unavailable,
            loaded: RwLock::new(None),
        }
    }

    /// Loaded artifacts, loading them now if needed.
    pub fn get(&self) -> Result<Arc<ModelArtifacts>, ClassifierError> {
        {
            let guard = self
                .loaded
                .read()
                .map_err(|_| ClassifierError::Inference("model lock poisoned".into()))?;
            if let Some(artifacts) = guard.as_ref() {
                return Ok(Arc::clone(artifacts));
            }
        }

        let dir = match &self.source {
            ModelSource::Directory(dir) => dir,
            ModelSource::Preloaded | ModelSource::Unavailable => {
                return Err(ClassifierError::NotReady(PathBuf::new()));
            }
        };

        let mut guard = self
            .loaded
            .write()
            .map_err(|_| ClassifierError::Inference("model lock poisoned".into()))?;
        // Another request may have finished loading while we waited.
        if let Some(artifacts) = guard.as_ref() {
            return Ok(Arc::clone(artifacts));
        }

        match ModelArtifacts::load(dir) {
            Ok(artifacts) => {
                tracing::info!(
                    dir = %dir.display(),
                    columns = artifacts.columns.width(),
                    "Classifier artifacts loaded"
                );
                let artifacts = Arc::new(artifacts);
                *guard = Some(Arc::clone(&artifacts));
                Ok(artifacts)
            }
            Err(e @ ClassifierError::NotReady(_)) => {
                tracing::debug!(dir = %dir.display(), "Classifier artifacts not present yet");
                Err(e)
            }
            Err(e) => {
                tracing::error!(dir = %dir.display(), error = %e, "Classifier artifacts failed to load");
                Err(e)
            }
        }
    }

    /// True once artifacts are in memory. Does not trigger a load.
    pub fn is_ready(&self) -> bool {
        self.loaded
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }
}
