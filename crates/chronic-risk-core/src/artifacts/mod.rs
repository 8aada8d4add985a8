//! Artifact store.
//!
//! Locates and loads the persisted preprocessing and classifier artifacts.
//! Two layouts are recognised, tried in this order:
//!
//! 1. Separate: `scaler.json` plus one classifier per condition.
//! 2. Combined: `model.json` (multi-output) plus an optional `preprocessor.json`.
//!
//! Each file is looked up in the configured search directories in priority
//! order; the first directory containing it wins.

mod formats;

pub use formats::*;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::{ArtifactFileNames, ScorerConfig};
use crate::inference::{Classifier, MultiOutputClassifier};
use crate::models::{Condition, PerCondition, PreprocessingSchema, CANONICAL_ATTRIBUTES};

/// Artifact errors.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("No model artifacts found (searched: {})", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("Malformed artifact {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("Failed to read artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ArtifactResult<T> = Result<T, ArtifactError>;

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The active set of classifiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModelSet {
    /// One scaler and one binary classifier per condition
    Separate {
        scaler: StandardScaler,
        classifiers: PerCondition<Classifier>,
    },
    /// One multi-output classifier with an optional column transformer
    Combined {
        preprocessor: Option<ColumnPreprocessor>,
        classifier: MultiOutputClassifier,
    },
}

impl ModelSet {
    pub fn mode(&self) -> ArtifactMode {
        match self {
            ModelSet::Separate { .. } => ArtifactMode::Separate,
            ModelSet::Combined { .. } => ArtifactMode::Combined,
        }
    }

    /// Resolve the preprocessing schema the classifiers were fitted against.
    ///
    /// A combined set without a preprocessor gets the canonical attribute list,
    /// passed through unscaled.
    pub fn schema(&self) -> Result<PreprocessingSchema, ArtifactFault> {
        match self {
            ModelSet::Separate { scaler, .. } => scaler
                .to_schema()
                .map_err(|reason| ArtifactFault::new(ArtifactPart::Scaler, reason)),
            ModelSet::Combined {
                preprocessor: Some(preprocessor),
                ..
            } => preprocessor
                .to_schema()
                .map_err(|reason| ArtifactFault::new(ArtifactPart::Preprocessor, reason)),
            ModelSet::Combined {
                preprocessor: None, ..
            } => PreprocessingSchema::passthrough(&CANONICAL_ATTRIBUTES)
                .map_err(|e| ArtifactFault::new(ArtifactPart::CombinedModel, e.to_string())),
        }
    }

    /// Structural checks on every classifier.
    pub fn validate(&self) -> Result<(), ArtifactFault> {
        match self {
            ModelSet::Separate { classifiers, .. } => {
                classifiers.iter().try_for_each(|(condition, c)| {
                    c.validate()
                        .map_err(|reason| ArtifactFault::new(ArtifactPart::Classifier(condition), reason))
                })
            }
            ModelSet::Combined { classifier, .. } => classifier
                .validate()
                .map_err(|reason| ArtifactFault::new(ArtifactPart::CombinedModel, reason)),
        }
    }

    /// Classifier input widths that disagree with `width`.
    fn width_mismatches(&self, width: usize) -> Vec<(String, usize)> {
        match self {
            ModelSet::Separate { classifiers, .. } => classifiers
                .iter()
                .map(|(condition, c)| (condition.to_string(), c.n_features()))
                .filter(|(_, n)| *n != width)
                .collect(),
            ModelSet::Combined { classifier, .. } => classifier
                .n_features()
                .filter(|n| *n != width)
                .map(|n| vec![("combined".to_string(), n)])
                .unwrap_or_default(),
        }
    }
}

/// Which artifact layout was loaded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactMode {
    Separate,
    Combined,
}

/// One artifact file of a model set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactPart {
    Scaler,
    Classifier(Condition),
    Preprocessor,
    CombinedModel,
}

impl ArtifactPart {
    /// Configured file name of this part.
    pub fn file_name(self, files: &ArtifactFileNames) -> &str {
        match self {
            ArtifactPart::Scaler => &files.scaler,
            ArtifactPart::Classifier(condition) => files.classifier(condition),
            ArtifactPart::Preprocessor => &files.preprocessor,
            ArtifactPart::CombinedModel => &files.combined_model,
        }
    }
}

impl fmt::Display for ArtifactPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactPart::Scaler => f.write_str("scaler"),
            ArtifactPart::Classifier(condition) => write!(f, "{} classifier", condition),
            ArtifactPart::Preprocessor => f.write_str("preprocessor"),
            ArtifactPart::CombinedModel => f.write_str("combined model"),
        }
    }
}

/// A structural problem in one artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactFault {
    pub part: ArtifactPart,
    pub reason: String,
}

impl ArtifactFault {
    fn new(part: ArtifactPart, reason: String) -> Self {
        Self { part, reason }
    }
}

impl fmt::Display for ArtifactFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.part, self.reason)
    }
}

/// Where one artifact file was read from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactSource {
    pub file: String,
    pub path: PathBuf,
}

/// Provenance of a loaded bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactInfo {
    pub mode: ArtifactMode,
    pub sources: Vec<ArtifactSource>,
    /// SHA-256 over the loaded files (hex)
    pub fingerprint: String,
    /// RFC 3339
    pub loaded_at: String,
}

/// Immutable, fully validated artifacts plus the schema derived from them.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    models: ModelSet,
    schema: PreprocessingSchema,
    info: ArtifactInfo,
}

impl ArtifactBundle {
    /// Build a bundle from in-memory models.
    ///
    /// The fingerprint covers the models' JSON form; no sources are recorded.
    pub fn from_models(models: ModelSet) -> Result<Self, String> {
        let bytes = serde_json::to_vec(&models).map_err(|e| e.to_string())?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let info = ArtifactInfo {
            mode: models.mode(),
            sources: Vec::new(),
            fingerprint: hex::encode(hasher.finalize()),
            loaded_at: chrono::Utc::now().to_rfc3339(),
        };
        Self::assemble(models, info).map_err(|fault| fault.to_string())
    }

    fn assemble(models: ModelSet, info: ArtifactInfo) -> Result<Self, ArtifactFault> {
        models.validate()?;
        let schema = models.schema()?;
        for (model, expected) in models.width_mismatches(schema.encoded_width()) {
            log::warn!(
                "Model {} expects {} features but the preprocessing schema encodes {}",
                model,
                expected,
                schema.encoded_width()
            );
        }
        Ok(Self {
            models,
            schema,
            info,
        })
    }

    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    pub fn schema(&self) -> &PreprocessingSchema {
        &self.schema
    }

    pub fn info(&self) -> &ArtifactInfo {
        &self.info
    }

    pub fn mode(&self) -> ArtifactMode {
        self.info.mode
    }
}

/// Filesystem-backed artifact loader.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    config: ScorerConfig,
}

impl ArtifactStore {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// First search directory containing `file`.
    pub fn locate(&self, file: &str) -> Option<PathBuf> {
        self.config
            .candidate_dirs()
            .into_iter()
            .map(|dir| dir.join(file))
            .find(|path| path.is_file())
    }

    /// Load the highest-priority complete artifact set.
    pub fn load(&self) -> ArtifactResult<ArtifactBundle> {
        let mut reader = Reader::default();

        let models = match self.locate_separate() {
            Ok(paths) => self.load_separate(&mut reader, &paths)?,
            Err(missing) => {
                let Some(model_path) = self.locate(&self.config.files.combined_model) else {
                    return Err(ArtifactError::NotFound {
                        searched: self.searched_paths(),
                    });
                };
                if missing.len() < 4 {
                    log::warn!(
                        "Incomplete separate model set (missing {}), falling back to {}",
                        missing.join(", "),
                        model_path.display()
                    );
                }
                self.load_combined(&mut reader, &model_path)?
            }
        };

        let info = ArtifactInfo {
            mode: models.mode(),
            sources: reader.sources,
            fingerprint: hex::encode(reader.hasher.finalize()),
            loaded_at: chrono::Utc::now().to_rfc3339(),
        };

        let sources = info.sources.clone();
        let bundle = ArtifactBundle::assemble(models, info).map_err(|fault| {
            let file = fault.part.file_name(&self.config.files);
            let path = sources
                .iter()
                .find(|source| source.path.ends_with(file))
                .map(|source| source.path.clone())
                .unwrap_or_else(|| self.config.base_dir.join(file));
            ArtifactError::Malformed {
                path,
                reason: fault.to_string(),
            }
        })?;

        log::info!(
            "Loaded {:?} artifacts: {}",
            bundle.mode(),
            bundle
                .info()
                .sources
                .iter()
                .map(|s| s.path.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(bundle)
    }

    /// Paths of the separate set, or the names of the files that are missing.
    fn locate_separate(&self) -> Result<[PathBuf; 4], Vec<String>> {
        let files = &self.config.files;
        let names = [
            files.scaler.as_str(),
            files.classifier(Condition::Diabetes),
            files.classifier(Condition::HeartDisease),
            files.classifier(Condition::Stroke),
        ];
        let found = names.map(|name| self.locate(name));
        let missing: Vec<String> = names
            .iter()
            .zip(&found)
            .filter(|(_, path)| path.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        match found {
            [Some(scaler), Some(diabetes), Some(heart), Some(stroke)] => {
                Ok([scaler, diabetes, heart, stroke])
            }
            _ => Err(missing),
        }
    }

    fn load_separate(
        &self,
        reader: &mut Reader,
        paths: &[PathBuf; 4],
    ) -> ArtifactResult<ModelSet> {
        let [scaler, diabetes, heart_disease, stroke] = paths;
        let scaler: StandardScaler = reader.read_json(scaler)?;
        let classifiers = PerCondition {
            diabetes: reader.read_json(diabetes)?,
            heart_disease: reader.read_json(heart_disease)?,
            stroke: reader.read_json(stroke)?,
        };
        Ok(ModelSet::Separate {
            scaler,
            classifiers,
        })
    }

    fn load_combined(&self, reader: &mut Reader, model_path: &Path) -> ArtifactResult<ModelSet> {
        let classifier: MultiOutputClassifier = reader.read_json(model_path)?;
        let preprocessor = match self.locate(&self.config.files.preprocessor) {
            Some(path) => Some(reader.read_json::<ColumnPreprocessor>(&path)?),
            None => {
                log::warn!("No preprocessor artifact; encoding canonical attributes unscaled");
                None
            }
        };
        Ok(ModelSet::Combined {
            preprocessor,
            classifier,
        })
    }

    /// Every path probed for the required files.
    fn searched_paths(&self) -> Vec<PathBuf> {
        let files = &self.config.files;
        let required = [
            files.scaler.as_str(),
            files.classifier(Condition::Diabetes),
            files.classifier(Condition::HeartDisease),
            files.classifier(Condition::Stroke),
            files.combined_model.as_str(),
        ];
        self.config
            .candidate_dirs()
            .iter()
            .flat_map(|dir| required.iter().map(move |file| dir.join(file)))
            .collect()
    }
}

/// Reads artifact files, hashing their bytes as it goes.
#[derive(Default)]
struct Reader {
    hasher: Sha256,
    sources: Vec<ArtifactSource>,
}

impl Reader {
    fn read_json<T: DeserializeOwned>(&mut self, path: &Path) -> ArtifactResult<T> {
        let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value = serde_json::from_slice(&bytes).map_err(|e| ArtifactError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.hasher.update(file.as_bytes());
        self.hasher.update(&bytes);
        self.sources.push(ArtifactSource {
            file,
            path: path.to_path_buf(),
        });
        Ok(value)
    }
}
