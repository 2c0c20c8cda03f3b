//! One-shot generator run: discover declarations in a Rust source file,
//! derive the schema against the persisted model snapshot, write the merged
//! snapshot back and hand the finalized model to code emission.

pub mod binding;
pub mod discover;
pub mod store;

pub use binding::{Binding, BindingEntity, BindingProperty};
pub use discover::{DiscoverError, discover};
pub use store::{StoreError, load_snapshot, write_snapshot};

use flatschema_schema::{
    Error as SchemaError,
    build::{DeriveOptions, derive_model},
    identity::IdStrategy,
    node::Model,
    snapshot::ModelSnapshot,
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// Model file name used when none is configured.
pub const DEFAULT_MODEL_FILE: &str = "flatschema-model.json";

///
/// Error
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{}: {source}", path.display())]
    Discover {
        path: PathBuf,
        source: DiscoverError,
    },

    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("model file {}: {source}", path.display())]
    Store { path: PathBuf, source: StoreError },
}

impl Error {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn store(path: &Path, source: StoreError) -> Self {
        Self::Store {
            path: path.to_path_buf(),
            source,
        }
    }
}

///
/// Options
///

#[derive(Clone, Debug, Default)]
pub struct Options {
    pub source_file: PathBuf,

    /// Defaults to `DEFAULT_MODEL_FILE` next to the source file.
    pub model_file: Option<PathBuf>,

    /// Defaults to the source file stem.
    pub namespace: Option<String>,

    pub id_strategy: IdStrategy,

    /// Where to write the binding JSON for an external emitter, if anywhere.
    pub binding_file: Option<PathBuf>,
}

impl Options {
    #[must_use]
    pub fn new(source_file: impl Into<PathBuf>) -> Self {
        Self {
            source_file: source_file.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.model_file.clone().unwrap_or_else(|| {
            self.source_file
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(DEFAULT_MODEL_FILE)
        })
    }

    #[must_use]
    pub fn namespace(&self) -> String {
        self.namespace.clone().unwrap_or_else(|| {
            self.source_file
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }

    // Declaration unit recorded on snapshot entities: the source file name.
    fn source_unit(&self) -> Option<String> {
        self.source_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

///
/// Generated
///

#[derive(Clone, Debug)]
pub struct Generated {
    pub model: Model,
    pub binding: Binding,
    pub snapshot: ModelSnapshot,

    /// Whether the model file was (re)written.
    pub snapshot_written: bool,
}

/// Run the generator for one source file.
///
/// Nothing is written unless every declaration builds and is identified.
/// The binding file, if requested, is written before the model file.
pub fn process(options: &Options) -> Result<Generated, Error> {
    let source_path = options.source_file.as_path();
    let model_path = options.model_path();
    let namespace = options.namespace();
    let source = options.source_unit();

    tracing::info!(
        source = %source_path.display(),
        model = %model_path.display(),
        namespace = %namespace,
        "processing"
    );

    let text = fs::read_to_string(source_path).map_err(|e| Error::io(source_path, e))?;
    let decls = discover(&text).map_err(|e| Error::Discover {
        path: source_path.to_path_buf(),
        source: e,
    })?;

    let previous = load_snapshot(&model_path)?;
    let derive = DeriveOptions {
        strategy: options.id_strategy,
        source: source.clone(),
    };
    let (model, snapshot) = derive_model(&namespace, &decls, &previous, &derive)?;

    let binding = Binding::new(&model, source);

    // stage every output before renaming any, so a failed write persists nothing
    let snapshot_written = snapshot != previous || !model_path.exists();
    let staged_snapshot = if snapshot_written {
        Some(store::stage_json(&model_path, &snapshot)?)
    } else {
        None
    };
    let staged_binding = match &options.binding_file {
        Some(path) => Some(store::stage_json(path, &binding)?),
        None => None,
    };

    match staged_snapshot {
        Some(staged) => {
            staged.commit()?;
            tracing::info!(
                path = %model_path.display(),
                entities = snapshot.entities.len(),
                "wrote model file"
            );
        }
        None => tracing::debug!(path = %model_path.display(), "model file unchanged"),
    }
    if let (Some(staged), Some(path)) = (staged_binding, &options.binding_file) {
        staged.commit()?;
        tracing::info!(path = %path.display(), "wrote binding");
    }

    Ok(Generated {
        model,
        binding,
        snapshot,
        snapshot_written,
    })
}
