//! Save and load entry points.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use graft_registry::{ExtraTypeSet, TypeRegistry};

use crate::codec::{DocumentCodec, XmlCodec};
use crate::config::PersistenceConfig;
use crate::error::{PersistenceError, Result};
use crate::io::{StagedWrite, reconcile_save_target};
use crate::lifecycle::Persistable;
use crate::merge::{MergeSummary, merge};

/// Saves persistable objects and merges documents back into live ones.
///
/// Every operation comes in two forms: a `try_` form returning a
/// [`Result`], and a boolean form that logs the error and returns `false`.
/// No operation panics on bad input or I/O failure.
///
/// Extra types are resolved against the registry on every call, so types
/// registered between calls are picked up.
#[derive(Debug)]
pub struct Persistence<C = XmlCodec> {
    registry: TypeRegistry,
    codec: C,
    config: PersistenceConfig,
}

impl Persistence<XmlCodec> {
    /// XML persistence with the default config.
    pub fn new(registry: TypeRegistry) -> Self {
        Self::with_config(registry, PersistenceConfig::default())
    }

    /// XML persistence with codec settings taken from `config`.
    pub fn with_config(registry: TypeRegistry, config: PersistenceConfig) -> Self {
        let codec = XmlCodec::from_config(&config);
        Self::with_codec(registry, codec, config)
    }
}

impl<C: DocumentCodec> Persistence<C> {
    pub fn with_codec(registry: TypeRegistry, codec: C, config: PersistenceConfig) -> Self {
        Self {
            registry,
            codec,
            config,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &PersistenceConfig {
        &self.config
    }

    /// Extra types the codec is given for `T`.
    pub fn extra_types<T: Persistable>(&self) -> ExtraTypeSet {
        self.registry.resolve(T::TYPE_NAME)
    }

    // =========================================================================
    // SAVE
    // =========================================================================

    /// Save `obj` under its file name, relative to `destination`.
    ///
    /// See [`reconcile_save_target`] for how the destination and the stored
    /// file name combine. The object's file name is updated to the
    /// reconciled one. Returns the path written.
    pub fn try_save_to_path<T: Persistable>(
        &self,
        obj: &mut T,
        destination: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        self.stage_save(obj, destination)?.commit().inspect(|path| {
            tracing::info!("Saved {} to {}", T::TYPE_NAME, path.display());
        })
    }

    /// Boolean form of [`Persistence::try_save_to_path`].
    pub fn save_to_path<T: Persistable>(&self, obj: &mut T, destination: impl AsRef<Path>) -> bool {
        report("save", self.try_save_to_path(obj, destination))
    }

    /// Write `obj` to its temp sibling without replacing the destination.
    ///
    /// Committing the returned [`StagedWrite`] completes the save.
    pub fn stage_save<T: Persistable>(
        &self,
        obj: &mut T,
        destination: impl AsRef<Path>,
    ) -> Result<StagedWrite> {
        let target = reconcile_save_target(
            obj.file_name(),
            destination.as_ref(),
            self.config.effective_temp_extension(),
        );
        // Keep the reconciled name even if encoding fails below.
        if let Ok(target) = &target
            && target.file_name != obj.file_name()
        {
            obj.set_file_name(target.file_name.clone());
        }
        let target = target?;

        let extra = self.extra_types::<T>();
        StagedWrite::stage(
            &target.path,
            &target.temp_path,
            self.config.sync_on_save,
            |writer| {
                obj.on_begin_serialize();
                self.codec
                    .encode(&mut *writer, T::TYPE_NAME, &*obj, &extra)
                    .map_err(|source| PersistenceError::Serialization {
                        type_name: T::TYPE_NAME,
                        source,
                    })?;
                obj.on_end_serialize();
                Ok(())
            },
        )
    }

    /// Append the document for `obj` to `buffer`.
    ///
    /// On failure `buffer` is left as it was.
    pub fn try_save_to_string<T: Persistable>(&self, obj: &mut T, buffer: &mut String) -> Result<()> {
        let extra = self.extra_types::<T>();
        let mut bytes = Vec::new();

        obj.on_begin_serialize();
        self.codec
            .encode(&mut bytes, T::TYPE_NAME, &*obj, &extra)
            .map_err(|source| PersistenceError::Serialization {
                type_name: T::TYPE_NAME,
                source,
            })?;
        obj.on_end_serialize();

        let text = String::from_utf8(bytes).map_err(|e| PersistenceError::Serialization {
            type_name: T::TYPE_NAME,
            source: crate::codec::CodecError::encode(e),
        })?;
        buffer.push_str(&text);
        Ok(())
    }

    /// Boolean form of [`Persistence::try_save_to_string`].
    pub fn save_to_string<T: Persistable>(&self, obj: &mut T, buffer: &mut String) -> bool {
        report("save to string", self.try_save_to_string(obj, buffer))
    }

    // =========================================================================
    // LOAD
    // =========================================================================

    /// Load the document at `path` and merge it into `obj`.
    ///
    /// `obj` is only touched once the document has been read and decoded.
    pub fn try_load<T: Persistable>(&self, obj: &mut T, path: impl AsRef<Path>) -> Result<MergeSummary> {
        let image = self.from_file::<T>(path)?;
        Ok(merge(obj, &image))
    }

    /// Boolean form of [`Persistence::try_load`].
    pub fn load<T: Persistable>(&self, obj: &mut T, path: impl AsRef<Path>) -> bool {
        report("load", self.try_load(obj, path))
    }

    /// Merge the document in `text` into `obj`.
    ///
    /// `None` has nothing to merge and succeeds with `Ok(None)`. Empty or
    /// malformed text is an error.
    pub fn try_load_from_string<T: Persistable>(
        &self,
        obj: &mut T,
        text: Option<&str>,
    ) -> Result<Option<MergeSummary>> {
        let Some(text) = text else {
            return Ok(None);
        };
        let image = self.from_string::<T>(text)?;
        Ok(Some(merge(obj, &image)))
    }

    /// Boolean form of [`Persistence::try_load_from_string`].
    pub fn load_from_string<T: Persistable>(&self, obj: &mut T, text: Option<&str>) -> bool {
        report("load from string", self.try_load_from_string(obj, text))
    }

    /// Decode the document at `path` into a fresh value, without merging.
    ///
    /// The value's file name is set to `path` and its `on_end_deserialize`
    /// hook has run.
    pub fn from_file<T: Persistable>(&self, path: impl AsRef<Path>) -> Result<T> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(PersistenceError::MissingPath);
        }
        if !path.is_file() {
            return Err(PersistenceError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let extra = self.extra_types::<T>();
        let file = File::open(path).map_err(|e| PersistenceError::io("open", path, e))?;
        let mut image: T = self
            .codec
            .decode(BufReader::new(file), T::TYPE_NAME, &extra)
            .map_err(|source| PersistenceError::Deserialization {
                type_name: T::TYPE_NAME,
                path: Some(path.to_path_buf()),
                source,
            })?;

        image.set_file_name(path.to_string_lossy().into_owned());
        image.on_end_deserialize();

        tracing::info!("Loaded {} from {}", T::TYPE_NAME, path.display());
        Ok(image)
    }

    /// Decode `text` into a fresh value, without merging.
    pub fn from_string<T: Persistable>(&self, text: &str) -> Result<T> {
        if text.is_empty() {
            return Err(PersistenceError::EmptyDocument);
        }

        let extra = self.extra_types::<T>();
        let mut image: T = self
            .codec
            .decode(text.as_bytes(), T::TYPE_NAME, &extra)
            .map_err(|source| PersistenceError::Deserialization {
                type_name: T::TYPE_NAME,
                path: None,
                source,
            })?;
        image.on_end_deserialize();
        Ok(image)
    }
}

fn report<T>(operation: &'static str, result: Result<T>) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(operation, kind = ?err.kind(), error = %err, "Persistence operation failed");
            false
        }
    }
}
