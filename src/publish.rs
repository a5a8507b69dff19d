//! High-level pipeline: clean → upload → invalidate.
//!
//! A [`Publisher`] owns its configuration, the registry of staged files and
//! the three collaborators from [`crate::contract`]. [`Publisher::publish`]
//! runs the stages strictly in order, one network call at a time:
//!
//! 1. **Clean** (when `clean` is set): list every key under the destination
//!    prefix page by page and delete each page. Any error aborts the run.
//! 2. **Upload**: for each registered entry in insertion order, validate it,
//!    resolve its properties and put it. Missing and excluded files are
//!    skipped; a failed put is logged and recorded, and the loop carries on.
//! 3. **Invalidate** (when a distribution is configured): one invalidation
//!    request with a fresh caller reference. Errors surface to the caller.
//!
//! # Error Handling
//! Only the clean and invalidate stages can fail the whole call. Everything
//! that goes wrong for a single file ends up in [`PublishReport::failed`].

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::contract::{
    BoxError, CacheInvalidator, DeleteObjectsRequest, FileSystem, InvalidationRequest,
    ListObjectsRequest, PutObjectRequest, StorageClient,
};
use crate::key::{listing_prefix, object_key, KeyError};
use crate::pattern::{PatternError, PatternSet};
use crate::properties::{upload_properties, PropertyRule, PropertyRules};
use crate::registry::{FileEntry, FileRegistry};
use crate::validate::{validate, Validation};

/// Upper bound on listing pages walked by the clean stage. A backend that
/// keeps returning continuation tokens past this is treated as broken.
pub const MAX_CLEAN_PAGES: usize = 10_000;

/// Invalidation path used when none is configured: the whole distribution.
pub const DEFAULT_INVALIDATION_PATH: &str = "/*";

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to list objects under `{prefix}`: {source}")]
    List { prefix: String, source: BoxError },
    #[error("failed to delete {count} objects under `{prefix}`: {source}")]
    Delete {
        prefix: String,
        count: usize,
        source: BoxError,
    },
    #[error("listing under `{prefix}` did not finish within {pages} pages")]
    CleanPageLimit { prefix: String, pages: usize },
    #[error("cache invalidation for distribution `{distribution_id}` failed: {source}")]
    Invalidation {
        distribution_id: String,
        source: BoxError,
    },
    #[error("failed to enumerate directory {path}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("path {0} has no file name")]
    InvalidPath(PathBuf),
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Whether and how to invalidate the CDN after upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Invalidation {
    #[default]
    Disabled,
    Enabled {
        distribution_id: String,
        paths: Vec<String>,
    },
}

impl Invalidation {
    /// Invalidate the whole distribution.
    pub fn whole_distribution(distribution_id: impl Into<String>) -> Self {
        Invalidation::Enabled {
            distribution_id: distribution_id.into(),
            paths: vec![DEFAULT_INVALIDATION_PATH.to_string()],
        }
    }
}

/// Immutable publisher settings.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub bucket: String,
    pub destination: String,
    /// Delete everything under `destination` before uploading.
    pub clean: bool,
    pub properties: Vec<PropertyRule>,
    pub exclude: Vec<String>,
    pub invalidation: Invalidation,
}

impl PublishConfig {
    pub fn new(bucket: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            destination: destination.into(),
            clean: true,
            properties: Vec::new(),
            exclude: Vec::new(),
            invalidation: Invalidation::Disabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedUpload {
    pub source_path: PathBuf,
    pub key: Option<String>,
    pub error: String,
}

/// What a publish run did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PublishReport {
    /// Objects removed by the clean stage.
    pub deleted: usize,
    /// Keys written, in upload order.
    pub uploaded: Vec<String>,
    /// Registered files absent at publish time.
    pub missing: Vec<PathBuf>,
    /// Registered files matching an exclusion pattern.
    pub excluded: Vec<PathBuf>,
    pub failed: Vec<FailedUpload>,
    /// Backend id of the invalidation, when one was issued.
    pub invalidation_id: Option<String>,
}

pub struct Publisher<S, I, F> {
    config: PublishConfig,
    rules: PropertyRules,
    exclude: PatternSet,
    registry: FileRegistry,
    storage: S,
    invalidator: I,
    fs: F,
}

impl<S, I, F> Publisher<S, I, F>
where
    S: StorageClient,
    I: CacheInvalidator,
    F: FileSystem,
{
    /// Fails if any exclusion or property pattern does not compile.
    pub fn new(
        config: PublishConfig,
        storage: S,
        invalidator: I,
        fs: F,
    ) -> Result<Self, PublishError> {
        let rules = PropertyRules::new(config.properties.clone())?;
        let exclude = PatternSet::new(config.exclude.iter().cloned())?;
        info!(
            bucket = %config.bucket,
            destination = %config.destination,
            clean = config.clean,
            rules = rules.len(),
            exclude = exclude.len(),
            invalidation = matches!(config.invalidation, Invalidation::Enabled { .. }),
            "Publisher configured"
        );
        Ok(Self {
            config,
            rules,
            exclude,
            registry: FileRegistry::new(),
            storage,
            invalidator,
            fs,
        })
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    pub fn files(&self) -> &[FileEntry] {
        self.registry.entries()
    }

    /// Stage one file under its base name.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<(), PublishError> {
        self.registry.add_file(path).map(|_| ())
    }

    /// Stage every file below `root`, keeping the subdirectory structure.
    pub async fn add_directory(&mut self, root: impl AsRef<Path>) -> Result<usize, PublishError> {
        let root = root.as_ref();
        let listing = self
            .fs
            .list_files_recursive(root.to_path_buf())
            .await
            .map_err(|source| {
                error!(path = %root.display(), error = ?source, "Failed to enumerate directory");
                PublishError::Directory {
                    path: root.to_path_buf(),
                    source,
                }
            })?;
        Ok(self.registry.add_listing(root, listing))
    }

    /// Run clean, upload and invalidate in that order.
    pub async fn publish(&self) -> Result<PublishReport, PublishError> {
        info!(
            bucket = %self.config.bucket,
            destination = %self.config.destination,
            files = self.registry.len(),
            "[PUBLISH] Starting publish"
        );
        let mut report = PublishReport::default();

        if self.config.clean {
            report.deleted =
                clean_destination(&self.storage, &self.config.bucket, &self.config.destination)
                    .await?;
            info!(deleted = report.deleted, "[PUBLISH] Cleaned destination");
        } else {
            debug!("[PUBLISH] Clean disabled, leaving destination as is");
        }

        self.upload_all(&mut report).await;

        report.invalidation_id = match &self.config.invalidation {
            Invalidation::Disabled => None,
            Invalidation::Enabled {
                distribution_id,
                paths,
            } => Some(self.invalidate(distribution_id, paths).await?),
        };

        info!(
            uploaded = report.uploaded.len(),
            missing = report.missing.len(),
            excluded = report.excluded.len(),
            failed = report.failed.len(),
            "[PUBLISH] Publish complete"
        );
        Ok(report)
    }

    async fn upload_all(&self, report: &mut PublishReport) {
        for entry in self.registry.entries() {
            match validate(entry, &self.fs, &self.exclude).await {
                Validation::Valid => {}
                Validation::Missing => {
                    report.missing.push(entry.source_path.clone());
                    continue;
                }
                Validation::Excluded(_) => {
                    report.excluded.push(entry.source_path.clone());
                    continue;
                }
            }

            match self.upload_one(entry).await {
                Ok(key) => report.uploaded.push(key),
                Err(failure) => report.failed.push(failure),
            }
        }
    }

    async fn upload_one(&self, entry: &FileEntry) -> Result<String, FailedUpload> {
        let failed = |key: Option<String>, error: String| FailedUpload {
            source_path: entry.source_path.clone(),
            key,
            error,
        };

        let key = object_key(&self.config.destination, &entry.relative_path).map_err(
            |e: KeyError| {
                error!(
                    path = %entry.source_path.display(),
                    error = %e,
                    "[PUBLISH][UPLOAD] Invalid destination key",
                );
                failed(None, e.to_string())
            },
        )?;

        let body = self
            .fs
            .read_bytes(entry.source_path.clone())
            .await
            .map_err(|e| {
                error!(
                    path = %entry.source_path.display(),
                    error = ?e,
                    "[PUBLISH][UPLOAD] Failed to read file",
                );
                failed(Some(key.clone()), e.to_string())
            })?;

        let properties = upload_properties(&entry.relative_path, &self.rules);
        debug!(key = %key, ?properties, size = body.len(), "[PUBLISH][UPLOAD] Uploading file");

        let req = PutObjectRequest {
            bucket: self.config.bucket.clone(),
            key: key.clone(),
            body,
            properties,
        };
        match self.storage.put_object(req).await {
            Ok(()) => {
                info!(
                    path = %entry.source_path.display(),
                    bucket = %self.config.bucket,
                    key = %key,
                    "[PUBLISH][UPLOAD] Uploaded file"
                );
                Ok(key)
            }
            Err(e) => {
                error!(
                    path = %entry.source_path.display(),
                    bucket = %self.config.bucket,
                    key = %key,
                    error = ?e,
                    "[PUBLISH][ERROR][UPLOAD] Error while uploading file"
                );
                Err(failed(Some(key), e.to_string()))
            }
        }
    }

    async fn invalidate(
        &self,
        distribution_id: &str,
        paths: &[String],
    ) -> Result<String, PublishError> {
        let req = InvalidationRequest {
            distribution_id: distribution_id.to_string(),
            paths: paths.to_vec(),
            caller_reference: caller_reference(),
        };
        info!(
            distribution_id,
            ?paths,
            caller_reference = %req.caller_reference,
            "[PUBLISH][INVALIDATE] Creating invalidation"
        );
        match self.invalidator.create_invalidation(req).await {
            Ok(id) => {
                info!(
                    distribution_id,
                    invalidation_id = %id,
                    "[PUBLISH][INVALIDATE] Invalidation created",
                );
                Ok(id)
            }
            Err(source) => {
                error!(
                    distribution_id,
                    error = ?source,
                    "[PUBLISH][ERROR][INVALIDATE] Invalidation failed",
                );
                Err(PublishError::Invalidation {
                    distribution_id: distribution_id.to_string(),
                    source,
                })
            }
        }
    }
}

/// Delete every object under `destination` in `bucket`, one listing page at
/// a time. Returns the number of keys deleted.
pub async fn clean_destination<S>(
    storage: &S,
    bucket: &str,
    destination: &str,
) -> Result<usize, PublishError>
where
    S: StorageClient + ?Sized,
{
    let prefix = listing_prefix(destination);
    if prefix.is_empty() {
        warn!(bucket, "[PUBLISH][CLEAN] Destination is the bucket root; cleaning the whole bucket");
    }

    let mut deleted = 0;
    let mut continuation_token: Option<String> = None;
    for page in 0..MAX_CLEAN_PAGES {
        let listing = storage
            .list_objects(ListObjectsRequest {
                bucket: bucket.to_string(),
                prefix: prefix.clone(),
                continuation_token: continuation_token.take(),
            })
            .await
            .map_err(|source| {
                error!(
                    bucket,
                    prefix = %prefix,
                    error = ?source,
                    "[PUBLISH][ERROR][CLEAN] Listing failed",
                );
                PublishError::List {
                    prefix: prefix.clone(),
                    source,
                }
            })?;

        debug!(
            page,
            keys = listing.keys.len(),
            more = listing.next_continuation_token.is_some(),
            "[PUBLISH][CLEAN] Listed page",
        );

        if !listing.keys.is_empty() {
            let count = listing.keys.len();
            storage
                .delete_objects(DeleteObjectsRequest {
                    bucket: bucket.to_string(),
                    keys: listing.keys,
                })
                .await
                .map_err(|source| {
                    error!(
                        bucket,
                        prefix = %prefix,
                        count,
                        error = ?source,
                        "[PUBLISH][ERROR][CLEAN] Delete failed",
                    );
                    PublishError::Delete {
                        prefix: prefix.clone(),
                        count,
                        source,
                    }
                })?;
            deleted += count;
        }

        match listing.next_continuation_token {
            Some(token) => continuation_token = Some(token),
            None => return Ok(deleted),
        }
    }

    error!(
        bucket,
        prefix = %prefix,
        pages = MAX_CLEAN_PAGES,
        "[PUBLISH][ERROR][CLEAN] Listing did not terminate",
    );
    Err(PublishError::CleanPageLimit {
        prefix,
        pages: MAX_CLEAN_PAGES,
    })
}

/// Unique idempotency key for an invalidation request.
pub fn caller_reference() -> String {
    format!(
        "bucket-publish-{}-{}",
        chrono::Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4()
    )
}
