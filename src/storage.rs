//! Object storage boundary for applicant-uploaded documents.
//!
//! Reports reference uploads by bucket-relative keys such as
//! `submission_files/{application_id}/documents/form16/form16.pdf`. The
//! assembly pipeline only needs point reads, so the boundary is a single-method
//! trait; [`DirectoryStore`] backs it with a rooted directory tree laid out as
//! `<root>/<bucket>/<key>`.

use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::Error;

/// Point reads against the bucket holding applicant uploads.
pub trait ObjectStore: Send + Sync {
    /// Fetch one object. `Ok(None)` means the key does not exist, which for
    /// report assembly is an expected case (applicants skip uploads), not an
    /// error.
    fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, Error>;
}

/// Storage settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub bucket: String,
}

impl StorageConfig {
    /// Read `STORAGE_ROOT` and `STORAGE_BUCKET`. Both are required; a missing
    /// variable is a configuration error, reported rather than defaulted so a
    /// misconfigured deployment fails loudly.
    pub fn from_env() -> Result<Self, Error> {
        let root = env::var("STORAGE_ROOT")
            .map_err(|_| Error::Storage("STORAGE_ROOT is not set".to_string()))?;
        let bucket = env::var("STORAGE_BUCKET")
            .map_err(|_| Error::Storage("STORAGE_BUCKET is not set".to_string()))?;
        Ok(StorageConfig {
            root: PathBuf::from(root),
            bucket,
        })
    }
}

/// Filesystem-backed store rooted at `<root>/<bucket>`.
#[derive(Debug)]
pub struct DirectoryStore {
    base: PathBuf,
}

impl DirectoryStore {
    /// Validates eagerly: the bucket directory must already exist, so a typo
    /// in configuration surfaces at startup instead of as a not-found on
    /// every report.
    pub fn open(config: &StorageConfig) -> Result<Self, Error> {
        let base = config.root.join(&config.bucket);
        if !base.is_dir() {
            return Err(Error::Storage(format!(
                "bucket directory does not exist: {}",
                base.display()
            )));
        }
        let base = base
            .canonicalize()
            .map_err(|e| Error::Storage(format!("cannot resolve {}: {e}", base.display())))?;
        Ok(DirectoryStore { base })
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, Error> {
        let relative = Path::new(key);
        // Keys are bucket-relative by contract. Reject anything that could
        // escape the bucket directory.
        for component in relative.components() {
            match component {
                Component::Normal(_) => {}
                _ => {
                    return Err(Error::Storage(format!("invalid object key: {key}")));
                }
            }
        }
        Ok(self.base.join(relative))
    }
}

impl ObjectStore for DirectoryStore {
    fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let path = self.resolve(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }
}
