//! JSON file distribution cache.
//!
//! One file per [`CacheKey`] under the base directory. Writes go to a
//! temporary sibling first and are renamed over the target.

use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::domain::distribution::{CacheKey, CacheLookup, Distribution};
use crate::domain::error::BiasError;
use crate::ports::cache_port::CachePort;

pub struct JsonCacheAdapter {
    base_path: PathBuf,
}

impl JsonCacheAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }
}

fn cache_error(path: &Path, reason: impl ToString) -> BiasError {
    BiasError::Cache {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

impl CachePort for JsonCacheAdapter {
    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.base_path.join(key.file_name())
    }

    fn load(&self, key: &CacheKey) -> CacheLookup {
        let path = self.path_for(key);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return CacheLookup::Missing,
            Err(e) => {
                return CacheLookup::Corrupt {
                    reason: e.to_string(),
                };
            }
        };

        match serde_json::from_str::<Distribution>(&content) {
            Ok(distribution) => CacheLookup::Hit(distribution),
            Err(e) => CacheLookup::Corrupt {
                reason: e.to_string(),
            },
        }
    }

    fn save(&self, key: &CacheKey, distribution: &Distribution) -> Result<PathBuf, BiasError> {
        fs::create_dir_all(&self.base_path).map_err(|e| cache_error(&self.base_path, e))?;

        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");

        let file = fs::File::create(&tmp_path).map_err(|e| cache_error(&tmp_path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, distribution).map_err(|e| cache_error(&tmp_path, e))?;
        writer.flush().map_err(|e| cache_error(&tmp_path, e))?;
        drop(writer);

        fs::rename(&tmp_path, &path).map_err(|e| cache_error(&path, e))?;
        Ok(path)
    }
}
