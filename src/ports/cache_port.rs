//! Distribution cache port trait.

use std::path::PathBuf;

use crate::domain::distribution::{CacheKey, CacheLookup, Distribution};
use crate::domain::error::BiasError;

pub trait CachePort {
    fn path_for(&self, key: &CacheKey) -> PathBuf;

    /// Read failures are reported as [`CacheLookup::Corrupt`], never as errors.
    fn load(&self, key: &CacheKey) -> CacheLookup;

    /// Replace whatever is stored under `key`. Returns the written path.
    fn save(&self, key: &CacheKey, distribution: &Distribution) -> Result<PathBuf, BiasError>;
}
