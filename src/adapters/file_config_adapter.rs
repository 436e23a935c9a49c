//! INI file configuration adapter.

use crate::domain::error::BiasError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    /// A config with no sections, for runs driven entirely by command-line flags.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BiasError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| BiasError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, BiasError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| BiasError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// Override a single value, as the CLI does for flags given on the command line.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.config.set(section, key, Some(value.into()));
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }
}
