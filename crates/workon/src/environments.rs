use std::collections::BTreeMap;
use std::path::PathBuf;

use log::{debug, warn};
use workon_backend::EnvironmentRecord;
use workon_platform::{AppPaths, workspace_bin_dir};

use crate::storage::{ConfigError, read_json, write_json};

/// Environment records, one JSON file per environment under `configs/`.
pub struct EnvironmentStore<'a> {
    paths: &'a AppPaths,
}

pub fn validate_name(name: &str) -> Result<(), ConfigError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidName(name.to_string()))
    }
}

impl<'a> EnvironmentStore<'a> {
    #[must_use]
    pub fn new(paths: &'a AppPaths) -> Self {
        Self { paths }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.paths.environment_file(name).is_file()
    }

    pub fn get(&self, name: &str) -> Result<EnvironmentRecord, ConfigError> {
        validate_name(name)?;
        read_json(&self.paths.environment_file(name))?
            .ok_or_else(|| ConfigError::NotFound(name.to_string()))
    }

    pub fn save(&self, record: &EnvironmentRecord) -> Result<(), ConfigError> {
        validate_name(&record.name)?;
        debug!("Saving environment {}", record.name);
        write_json(&self.paths.environment_file(&record.name), record)
    }

    /// Every stored record, keyed by name.
    pub fn load_all(&self) -> Result<BTreeMap<String, EnvironmentRecord>, ConfigError> {
        let dir = self.paths.configs_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(source) => return Err(ConfigError::Read { path: dir, source }),
        };

        let mut records = BTreeMap::new();
        for entry in entries {
            let path = entry
                .map_err(|source| ConfigError::Read {
                    path: dir.clone(),
                    source,
                })?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(record) = read_json::<EnvironmentRecord>(&path)? else {
                continue;
            };
            let stem = path.file_stem().and_then(|stem| stem.to_str());
            if stem != Some(record.name.as_str()) {
                warn!(
                    "{} holds environment {:?}; skipping",
                    path.display(),
                    record.name
                );
                continue;
            }
            records.insert(record.name.clone(), record);
        }
        Ok(records)
    }

    /// Bin directories of every environment flagged as globally exposed.
    pub fn global_bins(&self) -> Result<Vec<PathBuf>, ConfigError> {
        Ok(self
            .load_all()?
            .values()
            .filter(|record| record.global_bin)
            .map(|record| workspace_bin_dir(&record.workspace))
            .collect())
    }
}
