use crate::coefficients::DEFAULTS;
use crate::error::{CcgError, Result};
use crate::types::{CoefficientConfig, CoefficientField, ConfigOverrides};
use arc_swap::ArcSwap;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Coefficient overrides shared by every query.
///
/// Readers take a lock-free snapshot; writers serialize on `write_lock` and
/// replace the whole record at once.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    overrides: ArcSwap<ConfigOverrides>,
    write_lock: Mutex<()>,
}

impl ConfigStore {
    /// Load persisted overrides from `path`.
    ///
    /// A missing or unreadable file starts from defaults; invalid fields are
    /// dropped individually.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let overrides = match read_overrides(&path) {
            Ok(overrides) => overrides,
            Err(CcgError::FileRead { source, .. }) if source.kind() == ErrorKind::NotFound => {
                ConfigOverrides::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring config overrides");
                ConfigOverrides::default()
            }
        };

        if !overrides.is_empty() {
            tracing::info!(path = %path.display(), "loaded config overrides");
        }
        Self::with_overrides(path, overrides)
    }

    pub fn with_overrides(path: impl Into<PathBuf>, overrides: ConfigOverrides) -> Self {
        Self {
            path: path.into(),
            overrides: ArcSwap::from_pointee(overrides),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Defaults merged with the current overrides
    pub fn current_config(&self) -> CoefficientConfig {
        self.overrides.load().apply_to(DEFAULTS)
    }

    pub fn overrides(&self) -> Arc<ConfigOverrides> {
        self.overrides.load_full()
    }

    /// Apply the recognised fields of `partial` and persist the full record.
    ///
    /// Non-numeric or non-positive values are skipped per field. A failed write
    /// is logged; the new values still take effect in memory.
    pub fn apply_overrides(&self, partial: &Map<String, Value>) -> CoefficientConfig {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = ConfigOverrides::clone(&self.overrides.load());
        for field in CoefficientField::ALL {
            let Some(raw) = partial.get(field.key()) else {
                continue;
            };
            match parse_coefficient(raw) {
                Some(value) => next.set(field, value),
                None => tracing::warn!(field = field.key(), value = %raw, "rejected coefficient override"),
            }
        }

        if let Err(e) = persist(&self.path, &next) {
            tracing::warn!(error = %e, "config overrides not persisted");
        }

        let config = next.apply_to(DEFAULTS);
        self.overrides.store(Arc::new(next));
        config
    }
}

/// Accept a positive finite number, given as a JSON number or numeric string
pub fn parse_coefficient(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

fn read_overrides(path: &Path) -> Result<ConfigOverrides> {
    let contents = fs::read_to_string(path).map_err(|source| CcgError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&contents).map_err(|source| CcgError::JsonParse {
        context: path.display().to_string(),
        source,
    })?;

    let mut overrides = ConfigOverrides::default();
    if let Value::Object(map) = value {
        for field in CoefficientField::ALL {
            if let Some(parsed) = map.get(field.key()).and_then(parse_coefficient) {
                overrides.set(field, parsed);
            }
        }
    }
    Ok(overrides)
}

// Write to a sibling temp file and rename over the target
fn persist(path: &Path, overrides: &ConfigOverrides) -> Result<()> {
    let write_err = |source| CcgError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let contents =
        serde_json::to_string_pretty(overrides).map_err(|source| CcgError::JsonSerialize {
            context: "config overrides".to_string(),
            source,
        })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(write_err)?;
    Ok(())
}
