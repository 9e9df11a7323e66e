//! OCI config-file profiles.
//!
//! The file is INI-formatted. Every profile inherits the keys of `[DEFAULT]`
//! and overrides them with its own; lines starting with `#` or `;` are
//! comments.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::TRACING_TARGET_BOOTSTRAP;
use crate::types::StorageError;

/// Environment variable overriding the config file location.
pub const CONFIG_FILE_ENV: &str = "OCI_CONFIG_FILE";

/// Profile used when none is named.
pub const DEFAULT_PROFILE: &str = "DEFAULT";

/// Returns `$OCI_CONFIG_FILE`, or `~/.oci/config` when it is unset.
///
/// Returns `None` when neither is available.
pub fn default_config_path() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_FILE_ENV) {
        Some(path) if !path.is_empty() => Some(expand_home(Path::new(&path))),
        _ => dirs::home_dir().map(|home| home.join(".oci").join("config")),
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Reads `profile` from the config file at `path`.
///
/// Falls back to [`default_config_path`] and [`DEFAULT_PROFILE`] when either
/// argument is `None`. A missing file or profile is reported as
/// [`ConfigNotFound`](crate::types::StorageErrorKind::ConfigNotFound); an
/// unreadable or malformed file as
/// [`InvalidConfig`](crate::types::StorageErrorKind::InvalidConfig).
pub async fn load_profile(
    path: Option<&Path>,
    profile: Option<&str>,
) -> Result<HashMap<String, String>, StorageError> {
    let path = match path {
        Some(path) => expand_home(path),
        None => default_config_path().ok_or_else(|| {
            StorageError::config_not_found("cannot locate OCI config file: no home directory")
        })?,
    };
    let profile = profile.unwrap_or(DEFAULT_PROFILE);

    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StorageError::config_not_found(format!(
                "OCI config file '{}' does not exist",
                path.display()
            ))
            .with_source(e));
        }
        Err(e) => {
            return Err(StorageError::invalid_config(format!(
                "cannot read OCI config file '{}'",
                path.display()
            ))
            .with_source(e));
        }
    };

    let values = parse_profile(&text, profile)?;
    tracing::debug!(
        target: TRACING_TARGET_BOOTSTRAP,
        path = %path.display(),
        profile,
        keys = values.len(),
        "Loaded OCI config profile"
    );
    Ok(values)
}

/// Parses `text` and returns the keys of `profile`, merged over `[DEFAULT]`.
pub fn parse_profile(text: &str, profile: &str) -> Result<HashMap<String, String>, StorageError> {
    let mut sections: HashMap<&str, HashMap<String, String>> = HashMap::new();
    let mut current: Option<&str> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let Some(name) = rest.strip_suffix(']').map(str::trim).filter(|n| !n.is_empty())
            else {
                return Err(StorageError::invalid_config(format!(
                    "line {}: malformed section header '{line}'",
                    index + 1
                )));
            };
            sections.entry(name).or_default();
            current = Some(name);
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(StorageError::invalid_config(format!(
                "line {}: expected 'key=value'",
                index + 1
            )));
        };
        let Some(section) = current else {
            return Err(StorageError::invalid_config(format!(
                "line {}: key outside of any section",
                index + 1
            )));
        };

        sections
            .entry(section)
            .or_default()
            .insert(key.trim().to_owned(), value.trim().to_owned());
    }

    if !sections.contains_key(profile) {
        return Err(StorageError::config_not_found(format!(
            "profile '{profile}' not found in OCI config file"
        )));
    }

    let mut values = sections.get(DEFAULT_PROFILE).cloned().unwrap_or_default();
    if profile != DEFAULT_PROFILE
        && let Some(own) = sections.remove(profile)
    {
        values.extend(own);
    }
    Ok(values)
}
