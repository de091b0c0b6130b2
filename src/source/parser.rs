//! YAML parser for source definitions
//!
//! Parses and validates source YAML files.

use crate::error::{Error, Result};
use crate::source::types::SourceDefinition;
use std::fs;
use std::path::Path;
use url::Url;

/// Load a source definition from a YAML file
pub fn load_source(path: impl AsRef<Path>) -> Result<SourceDefinition> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;
    load_source_from_str(&content)
}

/// Load a source definition from a YAML string
pub fn load_source_from_str(yaml: &str) -> Result<SourceDefinition> {
    let def: SourceDefinition = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse source YAML: {e}")))?;

    validate_source(&def)?;
    Ok(def)
}

/// Validate a source definition
pub fn validate_source(def: &SourceDefinition) -> Result<()> {
    if def.name.trim().is_empty() {
        return Err(Error::config("Source name cannot be empty"));
    }

    if def.base_url.is_empty() {
        return Err(Error::missing_field("base_url"));
    }

    let url = Url::parse(&def.url())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::invalid_value(
            "base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if def.offset_param.is_empty() {
        return Err(Error::invalid_value("offset_param", "cannot be empty"));
    }
    if def.limit_param.is_empty() {
        return Err(Error::invalid_value("limit_param", "cannot be empty"));
    }
    if def.offset_param == def.limit_param {
        return Err(Error::invalid_value(
            "limit_param",
            format!("must differ from offset_param '{}'", def.offset_param),
        ));
    }

    // Paging params would be silently overwritten on every request
    for reserved in [&def.offset_param, &def.limit_param] {
        if def.params.contains_key(reserved) {
            return Err(Error::invalid_value(
                "params",
                format!("'{reserved}' is reserved for paging"),
            ));
        }
    }

    if def.page_size == Some(0) {
        return Err(Error::invalid_value(
            "page_size",
            "must be greater than zero",
        ));
    }

    if def.timeout_seconds == 0 {
        return Err(Error::invalid_value(
            "timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(())
}
