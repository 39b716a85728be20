use super::error::{DatasetError, Result};
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zstd::stream::read::Decoder as ZstdDecoder;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Compression {
    #[default]
    Plain,
    Zstd,
}

impl Compression {
    /// Accepts `"zstd"` (any case) or `"none"`/`"null"` for plain input.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(DatasetError::InvalidConfig(
                "Invalid compression value ''. Supported values: 'zstd' or 'none'.".to_string(),
            ));
        }

        if normalized.eq_ignore_ascii_case("zstd") {
            Ok(Self::Zstd)
        } else if normalized.eq_ignore_ascii_case("none") || normalized.eq_ignore_ascii_case("null")
        {
            Ok(Self::Plain)
        } else {
            Err(DatasetError::InvalidConfig(format!(
                "Invalid compression value '{}'. Supported values: 'zstd' or 'none'.",
                normalized
            )))
        }
    }
}

impl<'de> Deserialize<'de> for Compression {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Expands a glob pattern, or returns the single path when it has no wildcard.
pub fn expand_paths(pattern: &str) -> Result<Vec<PathBuf>> {
    if pattern.contains('*') || pattern.contains('?') {
        let mut paths: Vec<PathBuf> = glob::glob(pattern)?
            .filter_map(|entry| entry.ok())
            .collect();
        paths.sort();
        Ok(paths)
    } else {
        Ok(vec![PathBuf::from(pattern)])
    }
}

pub fn open_input(path: &Path, compression: Compression) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;

    match compression {
        Compression::Plain => Ok(Box::new(file)),
        Compression::Zstd => {
            let decoder = ZstdDecoder::new(file).map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to initialize zstd decoder for '{}': {}",
                        path.display(),
                        e
                    ),
                )
            })?;
            Ok(Box::new(decoder))
        }
    }
}

pub fn read_to_string(path: &Path, compression: Compression) -> Result<String> {
    let mut content = String::new();
    open_input(path, compression)?.read_to_string(&mut content)?;
    Ok(content)
}
