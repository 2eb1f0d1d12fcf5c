use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::algorithms::huffman::HeaderFormat;
use crate::cli::CliError;

/// Serializable codec settings, stored as pretty JSON.
///
/// Missing fields fall back to their defaults, so `{}` is a valid config file.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CodecConfig {
    /// Header used when compressing. Decompression reads the format from the stream.
    pub header_format: HeaderFormat,

    /// Write the output even when it is larger than the input.
    pub force: bool,
}

impl CodecConfig {
    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), CliError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Command line flags win over file values; `force` can only be switched on.
    pub fn with_overrides(mut self, header_format: Option<HeaderFormat>, force: bool) -> Self {
        if let Some(format) = header_format {
            self.header_format = format;
        }
        self.force |= force;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config: CodecConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CodecConfig::default());
        assert_eq!(config.header_format, HeaderFormat::Tree);
        assert!(!config.force);

        let config: CodecConfig = serde_json::from_str(r#"{ "header_format": "counts" }"#).unwrap();
        assert_eq!(config.header_format, HeaderFormat::Counts);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(serde_json::from_str::<CodecConfig>(r#"{ "header_format": "custom" }"#).is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let file = CodecConfig {
            header_format: HeaderFormat::Counts,
            force: true,
        };
        assert_eq!(file.with_overrides(None, false), file);
        let merged = file.with_overrides(Some(HeaderFormat::Tree), false);
        assert_eq!(merged.header_format, HeaderFormat::Tree);
        assert!(merged.force);
    }

    #[test]
    fn save_and_load() {
        let path = std::env::temp_dir().join(format!("huffpack-config-{}.json", std::process::id()));
        let config = CodecConfig {
            header_format: HeaderFormat::Counts,
            force: true,
        };
        config.save_to_file(&path).unwrap();
        let loaded = CodecConfig::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
