//! GL-009: Project configuration (glosstree.yaml).
//!
//! Parses the project file and validates structural constraints:
//! - Version must be "1.0"
//! - Language codes are three lowercase letters
//! - Native and target default languages differ
//! - Search limit is positive

use super::slug::{is_valid_language_code, normalize_language_code};
use super::types::LanguagePair;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossConfig {
    pub version: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Directory holding `gloss/` and the event log, relative to the config file.
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,

    /// Default native language.
    #[serde(default)]
    pub native: Option<String>,

    /// Default target language.
    #[serde(default)]
    pub target: Option<String>,

    /// Languages exported by batch export. Empty means every language in the store.
    #[serde(default)]
    pub languages: Vec<String>,

    #[serde(default)]
    pub export: ExportSettings,

    /// Cap on results for search and listing commands.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_data_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("situations")
}

fn default_search_limit() -> usize {
    50
}

impl GlossConfig {
    /// A fresh config as written by `init`.
    pub fn new(name: &str) -> Self {
        Self {
            version: "1.0".to_string(),
            name: name.to_string(),
            description: None,
            data_root: default_data_root(),
            native: None,
            target: None,
            languages: Vec::new(),
            export: ExportSettings::default(),
            search_limit: default_search_limit(),
        }
    }

    /// Build the active pair from config defaults and optional overrides.
    pub fn language_pair(&self, native: Option<&str>, target: Option<&str>) -> Result<LanguagePair, String> {
        let native = native
            .or(self.native.as_deref())
            .ok_or("no native language: pass --native or set 'native' in the config")?;
        let target = target
            .or(self.target.as_deref())
            .ok_or("no target language: pass --target or set 'target' in the config")?;
        let pair = LanguagePair::new(native, target);
        for code in [&pair.native, &pair.target] {
            if !is_valid_language_code(code) {
                return Err(format!("invalid language code '{}'", code));
            }
        }
        if pair.native == pair.target {
            return Err(format!("native and target are both '{}'", pair.native));
        }
        Ok(pair)
    }

    /// Resolve the data root against the directory holding the config file.
    pub fn data_root_from(&self, config_path: &Path) -> PathBuf {
        resolve_relative(config_path, &self.data_root)
    }

    /// Resolve the export directory against the directory holding the config file.
    pub fn output_dir_from(&self, config_path: &Path) -> PathBuf {
        resolve_relative(config_path, &self.export.output_dir)
    }
}

fn resolve_relative(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) => dir.join(path),
        None => path.to_path_buf(),
    }
}

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a glosstree.yaml file from disk.
pub fn parse_config_file(path: &Path) -> Result<GlossConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_config(&content)
}

/// Parse a glosstree.yaml from a string.
pub fn parse_config(yaml: &str) -> Result<GlossConfig, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

/// Validate a parsed config. Returns a list of errors (empty = valid).
pub fn validate_config(config: &GlossConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.version != "1.0" {
        errors.push(ValidationError {
            message: format!("version must be \"1.0\", got \"{}\"", config.version),
        });
    }

    if config.name.trim().is_empty() {
        errors.push(ValidationError {
            message: "name must not be empty".to_string(),
        });
    }

    let defaults = [("native", &config.native), ("target", &config.target)];
    for (field, code) in defaults {
        if let Some(code) = code {
            if !is_valid_language_code(code) {
                errors.push(ValidationError {
                    message: format!("{} language '{}' is not a 3-letter lowercase code", field, code),
                });
            }
        }
    }
    if let (Some(native), Some(target)) = (&config.native, &config.target) {
        if normalize_language_code(native) == normalize_language_code(target) {
            errors.push(ValidationError {
                message: format!("native and target must differ (both '{}')", native),
            });
        }
    }

    for code in &config.languages {
        if !is_valid_language_code(code) {
            errors.push(ValidationError {
                message: format!("languages entry '{}' is not a 3-letter lowercase code", code),
            });
        }
    }

    if config.search_limit == 0 {
        errors.push(ValidationError {
            message: "search_limit must be greater than 0".to_string(),
        });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gl009_parse_valid() {
        let yaml = r#"
version: "1.0"
name: german-course
native: eng
target: deu
languages: [eng, deu, spa]
export:
  output_dir: out
search_limit: 20
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.name, "german-course");
        assert_eq!(config.languages, vec!["eng", "deu", "spa"]);
        assert_eq!(config.export.output_dir, PathBuf::from("out"));
        assert_eq!(config.search_limit, 20);
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_gl009_defaults() {
        let config = parse_config("version: \"1.0\"\nname: x\n").unwrap();
        assert_eq!(config.data_root, PathBuf::from("data"));
        assert_eq!(config.export.output_dir, PathBuf::from("situations"));
        assert_eq!(config.search_limit, 50);
        assert!(config.native.is_none());
        assert!(config.languages.is_empty());
    }

    #[test]
    fn test_gl009_parse_error() {
        let err = parse_config("version: [").unwrap_err();
        assert!(err.starts_with("YAML parse error"));
    }

    #[test]
    fn test_gl009_validate_collects_all_errors() {
        let yaml = r#"
version: "2.0"
name: ""
native: EN
target: EN
languages: [deu, "x1"]
search_limit: 0
"#;
        let config = parse_config(yaml).unwrap();
        let errors: Vec<String> = validate_config(&config).iter().map(|e| e.to_string()).collect();
        assert!(errors.iter().any(|e| e.contains("version must be")));
        assert!(errors.iter().any(|e| e.contains("name must not be empty")));
        assert!(errors.iter().any(|e| e.contains("native language 'EN'")));
        assert!(errors.iter().any(|e| e.contains("native and target must differ")));
        assert!(errors.iter().any(|e| e.contains("'x1'")));
        assert!(errors.iter().any(|e| e.contains("search_limit")));
    }

    #[test]
    fn test_gl009_language_pair_overrides() {
        let mut config = GlossConfig::new("x");
        config.native = Some("eng".into());
        config.target = Some("deu".into());
        let pair = config.language_pair(None, Some("SPA")).unwrap();
        assert_eq!(pair, LanguagePair::new("eng", "spa"));
        assert!(config.language_pair(Some("deu"), None).is_err());

        config.target = None;
        let err = config.language_pair(None, None).unwrap_err();
        assert!(err.contains("--target"));
    }

    #[test]
    fn test_gl009_paths_relative_to_config() {
        let config = GlossConfig::new("x");
        let path = Path::new("/srv/course/glosstree.yaml");
        assert_eq!(config.data_root_from(path), PathBuf::from("/srv/course/data"));
        assert_eq!(config.output_dir_from(path), PathBuf::from("/srv/course/situations"));
    }

    #[test]
    fn test_gl009_roundtrip_new() {
        let yaml = serde_yaml_ng::to_string(&GlossConfig::new("course")).unwrap();
        let parsed = parse_config(&yaml).unwrap();
        assert_eq!(parsed, GlossConfig::new("course"));
    }
}
